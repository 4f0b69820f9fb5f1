use chrono::{Duration, Utc};
use uuid::Uuid;

use twixxer_core::models::{NewChirp, NewProfile, Profile, ProfileUpdate};
use twixxer_core::pagination::PageRequest;
use twixxer_core::traits::{ChirpStore, ProfileStore};
use twixxer_core::AppError;
use twixxer_db::{ChirpRepository, ProfileRepository};

use crate::integration::common::setup_test_db;

async fn create_profile(repo: &ProfileRepository, username: &str) -> Profile {
    repo.create(&NewProfile {
        id: Uuid::new_v4(),
        username: username.into(),
        email: format!("{username}@example.com"),
        password_hash: "$argon2id$v=19$stub".into(),
        activation_token: Uuid::new_v4().simple().to_string(),
        token_expiry: Utc::now() + Duration::hours(24),
    })
    .await
    .unwrap()
}

async fn post(repo: &ChirpRepository, author: &Profile, content: &str) -> Uuid {
    let chirp = repo
        .create(&NewChirp {
            id: Uuid::new_v4(),
            profile_id: author.id,
            content: content.into(),
        })
        .await
        .unwrap();
    chirp.id
}

#[tokio::test]
async fn create_chirp_returns_stored_row() {
    let (pool, _container) = setup_test_db().await;
    let profiles = ProfileRepository::new(pool.clone());
    let chirps = ChirpRepository::new(pool);
    let alice = create_profile(&profiles, "alice").await;

    let chirp = chirps
        .create(&NewChirp {
            id: Uuid::new_v4(),
            profile_id: alice.id,
            content: "hello world".into(),
        })
        .await
        .unwrap();
    assert_eq!(chirp.profile_id, alice.id);
    assert_eq!(chirp.content, "hello world");
    assert_eq!(chirps.count(None).await.unwrap(), 1);
}

#[tokio::test]
async fn content_length_is_enforced_by_the_database() {
    let (pool, _container) = setup_test_db().await;
    let profiles = ProfileRepository::new(pool.clone());
    let chirps = ChirpRepository::new(pool);
    let alice = create_profile(&profiles, "alice").await;

    let err = chirps
        .create(&NewChirp {
            id: Uuid::new_v4(),
            profile_id: alice.id,
            content: "x".repeat(281),
        })
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::DatabaseError(_)));
}

#[tokio::test]
async fn feed_pages_newest_first_with_author() {
    let (pool, _container) = setup_test_db().await;
    let profiles = ProfileRepository::new(pool.clone());
    let chirps = ChirpRepository::new(pool);
    let alice = create_profile(&profiles, "alice").await;
    profiles
        .update_profile(
            alice.id,
            &ProfileUpdate {
                about: None,
                image_url: Some("https://example.com/a.png".into()),
            },
        )
        .await
        .unwrap();

    let mut ids = Vec::new();
    for i in 0..5 {
        ids.push(post(&chirps, &alice, &format!("chirp {i}")).await);
        tokio::time::sleep(std::time::Duration::from_millis(5)).await;
    }
    ids.reverse();

    let first = chirps.feed_page(PageRequest::new(None, Some(2))).await.unwrap();
    assert_eq!(first.items.iter().map(|c| c.id).collect::<Vec<_>>(), ids[..2]);
    assert!(first.has_more);
    assert_eq!(first.next_offset, Some(2));
    assert_eq!(first.items[0].username, "alice");
    assert_eq!(
        first.items[0].image_url.as_deref(),
        Some("https://example.com/a.png")
    );

    let last = chirps
        .feed_page(PageRequest::new(Some(4), Some(2)))
        .await
        .unwrap();
    assert_eq!(last.items.len(), 1);
    assert_eq!(last.items[0].id, ids[4]);
    assert!(!last.has_more);
    assert_eq!(last.next_offset, None);

    let past_end = chirps
        .feed_page(PageRequest::new(Some(10), Some(2)))
        .await
        .unwrap();
    assert!(past_end.items.is_empty());
    assert!(!past_end.has_more);
}

#[tokio::test]
async fn profile_page_only_includes_author_chirps() {
    let (pool, _container) = setup_test_db().await;
    let profiles = ProfileRepository::new(pool.clone());
    let chirps = ChirpRepository::new(pool);
    let alice = create_profile(&profiles, "alice").await;
    let bob = create_profile(&profiles, "bob").await;

    post(&chirps, &alice, "from alice").await;
    post(&chirps, &bob, "from bob").await;
    post(&chirps, &alice, "alice again").await;

    let page = chirps
        .profile_page(alice.id, PageRequest::default())
        .await
        .unwrap();
    assert_eq!(page.items.len(), 2);
    assert!(page.items.iter().all(|c| c.profile_id == alice.id));
    assert!(!page.has_more);

    assert_eq!(chirps.count(Some(bob.id)).await.unwrap(), 1);
    assert_eq!(chirps.count(None).await.unwrap(), 3);

    let nobody = chirps
        .profile_page(Uuid::new_v4(), PageRequest::default())
        .await
        .unwrap();
    assert!(nobody.items.is_empty());
}

#[tokio::test]
async fn offsets_beyond_bigint_do_not_error() {
    let (pool, _container) = setup_test_db().await;
    let profiles = ProfileRepository::new(pool.clone());
    let chirps = ChirpRepository::new(pool);
    let alice = create_profile(&profiles, "alice").await;
    post(&chirps, &alice, "hello").await;

    let page = chirps
        .feed_page(PageRequest {
            offset: usize::MAX,
            limit: 10,
        })
        .await
        .unwrap();
    assert!(page.items.is_empty());
    assert!(!page.has_more);

    let page = chirps
        .profile_page(alice.id, PageRequest::new(Some(usize::MAX), None))
        .await
        .unwrap();
    assert!(page.items.is_empty());
}
