use chrono::{Duration, Utc};
use uuid::Uuid;

use twixxer_core::AppError;
use twixxer_core::models::{NewProfile, ProfileUpdate};
use twixxer_core::traits::ProfileStore;
use twixxer_db::ProfileRepository;

use crate::integration::common::setup_test_db;

fn new_profile(username: &str, token: &str) -> NewProfile {
    NewProfile {
        id: Uuid::new_v4(),
        username: username.into(),
        email: format!("{username}@example.com"),
        password_hash: "$argon2id$v=19$stub".into(),
        activation_token: token.into(),
        token_expiry: Utc::now() + Duration::hours(24),
    }
}

#[tokio::test]
async fn create_and_find_profile() {
    let (pool, _container) = setup_test_db().await;
    let repo = ProfileRepository::new(pool);

    let created = repo
        .create(&new_profile("alice", &"a".repeat(32)))
        .await
        .unwrap();
    assert_eq!(created.username, "alice");
    assert!(!created.verified);
    assert_eq!(created.activation_token.as_deref(), Some("a".repeat(32).as_str()));
    assert!(created.about.is_none());

    let by_id = repo.find_by_id(created.id).await.unwrap().unwrap();
    assert_eq!(by_id.email, "alice@example.com");

    let by_username = repo.find_by_username("alice").await.unwrap().unwrap();
    assert_eq!(by_username.id, created.id);

    assert!(repo.find_by_username("bob").await.unwrap().is_none());
    assert!(repo.find_by_id(Uuid::new_v4()).await.unwrap().is_none());
}

#[tokio::test]
async fn login_lookup_matches_email_case_insensitively_or_username() {
    let (pool, _container) = setup_test_db().await;
    let repo = ProfileRepository::new(pool);
    let created = repo
        .create(&new_profile("carol", &"c".repeat(32)))
        .await
        .unwrap();

    let by_email = repo.find_by_login("Carol@Example.com").await.unwrap().unwrap();
    assert_eq!(by_email.id, created.id);

    let by_username = repo.find_by_login("carol").await.unwrap().unwrap();
    assert_eq!(by_username.id, created.id);

    assert!(repo.find_by_login("CAROL").await.unwrap().is_none());
    assert!(
        repo.find_by_email("CAROL@example.com")
            .await
            .unwrap()
            .is_some()
    );
}

#[tokio::test]
async fn duplicate_username_or_email_is_a_conflict() {
    let (pool, _container) = setup_test_db().await;
    let repo = ProfileRepository::new(pool);
    repo.create(&new_profile("dave", &"d".repeat(32)))
        .await
        .unwrap();

    let err = repo
        .create(&new_profile("dave", &"e".repeat(32)))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Conflict(ref m) if m == "Username is already taken"));

    let mut same_email = new_profile("dave2", &"f".repeat(32));
    same_email.email = "dave@example.com".into();
    let err = repo.create(&same_email).await.unwrap_err();
    assert!(matches!(err, AppError::Conflict(ref m) if m == "Email is already registered"));
}

#[tokio::test]
async fn activation_token_lifecycle() {
    let (pool, _container) = setup_test_db().await;
    let repo = ProfileRepository::new(pool);
    let token = "0123456789abcdef0123456789abcdef";
    let created = repo.create(&new_profile("erin", token)).await.unwrap();

    let found = repo.find_by_activation_token(token).await.unwrap().unwrap();
    assert_eq!(found.id, created.id);

    let replacement = "fedcba9876543210fedcba9876543210";
    let expiry = Utc::now() + Duration::hours(1);
    repo.set_activation_token(created.id, replacement, expiry)
        .await
        .unwrap();
    assert!(repo.find_by_activation_token(token).await.unwrap().is_none());
    let refreshed = repo
        .find_by_activation_token(replacement)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(refreshed.activation_token.as_deref(), Some(replacement));

    repo.mark_verified(created.id).await.unwrap();
    let verified = repo.find_by_id(created.id).await.unwrap().unwrap();
    assert!(verified.verified);
    assert!(verified.activation_token.is_none());
    assert!(verified.token_expiry.is_none());
    assert!(
        repo.find_by_activation_token(replacement)
            .await
            .unwrap()
            .is_none()
    );
}

#[tokio::test]
async fn update_profile_sets_and_clears_fields() {
    let (pool, _container) = setup_test_db().await;
    let repo = ProfileRepository::new(pool);
    let created = repo
        .create(&new_profile("frank", &"g".repeat(32)))
        .await
        .unwrap();

    let update = ProfileUpdate {
        about: Some("Hello there".into()),
        image_url: Some("https://example.com/me.png".into()),
    };
    repo.update_profile(created.id, &update).await.unwrap();
    let updated = repo.find_by_id(created.id).await.unwrap().unwrap();
    assert_eq!(updated.about.as_deref(), Some("Hello there"));
    assert_eq!(updated.image_url.as_deref(), Some("https://example.com/me.png"));

    repo.update_profile(created.id, &ProfileUpdate::default())
        .await
        .unwrap();
    let cleared = repo.find_by_id(created.id).await.unwrap().unwrap();
    assert!(cleared.about.is_none());
    assert!(cleared.image_url.is_none());

    let err = repo
        .update_profile(Uuid::new_v4(), &ProfileUpdate::default())
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::NotFound(_)));
}

#[tokio::test]
async fn list_returns_newest_first() {
    let (pool, _container) = setup_test_db().await;
    let repo = ProfileRepository::new(pool);
    repo.create(&new_profile("gina", &"h".repeat(32)))
        .await
        .unwrap();
    tokio::time::sleep(std::time::Duration::from_millis(10)).await;
    repo.create(&new_profile("hank", &"i".repeat(32)))
        .await
        .unwrap();

    let profiles = repo.list(10).await.unwrap();
    let names: Vec<_> = profiles.iter().map(|p| p.username.as_str()).collect();
    assert_eq!(names, vec!["hank", "gina"]);

    assert_eq!(repo.list(1).await.unwrap().len(), 1);
    repo.health_check().await.unwrap();
}
