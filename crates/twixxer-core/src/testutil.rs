//! Test utilities: in-memory implementations of the store and mailer traits.
//!
//! All doubles use `Arc<Mutex<_>>` so clones share state and tests can
//! inspect what was written.

use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::AppError;
use crate::mail::VerificationEmail;
use crate::models::{Chirp, ChirpWithAuthor, NewChirp, NewProfile, Profile, ProfileUpdate};
use crate::pagination::{Page, PageRequest};
use crate::traits::{ChirpStore, Mailer, ProfileStore};

// ---------------------------------------------------------------------------
// MemoryProfileStore
// ---------------------------------------------------------------------------

/// Profile store backed by a vector.
#[derive(Clone, Default)]
pub struct MemoryProfileStore {
    profiles: Arc<Mutex<Vec<Profile>>>,
}

impl MemoryProfileStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, id: Uuid) -> Option<Profile> {
        self.profiles
            .lock()
            .unwrap()
            .iter()
            .find(|p| p.id == id)
            .cloned()
    }

    pub fn len(&self) -> usize {
        self.profiles.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Overwrite a token expiry, e.g. to simulate an old signup.
    pub fn set_expiry(&self, id: Uuid, expiry: Option<DateTime<Utc>>) {
        self.modify(id, |p| p.token_expiry = expiry);
    }

    fn find(&self, pred: impl Fn(&Profile) -> bool) -> Option<Profile> {
        self.profiles.lock().unwrap().iter().find(|p| pred(p)).cloned()
    }

    fn modify(&self, id: Uuid, f: impl FnOnce(&mut Profile)) -> bool {
        let mut profiles = self.profiles.lock().unwrap();
        match profiles.iter_mut().find(|p| p.id == id) {
            Some(profile) => {
                f(profile);
                true
            }
            None => false,
        }
    }
}

impl ProfileStore for MemoryProfileStore {
    async fn create(&self, new: &NewProfile) -> Result<Profile, AppError> {
        let mut profiles = self.profiles.lock().unwrap();
        if profiles
            .iter()
            .any(|p| p.username == new.username || p.email == new.email)
        {
            return Err(AppError::Conflict("Username or email already in use".into()));
        }
        let profile = Profile {
            id: new.id,
            username: new.username.clone(),
            email: new.email.clone(),
            password_hash: new.password_hash.clone(),
            about: None,
            image_url: None,
            verified: false,
            activation_token: Some(new.activation_token.clone()),
            token_expiry: Some(new.token_expiry),
            created_at: Utc::now(),
        };
        profiles.push(profile.clone());
        Ok(profile)
    }

    async fn find_by_id(&self, id: Uuid) -> Result<Option<Profile>, AppError> {
        Ok(self.get(id))
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<Profile>, AppError> {
        Ok(self.find(|p| p.username == username))
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<Profile>, AppError> {
        Ok(self.find(|p| p.email.eq_ignore_ascii_case(email)))
    }

    async fn find_by_login(&self, login: &str) -> Result<Option<Profile>, AppError> {
        Ok(self.find(|p| p.email.eq_ignore_ascii_case(login) || p.username == login))
    }

    async fn find_by_activation_token(&self, token: &str) -> Result<Option<Profile>, AppError> {
        Ok(self.find(|p| p.activation_token.as_deref() == Some(token)))
    }

    async fn mark_verified(&self, id: Uuid) -> Result<(), AppError> {
        self.modify(id, |p| {
            p.verified = true;
            p.activation_token = None;
            p.token_expiry = None;
        });
        Ok(())
    }

    async fn set_activation_token(
        &self,
        id: Uuid,
        token: &str,
        expiry: DateTime<Utc>,
    ) -> Result<(), AppError> {
        self.modify(id, |p| {
            p.activation_token = Some(token.to_string());
            p.token_expiry = Some(expiry);
        });
        Ok(())
    }

    async fn update_profile(&self, id: Uuid, update: &ProfileUpdate) -> Result<(), AppError> {
        if self.modify(id, |p| {
            p.about = update.about.clone();
            p.image_url = update.image_url.clone();
        }) {
            Ok(())
        } else {
            Err(AppError::NotFound(format!("Profile not found: {id}")))
        }
    }

    async fn health_check(&self) -> Result<(), AppError> {
        Ok(())
    }
}

/// Insert a verified profile named `username` with email `{username}@example.com`.
pub fn seed_profile(store: &MemoryProfileStore, username: &str) -> Profile {
    let profile = Profile {
        id: Uuid::new_v4(),
        username: username.to_string(),
        email: format!("{username}@example.com"),
        password_hash: "$argon2id$v=19$m=65536,t=3,p=4$seeded".to_string(),
        about: None,
        image_url: None,
        verified: true,
        activation_token: None,
        token_expiry: None,
        created_at: Utc::now(),
    };
    store.profiles.lock().unwrap().push(profile.clone());
    profile
}

// ---------------------------------------------------------------------------
// MemoryChirpStore
// ---------------------------------------------------------------------------

/// Chirp store backed by a vector in insertion order. Joins authors from
/// the profile store it was built with.
#[derive(Clone)]
pub struct MemoryChirpStore {
    chirps: Arc<Mutex<Vec<Chirp>>>,
    profiles: MemoryProfileStore,
}

impl MemoryChirpStore {
    pub fn new(profiles: MemoryProfileStore) -> Self {
        Self {
            chirps: Arc::new(Mutex::new(Vec::new())),
            profiles,
        }
    }

    fn page_where(
        &self,
        page: PageRequest,
        pred: impl Fn(&Chirp) -> bool,
    ) -> Page<ChirpWithAuthor> {
        let rows: Vec<ChirpWithAuthor> = self
            .chirps
            .lock()
            .unwrap()
            .iter()
            .rev()
            .filter(|c| pred(c))
            .skip(page.offset)
            .take(page.fetch_limit())
            .filter_map(|c| {
                let author = self.profiles.get(c.profile_id)?;
                Some(ChirpWithAuthor {
                    id: c.id,
                    profile_id: c.profile_id,
                    content: c.content.clone(),
                    created_at: c.created_at,
                    username: author.username,
                    image_url: author.image_url,
                })
            })
            .collect();
        Page::from_lookahead(rows, page)
    }
}

impl ChirpStore for MemoryChirpStore {
    async fn create(&self, new: &NewChirp) -> Result<Chirp, AppError> {
        if self.profiles.get(new.profile_id).is_none() {
            return Err(AppError::NotFound(format!(
                "Profile not found: {}",
                new.profile_id
            )));
        }
        let chirp = Chirp {
            id: new.id,
            profile_id: new.profile_id,
            content: new.content.clone(),
            created_at: Utc::now(),
        };
        self.chirps.lock().unwrap().push(chirp.clone());
        Ok(chirp)
    }

    async fn feed_page(&self, page: PageRequest) -> Result<Page<ChirpWithAuthor>, AppError> {
        Ok(self.page_where(page, |_| true))
    }

    async fn profile_page(
        &self,
        profile_id: Uuid,
        page: PageRequest,
    ) -> Result<Page<ChirpWithAuthor>, AppError> {
        Ok(self.page_where(page, |c| c.profile_id == profile_id))
    }
}

// ---------------------------------------------------------------------------
// RecordingMailer
// ---------------------------------------------------------------------------

/// Mailer that records every message, optionally failing instead.
#[derive(Clone, Default)]
pub struct RecordingMailer {
    sent: Arc<Mutex<Vec<VerificationEmail>>>,
    fail: bool,
}

impl RecordingMailer {
    pub fn new() -> Self {
        Self::default()
    }

    /// A mailer whose every send fails.
    pub fn failing() -> Self {
        Self {
            sent: Arc::new(Mutex::new(Vec::new())),
            fail: true,
        }
    }

    pub fn sent(&self) -> Vec<VerificationEmail> {
        self.sent.lock().unwrap().clone()
    }
}

impl Mailer for RecordingMailer {
    async fn send_verification(&self, email: &VerificationEmail) -> Result<(), AppError> {
        if self.fail {
            return Err(AppError::MailError("mailer unavailable".into()));
        }
        self.sent.lock().unwrap().push(email.clone());
        Ok(())
    }
}
