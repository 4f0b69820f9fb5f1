use std::future::Future;

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::error::AppError;
use crate::mail::VerificationEmail;
use crate::models::{Chirp, ChirpWithAuthor, NewChirp, NewProfile, Profile, ProfileUpdate};
use crate::pagination::{Page, PageRequest};

/// Persists and looks up user profiles.
pub trait ProfileStore: Send + Sync + Clone {
    /// Insert a new profile. Duplicate usernames or emails fail with `AppError::Conflict`.
    fn create(
        &self,
        profile: &NewProfile,
    ) -> impl Future<Output = Result<Profile, AppError>> + Send;

    fn find_by_id(
        &self,
        id: Uuid,
    ) -> impl Future<Output = Result<Option<Profile>, AppError>> + Send;

    fn find_by_username(
        &self,
        username: &str,
    ) -> impl Future<Output = Result<Option<Profile>, AppError>> + Send;

    fn find_by_email(
        &self,
        email: &str,
    ) -> impl Future<Output = Result<Option<Profile>, AppError>> + Send;

    /// Look a profile up by email (case-insensitive) or exact username.
    fn find_by_login(
        &self,
        login: &str,
    ) -> impl Future<Output = Result<Option<Profile>, AppError>> + Send;

    fn find_by_activation_token(
        &self,
        token: &str,
    ) -> impl Future<Output = Result<Option<Profile>, AppError>> + Send;

    /// Mark a profile verified and clear its activation token and expiry.
    fn mark_verified(&self, id: Uuid) -> impl Future<Output = Result<(), AppError>> + Send;

    /// Replace the activation token and its expiry.
    fn set_activation_token(
        &self,
        id: Uuid,
        token: &str,
        expiry: DateTime<Utc>,
    ) -> impl Future<Output = Result<(), AppError>> + Send;

    fn update_profile(
        &self,
        id: Uuid,
        update: &ProfileUpdate,
    ) -> impl Future<Output = Result<(), AppError>> + Send;

    /// Check storage connectivity.
    fn health_check(&self) -> impl Future<Output = Result<(), AppError>> + Send;
}

/// Persists chirps and serves newest-first pages of them.
pub trait ChirpStore: Send + Sync + Clone {
    fn create(&self, chirp: &NewChirp) -> impl Future<Output = Result<Chirp, AppError>> + Send;

    /// All chirps, newest first.
    fn feed_page(
        &self,
        page: PageRequest,
    ) -> impl Future<Output = Result<Page<ChirpWithAuthor>, AppError>> + Send;

    /// Chirps of one profile, newest first.
    fn profile_page(
        &self,
        profile_id: Uuid,
        page: PageRequest,
    ) -> impl Future<Output = Result<Page<ChirpWithAuthor>, AppError>> + Send;
}

/// Delivers outgoing mail.
pub trait Mailer: Send + Sync + Clone {
    fn send_verification(
        &self,
        email: &VerificationEmail,
    ) -> impl Future<Output = Result<(), AppError>> + Send;
}
