use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

/// A user account as stored in the `profile` table.
#[derive(Debug, Clone)]
pub struct Profile {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub about: Option<String>,
    pub image_url: Option<String>,
    pub verified: bool,
    pub activation_token: Option<String>,
    pub token_expiry: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

impl Profile {
    /// Strip password hash and verification secrets.
    pub fn to_public(&self, include_email: bool) -> PublicProfile {
        PublicProfile {
            id: self.id,
            username: self.username.clone(),
            email: include_email.then(|| self.email.clone()),
            about: self.about.clone(),
            image_url: self.image_url.clone(),
            verified: self.verified,
        }
    }
}

/// DTO for inserting a new profile.
#[derive(Debug, Clone)]
pub struct NewProfile {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub password_hash: String,
    pub activation_token: String,
    pub token_expiry: DateTime<Utc>,
}

/// Editable profile fields. `None` clears the column.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProfileUpdate {
    pub about: Option<String>,
    pub image_url: Option<String>,
}

/// Profile as shown to other users.
#[derive(Debug, Clone, Serialize)]
pub struct PublicProfile {
    pub id: Uuid,
    pub username: String,
    /// Only disclosed to the profile owner.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub about: Option<String>,
    pub image_url: Option<String>,
    pub verified: bool,
}

/// A chirp as stored in the `chirp` table.
#[derive(Debug, Clone, Serialize)]
pub struct Chirp {
    pub id: Uuid,
    pub profile_id: Uuid,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

/// DTO for inserting a new chirp.
#[derive(Debug, Clone)]
pub struct NewChirp {
    pub id: Uuid,
    pub profile_id: Uuid,
    pub content: String,
}

/// A chirp joined with the author columns the feed needs.
#[derive(Debug, Clone, Serialize)]
pub struct ChirpWithAuthor {
    pub id: Uuid,
    pub profile_id: Uuid,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub username: String,
    pub image_url: Option<String>,
}
