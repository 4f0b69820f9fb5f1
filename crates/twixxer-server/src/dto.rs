use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use twixxer_core::models::{ChirpWithAuthor, PublicProfile};
use twixxer_core::validation::{ChirpForm, LoginForm, ProfileEditForm, ResendForm, SignupForm};
use twixxer_core::{Page, PageRequest, ProfileView, SessionUser};

// ---------------------------------------------------------------------------
// Account forms
// ---------------------------------------------------------------------------

// Form fields default to empty so a missing field reports as a validation
// error instead of an extractor rejection.

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct SignupRequest {
    #[serde(default)]
    pub username: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
    #[serde(default)]
    pub confirm_password: String,
}

impl From<SignupRequest> for SignupForm {
    fn from(req: SignupRequest) -> Self {
        Self {
            username: req.username,
            email: req.email,
            password: req.password,
            confirm_password: req.confirm_password,
        }
    }
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct LoginRequest {
    #[serde(default)]
    pub email_or_username: String,
    #[serde(default)]
    pub password: String,
    /// Local path to return to after logging in.
    pub redirect_to: Option<String>,
}

impl From<LoginRequest> for LoginForm {
    fn from(req: LoginRequest) -> Self {
        Self {
            email_or_username: req.email_or_username,
            password: req.password,
            redirect_to: req.redirect_to,
        }
    }
}

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct ResendVerificationRequest {
    #[serde(default)]
    pub email: String,
}

impl From<ResendVerificationRequest> for ResendForm {
    fn from(req: ResendVerificationRequest) -> Self {
        Self { email: req.email }
    }
}

#[derive(Debug, Deserialize, utoipa::IntoParams)]
pub struct VerifyQuery {
    pub token: Option<String>,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct VerifyResponse {
    /// One of `success`, `verified`, `expired`, `error`.
    pub status: &'static str,
    pub message: &'static str,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct MessageResponse {
    pub message: String,
}

// ---------------------------------------------------------------------------
// Feed
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct ChirpRequest {
    #[serde(default)]
    pub content: String,
}

impl From<ChirpRequest> for ChirpForm {
    fn from(req: ChirpRequest) -> Self {
        Self {
            content: req.content,
        }
    }
}

#[derive(Debug, Deserialize, utoipa::IntoParams)]
pub struct PageQuery {
    pub offset: Option<usize>,
    /// Page size, at most 50.
    pub limit: Option<usize>,
    /// Set after a successful form submission.
    pub success: Option<bool>,
}

impl PageQuery {
    pub fn page(&self) -> PageRequest {
        PageRequest::new(self.offset, self.limit)
    }

    pub fn success(&self) -> bool {
        self.success.unwrap_or(false)
    }
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct ChirpResponse {
    pub id: Uuid,
    pub profile_id: Uuid,
    pub content: String,
    pub created_at: DateTime<Utc>,
    pub username: String,
    pub image_url: Option<String>,
}

impl From<ChirpWithAuthor> for ChirpResponse {
    fn from(c: ChirpWithAuthor) -> Self {
        Self {
            id: c.id,
            profile_id: c.profile_id,
            content: c.content,
            created_at: c.created_at,
            username: c.username,
            image_url: c.image_url,
        }
    }
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct ChirpPageResponse {
    pub chirps: Vec<ChirpResponse>,
    pub offset: usize,
    pub limit: usize,
    pub has_more: bool,
    pub next_offset: Option<usize>,
}

impl From<Page<ChirpWithAuthor>> for ChirpPageResponse {
    fn from(page: Page<ChirpWithAuthor>) -> Self {
        let page = page.map(ChirpResponse::from);
        Self {
            chirps: page.items,
            offset: page.offset,
            limit: page.limit,
            has_more: page.has_more,
            next_offset: page.next_offset,
        }
    }
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct CurrentUserResponse {
    pub id: Uuid,
    pub username: String,
}

impl From<&SessionUser> for CurrentUserResponse {
    fn from(user: &SessionUser) -> Self {
        Self {
            id: user.user_id,
            username: user.username.clone(),
        }
    }
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct FeedResponse {
    pub user: CurrentUserResponse,
    pub success: bool,
    #[serde(flatten)]
    pub page: ChirpPageResponse,
}

// ---------------------------------------------------------------------------
// Profiles
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize, utoipa::ToSchema)]
pub struct ProfileEditRequest {
    pub about: Option<String>,
    /// An http(s) URL, or empty to clear.
    pub image_url: Option<String>,
}

impl From<ProfileEditRequest> for ProfileEditForm {
    fn from(req: ProfileEditRequest) -> Self {
        Self {
            about: req.about,
            image_url: req.image_url,
        }
    }
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct ProfileResponse {
    pub id: Uuid,
    pub username: String,
    /// Only present on your own profile.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    pub about: Option<String>,
    pub image_url: Option<String>,
    pub verified: bool,
}

impl From<PublicProfile> for ProfileResponse {
    fn from(p: PublicProfile) -> Self {
        Self {
            id: p.id,
            username: p.username,
            email: p.email,
            about: p.about,
            image_url: p.image_url,
            verified: p.verified,
        }
    }
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct ProfilePageResponse {
    pub profile: ProfileResponse,
    pub is_own_profile: bool,
    pub success: bool,
    #[serde(flatten)]
    pub page: ChirpPageResponse,
}

impl ProfilePageResponse {
    pub fn new(view: ProfileView, success: bool) -> Self {
        Self {
            profile: view.profile.into(),
            is_own_profile: view.is_own_profile,
            success,
            page: view.chirps.into(),
        }
    }
}

// ---------------------------------------------------------------------------
// System
// ---------------------------------------------------------------------------

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct HealthResponse {
    pub status: &'static str,
    pub database: &'static str,
}

#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    /// Per-field validation messages.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fields: Option<serde_json::Value>,
    /// Address awaiting verification, for `verification_required`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
}

impl ErrorResponse {
    pub fn new(error: &str, message: impl Into<String>) -> Self {
        Self {
            error: error.to_string(),
            message: message.into(),
            fields: None,
            email: None,
        }
    }
}
