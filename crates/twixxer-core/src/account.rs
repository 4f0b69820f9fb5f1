use chrono::Utc;
use uuid::Uuid;

use crate::auth::{
    VERIFICATION_TOKEN_TTL_HOURS, generate_verification_token, hash_password, is_token_expired,
    token_expiry_from_now, verify_password,
};
use crate::error::AppError;
use crate::mail::VerificationEmail;
use crate::models::{NewProfile, Profile};
use crate::session::SessionUser;
use crate::traits::{Mailer, ProfileStore};
use crate::validation::{LoginForm, ResendForm, SignupForm};

/// Result of exchanging a verification token.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerifyOutcome {
    Verified,
    AlreadyVerified,
    Expired,
    InvalidToken,
    MissingToken,
}

impl VerifyOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            VerifyOutcome::Verified => "success",
            VerifyOutcome::AlreadyVerified => "verified",
            VerifyOutcome::Expired => "expired",
            VerifyOutcome::InvalidToken | VerifyOutcome::MissingToken => "error",
        }
    }

    pub fn message(&self) -> &'static str {
        match self {
            VerifyOutcome::Verified => {
                "Your email has been verified successfully! You can now log in."
            }
            VerifyOutcome::AlreadyVerified => "Your email is already verified. You can now log in.",
            VerifyOutcome::Expired => "Verification link has expired. Please request a new one.",
            VerifyOutcome::InvalidToken => "Invalid verification token.",
            VerifyOutcome::MissingToken => "No verification token provided.",
        }
    }
}

/// Result of a resend-verification request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResendOutcome {
    /// Also returned for unknown addresses.
    Sent,
    AlreadyVerified,
}

impl ResendOutcome {
    pub fn message(&self) -> &'static str {
        match self {
            ResendOutcome::Sent => {
                "If your email is registered, a new verification link has been sent."
            }
            ResendOutcome::AlreadyVerified => "Your email is already verified. You can now log in.",
        }
    }
}

/// A successful login: who to put in the session and where to send them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoginSuccess {
    pub user: SessionUser,
    pub redirect_to: String,
}

/// Signup, email verification, and login.
///
/// Generic over storage and mail delivery so it can run against the
/// in-memory doubles in tests.
#[derive(Clone)]
pub struct AccountService<P, M>
where
    P: ProfileStore,
    M: Mailer,
{
    profiles: P,
    mailer: M,
    base_url: String,
}

impl<P, M> AccountService<P, M>
where
    P: ProfileStore,
    M: Mailer,
{
    /// `base_url` is the public origin used in verification links.
    pub fn new(profiles: P, mailer: M, base_url: impl Into<String>) -> Self {
        Self {
            profiles,
            mailer,
            base_url: base_url.into(),
        }
    }

    /// Create an unverified profile and mail its verification link.
    ///
    /// A mail failure is logged but does not undo the signup; the user can
    /// ask for the link again.
    pub async fn signup(&self, form: SignupForm) -> Result<Profile, AppError> {
        let valid = form.validate()?;

        if self.profiles.find_by_username(&valid.username).await?.is_some() {
            return Err(AppError::Conflict("Username is already taken".into()));
        }
        if self.profiles.find_by_email(&valid.email).await?.is_some() {
            return Err(AppError::Conflict("Email is already registered".into()));
        }

        let new_profile = NewProfile {
            id: Uuid::new_v4(),
            username: valid.username,
            email: valid.email,
            password_hash: hash_password(&valid.password)?,
            activation_token: generate_verification_token(),
            token_expiry: token_expiry_from_now(VERIFICATION_TOKEN_TTL_HOURS),
        };

        let profile = self.profiles.create(&new_profile).await?;
        tracing::info!(profile_id = %profile.id, username = %profile.username, "Profile created");

        let email = VerificationEmail::new(
            &profile.email,
            &profile.username,
            &new_profile.activation_token,
            &self.base_url,
        );
        if let Err(e) = self.mailer.send_verification(&email).await {
            tracing::warn!(profile_id = %profile.id, "Failed to send verification email: {e}");
        }

        Ok(profile)
    }

    /// Exchange a verification token. A token can be used once.
    pub async fn verify(&self, token: Option<&str>) -> Result<VerifyOutcome, AppError> {
        let Some(token) = token.map(str::trim).filter(|t| !t.is_empty()) else {
            return Ok(VerifyOutcome::MissingToken);
        };

        let Some(profile) = self.profiles.find_by_activation_token(token).await? else {
            return Ok(VerifyOutcome::InvalidToken);
        };

        if is_token_expired(profile.token_expiry, Utc::now()) {
            return Ok(VerifyOutcome::Expired);
        }
        if profile.verified {
            return Ok(VerifyOutcome::AlreadyVerified);
        }

        self.profiles.mark_verified(profile.id).await?;
        tracing::info!(profile_id = %profile.id, "Profile verified");
        Ok(VerifyOutcome::Verified)
    }

    /// Issue a fresh token and mail it. Unknown addresses get the same
    /// answer as known ones.
    pub async fn resend_verification(&self, form: ResendForm) -> Result<ResendOutcome, AppError> {
        let email = form.validate()?;

        let Some(profile) = self.profiles.find_by_email(&email).await? else {
            tracing::debug!("Resend requested for unknown address");
            return Ok(ResendOutcome::Sent);
        };
        if profile.verified {
            return Ok(ResendOutcome::AlreadyVerified);
        }

        let token = generate_verification_token();
        let expiry = token_expiry_from_now(VERIFICATION_TOKEN_TTL_HOURS);
        self.profiles
            .set_activation_token(profile.id, &token, expiry)
            .await?;

        let message = VerificationEmail::new(&profile.email, &profile.username, &token, &self.base_url);
        self.mailer.send_verification(&message).await?;
        tracing::info!(profile_id = %profile.id, "Verification email re-sent");

        Ok(ResendOutcome::Sent)
    }

    /// Check credentials. The verification state is only revealed to
    /// someone who knows the password.
    pub async fn login(&self, form: LoginForm) -> Result<LoginSuccess, AppError> {
        let valid = form.validate()?;

        let Some(profile) = self.profiles.find_by_login(&valid.login).await? else {
            return Err(AppError::InvalidCredentials);
        };
        if !verify_password(&valid.password, &profile.password_hash) {
            tracing::info!(profile_id = %profile.id, "Login failed: wrong password");
            return Err(AppError::InvalidCredentials);
        }
        if !profile.verified {
            return Err(AppError::VerificationRequired {
                email: profile.email,
            });
        }

        tracing::info!(profile_id = %profile.id, "Login succeeded");
        Ok(LoginSuccess {
            user: SessionUser {
                user_id: profile.id,
                username: profile.username,
                email: profile.email,
            },
            redirect_to: valid.redirect_to,
        })
    }

    /// Storage connectivity, for health endpoints.
    pub async fn health_check(&self) -> Result<(), AppError> {
        self.profiles.health_check().await
    }
}
