//! Signed, self-contained session values.
//!
//! A session is `hex(json payload) "." hex(hmac_sha256(secret, hex payload))`.
//! Nothing is stored server-side; logging out simply drops the cookie.

use chrono::{TimeDelta, Utc};
use hmac::{Hmac, Mac};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use subtle::ConstantTimeEq;
use uuid::Uuid;

use crate::error::AppError;

type HmacSha256 = Hmac<Sha256>;

/// Sessions last seven days.
pub const SESSION_TTL_SECS: i64 = 60 * 60 * 24 * 7;

/// The user data a session carries.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionUser {
    pub user_id: Uuid,
    pub username: String,
    pub email: String,
}

#[derive(Serialize, Deserialize)]
struct Payload {
    #[serde(flatten)]
    user: SessionUser,
    /// Expiry, unix seconds.
    exp: i64,
}

/// Signs and verifies session values with a shared secret.
#[derive(Clone)]
pub struct SessionSigner {
    secret: Vec<u8>,
}

impl std::fmt::Debug for SessionSigner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionSigner").finish_non_exhaustive()
    }
}

impl SessionSigner {
    pub fn new(secret: impl Into<Vec<u8>>) -> Self {
        Self {
            secret: secret.into(),
        }
    }

    fn mac(&self, data: &[u8]) -> Result<Vec<u8>, AppError> {
        let mut mac = <HmacSha256 as Mac>::new_from_slice(&self.secret)
            .map_err(|e| AppError::ConfigError(format!("Invalid session secret: {e}")))?;
        mac.update(data);
        Ok(mac.finalize().into_bytes().to_vec())
    }

    /// Produce a signed value valid for `ttl`.
    pub fn sign(&self, user: &SessionUser, ttl: TimeDelta) -> Result<String, AppError> {
        let payload = Payload {
            user: user.clone(),
            exp: (Utc::now() + ttl).timestamp(),
        };
        let encoded = hex::encode(serde_json::to_vec(&payload)?);
        let signature = hex::encode(self.mac(encoded.as_bytes())?);
        Ok(format!("{encoded}.{signature}"))
    }

    /// Returns the session user if the value is authentic, unexpired, and complete.
    pub fn verify(&self, value: &str) -> Option<SessionUser> {
        let (encoded, signature) = value.split_once('.')?;
        let signature = hex::decode(signature).ok()?;
        let expected = self.mac(encoded.as_bytes()).ok()?;
        if !bool::from(expected.as_slice().ct_eq(signature.as_slice())) {
            tracing::debug!("Rejected session with bad signature");
            return None;
        }

        let payload: Payload = serde_json::from_slice(&hex::decode(encoded).ok()?).ok()?;
        if Utc::now().timestamp() > payload.exp {
            tracing::debug!(user = %payload.user.username, "Rejected expired session");
            return None;
        }

        let user = payload.user;
        if user.username.is_empty() || user.email.is_empty() || user.user_id.is_nil() {
            return None;
        }
        Some(user)
    }
}
