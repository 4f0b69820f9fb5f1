//! Domain types, validation, authentication helpers, and the account and
//! feed services for Twixxer.

pub mod account;
pub mod auth;
pub mod error;
pub mod feed;
pub mod mail;
pub mod models;
pub mod pagination;
pub mod session;
pub mod testutil;
pub mod traits;
pub mod validation;

pub use account::{AccountService, LoginSuccess, ResendOutcome, VerifyOutcome};
pub use error::AppError;
pub use feed::{FeedService, ProfileView};
pub use mail::{LogMailer, VerificationEmail};
pub use models::{Chirp, ChirpWithAuthor, NewChirp, NewProfile, Profile, PublicProfile};
pub use pagination::{Page, PageRequest};
pub use session::{SessionSigner, SessionUser};
pub use traits::{ChirpStore, Mailer, ProfileStore};
pub use validation::ValidationErrors;
