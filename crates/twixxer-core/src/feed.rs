use serde::Serialize;
use uuid::Uuid;

use crate::error::AppError;
use crate::models::{Chirp, ChirpWithAuthor, NewChirp, PublicProfile};
use crate::pagination::{Page, PageRequest};
use crate::session::SessionUser;
use crate::traits::{ChirpStore, ProfileStore};
use crate::validation::{ChirpForm, ProfileEditForm};

/// A profile page: the profile, one page of its chirps, and whether the
/// viewer owns it.
#[derive(Debug, Clone, Serialize)]
pub struct ProfileView {
    pub profile: PublicProfile,
    pub chirps: Page<ChirpWithAuthor>,
    pub is_own_profile: bool,
}

/// Posting chirps, reading the feed, and profile pages.
#[derive(Clone)]
pub struct FeedService<P, C>
where
    P: ProfileStore,
    C: ChirpStore,
{
    profiles: P,
    chirps: C,
}

impl<P, C> FeedService<P, C>
where
    P: ProfileStore,
    C: ChirpStore,
{
    pub fn new(profiles: P, chirps: C) -> Self {
        Self { profiles, chirps }
    }

    pub async fn post_chirp(&self, author: &SessionUser, form: ChirpForm) -> Result<Chirp, AppError> {
        let content = form.validate()?;
        let chirp = self
            .chirps
            .create(&NewChirp {
                id: Uuid::new_v4(),
                profile_id: author.user_id,
                content,
            })
            .await?;
        tracing::info!(chirp_id = %chirp.id, author = %author.username, "Chirp posted");
        Ok(chirp)
    }

    /// Everyone's chirps, newest first.
    pub async fn feed(&self, page: PageRequest) -> Result<Page<ChirpWithAuthor>, AppError> {
        self.chirps.feed_page(page).await
    }

    pub async fn profile(
        &self,
        viewer: &SessionUser,
        username: &str,
        page: PageRequest,
    ) -> Result<ProfileView, AppError> {
        let profile = self
            .profiles
            .find_by_username(username)
            .await?
            .ok_or_else(|| AppError::NotFound(format!("Profile not found: {username}")))?;

        let is_own_profile = profile.id == viewer.user_id;
        let chirps = self.chirps.profile_page(profile.id, page).await?;

        Ok(ProfileView {
            profile: profile.to_public(is_own_profile),
            chirps,
            is_own_profile,
        })
    }

    /// Only the owner can edit a profile.
    pub async fn update_profile(
        &self,
        editor: &SessionUser,
        username: &str,
        form: ProfileEditForm,
    ) -> Result<(), AppError> {
        if editor.username != username {
            return Err(AppError::Forbidden(
                "You can only edit your own profile".into(),
            ));
        }
        let update = form.validate()?;
        self.profiles.update_profile(editor.user_id, &update).await?;
        tracing::info!(profile_id = %editor.user_id, "Profile updated");
        Ok(())
    }
}
