use utoipa::OpenApi;

use crate::session::SESSION_COOKIE;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Twixxer API",
        version = "0.1.0",
        description = "Short posts, profiles, and email-verified accounts."
    ),
    paths(
        crate::routes::signup,
        crate::routes::verify,
        crate::routes::resend_verification,
        crate::routes::login,
        crate::routes::logout,
        crate::routes::feed,
        crate::routes::post_chirp,
        crate::routes::feed_chirps,
        crate::routes::own_profile,
        crate::routes::profile,
        crate::routes::update_profile,
        crate::routes::health,
    ),
    components(schemas(
        crate::dto::SignupRequest,
        crate::dto::LoginRequest,
        crate::dto::ResendVerificationRequest,
        crate::dto::VerifyResponse,
        crate::dto::MessageResponse,
        crate::dto::ChirpRequest,
        crate::dto::ChirpResponse,
        crate::dto::ChirpPageResponse,
        crate::dto::CurrentUserResponse,
        crate::dto::FeedResponse,
        crate::dto::ProfileEditRequest,
        crate::dto::ProfileResponse,
        crate::dto::ProfilePageResponse,
        crate::dto::HealthResponse,
        crate::dto::ErrorResponse,
    )),
    tags(
        (name = "accounts", description = "Signup, verification, and login"),
        (name = "feed", description = "Posting and reading chirps"),
        (name = "profiles", description = "Profile pages"),
        (name = "system", description = "Health and system status"),
    ),
    modifiers(&SecurityAddon)
)]
pub struct ApiDoc;

/// Adds the session cookie security scheme to the OpenAPI document.
struct SecurityAddon;

impl utoipa::Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "session",
                utoipa::openapi::security::SecurityScheme::ApiKey(
                    utoipa::openapi::security::ApiKey::Cookie(
                        utoipa::openapi::security::ApiKeyValue::with_description(
                            SESSION_COOKIE,
                            "Signed session cookie set by POST /login.",
                        ),
                    ),
                ),
            );
        }
    }
}
