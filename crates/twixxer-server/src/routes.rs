use std::sync::Arc;

use axum::extract::{Path, Query, State};
use axum::http::{StatusCode, header};
use axum::response::{IntoResponse, Redirect};
use axum::routing::{get, post};
use axum::{Extension, Form, Json, Router, middleware};
use chrono::TimeDelta;
use utoipa::OpenApi;
use utoipa_swagger_ui::SwaggerUi;

use twixxer_core::session::SESSION_TTL_SECS;
use twixxer_core::{SessionUser, VerifyOutcome};

use crate::dto::{
    ChirpPageResponse, ChirpRequest, FeedResponse, HealthResponse, LoginRequest, MessageResponse,
    PageQuery, ProfileEditRequest, ProfilePageResponse, ResendVerificationRequest, SignupRequest,
    VerifyQuery, VerifyResponse,
};
use crate::error::ApiError;
use crate::openapi::ApiDoc;
use crate::session::{clear_session_cookie, require_session, session_cookie};
use crate::state::AppState;

/// Build the full router with all routes and middleware.
pub fn router(state: Arc<AppState>) -> Router {
    let protected = Router::new()
        .route("/", get(index))
        .route("/feed", get(feed).post(post_chirp))
        .route("/feed/chirps", get(feed_chirps))
        .route("/profile", get(own_profile))
        .route("/profile/{username}", get(profile).post(update_profile))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            require_session,
        ));

    let public = Router::new()
        .route("/health", get(health))
        .route("/signup", post(signup))
        .route("/verify", get(verify))
        .route("/resend-verification", post(resend_verification))
        .route("/login", post(login))
        .route("/logout", post(logout).get(logout_redirect))
        .merge(SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()));

    public.merge(protected).with_state(state)
}

// ---------------------------------------------------------------------------
// Accounts
// ---------------------------------------------------------------------------

#[utoipa::path(
    post,
    path = "/signup",
    request_body(content = SignupRequest, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 201, description = "Account created, verification mail sent", body = MessageResponse),
        (status = 409, description = "Username or email taken", body = crate::dto::ErrorResponse),
        (status = 422, description = "Invalid form", body = crate::dto::ErrorResponse),
    ),
    tag = "accounts"
)]
pub async fn signup(
    State(state): State<Arc<AppState>>,
    Form(body): Form<SignupRequest>,
) -> Result<impl IntoResponse, ApiError> {
    state.accounts.signup(body.into()).await?;

    let response = MessageResponse {
        message: "Account created! Please check your email to verify your account.".to_string(),
    };
    Ok((StatusCode::CREATED, Json(response)))
}

#[utoipa::path(
    get,
    path = "/verify",
    params(VerifyQuery),
    responses(
        (status = 200, description = "Verified, or already verified", body = VerifyResponse),
        (status = 400, description = "Missing or unknown token", body = VerifyResponse),
        (status = 410, description = "Token expired", body = VerifyResponse),
    ),
    tag = "accounts"
)]
pub async fn verify(
    State(state): State<Arc<AppState>>,
    Query(query): Query<VerifyQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let outcome = state.accounts.verify(query.token.as_deref()).await?;

    let status = match outcome {
        VerifyOutcome::Verified | VerifyOutcome::AlreadyVerified => StatusCode::OK,
        VerifyOutcome::Expired => StatusCode::GONE,
        VerifyOutcome::InvalidToken | VerifyOutcome::MissingToken => StatusCode::BAD_REQUEST,
    };
    let response = VerifyResponse {
        status: outcome.as_str(),
        message: outcome.message(),
    };
    Ok((status, Json(response)))
}

#[utoipa::path(
    post,
    path = "/resend-verification",
    request_body(content = ResendVerificationRequest, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 200, description = "Request accepted", body = MessageResponse),
        (status = 422, description = "Invalid email", body = crate::dto::ErrorResponse),
    ),
    tag = "accounts"
)]
pub async fn resend_verification(
    State(state): State<Arc<AppState>>,
    Form(body): Form<ResendVerificationRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let outcome = state.accounts.resend_verification(body.into()).await?;

    Ok(Json(MessageResponse {
        message: outcome.message().to_string(),
    }))
}

#[utoipa::path(
    post,
    path = "/login",
    request_body(content = LoginRequest, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 303, description = "Logged in; session cookie set"),
        (status = 401, description = "Invalid credentials", body = crate::dto::ErrorResponse),
        (status = 403, description = "Email not verified", body = crate::dto::ErrorResponse),
        (status = 422, description = "Invalid form", body = crate::dto::ErrorResponse),
    ),
    tag = "accounts"
)]
pub async fn login(
    State(state): State<Arc<AppState>>,
    Form(body): Form<LoginRequest>,
) -> Result<impl IntoResponse, ApiError> {
    let success = state.accounts.login(body.into()).await?;

    let value = state
        .signer
        .sign(&success.user, TimeDelta::seconds(SESSION_TTL_SECS))?;
    let cookie = session_cookie(&value, state.secure_cookies);

    Ok((
        [(header::SET_COOKIE, cookie)],
        Redirect::to(&success.redirect_to),
    ))
}

#[utoipa::path(
    post,
    path = "/logout",
    responses(
        (status = 303, description = "Session cookie cleared"),
    ),
    tag = "accounts"
)]
pub async fn logout(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    (
        [(header::SET_COOKIE, clear_session_cookie(state.secure_cookies))],
        Redirect::to("/"),
    )
}

/// A plain GET only navigates away; ending the session takes a POST.
pub async fn logout_redirect() -> Redirect {
    Redirect::to("/")
}

// ---------------------------------------------------------------------------
// Feed
// ---------------------------------------------------------------------------

pub async fn index() -> Redirect {
    Redirect::to("/feed")
}

#[utoipa::path(
    get,
    path = "/feed",
    params(PageQuery),
    responses(
        (status = 200, description = "Newest chirps", body = FeedResponse),
        (status = 303, description = "Not logged in; redirect to /login"),
    ),
    security(("session" = [])),
    tag = "feed"
)]
pub async fn feed(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<SessionUser>,
    Query(query): Query<PageQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let page = state.feed.feed(query.page()).await?;

    Ok(Json(FeedResponse {
        user: (&user).into(),
        success: query.success(),
        page: page.into(),
    }))
}

#[utoipa::path(
    post,
    path = "/feed",
    request_body(content = ChirpRequest, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 303, description = "Chirp posted; redirect to /feed?success=true"),
        (status = 422, description = "Invalid chirp", body = crate::dto::ErrorResponse),
    ),
    security(("session" = [])),
    tag = "feed"
)]
pub async fn post_chirp(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<SessionUser>,
    Form(body): Form<ChirpRequest>,
) -> Result<impl IntoResponse, ApiError> {
    state.feed.post_chirp(&user, body.into()).await?;
    Ok(Redirect::to("/feed?success=true"))
}

#[utoipa::path(
    get,
    path = "/feed/chirps",
    params(PageQuery),
    responses(
        (status = 200, description = "Next page of chirps for infinite scroll", body = ChirpPageResponse),
    ),
    security(("session" = [])),
    tag = "feed"
)]
pub async fn feed_chirps(
    State(state): State<Arc<AppState>>,
    Query(query): Query<PageQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let page = state.feed.feed(query.page()).await?;
    Ok(Json(ChirpPageResponse::from(page)))
}

// ---------------------------------------------------------------------------
// Profiles
// ---------------------------------------------------------------------------

#[utoipa::path(
    get,
    path = "/profile",
    responses(
        (status = 303, description = "Redirect to your own profile"),
    ),
    security(("session" = [])),
    tag = "profiles"
)]
pub async fn own_profile(Extension(user): Extension<SessionUser>) -> Redirect {
    Redirect::to(&format!("/profile/{}", user.username))
}

#[utoipa::path(
    get,
    path = "/profile/{username}",
    params(
        ("username" = String, Path, description = "Username"),
        PageQuery,
    ),
    responses(
        (status = 200, description = "Profile and its chirps", body = ProfilePageResponse),
        (status = 404, description = "Unknown user", body = crate::dto::ErrorResponse),
    ),
    security(("session" = [])),
    tag = "profiles"
)]
pub async fn profile(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<SessionUser>,
    Path(username): Path<String>,
    Query(query): Query<PageQuery>,
) -> Result<impl IntoResponse, ApiError> {
    let view = state.feed.profile(&user, &username, query.page()).await?;
    Ok(Json(ProfilePageResponse::new(view, query.success())))
}

#[utoipa::path(
    post,
    path = "/profile/{username}",
    params(
        ("username" = String, Path, description = "Username; must be your own"),
    ),
    request_body(content = ProfileEditRequest, content_type = "application/x-www-form-urlencoded"),
    responses(
        (status = 303, description = "Profile updated; redirect back to it"),
        (status = 403, description = "Not your profile", body = crate::dto::ErrorResponse),
        (status = 422, description = "Invalid form", body = crate::dto::ErrorResponse),
    ),
    security(("session" = [])),
    tag = "profiles"
)]
pub async fn update_profile(
    State(state): State<Arc<AppState>>,
    Extension(user): Extension<SessionUser>,
    Path(username): Path<String>,
    Form(body): Form<ProfileEditRequest>,
) -> Result<impl IntoResponse, ApiError> {
    state
        .feed
        .update_profile(&user, &username, body.into())
        .await?;
    Ok(Redirect::to(&format!("/profile/{username}?success=true")))
}

// ---------------------------------------------------------------------------
// Health
// ---------------------------------------------------------------------------

#[utoipa::path(
    get,
    path = "/health",
    responses(
        (status = 200, description = "Service is healthy", body = HealthResponse),
        (status = 503, description = "Service is unhealthy", body = HealthResponse),
    ),
    tag = "system"
)]
pub async fn health(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let healthy = state.accounts.health_check().await.is_ok();

    let (status, response) = if healthy {
        (
            StatusCode::OK,
            HealthResponse {
                status: "healthy",
                database: "ok",
            },
        )
    } else {
        (
            StatusCode::SERVICE_UNAVAILABLE,
            HealthResponse {
                status: "unhealthy",
                database: "error",
            },
        )
    };

    (status, Json(response))
}
