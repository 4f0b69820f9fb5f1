use axum::http::StatusCode;

use crate::integration::common::{
    TEST_PASSWORD, json_body, location, session_cookie, setup_test_app,
};

#[tokio::test]
async fn health_returns_200() {
    let app = setup_test_app().await;

    let response = app.get("/health", None).await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = json_body(response).await;
    assert_eq!(json["status"], "healthy");
    assert_eq!(json["database"], "ok");
}

#[tokio::test]
async fn openapi_document_is_served() {
    let app = setup_test_app().await;

    let response = app.get("/api-docs/openapi.json", None).await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = json_body(response).await;
    assert_eq!(json["info"]["title"], "Twixxer API");
}

#[tokio::test]
async fn signup_creates_unverified_profile() {
    let app = setup_test_app().await;

    let response = app.signup("alice").await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let json = json_body(response).await;
    assert!(json["message"].as_str().unwrap().contains("verify"));

    let token = app.activation_token("alice").await.unwrap();
    assert_eq!(token.len(), 32);

    let (verified,): (bool,) = sqlx::query_as("SELECT verified FROM profile WHERE username = $1")
        .bind("alice")
        .fetch_one(&app.pool)
        .await
        .unwrap();
    assert!(!verified);
}

#[tokio::test]
async fn signup_reports_every_invalid_field() {
    let app = setup_test_app().await;

    let response = app
        .post_form(
            "/signup",
            &[
                ("username", "a"),
                ("email", "not-an-email"),
                ("password", "short"),
                ("confirm_password", "different"),
            ],
            None,
        )
        .await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);

    let json = json_body(response).await;
    assert_eq!(json["error"], "validation_error");
    for field in ["username", "email", "password", "confirm_password"] {
        assert!(json["fields"].get(field).is_some(), "no error for {field}");
    }
    assert_eq!(json["fields"]["confirm_password"][0], "Passwords don't match");
}

#[tokio::test]
async fn signup_with_missing_fields_is_a_validation_error() {
    let app = setup_test_app().await;

    let response = app.post_form("/signup", &[("username", "alice")], None).await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(json_body(response).await["error"], "validation_error");
}

#[tokio::test]
async fn duplicate_signup_is_a_conflict() {
    let app = setup_test_app().await;
    app.signup("alice").await;

    let response = app.signup("alice").await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
    let json = json_body(response).await;
    assert_eq!(json["message"], "Username is already taken");

    let response = app
        .post_form(
            "/signup",
            &[
                ("username", "alice2"),
                ("email", "ALICE@example.com"),
                ("password", TEST_PASSWORD),
                ("confirm_password", TEST_PASSWORD),
            ],
            None,
        )
        .await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
    let json = json_body(response).await;
    assert_eq!(json["message"], "Email is already registered");
}

#[tokio::test]
async fn verify_token_is_exchanged_once() {
    let app = setup_test_app().await;
    app.signup("alice").await;
    let token = app.activation_token("alice").await.unwrap();

    let response = app.get(&format!("/verify?token={token}"), None).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await["status"], "success");

    assert!(app.activation_token("alice").await.is_none());

    let response = app.get(&format!("/verify?token={token}"), None).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json_body(response).await["status"], "error");
}

#[tokio::test]
async fn verify_rejects_missing_and_unknown_tokens() {
    let app = setup_test_app().await;

    let response = app.get("/verify", None).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = json_body(response).await;
    assert_eq!(json["message"], "No verification token provided.");

    let response = app
        .get("/verify?token=00000000000000000000000000000000", None)
        .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let json = json_body(response).await;
    assert_eq!(json["message"], "Invalid verification token.");
}

#[tokio::test]
async fn expired_token_returns_410() {
    let app = setup_test_app().await;
    app.signup("alice").await;
    let token = app.activation_token("alice").await.unwrap();

    sqlx::query("UPDATE profile SET token_expiry = NOW() - INTERVAL '1 hour' WHERE username = $1")
        .bind("alice")
        .execute(&app.pool)
        .await
        .unwrap();

    let response = app.get(&format!("/verify?token={token}"), None).await;
    assert_eq!(response.status(), StatusCode::GONE);
    assert_eq!(json_body(response).await["status"], "expired");
}

#[tokio::test]
async fn resend_verification_issues_a_new_token() {
    let app = setup_test_app().await;
    app.signup("alice").await;
    let old_token = app.activation_token("alice").await.unwrap();

    let response = app
        .post_form("/resend-verification", &[("email", "alice@example.com")], None)
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    let sent_message = json_body(response).await["message"].clone();

    let new_token = app.activation_token("alice").await.unwrap();
    assert_ne!(old_token, new_token);

    let response = app
        .post_form("/resend-verification", &[("email", "nobody@example.com")], None)
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await["message"], sent_message);

    let response = app
        .post_form("/resend-verification", &[("email", "bogus")], None)
        .await;
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn login_requires_verified_email() {
    let app = setup_test_app().await;
    app.signup("alice").await;

    let response = app
        .post_form(
            "/login",
            &[("email_or_username", "alice"), ("password", TEST_PASSWORD)],
            None,
        )
        .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
    let json = json_body(response).await;
    assert_eq!(json["error"], "verification_required");
    assert_eq!(json["email"], "alice@example.com");
}

#[tokio::test]
async fn login_with_wrong_password_is_rejected() {
    let app = setup_test_app().await;
    app.logged_in_user("alice").await;

    let response = app
        .post_form(
            "/login",
            &[("email_or_username", "alice"), ("password", "wrong password")],
            None,
        )
        .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert!(session_cookie(&response).is_none());

    let response = app
        .post_form(
            "/login",
            &[("email_or_username", "nobody"), ("password", TEST_PASSWORD)],
            None,
        )
        .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(json_body(response).await["error"], "invalid_credentials");
}

#[tokio::test]
async fn login_sets_session_cookie_and_redirects() {
    let app = setup_test_app().await;
    app.logged_in_user("alice").await;

    let response = app
        .post_form(
            "/login",
            &[
                ("email_or_username", "Alice@Example.com"),
                ("password", TEST_PASSWORD),
                ("redirect_to", "/profile/alice"),
            ],
            None,
        )
        .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/profile/alice");

    let set_cookie = response
        .headers()
        .get("set-cookie")
        .unwrap()
        .to_str()
        .unwrap();
    assert!(set_cookie.starts_with("__twixxer_session="));
    assert!(set_cookie.contains("HttpOnly"));
    assert!(set_cookie.contains("SameSite=Lax"));
    assert!(set_cookie.contains("Max-Age=604800"));
}

#[tokio::test]
async fn login_ignores_offsite_redirects() {
    let app = setup_test_app().await;
    app.logged_in_user("alice").await;

    let response = app
        .post_form(
            "/login",
            &[
                ("email_or_username", "alice"),
                ("password", TEST_PASSWORD),
                ("redirect_to", "//evil.example/phish"),
            ],
            None,
        )
        .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/");
    let response = app
        .post_form(
            "/login",
            &[
                ("email_or_username", "alice"),
                ("password", TEST_PASSWORD),
                ("redirect_to", "/\t/evil.example"),
            ],
            None,
        )
        .await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/");
}

#[tokio::test]
async fn logout_clears_the_cookie() {
    let app = setup_test_app().await;
    let cookie = app.logged_in_user("alice").await;

    let response = app.post_form("/logout", &[], Some(&cookie)).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/");
    assert_eq!(
        session_cookie(&response).as_deref(),
        Some("__twixxer_session=")
    );

}

#[tokio::test]
async fn get_logout_only_redirects() {
    let app = setup_test_app().await;
    let cookie = app.logged_in_user("alice").await;

    let response = app.get("/logout", Some(&cookie)).await;
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(&response), "/");
    assert!(response.headers().get("set-cookie").is_none());

    let response = app.get("/feed", Some(&cookie)).await;
    assert_eq!(response.status(), StatusCode::OK);
}
