use crate::auth::VERIFICATION_TOKEN_TTL_HOURS;
use crate::error::AppError;
use crate::traits::Mailer;

/// A rendered "verify your account" message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerificationEmail {
    pub to: String,
    pub subject: String,
    pub text_body: String,
    pub html_body: String,
    pub verification_url: String,
}

impl VerificationEmail {
    pub fn new(to: &str, username: &str, token: &str, base_url: &str) -> Self {
        let verification_url = format!("{}/verify?token={token}", base_url.trim_end_matches('/'));
        let hours = VERIFICATION_TOKEN_TTL_HOURS;

        let text_body = format!(
            "Hello {username}!\n\n\
             Please verify your Twixxer account by clicking the link below:\n\n\
             {verification_url}\n\n\
             This link will expire in {hours} hours.\n\n\
             If you did not create a Twixxer account, please ignore this email."
        );

        let name = escape_html(username);
        let url = escape_html(&verification_url);
        let html_body = format!(
            "<div style=\"font-family: Arial, sans-serif; max-width: 600px; margin: 0 auto;\">\
             <h2>Welcome to Twixxer!</h2>\
             <p>Hello {name}!</p>\
             <p>Please verify your Twixxer account by clicking the link below:</p>\
             <p><a href=\"{url}\">Verify Email Address</a></p>\
             <p>Or copy and paste this link into your browser:</p>\
             <p>{url}</p>\
             <p>This link will expire in {hours} hours.</p>\
             <p>If you did not create a Twixxer account, please ignore this email.</p>\
             </div>"
        );

        Self {
            to: to.to_string(),
            subject: "Verify your Twixxer account".to_string(),
            text_body,
            html_body,
            verification_url,
        }
    }
}

fn escape_html(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

/// Mailer that writes messages to the log instead of delivering them.
#[derive(Debug, Clone, Default)]
pub struct LogMailer;

impl Mailer for LogMailer {
    async fn send_verification(&self, email: &VerificationEmail) -> Result<(), AppError> {
        tracing::info!(
            to = %email.to,
            subject = %email.subject,
            url = %email.verification_url,
            "Verification email (log delivery)"
        );
        tracing::debug!("{}", email.text_body);
        Ok(())
    }
}
