//! Email/password accounts against the identity REST API.

use serde::{Deserialize, Serialize};

use super::error::{RemoteError, RemoteResult};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuthAction {
    SignIn,
    Register,
}

impl AuthAction {
    fn endpoint(&self) -> &'static str {
        match self {
            AuthAction::SignIn => "accounts:signInWithPassword",
            AuthAction::Register => "accounts:signUp",
        }
    }

    fn missing_fields(&self) -> &'static str {
        match self {
            AuthAction::SignIn => "Please enter both email and password.",
            AuthAction::Register => "Please enter both email and password for registration.",
        }
    }

    pub fn pending_label(&self) -> &'static str {
        match self {
            AuthAction::SignIn => "Signing in...",
            AuthAction::Register => "Registering...",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthSession {
    pub email: String,
    pub id_token: String,
    #[serde(default)]
    pub refresh_token: String,
    pub local_id: String,
}

impl AuthSession {
    /// An empty admin list lets any signed-in account through.
    pub fn is_admin(&self, admins: &[String]) -> bool {
        admins.is_empty() || admins.iter().any(|a| a.eq_ignore_ascii_case(&self.email))
    }
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Credentials<'a> {
    email: &'a str,
    password: &'a str,
    return_secure_token: bool,
}

#[derive(Deserialize)]
struct ErrorEnvelope {
    error: ErrorBody,
}

#[derive(Deserialize)]
struct ErrorBody {
    message: String,
}

/// Turn a service error code into the text shown on the form.
pub fn describe_error(action: AuthAction, message: &str) -> String {
    let code = message
        .split([' ', ':'])
        .next()
        .unwrap_or_default();
    match (action, code) {
        (_, "EMAIL_NOT_FOUND" | "INVALID_PASSWORD" | "INVALID_LOGIN_CREDENTIALS") => {
            "Invalid email or password.".to_string()
        }
        (_, "INVALID_EMAIL") => "The email address is not valid.".to_string(),
        (_, "USER_DISABLED") => "This account has been disabled.".to_string(),
        (AuthAction::Register, "EMAIL_EXISTS") => {
            "This email is already registered. Please log in.".to_string()
        }
        (AuthAction::Register, "WEAK_PASSWORD") => {
            "Password should be at least 6 characters.".to_string()
        }
        (AuthAction::SignIn, _) => format!("Login failed: {}", message),
        (AuthAction::Register, _) => format!("Registration failed: {}", message),
    }
}

pub struct AuthClient {
    http: reqwest::Client,
    base_url: String,
    api_key: String,
}

impl AuthClient {
    pub fn new(http: reqwest::Client, base_url: impl Into<String>, api_key: impl Into<String>) -> Self {
        Self {
            http,
            base_url: base_url.into(),
            api_key: api_key.into(),
        }
    }

    pub async fn sign_in(&self, email: &str, password: &str) -> RemoteResult<AuthSession> {
        self.authenticate(AuthAction::SignIn, email, password).await
    }

    pub async fn register(&self, email: &str, password: &str) -> RemoteResult<AuthSession> {
        self.authenticate(AuthAction::Register, email, password).await
    }

    pub async fn authenticate(
        &self,
        action: AuthAction,
        email: &str,
        password: &str,
    ) -> RemoteResult<AuthSession> {
        let email = email.trim();
        if email.is_empty() || password.is_empty() {
            return Err(RemoteError::Auth(action.missing_fields().to_string()));
        }

        let url = format!(
            "{}/{}?key={}",
            self.base_url.trim_end_matches('/'),
            action.endpoint(),
            self.api_key
        );
        let response = self
            .http
            .post(&url)
            .json(&Credentials {
                email,
                password,
                return_secure_token: true,
            })
            .send()
            .await?;

        if response.status().is_success() {
            let session: AuthSession = response.json().await?;
            log::info!("{:?} succeeded for {}", action, session.email);
            return Ok(session);
        }

        let status = response.status();
        let body = response.text().await?;
        let message = serde_json::from_str::<ErrorEnvelope>(&body)
            .map(|e| e.error.message)
            .unwrap_or_else(|_| format!("HTTP {}", status));
        log::warn!("{:?} failed for {}: {}", action, email, message);
        Err(RemoteError::Auth(describe_error(action, &message)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_describe_error_sign_in_codes() {
        assert_eq!(describe_error(AuthAction::SignIn, "EMAIL_NOT_FOUND"), "Invalid email or password.");
        assert_eq!(
            describe_error(AuthAction::SignIn, "INVALID_LOGIN_CREDENTIALS"),
            "Invalid email or password."
        );
        assert_eq!(describe_error(AuthAction::SignIn, "INVALID_EMAIL"), "The email address is not valid.");
        assert_eq!(describe_error(AuthAction::SignIn, "USER_DISABLED"), "This account has been disabled.");
        assert_eq!(
            describe_error(AuthAction::SignIn, "TOO_MANY_ATTEMPTS_TRY_LATER"),
            "Login failed: TOO_MANY_ATTEMPTS_TRY_LATER"
        );
    }

    #[test]
    fn test_describe_error_register_codes() {
        assert_eq!(
            describe_error(AuthAction::Register, "EMAIL_EXISTS"),
            "This email is already registered. Please log in."
        );
        assert_eq!(
            describe_error(AuthAction::Register, "WEAK_PASSWORD : Password should be at least 6 characters"),
            "Password should be at least 6 characters."
        );
        assert_eq!(
            describe_error(AuthAction::Register, "OPERATION_NOT_ALLOWED"),
            "Registration failed: OPERATION_NOT_ALLOWED"
        );
    }

    #[tokio::test]
    async fn test_empty_fields_rejected_before_request() {
        let client = AuthClient::new(reqwest::Client::new(), "http://127.0.0.1:9", "key");
        let err = client.sign_in("", "secret").await.unwrap_err();
        assert_eq!(err.to_string(), "Please enter both email and password.");
        let err = client.register("a@b.c", "").await.unwrap_err();
        assert_eq!(err.to_string(), "Please enter both email and password for registration.");
    }

    #[test]
    fn test_session_parses_and_checks_admins() {
        let json = r#"{"kind":"x","localId":"u1","email":"Admin@Example.com","idToken":"tok","refreshToken":"r","expiresIn":"3600"}"#;
        let session: AuthSession = serde_json::from_str(json).unwrap();
        assert_eq!(session.id_token, "tok");
        assert!(session.is_admin(&[]));
        assert!(session.is_admin(&["admin@example.com".to_string()]));
        assert!(!session.is_admin(&["other@example.com".to_string()]));
    }
}
