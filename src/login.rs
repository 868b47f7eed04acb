//! Login flow: credentials, optional two-factor challenge, session
//! construction. The flow never advances on transport failures, and a
//! redirect whose target cannot be parsed surfaces an error while the
//! state stays at credential entry.

use crate::client::{api_error, ApiClient, ApiResponse};
use crate::error::ConsoleError;
use crate::storage::Session;
use serde_json::json;

/// Transient challenge handed out when login answers with a redirect to
/// the verification endpoint. Discarded on success or explicit cancel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TwoFactorChallenge {
    pub user_id: String,
    pub verification_token: String,
}

#[derive(Debug, Clone, PartialEq)]
pub enum LoginState {
    EnteringCredentials,
    AwaitingTwoFactor(TwoFactorChallenge),
    Authenticated(Session),
}

pub struct LoginFlow {
    state: LoginState,
}

impl Default for LoginFlow {
    fn default() -> Self {
        Self::new()
    }
}

impl LoginFlow {
    pub fn new() -> Self {
        Self { state: LoginState::EnteringCredentials }
    }

    pub fn state(&self) -> &LoginState {
        &self.state
    }

    /// Submit primary credentials. On a 2xx the flow authenticates
    /// directly; a redirect-type response moves it to the two-factor
    /// step; any failure leaves the state unchanged.
    pub async fn submit_credentials(
        &mut self,
        client: &ApiClient,
        email: &str,
        password: &str,
    ) -> Result<&LoginState, ConsoleError> {
        let body = json!({ "email": email, "password": password });
        let response = client.post("/login", &body).await?;

        if response.is_redirect() {
            let challenge = parse_verification_redirect(&response)
                .ok_or(ConsoleError::NoVerificationToken)?;
            self.state = LoginState::AwaitingTwoFactor(challenge);
            return Ok(&self.state);
        }
        if response.is_error() {
            return Err(api_error(&response, "Login failed"));
        }

        self.authenticate(&response, "Login failed")
    }

    /// Submit the one-time code for the held challenge. Only valid in
    /// the awaiting-two-factor state.
    pub async fn submit_code(
        &mut self,
        client: &ApiClient,
        code: &str,
    ) -> Result<&LoginState, ConsoleError> {
        let LoginState::AwaitingTwoFactor(challenge) = &self.state else {
            return Err(ConsoleError::precondition("no two-factor challenge pending"));
        };

        // The one-time code travels in the authToken field.
        let body = json!({
            "userId": challenge.user_id,
            "verificationToken": challenge.verification_token,
            "authToken": code,
        });
        let response = client.post("/login/verify2fa", &body).await?;
        if response.is_error() {
            return Err(api_error(&response, "Verification failed"));
        }

        self.authenticate(&response, "Verification failed")
    }

    /// Discard the pending challenge and return to credential entry.
    pub fn back(&mut self) {
        if matches!(self.state, LoginState::AwaitingTwoFactor(_)) {
            self.state = LoginState::EnteringCredentials;
        }
    }

    fn authenticate(
        &mut self,
        response: &ApiResponse,
        fallback: &str,
    ) -> Result<&LoginState, ConsoleError> {
        let session = Session::from_login_payload(&response.body)
            .ok_or_else(|| api_error(response, fallback))?;
        self.state = LoginState::Authenticated(session);
        Ok(&self.state)
    }
}

/// Pull the verification target out of a redirect response: the
/// `Location` header when present, otherwise a `url` field in the body.
fn parse_verification_redirect(response: &ApiResponse) -> Option<TwoFactorChallenge> {
    let target = response
        .location
        .clone()
        .or_else(|| response.body["url"].as_str().map(str::to_string))?;
    parse_verification_target(&target)
}

/// Parse `.../auth/verify/{userId}/{verificationToken}` out of a redirect
/// target, which may be an absolute URL or a bare path.
pub fn parse_verification_target(target: &str) -> Option<TwoFactorChallenge> {
    let path = match url::Url::parse(target) {
        Ok(parsed) => parsed.path().to_string(),
        // Relative target; strip any query/fragment by hand.
        Err(_) => target
            .split(['?', '#'])
            .next()
            .unwrap_or_default()
            .to_string(),
    };

    let segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
    let verify = segments.iter().position(|s| *s == "verify")?;
    let user_id = segments.get(verify + 1)?;
    let verification_token = segments.get(verify + 2)?;
    if user_id.is_empty() || verification_token.is_empty() {
        return None;
    }

    Some(TwoFactorChallenge {
        user_id: (*user_id).to_string(),
        verification_token: (*verification_token).to_string(),
    })
}
