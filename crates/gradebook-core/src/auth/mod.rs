//! Auth gateway
//!
//! Login, registration and logout against the remote API. The canonical
//! login contract is a form-encoded `POST /auth/token` followed by
//! `GET /auth/me` with the issued token; only when both succeed is the new
//! session handed to the store. Any failure leaves the prior state untouched.

use crate::client::{decode, ApiClient, ApiRequest, Credentials};
use crate::error::{self, Error, Result};
use crate::models::{RegisterRequest, Session, TokenResponse, User};
use crate::navigation::LOGIN_PATH;

pub const TOKEN_PATH: &str = "/auth/token";
pub const ME_PATH: &str = "/auth/me";
pub const REGISTER_PATH: &str = "/auth/register";

#[derive(Clone)]
pub struct AuthGateway {
    client: ApiClient,
}

impl AuthGateway {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    pub fn current_session(&self) -> Option<Session> {
        self.client.session().current()
    }

    /// Exchange credentials for a token, fetch the profile, start the session
    pub async fn login(&self, email: &str, password: &str) -> Result<Session> {
        let email = email.trim();
        if email.is_empty() || password.is_empty() {
            return Err(Error::validation("Email and password are required"));
        }

        // The token endpoint takes the email in the `username` field
        let request = ApiRequest::post(TOKEN_PATH).with_form(vec![
            ("username".to_string(), email.to_string()),
            ("password".to_string(), password.to_string()),
        ]);

        let response = self
            .client
            .execute(request, Credentials::Anonymous)
            .await
            .map_err(|e| match e {
                Error::Auth(msg) => Error::InvalidCredentials(msg),
                other => other,
            })?;

        let token: TokenResponse = decode(&response)?;
        if token.access_token.trim().is_empty() {
            return Err(Error::auth("Token missing from login response"));
        }

        let user = self
            .fetch_profile(Credentials::Token(token.access_token.clone()))
            .await?;
        if !user.is_active {
            return Err(Error::forbidden("Account is disabled"));
        }

        let session = Session::from_user(&user, token.access_token)?;
        self.client.session().replace(session.clone())?;

        log::info!("Logged in as user {} ({})", user.id, user.role);
        Ok(session)
    }

    /// Create the account, then log in with the same credentials
    pub async fn register(&self, request: &RegisterRequest) -> Result<Session> {
        request.validate()?;

        let body = serde_json::to_value(request)?;
        let response = self
            .client
            .execute_raw(
                ApiRequest::post(REGISTER_PATH).with_json(body),
                Credentials::Anonymous,
            )
            .await?;

        // The register endpoint answers 400 only for an already-used email
        if response.status == 400 {
            let message = error::normalize_detail(&response.text())
                .unwrap_or_else(|| "Email already registered".to_string());
            return Err(Error::DuplicateEmail(message));
        }
        if !response.is_success() {
            return Err(error::from_response(response.status, &response.text()));
        }

        let user: User = decode(&response)?;
        log::info!("Registered user {} as {}", user.id, user.role);

        self.login(&request.email, &request.password).await
    }

    /// End the session and wipe persisted credentials
    pub fn logout(&self) -> Result<()> {
        if let Some(session) = self.client.session().current() {
            log::info!("Logging out user {}", session.user_id());
        }
        self.client.session().clear()
    }

    /// Profile of the current session's user
    pub async fn me(&self) -> Result<User> {
        self.fetch_profile(Credentials::Session).await
    }

    /// Resolve the persisted session and confirm it with the server.
    ///
    /// Restores from storage first if the store is still pending. A 401 ends
    /// the session (via the client). Other failures are returned and the
    /// restored session stays. If the session changed while the profile was
    /// in flight, the stale profile is dropped. A profile whose user or role
    /// does not match the stored session ends it.
    pub async fn check_auth(&self) -> Result<Option<Session>> {
        let store = self.client.session();
        if store.state().is_pending() {
            store.restore()?;
        }

        let Some(current) = store.current() else {
            return Ok(None);
        };

        let user = match self.fetch_profile(Credentials::Session).await {
            Ok(user) => user,
            Err(Error::Auth(_)) => return Ok(None),
            Err(e) => return Err(e),
        };

        if store.token().as_deref() != Some(current.token()) {
            log::debug!("Discarding profile for a session that is no longer current");
            return Ok(store.current());
        }

        // Role and user are fixed for a session's lifetime
        if user.id != current.user_id() || user.role != current.role() {
            log::warn!(
                "Ending session: server profile differs from persisted session (user {} -> {})",
                current.user_id(),
                user.id
            );
            store.invalidate(current.token())?;
            self.client.navigator().navigate(LOGIN_PATH);
            return Ok(None);
        }

        let refreshed = Session::from_user(&user, current.token())?;
        store.replace(refreshed.clone())?;
        Ok(Some(refreshed))
    }

    async fn fetch_profile(&self, credentials: Credentials) -> Result<User> {
        let response = self
            .client
            .execute(ApiRequest::get(ME_PATH), credentials)
            .await?;
        decode(&response)
    }
}
