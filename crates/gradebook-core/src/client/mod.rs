//! API client
//!
//! Attaches the bearer token to outbound requests and owns the process-wide
//! reaction to a 401: the session is cleared and the user is sent to
//! `/login`. There is no retry.

pub mod transport;

use serde::{de::DeserializeOwned, Serialize};
use std::sync::Arc;

use crate::error::{self, Result};
use crate::navigation::{Navigator, LOGIN_PATH};
use crate::session::SessionStore;

pub use transport::{
    ApiRequest, ApiResponse, FilePart, HttpTransport, Method, MultipartForm, RequestBody,
    Transport,
};

/// Which token a request carries
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Credentials {
    /// The session store's current token, if any. A 401 ends the session.
    Session,
    /// An explicit token not yet owned by the store
    Token(String),
    Anonymous,
}

#[derive(Clone)]
pub struct ApiClient {
    transport: Arc<dyn Transport>,
    session: SessionStore,
    navigator: Arc<dyn Navigator>,
}

impl ApiClient {
    pub fn new(
        transport: Arc<dyn Transport>,
        session: SessionStore,
        navigator: Arc<dyn Navigator>,
    ) -> Self {
        Self {
            transport,
            session,
            navigator,
        }
    }

    pub fn session(&self) -> &SessionStore {
        &self.session
    }

    pub fn navigator(&self) -> &dyn Navigator {
        self.navigator.as_ref()
    }

    /// Send a request and return the response whatever its status.
    ///
    /// A 401 on a [`Credentials::Session`] request still triggers session
    /// invalidation before the response is handed back.
    pub async fn execute_raw(
        &self,
        mut request: ApiRequest,
        credentials: Credentials,
    ) -> Result<ApiResponse> {
        let uses_session = credentials == Credentials::Session;
        request.bearer = match credentials {
            Credentials::Session => self.session.token(),
            Credentials::Token(token) => Some(token),
            Credentials::Anonymous => None,
        };
        let sent_token = request.bearer.clone();

        let response = self.transport.send(request).await?;

        if response.status == 401 && uses_session {
            self.handle_unauthorized(sent_token.as_deref());
        }

        Ok(response)
    }

    /// Send a request; non-2xx statuses become tagged errors
    pub async fn execute(
        &self,
        request: ApiRequest,
        credentials: Credentials,
    ) -> Result<ApiResponse> {
        let response = self.execute_raw(request, credentials).await?;
        if response.is_success() {
            Ok(response)
        } else {
            Err(error::from_response(response.status, &response.text()))
        }
    }

    fn handle_unauthorized(&self, sent_token: Option<&str>) {
        if let Some(token) = sent_token {
            if let Err(e) = self.session.invalidate(token) {
                log::error!("Failed to clear session after 401: {}", e);
            }
        }

        // A newer session may have replaced the one this request used
        if !self.session.is_authenticated() {
            self.navigator.navigate(LOGIN_PATH);
        }
    }

    pub async fn get<T: DeserializeOwned>(&self, path: &str) -> Result<T> {
        let response = self
            .execute(ApiRequest::get(path), Credentials::Session)
            .await?;
        decode(&response)
    }

    pub async fn get_with_query<T: DeserializeOwned>(
        &self,
        path: &str,
        query: Vec<(String, String)>,
    ) -> Result<T> {
        let request = ApiRequest::get(path).with_query(query);
        let response = self.execute(request, Credentials::Session).await?;
        decode(&response)
    }

    pub async fn post_json<B, T>(&self, path: &str, body: &B) -> Result<T>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let request = ApiRequest::post(path).with_json(serde_json::to_value(body)?);
        let response = self.execute(request, Credentials::Session).await?;
        decode(&response)
    }

    pub async fn post_multipart<T: DeserializeOwned>(
        &self,
        path: &str,
        form: MultipartForm,
    ) -> Result<T> {
        let request = ApiRequest::post(path).with_multipart(form);
        let response = self.execute(request, Credentials::Session).await?;
        decode(&response)
    }

    pub async fn put_multipart<T: DeserializeOwned>(
        &self,
        path: &str,
        form: MultipartForm,
    ) -> Result<T> {
        let request = ApiRequest::put(path).with_multipart(form);
        let response = self.execute(request, Credentials::Session).await?;
        decode(&response)
    }

    /// `PUT` without a body; the response body is ignored
    pub async fn put(&self, path: &str) -> Result<()> {
        self.execute(ApiRequest::put(path), Credentials::Session)
            .await?;
        Ok(())
    }

    /// Raw bytes of a `GET`, for file downloads
    pub async fn get_bytes(&self, path: &str) -> Result<Vec<u8>> {
        let response = self
            .execute(ApiRequest::get(path), Credentials::Session)
            .await?;
        Ok(response.body)
    }

    pub async fn delete(&self, path: &str) -> Result<()> {
        self.execute(ApiRequest::delete(path), Credentials::Session)
            .await?;
        Ok(())
    }
}

/// Deserialize a JSON response body
pub fn decode<T: DeserializeOwned>(response: &ApiResponse) -> Result<T> {
    Ok(serde_json::from_slice(&response.body)?)
}


#[cfg(test)]
mod tests {
    use super::testing::ScriptedTransport;
    use super::*;
    use crate::error::Error;
    use crate::models::{Role, Session};
    use crate::navigation::History;

    fn setup(transport: ScriptedTransport) -> (ApiClient, Arc<ScriptedTransport>, Arc<History>) {
        let transport = Arc::new(transport);
        let history = Arc::new(History::new());
        let client = ApiClient::new(transport.clone(), SessionStore::in_memory(), history.clone());
        (client, transport, history)
    }

    fn login(client: &ApiClient, token: &str) {
        let session = Session::new("9", Role::Professor, token, None).unwrap();
        client.session().replace(session).unwrap();
    }

    #[tokio::test]
    async fn test_attaches_bearer_token() {
        let (client, transport, _) = setup(ScriptedTransport::new().respond(200, "[]"));
        login(&client, "tok-1");

        let items: Vec<serde_json::Value> = client.get("/exercises").await.unwrap();
        assert!(items.is_empty());

        let sent = transport.requests();
        assert_eq!(sent[0].authorization().as_deref(), Some("Bearer tok-1"));
    }

    #[tokio::test]
    async fn test_no_token_without_session() {
        let (client, transport, _) = setup(ScriptedTransport::new().respond(200, "[]"));

        let _: Vec<serde_json::Value> = client.get("/exercises").await.unwrap();
        assert_eq!(transport.requests()[0].bearer, None);
    }

    #[tokio::test]
    async fn test_401_clears_session_and_redirects() {
        let (client, _, history) =
            setup(ScriptedTransport::new().respond(401, r#"{"detail": "Could not validate"}"#));
        login(&client, "tok-1");

        let err = client.delete("/submissions/3").await.unwrap_err();

        assert!(matches!(err, Error::Auth(ref m) if m == "Could not validate"));
        assert!(!client.session().is_authenticated());
        assert_eq!(history.current().as_deref(), Some(LOGIN_PATH));
    }

    #[tokio::test]
    async fn test_stale_401_keeps_newer_session() {
        let (client, _, history) = setup(ScriptedTransport::new());
        login(&client, "tok-newer");

        // Response for a token the store no longer holds
        client.handle_unauthorized(Some("tok-old"));

        assert!(client.session().is_authenticated());
        assert!(history.entries().is_empty());
    }

    #[tokio::test]
    async fn test_401_without_session_still_redirects() {
        let (client, _, history) = setup(ScriptedTransport::new().respond(401, ""));
        client.session().restore().unwrap();

        let err = client.delete("/submissions/1").await.unwrap_err();
        assert!(err.is_unauthorized());
        assert_eq!(history.current().as_deref(), Some(LOGIN_PATH));
    }

    #[tokio::test]
    async fn test_401_with_explicit_token_leaves_session() {
        let (client, _, history) = setup(ScriptedTransport::new().respond(401, ""));
        login(&client, "tok-1");

        let err = client
            .execute(ApiRequest::get("/auth/me"), Credentials::Token("other".into()))
            .await
            .unwrap_err();

        assert!(err.is_unauthorized());
        assert!(client.session().is_authenticated());
        assert!(history.entries().is_empty());
    }

    #[tokio::test]
    async fn test_non_401_errors_are_mapped() {
        let (client, _, history) = setup(
            ScriptedTransport::new()
                .respond(403, r#"{"detail": "Seuls les professeurs"}"#)
                .respond(500, "")
                .fail("Connection failed"),
        );
        login(&client, "tok");

        let err = client.delete("/exercises/1").await.unwrap_err();
        assert!(matches!(err, Error::Forbidden(_)));

        let err = client.delete("/exercises/1").await.unwrap_err();
        assert!(matches!(err, Error::Server { status: 500, .. }));

        let err = client.delete("/exercises/1").await.unwrap_err();
        assert!(matches!(err, Error::Network(_)));

        assert!(client.session().is_authenticated());
        assert!(history.entries().is_empty());
    }

    #[tokio::test]
    async fn test_undecodable_body_is_json_error() {
        let (client, _, _) = setup(ScriptedTransport::new().respond(200, "<html>"));
        let result: Result<Vec<serde_json::Value>> = client.get("/exercises").await;
        assert!(matches!(result, Err(Error::Json(_))));
    }
}
