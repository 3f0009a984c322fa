//! Services module
//!
//! Typed wrappers over the exercise, submission, statistics and
//! notification endpoints.

pub mod exercises;
pub mod notifications;
pub mod statistics;
pub mod submissions;

pub use exercises::{EvaluationCriterion, ExerciseService, ExerciseUpdate, NewCorrection, NewExercise};
pub use notifications::NotificationService;
pub use statistics::StatisticsService;
pub use submissions::SubmissionService;

use crate::client::ApiClient;
use crate::error::{Error, Result};
use crate::models::{Role, Session};
use crate::navigation::LOGIN_PATH;

/// The active session, or a trip to `/login`
fn require_session(client: &ApiClient) -> Result<Session> {
    client.session().current().ok_or_else(|| {
        client.navigator().navigate(LOGIN_PATH);
        Error::auth("Not logged in")
    })
}

/// Local role check before a request the server would reject anyway
fn require_role(client: &ApiClient, role: Role, action: &str) -> Result<Session> {
    let session = require_session(client)?;

    match (role, session.role()) {
        (Role::Professor, Role::Professor) | (Role::Student, Role::Student) => Ok(session),
        (Role::Professor, Role::Student) | (Role::Student, Role::Professor) => Err(
            Error::forbidden(format!("Only {}s can {}", role, action)),
        ),
    }
}

const UPLOADS_PATH: &str = "/uploads";

/// A file fetched from the server's upload area
#[derive(Clone, PartialEq)]
pub struct Download {
    /// Last segment of the stored path
    pub file_name: String,
    pub bytes: Vec<u8>,
}

impl std::fmt::Debug for Download {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Download")
            .field("file_name", &self.file_name)
            .field("len", &self.bytes.len())
            .finish()
    }
}

/// Fetch `file_path` (relative to the upload area, as stored on a record)
async fn fetch_upload(client: &ApiClient, file_path: &str) -> Result<Download> {
    let relative = file_path.trim().trim_start_matches('/');
    let segments: Vec<&str> = relative.split('/').collect();
    if relative.is_empty() || segments.iter().any(|s| s.is_empty() || *s == "..") {
        return Err(Error::validation(format!("Invalid file path: {}", file_path)));
    }
    let file_name = segments.last().copied().unwrap_or(relative).to_string();

    let bytes = client
        .get_bytes(&format!("{}/{}", UPLOADS_PATH, relative))
        .await?;
    log::debug!("Downloaded {} ({} bytes)", relative, bytes.len());
    Ok(Download { file_name, bytes })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::testing::ScriptedTransport;
    use crate::navigation::History;
    use crate::session::SessionStore;
    use std::sync::Arc;

    fn anonymous_client() -> (ApiClient, Arc<ScriptedTransport>, Arc<History>) {
        let store = SessionStore::in_memory();
        store.restore().unwrap();
        let transport = Arc::new(ScriptedTransport::new());
        let history = Arc::new(History::new());
        let client = ApiClient::new(transport.clone(), store, history.clone());
        (client, transport, history)
    }

    #[test]
    fn test_missing_session_redirects_to_login() {
        let (client, _, history) = anonymous_client();

        let err = require_role(&client, Role::Student, "submit answers").unwrap_err();
        assert!(err.is_unauthorized());
        assert_eq!(history.current().as_deref(), Some(LOGIN_PATH));
    }

    #[tokio::test]
    async fn test_upload_path_is_checked_before_request() {
        let (client, transport, _) = anonymous_client();

        for path in ["", "/", "../etc/passwd", "exercises//a.pdf"] {
            let err = fetch_upload(&client, path).await.unwrap_err();
            assert!(matches!(err, Error::Validation(_)), "{:?}", path);
        }
        assert!(transport.requests().is_empty());
    }
}
