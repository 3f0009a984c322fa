//! Application context
//!
//! [`Gradebook`] bundles the session store, API client, auth gateway and
//! endpoint services. Construction restores the persisted session; logout tears it
//! down again.

use std::sync::Arc;

use crate::auth::AuthGateway;
use crate::client::{ApiClient, HttpTransport, Transport};
use crate::config::ClientConfig;
use crate::error::Result;
use crate::guard::{self, Resolution};
use crate::models::{Session, SessionState};
use crate::navigation::Navigator;
use crate::services::{
    ExerciseService, NotificationService, StatisticsService, SubmissionService,
};
use crate::session::{FileStorage, SessionStore};

#[derive(Clone)]
pub struct Gradebook {
    client: ApiClient,
    auth: AuthGateway,
    exercises: ExerciseService,
    submissions: SubmissionService,
    statistics: StatisticsService,
    notifications: NotificationService,
}

impl Gradebook {
    /// Wire an HTTP client and file-backed session from configuration
    pub fn init(config: &ClientConfig, navigator: Arc<dyn Navigator>) -> Result<Self> {
        let transport = HttpTransport::new(&config.api_url, config.timeout())?;
        let session = SessionStore::new(FileStorage::new(&config.session_path));

        log::debug!(
            "Initializing client for {} (session file {})",
            config.api_url,
            config.session_path.display()
        );

        Ok(Self::with_parts(Arc::new(transport), session, navigator))
    }

    /// Wire injected parts and restore the session from its storage
    pub fn with_parts(
        transport: Arc<dyn Transport>,
        session: SessionStore,
        navigator: Arc<dyn Navigator>,
    ) -> Self {
        // An unreadable session file leaves the store anonymous and is reset
        if let Err(e) = session.restore() {
            log::warn!("Could not restore session: {}", e);
        }

        let client = ApiClient::new(transport, session, navigator);
        Self {
            auth: AuthGateway::new(client.clone()),
            exercises: ExerciseService::new(client.clone()),
            submissions: SubmissionService::new(client.clone()),
            statistics: StatisticsService::new(client.clone()),
            notifications: NotificationService::new(client.clone()),
            client,
        }
    }

    pub fn session(&self) -> &SessionStore {
        self.client.session()
    }

    pub fn state(&self) -> SessionState {
        self.session().state()
    }

    pub fn current_session(&self) -> Option<Session> {
        self.session().current()
    }

    pub fn client(&self) -> &ApiClient {
        &self.client
    }

    pub fn auth(&self) -> &AuthGateway {
        &self.auth
    }

    pub fn exercises(&self) -> &ExerciseService {
        &self.exercises
    }

    pub fn submissions(&self) -> &SubmissionService {
        &self.submissions
    }

    pub fn statistics(&self) -> &StatisticsService {
        &self.statistics
    }

    pub fn notifications(&self) -> &NotificationService {
        &self.notifications
    }

    /// Re-validate the restored session against the server
    pub async fn check_auth(&self) -> Result<Option<Session>> {
        self.auth.check_auth().await
    }

    pub fn logout(&self) -> Result<()> {
        self.auth.logout()
    }

    /// Resolve `path` against the current session and follow any redirect
    pub fn visit(&self, path: &str) -> Resolution {
        let resolution = guard::resolve(path, &self.state());
        if let Resolution::Redirect(target) = resolution {
            self.client.navigator().navigate(target);
        }
        resolution
    }
}
