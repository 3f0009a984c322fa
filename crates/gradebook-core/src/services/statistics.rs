//! Statistics endpoints
//!
//! Exercise and global figures are for professors. Students may only read
//! their own figures; professors may read any student's.

use super::{require_role, require_session};
use crate::client::ApiClient;
use crate::error::{Error, Result};
use crate::models::{ExerciseStats, GlobalStats, Role, StudentStats};

const STATISTICS_PATH: &str = "/statistics";

#[derive(Clone)]
pub struct StatisticsService {
    client: ApiClient,
}

impl StatisticsService {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    pub async fn exercise(&self, exercise_id: i64) -> Result<ExerciseStats> {
        require_role(&self.client, Role::Professor, "view exercise statistics")?;
        self.client
            .get(&format!("{}/exercise/{}", STATISTICS_PATH, exercise_id))
            .await
    }

    /// Figures for `student_id`, or for the current user when `None`
    pub async fn student(&self, student_id: Option<&str>) -> Result<StudentStats> {
        let session = require_session(&self.client)?;
        let student_id = student_id.unwrap_or(session.user_id());

        match session.role() {
            Role::Student if student_id != session.user_id() => {
                return Err(Error::forbidden("Students can only view their own statistics"));
            }
            Role::Student | Role::Professor => {}
        }

        self.client
            .get(&format!("{}/student/{}", STATISTICS_PATH, student_id))
            .await
    }

    pub async fn global(&self) -> Result<GlobalStats> {
        require_role(&self.client, Role::Professor, "view global statistics")?;
        self.client
            .get(&format!("{}/global", STATISTICS_PATH))
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::testing::ScriptedTransport;
    use crate::models::Session;
    use crate::navigation::NoopNavigator;
    use crate::session::SessionStore;
    use std::sync::Arc;

    const STUDENT_STATS: &str = r#"{
        "total_submissions": 3, "average_score": 13.0, "completed_exercises": 2,
        "score_evolution": [], "performance_by_exercise": []
    }"#;

    fn service(
        user_id: &str,
        role: Role,
        transport: ScriptedTransport,
    ) -> (StatisticsService, Arc<ScriptedTransport>) {
        let store = SessionStore::in_memory();
        store
            .replace(Session::new(user_id, role, "tok", None).unwrap())
            .unwrap();
        let transport = Arc::new(transport);
        let client = ApiClient::new(transport.clone(), store, Arc::new(NoopNavigator));
        (StatisticsService::new(client), transport)
    }

    #[tokio::test]
    async fn test_student_defaults_to_own_figures() {
        let (service, transport) =
            service("8", Role::Student, ScriptedTransport::new().respond(200, STUDENT_STATS));

        let stats = service.student(None).await.unwrap();
        assert_eq!(stats.completed_exercises, 2);
        assert_eq!(transport.requests()[0].path, "/statistics/student/8");
    }

    #[tokio::test]
    async fn test_student_cannot_read_others() {
        let (service, transport) = service("8", Role::Student, ScriptedTransport::new());

        let err = service.student(Some("9")).await.unwrap_err();
        assert!(matches!(err, Error::Forbidden(_)));
        assert!(transport.requests().is_empty());
    }

    #[tokio::test]
    async fn test_professor_reads_any_student() {
        let (service, transport) =
            service("2", Role::Professor, ScriptedTransport::new().respond(200, STUDENT_STATS));

        service.student(Some("9")).await.unwrap();
        assert_eq!(transport.requests()[0].path, "/statistics/student/9");
    }

    #[tokio::test]
    async fn test_exercise_and_global_need_professor() {
        let (service, transport) = service("8", Role::Student, ScriptedTransport::new());

        assert!(matches!(service.exercise(5).await, Err(Error::Forbidden(_))));
        assert!(matches!(service.global().await, Err(Error::Forbidden(_))));
        assert!(transport.requests().is_empty());
    }

    #[tokio::test]
    async fn test_exercise_ranges() {
        let body = r#"{
            "exercise_id": 5, "exercise_title": "Jointures", "total_submissions": 4,
            "average_score": 11.5, "min_score": 4.0, "max_score": 18.0,
            "submission_count_by_score_range": {"0-5": 1, "5-10": 0, "10-15": 2, "15-20": 1}
        }"#;
        let (service, _) = service("2", Role::Professor, ScriptedTransport::new().respond(200, body));

        let stats = service.exercise(5).await.unwrap();
        assert_eq!(stats.submission_count_by_score_range["10-15"], 2);
    }
}
