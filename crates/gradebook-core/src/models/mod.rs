//! Data models
//!
//! Client-side session types plus the server-owned user, exercise and
//! submission records as they appear on the wire.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use crate::error::{Error, Result};

// ============================================================================
// Roles & Users
// ============================================================================

/// Platform role. Closed set; every check on it is an exhaustive match.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Student,
    Professor,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Student => "student",
            Role::Professor => "professor",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Role {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "student" => Ok(Role::Student),
            "professor" => Ok(Role::Professor),
            other => Err(Error::invalid_session(format!("Unknown role: {}", other))),
        }
    }
}

/// User record returned by `/auth/me` and `/auth/register`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct User {
    #[serde(deserialize_with = "wire::id_string")]
    pub id: String,
    pub email: String,
    #[serde(default)]
    pub full_name: Option<String>,
    pub role: Role,
    #[serde(default = "default_true")]
    pub is_active: bool,
}

fn default_true() -> bool {
    true
}

impl User {
    /// Name to show in the UI, falling back to the email address
    pub fn display_name(&self) -> String {
        self.full_name
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| self.email.clone())
    }
}

/// Registration form payload for `POST /auth/register`
#[derive(Debug, Clone, Serialize)]
pub struct RegisterRequest {
    pub email: String,
    pub password: String,
    pub full_name: String,
    pub role: Role,
}

impl RegisterRequest {
    /// Local checks run before anything goes over the network
    pub fn validate(&self) -> Result<()> {
        let email = self.email.trim();
        if email.is_empty() || !email.contains('@') {
            return Err(Error::validation("A valid email address is required"));
        }
        if self.password.is_empty() {
            return Err(Error::validation("Password is required"));
        }
        if self.full_name.trim().is_empty() {
            return Err(Error::validation("Full name is required"));
        }
        Ok(())
    }
}

/// Response of `POST /auth/token`
#[derive(Debug, Clone, Deserialize, PartialEq)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub token_type: Option<String>,
}

// ============================================================================
// Session
// ============================================================================

/// Client-held record of the authenticated user and their bearer token.
///
/// Fields are private: a session is only built through [`Session::new`], which
/// enforces a non-empty token and user id, and the role cannot change once
/// built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Session {
    user_id: String,
    role: Role,
    #[serde(skip_serializing)]
    token: String,
    display_name: Option<String>,
}

impl Session {
    pub fn new(
        user_id: impl Into<String>,
        role: Role,
        token: impl Into<String>,
        display_name: Option<String>,
    ) -> Result<Self> {
        let user_id = user_id.into();
        let token = token.into();

        if token.trim().is_empty() {
            return Err(Error::invalid_session("Session token is empty"));
        }
        if user_id.trim().is_empty() {
            return Err(Error::invalid_session("Session user id is empty"));
        }

        Ok(Self {
            user_id,
            role,
            token,
            display_name,
        })
    }

    /// Build a session from the profile returned after a token was issued
    pub fn from_user(user: &User, token: impl Into<String>) -> Result<Self> {
        Self::new(user.id.clone(), user.role, token, Some(user.display_name()))
    }

    pub fn user_id(&self) -> &str {
        &self.user_id
    }

    pub fn role(&self) -> Role {
        self.role
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    pub fn display_name(&self) -> Option<&str> {
        self.display_name.as_deref()
    }

    /// Value for the `Authorization` header
    pub fn bearer(&self) -> String {
        format!("Bearer {}", self.token)
    }
}

/// What observers of the session store see
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionState {
    /// Persisted state has not been read yet
    Pending,
    Anonymous,
    Active(Session),
}

impl SessionState {
    pub fn session(&self) -> Option<&Session> {
        match self {
            SessionState::Active(session) => Some(session),
            SessionState::Pending | SessionState::Anonymous => None,
        }
    }

    pub fn is_pending(&self) -> bool {
        matches!(self, SessionState::Pending)
    }
}

// ============================================================================
// Exercises
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExerciseType {
    Sql,
    Mcd,
    Mld,
    Algebra,
}

impl ExerciseType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExerciseType::Sql => "sql",
            ExerciseType::Mcd => "mcd",
            ExerciseType::Mld => "mld",
            ExerciseType::Algebra => "algebra",
        }
    }
}

impl fmt::Display for ExerciseType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ExerciseType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "sql" => Ok(ExerciseType::Sql),
            "mcd" => Ok(ExerciseType::Mcd),
            "mld" => Ok(ExerciseType::Mld),
            "algebra" => Ok(ExerciseType::Algebra),
            other => Err(Error::validation(format!(
                "Invalid exercise type: {}. Use sql, mcd, mld or algebra",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Exercise {
    pub id: i64,
    pub title: String,
    pub description: String,
    pub exercise_type: ExerciseType,
    #[serde(default, deserialize_with = "wire::optional_timestamp")]
    pub due_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub file_path: Option<String>,
    #[serde(default, deserialize_with = "wire::list_or_null")]
    pub corrections: Vec<serde_json::Value>,
    #[serde(default)]
    pub evaluation_criteria: Option<serde_json::Value>,
    #[serde(deserialize_with = "wire::timestamp")]
    pub created_at: DateTime<Utc>,
    pub professor_id: i64,
}

/// Query for `GET /exercises/search`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExerciseFilters {
    pub search: Option<String>,
    pub professor_id: Option<i64>,
    pub sort_by: Option<ExerciseSort>,
    pub sort_order: Option<SortOrder>,
    pub skip: Option<u32>,
    pub limit: Option<u32>,
}

impl ExerciseFilters {
    pub fn to_query(&self) -> Vec<(String, String)> {
        let mut query = Vec::new();
        if let Some(search) = self.search.as_deref().filter(|s| !s.is_empty()) {
            query.push(("search".to_string(), search.to_string()));
        }
        if let Some(id) = self.professor_id {
            query.push(("professor_id".to_string(), id.to_string()));
        }
        if let Some(sort) = self.sort_by {
            query.push(("sort_by".to_string(), sort.as_str().to_string()));
        }
        push_paging(&mut query, self.sort_order, self.skip, self.limit);
        query
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExerciseSort {
    CreatedAt,
    Title,
}

impl ExerciseSort {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExerciseSort::CreatedAt => "created_at",
            ExerciseSort::Title => "title",
        }
    }
}

impl FromStr for ExerciseSort {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "created_at" | "date" => Ok(ExerciseSort::CreatedAt),
            "title" => Ok(ExerciseSort::Title),
            other => Err(Error::validation(format!(
                "Invalid sort field: {}. Use 'created_at' or 'title'",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl SortOrder {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortOrder::Asc => "asc",
            SortOrder::Desc => "desc",
        }
    }
}

impl FromStr for SortOrder {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "asc" => Ok(SortOrder::Asc),
            "desc" => Ok(SortOrder::Desc),
            other => Err(Error::validation(format!(
                "Invalid sort order: {}. Use 'asc' or 'desc'",
                other
            ))),
        }
    }
}

fn push_paging(
    query: &mut Vec<(String, String)>,
    order: Option<SortOrder>,
    skip: Option<u32>,
    limit: Option<u32>,
) {
    if let Some(order) = order {
        query.push(("sort_order".to_string(), order.as_str().to_string()));
    }
    if let Some(skip) = skip {
        query.push(("skip".to_string(), skip.to_string()));
    }
    if let Some(limit) = limit {
        query.push(("limit".to_string(), limit.to_string()));
    }
}

// ============================================================================
// Submissions
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SubmissionStatus {
    Pending,
    Graded,
    Error,
    #[serde(other)]
    Other,
}

impl fmt::Display for SubmissionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            SubmissionStatus::Pending => "pending",
            SubmissionStatus::Graded => "graded",
            SubmissionStatus::Error => "error",
            SubmissionStatus::Other => "other",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Submission {
    pub id: i64,
    pub exercise_id: i64,
    pub file_path: String,
    pub student_id: i64,
    pub status: SubmissionStatus,
    #[serde(default)]
    pub grade: Option<f64>,
    #[serde(default)]
    pub feedback: Option<String>,
    #[serde(deserialize_with = "wire::timestamp")]
    pub created_at: DateTime<Utc>,
    #[serde(default)]
    pub exercise_title: Option<String>,
    #[serde(default)]
    pub student_name: Option<String>,
}

impl Submission {
    pub fn is_graded(&self) -> bool {
        self.status == SubmissionStatus::Graded
    }
}

/// Query for `GET /submissions/search`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SubmissionFilters {
    pub exercise_id: Option<i64>,
    pub student_id: Option<i64>,
    pub score_min: Option<f64>,
    pub score_max: Option<f64>,
    pub sort_by: Option<SubmissionSort>,
    pub sort_order: Option<SortOrder>,
    pub skip: Option<u32>,
    pub limit: Option<u32>,
}

impl SubmissionFilters {
    pub fn to_query(&self) -> Vec<(String, String)> {
        let mut query = Vec::new();
        if let Some(id) = self.exercise_id {
            query.push(("exercise_id".to_string(), id.to_string()));
        }
        if let Some(id) = self.student_id {
            query.push(("student_id".to_string(), id.to_string()));
        }
        if let Some(min) = self.score_min {
            query.push(("score_min".to_string(), min.to_string()));
        }
        if let Some(max) = self.score_max {
            query.push(("score_max".to_string(), max.to_string()));
        }
        if let Some(sort) = self.sort_by {
            query.push(("sort_by".to_string(), sort.as_str().to_string()));
        }
        push_paging(&mut query, self.sort_order, self.skip, self.limit);
        query
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SubmissionSort {
    SubmittedAt,
    Score,
}

impl SubmissionSort {
    pub fn as_str(&self) -> &'static str {
        match self {
            SubmissionSort::SubmittedAt => "submitted_at",
            SubmissionSort::Score => "score",
        }
    }
}

impl FromStr for SubmissionSort {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "submitted_at" | "date" => Ok(SubmissionSort::SubmittedAt),
            "score" | "grade" => Ok(SubmissionSort::Score),
            other => Err(Error::validation(format!(
                "Invalid sort field: {}. Use 'submitted_at' or 'score'",
                other
            ))),
        }
    }
}

// ============================================================================
// Statistics
// ============================================================================

/// `GET /statistics/exercise/{id}`; grades are on a 0-20 scale
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExerciseStats {
    pub exercise_id: i64,
    pub exercise_title: String,
    pub total_submissions: u64,
    pub average_score: f64,
    pub min_score: f64,
    pub max_score: f64,
    /// Keyed by range label: `0-5`, `5-10`, `10-15`, `15-20`
    #[serde(default)]
    pub submission_count_by_score_range: BTreeMap<String, u64>,
}

/// `GET /statistics/student/{id}`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StudentStats {
    pub total_submissions: u64,
    pub average_score: f64,
    pub completed_exercises: u64,
    #[serde(default)]
    pub score_evolution: Vec<ScorePoint>,
    #[serde(default)]
    pub performance_by_exercise: Vec<ExercisePerformance>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScorePoint {
    #[serde(deserialize_with = "wire::timestamp")]
    pub date: DateTime<Utc>,
    /// Ungraded submissions have no score yet
    #[serde(default)]
    pub score: Option<f64>,
    pub exercise: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExercisePerformance {
    pub exercise: String,
    #[serde(default)]
    pub average_score: Option<f64>,
    pub attempts: u64,
}

/// `GET /statistics/global`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GlobalStats {
    pub total_students: u64,
    pub total_exercises: u64,
    pub total_submissions: u64,
    pub average_score: f64,
    /// Last 30 days, oldest first
    #[serde(default)]
    pub submissions_per_day: Vec<DailyCount>,
    #[serde(default)]
    pub top_exercises: Vec<TopExercise>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DailyCount {
    pub date: NaiveDate,
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TopExercise {
    pub id: i64,
    pub title: String,
    pub submissions: u64,
    #[serde(default)]
    pub average_score: Option<f64>,
}

// ============================================================================
// Notifications
// ============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    NewExercise,
    SubmissionEvaluated,
    FeedbackUpdated,
    #[serde(other)]
    Other,
}

impl fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            NotificationKind::NewExercise => "new exercise",
            NotificationKind::SubmissionEvaluated => "submission evaluated",
            NotificationKind::FeedbackUpdated => "feedback updated",
            NotificationKind::Other => "other",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Notification {
    pub id: i64,
    pub user_id: i64,
    #[serde(rename = "type")]
    pub kind: NotificationKind,
    pub title: String,
    pub message: String,
    /// Application path the notification points at, e.g. `/submissions/4`
    #[serde(default)]
    pub link: Option<String>,
    #[serde(default)]
    pub read: bool,
    #[serde(deserialize_with = "wire::timestamp")]
    pub created_at: DateTime<Utc>,
}

/// Query for `GET /notifications`
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NotificationFilters {
    pub unread_only: bool,
    pub skip: Option<u32>,
    pub limit: Option<u32>,
}

impl NotificationFilters {
    pub fn to_query(&self) -> Vec<(String, String)> {
        let mut query = Vec::new();
        if self.unread_only {
            query.push(("unread_only".to_string(), "true".to_string()));
        }
        if let Some(skip) = self.skip {
            query.push(("skip".to_string(), skip.to_string()));
        }
        if let Some(limit) = self.limit {
            query.push(("limit".to_string(), limit.to_string()));
        }
        query
    }
}

// ============================================================================
// Wire helpers
// ============================================================================

mod wire {
    use chrono::{DateTime, NaiveDateTime, Utc};
    use serde::{de, Deserialize, Deserializer};

    /// Ids arrive as integers from the API but are stored as strings
    pub fn id_string<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Id {
            Int(i64),
            Str(String),
        }

        Ok(match Id::deserialize(d)? {
            Id::Int(n) => n.to_string(),
            Id::Str(s) => s,
        })
    }

    /// Server timestamps may be RFC 3339 or naive ISO 8601 (taken as UTC)
    pub fn parse_timestamp(s: &str) -> Option<DateTime<Utc>> {
        if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
            return Some(dt.with_timezone(&Utc));
        }
        NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f")
            .ok()
            .map(|naive| naive.and_utc())
    }

    pub fn timestamp<'de, D: Deserializer<'de>>(d: D) -> Result<DateTime<Utc>, D::Error> {
        let s = String::deserialize(d)?;
        parse_timestamp(&s).ok_or_else(|| de::Error::custom(format!("invalid timestamp: {}", s)))
    }

    pub fn optional_timestamp<'de, D: Deserializer<'de>>(
        d: D,
    ) -> Result<Option<DateTime<Utc>>, D::Error> {
        match Option::<String>::deserialize(d)? {
            Some(s) => parse_timestamp(&s)
                .map(Some)
                .ok_or_else(|| de::Error::custom(format!("invalid timestamp: {}", s))),
            None => Ok(None),
        }
    }

    pub fn list_or_null<'de, D: Deserializer<'de>>(
        d: D,
    ) -> Result<Vec<serde_json::Value>, D::Error> {
        Ok(Option::<Vec<serde_json::Value>>::deserialize(d)?.unwrap_or_default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_role_from_str() {
        assert_eq!("student".parse::<Role>().unwrap(), Role::Student);
        assert_eq!("Professor".parse::<Role>().unwrap(), Role::Professor);
        assert!("admin".parse::<Role>().is_err());
        assert!("".parse::<Role>().is_err());
    }

    #[test]
    fn test_role_serde_lowercase() {
        assert_eq!(serde_json::to_string(&Role::Professor).unwrap(), "\"professor\"");
        let role: Role = serde_json::from_str("\"student\"").unwrap();
        assert_eq!(role, Role::Student);
    }

    #[test]
    fn test_user_from_api_payload() {
        let user: User = serde_json::from_value(json!({
            "id": 7,
            "email": "ada@example.com",
            "full_name": "Ada Lovelace",
            "role": "professor"
        }))
        .unwrap();

        assert_eq!(user.id, "7");
        assert_eq!(user.role, Role::Professor);
        assert!(user.is_active);
        assert_eq!(user.display_name(), "Ada Lovelace");
    }

    #[test]
    fn test_user_display_name_falls_back_to_email() {
        let user: User = serde_json::from_value(json!({
            "id": "3", "email": "bob@example.com", "full_name": "  ", "role": "student"
        }))
        .unwrap();
        assert_eq!(user.display_name(), "bob@example.com");
    }

    #[test]
    fn test_session_rejects_empty_token() {
        assert!(Session::new("1", Role::Student, "", None).is_err());
        assert!(Session::new("1", Role::Student, "   ", None).is_err());
        assert!(Session::new("", Role::Student, "tok", None).is_err());
    }

    #[test]
    fn test_session_bearer_and_serialization_hides_token() {
        let session = Session::new("1", Role::Student, "abc", Some("Ann".into())).unwrap();
        assert_eq!(session.bearer(), "Bearer abc");

        let json = serde_json::to_value(&session).unwrap();
        assert!(json.get("token").is_none());
        assert_eq!(json["role"], "student");
    }

    #[test]
    fn test_register_request_validate() {
        let mut req = RegisterRequest {
            email: "new@example.com".into(),
            password: "secret".into(),
            full_name: "New Student".into(),
            role: Role::Student,
        };
        assert!(req.validate().is_ok());

        req.email = "not-an-email".into();
        assert!(matches!(req.validate(), Err(Error::Validation(_))));

        req.email = "new@example.com".into();
        req.password.clear();
        assert!(matches!(req.validate(), Err(Error::Validation(_))));
    }

    #[test]
    fn test_exercise_from_api_payload() {
        let exercise: Exercise = serde_json::from_value(json!({
            "id": 12,
            "title": "Jointures",
            "description": "Écrire les requêtes",
            "exercise_type": "sql",
            "due_date": null,
            "file_path": "exercises/abc.pdf",
            "corrections": null,
            "evaluation_criteria": {"syntax": 0.4},
            "created_at": "2024-03-01T10:15:30.123456",
            "professor_id": 2
        }))
        .unwrap();

        assert_eq!(exercise.exercise_type, ExerciseType::Sql);
        assert!(exercise.corrections.is_empty());
        assert_eq!(exercise.created_at.to_rfc3339(), "2024-03-01T10:15:30.123456+00:00");
    }

    #[test]
    fn test_submission_unknown_status() {
        let submission: Submission = serde_json::from_value(json!({
            "id": 1,
            "exercise_id": 12,
            "file_path": "submissions/x.pdf",
            "student_id": 5,
            "status": "evaluating",
            "created_at": "2024-03-02T08:00:00+01:00",
            "exercise_title": "Jointures"
        }))
        .unwrap();

        assert_eq!(submission.status, SubmissionStatus::Other);
        assert!(!submission.is_graded());
        assert_eq!(submission.created_at.to_rfc3339(), "2024-03-02T07:00:00+00:00");
    }

    #[test]
    fn test_exercise_filters_query() {
        let filters = ExerciseFilters {
            search: Some("sql".into()),
            sort_by: Some(ExerciseSort::Title),
            sort_order: Some(SortOrder::Asc),
            limit: Some(5),
            ..Default::default()
        };
        assert_eq!(
            filters.to_query(),
            vec![
                ("search".to_string(), "sql".to_string()),
                ("sort_by".to_string(), "title".to_string()),
                ("sort_order".to_string(), "asc".to_string()),
                ("limit".to_string(), "5".to_string()),
            ]
        );
    }

    #[test]
    fn test_submission_filters_query() {
        let filters = SubmissionFilters {
            exercise_id: Some(3),
            score_min: Some(10.5),
            sort_by: Some(SubmissionSort::Score),
            ..Default::default()
        };
        assert_eq!(
            filters.to_query(),
            vec![
                ("exercise_id".to_string(), "3".to_string()),
                ("score_min".to_string(), "10.5".to_string()),
                ("sort_by".to_string(), "score".to_string()),
            ]
        );
    }

    #[test]
    fn test_sort_parsing() {
        assert_eq!("TITLE".parse::<ExerciseSort>().unwrap(), ExerciseSort::Title);
        assert_eq!("grade".parse::<SubmissionSort>().unwrap(), SubmissionSort::Score);
        assert!("name".parse::<SubmissionSort>().is_err());
    }

    #[test]
    fn test_statistics_payloads() {
        let stats: StudentStats = serde_json::from_value(json!({
            "total_submissions": 2,
            "average_score": 12.5,
            "completed_exercises": 1,
            "score_evolution": [
                {"date": "2024-03-02T09:30:00", "score": 12.5, "exercise": "Jointures"},
                {"date": "2024-03-03T09:30:00", "score": null, "exercise": "Jointures"}
            ],
            "performance_by_exercise": [
                {"exercise": "Jointures", "average_score": 12.5, "attempts": 2}
            ]
        }))
        .unwrap();
        assert_eq!(stats.score_evolution.len(), 2);
        assert_eq!(stats.score_evolution[1].score, None);

        let global: GlobalStats = serde_json::from_value(json!({
            "total_students": 30, "total_exercises": 4, "total_submissions": 52,
            "average_score": 11.0,
            "submissions_per_day": [{"date": "2024-03-02", "count": 7}],
            "top_exercises": [{"id": 5, "title": "Jointures", "submissions": 20, "average_score": 13.1}]
        }))
        .unwrap();
        assert_eq!(
            global.submissions_per_day[0].date,
            NaiveDate::from_ymd_opt(2024, 3, 2).unwrap()
        );
    }

    #[test]
    fn test_notification_payload() {
        let notification: Notification = serde_json::from_value(json!({
            "id": 3, "user_id": 8, "type": "submission_evaluated",
            "title": "Copie notée", "message": "14/20", "link": "/submissions/11",
            "read": false, "created_at": "2024-03-04T12:00:00"
        }))
        .unwrap();
        assert_eq!(notification.kind, NotificationKind::SubmissionEvaluated);
        assert!(!notification.read);

        let filters = NotificationFilters {
            unread_only: true,
            limit: Some(10),
            ..Default::default()
        };
        assert_eq!(
            filters.to_query(),
            vec![
                ("unread_only".to_string(), "true".to_string()),
                ("limit".to_string(), "10".to_string()),
            ]
        );
    }
}
