//! Exercise endpoints

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::{fetch_upload, require_role, Download};
use crate::client::{ApiClient, FilePart, MultipartForm};
use crate::error::{Error, Result};
use crate::models::{Exercise, ExerciseFilters, ExerciseType, Role};

const EXERCISES_PATH: &str = "/exercises";

/// Accepted deviation of the criteria weights from 1.0
const WEIGHT_TOLERANCE: f64 = 0.01;

/// One grading criterion; the server calls the weight `poids`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationCriterion {
    #[serde(rename = "poids")]
    pub weight: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewCorrection {
    pub description: String,
    pub file: Option<FilePart>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewExercise {
    pub title: String,
    pub description: String,
    pub exercise_type: ExerciseType,
    /// The statement PDF
    pub document: FilePart,
    pub corrections: Vec<NewCorrection>,
    pub criteria: BTreeMap<String, EvaluationCriterion>,
}

impl NewExercise {
    pub fn validate(&self) -> Result<()> {
        if self.title.trim().is_empty() {
            return Err(Error::validation("Title is required"));
        }
        if self.description.trim().is_empty() {
            return Err(Error::validation("Description is required"));
        }

        if self.criteria.is_empty() {
            return Err(Error::validation("At least one grading criterion is required"));
        }
        let total: f64 = self.criteria.values().map(|c| c.weight).sum();
        if (total - 1.0).abs() > WEIGHT_TOLERANCE {
            return Err(Error::validation(format!(
                "Criteria weights must sum to 1 (got {:.2})",
                total
            )));
        }

        // Correction files are paired with descriptions by position
        let mut seen_without_file = false;
        for (i, correction) in self.corrections.iter().enumerate() {
            match (&correction.file, seen_without_file) {
                (Some(_), true) => {
                    return Err(Error::validation(format!(
                        "Correction {} has a file but follows one without; list corrections with files first",
                        i + 1
                    )));
                }
                (None, _) => seen_without_file = true,
                (Some(_), false) => {}
            }
        }
        Ok(())
    }

    fn into_form(self) -> Result<MultipartForm> {
        let descriptions: Vec<&str> = self
            .corrections
            .iter()
            .map(|c| c.description.as_str())
            .collect();
        let descriptions = serde_json::to_string(&descriptions)?;
        let criteria = serde_json::to_string(&self.criteria)?;

        let mut form = MultipartForm::new()
            .text("title", self.title.trim())
            .text("description", self.description)
            .text("exercise_type", self.exercise_type.as_str())
            .text("corrections_descriptions", descriptions)
            .text("evaluation_criteria", criteria)
            .file(FilePart {
                field: "file".to_string(),
                ..self.document
            });

        for correction in self.corrections {
            if let Some(file) = correction.file {
                form = form.file(FilePart {
                    field: "corrections".to_string(),
                    ..file
                });
            }
        }
        Ok(form)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ExerciseUpdate {
    pub title: String,
    pub description: String,
    /// Replacement statement PDF
    pub document: Option<FilePart>,
}

#[derive(Clone)]
pub struct ExerciseService {
    client: ApiClient,
}

impl ExerciseService {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    /// Professors see their own exercises, students see all of them
    pub async fn list(&self) -> Result<Vec<Exercise>> {
        self.client.get(EXERCISES_PATH).await
    }

    pub async fn get(&self, id: i64) -> Result<Exercise> {
        self.client.get(&format!("{}/{}", EXERCISES_PATH, id)).await
    }

    pub async fn search(&self, filters: &ExerciseFilters) -> Result<Vec<Exercise>> {
        self.client
            .get_with_query(&format!("{}/search", EXERCISES_PATH), filters.to_query())
            .await
    }

    pub async fn create(&self, exercise: NewExercise) -> Result<Exercise> {
        require_role(&self.client, Role::Professor, "create exercises")?;
        exercise.validate()?;

        let created: Exercise = self
            .client
            .post_multipart(EXERCISES_PATH, exercise.into_form()?)
            .await?;
        log::info!("Created exercise {} ({})", created.id, created.title);
        Ok(created)
    }

    pub async fn update(&self, id: i64, update: ExerciseUpdate) -> Result<Exercise> {
        require_role(&self.client, Role::Professor, "edit exercises")?;
        if update.title.trim().is_empty() {
            return Err(Error::validation("Title is required"));
        }

        let mut form = MultipartForm::new()
            .text("title", update.title.trim())
            .text("description", update.description);
        if let Some(document) = update.document {
            form = form.file(FilePart {
                field: "file".to_string(),
                ..document
            });
        }

        self.client
            .put_multipart(&format!("{}/{}", EXERCISES_PATH, id), form)
            .await
    }

    /// Fetch the statement PDF of an exercise
    pub async fn download(&self, id: i64) -> Result<Download> {
        let exercise = self.get(id).await?;
        let Some(file_path) = exercise.file_path.as_deref() else {
            return Err(Error::NotFound(format!("Exercise {} has no statement file", id)));
        };
        fetch_upload(&self.client, file_path).await
    }

    pub async fn delete(&self, id: i64) -> Result<()> {
        require_role(&self.client, Role::Professor, "delete exercises")?;
        self.client
            .delete(&format!("{}/{}", EXERCISES_PATH, id))
            .await?;
        log::info!("Deleted exercise {}", id);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::testing::ScriptedTransport;
    use crate::client::{Method, RequestBody};
    use crate::models::{Session, SortOrder};
    use crate::navigation::NoopNavigator;
    use crate::session::SessionStore;
    use std::sync::Arc;

    const EXERCISE: &str = r#"{
        "id": 5, "title": "Jointures", "description": "SQL", "exercise_type": "sql",
        "file_path": "exercises/2/a.pdf", "corrections": [], "evaluation_criteria": {},
        "created_at": "2024-03-01T10:00:00", "professor_id": 2
    }"#;

    fn service(role: Role, transport: ScriptedTransport) -> (ExerciseService, Arc<ScriptedTransport>) {
        let store = SessionStore::in_memory();
        store
            .replace(Session::new("2", role, "tok", None).unwrap())
            .unwrap();
        let transport = Arc::new(transport);
        let client = ApiClient::new(transport.clone(), store, Arc::new(NoopNavigator));
        (ExerciseService::new(client), transport)
    }

    fn pdf(name: &str) -> FilePart {
        FilePart::pdf_bytes("file", name, b"%PDF".to_vec()).unwrap()
    }

    fn criterion(weight: f64) -> EvaluationCriterion {
        EvaluationCriterion {
            weight,
            description: None,
        }
    }

    fn new_exercise() -> NewExercise {
        NewExercise {
            title: "Jointures".into(),
            description: "SQL".into(),
            exercise_type: ExerciseType::Sql,
            document: pdf("statement.pdf"),
            corrections: vec![
                NewCorrection {
                    description: "Corrigé".into(),
                    file: Some(pdf("answer.pdf")),
                },
                NewCorrection {
                    description: "Notes orales".into(),
                    file: None,
                },
            ],
            criteria: BTreeMap::from([
                ("syntax".to_string(), criterion(0.4)),
                ("result".to_string(), criterion(0.6)),
            ]),
        }
    }

    #[tokio::test]
    async fn test_create_sends_multipart() {
        let (service, transport) = service(Role::Professor, ScriptedTransport::new().respond(200, EXERCISE));

        let created = service.create(new_exercise()).await.unwrap();
        assert_eq!(created.id, 5);

        let sent = &transport.requests()[0];
        assert_eq!(sent.method, Method::Post);
        let RequestBody::Multipart(form) = &sent.body else {
            panic!("expected multipart body");
        };
        let field = |name: &str| {
            form.fields
                .iter()
                .find(|(k, _)| k == name)
                .map(|(_, v)| v.clone())
        };
        assert_eq!(field("exercise_type").as_deref(), Some("sql"));
        assert_eq!(
            field("corrections_descriptions").as_deref(),
            Some(r#"["Corrigé","Notes orales"]"#)
        );
        let criteria: serde_json::Value =
            serde_json::from_str(&field("evaluation_criteria").unwrap()).unwrap();
        assert_eq!(criteria["syntax"]["poids"], 0.4);

        let files: Vec<(&str, &str)> = form
            .files
            .iter()
            .map(|f| (f.field.as_str(), f.file_name.as_str()))
            .collect();
        assert_eq!(files, vec![("file", "statement.pdf"), ("corrections", "answer.pdf")]);
    }

    #[tokio::test]
    async fn test_create_requires_professor() {
        let (service, transport) = service(Role::Student, ScriptedTransport::new());
        let err = service.create(new_exercise()).await.unwrap_err();
        assert!(matches!(err, Error::Forbidden(_)));
        assert!(transport.requests().is_empty());
    }

    #[test]
    fn test_validate_weights() {
        let mut exercise = new_exercise();
        exercise.criteria.insert("style".into(), criterion(0.2));
        assert!(matches!(exercise.validate(), Err(Error::Validation(_))));

        let mut exercise = new_exercise();
        exercise.criteria = BTreeMap::from([("a".to_string(), criterion(0.995))]);
        assert!(exercise.validate().is_ok());
    }

    #[tokio::test]
    async fn test_create_without_criteria_is_rejected_locally() {
        let (service, transport) = service(Role::Professor, ScriptedTransport::new());
        let mut exercise = new_exercise();
        exercise.criteria.clear();

        let err = service.create(exercise).await.unwrap_err();
        assert!(matches!(err, Error::Validation(ref m) if m.contains("criterion")));
        assert!(transport.requests().is_empty());
    }

    #[test]
    fn test_validate_correction_order() {
        let mut exercise = new_exercise();
        exercise.corrections.reverse();
        assert!(matches!(exercise.validate(), Err(Error::Validation(_))));
    }

    #[tokio::test]
    async fn test_search_passes_filters() {
        let (service, transport) = service(Role::Student, ScriptedTransport::new().respond(200, "[]"));
        let filters = ExerciseFilters {
            search: Some("join".into()),
            sort_order: Some(SortOrder::Asc),
            ..Default::default()
        };

        assert!(service.search(&filters).await.unwrap().is_empty());

        let sent = &transport.requests()[0];
        assert_eq!(sent.path, "/exercises/search");
        assert_eq!(sent.query, filters.to_query());
    }

    #[tokio::test]
    async fn test_update_with_optional_document() {
        let (service, transport) = service(Role::Professor, ScriptedTransport::new().respond(200, EXERCISE));
        service
            .update(
                5,
                ExerciseUpdate {
                    title: "Jointures".into(),
                    description: "SQL".into(),
                    document: None,
                },
            )
            .await
            .unwrap();

        let sent = &transport.requests()[0];
        assert_eq!(sent.method, Method::Put);
        assert_eq!(sent.path, "/exercises/5");
        let RequestBody::Multipart(form) = &sent.body else {
            panic!("expected multipart body");
        };
        assert!(form.files.is_empty());
    }

    #[tokio::test]
    async fn test_download_fetches_statement() {
        let (service, transport) = service(
            Role::Student,
            ScriptedTransport::new()
                .respond(200, EXERCISE)
                .respond(200, "%PDF-1.4"),
        );

        let download = service.download(5).await.unwrap();
        assert_eq!(download.file_name, "a.pdf");
        assert_eq!(download.bytes, b"%PDF-1.4");

        let sent = transport.requests();
        assert_eq!(sent[1].path, "/uploads/exercises/2/a.pdf");
        assert_eq!(sent[1].authorization().as_deref(), Some("Bearer tok"));
    }

    #[tokio::test]
    async fn test_get_not_found() {
        let (service, _) = service(
            Role::Student,
            ScriptedTransport::new().respond(404, r#"{"detail": "Exercice non trouvé"}"#),
        );
        let err = service.get(99).await.unwrap_err();
        assert!(matches!(err, Error::NotFound(ref m) if m == "Exercice non trouvé"));
    }
}
