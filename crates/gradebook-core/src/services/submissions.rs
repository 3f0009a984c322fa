//! Submission endpoints

use super::{fetch_upload, require_role, Download};
use crate::client::{ApiClient, FilePart, MultipartForm};
use crate::error::Result;
use crate::models::{Role, Submission, SubmissionFilters};

const SUBMISSIONS_PATH: &str = "/submissions";

#[derive(Clone)]
pub struct SubmissionService {
    client: ApiClient,
}

impl SubmissionService {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    /// Students see their own submissions, professors see all of them
    pub async fn list(&self) -> Result<Vec<Submission>> {
        self.client.get(SUBMISSIONS_PATH).await
    }

    pub async fn get(&self, id: i64) -> Result<Submission> {
        self.client.get(&format!("{}/{}", SUBMISSIONS_PATH, id)).await
    }

    pub async fn search(&self, filters: &SubmissionFilters) -> Result<Vec<Submission>> {
        self.client
            .get_with_query(&format!("{}/search", SUBMISSIONS_PATH), filters.to_query())
            .await
    }

    /// Upload a PDF answer to an exercise
    pub async fn submit(&self, exercise_id: i64, answer: FilePart) -> Result<Submission> {
        require_role(&self.client, Role::Student, "submit answers")?;

        let form = MultipartForm::new()
            .text("exercise_id", exercise_id.to_string())
            .file(FilePart {
                field: "file".to_string(),
                ..answer
            });

        let submission: Submission = self.client.post_multipart(SUBMISSIONS_PATH, form).await?;
        log::info!(
            "Submitted answer {} for exercise {}",
            submission.id,
            exercise_id
        );
        Ok(submission)
    }

    /// Fetch the answer PDF of a submission
    pub async fn download(&self, id: i64) -> Result<Download> {
        let submission = self.get(id).await?;
        fetch_upload(&self.client, &submission.file_path).await
    }

    /// Graded submissions are refused by the server
    pub async fn delete(&self, id: i64) -> Result<()> {
        self.client
            .delete(&format!("{}/{}", SUBMISSIONS_PATH, id))
            .await
    }
}
