//! Submission commands
//!
//! Commands for submitting PDF answers and browsing submissions.

use anyhow::Result;
use clap::Subcommand;
use serde::Serialize;
use std::path::PathBuf;
use tabled::Tabled;

use gradebook_core::{FilePart, SortOrder, Submission, SubmissionFilters, SubmissionSort};

use super::{save_download, Context};
use crate::output::{
    or_dash, print_info, print_json, print_output, print_single, print_success, truncate,
    OutputFormat,
};

#[derive(Subcommand)]
pub enum SubmissionAction {
    /// List submissions visible to the current user
    List,

    /// Search submissions
    Search {
        /// Only submissions for this exercise
        #[arg(short, long)]
        exercise: Option<i64>,

        /// Only submissions by this student
        #[arg(short, long)]
        student: Option<i64>,

        /// Minimum grade
        #[arg(long)]
        min: Option<f64>,

        /// Maximum grade
        #[arg(long)]
        max: Option<f64>,

        /// Sort field: submitted_at or score
        #[arg(long)]
        sort: Option<SubmissionSort>,

        /// Sort order: asc or desc
        #[arg(long)]
        order: Option<SortOrder>,

        /// Number of results to skip
        #[arg(long)]
        skip: Option<u32>,

        /// Maximum number of results
        #[arg(short, long)]
        limit: Option<u32>,
    },

    /// Show submission details
    Show {
        /// Submission ID
        id: i64,
    },

    /// Submit a PDF answer (students only)
    Submit {
        /// Exercise ID
        exercise_id: i64,

        /// Answer PDF
        file: PathBuf,
    },

    /// Download the answer PDF
    Download {
        /// Submission ID
        id: i64,

        /// Output file or directory (default: the stored file name)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// Delete a submission that has not been graded yet
    Delete {
        /// Submission ID
        id: i64,

        /// Skip confirmation
        #[arg(long)]
        force: bool,
    },
}

/// Submission row for table display
#[derive(Debug, Serialize, Tabled)]
pub struct SubmissionRow {
    #[tabled(rename = "ID")]
    pub id: i64,
    #[tabled(rename = "Exercise")]
    pub exercise: String,
    #[tabled(rename = "Student")]
    pub student: String,
    #[tabled(rename = "Status")]
    pub status: String,
    #[tabled(rename = "Grade")]
    pub grade: String,
    #[tabled(rename = "Submitted")]
    pub submitted: String,
}

impl From<&Submission> for SubmissionRow {
    fn from(submission: &Submission) -> Self {
        let exercise = submission
            .exercise_title
            .as_deref()
            .map(|title| truncate(title, 30))
            .unwrap_or_else(|| format!("#{}", submission.exercise_id));
        let student = submission
            .student_name
            .clone()
            .unwrap_or_else(|| format!("#{}", submission.student_id));

        Self {
            id: submission.id,
            exercise,
            student,
            status: submission.status.to_string(),
            grade: or_dash(submission.grade.map(|g| format!("{:.1}", g))),
            submitted: submission.created_at.format("%Y-%m-%d %H:%M").to_string(),
        }
    }
}

pub async fn execute(ctx: &Context, action: SubmissionAction) -> Result<()> {
    match action {
        SubmissionAction::List => list_submissions(ctx).await,
        SubmissionAction::Search {
            exercise,
            student,
            min,
            max,
            sort,
            order,
            skip,
            limit,
        } => {
            let filters = SubmissionFilters {
                exercise_id: exercise,
                student_id: student,
                score_min: min,
                score_max: max,
                sort_by: sort,
                sort_order: order,
                skip,
                limit,
            };
            search_submissions(ctx, filters).await
        }
        SubmissionAction::Show { id } => show_submission(ctx, id).await,
        SubmissionAction::Submit { exercise_id, file } => {
            submit_answer(ctx, exercise_id, file).await
        }
        SubmissionAction::Download { id, output, force } => {
            download_answer(ctx, id, output, force).await
        }
        SubmissionAction::Delete { id, force } => delete_submission(ctx, id, force).await,
    }
}

async fn list_submissions(ctx: &Context) -> Result<()> {
    let submissions = ctx.app.submissions().list().await?;
    let rows: Vec<SubmissionRow> = submissions.iter().map(SubmissionRow::from).collect();
    print_output(&rows, ctx.format)
}

async fn search_submissions(ctx: &Context, filters: SubmissionFilters) -> Result<()> {
    let submissions = ctx.app.submissions().search(&filters).await?;
    let rows: Vec<SubmissionRow> = submissions.iter().map(SubmissionRow::from).collect();
    print_output(&rows, ctx.format)
}

async fn show_submission(ctx: &Context, id: i64) -> Result<()> {
    let submission = ctx.app.submissions().get(id).await?;

    match ctx.format {
        OutputFormat::Json => print_json(&submission)?,
        OutputFormat::Table => {
            print_single(&SubmissionRow::from(&submission), ctx.format)?;
            if let Some(feedback) = &submission.feedback {
                println!();
                println!("{}", feedback);
            }
        }
    }
    Ok(())
}

async fn submit_answer(ctx: &Context, exercise_id: i64, file: PathBuf) -> Result<()> {
    let answer = FilePart::pdf_file("file", &file)?;
    let submission = ctx.app.submissions().submit(exercise_id, answer).await?;
    print_success(
        &format!(
            "Submitted {} as submission {} ({})",
            file.display(),
            submission.id,
            submission.status
        ),
        ctx.quiet,
    );
    Ok(())
}

async fn download_answer(
    ctx: &Context,
    id: i64,
    output: Option<PathBuf>,
    force: bool,
) -> Result<()> {
    let download = ctx.app.submissions().download(id).await?;
    let path = save_download(&download, output.as_deref(), force)?;
    print_success(
        &format!("Saved submission {} to {}", id, path.display()),
        ctx.quiet,
    );
    Ok(())
}

async fn delete_submission(ctx: &Context, id: i64, force: bool) -> Result<()> {
    if !force {
        print_info(
            &format!("This deletes submission {}. Re-run with --force to confirm.", id),
            ctx.quiet,
        );
        return Ok(());
    }

    ctx.app.submissions().delete(id).await?;
    print_success(&format!("Deleted submission {}", id), ctx.quiet);
    Ok(())
}
