//! Exercise commands
//!
//! Commands for browsing exercises and, for professors, managing them.

use anyhow::{bail, Context as _, Result};
use clap::Subcommand;
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::PathBuf;
use tabled::Tabled;

use gradebook_core::{
    EvaluationCriterion, Exercise, ExerciseFilters, ExerciseSort, ExerciseType, ExerciseUpdate,
    FilePart, NewCorrection, NewExercise, SortOrder,
};

use super::{save_download, Context};
use crate::output::{
    or_dash, print_info, print_json, print_output, print_single, print_success, truncate,
    OutputFormat,
};

#[derive(Subcommand)]
pub enum ExerciseAction {
    /// List exercises visible to the current user
    List,

    /// Search exercises
    Search {
        /// Text to look for in title or description
        #[arg(short, long)]
        query: Option<String>,

        /// Only exercises by this professor
        #[arg(long)]
        professor: Option<i64>,

        /// Sort field: created_at or title
        #[arg(long)]
        sort: Option<ExerciseSort>,

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

    /// Show exercise details
    Show {
        /// Exercise ID
        id: i64,
    },

    /// Create an exercise (professors only)
    Create {
        /// Exercise title
        #[arg(short, long)]
        title: String,

        /// Exercise statement
        #[arg(short = 'D', long)]
        description: String,

        /// Type: sql, mcd, mld or algebra
        #[arg(long = "type", default_value = "sql")]
        exercise_type: ExerciseType,

        /// Statement PDF
        #[arg(short, long)]
        file: PathBuf,

        /// Correction description (repeatable)
        #[arg(long = "correction")]
        corrections: Vec<String>,

        /// Correction PDF, paired in order with --correction (repeatable)
        #[arg(long = "correction-file")]
        correction_files: Vec<PathBuf>,

        /// Grading criterion as NAME=WEIGHT[:DESCRIPTION] (repeatable, weights sum to 1)
        #[arg(long = "criterion")]
        criteria: Vec<String>,
    },

    /// Update an exercise (professors only)
    Update {
        /// Exercise ID
        id: i64,

        /// New title
        #[arg(short, long)]
        title: String,

        /// New statement
        #[arg(short = 'D', long)]
        description: String,

        /// Replacement statement PDF
        #[arg(short, long)]
        file: Option<PathBuf>,
    },

    /// Download the statement PDF
    Download {
        /// Exercise ID
        id: i64,

        /// Output file or directory (default: the stored file name)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// Delete an exercise (professors only)
    Delete {
        /// Exercise ID
        id: i64,

        /// Skip confirmation
        #[arg(long)]
        force: bool,
    },
}

/// Exercise row for table display
#[derive(Debug, Serialize, Tabled)]
pub struct ExerciseRow {
    #[tabled(rename = "ID")]
    pub id: i64,
    #[tabled(rename = "Title")]
    pub title: String,
    #[tabled(rename = "Type")]
    pub exercise_type: String,
    #[tabled(rename = "Due")]
    pub due: String,
    #[tabled(rename = "Created")]
    pub created: String,
}

impl From<&Exercise> for ExerciseRow {
    fn from(exercise: &Exercise) -> Self {
        Self {
            id: exercise.id,
            title: truncate(&exercise.title, 40),
            exercise_type: exercise.exercise_type.to_string(),
            due: or_dash(exercise.due_date.map(|d| d.format("%Y-%m-%d"))),
            created: exercise.created_at.format("%Y-%m-%d").to_string(),
        }
    }
}

pub async fn execute(ctx: &Context, action: ExerciseAction) -> Result<()> {
    match action {
        ExerciseAction::List => list_exercises(ctx).await,
        ExerciseAction::Search {
            query,
            professor,
            sort,
            order,
            skip,
            limit,
        } => {
            let filters = ExerciseFilters {
                search: query,
                professor_id: professor,
                sort_by: sort,
                sort_order: order,
                skip,
                limit,
            };
            search_exercises(ctx, filters).await
        }
        ExerciseAction::Show { id } => show_exercise(ctx, id).await,
        ExerciseAction::Create {
            title,
            description,
            exercise_type,
            file,
            corrections,
            correction_files,
            criteria,
        } => {
            let exercise = NewExercise {
                title,
                description,
                exercise_type,
                document: FilePart::pdf_file("file", &file)?,
                corrections: pair_corrections(corrections, correction_files)?,
                criteria: parse_criteria(&criteria)?,
            };
            create_exercise(ctx, exercise).await
        }
        ExerciseAction::Update {
            id,
            title,
            description,
            file,
        } => {
            let update = ExerciseUpdate {
                title,
                description,
                document: file
                    .map(|path| FilePart::pdf_file("file", &path))
                    .transpose()?,
            };
            update_exercise(ctx, id, update).await
        }
        ExerciseAction::Download { id, output, force } => {
            download_statement(ctx, id, output, force).await
        }
        ExerciseAction::Delete { id, force } => delete_exercise(ctx, id, force).await,
    }
}

async fn list_exercises(ctx: &Context) -> Result<()> {
    let exercises = ctx.app.exercises().list().await?;
    let rows: Vec<ExerciseRow> = exercises.iter().map(ExerciseRow::from).collect();
    print_output(&rows, ctx.format)
}

async fn search_exercises(ctx: &Context, filters: ExerciseFilters) -> Result<()> {
    let exercises = ctx.app.exercises().search(&filters).await?;
    let rows: Vec<ExerciseRow> = exercises.iter().map(ExerciseRow::from).collect();
    print_output(&rows, ctx.format)
}

async fn show_exercise(ctx: &Context, id: i64) -> Result<()> {
    let exercise = ctx.app.exercises().get(id).await?;

    match ctx.format {
        OutputFormat::Json => print_json(&exercise)?,
        OutputFormat::Table => {
            print_single(&ExerciseRow::from(&exercise), ctx.format)?;
            println!();
            println!("{}", exercise.description);
            if !exercise.corrections.is_empty() {
                println!();
                println!("Corrections: {}", exercise.corrections.len());
            }
            if let Some(criteria) = &exercise.evaluation_criteria {
                println!("Criteria: {}", criteria);
            }
        }
    }
    Ok(())
}

async fn create_exercise(ctx: &Context, exercise: NewExercise) -> Result<()> {
    let created = ctx.app.exercises().create(exercise).await?;
    print_success(
        &format!("Created exercise {} ({})", created.id, created.title),
        ctx.quiet,
    );
    Ok(())
}

async fn update_exercise(ctx: &Context, id: i64, update: ExerciseUpdate) -> Result<()> {
    let updated = ctx.app.exercises().update(id, update).await?;
    print_success(&format!("Updated exercise {}", updated.id), ctx.quiet);
    Ok(())
}

async fn download_statement(
    ctx: &Context,
    id: i64,
    output: Option<PathBuf>,
    force: bool,
) -> Result<()> {
    let download = ctx.app.exercises().download(id).await?;
    let path = save_download(&download, output.as_deref(), force)?;
    print_success(
        &format!("Saved exercise {} statement to {}", id, path.display()),
        ctx.quiet,
    );
    Ok(())
}

async fn delete_exercise(ctx: &Context, id: i64, force: bool) -> Result<()> {
    if !force {
        print_info(
            &format!(
                "This deletes exercise {} and all its submissions. Re-run with --force to confirm.",
                id
            ),
            ctx.quiet,
        );
        return Ok(());
    }

    ctx.app.exercises().delete(id).await?;
    print_success(&format!("Deleted exercise {}", id), ctx.quiet);
    Ok(())
}

/// Pair correction files with descriptions in order
fn pair_corrections(descriptions: Vec<String>, files: Vec<PathBuf>) -> Result<Vec<NewCorrection>> {
    if files.len() > descriptions.len() {
        bail!(
            "{} correction files but only {} --correction descriptions",
            files.len(),
            descriptions.len()
        );
    }

    let mut files = files.into_iter();
    descriptions
        .into_iter()
        .map(|description| -> Result<NewCorrection> {
            let file = files
                .next()
                .map(|path| FilePart::pdf_file("corrections", &path))
                .transpose()?;
            Ok(NewCorrection { description, file })
        })
        .collect()
}

/// Parse `NAME=WEIGHT[:DESCRIPTION]` entries
fn parse_criteria(entries: &[String]) -> Result<BTreeMap<String, EvaluationCriterion>> {
    let mut criteria = BTreeMap::new();
    for entry in entries {
        let (name, rest) = entry
            .split_once('=')
            .with_context(|| format!("Criterion must look like NAME=WEIGHT: {}", entry))?;
        let (weight, description) = match rest.split_once(':') {
            Some((weight, description)) => (weight, Some(description.trim().to_string())),
            None => (rest, None),
        };
        let weight: f64 = weight
            .trim()
            .parse()
            .with_context(|| format!("Invalid weight for criterion {}: {}", name, weight))?;

        let name = name.trim();
        if name.is_empty() {
            bail!("Criterion name is empty: {}", entry);
        }
        criteria.insert(
            name.to_string(),
            EvaluationCriterion {
                weight,
                description: description.filter(|d| !d.is_empty()),
            },
        );
    }
    Ok(criteria)
}
