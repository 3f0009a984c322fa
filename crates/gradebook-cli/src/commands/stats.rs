//! Statistics commands
//!
//! Grade figures per student, per exercise, and across the platform.

use anyhow::Result;
use clap::Subcommand;
use serde::Serialize;
use tabled::Tabled;

use gradebook_core::{ExercisePerformance, ExerciseStats, GlobalStats, StudentStats, TopExercise};

use super::Context;
use crate::output::{or_dash, print_json, print_output, print_single, truncate, OutputFormat};

/// Score ranges in display order
const SCORE_RANGES: [&str; 4] = ["0-5", "5-10", "10-15", "15-20"];

#[derive(Subcommand)]
pub enum StatsAction {
    /// Figures for a student (default: yourself)
    Student {
        /// Student ID (professors only)
        id: Option<String>,
    },

    /// Figures for one exercise (professors only)
    Exercise {
        /// Exercise ID
        id: i64,
    },

    /// Platform-wide figures (professors only)
    Global,
}

#[derive(Debug, Serialize, Tabled)]
pub struct StudentSummaryRow {
    #[tabled(rename = "Submissions")]
    pub submissions: u64,
    #[tabled(rename = "Completed")]
    pub completed: u64,
    #[tabled(rename = "Average")]
    pub average: String,
}

impl From<&StudentStats> for StudentSummaryRow {
    fn from(stats: &StudentStats) -> Self {
        Self {
            submissions: stats.total_submissions,
            completed: stats.completed_exercises,
            average: format!("{:.1}", stats.average_score),
        }
    }
}

#[derive(Debug, Serialize, Tabled)]
pub struct PerformanceRow {
    #[tabled(rename = "Exercise")]
    pub exercise: String,
    #[tabled(rename = "Attempts")]
    pub attempts: u64,
    #[tabled(rename = "Average")]
    pub average: String,
}

impl From<&ExercisePerformance> for PerformanceRow {
    fn from(perf: &ExercisePerformance) -> Self {
        Self {
            exercise: truncate(&perf.exercise, 40),
            attempts: perf.attempts,
            average: or_dash(perf.average_score.map(|s| format!("{:.1}", s))),
        }
    }
}

#[derive(Debug, Serialize, Tabled)]
pub struct ExerciseStatsRow {
    #[tabled(rename = "Exercise")]
    pub exercise: String,
    #[tabled(rename = "Submissions")]
    pub submissions: u64,
    #[tabled(rename = "Average")]
    pub average: String,
    #[tabled(rename = "Min")]
    pub min: String,
    #[tabled(rename = "Max")]
    pub max: String,
    #[tabled(rename = "Distribution")]
    pub distribution: String,
}

impl From<&ExerciseStats> for ExerciseStatsRow {
    fn from(stats: &ExerciseStats) -> Self {
        let distribution = SCORE_RANGES
            .iter()
            .map(|range| {
                let count = stats
                    .submission_count_by_score_range
                    .get(*range)
                    .copied()
                    .unwrap_or(0);
                format!("{}: {}", range, count)
            })
            .collect::<Vec<_>>()
            .join(", ");

        Self {
            exercise: format!("#{} {}", stats.exercise_id, truncate(&stats.exercise_title, 30)),
            submissions: stats.total_submissions,
            average: format!("{:.1}", stats.average_score),
            min: format!("{:.1}", stats.min_score),
            max: format!("{:.1}", stats.max_score),
            distribution,
        }
    }
}

#[derive(Debug, Serialize, Tabled)]
pub struct GlobalSummaryRow {
    #[tabled(rename = "Students")]
    pub students: u64,
    #[tabled(rename = "Exercises")]
    pub exercises: u64,
    #[tabled(rename = "Submissions")]
    pub submissions: u64,
    #[tabled(rename = "Average")]
    pub average: String,
    #[tabled(rename = "Last 30 days")]
    pub recent: u64,
}

impl From<&GlobalStats> for GlobalSummaryRow {
    fn from(stats: &GlobalStats) -> Self {
        Self {
            students: stats.total_students,
            exercises: stats.total_exercises,
            submissions: stats.total_submissions,
            average: format!("{:.1}", stats.average_score),
            recent: stats.submissions_per_day.iter().map(|d| d.count).sum(),
        }
    }
}

#[derive(Debug, Serialize, Tabled)]
pub struct TopExerciseRow {
    #[tabled(rename = "ID")]
    pub id: i64,
    #[tabled(rename = "Title")]
    pub title: String,
    #[tabled(rename = "Submissions")]
    pub submissions: u64,
    #[tabled(rename = "Average")]
    pub average: String,
}

impl From<&TopExercise> for TopExerciseRow {
    fn from(top: &TopExercise) -> Self {
        Self {
            id: top.id,
            title: truncate(&top.title, 40),
            submissions: top.submissions,
            average: or_dash(top.average_score.map(|s| format!("{:.1}", s))),
        }
    }
}

pub async fn execute(ctx: &Context, action: StatsAction) -> Result<()> {
    match action {
        StatsAction::Student { id } => {
            let stats = ctx.app.statistics().student(id.as_deref()).await?;
            match ctx.format {
                OutputFormat::Json => print_json(&stats)?,
                OutputFormat::Table => {
                    print_single(&StudentSummaryRow::from(&stats), ctx.format)?;
                    let rows: Vec<PerformanceRow> = stats
                        .performance_by_exercise
                        .iter()
                        .map(PerformanceRow::from)
                        .collect();
                    if !rows.is_empty() {
                        println!();
                        print_output(&rows, ctx.format)?;
                    }
                }
            }
            Ok(())
        }
        StatsAction::Exercise { id } => {
            let stats = ctx.app.statistics().exercise(id).await?;
            match ctx.format {
                OutputFormat::Json => print_json(&stats),
                OutputFormat::Table => print_single(&ExerciseStatsRow::from(&stats), ctx.format),
            }
        }
        StatsAction::Global => {
            let stats = ctx.app.statistics().global().await?;
            match ctx.format {
                OutputFormat::Json => print_json(&stats)?,
                OutputFormat::Table => {
                    print_single(&GlobalSummaryRow::from(&stats), ctx.format)?;
                    let rows: Vec<TopExerciseRow> =
                        stats.top_exercises.iter().map(TopExerciseRow::from).collect();
                    if !rows.is_empty() {
                        println!();
                        print_output(&rows, ctx.format)?;
                    }
                }
            }
            Ok(())
        }
    }
}
