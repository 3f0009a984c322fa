//! Route commands
//!
//! Evaluate the route guards against the stored session.

use anyhow::Result;
use clap::Subcommand;
use serde::Serialize;
use tabled::Tabled;

use gradebook_core::guard::{Access, RouteDef, ROUTES};
use gradebook_core::Resolution;

use super::Context;
use crate::output::{print_output, print_single};

#[derive(Subcommand)]
pub enum RouteAction {
    /// Show what visiting a path does for the current session
    Check {
        /// Application path, e.g. /exercises/12/edit
        path: String,
    },

    /// List all application routes and their guards
    List,
}

#[derive(Debug, Serialize, Tabled)]
pub struct RouteCheckRow {
    #[tabled(rename = "Path")]
    pub path: String,
    #[tabled(rename = "Outcome")]
    pub outcome: String,
    #[tabled(rename = "Target")]
    pub target: String,
}

impl RouteCheckRow {
    fn new(path: &str, resolution: Resolution) -> Self {
        let (outcome, target) = match resolution {
            Resolution::Render(view) => ("render", view.name().to_string()),
            Resolution::Redirect(to) => ("redirect", to.to_string()),
            Resolution::Loading => ("loading", "-".to_string()),
            Resolution::NotFound => ("not-found", "-".to_string()),
        };
        Self {
            path: path.to_string(),
            outcome: outcome.to_string(),
            target,
        }
    }
}

#[derive(Debug, Serialize, Tabled)]
pub struct RouteRow {
    #[tabled(rename = "Pattern")]
    pub pattern: String,
    #[tabled(rename = "View")]
    pub view: String,
    #[tabled(rename = "Access")]
    pub access: String,
}

impl From<&RouteDef> for RouteRow {
    fn from(route: &RouteDef) -> Self {
        let access = match route.access {
            Access::Public => "public".to_string(),
            Access::Protected(guard) => match guard.required_role() {
                Some(role) => role.to_string(),
                None => "any session".to_string(),
            },
        };
        Self {
            pattern: route.pattern.to_string(),
            view: route.view.name().to_string(),
            access,
        }
    }
}

pub async fn execute(ctx: &Context, action: RouteAction) -> Result<()> {
    match action {
        RouteAction::Check { path } => {
            let resolution = ctx.app.visit(&path);
            print_single(&RouteCheckRow::new(&path, resolution), ctx.format)
        }
        RouteAction::List => {
            let rows: Vec<RouteRow> = ROUTES.iter().map(RouteRow::from).collect();
            print_output(&rows, ctx.format)
        }
    }
}
