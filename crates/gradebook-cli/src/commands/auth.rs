//! Auth commands
//!
//! Login, registration, logout and session inspection.

use anyhow::Result;
use clap::Subcommand;
use serde::Serialize;
use tabled::Tabled;

use gradebook_core::{RegisterRequest, Role, Session, SessionState};

use super::Context;
use crate::output::{or_dash, print_info, print_json, print_single, print_success, OutputFormat};

#[derive(Subcommand)]
pub enum AuthAction {
    /// Log in with email and password
    Login {
        /// Account email
        #[arg(short, long)]
        email: String,

        /// Account password
        #[arg(short, long, env = "GRADEBOOK_PASSWORD", hide_env_values = true)]
        password: String,
    },

    /// Create an account and log in
    Register {
        /// Account email
        #[arg(short, long)]
        email: String,

        /// Account password
        #[arg(short, long, env = "GRADEBOOK_PASSWORD", hide_env_values = true)]
        password: String,

        /// Full name
        #[arg(short, long)]
        name: String,

        /// Role: student or professor
        #[arg(short, long, default_value = "student")]
        role: Role,
    },

    /// Log out and forget the stored token
    Logout,

    /// Show the current session
    Whoami {
        /// Confirm the session with the server first
        #[arg(long)]
        check: bool,
    },
}

/// Session row for table display; the token is never shown
#[derive(Debug, Serialize, Tabled)]
pub struct SessionRow {
    #[tabled(rename = "User ID")]
    pub user_id: String,
    #[tabled(rename = "Name")]
    pub name: String,
    #[tabled(rename = "Role")]
    pub role: String,
}

impl From<&Session> for SessionRow {
    fn from(session: &Session) -> Self {
        Self {
            user_id: session.user_id().to_string(),
            name: or_dash(session.display_name()),
            role: session.role().to_string(),
        }
    }
}

pub async fn execute(ctx: &Context, action: AuthAction) -> Result<()> {
    match action {
        AuthAction::Login { email, password } => login(ctx, email, password).await,
        AuthAction::Register {
            email,
            password,
            name,
            role,
        } => register(ctx, email, password, name, role).await,
        AuthAction::Logout => logout(ctx),
        AuthAction::Whoami { check } => whoami(ctx, check).await,
    }
}

async fn login(ctx: &Context, email: String, password: String) -> Result<()> {
    let session = ctx.app.auth().login(&email, &password).await?;
    print_success(
        &format!(
            "Logged in as {} ({})",
            session.display_name().unwrap_or(email.as_str()),
            session.role()
        ),
        ctx.quiet,
    );
    Ok(())
}

async fn register(
    ctx: &Context,
    email: String,
    password: String,
    name: String,
    role: Role,
) -> Result<()> {
    let request = RegisterRequest {
        email,
        password,
        full_name: name,
        role,
    };
    let session = ctx.app.auth().register(&request).await?;
    print_success(
        &format!("Account created; logged in as {}", session.role()),
        ctx.quiet,
    );
    Ok(())
}

fn logout(ctx: &Context) -> Result<()> {
    let was_active = ctx.app.current_session().is_some();
    ctx.app.logout()?;
    if was_active {
        print_success("Logged out", ctx.quiet);
    } else {
        print_info("No active session", ctx.quiet);
    }
    Ok(())
}

async fn whoami(ctx: &Context, check: bool) -> Result<()> {
    let session = if check {
        ctx.app.check_auth().await?
    } else {
        match ctx.app.state() {
            SessionState::Active(session) => Some(session),
            SessionState::Pending | SessionState::Anonymous => None,
        }
    };

    match (session, ctx.format) {
        (Some(session), format) => print_single(&SessionRow::from(&session), format)?,
        (None, OutputFormat::Json) => print_json(&serde_json::Value::Null)?,
        (None, OutputFormat::Table) => print_info("Not logged in", ctx.quiet),
    }
    Ok(())
}
