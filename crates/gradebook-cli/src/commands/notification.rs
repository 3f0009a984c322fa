//! Notification commands

use anyhow::Result;
use clap::Subcommand;
use serde::Serialize;
use tabled::Tabled;

use gradebook_core::{Notification, NotificationFilters};

use super::Context;
use crate::output::{or_dash, print_output, print_success, truncate};

#[derive(Subcommand)]
pub enum NotificationAction {
    /// List your notifications
    List {
        /// Only unread notifications
        #[arg(short, long)]
        unread: bool,

        /// Number of results to skip
        #[arg(long)]
        skip: Option<u32>,

        /// Maximum number of results
        #[arg(short, long)]
        limit: Option<u32>,
    },

    /// Mark a notification as read
    Read {
        /// Notification ID
        id: i64,
    },
}

/// Notification row for table display
#[derive(Debug, Serialize, Tabled)]
pub struct NotificationRow {
    #[tabled(rename = "ID")]
    pub id: i64,
    #[tabled(rename = "")]
    pub unread: String,
    #[tabled(rename = "Kind")]
    pub kind: String,
    #[tabled(rename = "Title")]
    pub title: String,
    #[tabled(rename = "Link")]
    pub link: String,
    #[tabled(rename = "Received")]
    pub received: String,
}

impl From<&Notification> for NotificationRow {
    fn from(notification: &Notification) -> Self {
        Self {
            id: notification.id,
            unread: if notification.read { "" } else { "*" }.to_string(),
            kind: notification.kind.to_string(),
            title: truncate(&notification.title, 40),
            link: or_dash(notification.link.as_deref()),
            received: notification.created_at.format("%Y-%m-%d %H:%M").to_string(),
        }
    }
}

pub async fn execute(ctx: &Context, action: NotificationAction) -> Result<()> {
    match action {
        NotificationAction::List {
            unread,
            skip,
            limit,
        } => {
            let filters = NotificationFilters {
                unread_only: unread,
                skip,
                limit,
            };
            let notifications = ctx.app.notifications().list(&filters).await?;
            let rows: Vec<NotificationRow> =
                notifications.iter().map(NotificationRow::from).collect();
            print_output(&rows, ctx.format)
        }
        NotificationAction::Read { id } => {
            ctx.app.notifications().mark_read(id).await?;
            print_success(&format!("Marked notification {} as read", id), ctx.quiet);
            Ok(())
        }
    }
}
