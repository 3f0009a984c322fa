//! Notification endpoints

use crate::client::ApiClient;
use crate::error::Result;
use crate::models::{Notification, NotificationFilters};

const NOTIFICATIONS_PATH: &str = "/notifications";

#[derive(Clone)]
pub struct NotificationService {
    client: ApiClient,
}

impl NotificationService {
    pub fn new(client: ApiClient) -> Self {
        Self { client }
    }

    /// The current user's notifications, newest first
    pub async fn list(&self, filters: &NotificationFilters) -> Result<Vec<Notification>> {
        self.client
            .get_with_query(NOTIFICATIONS_PATH, filters.to_query())
            .await
    }

    pub async fn unread(&self) -> Result<Vec<Notification>> {
        self.client
            .get(&format!("{}/unread", NOTIFICATIONS_PATH))
            .await
    }

    /// A notification that is not the current user's is reported as not found
    pub async fn mark_read(&self, id: i64) -> Result<()> {
        self.client
            .put(&format!("{}/{}/read", NOTIFICATIONS_PATH, id))
            .await?;
        log::debug!("Marked notification {} as read", id);
        Ok(())
    }
}
