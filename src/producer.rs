//! NATS publisher for screening responses and summary statistics

use crate::summary::SummaryStats;
use crate::types::{Outcome, ScreeningResponse};
use anyhow::Result;
use async_nats::Client;
use tracing::debug;

/// Publisher for screening responses.
#[derive(Clone)]
pub struct ResponsePublisher {
    client: Client,
    subject: String,
}

impl ResponsePublisher {
    /// Create a new response publisher.
    pub fn new(client: Client, subject: &str) -> Self {
        Self {
            client,
            subject: subject.to_string(),
        }
    }

    /// Publish one screening response.
    pub async fn publish(&self, response: &ScreeningResponse) -> Result<()> {
        let payload = serde_json::to_vec(response)?;

        self.client
            .publish(self.subject.clone(), payload.into())
            .await?;

        debug!(
            response_id = %response.response_id,
            request_id = %response.request_id,
            scored = matches!(response.outcome, Outcome::Scored { .. }),
            "Published screening response"
        );

        Ok(())
    }

    /// Get the subject name.
    pub fn subject(&self) -> &str {
        &self.subject
    }
}

/// Publisher for periodic summary statistics.
#[derive(Clone)]
pub struct SummaryPublisher {
    client: Client,
    subject: String,
}

impl SummaryPublisher {
    pub fn new(client: Client, subject: &str) -> Self {
        Self {
            client,
            subject: subject.to_string(),
        }
    }

    /// Publish a summary statistics snapshot.
    pub async fn publish(&self, stats: &SummaryStats) -> Result<()> {
        let payload = serde_json::to_vec(stats)?;

        self.client
            .publish(self.subject.clone(), payload.into())
            .await?;

        debug!(
            total = stats.total,
            fraud = stats.fraud,
            "Published summary statistics"
        );

        Ok(())
    }
}
