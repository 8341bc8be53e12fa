//! NATS consumer for incoming screening submissions

use anyhow::Result;
use async_nats::{Client, Subscriber};
use futures::StreamExt;
use tracing::{info, warn};

use crate::types::TransactionInput;

/// Consumer for receiving form submissions from NATS.
///
/// Owns the wire format: subscribers yield decoded [`TransactionInput`]
/// records, not raw payloads. A payload that does not parse is logged and
/// skipped; it never reaches the screening pipeline.
pub struct SubmissionConsumer {
    client: Client,
    subject: String,
}

impl SubmissionConsumer {
    /// Create a new submission consumer.
    pub fn new(client: Client, subject: &str) -> Self {
        Self {
            client,
            subject: subject.to_string(),
        }
    }

    /// Subscribe to the submission subject.
    pub async fn subscribe(&self) -> Result<SubmissionStream> {
        let subscriber = self.client.subscribe(self.subject.clone()).await?;
        info!(subject = %self.subject, "Subscribed to submission subject");
        Ok(SubmissionStream { inner: subscriber })
    }

    /// Get the subject name.
    pub fn subject(&self) -> &str {
        &self.subject
    }
}

/// Stream of decoded submissions.
pub struct SubmissionStream {
    inner: Subscriber,
}

impl SubmissionStream {
    /// Next decoded submission, or `None` when the subscription closes.
    ///
    /// Malformed payloads are skipped with a warning rather than tearing
    /// down the loop.
    pub async fn next_submission(&mut self) -> Option<TransactionInput> {
        while let Some(message) = self.inner.next().await {
            match decode_submission(&message.payload) {
                Ok(input) => return Some(input),
                Err(e) => {
                    warn!(error = %e, "Failed to deserialize submission, skipping");
                }
            }
        }
        None
    }
}

/// Decode one submission payload.
fn decode_submission(payload: &[u8]) -> Result<TransactionInput, serde_json::Error> {
    serde_json::from_slice(payload)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_valid_submission() {
        let payload = serde_json::to_vec(&TransactionInput::new("req_7", 42.0, 30)).unwrap();

        let input = decode_submission(&payload).unwrap();
        assert_eq!(input.request_id, "req_7");
        assert_eq!(input.amount, 42.0);
    }

    #[test]
    fn test_decode_rejects_malformed_payload() {
        assert!(decode_submission(b"not json").is_err());
        assert!(decode_submission(br#"{"request_id": "req_8"}"#).is_err());
    }

    // Subscription tests would require a running NATS server
}
