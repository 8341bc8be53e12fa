//! Test Submission Producer
//!
//! Generates and publishes test screening submissions to NATS. Most
//! submissions are valid; a small fraction carries an out-of-vocabulary
//! category to exercise the encoding error path.

use chrono::Utc;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{info, warn};

/// Submission structure matching the service's expected format
#[derive(Debug, Clone, Serialize, Deserialize)]
struct TransactionInput {
    request_id: String,
    amount: f64,
    currency: String,
    city_pop: f64,
    age: u32,
    trans_hour: u8,
    trans_dayofweek: u8,
    trans_month: u8,
    gender: String,
    category: String,
    state: String,
    distance: f64,
    timestamp: chrono::DateTime<Utc>,
}

const CURRENCIES: &[&str] = &["USD", "INR", "EUR", "GBP"];
const GENDERS: &[&str] = &["Female", "Male"];
const CATEGORIES: &[&str] = &["Food", "Travel", "Shopping", "Utilities", "Others"];
const STATES: &[&str] = &["CA", "TX", "NY", "FL", "IL"];

/// Submission generator for testing
struct SubmissionGenerator {
    rng: rand::rngs::ThreadRng,
    counter: u64,
}

impl SubmissionGenerator {
    fn new() -> Self {
        Self {
            rng: rand::thread_rng(),
            counter: 0,
        }
    }

    fn pick<'a>(&mut self, choices: &[&'a str]) -> &'a str {
        choices[self.rng.gen_range(0..choices.len())]
    }

    /// Generate a random in-vocabulary submission.
    fn generate_valid(&mut self) -> TransactionInput {
        self.counter += 1;
        TransactionInput {
            request_id: format!("test_{:06}", self.counter),
            amount: self.rng.gen_range(1.0..2000.0),
            currency: self.pick(CURRENCIES).to_string(),
            city_pop: self.rng.gen_range(0.0..1.0),
            age: self.rng.gen_range(18..85),
            trans_hour: self.rng.gen_range(0..24),
            trans_dayofweek: self.rng.gen_range(1..8),
            trans_month: self.rng.gen_range(1..13),
            gender: self.pick(GENDERS).to_string(),
            category: self.pick(CATEGORIES).to_string(),
            state: self.pick(STATES).to_string(),
            distance: self.rng.gen_range(0.0..1.0),
            timestamp: Utc::now(),
        }
    }

    /// Generate a submission with a category the model was never trained on.
    fn generate_unknown_category(&mut self) -> TransactionInput {
        let mut input = self.generate_valid();
        input.category = "Crypto".to_string();
        input
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt().init();

    let url = std::env::var("NATS_URL").unwrap_or_else(|_| "nats://localhost:4222".to_string());
    let subject =
        std::env::var("SUBMISSION_SUBJECT").unwrap_or_else(|_| "fraud.submissions".to_string());
    let count: u64 = std::env::var("COUNT")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(100);
    let rate_ms: u64 = std::env::var("RATE_MS")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(100);

    let client = async_nats::connect(&url).await?;
    info!(url = %url, subject = %subject, count = count, "Test producer connected");

    let mut generator = SubmissionGenerator::new();
    let mut rng = rand::thread_rng();

    for i in 0..count {
        // Roughly 1 in 20 submissions exercises the unknown-category path
        let input = if rng.gen_ratio(1, 20) {
            generator.generate_unknown_category()
        } else {
            generator.generate_valid()
        };

        let payload = serde_json::to_vec(&input)?;
        if let Err(e) = client.publish(subject.clone(), payload.into()).await {
            warn!(request_id = %input.request_id, error = %e, "Failed to publish submission");
        }

        if (i + 1) % 50 == 0 {
            info!(published = i + 1, "Publishing progress");
        }

        tokio::time::sleep(Duration::from_millis(rate_ms)).await;
    }

    client.flush().await?;
    info!(published = count, "Test producer finished");

    Ok(())
}
