//! Fraud Screening Service Library
//!
//! Encodes raw transaction submissions into model-ready feature vectors,
//! classifies them with a pre-trained ONNX model, and serves summary
//! statistics over a historical transaction table.

pub mod config;
pub mod consumer;
pub mod context;
pub mod encoder;
pub mod error;
pub mod metrics;
pub mod model;
pub mod producer;
pub mod summary;
pub mod types;

pub use config::AppConfig;
pub use consumer::SubmissionConsumer;
pub use context::ScreeningContext;
pub use encoder::{FeatureEncoder, FeatureSchema, LookupTable};
pub use error::{ClassifyError, EncodeError, ScreeningError, SummaryError};
pub use model::InferenceAdapter;
pub use producer::{ResponsePublisher, SummaryPublisher};
pub use summary::SummaryProvider;
pub use types::{Label, ScreeningResponse, TransactionInput, Verdict};
