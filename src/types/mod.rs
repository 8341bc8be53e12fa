//! Type definitions for the fraud screening service

pub mod transaction;
pub mod verdict;

pub use transaction::TransactionInput;
pub use verdict::{Label, Outcome, ScreeningResponse, Verdict};
