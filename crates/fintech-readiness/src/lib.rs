//! Regulatory readiness scoring for startup document intake.
//!
//! Uploaded documents are decoded to text, scanned for known compliance topics and
//! heuristic gaps, scored against a weighted rule table, and matched against a static
//! catalog of support programs and compliance experts.

pub mod catalog;
pub mod config;
pub mod document;
pub mod error;
pub mod telemetry;
pub mod workflows;
