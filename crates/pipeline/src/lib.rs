//! # CropSense Pipeline
//!
//! Orchestration layer tying acquisition, index computation, rendering and
//! detection together. The entry point is [`analyze`], which takes a
//! validated [`AnalysisRequest`], an [`ImageryProvider`] backend and the
//! shared [`ResultStore`]/[`ArtifactStore`], and returns an
//! [`AnalysisOutcome`] or a typed [`PipelineError`].
//!
//! [`ImageryProvider`]: cropsense_imagery::ImageryProvider

pub mod analyze;
pub mod artifacts;
pub mod error;
pub mod request;
pub mod store;

pub use analyze::{analyze, AnalysisOutcome, PipelineConfig};
pub use artifacts::ArtifactStore;
pub use error::{PipelineError, Result};
pub use request::{default_date_range, AnalysisRequest, RequestKey};
pub use store::{ResultStore, StoredResult};
