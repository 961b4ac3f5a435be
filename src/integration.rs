//! Integration module connecting upstream detector/tracker backends to the alerting core.
//!
//! This module provides traits and utilities for feeding per-frame tracker output
//! through the registry, zone classifier and alert dispatcher in frame order.

mod builder;
mod pipeline;
mod replay;
mod source;

pub use builder::ObservationBuilder;
pub use pipeline::{FramePipeline, FrameProcessor, FrameReport, PipelineError};
pub use replay::ReplaySource;
pub use source::{IntoObservations, ObservationSource};
