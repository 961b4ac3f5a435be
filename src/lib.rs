//! # watchpost
//!
//! Turns per-frame multi-object tracker output into durable situational alerts:
//!
//! - **Stationary timeout**: an object that stays within a small displacement threshold
//!   for longer than a configured duration (abandoned luggage, parked vehicles).
//! - **Zone entry / exit**: an object whose reference point crosses into or out of a
//!   user-defined polygon.
//!
//! Detection, tracking, video I/O and drawing are left to the caller; frames are fed in
//! strictly increasing order through [`FrameProcessor`] or [`FramePipeline`].
//!
//! ## Example
//!
//! ```rust,ignore
//! use watchpost::{FrameProcessor, FrameRate, ObservationBuilder, RegistryConfig, TracingSink};
//!
//! let config = RegistryConfig::new(2.0, 30, FrameRate::with_default_fallback(0.0));
//! let mut processor = FrameProcessor::new(config, 10.0, None)?;
//!
//! let observations = vec![ObservationBuilder::new(1).xywh(320.0, 240.0, 40.0, 80.0).build()];
//! let report = processor.process(observations, &mut TracingSink)?;
//! ```

pub mod alert;
pub mod config;
pub mod geometry;
pub mod integration;
pub mod tracker;
pub mod zone;

mod error;

pub use alert::{
    AlertDecision, AlertDispatcher, AlertEvent, AlertKind, AlertSink, ColorClass,
    RenderDirective, TracingSink,
};
pub use config::{DuplicatePolicy, WatchConfig};
pub use error::{Result, WatchError};
pub use geometry::{
    Anchor, BoundingRegion, Containment, Point, Zone, euclidean_distance, point_in_polygon,
};
pub use integration::{
    FramePipeline, FrameProcessor, FrameReport, IntoObservations, ObservationBuilder,
    ObservationSource, PipelineError, ReplaySource,
};
pub use tracker::{
    DEFAULT_FPS_FALLBACK, DisplacementReference, FrameRate, Observation, RegistryConfig,
    RegistryUpdate, TrackId, TrackPhase, TrackRegistry, TrackState, TrackStatus,
};
pub use zone::{ZoneClassifier, ZoneMembership};
