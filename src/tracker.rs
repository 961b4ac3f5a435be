mod observation;
mod registry;
mod track_state;

pub use observation::{Observation, TrackId};
pub use registry::{
    DEFAULT_FPS_FALLBACK, FrameRate, RegistryConfig, RegistryUpdate, TrackRegistry, TrackStatus,
};
pub use track_state::{DisplacementReference, TrackPhase, TrackState};
