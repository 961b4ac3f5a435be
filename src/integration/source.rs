//! Trait for upstream detector/tracker backends.

use crate::tracker::Observation;

/// Pull-based source of per-frame tracker output.
///
/// Implement this trait to feed any detector + multi-object tracker combination
/// into the watch pipeline.
///
/// # Example
///
/// ```ignore
/// use watchpost::{Observation, ObservationSource};
///
/// struct MyTracker {
///     // Your model and tracker here
/// }
///
/// impl ObservationSource for MyTracker {
///     type Error = std::io::Error;
///
///     fn next_frame(&mut self) -> Result<Option<Vec<Observation>>, Self::Error> {
///         // Grab a frame, run detection and tracking
///         Ok(Some(vec![]))
///     }
/// }
/// ```
pub trait ObservationSource {
    /// Error type for source failures.
    type Error;

    /// Receive the category ids to detect. The core never interprets them.
    fn set_classes(&mut self, _classes: &[u32]) {}

    /// Produce the next frame's observations, or `None` once the stream has ended.
    ///
    /// An identity missing from a frame means it was not observed, not that it is gone.
    fn next_frame(&mut self) -> Result<Option<Vec<Observation>>, Self::Error>;
}

/// Helper trait for converting tracker-specific outputs to [`Observation`]s.
pub trait IntoObservations {
    fn into_observations(self) -> Vec<Observation>;
}

impl IntoObservations for Vec<Observation> {
    fn into_observations(self) -> Vec<Observation> {
        self
    }
}

impl IntoObservations for &[Observation] {
    fn into_observations(self) -> Vec<Observation> {
        self.to_vec()
    }
}
