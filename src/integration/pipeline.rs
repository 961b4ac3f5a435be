//! Frame pipeline combining an observation source with the alerting core.

use thiserror::Error;
use tracing::{debug, warn};

use crate::alert::{AlertDispatcher, AlertSink, RenderDirective};
use crate::config::{DuplicatePolicy, WatchConfig};
use crate::error::{Result, WatchError};
use crate::tracker::{RegistryConfig, TrackId, TrackRegistry};
use crate::zone::ZoneClassifier;

use super::{IntoObservations, ObservationSource};

/// Failure of a [`FramePipeline`] step.
#[derive(Debug, Error)]
pub enum PipelineError<E> {
    #[error("observation source failed: {0}")]
    Source(E),

    #[error(transparent)]
    Watch(#[from] WatchError),
}

/// Everything produced for one frame.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrameReport {
    pub frame_index: u64,
    pub directives: Vec<RenderDirective>,
    pub evicted: Vec<TrackId>,
    pub skipped: Vec<TrackId>,
    /// Set when the frame was discarded under [`DuplicatePolicy::SkipFrame`]
    pub dropped: bool,
}

/// Sequential per-frame core: registry update, zone classification, alert dispatch.
#[derive(Debug)]
pub struct FrameProcessor {
    registry: TrackRegistry,
    dispatcher: AlertDispatcher,
    classifier: Option<ZoneClassifier>,
    on_duplicate: DuplicatePolicy,
    frame_index: u64,
}

impl FrameProcessor {
    pub fn new(
        registry_config: RegistryConfig,
        time_threshold_seconds: f64,
        classifier: Option<ZoneClassifier>,
    ) -> Result<Self> {
        Ok(Self {
            registry: TrackRegistry::new(registry_config)?,
            dispatcher: AlertDispatcher::new(time_threshold_seconds)?,
            classifier,
            on_duplicate: DuplicatePolicy::default(),
            frame_index: 0,
        })
    }

    pub fn from_config(config: &WatchConfig) -> Result<Self> {
        let processor = Self::new(
            config.registry_config(),
            config.time_threshold_seconds,
            config.zone_classifier()?,
        )?;
        Ok(processor.with_duplicate_policy(config.on_duplicate))
    }

    pub fn with_duplicate_policy(mut self, policy: DuplicatePolicy) -> Self {
        self.on_duplicate = policy;
        self
    }

    pub fn registry(&self) -> &TrackRegistry {
        &self.registry
    }

    pub fn dispatcher(&self) -> &AlertDispatcher {
        &self.dispatcher
    }

    pub fn classifier(&self) -> Option<&ZoneClassifier> {
        self.classifier.as_ref()
    }

    /// Index of the most recently processed frame; frames are numbered from 1.
    pub fn frame_index(&self) -> u64 {
        self.frame_index
    }

    /// Process the next frame's observations.
    pub fn process(
        &mut self,
        observations: impl IntoObservations,
        sink: &mut dyn AlertSink,
    ) -> Result<FrameReport> {
        self.frame_index += 1;
        let frame_index = self.frame_index;
        let observations = observations.into_observations();

        let update = match self.registry.update(frame_index, &observations) {
            Ok(update) => update,
            Err(WatchError::DuplicateObservation(track_id))
                if self.on_duplicate == DuplicatePolicy::SkipFrame =>
            {
                warn!(frame_index, track_id, "duplicate track id, skipping frame");
                return Ok(FrameReport {
                    frame_index,
                    dropped: true,
                    ..FrameReport::default()
                });
            }
            Err(err) => return Err(err),
        };

        let directives = self.dispatcher.process(
            frame_index,
            &mut self.registry,
            &update,
            self.classifier.as_ref(),
            sink,
        )?;
        debug!(
            frame_index,
            active = directives.len(),
            tracked = self.registry.len(),
            "frame processed"
        );

        Ok(FrameReport {
            frame_index,
            directives,
            evicted: update.evicted,
            skipped: update.skipped,
            dropped: false,
        })
    }
}

/// Bundles an [`ObservationSource`] with a [`FrameProcessor`].
pub struct FramePipeline<S: ObservationSource> {
    source: S,
    processor: FrameProcessor,
}

impl<S: ObservationSource> FramePipeline<S> {
    /// Create a pipeline, forwarding `classes` to the source untouched.
    pub fn new(mut source: S, processor: FrameProcessor, classes: &[u32]) -> Self {
        source.set_classes(classes);
        Self { source, processor }
    }

    pub fn from_config(source: S, config: &WatchConfig) -> Result<Self> {
        let processor = FrameProcessor::from_config(config)?;
        Ok(Self::new(source, processor, &config.classes_to_track))
    }

    /// Pull one frame from the source and process it; `None` once the source is exhausted.
    pub fn process_next(
        &mut self,
        sink: &mut dyn AlertSink,
    ) -> std::result::Result<Option<FrameReport>, PipelineError<S::Error>> {
        let Some(observations) = self.source.next_frame().map_err(PipelineError::Source)? else {
            return Ok(None);
        };
        Ok(Some(self.processor.process(observations, sink)?))
    }

    /// Drain the source, handing each report to `on_frame`. Returns the number of frames.
    pub fn run<F>(
        &mut self,
        sink: &mut dyn AlertSink,
        mut on_frame: F,
    ) -> std::result::Result<u64, PipelineError<S::Error>>
    where
        F: FnMut(&FrameReport),
    {
        let mut frames = 0;
        while let Some(report) = self.process_next(sink)? {
            on_frame(&report);
            frames += 1;
        }
        Ok(frames)
    }

    pub fn source(&self) -> &S {
        &self.source
    }

    pub fn source_mut(&mut self) -> &mut S {
        &mut self.source
    }

    pub fn processor(&self) -> &FrameProcessor {
        &self.processor
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::VecDeque;

    use crate::alert::{AlertEvent, AlertKind};
    use crate::geometry::BoundingRegion;
    use crate::tracker::{FrameRate, Observation};

    struct ScriptedSource {
        frames: VecDeque<Vec<Observation>>,
        classes: Vec<u32>,
    }

    impl ObservationSource for ScriptedSource {
        type Error = std::convert::Infallible;

        fn set_classes(&mut self, classes: &[u32]) {
            self.classes = classes.to_vec();
        }

        fn next_frame(&mut self) -> std::result::Result<Option<Vec<Observation>>, Self::Error> {
            Ok(self.frames.pop_front())
        }
    }

    fn processor() -> FrameProcessor {
        FrameProcessor::new(RegistryConfig::new(2.0, 5, FrameRate::new(10.0)), 1.0, None).unwrap()
    }

    fn obs(id: TrackId) -> Observation {
        Observation::new(id, BoundingRegion::new(50.0, 50.0, 10.0, 10.0))
    }

    #[test]
    fn test_frame_pipeline() {
        let source = ScriptedSource {
            frames: (0..15).map(|_| vec![obs(1)]).collect(),
            classes: vec![],
        };
        let mut pipeline = FramePipeline::new(source, processor(), &[24, 28]);
        assert_eq!(pipeline.source().classes, vec![24, 28]);

        let mut events: Vec<AlertEvent> = Vec::new();
        let mut labels = Vec::new();
        let frames = pipeline
            .run(&mut events, |report| labels.push(report.directives[0].label.clone()))
            .unwrap();

        assert_eq!(frames, 15);
        assert_eq!(labels[0], "ID: 1 Time: 0s");
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].kind, AlertKind::StationaryTimeout);
        // origin frame 1, 11 frames at 10 fps is the first duration above 1s
        assert_eq!(events[0].frame_index, 12);
        assert!(pipeline.process_next(&mut events).unwrap().is_none());
    }

    #[test]
    fn test_duplicate_policy() {
        let mut events: Vec<AlertEvent> = Vec::new();

        let mut strict = processor();
        assert!(matches!(
            strict.process(vec![obs(1), obs(1)], &mut events),
            Err(WatchError::DuplicateObservation(1))
        ));

        let mut lenient = processor().with_duplicate_policy(DuplicatePolicy::SkipFrame);
        let report = lenient.process(vec![obs(1), obs(1)], &mut events).unwrap();
        assert!(report.dropped);
        assert!(lenient.registry().is_empty());

        let report = lenient.process(vec![obs(1)], &mut events).unwrap();
        assert_eq!(report.frame_index, 2);
        assert!(!report.dropped);
        assert_eq!(lenient.registry().len(), 1);
    }
}
