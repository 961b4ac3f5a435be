//! Replays recorded tracker output stored as JSON lines.
//!
//! Each non-empty line is one frame:
//!
//! ```text
//! {"detections": [{"id": 3, "bbox": [412.0, 220.5, 38.0, 61.0], "class": 28}]}
//! ```
//!
//! `bbox` is `[center_x, center_y, width, height]`. A frame with no tracked objects is
//! written as `{}` or `{"detections": []}`.

use std::collections::HashSet;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use serde::Deserialize;

use crate::error::{Result, WatchError};
use crate::tracker::{Observation, TrackId};

use super::{ObservationBuilder, ObservationSource};

#[derive(Debug, Deserialize)]
struct RecordedFrame {
    #[serde(default)]
    detections: Vec<RecordedDetection>,
}

#[derive(Debug, Deserialize)]
struct RecordedDetection {
    id: TrackId,
    bbox: [f32; 4],
    #[serde(default)]
    class: Option<u32>,
}

/// [`ObservationSource`] reading one frame per line from a JSON-lines stream.
pub struct ReplaySource<R: BufRead> {
    reader: R,
    classes: HashSet<u32>,
    snap_to_pixel: bool,
    line: String,
}

impl ReplaySource<BufReader<File>> {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        Ok(Self::new(BufReader::new(File::open(path)?)))
    }
}

impl<R: BufRead> ReplaySource<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            classes: HashSet::new(),
            snap_to_pixel: false,
            line: String::new(),
        }
    }

    /// Truncate reference points to whole pixels as they are read.
    pub fn with_snap_to_pixel(mut self, snap: bool) -> Self {
        self.snap_to_pixel = snap;
        self
    }

    fn wanted(&self, class: Option<u32>) -> bool {
        match class {
            Some(class) if !self.classes.is_empty() => self.classes.contains(&class),
            _ => true,
        }
    }
}

impl<R: BufRead> ObservationSource for ReplaySource<R> {
    type Error = WatchError;

    fn set_classes(&mut self, classes: &[u32]) {
        self.classes = classes.iter().copied().collect();
    }

    fn next_frame(&mut self) -> Result<Option<Vec<Observation>>> {
        loop {
            self.line.clear();
            if self.reader.read_line(&mut self.line)? == 0 {
                return Ok(None);
            }
            if self.line.trim().is_empty() {
                continue;
            }

            let frame: RecordedFrame = serde_json::from_str(&self.line)?;
            let observations = frame
                .detections
                .into_iter()
                .filter(|det| self.wanted(det.class))
                .map(|det| {
                    let [cx, cy, w, h] = det.bbox;
                    ObservationBuilder::new(det.id)
                        .xywh(cx, cy, w, h)
                        .snap_to_pixel(self.snap_to_pixel)
                        .build()
                })
                .collect();
            return Ok(Some(observations));
        }
    }
}
