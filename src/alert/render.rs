use crate::geometry::{BoundingRegion, Point};
use crate::tracker::{TrackId, TrackPhase, TrackStatus};
use crate::zone::ZoneMembership;

/// Visual class of a tracked object.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorClass {
    Normal,
    Alerted,
    ZoneViolation,
}

impl ColorClass {
    /// RGB triple for overlay drawing.
    pub fn rgb(self) -> [u8; 3] {
        match self {
            ColorClass::Normal => [0, 255, 0],
            ColorClass::Alerted => [255, 0, 0],
            ColorClass::ZoneViolation => [255, 0, 255],
        }
    }
}

/// What the rendering layer should draw for one identity this frame.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderDirective {
    pub track_id: TrackId,
    pub region: BoundingRegion,
    pub color: ColorClass,
    pub label: String,
    /// Point the zone decision was made on, when a zone is configured
    pub zone_anchor: Option<Point>,
}

impl RenderDirective {
    /// Directive for `status`, drawn in `phase`.
    ///
    /// Zone membership outranks the stationary alert when picking the color.
    pub fn for_track(
        status: &TrackStatus,
        phase: TrackPhase,
        membership: Option<ZoneMembership>,
        zone_anchor: Option<Point>,
    ) -> Self {
        let in_zone = membership.is_some_and(ZoneMembership::is_inside);
        let color = if in_zone {
            ColorClass::ZoneViolation
        } else if phase == TrackPhase::Alerted {
            ColorClass::Alerted
        } else {
            ColorClass::Normal
        };

        // whole seconds, truncated
        let mut label = format!(
            "ID: {} Time: {}s",
            status.track_id, status.stationary_seconds as u64
        );
        if in_zone {
            label.push_str(" IN ZONE");
        }

        Self {
            track_id: status.track_id,
            region: status.region,
            color,
            label,
            zone_anchor,
        }
    }
}
