//! Track boundary models
//!
//! Two topologies share one interface:
//! - `LaneTrack`: `lane_count` concentric circles, `radius(i) = base + i * width`
//! - `EllipseTrack`: the annulus between an inner and an outer ellipse
//!
//! Both place points by `(offset, angle)` where the angle is a screen-space track
//! angle and the offset is a lane index (lanes) or a band fraction from the inner
//! boundary (0.0) to the outer boundary (1.0).

use glam::Vec2;
use serde::{Deserialize, Serialize};
use snafu::ensure;

use super::collision::Aabb;
use super::ellipse::Ellipse;
use crate::error::{InvalidTrackSnafu, RaceError};

/// A straight line segment
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Segment {
    pub start: Vec2,
    pub end: Vec2,
}

/// Position on a lane track
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LanePosition {
    pub lane: usize,
    /// Screen-space track angle (radians, unwrapped)
    pub angle: f32,
}

/// Concentric-circle lane track
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LaneTrack {
    pub center: Vec2,
    pub base_radius: f32,
    pub lane_width: f32,
    pub lane_count: usize,
}

impl LaneTrack {
    pub fn new(
        center: Vec2,
        base_radius: f32,
        lane_width: f32,
        lane_count: usize,
    ) -> Result<Self, RaceError> {
        ensure!(lane_count > 0, InvalidTrackSnafu { reason: "lane track needs at least one lane" });
        ensure!(
            base_radius.is_finite() && base_radius > 0.0,
            InvalidTrackSnafu {
                reason: format!("lane base radius must be positive, got {base_radius}"),
            }
        );
        // A positive width keeps lane radii strictly increasing
        ensure!(
            lane_width.is_finite() && lane_width > 0.0,
            InvalidTrackSnafu {
                reason: format!("lane width must be positive, got {lane_width}"),
            }
        );
        Ok(Self {
            center,
            base_radius,
            lane_width,
            lane_count,
        })
    }

    /// Radius of a lane centerline
    #[inline]
    pub fn radius(&self, lane: usize) -> f32 {
        self.base_radius + lane as f32 * self.lane_width
    }

    /// Lane after `lane`, wrapping back to the innermost
    #[inline]
    pub fn next_lane(&self, lane: usize) -> usize {
        (lane + 1) % self.lane_count
    }

    /// Point on a lane at a track angle
    pub fn position_for(&self, lane: usize, angle: f32) -> Vec2 {
        let r = self.radius(lane.min(self.lane_count - 1));
        self.center + Vec2::new(r * angle.cos(), r * angle.sin())
    }

    /// Inner edge of the drivable band (half a lane inside lane 0)
    pub fn inner_edge(&self) -> f32 {
        self.base_radius - self.lane_width / 2.0
    }

    /// Outer edge of the drivable band (half a lane outside the last lane)
    pub fn outer_edge(&self) -> f32 {
        self.radius(self.lane_count - 1) + self.lane_width / 2.0
    }

    pub fn contains_point(&self, point: Vec2) -> bool {
        let r = point.distance(self.center);
        r >= self.inner_edge() && r <= self.outer_edge()
    }
}

/// Elliptical annulus track
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EllipseTrack {
    pub inner: Ellipse,
    pub outer: Ellipse,
}

impl EllipseTrack {
    /// Build an annulus from inner and outer semi-axes around a shared center
    pub fn new(center: Vec2, inner_axes: Vec2, outer_axes: Vec2) -> Result<Self, RaceError> {
        ensure!(
            inner_axes.x > 0.0 && inner_axes.y > 0.0 && inner_axes.is_finite(),
            InvalidTrackSnafu {
                reason: format!("inner semi-axes must be positive, got {inner_axes}"),
            }
        );
        ensure!(
            outer_axes.is_finite(),
            InvalidTrackSnafu { reason: "outer semi-axes must be finite" }
        );
        let inner = Ellipse::new(center, inner_axes.x, inner_axes.y);
        let outer = Ellipse::new(center, outer_axes.x, outer_axes.y);
        ensure!(
            inner.strictly_inside(&outer),
            InvalidTrackSnafu {
                reason: format!(
                    "inner boundary {inner_axes} must lie strictly inside outer boundary {outer_axes}"
                ),
            }
        );
        Ok(Self { inner, outer })
    }

    #[inline]
    pub fn center(&self) -> Vec2 {
        self.outer.center
    }

    /// Inside the outer ellipse and outside the inner one
    #[inline]
    pub fn contains_point(&self, point: Vec2) -> bool {
        self.outer.contains_point(point) && !self.inner.contains_point(point)
    }

    /// Point across the band at a track angle (`band` 0.0 = inner edge, 1.0 = outer edge)
    pub fn position_for(&self, band: f32, angle: f32) -> Vec2 {
        self.inner.point_at(angle).lerp(self.outer.point_at(angle), band)
    }
}

/// Any supported track topology
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Track {
    Lanes(LaneTrack),
    Ellipse(EllipseTrack),
}

impl Track {
    pub fn center(&self) -> Vec2 {
        match self {
            Track::Lanes(lanes) => lanes.center,
            Track::Ellipse(annulus) => annulus.center(),
        }
    }

    /// Check a single point against the drivable region
    pub fn contains_point(&self, point: Vec2) -> bool {
        match self {
            Track::Lanes(lanes) => lanes.contains_point(point),
            Track::Ellipse(annulus) => annulus.contains_point(point),
        }
    }

    /// A shape is on track only if all four corners are
    pub fn is_on_track(&self, shape: &Aabb) -> bool {
        shape.corners().iter().all(|&c| self.contains_point(c))
    }

    /// Place a point by lane index / band fraction and track angle
    pub fn position_for(&self, offset: f32, angle: f32) -> Vec2 {
        match self {
            Track::Lanes(lanes) => lanes.position_for(offset.max(0.0).round() as usize, angle),
            Track::Ellipse(annulus) => annulus.position_for(offset, angle),
        }
    }

    /// Start/finish line from the outer to the inner boundary at a bearing
    pub fn finish_line(&self, bearing: f32) -> Segment {
        // Bearings are measured with y up, track angles with y down
        let angle = -bearing;
        match self {
            Track::Lanes(lanes) => {
                let dir = Vec2::new(angle.cos(), angle.sin());
                Segment {
                    start: lanes.center + dir * lanes.outer_edge(),
                    end: lanes.center + dir * lanes.inner_edge(),
                }
            }
            Track::Ellipse(annulus) => Segment {
                start: annulus.outer.point_at(angle),
                end: annulus.inner.point_at(angle),
            },
        }
    }

    pub fn as_lanes(&self) -> Option<&LaneTrack> {
        match self {
            Track::Lanes(lanes) => Some(lanes),
            Track::Ellipse(_) => None,
        }
    }

    pub fn as_ellipse(&self) -> Option<&EllipseTrack> {
        match self {
            Track::Lanes(_) => None,
            Track::Ellipse(annulus) => Some(annulus),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::f32::consts::{FRAC_PI_2, PI};

    fn circuit() -> EllipseTrack {
        EllipseTrack::new(
            Vec2::new(2000.0, 1000.0),
            Vec2::new(1600.0, 800.0),
            Vec2::new(2200.0, 1100.0),
        )
        .expect("valid circuit")
    }

    #[test]
    fn test_lane_radii_increase() {
        let lanes = LaneTrack::new(Vec2::new(400.0, 300.0), 200.0, 50.0, 4).expect("valid lanes");
        assert_eq!(lanes.radius(0), 200.0);
        assert_eq!(lanes.radius(3), 350.0);
        assert_eq!(lanes.next_lane(3), 0);
        assert_eq!(lanes.next_lane(1), 2);
    }

    #[test]
    fn test_lane_position_for() {
        let lanes = LaneTrack::new(Vec2::new(400.0, 300.0), 200.0, 50.0, 4).expect("valid lanes");
        let p = lanes.position_for(2, 0.0);
        assert!((p - Vec2::new(700.0, 300.0)).length() < 1e-4);
        let p = lanes.position_for(0, FRAC_PI_2);
        assert!((p - Vec2::new(400.0, 500.0)).length() < 1e-3);
    }

    #[test]
    fn test_invalid_tracks_rejected() {
        assert!(LaneTrack::new(Vec2::ZERO, 200.0, 50.0, 0).is_err());
        assert!(LaneTrack::new(Vec2::ZERO, 200.0, 0.0, 4).is_err());
        assert!(LaneTrack::new(Vec2::ZERO, -5.0, 50.0, 4).is_err());

        let swapped = EllipseTrack::new(Vec2::ZERO, Vec2::new(2200.0, 1100.0), Vec2::new(1600.0, 800.0));
        assert!(matches!(swapped, Err(RaceError::InvalidTrack { .. })));
        // Equal axis is not strictly inside
        let touching = EllipseTrack::new(Vec2::ZERO, Vec2::new(1600.0, 1100.0), Vec2::new(2200.0, 1100.0));
        assert!(touching.is_err());
    }

    #[test]
    fn test_annulus_contains_point() {
        let track = circuit();
        // Middle of the band, north of center
        assert!(track.contains_point(Vec2::new(2000.0, 50.0)));
        // Inside the infield
        assert!(!track.contains_point(Vec2::new(2000.0, 1000.0)));
        // Beyond the outer wall
        assert!(!track.contains_point(Vec2::new(2000.0, -150.0)));
    }

    #[test]
    fn test_band_position_stays_on_track() {
        let track = circuit();
        for i in 0..32 {
            let angle = i as f32 / 32.0 * 2.0 * PI;
            assert!(track.contains_point(track.position_for(0.5, angle)));
        }
    }

    #[test]
    fn test_finish_line_north_of_center() {
        let track = Track::Ellipse(circuit());
        let line = track.finish_line(FRAC_PI_2);
        assert!((line.start - Vec2::new(2000.0, -100.0)).length() < 1e-2);
        assert!((line.end - Vec2::new(2000.0, 200.0)).length() < 1e-2);
    }

    #[test]
    fn test_scenario_box_below_center_is_on_track() {
        let track = Track::Ellipse(circuit());
        let shape = Aabb::from_center_size(Vec2::new(2000.0, 1900.0), Vec2::splat(20.0));
        assert!(track.is_on_track(&shape));
    }

    #[test]
    fn test_box_straddling_inner_boundary_is_off_track() {
        let track = Track::Ellipse(circuit());
        // Inner boundary crosses y = 1800 directly below center
        let shape = Aabb::from_center_size(Vec2::new(2000.0, 1800.0), Vec2::splat(20.0));
        assert!(!track.is_on_track(&shape));
    }
}
