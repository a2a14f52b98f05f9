// Coordinate projection from raw telemetry space into renderable space
//
// Both render targets share the same first two steps: translate by the center of the track's
// bounding box and rotate by the circuit rotation. The scene target then scales by a fixed factor
// and inverts the y axis, the canvas target fits the rotated track into a padded viewport without
// inverting y.

use serde::{Deserialize, Serialize};

use crate::dataset::{Frame, TrackOutline};

/// Scale applied to raw coordinates in scene space.
pub const DEFAULT_SCENE_SCALE: f64 = 0.1;

/// Represents a 2D coordinate point
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Point2D {
    pub x: f64,
    pub y: f64,
}

impl Point2D {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn distance(&self, other: &Point2D) -> f64 {
        ((self.x - other.x).powi(2) + (self.y - other.y).powi(2)).sqrt()
    }
}

/// Bounding box for coordinate calculations
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    pub min_x: f64,
    pub max_x: f64,
    pub min_y: f64,
    pub max_y: f64,
}

impl BoundingBox {
    pub fn new() -> Self {
        Self {
            min_x: f64::INFINITY,
            max_x: f64::NEG_INFINITY,
            min_y: f64::INFINITY,
            max_y: f64::NEG_INFINITY,
        }
    }

    pub fn from_points(points: impl IntoIterator<Item = Point2D>) -> Self {
        let mut bbox = Self::new();
        for point in points {
            bbox.update(point);
        }
        bbox
    }

    pub fn update(&mut self, point: Point2D) {
        self.min_x = self.min_x.min(point.x);
        self.max_x = self.max_x.max(point.x);
        self.min_y = self.min_y.min(point.y);
        self.max_y = self.max_y.max(point.y);
    }

    pub fn is_empty(&self) -> bool {
        self.min_x > self.max_x || self.min_y > self.max_y
    }

    pub fn width(&self) -> f64 {
        self.max_x - self.min_x
    }

    pub fn height(&self) -> f64 {
        self.max_y - self.min_y
    }

    pub fn center(&self) -> Point2D {
        if self.is_empty() {
            return Point2D::default();
        }
        Point2D::new(
            (self.min_x + self.max_x) / 2.0,
            (self.min_y + self.max_y) / 2.0,
        )
    }
}

impl Default for BoundingBox {
    fn default() -> Self {
        Self::new()
    }
}

/// Which rendering convention to project into.
#[derive(Serialize, Deserialize, Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ViewMode {
    /// Fit-to-viewport 2D canvas, y axis kept as in the raw data
    #[default]
    Canvas,
    /// Fixed-scale scene space seen from above, y axis inverted
    Scene,
}

/// Rotates `point` about the origin by `degrees`.
pub fn rotate(point: Point2D, degrees: f64) -> Point2D {
    let (sin, cos) = degrees.to_radians().sin_cos();
    Point2D::new(
        point.x * cos - point.y * sin,
        point.x * sin + point.y * cos,
    )
}

/// Projects one raw point: center on `origin`, rotate by `rotation_degrees`, then scale.
pub fn project(raw: Point2D, origin: Point2D, rotation_degrees: f64, scale: f64) -> Point2D {
    let rotated = rotate(
        Point2D::new(raw.x - origin.x, raw.y - origin.y),
        rotation_degrees,
    );
    Point2D::new(rotated.x * scale, rotated.y * scale)
}

/// Keeps every `step`th outline point. The first point always survives since it anchors the
/// start/finish marker.
pub fn decimate(track: &TrackOutline, step: usize) -> Vec<Point2D> {
    track
        .points()
        .step_by(step.max(1))
        .map(|(x, y)| Point2D::new(x, y))
        .collect()
}

/// Scale that fits a track with extent `bounds` into a `width` x `height` viewport leaving
/// `padding` on every side. Degenerate extents fall back to a scale of 1.
pub fn fit_scale(bounds: &BoundingBox, width: f64, height: f64, padding: f64) -> f64 {
    if bounds.is_empty() {
        return 1.0;
    }
    let avail_w = (width - padding * 2.0).max(1.0);
    let avail_h = (height - padding * 2.0).max(1.0);
    let scale_w = if bounds.width() > 0.0 {
        avail_w / bounds.width()
    } else {
        f64::INFINITY
    };
    let scale_h = if bounds.height() > 0.0 {
        avail_h / bounds.height()
    } else {
        f64::INFINITY
    };
    let scale = scale_w.min(scale_h);
    if scale.is_finite() { scale } else { 1.0 }
}

/// Dataset-wide projector. The track center and the rotated extent are computed once per
/// dataset, every frame reuses them.
#[derive(Debug, Clone)]
pub struct Projector {
    origin: Point2D,
    rotation_degrees: f64,
    rotated_bounds: BoundingBox,
}

impl Projector {
    pub fn new(track: &TrackOutline, rotation_degrees: f64) -> Self {
        let raw_bounds =
            BoundingBox::from_points(track.points().map(|(x, y)| Point2D::new(x, y)));
        let origin = raw_bounds.center();
        let rotated_bounds = BoundingBox::from_points(
            track
                .points()
                .map(|(x, y)| project(Point2D::new(x, y), origin, rotation_degrees, 1.0)),
        );

        Self {
            origin,
            rotation_degrees,
            rotated_bounds,
        }
    }

    /// Centers and rotates a raw point without any target specific scaling.
    pub fn center_and_rotate(&self, x: f64, y: f64) -> Point2D {
        project(Point2D::new(x, y), self.origin, self.rotation_degrees, 1.0)
    }

    /// Scene space: fixed scale with the y axis inverted, so raw "up" is render "forward".
    pub fn to_scene(&self, x: f64, y: f64, scale: f64) -> Point2D {
        let p = project(Point2D::new(x, y), self.origin, self.rotation_degrees, scale);
        Point2D::new(p.x, -p.y)
    }

    /// Builds the transform that fits this track into a canvas of the given size.
    pub fn canvas(&self, width: f64, height: f64, padding: f64) -> CanvasTransform {
        CanvasTransform {
            scale: fit_scale(&self.rotated_bounds, width, height, padding),
            center: Point2D::new(width / 2.0, height / 2.0),
        }
    }
}

/// Final placement of centered and rotated points on a 2D canvas.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CanvasTransform {
    pub scale: f64,
    pub center: Point2D,
}

impl CanvasTransform {
    pub fn apply(&self, projector: &Projector, x: f64, y: f64) -> Point2D {
        let p = projector.center_and_rotate(x, y);
        Point2D::new(
            self.center.x + p.x * self.scale,
            self.center.y + p.y * self.scale,
        )
    }
}

/// Top-down camera over scene space. Raw units become scene units through the fixed `scale`,
/// then `zoom` screen pixels per scene unit around `center`. Neither depends on the viewport.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SceneCamera {
    pub center: Point2D,
    pub scale: f64,
    pub zoom: f64,
}

impl SceneCamera {
    pub fn apply(&self, projector: &Projector, x: f64, y: f64) -> Point2D {
        let p = projector.to_scene(x, y, self.scale);
        Point2D::new(self.center.x + p.x * self.zoom, self.center.y + p.y * self.zoom)
    }
}

/// Projected marker position for every driver with telemetry in `frame`. Drivers with a null
/// coordinate are skipped, as is a frame without positions.
pub fn driver_markers<'f>(
    frame: &'f Frame,
    mut project: impl FnMut(f64, f64) -> Point2D,
) -> Vec<(&'f str, Point2D)> {
    let Some(positions) = frame.positions.as_ref() else {
        return Vec::new();
    };
    positions
        .iter()
        .filter_map(|(code, pos)| {
            pos.coordinates()
                .map(|(x, y)| (code.as_str(), project(x, y)))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dataset::DriverPosition;
    use proptest::prelude::*;
    use std::collections::BTreeMap;

    const TOLERANCE: f64 = 1e-9;

    fn square_track() -> TrackOutline {
        TrackOutline {
            x: vec![0., 100., 100., 0.],
            y: vec![0., 0., 50., 50.],
        }
    }

    fn assert_close(a: Point2D, b: Point2D) {
        assert!(
            a.distance(&b) < TOLERANCE,
            "{:?} and {:?} differ by {}",
            a,
            b,
            a.distance(&b)
        );
    }

    #[test]
    fn test_center_is_bounding_box_center() {
        let projector = Projector::new(&square_track(), 0.);
        assert_eq!(projector.origin, Point2D::new(50., 25.));
        assert_close(projector.center_and_rotate(50., 25.), Point2D::new(0., 0.));
    }

    #[test]
    fn test_rotation_by_90_degrees() {
        let rotated = rotate(Point2D::new(1., 0.), 90.);
        assert_close(rotated, Point2D::new(0., 1.));
    }

    #[test]
    fn test_start_finish_anchor_matches_first_point() {
        let track = square_track();
        let projector = Projector::new(&track, 0.);
        let decimated = decimate(&track, 3);
        let anchor = decimated[0];

        let first = projector.center_and_rotate(track.x[0], track.y[0]);
        assert_close(projector.center_and_rotate(anchor.x, anchor.y), first);
        assert_close(first, Point2D::new(-50., -25.));
    }

    #[test]
    fn test_scene_inverts_y() {
        let projector = Projector::new(&square_track(), 0.);
        let p = projector.to_scene(100., 50., DEFAULT_SCENE_SCALE);
        assert_close(p, Point2D::new(5., -2.5));
    }

    #[test]
    fn test_canvas_fits_track_with_padding() {
        let projector = Projector::new(&square_track(), 0.);
        let canvas = projector.canvas(300., 300., 50.);
        // 200px available for a 100 unit wide track
        assert!((canvas.scale - 2.0).abs() < TOLERANCE);
        assert_close(canvas.apply(&projector, 0., 0.), Point2D::new(50., 100.));
        assert_close(canvas.apply(&projector, 100., 50.), Point2D::new(250., 200.));
    }

    #[test]
    fn test_scene_scale_is_not_fitted_away() {
        let projector = Projector::new(&square_track(), 0.);
        let camera = SceneCamera {
            center: Point2D::new(400., 300.),
            scale: DEFAULT_SCENE_SCALE,
            zoom: 2.,
        };
        // 50 raw units right of center, 5 scene units, 10 pixels
        assert_close(camera.apply(&projector, 100., 25.), Point2D::new(410., 300.));
        assert_close(camera.apply(&projector, 50., 50.), Point2D::new(400., 295.));

        let doubled = SceneCamera {
            scale: DEFAULT_SCENE_SCALE * 2.,
            ..camera
        };
        assert_close(doubled.apply(&projector, 100., 25.), Point2D::new(420., 300.));
    }

    #[test]
    fn test_single_point_track_does_not_divide_by_zero() {
        let track = TrackOutline {
            x: vec![10.],
            y: vec![10.],
        };
        let projector = Projector::new(&track, 45.);
        let canvas = projector.canvas(200., 100., 10.);
        assert_eq!(canvas.scale, 1.0);
        assert_close(canvas.apply(&projector, 10., 10.), Point2D::new(100., 50.));
    }

    #[test]
    fn test_decimate_keeps_first_point() {
        let track = square_track();
        assert_eq!(
            decimate(&track, 2),
            vec![Point2D::new(0., 0.), Point2D::new(100., 50.)]
        );
        assert_eq!(decimate(&track, 0).len(), 4);
        assert_eq!(decimate(&track, 10), vec![Point2D::new(0., 0.)]);
    }

    #[test]
    fn test_driver_without_coordinates_is_skipped() {
        let mut positions = BTreeMap::new();
        positions.insert(
            "VER".to_string(),
            DriverPosition {
                x: Some(10.),
                y: Some(20.),
                ..Default::default()
            },
        );
        positions.insert(
            "HAM".to_string(),
            DriverPosition {
                x: None,
                y: Some(20.),
                ..Default::default()
            },
        );
        positions.insert(
            "LEC".to_string(),
            DriverPosition {
                x: Some(5.),
                y: None,
                ..Default::default()
            },
        );
        let frame = Frame {
            time: 0.,
            lap: 1,
            positions: Some(positions),
        };

        let markers = driver_markers(&frame, |x, y| Point2D::new(x, y));
        assert_eq!(markers, vec![("VER", Point2D::new(10., 20.))]);
    }

    #[test]
    fn test_frame_without_positions_has_no_markers() {
        let frame = Frame::default();
        assert!(driver_markers(&frame, |x, y| Point2D::new(x, y)).is_empty());
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(200))]

        #[test]
        fn prop_full_turn_equals_no_rotation(
            x in -10_000.0f64..10_000.0,
            y in -10_000.0f64..10_000.0,
            ox in -1_000.0f64..1_000.0,
            oy in -1_000.0f64..1_000.0,
        ) {
            let origin = Point2D::new(ox, oy);
            let a = project(Point2D::new(x, y), origin, 360., 1.);
            let b = project(Point2D::new(x, y), origin, 0., 1.);
            prop_assert!(a.distance(&b) < 1e-6);
        }

        #[test]
        fn prop_rotation_preserves_distance_to_center(
            x in -10_000.0f64..10_000.0,
            y in -10_000.0f64..10_000.0,
            degrees in -720.0f64..720.0,
        ) {
            let origin = Point2D::default();
            let rotated = project(Point2D::new(x, y), origin, degrees, 1.);
            let expected = Point2D::new(x, y).distance(&origin);
            prop_assert!((rotated.distance(&origin) - expected).abs() < 1e-6);
        }
    }
}
