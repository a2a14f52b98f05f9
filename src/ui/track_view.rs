use egui::{Align2, Color32, FontId, Pos2, Rect, Sense, Shape, Stroke, Ui, Vec2};

use raceplay::dataset::track_status_label;
use raceplay::palette;
use raceplay::projection::{self, CanvasTransform, Point2D, Projector, SceneCamera};
use raceplay::standings::{format_lap, format_race_time};
use raceplay::{AppConfig, ReplaySession, ViewMode};

use super::{PALETTE_GREY, to_color32};

const MARKER_RADIUS: f32 = 6.;
const SELECTED_MARKER_RADIUS: f32 = 9.;
const CLICK_DISTANCE: f32 = 14.;
const SCENE_GRID_SPACING: f64 = 50.;

/// Maps raw telemetry coordinates to screen pixels for one view mode.
enum ScreenMapping {
    Canvas {
        origin: Pos2,
        transform: CanvasTransform,
    },
    /// Scene space seen from above with a fixed camera around the viewport center.
    Scene(SceneCamera),
}

impl ScreenMapping {
    fn new(projector: &Projector, rect: Rect, config: &AppConfig, view_mode: ViewMode) -> Self {
        let (width, height) = (rect.width() as f64, rect.height() as f64);
        match view_mode {
            ViewMode::Canvas => Self::Canvas {
                origin: rect.min,
                transform: projector.canvas(width, height, config.canvas_padding),
            },
            ViewMode::Scene => Self::Scene(SceneCamera {
                center: Point2D::new(rect.center().x as f64, rect.center().y as f64),
                scale: config.scene_scale,
                zoom: config.scene_zoom,
            }),
        }
    }

    fn to_screen(&self, projector: &Projector, x: f64, y: f64) -> Pos2 {
        match self {
            Self::Canvas { origin, transform } => {
                let p = transform.apply(projector, x, y);
                Pos2::new(origin.x + p.x as f32, origin.y + p.y as f32)
            }
            Self::Scene(camera) => {
                let p = camera.apply(projector, x, y);
                Pos2::new(p.x as f32, p.y as f32)
            }
        }
    }
}

fn scene_grid(rect: Rect, mapping: &ScreenMapping) -> Vec<Shape> {
    let ScreenMapping::Scene(camera) = mapping else {
        return Vec::new();
    };
    let center = Pos2::new(camera.center.x as f32, camera.center.y as f32);
    let spacing = (SCENE_GRID_SPACING * camera.zoom) as f32;
    if spacing < 4. {
        return Vec::new();
    }

    let stroke = Stroke::new(1., Color32::from_gray(28));
    let mut shapes = Vec::new();
    let mut offset = 0.;
    while center.x - offset >= rect.left() || center.y - offset >= rect.top() {
        for x in [center.x - offset, center.x + offset] {
            shapes.push(Shape::line_segment(
                [Pos2::new(x, rect.top()), Pos2::new(x, rect.bottom())],
                stroke,
            ));
        }
        for y in [center.y - offset, center.y + offset] {
            shapes.push(Shape::line_segment(
                [Pos2::new(rect.left(), y), Pos2::new(rect.right(), y)],
                stroke,
            ));
        }
        offset += spacing;
    }
    shapes
}

/// Draws the circuit, the start/finish marker and every driver with telemetry in the current
/// frame. Returns the driver whose marker was clicked.
pub(crate) fn track_view(
    ui: &mut Ui,
    session: &ReplaySession,
    config: &AppConfig,
    view_mode: ViewMode,
) -> Option<String> {
    let (response, painter) = ui.allocate_painter(ui.available_size(), Sense::click());
    let rect = response.rect;
    let dataset = session.dataset();
    let projector = session.projector();
    let mapping = ScreenMapping::new(projector, rect, config, view_mode);

    let mut shapes = scene_grid(rect, &mapping);

    // track outline
    let outline: Vec<Pos2> = projection::decimate(&dataset.track, config.track_decimation)
        .iter()
        .map(|p| mapping.to_screen(projector, p.x, p.y))
        .collect();
    shapes.push(Shape::line(outline, Stroke::new(4., PALETTE_GREY)));
    if let Some((x, y)) = dataset.track.start_finish() {
        shapes.push(Shape::rect_filled(
            Rect::from_center_size(mapping.to_screen(projector, x, y), Vec2::new(12., 4.)),
            1.,
            Color32::WHITE,
        ));
    }
    painter.extend(shapes);

    let (time, lap) = session.current_time_and_lap();
    let mut overlay = format!(
        "{}\n{}",
        format_lap(lap, dataset.total_laps),
        format_race_time(time)
    );
    if let Some(status) = dataset.track_status_at(time) {
        overlay.push('\n');
        overlay.push_str(&track_status_label(&status));
    }
    painter.text(
        rect.left_top() + Vec2::new(12., 12.),
        Align2::LEFT_TOP,
        overlay,
        FontId::proportional(16.),
        Color32::WHITE,
    );

    let Some(frame) = session.current_frame() else {
        painter.text(
            rect.center(),
            Align2::CENTER_CENTER,
            "Loading frame data...",
            FontId::proportional(18.),
            PALETTE_GREY,
        );
        return None;
    };

    let selected = session.selected_driver();
    let mut markers = projection::driver_markers(frame, |x, y| {
        let p = mapping.to_screen(projector, x, y);
        Point2D::new(p.x as f64, p.y as f64)
    });
    // selected driver is painted last so it sits on top
    markers.sort_by_key(|(code, _)| Some(*code) == selected);

    for (code, point) in &markers {
        let pos = Pos2::new(point.x as f32, point.y as f32);
        let color = to_color32(palette::driver_color(&dataset.driver_colors, code));
        let is_selected = Some(*code) == selected;
        let radius = if is_selected {
            SELECTED_MARKER_RADIUS
        } else {
            MARKER_RADIUS
        };

        painter.circle_filled(pos, radius, color);
        if is_selected {
            painter.circle_stroke(pos, radius, Stroke::new(2., Color32::WHITE));
        }
        painter.text(
            pos - Vec2::new(0., radius + 2.),
            Align2::CENTER_BOTTOM,
            *code,
            FontId::proportional(11.),
            color,
        );
    }

    let click = response.interact_pointer_pos().filter(|_| response.clicked())?;
    markers
        .iter()
        .map(|(code, point)| {
            let distance = Pos2::new(point.x as f32, point.y as f32).distance(click);
            (code, distance)
        })
        .filter(|(_, distance)| *distance <= CLICK_DISTANCE)
        .min_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(code, _)| code.to_string())
}
