use actuator_shared::{Channel, ControlPoint, CurveSet};
use eframe::{
    egui::{Sense, Ui},
    emath,
    epaint::{self, Color32, PathShape, Pos2, Rect, Shape, Stroke, Vec2},
};

use crate::{
    editor::{EditorState, Viewport, HIT_RADIUS},
    track::Track,
};

const CANVAS_HEIGHT: f32 = 400.0;
const POINT_RADIUS: f32 = 4.0;

pub fn channel_colors(channel: Channel) -> (Color32, Color32) {
    match channel {
        Channel::Position => (
            Color32::RED,
            Color32::from_rgba_unmultiplied(255, 0, 0, 77),
        ),
        Channel::Amplitude => (
            Color32::GREEN,
            Color32::from_rgba_unmultiplied(0, 255, 0, 77),
        ),
        Channel::Force => (
            Color32::BLUE,
            Color32::from_rgba_unmultiplied(0, 0, 255, 77),
        ),
    }
}

pub struct CanvasResponse {
    /// Curves changed by a finished drag or a committed point.
    pub edited: bool,
    pub scroll: Option<Vec2>,
}

/// Draws every channel over the track and routes pointer input to the editor.
pub struct ChannelCanvas<'a> {
    pub curves: &'a mut CurveSet,
    pub editor: &'a mut EditorState,
    pub track: Option<&'a Track>,
    pub playhead: f64,
    pub duration: f64,
}

impl<'a> ChannelCanvas<'a> {
    pub fn ui(mut self, ui: &mut Ui, view: &mut Viewport) -> CanvasResponse {
        let (response, painter) = ui.allocate_painter(
            Vec2::new(ui.available_width(), CANVAS_HEIGHT),
            Sense::click_and_drag(),
        );

        let rect = response.rect;
        view.width = rect.width();
        view.height = rect.height();

        let to_screen =
            emath::RectTransform::from_to(Rect::from_min_size(Pos2::ZERO, rect.size()), rect);

        let (pressed, released, pointer, scroll) = ui.input(|i| {
            (
                i.pointer.primary_pressed(),
                i.pointer.primary_released(),
                i.pointer.interact_pos(),
                i.scroll_delta,
            )
        });

        let mut edited = false;

        if let Some(pos) = pointer {
            let local = pos - rect.min;

            if pressed && rect.contains(pos) {
                self.editor
                    .pointer_down(self.curves, view, local.x, local.y);
            }

            self.editor
                .pointer_move(self.curves, view, local.x, local.y);

            if released {
                edited = self.editor.pointer_up(self.curves);
            }
        }

        painter.add(epaint::RectShape::stroke(
            rect,
            0.0,
            Stroke::new(2.0, Color32::LIGHT_GREEN.linear_multiply(0.25)),
        ));

        if let Some(track) = self.track {
            let middle = rect.height() / 2.0;
            let stroke = Stroke::new(1.0, Color32::from_gray(90));

            for column in 0..rect.width() as usize {
                let x = column as f32;
                let peak = track.peak_at(view.x_to_time(x)) * middle;
                if peak > 0.0 {
                    painter.line_segment(
                        [
                            to_screen * Pos2::new(x, middle - peak),
                            to_screen * Pos2::new(x, middle + peak),
                        ],
                        stroke,
                    );
                }
            }
        }

        for channel in Channel::ALL {
            let mut points = self.curves.curve(channel).points().to_vec();

            if channel == self.editor.active() {
                if let Some(preview) = self.editor.preview() {
                    points.push(preview);
                    points.sort_by(|a, b| a.time.total_cmp(&b.time));
                }
            }

            let (Some(first), Some(last)) = (points.first().copied(), points.last().copied())
            else {
                continue;
            };

            let mut all_points = Vec::with_capacity(points.len() + 2);
            all_points.push(ControlPoint::new(0.0, first.value));
            all_points.extend(points);
            all_points.push(ControlPoint::new(self.duration, last.value));

            let points_in_screen: Vec<Pos2> = all_points
                .iter()
                .map(|point| {
                    let (x, y) = view.to_screen(*point);
                    to_screen * Pos2::new(x, y)
                })
                .collect();

            let (line, fill) = channel_colors(channel);

            for pair in points_in_screen.windows(2) {
                painter.add(Shape::convex_polygon(
                    vec![
                        pair[0],
                        pair[1],
                        Pos2::new(pair[1].x, rect.bottom()),
                        Pos2::new(pair[0].x, rect.bottom()),
                    ],
                    fill,
                    Stroke::NONE,
                ));
            }

            // Index 0 is the implied start point.
            let dragged = self
                .editor
                .dragging()
                .filter(|(dragged, _)| *dragged == channel)
                .map(|(_, index)| index + 1);

            for (index, point) in points_in_screen.iter().enumerate() {
                painter.circle_filled(*point, POINT_RADIUS, line);
                if dragged == Some(index) {
                    painter.add(Shape::circle_stroke(
                        *point,
                        HIT_RADIUS,
                        Stroke::new(1.0, Color32::WHITE),
                    ));
                }
            }

            painter.add(PathShape::line(points_in_screen, Stroke::new(2.0, line)));
        }

        {
            let x = view.time_to_x(self.playhead);
            let points_in_screen: Vec<Pos2> = [Pos2::new(x, 0.0), Pos2::new(x, rect.height())]
                .iter()
                .map(|p| to_screen * *p)
                .collect();

            painter.add(PathShape::line(
                points_in_screen,
                Stroke::new(2.0, Color32::WHITE.linear_multiply(0.5)),
            ));
        }

        CanvasResponse {
            edited,
            scroll: (response.hovered() && scroll != Vec2::ZERO).then_some(scroll),
        }
    }
}
