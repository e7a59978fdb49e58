use actuator_shared::{Channel, ControlPoint, Curve, CurveSet};
use serde::{Deserialize, Serialize};

pub const HIT_RADIUS: f32 = 10.0;

pub const ZOOM_MIN: f64 = 10.0;
pub const ZOOM_MAX: f64 = 1000.0;
const ZOOM_STEP: f64 = 20.0;
const SCRUB_SECS_PER_PX: f64 = 0.002;

#[derive(Debug, Copy, Clone, PartialEq)]
pub struct Viewport {
    pub visible_start: f64,
    pub px_per_sec: f64,
    pub width: f32,
    pub height: f32,
    pub value_range: f64,
}

impl Default for Viewport {
    fn default() -> Self {
        Self {
            visible_start: 0.0,
            px_per_sec: 100.0,
            width: 1000.0,
            height: 400.0,
            value_range: 1023.0,
        }
    }
}

impl Viewport {
    pub fn x_to_time(&self, x: f32) -> f64 {
        self.visible_start + x as f64 / self.px_per_sec
    }

    pub fn time_to_x(&self, time: f64) -> f32 {
        ((time - self.visible_start) * self.px_per_sec) as f32
    }

    pub fn y_to_value(&self, y: f32) -> f64 {
        self.value_range - (y as f64 / self.height as f64) * self.value_range
    }

    pub fn value_to_y(&self, value: f64) -> f32 {
        self.height - ((value / self.value_range) * self.height as f64) as f32
    }

    pub fn to_screen(&self, point: ControlPoint) -> (f32, f32) {
        (self.time_to_x(point.time), self.value_to_y(point.value))
    }

    pub fn to_point(&self, x: f32, y: f32) -> ControlPoint {
        let x = x.clamp(0.0, self.width);
        let y = y.clamp(0.0, self.height);
        ControlPoint::new(self.x_to_time(x).max(0.0), self.y_to_value(y))
    }

    pub fn max_visible_start(&self, duration: f64) -> f64 {
        (duration - self.width as f64 / self.px_per_sec).max(0.0)
    }
}

// Logarithmic, never zoomed out past the whole track.
pub fn zoom_px_per_sec(slider: f64, width: f32, duration: f64) -> f64 {
    let log_zoom = 100f64.powf(slider / 1000.0);
    if duration > 0.0 {
        log_zoom.max(width as f64 / duration)
    } else {
        log_zoom
    }
}

pub fn wheel_zoom(slider: f64, delta_y: f32) -> f64 {
    let step = if delta_y > 0.0 { -ZOOM_STEP } else { ZOOM_STEP };
    (slider + step).clamp(ZOOM_MIN, ZOOM_MAX)
}

pub fn scrub(position: f64, delta_x: f32, duration: f64) -> f64 {
    (position + delta_x as f64 * SCRUB_SECS_PER_PX).clamp(0.0, duration.max(0.0))
}

pub fn find_point(curve: &Curve, view: &Viewport, x: f32, y: f32) -> Option<usize> {
    curve.points().iter().position(|point| {
        let (px, py) = view.to_screen(*point);
        ((x - px).powi(2) + (y - py).powi(2)).sqrt() < HIT_RADIUS
    })
}

#[derive(Debug, Default, Copy, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum EditMode {
    #[default]
    Add,
    Delete,
}

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
struct Drag {
    channel: Channel,
    index: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorState {
    pub draw_enabled: bool,
    pub mode: EditMode,
    active: Channel,
    #[serde(skip)]
    drag: Option<Drag>,
    #[serde(skip)]
    preview: Option<ControlPoint>,
}

impl Default for EditorState {
    fn default() -> Self {
        Self {
            draw_enabled: false,
            mode: EditMode::Add,
            active: Channel::Position,
            drag: None,
            preview: None,
        }
    }
}

impl EditorState {
    pub fn active(&self) -> Channel {
        self.active
    }

    pub fn preview(&self) -> Option<ControlPoint> {
        self.preview
    }

    pub fn dragging(&self) -> Option<(Channel, usize)> {
        self.drag.map(|drag| (drag.channel, drag.index))
    }

    pub fn select(&mut self, channel: Channel) {
        self.active = channel;
        self.cancel();
    }

    pub fn toggle_draw(&mut self) {
        self.draw_enabled = !self.draw_enabled;
        self.cancel();
    }

    pub fn toggle_mode(&mut self) {
        self.mode = match self.mode {
            EditMode::Add => EditMode::Delete,
            EditMode::Delete => EditMode::Add,
        };
        self.cancel();
    }

    pub fn cancel(&mut self) {
        self.drag = None;
        self.preview = None;
    }

    pub fn pointer_down(&mut self, curves: &mut CurveSet, view: &Viewport, x: f32, y: f32) {
        if !self.draw_enabled {
            return;
        }

        let curve = curves.curve_mut(self.active);
        let hit = find_point(curve, view, x, y);

        match self.mode {
            EditMode::Add => match hit {
                Some(index) => {
                    self.drag = Some(Drag {
                        channel: self.active,
                        index,
                    })
                }
                None => self.preview = Some(view.to_point(x, y)),
            },
            EditMode::Delete => {
                if let Some(index) = hit {
                    curve.remove(index);
                }
            }
        }
    }

    pub fn pointer_move(&mut self, curves: &mut CurveSet, view: &Viewport, x: f32, y: f32) {
        if !self.draw_enabled {
            return;
        }

        let point = view.to_point(x, y);

        if let Some(drag) = self.drag {
            self.drag = curves
                .curve_mut(drag.channel)
                .move_point(drag.index, point)
                .map(|index| Drag { index, ..drag });
        } else if let Some(preview) = &mut self.preview {
            *preview = point;
        }
    }

    /// True when the curves changed since the press.
    pub fn pointer_up(&mut self, curves: &mut CurveSet) -> bool {
        if !self.draw_enabled {
            return false;
        }

        if self.drag.take().is_some() {
            return true;
        }

        match self.preview.take() {
            Some(point) => {
                curves.curve_mut(self.active).insert(point);
                true
            }
            None => false,
        }
    }
}
