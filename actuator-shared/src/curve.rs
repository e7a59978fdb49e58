use serde::{Deserialize, Serialize};

#[derive(Debug, Default, Copy, Clone, PartialEq, Serialize, Deserialize)]
pub struct ControlPoint {
    pub time: f64,
    pub value: f64,
}

impl ControlPoint {
    pub fn new(time: f64, value: f64) -> Self {
        Self { time, value }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Channel {
    Position,
    Amplitude,
    Force,
}

impl Channel {
    pub const ALL: [Channel; 3] = [Channel::Position, Channel::Amplitude, Channel::Force];

    pub fn name(&self) -> &'static str {
        match self {
            Channel::Position => "Position",
            Channel::Amplitude => "Amplitude",
            Channel::Force => "Force",
        }
    }
}

impl std::fmt::Display for Channel {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
#[serde(from = "Vec<ControlPoint>", into = "Vec<ControlPoint>")]
pub struct Curve {
    points: Vec<ControlPoint>,
}

impl From<Vec<ControlPoint>> for Curve {
    fn from(mut points: Vec<ControlPoint>) -> Self {
        sort_by_time(&mut points);
        Self { points }
    }
}

impl From<Curve> for Vec<ControlPoint> {
    fn from(curve: Curve) -> Self {
        curve.points
    }
}

impl Curve {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn points(&self) -> &[ControlPoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    /// Inserts after any points with the same time and returns the new index.
    pub fn insert(&mut self, point: ControlPoint) -> usize {
        let index = self.points.partition_point(|p| p.time <= point.time);
        self.points.insert(index, point);
        index
    }

    pub fn remove(&mut self, index: usize) -> Option<ControlPoint> {
        (index < self.points.len()).then(|| self.points.remove(index))
    }

    pub fn move_point(&mut self, index: usize, point: ControlPoint) -> Option<usize> {
        self.remove(index)?;
        Some(self.insert(point))
    }

    pub fn clear(&mut self) {
        self.points.clear();
    }

    /// Held flat before the first and after the last point, 0 outside `[0, end_time]`.
    pub fn value_at(&self, time: f64, end_time: f64) -> i32 {
        let (Some(first), Some(last)) = (self.points.first(), self.points.last()) else {
            return 0;
        };

        if !time.is_finite() || time < 0.0 || time > end_time {
            return 0;
        }

        let mut all_points = Vec::with_capacity(self.points.len() + 2);
        all_points.push(ControlPoint::new(0.0, first.value));
        all_points.extend_from_slice(&self.points);
        all_points.push(ControlPoint::new(end_time, last.value));
        sort_by_time(&mut all_points);

        all_points
            .windows(2)
            .find(|pair| pair[0].time <= time && time <= pair[1].time)
            .map(|pair| round(interpolate(pair[0], pair[1], time)))
            .unwrap_or(0)
    }
}

#[derive(Debug, Default, Clone, PartialEq, Serialize, Deserialize)]
pub struct CurveSet {
    pub position: Curve,
    pub amplitude: Curve,
    pub force: Curve,
}

impl CurveSet {
    pub fn curve(&self, channel: Channel) -> &Curve {
        match channel {
            Channel::Position => &self.position,
            Channel::Amplitude => &self.amplitude,
            Channel::Force => &self.force,
        }
    }

    pub fn curve_mut(&mut self, channel: Channel) -> &mut Curve {
        match channel {
            Channel::Position => &mut self.position,
            Channel::Amplitude => &mut self.amplitude,
            Channel::Force => &mut self.force,
        }
    }

    pub fn value_at(&self, channel: Channel, time: f64, end_time: f64) -> i32 {
        self.curve(channel).value_at(time, end_time)
    }
}

fn interpolate(p1: ControlPoint, p2: ControlPoint, time: f64) -> f64 {
    if p1.time == p2.time {
        return p2.value;
    }

    let t = (time - p1.time) / (p2.time - p1.time);
    p1.value + t * (p2.value - p1.value)
}

fn round(value: f64) -> i32 {
    value.round() as i32
}

fn sort_by_time(points: &mut [ControlPoint]) {
    points.sort_by(|a, b| a.time.total_cmp(&b.time));
}
