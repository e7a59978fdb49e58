pub mod curve;
pub mod drive;
pub mod frame;

pub use curve::{Channel, ControlPoint, Curve, CurveSet};
pub use drive::DriveSettings;
pub use frame::{to_hex, Frame, FrameError, ParseProtocolError, ProtocolVersion, TickInput};

pub const DEFAULT_ACTUATOR_URL: &str = "http://127.0.0.1:7070";

pub const DEFAULT_LISTEN_ADDR: &str = "0.0.0.0:7070";
