pub mod snapshot;
pub mod view;

pub use snapshot::render_png;
pub use view::draw;

// All sizes are fractions of the wheel radius unless noted.
pub const WHEEL_MARGIN: f64 = 24.0; // px between wheel and widget edge
pub const RIM_WIDTH: f64 = 0.035;
pub const HUB_RADIUS: f64 = 0.125;
pub const PEG_RADIUS: f64 = 0.0375;
pub const PEG_INSET: f64 = 0.05;
pub const LABEL_INSET: f64 = 0.1;
pub const LABEL_FONT_SIZE: f64 = 0.115;
pub const LABEL_MAX_WIDTH: f64 = 0.62;
pub const POINTER_HALF_WIDTH: f64 = 0.07;
pub const POINTER_LENGTH: f64 = 0.2;
pub const POINTER_OVERLAP: f64 = 0.08;
pub const TEXT_SHADOW_OFFSET: f64 = 0.006;
