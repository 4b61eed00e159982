pub mod config;
pub mod macros;
pub mod wheel;

pub use config::{ConfigError, WheelConfig};
pub use wheel::{SpinController, SpinError, SpinResult};
