use crate::wheel::{SegmentColor, SegmentLabel, Wheel};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use serde_with::{DeserializeFromStr, DurationMilliSeconds, serde_as};
use std::path::{Path, PathBuf};
use std::time::Duration;
use strum::EnumString;
use thiserror::Error;

const DEFAULT_NAMES: [&str; 8] = [
    "Dedi",
    "Dony",
    "Arnin",
    "Pak Santoso",
    "Bambang",
    "Teddy",
    "Made",
    "Rudi",
];

const DEFAULT_COLORS: [(u8, u8, u8); 8] = [
    (0xFF, 0x52, 0x52),
    (0x44, 0x8A, 0xFF),
    (0x69, 0xF0, 0xAE),
    (0xFF, 0xD7, 0x40),
    (0xE0, 0x40, 0xFB),
    (0x53, 0x6D, 0xFE),
    (0xFF, 0xAB, 0x40),
    (0x00, 0xE6, 0x76),
];

const DEFAULT_WINNER: &str = "Bambang";

/// Landing offsets stay this far inside a slice, clear of the boundary tie.
pub const MAX_JITTER: f64 = 0.45;
/// Most full turns a single spin may make (`min_turns + max_extra_turns`).
pub const MAX_TURNS: u32 = 1000;

/// Which way the accumulated rotation grows while spinning.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, DeserializeFromStr, EnumString,
)]
#[strum(ascii_case_insensitive)]
#[serde(rename_all = "lowercase")]
pub enum SpinDirection {
    #[default]
    #[strum(serialize = "clockwise", serialize = "cw")]
    Clockwise,
    #[strum(
        serialize = "counterclockwise",
        serialize = "anticlockwise",
        serialize = "ccw"
    )]
    CounterClockwise,
}

impl SpinDirection {
    pub fn sign(&self) -> f64 {
        match self {
            Self::Clockwise => -1.0,
            Self::CounterClockwise => 1.0,
        }
    }
}

#[serde_as]
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct SpinSettings {
    /// Full turns every spin makes before landing.
    pub min_turns: u32,
    /// Upper bound of the random turns added on top of `min_turns`.
    pub max_extra_turns: u32,
    /// Largest landing offset from the slice centre, as a fraction of one slice.
    pub jitter: f64,
    #[serde_as(as = "DurationMilliSeconds<u64>")]
    #[serde(rename = "min_duration_ms")]
    pub min_duration: Duration,
    #[serde_as(as = "DurationMilliSeconds<u64>")]
    #[serde(rename = "max_duration_ms")]
    pub max_duration: Duration,
}

impl Default for SpinSettings {
    fn default() -> Self {
        Self {
            min_turns: 5,
            max_extra_turns: 2,
            jitter: 0.2,
            min_duration: Duration::from_millis(5000),
            max_duration: Duration::from_millis(6000),
        }
    }
}

/// Friction model used when `free_spin` is set. Velocities are radians per tick.
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct CoastSettings {
    pub friction: f64,
    pub stop_velocity: f64,
    pub min_velocity: f64,
    pub max_velocity: f64,
}

impl Default for CoastSettings {
    fn default() -> Self {
        Self {
            friction: 0.985,
            stop_velocity: 0.002,
            min_velocity: 0.4,
            max_velocity: 0.7,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
pub struct SegmentConfig {
    pub label: SegmentLabel,
    #[serde(default)]
    pub color: Option<SegmentColor>,
}

#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct WheelConfig {
    pub segments: Vec<SegmentConfig>,
    /// Label of the segment every rigged spin lands on.
    pub winner: SegmentLabel,
    /// Coast freely with friction instead of landing on `winner`.
    pub free_spin: bool,
    pub direction: SpinDirection,
    pub spin: SpinSettings,
    pub coast: CoastSettings,
}

impl Default for WheelConfig {
    fn default() -> Self {
        Self {
            segments: DEFAULT_NAMES
                .iter()
                .zip(DEFAULT_COLORS)
                .map(|(name, (r, g, b))| SegmentConfig {
                    label: SegmentLabel::new(*name),
                    color: Some(SegmentColor::new(r, g, b)),
                })
                .collect(),
            winner: SegmentLabel::new(DEFAULT_WINNER),
            free_spin: false,
            direction: SpinDirection::default(),
            spin: SpinSettings::default(),
            coast: CoastSettings::default(),
        }
    }
}

impl WheelConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.segments.is_empty() {
            return Err(ConfigError::NoSegments);
        }

        let spin = &self.spin;
        if !(spin.jitter.is_finite() && (0.0..MAX_JITTER).contains(&spin.jitter)) {
            return Err(ConfigError::InvalidJitter(spin.jitter));
        }
        let most_turns = spin.min_turns.checked_add(spin.max_extra_turns);
        if spin.min_turns == 0 || most_turns.is_none_or(|turns| turns > MAX_TURNS) {
            return Err(ConfigError::InvalidTurns);
        }
        if spin.min_duration > spin.max_duration {
            return Err(ConfigError::InvalidDuration {
                min: spin.min_duration,
                max: spin.max_duration,
            });
        }

        let coast = &self.coast;
        let valid_coast = coast.friction > 0.0
            && coast.friction < 1.0
            && coast.stop_velocity > 0.0
            && coast.min_velocity > 0.0
            && coast.min_velocity < coast.max_velocity
            && coast.max_velocity.is_finite();
        if !valid_coast {
            return Err(ConfigError::InvalidCoast);
        }

        Ok(())
    }

    /// Builds the wheel. Segments without a colour cycle through the default palette.
    pub fn wheel(&self) -> Result<Wheel, ConfigError> {
        Wheel::new(self.segments.iter().enumerate().map(|(i, seg)| {
            let color = seg.color.unwrap_or_else(|| {
                let (r, g, b) = DEFAULT_COLORS[i % DEFAULT_COLORS.len()];
                SegmentColor::new(r, g, b)
            });
            (seg.label.clone(), color)
        }))
        .ok_or(ConfigError::NoSegments)
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to determine config directory")]
    ConfigDirNotFound,
    #[error("Config error: {0}")]
    Config(#[from] config::ConfigError),
    #[error("The wheel needs at least one segment")]
    NoSegments,
    #[error("Jitter must be a fraction of a slice in [0, {max}), got {0}", max = MAX_JITTER)]
    InvalidJitter(f64),
    #[error("A spin must make between 1 and {max} full turns", max = MAX_TURNS)]
    InvalidTurns,
    #[error("Minimum spin duration {min:?} exceeds maximum {max:?}")]
    InvalidDuration { min: Duration, max: Duration },
    #[error("Coast settings need 0 < friction < 1, a positive stop velocity and 0 < min < max velocity")]
    InvalidCoast,
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

pub fn get_config_path() -> Result<PathBuf, ConfigError> {
    let proj_dirs = ProjectDirs::from("org", "spinwheel", "spinwheel")
        .ok_or(ConfigError::ConfigDirNotFound)?;
    Ok(proj_dirs.config_dir().join("config.toml"))
}

pub fn load_config() -> Result<WheelConfig, ConfigError> {
    load_config_from(&get_config_path()?)
}

/// Reads `path` (if it exists) overlaid with `SPINWHEEL_*` environment variables. Keys missing
/// from both fall back to the built-in wheel.
pub fn load_config_from(path: &Path) -> Result<WheelConfig, ConfigError> {
    let s = config::Config::builder()
        .add_source(config::File::from(path.to_path_buf()).required(false))
        .add_source(
            config::Environment::with_prefix("SPINWHEEL")
                .prefix_separator("_")
                .separator("__")
                .try_parsing(true),
        )
        .build()?;

    let config: WheelConfig = s.try_deserialize()?;
    config.validate()?;
    Ok(config)
}

pub fn load_or_default() -> WheelConfig {
    match load_config() {
        Ok(c) => c,
        Err(e) => {
            log::warn!("Using the built-in wheel: {}", e);
            WheelConfig::default()
        }
    }
}

pub fn write_default_config() -> Result<PathBuf, ConfigError> {
    let path = get_config_path()?;
    if let Some(parent) = path.parent() {
        fs_err::create_dir_all(parent)?;
    }
    if !path.exists() {
        fs_err::write(&path, DEFAULT_CONFIG)?;
    }
    Ok(path)
}

pub const DEFAULT_CONFIG: &str = include_str!("default_config.toml");

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(toml: &str) -> Result<WheelConfig, ConfigError> {
        let s = config::Config::builder()
            .add_source(config::File::from_str(toml, config::FileFormat::Toml))
            .build()?;
        let config: WheelConfig = s.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    #[test]
    fn test_default_file_matches_builtin_wheel() {
        let parsed = parse(DEFAULT_CONFIG).unwrap();
        assert_eq!(parsed, WheelConfig::default());
    }

    #[test]
    fn test_direction_deserialization() {
        let cases = vec![
            ("\"clockwise\"", SpinDirection::Clockwise),
            ("\"Clockwise\"", SpinDirection::Clockwise),
            ("\"CW\"", SpinDirection::Clockwise),
            ("\"counterclockwise\"", SpinDirection::CounterClockwise),
            ("\"AntiClockwise\"", SpinDirection::CounterClockwise),
            ("\"ccw\"", SpinDirection::CounterClockwise),
        ];

        for (json, expected) in cases {
            let deserialized: SpinDirection = serde_json::from_str(json).unwrap();
            assert_eq!(deserialized, expected);
        }

        assert!(serde_json::from_str::<SpinDirection>("\"sideways\"").is_err());
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let config = parse(
            r#"
            winner = "Dony"
            direction = "ccw"

            [spin]
            min_turns = 3
            min_duration_ms = 1000
            max_duration_ms = 1500
            "#,
        )
        .unwrap();

        assert_eq!(config.winner, SegmentLabel::new("Dony"));
        assert!(!config.free_spin);
        assert_eq!(config.direction, SpinDirection::CounterClockwise);
        assert_eq!(config.spin.min_turns, 3);
        assert_eq!(config.spin.max_extra_turns, 2);
        assert_eq!(config.spin.min_duration, Duration::from_millis(1000));
        assert_eq!(config.segments.len(), 8);
        assert_eq!(config.coast, CoastSettings::default());
    }

    #[test]
    fn test_missing_colors_cycle_default_palette() {
        let config = parse(
            r##"
            [[segments]]
            label = "A"
            [[segments]]
            label = "B"
            color = "#000000"
            [[segments]]
            label = "C"
            "##,
        )
        .unwrap();

        let wheel = config.wheel().unwrap();
        assert_eq!(wheel.segment_count(), 3);
        assert_eq!(wheel.segments()[0].color, SegmentColor::new(0xFF, 0x52, 0x52));
        assert_eq!(wheel.segments()[1].color, SegmentColor::new(0, 0, 0));
        assert_eq!(wheel.segments()[2].color, SegmentColor::new(0x69, 0xF0, 0xAE));
    }

    #[test]
    fn test_invalid_settings_are_rejected() {
        let mut config = WheelConfig::default();
        config.segments.clear();
        assert!(matches!(config.validate(), Err(ConfigError::NoSegments)));
        assert!(matches!(config.wheel(), Err(ConfigError::NoSegments)));

        let mut config = WheelConfig::default();
        config.spin.jitter = 0.5;
        assert!(matches!(config.validate(), Err(ConfigError::InvalidJitter(_))));

        let mut config = WheelConfig::default();
        config.spin.jitter = MAX_JITTER;
        assert!(matches!(config.validate(), Err(ConfigError::InvalidJitter(_))));
        config.spin.jitter = 0.44;
        assert!(config.validate().is_ok());

        let mut config = WheelConfig::default();
        config.spin.jitter = f64::NAN;
        assert!(matches!(config.validate(), Err(ConfigError::InvalidJitter(_))));

        let mut config = WheelConfig::default();
        config.spin.min_turns = 0;
        assert!(matches!(config.validate(), Err(ConfigError::InvalidTurns)));

        let mut config = WheelConfig::default();
        config.spin.min_duration = Duration::from_secs(7);
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidDuration { .. })
        ));

        let mut config = WheelConfig::default();
        config.coast.friction = 1.0;
        assert!(matches!(config.validate(), Err(ConfigError::InvalidCoast)));

        let mut config = WheelConfig::default();
        config.coast.min_velocity = config.coast.max_velocity;
        assert!(matches!(config.validate(), Err(ConfigError::InvalidCoast)));
    }

    #[test]
    fn test_turn_counts_are_bounded() {
        let mut config = WheelConfig::default();
        config.spin.min_turns = u32::MAX;
        assert!(matches!(config.validate(), Err(ConfigError::InvalidTurns)));

        config.spin.min_turns = 1;
        config.spin.max_extra_turns = u32::MAX;
        assert!(matches!(config.validate(), Err(ConfigError::InvalidTurns)));

        config.spin.min_turns = MAX_TURNS - 2;
        config.spin.max_extra_turns = 3;
        assert!(matches!(config.validate(), Err(ConfigError::InvalidTurns)));

        config.spin.max_extra_turns = 2;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_invalid_color_fails_to_load() {
        let err = parse(
            r#"
            [[segments]]
            label = "A"
            color = "chartreuse"
            "#,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Config(_)));
    }

    #[test]
    fn test_missing_file_loads_builtin_wheel() {
        let path = std::env::temp_dir().join("spinwheel-config-that-does-not-exist.toml");
        let config = load_config_from(&path).unwrap();
        assert_eq!(config.segments, WheelConfig::default().segments);
    }
}
