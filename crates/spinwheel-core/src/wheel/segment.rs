use super::geometry::WheelGeometry;
use derive_more::{AsRef, Deref, Display, From, Into};
use palette::Srgb;
use palette::rgb::FromHexError;
use serde::{Deserialize, Serialize};
use serde_with::{DeserializeFromStr, SerializeDisplay};
use std::fmt;
use std::str::FromStr;

#[derive(
    Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, Display, Deref, From, Into, AsRef,
)]
#[serde(transparent)]
pub struct SegmentLabel(String);

crate::impl_string_newtype!(SegmentLabel);

/// Fill colour of a segment, written as `#RRGGBB` in configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, SerializeDisplay, DeserializeFromStr)]
pub struct SegmentColor(Srgb<u8>);

impl SegmentColor {
    pub fn new(red: u8, green: u8, blue: u8) -> Self {
        Self(Srgb::new(red, green, blue))
    }

    pub fn rgb(&self) -> Srgb<f64> {
        self.0.into_format()
    }
}

impl FromStr for SegmentColor {
    type Err = FromHexError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Srgb::from_str(s.trim()).map(Self)
    }
}

impl fmt::Display for SegmentColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "#{:02X}{:02X}{:02X}",
            self.0.red, self.0.green, self.0.blue
        )
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Segment {
    pub index: usize,
    pub label: SegmentLabel,
    pub color: SegmentColor,
}

/// The ordered slices of the wheel. Never empty; order is angular order.
#[derive(Debug, Clone, PartialEq)]
pub struct Wheel {
    segments: Vec<Segment>,
}

impl Wheel {
    /// Returns `None` when no segments are given.
    pub fn new(entries: impl IntoIterator<Item = (SegmentLabel, SegmentColor)>) -> Option<Self> {
        let segments: Vec<Segment> = entries
            .into_iter()
            .enumerate()
            .map(|(index, (label, color))| Segment {
                index,
                label,
                color,
            })
            .collect();

        (!segments.is_empty()).then_some(Self { segments })
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn segment_count(&self) -> usize {
        self.segments.len()
    }

    pub fn segment(&self, index: usize) -> Option<&Segment> {
        self.segments.get(index)
    }

    pub fn index_of(&self, label: &SegmentLabel) -> Option<usize> {
        self.segments.iter().position(|s| &s.label == label)
    }

    pub fn geometry(&self) -> WheelGeometry {
        WheelGeometry::new(self.segments.len())
    }

    /// The segment under the pointer for a given rotation.
    pub fn segment_at(&self, rotation: f64) -> &Segment {
        &self.segments[self.geometry().winning_index(rotation)]
    }
}
