//! Blend modes: the closed set of canvas compositing operations.
//!
//! Names match the HTML canvas `globalCompositeOperation` values. Each
//! variant maps to the `tiny-skia` blend mode with the same per-pixel
//! formula (W3C Compositing and Blending Level 1), so an unknown name is
//! rejected when parsed instead of reaching the rasteriser.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::types::PipelineError;

/// How the top layer's colors combine with the bottom layer's.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum BlendMode {
    /// Plain overlay ("normal").
    #[default]
    SourceOver,
    /// Multiplies colors; result is never lighter.
    Multiply,
    /// Inverse multiply of the inverses; result is never darker.
    Screen,
    /// Multiply or screen depending on the bottom color.
    Overlay,
    /// Per-channel minimum.
    Darken,
    /// Per-channel maximum.
    Lighten,
    /// Brightens the bottom layer to reflect the top.
    ColorDodge,
    /// Darkens the bottom layer to reflect the top.
    ColorBurn,
    /// Multiply or screen depending on the top color.
    HardLight,
    /// Softer version of hard light.
    SoftLight,
    /// Absolute difference of the channels.
    Difference,
    /// Like difference with lower contrast.
    Exclusion,
    /// Hue of the top, saturation and luminosity of the bottom.
    Hue,
    /// Saturation of the top, hue and luminosity of the bottom.
    Saturation,
    /// Hue and saturation of the top, luminosity of the bottom.
    Color,
    /// Luminosity of the top, hue and saturation of the bottom.
    Luminosity,
}

impl BlendMode {
    /// All blend modes in menu order.
    pub const ALL: [Self; 16] = [
        Self::SourceOver,
        Self::Multiply,
        Self::Screen,
        Self::Overlay,
        Self::Darken,
        Self::Lighten,
        Self::ColorDodge,
        Self::ColorBurn,
        Self::HardLight,
        Self::SoftLight,
        Self::Difference,
        Self::Exclusion,
        Self::Hue,
        Self::Saturation,
        Self::Color,
        Self::Luminosity,
    ];

    /// Canvas operation name, e.g. `"color-dodge"`.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::SourceOver => "source-over",
            Self::Multiply => "multiply",
            Self::Screen => "screen",
            Self::Overlay => "overlay",
            Self::Darken => "darken",
            Self::Lighten => "lighten",
            Self::ColorDodge => "color-dodge",
            Self::ColorBurn => "color-burn",
            Self::HardLight => "hard-light",
            Self::SoftLight => "soft-light",
            Self::Difference => "difference",
            Self::Exclusion => "exclusion",
            Self::Hue => "hue",
            Self::Saturation => "saturation",
            Self::Color => "color",
            Self::Luminosity => "luminosity",
        }
    }

    /// Human-readable label for menus.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::SourceOver => "Normal",
            Self::Multiply => "Multiply",
            Self::Screen => "Screen",
            Self::Overlay => "Overlay",
            Self::Darken => "Darken",
            Self::Lighten => "Lighten",
            Self::ColorDodge => "Color Dodge",
            Self::ColorBurn => "Color Burn",
            Self::HardLight => "Hard Light",
            Self::SoftLight => "Soft Light",
            Self::Difference => "Difference",
            Self::Exclusion => "Exclusion",
            Self::Hue => "Hue",
            Self::Saturation => "Saturation",
            Self::Color => "Color",
            Self::Luminosity => "Luminosity",
        }
    }

    /// The rasteriser blend mode implementing this operation.
    #[must_use]
    pub const fn to_skia(self) -> tiny_skia::BlendMode {
        match self {
            Self::SourceOver => tiny_skia::BlendMode::SourceOver,
            Self::Multiply => tiny_skia::BlendMode::Multiply,
            Self::Screen => tiny_skia::BlendMode::Screen,
            Self::Overlay => tiny_skia::BlendMode::Overlay,
            Self::Darken => tiny_skia::BlendMode::Darken,
            Self::Lighten => tiny_skia::BlendMode::Lighten,
            Self::ColorDodge => tiny_skia::BlendMode::ColorDodge,
            Self::ColorBurn => tiny_skia::BlendMode::ColorBurn,
            Self::HardLight => tiny_skia::BlendMode::HardLight,
            Self::SoftLight => tiny_skia::BlendMode::SoftLight,
            Self::Difference => tiny_skia::BlendMode::Difference,
            Self::Exclusion => tiny_skia::BlendMode::Exclusion,
            Self::Hue => tiny_skia::BlendMode::Hue,
            Self::Saturation => tiny_skia::BlendMode::Saturation,
            Self::Color => tiny_skia::BlendMode::Color,
            Self::Luminosity => tiny_skia::BlendMode::Luminosity,
        }
    }
}

impl fmt::Display for BlendMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BlendMode {
    type Err = PipelineError;

    /// Parse a canvas operation name. `"normal"` is accepted for
    /// `source-over`; matching ignores ASCII case and surrounding space.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let name = s.trim();
        if name.eq_ignore_ascii_case("normal") {
            return Ok(Self::SourceOver);
        }
        Self::ALL
            .into_iter()
            .find(|mode| mode.as_str().eq_ignore_ascii_case(name))
            .ok_or_else(|| PipelineError::UnknownBlendMode(s.to_string()))
    }
}
