//! Rig configuration.
//!
//! Every field has a default so a host can deserialize a partial options
//! object (camelCase keys) and get a complete, usable configuration.

use serde::{Deserialize, Deserializer};
use std::fmt;
use std::str::FromStr;

use crate::constants::*;
use crate::error::RigError;

/// Antialiasing / compositing path. Chosen once at construction.
///
/// Deserializes from a mode name or from a boolean (`true` is MSAA, `false`
/// disables antialiasing).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub enum AntialiasMode {
    None,
    Fxaa,
    Taa,
    #[default]
    Msaa,
}

impl AntialiasMode {
    pub fn as_str(self) -> &'static str {
        match self {
            AntialiasMode::None => "none",
            AntialiasMode::Fxaa => "fxaa",
            AntialiasMode::Taa => "taa",
            AntialiasMode::Msaa => "msaa",
        }
    }
}

impl fmt::Display for AntialiasMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AntialiasMode {
    type Err = RigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "none" | "off" | "" => Ok(AntialiasMode::None),
            "fxaa" => Ok(AntialiasMode::Fxaa),
            "taa" => Ok(AntialiasMode::Taa),
            "msaa" => Ok(AntialiasMode::Msaa),
            other => Err(RigError::Configuration(format!(
                "unknown antialias mode `{other}` (expected none|fxaa|taa|msaa)"
            ))),
        }
    }
}

impl<'de> Deserialize<'de> for AntialiasMode {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        #[derive(Deserialize)]
        #[serde(untagged)]
        enum Raw {
            Flag(bool),
            Name(String),
        }
        match Raw::deserialize(deserializer)? {
            Raw::Flag(true) => Ok(AntialiasMode::Msaa),
            Raw::Flag(false) => Ok(AntialiasMode::None),
            Raw::Name(name) => name.parse().map_err(serde::de::Error::custom),
        }
    }
}

/// Distortion parameters, written verbatim to the `warpParams` uniform.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ShaderTuning {
    pub warp_factor: f32,
    pub warp_radius: f32,
    pub decay_rate: f32,
    pub density: f32,
}

impl Default for ShaderTuning {
    fn default() -> Self {
        Self {
            warp_factor: DEFAULT_WARP_FACTOR,
            warp_radius: DEFAULT_WARP_RADIUS,
            decay_rate: DEFAULT_DECAY_RATE,
            density: DEFAULT_DENSITY,
        }
    }
}

impl ShaderTuning {
    #[inline]
    pub fn to_array(self) -> [f32; 4] {
        [self.warp_factor, self.warp_radius, self.decay_rate, self.density]
    }
}

/// Hover scale easing: `amount` is the extra scale at full hover, `speed` the
/// per-frame step of the eased parameter.
#[derive(Clone, Copy, Debug, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ScaleTuning {
    pub amount: f32,
    pub speed: f32,
}

impl Default for ScaleTuning {
    fn default() -> Self {
        Self {
            amount: DEFAULT_SCALE_AMOUNT,
            speed: DEFAULT_SCALE_SPEED,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct RigConfig {
    #[serde(alias = "antialias")]
    pub antialias_mode: AntialiasMode,
    pub item_selector: String,
    /// Opacity applied to the original media element while it is mirrored.
    pub element_opacity: f32,
    pub allow_scaling: bool,
    pub allow_rotation: bool,
    #[serde(alias = "debug")]
    pub debug_panel: bool,
    pub shader_tuning: ShaderTuning,
    pub scale_tuning: ScaleTuning,
    /// Plane size relative to the element box; headroom for the warp.
    pub overscan: f32,
    /// Fallback corner radius (CSS px) when the media element declares none.
    pub border_radius: f32,
    /// Replacement WGSL for the plane program. Must honor the uniform schema.
    pub shader_source: Option<String>,
}

impl Default for RigConfig {
    fn default() -> Self {
        Self {
            antialias_mode: AntialiasMode::default(),
            item_selector: DEFAULT_ITEM_SELECTOR.to_string(),
            element_opacity: 0.0,
            allow_scaling: true,
            allow_rotation: true,
            debug_panel: false,
            shader_tuning: ShaderTuning::default(),
            scale_tuning: ScaleTuning::default(),
            overscan: DEFAULT_OVERSCAN,
            border_radius: DEFAULT_BORDER_RADIUS,
            shader_source: None,
        }
    }
}

impl RigConfig {
    /// Clamp values into their documented ranges. Non-finite numbers fall back
    /// to the defaults.
    pub fn sanitized(mut self) -> Self {
        let d = RigConfig::default();
        self.element_opacity = finite_or(self.element_opacity, d.element_opacity).clamp(0.0, 1.0);
        self.overscan = finite_or(self.overscan, d.overscan).max(1.0);
        self.border_radius = finite_or(self.border_radius, d.border_radius).max(0.0);
        self.scale_tuning.amount = finite_or(self.scale_tuning.amount, d.scale_tuning.amount).max(0.0);
        self.scale_tuning.speed = finite_or(self.scale_tuning.speed, d.scale_tuning.speed).max(0.0);
        if self.item_selector.trim().is_empty() {
            self.item_selector = d.item_selector;
        }
        self
    }
}

#[inline]
fn finite_or(v: f32, fallback: f32) -> f32 {
    if v.is_finite() {
        v
    } else {
        fallback
    }
}
