//! Interpolation settings and playfield geometry.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::warn;

// ---------------------------------------------------------------------------
// Playfield
// ---------------------------------------------------------------------------

/// The visible game area, in world pixels.
///
/// Positions on the wire are offsets from the center, so a picture at
/// `(h, v)` is drawn at `(h + center_x, v + center_y)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Playfield {
    pub width: i32,
    pub height: i32,
}

impl Default for Playfield {
    fn default() -> Self {
        Self {
            width: 547,
            height: 540,
        }
    }
}

impl Playfield {
    pub fn center_x(&self) -> i32 {
        self.width / 2
    }

    pub fn center_y(&self) -> i32 {
        self.height / 2
    }

    /// Whether a center-relative position falls inside the playfield.
    pub fn contains(&self, h: i16, v: i16) -> bool {
        let x = i32::from(h) + self.center_x();
        let y = i32::from(v) + self.center_y();
        (0..self.width).contains(&x) && (0..self.height).contains(&y)
    }
}

// ---------------------------------------------------------------------------
// InterpConfig
// ---------------------------------------------------------------------------

/// How the state manager smooths between ticks.
///
/// Interpolation moves mobiles and scrolls pictures between their previous
/// and current positions. Cross-fade blends a mobile's previous pose into
/// its new one. Either can be used alone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InterpConfig {
    /// Linear motion smoothing. Default: on.
    pub interpolate: bool,
    /// Pose cross-fading. Default: off.
    pub cross_fade: bool,
    /// Animation interval used until a real one has been measured.
    /// Default: 200 ms.
    pub default_interval_ms: u64,
    /// Largest per-tick movement (in pixels) still treated as motion rather
    /// than a teleport. Default: 64.
    pub max_interp_pixels: i32,
    pub playfield: Playfield,
}

impl Default for InterpConfig {
    fn default() -> Self {
        Self {
            interpolate: true,
            cross_fade: false,
            default_interval_ms: 200,
            max_interp_pixels: 64,
            playfield: Playfield::default(),
        }
    }
}

impl InterpConfig {
    /// Config with both smoothing modes off.
    pub fn disabled() -> Self {
        Self {
            interpolate: false,
            cross_fade: false,
            ..Default::default()
        }
    }

    pub fn default_interval(&self) -> Duration {
        Duration::from_millis(self.default_interval_ms)
    }

    /// `true` if either smoothing mode is on.
    pub fn any_mode(&self) -> bool {
        self.interpolate || self.cross_fade
    }

    /// Replaces out-of-range values with defaults.
    ///
    /// Called by `StateManager::new`. Rules:
    /// - a zero interval falls back to 200 ms;
    /// - a negative pixel limit becomes 0 (no motion accepted);
    /// - a playfield with a non-positive side falls back to 547×540.
    pub fn validated(mut self) -> Self {
        let defaults = Self::default();
        if self.default_interval_ms == 0 {
            warn!("default_interval_ms is 0, using {}", defaults.default_interval_ms);
            self.default_interval_ms = defaults.default_interval_ms;
        }
        if self.max_interp_pixels < 0 {
            warn!(value = self.max_interp_pixels, "max_interp_pixels is negative, clamping to 0");
            self.max_interp_pixels = 0;
        }
        if self.playfield.width <= 0 || self.playfield.height <= 0 {
            warn!(
                width = self.playfield.width,
                height = self.playfield.height,
                "playfield has no area, using default"
            );
            self.playfield = defaults.playfield;
        }
        self
    }
}
