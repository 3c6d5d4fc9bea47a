//! Ambient (night) lighting.
//!
//! The darkness level combines two inputs: the base level from the last
//! `/nt` night command, and the per-area flags byte that arrives with the
//! vitals every tick.

use gloam_protocol::NightCommand;
use serde::{Deserialize, Serialize};

/// Flag: the area is 25% lighter (or darker, with [`AREA_IS_DARKER`]).
pub const ADJUST_25: u8 = 1 << 0;
/// Flag: the area is 50% lighter (or darker).
pub const ADJUST_50: u8 = 1 << 1;
/// Flag: the adjustments darken instead of lighten.
pub const AREA_IS_DARKER: u8 = 1 << 2;
/// Flag: night does not apply here at all.
pub const NO_NIGHT_MODS: u8 = 1 << 3;
/// Flag: sprites cast no shadows.
pub const NO_SHADOWS: u8 = 1 << 4;
/// Flag: force full brightness.
pub const FORCE_100: u8 = 1 << 5;

/// Current ambient light state. `level` is darkness, 0 (day) to 100.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AmbientLight {
    pub base_level: i32,
    pub azimuth: i32,
    pub cloudy: bool,
    pub flags: u8,
    pub level: i32,
}

impl AmbientLight {
    pub fn new() -> Self {
        Self::default()
    }

    /// Applies a night command and recomputes the level.
    pub fn apply_night(&mut self, cmd: &NightCommand) {
        self.base_level = cmd.level;
        self.azimuth = cmd.azimuth;
        self.cloudy = cmd.cloudy;
        self.recompute();
    }

    /// Sets the area flags and recomputes the level.
    pub fn set_flags(&mut self, flags: u8) {
        self.flags = flags;
        self.recompute();
    }

    pub fn level(&self) -> i32 {
        self.level
    }

    pub fn shadows(&self) -> bool {
        self.flags & NO_SHADOWS == 0
    }

    fn recompute(&mut self) {
        let level = if self.flags & NO_NIGHT_MODS != 0 {
            0
        } else {
            let mut delta = 0;
            if self.flags & ADJUST_25 != 0 {
                delta += 25;
            }
            if self.flags & ADJUST_50 != 0 {
                delta += 50;
            }
            if self.flags & AREA_IS_DARKER != 0 {
                delta = -delta;
            }
            self.base_level - delta
        };
        self.level = level.clamp(0, 100);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn night(level: i32) -> NightCommand {
        NightCommand {
            level,
            azimuth: 90,
            cloudy: false,
        }
    }

    #[test]
    fn test_night_sets_base_level() {
        let mut light = AmbientLight::new();
        light.apply_night(&night(60));
        assert_eq!(light.level(), 60);
        assert_eq!(light.azimuth, 90);
    }

    #[test]
    fn test_adjustments_lighten() {
        let mut light = AmbientLight::new();
        light.apply_night(&night(60));
        light.set_flags(ADJUST_25);
        assert_eq!(light.level(), 35);
        light.set_flags(ADJUST_25 | ADJUST_50);
        assert_eq!(light.level(), 0);
    }

    #[test]
    fn test_darker_area_clamps_to_100() {
        let mut light = AmbientLight::new();
        light.apply_night(&night(60));
        light.set_flags(ADJUST_50 | AREA_IS_DARKER);
        assert_eq!(light.level(), 100);
    }

    #[test]
    fn test_no_night_mods() {
        let mut light = AmbientLight::new();
        light.set_flags(NO_NIGHT_MODS | AREA_IS_DARKER | ADJUST_50);
        light.apply_night(&night(80));
        assert_eq!(light.level(), 0);
    }

    #[test]
    fn test_shadows_flag() {
        let mut light = AmbientLight::new();
        assert!(light.shadows());
        light.set_flags(NO_SHADOWS);
        assert!(!light.shadows());
    }
}
