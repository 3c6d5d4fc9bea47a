//! The 256-color Macintosh system palette.
//!
//! Color tables in the archive don't hold colors, they hold indices into
//! this palette. Layout:
//!
//! ```text
//!   0..=214  6×6×6 color cube, white first, black left out
//! 215..=224  red ramp
//! 225..=234  green ramp
//! 235..=244  blue ramp
//! 245..=254  gray ramp
//!       255  black
//! ```

/// Intensities of the ten-step ramps, brightest first.
const RAMP: [u8; 10] = [0xEE, 0xDD, 0xBB, 0xAA, 0x88, 0x77, 0x55, 0x44, 0x22, 0x11];

/// RGB triples indexed by palette entry.
pub static MAC_PALETTE: [[u8; 3]; 256] = build_palette();

const fn build_palette() -> [[u8; 3]; 256] {
    let mut pal = [[0u8; 3]; 256];

    let mut i = 0;
    while i < 215 {
        let r = 5 - (i / 36) as u8;
        let g = 5 - ((i / 6) % 6) as u8;
        let b = 5 - (i % 6) as u8;
        pal[i] = [r * 0x33, g * 0x33, b * 0x33];
        i += 1;
    }

    let mut j = 0;
    while j < RAMP.len() {
        let v = RAMP[j];
        pal[215 + j] = [v, 0, 0];
        pal[225 + j] = [0, v, 0];
        pal[235 + j] = [0, 0, v];
        pal[245 + j] = [v, v, v];
        j += 1;
    }

    pal[255] = [0, 0, 0];
    pal
}
