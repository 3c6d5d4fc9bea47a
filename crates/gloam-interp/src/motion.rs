//! Scroll estimation between two picture lists.
//!
//! When the player walks, the server resends the scenery at new positions.
//! To scroll smoothly the client needs the single `(dx, dy)` that most of
//! the scenery moved by. Each on-screen picture from the previous tick is
//! paired with the nearest on-screen picture with the same sprite id in the
//! new tick, and the pairings vote:
//!
//! ```text
//! prev  tree(10,0)  rock(40,5)  tree(90,0)
//! cur   tree(6,0)   rock(36,5)  tree(86,0)  sign(0,0)
//! votes (-4,0) ×3                          → shift (-4, 0)
//! ```
//!
//! A vector is only accepted with a strict majority of the votes and a
//! length within the interpolation limit; anything else is a scene change
//! and the shift is zero.

use std::collections::HashMap;

use gloam_protocol::FramePicture;
use tracing::trace;

use crate::config::Playfield;

/// Default movement limit, in pixels.
pub const MAX_SHIFT_PIXELS: i32 = 64;

/// The estimated scenery movement between two ticks.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PictureShift {
    pub dx: i32,
    pub dy: i32,
    /// `false` when no vector won; `dx` and `dy` are then zero.
    pub ok: bool,
}

impl PictureShift {
    fn accepted(dx: i32, dy: i32) -> Self {
        Self { dx, dy, ok: true }
    }
}

/// Estimates the majority shift with the default 64-pixel limit.
pub fn picture_shift(
    prev: &[FramePicture],
    cur: &[FramePicture],
    field: &Playfield,
) -> PictureShift {
    picture_shift_within(prev, cur, field, MAX_SHIFT_PIXELS)
}

/// Estimates the majority shift, rejecting vectors longer than `max_pixels`.
pub fn picture_shift_within(
    prev: &[FramePicture],
    cur: &[FramePicture],
    field: &Playfield,
    max_pixels: i32,
) -> PictureShift {
    if prev.is_empty() || cur.is_empty() {
        return PictureShift::default();
    }

    let visible: Vec<&FramePicture> = cur.iter().filter(|c| field.contains(c.h, c.v)).collect();
    let mut votes: HashMap<(i32, i32), usize> = HashMap::new();
    let mut total = 0usize;

    for p in prev.iter().filter(|p| field.contains(p.h, p.v)) {
        let mut best: Option<(i64, (i32, i32))> = None;
        for c in visible.iter().filter(|c| c.sprite_id == p.sprite_id) {
            let dx = i32::from(c.h) - i32::from(p.h);
            let dy = i32::from(c.v) - i32::from(p.v);
            let dist = squared_len(dx, dy);
            // Strictly closer only: the first of equally near candidates wins.
            if best.is_none_or(|(d, _)| dist < d) {
                best = Some((dist, (dx, dy)));
            }
        }
        if let Some((_, vector)) = best {
            *votes.entry(vector).or_default() += 1;
            total += 1;
        }
    }

    if total == 0 {
        trace!("picture shift: no matching pairs");
        return PictureShift::default();
    }

    // A strict majority is unique, so iteration order can't change the result.
    let Some((&(dx, dy), &count)) = votes.iter().max_by_key(|&(_, &n)| n) else {
        return PictureShift::default();
    };
    if count * 2 <= total {
        trace!(count, total, "picture shift: no majority");
        return PictureShift::default();
    }
    if squared_len(dx, dy) > i64::from(max_pixels).pow(2) {
        trace!(dx, dy, "picture shift: motion too large");
        return PictureShift::default();
    }
    PictureShift::accepted(dx, dy)
}

fn squared_len(dx: i32, dy: i32) -> i64 {
    i64::from(dx).pow(2) + i64::from(dy).pow(2)
}
