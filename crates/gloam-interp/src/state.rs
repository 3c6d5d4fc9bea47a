//! The shared world state and how each tick is merged into it.
//!
//! A single [`StateManager`] owns the client's view of the world. The decode
//! loop is its only writer; renderers take [`DrawStateSnapshot`] copies and
//! never hold the lock while drawing.
//!
//! # Merge rules
//!
//! - Descriptors persist: a tick only overwrites the indices it sends.
//! - Pictures are rebuilt every tick: the first `repeat` pictures of the
//!   previous tick (as many as exist) followed by the new ones.
//! - Mobiles are replaced wholesale. A mobile not resent is gone.
//! - With a smoothing mode on, the outgoing mobiles (and, for cross-fade,
//!   descriptors) are kept as the "previous" state, and a new animation
//!   interval `[now, now + interval]` opens. `interval` is the time since
//!   the previous tick was merged, whether or not that tick opened an
//!   interval itself.

use std::collections::BTreeMap;
use std::time::{Duration, Instant};

use gloam_protocol::{DrawStateFrame, FrameDescriptor, FrameHeader, FrameMobile, FramePicture, Vitals};
use parking_lot::Mutex;
use tracing::trace;

use crate::config::InterpConfig;
use crate::motion::{PictureShift, picture_shift_within};

// ---------------------------------------------------------------------------
// Snapshot
// ---------------------------------------------------------------------------

/// A deep copy of the world state, safe to hand to a renderer.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DrawStateSnapshot {
    /// Every descriptor seen so far, by index.
    pub descriptors: BTreeMap<u8, FrameDescriptor>,
    /// This tick's pictures, retained ones first.
    pub pictures: Vec<FramePicture>,
    /// This tick's mobiles, by index.
    pub mobiles: BTreeMap<u8, FrameMobile>,
    /// Mobiles as of the start of the current animation interval.
    /// Empty unless a smoothing mode is on.
    pub prev_mobiles: BTreeMap<u8, FrameMobile>,
    /// Descriptors as of the last changed tick. Empty unless cross-fade is on.
    pub prev_descriptors: BTreeMap<u8, FrameDescriptor>,
    /// Scenery movement since the previous tick, `(0, 0)` if none was found.
    pub picture_shift: (i32, i32),
    /// Start of the current animation interval.
    pub prev_time: Option<Instant>,
    /// End of the current animation interval.
    pub cur_time: Option<Instant>,
    /// When the latest tick was merged.
    pub last_tick: Option<Instant>,
    pub vitals: Vitals,
    /// Ack and resend counters from the latest tick.
    pub header: FrameHeader,
    /// Descriptor index of the local player, once seen.
    pub self_index: Option<u8>,
}

impl DrawStateSnapshot {
    /// Name of the descriptor at `index`, if any.
    pub fn descriptor_name(&self, index: u8) -> Option<&str> {
        self.descriptors.get(&index).map(|d| d.name.as_str())
    }
}

/// What a merge did, for logging and tests.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MergeReport {
    /// Scenery shift estimate (all zero when interpolation is off).
    pub shift: PictureShift,
    /// Pictures carried over from the previous tick.
    pub retained: usize,
    /// `true` if the tick asked to repeat more pictures than existed.
    pub repeat_clamped: bool,
    /// Whether the tick counted as a visual change for cross-fading.
    pub changed: bool,
    /// Whether a new animation interval was opened.
    pub interval_restarted: bool,
}

/// Blend factors for drawing between the previous and current tick.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BlendFactors {
    /// Progress through the interval for position interpolation, 0..=1.
    pub position: f64,
    /// Opacity of the new pose when cross-fading, 0..=1. Reaches 1 at the
    /// interval's midpoint.
    pub fade: f32,
}

impl Default for BlendFactors {
    fn default() -> Self {
        Self {
            position: 1.0,
            fade: 1.0,
        }
    }
}

/// Computes blend factors for an interval `[prev, cur]` at time `now`.
///
/// Both factors are 1.0 (draw the current state as-is) unless the matching
/// mode is on and the interval is non-empty.
pub fn blend_factors(
    prev: Option<Instant>,
    cur: Option<Instant>,
    now: Instant,
    interpolate: bool,
    cross_fade: bool,
) -> BlendFactors {
    let mut out = BlendFactors::default();
    let (Some(prev), Some(cur)) = (prev, cur) else {
        return out;
    };
    if !(interpolate || cross_fade) || cur <= prev {
        return out;
    }

    let elapsed = now.saturating_duration_since(prev).as_secs_f64();
    let interval = (cur - prev).as_secs_f64();
    if interpolate {
        out.position = (elapsed / interval).clamp(0.0, 1.0);
    }
    if cross_fade {
        let half = interval / 2.0;
        if half > 0.0 {
            out.fade = ((elapsed / half) as f32).clamp(0.0, 1.0);
        }
    }
    out
}

// ---------------------------------------------------------------------------
// StateManager
// ---------------------------------------------------------------------------

/// Owner of the single mutable world state.
#[derive(Debug)]
pub struct StateManager {
    config: InterpConfig,
    state: Mutex<DrawStateSnapshot>,
}

impl StateManager {
    pub fn new(config: InterpConfig) -> Self {
        Self {
            config: config.validated(),
            state: Mutex::new(DrawStateSnapshot::default()),
        }
    }

    pub fn config(&self) -> &InterpConfig {
        &self.config
    }

    /// Merges a validated frame, timestamped now.
    pub fn merge_tick(&self, frame: &DrawStateFrame) -> MergeReport {
        self.merge_tick_at(frame, Instant::now())
    }

    /// Merges a validated frame as if it arrived at `now`.
    pub fn merge_tick_at(&self, frame: &DrawStateFrame, now: Instant) -> MergeReport {
        let cfg = &self.config;
        let mut guard = self.state.lock();
        let s = &mut *guard;

        s.vitals = frame.vitals;
        s.header = frame.header;
        if frame.self_index.is_some() {
            s.self_index = frame.self_index;
        }

        let changed = !frame.descriptors.is_empty()
            || frame.mobiles.len() != s.mobiles.len()
            || frame
                .mobiles
                .iter()
                .any(|m| s.mobiles.get(&m.index).is_none_or(|p| p.pose != m.pose));

        if cfg.cross_fade && changed {
            s.prev_descriptors = s.descriptors.clone();
        }
        for d in &frame.descriptors {
            s.descriptors.insert(d.index, d.clone());
        }

        // Pictures
        let retained = frame.repeat_pictures.min(s.pictures.len());
        let mut pictures = Vec::with_capacity(retained + frame.pictures.len());
        pictures.extend_from_slice(&s.pictures[..retained]);
        pictures.extend_from_slice(&frame.pictures);
        let shift = if cfg.interpolate {
            picture_shift_within(&s.pictures, &pictures, &cfg.playfield, cfg.max_interp_pixels)
        } else {
            PictureShift::default()
        };
        s.picture_shift = (shift.dx, shift.dy);
        s.pictures = pictures;

        // Mobiles and animation interval
        let interval_restarted = cfg.interpolate || (cfg.cross_fade && changed);
        let incoming: BTreeMap<u8, FrameMobile> =
            frame.mobiles.iter().map(|m| (m.index, *m)).collect();
        if interval_restarted {
            s.prev_mobiles = std::mem::replace(&mut s.mobiles, incoming);
            let interval = measured_interval(s.last_tick, now).unwrap_or(cfg.default_interval());
            s.prev_time = Some(now);
            s.cur_time = Some(now + interval);
        } else {
            s.mobiles = incoming;
        }
        s.last_tick = Some(now);

        let report = MergeReport {
            shift,
            retained,
            repeat_clamped: frame.repeat_pictures > retained,
            changed,
            interval_restarted,
        };
        trace!(
            ack_frame = frame.header.ack_frame,
            descriptors = s.descriptors.len(),
            pictures = s.pictures.len(),
            mobiles = s.mobiles.len(),
            shift = ?s.picture_shift,
            ?report,
            "merged tick"
        );
        report
    }

    /// Copies out the current state.
    ///
    /// The lock is held only for the copy. Previous-tick maps are included
    /// only for the modes that use them.
    pub fn snapshot(&self) -> DrawStateSnapshot {
        let mut snap = self.state.lock().clone();
        if !self.config.any_mode() {
            snap.prev_mobiles.clear();
        }
        if !self.config.cross_fade {
            snap.prev_descriptors.clear();
        }
        snap
    }

    /// Blend factors for drawing at `now`.
    pub fn compute_blend_factors(&self, now: Instant) -> BlendFactors {
        let (prev, cur) = {
            let s = self.state.lock();
            (s.prev_time, s.cur_time)
        };
        blend_factors(prev, cur, now, self.config.interpolate, self.config.cross_fade)
    }

    pub fn self_index(&self) -> Option<u8> {
        self.state.lock().self_index
    }

    /// Name of the descriptor currently at `index`.
    pub fn descriptor_name(&self, index: u8) -> Option<String> {
        self.state.lock().descriptor_name(index).map(str::to_owned)
    }
}

impl Default for StateManager {
    fn default() -> Self {
        Self::new(InterpConfig::default())
    }
}

/// Time since the previous tick, if there was one and it's non-zero.
fn measured_interval(prev_tick: Option<Instant>, now: Instant) -> Option<Duration> {
    let d = now.saturating_duration_since(prev_tick?);
    (!d.is_zero()).then_some(d)
}
