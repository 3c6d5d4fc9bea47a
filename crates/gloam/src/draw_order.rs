//! Back-to-front ordering of everything in a snapshot.
//!
//! Layers, in order:
//!
//! 1. pictures on negative planes (ground, floors)
//! 2. dead mobiles, top to bottom
//! 3. live mobiles and plane-0 pictures interleaved by `v`, so an actor
//!    standing below a tree is drawn over it
//! 4. pictures on positive planes (roofs, overlays)
//!
//! Within a layer, items are ordered by `v`. At equal `v` a picture is drawn
//! before a mobile.

use gloam_interp::DrawStateSnapshot;
use gloam_protocol::{FrameMobile, FramePicture};

/// One thing to draw.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DrawItem {
    Picture(FramePicture),
    Mobile(FrameMobile),
}

impl DrawItem {
    pub fn v(&self) -> i16 {
        match self {
            Self::Picture(p) => p.v,
            Self::Mobile(m) => m.v,
        }
    }
}

/// Orders a snapshot's pictures and mobiles for drawing.
///
/// `plane` maps a picture's sprite id to its plane; with no archive loaded,
/// pass `|_| 0`.
pub fn draw_order(snapshot: &DrawStateSnapshot, plane: impl Fn(u16) -> i16) -> Vec<DrawItem> {
    let mut pictures: Vec<(i16, FramePicture)> =
        snapshot.pictures.iter().map(|p| (plane(p.sprite_id), *p)).collect();
    pictures.sort_by_key(|(pl, p)| (*pl, p.v));

    let mut dead: Vec<FrameMobile> =
        snapshot.mobiles.values().filter(|m| m.is_dead()).copied().collect();
    dead.sort_by_key(|m| m.v);
    let mut live: Vec<FrameMobile> =
        snapshot.mobiles.values().filter(|m| !m.is_dead()).copied().collect();
    live.sort_by_key(|m| m.v);

    let mut out = Vec::with_capacity(pictures.len() + snapshot.mobiles.len());
    out.extend(
        pictures
            .iter()
            .filter(|(pl, _)| *pl < 0)
            .map(|(_, p)| DrawItem::Picture(*p)),
    );
    out.extend(dead.into_iter().map(DrawItem::Mobile));

    let mut ground = pictures.iter().filter(|(pl, _)| *pl == 0).map(|(_, p)| *p).peekable();
    let mut live = live.into_iter().peekable();
    loop {
        let item = match (live.peek(), ground.peek()) {
            (Some(m), Some(p)) if m.v < p.v => live.next().map(DrawItem::Mobile),
            (_, Some(_)) => ground.next().map(DrawItem::Picture),
            (Some(_), None) => live.next().map(DrawItem::Mobile),
            (None, None) => None,
        };
        match item {
            Some(item) => out.push(item),
            None => break,
        }
    }

    out.extend(
        pictures
            .iter()
            .filter(|(pl, _)| *pl > 0)
            .map(|(_, p)| DrawItem::Picture(*p)),
    );
    out
}
