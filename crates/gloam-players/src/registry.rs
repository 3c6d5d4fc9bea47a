//! The player registry: every player the client has seen this session.
//!
//! # Concurrency note
//!
//! `PlayerRegistry` is a plain `HashMap` wrapper and is not thread-safe by
//! itself. The client context owns it behind a `parking_lot::RwLock`: the
//! decode loop writes, renderers read.

use std::collections::HashMap;

use gloam_protocol::FrameDescriptor;
use tracing::debug;

use crate::PlayerAppearance;

/// Appearances of all players seen so far, keyed by name.
///
/// Entries are created lazily the first time a name shows up and are never
/// removed; the registry lives as long as the session.
#[derive(Debug, Default)]
pub struct PlayerRegistry {
    players: HashMap<String, PlayerAppearance>,
}

impl PlayerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }

    pub fn get(&self, name: &str) -> Option<&PlayerAppearance> {
        self.players.get(name)
    }

    /// Returns the entry for `name`, creating a blank one if needed.
    pub fn get_or_insert(&mut self, name: &str) -> &mut PlayerAppearance {
        self.players.entry(name.to_string()).or_insert_with(|| {
            debug!(name, "new player");
            PlayerAppearance::new(name)
        })
    }

    /// Records the sprite and (non-empty) colors last seen for `name`.
    pub fn update_appearance(&mut self, name: &str, sprite_id: u16, colors: &[u8]) -> &PlayerAppearance {
        let entry = self.get_or_insert(name);
        entry.update(sprite_id, colors);
        entry
    }

    /// Applies every named descriptor of a tick. Returns how many were
    /// applied. Nameless descriptors are skipped.
    pub fn apply_descriptors(&mut self, descriptors: &[FrameDescriptor]) -> usize {
        let mut applied = 0;
        for d in descriptors.iter().filter(|d| !d.name.is_empty()) {
            self.update_appearance(&d.name, d.sprite_id, &d.colors);
            applied += 1;
        }
        applied
    }

    /// Colors to draw a descriptor's mobile with.
    ///
    /// A player's remembered colors win over the descriptor's own, so a
    /// player stays correctly colored on ticks whose descriptor omits them.
    pub fn effective_colors<'a>(&'a self, descriptor: &'a FrameDescriptor) -> &'a [u8] {
        match self.players.get(&descriptor.name) {
            Some(p) if !p.colors.is_empty() => &p.colors,
            _ => &descriptor.colors,
        }
    }

    /// Iterates over all known players in no particular order.
    pub fn iter(&self) -> impl Iterator<Item = &PlayerAppearance> {
        self.players.values()
    }
}
