//! A single player's remembered appearance.

use serde::{Deserialize, Serialize};

/// What a player looks like, as last described by the server.
///
/// Keyed by name, not descriptor index: the server reuses index slots, but
/// a name always means the same player.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerAppearance {
    pub name: String,
    /// Mobile sprite sheet id.
    pub sprite_id: u16,
    /// Custom colors. Kept from the last descriptor that carried any.
    pub colors: Vec<u8>,
}

impl PlayerAppearance {
    /// A blank entry for a name seen for the first time.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    /// Applies a descriptor's appearance fields.
    ///
    /// The sprite always follows the latest descriptor. Colors only change
    /// when the descriptor actually carries some, since many descriptors
    /// are sent without them.
    pub fn update(&mut self, sprite_id: u16, colors: &[u8]) {
        self.sprite_id = sprite_id;
        if !colors.is_empty() {
            self.colors.clear();
            self.colors.extend_from_slice(colors);
        }
    }
}
