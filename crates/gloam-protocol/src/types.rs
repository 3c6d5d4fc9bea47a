//! Decoded draw-state types.
//!
//! Everything the server tells us in one world-state tick ends up in a
//! [`DrawStateFrame`]. A frame only exists once the whole message has been
//! validated, so holding one means every field below is trustworthy.

use std::fmt;

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Entities
// ---------------------------------------------------------------------------

/// A named entity visible this tick.
///
/// `index` is a server-side slot. The same slot may hold a different
/// entity after a few ticks, so anything that needs stable identity should
/// key on `name` instead.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameDescriptor {
    /// Server slot this descriptor occupies.
    pub index: u8,
    /// Descriptor kind (player, monster, ...). Opaque to the decoder.
    pub kind: u8,
    /// Sprite sheet used for the entity.
    pub sprite_id: u16,
    /// Display name, decoded from Mac Roman.
    pub name: String,
    /// Palette override bytes for customizable sprites.
    pub colors: Vec<u8>,
}

/// A positioned scenery or effect sprite.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FramePicture {
    /// Sprite id (14 bits on the wire).
    pub sprite_id: u16,
    /// Horizontal offset from the playfield center.
    pub h: i16,
    /// Vertical offset from the playfield center.
    pub v: i16,
}

impl fmt::Display for FramePicture {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:({},{})", self.sprite_id, self.h, self.v)
    }
}

/// An animated actor's pose and position for one tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameMobile {
    /// Matches the `index` of a [`FrameDescriptor`].
    pub index: u8,
    /// Pose cell in the mobile's sprite sheet.
    pub pose: u8,
    /// Horizontal offset from the playfield center.
    pub h: i16,
    /// Vertical offset from the playfield center.
    pub v: i16,
    /// Name-tag color byte.
    pub color: u8,
}

impl FrameMobile {
    /// Pose value the server uses for a fallen actor.
    pub const POSE_DEAD: u8 = 32;

    /// Returns `true` if this mobile is lying dead.
    pub fn is_dead(&self) -> bool {
        self.pose == Self::POSE_DEAD
    }
}

/// Health, spirit and balance bars plus the lighting flags byte.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vitals {
    pub hp: u8,
    pub hp_max: u8,
    pub sp: u8,
    pub sp_max: u8,
    pub balance: u8,
    pub balance_max: u8,
    /// Raw ambient-lighting flags; see `gloam::AmbientLight`.
    pub lighting_flags: u8,
}

// ---------------------------------------------------------------------------
// Text
// ---------------------------------------------------------------------------

/// One line from the informational-text section of a tick.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum InfoLine {
    /// Plain text meant for the message log.
    Text(String),
    /// A tagged line. `text` is the log-ready form (`"think: ..."`), or
    /// `None` for tags that carry no displayable text.
    Tagged {
        /// The two-character tag, e.g. `"th"`.
        tag: String,
        /// Display text, if this tag has any.
        text: Option<String>,
    },
    /// A night/ambient lighting command (`/nt 40 /sa -10 /cl 1`).
    Night(NightCommand),
}

impl InfoLine {
    /// The text this line contributes to the message log, if any.
    pub fn display_text(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            Self::Tagged { text, .. } => text.as_deref(),
            Self::Night(_) => None,
        }
    }
}

/// Parameters of a night command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct NightCommand {
    /// Base darkness level, 0..=100.
    pub level: i32,
    /// Sun azimuth in degrees.
    pub azimuth: i32,
    /// Whether the sky is overcast.
    pub cloudy: bool,
}

/// What kind of speech a bubble represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum BubbleKind {
    Normal,
    Whisper,
    Yell,
    Thought,
    RealAction,
    Monster,
    PlayerAction,
    Ponder,
    Narrate,
    Unknown(u8),
}

impl BubbleKind {
    /// Low six bits of the bubble type byte.
    pub const TYPE_MASK: u8 = 0x3F;
    /// Type bit: a 1-byte language field follows.
    pub const FLAG_NOT_COMMON: u8 = 0x40;
    /// Type bit: a 4-byte far-position field follows.
    pub const FLAG_FAR: u8 = 0x80;

    /// Classifies a raw type byte (flags are ignored).
    pub fn from_type_byte(raw: u8) -> Self {
        match raw & Self::TYPE_MASK {
            0 => Self::Normal,
            1 => Self::Whisper,
            2 => Self::Yell,
            3 => Self::Thought,
            4 => Self::RealAction,
            5 => Self::Monster,
            6 => Self::PlayerAction,
            7 => Self::Ponder,
            8 => Self::Narrate,
            other => Self::Unknown(other),
        }
    }

    /// The verb used when logging this bubble ("Bob whispers, ...").
    pub fn verb(&self) -> Option<&'static str> {
        match self {
            Self::Normal => Some("says"),
            Self::Whisper => Some("whispers"),
            Self::Yell => Some("yells"),
            Self::Thought => Some("thinks"),
            Self::Ponder => Some("ponders"),
            _ => None,
        }
    }
}

/// A speech bubble attached to an entity index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Bubble {
    /// Descriptor index of the speaker.
    pub speaker: u8,
    /// Decoded bubble kind.
    pub kind: BubbleKind,
    /// The raw type byte, flags included.
    pub raw_type: u8,
    /// Language byte, present when the type has the not-common flag.
    pub language: Option<u8>,
    /// Off-screen speaker position, present when the type has the far flag.
    pub far: Option<(i16, i16)>,
    /// Cleaned payload text. Empty when nothing displayable remained.
    pub text: String,
}

// ---------------------------------------------------------------------------
// Frame
// ---------------------------------------------------------------------------

/// Acknowledgement counters from the message header.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FrameHeader {
    pub ack_command: u8,
    pub ack_frame: i32,
    pub resend_frame: i32,
}

/// One fully validated world-state tick.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DrawStateFrame {
    pub header: FrameHeader,
    /// Descriptors sent this tick (not the full set known to the client).
    pub descriptors: Vec<FrameDescriptor>,
    pub vitals: Vitals,
    /// How many pictures from the previous tick to keep before `pictures`.
    pub repeat_pictures: usize,
    /// Pictures sent this tick.
    pub pictures: Vec<FramePicture>,
    pub mobiles: Vec<FrameMobile>,
    pub info: Vec<InfoLine>,
    pub bubbles: Vec<Bubble>,
    /// Descriptor index whose name matched the local player, if any.
    pub self_index: Option<u8>,
}

/// Formats up to the first 8 pictures as `id:(h,v)` for debug logs.
pub fn pictures_summary(pictures: &[FramePicture]) -> String {
    const MAX: usize = 8;
    let mut out = pictures
        .iter()
        .take(MAX)
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(" ");
    if pictures.len() > MAX {
        out.push_str(" ...");
    }
    out
}
