//! The draw-state decoder.
//!
//! A draw-state message is a single packed record describing everything the
//! client can see this tick. It is read strictly front to back:
//!
//! ```text
//! header       ack command (u8), ack frame (i32), resend frame (i32)
//! descriptors  count (u8) × { index, kind, sprite (u16), name\0, n, colors[n] }
//! vitals       hp, hp max, sp, sp max, balance, balance max, lighting flags
//! pictures     count (u8, 255 → repeat u8 + count u8), then bit-packed
//!              { id: 14, h: 11 signed, v: 11 signed }, padded to a byte
//! mobiles      count (u8) × { index, pose, h (i16), v (i16), color }
//! info         NUL-terminated chunks until an empty one
//! bubbles      count (u8) × { speaker, type, [lang], [far h, far v], text\0 }
//! ```
//!
//! Older servers obfuscate the body with a repeating XOR key. Rather than
//! guessing which one we are talking to, the decoder keeps an ordered list of
//! [`DecodeStrategy`]s and takes the first one whose output parses cleanly.

use serde::{Deserialize, Serialize};
use tracing::{debug, trace};

use crate::bits::{BitReader, sign_extend};
use crate::cursor::ByteCursor;
use crate::text::{clean_bubble_text, decode_mac_roman, parse_info_chunk};
use crate::types::{
    Bubble, BubbleKind, DrawStateFrame, FrameDescriptor, FrameHeader, FrameMobile, FramePicture,
    InfoLine, Vitals, pictures_summary,
};
use crate::ProtocolError;

/// Message tag of a draw-state message.
pub const DRAW_STATE_TAG: u16 = 2;

/// Tag (2 bytes) plus the fixed header (9 bytes).
pub const MIN_MESSAGE_LEN: usize = 11;

/// Key of the legacy body obfuscation, repeated from the first body byte.
pub const XOR_KEY: [u8; 6] = [0x3c, 0x5a, 0x69, 0x93, 0xa5, 0xc6];

/// Bytes of payload kept in the hex dump of an undecodable message.
const HEX_PREFIX_LEN: usize = 16;

const PICTURE_ID_BITS: u32 = 14;
const PICTURE_COORD_BITS: u32 = 11;
const PICTURE_BITS: usize = (PICTURE_ID_BITS + 2 * PICTURE_COORD_BITS) as usize;

/// Picture count value that escapes to a `repeat, count` pair.
const PICTURE_ESCAPE: u8 = 255;

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Decoder settings.
///
/// The sanity limits are fixed: they guard against hostile input and are
/// not something a user should tune.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DecoderConfig {
    /// Name of the local player. A descriptor with this exact name sets
    /// [`DrawStateFrame::self_index`].
    pub player_name: Option<String>,
}

impl DecoderConfig {
    pub const MAX_DESCRIPTORS: usize = 64;
    pub const MAX_PICTURES: usize = 512;
    pub const MAX_MOBILES: usize = 128;
    pub const MAX_BUBBLES: usize = 64;

    /// Config for a known local player.
    pub fn for_player(name: impl Into<String>) -> Self {
        Self {
            player_name: Some(name.into()),
        }
    }

    /// Normalizes the config. An empty player name means "unknown".
    pub fn validated(mut self) -> Self {
        if self.player_name.as_deref().is_some_and(|n| n.trim().is_empty()) {
            self.player_name = None;
        }
        self
    }
}

// ---------------------------------------------------------------------------
// Strategies
// ---------------------------------------------------------------------------

/// One way of turning a received body into bytes the parser can read.
///
/// Strategies never modify the caller's buffer: each gets its own copy, so a
/// failed attempt can't poison the next one.
pub trait DecodeStrategy: Send + Sync + 'static {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    /// Produces the candidate bytes for the structural parse.
    fn transform(&self, body: &[u8]) -> Vec<u8>;
}

/// Uses the body as-is.
#[derive(Debug, Clone, Copy, Default)]
pub struct Plain;

impl DecodeStrategy for Plain {
    fn name(&self) -> &'static str {
        "plain"
    }

    fn transform(&self, body: &[u8]) -> Vec<u8> {
        body.to_vec()
    }
}

/// Undoes the legacy XOR obfuscation.
#[derive(Debug, Clone, Copy, Default)]
pub struct Xor;

impl DecodeStrategy for Xor {
    fn name(&self) -> &'static str {
        "xor"
    }

    fn transform(&self, body: &[u8]) -> Vec<u8> {
        let mut out = body.to_vec();
        xor_in_place(&mut out);
        out
    }
}

/// Applies [`XOR_KEY`] in place. Applying it twice restores the input.
pub fn xor_in_place(data: &mut [u8]) {
    for (byte, key) in data.iter_mut().zip(XOR_KEY.iter().cycle()) {
        *byte ^= key;
    }
}

// ---------------------------------------------------------------------------
// DrawStateDecoder
// ---------------------------------------------------------------------------

/// Decodes draw-state bodies into validated [`DrawStateFrame`]s.
///
/// Decoding is a pure function of the input bytes and the config. Nothing is
/// remembered between calls; merging a frame into client state is the job of
/// `gloam_interp::StateManager`.
pub struct DrawStateDecoder {
    config: DecoderConfig,
    strategies: Vec<Box<dyn DecodeStrategy>>,
}

impl DrawStateDecoder {
    /// Creates a decoder that tries [`Plain`] then [`Xor`].
    pub fn new(config: DecoderConfig) -> Self {
        Self::with_strategies(config, vec![Box::new(Plain), Box::new(Xor)])
    }

    /// Creates a decoder with an explicit strategy order.
    pub fn with_strategies(config: DecoderConfig, strategies: Vec<Box<dyn DecodeStrategy>>) -> Self {
        Self {
            config: config.validated(),
            strategies,
        }
    }

    pub fn config(&self) -> &DecoderConfig {
        &self.config
    }

    /// Decodes a full message: 2-byte tag followed by the body.
    ///
    /// # Errors
    /// [`ProtocolError::ShortMessage`] if the message can't even hold the
    /// tag and fixed header; otherwise whatever [`decode`](Self::decode)
    /// returns.
    pub fn decode_message(&self, message: &[u8]) -> Result<DrawStateFrame, ProtocolError> {
        if message.len() < MIN_MESSAGE_LEN {
            return Err(ProtocolError::ShortMessage(message.len()));
        }
        self.decode(&message[2..])
    }

    /// Decodes a body (tag already stripped).
    ///
    /// Each strategy is tried in order; the first clean parse wins.
    ///
    /// # Errors
    /// [`ProtocolError::Undecodable`] wrapping the last strategy's error.
    pub fn decode(&self, body: &[u8]) -> Result<DrawStateFrame, ProtocolError> {
        let player_name = self.config.player_name.as_deref();
        let mut last: Option<(Vec<u8>, ProtocolError)> = None;

        for strategy in &self.strategies {
            let candidate = strategy.transform(body);
            match parse_draw_state(&candidate, player_name) {
                Ok(frame) => {
                    trace!(
                        strategy = strategy.name(),
                        ack_frame = frame.header.ack_frame,
                        descriptors = frame.descriptors.len(),
                        mobiles = frame.mobiles.len(),
                        pictures = %pictures_summary(&frame.pictures),
                        "decoded draw state"
                    );
                    return Ok(frame);
                }
                Err(e) => {
                    trace!(strategy = strategy.name(), error = %e, "strategy rejected body");
                    last = Some((candidate, e));
                }
            }
        }

        let (candidate, source) = last.unwrap_or_else(|| {
            (
                body.to_vec(),
                ProtocolError::Malformed("no decode strategies configured".into()),
            )
        });
        let hex = hex_prefix(&candidate);
        debug!(len = body.len(), %hex, error = %source, "dropping undecodable draw state");
        Err(ProtocolError::Undecodable {
            hex,
            source: Box::new(source),
        })
    }
}

impl Default for DrawStateDecoder {
    fn default() -> Self {
        Self::new(DecoderConfig::default())
    }
}

impl std::fmt::Debug for DrawStateDecoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let names: Vec<_> = self.strategies.iter().map(|s| s.name()).collect();
        f.debug_struct("DrawStateDecoder")
            .field("config", &self.config)
            .field("strategies", &names)
            .finish()
    }
}

/// Lowercase hex of the first few bytes, with `...` if cut short.
fn hex_prefix(data: &[u8]) -> String {
    let mut out: String = data
        .iter()
        .take(HEX_PREFIX_LEN)
        .map(|b| format!("{b:02x}"))
        .collect();
    if data.len() > HEX_PREFIX_LEN {
        out.push_str("...");
    }
    out
}

// ---------------------------------------------------------------------------
// Structural parse
// ---------------------------------------------------------------------------

fn check_limit(what: &'static str, count: usize, max: usize) -> Result<(), ProtocolError> {
    if count > max {
        return Err(ProtocolError::LimitExceeded { what, count, max });
    }
    Ok(())
}

/// Parses one already-deobfuscated body.
///
/// The whole body must be consumed; a frame is returned only if every
/// section validated.
pub fn parse_draw_state(
    body: &[u8],
    player_name: Option<&str>,
) -> Result<DrawStateFrame, ProtocolError> {
    let mut c = ByteCursor::new(body);
    let mut frame = DrawStateFrame {
        header: FrameHeader {
            ack_command: c.u8("ack command")?,
            ack_frame: c.i32("ack frame")?,
            resend_frame: c.i32("resend frame")?,
        },
        ..DrawStateFrame::default()
    };

    // Descriptors
    let count = usize::from(c.u8("descriptor count")?);
    check_limit("descriptor", count, DecoderConfig::MAX_DESCRIPTORS)?;
    frame.descriptors.reserve(count);
    for _ in 0..count {
        let index = c.u8("descriptor index")?;
        let kind = c.u8("descriptor kind")?;
        let sprite_id = c.u16("descriptor sprite")?;
        let name = decode_mac_roman(c.c_string("descriptor name")?);
        let ncolors = usize::from(c.u8("descriptor color count")?);
        let colors = c.take(ncolors, "descriptor colors")?.to_vec();
        if player_name == Some(name.as_str()) {
            frame.self_index = Some(index);
        }
        frame.descriptors.push(FrameDescriptor {
            index,
            kind,
            sprite_id,
            name,
            colors,
        });
    }

    frame.vitals = Vitals {
        hp: c.u8("hp")?,
        hp_max: c.u8("hp max")?,
        sp: c.u8("sp")?,
        sp_max: c.u8("sp max")?,
        balance: c.u8("balance")?,
        balance_max: c.u8("balance max")?,
        lighting_flags: c.u8("lighting flags")?,
    };

    parse_pictures(&mut c, &mut frame)?;

    // Mobiles
    let count = usize::from(c.u8("mobile count")?);
    check_limit("mobile", count, DecoderConfig::MAX_MOBILES)?;
    frame.mobiles.reserve(count);
    for _ in 0..count {
        frame.mobiles.push(FrameMobile {
            index: c.u8("mobile index")?,
            pose: c.u8("mobile pose")?,
            h: c.i16("mobile h")?,
            v: c.i16("mobile v")?,
            color: c.u8("mobile color")?,
        });
    }

    // Info text
    loop {
        let chunk = c.c_string("info text")?;
        if chunk.is_empty() {
            break;
        }
        parse_info_chunk(chunk, &mut frame.info);
    }

    parse_bubbles(&mut c, &mut frame)?;

    if c.remaining() > 0 {
        return Err(ProtocolError::TrailingBytes(c.remaining()));
    }
    Ok(frame)
}

fn parse_pictures(c: &mut ByteCursor<'_>, frame: &mut DrawStateFrame) -> Result<(), ProtocolError> {
    let mut count = c.u8("picture count")?;
    let mut repeat = 0u8;
    if count == PICTURE_ESCAPE {
        repeat = c.u8("picture repeat")?;
        count = c.u8("picture count")?;
    }
    let (repeat, count) = (usize::from(repeat), usize::from(count));
    check_limit("picture", repeat + count, DecoderConfig::MAX_PICTURES)?;
    frame.repeat_pictures = repeat;

    let region_len = (count * PICTURE_BITS).div_ceil(8);
    if region_len > c.remaining() {
        return Err(ProtocolError::Malformed(format!(
            "{count} pictures need {region_len} bytes, {} left",
            c.remaining()
        )));
    }
    let region = c.take(region_len, "pictures")?;

    let mut bits = BitReader::new(region);
    frame.pictures.reserve(count);
    for _ in 0..count {
        let sprite_id = bits.read_bits(PICTURE_ID_BITS) as u16;
        let h = sign_extend(bits.read_bits(PICTURE_COORD_BITS), PICTURE_COORD_BITS);
        let v = sign_extend(bits.read_bits(PICTURE_COORD_BITS), PICTURE_COORD_BITS);
        frame.pictures.push(FramePicture { sprite_id, h, v });
    }
    Ok(())
}

fn parse_bubbles(c: &mut ByteCursor<'_>, frame: &mut DrawStateFrame) -> Result<(), ProtocolError> {
    let count = usize::from(c.u8("bubble count")?);
    check_limit("bubble", count, DecoderConfig::MAX_BUBBLES)?;
    frame.bubbles.reserve(count);
    for _ in 0..count {
        let speaker = c.u8("bubble speaker")?;
        let raw_type = c.u8("bubble type")?;
        let language = if raw_type & BubbleKind::FLAG_NOT_COMMON != 0 {
            Some(c.u8("bubble language")?)
        } else {
            None
        };
        let far = if raw_type & BubbleKind::FLAG_FAR != 0 {
            Some((c.i16("bubble far h")?, c.i16("bubble far v")?))
        } else {
            None
        };
        let (text, nights) = clean_bubble_text(c.c_string("bubble text")?);
        frame.info.extend(nights.into_iter().map(InfoLine::Night));
        frame.bubbles.push(Bubble {
            speaker,
            kind: BubbleKind::from_type_byte(raw_type),
            raw_type,
            language,
            far,
            text,
        });
    }
    Ok(())
}
