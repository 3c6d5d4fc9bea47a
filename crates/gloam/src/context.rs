//! The client context: every piece of client-side state, owned in one place.
//!
//! A [`ClientContext`] is created once per session and shared (usually as an
//! `Arc`) between the decode loop and whoever draws. Each part has its own
//! lock so a renderer reading the message log never waits on a merge.

use std::sync::Arc;

use gloam_interp::{BlendFactors, DrawStateSnapshot, MergeReport, StateManager};
use gloam_players::PlayerRegistry;
use gloam_protocol::{
    Bubble, BubbleKind, DRAW_STATE_TAG, DrawStateDecoder, DrawStateFrame, InfoLine, ProtocolError,
};
use gloam_sprites::SpriteArchive;
use parking_lot::{Mutex, RwLock};
use tracing::{debug, trace};

use crate::draw_order::{DrawItem, draw_order};
use crate::{AmbientLight, ClientConfig, GloamError, MessageLog};

/// What happened to one incoming message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageOutcome {
    /// A draw-state tick was decoded and merged.
    Applied(MergeReport),
    /// The message carried some other tag and was left alone.
    Ignored(u16),
}

/// Shared client state for one session.
#[derive(Debug)]
pub struct ClientContext {
    config: ClientConfig,
    decoder: DrawStateDecoder,
    state: StateManager,
    players: RwLock<PlayerRegistry>,
    messages: MessageLog,
    light: Mutex<AmbientLight>,
    archive: Option<Arc<SpriteArchive>>,
}

impl ClientContext {
    pub fn new(config: ClientConfig) -> Self {
        let config = config.validated();
        Self {
            decoder: DrawStateDecoder::new(config.decoder_config()),
            state: StateManager::new(config.interp.clone()),
            players: RwLock::new(PlayerRegistry::new()),
            messages: MessageLog::new(config.message_log_capacity),
            light: Mutex::new(AmbientLight::new()),
            archive: None,
            config,
        }
    }

    /// Attaches a loaded sprite archive.
    pub fn with_archive(mut self, archive: Arc<SpriteArchive>) -> Self {
        self.archive = Some(archive);
        self
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    pub fn archive(&self) -> Option<&Arc<SpriteArchive>> {
        self.archive.as_ref()
    }

    pub fn state(&self) -> &StateManager {
        &self.state
    }

    pub fn messages(&self) -> &MessageLog {
        &self.messages
    }

    pub fn players(&self) -> &RwLock<PlayerRegistry> {
        &self.players
    }

    pub fn light(&self) -> AmbientLight {
        *self.light.lock()
    }

    // -----------------------------------------------------------------------
    // Incoming messages
    // -----------------------------------------------------------------------

    /// Handles one raw tagged message from the server.
    ///
    /// Draw-state messages are decoded and merged; anything else is ignored.
    /// A message that fails to decode leaves every part of the state as it
    /// was.
    pub fn handle_message(&self, message: &[u8]) -> Result<MessageOutcome, GloamError> {
        let Some(tag) = message.get(..2).map(|t| u16::from_be_bytes([t[0], t[1]])) else {
            return Err(ProtocolError::ShortMessage(message.len()).into());
        };
        if tag != DRAW_STATE_TAG {
            trace!(tag, len = message.len(), "ignoring message");
            return Ok(MessageOutcome::Ignored(tag));
        }
        let frame = self.decoder.decode_message(message)?;
        Ok(MessageOutcome::Applied(self.apply_frame(&frame)))
    }

    /// Merges a decoded frame into every part of the client state.
    pub fn apply_frame(&self, frame: &DrawStateFrame) -> MergeReport {
        let report = self.state.merge_tick(frame);

        let applied = self.players.write().apply_descriptors(&frame.descriptors);
        if applied > 0 {
            trace!(applied, "updated player appearances");
        }

        {
            let mut light = self.light.lock();
            light.set_flags(frame.vitals.lighting_flags);
            for line in &frame.info {
                if let InfoLine::Night(cmd) = line {
                    light.apply_night(cmd);
                }
            }
        }

        for text in frame.info.iter().filter_map(InfoLine::display_text) {
            self.messages.push(text);
        }

        let self_index = self.state.self_index();
        for bubble in &frame.bubbles {
            if Some(bubble.speaker) == self_index {
                continue;
            }
            let name = self.state.descriptor_name(bubble.speaker);
            if let Some(line) = format_bubble(name.as_deref(), bubble) {
                debug!(speaker = bubble.speaker, "{line}");
                self.messages.push(line);
            }
        }
        report
    }

    // -----------------------------------------------------------------------
    // Renderer side
    // -----------------------------------------------------------------------

    pub fn snapshot(&self) -> DrawStateSnapshot {
        self.state.snapshot()
    }

    pub fn blend_factors(&self) -> BlendFactors {
        self.state.compute_blend_factors(std::time::Instant::now())
    }

    /// Draw order of a snapshot, using the archive's planes when loaded.
    pub fn draw_order(&self, snapshot: &DrawStateSnapshot) -> Vec<DrawItem> {
        match &self.archive {
            Some(archive) => draw_order(snapshot, |id| archive.plane(u32::from(id))),
            None => draw_order(snapshot, |_| 0),
        }
    }

    /// Colors to draw the mobile at descriptor `index` with.
    ///
    /// With cross-fade on, `previous` asks for the colors as of the previous
    /// tick; a descriptor missing there falls back to the current one.
    pub fn mobile_colors(&self, snapshot: &DrawStateSnapshot, index: u8, previous: bool) -> Vec<u8> {
        let descriptor = previous
            .then(|| snapshot.prev_descriptors.get(&index))
            .flatten()
            .or_else(|| snapshot.descriptors.get(&index));
        match descriptor {
            Some(d) => self.players.read().effective_colors(d).to_vec(),
            None => Vec::new(),
        }
    }
}

impl Default for ClientContext {
    fn default() -> Self {
        Self::new(ClientConfig::default())
    }
}

/// Formats a bubble for the message log.
///
/// Returns `None` for bubbles with no text. Without a speaker name, or for
/// kinds with no speech verb, the bare text is used.
pub fn format_bubble(name: Option<&str>, bubble: &Bubble) -> Option<String> {
    if bubble.text.is_empty() {
        return None;
    }
    let text = &bubble.text;
    let line = match (name.filter(|n| !n.is_empty()), bubble.kind) {
        (Some(name), BubbleKind::Narrate) => format!("({name}): {text}"),
        (Some(name), kind) => match kind.verb() {
            Some(verb) => format!("{name} {verb}, {text:?}"),
            None => text.clone(),
        },
        (None, _) => text.clone(),
    };
    Some(line)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn bubble(kind: BubbleKind, text: &str) -> Bubble {
        Bubble {
            speaker: 1,
            kind,
            raw_type: 0,
            language: None,
            far: None,
            text: text.into(),
        }
    }

    #[test]
    fn test_format_bubble_speech() {
        let b = bubble(BubbleKind::Whisper, "psst");
        assert_eq!(format_bubble(Some("Bob"), &b).as_deref(), Some("Bob whispers, \"psst\""));
    }

    #[test]
    fn test_format_bubble_narrate() {
        let b = bubble(BubbleKind::Narrate, "The wind howls.");
        assert_eq!(
            format_bubble(Some("Bob"), &b).as_deref(),
            Some("(Bob): The wind howls.")
        );
    }

    #[test]
    fn test_format_bubble_without_name_or_verb() {
        let b = bubble(BubbleKind::Normal, "hi");
        assert_eq!(format_bubble(None, &b).as_deref(), Some("hi"));
        assert_eq!(format_bubble(Some(""), &b).as_deref(), Some("hi"));
        let b = bubble(BubbleKind::Monster, "grr");
        assert_eq!(format_bubble(Some("Rat"), &b).as_deref(), Some("grr"));
    }

    #[test]
    fn test_format_bubble_empty_text() {
        assert!(format_bubble(Some("Bob"), &bubble(BubbleKind::Yell, "")).is_none());
    }

    #[test]
    fn test_short_message_is_an_error() {
        let ctx = ClientContext::default();
        let err = ctx.handle_message(&[0]).unwrap_err();
        assert!(matches!(err, GloamError::Protocol(ProtocolError::ShortMessage(1))));
    }

    #[test]
    fn test_other_tags_ignored() {
        let ctx = ClientContext::default();
        let outcome = ctx.handle_message(&[0, 7, 1, 2, 3]).unwrap();
        assert_eq!(outcome, MessageOutcome::Ignored(7));
    }
}
