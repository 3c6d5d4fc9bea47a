//! Integration tests for the draw-state decoder.
//!
//! Bodies are assembled with `common::BodyBuilder` so each test reads as a
//! description of the tick it sends.

mod common;

use common::BodyBuilder;
use gloam_protocol::{
    BubbleKind, DecoderConfig, DrawStateDecoder, InfoLine, ProtocolError, parse_draw_state,
    xor_in_place,
};
use rand::{Rng, SeedableRng, rngs::StdRng};

// =========================================================================
// Helpers
// =========================================================================

fn decoder_for(name: &str) -> DrawStateDecoder {
    DrawStateDecoder::new(DecoderConfig::for_player(name))
}

fn sample_body() -> Vec<u8> {
    BodyBuilder::new()
        .descriptor(3, 1200, "Alice", &[4, 5, 6])
        .descriptor(9, 1300, "Bob", &[])
        .picture(500, 10, -20)
        .picture(501, -1024, 1023)
        .mobile(3, 0, 5, 6)
        .mobile(9, 32, -7, 8)
        .info(b"Welcome to the world.")
        .info(b"Bob has fallen.")
        .bubble(9, 0x00, b"hello")
        .build()
}

// =========================================================================
// End to end
// =========================================================================

#[test]
fn test_plain_body_decodes_every_section() {
    let frame = decoder_for("Alice").decode(&sample_body()).unwrap();

    assert_eq!(frame.descriptors.len(), 2);
    assert_eq!(frame.descriptors[0].name, "Alice");
    assert_eq!(frame.descriptors[0].sprite_id, 1200);
    assert_eq!(frame.descriptors[0].colors, vec![4, 5, 6]);
    assert_eq!(frame.self_index, Some(3));

    assert_eq!(frame.pictures.len(), 2);
    assert_eq!((frame.pictures[0].h, frame.pictures[0].v), (10, -20));
    assert_eq!(frame.pictures[1].sprite_id, 501);
    assert_eq!((frame.pictures[1].h, frame.pictures[1].v), (-1024, 1023));

    assert_eq!(frame.mobiles.len(), 2);
    assert!(frame.mobiles[1].is_dead());
    assert_eq!(frame.mobiles[1].h, -7);

    assert_eq!(
        frame.info,
        vec![
            InfoLine::Text("Welcome to the world.".into()),
            InfoLine::Text("Bob has fallen.".into()),
        ]
    );

    assert_eq!(frame.bubbles.len(), 1);
    assert_eq!(frame.bubbles[0].kind, BubbleKind::Normal);
    assert_eq!(frame.bubbles[0].text, "hello");
}

#[test]
fn test_xor_body_decodes_to_same_frame() {
    let plain = sample_body();
    let mut obfuscated = plain.clone();
    xor_in_place(&mut obfuscated);

    // The obfuscated bytes don't parse as-is, so only the XOR strategy can
    // have produced the frame.
    assert!(parse_draw_state(&obfuscated, Some("Alice")).is_err());

    let decoder = decoder_for("Alice");
    let a = decoder.decode(&plain).unwrap();
    let b = decoder.decode(&obfuscated).unwrap();
    assert_eq!(a, b);
}

#[test]
fn test_decode_message_strips_tag() {
    let builder = BodyBuilder::new().mobile(1, 2, 3, 4);
    let frame = DrawStateDecoder::default()
        .decode_message(&builder.build_message())
        .unwrap();
    assert_eq!(frame.mobiles.len(), 1);
}

#[test]
fn test_unknown_player_leaves_self_index_empty() {
    let frame = decoder_for("Carol").decode(&sample_body()).unwrap();
    assert!(frame.self_index.is_none());
}

// =========================================================================
// Pictures
// =========================================================================

#[test]
fn test_picture_repeat_escape() {
    let body = BodyBuilder::new()
        .repeat(4)
        .picture(7, 1, 1)
        .picture(8, 2, 2)
        .build();
    let frame = parse_draw_state(&body, None).unwrap();
    assert_eq!(frame.repeat_pictures, 4);
    assert_eq!(frame.pictures.len(), 2);
    assert_eq!(frame.pictures[1].sprite_id, 8);
}

#[test]
fn test_largest_picture_escape_is_accepted() {
    let mut builder = BodyBuilder::new().repeat(255);
    for i in 0..255 {
        builder = builder.picture(i, 0, 0);
    }
    let frame = parse_draw_state(&builder.build(), None).unwrap();
    assert_eq!(frame.repeat_pictures + frame.pictures.len(), 510);
}

#[test]
fn test_picture_region_past_end_is_malformed() {
    let mut body = BodyBuilder::new().build();
    // Descriptor count 0 at 9, vitals 10..17, picture count at 17.
    body[17] = 10;
    body.truncate(19);
    assert!(matches!(
        parse_draw_state(&body, None),
        Err(ProtocolError::Malformed(_))
    ));
}

// =========================================================================
// Text
// =========================================================================

#[test]
fn test_info_chunk_with_carriage_returns_and_tags() {
    let body = BodyBuilder::new()
        .info(b"one\rtwo")
        .info(b"\xc2inYou feel rested.")
        .info(b"/nt 60 /sa 90 /cl 0")
        .build();
    let frame = parse_draw_state(&body, None).unwrap();
    let texts: Vec<_> = frame.info.iter().filter_map(|l| l.display_text()).collect();
    assert_eq!(texts, vec!["one", "two", "info: You feel rested."]);
    assert!(frame.info.iter().any(|l| matches!(l, InfoLine::Night(n) if n.level == 60)));
}

#[test]
fn test_bubble_optional_fields() {
    let body = BodyBuilder::new()
        .bubble(1, 0x40 | 0x01, b"psst")
        .bubble(2, 0x80 | 0x02, b"OVER HERE")
        .build();
    let frame = parse_draw_state(&body, None).unwrap();

    let whisper = &frame.bubbles[0];
    assert_eq!(whisper.kind, BubbleKind::Whisper);
    assert_eq!(whisper.language, Some(3));
    assert!(whisper.far.is_none());

    let yell = &frame.bubbles[1];
    assert_eq!(yell.kind, BubbleKind::Yell);
    assert_eq!(yell.far, Some((-40, 12)));
    assert_eq!(yell.text, "OVER HERE");
}

#[test]
fn test_bubble_strips_tags_and_joins_lines() {
    let body = BodyBuilder::new()
        .bubble(1, 0, b"\xc2pnhi\rthere ")
        .build();
    let frame = parse_draw_state(&body, None).unwrap();
    assert_eq!(frame.bubbles[0].text, "hi there");
}

// =========================================================================
// Rejection
// =========================================================================

#[test]
fn test_trailing_byte_after_bubbles_rejects() {
    let mut body = sample_body();
    body.push(0x00);
    assert!(matches!(
        parse_draw_state(&body, None),
        Err(ProtocolError::TrailingBytes(1))
    ));
    assert!(DrawStateDecoder::default().decode(&body).is_err());
}

#[test]
fn test_truncated_descriptor_rejects() {
    let body = sample_body();
    // Cut inside the first descriptor name.
    let err = parse_draw_state(&body[..15], None).unwrap_err();
    assert!(matches!(err, ProtocolError::Malformed(_)));
}

#[test]
fn test_descriptor_limit() {
    let mut at_max = BodyBuilder::new();
    for i in 0..DecoderConfig::MAX_DESCRIPTORS as u8 {
        at_max = at_max.descriptor(i, 1, "x", &[]);
    }
    assert!(parse_draw_state(&at_max.build(), None).is_ok());

    let over = at_max.descriptor(200, 1, "y", &[]);
    let err = parse_draw_state(&over.build(), None).unwrap_err();
    assert!(err.is_limit());
}

#[test]
fn test_mobile_limit() {
    let mut at_max = BodyBuilder::new();
    for i in 0..DecoderConfig::MAX_MOBILES as u8 {
        at_max = at_max.mobile(i, 0, 0, 0);
    }
    assert!(parse_draw_state(&at_max.build(), None).is_ok());

    let over = at_max.mobile(200, 0, 0, 0);
    let err = parse_draw_state(&over.build(), None).unwrap_err();
    assert!(matches!(
        err,
        ProtocolError::LimitExceeded { what: "mobile", count: 129, max: 128 }
    ));
}

#[test]
fn test_bubble_limit() {
    let mut at_max = BodyBuilder::new();
    for _ in 0..DecoderConfig::MAX_BUBBLES {
        at_max = at_max.bubble(1, 0, b"a");
    }
    assert!(parse_draw_state(&at_max.build(), None).is_ok());

    let over = at_max.bubble(1, 0, b"b");
    assert!(parse_draw_state(&over.build(), None).unwrap_err().is_limit());
}

#[test]
fn test_undecodable_reports_last_strategy_error() {
    let err = DrawStateDecoder::default().decode(&[0u8; 3]).unwrap_err();
    match err {
        ProtocolError::Undecodable { hex, source } => {
            // The hex dump is of the XOR-transformed bytes.
            assert_eq!(hex, "3c5a69");
            assert!(matches!(*source, ProtocolError::Truncated { .. }));
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

// =========================================================================
// Robustness
// =========================================================================

#[test]
fn test_random_garbage_never_panics() {
    let mut rng = StdRng::seed_from_u64(0x6107_a3);
    let decoder = decoder_for("Alice");
    for _ in 0..2000 {
        let len = rng.random_range(0..300);
        let mut buf = vec![0u8; len];
        rng.fill(&mut buf[..]);
        let _ = decoder.decode(&buf);
        let _ = decoder.decode_message(&buf);
    }
}

#[test]
fn test_mutated_bodies_never_panic() {
    let mut rng = StdRng::seed_from_u64(42);
    let decoder = DrawStateDecoder::default();
    let base = sample_body();
    for _ in 0..2000 {
        let mut body = base.clone();
        for _ in 0..rng.random_range(1..4) {
            let i = rng.random_range(0..body.len());
            body[i] = rng.random();
        }
        let cut = rng.random_range(0..=body.len());
        let _ = decoder.decode(&body[..cut]);
    }
}
