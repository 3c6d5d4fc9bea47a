//! Text decoding for the info-line and bubble sections.
//!
//! Server text is Mac Roman. Lines may carry inline tags: a `0xC2` byte
//! followed by a two-character code (`th`, `in`, `pn`, ...). A line that
//! *starts* with a tag is a tagged line; tags inside ordinary text are noise
//! and get stripped.

use crate::types::{InfoLine, NightCommand};

/// Byte that introduces an inline tag.
pub const TAG_BYTE: u8 = 0xC2;

/// Mac Roman code points 0x80..=0xFF.
const MAC_ROMAN_HIGH: [char; 128] = [
    'Ä', 'Å', 'Ç', 'É', 'Ñ', 'Ö', 'Ü', 'á', 'à', 'â', 'ä', 'ã', 'å', 'ç', 'é', 'è', //
    'ê', 'ë', 'í', 'ì', 'î', 'ï', 'ñ', 'ó', 'ò', 'ô', 'ö', 'õ', 'ú', 'ù', 'û', 'ü', //
    '†', '°', '¢', '£', '§', '•', '¶', 'ß', '®', '©', '™', '´', '¨', '≠', 'Æ', 'Ø', //
    '∞', '±', '≤', '≥', '¥', 'µ', '∂', '∑', '∏', 'π', '∫', 'ª', 'º', 'Ω', 'æ', 'ø', //
    '¿', '¡', '¬', '√', 'ƒ', '≈', '∆', '«', '»', '…', '\u{A0}', 'À', 'Ã', 'Õ', 'Œ', 'œ', //
    '–', '—', '“', '”', '‘', '’', '÷', '◊', 'ÿ', 'Ÿ', '⁄', '€', '‹', '›', 'ﬁ', 'ﬂ', //
    '‡', '·', '‚', '„', '‰', 'Â', 'Ê', 'Á', 'Ë', 'È', 'Í', 'Î', 'Ï', 'Ì', 'Ó', 'Ô', //
    '\u{F8FF}', 'Ò', 'Ú', 'Û', 'Ù', 'ı', 'ˆ', '˜', '¯', '˘', '˙', '˚', '¸', '˝', '˛', 'ˇ',
];

/// Decodes Mac Roman bytes into a `String`.
pub fn decode_mac_roman(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|&b| {
            if b < 0x80 {
                char::from(b)
            } else {
                MAC_ROMAN_HIGH[usize::from(b - 0x80)]
            }
        })
        .collect()
}

/// Removes inline tags, control bytes and high-bit bytes.
///
/// A tag byte too close to the end to carry its two-character code ends
/// the text.
pub fn strip_tags(bytes: &[u8]) -> Vec<u8> {
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        let c = bytes[i];
        if c == TAG_BYTE {
            if i + 2 < bytes.len() {
                i += 3;
                continue;
            }
            break;
        }
        if (0x20..0x80).contains(&c) {
            out.push(c);
        }
        i += 1;
    }
    out
}

/// Parses `/nt <level> /sa <azimuth> /cl <0|1>` at the start of `s`.
pub fn parse_night_command(s: &str) -> Option<NightCommand> {
    let rest = s.strip_prefix("/nt ")?;
    let (level, rest) = split_while(rest, |c| c.is_ascii_digit())?;
    let rest = rest.strip_prefix(" /sa ")?;
    let (azimuth, rest) = split_while(rest, |c| c.is_ascii_digit() || c == '-')?;
    let rest = rest.strip_prefix(" /cl ")?;
    let cloudy = match rest.chars().next()? {
        '0' => false,
        '1' => true,
        _ => return None,
    };
    Some(NightCommand {
        level: level.parse().unwrap_or(0),
        azimuth: azimuth.parse().unwrap_or(0),
        cloudy,
    })
}

/// Splits off the longest non-empty prefix whose chars satisfy `pred`.
fn split_while(s: &str, pred: impl Fn(char) -> bool) -> Option<(&str, &str)> {
    let end = s.find(|c: char| !pred(c)).unwrap_or(s.len());
    if end == 0 {
        return None;
    }
    Some(s.split_at(end))
}

/// Decodes a line that starts with a tag byte.
///
/// Returns `None` when the line is too short to carry a tag code.
pub fn decode_tagged(line: &[u8]) -> Option<InfoLine> {
    if line.len() < 3 || line[0] != TAG_BYTE {
        return None;
    }
    let tag = decode_mac_roman(&line[1..3]);
    let mut body = &line[3..];
    if let Some(end) = body.iter().position(|&b| b == 0) {
        body = &body[..end];
    }
    let text = decode_mac_roman(body).trim().to_string();

    let label = match tag.as_str() {
        "th" => Some("think"),
        "in" => Some("info"),
        "sh" => Some("share"),
        _ => None,
    };
    let text = match label {
        Some(label) if !text.is_empty() => Some(format!("{label}: {text}")),
        _ => None,
    };
    Some(InfoLine::Tagged { tag, text })
}

/// Splits one NUL-terminated info chunk into lines and classifies each.
///
/// Lines are separated by `\r`. Empty lines and unrecognised slash
/// commands are dropped.
pub fn parse_info_chunk(chunk: &[u8], out: &mut Vec<InfoLine>) {
    for line in chunk.split(|&b| b == b'\r') {
        if line.is_empty() {
            continue;
        }
        if line[0] == TAG_BYTE {
            out.extend(decode_tagged(line));
            continue;
        }
        let s = decode_mac_roman(&strip_tags(line));
        let s = s.trim();
        if s.is_empty() {
            continue;
        }
        if let Some(night) = parse_night_command(s) {
            out.push(InfoLine::Night(night));
            continue;
        }
        if s.starts_with('/') {
            continue;
        }
        out.push(InfoLine::Text(s.to_string()));
    }
}

/// Cleans a bubble payload into a single line of text.
///
/// Night commands embedded in the payload are returned separately rather
/// than shown.
pub fn clean_bubble_text(payload: &[u8]) -> (String, Vec<NightCommand>) {
    let mut text = String::new();
    let mut nights = Vec::new();
    for piece in payload.split(|&b| b == b'\r') {
        let s = decode_mac_roman(&strip_tags(piece));
        let s = s.trim();
        if s.is_empty() {
            continue;
        }
        if let Some(night) = parse_night_command(s) {
            nights.push(night);
            continue;
        }
        if !text.is_empty() {
            text.push(' ');
        }
        text.push_str(s);
    }
    (text, nights)
}
