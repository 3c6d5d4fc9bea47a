//! Builds draw-state bodies byte by byte for the integration tests.

#![allow(dead_code)]

/// Packs `(id, h, v)` triples into the 14/11/11-bit picture layout.
pub fn pack_pictures(pictures: &[(u16, i16, i16)]) -> Vec<u8> {
    let mut bits: Vec<bool> = Vec::new();
    let mut push = |value: u32, width: u32| {
        for i in (0..width).rev() {
            bits.push((value >> i) & 1 == 1);
        }
    };
    for &(id, h, v) in pictures {
        push(u32::from(id) & 0x3FFF, 14);
        push((h as u32) & 0x7FF, 11);
        push((v as u32) & 0x7FF, 11);
    }
    bits.chunks(8)
        .map(|chunk| {
            chunk
                .iter()
                .enumerate()
                .fold(0u8, |acc, (i, &b)| acc | (u8::from(b) << (7 - i)))
        })
        .collect()
}

#[derive(Default)]
pub struct BodyBuilder {
    pub ack_frame: i32,
    descriptors: Vec<u8>,
    descriptor_count: u8,
    pub vitals: [u8; 7],
    repeat: Option<u8>,
    pictures: Vec<(u16, i16, i16)>,
    mobiles: Vec<u8>,
    mobile_count: u8,
    info: Vec<u8>,
    bubbles: Vec<u8>,
    bubble_count: u8,
}

impl BodyBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn descriptor(mut self, index: u8, sprite: u16, name: &str, colors: &[u8]) -> Self {
        self.descriptors.extend_from_slice(&[index, 0]);
        self.descriptors.extend_from_slice(&sprite.to_be_bytes());
        self.descriptors.extend_from_slice(name.as_bytes());
        self.descriptors.push(0);
        self.descriptors.push(colors.len() as u8);
        self.descriptors.extend_from_slice(colors);
        self.descriptor_count += 1;
        self
    }

    pub fn repeat(mut self, repeat: u8) -> Self {
        self.repeat = Some(repeat);
        self
    }

    pub fn picture(mut self, id: u16, h: i16, v: i16) -> Self {
        self.pictures.push((id, h, v));
        self
    }

    pub fn mobile(mut self, index: u8, pose: u8, h: i16, v: i16) -> Self {
        self.mobiles.extend_from_slice(&[index, pose]);
        self.mobiles.extend_from_slice(&h.to_be_bytes());
        self.mobiles.extend_from_slice(&v.to_be_bytes());
        self.mobiles.push(0);
        self.mobile_count += 1;
        self
    }

    /// Adds one NUL-terminated info chunk.
    pub fn info(mut self, chunk: &[u8]) -> Self {
        self.info.extend_from_slice(chunk);
        self.info.push(0);
        self
    }

    pub fn bubble(mut self, speaker: u8, kind: u8, text: &[u8]) -> Self {
        self.bubbles.extend_from_slice(&[speaker, kind]);
        if kind & 0x40 != 0 {
            self.bubbles.push(3);
        }
        if kind & 0x80 != 0 {
            self.bubbles.extend_from_slice(&(-40i16).to_be_bytes());
            self.bubbles.extend_from_slice(&12i16.to_be_bytes());
        }
        self.bubbles.extend_from_slice(text);
        self.bubbles.push(0);
        self.bubble_count += 1;
        self
    }

    pub fn build(&self) -> Vec<u8> {
        let mut b = vec![1];
        b.extend_from_slice(&self.ack_frame.to_be_bytes());
        b.extend_from_slice(&0i32.to_be_bytes());
        b.push(self.descriptor_count);
        b.extend_from_slice(&self.descriptors);
        b.extend_from_slice(&self.vitals);
        match self.repeat {
            Some(repeat) => b.extend_from_slice(&[255, repeat, self.pictures.len() as u8]),
            None => b.push(self.pictures.len() as u8),
        }
        b.extend_from_slice(&pack_pictures(&self.pictures));
        b.push(self.mobile_count);
        b.extend_from_slice(&self.mobiles);
        b.extend_from_slice(&self.info);
        b.push(0);
        b.push(self.bubble_count);
        b.extend_from_slice(&self.bubbles);
        b
    }

    /// Full message: tag 2 followed by the body.
    pub fn build_message(&self) -> Vec<u8> {
        let mut m = 2u16.to_be_bytes().to_vec();
        m.extend_from_slice(&self.build());
        m
    }
}
