//! Assembles raw draw-state messages for the client tests.

#![allow(dead_code)]

/// Builder for one tagged draw-state message.
#[derive(Default)]
pub struct TickBuilder {
    ack_frame: i32,
    lighting: u8,
    descriptors: Vec<u8>,
    descriptor_count: u8,
    pictures: Vec<(u16, i16, i16)>,
    mobiles: Vec<u8>,
    mobile_count: u8,
    info: Vec<u8>,
    bubbles: Vec<u8>,
    bubble_count: u8,
}

impl TickBuilder {
    pub fn new(ack_frame: i32) -> Self {
        Self {
            ack_frame,
            ..Default::default()
        }
    }

    pub fn lighting(mut self, flags: u8) -> Self {
        self.lighting = flags;
        self
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

    pub fn info(mut self, chunk: &[u8]) -> Self {
        self.info.extend_from_slice(chunk);
        self.info.push(0);
        self
    }

    /// Adds a bubble with a plain type byte (no language or far fields).
    pub fn bubble(mut self, speaker: u8, kind: u8, text: &[u8]) -> Self {
        self.bubbles.extend_from_slice(&[speaker, kind & 0x3F]);
        self.bubbles.extend_from_slice(text);
        self.bubbles.push(0);
        self.bubble_count += 1;
        self
    }

    pub fn body(&self) -> Vec<u8> {
        let mut b = vec![0];
        b.extend_from_slice(&self.ack_frame.to_be_bytes());
        b.extend_from_slice(&0i32.to_be_bytes());
        b.push(self.descriptor_count);
        b.extend_from_slice(&self.descriptors);
        b.extend_from_slice(&[10, 10, 5, 5, 3, 3, self.lighting]);
        b.push(self.pictures.len() as u8);
        b.extend_from_slice(&pack_pictures(&self.pictures));
        b.push(self.mobile_count);
        b.extend_from_slice(&self.mobiles);
        b.extend_from_slice(&self.info);
        b.push(0);
        b.push(self.bubble_count);
        b.extend_from_slice(&self.bubbles);
        b
    }

    /// Tag 2 followed by the body.
    pub fn message(&self) -> Vec<u8> {
        tagged(2, &self.body())
    }
}

pub fn tagged(tag: u16, body: &[u8]) -> Vec<u8> {
    let mut m = tag.to_be_bytes().to_vec();
    m.extend_from_slice(body);
    m
}

fn pack_pictures(pictures: &[(u16, i16, i16)]) -> Vec<u8> {
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
