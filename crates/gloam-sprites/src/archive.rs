//! The sprite archive: loading, record lookup and cached resolution.
//!
//! # File layout
//!
//! ```text
//! 0   u16   magic 0xFFFF
//! 2   u32   entry count
//! 6   [6]   reserved
//! 12  entry table, 16 bytes each: offset, size, type, id (all u32)
//! ```
//!
//! Entry types are four-character codes. A *reference* record (`PDf5`)
//! names an image record (`Bit2`) and a color record (`Clrs`) and carries
//! the sprite's flags, drawing plane and animation table. Sprite ids used by
//! the draw-state protocol are reference ids.
//!
//! Reference and color records are small and are parsed up front. Image
//! records are decoded on demand by [`SpriteArchive::get`] and cached.

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use gloam_protocol::{ByteCursor, ProtocolError};
use parking_lot::Mutex;
use tracing::{debug, info};

use crate::palette::MAC_PALETTE;
use crate::pixels::decode_indexed;
use crate::surface::Surface;
use crate::{ArchiveError, SpriteError};

// ---------------------------------------------------------------------------
// Format constants
// ---------------------------------------------------------------------------

pub const ARCHIVE_MAGIC: u16 = 0xFFFF;

/// `'PDf5'`: sprite reference record.
pub const TYPE_IDREF: u32 = 0x5044_6635;
/// `'Bit2'`: run-length image record.
pub const TYPE_IMAGE: u32 = 0x4269_7432;
/// `'Clrs'`: color table record.
pub const TYPE_COLOR: u32 = 0x436c_7273;
/// `'Vers'`: archive version record.
pub const TYPE_VERSION: u32 = 0x5665_7273;

const RESERVED_LEN: usize = 6;
const ANIM_SLOTS: usize = 16;

/// Index 0 of the color table is see-through.
pub const FLAG_TRANSPARENT: u32 = 0x8000;
/// Low two bits select a blend level.
pub const BLEND_MASK: u32 = 0x0003;
/// The first image row is a custom-color mapping, not pixels.
pub const FLAG_CUSTOM_COLORS: u32 = 0x2000;

// ---------------------------------------------------------------------------
// Records
// ---------------------------------------------------------------------------

/// A parsed sprite reference record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IdRef {
    pub version: u32,
    pub image_id: u32,
    pub color_id: u32,
    pub checksum: u32,
    pub flags: u32,
    pub unused_flags: u32,
    pub unused_flags2: u32,
    pub lighting_id: i32,
    /// Drawing plane. Negative planes go under mobiles, positive over.
    pub plane: i16,
    pub frame_count: u16,
    pub anim_count: i16,
    /// Frame to show for each animation step. Only the first
    /// `anim_count` entries (at most 16) are meaningful.
    pub anim_table: [i16; ANIM_SLOTS],
}

/// Location of an image record.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ImageRecord {
    pub offset: u32,
    pub size: u32,
}

/// A color table, preloaded at archive load.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColorRecord {
    pub offset: u32,
    pub size: u32,
    /// Palette index for each color-table slot.
    pub bytes: Vec<u8>,
}

/// Base alpha and index-0 transparency for a reference's flags.
///
/// | flags & (0x8000 \| 0x3) | alpha | index 0 transparent |
/// |---|---|---|
/// | 0 | 0xFF | no |
/// | 0x8000 | 0xFF | yes |
/// | 1, 2, 3 | 0xBF, 0x7F, 0x3F | no |
/// | 0x8000 \| 1, 2, 3 | 0xBF, 0x7F, 0x3F | yes |
pub fn alpha_for_flags(flags: u32) -> (u8, bool) {
    let transparent = flags & FLAG_TRANSPARENT != 0;
    let alpha = match flags & BLEND_MASK {
        1 => 0xBF,
        2 => 0x7F,
        3 => 0x3F,
        _ => 0xFF,
    };
    (alpha, transparent)
}

/// Rewrites color-table slots for a customized sprite.
///
/// `mapping[i]` names the slot that customizable color `i` lives in and
/// `custom[i]` is the palette index the server wants there. Pairs beyond
/// the shorter list, and slots outside the table, are ignored.
pub fn apply_custom_colors(table: &mut [u8], mapping: &[u8], custom: &[u8]) {
    for (&slot, &color) in mapping.iter().zip(custom) {
        if let Some(entry) = table.get_mut(usize::from(slot)) {
            *entry = color;
        }
    }
}

// ---------------------------------------------------------------------------
// SpriteArchive
// ---------------------------------------------------------------------------

type CacheKey = (u32, Vec<u8>);

/// A loaded sprite archive.
///
/// Everything except the decode cache is immutable after load, so an
/// archive is shared as `Arc<SpriteArchive>` and queried from any thread.
pub struct SpriteArchive {
    data: Vec<u8>,
    idrefs: HashMap<u32, IdRef>,
    images: HashMap<u32, ImageRecord>,
    colors: HashMap<u32, ColorRecord>,
    version: Option<u32>,
    /// Resolved sprites by `(id, custom colors)`. `None` caches a failure.
    cache: Mutex<HashMap<CacheKey, Option<Arc<Surface>>>>,
}

impl SpriteArchive {
    /// Reads and parses an archive file.
    ///
    /// # Errors
    /// [`ArchiveError::Io`] if the file can't be read; otherwise see
    /// [`from_bytes`](Self::from_bytes).
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, ArchiveError> {
        let path = path.as_ref();
        let data = tokio::fs::read(path).await?;
        let archive = Self::from_bytes(data)?;
        info!(
            path = %path.display(),
            sprites = archive.idrefs.len(),
            images = archive.images.len(),
            colors = archive.colors.len(),
            version = ?archive.version,
            "sprite archive loaded"
        );
        Ok(archive)
    }

    /// Parses an archive already in memory.
    ///
    /// # Errors
    /// [`ArchiveError::BadMagic`] or [`ArchiveError::Truncated`] if the
    /// header, entry table, a reference record, a color record or the
    /// version record runs past the end of the data.
    pub fn from_bytes(data: Vec<u8>) -> Result<Self, ArchiveError> {
        let mut idref_locs = Vec::new();
        let mut color_locs = Vec::new();
        let mut version_loc = None;
        let mut images = HashMap::new();

        {
            let mut c = ByteCursor::new(&data);
            let magic = c.u16("magic").map_err(truncated("header"))?;
            if magic != ARCHIVE_MAGIC {
                return Err(ArchiveError::BadMagic(magic));
            }
            let count = c.u32("entry count").map_err(truncated("header"))?;
            c.skip(RESERVED_LEN, "reserved").map_err(truncated("header"))?;

            for _ in 0..count {
                let offset = c.u32("entry offset").map_err(truncated("entry table"))?;
                let size = c.u32("entry size").map_err(truncated("entry table"))?;
                let kind = c.u32("entry type").map_err(truncated("entry table"))?;
                let id = c.u32("entry id").map_err(truncated("entry table"))?;
                match kind {
                    TYPE_IDREF => idref_locs.push((id, offset)),
                    TYPE_IMAGE => {
                        images.insert(id, ImageRecord { offset, size });
                    }
                    TYPE_COLOR => color_locs.push((id, offset, size)),
                    TYPE_VERSION if id == 0 => version_loc = Some(offset),
                    _ => {}
                }
            }
        }

        let mut idrefs = HashMap::with_capacity(idref_locs.len());
        for (id, offset) in idref_locs {
            let idref = parse_idref(&data, offset).map_err(truncated("reference record"))?;
            idrefs.insert(id, idref);
        }

        let mut colors = HashMap::with_capacity(color_locs.len());
        for (id, offset, size) in color_locs {
            let mut c = ByteCursor::new(&data);
            c.seek(offset as usize, "color record")
                .map_err(truncated("color record"))?;
            let bytes = c
                .take(size as usize, "color table")
                .map_err(truncated("color record"))?
                .to_vec();
            colors.insert(id, ColorRecord {
                offset,
                size,
                bytes,
            });
        }

        let version = match version_loc {
            Some(offset) => {
                let mut c = ByteCursor::new(&data);
                c.seek(offset as usize, "version record")
                    .map_err(truncated("version record"))?;
                let v = c.u32("version").map_err(truncated("version record"))?;
                Some(if v <= 0xFF { v << 8 } else { v })
            }
            None => None,
        };

        Ok(Self {
            data,
            idrefs,
            images,
            colors,
            version,
            cache: Mutex::new(HashMap::new()),
        })
    }

    /// Archive version, if the archive carries a version record.
    ///
    /// Old archives store a bare major number; those are shifted into the
    /// same scale as newer ones (`0x12` reads as `0x1200`).
    pub fn version(&self) -> Option<u32> {
        self.version
    }

    /// Number of sprite reference records.
    pub fn len(&self) -> usize {
        self.idrefs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.idrefs.is_empty()
    }

    pub fn idref(&self, id: u32) -> Option<&IdRef> {
        self.idrefs.get(&id)
    }

    pub fn image_record(&self, id: u32) -> Option<&ImageRecord> {
        self.images.get(&id)
    }

    pub fn color_record(&self, id: u32) -> Option<&ColorRecord> {
        self.colors.get(&id)
    }

    /// Number of entries in the decode cache, misses included.
    pub fn cached_len(&self) -> usize {
        self.cache.lock().len()
    }

    // -----------------------------------------------------------------------
    // Resolution
    // -----------------------------------------------------------------------

    /// Resolves sprite `id` with optional custom colors, using the cache.
    ///
    /// Returns `None` for sprites that are missing or fail to decode. The
    /// failure is logged at debug level the first time and cached, so later
    /// lookups are as cheap as hits.
    ///
    /// The cache lock is not held while decoding. Two threads that miss on
    /// the same key may both decode; whichever inserts first wins and both
    /// get that result.
    pub fn get(&self, id: u32, colors: &[u8]) -> Option<Arc<Surface>> {
        let key = (id, colors.to_vec());
        if let Some(hit) = self.cache.lock().get(&key) {
            return hit.clone();
        }

        let resolved = match self.resolve(id, colors) {
            Ok(surface) => Some(Arc::new(surface)),
            Err(e) => {
                debug!(sprite = id, error = %e, "sprite unresolved");
                None
            }
        };

        self.cache.lock().entry(key).or_insert(resolved).clone()
    }

    /// Decodes sprite `id` without touching the cache.
    ///
    /// # Errors
    /// Any [`SpriteError`]: missing records, a truncated or malformed image,
    /// or a pixel whose color index is outside the color table.
    pub fn resolve(&self, id: u32, custom: &[u8]) -> Result<Surface, SpriteError> {
        let idref = self.idrefs.get(&id).ok_or(SpriteError::MissingRef(id))?;
        let image = self
            .images
            .get(&idref.image_id)
            .ok_or(SpriteError::MissingImage {
                id,
                image_id: idref.image_id,
            })?;
        let color = self
            .colors
            .get(&idref.color_id)
            .ok_or(SpriteError::MissingColors {
                id,
                color_id: idref.color_id,
            })?;

        let mut c = ByteCursor::new(&self.data);
        let header = read_image_header(&mut c, image.offset).map_err(|_| SpriteError::Truncated)?;
        let (width, mut height) = (header.width, header.height);

        let indices = decode_indexed(c.rest(), width, height, header.value_bits, header.block_bits)?;

        // Custom-color row
        let mut table = color.bytes.clone();
        let mut pixels = indices.as_slice();
        if idref.flags & FLAG_CUSTOM_COLORS != 0 && pixels.len() >= width && height > 0 {
            let (mapping, rest) = pixels.split_at(width);
            pixels = rest;
            height -= 1;
            if !custom.is_empty() {
                apply_custom_colors(&mut table, mapping, custom);
            }
        }

        let (alpha, transparent) = alpha_for_flags(idref.flags);
        let mut rgba = Vec::with_capacity(pixels.len() * Surface::BPP);
        for &value in pixels {
            let index = usize::from(value);
            let &entry = table.get(index).ok_or(SpriteError::ColorIndex {
                index,
                len: table.len(),
            })?;
            let a = if entry == 0 && transparent { 0 } else { alpha };
            let [r, g, b] = MAC_PALETTE[usize::from(entry)];
            rgba.extend_from_slice(&[premultiply(r, a), premultiply(g, a), premultiply(b, a), a]);
        }

        Surface::from_rgba(width, height, rgba).ok_or(SpriteError::Truncated)
    }

    // -----------------------------------------------------------------------
    // Derived queries
    // -----------------------------------------------------------------------

    /// Frames stacked in sprite `id`'s sheet. Unknown sprites have one.
    pub fn frame_count(&self, id: u32) -> usize {
        match self.idrefs.get(&id) {
            Some(r) if r.frame_count > 0 => usize::from(r.frame_count),
            _ => 1,
        }
    }

    /// Frame to draw for sprite `id` at global animation step `counter`.
    ///
    /// Sprites with an animation table step through it; others cycle
    /// through their frames in order. Table entries that don't name a real
    /// frame show frame 0.
    pub fn frame_index(&self, id: u32, counter: usize) -> usize {
        let Some(r) = self.idrefs.get(&id) else {
            return 0;
        };
        let frames = usize::from(r.frame_count);
        if frames <= 1 {
            return 0;
        }
        if r.anim_count > 0 {
            let step = counter % r.anim_count as usize;
            return match r.anim_table.get(step) {
                Some(&f) if f >= 0 && (f as usize) < frames => f as usize,
                _ => 0,
            };
        }
        counter % frames
    }

    /// Drawing plane of sprite `id`. Unknown sprites are on plane 0.
    pub fn plane(&self, id: u32) -> i16 {
        self.idrefs.get(&id).map_or(0, |r| r.plane)
    }
}

impl std::fmt::Debug for SpriteArchive {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SpriteArchive")
            .field("bytes", &self.data.len())
            .field("idrefs", &self.idrefs.len())
            .field("images", &self.images.len())
            .field("colors", &self.colors.len())
            .field("version", &self.version)
            .finish()
    }
}

fn premultiply(channel: u8, alpha: u8) -> u8 {
    (u16::from(channel) * u16::from(alpha) / 255) as u8
}

fn truncated(section: &'static str) -> impl Fn(ProtocolError) -> ArchiveError {
    move |source| ArchiveError::Truncated { section, source }
}

struct ImageHeader {
    width: usize,
    height: usize,
    value_bits: u8,
    block_bits: u8,
}

/// Reads the fixed image header, leaving `c` at the start of the bit stream.
fn read_image_header(c: &mut ByteCursor<'_>, offset: u32) -> Result<ImageHeader, ProtocolError> {
    c.seek(offset as usize, "image record")?;
    let height = usize::from(c.u16("image height")?);
    let width = usize::from(c.u16("image width")?);
    c.skip(4, "image padding")?;
    Ok(ImageHeader {
        width,
        height,
        value_bits: c.u8("value bits")?,
        block_bits: c.u8("block length bits")?,
    })
}

fn parse_idref(data: &[u8], offset: u32) -> Result<IdRef, ProtocolError> {
    let mut c = ByteCursor::new(data);
    c.seek(offset as usize, "reference record")?;
    let mut r = IdRef {
        version: c.u32("version")?,
        image_id: c.u32("image id")?,
        color_id: c.u32("color id")?,
        checksum: c.u32("checksum")?,
        flags: c.u32("flags")?,
        unused_flags: c.u32("unused flags")?,
        unused_flags2: c.u32("unused flags 2")?,
        lighting_id: c.i32("lighting id")?,
        plane: c.i16("plane")?,
        frame_count: c.u16("frame count")?,
        anim_count: c.i16("anim count")?,
        anim_table: [0; ANIM_SLOTS],
    };
    let declared = (r.anim_count.max(0) as usize).min(ANIM_SLOTS);
    for slot in r.anim_table.iter_mut().take(declared) {
        *slot = c.i16("anim table")?;
    }
    c.skip((ANIM_SLOTS - declared) * 2, "anim table")?;
    Ok(r)
}
