//! Appended file archive (GBFS)
//!
//! The media pair travels appended to the player image in a flat GBFS
//! archive. The format is a fixed header, a directory of fixed-size
//! entries, then 4-byte-aligned file data.
//!
//! # Layout
//!
//! ```text
//! Header (32 bytes):
//!   0x00: magic "PinEightGBFS\r\n\x1a\n"
//!   0x10: total_len u32 LE
//!   0x14: dir_off u16 LE
//!   0x16: dir_nmemb u16 LE
//!   0x18: reserved (8 bytes)
//!
//! Directory entry (32 bytes):
//!   0x00: name (24 bytes, NUL padded)
//!   0x18: len u32 LE
//!   0x1C: data_offset u32 LE
//! ```

use thiserror::Error;

/// Archive magic
pub const GBFS_MAGIC: &[u8; 16] = b"PinEightGBFS\r\n\x1a\n";

const HEADER_SIZE: usize = 32;
const ENTRY_SIZE: usize = 32;
const NAME_LEN: usize = 24;

/// Errors from archive validation
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveError {
    /// Not enough bytes for the fixed header
    #[error("archive too small for its header")]
    TooSmall,

    /// Magic mismatch
    #[error("bad archive signature")]
    BadMagic,

    /// Directory or file data extends past the archive
    #[error("archive directory out of bounds")]
    BadDirectory,
}

fn read_u16_le(data: &[u8], offset: usize) -> u16 {
    u16::from_le_bytes([data[offset], data[offset + 1]])
}

fn read_u32_le(data: &[u8], offset: usize) -> u32 {
    u32::from_le_bytes([
        data[offset],
        data[offset + 1],
        data[offset + 2],
        data[offset + 3],
    ])
}

/// Case-insensitive `name ends with ".ext"` check
fn has_extension(name: &str, extension: &str) -> bool {
    let Some(dot) = name.rfind('.') else {
        return false;
    };
    name[dot + 1..].eq_ignore_ascii_case(extension)
}

/// Read-only view over an archive
pub struct Archive<'a> {
    data: &'a [u8],
    dir_off: usize,
    count: usize,
}

impl<'a> Archive<'a> {
    /// Validate the header and directory bounds
    pub fn from_bytes(data: &'a [u8]) -> Result<Self, ArchiveError> {
        if data.len() < HEADER_SIZE {
            return Err(ArchiveError::TooSmall);
        }
        if &data[0..16] != GBFS_MAGIC {
            return Err(ArchiveError::BadMagic);
        }

        let dir_off = read_u16_le(data, 0x14) as usize;
        let count = read_u16_le(data, 0x16) as usize;
        if dir_off + count * ENTRY_SIZE > data.len() {
            return Err(ArchiveError::BadDirectory);
        }

        Ok(Self {
            data,
            dir_off,
            count,
        })
    }

    /// Number of directory entries
    #[must_use]
    pub fn len(&self) -> usize {
        self.count
    }

    /// Whether the archive holds no files
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.count == 0
    }

    /// Name and contents of the nth entry
    ///
    /// Returns `None` for an out-of-range index, a non-UTF-8 name, or file
    /// data that runs past the archive.
    #[must_use]
    pub fn get_nth(&self, index: usize) -> Option<(&'a str, &'a [u8])> {
        if index >= self.count {
            return None;
        }
        let entry = self.dir_off + index * ENTRY_SIZE;
        let raw_name = &self.data[entry..entry + NAME_LEN];
        let end = raw_name.iter().position(|&b| b == 0).unwrap_or(NAME_LEN);
        let name = core::str::from_utf8(&raw_name[..end]).ok()?;

        let len = read_u32_le(self.data, entry + 0x18) as usize;
        let offset = read_u32_le(self.data, entry + 0x1C) as usize;
        let bytes = self.data.get(offset..offset + len)?;
        Some((name, bytes))
    }

    /// Look a file up by exact name
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&'a [u8]> {
        (0..self.count)
            .filter_map(|i| self.get_nth(i))
            .find(|(entry_name, _)| *entry_name == name)
            .map(|(_, bytes)| bytes)
    }

    /// First file whose name carries the extension (case-insensitive)
    #[must_use]
    pub fn find_by_extension(&self, extension: &str) -> Option<(&'a str, &'a [u8])> {
        (0..self.count)
            .filter_map(|i| self.get_nth(i))
            .find(|(name, _)| has_extension(name, extension))
    }

    /// How many files carry the extension
    #[must_use]
    pub fn count_by_extension(&self, extension: &str) -> usize {
        (0..self.count)
            .filter_map(|i| self.get_nth(i))
            .filter(|(name, _)| has_extension(name, extension))
            .count()
    }
}

fn align4(value: usize) -> usize {
    (value + 3) & !3
}

/// Builds an archive from named files
#[derive(Default)]
pub struct ArchiveBuilder {
    entries: Vec<(String, Vec<u8>)>,
}

impl ArchiveBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a file; names longer than 24 bytes are truncated
    pub fn add(&mut self, name: &str, data: &[u8]) -> &mut Self {
        self.entries.push((name.to_string(), data.to_vec()));
        self
    }

    /// Serialize the archive
    #[must_use]
    pub fn build(&self) -> Vec<u8> {
        let dir_size = self.entries.len() * ENTRY_SIZE;
        let data_start = align4(HEADER_SIZE + dir_size);

        // Lay file data out first to learn the offsets
        let mut offsets = Vec::with_capacity(self.entries.len());
        let mut cursor = data_start;
        for (_, bytes) in &self.entries {
            offsets.push(cursor);
            cursor = align4(cursor + bytes.len());
        }
        let total = cursor;

        let mut out = vec![0u8; total];
        out[0..16].copy_from_slice(GBFS_MAGIC);
        out[0x10..0x14].copy_from_slice(&(total as u32).to_le_bytes());
        out[0x14..0x16].copy_from_slice(&(HEADER_SIZE as u16).to_le_bytes());
        out[0x16..0x18].copy_from_slice(&(self.entries.len() as u16).to_le_bytes());

        for (i, ((name, bytes), offset)) in self.entries.iter().zip(&offsets).enumerate() {
            let entry = HEADER_SIZE + i * ENTRY_SIZE;
            let name_bytes = name.as_bytes();
            let take = name_bytes.len().min(NAME_LEN);
            out[entry..entry + take].copy_from_slice(&name_bytes[..take]);
            out[entry + 0x18..entry + 0x1C].copy_from_slice(&(bytes.len() as u32).to_le_bytes());
            out[entry + 0x1C..entry + 0x20].copy_from_slice(&(*offset as u32).to_le_bytes());
            out[*offset..*offset + bytes.len()].copy_from_slice(bytes);
        }

        out
    }
}
