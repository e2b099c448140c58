//! Media source: locates the audio/video pair inside an archive
//!
//! The player only needs "given an extension, hand me a byte slice"; the
//! archive layout stays an implementation detail of the packager.

use crate::archive::{Archive, ArchiveError};

/// Audio container extension
pub const AUDIO_EXTENSION: &str = "gbs";

/// Video container extension
pub const VIDEO_EXTENSION: &str = "gbm";

/// Extension-based view over an archive
pub struct MediaSource<'a> {
    archive: Archive<'a>,
}

impl<'a> MediaSource<'a> {
    /// Wrap an already-validated archive
    #[must_use]
    pub fn new(archive: Archive<'a>) -> Self {
        Self { archive }
    }

    /// Validate archive bytes and wrap them
    pub fn from_bytes(data: &'a [u8]) -> Result<Self, ArchiveError> {
        Ok(Self::new(Archive::from_bytes(data)?))
    }

    /// First audio container in the archive
    #[must_use]
    pub fn find_audio(&self) -> Option<(&'a str, &'a [u8])> {
        self.archive.find_by_extension(AUDIO_EXTENSION)
    }

    /// First video container in the archive
    #[must_use]
    pub fn find_video(&self) -> Option<(&'a str, &'a [u8])> {
        self.archive.find_by_extension(VIDEO_EXTENSION)
    }

    /// Number of audio containers
    #[must_use]
    pub fn audio_count(&self) -> usize {
        self.archive.count_by_extension(AUDIO_EXTENSION)
    }

    /// Number of video containers
    #[must_use]
    pub fn video_count(&self) -> usize {
        self.archive.count_by_extension(VIDEO_EXTENSION)
    }

    /// Load a specific file by name
    #[must_use]
    pub fn load(&self, name: &str) -> Option<&'a [u8]> {
        self.archive.get(name)
    }
}
