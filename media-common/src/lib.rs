//! Shared types and utilities for the GBS/GBM media player
//!
//! This crate provides what the decoders and tools have in common:
//!
//! - [`formats`] - wire-exact container headers (GBS audio)
//! - [`archive`] - the appended file archive holding the media pair
//! - [`source`] - extension-based lookup of the audio/video containers

pub mod archive;
pub mod formats;
pub mod source;

pub use archive::{Archive, ArchiveBuilder, ArchiveError};
pub use formats::gbs::{GBS_HEADER_SIZE, GbsError, GbsHeader};
pub use source::{AUDIO_EXTENSION, MediaSource, VIDEO_EXTENSION};
