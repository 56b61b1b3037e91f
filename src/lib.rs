//! # midi-range
//!
//! Reports the lowest and highest note played on every channel of a Standard MIDI File, named
//! using the `MIDI note 60 = C4` convention.
//!
//! ## Overview
//!
//! The crate is split in two halves. The first half is a small MIDI file reader: MIDI files are
//! structured as a series of chunks, each with a 4-character ASCII type identifier and a 32-bit
//! length, and the reader turns those chunks into a [`Midi`] document made of a header and a list
//! of tracks. The second half is the range analyzer, which walks every track event once and keeps
//! the extremes of each channel's sounding notes.
//!
//! - **Minimal dependencies**: the reader only needs `thiserror`, with opt-in serde support.
//! - **Streaming-friendly**: chunks can be read from any implementor of [`reader::MidiStream`],
//!   which covers every `u8` iterator.
//!
//! ## Example Usage
//!
//! ```rust
//! use midi_range::{
//!     range::{analyze, ScanMode},
//!     reader::MidiData,
//!     RawMidi,
//! };
//!
//! // A format 0 file with one track holding a single C4 note-on
//! let bytes = vec![
//!     b'M', b'T', b'h', b'd', 0, 0, 0, 6, 0, 0, 0, 1, 0, 96,
//!     b'M', b'T', b'r', b'k', 0, 0, 0, 8,
//!     0x00, 0x90, 60, 100,
//!     0x00, 0xFF, 0x2F, 0x00,
//! ];
//!
//! let midi = RawMidi::try_from_midi_stream(MidiData::from(bytes).into_iter())
//!     .and_then(RawMidi::check_into_midi)
//!     .expect("Parse in memory MIDI");
//!
//! let report = analyze(&midi, &ScanMode::Discover);
//! let range = report.get(0).expect("Channel 0 has notes");
//! assert_eq!(range.lowest.name, "C4");
//! ```
//!
//! ## Library Structure
//!
//! - **[`chunk`]**: Parsed chunk types, the header chunk and the track chunk with its events.
//! - **[`reader`]**: Traits for streaming MIDI bytes and splitting them into chunks.
//! - **[`note`]**: Note number to note name conversion.
//! - **[`range`]**: The per channel range scan.
//! - **[`report`]**: Text rendering of a range scan.

use std::path::Path;

use chunk::{header::HeaderChunk, track::TrackChunk, ChunkParseError, ParsedChunk};
use reader::{MidiReadable, MidiStream, TruncatedChunk};
use thiserror::Error;
use tracing::{debug, warn};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

pub mod chunk;
pub mod note;
pub mod range;
pub mod reader;
pub mod report;

/// Represents a raw MIDI Chunk.
/// A MIDI Chunk consists of a 4-character ASCII type identifier and a 32-bit unsigned integer
/// specifying the length of its data.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Chunk {
    /// 4 character ASCII chunk type
    pub chunk_type: [char; 4],
    /// Length of the data that follows
    length: u32,
}

impl Chunk {
    /// Gets the length of the chunk as a usize
    pub fn len(&self) -> usize {
        self.length as usize
    }

    /// Returns if the chunk has no attributed data
    pub fn is_empty(&self) -> bool {
        self.length == 0
    }
}

impl From<u64> for Chunk {
    fn from(value: u64) -> Self {
        let [a, b, c, d, ..] = value.to_be_bytes();

        Self {
            chunk_type: [a as char, b as char, c as char, d as char],
            length: value as u32,
        }
    }
}

/// Everything that can go wrong while turning a byte source into a [`Midi`] document
#[derive(Debug, Error)]
pub enum LoadError {
    /// The byte source could not be read
    #[error("Failed to read MIDI data: {0}")]
    Io(#[from] std::io::Error),
    /// The stream ended in the middle of a chunk
    #[error(transparent)]
    TruncatedChunk(#[from] TruncatedChunk),
    /// A chunk's payload could not be parsed
    #[error("Failed to parse chunk: {0}")]
    Chunk(#[from] ChunkParseError),
    /// The first chunk was not an `MThd` header
    #[error("MIDI data does not begin with a header chunk")]
    MissingHeader,
    /// A second `MThd` header appeared after the first one
    #[error("Found more than one header chunk")]
    UnexpectedHeader,
}

/// Every known chunk read from a MIDI stream, in file order and not yet checked for structure
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RawMidi {
    /// Parsed chunks, unknown chunk types already skipped
    chunks: Vec<ParsedChunk>,
}

impl RawMidi {
    /// Reads and parses chunks until the stream runs dry. Chunk types other than `MThd` and
    /// `MTrk` are skipped, as the file format requires of readers.
    pub fn try_from_midi_stream<STREAM>(mut stream: STREAM) -> Result<Self, LoadError>
    where
        STREAM: Iterator<Item = u8>,
    {
        let mut chunks = vec![];

        while let Some(pair) = stream.read_chunk_data_pair() {
            let (chunk, data) = pair?;

            match ParsedChunk::try_from((chunk, data)) {
                Ok(parsed) => chunks.push(parsed),
                Err(ChunkParseError::UnknownType(tag)) => {
                    debug!(chunk_type = %tag.iter().collect::<String>(), "skipping unknown chunk");
                }
                Err(e) => return Err(e.into()),
            }
        }

        Ok(Self { chunks })
    }

    /// Checks that the chunks form a MIDI file: exactly one header, first, followed by tracks
    pub fn check_into_midi(self) -> Result<Midi, LoadError> {
        let mut chunks = self.chunks.into_iter();

        let header = match chunks.next() {
            Some(ParsedChunk::Header(header)) => header,
            _ => return Err(LoadError::MissingHeader),
        };

        let mut tracks = vec![];
        for chunk in chunks {
            match chunk {
                ParsedChunk::Header(_) => return Err(LoadError::UnexpectedHeader),
                ParsedChunk::Track(track) => tracks.push(track),
            }
        }

        if tracks.len() != header.ntrks() as usize {
            warn!(
                declared = header.ntrks(),
                found = tracks.len(),
                "header track count does not match the number of track chunks"
            );
        }

        Ok(Midi { header, tracks })
    }
}

/// A structurally valid MIDI document: one header and its tracks
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Midi {
    /// The file's header chunk
    header: HeaderChunk,
    /// Every track chunk in file order
    tracks: Vec<TrackChunk>,
}

impl Midi {
    /// Builds a document from an already parsed header and tracks
    pub fn new(header: HeaderChunk, tracks: Vec<TrackChunk>) -> Self {
        Self { header, tracks }
    }

    /// The file's header chunk
    pub fn header(&self) -> &HeaderChunk {
        &self.header
    }

    /// Every track in file order
    pub fn tracks(&self) -> &[TrackChunk] {
        &self.tracks
    }
}

/// Reads and parses the MIDI file at `path`
pub fn load_midi<PATH: AsRef<Path>>(path: PATH) -> Result<Midi, LoadError> {
    let path = path.as_ref();
    debug!(path = %path.display(), "loading MIDI file");

    let bytes = path.get_midi_bytes()?;
    RawMidi::try_from_midi_stream(bytes)?.check_into_midi()
}
