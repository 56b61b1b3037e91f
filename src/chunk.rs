//! Chunk Definitions for parsed types and type headers

use header::{HeaderChunk, InvalidFormat};
use thiserror::Error;
use track::TrackChunk;
use tracing::debug;

use crate::Chunk;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

pub mod header;
pub mod track;

/// Creates a chunk type identifier
macro_rules! chunk_type {
    ($const_name:ident, $a:literal, $b:literal, $c:literal, $d:literal) => {
        /// MIDI chunk type
        pub const $const_name: [char; 4] = [$a, $b, $c, $d];
    };
}

chunk_type!(HEADER_CHUNK, 'M', 'T', 'h', 'd');
chunk_type!(TRACK_DATA_CHUNK, 'M', 'T', 'r', 'k');

/// Bytes of header data this reader understands. Longer headers are allowed, the rest is ignored.
const HEADER_DATA_LEN: usize = 6;

/// Represents a parsed MIDI Chunk with its associated data.
/// A parsed chunk is classified based on its type, such as header or track.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ParsedChunk {
    /// A header chunk
    Header(HeaderChunk),
    /// A track chunk,
    Track(TrackChunk),
}

/// Error type for attempting to parse from a raw chunk to a parsed one
#[derive(Debug, Error)]
pub enum ChunkParseError {
    /// Invalid format in parsing a header
    #[error("Invalid Format Specified")]
    InvalidFormat(#[from] InvalidFormat),
    /// Header chunk is too short to hold format, track count and division
    #[error("Header chunk is {0} bytes long, expected at least 6")]
    InvalidHeaderLength(usize),
    /// Type tag is not registered
    #[error("Unknown Chunk Type {0:?}")]
    UnknownType([char; 4]),
    /// Error parsing track
    #[error("Track parsing error: {0}")]
    TrackParseError(#[from] track::TrackError),
}

impl TryFrom<(Chunk, Vec<u8>)> for ParsedChunk {
    type Error = ChunkParseError;
    fn try_from(value: (Chunk, Vec<u8>)) -> Result<Self, Self::Error> {
        let (chunk, data) = value;

        match chunk.chunk_type {
            HEADER_CHUNK => {
                if data.len() < HEADER_DATA_LEN {
                    return Err(ChunkParseError::InvalidHeaderLength(data.len()));
                }

                let format = u16::from_be_bytes([data[0], data[1]]);
                let ntrks = u16::from_be_bytes([data[2], data[3]]);
                let division = u16::from_be_bytes([data[4], data[5]]);
                let parsed = HeaderChunk::try_from((format, ntrks, division))?;

                debug!(?parsed, "parsed header chunk");
                Ok(ParsedChunk::Header(parsed))
            }

            TRACK_DATA_CHUNK => {
                let parsed = TrackChunk::try_from(data)?;

                debug!(events = parsed.len(), "parsed track chunk");
                Ok(ParsedChunk::Track(parsed))
            }

            other => Err(ChunkParseError::UnknownType(other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{ChunkParseError, ParsedChunk, HEADER_CHUNK, TRACK_DATA_CHUNK};
    use crate::{chunk::header::Division, Chunk};

    fn chunk(chunk_type: [char; 4], data: &[u8]) -> (Chunk, Vec<u8>) {
        let tag = u32::from_be_bytes(chunk_type.map(|c| c as u8));
        let raw = ((tag as u64) << 32) | data.len() as u64;

        (Chunk::from(raw), data.to_vec())
    }

    #[test]
    fn header_chunk_parses() {
        let parsed = ParsedChunk::try_from(chunk(HEADER_CHUNK, &[0, 0, 0, 1, 0x01, 0x80]))
            .expect("Parse header chunk");

        match parsed {
            ParsedChunk::Header(header) => {
                assert_eq!(header.ntrks(), 1);
                assert_eq!(header.division(), Division::Metrical(384));
            }
            other => panic!("Expected header, got {other:?}"),
        }
    }

    #[test]
    fn short_header_is_rejected() {
        let parsed = ParsedChunk::try_from(chunk(HEADER_CHUNK, &[0, 0, 0, 1]));

        assert!(matches!(
            parsed,
            Err(ChunkParseError::InvalidHeaderLength(4))
        ));
    }

    #[test]
    fn header_with_unknown_format_is_rejected() {
        let parsed = ParsedChunk::try_from(chunk(HEADER_CHUNK, &[0, 7, 0, 1, 0, 96]));

        assert!(matches!(parsed, Err(ChunkParseError::InvalidFormat(_))));
    }

    #[test]
    fn empty_track_chunk_parses() {
        let parsed =
            ParsedChunk::try_from(chunk(TRACK_DATA_CHUNK, &[])).expect("Parse empty track");

        assert!(matches!(parsed, ParsedChunk::Track(track) if track.is_empty()));
    }

    #[test]
    fn unknown_chunk_reports_its_tag() {
        let parsed = ParsedChunk::try_from(chunk(['J', 'U', 'N', 'K'], &[1, 2, 3]));

        assert!(matches!(
            parsed,
            Err(ChunkParseError::UnknownType(['J', 'U', 'N', 'K']))
        ));
    }
}
