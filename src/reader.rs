//! MIDI file reader traits, allows for in memory byte spans to be read or files

use std::{convert::Infallible, path::Path};

use thiserror::Error;

use crate::Chunk;

/// Size of a chunk prefix: 4 bytes of type followed by a 32 bit length
const CHUNK_PREFIX_LEN: usize = 8;

/// Trait that allows certain amount of bytes to be yielded by an iterator
pub trait Yieldable<T> {
    /// Gets up to `n` elements while advancing the iterator. Fewer are returned if the iterator
    /// runs out first.
    fn get(&mut self, n: usize) -> Vec<T>;
}

impl<ITER: Iterator> Yieldable<ITER::Item> for ITER {
    fn get(&mut self, n: usize) -> Vec<ITER::Item> {
        // `n` can come straight from an untrusted length field, so never preallocate it
        self.by_ref().take(n).collect()
    }
}

/// Trait that allows for different types to be translated to a MIDI parseable format
pub trait MidiReadable {
    /// Error type that may be returned from the Midi Sequence
    type Error;
    /// Creates a byte iterator from the type
    fn get_midi_bytes(self) -> Result<impl Iterator<Item = u8>, Self::Error>;
}

/// Wrapper struct to allow passing Vec<u8> to MidiReadable trait
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MidiData(Vec<u8>);

impl From<Vec<u8>> for MidiData {
    fn from(value: Vec<u8>) -> Self {
        Self(value)
    }
}

impl IntoIterator for MidiData {
    type Item = u8;
    type IntoIter = std::vec::IntoIter<u8>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl MidiReadable for MidiData {
    type Error = Infallible;
    fn get_midi_bytes(self) -> Result<impl Iterator<Item = u8>, Self::Error> {
        Ok(self.into_iter())
    }
}

impl<PATH> MidiReadable for PATH
where
    PATH: AsRef<Path>,
{
    type Error = std::io::Error;
    fn get_midi_bytes(self) -> Result<impl Iterator<Item = u8>, Self::Error> {
        Ok(std::fs::read(self)?.into_iter())
    }
}

/// The stream ended before a chunk's prefix or payload was complete
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("Stream ended early: expected {expected} bytes of chunk data, found {found}")]
pub struct TruncatedChunk {
    /// Bytes the chunk claimed
    pub expected: usize,
    /// Bytes actually left in the stream
    pub found: usize,
}

/// A stream of MIDI bytes that can be split into chunks
pub trait MidiStream {
    /// Reads the next chunk prefix and its payload. Returns `None` once the stream is exhausted
    /// on a chunk boundary.
    fn read_chunk_data_pair(&mut self) -> Option<Result<(Chunk, Vec<u8>), TruncatedChunk>>;
}

impl<ITER> MidiStream for ITER
where
    ITER: Iterator<Item = u8>,
{
    fn read_chunk_data_pair(&mut self) -> Option<Result<(Chunk, Vec<u8>), TruncatedChunk>> {
        let prefix = self.get(CHUNK_PREFIX_LEN);
        if prefix.is_empty() {
            return None;
        }

        if prefix.len() < CHUNK_PREFIX_LEN {
            return Some(Err(TruncatedChunk {
                expected: CHUNK_PREFIX_LEN,
                found: prefix.len(),
            }));
        }

        let raw = prefix
            .iter()
            .fold(0u64, |acc, byte| (acc << 8) | *byte as u64);
        let chunk = Chunk::from(raw);

        let data = self.get(chunk.len());
        if data.len() < chunk.len() {
            return Some(Err(TruncatedChunk {
                expected: chunk.len(),
                found: data.len(),
            }));
        }

        Some(Ok((chunk, data)))
    }
}
