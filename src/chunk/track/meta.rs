//! Meta Event Structs and Parsing

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::{event::IteratorWrapper, MTrkEvent, TrackError};
use crate::reader::Yieldable;

/// Tag of the end of track meta event
const END_OF_TRACK: u8 = 0x2F;

/// A meta level event. Only text and end of track events are decoded, everything else is kept
/// as its raw tag and payload
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum MetaEvent {
    /// Any of the text events, tags 0x01 through 0x07
    Text(TextKind, String),
    /// End of Track Identifier, tag 0x2F
    EndOfTrack,
    /// Every other meta event, by tag
    Other(u8, Vec<u8>),
}

/// Which text meta event a string came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum TextKind {
    /// Text metadata, tag 0x01
    Text,
    /// Copyright, tag 0x02
    Copyright,
    /// Track name, tag 0x03
    TrackName,
    /// Instrument name, tag 0x04
    InstrumentName,
    /// Lyric, tag 0x05
    Lyric,
    /// Marker, tag 0x06
    Marker,
    /// Cue Point, tag 0x07
    CuePoint,
}

impl TextKind {
    /// Maps a meta tag to its text kind
    fn from_tag(tag: u8) -> Option<Self> {
        Some(match tag {
            0x01 => Self::Text,
            0x02 => Self::Copyright,
            0x03 => Self::TrackName,
            0x04 => Self::InstrumentName,
            0x05 => Self::Lyric,
            0x06 => Self::Marker,
            0x07 => Self::CuePoint,
            _ => return None,
        })
    }

    /// The meta tag of this text kind
    fn tag(self) -> u8 {
        match self {
            Self::Text => 0x01,
            Self::Copyright => 0x02,
            Self::TrackName => 0x03,
            Self::InstrumentName => 0x04,
            Self::Lyric => 0x05,
            Self::Marker => 0x06,
            Self::CuePoint => 0x07,
        }
    }
}

impl MetaEvent {
    /// Returns the specific event's tag
    pub fn get_tag(&self) -> u8 {
        match self {
            Self::Text(kind, _) => kind.tag(),
            Self::EndOfTrack => END_OF_TRACK,
            Self::Other(tag, _) => *tag,
        }
    }
}

impl<ITER> TryFrom<IteratorWrapper<&mut ITER>> for MetaEvent
where
    ITER: Iterator<Item = u8>,
{
    type Error = TrackError;
    fn try_from(value: IteratorWrapper<&mut ITER>) -> Result<Self, Self::Error> {
        let iter = value.0;

        let prefix = iter.next().ok_or(TrackError::OutOfSpace)?;
        if prefix != 0xFF {
            return Err(TrackError::InvalidMetaEventData);
        }

        let event_tag = iter.next().ok_or(TrackError::OutOfSpace)?;
        let length = MTrkEvent::try_get_delta_time(iter)? as usize;
        let data = iter.get(length);

        if data.len() != length {
            return Err(TrackError::OutOfSpace);
        }

        if let Some(kind) = TextKind::from_tag(event_tag) {
            // Text events have no mandated encoding, so never fail on them
            return Ok(MetaEvent::Text(
                kind,
                String::from_utf8_lossy(&data).into_owned(),
            ));
        }

        match event_tag {
            END_OF_TRACK if data.is_empty() => Ok(MetaEvent::EndOfTrack),
            END_OF_TRACK => Err(TrackError::InvalidMetaEventData),
            _ => Ok(MetaEvent::Other(event_tag, data)),
        }
    }
}

#[cfg(test)]
mod tests {
    use crate::chunk::track::{
        event::IteratorWrapper,
        meta::{MetaEvent, TextKind},
        TrackError,
    };

    #[test]
    fn test_text_event() {
        // Tag: 0x01, Length: 5, Value: "Hello"
        let data = vec![0xFFu8, 0x01, 0x05, b'H', b'e', b'l', b'l', b'o'];
        let result = MetaEvent::try_from(IteratorWrapper(&mut data.into_iter())).unwrap();
        assert_eq!(result, MetaEvent::Text(TextKind::Text, "Hello".to_string()));
    }

    #[test]
    fn test_track_name_event() {
        let data = vec![0xFFu8, 0x03, 0x04, b'L', b'e', b'a', b'd'];
        let result = MetaEvent::try_from(IteratorWrapper(&mut data.into_iter())).unwrap();
        assert_eq!(result, MetaEvent::Text(TextKind::TrackName, "Lead".to_string()));
        assert_eq!(result.get_tag(), 0x03);
    }

    #[test]
    fn test_invalid_utf8_text_is_lossy() {
        let data = vec![0xFFu8, 0x01, 0x02, b'A', 0xFF];
        let result = MetaEvent::try_from(IteratorWrapper(&mut data.into_iter())).unwrap();
        assert_eq!(result, MetaEvent::Text(TextKind::Text, "A\u{FFFD}".to_string()));
    }

    #[test]
    fn test_end_of_track() {
        let data = vec![0xFFu8, 0x2F, 0x00];
        let result = MetaEvent::try_from(IteratorWrapper(&mut data.into_iter())).unwrap();
        assert_eq!(result, MetaEvent::EndOfTrack);
    }

    #[test]
    fn test_end_of_track_with_payload_fails() {
        let data = vec![0xFFu8, 0x2F, 0x01, 0x00];
        let result = MetaEvent::try_from(IteratorWrapper(&mut data.into_iter()));
        assert_eq!(result, Err(TrackError::InvalidMetaEventData));
    }

    #[test]
    fn test_tempo_is_kept_raw() {
        // Tag: 0x51, Length: 3, Tempo: 500,000 microseconds/quarter note
        let data = vec![0xFFu8, 0x51, 0x03, 0x07, 0xA1, 0x20];
        let result = MetaEvent::try_from(IteratorWrapper(&mut data.into_iter())).unwrap();
        assert_eq!(result, MetaEvent::Other(0x51, vec![0x07, 0xA1, 0x20]));
    }

    #[test]
    fn test_truncated_meta_fails() {
        let data = vec![0xFFu8, 0x03, 0x08, b'a'];
        let result = MetaEvent::try_from(IteratorWrapper(&mut data.into_iter()));
        assert_eq!(result, Err(TrackError::OutOfSpace));
    }
}
