//! Track chunk data enums and structs

use std::iter::Peekable;

use event::{IteratorWrapper, MidiEvent, UnsupportedStatusCode};
use meta::{MetaEvent, TextKind};
use sysex::SysexEvent;
use thiserror::Error;
use tracing::trace;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

pub mod event;
pub mod meta;
pub mod sysex;

/// Error types from parsing a track
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackError {
    /// End of chunk while parsing
    #[error("Reached end of chunk before done parsing")]
    OutOfSpace,
    /// Invalid chunk format
    #[error("Invalid Track Format")]
    InvalidFormat,
    /// MIDI Channel Event status code is invalid
    #[error("Invalid Status Code for MIDI Channel Event {0}")]
    UnsupportedStatusCode(#[from] UnsupportedStatusCode),
    /// A data byte appeared before any channel status it could continue
    #[error("Data byte found with no running status to apply it to")]
    MissingRunningStatus,
    /// Meta Event is in an invalid format
    #[error("Meta Event data is in an invalid format")]
    InvalidMetaEventData,
    /// Invalid start tag for sysex message
    #[error("Invalid SysEx Message Start")]
    InvalidSysExMessage,
}

/// A track chunk, containing one or more MTrk events
#[derive(Debug, Clone, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct TrackChunk {
    /// All associated track events to this chunk
    mtrk_events: Vec<MTrkEvent>,
}

impl TrackChunk {
    /// Creates a track from already parsed events
    pub fn new(mtrk_events: Vec<MTrkEvent>) -> Self {
        Self { mtrk_events }
    }

    /// Every event of the track in order
    pub fn events(&self) -> &[MTrkEvent] {
        &self.mtrk_events
    }

    /// Number of events in the track
    pub fn len(&self) -> usize {
        self.mtrk_events.len()
    }

    /// Returns if the track holds no events at all
    pub fn is_empty(&self) -> bool {
        self.mtrk_events.is_empty()
    }

    /// The track's name, taken from its first track name meta event
    pub fn name(&self) -> Option<&str> {
        self.mtrk_events.iter().find_map(|mtrk| match &mtrk.event {
            Event::MetaEvent(MetaEvent::Text(TextKind::TrackName, name)) => Some(name.as_str()),
            _ => None,
        })
    }
}

impl TryFrom<Vec<u8>> for TrackChunk {
    type Error = TrackError;
    fn try_from(value: Vec<u8>) -> Result<Self, Self::Error> {
        let mut value = value.into_iter().peekable();
        let mut running_status = None;
        let mut mtrk_events = vec![];

        while value.peek().is_some() {
            let delta_time = MTrkEvent::try_get_delta_time(&mut value)?;
            let event = Event::read(&mut value, &mut running_status)?;
            let end_of_track = event == Event::MetaEvent(MetaEvent::EndOfTrack);

            mtrk_events.push(MTrkEvent { delta_time, event });

            if end_of_track {
                break;
            }
        }

        Ok(Self { mtrk_events })
    }
}

/// A MIDI Event with a DeltaTime and an attached Event
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct MTrkEvent {
    /// Delta time is a variable-length representation of how much time to wait in ticks before the
    /// event follows.
    delta_time: u32,
    /// The event that occurs after the delta time is waited for
    event: Event,
}

impl MTrkEvent {
    /// Pairs an event with the ticks that precede it
    pub fn new(delta_time: u32, event: Event) -> Self {
        Self { delta_time, event }
    }

    /// Ticks to wait since the previous event
    pub fn delta_time(&self) -> u32 {
        self.delta_time
    }

    /// The event itself
    pub fn event(&self) -> &Event {
        &self.event
    }

    /// Reads a variable length quantity: up to four bytes, 7 bits each, most significant first,
    /// with the high bit set on every byte but the last
    pub fn try_get_delta_time<ITER: Iterator<Item = u8>>(
        iter: &mut ITER,
    ) -> Result<u32, TrackError> {
        const MAX_BYTES: usize = 4;
        const MASK: u8 = 0x7F;

        let mut result: u32 = 0;

        for _ in 0..MAX_BYTES {
            let byte = iter.next().ok_or(TrackError::OutOfSpace)?;

            result <<= 7;
            result |= (byte & MASK) as u32;

            if !MTrkEvent::msb_is_one(byte) {
                return Ok(result);
            }
        }

        Err(TrackError::InvalidFormat)
    }

    /// Returns true if the msb of a byte is 1
    fn msb_is_one(byte: u8) -> bool {
        byte >> 7 == 1
    }
}

/// Any event that may occur
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Event {
    /// A midi event
    MidiEvent(MidiEvent),
    /// A system exclusive event
    SysexEvent(SysexEvent),
    /// Specifies non-MIDI information useful to this format or to sequencers
    MetaEvent(MetaEvent),
}

impl Event {
    /// Reads one event. Channel messages may omit their status byte and reuse the previous one,
    /// which `running_status` tracks across calls. SysEx and meta events clear it.
    pub fn read<ITER>(
        iter: &mut Peekable<ITER>,
        running_status: &mut Option<u8>,
    ) -> Result<Self, TrackError>
    where
        ITER: Iterator<Item = u8>,
    {
        let prefix = *iter.peek().ok_or(TrackError::OutOfSpace)?;

        match prefix {
            0x00..=0x7F => {
                let status = (*running_status).ok_or(TrackError::MissingRunningStatus)?;
                let event = MidiEvent::try_from((status, IteratorWrapper(iter)))?;
                Ok(Event::MidiEvent(event))
            }

            0x80..=0xEF => {
                iter.next();
                *running_status = Some(prefix);
                let event = MidiEvent::try_from((prefix, IteratorWrapper(iter)))?;
                Ok(Event::MidiEvent(event))
            }

            0xF0 | 0xF7 => {
                *running_status = None;
                let event = SysexEvent::try_from(IteratorWrapper(iter))?;
                trace!(len = event.payload().len(), "skipping sysex event");
                Ok(Event::SysexEvent(event))
            }

            0xFF => {
                *running_status = None;
                let event = MetaEvent::try_from(IteratorWrapper(iter))?;
                trace!(tag = event.get_tag(), "read meta event");
                Ok(Event::MetaEvent(event))
            }

            _ => Err(TrackError::InvalidFormat),
        }
    }
}
