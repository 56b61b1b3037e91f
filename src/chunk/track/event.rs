//! MIDI channel events and their status parsing

use thiserror::Error;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::TrackError;

/// Wrapper around iterator to prevent trait implementation sillyness
pub struct IteratorWrapper<T>(pub T);

/// A channel message: the status it carries plus the 0-based channel it was sent on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct MidiEvent {
    /// 0-based MIDI channel, 0 through 15
    channel: u8,
    /// What the message does
    status: MidiStatus,
}

impl MidiEvent {
    /// Creates a channel message, the channel is masked to its low 4 bits
    pub fn new(channel: u8, status: MidiStatus) -> Self {
        Self {
            channel: channel & 0x0F,
            status,
        }
    }

    /// 0-based MIDI channel
    pub fn channel(&self) -> u8 {
        self.channel
    }

    /// The message's status and data
    pub fn status(&self) -> MidiStatus {
        self.status
    }
}

/// A MIDI Message Status
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum MidiStatus {
    /// Turn Off event
    /// This message is sent when a note is released
    NoteOff(NoteMeta),
    /// Turn On event
    /// This message is sent when a note is depressed. Zero velocity means note off by convention
    NoteOn(NoteMeta),
    /// Polyphonic Key Pressure
    /// This message is most often sent by pressing down a key after it "bottoms out"
    PolyphonicKeyPressure(NoteMeta),
    /// Control change
    /// This message is sent when a controller value changes. Controllers include devices such as
    /// pedals and levers. Certain controller numbers are reserved.
    ControlChange(ControlChange),
    /// Program change.
    /// This message is sent when the patch number changes
    ProgramChange(u8),
    /// Channel Pressure
    /// This message is most often sent by pressing down on a key after it "bottoms out"
    ChannelPressure(u8),
    /// Pitch Wheel Change
    /// This message is sent to indicate a change in the pitch wheel as measured by a fourteen bit
    /// value.
    PitchWheelChange(u16),
}

/// Error type for a status byte that is not a channel message
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("{0:#04X}")]
pub struct UnsupportedStatusCode(pub u8);

/// Reads one 7 bit data byte
fn data_byte<ITER: Iterator<Item = u8>>(iter: &mut ITER) -> Result<u8, TrackError> {
    match iter.next() {
        Some(byte) if byte < 0x80 => Ok(byte),
        Some(_) => Err(TrackError::InvalidFormat),
        None => Err(TrackError::OutOfSpace),
    }
}

/// Reads the key and velocity pair shared by note messages
fn note_meta<ITER: Iterator<Item = u8>>(iter: &mut ITER) -> Result<NoteMeta, TrackError> {
    let key = data_byte(iter)?;
    let velocity = data_byte(iter)?;

    Ok(NoteMeta { key, velocity })
}

impl<ITER> TryFrom<(u8, IteratorWrapper<&mut ITER>)> for MidiEvent
where
    ITER: Iterator<Item = u8>,
{
    type Error = TrackError;
    fn try_from(value: (u8, IteratorWrapper<&mut ITER>)) -> Result<Self, Self::Error> {
        let (status, IteratorWrapper(iter)) = value;
        let channel = status & 0x0F;

        let status = match status >> 4 {
            0x8 => MidiStatus::NoteOff(note_meta(iter)?),
            0x9 => MidiStatus::NoteOn(note_meta(iter)?),
            0xA => MidiStatus::PolyphonicKeyPressure(note_meta(iter)?),
            0xB => MidiStatus::ControlChange(ControlChange {
                controller_number: data_byte(iter)?,
                new_value: data_byte(iter)?,
            }),
            0xC => MidiStatus::ProgramChange(data_byte(iter)?),
            0xD => MidiStatus::ChannelPressure(data_byte(iter)?),
            0xE => {
                let lsb = data_byte(iter)? as u16;
                let msb = data_byte(iter)? as u16;

                MidiStatus::PitchWheelChange((msb << 7) | lsb)
            }
            _ => return Err(UnsupportedStatusCode(status).into()),
        };

        Ok(Self { channel, status })
    }
}

/// Metadata for a note's relative info. Including key and velocity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct NoteMeta {
    /// Note key
    key: u8,
    /// Note velocity
    velocity: u8,
}

impl NoteMeta {
    /// Creates note data from a key and velocity
    pub fn new(key: u8, velocity: u8) -> Self {
        Self { key, velocity }
    }

    /// MIDI note number, 0 through 127
    pub fn key(&self) -> u8 {
        self.key
    }

    /// Strike velocity, 0 through 127
    pub fn velocity(&self) -> u8 {
        self.velocity
    }
}

/// Metadata for changing a controller
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ControlChange {
    /// Controller number
    controller_number: u8,
    /// New value
    new_value: u8,
}

impl ControlChange {
    /// Which controller changed
    pub fn controller_number(&self) -> u8 {
        self.controller_number
    }

    /// The controller's new value
    pub fn new_value(&self) -> u8 {
        self.new_value
    }
}
