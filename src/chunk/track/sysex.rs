//! System Exclusive Messages

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use super::{event::IteratorWrapper, MTrkEvent, TrackError};
use crate::reader::Yieldable;

/// A midi system exclusive event message. In a file these are stored as a prefix byte, a
/// variable length quantity and that many bytes of payload
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SysexEvent {
    /// True for an `0xF7` escape packet, false for a regular `0xF0` message
    escaped: bool,
    /// Data payload to be parsed on a per-system basis
    payload: Vec<u8>,
}

impl SysexEvent {
    /// Raw message bytes following the length
    pub fn payload(&self) -> &[u8] {
        &self.payload
    }

    /// Whether the event was an `0xF7` escape sequence
    pub fn is_escaped(&self) -> bool {
        self.escaped
    }
}

impl<ITER> TryFrom<IteratorWrapper<&mut ITER>> for SysexEvent
where
    ITER: Iterator<Item = u8>,
{
    type Error = TrackError;
    fn try_from(value: IteratorWrapper<&mut ITER>) -> Result<Self, Self::Error> {
        let iter = value.0;

        let escaped = match iter.next().ok_or(TrackError::OutOfSpace)? {
            0xF0 => false,
            0xF7 => true,
            _ => return Err(TrackError::InvalidSysExMessage),
        };

        let length = MTrkEvent::try_get_delta_time(iter)? as usize;
        let payload = iter.get(length);

        if payload.len() != length {
            return Err(TrackError::OutOfSpace);
        }

        Ok(Self { escaped, payload })
    }
}

#[cfg(test)]
mod tests {
    use crate::chunk::track::{event::IteratorWrapper, TrackError};

    use super::SysexEvent;

    #[test]
    fn sys_ex_message_valid_parse() {
        let mut data = [0xF0u8, 0x05, 0x43, 0x10, 0x4C, 0x00, 0xF7, 0x90].into_iter();

        let sysex =
            SysexEvent::try_from(IteratorWrapper(&mut data)).expect("Parse sysex message");

        assert!(!sysex.is_escaped());
        assert_eq!(sysex.payload(), &[0x43, 0x10, 0x4C, 0x00, 0xF7]);
        assert_eq!(data.next(), Some(0x90));
    }

    #[test]
    fn escape_packet_parse() {
        let mut data = [0xF7u8, 0x02, 0xF3, 0x01].into_iter();

        let sysex =
            SysexEvent::try_from(IteratorWrapper(&mut data)).expect("Parse escape sequence");

        assert!(sysex.is_escaped());
        assert_eq!(sysex.payload(), &[0xF3, 0x01]);
    }

    #[test]
    fn sys_ex_message_cut_short_fails() {
        let mut data = [0xF0u8, 0x05, 0x43, 0x10].into_iter();

        let sysex = SysexEvent::try_from(IteratorWrapper(&mut data));

        assert_eq!(sysex, Err(TrackError::OutOfSpace))
    }

    #[test]
    fn sys_ex_message_invalid_start_fails() {
        let mut data = [0xF1u8, 0x00].into_iter();

        let sysex = SysexEvent::try_from(IteratorWrapper(&mut data));

        assert_eq!(sysex, Err(TrackError::InvalidSysExMessage))
    }
}
