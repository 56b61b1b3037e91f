//! Note number to note name conversion, using sharps and the `MIDI note 60 = C4` octave
//! numbering

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Octave numbering convention every name in this crate follows
pub const NOTE_CONVENTION: &str = "MIDI note 60 = C4";

/// Pitch class names, indexed by note number modulo 12
pub const NOTE_NAMES: [&str; 12] = [
    "C", "C#", "D", "D#", "E", "F", "F#", "G", "G#", "A", "A#", "B",
];

/// Names a note number, e.g. `60` is `C4` and `0` is `C-1`.
///
/// Any integer is accepted: the pitch class uses a non-negative modulus and the octave floors,
/// so `-1` is `B-2`.
pub fn note_name(note_number: i32) -> String {
    let pitch_class = NOTE_NAMES[note_number.rem_euclid(12) as usize];
    let octave = note_number.div_euclid(12) - 1;

    format!("{pitch_class}{octave}")
}

/// A note number paired with its name
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Note {
    /// MIDI note number
    pub number: u8,
    /// Human readable name
    pub name: String,
}

impl Note {
    /// Names a MIDI note number
    pub fn new(number: u8) -> Self {
        Self {
            number,
            name: note_name(number as i32),
        }
    }
}

impl core::fmt::Display for Note {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write![f, "{} ({})", self.name, self.number]
    }
}
