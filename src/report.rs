//! Text rendering of a range scan
//!
//! Channels are shown 1-based, the way instruments and sequencers label them. Discovery scans
//! get a header naming the file and the naming convention, fixed channel scans print their
//! channels straight away.

use core::fmt;

use crate::{
    note::NOTE_CONVENTION,
    range::{ChannelRange, RangeReport, ScanMode},
};

/// A range scan ready to print for a given file
#[derive(Debug, Clone, Copy)]
pub struct Report<'a> {
    /// Name of the analyzed file, without its directory
    file_name: &'a str,
    /// The scan to render
    ranges: &'a RangeReport,
}

impl<'a> Report<'a> {
    /// Pairs a scan with the name of the file it came from
    pub fn new(file_name: &'a str, ranges: &'a RangeReport) -> Self {
        Self { file_name, ranges }
    }
}

/// Writes one channel's block. Fixed channel scans list the lowest note first, discovery scans
/// the highest.
fn write_channel(
    f: &mut fmt::Formatter<'_>,
    channel: u8,
    range: Option<&ChannelRange>,
    lowest_first: bool,
) -> fmt::Result {
    writeln!(f, "Channel {}:", channel as u16 + 1)?;

    match range {
        Some(range) if lowest_first => {
            writeln!(f, "  Lowest : {}", range.lowest)?;
            writeln!(f, "  Highest: {}", range.highest)
        }
        Some(range) => {
            writeln!(f, "  Highest: {}", range.highest)?;
            writeln!(f, "  Lowest : {}", range.lowest)
        }
        None => writeln!(f, "  No notes found"),
    }
}

impl fmt::Display for Report<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let discovering = matches!(self.ranges.mode(), ScanMode::Discover);

        if discovering {
            writeln!(f, "Successfully analyzed: {}", self.file_name)?;
            writeln!(f, "Note names follow the convention {NOTE_CONVENTION}")?;
            writeln!(f)?;

            if self.ranges.is_empty() {
                return writeln!(f, "No note data found.");
            }
        }

        for (channel, range) in self.ranges.iter() {
            write_channel(f, channel, range, !discovering)?;
        }

        Ok(())
    }
}
