//! Per channel note range scan
//!
//! The scan looks at every note on event with a non zero velocity in every track and keeps the
//! lowest and highest note number seen on each channel. A note on with velocity zero is a note
//! off by convention and is ignored.

use std::collections::{BTreeMap, BTreeSet};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{
    chunk::track::{event::MidiStatus, Event, TrackChunk},
    note::Note,
    Midi,
};

/// Which channels a scan reports on
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ScanMode {
    /// Report exactly these 0-based channels. Channels without notes are still reported, as `None`
    Fixed(BTreeSet<u8>),
    /// Report every channel that played at least one note, and nothing else
    #[default]
    Discover,
}

impl ScanMode {
    /// Fixed mode over the given 0-based channels
    pub fn fixed<CHANNELS: IntoIterator<Item = u8>>(channels: CHANNELS) -> Self {
        Self::Fixed(channels.into_iter().collect())
    }

    /// Whether events on `channel` take part in the scan
    fn wants(&self, channel: u8) -> bool {
        match self {
            Self::Fixed(channels) => channels.contains(&channel),
            Self::Discover => true,
        }
    }
}

/// Lowest and highest note played on a channel
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct ChannelRange {
    /// The lowest note played
    pub lowest: Note,
    /// The highest note played
    pub highest: Note,
}

/// Running extremes while a channel is being scanned
#[derive(Debug, Clone, Copy)]
struct Extremes {
    /// Lowest note number so far
    low: u8,
    /// Highest note number so far
    high: u8,
}

impl Extremes {
    /// Starts with a single note
    fn new(note: u8) -> Self {
        Self {
            low: note,
            high: note,
        }
    }

    /// Widens the extremes to include `note`
    fn include(&mut self, note: u8) {
        self.low = self.low.min(note);
        self.high = self.high.max(note);
    }
}

impl From<Extremes> for ChannelRange {
    fn from(value: Extremes) -> Self {
        Self {
            lowest: Note::new(value.low),
            highest: Note::new(value.high),
        }
    }
}

/// Result of a range scan, ordered by channel
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct RangeReport {
    /// The mode the scan ran with
    mode: ScanMode,
    /// Channel to range, `None` when a requested channel played nothing
    ranges: BTreeMap<u8, Option<ChannelRange>>,
}

impl RangeReport {
    /// The mode the scan ran with
    pub fn mode(&self) -> &ScanMode {
        &self.mode
    }

    /// The range of a channel, `None` if the channel played nothing or was not reported
    pub fn get(&self, channel: u8) -> Option<&ChannelRange> {
        self.ranges.get(&channel).and_then(Option::as_ref)
    }

    /// Whether a channel appears in the report at all, with or without notes
    pub fn contains(&self, channel: u8) -> bool {
        self.ranges.contains_key(&channel)
    }

    /// Every reported channel in ascending order
    pub fn iter(&self) -> impl Iterator<Item = (u8, Option<&ChannelRange>)> + '_ {
        self.ranges
            .iter()
            .map(|(channel, range)| (*channel, range.as_ref()))
    }

    /// Number of reported channels
    pub fn len(&self) -> usize {
        self.ranges.len()
    }

    /// Whether no channel is reported
    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }
}

/// Returns the channel and note of a note on that actually sounds
fn sounding_note(event: &Event) -> Option<(u8, u8)> {
    match event {
        Event::MidiEvent(midi) => match midi.status() {
            MidiStatus::NoteOn(meta) if meta.velocity() > 0 => Some((midi.channel(), meta.key())),
            _ => None,
        },
        _ => None,
    }
}

/// Scans any sequence of tracks
pub fn scan_tracks<'a, TRACKS>(tracks: TRACKS, mode: &ScanMode) -> RangeReport
where
    TRACKS: IntoIterator<Item = &'a TrackChunk>,
{
    let mut extremes: BTreeMap<u8, Extremes> = BTreeMap::new();

    for (index, track) in tracks.into_iter().enumerate() {
        debug!(track = index, name = ?track.name(), events = track.len(), "scanning track");

        let notes = track
            .events()
            .iter()
            .filter_map(|mtrk| sounding_note(mtrk.event()))
            .filter(|(channel, _)| mode.wants(*channel));

        for (channel, note) in notes {
            extremes
                .entry(channel)
                .and_modify(|range| range.include(note))
                .or_insert_with(|| Extremes::new(note));
        }
    }

    let mut ranges: BTreeMap<u8, Option<ChannelRange>> = extremes
        .into_iter()
        .map(|(channel, range)| (channel, Some(range.into())))
        .collect();

    if let ScanMode::Fixed(channels) = mode {
        for channel in channels {
            ranges.entry(*channel).or_insert(None);
        }
    }

    debug!(channels = ranges.len(), "range scan finished");

    RangeReport {
        mode: mode.clone(),
        ranges,
    }
}

/// Scans every track of a MIDI document
pub fn analyze(midi: &Midi, mode: &ScanMode) -> RangeReport {
    scan_tracks(midi.tracks(), mode)
}

#[cfg(test)]
mod tests {
    use super::{analyze, scan_tracks, ChannelRange, ScanMode};
    use crate::{
        chunk::{
            header::{Division, Format, HeaderChunk},
            track::{
                event::{MidiEvent, MidiStatus, NoteMeta},
                meta::MetaEvent,
                Event, MTrkEvent, TrackChunk,
            },
        },
        note::Note,
        Midi,
    };

    fn note_on(channel: u8, key: u8, velocity: u8) -> MTrkEvent {
        MTrkEvent::new(
            0,
            Event::MidiEvent(MidiEvent::new(
                channel,
                MidiStatus::NoteOn(NoteMeta::new(key, velocity)),
            )),
        )
    }

    fn note_off(channel: u8, key: u8) -> MTrkEvent {
        MTrkEvent::new(
            0,
            Event::MidiEvent(MidiEvent::new(
                channel,
                MidiStatus::NoteOff(NoteMeta::new(key, 64)),
            )),
        )
    }

    fn midi(tracks: Vec<Vec<MTrkEvent>>) -> Midi {
        let header = HeaderChunk::new(Format::One, tracks.len() as u16, Division::Metrical(96));
        Midi::new(header, tracks.into_iter().map(TrackChunk::new).collect())
    }

    fn range(low: u8, high: u8) -> ChannelRange {
        ChannelRange {
            lowest: Note::new(low),
            highest: Note::new(high),
        }
    }

    fn sample() -> Midi {
        midi(vec![vec![
            note_on(0, 40, 100),
            note_on(0, 72, 80),
            note_on(1, 50, 1),
            MTrkEvent::new(0, Event::MetaEvent(MetaEvent::EndOfTrack)),
        ]])
    }

    #[test]
    fn fixed_channels_report_extremes() {
        let report = analyze(&sample(), &ScanMode::fixed([0, 1]));

        assert_eq!(report.len(), 2);
        assert_eq!(report.get(0), Some(&range(40, 72)));
        assert_eq!(report.get(0).map(|r| r.lowest.name.as_str()), Some("E2"));
        assert_eq!(report.get(0).map(|r| r.highest.name.as_str()), Some("C5"));
        assert_eq!(report.get(1), Some(&range(50, 50)));
        assert_eq!(report.get(1).map(|r| r.lowest.name.as_str()), Some("D3"));
    }

    #[test]
    fn zero_velocity_is_not_a_note() {
        let midi = midi(vec![vec![note_on(0, 60, 100), note_on(0, 20, 0), note_on(0, 100, 0)]]);
        let report = analyze(&midi, &ScanMode::Discover);

        assert_eq!(report.get(0), Some(&range(60, 60)));
    }

    #[test]
    fn note_offs_are_ignored() {
        let midi = midi(vec![vec![note_off(3, 10), note_on(4, 70, 90)]]);
        let report = analyze(&midi, &ScanMode::Discover);

        assert!(!report.contains(3));
        assert_eq!(report.get(4), Some(&range(70, 70)));
    }

    #[test]
    fn silent_channel_is_omitted_when_discovering() {
        let report = analyze(&sample(), &ScanMode::Discover);

        assert!(!report.contains(2));
        assert_eq!(report.len(), 2);
    }

    #[test]
    fn silent_channel_is_marked_when_requested() {
        let report = analyze(&sample(), &ScanMode::fixed([2]));

        assert!(report.contains(2));
        assert_eq!(report.get(2), None);
        assert_eq!(report.iter().collect::<Vec<_>>(), vec![(2, None)]);
    }

    #[test]
    fn unrequested_channels_are_ignored() {
        let report = analyze(&sample(), &ScanMode::fixed([1]));

        assert!(!report.contains(0));
        assert_eq!(report.get(1), Some(&range(50, 50)));
    }

    #[test]
    fn discovered_channels_are_ascending() {
        let midi = midi(vec![
            vec![note_on(9, 36, 100), note_on(2, 48, 100)],
            vec![note_on(5, 60, 100), note_on(2, 30, 100)],
        ]);
        let report = analyze(&midi, &ScanMode::Discover);

        let channels: Vec<u8> = report.iter().map(|(channel, _)| channel).collect();
        assert_eq!(channels, vec![2, 5, 9]);
        assert_eq!(report.get(2), Some(&range(30, 48)));
    }

    #[test]
    fn empty_document_discovers_nothing() {
        assert!(analyze(&midi(vec![]), &ScanMode::Discover).is_empty());
        assert!(analyze(&midi(vec![vec![]]), &ScanMode::Discover).is_empty());
    }

    #[test]
    fn empty_document_still_reports_requested_channels() {
        let report = analyze(&midi(vec![]), &ScanMode::fixed([0, 1]));

        assert_eq!(report.iter().collect::<Vec<_>>(), vec![(0, None), (1, None)]);
    }

    #[test]
    fn analysis_is_repeatable() {
        let midi = sample();
        let mode = ScanMode::Discover;

        assert_eq!(analyze(&midi, &mode), analyze(&midi, &mode));
    }

    #[test]
    fn scan_accepts_any_track_iterator() {
        let tracks = [TrackChunk::new(vec![note_on(0, 64, 1)])];
        let report = scan_tracks(tracks.iter(), &ScanMode::Discover);

        assert_eq!(report.mode(), &ScanMode::Discover);
        assert_eq!(report.get(0), Some(&range(64, 64)));
    }
}
