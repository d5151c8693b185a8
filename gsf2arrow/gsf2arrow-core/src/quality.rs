//! File-wide consistency checks over the indexed pings.

use std::collections::{BTreeMap, BTreeSet, HashMap};

use crate::ping::PingInfo;

/// Beam-count, timestamp and schema consistency of a file.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct QualityInfo {
    pub min_beams: usize,
    pub max_beams: usize,
    pub consistent_beam_count: bool,
    /// Timestamps shared by more than one ping, ascending.
    pub duplicate_timestamps: Vec<i64>,
    /// Pings minus distinct timestamps.
    pub duplicate_count: usize,
    /// Repeated timestamps look like a dual-head configuration.
    pub coincident_pings: bool,
    /// Repeated timestamps look like genuinely duplicated pings.
    pub duplicate_pings: bool,
    /// Every subrecord id other than scale factors occurs equally often.
    pub consistent_schema: bool,
    /// Number of pings carrying each subrecord id.
    pub subrecord_counts: BTreeMap<u8, usize>,
}

impl QualityInfo {
    pub fn analyze(pings: &[PingInfo]) -> Self {
        let min_beams = pings.iter().map(|p| p.beam_count).min().unwrap_or(0);
        let max_beams = pings.iter().map(|p| p.beam_count).max().unwrap_or(0);

        let mut per_time: HashMap<i64, usize> = HashMap::new();
        for ping in pings {
            *per_time.entry(ping.time).or_default() += 1;
        }
        let mut duplicate_timestamps: Vec<i64> = per_time
            .iter()
            .filter(|&(_, &n)| n > 1)
            .map(|(&t, _)| t)
            .collect();
        duplicate_timestamps.sort_unstable();

        // Exactly half the pings repeating a timestamp is read as a dual-head
        // sounder; any other non-zero count is a duplicate.
        let duplicate_count = pings.len() - per_time.len();
        let half = pings.len() / 2;
        let coincident_pings = duplicate_count > 0 && half == duplicate_count;
        let duplicate_pings = duplicate_count > 0 && half != duplicate_count;

        let mut subrecord_counts: BTreeMap<u8, usize> = BTreeMap::new();
        for ping in pings {
            let ids: BTreeSet<u8> = ping.subrecord_ids.iter().copied().collect();
            for id in ids {
                *subrecord_counts.entry(id).or_default() += 1;
            }
        }
        let mut counts = subrecord_counts.values();
        let consistent_schema = match counts.next() {
            Some(first) => counts.all(|n| n == first),
            None => true,
        };

        Self {
            min_beams,
            max_beams,
            consistent_beam_count: min_beams == max_beams,
            duplicate_timestamps,
            duplicate_count,
            coincident_pings,
            duplicate_pings,
            consistent_schema,
            subrecord_counts,
        }
    }
}
