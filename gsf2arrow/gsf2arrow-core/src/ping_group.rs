//! Runs of consecutive pings sharing one scale-factor table.

use std::{ops::Range, sync::Arc};

use crate::{ping::PingInfo, scale_factor::ScaleFactorTable};

/// Half-open range of ping indices decoded with the same scale factors.
#[derive(Debug, Clone, PartialEq)]
pub struct PingGroup {
    pub start: usize,
    pub stop: usize,
    /// Sum of the beam counts of the pings in the group.
    pub beam_count: u64,
    pub scale_factors: Option<Arc<ScaleFactorTable>>,
}

impl PingGroup {
    fn open(start: usize, scale_factors: Option<Arc<ScaleFactorTable>>) -> Self {
        Self {
            start,
            stop: start,
            beam_count: 0,
            scale_factors,
        }
    }

    fn push(mut self, ping: &PingInfo) -> Self {
        self.stop = ping.index + 1;
        self.beam_count += ping.beam_count as u64;
        self
    }

    pub fn len(&self) -> usize {
        self.stop - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.stop
    }

    pub fn range(&self) -> Range<usize> {
        self.start..self.stop
    }
}

/// Splits `pings` into groups.
///
/// A group opens at the first ping and at every ping that carries its own
/// table; the trailing group is always closed. `pings` must be indexed
/// `0..pings.len()` in file order.
pub fn group_pings(pings: &[PingInfo]) -> Vec<PingGroup> {
    let (mut groups, open) = pings.iter().fold(
        (Vec::<PingGroup>::new(), None::<PingGroup>),
        |(mut groups, open), ping| {
            let group = match open {
                Some(group) if !ping.has_scale_factors => group,
                previous => {
                    groups.extend(previous);
                    PingGroup::open(ping.index, ping.scale_factors.clone())
                }
            };
            (groups, Some(group.push(ping)))
        },
    );
    groups.extend(open);
    groups
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scale_factor::ScaleFactor;

    fn ping(index: usize, beams: usize, own: Option<&Arc<ScaleFactorTable>>) -> PingInfo {
        PingInfo {
            index,
            record_offset: 0,
            data_offset: 0,
            data_size: 0,
            time: index as i64,
            beam_count: beams,
            subrecord_ids: vec![1],
            has_scale_factors: own.is_some(),
            scale_factors: own.cloned(),
        }
    }

    #[test]
    fn groups_are_contiguous_and_cover_all_pings() {
        let a = Arc::new(ScaleFactorTable::from_iter([ScaleFactor::new(1, 100.0, 0.0)]));
        let b = Arc::new(ScaleFactorTable::from_iter([ScaleFactor::new(1, 1000.0, 0.0)]));
        let pings = vec![
            ping(0, 10, Some(&a)),
            ping(1, 12, None),
            ping(2, 8, Some(&b)),
            ping(3, 8, None),
            ping(4, 9, None),
        ];
        let groups = group_pings(&pings);
        assert_eq!(groups.len(), 2);
        assert_eq!(groups[0].range(), 0..2);
        assert_eq!(groups[0].beam_count, 22);
        assert_eq!(groups[1].range(), 2..5);
        assert_eq!(groups[1].beam_count, 25);
        assert!(Arc::ptr_eq(groups[1].scale_factors.as_ref().unwrap(), &b));

        let mut next = 0;
        for group in &groups {
            assert_eq!(group.start, next);
            next = group.stop;
        }
        assert_eq!(next, pings.len());
    }

    #[test]
    fn pings_before_any_table_form_their_own_group() {
        let a = Arc::new(ScaleFactorTable::default());
        let groups = group_pings(&[ping(0, 1, None), ping(1, 1, Some(&a))]);
        assert_eq!(groups.len(), 2);
        assert!(groups[0].scale_factors.is_none());
        assert_eq!(groups[1].range(), 1..2);
    }

    #[test]
    fn no_pings_no_groups() {
        assert!(group_pings(&[]).is_empty());
    }
}
