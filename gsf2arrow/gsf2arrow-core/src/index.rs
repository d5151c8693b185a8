//! Single forward pass over a stream building the record index.

use std::{
    collections::BTreeMap,
    io::{Read, Seek, SeekFrom},
    sync::Arc,
};

use crate::{
    error::{GsfError, Result},
    framing::{RecordHeader, record_checksum},
    ping::{PingInfo, PingScan, PingScanFailure},
    ping_group::{PingGroup, group_pings},
    quality::QualityInfo,
    record_type::RecordType,
    records::{FormatVersion, Record, decode_record},
    scale_factor::ScaleFactorTable,
    subrecord::BeamField,
};

/// Location of one top-level record.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RecordEntry {
    pub record_type: RecordType,
    pub header_offset: u64,
    pub data_offset: u64,
    pub data_size: u32,
    pub checksum: Option<u32>,
}

/// Record count and measurement count for one record type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RecordStats {
    pub records: u64,
    pub measurements: u64,
}

/// Every record of a stream in file order, with per-type totals.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RecordIndex {
    entries: Vec<RecordEntry>,
    stats: BTreeMap<RecordType, RecordStats>,
}

impl RecordIndex {
    fn push(&mut self, entry: RecordEntry, measurements: u64) {
        let stats = self.stats.entry(entry.record_type).or_default();
        stats.records += 1;
        stats.measurements += measurements;
        self.entries.push(entry);
    }

    pub fn entries(&self) -> &[RecordEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn of_type(&self, record_type: RecordType) -> impl Iterator<Item = &RecordEntry> {
        self.entries
            .iter()
            .filter(move |e| e.record_type == record_type)
    }

    pub fn stats(&self, record_type: RecordType) -> RecordStats {
        self.stats.get(&record_type).copied().unwrap_or_default()
    }

    /// Per-type totals, ordered by record id.
    pub fn all_stats(&self) -> impl Iterator<Item = (RecordType, RecordStats)> + '_ {
        self.stats.iter().map(|(t, s)| (*t, *s))
    }
}

/// A ping record that could not be indexed.
#[derive(Debug)]
pub struct FailedPing {
    /// Position among all ping records of the file, failed ones included.
    pub ping_number: usize,
    pub record_offset: u64,
    pub error: GsfError,
}

/// Result of the index pass.
#[derive(Debug, Default)]
pub struct FileIndex {
    pub version: FormatVersion,
    pub records: RecordIndex,
    pub pings: Vec<PingInfo>,
    pub groups: Vec<PingGroup>,
    pub quality: QualityInfo,
    pub failed_pings: Vec<FailedPing>,
    /// Decoded non-ping records with their header offsets.
    pub decoded: Vec<(u64, Record)>,
}

impl FileIndex {
    pub fn ping_count(&self) -> usize {
        self.pings.len()
    }

    pub fn comments(&self) -> impl Iterator<Item = &crate::records::Comment> {
        self.decoded.iter().filter_map(|(_, r)| match r {
            Record::Comment(c) => Some(c),
            _ => None,
        })
    }

    /// Beam fields carried by any indexed ping, in catalog order.
    pub fn beam_fields(&self) -> Vec<BeamField> {
        BeamField::ALL
            .into_iter()
            .filter(|field| self.quality.subrecord_counts.contains_key(&field.id()))
            .collect()
    }

    pub fn swath_summary(&self) -> Option<&crate::records::SwathSummary> {
        self.decoded.iter().find_map(|(_, r)| match r {
            Record::SwathSummary(s) => Some(s),
            _ => None,
        })
    }
}

/// Builds a [`FileIndex`] from any seekable byte source.
#[derive(Debug, Clone, Default)]
pub struct FileIndexBuilder {
    verify_checksums: bool,
}

impl FileIndexBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Compares stored checksums against the record data. Mismatches are logged.
    pub fn with_verify_checksums(mut self, verify: bool) -> Self {
        self.verify_checksums = verify;
        self
    }

    /// Scans `reader` from its start.
    ///
    /// Per-ping failures are logged and collected in
    /// [`FileIndex::failed_pings`]; truncation and I/O errors abort the scan.
    pub fn build<R: Read + Seek>(&self, reader: &mut R) -> Result<FileIndex> {
        reader.seek(SeekFrom::Start(0))?;

        let mut index = FileIndex::default();
        let mut current_table: Option<Arc<ScaleFactorTable>> = None;
        let mut ping_number = 0;

        while let Some(header) = RecordHeader::read(reader)? {
            let data = header.read_data(reader)?;
            if self.verify_checksums {
                if let Some(expected) = header.checksum {
                    let actual = record_checksum(&data);
                    if actual != expected {
                        log::warn!(
                            "checksum mismatch in {} record at offset {}: stored {expected:#010x}, computed {actual:#010x}",
                            header.record_type,
                            header.header_offset
                        );
                    }
                }
            }

            let measurements = match header.record_type {
                RecordType::SwathBathymetryPing => {
                    let scan = PingScan::scan(
                        &data,
                        header.data_offset(),
                        index.version,
                        header.header_offset,
                    );
                    ping_number += 1;
                    match scan {
                        Ok(scan) => {
                            let has_scale_factors = scan.scale_factors.is_some();
                            if let Some(table) = scan.scale_factors {
                                current_table = Some(Arc::new(table));
                            }
                            let beam_count = scan.header.beam_count();
                            index.pings.push(PingInfo {
                                index: index.pings.len(),
                                record_offset: header.header_offset,
                                data_offset: header.data_offset(),
                                data_size: header.data_size,
                                time: scan.header.time,
                                beam_count,
                                subrecord_ids: scan.subrecord_ids,
                                has_scale_factors,
                                scale_factors: current_table.clone(),
                            });
                            beam_count as u64
                        }
                        Err(PingScanFailure {
                            error,
                            scale_factors,
                        }) if error.is_recoverable() => {
                            if let Some(table) = scale_factors {
                                current_table = Some(Arc::new(table));
                            }
                            log::warn!("skipping ping {}: {error}", ping_number - 1);
                            index.failed_pings.push(FailedPing {
                                ping_number: ping_number - 1,
                                record_offset: header.header_offset,
                                error,
                            });
                            0
                        }
                        Err(failure) => return Err(failure.error),
                    }
                }
                record_type => {
                    match decode_record(
                        record_type,
                        &data,
                        header.header_offset,
                        header.data_offset(),
                    ) {
                        Ok(Some(record)) => {
                            if let Record::Header(version) = &record {
                                log::debug!("format version {version}");
                                index.version = *version;
                            }
                            let measurements = record.measurement_count();
                            index.decoded.push((header.header_offset, record));
                            measurements
                        }
                        Ok(None) => 1,
                        Err(error) if error.is_recoverable() => {
                            log::warn!("skipping {record_type} record: {error}");
                            1
                        }
                        Err(error) => return Err(error),
                    }
                }
            };

            index.records.push(
                RecordEntry {
                    record_type: header.record_type,
                    header_offset: header.header_offset,
                    data_offset: header.data_offset(),
                    data_size: header.data_size,
                    checksum: header.checksum,
                },
                measurements,
            );
        }

        index.groups = group_pings(&index.pings);
        for group in &index.groups {
            log::debug!(
                "ping group {}..{}: {} beams, {} scale factors",
                group.start,
                group.stop,
                group.beam_count,
                group.scale_factors.as_ref().map_or(0, |t| t.len())
            );
        }
        index.quality = QualityInfo::analyze(&index.pings);
        log::info!(
            "indexed {} records, {} pings in {} groups, {} failed",
            index.records.len(),
            index.pings.len(),
            index.groups.len(),
            index.failed_pings.len()
        );
        Ok(index)
    }
}
