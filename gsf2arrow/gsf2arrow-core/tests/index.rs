mod support;

use std::io::Cursor;

use gsf2arrow_core::{
    FileIndex, FileIndexBuilder, FormatVersion, GsfError, PingDecoder, Record, RecordType,
    SensorRegistry,
};
use support::*;

fn index(bytes: Vec<u8>) -> FileIndex {
    FileIndexBuilder::new()
        .build(&mut Cursor::new(bytes))
        .unwrap()
}

#[test]
fn header_ping_and_summary_are_indexed() {
    let bytes = GsfWriter::new()
        .header("GSF-v03.09")
        .ping(&two_beam_ping(1000))
        .swath_summary()
        .finish();
    let index = index(bytes);

    assert_eq!(index.version, FormatVersion::new(3, 9));
    assert_eq!(index.records.len(), 3);
    for record_type in [
        RecordType::Header,
        RecordType::SwathBathymetryPing,
        RecordType::SwathSummary,
    ] {
        assert_eq!(index.records.stats(record_type).records, 1, "{record_type}");
    }
    assert_eq!(index.pings.len(), 1);
    assert_eq!(index.pings[0].beam_count, 2);
    assert_eq!(
        index
            .records
            .stats(RecordType::SwathBathymetryPing)
            .measurements,
        2
    );
    assert_eq!(index.pings[0].subrecord_ids, vec![1, 2, 3]);
    assert!(index.pings[0].has_scale_factors);
    assert_eq!(index.pings[0].time, 1000 * 1_000_000_000);

    let summary = index.swath_summary().unwrap();
    assert_eq!(summary.min_depth, 10.0);
    assert_eq!(summary.max_latitude, 42.1);
}

#[test]
fn pings_without_table_inherit_the_previous_one() {
    let bare = PingBuilder::new(2, 2).with(beam_array(1, 2, &[1, 2]));
    let bytes = GsfWriter::new()
        .header("GSF-v03.09")
        .ping(&two_beam_ping(1))
        .ping(&bare)
        .ping(&two_beam_ping(3))
        .finish();
    let index = index(bytes);

    assert_eq!(index.pings.len(), 3);
    assert!(!index.pings[1].has_scale_factors);
    let first = index.pings[0].scale_factors.as_ref().unwrap();
    let second = index.pings[1].scale_factors.as_ref().unwrap();
    assert!(std::sync::Arc::ptr_eq(first, second));

    assert_eq!(index.groups.len(), 2);
    assert_eq!(index.groups[0].range(), 0..2);
    assert_eq!(index.groups[0].beam_count, 4);
    assert_eq!(index.groups[1].range(), 2..3);
    assert!(!index.quality.consistent_schema);
}

#[test]
fn small_records_are_decoded_and_counted() {
    let bytes = GsfWriter::new()
        .header("GSF-v03.09")
        .comment(5, "line 12 start")
        .svp(&[(0, 150_000), (1000, 149_500), (2000, 149_000)])
        .record(NAV_ERROR, &[0; 8])
        .finish();
    let index = index(bytes);

    assert_eq!(
        index.comments().map(|c| c.text.as_str()).collect::<Vec<_>>(),
        vec!["line 12 start"]
    );
    assert_eq!(
        index
            .records
            .stats(RecordType::SoundVelocityProfile)
            .measurements,
        3
    );
    assert_eq!(index.records.stats(RecordType::NavigationError).records, 1);
    let svp = index
        .decoded
        .iter()
        .find_map(|(_, r)| match r {
            Record::SoundVelocityProfile(svp) => Some(svp),
            _ => None,
        })
        .unwrap();
    assert_eq!(svp.points[1], (10.0, 1495.0));
}

#[test]
fn malformed_ping_is_skipped_but_indexed() {
    let bytes = GsfWriter::new()
        .header("GSF-v03.09")
        .record(SWATH_PING, &[0; 10])
        .ping(&two_beam_ping(7))
        .finish();
    let index = index(bytes);

    assert_eq!(index.records.stats(RecordType::SwathBathymetryPing).records, 2);
    assert_eq!(index.pings.len(), 1);
    assert_eq!(index.pings[0].index, 0);
    assert_eq!(index.failed_pings.len(), 1);
    assert_eq!(index.failed_pings[0].ping_number, 0);
    assert!(matches!(
        index.failed_pings[0].error,
        GsfError::MalformedHeader { .. }
    ));
}

#[test]
fn failed_ping_still_replaces_the_scale_factor_table() {
    // A subrecord header declaring more bytes than the record holds.
    let oversized = ((2u32 << 24) | 100).to_be_bytes().to_vec();
    let broken = PingBuilder::new(2, 1)
        .with(scale_factors(&[(1, 1000, 0)]))
        .with(beam_array(1, 2, &[5]))
        .with(oversized);
    let bare = PingBuilder::new(3, 1).with(beam_array(1, 2, &[1000]));
    let bytes = GsfWriter::new()
        .header("GSF-v03.09")
        .ping(&two_beam_ping(1))
        .ping(&broken)
        .ping(&bare)
        .finish();
    let index = index(bytes.clone());

    assert_eq!(index.failed_pings.len(), 1);
    assert_eq!(index.failed_pings[0].ping_number, 1);
    assert_eq!(index.pings.len(), 2);
    let table = index.pings[1].scale_factors.as_ref().unwrap();
    assert_eq!(table.get(1).unwrap().scale, 1000.0);
    assert!(!index.pings[1].has_scale_factors);

    let sensors = SensorRegistry::new();
    let info = &index.pings[1];
    let range = info.data_range();
    let ping = PingDecoder::new(index.version, &sensors)
        .decode(info, &bytes[range.start as usize..range.end as usize])
        .unwrap();
    assert_eq!(ping.beams.values(gsf2arrow_core::BeamField::Depth).unwrap(), &[-1.0]);
}

#[test]
fn history_and_parameter_records_are_decoded() {
    let bytes = GsfWriter::new()
        .header("GSF-v03.09")
        .history(20, ["survey-pc", "jdoe", "gsfcopy -v in.gsf", "cleaned"])
        .parameters(
            PROCESSING_PARAMETERS,
            21,
            &["REFERENCE TIME=1970/001 00:00:00", "ROLL_COMPENSATED = YES"],
        )
        .parameters(SENSOR_PARAMETERS, 22, &["TRANSDUCER=EM2040"])
        .finish();
    let index = index(bytes);

    let history = index
        .decoded
        .iter()
        .find_map(|(_, r)| match r {
            Record::History(h) => Some(h),
            _ => None,
        })
        .unwrap();
    assert_eq!(history.time, 20 * 1_000_000_000);
    assert_eq!(history.host_name, "survey-pc");
    assert_eq!(history.operator_name, "jdoe");
    assert_eq!(history.command_line, "gsfcopy -v in.gsf");
    assert_eq!(history.comment, "cleaned");

    let processing = index
        .decoded
        .iter()
        .find_map(|(_, r)| match r {
            Record::ProcessingParameters(p) => Some(p),
            _ => None,
        })
        .unwrap();
    assert_eq!(processing.time, 21 * 1_000_000_000);
    assert_eq!(processing.entries.len(), 2);
    assert_eq!(processing.get("ROLL_COMPENSATED"), Some("YES"));
    assert_eq!(processing.get("REFERENCE TIME"), Some("1970/001 00:00:00"));

    let sensor = index
        .decoded
        .iter()
        .find_map(|(_, r)| match r {
            Record::SensorParameters(p) => Some(p),
            _ => None,
        })
        .unwrap();
    assert_eq!(sensor.get("TRANSDUCER"), Some("EM2040"));

    for record_type in [
        RecordType::History,
        RecordType::ProcessingParameters,
        RecordType::SensorParameters,
    ] {
        let stats = index.records.stats(record_type);
        assert_eq!((stats.records, stats.measurements), (1, 1), "{record_type}");
    }
}

#[test]
fn attitude_and_navigation_error_are_decoded() {
    let bytes = GsfWriter::new()
        .header("GSF-v03.09")
        .hv_nav_error(30, 4, (1_250, -300), "GPS_RTK")
        .attitude(
            40,
            &[
                (0, 150, -25, 10, 9000),
                (100, 160, -20, 12, 9010),
                (200, 170, -15, 14, 9020),
            ],
        )
        .finish();
    let index = index(bytes);

    let nav = index
        .decoded
        .iter()
        .find_map(|(_, r)| match r {
            Record::HvNavigationError(n) => Some(n),
            _ => None,
        })
        .unwrap();
    assert_eq!(nav.time, 30 * 1_000_000_000);
    assert_eq!(nav.record_id, 4);
    assert_eq!(nav.horizontal_error, 1.25);
    assert_eq!(nav.vertical_error, -0.3);
    assert_eq!(nav.position_type, "GPS_RTK");

    let samples = index
        .decoded
        .iter()
        .find_map(|(_, r)| match r {
            Record::Attitude(samples) => Some(samples),
            _ => None,
        })
        .unwrap();
    assert_eq!(samples.len(), 3);
    assert_eq!(samples[1].time, 40 * 1_000_000_000 + 100_000_000);
    assert_eq!(samples[1].pitch, 1.6);
    assert_eq!(samples[1].roll, -0.2);
    assert_eq!(samples[1].heave, 0.12);
    assert_eq!(samples[1].heading, 90.1);

    let attitude = index.records.stats(RecordType::Attitude);
    assert_eq!((attitude.records, attitude.measurements), (1, 3));
    let nav = index.records.stats(RecordType::HvNavigationError);
    assert_eq!((nav.records, nav.measurements), (1, 1));
}

#[test]
fn truncated_stream_is_fatal() {
    let mut bytes = GsfWriter::new().header("GSF-v03.09").finish();
    bytes.extend_from_slice(&100u32.to_be_bytes());
    bytes.extend_from_slice(&SWATH_PING.to_be_bytes());
    bytes.extend_from_slice(&[0; 10]);

    let err = FileIndexBuilder::new()
        .build(&mut Cursor::new(bytes))
        .unwrap_err();
    assert!(matches!(
        err,
        GsfError::Truncated {
            expected: 100,
            actual: 10,
            ..
        }
    ));
    assert!(!err.is_recoverable());
}

#[test]
fn checksum_mismatch_is_not_fatal() {
    let data = b"hello".to_vec();
    let mut comment = 0u32.to_be_bytes().to_vec();
    comment.extend_from_slice(&0u32.to_be_bytes());
    comment.extend_from_slice(&(data.len() as u32).to_be_bytes());
    comment.extend_from_slice(&data);

    let bytes = GsfWriter::new()
        .record_with_checksum(COMMENT, &comment, 0xDEAD)
        .finish();
    let index = FileIndexBuilder::new()
        .with_verify_checksums(true)
        .build(&mut Cursor::new(bytes))
        .unwrap();
    assert_eq!(index.records.entries()[0].checksum, Some(0xDEAD));
    assert_eq!(index.comments().next().unwrap().text, "hello");
}

#[test]
fn empty_stream_has_empty_index() {
    let index = index(Vec::new());
    assert!(index.records.is_empty());
    assert!(index.groups.is_empty());
    assert_eq!(index.version, FormatVersion::default());
}
