use std::time::Duration;

use oxitel_capture::config::CycleConfig;
use oxitel_capture::reader::FrameReader;
use oxitel_capture::transport::mock::{MockSource, MockStep, synthetic_payload};
use oxitel_capture::transport::TransportError;
use oxitel_capture::{CycleError, run_cycle};
use oxitel_core::protocol::decode_vitals;
use tokio_util::sync::CancellationToken;

fn fast_cycle(sample_count: usize) -> CycleConfig {
    CycleConfig {
        sample_count,
        interval_secs: 0,
        strict_bcd: false,
        scan_timeout_secs: None,
    }
}

fn lenient_reader() -> FrameReader {
    FrameReader::new(false, None)
}

/// Sync marker followed by a full payload carrying the given vitals.
fn framed(heart_rate: u16, spo2: u16) -> Vec<u8> {
    let mut bytes = vec![0xFA];
    bytes.extend_from_slice(&synthetic_payload(heart_rate, spo2));
    bytes
}

#[tokio::test]
async fn five_constant_samples_average_exactly() {
    let steps = (0..5).map(|_| MockStep::Bytes(framed(78, 95))).collect();
    let mut source = MockSource::new(steps);

    let record = run_cycle(
        &mut source,
        &lenient_reader(),
        &fast_cycle(5),
        &CancellationToken::new(),
    )
    .await
    .unwrap();

    assert_eq!(record.avg_heart_rate, 78.0);
    assert_eq!(record.avg_spo2, 95.0);
    assert_eq!(record.measured_on, jiff::Zoned::now().date());
}

#[tokio::test]
async fn garbage_before_marker_is_discarded() {
    let mut bytes = vec![0x12, 0x00, 0x99, 0xB7];
    bytes.extend_from_slice(&framed(72, 98));
    let mut source = MockSource::from_bytes(bytes);

    let frame = lenient_reader()
        .next_frame(&mut source, &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(frame.len(), 10);
    let sample = decode_vitals(frame.as_bytes()).unwrap();
    assert_eq!(sample.heart_rate, 72);
    assert_eq!(sample.spo2, 98);
}

#[tokio::test]
async fn short_frames_skip_their_slot_only() {
    // Slots 0 and 4 succeed; slots 1-3 deliver truncated frames.
    let mut steps = vec![MockStep::Bytes(framed(60, 94))];
    for _ in 0..3 {
        steps.push(MockStep::Bytes(vec![0xFA, 0x01, 0x02, 0x03]));
        steps.push(MockStep::Timeout);
    }
    steps.push(MockStep::Bytes(framed(80, 96)));
    let mut source = MockSource::new(steps);

    let record = run_cycle(
        &mut source,
        &lenient_reader(),
        &fast_cycle(5),
        &CancellationToken::new(),
    )
    .await
    .unwrap();

    assert_eq!(record.avg_heart_rate, 70.0);
    assert_eq!(record.avg_spo2, 95.0);
}

#[tokio::test]
async fn all_short_frames_yield_zero_averages() {
    let mut steps = Vec::new();
    for _ in 0..5 {
        steps.push(MockStep::Bytes(vec![0xFA, 0x01, 0x02]));
        steps.push(MockStep::Timeout);
    }
    let mut source = MockSource::new(steps);

    let record = run_cycle(
        &mut source,
        &lenient_reader(),
        &fast_cycle(5),
        &CancellationToken::new(),
    )
    .await
    .unwrap();

    assert_eq!(record.avg_heart_rate, 0.0);
    assert_eq!(record.avg_spo2, 0.0);
}

#[tokio::test]
async fn closed_stream_skips_remaining_slots() {
    // Two frames on the wire, five attempts configured.
    let steps = vec![
        MockStep::Bytes(framed(64, 97)),
        MockStep::Bytes(framed(66, 99)),
    ];
    let mut source = MockSource::new(steps);

    let record = run_cycle(
        &mut source,
        &lenient_reader(),
        &fast_cycle(5),
        &CancellationToken::new(),
    )
    .await
    .unwrap();

    assert_eq!(record.avg_heart_rate, 65.0);
    assert_eq!(record.avg_spo2, 98.0);
}

#[tokio::test]
async fn backlog_is_flushed_before_each_scan() {
    // A stale frame sits in the buffer; only the scripted frame may decode.
    let mut source =
        MockSource::from_bytes(framed(61, 93)).with_backlog(framed(99, 80));

    let frame = lenient_reader()
        .next_frame(&mut source, &CancellationToken::new())
        .await
        .unwrap();

    let sample = decode_vitals(frame.as_bytes()).unwrap();
    assert_eq!(sample.heart_rate, 61);
    assert_eq!(sample.spo2, 93);
    assert_eq!(source.flush_count(), 1);
}

#[tokio::test]
async fn strict_reader_skips_frames_with_hex_nibbles() {
    // Payload byte 0x7F fails strict decoding; the lenient frame passes.
    let mut bad = vec![0xFA];
    let mut payload = synthetic_payload(0, 95);
    payload[3] = 0x7F;
    bad.extend_from_slice(&payload);

    let steps = vec![MockStep::Bytes(bad), MockStep::Bytes(framed(75, 96))];
    let mut source = MockSource::new(steps);

    let strict_reader = FrameReader::new(true, None);
    let record = run_cycle(
        &mut source,
        &strict_reader,
        &fast_cycle(2),
        &CancellationToken::new(),
    )
    .await
    .unwrap();

    assert_eq!(record.avg_heart_rate, 75.0);
    assert_eq!(record.avg_spo2, 96.0);
}

#[tokio::test]
async fn cancelled_cycle_emits_no_record() {
    let mut source = MockSource::from_bytes(framed(78, 95));
    let cancel = CancellationToken::new();
    cancel.cancel();

    let result = run_cycle(&mut source, &lenient_reader(), &fast_cycle(5), &cancel).await;

    assert!(matches!(result, Err(CycleError::Cancelled)));
}

#[tokio::test]
async fn scan_deadline_bounds_the_marker_hunt() {
    // No marker ever arrives; the configured deadline must end the scan.
    let mut source = MockSource::new(vec![MockStep::Bytes(vec![0x00; 4])]);
    let reader = FrameReader::new(false, Some(Duration::ZERO));

    let result = reader
        .next_frame(&mut source, &CancellationToken::new())
        .await;

    assert!(matches!(result, Err(TransportError::SyncTimeout(_))));
}

#[tokio::test]
async fn synthetic_source_sustains_a_full_cycle() {
    let mut source = MockSource::synthetic(5);

    let record = run_cycle(
        &mut source,
        &lenient_reader(),
        &fast_cycle(5),
        &CancellationToken::new(),
    )
    .await
    .unwrap();

    // Generated vitals stay in their configured bands.
    assert!(record.avg_heart_rate >= 55.0 && record.avg_heart_rate < 110.0);
    assert!(record.avg_spo2 >= 90.0 && record.avg_spo2 < 100.0);
}
