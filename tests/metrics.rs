#![cfg(feature = "metrics")]
//! Tests for the `huskyframe` counters.
//!
//! Each test installs a thread-local `DebuggingRecorder`; async cases run a
//! paused current-thread runtime inside the recorder scope so every task
//! records into it.

use std::future::Future;

use huskyframe::{
    frame::{FrameAssembler, command_frame},
    metrics::{FRAMES_REJECTED, FRAMES_TOTAL, TIMEOUTS_TOTAL},
    protocol::Command,
    session::Session,
    transport::ChannelTransport,
};
use huskyframe_testing::{Behaviour, MockSensor, counter_value, debugging_recorder};
use rstest::rstest;

fn block_on_paused<F: Future>(future: F) -> F::Output {
    tokio::runtime::Builder::new_current_thread()
        .enable_time()
        .start_paused(true)
        .build()
        .expect("runtime")
        .block_on(future)
}

#[test]
fn encoded_frames_count_as_outbound() {
    let (snapshotter, recorder) = debugging_recorder();
    metrics::with_local_recorder(&recorder, || {
        command_frame(Command::KNOCK).expect("knock");
        command_frame(Command::REQUEST).expect("request");
    });

    assert_eq!(
        counter_value(&snapshotter, FRAMES_TOTAL, Some(("direction", "outbound"))),
        2
    );
    assert_eq!(
        counter_value(&snapshotter, FRAMES_TOTAL, Some(("direction", "inbound"))),
        0
    );
}

#[test]
fn assembled_frames_count_as_inbound() {
    let (snapshotter, recorder) = debugging_recorder();
    metrics::with_local_recorder(&recorder, || {
        let mut assembler = FrameAssembler::new();
        let (_, frame) = assembler.feed_until_frame(&[0x55, 0xAA, 0x11, 0x00, 0x2E, 0x3E]);
        assert!(frame.is_some());
    });

    assert_eq!(
        counter_value(&snapshotter, FRAMES_TOTAL, Some(("direction", "inbound"))),
        1
    );
}

#[rstest]
#[case(&[0x55, 0xAA, 0x11, 0x00, 0x2E, 0x3F], "checksum_mismatch")]
#[case(&[0x55, 0xAA, 0x11, 0x7A], "oversized_length")]
#[case(&[0x55, 0x00], "bad_header")]
fn rejected_frames_are_labelled_by_reason(#[case] bytes: &[u8], #[case] reason: &str) {
    let (snapshotter, recorder) = debugging_recorder();
    metrics::with_local_recorder(&recorder, || {
        let mut assembler = FrameAssembler::new();
        for byte in bytes {
            assembler.feed(*byte);
        }
    });

    assert_eq!(
        counter_value(&snapshotter, FRAMES_REJECTED, Some(("reason", reason))),
        1
    );
    assert_eq!(counter_value(&snapshotter, FRAMES_REJECTED, None), 1);
}

#[test]
fn unanswered_knocks_count_one_timeout_each() {
    let (snapshotter, recorder) = debugging_recorder();
    metrics::with_local_recorder(&recorder, || {
        block_on_paused(async {
            let (transport, handle) = ChannelTransport::new();
            let sensor = tokio::spawn(
                MockSensor::new(handle)
                    .behaviour(Behaviour::Silent)
                    .run(),
            );
            let mut session = Session::new(transport);
            assert!(session.initialize().await.is_err());
            drop(session);
            sensor.await.expect("sensor task");
        });
    });

    assert_eq!(counter_value(&snapshotter, TIMEOUTS_TOTAL, None), 5);
}

#[test]
fn answered_snapshot_records_no_timeout() {
    let (snapshotter, recorder) = debugging_recorder();
    metrics::with_local_recorder(&recorder, || {
        block_on_paused(async {
            let (transport, handle) = ChannelTransport::new();
            let sensor = tokio::spawn(MockSensor::new(handle).run());
            let mut session = Session::new(transport);
            session.request_snapshot().await.expect("empty snapshot");
            drop(session);
            sensor.await.expect("sensor task");
        });
    });

    assert_eq!(counter_value(&snapshotter, TIMEOUTS_TOTAL, None), 0);
    assert!(counter_value(&snapshotter, FRAMES_TOTAL, Some(("direction", "inbound"))) >= 1);
}
