//! End-to-end tests driving a [`Session`] against the simulated sensor.
//!
//! Time is paused, so every bounded wait resolves instantly and the elapsed
//! virtual time can be asserted exactly.

use std::time::Duration;

use huskyframe::{
    config::SessionConfig,
    error::RequestError,
    protocol::{Algorithm, Command},
    record::{ArrowRecord, BoxRecord, DetailRecord, RecordKind},
    session::{RequestKind, Session},
    transport::ChannelTransport,
};
use huskyframe_testing::{Behaviour, MockSensor, SensorLog};
use rstest::{fixture, rstest};
use tokio::{task::JoinHandle, time::Instant};

fn block(id: u16, x: u16, y: u16) -> DetailRecord {
    DetailRecord::Box(BoxRecord::from_fields([x, y, 20, 30, id]))
}

fn arrow(id: u16) -> DetailRecord {
    DetailRecord::Arrow(ArrowRecord::from_fields([10, 20, 30, 40, id]))
}

fn start(
    sensor: impl FnOnce(MockSensor) -> MockSensor,
    config: SessionConfig,
) -> (Session<ChannelTransport>, JoinHandle<SensorLog>) {
    let (transport, handle) = ChannelTransport::new();
    let task = tokio::spawn(sensor(MockSensor::new(handle)).run());
    (Session::with_config(transport, config), task)
}

async fn finish(session: Session<ChannelTransport>, task: JoinHandle<SensorLog>) -> SensorLog {
    drop(session);
    task.await.expect("sensor task completes")
}

#[fixture]
fn config() -> SessionConfig { SessionConfig::default() }

#[rstest]
#[tokio::test(start_paused = true)]
async fn snapshot_fills_store_with_summary_and_records(config: SessionConfig) {
    let (mut session, task) = start(
        |sensor| sensor.learned_ids(2).batch(vec![block(1, 100, 50), arrow(2)]),
        config,
    );

    let store = session.request_snapshot().await.expect("snapshot");
    assert_eq!(store.count_boxes(None), 1);
    assert_eq!(store.count_arrows(None), 1);
    assert_eq!(store.learned_id_count(), 2);
    assert_eq!(store.nth(RecordKind::Box, 1), Some(&block(1, 100, 50)));
    assert_eq!(store.first_with_id(RecordKind::Arrow, 2), Some(&arrow(2)));
    assert!(store.is_learned(2));
    assert!(!store.is_learned(3));

    let log = finish(session, task).await;
    assert_eq!(log.commands(), [Command::REQUEST]);
}

#[rstest]
#[tokio::test(start_paused = true)]
async fn silent_sensor_gets_exactly_five_knocks(config: SessionConfig) {
    let read_window = config.read_window;
    let (mut session, task) = start(|sensor| sensor.behaviour(Behaviour::Silent), config);

    let started = Instant::now();
    let err = session.initialize().await.expect_err("no answer");
    let elapsed = started.elapsed();

    assert!(matches!(err, RequestError::NoAcknowledgement { attempts: 5 }));
    assert_eq!(elapsed, read_window * 5);

    let log = finish(session, task).await;
    assert_eq!(log.count(Command::KNOCK), 5);
    assert_eq!(log.read_triggers, 5);
}

#[rstest]
#[tokio::test(start_paused = true)]
async fn knock_attempts_follow_configuration(config: SessionConfig) {
    let (mut session, task) = start(
        |sensor| sensor.behaviour(Behaviour::Silent),
        config.knock_attempts(2),
    );
    let err = session.initialize().await.expect_err("no answer");
    assert!(matches!(err, RequestError::NoAcknowledgement { attempts: 2 }));
    assert_eq!(finish(session, task).await.count(Command::KNOCK), 2);
}

#[rstest]
#[tokio::test(start_paused = true)]
async fn handshake_and_mode_switch(config: SessionConfig) {
    let (mut session, task) = start(|sensor| sensor, config);

    session.initialize().await.expect("knock answered");
    session
        .set_mode(Algorithm::ObjectTracking)
        .await
        .expect("mode acknowledged");
    assert_eq!(session.algorithm(), Some(Algorithm::ObjectTracking));

    let log = finish(session, task).await;
    assert_eq!(log.commands(), [Command::KNOCK, Command::SELECT_ALGORITHM]);
    assert_eq!(log.frames[1].content(), [1, 0]);
}

#[rstest]
#[tokio::test(start_paused = true)]
async fn mode_switch_gives_up_after_ack_window(config: SessionConfig) {
    let ack_window = config.ack_window;
    let (mut session, task) = start(|sensor| sensor.behaviour(Behaviour::Silent), config);

    let started = Instant::now();
    let err = session
        .set_mode(Algorithm::QrRecognition)
        .await
        .expect_err("no acknowledgement");
    assert!(err.is_timeout());
    assert!(started.elapsed() >= ack_window);
    assert!(started.elapsed() < ack_window * 2);
    assert_eq!(session.algorithm(), None);
    finish(session, task).await;
}

#[rstest]
#[tokio::test(start_paused = true)]
async fn corrupted_replies_are_never_accepted(config: SessionConfig) {
    let (mut session, task) = start(
        |sensor| {
            sensor
                .behaviour(Behaviour::Corrupting)
                .batch(vec![block(1, 1, 1)])
        },
        config,
    );

    let err = session.request_snapshot().await.expect_err("all frames corrupt");
    assert!(matches!(err, RequestError::Timeout {
        request: Command::REQUEST
    }));
    assert_eq!(session.store().summary().count, 0);
    finish(session, task).await;
}

#[rstest]
#[tokio::test(start_paused = true)]
async fn smaller_batch_leaves_stale_slots_visible_to_nth(config: SessionConfig) {
    let (mut session, task) = start(
        |sensor| {
            sensor.batches(vec![
                vec![block(1, 10, 10), block(2, 20, 20), block(3, 30, 30)],
                vec![arrow(4)],
            ])
        },
        config,
    );

    session.request_snapshot().await.expect("first snapshot");
    let store = session.request_snapshot().await.expect("second snapshot");

    assert_eq!(store.summary().count, 1);
    assert_eq!(store.count_boxes(None), 0);
    assert_eq!(store.nth(RecordKind::Arrow, 1), Some(&arrow(4)));
    // Slots beyond the count still hold the first batch.
    assert_eq!(store.nth(RecordKind::Box, 2), Some(&block(2, 20, 20)));
    assert_eq!(store.nth_with_id(RecordKind::Box, 2, 1), None);
    finish(session, task).await;
}

#[rstest]
#[tokio::test(start_paused = true)]
async fn batch_beyond_capacity_is_truncated(config: SessionConfig) {
    let records: Vec<DetailRecord> = (1..=4).map(|id| block(id, id, id)).collect();
    let (mut session, task) = start(|sensor| sensor.batch(records), config.batch_capacity(2));

    let store = session.request_snapshot().await.expect("snapshot");
    assert_eq!(store.summary().count, 4);
    assert_eq!(store.count_boxes(None), 2);
    assert_eq!(store.nth(RecordKind::Box, 3), None);
    finish(session, task).await;
}

#[rstest]
#[case(RequestKind::Blocks, Command::REQUEST_BLOCKS, 0)]
#[case(RequestKind::ById(7), Command::REQUEST_BY_ID, 2)]
#[case(RequestKind::ArrowsById(3), Command::REQUEST_ARROWS_BY_ID, 2)]
#[tokio::test(start_paused = true)]
async fn request_variants_send_their_command(
    config: SessionConfig,
    #[case] kind: RequestKind,
    #[case] command: Command,
    #[case] content_len: usize,
) {
    let (mut session, task) = start(|sensor| sensor.batch(vec![arrow(3)]), config);
    let store = session.request(kind).await.expect("reply");
    assert_eq!(store.count_arrows(Some(3)), 1);

    let log = finish(session, task).await;
    assert_eq!(log.commands(), [command]);
    assert_eq!(log.frames[0].content().len(), content_len);
}

#[rstest]
#[tokio::test(start_paused = true)]
async fn learning_commands_round_trip(config: SessionConfig) {
    let (mut session, task) = start(|sensor| sensor, config);

    session.learn(1).await.expect("learn acknowledged");
    session.forget().await.expect("forget acknowledged");
    session.learn_id(2).await.expect("sent");
    session.set_name(2, "mug").await.expect("sent");
    session.forget_learned().await.expect("sent");

    let log = finish(session, task).await;
    assert_eq!(log.commands(), [
        Command::LEARN,
        Command::FORGET,
        Command::LEARN_ID,
        Command::SET_NAME,
        Command::FORGET_DATA,
    ]);
}

#[rstest]
#[tokio::test(start_paused = true)]
async fn unanswered_forget_retries(config: SessionConfig) {
    let (mut session, task) = start(|sensor| sensor.behaviour(Behaviour::Silent), config);
    let err = session.forget().await.expect_err("no answer");
    assert!(matches!(err, RequestError::NoAcknowledgement { attempts: 5 }));
    assert_eq!(finish(session, task).await.count(Command::FORGET), 5);
}

#[rstest]
#[tokio::test(start_paused = true)]
async fn sd_card_commands_wait_settle_delay(config: SessionConfig) {
    let settle = config.settle_delay;
    let (mut session, task) = start(|sensor| sensor, config);

    let started = Instant::now();
    session.save_model(1).await.expect("sent");
    session.load_model(1).await.expect("sent");
    assert_eq!(started.elapsed(), settle * 2);

    let log = finish(session, task).await;
    assert_eq!(log.commands(), [Command::SAVE_MODEL, Command::LOAD_MODEL]);
}

#[rstest]
#[tokio::test(start_paused = true)]
async fn dropped_link_skips_io(config: SessionConfig) {
    let (transport, handle) = ChannelTransport::new();
    handle.set_connected(false);
    let task = tokio::spawn(MockSensor::new(handle).run());
    let mut session = Session::with_config(transport, config);

    let started = Instant::now();
    assert!(matches!(
        session.set_mode(Algorithm::FaceRecognition).await,
        Err(RequestError::Disconnected)
    ));
    assert!(matches!(
        session.save_model(0).await,
        Err(RequestError::Disconnected)
    ));
    assert_eq!(started.elapsed(), Duration::ZERO);

    let log = finish(session, task).await;
    assert!(log.frames.is_empty());
    assert_eq!(log.read_triggers, 0);
}
