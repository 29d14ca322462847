//! Scripted stand-in for the sensor and its BLE bridge.
//!
//! [`MockSensor`] sits on the link side of a
//! [`ChannelTransport`](huskyframe::transport::ChannelTransport). It decodes
//! every frame the session writes, queues the replies a real sensor would
//! send, and answers each read trigger with at most sixteen of the queued
//! bytes behind a bridge prefix byte, the way the bridge does.

use bytes::BytesMut;
use huskyframe::{
    envelope::{READ_CHUNK_LEN, is_read_trigger, unwrap_write},
    frame::Frame,
    protocol::Command,
    record::{DetailRecord, SummaryRecord},
    transport::TransportHandle,
};

use crate::frames::{corrupt, detail_frame, notification, ok_frame, summary_frame};

/// How the simulated sensor reacts to requests.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Behaviour {
    /// Replies like a healthy sensor.
    #[default]
    Responsive,
    /// Never replies; read triggers go unanswered.
    Silent,
    /// Replies with every checksum flipped.
    Corrupting,
}

/// What the simulated sensor saw during a run.
#[derive(Debug, Default)]
pub struct SensorLog {
    /// Frames written by the session, in order.
    pub frames: Vec<Frame>,
    /// Read triggers written by the session.
    pub read_triggers: usize,
}

impl SensorLog {
    /// Number of received frames carrying `command`.
    #[must_use]
    pub fn count(&self, command: Command) -> usize {
        self.frames
            .iter()
            .filter(|frame| frame.command() == command)
            .count()
    }

    /// Commands received, in order.
    #[must_use]
    pub fn commands(&self) -> Vec<Command> { self.frames.iter().map(Frame::command).collect() }
}

/// Link-side simulator driving a [`TransportHandle`].
///
/// ```
/// use huskyframe::{session::Session, transport::ChannelTransport};
/// use huskyframe_testing::MockSensor;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let (transport, handle) = ChannelTransport::new();
/// let sensor = tokio::spawn(MockSensor::new(handle).run());
/// let mut session = Session::new(transport);
/// session.initialize().await.expect("sensor answers");
/// drop(session);
/// let log = sensor.await.expect("sensor task");
/// assert_eq!(log.commands(), [huskyframe::protocol::Command::KNOCK]);
/// # }
/// ```
#[derive(Debug)]
pub struct MockSensor {
    handle: TransportHandle,
    behaviour: Behaviour,
    learned_ids: u16,
    frame_number: u16,
    batches: Vec<Vec<DetailRecord>>,
    outbox: BytesMut,
    log: SensorLog,
}

impl MockSensor {
    /// Create a responsive sensor with an empty batch.
    #[must_use]
    pub fn new(handle: TransportHandle) -> Self {
        Self {
            handle,
            behaviour: Behaviour::Responsive,
            learned_ids: 0,
            frame_number: 0,
            batches: Vec::new(),
            outbox: BytesMut::new(),
            log: SensorLog::default(),
        }
    }

    /// Set how the sensor reacts.
    #[must_use]
    pub fn behaviour(mut self, behaviour: Behaviour) -> Self {
        self.behaviour = behaviour;
        self
    }

    /// Set the learned-id count reported in summaries.
    #[must_use]
    pub fn learned_ids(mut self, learned_ids: u16) -> Self {
        self.learned_ids = learned_ids;
        self
    }

    /// Set the records returned by every request.
    #[must_use]
    pub fn batch(self, batch: Vec<DetailRecord>) -> Self { self.batches(vec![batch]) }

    /// Set the records returned by successive requests; the last batch
    /// repeats once the others are used up.
    #[must_use]
    pub fn batches(mut self, batches: Vec<Vec<DetailRecord>>) -> Self {
        self.batches = batches;
        self
    }

    /// Serve the link until the session drops its end.
    pub async fn run(mut self) -> SensorLog {
        while let Some(write) = self.handle.next_write().await {
            if is_read_trigger(&write) {
                self.log.read_triggers += 1;
                self.answer_read();
            } else if let Some(frame) = unwrap_write(&write).and_then(Frame::parse) {
                self.react(&frame);
                self.log.frames.push(frame);
            }
        }
        self.log
    }

    fn answer_read(&mut self) {
        if self.outbox.is_empty() {
            return;
        }
        let take = self.outbox.len().min(usize::from(READ_CHUNK_LEN));
        let chunk = self.outbox.split_to(take);
        self.handle.deliver(notification(&chunk));
    }

    fn react(&mut self, frame: &Frame) {
        if self.behaviour == Behaviour::Silent {
            return;
        }
        let command = frame.command();
        let acknowledged = match command {
            Command::KNOCK | Command::SELECT_ALGORITHM => true,
            // LEARN shares its byte with SET_NAME, FORGET with PHOTO.
            Command::LEARN => frame.content().len() == 2,
            Command::FORGET => frame.content().is_empty(),
            _ => false,
        };
        if acknowledged {
            self.queue(&ok_frame());
        } else if (Command::REQUEST.byte()..=Command::REQUEST_ARROWS_BY_ID.byte())
            .contains(&command.byte())
        {
            self.queue_batch();
        }
    }

    fn queue_batch(&mut self) {
        let served = usize::from(self.frame_number);
        self.frame_number = self.frame_number.wrapping_add(1);
        let batch = self
            .batches
            .get(served)
            .or_else(|| self.batches.last())
            .cloned()
            .unwrap_or_default();
        let count = u16::try_from(batch.len()).unwrap_or(u16::MAX);
        let summary = SummaryRecord {
            count,
            learned_ids: self.learned_ids,
            frame_number: self.frame_number,
            reserved: [0; 2],
        };
        self.queue(&summary_frame(&summary));
        for record in &batch {
            self.queue(&detail_frame(record));
        }
    }

    fn queue(&mut self, frame: &Frame) {
        match self.behaviour {
            Behaviour::Corrupting => self.outbox.extend_from_slice(&corrupt(frame)),
            Behaviour::Responsive | Behaviour::Silent => {
                self.outbox.extend_from_slice(frame.as_bytes());
            }
        }
    }
}
