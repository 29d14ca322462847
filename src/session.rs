//! Request orchestration over a [`Transport`].
//!
//! A [`Session`] owns everything one physical connection needs: the
//! transport, the frame assembler fed from its notifications, and the
//! [`ResultStore`] populated by request cycles. Operations take `&mut self`,
//! so at most one request/response cycle is ever in flight.
//!
//! Every wait is bounded. A poll writes the bridge read trigger, waits up to
//! `read_window` for a notification and feeds it to the assembler; a wait
//! for a reply repeats polls until a matching frame arrives or `poll_window`
//! has passed. A notification stream that has ended fails the wait with
//! [`RequestError::Io`] instead of being polled again.

use std::io;

use bytes::Bytes;
use tokio::time::{Instant, sleep, timeout};

use crate::{
    config::SessionConfig,
    decode::{decode_detail, decode_summary},
    envelope::{notification_payload, read_trigger, wrap_frame},
    error::{EncodeError, RequestError, Result},
    frame::{
        Frame,
        FrameAssembler,
        command_frame,
        osd_text_frame,
        set_name_frame,
        u16_argument_frame,
    },
    metrics,
    protocol::{Algorithm, Command},
    store::ResultStore,
    transport::Transport,
};

/// Argument sent with [`Command::FORGET_DATA`].
const FORGET_DATA_ARGUMENT: u16 = 0x47;
/// Argument sent with [`Command::CLEAR_OSD`].
const CLEAR_OSD_ARGUMENT: u16 = 0x45;
/// Argument sent with [`Command::PHOTO`].
const PHOTO_ARGUMENT: u16 = 0x40;
/// Argument sent with [`Command::SCREENSHOT`].
const SCREENSHOT_ARGUMENT: u16 = 0x49;

/// Which results a request cycle asks the sensor for.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RequestKind {
    /// Every box and arrow.
    All,
    /// Boxes only.
    Blocks,
    /// Arrows only.
    Arrows,
    /// Results matching a learned id.
    Learned,
    /// Boxes matching a learned id.
    BlocksLearned,
    /// Arrows matching a learned id.
    ArrowsLearned,
    /// Results with the given id.
    ById(u16),
    /// Boxes with the given id.
    BlocksById(u16),
    /// Arrows with the given id.
    ArrowsById(u16),
}

impl RequestKind {
    /// Command byte opening the cycle.
    #[must_use]
    pub const fn command(self) -> Command {
        match self {
            Self::All => Command::REQUEST,
            Self::Blocks => Command::REQUEST_BLOCKS,
            Self::Arrows => Command::REQUEST_ARROWS,
            Self::Learned => Command::REQUEST_LEARNED,
            Self::BlocksLearned => Command::REQUEST_BLOCKS_LEARNED,
            Self::ArrowsLearned => Command::REQUEST_ARROWS_LEARNED,
            Self::ById(_) => Command::REQUEST_BY_ID,
            Self::BlocksById(_) => Command::REQUEST_BLOCKS_BY_ID,
            Self::ArrowsById(_) => Command::REQUEST_ARROWS_BY_ID,
        }
    }

    /// Id argument carried by id-scoped requests.
    #[must_use]
    pub const fn id(self) -> Option<u16> {
        match self {
            Self::ById(id) | Self::BlocksById(id) | Self::ArrowsById(id) => Some(id),
            _ => None,
        }
    }

    fn frame(self) -> std::result::Result<Frame, EncodeError> {
        match self.id() {
            Some(id) => u16_argument_frame(self.command(), id),
            None => command_frame(self.command()),
        }
    }
}

/// Image written to the sensor's SD card.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Capture {
    /// Camera photo.
    Photo,
    /// Screenshot including the on-screen overlay.
    Screenshot,
}

/// Outcome of a single poll of the bridge.
enum Poll {
    /// A frame completed.
    Frame(Frame),
    /// Bytes arrived but no frame completed yet.
    Partial,
    /// No sensor bytes arrived within the read window.
    Silent,
}

/// Protocol session for one sensor connection.
///
/// # Examples
///
/// ```no_run
/// use huskyframe::{
///     config::SessionConfig,
///     protocol::Algorithm,
///     record::RecordKind,
///     session::Session,
///     transport::ChannelTransport,
/// };
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() -> huskyframe::error::Result<()> {
/// let (transport, _link) = ChannelTransport::new();
/// let mut session = Session::with_config(transport, SessionConfig::default());
/// session.initialize().await?;
/// session.set_mode(Algorithm::FaceRecognition).await?;
/// let store = session.request_snapshot().await?;
/// println!("{} faces", store.count(RecordKind::Box, None));
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct Session<T> {
    transport: T,
    config: SessionConfig,
    assembler: FrameAssembler,
    pending: Bytes,
    store: ResultStore,
    algorithm: Option<Algorithm>,
}

impl<T: Transport> Session<T> {
    /// Create a session with default timing.
    #[must_use]
    pub fn new(transport: T) -> Self { Self::with_config(transport, SessionConfig::default()) }

    /// Create a session with explicit timing and capacity.
    #[must_use]
    pub fn with_config(transport: T, config: SessionConfig) -> Self {
        let config = config.normalized();
        Self {
            transport,
            store: ResultStore::with_capacity(config.batch_capacity),
            config,
            assembler: FrameAssembler::new(),
            pending: Bytes::new(),
            algorithm: None,
        }
    }

    /// Results of the latest request cycle.
    #[must_use]
    pub fn store(&self) -> &ResultStore { &self.store }

    /// Active configuration.
    #[must_use]
    pub fn config(&self) -> &SessionConfig { &self.config }

    /// Algorithm most recently acknowledged by the sensor.
    #[must_use]
    pub fn algorithm(&self) -> Option<Algorithm> { self.algorithm }

    /// Whether the transport reports a live link.
    #[must_use]
    pub fn is_connected(&self) -> bool { self.transport.is_connected() }

    /// Underlying transport.
    #[must_use]
    pub fn transport(&self) -> &T { &self.transport }

    /// Consume the session, returning its transport.
    #[must_use]
    pub fn into_transport(self) -> T { self.transport }

    /// Knock until the sensor acknowledges.
    ///
    /// # Errors
    ///
    /// Returns [`RequestError::NoAcknowledgement`] once every knock attempt
    /// has gone unanswered, or [`RequestError::Disconnected`] if the link
    /// is down.
    #[tracing::instrument(level = "debug", skip(self))]
    pub async fn initialize(&mut self) -> Result<()> {
        let attempt = self
            .send_until_acknowledged(command_frame(Command::KNOCK)?, self.config.knock_attempts)
            .await?;
        tracing::info!(attempt, "sensor answered knock");
        Ok(())
    }

    /// Switch the sensor to `algorithm`.
    ///
    /// The acknowledgement is awaited until `ack_window` has elapsed.
    ///
    /// # Errors
    ///
    /// Returns [`RequestError::Timeout`] if no acknowledgement arrived in
    /// time, or [`RequestError::Disconnected`] if the link is down.
    #[tracing::instrument(level = "debug", skip(self))]
    pub async fn set_mode(&mut self, algorithm: Algorithm) -> Result<()> {
        self.ensure_connected()?;
        self.send(&u16_argument_frame(Command::SELECT_ALGORITHM, algorithm.wire_value())?)
            .await?;
        let deadline = Instant::now() + self.config.ack_window;
        loop {
            match self
                .wait(Command::SELECT_ALGORITHM, Some(Command::RETURN_OK))
                .await
            {
                Ok(_) => break,
                Err(err) if err.is_timeout() && Instant::now() < deadline => {
                    tracing::debug!("algorithm switch not acknowledged yet");
                }
                Err(err) => return Err(err),
            }
        }
        tracing::info!(?algorithm, "algorithm switched");
        self.algorithm = Some(algorithm);
        Ok(())
    }

    /// Ask for every result and refresh the store.
    ///
    /// # Errors
    ///
    /// See [`request`](Self::request).
    pub async fn request_snapshot(&mut self) -> Result<&ResultStore> {
        self.request(RequestKind::All).await
    }

    /// Run one request cycle: send the request, read the summary, then read
    /// exactly as many detail records as it declares.
    ///
    /// The summary is stored as soon as it is decoded. If a detail frame is
    /// missing or malformed the cycle stops there, and the store keeps the
    /// records read so far alongside older leftovers.
    ///
    /// # Errors
    ///
    /// Returns [`RequestError::Timeout`] when a reply frame does not arrive,
    /// [`RequestError::Decode`] when a reply is not the expected record, or
    /// [`RequestError::Disconnected`] if the link is down.
    #[tracing::instrument(level = "debug", skip(self))]
    pub async fn request(&mut self, kind: RequestKind) -> Result<&ResultStore> {
        self.ensure_connected()?;
        let request = kind.command();
        self.send(&kind.frame()?).await?;

        let info = self.wait(request, Some(Command::RETURN_INFO)).await?;
        let summary = decode_summary(&info)?;
        self.store.set_summary(summary);

        for index in 0..usize::from(summary.count) {
            let frame = self.wait(request, None).await?;
            let record = decode_detail(&frame)?;
            if !self.store.put(index, record) {
                tracing::debug!(index, "record beyond batch capacity dropped");
            }
        }
        tracing::debug!(
            count = summary.count,
            learned = summary.learned_ids,
            "request cycle complete"
        );
        Ok(&self.store)
    }

    /// Learn the current target under `id` without waiting for a reply.
    ///
    /// # Errors
    ///
    /// Returns [`RequestError::Disconnected`] if the link is down.
    pub async fn learn_id(&mut self, id: u16) -> Result<()> {
        self.send_command(&u16_argument_frame(Command::LEARN_ID, id)?).await
    }

    /// Learn the current target under `id` and wait for the acknowledgement.
    ///
    /// # Errors
    ///
    /// Returns [`RequestError::Timeout`] if the sensor does not acknowledge
    /// within one poll window.
    #[tracing::instrument(level = "debug", skip(self))]
    pub async fn learn(&mut self, id: u16) -> Result<()> {
        self.send_command(&u16_argument_frame(Command::LEARN, id)?).await?;
        self.wait(Command::LEARN, Some(Command::RETURN_OK)).await?;
        Ok(())
    }

    /// Forget everything learned by the current algorithm, without waiting.
    ///
    /// # Errors
    ///
    /// Returns [`RequestError::Disconnected`] if the link is down.
    pub async fn forget_learned(&mut self) -> Result<()> {
        self.send_command(&u16_argument_frame(Command::FORGET_DATA, FORGET_DATA_ARGUMENT)?)
            .await
    }

    /// Forget learned data, retrying until acknowledged.
    ///
    /// # Errors
    ///
    /// Returns [`RequestError::NoAcknowledgement`] once every attempt has
    /// gone unanswered.
    #[tracing::instrument(level = "debug", skip(self))]
    pub async fn forget(&mut self) -> Result<()> {
        self.send_until_acknowledged(command_frame(Command::FORGET)?, self.config.forget_attempts)
            .await
            .map(|_| ())
    }

    /// Name a learned id.
    ///
    /// # Errors
    ///
    /// Returns [`RequestError::Encode`] if the name does not fit a frame.
    pub async fn set_name(&mut self, id: u8, name: &str) -> Result<()> {
        self.send_command(&set_name_frame(id, name)?).await
    }

    /// Draw text on the sensor screen at (`x`, `y`).
    ///
    /// # Errors
    ///
    /// Returns [`RequestError::Encode`] if the text does not fit a frame.
    pub async fn show_text(&mut self, text: &str, x: u16, y: u8) -> Result<()> {
        self.send_command(&osd_text_frame(text, x, y)?).await
    }

    /// Clear text drawn with [`show_text`](Self::show_text).
    ///
    /// # Errors
    ///
    /// Returns [`RequestError::Disconnected`] if the link is down.
    pub async fn clear_text(&mut self) -> Result<()> {
        self.send_command(&u16_argument_frame(Command::CLEAR_OSD, CLEAR_OSD_ARGUMENT)?)
            .await
    }

    /// Store a photo or screenshot on the SD card, then wait `settle_delay`.
    ///
    /// # Errors
    ///
    /// Returns [`RequestError::Disconnected`] if the link is down.
    pub async fn take_photo(&mut self, capture: Capture) -> Result<()> {
        let frame = match capture {
            Capture::Photo => u16_argument_frame(Command::PHOTO, PHOTO_ARGUMENT)?,
            Capture::Screenshot => u16_argument_frame(Command::SCREENSHOT, SCREENSHOT_ARGUMENT)?,
        };
        self.send_and_settle(&frame).await
    }

    /// Save the current model to SD card `slot`, then wait `settle_delay`.
    ///
    /// # Errors
    ///
    /// Returns [`RequestError::Disconnected`] if the link is down.
    pub async fn save_model(&mut self, slot: u16) -> Result<()> {
        self.send_and_settle(&u16_argument_frame(Command::SAVE_MODEL, slot)?)
            .await
    }

    /// Load a model from SD card `slot`, then wait `settle_delay`.
    ///
    /// # Errors
    ///
    /// Returns [`RequestError::Disconnected`] if the link is down.
    pub async fn load_model(&mut self, slot: u16) -> Result<()> {
        self.send_and_settle(&u16_argument_frame(Command::LOAD_MODEL, slot)?)
            .await
    }

    fn ensure_connected(&self) -> Result<()> {
        if self.transport.is_connected() {
            Ok(())
        } else {
            tracing::debug!("transport disconnected, skipping operation");
            Err(RequestError::Disconnected)
        }
    }

    async fn send(&mut self, frame: &Frame) -> Result<()> {
        tracing::debug!(command = %frame.command(), len = frame.len(), "sending frame");
        self.transport.write(wrap_frame(frame)).await.map_err(|err| {
            tracing::warn!(error = %err, "transport write failed");
            RequestError::from(err)
        })
    }

    async fn send_command(&mut self, frame: &Frame) -> Result<()> {
        self.ensure_connected()?;
        self.send(frame).await
    }

    async fn send_and_settle(&mut self, frame: &Frame) -> Result<()> {
        self.send_command(frame).await?;
        sleep(self.config.settle_delay).await;
        Ok(())
    }

    /// Send `frame` up to `attempts` times, each followed by one wait for
    /// [`Command::RETURN_OK`]. Returns the attempt that was acknowledged.
    async fn send_until_acknowledged(&mut self, frame: Frame, attempts: u32) -> Result<u32> {
        self.ensure_connected()?;
        let request = frame.command();
        for attempt in 1..=attempts {
            self.send(&frame).await?;
            match self.wait(request, Some(Command::RETURN_OK)).await {
                Ok(_) => return Ok(attempt),
                Err(err) if err.is_timeout() => {
                    tracing::debug!(attempt, %request, "no acknowledgement, retrying");
                }
                Err(err) => return Err(err),
            }
        }
        Err(RequestError::NoAcknowledgement { attempts })
    }

    /// Wait up to one poll window for a reply to `request`.
    ///
    /// With `expected` set, frames carrying other commands are skipped;
    /// otherwise the first frame is returned. A poll that receives nothing
    /// ends the wait early.
    async fn wait(&mut self, request: Command, expected: Option<Command>) -> Result<Frame> {
        let deadline = Instant::now() + self.config.poll_window;
        loop {
            match self.poll().await? {
                Poll::Frame(frame) => match expected {
                    Some(command) if frame.command() != command => {
                        tracing::debug!(
                            expected = %command,
                            actual = %frame.command(),
                            "skipping unrelated frame"
                        );
                    }
                    _ => return Ok(frame),
                },
                Poll::Partial => {}
                Poll::Silent => break,
            }
            if Instant::now() >= deadline {
                break;
            }
        }
        metrics::inc_timeouts();
        tracing::debug!(%request, "no reply within poll window");
        Err(RequestError::Timeout { request })
    }

    /// Complete one frame from buffered bytes, or trigger a bridge read and
    /// feed what it returns.
    async fn poll(&mut self) -> Result<Poll> {
        if !self.pending.is_empty() {
            let pending = std::mem::take(&mut self.pending);
            if let Some(frame) = self.feed(pending) {
                return Ok(Poll::Frame(frame));
            }
        }
        self.transport.write(read_trigger()).await?;
        match timeout(self.config.read_window, self.transport.next_chunk()).await {
            Ok(Some(chunk)) => {
                let payload = notification_payload(&chunk);
                if payload.is_empty() {
                    return Ok(Poll::Silent);
                }
                Ok(self.feed(payload).map_or(Poll::Partial, Poll::Frame))
            }
            Ok(None) => {
                tracing::warn!("transport closed its notification stream");
                Err(RequestError::Io(io::Error::new(
                    io::ErrorKind::BrokenPipe,
                    "notification stream closed",
                )))
            }
            Err(_) => Ok(Poll::Silent),
        }
    }

    /// Feed bytes until a frame completes; keep whatever follows it.
    fn feed(&mut self, bytes: Bytes) -> Option<Frame> {
        let (consumed, frame) = self.assembler.feed_until_frame(&bytes);
        if frame.is_some() {
            self.pending = bytes.slice(consumed..);
        }
        frame
    }
}
