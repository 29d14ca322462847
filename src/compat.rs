//! Sentinel-valued facade for block-style callers.
//!
//! Visual-programming surfaces expect every reporter to return a plain
//! number or boolean. [`LegacyLens`] wraps a [`Session`] and flattens its
//! `Result` and `Option` values into the conventions those surfaces were
//! written against:
//!
//! - disconnected link: numeric readers return `0`, predicates `false`;
//! - record not found: field readers return `-1`;
//! - failed commands are logged and otherwise ignored.

use crate::{
    error::Result,
    protocol::Algorithm,
    record::{DetailRecord, RecordField, RecordKind},
    session::{Capture, RequestKind, Session},
    store::ResultStore,
    transport::Transport,
};

/// Value returned by field readers when no record matches.
pub const NOT_FOUND: i32 = -1;

/// Legacy reporter surface over a [`Session`].
///
/// # Examples
///
/// ```
/// use huskyframe::{compat::LegacyLens, record::BoxField, session::Session, transport::ChannelTransport};
///
/// let (transport, _link) = ChannelTransport::new();
/// let lens = LegacyLens::new(Session::new(transport));
/// assert_eq!(lens.nearest(BoxField::XCenter), -1);
/// assert_eq!(lens.count_boxes(None), 0);
/// ```
#[derive(Debug)]
pub struct LegacyLens<T> {
    session: Session<T>,
}

impl<T: Transport> LegacyLens<T> {
    /// Wrap a session.
    #[must_use]
    pub fn new(session: Session<T>) -> Self { Self { session } }

    /// Wrapped session.
    #[must_use]
    pub fn session(&self) -> &Session<T> { &self.session }

    /// Mutable access to the wrapped session.
    pub fn session_mut(&mut self) -> &mut Session<T> { &mut self.session }

    /// Knock until the sensor answers; failure is only logged.
    pub async fn initialize(&mut self) {
        if let Err(error) = self.session.initialize().await {
            tracing::debug!(%error, "knock handshake failed");
        }
    }

    /// Switch algorithm, reporting whether the sensor acknowledged.
    pub async fn set_mode(&mut self, algorithm: Algorithm) -> bool {
        self.session.set_mode(algorithm).await.is_ok()
    }

    /// Refresh results, reporting whether the cycle completed.
    pub async fn request(&mut self) -> bool { self.request_kind(RequestKind::All).await }

    /// Refresh results of one request kind.
    pub async fn request_kind(&mut self, kind: RequestKind) -> bool {
        match self.session.request(kind).await {
            Ok(_) => true,
            Err(error) => {
                tracing::debug!(%error, ?kind, "request cycle produced no new data");
                false
            }
        }
    }

    /// Number of learned ids, or `0` when disconnected.
    #[must_use]
    pub fn learned_ids(&self) -> i32 { self.number(|store| i32::from(store.learned_id_count())) }

    /// Whether `id` has been learned.
    #[must_use]
    pub fn is_learned(&self, id: u16) -> bool { self.predicate(|store| store.is_learned(id)) }

    /// Whether any record of `kind` is on screen.
    #[must_use]
    pub fn appears(&self, kind: RecordKind) -> bool { self.predicate(|store| store.appears(kind)) }

    /// Whether a record of `kind` with `id` is on screen.
    #[must_use]
    pub fn appears_with_id(&self, kind: RecordKind, id: u16) -> bool {
        self.predicate(|store| store.appears_with_id(kind, id))
    }

    /// Number of boxes, optionally with one id.
    #[must_use]
    pub fn count_boxes(&self, id: Option<u16>) -> i32 {
        self.number(|store| saturating_i32(store.count_boxes(id)))
    }

    /// Number of arrows, optionally with one id.
    #[must_use]
    pub fn count_arrows(&self, id: Option<u16>) -> i32 {
        self.number(|store| saturating_i32(store.count_arrows(id)))
    }

    /// Field of the record nearest the image centre.
    #[must_use]
    pub fn nearest<F: RecordField>(&self, field: F) -> i32 {
        self.field(field, |store| store.nearest_to_center(F::KIND))
    }

    /// Field of the first record with `id`.
    #[must_use]
    pub fn first_with_id<F: RecordField>(&self, id: u16, field: F) -> i32 {
        self.field(field, |store| store.first_with_id(F::KIND, id))
    }

    /// Field of the `n`th (1-based) record with `id`.
    #[must_use]
    pub fn nth_with_id<F: RecordField>(&self, id: u16, n: usize, field: F) -> i32 {
        self.field(field, |store| store.nth_with_id(F::KIND, id, n))
    }

    /// Field of batch slot `n` (1-based), if it holds the selector's kind.
    #[must_use]
    pub fn nth<F: RecordField>(&self, n: usize, field: F) -> i32 {
        self.field(field, |store| store.nth(F::KIND, n))
    }

    /// Learn under `id` without waiting.
    pub async fn learn_id(&mut self, id: u16) { ignore(self.session.learn_id(id).await); }

    /// Learn under `id`, reporting whether the sensor acknowledged.
    pub async fn learn(&mut self, id: u16) -> bool { self.session.learn(id).await.is_ok() }

    /// Forget learned data, reporting whether the sensor acknowledged.
    pub async fn forget(&mut self) -> bool { self.session.forget().await.is_ok() }

    /// Forget learned data without waiting.
    pub async fn forget_learned(&mut self) {
        ignore(self.session.forget_learned().await);
    }

    /// Name a learned id.
    pub async fn set_name(&mut self, id: u8, name: &str) {
        ignore(self.session.set_name(id, name).await);
    }

    /// Draw text on the sensor screen.
    pub async fn show_text(&mut self, text: &str, x: u16, y: u8) {
        ignore(self.session.show_text(text, x, y).await);
    }

    /// Clear drawn text.
    pub async fn clear_text(&mut self) { ignore(self.session.clear_text().await); }

    /// Store a photo or screenshot.
    pub async fn take_photo(&mut self, capture: Capture) {
        ignore(self.session.take_photo(capture).await);
    }

    /// Save the model to an SD card slot.
    pub async fn save_model(&mut self, slot: u16) {
        ignore(self.session.save_model(slot).await);
    }

    /// Load the model from an SD card slot.
    pub async fn load_model(&mut self, slot: u16) {
        ignore(self.session.load_model(slot).await);
    }

    fn number(&self, read: impl FnOnce(&ResultStore) -> i32) -> i32 {
        if self.session.is_connected() {
            read(self.session.store())
        } else {
            0
        }
    }

    fn predicate(&self, read: impl FnOnce(&ResultStore) -> bool) -> bool {
        self.session.is_connected() && read(self.session.store())
    }

    fn field<F: RecordField>(
        &self,
        field: F,
        find: impl FnOnce(&ResultStore) -> Option<&DetailRecord>,
    ) -> i32 {
        self.number(|store| {
            find(store)
                .and_then(|record| record.get(field))
                .map_or(NOT_FOUND, i32::from)
        })
    }
}

fn ignore(result: Result<()>) {
    if let Err(error) = result {
        tracing::debug!(%error, "command dropped");
    }
}

fn saturating_i32(value: usize) -> i32 { i32::try_from(value).unwrap_or(i32::MAX) }
