//! The single outstanding write request and how it gets committed to a tag

use std::fmt;

use nfcman_macros::impl_default_for;
use nfcman_ndef::{NdefMessage, NdefRecord};
use nfcman_util::result_ext::ResultExt as _;
use tracing::{debug, info};

use crate::{
    tag::{NdefTagInfo, TagTechnology},
    transport::{TagTransport, TechConnection},
};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error, uniffi::Error)]
pub enum WriteError {
    #[error("tag discovery is not registered, register for tag events first")]
    NotRegistered,

    #[error("a write request is already pending, only one is allowed at a time")]
    AlreadyPending,

    #[error("no write request is pending")]
    NoPendingRequest,

    #[error("write request was cancelled")]
    Cancelled,

    #[error("tag does not support NDEF")]
    UnsupportedTag,

    #[error("tag is not writable")]
    NotWritable,

    #[error("message needs {needed} bytes, tag holds {capacity}")]
    InsufficientCapacity { needed: u32, capacity: u32 },

    #[error("write failed: {0}")]
    Io(String),

    #[error("invalid write payload: {0}")]
    InvalidPayload(String),
}

type Error = WriteError;
type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, Clone, PartialEq, Eq, uniffi::Enum)]
pub enum WriteOutcome {
    Written,
    Failed(WriteError),
}

impl From<Result<()>> for WriteOutcome {
    fn from(result: Result<()>) -> Self {
        match result {
            Ok(()) => WriteOutcome::Written,
            Err(error) => WriteOutcome::Failed(error),
        }
    }
}

#[uniffi::export(callback_interface)]
pub trait WriteCallback: Send + Sync + fmt::Debug + 'static {
    /// Called exactly once per submitted request
    fn on_complete(&self, outcome: WriteOutcome);
}

impl WriteCallback for flume::Sender<WriteOutcome> {
    fn on_complete(&self, outcome: WriteOutcome) {
        if let Err(error) = self.try_send(outcome) {
            debug!("write outcome dropped, receiver is gone: {error}");
        }
    }
}

/// Completion side of a write request, consumed when it fires
#[derive(Debug)]
pub struct CompletionSink(Box<dyn WriteCallback>);

impl CompletionSink {
    pub fn new(callback: Box<dyn WriteCallback>) -> Self {
        Self(callback)
    }

    pub fn complete(self, outcome: impl Into<WriteOutcome>) {
        self.0.on_complete(outcome.into());
    }
}

#[derive(Debug)]
pub struct WriteRequest {
    message: NdefMessage,
    sink: CompletionSink,
}

impl WriteRequest {
    pub fn new(message: NdefMessage, sink: CompletionSink) -> Self {
        Self { message, sink }
    }

    pub fn message(&self) -> &NdefMessage {
        &self.message
    }

    pub fn complete(self, outcome: impl Into<WriteOutcome>) {
        self.sink.complete(outcome);
    }
}

/// A submission the coordinator refused, handed back so its sink can be told
#[derive(Debug)]
pub struct Rejected {
    pub error: WriteError,
    pub request: WriteRequest,
}

impl Rejected {
    /// Tell the request's sink why it was refused, returning the reason
    pub fn notify(self) -> WriteError {
        self.request.complete(Err(self.error.clone()));
        self.error
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, derive_more::Display, uniffi::Enum)]
pub enum WriteState {
    Idle,
    Pending,
}

#[derive(Debug, Default)]
enum WriteSlot {
    #[default]
    Idle,
    Pending(WriteRequest),
}

/// Holds at most one write request
///
/// Has no lock of its own, callers keep it behind the session mutex and
/// finish requests (I/O and sink) only after letting go of the lock
#[derive(Debug)]
pub struct WriteCoordinator {
    slot: WriteSlot,
}

impl_default_for!(WriteCoordinator);

impl WriteCoordinator {
    pub fn new() -> Self {
        Self { slot: WriteSlot::Idle }
    }

    pub fn state(&self) -> WriteState {
        match self.slot {
            WriteSlot::Idle => WriteState::Idle,
            WriteSlot::Pending(_) => WriteState::Pending,
        }
    }

    pub fn submit(
        &mut self,
        discovery_active: bool,
        request: WriteRequest,
    ) -> Result<(), Rejected> {
        if !discovery_active {
            return Err(Rejected {
                error: WriteError::NotRegistered,
                request,
            });
        }

        if let WriteSlot::Pending(_) = self.slot {
            return Err(Rejected {
                error: WriteError::AlreadyPending,
                request,
            });
        }

        self.slot = WriteSlot::Pending(request);
        Ok(())
    }

    /// Take the pending request out, leaving the slot idle
    ///
    /// The caller completes the request with `Cancelled`
    pub fn cancel(&mut self) -> Result<WriteRequest> {
        self.take_pending().ok_or(WriteError::NoPendingRequest)
    }

    /// Take the pending request so the next tag can fulfill it
    pub fn take_pending(&mut self) -> Option<WriteRequest> {
        match std::mem::take(&mut self.slot) {
            WriteSlot::Pending(request) => Some(request),
            WriteSlot::Idle => None,
        }
    }
}

/// Commit `message` to the tag through its NDEF view
pub fn fulfill(
    message: &NdefMessage,
    ndef: Option<&NdefTagInfo>,
    transport: &dyn TagTransport,
) -> Result<()> {
    let Some(ndef) = ndef else {
        return Err(WriteError::UnsupportedTag);
    };

    if !ndef.is_writable {
        return Err(WriteError::NotWritable);
    }

    let bytes = nfcman_ndef::encode_message(message).map_err_str(WriteError::InvalidPayload)?;

    if bytes.len() > ndef.max_size as usize {
        return Err(WriteError::InsufficientCapacity {
            needed: u32::try_from(bytes.len()).unwrap_or(u32::MAX),
            capacity: ndef.max_size,
        });
    }

    debug!("writing {} bytes to tag", bytes.len());

    let connection = TechConnection::open(transport, TagTechnology::Ndef).map_err_str(WriteError::Io)?;
    connection.write_ndef_message(bytes).map_err_str(WriteError::Io)?;

    info!("ndef message written");
    Ok(())
}

/// Reject a message that could never be written, before it takes the slot
pub fn check_message(message: &NdefMessage) -> Result<()> {
    nfcman_ndef::validate_message(message).map_err_str(WriteError::InvalidPayload)
}

/// The message written for a hex payload: one unknown-type record, no id
pub fn message_from_hex(data: &str) -> Result<NdefMessage> {
    let payload = hex::decode(data.trim()).map_err_str(WriteError::InvalidPayload)?;
    Ok(NdefMessage::single(NdefRecord::unknown(payload)))
}

#[cfg(test)]
mod tests {
    use nfcman_ndef::Tnf;
    use pretty_assertions::assert_eq;

    use super::*;
    use crate::{testing::ScriptedTransport, transport::TransportError};

    fn request() -> (WriteRequest, flume::Receiver<WriteOutcome>) {
        let (sender, receiver) = flume::unbounded::<WriteOutcome>();
        let message = message_from_hex("0102").unwrap();
        let request = WriteRequest::new(message, CompletionSink::new(Box::new(sender)));

        (request, receiver)
    }

    fn ndef(max_size: u32, is_writable: bool) -> NdefTagInfo {
        NdefTagInfo {
            cached_message: None,
            max_size,
            is_writable,
            can_make_read_only: false,
            ndef_type: None,
        }
    }

    #[test]
    fn hex_payload_becomes_unknown_record() {
        let message = message_from_hex("0102").unwrap();
        let record = message.first().unwrap();

        assert_eq!(record.tnf, Tnf::Unknown);
        assert!(record.type_.is_empty());
        assert_eq!(record.id, None);
        assert_eq!(record.payload, vec![0x01, 0x02]);
    }

    #[test]
    fn invalid_hex_is_rejected() {
        assert!(matches!(message_from_hex("0g"), Err(WriteError::InvalidPayload(_))));
        assert!(matches!(message_from_hex("abc"), Err(WriteError::InvalidPayload(_))));
    }

    #[test]
    fn unwritable_messages_fail_the_check() {
        assert_eq!(
            check_message(&NdefMessage { records: vec![] }),
            Err(WriteError::InvalidPayload("a message needs at least one record".to_string()))
        );

        let unchanged = NdefMessage::single(NdefRecord::new(Tnf::Unchanged, b"".to_vec(), vec![1]));
        assert!(matches!(check_message(&unchanged), Err(WriteError::InvalidPayload(_))));

        assert_eq!(check_message(&message_from_hex("0102").unwrap()), Ok(()));
    }

    #[test]
    fn fulfill_refuses_empty_message() {
        let transport = ScriptedTransport::default();
        let message = NdefMessage { records: vec![] };

        assert!(matches!(
            fulfill(&message, Some(&ndef(16, true)), &transport),
            Err(WriteError::InvalidPayload(_))
        ));
        assert!(transport.calls().is_empty());
    }

    #[test]
    fn submit_requires_active_discovery() {
        let mut coordinator = WriteCoordinator::new();
        let (request, receiver) = request();

        let rejected = coordinator.submit(false, request).unwrap_err();
        assert_eq!(rejected.notify(), WriteError::NotRegistered);

        assert_eq!(coordinator.state(), WriteState::Idle);
        assert_eq!(
            receiver.try_recv().unwrap(),
            WriteOutcome::Failed(WriteError::NotRegistered)
        );
    }

    #[test]
    fn second_submit_leaves_first_untouched() {
        let mut coordinator = WriteCoordinator::new();
        let (first, first_receiver) = request();
        let (second, second_receiver) = request();

        coordinator.submit(true, first).unwrap();
        let rejected = coordinator.submit(true, second).unwrap_err();
        assert_eq!(rejected.notify(), WriteError::AlreadyPending);

        assert_eq!(coordinator.state(), WriteState::Pending);
        assert!(first_receiver.try_recv().is_err());
        assert_eq!(
            second_receiver.try_recv().unwrap(),
            WriteOutcome::Failed(WriteError::AlreadyPending)
        );
    }

    #[test]
    fn cancel_when_idle_is_no_pending_request() {
        let mut coordinator = WriteCoordinator::new();

        assert_eq!(coordinator.cancel().unwrap_err(), WriteError::NoPendingRequest);
        assert_eq!(coordinator.cancel().unwrap_err(), WriteError::NoPendingRequest);
    }

    #[test]
    fn cancel_hands_back_the_request_once() {
        let mut coordinator = WriteCoordinator::new();
        let (request, receiver) = request();
        coordinator.submit(true, request).unwrap();

        coordinator.cancel().unwrap().complete(Err(WriteError::Cancelled));

        assert_eq!(coordinator.state(), WriteState::Idle);
        assert!(coordinator.take_pending().is_none());
        assert_eq!(receiver.try_recv().unwrap(), WriteOutcome::Failed(WriteError::Cancelled));
        assert!(receiver.try_recv().is_err());
    }

    #[test]
    fn fulfill_writes_through_ndef_connection() {
        let transport = ScriptedTransport::default();
        let message = message_from_hex("0102").unwrap();

        fulfill(&message, Some(&ndef(16, true)), &transport).unwrap();

        assert_eq!(
            transport.calls(),
            vec!["connect Ndef", "write 5 bytes", "close Ndef"]
        );
    }

    #[test]
    fn fulfill_checks_capability_before_io() {
        let transport = ScriptedTransport::default();
        let message = message_from_hex("0102").unwrap();

        assert_eq!(fulfill(&message, None, &transport), Err(WriteError::UnsupportedTag));
        assert_eq!(
            fulfill(&message, Some(&ndef(16, false)), &transport),
            Err(WriteError::NotWritable)
        );
        assert!(transport.calls().is_empty());
    }

    #[test]
    fn fulfill_checks_capacity() {
        let transport = ScriptedTransport::default();
        // 3 header bytes plus 17 payload bytes
        let message = NdefMessage::single(NdefRecord::unknown(vec![0xEE; 17]));

        assert_eq!(
            fulfill(&message, Some(&ndef(16, true)), &transport),
            Err(WriteError::InsufficientCapacity {
                needed: 20,
                capacity: 16
            })
        );
        assert!(transport.calls().is_empty());
    }

    #[test]
    fn transport_failure_is_io_error() {
        let transport = ScriptedTransport {
            write_error: Some(TransportError::TagLost),
            ..Default::default()
        };
        let message = message_from_hex("0102").unwrap();

        assert_eq!(
            fulfill(&message, Some(&ndef(16, true)), &transport),
            Err(WriteError::Io("tag was lost".to_string()))
        );
        assert_eq!(transport.calls().last().map(String::as_str), Some("close Ndef"));
    }
}
