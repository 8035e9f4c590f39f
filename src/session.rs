//! Discovery session: registration, event intake and the write API
//!
//! All mutable state sits behind one mutex. Collaborators (dispatch, transport,
//! completion sinks, listeners) are only ever called after the lock is released.

use std::{fmt::Debug, sync::Arc};

use flume::{Receiver, Sender};
use nfcman_ndef::NdefMessage;
use parking_lot::Mutex;
use tracing::{debug, info, warn};

use crate::{
    classifier::{self, DiscoveryEvent, EventKind},
    config::SessionConfig,
    convert::TagPayload,
    tag::TagTechnology,
    transport::TagTransport,
    vendor::VendorIdDecoder,
    write::{self, CompletionSink, Rejected, WriteCallback, WriteCoordinator, WriteError, WriteRequest, WriteState},
};

/// One intent filter handed to foreground dispatch
#[derive(Debug, Clone, PartialEq, Eq, Hash, uniffi::Record)]
pub struct DiscoveryFilter {
    pub kind: EventKind,
    pub mime_type: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error, uniffi::Error)]
pub enum DispatchError {
    #[error("dispatch rejected in current state: {0}")]
    IllegalState(String),
}

/// Routes discovery events to this session while the host is in the foreground
#[uniffi::export(with_foreign)]
pub trait ForegroundDispatch: Send + Sync + Debug + 'static {
    fn enable(
        &self,
        filters: Vec<DiscoveryFilter>,
        tech_lists: Vec<Vec<TagTechnology>>,
    ) -> Result<(), DispatchError>;

    fn disable(&self) -> Result<(), DispatchError>;
}

#[uniffi::export(with_foreign)]
pub trait NfcAdapter: Send + Sync + Debug + 'static {
    /// Whether the device has an adapter at all
    fn is_available(&self) -> bool;

    fn is_supported(&self) -> bool;

    /// Whether the user has NFC switched on
    fn is_enabled(&self) -> bool;
}

#[uniffi::export(callback_interface)]
pub trait TagEventListener: Send + Sync + Debug + 'static {
    fn on_tag(&self, payload: TagPayload);
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error, uniffi::Error)]
pub enum SessionError {
    #[error("no NFC adapter on this device")]
    NfcUnavailable,
}

/// What happened to a discovery event
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, derive_more::Display, uniffi::Enum)]
pub enum EventDisposition {
    /// Structured value sent to listeners
    Reported,
    /// A pending write took the tag, nothing was reported
    ConsumedByWrite,
    Ignored,
}

#[derive(Debug)]
enum DispatchCommand {
    Enable {
        filters: Vec<DiscoveryFilter>,
        tech_lists: Vec<Vec<TagTechnology>>,
    },
    Disable,
}

#[derive(Debug, Default)]
struct Registration {
    active: bool,
    resumed: bool,
    filters: Vec<DiscoveryFilter>,
    tech_lists: Vec<Vec<TagTechnology>>,
}

impl Registration {
    fn enable_command(&self) -> DispatchCommand {
        DispatchCommand::Enable {
            filters: self.filters.clone(),
            tech_lists: self.tech_lists.clone(),
        }
    }

    fn register(&mut self, mime_filter: &str) -> Option<DispatchCommand> {
        self.active = true;
        self.filters = vec![
            DiscoveryFilter {
                kind: EventKind::NdefDiscovered,
                mime_type: Some(mime_filter.to_string()),
            },
            DiscoveryFilter {
                kind: EventKind::TechDiscovered,
                mime_type: None,
            },
            DiscoveryFilter {
                kind: EventKind::TagDiscovered,
                mime_type: None,
            },
        ];
        self.tech_lists = vec![vec![TagTechnology::Ndef]];

        self.resumed.then(|| self.enable_command())
    }

    fn unregister(&mut self) -> Option<DispatchCommand> {
        self.active = false;
        self.filters.clear();
        self.tech_lists.clear();

        self.resumed.then_some(DispatchCommand::Disable)
    }

    fn resume(&mut self) -> Option<DispatchCommand> {
        self.resumed = true;
        self.active.then(|| self.enable_command())
    }

    fn pause(&mut self) -> Option<DispatchCommand> {
        self.resumed = false;
        self.active.then_some(DispatchCommand::Disable)
    }
}

#[derive(Debug, Default)]
struct SessionState {
    registration: Registration,
    writes: WriteCoordinator,
}

#[derive(Debug, uniffi::Object)]
pub struct DiscoverySession {
    state: Mutex<SessionState>,
    config: SessionConfig,
    vendor: Arc<dyn VendorIdDecoder>,
    adapter: Arc<dyn NfcAdapter>,
    dispatch: Arc<dyn ForegroundDispatch>,
    sender: Sender<TagPayload>,
    receiver: Arc<Receiver<TagPayload>>,
}

#[uniffi::export]
impl DiscoverySession {
    #[uniffi::constructor]
    pub fn new(
        config: SessionConfig,
        adapter: Arc<dyn NfcAdapter>,
        dispatch: Arc<dyn ForegroundDispatch>,
    ) -> Self {
        let (sender, receiver) = flume::bounded(config.event_queue_capacity as usize);
        let vendor = Arc::new(config.page_framing());

        Self {
            state: Mutex::new(SessionState::default()),
            config,
            vendor,
            adapter,
            dispatch,
            sender,
            receiver: Arc::new(receiver),
        }
    }

    #[uniffi::method]
    pub fn start(&self) -> Result<(), SessionError> {
        if !self.adapter.is_available() {
            return Err(SessionError::NfcUnavailable);
        }

        info!("nfc session started, enabled: {}", self.adapter.is_enabled());
        Ok(())
    }

    #[uniffi::method]
    pub fn is_supported(&self) -> bool {
        self.adapter.is_supported()
    }

    #[uniffi::method]
    pub fn is_enabled(&self) -> bool {
        self.adapter.is_enabled()
    }

    #[uniffi::method]
    pub fn is_discovery_active(&self) -> bool {
        self.state.lock().registration.active
    }

    #[uniffi::method]
    pub fn register_tag_event(&self) {
        let command = self.state.lock().registration.register(&self.config.ndef_mime_filter);
        debug!("registered for tag events");

        self.apply(command);
    }

    #[uniffi::method]
    pub fn unregister_tag_event(&self) {
        let command = self.state.lock().registration.unregister();
        debug!("unregistered from tag events");

        self.apply(command);
    }

    #[uniffi::method]
    pub fn set_discovery_active(&self, active: bool) {
        if active {
            self.register_tag_event();
        } else {
            self.unregister_tag_event();
        }
    }

    #[uniffi::method]
    pub fn on_host_resume(&self) {
        let command = self.state.lock().registration.resume();
        self.apply(command);
    }

    #[uniffi::method]
    pub fn on_host_pause(&self) {
        let command = self.state.lock().registration.pause();
        self.apply(command);
    }

    /// Feed one discovery event into the session
    ///
    /// A pending write takes the tag and the read result is dropped,
    /// otherwise the structured value goes to listeners.
    #[uniffi::method]
    pub fn on_event(&self, event: DiscoveryEvent, transport: Arc<dyn TagTransport>) -> EventDisposition {
        let Some(payload) = self.classify(&event, transport.as_ref()) else {
            return EventDisposition::Ignored;
        };

        let pending = self.state.lock().writes.take_pending();
        if let Some(request) = pending {
            debug!("write pending, tag {} goes to the write", payload.id);

            let result = write::fulfill(request.message(), event.ndef.as_ref(), transport.as_ref());
            if let Err(error) = &result {
                warn!("write failed: {error}");
            }

            request.complete(result);
            return EventDisposition::ConsumedByWrite;
        }

        match self.sender.try_send(payload) {
            Ok(()) => EventDisposition::Reported,
            Err(error) => {
                warn!("dropping tag event: {error}");
                EventDisposition::Ignored
            }
        }
    }

    /// Structured value for the event that launched the host, if any
    ///
    /// Never touches a pending write
    #[uniffi::method]
    pub fn launch_tag_event(
        &self,
        event: DiscoveryEvent,
        transport: Arc<dyn TagTransport>,
    ) -> Option<TagPayload> {
        self.classify(&event, transport.as_ref())
    }

    /// Queue `message` for the next discovered tag
    ///
    /// A refused submission is returned and also delivered to `callback`
    #[uniffi::method]
    pub fn submit_write(
        &self,
        message: NdefMessage,
        callback: Box<dyn WriteCallback>,
    ) -> Result<(), WriteError> {
        if let Err(error) = write::check_message(&message) {
            return Err(reject(callback, error));
        }

        let request = WriteRequest::new(message, CompletionSink::new(callback));

        let result = {
            let mut state = self.state.lock();
            let active = state.registration.active;
            state.writes.submit(active, request)
        };

        result.map_err(Rejected::notify)?;
        debug!("write request pending");

        Ok(())
    }

    /// Queue a single unknown-type record holding the hex-decoded payload
    #[uniffi::method]
    pub fn submit_write_hex(
        &self,
        data: String,
        callback: Box<dyn WriteCallback>,
    ) -> Result<(), WriteError> {
        match write::message_from_hex(&data) {
            Ok(message) => self.submit_write(message, callback),
            Err(error) => Err(reject(callback, error)),
        }
    }

    /// Cancel the pending write, its callback receives `Cancelled`
    #[uniffi::method]
    pub fn cancel_write(&self) -> Result<(), WriteError> {
        let request = self.state.lock().writes.cancel()?;
        request.complete(Err(WriteError::Cancelled));

        debug!("write request cancelled");
        Ok(())
    }

    #[uniffi::method]
    pub fn write_state(&self) -> WriteState {
        self.state.lock().writes.state()
    }

    /// Forward reported tags to `listener` from a background thread
    ///
    /// Listeners and `tag_events` receivers share one queue, each tag goes to
    /// exactly one of them. Register a single consumer per session.
    #[uniffi::method]
    pub fn listen_for_tags(&self, listener: Box<dyn TagEventListener>) {
        let receiver = self.receiver.clone();

        std::thread::spawn(move || {
            while let Ok(payload) = receiver.recv() {
                listener.on_tag(payload);
            }
        });
    }
}

fn reject(callback: Box<dyn WriteCallback>, error: WriteError) -> WriteError {
    CompletionSink::new(callback).complete(Err(error.clone()));
    error
}

impl DiscoverySession {
    /// Replace the default page framing used for vendor ids
    pub fn with_vendor_decoder(mut self, vendor: Arc<dyn VendorIdDecoder>) -> Self {
        self.vendor = vendor;
        self
    }

    /// Rust-side view of reported tags
    ///
    /// Shares the queue with `listen_for_tags`, a tag taken here never reaches a listener
    pub fn tag_events(&self) -> Receiver<TagPayload> {
        self.receiver.as_ref().clone()
    }

    fn classify(&self, event: &DiscoveryEvent, transport: &dyn TagTransport) -> Option<TagPayload> {
        classifier::classify(event, transport, self.vendor.as_ref(), &self.config)
    }

    fn apply(&self, command: Option<DispatchCommand>) {
        let result = match command {
            None => return,
            Some(DispatchCommand::Enable {
                filters,
                tech_lists,
            }) => self.dispatch.enable(filters, tech_lists),
            Some(DispatchCommand::Disable) => self.dispatch.disable(),
        };

        if let Err(error) = result {
            warn!("foreground dispatch failed: {error}");
        }
    }
}
