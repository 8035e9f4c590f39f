use crate::logging;

/// Name of the event the host emits to the application for each reported tag
pub const DISCOVER_TAG_EVENT: &str = "NfcManagerDiscoverTag";

#[uniffi::export]
fn init_logging(filter: Option<String>) {
    logging::init(filter.as_deref());
}

#[uniffi::export]
fn discover_tag_event_name() -> String {
    DISCOVER_TAG_EVENT.to_string()
}
