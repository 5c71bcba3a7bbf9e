//! Shared test utilities for the simdcap workspace.
//!
//! - proptest strategies for narrow code units and strings;
//! - [`reference_pack`], the narrowing formula written out longhand so
//!   readers can be checked against something other than each other;
//! - [`init_test_tracing`] and [`capture_events`] for tests that look at the
//!   dispatcher's tracing output.

use std::sync::{Arc, Mutex, PoisonError};

use proptest::prelude::*;
use tracing::field::{Field, Visit};
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::layer::{Context, Layer, SubscriberExt};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::registry::LookupSpan;

/// Any narrow 16-bit unit: `0x0000..=0x00ff`.
pub fn narrow_unit() -> impl Strategy<Value = u16> {
    0u16..=0xff
}

/// Eight narrow units.
pub fn narrow_units8() -> impl Strategy<Value = [u16; 8]> {
    prop::array::uniform8(narrow_unit())
}

/// Four narrow units.
pub fn narrow_units4() -> impl Strategy<Value = [u16; 4]> {
    prop::array::uniform4(narrow_unit())
}

/// A narrow string as 16-bit units, up to `max_len` long.
pub fn narrow_string(max_len: usize) -> impl Strategy<Value = Vec<u16>> {
    prop::collection::vec(narrow_unit(), 0..=max_len)
}

/// Byte `i` of the result is `units[i]`, for up to eight narrow units.
pub fn reference_pack(units: &[u16]) -> u64 {
    assert!(units.len() <= 8, "at most eight units fit in a u64");
    let mut bytes = [0u8; 8];
    for (dst, &unit) in bytes.iter_mut().zip(units) {
        *dst = u8::try_from(unit).expect("narrow unit");
    }
    u64::from_le_bytes(bytes)
}

/// Installs a global `fmt` subscriber filtered by `RUST_LOG` and routed
/// through the test harness's captured output. Safe to call repeatedly.
pub fn init_test_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

/// One event seen by [`capture_events`].
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct CapturedEvent {
    /// Event target.
    pub target: String,
    /// Event level.
    pub level: Level,
    /// The `message` field, if any.
    pub message: String,
    /// Every other field as `name=value`, in record order.
    pub fields: Vec<(String, String)>,
}

impl CapturedEvent {
    /// Value of field `name`, if recorded.
    pub fn field(&self, name: &str) -> Option<&str> {
        self.fields
            .iter()
            .find(|(field, _)| field == name)
            .map(|(_, value)| value.as_str())
    }
}

#[derive(Clone, Default)]
struct CaptureLayer {
    events: Arc<Mutex<Vec<CapturedEvent>>>,
}

impl<S> Layer<S> for CaptureLayer
where
    S: Subscriber + for<'a> LookupSpan<'a>,
{
    fn on_event(&self, event: &Event<'_>, _ctx: Context<'_, S>) {
        let metadata = event.metadata();
        let mut visitor = FieldVisitor::default();
        event.record(&mut visitor);
        self.events
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(CapturedEvent {
                target: metadata.target().to_owned(),
                level: *metadata.level(),
                message: visitor.message.unwrap_or_default(),
                fields: visitor.fields,
            });
    }
}

#[derive(Default)]
struct FieldVisitor {
    message: Option<String>,
    fields: Vec<(String, String)>,
}

impl Visit for FieldVisitor {
    fn record_debug(&mut self, field: &Field, value: &dyn std::fmt::Debug) {
        let rendered = format!("{value:?}");
        if field.name() == "message" {
            self.message = Some(rendered);
        } else {
            self.fields.push((field.name().to_owned(), rendered));
        }
    }

    fn record_str(&mut self, field: &Field, value: &str) {
        if field.name() == "message" {
            self.message = Some(value.to_owned());
        } else {
            self.fields.push((field.name().to_owned(), value.to_owned()));
        }
    }
}

/// Runs `f` with a thread-local subscriber and returns every event it
/// emitted on this thread.
pub fn capture_events<R>(f: impl FnOnce() -> R) -> (R, Vec<CapturedEvent>) {
    let layer = CaptureLayer::default();
    let events = Arc::clone(&layer.events);
    let subscriber = tracing_subscriber::registry().with(layer);
    let result = tracing::subscriber::with_default(subscriber, f);
    let captured = std::mem::take(&mut *events.lock().unwrap_or_else(PoisonError::into_inner));
    (result, captured)
}
