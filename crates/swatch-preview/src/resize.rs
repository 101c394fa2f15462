//! The resize channel between a preview frame and its host.
//!
//! Delivery is fire-and-forget and only the most recent height matters, so
//! the in-process channel is a single slot where each report overwrites the
//! last one.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::{Arc, Mutex, PoisonError, Weak};

use serde::{Deserialize, Serialize};
use tokio::sync::watch;

/// A content height report: `{ "type": "resize", "height": <px> }`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "WireMessage", into = "WireMessage")]
pub struct ResizeMessage {
    height: f64,
}

/// Exact wire shape; any other field makes the message invalid.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct WireMessage {
    #[serde(rename = "type")]
    kind: String,
    height: f64,
}

/// Errors for messages that are not valid resize reports.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum ResizeError {
    #[error("Not a resize message: {0}")]
    Malformed(String),

    #[error("Unexpected message type: {0}")]
    WrongType(String),

    #[error("Invalid height: {0}")]
    InvalidHeight(f64),
}

impl ResizeMessage {
    /// Create a report. Heights must be finite and non-negative.
    pub fn new(height: f64) -> Result<Self, ResizeError> {
        if !height.is_finite() || height < 0.0 {
            return Err(ResizeError::InvalidHeight(height));
        }
        Ok(Self { height })
    }

    /// Reported height in layout pixels.
    pub fn height(&self) -> f64 {
        self.height
    }

    /// Parse an inbound message, rejecting every other shape.
    pub fn parse(data: &str) -> Result<Self, ResizeError> {
        serde_json::from_str(data).map_err(|e| ResizeError::Malformed(e.to_string()))
    }

    pub fn to_json(&self) -> String {
        format!(r#"{{"type":"resize","height":{}}}"#, self.height)
    }
}

impl TryFrom<WireMessage> for ResizeMessage {
    type Error = ResizeError;

    fn try_from(wire: WireMessage) -> Result<Self, Self::Error> {
        if wire.kind != "resize" {
            return Err(ResizeError::WrongType(wire.kind));
        }
        Self::new(wire.height)
    }
}

impl From<ResizeMessage> for WireMessage {
    fn from(msg: ResizeMessage) -> Self {
        Self {
            kind: "resize".to_string(),
            height: msg.height,
        }
    }
}

/// Create a latest-value-wins resize channel for one frame.
pub fn resize_channel() -> (ResizeEmitter, ResizeReceiver) {
    let (tx, rx) = watch::channel(None);
    (ResizeEmitter { tx }, ResizeReceiver { rx })
}

/// Sending half, the only outbound handle a preview execution gets.
#[derive(Debug)]
pub struct ResizeEmitter {
    tx: watch::Sender<Option<ResizeMessage>>,
}

impl ResizeEmitter {
    /// Report a height. Reports to a torn-down receiver are dropped.
    pub fn emit(&self, msg: ResizeMessage) {
        // Ignore send errors (receiver gone)
        let _ = self.tx.send(Some(msg));
    }
}

/// Receiving half held by the host.
#[derive(Debug, Clone)]
pub struct ResizeReceiver {
    rx: watch::Receiver<Option<ResizeMessage>>,
}

impl ResizeReceiver {
    /// Most recent report, if any arrived.
    pub fn latest(&self) -> Option<ResizeMessage> {
        *self.rx.borrow()
    }

    /// Wait for a report newer than the last one seen.
    ///
    /// Returns `None` once the emitter is gone.
    pub async fn changed(&mut self) -> Option<ResizeMessage> {
        self.rx.changed().await.ok()?;
        *self.rx.borrow_and_update()
    }
}

/// How a host turns reported heights into frame heights.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct FrameSizing {
    /// Extra pixels added to every reported height
    #[serde(default = "default_padding")]
    pub padding: u32,

    /// Frames never shrink below this height
    #[serde(default = "default_min_height")]
    pub min_height: u32,
}

fn default_padding() -> u32 {
    40
}
fn default_min_height() -> u32 {
    300
}

impl Default for FrameSizing {
    fn default() -> Self {
        Self {
            padding: default_padding(),
            min_height: default_min_height(),
        }
    }
}

impl FrameSizing {
    /// Frame height for a reported content height.
    pub fn apply(&self, height: f64) -> u32 {
        let content = height.max(0.0).ceil().min(f64::from(u32::MAX)) as u32;
        content.saturating_add(self.padding).max(self.min_height)
    }
}

/// A message delivered to the hosting page.
#[derive(Debug, Clone)]
pub struct InboundMessage {
    /// Frame that posted the message
    pub source: String,
    /// Raw JSON payload
    pub data: String,
}

type Listener = Arc<dyn Fn(&InboundMessage) + Send + Sync>;

#[derive(Default)]
struct BusInner {
    next_id: u64,
    listeners: HashMap<u64, Listener>,
}

/// Message dispatch for a hosting page.
#[derive(Clone, Default)]
pub struct MessageBus {
    inner: Arc<Mutex<BusInner>>,
}

impl MessageBus {
    /// Create an empty bus.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a listener. It stays registered until the guard is dropped.
    pub fn subscribe<F>(&self, listener: F) -> ListenerGuard
    where
        F: Fn(&InboundMessage) + Send + Sync + 'static,
    {
        let mut inner = self.inner.lock().unwrap_or_else(PoisonError::into_inner);
        let id = inner.next_id;
        inner.next_id += 1;
        inner.listeners.insert(id, Arc::new(listener));

        ListenerGuard {
            id,
            bus: Arc::downgrade(&self.inner),
        }
    }

    /// Deliver a message to every listener. Returns how many were invoked.
    ///
    /// Listeners run without the bus locked, so they may subscribe or drop
    /// guards (their own included) while handling a message.
    pub fn dispatch(&self, msg: &InboundMessage) -> usize {
        let listeners: Vec<Listener> = self
            .inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .listeners
            .values()
            .cloned()
            .collect();

        for listener in &listeners {
            listener(msg);
        }
        listeners.len()
    }

    /// Get the number of registered listeners.
    pub fn listener_count(&self) -> usize {
        self.inner
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .listeners
            .len()
    }
}

/// Deregisters its listener on drop.
pub struct ListenerGuard {
    id: u64,
    bus: Weak<Mutex<BusInner>>,
}

impl Drop for ListenerGuard {
    fn drop(&mut self) {
        if let Some(bus) = self.bus.upgrade() {
            bus.lock()
                .unwrap_or_else(PoisonError::into_inner)
                .listeners
                .remove(&self.id);
        }
    }
}

/// Host-side state of one embedded preview frame.
///
/// Applies resize reports from its own frame and ignores everything else.
/// Dropping it removes its listener from the bus.
pub struct EmbeddedFrame {
    id: String,
    height: Arc<AtomicU32>,
    _guard: ListenerGuard,
}

impl EmbeddedFrame {
    /// Attach a frame to a hosting page's message bus.
    pub fn attach(bus: &MessageBus, id: impl Into<String>, sizing: FrameSizing) -> Self {
        let id = id.into();
        let height = Arc::new(AtomicU32::new(sizing.min_height));

        let frame_id = id.clone();
        let frame_height = Arc::clone(&height);
        let guard = bus.subscribe(move |msg| {
            if msg.source != frame_id {
                return;
            }
            match ResizeMessage::parse(&msg.data) {
                Ok(resize) => {
                    frame_height.store(sizing.apply(resize.height()), Ordering::Relaxed);
                }
                Err(e) => {
                    tracing::trace!("Ignoring message for frame {}: {}", frame_id, e);
                }
            }
        });

        Self {
            id,
            height,
            _guard: guard,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Current frame height in pixels.
    pub fn height(&self) -> u32 {
        self.height.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn inbound(source: &str, data: &str) -> InboundMessage {
        InboundMessage {
            source: source.to_string(),
            data: data.to_string(),
        }
    }

    #[test]
    fn parses_resize_messages() {
        let msg = ResizeMessage::parse(r#"{"type":"resize","height":120}"#).unwrap();
        assert_eq!(msg.height(), 120.0);

        let msg = ResizeMessage::parse(r#"{"height": 12.5, "type": "resize"}"#).unwrap();
        assert_eq!(msg.height(), 12.5);
    }

    #[test]
    fn rejects_other_shapes() {
        let invalid = [
            r#"{"type":"reload"}"#,
            r#"{"type":"scroll","height":10}"#,
            r#"{"type":"resize"}"#,
            r#"{"type":"resize","height":"10"}"#,
            r#"{"type":"resize","height":10,"width":5}"#,
            r#"{"type":"resize","height":-1}"#,
            r#"[1, 2]"#,
            "not json",
        ];

        for data in invalid {
            assert!(ResizeMessage::parse(data).is_err(), "accepted {data}");
        }
    }

    #[test]
    fn serializes_wire_shape() {
        let msg = ResizeMessage::new(88.0).unwrap();

        let json = serde_json::to_string(&msg).unwrap();

        assert_eq!(json, r#"{"type":"resize","height":88.0}"#);
        assert_eq!(ResizeMessage::parse(&msg.to_json()).unwrap(), msg);
    }

    #[test]
    fn rejects_non_finite_heights() {
        assert_eq!(
            ResizeMessage::new(-3.0),
            Err(ResizeError::InvalidHeight(-3.0))
        );
        assert!(ResizeMessage::new(f64::NAN).is_err());
        assert!(ResizeMessage::new(f64::INFINITY).is_err());
    }

    #[test]
    fn sizing_clamps_to_floor() {
        let sizing = FrameSizing::default();

        assert_eq!(sizing.apply(0.0), 300);
        assert_eq!(sizing.apply(100.0), 300);
        assert_eq!(sizing.apply(500.0), 540);
        assert_eq!(sizing.apply(500.2), 541);
    }

    #[test]
    fn channel_keeps_only_latest_height() {
        let (emitter, receiver) = resize_channel();
        assert!(receiver.latest().is_none());

        emitter.emit(ResizeMessage::new(10.0).unwrap());
        emitter.emit(ResizeMessage::new(20.0).unwrap());
        emitter.emit(ResizeMessage::new(15.0).unwrap());

        assert_eq!(receiver.latest().map(|m| m.height()), Some(15.0));
    }

    #[test]
    fn emitting_after_teardown_is_silent() {
        let (emitter, receiver) = resize_channel();
        drop(receiver);

        emitter.emit(ResizeMessage::new(10.0).unwrap());
    }

    #[tokio::test]
    async fn receiver_wakes_on_change_and_closes() {
        let (emitter, mut receiver) = resize_channel();

        emitter.emit(ResizeMessage::new(42.0).unwrap());
        assert_eq!(receiver.changed().await.map(|m| m.height()), Some(42.0));

        drop(emitter);
        assert!(receiver.changed().await.is_none());
    }

    #[test]
    fn frame_applies_only_its_own_messages() {
        let bus = MessageBus::new();
        let frame = EmbeddedFrame::attach(&bus, "frame-a", FrameSizing::default());

        bus.dispatch(&inbound("frame-a", r#"{"type":"resize","height":600}"#));
        assert_eq!(frame.height(), 640);

        bus.dispatch(&inbound("frame-b", r#"{"type":"resize","height":900}"#));
        bus.dispatch(&inbound("frame-a", r#"{"type":"reload"}"#));
        assert_eq!(frame.height(), 640);

        bus.dispatch(&inbound("frame-a", r#"{"type":"resize","height":20}"#));
        assert_eq!(frame.height(), 300);
    }

    #[test]
    fn dropping_frame_deregisters_listener() {
        let bus = MessageBus::new();
        let first = EmbeddedFrame::attach(&bus, "one", FrameSizing::default());
        let second = EmbeddedFrame::attach(&bus, "two", FrameSizing::default());
        assert_eq!(bus.listener_count(), 2);

        drop(first);
        assert_eq!(bus.listener_count(), 1);
        assert_eq!(
            bus.dispatch(&inbound("two", r#"{"type":"resize","height":400}"#)),
            1
        );
        assert_eq!(second.height(), 440);

        drop(second);
        assert_eq!(bus.listener_count(), 0);
    }

    #[test]
    fn listener_can_drop_its_own_guard() {
        let bus = MessageBus::new();
        let slot: Arc<Mutex<Option<ListenerGuard>>> = Arc::new(Mutex::new(None));
        let calls = Arc::new(AtomicU32::new(0));

        let guard = {
            let slot = Arc::clone(&slot);
            let calls = Arc::clone(&calls);
            bus.subscribe(move |_| {
                calls.fetch_add(1, Ordering::SeqCst);
                drop(slot.lock().unwrap().take());
            })
        };
        *slot.lock().unwrap() = Some(guard);

        assert_eq!(bus.dispatch(&inbound("a", "{}")), 1);
        assert_eq!(bus.listener_count(), 0);
        assert_eq!(bus.dispatch(&inbound("a", "{}")), 0);
        assert_eq!(calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn listener_can_use_the_bus() {
        let bus = MessageBus::new();
        let seen = Arc::new(AtomicU32::new(0));
        let added: Arc<Mutex<Vec<ListenerGuard>>> = Arc::new(Mutex::new(Vec::new()));

        let _guard = {
            let handle = bus.clone();
            let seen = Arc::clone(&seen);
            let added = Arc::clone(&added);
            bus.subscribe(move |_| {
                seen.store(handle.listener_count() as u32, Ordering::SeqCst);
                added.lock().unwrap().push(handle.subscribe(|_| {}));
            })
        };

        assert_eq!(bus.dispatch(&inbound("a", "{}")), 1);
        assert_eq!(seen.load(Ordering::SeqCst), 1);
        assert_eq!(bus.listener_count(), 2);
    }

    #[test]
    fn guard_outliving_bus_is_harmless() {
        let bus = MessageBus::new();
        let guard = bus.subscribe(|_| {});
        drop(bus);
        drop(guard);
    }
}
