//! Event handler table and wire codec.
//!
//! # Responsibilities
//! - Map event-type strings to ordered handler lists
//! - Dispatch a decoded payload to the handlers for its `event` field
//! - Build the outbound `{ "event": ..., ...payload }` message
//!
//! # Design Decisions
//! - Handlers are snapshotted before being called, so a handler may
//!   register or remove handlers without deadlocking the table
//! - An exclusive registration replaces every handler for that event

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use dashmap::DashMap;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::socket::types::{Handler, HandlerId, SocketError, SocketResult};

/// Name of the field that carries the event type on the wire.
pub const EVENT_FIELD: &str = "event";

struct Registered {
    id: HandlerId,
    handler: Handler,
}

/// Per-event-type handler lists.
#[derive(Default)]
pub struct EventTable {
    handlers: DashMap<String, Vec<Registered>>,
    next_id: AtomicU64,
}

impl EventTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `handler` for `event`.
    ///
    /// With `exclusive`, every handler already registered for `event` is
    /// removed first.
    pub fn on<F>(&self, event: &str, handler: F, exclusive: bool) -> HandlerId
    where
        F: Fn(&Value) + Send + Sync + 'static,
    {
        let id = HandlerId(self.next_id.fetch_add(1, Ordering::Relaxed));
        let mut list = self.handlers.entry(event.to_owned()).or_default();

        if exclusive {
            list.clear();
        }
        list.push(Registered {
            id,
            handler: Arc::new(handler),
        });

        id
    }

    /// Remove one handler, or every handler for `event` when `id` is `None`.
    ///
    /// Returns how many handlers were removed.
    pub fn off(&self, event: &str, id: Option<HandlerId>) -> usize {
        let Some(mut list) = self.handlers.get_mut(event) else {
            return 0;
        };

        let before = list.len();
        match id {
            Some(id) => list.retain(|registered| registered.id != id),
            None => list.clear(),
        }
        before - list.len()
    }

    /// Number of handlers registered for `event`.
    pub fn count(&self, event: &str) -> usize {
        self.handlers.get(event).map_or(0, |list| list.len())
    }

    /// Call every handler registered for the payload's event, in
    /// registration order. Returns how many ran.
    pub fn dispatch(&self, payload: &Value) -> usize {
        let Some(event) = payload.get(EVENT_FIELD).and_then(Value::as_str) else {
            return 0;
        };

        let snapshot: Vec<Handler> = match self.handlers.get(event) {
            Some(list) => list.iter().map(|r| Arc::clone(&r.handler)).collect(),
            None => return 0,
        };

        for handler in &snapshot {
            handler(payload);
        }

        tracing::trace!(event = %event, handlers = snapshot.len(), "Event dispatched");
        snapshot.len()
    }
}

impl std::fmt::Debug for EventTable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let mut map = f.debug_map();
        for entry in self.handlers.iter() {
            map.entry(entry.key(), &entry.value().len());
        }
        map.finish()
    }
}

/// Encode an outbound message as `{ "event": event, ...payload }`.
///
/// Keys in `payload` win over the event name, including `event` itself.
/// A payload that serializes to `null` sends only the event.
pub fn encode_event<T: Serialize + ?Sized>(event: &str, payload: &T) -> SocketResult<String> {
    let mut message = Map::new();
    message.insert(EVENT_FIELD.to_owned(), Value::String(event.to_owned()));

    match serde_json::to_value(payload)? {
        Value::Object(fields) => message.extend(fields),
        Value::Null => {}
        _ => return Err(SocketError::InvalidPayload(event.to_owned())),
    }

    Ok(Value::Object(message).to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::sync::Mutex;

    fn recorder() -> (Arc<Mutex<Vec<String>>>, impl Fn(&'static str) -> Handler) {
        let log = Arc::new(Mutex::new(Vec::new()));
        let log_clone = log.clone();
        let make = move |tag: &'static str| -> Handler {
            let log = log_clone.clone();
            Arc::new(move |_: &Value| log.lock().unwrap().push(tag.to_owned()))
        };
        (log, make)
    }

    #[test]
    fn test_dispatch_in_registration_order() {
        let table = EventTable::new();
        let (log, make) = recorder();
        let (a, b) = (make("a"), make("b"));
        table.on("chat", move |v| a(v), false);
        table.on("chat", move |v| b(v), false);

        let ran = table.dispatch(&json!({"event": "chat", "text": "hi"}));
        assert_eq!(ran, 2);
        assert_eq!(*log.lock().unwrap(), vec!["a", "b"]);
    }

    #[test]
    fn test_exclusive_replaces_existing_handlers() {
        let table = EventTable::new();
        let (log, make) = recorder();
        let (a, b) = (make("a"), make("b"));
        table.on("chat", move |v| a(v), false);
        table.on("chat", move |v| b(v), true);

        assert_eq!(table.count("chat"), 1);
        table.dispatch(&json!({"event": "chat"}));
        assert_eq!(*log.lock().unwrap(), vec!["b"]);
    }

    #[test]
    fn test_off_single_and_all() {
        let table = EventTable::new();
        let first = table.on("tick", |_| {}, false);
        table.on("tick", |_| {}, false);
        table.on("tick", |_| {}, false);

        assert_eq!(table.off("tick", Some(first)), 1);
        assert_eq!(table.count("tick"), 2);
        assert_eq!(table.off("tick", Some(first)), 0);
        assert_eq!(table.off("tick", None), 2);
        assert_eq!(table.count("tick"), 0);
        assert_eq!(table.off("unknown", None), 0);
    }

    #[test]
    fn test_dispatch_without_event_field() {
        let table = EventTable::new();
        table.on("chat", |_| panic!("must not run"), false);

        assert_eq!(table.dispatch(&json!({"text": "hi"})), 0);
        assert_eq!(table.dispatch(&json!({"event": 7})), 0);
        assert_eq!(table.dispatch(&json!([1, 2])), 0);
        assert_eq!(table.dispatch(&json!({"event": "other"})), 0);
    }

    #[test]
    fn test_handler_may_modify_table() {
        let table = Arc::new(EventTable::new());
        let inner = table.clone();
        table.on(
            "once",
            move |_| {
                inner.off("once", None);
            },
            false,
        );

        assert_eq!(table.dispatch(&json!({"event": "once"})), 1);
        assert_eq!(table.count("once"), 0);
    }

    #[test]
    fn test_handler_ids_are_unique() {
        let table = EventTable::new();
        let a = table.on("x", |_| {}, false);
        let b = table.on("y", |_| {}, false);
        assert_ne!(a, b);
    }

    #[test]
    fn test_encode_event() {
        let message = encode_event("chat", &json!({"text": "hi"})).unwrap();
        let value: Value = serde_json::from_str(&message).unwrap();
        assert_eq!(value, json!({"event": "chat", "text": "hi"}));
    }

    #[test]
    fn test_encode_event_payload_overrides_event() {
        let message = encode_event("chat", &json!({"event": "override"})).unwrap();
        let value: Value = serde_json::from_str(&message).unwrap();
        assert_eq!(value, json!({"event": "override"}));
    }

    #[test]
    fn test_encode_event_null_and_invalid_payloads() {
        let message = encode_event("ping", &()).unwrap();
        assert_eq!(message, r#"{"event":"ping"}"#);

        let err = encode_event("chat", &json!([1, 2])).unwrap_err();
        assert!(matches!(err, SocketError::InvalidPayload(ref e) if e == "chat"));
    }
}
