use alloc::sync::Arc;
use core::fmt;
use core::sync::atomic::{AtomicU64, Ordering};
use std::sync::{PoisonError, RwLock};

use serde_json::Value;

use crate::error::{CallError, ConnectError};
use crate::event::DynEventHandler;
use crate::func::{DynParams, Signature, TypedArgs, check_params};

// -----------------------------------------------------------------------------
// ConnectionId

/// Identifies one connection of an [`Event`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ConnectionId(u64);

// -----------------------------------------------------------------------------
// Event

struct Connection {
    id: ConnectionId,
    handler: DynEventHandler,
}

#[derive(Default)]
struct Connections {
    list: RwLock<Vec<Connection>>,
    next_id: AtomicU64,
}

/// A signal that calls every connected handler on emission.
///
/// Clones share the connection list, which is how a signal descriptor hands
/// out the event owned by an object. Handlers whose object has expired are
/// dropped on the next emission.
///
/// # Example
///
/// ```
/// use std::sync::Arc;
/// use std::sync::atomic::{AtomicI32, Ordering};
/// use pl_rtti::event::{DynEventHandler, Event};
///
/// let event = Event::of::<(i32,)>();
/// let sum = Arc::new(AtomicI32::new(0));
/// let sink = sum.clone();
/// event
///     .connect(DynEventHandler::from_fn(move |v: i32| {
///         sink.fetch_add(v, Ordering::Relaxed);
///     }))
///     .unwrap();
///
/// event.emit_args((2,)).unwrap();
/// event.emit_str("3").unwrap();
/// assert_eq!(sum.load(Ordering::Relaxed), 5);
/// ```
#[derive(Clone)]
pub struct Event {
    signature: Signature,
    connections: Arc<Connections>,
}

impl Event {
    /// Creates an event with the given signature and no connections.
    pub fn new(signature: Signature) -> Self {
        Self {
            signature,
            connections: Arc::default(),
        }
    }

    /// Creates an event passing the arguments `Args`.
    #[inline]
    pub fn of<Args: TypedArgs>() -> Self {
        Self::new(Signature::of::<(), Args>())
    }

    #[inline]
    pub fn signature(&self) -> &Signature {
        &self.signature
    }

    /// Returns `true` if both handles share one connection list.
    #[inline]
    pub fn ptr_eq(&self, other: &Event) -> bool {
        Arc::ptr_eq(&self.connections, &other.connections)
    }

    /// Connects `handler`. Its signature must equal the event signature.
    pub fn connect(&self, handler: DynEventHandler) -> Result<ConnectionId, ConnectError> {
        if handler.signature() != &self.signature {
            log::warn!(
                "can not connect handler `{}` to event `{}`",
                handler.signature(),
                self.signature
            );
            return Err(ConnectError::Signature {
                signal: self.signature.to_string(),
                slot: handler.signature().to_string(),
            });
        }
        let id = ConnectionId(self.connections.next_id.fetch_add(1, Ordering::Relaxed));
        self.connections
            .list
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(Connection { id, handler });
        Ok(id)
    }

    /// Removes a connection, returns `false` if it does not exist.
    pub fn disconnect(&self, id: ConnectionId) -> bool {
        let mut list = self
            .connections
            .list
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        let before = list.len();
        list.retain(|connection| connection.id != id);
        list.len() != before
    }

    /// Removes every connection.
    pub fn disconnect_all(&self) {
        self.connections
            .list
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }

    pub fn num_connections(&self) -> usize {
        self.connections
            .list
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    /// Calls every handler with a copy of `params`.
    ///
    /// Handlers run outside the connection lock, so they may connect or
    /// disconnect. A failing handler is logged and does not stop the others.
    pub fn emit(&self, params: &DynParams) -> Result<(), CallError> {
        check_params(&self.signature, params)?;

        let snapshot: Vec<(ConnectionId, DynEventHandler)> = self
            .connections
            .list
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|c| (c.id, c.handler.clone()))
            .collect();

        let mut expired = Vec::new();
        for (id, handler) in snapshot {
            let mut copy = params.clone();
            match handler.call(&mut copy) {
                Ok(()) => {}
                Err(CallError::Expired) => expired.push(id),
                Err(err) => log::warn!("event `{}` handler failed: {err}", self.signature),
            }
        }
        if !expired.is_empty() {
            self.connections
                .list
                .write()
                .unwrap_or_else(PoisonError::into_inner)
                .retain(|connection| !expired.contains(&connection.id));
        }
        Ok(())
    }

    /// Emits typed arguments.
    pub fn emit_args<Args: TypedArgs>(&self, args: Args) -> Result<(), CallError> {
        let mut params = DynParams::new(self.signature.clone());
        for (index, value) in args.into_values().into_iter().enumerate() {
            params.set(index, value)?;
        }
        if params.len() != Args::ARITY {
            return Err(CallError::Arity {
                expected: params.len(),
                found: Args::ARITY,
            });
        }
        self.emit(&params)
    }

    /// Emits arguments given as a parameter string.
    pub fn emit_str(&self, input: &str) -> Result<(), CallError> {
        let mut params = DynParams::new(self.signature.clone());
        params.parse_into(input)?;
        self.emit(&params)
    }

    /// Emits arguments given as a parameter document.
    pub fn emit_document(&self, document: &Value) -> Result<(), CallError> {
        let mut params = DynParams::new(self.signature.clone());
        params.fill_from_document(document)?;
        self.emit(&params)
    }
}

impl fmt::Debug for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Event")
            .field("signature", &self.signature.to_string())
            .field("connections", &self.num_connections())
            .finish()
    }
}

// -----------------------------------------------------------------------------
// Tests

#[cfg(test)]
mod tests {
    use alloc::sync::Arc;
    use core::sync::atomic::{AtomicI32, Ordering};
    use std::sync::Mutex;

    use serde_json::json;

    use super::Event;
    use crate::error::{CallError, ConnectError};
    use crate::event::DynEventHandler;
    use crate::func::{DynParams, Signature};

    fn summing(total: &Arc<AtomicI32>) -> DynEventHandler {
        let sink = total.clone();
        DynEventHandler::from_fn(move |v: i32| {
            sink.fetch_add(v, Ordering::Relaxed);
        })
    }

    #[test]
    fn connect_emit_disconnect() {
        let event = Event::of::<(i32,)>();
        let total = Arc::new(AtomicI32::new(0));
        let a = event.connect(summing(&total)).unwrap();
        let _b = event.connect(summing(&total)).unwrap();
        assert_eq!(event.num_connections(), 2);

        event.emit_args((1,)).unwrap();
        assert_eq!(total.load(Ordering::Relaxed), 2);

        assert!(event.disconnect(a));
        assert!(!event.disconnect(a));
        event.emit_document(&json!([10])).unwrap();
        assert_eq!(total.load(Ordering::Relaxed), 12);

        event.disconnect_all();
        event.emit_str("5").unwrap();
        assert_eq!(total.load(Ordering::Relaxed), 12);
    }

    #[test]
    fn mismatched_signatures() {
        let event = Event::of::<(i32,)>();
        let wrong = DynEventHandler::from_fn(|_: String| {});
        assert_eq!(
            event.connect(wrong),
            Err(ConnectError::Signature {
                signal: "void(int)".to_owned(),
                slot: "void(String)".to_owned(),
            })
        );
        assert_eq!(event.num_connections(), 0);

        let params = DynParams::new(Signature::of::<(), (f32,)>());
        assert!(matches!(event.emit(&params), Err(CallError::Signature { .. })));
        assert!(event.emit_str("1 2").is_err());
        assert!(event.emit_args(("x".to_owned(),)).is_err());
    }

    #[test]
    fn clones_share_connections() {
        let event = Event::of::<()>();
        let copy = event.clone();
        let hits = Arc::new(Mutex::new(Vec::new()));
        let sink = hits.clone();
        copy.connect(DynEventHandler::from_fn(move || sink.lock().unwrap().push(1)))
            .unwrap();
        event.emit_args(()).unwrap();
        assert!(event.ptr_eq(&copy));
        assert_eq!(*hits.lock().unwrap(), vec![1]);
    }
}
