//! Broadcast hub for live-reload clients.
//!
//! Each client owns a dedicated queue; the hub keeps the sending halves in a
//! single mutex-guarded map, so register, unregister and broadcast never
//! observe a half-updated membership set.

use std::sync::atomic::{AtomicU64, Ordering};

use crossbeam::channel::{self, Receiver, Sender};
use parking_lot::Mutex;
use rustc_hash::FxHashMap;

use super::message::ReloadMessage;

/// Opaque identity of a registered client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ClientHandle(u64);

#[derive(Debug, Default)]
pub struct ReloadHub {
    next_id: AtomicU64,
    clients: Mutex<FxHashMap<ClientHandle, Sender<ReloadMessage>>>,
}

impl ReloadHub {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a client. The receiver yields every later broadcast.
    pub fn register(&self) -> (ClientHandle, Receiver<ReloadMessage>) {
        let handle = ClientHandle(self.next_id.fetch_add(1, Ordering::Relaxed));
        let (tx, rx) = channel::unbounded();
        self.clients.lock().insert(handle, tx);
        crate::debug!("reload"; "client {} connected", handle.0);
        (handle, rx)
    }

    /// Remove a client and close its queue. Unknown handles are ignored.
    pub fn unregister(&self, handle: ClientHandle) {
        if self.clients.lock().remove(&handle).is_some() {
            crate::debug!("reload"; "client {} disconnected", handle.0);
        }
    }

    /// Push `msg` to every client, returning how many received it.
    ///
    /// Clients whose receiver is gone are pruned.
    pub fn broadcast(&self, msg: &ReloadMessage) -> usize {
        let mut clients = self.clients.lock();
        if clients.is_empty() {
            crate::debug!("reload"; "no clients connected");
            return 0;
        }

        clients.retain(|handle, tx| match tx.send(msg.clone()) {
            Ok(()) => true,
            Err(_) => {
                crate::debug!("reload"; "client {} gone", handle.0);
                false
            }
        });
        crate::debug!("reload"; "broadcast to {} clients: {}", clients.len(), msg.reason);
        clients.len()
    }

    /// Drop every client queue, ending their streams.
    pub fn close_all(&self) {
        self.clients.lock().clear();
    }

    pub fn len(&self) -> usize {
        self.clients.lock().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_broadcast_reaches_every_client() {
        let hub = ReloadHub::new();
        let (_a, rx_a) = hub.register();
        let (_b, rx_b) = hub.register();

        assert_eq!(hub.broadcast(&ReloadMessage::new("edit")), 2);

        assert_eq!(rx_a.try_recv().unwrap().reason, "edit");
        assert_eq!(rx_b.try_recv().unwrap().reason, "edit");
        assert!(rx_a.try_recv().is_err());
    }

    #[test]
    fn test_unregister_is_idempotent() {
        let hub = ReloadHub::new();
        let (a, rx) = hub.register();

        hub.unregister(a);
        hub.unregister(a);

        assert_eq!(hub.len(), 0);
        assert!(rx.recv().is_err());
    }

    #[test]
    fn test_dropped_receivers_are_pruned() {
        let hub = ReloadHub::new();
        let (_a, rx_a) = hub.register();
        let (_b, rx_b) = hub.register();
        drop(rx_b);

        assert_eq!(hub.broadcast(&ReloadMessage::new("edit")), 1);
        assert_eq!(hub.len(), 1);
        assert!(rx_a.try_recv().is_ok());
    }

    #[test]
    fn test_messages_arrive_in_order() {
        let hub = ReloadHub::new();
        let (_a, rx) = hub.register();

        hub.broadcast(&ReloadMessage::new("first"));
        hub.broadcast(&ReloadMessage::new("second"));

        let reasons: Vec<_> = rx.try_iter().map(|m| m.reason).collect();
        assert_eq!(reasons, ["first", "second"]);
    }

    #[test]
    fn test_close_all_ends_streams() {
        let hub = ReloadHub::new();
        let (_a, rx) = hub.register();

        hub.close_all();

        assert_eq!(hub.len(), 0);
        assert!(rx.recv().is_err());
        assert_eq!(hub.broadcast(&ReloadMessage::new("late")), 0);
    }
}
