//! Listener registry owned by the session.

use std::fmt;

use crate::engine::models::GameEvent;

pub type Listener = Box<dyn FnMut(&GameEvent) + Send>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

#[derive(Default)]
pub struct EventBus {
    next_id: u64,
    listeners: Vec<(ListenerId, Listener)>,
}

impl EventBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&mut self, listener: Listener) -> ListenerId {
        let id = ListenerId(self.next_id);
        self.next_id += 1;
        self.listeners.push((id, listener));
        id
    }

    /// Returns false if `id` was not subscribed.
    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        let before = self.listeners.len();
        self.listeners.retain(|(lid, _)| *lid != id);
        self.listeners.len() != before
    }

    pub fn len(&self) -> usize {
        self.listeners.len()
    }

    pub fn is_empty(&self) -> bool {
        self.listeners.is_empty()
    }

    /// Deliver `events` in order to every listener, in subscription order.
    pub fn publish(&mut self, events: &[GameEvent]) {
        for event in events {
            for (_, listener) in self.listeners.iter_mut() {
                listener(event);
            }
        }
    }
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("listeners", &self.listeners.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;

    use super::*;

    fn counter(bus: &mut EventBus) -> (ListenerId, Arc<AtomicUsize>) {
        let seen = Arc::new(AtomicUsize::new(0));
        let sink = seen.clone();
        let id = bus.subscribe(Box::new(move |_: &GameEvent| {
            sink.fetch_add(1, Ordering::SeqCst);
        }));
        (id, seen)
    }

    #[test]
    fn test_publish_reaches_every_listener() {
        let mut bus = EventBus::new();
        let (_, a) = counter(&mut bus);
        let (_, b) = counter(&mut bus);
        bus.publish(&[GameEvent::MoveCompleted, GameEvent::ScoreChanged { score: 5 }]);
        assert_eq!(a.load(Ordering::SeqCst), 2);
        assert_eq!(b.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_unsubscribe_stops_delivery() {
        let mut bus = EventBus::new();
        let (id, seen) = counter(&mut bus);
        assert!(bus.unsubscribe(id));
        assert!(!bus.unsubscribe(id));
        bus.publish(&[GameEvent::MoveCompleted]);
        assert_eq!(seen.load(Ordering::SeqCst), 0);
        assert!(bus.is_empty());
    }
}
