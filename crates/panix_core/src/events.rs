//! Game notifications.
//!
//! Managers emit [`GameEvent`]s into an [`EventBus`] they are handed. The bus
//! calls registered listeners synchronously and also keeps a log the host can
//! drain once per frame, so a UI can either react immediately or poll. The
//! log holds at most [`MAX_PENDING`] events; older ones are dropped when a
//! host never drains.

use std::collections::VecDeque;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::hex::HexCoord;

/// Something observers may care about.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum GameEvent {
    /// A structure was placed.
    StructureBuilt {
        /// Structure type id.
        structure_type: String,
        /// Where it was placed.
        coord: HexCoord,
    },
    /// A structure was removed.
    StructureDemolished {
        /// Where it stood.
        coord: HexCoord,
    },
    /// A player setting changed.
    SettingsUpdated {
        /// Setting key, e.g. `"playerName"`.
        key: String,
    },
}

impl GameEvent {
    /// Discriminant used for subscription filtering.
    #[must_use]
    pub const fn kind(&self) -> EventKind {
        match self {
            Self::StructureBuilt { .. } => EventKind::StructureBuilt,
            Self::StructureDemolished { .. } => EventKind::StructureDemolished,
            Self::SettingsUpdated { .. } => EventKind::SettingsUpdated,
        }
    }
}

/// Event categories a listener can subscribe to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EventKind {
    /// [`GameEvent::StructureBuilt`].
    StructureBuilt,
    /// [`GameEvent::StructureDemolished`].
    StructureDemolished,
    /// [`GameEvent::SettingsUpdated`].
    SettingsUpdated,
}

/// Capacity of the undrained event log.
pub const MAX_PENDING: usize = 256;

/// Handle returned by [`EventBus::subscribe`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

type Listener = Box<dyn FnMut(&GameEvent) + Send>;

struct Subscription {
    id: SubscriptionId,
    kind: Option<EventKind>,
    listener: Listener,
}

/// Observer registry plus pending event log.
#[derive(Default)]
pub struct EventBus {
    next_id: u64,
    subscriptions: Vec<Subscription>,
    pending: VecDeque<GameEvent>,
    dropped: u64,
}

impl fmt::Debug for EventBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("EventBus")
            .field("subscriptions", &self.subscriptions.len())
            .field("pending", &self.pending)
            .field("dropped", &self.dropped)
            .finish()
    }
}

impl EventBus {
    /// Create an empty bus.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a listener for one kind of event.
    pub fn subscribe(
        &mut self,
        kind: EventKind,
        listener: impl FnMut(&GameEvent) + Send + 'static,
    ) -> SubscriptionId {
        self.register(Some(kind), Box::new(listener))
    }

    /// Register a listener for every event.
    pub fn subscribe_all(
        &mut self,
        listener: impl FnMut(&GameEvent) + Send + 'static,
    ) -> SubscriptionId {
        self.register(None, Box::new(listener))
    }

    fn register(&mut self, kind: Option<EventKind>, listener: Listener) -> SubscriptionId {
        let id = SubscriptionId(self.next_id);
        self.next_id += 1;
        self.subscriptions.push(Subscription { id, kind, listener });
        id
    }

    /// Remove a listener. Returns `false` if it was not registered.
    pub fn unsubscribe(&mut self, id: SubscriptionId) -> bool {
        let before = self.subscriptions.len();
        self.subscriptions.retain(|s| s.id != id);
        self.subscriptions.len() != before
    }

    /// Number of registered listeners.
    #[must_use]
    pub fn listener_count(&self) -> usize {
        self.subscriptions.len()
    }

    /// Deliver an event to matching listeners and append it to the log.
    ///
    /// A full log drops its oldest event.
    pub fn emit(&mut self, event: GameEvent) {
        let kind = event.kind();
        for subscription in &mut self.subscriptions {
            if subscription.kind.map_or(true, |k| k == kind) {
                (subscription.listener)(&event);
            }
        }
        if self.pending.len() == MAX_PENDING {
            self.pending.pop_front();
            self.dropped += 1;
            if self.dropped == 1 {
                tracing::warn!(capacity = MAX_PENDING, "Event log full, dropping oldest events");
            }
        }
        self.pending.push_back(event);
    }

    /// Events emitted since the last drain, oldest first.
    #[must_use]
    pub const fn pending(&self) -> &VecDeque<GameEvent> {
        &self.pending
    }

    /// Events dropped from a full log since the last drain.
    #[must_use]
    pub const fn dropped(&self) -> u64 {
        self.dropped
    }

    /// Take every logged event, oldest first.
    pub fn drain(&mut self) -> Vec<GameEvent> {
        self.dropped = 0;
        self.pending.drain(..).collect()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};

    use super::*;

    fn built(q: i32, r: i32) -> GameEvent {
        GameEvent::StructureBuilt {
            structure_type: "solarPanel".to_string(),
            coord: HexCoord::new(q, r),
        }
    }

    #[test]
    fn test_listener_receives_matching_kind() {
        let seen = Arc::new(Mutex::new(Vec::new()));
        let sink = Arc::clone(&seen);

        let mut bus = EventBus::new();
        bus.subscribe(EventKind::StructureBuilt, move |e| {
            sink.lock().unwrap().push(e.clone());
        });

        bus.emit(built(1, 2));
        bus.emit(GameEvent::StructureDemolished {
            coord: HexCoord::new(1, 2),
        });

        assert_eq!(*seen.lock().unwrap(), vec![built(1, 2)]);
        assert_eq!(bus.pending().len(), 2);
    }

    #[test]
    fn test_unsubscribe_stops_delivery() {
        let count = Arc::new(Mutex::new(0));
        let sink = Arc::clone(&count);

        let mut bus = EventBus::new();
        let id = bus.subscribe_all(move |_| *sink.lock().unwrap() += 1);
        bus.emit(built(0, 0));
        assert!(bus.unsubscribe(id));
        assert!(!bus.unsubscribe(id));
        bus.emit(built(0, 1));

        assert_eq!(*count.lock().unwrap(), 1);
        assert_eq!(bus.listener_count(), 0);
    }

    #[test]
    fn test_drain_empties_log() {
        let mut bus = EventBus::new();
        bus.emit(GameEvent::SettingsUpdated {
            key: "language".to_string(),
        });
        assert_eq!(bus.drain().len(), 1);
        assert!(bus.drain().is_empty());
    }

    #[test]
    fn test_undrained_log_keeps_newest() {
        let mut bus = EventBus::new();
        bus.subscribe_all(|_| {});
        let total = MAX_PENDING as i32 + 10;
        for q in 0..total {
            bus.emit(built(q, 0));
        }

        assert_eq!(bus.pending().len(), MAX_PENDING);
        assert_eq!(bus.dropped(), 10);
        assert_eq!(bus.pending().front(), Some(&built(10, 0)));
        assert_eq!(bus.pending().back(), Some(&built(total - 1, 0)));

        assert_eq!(bus.drain().len(), MAX_PENDING);
        assert_eq!(bus.dropped(), 0);
    }

    #[test]
    fn test_event_json_shape() {
        let json = serde_json::to_value(built(3, -1)).unwrap();
        assert_eq!(json["event"], "structure_built");
        assert_eq!(json["structure_type"], "solarPanel");
        assert_eq!(json["coord"]["q"], 3);
    }
}
