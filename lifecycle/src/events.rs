//! Events emitted on every case state change.

use jury_types::{CaseId, Category, Side, UserId};

use crate::closer::ClosedCase;

/// Lifecycle events that observers can subscribe to via the [`EventBus`].
#[derive(Clone, Debug)]
pub enum LifecycleEvent {
    /// A new case was submitted.
    CaseOpened {
        case_id: CaseId,
        owner: UserId,
        category: Category,
    },
    /// A voter cast their first vote on a case.
    VoteRecorded {
        case_id: CaseId,
        voter: UserId,
        side: Side,
    },
    /// A voter switched sides within the change window.
    VoteChanged {
        case_id: CaseId,
        voter: UserId,
        from: Side,
        to: Side,
    },
    /// A case closed and its owner was credited.
    CaseClosed(ClosedCase),
}

/// Synchronous fan-out event bus for lifecycle events.
///
/// Listeners are invoked inline on the emitting thread, while the case lock
/// is held; keep handlers fast.
pub struct EventBus {
    listeners: Vec<Box<dyn Fn(&LifecycleEvent) + Send + Sync>>,
}

impl EventBus {
    pub fn new() -> Self {
        Self {
            listeners: Vec::new(),
        }
    }

    pub fn subscribe(&mut self, listener: Box<dyn Fn(&LifecycleEvent) + Send + Sync>) {
        self.listeners.push(listener);
    }

    pub fn emit(&self, event: &LifecycleEvent) {
        for listener in &self.listeners {
            listener(event);
        }
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.len()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::Arc;

    #[test]
    fn every_listener_sees_every_event() {
        let mut bus = EventBus::new();
        let seen = Arc::new(AtomicU32::new(0));
        for _ in 0..2 {
            let seen = Arc::clone(&seen);
            bus.subscribe(Box::new(move |_| {
                seen.fetch_add(1, Ordering::Relaxed);
            }));
        }

        bus.emit(&LifecycleEvent::VoteRecorded {
            case_id: CaseId::new([1; 16]),
            voter: UserId::new("voter"),
            side: Side::SideA,
        });

        assert_eq!(bus.listener_count(), 2);
        assert_eq!(seen.load(Ordering::Relaxed), 2);
    }
}
