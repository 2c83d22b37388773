use std::cell::{Cell, RefCell};
use std::rc::Rc;

use crate::dom::element::Element;

pub type EventCallback = Rc<dyn Fn(&Event)>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

/// A dispatched event as seen by listeners.
#[derive(Debug, Clone)]
pub struct Event {
    pub name: String,
    pub target: Element,
}

struct Listener {
    id: ListenerId,
    target: Element,
    event: String,
    callback: EventCallback,
}

/// Synchronous event substrate with bubbling from the target to its ancestors.
#[derive(Default)]
pub struct EventRegistry {
    listeners: RefCell<Vec<Listener>>,
    next_id: Cell<u64>,
}

impl EventRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&self, target: &Element, event: &str, callback: EventCallback) -> ListenerId {
        let id = ListenerId(self.next_id.get());
        self.next_id.set(id.0 + 1);
        self.listeners.borrow_mut().push(Listener {
            id,
            target: target.clone(),
            event: event.to_string(),
            callback,
        });
        id
    }

    /// Removes a listener. Returns `false` if it was not attached.
    pub fn unsubscribe(&self, id: ListenerId) -> bool {
        let mut listeners = self.listeners.borrow_mut();
        let before = listeners.len();
        listeners.retain(|l| l.id != id);
        listeners.len() != before
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.borrow().len()
    }

    fn is_registered(&self, id: ListenerId) -> bool {
        self.listeners.borrow().iter().any(|l| l.id == id)
    }

    /// Fires `event` at `target`, then at each ancestor. Returns how many
    /// listeners ran.
    ///
    /// A listener removed by an earlier listener of the same dispatch is
    /// skipped; one added during dispatch waits for the next event.
    pub fn dispatch(&self, target: &Element, event: &str) -> usize {
        let mut path = vec![target.clone()];
        let mut current = target.parent();
        while let Some(el) = current {
            current = el.parent();
            path.push(el);
        }

        // Snapshot callbacks so listeners may (un)subscribe while running.
        let mut callbacks: Vec<(ListenerId, EventCallback)> = Vec::new();
        {
            let listeners = self.listeners.borrow();
            for node in &path {
                for listener in listeners.iter() {
                    if listener.event == event && listener.target.same(node) {
                        callbacks.push((listener.id, listener.callback.clone()));
                    }
                }
            }
        }

        let payload = Event {
            name: event.to_string(),
            target: target.clone(),
        };
        let mut ran = 0;
        for (id, callback) in &callbacks {
            if !self.is_registered(*id) {
                continue;
            }
            callback(&payload);
            ran += 1;
        }
        ran
    }
}
