use std::{cell::RefCell, rc::Rc};

/// Handle returned by `subscribe`, pass it to `unsubscribe` to stop
/// receiving notifications.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ListenerId(u64);

/// Callbacks interested in a state change.
///
/// Callbacks are invoked with no borrow held on the listener list so they
/// are free to subscribe, unsubscribe or read the state that changed.
#[derive(Default)]
pub(crate) struct Listeners {
    next: RefCell<u64>,
    callbacks: RefCell<Vec<(ListenerId, Rc<dyn Fn()>)>>,
}

impl Listeners {
    pub fn subscribe(&self, callback: impl Fn() + 'static) -> ListenerId {
        let mut next = self.next.borrow_mut();
        let id = ListenerId(*next);
        *next += 1;
        self.callbacks.borrow_mut().push((id, Rc::new(callback)));
        id
    }

    pub fn unsubscribe(&self, id: ListenerId) -> bool {
        let mut callbacks = self.callbacks.borrow_mut();
        let before = callbacks.len();
        callbacks.retain(|(listener, _)| *listener != id);
        callbacks.len() != before
    }

    pub fn notify(&self) {
        let callbacks: Vec<_> = self
            .callbacks
            .borrow()
            .iter()
            .map(|(_, callback)| Rc::clone(callback))
            .collect();
        for callback in callbacks {
            callback();
        }
    }
}
