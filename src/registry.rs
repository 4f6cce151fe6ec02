use crate::{
    listeners::{ListenerId, Listeners},
    provider::ProviderHandle,
};
use std::{cell::RefCell, collections::HashMap, rc::Rc};

/// The providers announced so far, keyed by their identifier.
///
/// The registry is a cheap handle: clones share the same entries, so one
/// instance can be handed to the coordinator and to every consumer that
/// wants to list the providers.
///
/// Entries are never removed. The announcement protocol has no way for a
/// provider to retract itself, so a provider that goes away stays listed
/// for the lifetime of the registry.
pub struct ProviderRegistry<P> {
    inner: Rc<Inner<P>>,
}

struct Inner<P> {
    providers: RefCell<HashMap<String, ProviderHandle<P>>>,
    listeners: Listeners,
}

impl<P> Clone for ProviderRegistry<P> {
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<P> Default for ProviderRegistry<P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P> ProviderRegistry<P> {
    pub fn new() -> Self {
        Self {
            inner: Rc::new(Inner {
                providers: RefCell::new(HashMap::new()),
                listeners: Listeners::default(),
            }),
        }
    }

    /// Record an announced provider.
    ///
    /// Only the first announcement of an identifier is kept: announcing an
    /// identifier already known is a no-op, even if the metadata differs.
    /// Returns `true` if the provider was inserted, in which case the
    /// subscribers are notified.
    pub fn on_announcement(&self, handle: ProviderHandle<P>) -> bool {
        let identifier = handle.identifier().to_owned();
        if identifier.is_empty() {
            tracing::warn!(uuid = %handle.identity().uuid, "ignoring provider announced without identifier");
            return false;
        }

        {
            let mut providers = self.inner.providers.borrow_mut();
            if providers.contains_key(&identifier) {
                tracing::trace!(%identifier, "provider already known");
                return false;
            }
            providers.insert(identifier.clone(), handle);
        }

        tracing::debug!(%identifier, "provider announced");
        self.inner.listeners.notify();
        true
    }

    pub fn get(&self, identifier: &str) -> Option<ProviderHandle<P>> {
        self.inner.providers.borrow().get(identifier).cloned()
    }

    pub fn contains(&self, identifier: &str) -> bool {
        self.inner.providers.borrow().contains_key(identifier)
    }

    /// copy of the current entries
    pub fn snapshot(&self) -> HashMap<String, ProviderHandle<P>> {
        self.inner.providers.borrow().clone()
    }

    pub fn len(&self) -> usize {
        self.inner.providers.borrow().len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.providers.borrow().is_empty()
    }

    /// be notified every time a new provider is inserted
    pub fn subscribe(&self, callback: impl Fn() + 'static) -> ListenerId {
        self.inner.listeners.subscribe(callback)
    }

    pub fn unsubscribe(&self, id: ListenerId) -> bool {
        self.inner.listeners.unsubscribe(id)
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::*;
    use crate::provider::ProviderIdentity;

    fn handle(identifier: &str, name: &str) -> ProviderHandle<()> {
        ProviderHandle::new(
            ProviderIdentity {
                uuid: format!("uuid-{name}"),
                identifier: identifier.to_owned(),
                display_name: name.to_owned(),
                icon: String::new(),
            },
            (),
        )
    }

    #[test]
    fn announcing_twice_keeps_one_entry() {
        let registry = ProviderRegistry::new();

        assert!(registry.on_announcement(handle("io.example.wallet", "first")));
        assert!(!registry.on_announcement(handle("io.example.wallet", "second")));

        assert_eq!(registry.len(), 1);
        assert_eq!(
            registry.get("io.example.wallet").unwrap().display_name(),
            "first"
        );
    }

    #[test]
    fn subscribers_notified_on_insert_only() {
        let registry = ProviderRegistry::new();
        let count = Rc::new(Cell::new(0));
        registry.subscribe({
            let count = Rc::clone(&count);
            move || count.set(count.get() + 1)
        });

        registry.on_announcement(handle("io.example.wallet", "a"));
        registry.on_announcement(handle("io.example.wallet", "a"));
        registry.on_announcement(handle("io.example.other", "b"));

        assert_eq!(count.get(), 2);
        assert_eq!(registry.snapshot().len(), 2);
    }

    #[test]
    fn subscriber_may_read_registry() {
        let registry = ProviderRegistry::new();
        let seen = Rc::new(Cell::new(0));
        registry.subscribe({
            let registry = registry.clone();
            let seen = Rc::clone(&seen);
            move || seen.set(registry.len())
        });

        registry.on_announcement(handle("io.example.wallet", "a"));

        assert_eq!(seen.get(), 1);
    }

    #[test]
    fn empty_identifier_ignored() {
        let registry = ProviderRegistry::new();

        assert!(!registry.on_announcement(handle("", "nameless")));
        assert!(registry.is_empty());
    }
}
