use crate::{
    announcement::AnnouncementChannel,
    config::Config,
    error::{Error, ProviderRpcError},
    error_channel::ErrorChannel,
    listeners::{ListenerId, Listeners},
    persistence::{AccountsByIdentifier, KeyValueStore, Persistence},
    provider::{Provider, ProviderHandle, RequestArguments, first_account},
    registry::ProviderRegistry,
};
use std::{
    cell::{Cell, RefCell},
    collections::HashMap,
    rc::{Rc, Weak},
};

/// The active provider and the account adopted from it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selection {
    pub identifier: String,
    /// `None` only if the selection was restored from a storage that lost
    /// the account.
    pub account: Option<String>,
}

/// How a [`Coordinator::connect`] settled.
#[derive(Debug, Clone, PartialEq)]
pub enum ConnectOutcome {
    /// the first account returned by the provider is now selected
    Connected(Selection),
    /// the provider approved the request but granted no account, nothing
    /// changed
    NoAccounts,
    /// the provider refused or failed, the rendered error is available from
    /// [`Coordinator::error_message`]
    Rejected(ProviderRpcError),
}

#[derive(Default)]
struct SelectionState {
    selected: Option<String>,
    accounts: AccountsByIdentifier,
    /// identifier restored from storage, waiting for its announcement
    staged: Option<String>,
}

/// Discovers providers and keeps at most one of them connected.
///
/// The coordinator listens to the announcement channel between
/// [`open`](Coordinator::open) and [`close`](Coordinator::close), records
/// the announced providers in its [`ProviderRegistry`], runs the
/// account-access and revocation requests and persists the selection so it
/// can be restored on the next [`open`](Coordinator::open).
///
/// Clones share the same state. Everything runs on one thread: requests may
/// be in flight concurrently but every state change is applied in one
/// step, and when two connects settle the one settling last wins.
pub struct Coordinator<P, C, S>
where
    C: AnnouncementChannel<P>,
{
    inner: Rc<Inner<P, C, S>>,
}

struct Inner<P, C, S>
where
    C: AnnouncementChannel<P>,
{
    config: Config,
    registry: ProviderRegistry<P>,
    channel: C,
    persistence: Persistence<S>,
    errors: ErrorChannel,
    state: RefCell<SelectionState>,
    subscription: RefCell<Option<C::Subscription>>,
    listeners: Listeners,
    registry_listener: Cell<Option<ListenerId>>,
}

impl<P, C, S> Clone for Coordinator<P, C, S>
where
    C: AnnouncementChannel<P>,
{
    fn clone(&self) -> Self {
        Self {
            inner: Rc::clone(&self.inner),
        }
    }
}

impl<P, C, S> Coordinator<P, C, S>
where
    P: Provider + 'static,
    C: AnnouncementChannel<P> + 'static,
    S: KeyValueStore + 'static,
{
    pub fn new(config: Config, registry: ProviderRegistry<P>, channel: C, store: S) -> Self {
        let persistence = Persistence::new(store, &config);
        let inner = Rc::new(Inner {
            config,
            registry,
            channel,
            persistence,
            errors: ErrorChannel::new(),
            state: RefCell::new(SelectionState::default()),
            subscription: RefCell::new(None),
            listeners: Listeners::default(),
            registry_listener: Cell::new(None),
        });

        let weak = Rc::downgrade(&inner);
        let id = inner.registry.subscribe(move || {
            if let Some(inner) = weak.upgrade() {
                inner.on_registry_change();
            }
        });
        inner.registry_listener.set(Some(id));

        Self { inner }
    }

    /// Start listening for announcements.
    ///
    /// The persisted selection is staged and only applied once its provider
    /// is announced. Providers already loaded are asked to announce
    /// themselves.
    pub fn open(&self) -> Result<(), Error> {
        if self.is_open() {
            return Err(Error::AlreadyOpen);
        }

        self.inner.restore();

        let weak: Weak<Inner<P, C, S>> = Rc::downgrade(&self.inner);
        let subscription = self
            .inner
            .channel
            .subscribe(Rc::new(move |handle: ProviderHandle<P>| {
                if let Some(inner) = weak.upgrade() {
                    inner.on_announcement(handle);
                }
            }));
        *self.inner.subscription.borrow_mut() = Some(subscription);

        tracing::debug!(event = %self.inner.config.request_event, "requesting provider announcements");
        self.inner.channel.request_announcements();
        Ok(())
    }

    /// Stop listening for announcements. The registry and the selection
    /// are kept.
    pub fn close(&self) {
        if self.inner.subscription.borrow_mut().take().is_some() {
            tracing::debug!("stopped listening for provider announcements");
        }
    }

    pub fn is_open(&self) -> bool {
        self.inner.subscription.borrow().is_some()
    }

    pub fn config(&self) -> &Config {
        &self.inner.config
    }

    pub fn registry(&self) -> &ProviderRegistry<P> {
        &self.inner.registry
    }

    /// all the providers announced so far, by identifier
    pub fn providers(&self) -> HashMap<String, ProviderHandle<P>> {
        self.inner.registry.snapshot()
    }

    pub fn provider(&self, identifier: &str) -> Option<ProviderHandle<P>> {
        self.inner.registry.get(identifier)
    }

    pub fn selection(&self) -> Option<Selection> {
        let state = self.inner.state.borrow();
        let identifier = state.selected.clone()?;
        let account = state.accounts.get(&identifier).cloned().flatten();
        Some(Selection {
            identifier,
            account,
        })
    }

    pub fn selected_provider(&self) -> Option<ProviderHandle<P>> {
        let identifier = self.inner.state.borrow().selected.clone()?;
        self.inner.registry.get(&identifier)
    }

    pub fn selected_account(&self) -> Option<String> {
        self.selection().and_then(|selection| selection.account)
    }

    /// the last account adopted from `identifier`, selected or not
    pub fn account_for(&self, identifier: &str) -> Option<String> {
        self.inner
            .state
            .borrow()
            .accounts
            .get(identifier)
            .cloned()
            .flatten()
    }

    pub fn error_message(&self) -> Option<String> {
        self.inner.errors.current()
    }

    pub fn clear_error(&self) {
        if self.inner.errors.clear() {
            self.inner.listeners.notify();
        }
    }

    /// be notified of every change of the providers, the selection or the
    /// error message
    pub fn subscribe(&self, callback: impl Fn() + 'static) -> ListenerId {
        self.inner.listeners.subscribe(callback)
    }

    pub fn unsubscribe(&self, id: ListenerId) -> bool {
        self.inner.listeners.unsubscribe(id)
    }

    /// Ask the provider `identifier` for account access and select it with
    /// the first account it returns.
    ///
    /// Fails with [`Error::UnknownProvider`] if `identifier` was never
    /// announced, without touching the error message. Every provider-side
    /// failure is reported through [`ConnectOutcome::Rejected`] and the
    /// error message, and leaves the selection unchanged.
    ///
    /// There is no timeout: a provider that never answers leaves the
    /// returned future pending forever.
    pub async fn connect(&self, identifier: &str) -> Result<ConnectOutcome, Error> {
        let handle = self
            .inner
            .registry
            .get(identifier)
            .ok_or_else(|| Error::UnknownProvider(identifier.to_owned()))?;

        self.clear_error();

        tracing::debug!(%identifier, "requesting account access");
        let arguments = RequestArguments::new(&self.inner.config.request_accounts_method);
        match handle.request(arguments).await {
            Ok(result) => match first_account(result) {
                Some(account) => Ok(ConnectOutcome::Connected(
                    self.inner.adopt(identifier, account),
                )),
                None => {
                    tracing::debug!(%identifier, "provider granted no account");
                    Ok(ConnectOutcome::NoAccounts)
                }
            },
            Err(error) => {
                let rejected = Error::RequestRejected(error.clone());
                tracing::warn!(error = %rejected, %identifier, "failed to connect to provider");
                self.inner.errors.set(error.render());
                self.inner.listeners.notify();
                Ok(ConnectOutcome::Rejected(error))
            }
        }
    }

    /// Clear the selection and ask the provider to revoke the permissions
    /// it granted.
    ///
    /// The selection is cleared before the revocation is requested and
    /// whatever its outcome; a failed revocation is only logged. Returns
    /// `false` if nothing was selected.
    pub async fn disconnect(&self) -> bool {
        let Some(identifier) = self.inner.release() else {
            return false;
        };

        let Some(handle) = self.inner.registry.get(&identifier) else {
            tracing::warn!(%identifier, "disconnected provider is not in the registry");
            return true;
        };

        let arguments = RequestArguments::new(&self.inner.config.revoke_permissions_method)
            .with_params(vec![serde_json::json!({ "eth_accounts": {} })]);
        match handle.request(arguments).await {
            Ok(_) => tracing::debug!(%identifier, "permissions revoked"),
            Err(error) => {
                let error = Error::RevocationFailed {
                    identifier: identifier.clone(),
                    error,
                };
                tracing::warn!(%error, "failed to revoke permissions");
            }
        }
        true
    }
}

impl<P, C, S> Inner<P, C, S>
where
    C: AnnouncementChannel<P>,
    S: KeyValueStore,
{
    fn restore(&self) {
        let accounts = self.persistence.load_accounts();
        let persisted = self.persistence.load();

        let mut state = self.state.borrow_mut();
        for (identifier, account) in accounts {
            state.accounts.entry(identifier).or_insert(account);
        }
        if state.selected.is_none() {
            if let Some(persisted) = persisted {
                tracing::debug!(identifier = %persisted.identifier, "staging persisted selection");
                state.staged = Some(persisted.identifier);
            }
        }
        drop(state);

        // the registry may be shared and already know the staged provider
        let staged = self.state.borrow().staged.clone();
        if let Some(staged) = staged {
            if self.registry.contains(&staged) {
                self.apply_staged(&staged);
            }
        }
    }

    fn on_announcement(&self, handle: ProviderHandle<P>) {
        let identifier = handle.identifier().to_owned();
        self.registry.on_announcement(handle);
        // a re-announcement of a known provider does not notify the registry
        self.apply_staged(&identifier);
    }

    /// Called for every insert in the registry, whoever fed it.
    fn on_registry_change(&self) {
        let staged = self.state.borrow().staged.clone();
        match staged {
            Some(staged) if self.registry.contains(&staged) => self.apply_staged(&staged),
            _ => self.listeners.notify(),
        }
    }

    fn apply_staged(&self, identifier: &str) {
        let restored = {
            let mut state = self.state.borrow_mut();
            if state.staged.as_deref() == Some(identifier) {
                state.staged = None;
                state.selected = Some(identifier.to_owned());
                true
            } else {
                false
            }
        };

        if restored {
            tracing::debug!(%identifier, "restored persisted selection");
            self.listeners.notify();
        }
    }

    fn adopt(&self, identifier: &str, account: String) -> Selection {
        {
            let mut state = self.state.borrow_mut();
            state.selected = Some(identifier.to_owned());
            state
                .accounts
                .insert(identifier.to_owned(), Some(account.clone()));
            state.staged = None;
        }
        self.errors.clear();
        self.persistence.save(identifier, &account);

        tracing::info!(%identifier, %account, "connected to provider");
        self.listeners.notify();

        Selection {
            identifier: identifier.to_owned(),
            account: Some(account),
        }
    }

    /// clear the selection, returns what was selected
    fn release(&self) -> Option<String> {
        let identifier = {
            let mut state = self.state.borrow_mut();
            let identifier = state.selected.take()?;
            state.accounts.insert(identifier.clone(), None);
            state.staged = None;
            identifier
        };
        self.persistence.clear();

        tracing::info!(%identifier, "disconnected from provider");
        self.listeners.notify();
        Some(identifier)
    }
}

impl<P, C, S> Drop for Inner<P, C, S>
where
    C: AnnouncementChannel<P>,
{
    fn drop(&mut self) {
        if let Some(id) = self.registry_listener.take() {
            self.registry.unsubscribe(id);
        }
    }
}
