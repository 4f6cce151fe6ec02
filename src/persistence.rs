use crate::{
    config::Config,
    error::{Error, StorageError},
};
use std::{cell::RefCell, collections::HashMap, rc::Rc};

/// Durable string key-value storage, e.g. the browser's `localStorage`.
pub trait KeyValueStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError>;
    fn set(&self, key: &str, value: &str) -> Result<(), StorageError>;
    fn remove(&self, key: &str) -> Result<(), StorageError>;
}

/// In-memory [`KeyValueStore`].
///
/// Clones share the same entries, which is handy to simulate a restart:
/// keep a clone of the store, drop the coordinator and build a new one on
/// the clone.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    entries: Rc<RefCell<HashMap<String, String>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl KeyValueStore for MemoryStore {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        Ok(self.entries.borrow().get(key).cloned())
    }

    fn set(&self, key: &str, value: &str) -> Result<(), StorageError> {
        self.entries
            .borrow_mut()
            .insert(key.to_owned(), value.to_owned());
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), StorageError> {
        self.entries.borrow_mut().remove(key);
        Ok(())
    }
}

/// Last account used with every provider ever connected.
///
/// `None` is kept for providers that were disconnected.
pub type AccountsByIdentifier = HashMap<String, Option<String>>;

/// The selection found in storage.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistedSelection {
    pub identifier: String,
    pub account: Option<String>,
}

/// Reads and writes the selected provider and the per-provider accounts.
///
/// Storage failures never escape: they are logged and reading degrades to
/// "nothing persisted".
pub struct Persistence<S> {
    store: S,
    selected_identifier_key: String,
    accounts_key: String,
}

impl<S: KeyValueStore> Persistence<S> {
    pub fn new(store: S, config: &Config) -> Self {
        Self {
            store,
            selected_identifier_key: config.selected_identifier_key.clone(),
            accounts_key: config.accounts_key.clone(),
        }
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Persist `account` as the account of `identifier` and select it.
    ///
    /// Accounts of other identifiers are preserved: nothing is written if
    /// the existing accounts can't be read.
    pub fn save(&self, identifier: &str, account: &str) {
        let mut accounts = match self.read_accounts() {
            Ok(accounts) => accounts,
            Err(error) => {
                let error = Error::from(error);
                tracing::warn!(%error, %identifier, "couldn't persist the selection");
                return;
            }
        };
        accounts.insert(identifier.to_owned(), Some(account.to_owned()));

        let accounts = match serde_json::to_string(&accounts) {
            Ok(accounts) => accounts,
            Err(error) => {
                tracing::warn!(%error, "couldn't serialize the accounts");
                return;
            }
        };

        // the account is written first: a selection is never persisted
        // without its account
        let result = self
            .store
            .set(&self.accounts_key, &accounts)
            .and_then(|()| self.store.set(&self.selected_identifier_key, identifier));
        if let Err(error) = result {
            let error = Error::from(error);
            tracing::warn!(%error, %identifier, "couldn't persist the selection");
        }
    }

    /// the last saved selection, if any
    pub fn load(&self) -> Option<PersistedSelection> {
        let identifier = match self.store.get(&self.selected_identifier_key) {
            Ok(identifier) => identifier.filter(|identifier| !identifier.is_empty())?,
            Err(error) => {
                let error = Error::from(error);
                tracing::warn!(%error, "couldn't read the persisted selection");
                return None;
            }
        };
        let account = self.load_accounts().remove(&identifier).flatten();

        Some(PersistedSelection {
            identifier,
            account,
        })
    }

    pub fn load_accounts(&self) -> AccountsByIdentifier {
        self.read_accounts().unwrap_or_else(|error| {
            let error = Error::from(error);
            tracing::warn!(%error, "couldn't read the persisted accounts");
            AccountsByIdentifier::new()
        })
    }

    /// a corrupt map reads as empty, only a failing store is an error
    fn read_accounts(&self) -> Result<AccountsByIdentifier, StorageError> {
        let Some(accounts) = self.store.get(&self.accounts_key)? else {
            return Ok(AccountsByIdentifier::new());
        };

        Ok(serde_json::from_str(&accounts).unwrap_or_else(|error| {
            tracing::warn!(%error, "ignoring corrupt persisted accounts");
            AccountsByIdentifier::new()
        }))
    }

    /// Forget the selected identifier, the accounts are retained.
    pub fn clear(&self) {
        if let Err(error) = self.store.remove(&self.selected_identifier_key) {
            let error = Error::from(error);
            tracing::warn!(%error, "couldn't clear the persisted selection");
        }
    }
}
