/*!
Browser bindings: EIP-1193 providers, EIP-6963 announcements on `window`
and `window.localStorage`.
*/

pub mod eip1193;
pub mod eip6963;
pub mod storage;

pub use self::{
    eip1193::{BrowserProvider, Eip1193Provider},
    eip6963::{WindowChannel, WindowSubscription},
    storage::LocalStorage,
};
use crate::{Config, Coordinator, ProviderRegistry};
use wasm_bindgen::{JsCast, JsValue};

/// Coordinator discovering the wallets injected in the page.
pub type BrowserCoordinator = Coordinator<BrowserProvider, WindowChannel, LocalStorage>;

/// Build a coordinator listening on `window` and persisting in
/// `localStorage`. Call [`Coordinator::open`] to start discovering.
pub fn browser_coordinator(config: Config) -> BrowserCoordinator {
    let channel = WindowChannel::new(&config);
    Coordinator::new(config, ProviderRegistry::new(), channel, LocalStorage)
}

pub(crate) fn describe(error: &JsValue) -> String {
    match error.dyn_ref::<js_sys::Error>() {
        Some(error) => String::from(error.message()),
        None => error
            .as_string()
            .unwrap_or_else(|| format!("{error:?}")),
    }
}
