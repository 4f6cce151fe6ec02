use super::{BrowserProvider, Eip1193Provider};
use crate::{
    announcement::{AnnouncementChannel, AnnouncementListener},
    config::Config,
    provider::{ProviderHandle, ProviderIdentity},
};
use wasm_bindgen::{JsCast, prelude::*};

#[wasm_bindgen]
extern "C" {
    #[wasm_bindgen(js_namespace = ["window"], js_name = "addEventListener")]
    fn add_event_listener(event: &str, listener: &js_sys::Function);
    #[wasm_bindgen(js_namespace = ["window"], js_name = "removeEventListener")]
    fn remove_event_listener(event: &str, listener: &js_sys::Function);
    #[wasm_bindgen(js_namespace = ["window"], js_name = "dispatchEvent")]
    fn dispatch_event(event: &Event) -> bool;
}

#[wasm_bindgen]
extern "C" {
    pub type Event;

    #[wasm_bindgen(constructor)]
    pub fn new(name: &str) -> Event;

    /// The event wallets dispatch to announce themselves, its `detail` is
    /// `{ info, provider }`.
    #[wasm_bindgen(extends = Event)]
    pub type CustomEvent;

    #[wasm_bindgen(method, getter)]
    pub fn detail(this: &CustomEvent) -> JsValue;
}

/// EIP-6963 announcements received on `window`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WindowChannel {
    announce_event: String,
    request_event: String,
}

/// Keeps the `window` event listener attached, removes it when dropped.
pub struct WindowSubscription {
    event: String,
    closure: Closure<dyn FnMut(JsValue)>,
}

impl WindowChannel {
    pub fn new(config: &Config) -> Self {
        Self {
            announce_event: config.announce_event.clone(),
            request_event: config.request_event.clone(),
        }
    }
}

impl AnnouncementChannel<BrowserProvider> for WindowChannel {
    type Subscription = WindowSubscription;

    fn subscribe(&self, listener: AnnouncementListener<BrowserProvider>) -> Self::Subscription {
        let closure = Closure::<dyn FnMut(JsValue)>::new(move |event: JsValue| {
            let event: CustomEvent = event.unchecked_into();
            match announced_provider(&event.detail()) {
                Some(handle) => listener(handle),
                None => tracing::warn!("ignoring malformed provider announcement"),
            }
        });
        add_event_listener(&self.announce_event, closure.as_ref().unchecked_ref());

        WindowSubscription {
            event: self.announce_event.clone(),
            closure,
        }
    }

    fn request_announcements(&self) {
        dispatch_event(&Event::new(&self.request_event));
    }
}

impl Drop for WindowSubscription {
    fn drop(&mut self) {
        remove_event_listener(&self.event, self.closure.as_ref().unchecked_ref());
    }
}

fn announced_provider(detail: &JsValue) -> Option<ProviderHandle<BrowserProvider>> {
    let info = js_sys::Reflect::get(detail, &JsValue::from_str("info")).ok()?;
    let provider = js_sys::Reflect::get(detail, &JsValue::from_str("provider")).ok()?;
    if !looks_like_eip6963_info(&info) || !looks_like_eip1193_provider(&provider) {
        return None;
    }

    let identity: ProviderIdentity = serde_wasm_bindgen::from_value(info).ok()?;
    Some(ProviderHandle::new(
        identity,
        BrowserProvider::new(Eip1193Provider::from(provider)),
    ))
}

fn looks_like_eip6963_info(value: &JsValue) -> bool {
    if !value.is_object() {
        return false;
    }

    let has_string_property = |prop: &str| {
        js_sys::Reflect::get(value, &JsValue::from_str(prop))
            .ok()
            .and_then(|v| v.as_string())
            .is_some()
    };

    has_string_property("uuid")
        && has_string_property("name")
        && has_string_property("icon")
        && has_string_property("rdns")
}

fn looks_like_eip1193_provider(value: &JsValue) -> bool {
    value.is_object()
        && js_sys::Reflect::get(value, &JsValue::from_str("request"))
            .ok()
            .map(|v| v.is_function())
            .unwrap_or(false)
}
