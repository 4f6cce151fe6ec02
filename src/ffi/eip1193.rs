use super::describe;
use crate::{
    error::ProviderRpcError,
    provider::{Provider, RequestArguments},
};
use serde::Serialize as _;
use serde_json::Value;
use std::future::Future;
use wasm_bindgen::prelude::*;

#[wasm_bindgen]
extern "C" {
    /// An EIP-1193 provider object as injected by a wallet extension.
    #[derive(Clone, PartialEq)]
    pub type Eip1193Provider;

    /// Submit a request to the provider. `arguments` is an object
    /// `{ method, params }`, the returned promise settles with the result
    /// or rejects with a `ProviderRpcError` (`{ code, message, data }`).
    ///
    /// More details [EIP-1193](https://eips.ethereum.org/EIPS/eip-1193#request-1)
    #[wasm_bindgen(method, catch, js_name = "request")]
    pub async fn request(this: &Eip1193Provider, arguments: JsValue) -> Result<JsValue, JsValue>;
}

/// [`Provider`] backed by an injected EIP-1193 provider object.
#[derive(Clone, PartialEq)]
pub struct BrowserProvider {
    eip1193: Eip1193Provider,
}

impl BrowserProvider {
    pub fn new(eip1193: Eip1193Provider) -> Self {
        Self { eip1193 }
    }

    /// the raw javascript provider object
    pub fn eip1193(&self) -> &Eip1193Provider {
        &self.eip1193
    }
}

impl Provider for BrowserProvider {
    fn request(
        &self,
        arguments: RequestArguments,
    ) -> impl Future<Output = Result<Value, ProviderRpcError>> {
        async move {
            let serializer = serde_wasm_bindgen::Serializer::json_compatible();
            let arguments = arguments.serialize(&serializer).map_err(|error| {
                ProviderRpcError::internal(format!("Couldn't encode the request: {error}"))
            })?;

            match self.eip1193.request(arguments).await {
                Ok(result) => serde_wasm_bindgen::from_value(result).map_err(|error| {
                    ProviderRpcError::internal(format!("Couldn't decode the result: {error}"))
                }),
                Err(error) => Err(decode_error(error)),
            }
        }
    }
}

fn decode_error(error: JsValue) -> ProviderRpcError {
    serde_wasm_bindgen::from_value(error.clone()).unwrap_or_else(|decode_error| {
        ProviderRpcError::internal(format!(
            "{} (couldn't decode the error content: {decode_error})",
            describe(&error)
        ))
    })
}
