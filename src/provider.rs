use crate::error::ProviderRpcError;
use serde_json::Value;
use std::{future::Future, rc::Rc};

/// Metadata a provider announces about itself.
///
/// Field names on the wire follow the EIP-6963 `info` object.
#[derive(Debug, Clone, PartialEq, Eq, Hash, serde::Deserialize, serde::Serialize)]
pub struct ProviderIdentity {
    /// random identifier generated by the provider for this page load
    pub uuid: String,
    /// stable reverse-domain name (e.g. `"io.metamask"`), the registry key
    #[serde(rename = "rdns")]
    pub identifier: String,
    /// name to display to the user
    #[serde(rename = "name")]
    pub display_name: String,
    /// data URI of the provider's icon, ready for an `img` `src`
    pub icon: String,
}

/// Arguments of a provider request: `{ method, params? }`.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct RequestArguments {
    pub method: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub params: Option<Vec<Value>>,
}

impl RequestArguments {
    pub fn new(method: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            params: None,
        }
    }

    pub fn with_params(mut self, params: Vec<Value>) -> Self {
        self.params = Some(params);
        self
    }
}

/// The single capability needed from a provider: an EIP-1193 style
/// request/response call.
///
/// The returned future does not need to be `Send`, everything runs on the
/// thread that owns the coordinator.
pub trait Provider {
    fn request(
        &self,
        arguments: RequestArguments,
    ) -> impl Future<Output = Result<Value, ProviderRpcError>>;
}

/// An announced provider: its identity and the request capability.
#[derive(Debug)]
pub struct ProviderHandle<P> {
    identity: ProviderIdentity,
    provider: Rc<P>,
}

impl<P> Clone for ProviderHandle<P> {
    fn clone(&self) -> Self {
        Self {
            identity: self.identity.clone(),
            provider: Rc::clone(&self.provider),
        }
    }
}

impl<P> ProviderHandle<P> {
    pub fn new(identity: ProviderIdentity, provider: P) -> Self {
        Self {
            identity,
            provider: Rc::new(provider),
        }
    }

    pub fn identity(&self) -> &ProviderIdentity {
        &self.identity
    }

    /// shortcut for `self.identity().identifier`
    pub fn identifier(&self) -> &str {
        &self.identity.identifier
    }

    pub fn display_name(&self) -> &str {
        &self.identity.display_name
    }

    pub fn icon(&self) -> &str {
        &self.identity.icon
    }

    pub fn provider(&self) -> &P {
        &self.provider
    }
}

impl<P: Provider> ProviderHandle<P> {
    pub async fn request(&self, arguments: RequestArguments) -> Result<Value, ProviderRpcError> {
        self.provider.request(arguments).await
    }
}

/// Decode the result of an account-access request.
///
/// Returns the first account only if the provider returned a list whose
/// first element is a non-empty string.
pub(crate) fn first_account(result: Value) -> Option<String> {
    match serde_json::from_value::<Option<Vec<String>>>(result) {
        Ok(accounts) => accounts
            .and_then(|accounts| accounts.into_iter().next())
            .filter(|account| !account.is_empty()),
        Err(error) => {
            tracing::warn!(%error, "unexpected account list returned by the provider");
            None
        }
    }
}
