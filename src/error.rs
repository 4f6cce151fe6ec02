/// Error codes a provider may reject a request with.
///
/// These are the codes of EIP-1193 plus the JSON-RPC codes wallets commonly
/// return while an account-access prompt is involved.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, thiserror::Error)]
pub enum ProviderErrorCode {
    #[error("The user rejected the request.")]
    UserRejectedRequest,
    #[error("The requested method and/or account has not been authorized by the user.")]
    Unauthorized,
    #[error("The provider does not support the requested method.")]
    UnsupportedMethod,
    /// The provider is disconnected from all chains.
    #[error("The provider is disconnected.")]
    Disconnected,
    #[error("The provider is not connected to the requested chain.")]
    ChainDisconnected,
    /// Usually means a previous account-access prompt is still pending.
    #[error("The requested resource is not available.")]
    ResourceUnavailable,
    #[error("Internal JSON-RPC error.")]
    InternalError,
    #[error("Unknown error code `{0}'")]
    Unknown(i64),
}

impl ProviderErrorCode {
    /// the numeric value of the code, as returned by the provider
    pub fn as_i64(&self) -> i64 {
        match self {
            Self::UserRejectedRequest => 4001,
            Self::Unauthorized => 4100,
            Self::UnsupportedMethod => 4200,
            Self::Disconnected => 4900,
            Self::ChainDisconnected => 4901,
            Self::ResourceUnavailable => -32002,
            Self::InternalError => -32603,
            Self::Unknown(code) => *code,
        }
    }
}

impl From<i64> for ProviderErrorCode {
    fn from(code: i64) -> Self {
        match code {
            4001 => Self::UserRejectedRequest,
            4100 => Self::Unauthorized,
            4200 => Self::UnsupportedMethod,
            4900 => Self::Disconnected,
            4901 => Self::ChainDisconnected,
            -32002 => Self::ResourceUnavailable,
            -32603 => Self::InternalError,
            unknown => Self::Unknown(unknown),
        }
    }
}

/// The failure of a provider's `request` call.
#[derive(Debug, Clone, PartialEq, thiserror::Error, serde::Deserialize)]
#[error("{code}. {message}.")]
pub struct ProviderRpcError {
    pub code: ProviderErrorCode,
    pub message: String,
    #[serde(default)]
    pub data: Option<serde_json::Value>,
}

impl ProviderRpcError {
    pub fn new(code: impl Into<ProviderErrorCode>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            data: None,
        }
    }

    pub(crate) fn internal(message: impl Into<String>) -> Self {
        Self::new(ProviderErrorCode::InternalError, message)
    }

    /// the human readable rendering published on the
    /// [`ErrorChannel`](crate::ErrorChannel).
    pub fn render(&self) -> String {
        format!(
            "Code: {} \nError Message: {}",
            self.code.as_i64(),
            self.message
        )
    }
}

/// Failure of the durable key-value store backing the persisted selection.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum StorageError {
    #[error("Storage is not available: {0}")]
    Unavailable(String),
    #[error("Couldn't write `{key}': {reason}")]
    Write { key: String, reason: String },
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum Error {
    /// The identifier was never announced. This is a caller error: only
    /// identifiers from the registry should be offered for connection.
    #[error("No provider announced with identifier `{0}'")]
    UnknownProvider(String),
    #[error("Account access was rejected: {0}")]
    RequestRejected(#[source] ProviderRpcError),
    #[error("Couldn't revoke the permissions of `{identifier}': {error}")]
    RevocationFailed {
        identifier: String,
        #[source]
        error: ProviderRpcError,
    },
    #[error("Persistence unavailable: {0}")]
    PersistenceUnavailable(#[from] StorageError),
    #[error("The coordinator is already listening for announcements")]
    AlreadyOpen,
}

impl<'de> serde::Deserialize<'de> for ProviderErrorCode {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: serde::Deserializer<'de>,
    {
        struct Visitor;
        impl serde::de::Visitor<'_> for Visitor {
            type Value = ProviderErrorCode;

            fn expecting(&self, formatter: &mut std::fmt::Formatter) -> std::fmt::Result {
                write!(formatter, "Expecting an integer ProviderErrorCode")
            }

            fn visit_i64<E>(self, v: i64) -> Result<Self::Value, E>
            where
                E: serde::de::Error,
            {
                Ok(ProviderErrorCode::from(v))
            }

            fn visit_u64<E>(self, v: u64) -> Result<Self::Value, E>
            where
                E: serde::de::Error,
            {
                i64::try_from(v)
                    .map(ProviderErrorCode::from)
                    .map_err(|_| E::invalid_value(serde::de::Unexpected::Unsigned(v), &self))
            }

            // javascript numbers reach us as floats through serde-wasm-bindgen
            fn visit_f64<E>(self, v: f64) -> Result<Self::Value, E>
            where
                E: serde::de::Error,
            {
                if v.fract() == 0.0 && v >= i64::MIN as f64 && v <= i64::MAX as f64 {
                    Ok(ProviderErrorCode::from(v as i64))
                } else {
                    Err(E::invalid_value(serde::de::Unexpected::Float(v), &self))
                }
            }
        }

        deserializer.deserialize_i64(Visitor)
    }
}
