/// Names used on the announcement channel, in the durable storage and
/// in the provider requests.
///
/// The defaults are the EIP-6963 event names, the EIP-1193 method names
/// and the storage keys applications already have data under. There is
/// rarely a reason to change them except in tests or when two
/// applications share the same origin and need distinct storage keys.
///
/// ```
/// # use eip6963_connector::Config;
/// let config: Config = serde_json::from_str(r#"{
///     "selected_identifier_key": "my-app.selectedWalletRdns"
/// }"#).unwrap();
///
/// assert_eq!(config.selected_identifier_key, "my-app.selectedWalletRdns");
/// assert_eq!(config.announce_event, "eip6963:announceProvider");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, serde::Deserialize, serde::Serialize)]
#[serde(default)]
pub struct Config {
    /// event providers dispatch to announce themselves
    pub announce_event: String,
    /// event dispatched once on `open` to solicit announcements
    pub request_event: String,
    /// storage key of the selected identifier
    pub selected_identifier_key: String,
    /// storage key of the serialized identifier to account map
    pub accounts_key: String,
    pub request_accounts_method: String,
    pub revoke_permissions_method: String,
}

pub const ANNOUNCE_PROVIDER_EVENT: &str = "eip6963:announceProvider";
pub const REQUEST_PROVIDER_EVENT: &str = "eip6963:requestProvider";
pub const REQUEST_ACCOUNTS_METHOD: &str = "eth_requestAccounts";
pub const REVOKE_PERMISSIONS_METHOD: &str = "wallet_revokePermissions";

impl Default for Config {
    fn default() -> Self {
        Self {
            announce_event: ANNOUNCE_PROVIDER_EVENT.to_owned(),
            request_event: REQUEST_PROVIDER_EVENT.to_owned(),
            selected_identifier_key: "selectedWalletRdns".to_owned(),
            accounts_key: "selectedAccountByWalletRdns".to_owned(),
            request_accounts_method: REQUEST_ACCOUNTS_METHOD.to_owned(),
            revoke_permissions_method: REVOKE_PERMISSIONS_METHOD.to_owned(),
        }
    }
}
