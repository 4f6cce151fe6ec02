/*!

# EIP-6963 connector for Ethereum wallets

This library is meant to be used for web applications that need to let the
user pick one of the Ethereum wallets installed in the browser. Wallets
announce themselves with [EIP-6963] and are driven through their [EIP-1193]
provider.

## Features

- Discover the wallets announced in the page
- Connect to one wallet and account at a time
- Remember the connected wallet across page reloads
- Report connection errors to display to the user

## Usage

Create the coordinator and start listening for the wallets:

```no_run
use eip6963_connector::{Config, ffi::browser_coordinator};

let coordinator = browser_coordinator(Config::default());
coordinator.open()?;

for (identifier, wallet) in coordinator.providers() {
    println!("Wallet: {} ({identifier})", wallet.display_name());
}
# Ok::<(), eip6963_connector::error::Error>(())
```

Wallets may announce themselves at any time, use [`Coordinator::subscribe`]
to be notified when the list or the selection changes. Connecting prompts
the user in the wallet and adopts the first account it returns:

```no_run
# use eip6963_connector::{Config, ConnectOutcome, ffi::browser_coordinator};
#
# async fn test() -> anyhow::Result<()> {
# let coordinator = browser_coordinator(Config::default());
match coordinator.connect("io.metamask").await? {
    ConnectOutcome::Connected(selection) => println!("connected {:?}", selection.account),
    ConnectOutcome::NoAccounts => {}
    ConnectOutcome::Rejected(_) => println!("{:?}", coordinator.error_message()),
}
# Ok(()) }
```

Outside of a browser the same [`Coordinator`] works with any
[`AnnouncementChannel`], [`Provider`] and [`KeyValueStore`], for example
[`LocalChannel`] and [`MemoryStore`].

[EIP-6963]: https://eips.ethereum.org/EIPS/eip-6963
[EIP-1193]: https://eips.ethereum.org/EIPS/eip-1193

*/

pub mod announcement;
mod config;
mod coordinator;
pub mod error;
mod error_channel;
pub mod ffi;
mod listeners;
pub mod persistence;
mod provider;
mod registry;
#[cfg(test)]
mod testing;

pub use self::{
    announcement::{AnnouncementChannel, LocalChannel},
    config::Config,
    coordinator::{ConnectOutcome, Coordinator, Selection},
    error_channel::ErrorChannel,
    listeners::ListenerId,
    persistence::{KeyValueStore, MemoryStore, Persistence},
    provider::{Provider, ProviderHandle, ProviderIdentity, RequestArguments},
    registry::ProviderRegistry,
};
