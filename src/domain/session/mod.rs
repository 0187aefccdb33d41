//! Session domain - wallet connection state

mod state;
mod store;

pub use state::{ConnectionStatus, SessionEvent, WalletSession};
pub use store::{Epoch, SessionStore};
