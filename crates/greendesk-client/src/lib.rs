//! Client layer: typed HTTP access to the compliance backend, last-request-wins
//! sequencing for superseded fetches, and the notification bus.

pub mod config;
pub mod http;
pub mod loader;
pub mod notify;
pub mod resources;
pub mod sequence;

pub use config::ClientConfig;
pub use http::{ApiClient, ClientError};
pub use loader::QuotaLoader;
pub use notify::{Level, Notification, Notifier};
pub use sequence::{Fetched, RequestSequence, Ticket};
