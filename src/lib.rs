pub mod adapters;
pub mod api;
pub mod catalog;
pub mod config;
pub mod controls;
pub mod error;
pub mod ports;
pub mod push;
pub mod session;
pub mod state;
pub mod templates;
pub mod types;

pub use api::ApiClient;
pub use error::{ConsoleError, ConsoleResult};
pub use push::generate_vapid_credentials;
pub use session::ClientSession;
