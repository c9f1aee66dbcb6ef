pub mod client;
pub mod extract;

pub use client::{RelayClient, RelayClientBuilder, DEFAULT_TIMEOUT};
pub use extract::extract_reply;
