pub mod types;
pub mod traits;
pub mod error;
pub mod openai;

pub use traits::{
    ChatClient,
    ChatOptions,
    Reply, ReplySource,
    TokenUsage,
    DEFAULT_MAX_TOKENS, DEFAULT_TEMPERATURE,
};

pub use error::RelayError;
pub use openai::{RelayClient, RelayClientBuilder};
pub use types::{Message, Role};
