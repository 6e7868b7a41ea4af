pub mod credentials;
pub mod factory;
pub mod http_client;
pub mod openai;
pub mod scrub;
pub mod traits;
pub mod types;

pub use credentials::SessionCredential;
pub use factory::create_provider;
pub use scrub::{sanitize_api_error, scrub_secret_patterns};
pub use traits::Provider;
pub use types::{
    ContentBlock, MessageRole, ProviderMessage, ProviderResponse, StopReason, TokenUsage,
};
