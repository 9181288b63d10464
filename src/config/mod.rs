pub mod credentials;
pub mod loader;
pub mod types;

pub use credentials::{
    CredentialError, CredentialStore, FileCredentialStore, MemoryCredentialStore, SecureString,
    API_KEY_SECRET,
};
pub use loader::ConfigError;
pub use types::{ApiConfig, Config};
