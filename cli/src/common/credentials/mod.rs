//! # Luma Credentials (`common::credentials`)
//!
//! File: cli/src/common/credentials/mod.rs
//! Author: Christi Mahu
//!
//! ## Overview
//!
//! The deployment service authenticates every request with an API key sent in
//! the `x-api-key` header. This module supplies that key.
//!
//! ## Architecture
//!
//! - **`CredentialProvider`**: the trait the deploy pipeline depends on. The
//!   pipeline asks it once, off the async runtime, and hands the resulting key
//!   to the HTTP client. Implementations are swappable so tests inject fixed keys.
//! - **`StoredCredentials`**: looks the key up in a `SecretStore`; if absent,
//!   asks a `SecretPrompt` and persists the answer. The result is cached, so a
//!   process prompts at most once.
//! - **`StaticCredentials`**: a key supplied up front (`--api-key` /
//!   `LUMA_API_KEY`), used by CI and tests.
//! - **`store::KeyringStore`**: the platform secret store backing `StoredCredentials`.
//!
//! The key itself is wrapped in `ApiKey`, whose `Debug` output is redacted so
//! it cannot leak into logs by accident.
//!
//! ## Usage
//!
//! ```rust
//! let credentials = credentials::default_provider(args.api_key.clone())?;
//! let key = credentials.api_key()?;
//! request.header("x-api-key", key.expose());
//! ```
//!
use crate::common::ui::prompts::TerminalPrompt;
use crate::core::error::{LumaError, Result};
use std::fmt;
use std::sync::{Arc, Mutex};
use tracing::{debug, info, warn};

pub mod store;

/// Secret store service name under which the key is persisted.
pub const SERVICE_NAME: &str = "ike";
/// Secret store account name under which the key is persisted.
pub const ACCOUNT_NAME: &str = "api_key";

/// An API key for the deployment service.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey(String);

impl ApiKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// The raw secret, for placing in a request header.
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiKey(***)")
    }
}

/// Supplies the API key used to authenticate against the deployment service.
pub trait CredentialProvider: Send + Sync {
    fn api_key(&self) -> Result<ApiKey>;
}

/// Persistent storage for a single secret string.
pub trait SecretStore: Send + Sync {
    /// Returns the stored secret, or `None` if nothing has been stored yet.
    fn get(&self) -> Result<Option<String>>;
    fn set(&self, secret: &str) -> Result<()>;
}

/// Interactive source of a secret, typically a hidden-input terminal prompt.
pub trait SecretPrompt: Send + Sync {
    fn prompt(&self) -> Result<String>;
}

/// A provider returning a fixed key.
#[derive(Debug, Clone)]
pub struct StaticCredentials(ApiKey);

impl StaticCredentials {
    pub fn new(key: impl Into<String>) -> Self {
        Self(ApiKey::new(key))
    }
}

impl CredentialProvider for StaticCredentials {
    fn api_key(&self) -> Result<ApiKey> {
        Ok(self.0.clone())
    }
}

/// # Stored Credentials (`StoredCredentials`)
///
/// Secret store first, interactive prompt second. A prompted key is written
/// back to the store, and whichever key is found is cached for the lifetime
/// of the provider.
///
/// Store read failures other than "no entry" are logged and treated like a
/// missing key; store write failures are logged and the key is still used.
pub struct StoredCredentials<S, P> {
    store: S,
    prompt: P,
    cached: Mutex<Option<ApiKey>>,
}

impl<S: SecretStore, P: SecretPrompt> StoredCredentials<S, P> {
    pub fn new(store: S, prompt: P) -> Self {
        Self {
            store,
            prompt,
            cached: Mutex::new(None),
        }
    }

    fn prompt_and_persist(&self) -> Result<ApiKey> {
        let entered = self.prompt.prompt()?;
        let entered = entered.trim();
        if entered.is_empty() {
            return Err(LumaError::Credential("No API key entered.".to_string()).into());
        }
        match self.store.set(entered) {
            Ok(()) => info!("Saved API key to the secret store."),
            Err(e) => warn!("Could not save API key to the secret store: {:#}", e),
        }
        Ok(ApiKey::new(entered))
    }
}

impl<S: SecretStore, P: SecretPrompt> CredentialProvider for StoredCredentials<S, P> {
    fn api_key(&self) -> Result<ApiKey> {
        // Held across the prompt so concurrent callers never prompt twice.
        let mut cached = self
            .cached
            .lock()
            .map_err(|_| LumaError::Credential("credential cache poisoned".to_string()))?;
        if let Some(key) = cached.as_ref() {
            return Ok(key.clone());
        }

        let key = match self.store.get() {
            Ok(Some(secret)) if !secret.is_empty() => {
                debug!("Using API key from the secret store.");
                ApiKey::new(secret)
            }
            Ok(_) => {
                debug!("No API key in the secret store; prompting.");
                self.prompt_and_persist()?
            }
            Err(e) => {
                warn!("Could not read the secret store ({:#}); prompting instead.", e);
                self.prompt_and_persist()?
            }
        };

        *cached = Some(key.clone());
        Ok(key)
    }
}

/// Builds the provider used by `luma deploy`: a fixed key when one was given
/// explicitly, otherwise the platform keyring with a terminal prompt fallback.
pub fn default_provider(explicit_key: Option<String>) -> Result<Arc<dyn CredentialProvider>> {
    match explicit_key.filter(|k| !k.trim().is_empty()) {
        Some(key) => {
            debug!("Using API key supplied on the command line or environment.");
            Ok(Arc::new(StaticCredentials::new(key.trim())))
        }
        None => {
            let store = store::KeyringStore::new(SERVICE_NAME, ACCOUNT_NAME)?;
            Ok(Arc::new(StoredCredentials::new(store, TerminalPrompt::new())))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[derive(Default)]
    struct MemoryStore {
        value: Mutex<Option<String>>,
        fail_reads: bool,
        fail_writes: bool,
    }

    impl MemoryStore {
        fn with(value: &str) -> Self {
            Self {
                value: Mutex::new(Some(value.to_string())),
                ..Default::default()
            }
        }

        fn stored(&self) -> Option<String> {
            self.value.lock().unwrap().clone()
        }
    }

    impl SecretStore for MemoryStore {
        fn get(&self) -> Result<Option<String>> {
            if self.fail_reads {
                return Err(anyhow!("secret service unavailable"));
            }
            Ok(self.value.lock().unwrap().clone())
        }

        fn set(&self, secret: &str) -> Result<()> {
            if self.fail_writes {
                return Err(anyhow!("read-only keyring"));
            }
            *self.value.lock().unwrap() = Some(secret.to_string());
            Ok(())
        }
    }

    struct CountingPrompt {
        answer: String,
        calls: AtomicUsize,
    }

    impl CountingPrompt {
        fn answering(answer: &str) -> Self {
            Self {
                answer: answer.to_string(),
                calls: AtomicUsize::new(0),
            }
        }
    }

    impl SecretPrompt for CountingPrompt {
        fn prompt(&self) -> Result<String> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            Ok(self.answer.clone())
        }
    }

    impl<S, P> StoredCredentials<S, P> {
        fn parts(&self) -> (&S, &P) {
            (&self.store, &self.prompt)
        }
    }

    #[test]
    fn test_stored_key_skips_prompt() {
        let provider =
            StoredCredentials::new(MemoryStore::with("stored-key"), CountingPrompt::answering("typed"));
        assert_eq!(provider.api_key().unwrap().expose(), "stored-key");
        assert_eq!(provider.parts().1.calls.load(Ordering::SeqCst), 0);
    }

    #[test]
    fn test_missing_key_prompts_and_persists() {
        let provider =
            StoredCredentials::new(MemoryStore::default(), CountingPrompt::answering(" typed-key \n"));
        assert_eq!(provider.api_key().unwrap().expose(), "typed-key");
        let (store, prompt) = provider.parts();
        assert_eq!(store.stored().as_deref(), Some("typed-key"));
        assert_eq!(prompt.calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_key_is_cached_across_calls() {
        let provider =
            StoredCredentials::new(MemoryStore::default(), CountingPrompt::answering("typed-key"));
        for _ in 0..3 {
            assert_eq!(provider.api_key().unwrap().expose(), "typed-key");
        }
        assert_eq!(provider.parts().1.calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_store_failures_fall_back_to_prompt() {
        let store = MemoryStore {
            fail_reads: true,
            fail_writes: true,
            ..Default::default()
        };
        let provider = StoredCredentials::new(store, CountingPrompt::answering("typed-key"));
        assert_eq!(provider.api_key().unwrap().expose(), "typed-key");
        assert_eq!(provider.parts().1.calls.load(Ordering::SeqCst), 1);
    }

    #[test]
    fn test_empty_prompt_is_credential_error() {
        let provider = StoredCredentials::new(MemoryStore::default(), CountingPrompt::answering("  "));
        let err = provider.api_key().unwrap_err();
        assert!(matches!(
            err.downcast_ref::<LumaError>(),
            Some(LumaError::Credential(_))
        ));
        assert_eq!(provider.parts().0.stored(), None);
    }

    #[test]
    fn test_static_credentials() {
        let provider = StaticCredentials::new("ci-key");
        assert_eq!(provider.api_key().unwrap(), ApiKey::new("ci-key"));
    }

    #[test]
    fn test_explicit_key_selects_static_provider() {
        let provider = default_provider(Some(" from-env ".to_string())).unwrap();
        assert_eq!(provider.api_key().unwrap().expose(), "from-env");
    }

    #[test]
    fn test_api_key_debug_is_redacted() {
        let key = ApiKey::new("super-secret");
        let rendered = format!("{:?}", key);
        assert!(!rendered.contains("super-secret"));
        assert_eq!(rendered, "ApiKey(***)");
    }
}
