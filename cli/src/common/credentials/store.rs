//! # Luma Keyring Store (`common::credentials::store`)
//!
//! File: cli/src/common/credentials/store.rs
//! Author: Christi Mahu
//!
//! ## Overview
//!
//! `SecretStore` backed by the platform secret store through the `keyring`
//! crate: macOS Keychain, Windows Credential Manager, or the Linux kernel
//! keyring. One entry is addressed by a fixed service/account pair.
//!
use super::SecretStore;
use crate::core::error::{LumaError, Result};
use keyring::Entry;
use tracing::debug;

/// A single keyring entry.
pub struct KeyringStore {
    entry: Entry,
}

impl KeyringStore {
    pub fn new(service: &str, account: &str) -> Result<Self> {
        let entry = Entry::new(service, account).map_err(|e| {
            LumaError::Credential(format!(
                "Cannot open secret store entry {}/{}: {}",
                service, account, e
            ))
        })?;
        Ok(Self { entry })
    }
}

impl SecretStore for KeyringStore {
    fn get(&self) -> Result<Option<String>> {
        match self.entry.get_password() {
            Ok(secret) => Ok(Some(secret)),
            Err(keyring::Error::NoEntry) => {
                debug!("No keyring entry found.");
                Ok(None)
            }
            Err(e) => Err(LumaError::Credential(format!("Keyring read failed: {}", e)).into()),
        }
    }

    fn set(&self, secret: &str) -> Result<()> {
        self.entry
            .set_password(secret)
            .map_err(|e| LumaError::Credential(format!("Keyring write failed: {}", e)).into())
    }
}
