//! # Luma Prompts (`common::ui::prompts`)
//!
//! File: cli/src/common/ui/prompts.rs
//! Author: Christi Mahu
//!
//! ## Overview
//!
//! `TerminalPrompt` asks for the API key on the terminal with input echo
//! suppressed. It is the interactive fallback of `StoredCredentials` when the
//! secret store has no key yet.
//!
use crate::common::credentials::SecretPrompt;
use crate::core::error::{LumaError, Result};
use dialoguer::Password;

/// Text shown when asking for the API key.
const API_KEY_PROMPT: &str = "Enter API key";

/// Hidden-input prompt on the controlling terminal.
#[derive(Debug, Default)]
pub struct TerminalPrompt;

impl TerminalPrompt {
    pub fn new() -> Self {
        Self
    }
}

impl SecretPrompt for TerminalPrompt {
    fn prompt(&self) -> Result<String> {
        Password::new()
            .with_prompt(API_KEY_PROMPT)
            .interact()
            .map_err(|e| {
                LumaError::Credential(format!("Could not read API key from the terminal: {}", e))
                    .into()
            })
    }
}
