//! # Luma UI Utilities Module (`common::ui`)
//!
//! File: cli/src/common/ui/mod.rs
//! Author: Christi Mahu
//!
//! ## Overview
//!
//! Terminal interaction helpers. The deploy command only needs one kind of
//! interaction: asking for the API key without echoing it.
//!
//! - **`prompts`**: Hidden-input prompts built on `dialoguer`.
//!

/// Interactive prompts (hidden-input API key entry).
pub mod prompts;
