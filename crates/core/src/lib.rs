//! Parts Assist Core - Shared types library.
//!
//! This crate provides the types exchanged between every Parts Assist
//! component:
//! - `agent` - Intent classification, dispatch and the `/chat` HTTP service
//! - `cli` - Command-line tools for asking questions and validating catalogs
//! - any front end that renders an [`AgentResponse`]
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no HTTP
//! clients. The agent crate owns all network access.
//!
//! # Modules
//!
//! - [`types`] - Part/model identifiers, appliance scope, intents, part data,
//!   conversation turns and the tagged agent response

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
