//! Parts Assist agent library.
//!
//! Answers refrigerator and dishwasher parts questions. Each message is
//! classified into one intent, dispatched to exactly one handler, and answered
//! with a typed [`AgentResponse`](parts_assist_core::AgentResponse).
//!
//! # Architecture
//!
//! - [`classifier`] - keyword and Claude-backed intent classification
//! - [`orchestrator`] - dispatch from intent to handler
//! - [`handlers`] - search, details, compatibility, installation, troubleshooting
//! - [`fetch`] - the data-fetch seam (local catalog or Claude web tools)
//! - [`routes`] - axum HTTP surface

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod claude;
pub mod classifier;
pub mod config;
pub mod error;
pub mod fetch;
pub mod handlers;
pub mod middleware;
pub mod orchestrator;
pub mod routes;
pub mod state;
