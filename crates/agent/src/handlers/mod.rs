//! Intent handlers.
//!
//! Each handler takes the entities it needs, calls the [`DataFetchTool`]
//! and shapes one [`AgentResponse`](parts_assist_core::AgentResponse)
//! variant. Fetch failures never escape a handler: they become a degraded
//! response with empty or null data and a message saying what was missing.
//!
//! [`DataFetchTool`]: crate::fetch::DataFetchTool

pub mod compatibility;
pub mod details;
pub mod installation;
pub mod search;
pub mod troubleshooting;

pub use compatibility::check;
pub use details::details;
pub use installation::guide;
pub use search::search;
pub use troubleshooting::diagnose;

/// Maximum compatible models shown in a part-details response.
pub const MAX_LISTED_MODELS: usize = 20;

/// Maximum related parts shown alongside part details.
pub const MAX_RELATED_PARTS: usize = 5;

/// Maximum alternative parts offered when a part does not fit.
pub const MAX_ALTERNATIVES: usize = 3;
