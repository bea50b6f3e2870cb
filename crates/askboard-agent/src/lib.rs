//! Askboard Agent - the analytic agent interface
//!
//! The boundary between the pipeline and the external analytic capability:
//! - The [`AnalyticAgent`] trait (instruction + datasets in, loose result out)
//! - [`AnalyticAgentSession`], the rephrase-then-run wrapper with per-run options
//! - Instruction templates pinning the structured output contracts
//! - [`RawAgentResult`], the tagged union over answer shapes
//!
//! # Example
//!
//! ```rust,ignore
//! use askboard_agent::{AnalyticAgentSession, SessionConfig};
//!
//! let session = AnalyticAgentSession::new(agent, SessionConfig::new());
//! let result = session.run("total sales by month", &datasets).await?;
//! ```

#![warn(unreachable_pub)]

// Core modules
pub mod error;
pub mod instructions;
pub mod result;
pub mod session;

// Re-exports for convenience
pub use error::AgentError;
pub use result::RawAgentResult;
pub use session::{AnalyticAgent, AnalyticAgentSession, RunOptions, SessionConfig};

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for working with analytic agents
    pub use crate::{
        AgentError, AnalyticAgent, AnalyticAgentSession, RawAgentResult, RunOptions, SessionConfig,
    };
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
