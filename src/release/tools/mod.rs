//! External tool invocation.
//!
//! All stage boundaries go through [`ToolRunner`], so the orchestrator and the
//! notarization poller can be driven by a scripted runner in tests.

mod detection;
mod runner;

pub use detection::{REQUIRED_TOOLS, missing_tools, locate};
pub use runner::{Invocation, SystemRunner, ToolOutput, ToolRunner, run_stage};
