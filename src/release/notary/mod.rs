//! Notarization submit/poll state machine.
//!
//! ```text
//! Submitted ──Accepted──────────────▶ done
//!     │      ──other terminal───────▶ Notarization error
//!     └─In Progress / none─▶ Polling ─Accepted─▶ done
//!                               │    ─terminal─▶ Notarization error
//!                               └─deadline───▶ NotarizationTimeout
//! ```

mod clock;
mod config;
mod poller;
mod status;

pub use clock::{Clock, SystemClock};
pub use config::{
    DEFAULT_POLL_INTERVAL, DEFAULT_TIMEOUT, MAX_TIMEOUT, MIN_POLL_INTERVAL, NotaryConfig,
    parse_duration,
};
pub use poller::{Notarizer, staple};
pub use status::{NotaryResponse, NotaryStatus, SubmissionRecord};
