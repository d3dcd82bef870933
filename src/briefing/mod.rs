//! The briefing interaction core: request lifecycle, simulated
//! progress, and per-finding disclosure.

pub mod disclosure;
pub mod lifecycle;
pub mod progress;

pub use disclosure::DisclosureController;
pub use lifecycle::{BriefingLifecycle, BriefingState};
pub use progress::{ProgressSimulator, STATUS_MESSAGES};
