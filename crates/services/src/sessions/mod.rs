mod progress;
mod service;
mod view;
mod workflow;

// Public API of the session subsystem.
pub use crate::error::SessionError;
pub use progress::SessionProgress;
pub use service::{Advance, TestSession, TickOutcome};
pub use view::SessionView;
pub use workflow::{SessionPhase, TestSessionEngine};
