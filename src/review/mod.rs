// src/review/mod.rs

pub mod decision;
pub mod session;

pub use decision::{Decision, RejectionScope};
pub use session::ReviewSession;
