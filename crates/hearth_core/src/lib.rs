//! Hearth Engine Core
//!
//! Contains the simulation-side collaborators the script bridge talks to:
//! - Scene storage with stable entity identities
//! - The closed set of component kinds
//! - Fixed timestep bookkeeping

pub mod scene;
pub mod time;

pub use glam;

/// Engine version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
