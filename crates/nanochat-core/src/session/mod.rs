//! Session lifecycle.
//!
//! `SessionController` owns the single live host session and replaces it
//! whenever the sampling configuration changes.

mod config;
mod controller;

pub use config::SessionConfig;
pub use controller::SessionController;
