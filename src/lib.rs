//! crush — delete runs of three or more identical characters until none are
//! left.
//!
//! The algorithm lives in [`collapse`]; [`handler`] wraps it with
//! pre-processing, logging and analytics listeners, configured through
//! [`config`].

pub mod analytics;
pub mod cli;
pub mod collapse;
pub mod config;
pub mod handler;

pub use collapse::collapse;
