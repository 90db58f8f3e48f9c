//! Handler — wraps the collapser in a request/response cycle with listeners.
//!
//! The collapser itself is a pure function. Everything around a call lives
//! here: pre-processing of the raw request (trimming), diagnostic logging,
//! and analytics. Those concerns are [`Listener`]s, injected into the
//! [`Handler`] in order:
//!
//! ```text
//! raw input ──▶ before(listener 1..n) ──▶ collapse ──▶ after(listener 1..n) ──▶ response
//! ```
//!
//! A handler is built once (normally from the resolved config with
//! [`Handler::from_config`]) and can then be shared by reference; it holds no
//! mutable state.

pub mod log;
pub mod protocol;
pub mod trim;

use std::time::Instant;

use anyhow::Result;

use crate::analytics::logger::AnalyticsListener;
use crate::collapse::{self, MIN_RUN_LENGTH};
use crate::config::CrushConfig;
use crate::config::schema::expand_home;

pub use log::LogListener;
pub use trim::TrimListener;

// ---------------------------------------------------------------------------
// Request / response
// ---------------------------------------------------------------------------

/// A collapse request as seen by the listeners.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RequestData {
    /// The input exactly as supplied.
    pub raw: String,
    /// The input after pre-processing. This is what gets collapsed.
    pub preprocessed: String,
}

impl RequestData {
    pub fn new(raw: &str) -> Self {
        Self {
            raw: raw.to_string(),
            preprocessed: raw.to_string(),
        }
    }
}

/// The result of one collapse.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResponseData {
    /// The string that was collapsed (the pre-processed request).
    pub input: String,
    pub output: String,
    /// Threshold the collapse ran with.
    pub min_run: usize,
    /// Characters deleted from `input`.
    pub removed_chars: usize,
    /// Wall-clock time spent in the collapser (microseconds).
    pub duration_us: u64,
}

// ---------------------------------------------------------------------------
// Listener
// ---------------------------------------------------------------------------

/// A collaborator invoked around every collapse.
///
/// `before` may rewrite the request; `after` only observes. Both default to
/// doing nothing.
pub trait Listener: Send + Sync {
    fn name(&self) -> &'static str;

    fn before(&self, _request: &mut RequestData) {}

    fn after(&self, _request: &RequestData, _response: &ResponseData) {}
}

// ---------------------------------------------------------------------------
// Handler
// ---------------------------------------------------------------------------

pub struct Handler {
    min_run: usize,
    listeners: Vec<Box<dyn Listener>>,
}

impl Default for Handler {
    fn default() -> Self {
        Self::new(MIN_RUN_LENGTH)
    }
}

impl Handler {
    /// A handler with no listeners.
    pub fn new(min_run: usize) -> Self {
        Self {
            min_run: min_run.max(collapse::MIN_THRESHOLD),
            listeners: Vec::new(),
        }
    }

    /// Build the listener chain described by the config: logging, then
    /// trimming, then analytics.
    ///
    /// Logging comes first so that its `before` line records the request as
    /// received.
    pub fn from_config(config: &CrushConfig) -> Self {
        let mut handler = Self::new(config.collapse.min_run_length);

        if config.logging.enabled
            && let Some(path) = expand_home(&config.logging.path)
        {
            handler = handler.with_listener(Box::new(LogListener::new(path, config.logging.level)));
        }
        if config.preprocessing.trim {
            handler = handler.with_listener(Box::new(TrimListener));
        }
        if config.analytics.enabled
            && let Some(path) = expand_home(&config.analytics.path)
        {
            handler = handler.with_listener(Box::new(AnalyticsListener::new(path)));
        }

        handler
    }

    /// Append a listener to the end of the chain.
    pub fn with_listener(mut self, listener: Box<dyn Listener>) -> Self {
        self.listeners.push(listener);
        self
    }

    pub fn min_run(&self) -> usize {
        self.min_run
    }

    /// Names of the registered listeners, in invocation order.
    pub fn listener_names(&self) -> Vec<&'static str> {
        self.listeners.iter().map(|l| l.name()).collect()
    }

    /// Run one request through the listener chain and the collapser.
    ///
    /// An absent input is an error and never reaches the collapser. An empty
    /// input is valid and collapses to the empty string.
    pub fn handle(&self, raw: Option<&str>) -> Result<ResponseData> {
        let Some(raw) = raw else {
            anyhow::bail!("no input string supplied");
        };

        let mut request = RequestData::new(raw);
        for listener in &self.listeners {
            listener.before(&mut request);
        }

        let started = Instant::now();
        let output = collapse::collapse_runs_of(&request.preprocessed, self.min_run);
        let duration_us = u64::try_from(started.elapsed().as_micros()).unwrap_or(u64::MAX);

        let response = ResponseData {
            removed_chars: request
                .preprocessed
                .chars()
                .count()
                .saturating_sub(output.chars().count()),
            input: request.preprocessed.clone(),
            output,
            min_run: self.min_run,
            duration_us,
        };

        for listener in &self.listeners {
            listener.after(&request, &response);
        }

        Ok(response)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
