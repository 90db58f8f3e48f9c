//! Trim — strip surrounding whitespace before collapsing.

use super::{Listener, RequestData};

pub struct TrimListener;

impl Listener for TrimListener {
    fn name(&self) -> &'static str {
        "trim"
    }

    fn before(&self, request: &mut RequestData) {
        let trimmed = request.preprocessed.trim();
        if trimmed.len() != request.preprocessed.len() {
            request.preprocessed = trimmed.to_string();
        }
    }
}
