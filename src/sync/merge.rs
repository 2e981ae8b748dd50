//! Cross-resource error precedence.
//!
//! A surface showing several independently polled resources displays at
//! most one error banner at a time. The precedence is positional: the
//! first resource in the caller's ordered list whose error is present
//! wins. This is a pure function over the current error fields; each
//! poller still exposes its own error independently.

/// The error chosen for display, with the resource it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergedError {
    pub resource: String,
    pub message: String,
}

impl std::fmt::Display for MergedError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.resource, self.message)
    }
}

/// Pick the first non-absent error from an ordered list of resources.
pub fn first_error(ordered: &[(&str, Option<String>)]) -> Option<MergedError> {
    ordered.iter().find_map(|(resource, error)| {
        error.as_ref().map(|message| MergedError {
            resource: resource.to_string(),
            message: message.clone(),
        })
    })
}
