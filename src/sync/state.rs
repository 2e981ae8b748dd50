//! Per-resource synchronization state.

/// The latest known state of one polled resource.
///
/// `data` holds the most recently *accepted* snapshot and survives transient
/// failures: a failed fetch updates `error` but never blanks data that was
/// already shown. `loading` is true only until the first attempt settles,
/// successfully or not, and never reverts afterward.
#[derive(Debug, Clone)]
pub struct ResourceState<T> {
    /// Most recently accepted snapshot, if any attempt has succeeded yet.
    pub data: Option<T>,
    /// True until the first attempt settles.
    pub loading: bool,
    /// Message of the most recent failure; cleared by the next success.
    pub error: Option<String>,
    /// Number of fetch attempts dispatched so far. Completions are tagged
    /// with this counter so out-of-order arrivals can be discarded.
    pub sequence: u64,
}

impl<T> Default for ResourceState<T> {
    fn default() -> Self {
        Self {
            data: None,
            loading: true,
            error: None,
            sequence: 0,
        }
    }
}

impl<T> ResourceState<T> {
    /// Create the initial (loading, empty) state.
    pub fn new() -> Self {
        Self::default()
    }

    /// True once at least one snapshot has been accepted.
    pub fn has_data(&self) -> bool {
        self.data.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn initial_state_is_loading_and_empty() {
        let state: ResourceState<u32> = ResourceState::new();
        assert!(state.loading);
        assert!(state.data.is_none());
        assert!(state.error.is_none());
        assert_eq!(state.sequence, 0);
        assert!(!state.has_data());
    }
}
