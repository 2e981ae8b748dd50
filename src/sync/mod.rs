//! The data-synchronization core.
//!
//! One [`Poller`] per remote resource runs an independently paced fetch
//! loop over a [`ResourceState`]. The guarantees live here:
//!
//! - a consumer never observes state older than what it has already
//!   observed (stale completions are discarded by sequence number);
//! - stopping a poller is final: nothing settles into state afterward;
//! - a failure reports an error but never blanks previously accepted data.
//!
//! [`first_error`] provides the display-side rule for collapsing several
//! pollers' errors into one banner.

mod merge;
mod poller;
mod state;

pub use merge::{first_error, MergedError};
pub use poller::Poller;
pub use state::ResourceState;
