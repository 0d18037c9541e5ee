//! API trait definitions split by platform
//!
//! - [`SourceApi`] - paginated reads from the source platform
//! - [`TargetApi`] - raw reads and writes against the target platform
//!
//! The migration code depends only on these traits, so tests can swap in the
//! in-memory clients from `client::mock`.

mod source;
mod target;

pub use source::SourceApi;
pub use target::TargetApi;
