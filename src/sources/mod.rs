//! Library sources.
//!
//! Sources supply the tree a build configures. Only local paths are
//! supported; how that tree got there (clone, archive) is up to the host.

pub mod path;
pub mod source;

pub use path::PathSource;
pub use source::Source;
