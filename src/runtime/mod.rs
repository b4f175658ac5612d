//! # Matching runtime
//!
//! The matcher algebra and the node trees it produces.
//!
//! Matchers are pure: [`MatcherSet::match_prefix`] either consumes a prefix
//! of its input and returns a [`Node`], or returns `None`. Whole-input
//! matching with error reporting is layered on top as
//! [`MatcherSet::parse`].

mod errors;
mod matcher;
mod node;

pub use errors::*;
pub use matcher::*;
pub use node::*;
