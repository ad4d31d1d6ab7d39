//! Text canonicalization, sentence segmentation and recall comparison.

mod compare;
mod normalize;
mod segment;

pub use compare::is_match;
pub use normalize::normalize;
pub use segment::{ends_with_terminal, is_terminator, segment};
