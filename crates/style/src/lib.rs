//! # Style Engine
//!
//! Selector matching, cascade resolution, and computed style values.

pub mod cascade;
pub mod computed;
pub mod error;
pub mod matching;

pub use cascade::{
    MatchedDeclaration, StyleEngine, StyleOrigin, UA_CSS, collect_matching_declarations,
    expand_shorthand,
};
pub use computed::*;
pub use error::StyleError;
pub use matching::{matches_compound, matches_selector};
