//! DOM crate — Document Object Model
//!
//! Index-based DOM tree: nodes are stored in one list owned by the
//! [`Document`] and linked through parent/child/sibling handles instead of
//! Rc/RefCell.

pub mod node;
pub mod tree;

pub use node::*;
pub use tree::{Document, STYLE_ATTRIBUTE};
