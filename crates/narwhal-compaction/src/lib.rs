#![forbid(unsafe_code)]

//! One-dimensional compaction over a constraint graph of axis-aligned boxes.
//!
//! A [`CGraph`] holds boxes ([`CNode`]s) and optional predefined minimum-gap constraints. The
//! [`OneDimensionalCompactor`] moves every box as far as possible in one [`Direction`] without
//! violating a constraint, using a longest-path pass over the constraint DAG. Constraints can
//! also be derived from box overlap with a [`scanline`] sweep.
//!
//! The solver only ever compacts to the left; the other directions mirror or transpose the
//! hitboxes first and undo the transformation afterwards.

pub mod cgraph;
pub mod compactor;
pub mod dump;
pub mod error;
pub mod longest_path;
pub mod scanline;
pub mod scanline_constraints;

pub use cgraph::{Axis, CGraph, CNode, CNodeId, Constraint, Rect};
pub use compactor::{ConstraintSource, Direction, OneDimensionalCompactor};
pub use dump::CGraphDump;
pub use error::{Error, Result};
pub use scanline::{Scanline, ScanlineHandler};
