//! Call-graph construction and traversal ordering.
//!
//! The orderer is what makes batch renaming useful: functions are visited
//! bottom-up (callees before callers), so by the time a caller is evaluated
//! its callees have already been analyzed.

pub mod callgraph;

pub use callgraph::{bottom_up_order, CallGraph};
