//! Reusable components.

pub mod brain_graph;
