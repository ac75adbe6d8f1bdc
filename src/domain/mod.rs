// Core data and algorithms: no I/O.

pub mod callgraph;
pub mod flowgraph;
pub mod frame;
pub mod level;
