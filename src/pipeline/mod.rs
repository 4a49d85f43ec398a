//! The label-parsing pipeline: per-record assembly and the polling loop.

pub mod assembler;
pub mod scheduler;
