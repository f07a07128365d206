//! Per-node-kind work of the stepping machine
//!
//! Everything here is an `impl Machine` block; [`Machine`](super::machine::Machine)
//! dispatches to it.

pub mod access;
pub mod binary;
pub mod call;
pub mod types;
pub mod unary;
