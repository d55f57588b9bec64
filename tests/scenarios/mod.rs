//! End-to-end rendering scenarios and cross-cutting properties.

mod cancellation;
mod logical;
mod partitioning;
