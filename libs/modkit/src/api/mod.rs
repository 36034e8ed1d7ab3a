//! HTTP API building blocks shared by modules.

pub mod problem;
