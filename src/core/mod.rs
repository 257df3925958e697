//! Shared building blocks: constant tables and hook traits.

pub mod consts;
pub mod hooks;
