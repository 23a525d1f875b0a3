//! Config composition: defaults first, then file, then environment.

pub mod merge_policy;
pub mod service;
