//! Storage contract suite
//!
//! Scheduler-style consumer code written against the `Storage` trait, run
//! against the production facade and against the in-place fake.
//!
//! - `contract`: behaviour both implementations share
//! - `transactional`: guarantees only the production facade gives
//! - `fake`: how consumer tests use FakeStorage

mod common;

mod contract;
mod fake;
mod transactional;
