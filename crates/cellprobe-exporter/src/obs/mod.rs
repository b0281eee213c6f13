//! In-process metrics registry rendered in Prometheus text format.
//!
//! Series live in `DashMap`s keyed by fixed-arity label tuples, so the poller
//! and the `/metrics` handler only contend on a shard, never on the registry.

pub mod metrics;
