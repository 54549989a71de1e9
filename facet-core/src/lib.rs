//! Facet Core
//!
//! This crate provides a small reactive state library built around facets:
//! observable values with listener sets, equality-based change suppression,
//! and lazily connected upstream sources.
//!
//! It implements:
//!
//! - Writable and read-only facets with synchronous notification
//! - Derived facets over one or many sources, cached or lightweight
//! - A batching task scheduler with a deferred transition lane
//! - Composable equality checks
//!
//! # Architecture
//!
//! The crate is organized into several modules:
//!
//! - `reactive`: facets, subscriptions, and derivation
//! - `schedule`: batch scopes, task queues, and the current-scheduler context
//! - `equality`: stateful comparators deciding whether a value changed
//! - `config`: scheduler configuration
//! - `error`: errors surfaced by fallible batches
//!
//! # Example
//!
//! ```rust,ignore
//! use facet_core::reactive::{map_facets_cached, WritableFacet};
//! use facet_core::schedule::batch;
//!
//! let a = WritableFacet::new(1);
//! let b = WritableFacet::new(2);
//!
//! // Derived facet, recomputed once per batch
//! let sum = map_facets_cached((a.facet(), b.facet()), |(a, b)| Some(a + b));
//!
//! let _subscription = sum.observe(|value| println!("sum: {value}"));
//! // prints "sum: 3"
//!
//! batch(|| {
//!     a.set(10);
//!     b.set(20);
//! });
//! // prints "sum: 30" once
//! ```

pub mod config;
pub mod equality;
pub mod error;
pub mod reactive;
pub mod schedule;

pub use config::SchedulerConfig;
pub use error::FlushError;
pub use reactive::{Facet, Subscription, WritableFacet};
pub use schedule::{batch, batch_transition, Scheduler};
