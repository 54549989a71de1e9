//! Reactive Primitives
//!
//! This module implements facets: observable values that notify listeners
//! on change, plus derived facets computed from one or more sources.
//!
//! # Concepts
//!
//! ## Facets
//!
//! A [`WritableFacet`] holds a value (or no value yet) and a set of
//! listeners. Writes go through an equality check; a value the check reports
//! unchanged is dropped without notifying anyone. [`Facet`] is the read-only
//! view handed to consumers.
//!
//! ## Lazy Sources
//!
//! A facet can be given a start subscription. It runs when the first
//! listener subscribes and its cleanup runs when the last one leaves, so an
//! upstream is only connected while someone is listening.
//!
//! ## Derivation
//!
//! [`map_facet_cached`] and friends build a facet from other facets. The
//! cached variants store the result once for all listeners; the lightweight
//! variants recompute per listener and store nothing.
//!
//! # Implementation Notes
//!
//! Everything here is single-threaded and built on `Rc`/`RefCell`. No
//! `RefCell` borrow is held while a listener runs, so listeners may freely
//! read, write, subscribe to, and unsubscribe from any facet.

mod facet;
mod map;
mod sources;
mod subscription;

pub use facet::{Facet, FacetBuilder, Listener, Observable, StartSubscription, Updater, WritableFacet};
pub use map::{
    map_facet_cached, map_facet_cached_with, map_facet_lightweight, map_facet_lightweight_with,
    map_facets_cached, map_facets_cached_with, map_facets_lightweight,
    map_facets_lightweight_with,
};
pub use sources::FacetSources;
pub use subscription::{Cleanup, ListenerId, Subscription};
