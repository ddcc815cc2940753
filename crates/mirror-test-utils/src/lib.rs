//! Shared test utilities for the listing-mirror workspace.
//!
//! This crate provides fixtures for exercising the sync engine without a
//! network. It is a dev-dependency only and is never published.
//!
//! # Modules
//!
//! - [`remote`]: [`FakeRemote`] in-memory fetcher and [`ListingPage`] builder
//! - [`mirror`]: [`TestMirror`] temporary mirror root

pub mod mirror;
pub mod remote;

pub use mirror::TestMirror;
pub use remote::{FIXTURE_SOURCE, FakeRemote, ListingPage, fixture_registry, fixture_source};
