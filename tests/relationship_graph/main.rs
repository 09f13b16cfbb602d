//! Relationship Graph Test Suite
//!
//! End-to-end behavior of the graph through the `Store` facade.
//!
//! ## Modules
//!
//! - **belongs_to**: single-resource edges and reciprocal swaps
//! - **has_many**: collection replace, add and remove, local/remote reconciliation
//! - **paginated**: page loads and local additions
//! - **payloads**: JSON relationship payload ingestion
//! - **lifecycle**: unload, merge and commit of client-created records
//! - **polymorphic**: abstract related types and implementers
//! - **properties**: generated operation sequences
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test --test relationship_graph
//! ```

mod test_utils;

mod belongs_to;
mod has_many;
mod lifecycle;
mod paginated;
mod payloads;
mod polymorphic;
mod properties;
