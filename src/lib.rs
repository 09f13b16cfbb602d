//! Client-side relationship graph.
//!
//! A [`Store`] owns one identifier cache and one [`Graph`]. Relationship
//! payloads from the server are applied as remote updates and reconciled with
//! pending local edits at [`Store::flush`]; local edits notify immediately.
//!
//! ```
//! use relgraph::{NotificationLog, Operation, RelationshipSchema as R, Schema, Store};
//!
//! let schema = Schema::new()
//!     .with_type("user", vec![R::has_many("pets", "pet").inverse("owner")])
//!     .with_type("pet", vec![R::belongs_to("owner", "user").inverse("pets")]);
//! let log = NotificationLog::new();
//! let mut store = Store::new(schema, log.clone());
//!
//! let user = store.identifier("user", "1");
//! let pet = store.create_record("pet");
//! store
//!     .push(Operation::replace_related_record(&pet, "owner", Some(user.clone())), false)
//!     .unwrap();
//! assert_eq!(store.graph_mut().local_state(&user, "pets").unwrap(), vec![pet]);
//! assert_eq!(log.len(), 2);
//! ```

#![warn(missing_docs)]

mod store;
mod types;

pub use store::Store;
pub use types::*;
