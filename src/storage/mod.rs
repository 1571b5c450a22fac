//! Persistence for the tracker's collections.
//!
//! A key-value store holds each collection as one JSON document; the
//! repository layers typed race and horse operations on top of it.

pub mod kv;
pub mod repository;
pub mod schema;

pub use kv::{KeyValueStore, MemoryStore, SqliteStore};
pub use repository::{Repository, HORSES_KEY, RACES_KEY};
pub use schema::create_tables;
