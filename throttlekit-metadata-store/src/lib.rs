//! # Throttlekit Metadata Store
//!
//! Key-value view of the cluster coordination service. Paths follow the
//! coordination service layout (`/brokers/topics/<topic>`, `/brokers/ids/<id>`, ...)
//! and values are JSON documents.

mod errors;
pub use errors::{MetadataError, Result};

mod store;
pub use store::{KeyValue, MetadataStore};

mod watch;
pub use watch::{WatchEvent, WatchStream};

mod providers;
pub use providers::in_memory::MemoryStore;
