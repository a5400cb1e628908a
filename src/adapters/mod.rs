// Adapters layer: concrete implementations of the domain ports.

pub mod file_store;
pub mod http_catalog;
pub mod memory;
pub mod router;

pub use file_store::FileStore;
pub use http_catalog::HttpCatalog;
pub use memory::{MemoryStore, StaticCatalog, StaticSession};
pub use router::MemoryRouter;
