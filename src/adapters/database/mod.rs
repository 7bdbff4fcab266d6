//! Database abstraction layer
//!
//! Trait-based seam between the export engine and PostgreSQL, enabling
//! testing with mock implementations.

pub mod traits;

pub use traits::{PartStore, RecordRow};
