//! Index access: the read-only reader trait and an in-memory index.

pub mod memory;
pub mod reader;

pub use self::memory::MemoryIndex;
pub use self::reader::IndexReader;
