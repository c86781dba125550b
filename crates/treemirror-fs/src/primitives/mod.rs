pub mod atomic_write;
pub mod staged;

pub use atomic_write::{AtomicWriter, atomic_write};
pub use staged::StagedFile;
