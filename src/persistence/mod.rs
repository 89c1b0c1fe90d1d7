//! Local JSON persistence: atomic file replacement with a backup generation,
//! a version envelope that still accepts the legacy bare-array shape, and a
//! lazily loaded, mutex-guarded in-memory copy per collection.

mod atomic;
mod collection;
mod versioned;

pub use atomic::AtomicRecordStore;
pub use collection::{CollectionGuard, LazyCollection};
pub use versioned::{VersionedCollection, VersionedRecordStore};
