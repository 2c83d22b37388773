pub mod file;
pub mod memory;

use crate::error::FormStateError;

pub use file::FileStorage;
pub use memory::MemoryStorage;

/// Synchronous string-keyed store. Last write wins; no transactions.
///
/// Failures (quota exceeded, storage disabled, I/O) are returned as errors and
/// propagate unchanged through `save`, `restore` and `clear`.
pub trait Storage {
    fn get_item(&self, key: &str) -> Result<Option<String>, FormStateError>;

    fn set_item(&self, key: &str, value: &str) -> Result<(), FormStateError>;

    /// Removing an absent key is not an error.
    fn remove_item(&self, key: &str) -> Result<(), FormStateError>;
}
