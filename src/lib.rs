//! Form state persistence: tracks a form's fields, saves their values as a
//! JSON snapshot in a key-value store and restores them into the live form.
//!
//! ```text
//! Field Selector (form::policy) -> Value Codec (form::codec) -> Snapshot Manager (snapshot::manager)
//! ```

pub mod cli;
pub mod dom;
pub mod error;
pub mod form;
pub mod snapshot;
pub mod storage;
pub mod trace;

pub use dom::document::Document;
pub use dom::element::Element;
pub use error::FormStateError;
pub use snapshot::manager::{FormTarget, SaveForm};
pub use snapshot::model::Snapshot;
pub use snapshot::options::Options;
pub use storage::{FileStorage, MemoryStorage, Storage};
