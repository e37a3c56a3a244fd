//! File actions module.
//!
//! Deletion of single files, either permanently or to the system trash.
//! The engine layers the optional results guard on top, see
//! [`crate::engine::ScanEngine::delete_path`].

pub mod delete;

pub use delete::{delete_path, DeleteError, DeleteGuard, DeleteMode, DeleteResult};
