//! Upload acceptance
//!
//! A submission needs three player exports, one per [`Role`](crate::types::Role).
//! Each candidate is checked by [`FileValidator`] before [`UploadBatch`] stores it:
//!
//! - [`FileValidator::validate`] runs on assignment (extension and size)
//! - [`FileValidator::validate_content`] reads the text (markup, table structure,
//!   content size, field vocabulary) and is driven by [`UploadBatch::check_contents`]
//!
//! ```no_run
//! use moneyball_pipeline::upload::{FileHandle, UploadBatch};
//! use moneyball_pipeline::Role;
//!
//! # async fn example() -> moneyball_pipeline::Result<()> {
//! let mut batch = UploadBatch::default();
//! for (role, path) in [
//!     (Role::Primary, "signed.html"),
//!     (Role::Secondary, "loans.html"),
//!     (Role::Universal, "players.html"),
//! ] {
//!     let violations = batch.assign(role, FileHandle::from_path(path).await?);
//!     for v in violations {
//!         eprintln!("{role}: {v}");
//!     }
//! }
//!
//! batch.check_contents().await;
//! assert!(batch.is_complete());
//! # Ok(())
//! # }
//! ```

mod batch;
mod file;
mod validator;

pub use batch::{UploadBatch, UploadSlot};
pub use file::{ContentSource, FileHandle, MemorySource, PathSource};
pub use validator::FileValidator;
