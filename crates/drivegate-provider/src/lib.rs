//! Google Drive provider backend.
//!
//! Everything the gateway needs from the storage provider lives behind the
//! [`DriveProvider`] trait: listing candidate folders, creating a folder,
//! initiating a resumable upload session, and probing a file. The concrete
//! [`GoogleDrive`] implementation speaks the Drive v3 REST API over reqwest,
//! authenticated through [`auth::TokenSource`].

pub mod auth;
pub mod google;
pub mod traits;

pub use google::GoogleDrive;
pub use traits::{DriveProvider, ProviderError, ProviderResult};
