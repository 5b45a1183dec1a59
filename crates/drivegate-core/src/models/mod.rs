pub mod folder;
pub mod session;

pub use folder::{FileProbe, FolderDescriptor, FolderListResponse};
pub use session::{
    Destination, SessionDebug, SessionGrant, SessionRequest, UploadSessionResponse,
};
