use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// A candidate destination folder, as offered to the selection UI.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct FolderDescriptor {
    pub id: String,
    pub name: String,
}

/// Wire response of `GET /folders`.
#[derive(Debug, Serialize, Deserialize, ToSchema)]
pub struct FolderListResponse {
    pub folders: Vec<FolderDescriptor>,
}

/// Existence/trash probe result for the destination-validation path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileProbe {
    pub id: String,
    pub name: String,
    pub trashed: bool,
}
