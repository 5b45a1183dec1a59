//! OpenAPI documentation.

use utoipa::OpenApi;

use crate::error;
use crate::handlers;
use drivegate_core::models;

#[derive(OpenApi)]
#[openapi(
    info(
        title = "Drivegate API",
        version = "0.1.0",
        description = "Credential-isolating gateway that brokers direct resumable uploads to Google Drive. Clients request a single-use session URL here, then stream file bytes straight to the provider."
    ),
    paths(
        handlers::folders::list_folders,
        handlers::upload::create_upload_session,
    ),
    components(schemas(
        models::FolderDescriptor,
        models::FolderListResponse,
        models::SessionRequest,
        models::UploadSessionResponse,
        models::SessionDebug,
        error::ErrorResponse,
    )),
    tags(
        (name = "folders", description = "Destination folder directory"),
        (name = "uploads", description = "Resumable upload session brokering")
    )
)]
pub struct ApiDoc;

pub fn get_openapi_spec() -> utoipa::openapi::OpenApi {
    ApiDoc::openapi()
}
