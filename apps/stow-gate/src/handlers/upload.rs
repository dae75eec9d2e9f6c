//! Upload handler

use axum::{
    extract::{multipart::MultipartError, Multipart, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use bytes::Bytes;
use std::io::Cursor;
use stowage_domain::{
    ingestion::PolicyViolation, AssetStream, IngestionError, IngestionRequest,
};
use tracing::{error, info, warn};

use crate::{
    dto::upload::{ErrorResponse, UploadForm, UploadResponse},
    AppState,
};

/// Parts of the multipart body the handler cares about
#[derive(Default)]
struct UploadParts {
    file: Option<(String, String, Bytes)>,
    category: Option<String>,
    related_id: Option<String>,
}

async fn read_parts(multipart: &mut Multipart) -> Result<UploadParts, MultipartError> {
    let mut parts = UploadParts::default();
    while let Some(field) = multipart.next_field().await? {
        let name = field.name().map(str::to_string);
        match name.as_deref() {
            Some("file") => {
                let filename = field.file_name().unwrap_or_default().to_string();
                let content_type = field.content_type().unwrap_or_default().to_string();
                let data = field.bytes().await?;
                parts.file = Some((filename, content_type, data));
            }
            Some("type") => parts.category = Some(field.text().await?),
            Some("related_id") => parts.related_id = Some(field.text().await?),
            _ => {}
        }
    }
    Ok(parts)
}

/// Status code and client-facing message for a failed upload
pub fn error_status(err: &IngestionError) -> (StatusCode, String) {
    match err {
        IngestionError::InvalidInput(msg) => (StatusCode::BAD_REQUEST, msg.clone()),
        IngestionError::PolicyRejected(violation @ PolicyViolation::TooLarge { .. }) => {
            (StatusCode::PAYLOAD_TOO_LARGE, violation.to_string())
        }
        IngestionError::PolicyRejected(violation) => {
            (StatusCode::UNSUPPORTED_MEDIA_TYPE, violation.to_string())
        }
        IngestionError::UnsupportedCategory(_) => (StatusCode::BAD_REQUEST, err.to_string()),
        // Storage causes may include server paths; keep them in the logs
        IngestionError::StorageIo { .. } => (
            StatusCode::INTERNAL_SERVER_ERROR,
            "Failed to store file".to_string(),
        ),
        IngestionError::Config(_) => (
            StatusCode::INTERNAL_SERVER_ERROR,
            "Storage is misconfigured".to_string(),
        ),
    }
}

fn error_response(status: StatusCode, message: String) -> Response {
    (status, Json(ErrorResponse { error: message })).into_response()
}

/// Handle asset uploads
#[utoipa::path(
    post,
    path = "/upload",
    request_body(content = UploadForm, content_type = "multipart/form-data"),
    responses(
        (status = 201, description = "Asset stored successfully", body = UploadResponse),
        (status = 400, description = "Bad request - empty file, malformed form or unknown type", body = ErrorResponse),
        (status = 413, description = "File exceeds the size limit", body = ErrorResponse),
        (status = 415, description = "File type not allowed", body = ErrorResponse),
        (status = 500, description = "Storage failure", body = ErrorResponse)
    ),
    tag = "upload"
)]
pub async fn upload_handler(State(state): State<AppState>, mut multipart: Multipart) -> Response {
    let parts = match read_parts(&mut multipart).await {
        Ok(parts) => parts,
        Err(err) => {
            warn!(error = %err, "Malformed upload form");
            return error_response(err.status(), err.body_text());
        }
    };

    let content_type = parts
        .file
        .as_ref()
        .map(|(_, ct, _)| ct.clone())
        .unwrap_or_default();
    let content = parts.file.map(|(filename, _, data)| {
        let len = data.len() as u64;
        AssetStream::new(filename, len, Cursor::new(data))
    });

    info!(
        category = parts.category.as_deref().unwrap_or_default(),
        size = content.as_ref().map(AssetStream::declared_length),
        "Received upload request"
    );

    let request = IngestionRequest {
        content,
        content_type,
        category: parts.category.unwrap_or_default(),
        owner_reference: parts.related_id,
    };

    match state.ingestion_service.upload(request).await {
        Ok(result) => {
            info!(key = %result.storage_key, url = %result.url, "Successfully stored asset");
            (StatusCode::CREATED, Json(UploadResponse::from(result))).into_response()
        }
        Err(err) => {
            if err.is_retryable() {
                error!(error = ?err, "Failed to store asset");
            } else {
                warn!(error = %err, "Rejected upload");
            }
            let (status, message) = error_status(&err);
            error_response(status, message)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stowage_domain::StorageStage;

    #[test]
    fn test_error_status_mapping() {
        let cases = [
            (IngestionError::invalid_input("File cannot be empty"), StatusCode::BAD_REQUEST),
            (
                IngestionError::from(PolicyViolation::TooLarge { size: 2, max: 1 }),
                StatusCode::PAYLOAD_TOO_LARGE,
            ),
            (
                IngestionError::from(PolicyViolation::UnsupportedFileType {
                    extension: ".exe".to_string(),
                    allowed: vec![".png".to_string()],
                }),
                StatusCode::UNSUPPORTED_MEDIA_TYPE,
            ),
            (IngestionError::unsupported_category("x"), StatusCode::BAD_REQUEST),
            (
                IngestionError::storage_io(
                    StorageStage::Commit,
                    std::io::Error::new(std::io::ErrorKind::Other, "/srv/secret/path"),
                ),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (err, expected) in cases {
            assert_eq!(error_status(&err).0, expected, "{err}");
        }
    }

    #[test]
    fn test_storage_error_message_hides_cause() {
        let err = IngestionError::storage_io(
            StorageStage::CreateDir,
            std::io::Error::new(std::io::ErrorKind::PermissionDenied, "/srv/secret/path"),
        );
        let (_, message) = error_status(&err);
        assert!(!message.contains("/srv/secret"));
    }
}
