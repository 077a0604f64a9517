use crate::connection::ConnectionError;
use crate::import::{ImportError, ImportStep};
use crate::recipe::ValidationError;
use rocket::http::Status;
use rocket::response::{self, Responder};
use rocket::{Request, Response};
use rocket_okapi::r#gen::OpenApiGenerator;
use rocket_okapi::okapi::Map;
use rocket_okapi::okapi::openapi3::{RefOr, Response as OpenApiResponse, Responses};
use rocket_okapi::response::OpenApiResponderInner;
use serde::Serialize;
use std::io::Cursor;

#[derive(Debug)]
pub enum ApiError {
    Validation(ValidationError),
    Import(ImportError),
    Connection(ConnectionError),
    InternalError(String),
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    step: Option<ImportStep>,
}

impl ApiError {
    fn classify(self) -> (Status, &'static str, String, Option<ImportStep>) {
        match self {
            ApiError::Validation(e) => {
                log::debug!("validation error: {}", e);
                (Status::BadRequest, "ValidationError", e.to_string(), None)
            }
            ApiError::Import(ImportError::EmptyBatch) => {
                log::debug!("import rejected: {}", ImportError::EmptyBatch);
                (
                    Status::BadRequest,
                    "BadRequest",
                    ImportError::EmptyBatch.to_string(),
                    None,
                )
            }
            ApiError::Import(e) if e.is_commit_failure() => {
                log::error!("import commit failed: {}", e);
                (Status::BadGateway, "CommitFailed", e.to_string(), e.step())
            }
            ApiError::Import(e) => {
                let step = e.step();
                let kind = if e.is_protocol_violation() {
                    "ProtocolViolation"
                } else {
                    "ImportRolledBack"
                };
                log::error!("import rolled back: {}", e);
                (Status::BadGateway, kind, e.to_string(), step)
            }
            ApiError::Connection(e) if e.is_client_error() => {
                log::debug!("connection unavailable: {}", e);
                (Status::BadRequest, "BadRequest", e.to_string(), None)
            }
            ApiError::Connection(e) => {
                log::error!("connection error: {}", e);
                (Status::BadGateway, "ConnectionError", e.to_string(), None)
            }
            ApiError::InternalError(msg) => {
                log::error!("internal error: {}", msg);
                (Status::InternalServerError, "InternalError", msg, None)
            }
        }
    }
}

impl<'r> Responder<'r, 'static> for ApiError {
    fn respond_to(self, _: &'r Request<'_>) -> response::Result<'static> {
        let (status, error_type, message, step) = self.classify();

        let error_response = ErrorResponse {
            error: error_type.to_string(),
            message,
            step,
        };

        let json = serde_json::to_string(&error_response)
            .unwrap_or_else(|_| r#"{"error":"SerializationError","message":"Failed to serialize error"}"#.to_string());

        Response::build()
            .status(status)
            .header(rocket::http::ContentType::JSON)
            .sized_body(json.len(), Cursor::new(json))
            .ok()
    }
}

impl OpenApiResponderInner for ApiError {
    fn responses(_generator: &mut OpenApiGenerator) -> rocket_okapi::Result<Responses> {
        let mut responses = Map::new();
        for (code, description) in [
            ("400", "Payload rejected before any database work."),
            ("500", "Unexpected server error."),
            (
                "502",
                "CMWeb lookup, connection, import or commit failed.",
            ),
        ] {
            responses.insert(
                code.to_string(),
                RefOr::Object(OpenApiResponse {
                    description: description.to_string(),
                    ..Default::default()
                }),
            );
        }

        Ok(Responses {
            responses,
            ..Default::default()
        })
    }
}

impl From<ValidationError> for ApiError {
    fn from(err: ValidationError) -> Self {
        ApiError::Validation(err)
    }
}

impl From<ImportError> for ApiError {
    fn from(err: ImportError) -> Self {
        ApiError::Import(err)
    }
}

impl From<ConnectionError> for ApiError {
    fn from(err: ConnectionError) -> Self {
        ApiError::Connection(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn protocol_violation_is_reported_with_its_step() {
        let (status, kind, _, step) = ApiError::from(ImportError::MissingBatchId).classify();
        assert_eq!(status, Status::BadGateway);
        assert_eq!(kind, "ProtocolViolation");
        assert_eq!(step, Some(ImportStep::BatchCreate));
    }

    #[test]
    fn database_failures_report_rollback() {
        let err = ImportError::database(
            ImportStep::ImportRecipe,
            sqlx::Error::Protocol("boom".into()),
        );
        let (status, kind, message, step) = ApiError::from(err).classify();
        assert_eq!(status, Status::BadGateway);
        assert_eq!(kind, "ImportRolledBack");
        assert!(message.contains("import_recipe"));
        assert_eq!(step, Some(ImportStep::ImportRecipe));
    }

    #[test]
    fn commit_failures_are_not_reported_as_rolled_back() {
        let err = ImportError::database(ImportStep::Commit, sqlx::Error::PoolClosed);
        let (status, kind, _, step) = ApiError::from(err).classify();
        assert_eq!(status, Status::BadGateway);
        assert_eq!(kind, "CommitFailed");
        assert_eq!(step, Some(ImportStep::Commit));
    }

    #[test]
    fn lookup_status_surfaces_as_bad_gateway() {
        let err = ConnectionError::lookup_status(
            reqwest::StatusCode::SERVICE_UNAVAILABLE,
            "busy".to_string(),
        );
        let (status, kind, message, _) = ApiError::from(err).classify();
        assert_eq!(status, Status::BadGateway);
        assert_eq!(kind, "ConnectionError");
        assert!(message.contains("503"));
    }

    #[test]
    fn validation_errors_are_client_errors() {
        let (status, kind, _, _) = ApiError::from(ValidationError::NoRecipes).classify();
        assert_eq!(status, Status::BadRequest);
        assert_eq!(kind, "ValidationError");

        let (status, _, _, _) = ApiError::from(ConnectionError::NotConfigured).classify();
        assert_eq!(status, Status::BadRequest);
    }
}
