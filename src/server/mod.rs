//! The user-facing JSON web server that accepts inpainting requests. This is
//! the "front end": a thin adapter around the shared pipeline that maps its
//! failure taxonomy onto HTTP statuses.

use crate::error::Error;
use actix_web::http::header::ContentType;
use actix_web::http::StatusCode;
use actix_web::HttpResponse;
use serde::Serialize;

mod protocol;
pub mod routes;

/// Wraps pipeline failures for actix. Decode errors are the caller's fault
/// (400); everything else is reported as a server error (500). The body is
/// always `{"detail": <message>}`.
#[derive(Debug)]
pub struct ApiError(pub Error);

#[derive(Serialize)]
struct ErrorBody {
    detail: String,
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl actix_web::error::ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        if self.0.is_client_error() {
            StatusCode::BAD_REQUEST
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        }
    }

    fn error_response(&self) -> HttpResponse {
        HttpResponse::build(self.status_code())
            .insert_header(ContentType::json())
            .json(ErrorBody {
                detail: self.to_string(),
            })
    }
}

impl From<Error> for ApiError {
    fn from(err: Error) -> ApiError {
        ApiError(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::error::ResponseError;
    use std::path::PathBuf;

    #[test]
    fn decode_errors_are_bad_request() {
        let err = ApiError(Error::Decode("invalid base64 image: bad padding".into()));
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn everything_else_is_internal_server_error() {
        let cases = [
            Error::ModelNotFound(PathBuf::from("/workspace/lama/big-lama")),
            Error::Inference {
                status: Some(1),
                stderr: "CUDA error".into(),
            },
            Error::ResultNotFound(PathBuf::from("/workspace/output/abc")),
            Error::Io(std::io::Error::new(std::io::ErrorKind::Other, "disk full")),
        ];
        for err in cases {
            assert_eq!(
                ApiError(err).status_code(),
                StatusCode::INTERNAL_SERVER_ERROR
            );
        }
    }

    #[test]
    fn response_body_carries_the_detail_message() {
        let err = ApiError(Error::Inference {
            status: Some(1),
            stderr: "CUDA error".into(),
        });
        let resp = err.error_response();
        assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
