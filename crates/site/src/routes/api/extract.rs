//! Extractors whose rejections answer with the API's JSON error body.

use axum::extract::{
    FromRequest, FromRequestParts,
    rejection::{JsonRejection, QueryRejection},
};

use crate::error::ApiError;

/// `axum::Json` that rejects with a 400 `{"error": ...}`.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(ApiError))]
pub struct ApiJson<T>(pub T);

/// `axum::extract::Query` that rejects with a 400 `{"error": ...}`.
#[derive(Debug, FromRequestParts)]
#[from_request(via(axum::extract::Query), rejection(ApiError))]
pub struct ApiQuery<T>(pub T);

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        tracing::debug!(error = %rejection.body_text(), "Rejected JSON body");
        let message = match rejection {
            JsonRejection::MissingJsonContentType(_) => "expected a JSON body",
            JsonRejection::JsonSyntaxError(_) => "malformed JSON body",
            _ => "invalid request body",
        };
        Self::bad_request(message)
    }
}

impl From<QueryRejection> for ApiError {
    fn from(rejection: QueryRejection) -> Self {
        tracing::debug!(error = %rejection.body_text(), "Rejected query string");
        Self::bad_request("invalid query string")
    }
}

#[cfg(test)]
mod tests {
    use axum::{
        body::Body,
        http::{Request, StatusCode, header},
        response::IntoResponse,
    };
    use serde::Deserialize;

    use super::*;

    #[derive(Debug, Deserialize)]
    struct Rate {
        rating: i64,
    }

    async fn error_of(response: axum::response::Response) -> (StatusCode, serde_json::Value) {
        let status = response.status();
        let body = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap_or_default();
        (status, serde_json::from_slice(&body).unwrap_or_default())
    }

    fn json_request(body: &'static str) -> Request<Body> {
        Request::post("/")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body))
            .unwrap_or_default()
    }

    #[tokio::test]
    async fn test_wrong_type_is_json_400() {
        let Err(err) = ApiJson::<Rate>::from_request(json_request(r#"{"rating":4.5}"#), &()).await
        else {
            panic!("fractional rating must be rejected");
        };
        let (status, json) = error_of(err.into_response()).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"], "invalid request body");
        assert!(!json.to_string().contains("floating point"));
    }

    #[tokio::test]
    async fn test_syntax_error_and_missing_content_type() {
        let Err(err) = ApiJson::<Rate>::from_request(json_request("{"), &()).await else {
            panic!("truncated JSON must be rejected");
        };
        let (status, json) = error_of(err.into_response()).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"], "malformed JSON body");

        let request = Request::post("/")
            .body(Body::from(r#"{"rating":4}"#))
            .unwrap_or_default();
        let Err(err) = ApiJson::<Rate>::from_request(request, &()).await else {
            panic!("missing content type must be rejected");
        };
        let (status, json) = error_of(err.into_response()).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"], "expected a JSON body");
    }

    #[tokio::test]
    async fn test_valid_body_passes_through() {
        let ApiJson(rate) = ApiJson::<Rate>::from_request(json_request(r#"{"rating":4}"#), &())
            .await
            .unwrap_or(ApiJson(Rate { rating: 0 }));
        assert_eq!(rate.rating, 4);
    }

    #[tokio::test]
    async fn test_bad_query_is_json_400() {
        let (mut parts, ()) = Request::get("/?rating=high")
            .body(())
            .unwrap_or_default()
            .into_parts();
        let Err(err) = ApiQuery::<Rate>::from_request_parts(&mut parts, &()).await else {
            panic!("non-numeric rating must be rejected");
        };
        let (status, json) = error_of(err.into_response()).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"], "invalid query string");
    }
}
