use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiResponse<T: Serialize> {
    pub success: bool,
    pub data: T,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ErrorBody {
    pub success: bool,
    pub code: String,
    pub message: String,
    pub trace_id: Option<String>,
}

/// 统一的 API 错误。is_operational=false 的错误对外只暴露通用消息。
#[derive(Debug, Clone)]
pub struct AppError {
    pub status: StatusCode,
    pub code: String,
    pub message: String,
    pub is_operational: bool,
}

impl AppError {
    fn operational(status: StatusCode, code: &str, message: &str) -> Self {
        Self {
            status,
            code: code.to_string(),
            message: message.to_string(),
            is_operational: true,
        }
    }

    pub fn bad_request(code: &str, message: &str) -> Self {
        Self::operational(StatusCode::BAD_REQUEST, code, message)
    }

    pub fn forbidden(code: &str, message: &str) -> Self {
        Self::operational(StatusCode::FORBIDDEN, code, message)
    }

    pub fn not_found(message: &str) -> Self {
        Self::operational(StatusCode::NOT_FOUND, "NOT_FOUND", message)
    }

    pub fn unprocessable(code: &str, message: &str) -> Self {
        Self::operational(StatusCode::UNPROCESSABLE_ENTITY, code, message)
    }

    pub fn too_many_requests(message: &str) -> Self {
        Self::operational(StatusCode::TOO_MANY_REQUESTS, "RATE_LIMITED", message)
    }

    pub fn internal(message: &str) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            code: "INTERNAL_ERROR".to_string(),
            message: message.to_string(),
            is_operational: false,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let exposed = if self.is_operational {
            tracing::warn!(status = %self.status, code = %self.code, error = %self.message, "API error");
            self.message
        } else {
            tracing::error!(status = %self.status, code = %self.code, error = %self.message, "Internal API error");
            "服务器内部错误".to_string()
        };

        let body = ErrorBody {
            success: false,
            code: self.code,
            message: exposed,
            trace_id: None,
        };
        (self.status, Json(body)).into_response()
    }
}

// 安全说明：StoreError 转换映射：
// - Validation 错误 -> 400 Bad Request（用户输入问题，可安全暴露消息）
// - NotFound 错误 -> 404（实体名和键可安全暴露）
// - 其他错误 -> 500 Internal（is_operational=false，IntoResponse 中会替换为通用消息）
impl From<crate::store::StoreError> for AppError {
    fn from(value: crate::store::StoreError) -> Self {
        match &value {
            crate::store::StoreError::Validation(msg) => {
                AppError::bad_request("VALIDATION_ERROR", msg)
            }
            crate::store::StoreError::NotFound { entity, key } => {
                AppError::not_found(&format!("{} not found: {}", entity, key))
            }
            _ => AppError::internal(&value.to_string()),
        }
    }
}

fn respond<T: Serialize>(status: StatusCode, data: T) -> (StatusCode, Json<ApiResponse<T>>) {
    (
        status,
        Json(ApiResponse {
            success: true,
            data,
        }),
    )
}

pub fn ok<T: Serialize>(data: T) -> impl IntoResponse {
    respond(StatusCode::OK, data)
}

pub fn created<T: Serialize>(data: T) -> impl IntoResponse {
    respond(StatusCode::CREATED, data)
}

#[cfg(test)]
mod tests {
    use axum::body::to_bytes;
    use axum::response::IntoResponse;

    use super::*;
    use crate::store::StoreError;

    #[tokio::test]
    async fn internal_error_is_redacted() {
        let resp = AppError::internal("db crash").into_response();
        let body = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        let text = String::from_utf8(body.to_vec()).unwrap();
        assert!(!text.contains("db crash"));
        assert!(text.contains("服务器内部错误"));
    }

    #[tokio::test]
    async fn bad_request_keeps_message() {
        let resp = AppError::bad_request("BAD_INPUT", "invalid kid name").into_response();
        let body = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        let text = String::from_utf8(body.to_vec()).unwrap();
        assert!(text.contains("invalid kid name"));
        assert!(text.contains("BAD_INPUT"));
    }

    #[tokio::test]
    async fn success_envelope_wraps_data() {
        let resp = ok(serde_json::json!({"level": 2})).into_response();
        let body = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["success"], true);
        assert_eq!(json["data"]["level"], 2);
    }

    #[tokio::test]
    async fn store_not_found_maps_to_404() {
        let error = StoreError::NotFound {
            entity: "progress".to_string(),
            key: "mia".to_string(),
        };
        let app_error = AppError::from(error);
        assert_eq!(app_error.status, StatusCode::NOT_FOUND);
        assert!(app_error.message.contains("mia"));
    }

    #[tokio::test]
    async fn store_validation_maps_to_400() {
        let error = StoreError::Validation("kid name contains ':'".to_string());
        let app_error = AppError::from(error);
        assert_eq!(app_error.status, StatusCode::BAD_REQUEST);
        assert_eq!(app_error.code, "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn sled_errors_are_not_operational() {
        let error = StoreError::Serialization(serde_json::from_str::<u32>("x").unwrap_err());
        let app_error = AppError::from(error);
        assert_eq!(app_error.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert!(!app_error.is_operational);
    }
}
