use actix_web::HttpResponse;
use actix_web::http::StatusCode;
use serde::Serialize;

pub const GENERIC_BACKEND_ERROR: &str = "Internal server error";

/// `{"error": "..."}` body shared by every failure response.
#[derive(Serialize, Debug)]
pub struct ApiError {
    error: String,
}

impl ApiError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            error: message.into(),
        }
    }

    pub fn to_response(&self, status: StatusCode) -> HttpResponse {
        HttpResponse::build(status).json(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn body_has_single_error_key() {
        let body = serde_json::to_value(ApiError::new("Month and year are required")).unwrap();

        assert_eq!(body, serde_json::json!({"error": "Month and year are required"}));
    }
}
