//! Response envelopes: `{ "message": ..., "data": ... }`

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub message: String,
    pub data: T,
}

impl<T> ApiResponse<T> {
    pub fn new(message: impl Into<String>, data: T) -> Self {
        Self {
            message: message.into(),
            data,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_envelope_shape() {
        let body = serde_json::to_value(ApiResponse::new("Movie created successfully", 42)).unwrap();
        assert_eq!(body["message"], "Movie created successfully");
        assert_eq!(body["data"], 42);
        assert_eq!(body.as_object().unwrap().len(), 2);
    }
}
