use thiserror::Error;

pub type GatewayResult<T> = Result<T, GatewayError>;

#[derive(Debug, Clone, Error)]
pub enum GatewayError {
    #[error("Validation error: {message}")]
    ValidationError {
        message: String,
        field: Option<String>,
    },

    #[error("Network error: gateway={gateway}, message={message}")]
    NetworkError { gateway: String, message: String },

    #[error("Charge declined: gateway={gateway}, message={message}")]
    Declined {
        gateway: String,
        code: Option<String>,
        message: String,
    },

    #[error("Gateway error: gateway={gateway}, message={message}")]
    ApiError {
        gateway: String,
        message: String,
        code: Option<String>,
        retryable: bool,
    },

    #[error("Invalid gateway response: gateway={gateway}, message={message}")]
    InvalidResponse { gateway: String, message: String },
}

impl GatewayError {
    pub fn is_retryable(&self) -> bool {
        match self {
            GatewayError::ValidationError { .. } => false,
            GatewayError::NetworkError { .. } => true,
            GatewayError::Declined { .. } => false,
            GatewayError::ApiError { retryable, .. } => *retryable,
            GatewayError::InvalidResponse { .. } => false,
        }
    }

    pub fn gateway_name(&self) -> String {
        match self {
            GatewayError::ValidationError { .. } => "request".to_string(),
            GatewayError::NetworkError { gateway, .. }
            | GatewayError::Declined { gateway, .. }
            | GatewayError::ApiError { gateway, .. }
            | GatewayError::InvalidResponse { gateway, .. } => gateway.clone(),
        }
    }

    pub fn http_status_code(&self) -> u16 {
        match self {
            GatewayError::ValidationError { .. } => 400,
            GatewayError::NetworkError { .. } => 503,
            GatewayError::Declined { .. } => 400,
            GatewayError::ApiError { .. } => 502,
            GatewayError::InvalidResponse { .. } => 502,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn error_http_status_mapping_is_correct() {
        assert_eq!(
            GatewayError::ValidationError {
                message: "bad".to_string(),
                field: None
            }
            .http_status_code(),
            400
        );
        assert_eq!(
            GatewayError::NetworkError {
                gateway: "nmi".to_string(),
                message: "timeout".to_string()
            }
            .http_status_code(),
            503
        );
    }

    #[test]
    fn retryable_flags_are_set() {
        assert!(GatewayError::NetworkError {
            gateway: "easypay".to_string(),
            message: "timeout".to_string()
        }
        .is_retryable());
        assert!(!GatewayError::Declined {
            gateway: "nmi".to_string(),
            code: Some("2".to_string()),
            message: "declined".to_string()
        }
        .is_retryable());
    }
}
