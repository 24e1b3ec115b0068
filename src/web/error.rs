use axum::{Json, http::StatusCode, response::IntoResponse};
use thiserror::Error;

use crate::{
    auth::CryptError,
    error::log_error,
    grading::GradingError,
    model::{DatabaseError, ResourceType},
    payments::PaymentError,
};

pub type WebResult<T> = std::result::Result<T, WebError>;

#[derive(Debug, Error)]
pub enum RegistrationError {
    #[error("RegistrationUserConflict")]
    RegistrationUserConflict,
}

#[derive(Debug, Error)]
pub enum AuthenticationError {
    #[error("AuthenticationRequired")]
    AuthenticationRequired,

    #[error("AuthenticationAdminRequired")]
    AuthenticationAdminRequired,

    #[error("AuthenticationInvalidCredentials")]
    AuthenticationInvalidCredentials,

    #[error("AuthenticationImpersonationDenied")]
    AuthenticationImpersonationDenied,

    #[error("AuthenticationNotImpersonating")]
    AuthenticationNotImpersonating,
}

#[derive(Debug, Error)]
pub enum ResourceError {
    #[error("ResourceNotFound: {resource_type}")]
    ResourceNotFound { resource_type: ResourceType },

    #[error("ResourceForbidden: {resource_type}")]
    ResourceForbidden { resource_type: ResourceType },

    #[error("ResourceConflict: {resource_type}. Reason: {reason}")]
    ResourceConflict {
        resource_type: ResourceType,
        reason: String,
    },

    #[error("ResourceFetchError: {resource_type}. Error: {error}")]
    ResourceFetchError {
        resource_type: ResourceType,
        error: DatabaseError,
    },

    #[error("ResourceBadRequest: {resource_type}. Reason: {reason}")]
    ResourceBadRequest {
        resource_type: ResourceType,
        reason: String,
    },

    #[error("ResourceValidationError: {0}")]
    ResourceValidationError(#[from] validator::ValidationErrors),
}

#[derive(Debug, Error)]
pub enum ServerError {
    #[error("ServerCryptError: {0}")]
    ServerCryptError(#[from] crate::auth::CryptError),

    #[error("ServerPaymentError: {0}")]
    ServerPaymentError(#[from] PaymentError),
}

impl ServerError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::ServerPaymentError(e) if e.is_rejected_payload() => StatusCode::BAD_REQUEST,
            Self::ServerPaymentError(PaymentError::HttpError(_))
            | Self::ServerPaymentError(PaymentError::ProviderError { .. }) => {
                StatusCode::BAD_GATEWAY
            }
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn client_display(&self) -> String {
        match self {
            Self::ServerPaymentError(e) if e.is_rejected_payload() => {
                format!("Payment error, {e}.")
            }
            Self::ServerPaymentError(PaymentError::HttpError(_))
            | Self::ServerPaymentError(PaymentError::ProviderError { .. }) => {
                String::from("Payment provider is unavailable, try again later.")
            }
            _ => String::from("Internal server error."),
        }
    }
}

impl RegistrationError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::RegistrationUserConflict => StatusCode::CONFLICT,
        }
    }

    pub fn client_display(&self) -> String {
        match self {
            Self::RegistrationUserConflict => {
                String::from("Registration error, user already exists.")
            }
        }
    }
}

impl AuthenticationError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::AuthenticationRequired => StatusCode::UNAUTHORIZED,
            Self::AuthenticationAdminRequired => StatusCode::FORBIDDEN,
            Self::AuthenticationInvalidCredentials => StatusCode::UNAUTHORIZED,
            Self::AuthenticationImpersonationDenied => StatusCode::FORBIDDEN,
            Self::AuthenticationNotImpersonating => StatusCode::BAD_REQUEST,
        }
    }

    pub fn client_display(&self) -> String {
        match self {
            Self::AuthenticationRequired => String::from("Authentication required."),
            Self::AuthenticationAdminRequired => {
                String::from("Authentication error, admin role required.")
            }
            Self::AuthenticationInvalidCredentials => {
                String::from("Authentication error, user not found or password is invalid.")
            }
            Self::AuthenticationImpersonationDenied => {
                String::from("Authentication error, impersonation denied.")
            }
            Self::AuthenticationNotImpersonating => {
                String::from("Authentication error, session is not impersonated.")
            }
        }
    }
}

impl ResourceError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            Self::ResourceNotFound { .. } => StatusCode::NOT_FOUND,
            Self::ResourceForbidden { .. } => StatusCode::FORBIDDEN,
            Self::ResourceConflict { .. } => StatusCode::CONFLICT,
            Self::ResourceFetchError { .. } => StatusCode::INTERNAL_SERVER_ERROR,
            Self::ResourceBadRequest { .. } => StatusCode::BAD_REQUEST,
            Self::ResourceValidationError(_) => StatusCode::BAD_REQUEST,
        }
    }

    pub fn client_display(&self) -> String {
        match self {
            Self::ResourceNotFound { resource_type } => {
                format!("Resource error, {resource_type} not found.")
            }
            Self::ResourceForbidden { resource_type } => {
                format!("Resource error, {resource_type} is forbidden.")
            }
            Self::ResourceConflict { reason, .. } => format!("Resource error, {reason}."),
            Self::ResourceFetchError { resource_type, .. } => {
                format!("Resource error, unable to fetch {resource_type}.")
            }
            Self::ResourceBadRequest { reason, .. } => format!("Resource error, {reason}."),
            Self::ResourceValidationError(e) => format!("Validation error, {e}"),
        }
    }
}

#[derive(Debug, Error)]
pub enum WebError {
    #[error("ResourceError - {0}")]
    ResourceError(#[from] ResourceError),
    #[error("AuthenticationError - {0}")]
    AuthenticationError(#[from] AuthenticationError),
    #[error("RegistrationError - {0}")]
    RegistrationError(#[from] RegistrationError),
    #[error("ServerError - {0}")]
    ServerError(#[from] ServerError),
}

impl From<validator::ValidationErrors> for WebError {
    fn from(value: validator::ValidationErrors) -> Self {
        Self::ResourceError(ResourceError::ResourceValidationError(value))
    }
}

impl WebError {
    pub fn resource_not_found(r#type: ResourceType) -> Self {
        Self::ResourceError(ResourceError::ResourceNotFound {
            resource_type: r#type,
        })
    }

    pub fn resource_forbidden(r#type: ResourceType) -> Self {
        Self::ResourceError(ResourceError::ResourceForbidden {
            resource_type: r#type,
        })
    }

    pub fn resource_conflict<S: Into<String>>(r#type: ResourceType, reason: S) -> Self {
        Self::ResourceError(ResourceError::ResourceConflict {
            resource_type: r#type,
            reason: reason.into(),
        })
    }

    /// Unique and foreign key violations are the caller's fault, everything
    /// else stays a server error.
    pub fn resource_fetch_error(r#type: ResourceType, error: DatabaseError) -> Self {
        if let DatabaseError::Forbidden = error {
            return Self::resource_forbidden(r#type);
        }
        if error.is_unique_violation() {
            return Self::resource_conflict(r#type, "resource already exists");
        }
        if error.is_foreign_key_violation() {
            return Self::resource_bad_request(r#type, "referenced resource does not exist");
        }

        Self::ResourceError(ResourceError::ResourceFetchError {
            resource_type: r#type,
            error,
        })
    }

    pub fn resource_bad_request<S: Into<String>>(r#type: ResourceType, reason: S) -> Self {
        Self::ResourceError(ResourceError::ResourceBadRequest {
            resource_type: r#type,
            reason: reason.into(),
        })
    }

    pub fn grading_error(error: GradingError) -> Self {
        Self::resource_bad_request(ResourceType::QuizAttempt, error.to_string())
    }

    pub fn auth_required() -> Self {
        Self::AuthenticationError(AuthenticationError::AuthenticationRequired)
    }

    pub fn admin_required() -> Self {
        Self::AuthenticationError(AuthenticationError::AuthenticationAdminRequired)
    }

    pub fn auth_invalid_credentials() -> Self {
        Self::AuthenticationError(AuthenticationError::AuthenticationInvalidCredentials)
    }

    pub fn impersonation_denied() -> Self {
        Self::AuthenticationError(AuthenticationError::AuthenticationImpersonationDenied)
    }

    pub fn not_impersonating() -> Self {
        Self::AuthenticationError(AuthenticationError::AuthenticationNotImpersonating)
    }

    pub fn registration_conflict() -> Self {
        Self::RegistrationError(RegistrationError::RegistrationUserConflict)
    }

    pub fn server_crypt_error(e: CryptError) -> Self {
        Self::ServerError(ServerError::ServerCryptError(e))
    }

    pub fn server_payment_error(e: PaymentError) -> Self {
        Self::ServerError(ServerError::ServerPaymentError(e))
    }

    pub fn status_code(&self) -> axum::http::StatusCode {
        match self {
            Self::ResourceError(e) => e.status_code(),
            Self::RegistrationError(e) => e.status_code(),
            Self::AuthenticationError(e) => e.status_code(),
            Self::ServerError(e) => e.status_code(),
        }
    }

    pub fn client_display(&self) -> String {
        match self {
            Self::ResourceError(e) => e.client_display(),
            Self::RegistrationError(e) => e.client_display(),
            Self::AuthenticationError(e) => e.client_display(),
            Self::ServerError(e) => e.client_display(),
        }
    }
}

#[derive(serde::Serialize, serde::Deserialize, utoipa::ToSchema)]
pub struct ErrorResponse {
    /// Always `false`
    pub success: bool,
    /// Human-readable message for the client
    pub message: String,
    /// HTTP status code (stringified)
    pub status_code: String,
    /// Optional debug details (only in debug mode)
    pub details: Option<String>,
}

impl IntoResponse for WebError {
    fn into_response(self) -> axum::response::Response {
        let status_code = self.status_code();
        if status_code.is_server_error() {
            log_error(&self);
        } else {
            tracing::debug!("request rejected: {}", self);
        }

        let display = self.client_display();

        let body = ErrorResponse {
            success: false,
            message: display,
            status_code: status_code.as_str().to_string(),
            details: if cfg!(debug_assertions) {
                Some(self.to_string())
            } else {
                None
            },
        };

        (status_code, Json(body)).into_response()
    }
}
