use derive_more::{Display, From};

/// Root error type for the wallet views
#[derive(Debug, Clone, PartialEq, Display, From)]
pub enum AppError {
    #[display(fmt = "Domain Error: {}", _0)]
    Domain(DomainError),
    #[display(fmt = "Application Error: {}", _0)]
    Application(ApplicationError),
    #[display(fmt = "Infrastructure Error: {}", _0)]
    Infrastructure(InfrastructureError),
    #[display(fmt = "Presentation Error: {}", _0)]
    Presentation(PresentationError),
}

impl std::error::Error for AppError {}

/// Domain layer errors
#[derive(Debug, Clone, PartialEq, Display, From)]
pub enum DomainError {
    #[display(fmt = "Validation: {}", _0)]
    Validation(ValidationError),
}

#[derive(Debug, Clone, PartialEq, Display)]
pub enum ValidationError {
    /// Payload did not have the shape the view expects
    #[display(fmt = "Malformed {} snapshot: {}", view, reason)]
    MalformedSnapshot { view: &'static str, reason: String },
    #[display(fmt = "Invalid session id: {}", _0)]
    InvalidSession(String),
    #[display(fmt = "Invalid page number: {}", _0)]
    InvalidPage(String),
    #[display(fmt = "Unknown view: {}", _0)]
    UnknownView(String),
}

/// Application layer errors
#[derive(Debug, Clone, PartialEq, Display, From)]
pub enum ApplicationError {
    #[display(fmt = "Configuration: {}", _0)]
    Configuration(ConfigurationError),
}

#[derive(Debug, Clone, PartialEq, Display)]
pub enum ConfigurationError {
    #[display(fmt = "Invalid parameter: {}", _0)]
    InvalidParameter(String),
    #[display(fmt = "Unreadable configuration: {}", _0)]
    Unreadable(String),
}

/// Infrastructure layer errors
#[derive(Debug, Clone, PartialEq, Display, From)]
pub enum InfrastructureError {
    #[display(fmt = "Network: {}", _0)]
    Network(NetworkError),
    #[display(fmt = "Storage: {}", _0)]
    Storage(StorageError),
    #[display(fmt = "External: {}", _0)]
    External(ExternalServiceError),
}

#[derive(Debug, Clone, PartialEq, Display)]
pub enum NetworkError {
    #[display(fmt = "HTTP request failed: {}", _0)]
    HttpRequestFailed(String),
    #[display(fmt = "HTTP error: {} {}", status, text)]
    HttpStatus { status: u16, text: String },
    #[display(fmt = "Unreadable response body: {}", _0)]
    InvalidBody(String),
}

#[derive(Debug, Clone, PartialEq, Display)]
pub enum StorageError {
    #[display(fmt = "Storage unavailable: {}", _0)]
    Unavailable(String),
    #[display(fmt = "Write failed: {}", _0)]
    WriteFailed(String),
    #[display(fmt = "Serialization failed: {}", _0)]
    Serialization(String),
}

#[derive(Debug, Clone, PartialEq, Display)]
pub enum ExternalServiceError {
    #[display(fmt = "Browser API error: {}", _0)]
    BrowserApiError(String),
    #[display(fmt = "Seed module error: {}", _0)]
    SeedModuleError(String),
}

/// Presentation layer errors
#[derive(Debug, Clone, PartialEq, Display, From)]
pub enum PresentationError {
    #[display(fmt = "UI: {}", _0)]
    UserInterface(UiError),
}

#[derive(Debug, Clone, PartialEq, Display)]
pub enum UiError {
    #[display(fmt = "Element not found: {}", _0)]
    ElementNotFound(String),
    #[display(fmt = "DOM update failed: {}", _0)]
    UpdateFailed(String),
}

impl From<ValidationError> for AppError {
    fn from(error: ValidationError) -> Self {
        AppError::Domain(DomainError::Validation(error))
    }
}

impl From<ConfigurationError> for AppError {
    fn from(error: ConfigurationError) -> Self {
        AppError::Application(ApplicationError::Configuration(error))
    }
}

impl From<NetworkError> for AppError {
    fn from(error: NetworkError) -> Self {
        AppError::Infrastructure(InfrastructureError::Network(error))
    }
}

impl From<StorageError> for AppError {
    fn from(error: StorageError) -> Self {
        AppError::Infrastructure(InfrastructureError::Storage(error))
    }
}

impl From<ExternalServiceError> for AppError {
    fn from(error: ExternalServiceError) -> Self {
        AppError::Infrastructure(InfrastructureError::External(error))
    }
}

impl From<UiError> for AppError {
    fn from(error: UiError) -> Self {
        AppError::Presentation(PresentationError::UserInterface(error))
    }
}

pub type AppResult<T> = Result<T, AppError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn nested_errors_render_their_layer() {
        let err: AppError = NetworkError::HttpStatus { status: 502, text: "Bad Gateway".into() }.into();
        assert_eq!(err.to_string(), "Infrastructure Error: Network: HTTP error: 502 Bad Gateway");

        let err: AppError = ValidationError::MalformedSnapshot {
            view: "balance",
            reason: "expected an array".into(),
        }
        .into();
        assert_eq!(
            err.to_string(),
            "Domain Error: Validation: Malformed balance snapshot: expected an array"
        );
    }
}
