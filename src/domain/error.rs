use thiserror::Error;

#[derive(Error, Debug)]
pub enum DomainError {
    #[error("{0}")]
    Authentication(String),
    #[error("Validation error: {0}")]
    Validation(String),
    #[error("Not found: {0}")]
    NotFound(String),
    #[error("Internal error: {0}")]
    Internal(String),
}

impl DomainError {
    pub fn not_logged_in() -> Self {
        DomainError::Authentication("Not logged in".to_string())
    }

    pub fn login_required() -> Self {
        DomainError::Authentication("You need to be logged in!".to_string())
    }

    // Same message for unknown email and wrong password so the response
    // never reveals which check failed.
    pub fn incorrect_credentials() -> Self {
        DomainError::Authentication("Incorrect credentials".to_string())
    }
}
