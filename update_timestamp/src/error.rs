use thiserror::Error;

/// Every way a run can fail. Each variant ends up as exactly one failure report.
#[derive(Debug, Error)]
pub enum ActionError {
    /// Missing or invalid input, or a missing secret. Raised before any request is sent.
    #[error("{0}")]
    Configuration(String),

    #[error("Login failed with status code {status}.")]
    Authentication { status: u16 },

    /// Login answered 200 but the body carried no usable `token`.
    #[error("Login response did not contain a token.")]
    MissingToken,

    #[error("Update failed with status code {status}.")]
    Update { status: u16 },

    /// DNS, connect, TLS or timeout failure of either request.
    #[error("Request failed: {0}")]
    Transport(#[from] reqwest::Error),
}

impl ActionError {
    pub fn configuration(message: impl Into<String>) -> Self {
        ActionError::Configuration(message.into())
    }

    /// True for both authentication failure shapes.
    pub fn is_authentication(&self) -> bool {
        matches!(
            self,
            ActionError::Authentication { .. } | ActionError::MissingToken
        )
    }
}

pub type Result<T> = std::result::Result<T, ActionError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes_appear_in_messages() {
        assert_eq!(
            ActionError::Authentication { status: 401 }.to_string(),
            "Login failed with status code 401."
        );
        assert_eq!(
            ActionError::Update { status: 404 }.to_string(),
            "Update failed with status code 404."
        );
    }

    #[test]
    fn missing_token_counts_as_authentication_failure() {
        assert!(ActionError::MissingToken.is_authentication());
        assert!(!ActionError::configuration("x").is_authentication());
    }
}
