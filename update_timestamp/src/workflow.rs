//! The update run: check owner, check inputs, get a token, patch the record.
//!
//! Every step needs the previous step's output, so they run strictly one
//! after another. No step is retried.

use chrono::Utc;
use tracing::info;

use crate::client::PocketBaseClient;
use crate::config::{self, Credentials};
use crate::error::{ActionError, Result};

/// Raw, unvalidated values gathered from the command line and environment.
#[derive(Debug, Clone, Default)]
pub struct RawInputs {
    pub owner: Option<String>,
    pub pocketbase_url: Option<String>,
    pub collection_id: Option<String>,
    pub record_id: Option<String>,
}

pub struct UpdateWorkflow<F> {
    inputs: RawInputs,
    expected_owner: String,
    secrets: F,
    client: PocketBaseClient,
}

impl<F> UpdateWorkflow<F>
where
    F: Fn(&str) -> Option<String>,
{
    /// `secrets` looks up `PB_TOKEN`, `PB_EMAIL` and `PB_PASSWORD` by name.
    pub fn new(inputs: RawInputs, secrets: F, client: PocketBaseClient) -> Self {
        Self {
            inputs,
            expected_owner: config::EXPECTED_OWNER.to_string(),
            secrets,
            client,
        }
    }

    pub fn with_expected_owner(mut self, owner: impl Into<String>) -> Self {
        self.expected_owner = owner.into();
        self
    }

    pub async fn run(&self) -> Result<()> {
        info!("Starting Pocketbase Update Action...");

        config::validate_context(self.inputs.owner.as_deref(), &self.expected_owner)?;

        info!("Validating inputs...");
        let inputs = config::validate_inputs(
            self.inputs.pocketbase_url.as_deref(),
            self.inputs.collection_id.as_deref(),
            self.inputs.record_id.as_deref(),
        )?;

        let token = self.resolve_token(&inputs.base_url).await?;

        info!(
            collection = %inputs.collection_id,
            record = %inputs.record_id,
            "Updating record..."
        );
        self.client
            .update_last_update(
                &inputs.base_url,
                &inputs.collection_id,
                &inputs.record_id,
                &token,
                Utc::now(),
            )
            .await?;

        info!("Record updated successfully.");
        Ok(())
    }

    /// Returns a supplied token untouched, or logs in once to obtain one.
    pub async fn resolve_token(&self, base_url: &reqwest::Url) -> Result<String> {
        match config::resolve_credentials(&self.secrets)? {
            Credentials::Token(token) => {
                info!("Using token from environment, skipping login.");
                Ok(token)
            }
            Credentials::EmailPassword { identity, password } => {
                info!("Inputs validated successfully. Logging in to Pocketbase...");
                let token = self.client.login(base_url, &identity, &password).await?;
                info!("Login successful.");
                Ok(token)
            }
        }
    }
}

/// The single line reported to the host when a run fails.
///
/// Underlying causes are appended, so a refused connection, a DNS failure and
/// a timeout read differently.
pub fn failure_message(error: &ActionError) -> String {
    format!("Action failed with error: {}", with_causes(error))
}

fn with_causes(error: &dyn std::error::Error) -> String {
    let mut message = error.to_string();
    let mut cause = error.source();
    while let Some(err) = cause {
        let text = err.to_string();
        // thiserror's `{0}` already printed the direct source.
        if !message.contains(&text) {
            message.push_str(": ");
            message.push_str(&text);
        }
        cause = err.source();
    }
    message
}

/// Escapes `%`, CR and LF for a GitHub Actions workflow command, so
/// percent-encoded URLs and multi-line causes survive intact.
pub fn escape_command_data(data: &str) -> String {
    data.replace('%', "%25")
        .replace('\r', "%0D")
        .replace('\n', "%0A")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn failure_message_wraps_error() {
        let msg = failure_message(&ActionError::Update { status: 404 });
        assert_eq!(
            msg,
            "Action failed with error: Update failed with status code 404."
        );
    }

    #[derive(Debug)]
    struct Layer {
        text: &'static str,
        source: Option<Box<Layer>>,
    }

    impl std::fmt::Display for Layer {
        fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
            f.write_str(self.text)
        }
    }

    impl std::error::Error for Layer {
        fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
            self.source
                .as_deref()
                .map(|e| e as &(dyn std::error::Error + 'static))
        }
    }

    #[test]
    fn causes_are_appended_once() {
        let chain = Layer {
            text: "error sending request",
            source: Some(Box::new(Layer {
                text: "tcp connect error",
                source: Some(Box::new(Layer {
                    text: "Connection refused (os error 111)",
                    source: None,
                })),
            })),
        };
        assert_eq!(
            with_causes(&chain),
            "error sending request: tcp connect error: Connection refused (os error 111)"
        );

        let wrapped = Layer {
            text: "Request failed: timed out",
            source: Some(Box::new(Layer {
                text: "timed out",
                source: None,
            })),
        };
        assert_eq!(with_causes(&wrapped), "Request failed: timed out");
    }

    #[test]
    fn command_data_is_escaped() {
        assert_eq!(
            escape_command_data("url (http://h/c%201/r1)\r\nnext"),
            "url (http://h/c%25201/r1)%0D%0Anext"
        );
        assert_eq!(escape_command_data("plain"), "plain");
    }
}
