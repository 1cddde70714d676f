//! Contact and newsletter submissions to a hosted form backend

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tracing::{info, warn};

use crate::{
    config::FormsConfig,
    core::{SdkError, SdkResult},
};

/// Field-level or form-level rejection
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormError {
    #[serde(default)]
    pub field: Option<String>,
    pub message: String,
}

/// Outcome reported by the form backend
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct FormSubmission {
    pub succeeded: bool,
    pub errors: Vec<FormError>,
}

impl FormSubmission {
    fn rejected(errors: Vec<FormError>) -> Self {
        Self {
            succeeded: false,
            errors,
        }
    }

    /// Errors attached to `field`
    pub fn errors_for<'a>(&'a self, field: &'a str) -> impl Iterator<Item = &'a FormError> + 'a {
        self.errors
            .iter()
            .filter(move |e| e.field.as_deref() == Some(field))
    }
}

/// Form-backend collaborator
#[async_trait]
pub trait FormBackend: Send + Sync {
    async fn submit(&self, fields: Map<String, Value>) -> SdkResult<FormSubmission>;
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct ContactFields {
    pub email: String,
    pub message: String,
}

impl ContactFields {
    pub fn new(email: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            email: email.into().trim().to_string(),
            message: message.into().trim().to_string(),
        }
    }

    /// Local checks, reported the same way the backend reports its own
    pub fn validate(&self) -> Vec<FormError> {
        let mut errors = Vec::new();
        if !is_plausible_email(&self.email) {
            errors.push(FormError {
                field: Some("email".to_string()),
                message: "should be an email".to_string(),
            });
        }
        if self.message.is_empty() {
            errors.push(FormError {
                field: Some("message".to_string()),
                message: "is required".to_string(),
            });
        }
        errors
    }
}

fn is_plausible_email(email: &str) -> bool {
    match email.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.contains('@')
                && domain
                    .split_once('.')
                    .map_or(false, |(host, tld)| !host.is_empty() && !tld.is_empty())
                && !email.chars().any(char::is_whitespace)
        }
        None => false,
    }
}

#[derive(Debug, Deserialize)]
struct BackendReply {
    #[serde(default)]
    ok: bool,
    #[serde(default)]
    errors: Vec<FormError>,
}

/// Formspree-style HTTP backend: `POST {endpoint}/{form_id}`
pub struct FormClient {
    http: reqwest::Client,
    config: FormsConfig,
}

impl FormClient {
    pub fn new(config: FormsConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            config,
        }
    }

    pub fn form_url(&self) -> SdkResult<String> {
        if self.config.form_id.trim().is_empty() {
            return Err(SdkError::Config("forms.form_id is not set".to_string()));
        }
        Ok(format!(
            "{}/{}",
            self.config.endpoint.trim_end_matches('/'),
            self.config.form_id.trim()
        ))
    }
}

#[async_trait]
impl FormBackend for FormClient {
    async fn submit(&self, fields: Map<String, Value>) -> SdkResult<FormSubmission> {
        let url = self.form_url()?;
        let response = self
            .http
            .post(&url)
            .header(reqwest::header::ACCEPT, "application/json")
            .json(&fields)
            .send()
            .await
            .map_err(|e| SdkError::Form(e.to_string()))?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| SdkError::Form(e.to_string()))?;
        let reply: BackendReply = serde_json::from_str(&body).unwrap_or(BackendReply {
            ok: false,
            errors: Vec::new(),
        });

        if status.is_success() && (reply.ok || reply.errors.is_empty()) {
            return Ok(FormSubmission {
                succeeded: true,
                errors: Vec::new(),
            });
        }
        if reply.errors.is_empty() {
            return Err(SdkError::Form(format!("form backend returned {}", status)));
        }
        Ok(FormSubmission::rejected(reply.errors))
    }
}

/// Validate locally, then submit. Local rejections never reach the backend.
pub async fn send_contact_message(
    backend: &dyn FormBackend,
    fields: &ContactFields,
) -> SdkResult<FormSubmission> {
    let errors = fields.validate();
    if !errors.is_empty() {
        warn!(count = errors.len(), "Contact form rejected locally");
        return Ok(FormSubmission::rejected(errors));
    }

    let mut map = Map::new();
    map.insert("email".to_string(), Value::String(fields.email.clone()));
    map.insert("message".to_string(), Value::String(fields.message.clone()));
    let submission = backend.submit(map).await?;
    if submission.succeeded {
        info!(email = %fields.email, "Contact message sent");
    }
    Ok(submission)
}

/// Newsletter sign-up, email only
pub async fn subscribe_newsletter(
    backend: &dyn FormBackend,
    email: &str,
) -> SdkResult<FormSubmission> {
    let email = email.trim();
    if !is_plausible_email(email) {
        return Ok(FormSubmission::rejected(vec![FormError {
            field: Some("email".to_string()),
            message: "should be an email".to_string(),
        }]));
    }
    let mut map = Map::new();
    map.insert("email".to_string(), Value::String(email.to_string()));
    backend.submit(map).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    struct RecordingBackend {
        calls: Mutex<Vec<Map<String, Value>>>,
    }

    #[async_trait]
    impl FormBackend for RecordingBackend {
        async fn submit(&self, fields: Map<String, Value>) -> SdkResult<FormSubmission> {
            self.calls.lock().unwrap().push(fields);
            Ok(FormSubmission {
                succeeded: true,
                errors: Vec::new(),
            })
        }
    }

    fn backend() -> RecordingBackend {
        RecordingBackend {
            calls: Mutex::new(Vec::new()),
        }
    }

    #[test]
    fn test_email_checks() {
        assert!(is_plausible_email("dev@example.com"));
        assert!(!is_plausible_email("dev@localhost"));
        assert!(!is_plausible_email("@example.com"));
        assert!(!is_plausible_email("dev example@x.io"));
        assert!(!is_plausible_email("dev"));
    }

    #[tokio::test]
    async fn test_invalid_fields_never_reach_backend() {
        let backend = backend();
        let result = send_contact_message(&backend, &ContactFields::new("nope", " "))
            .await
            .unwrap();
        assert!(!result.succeeded);
        assert_eq!(result.errors_for("email").count(), 1);
        assert_eq!(result.errors_for("message").count(), 1);
        assert!(backend.calls.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_valid_message_is_submitted() {
        let backend = backend();
        let result = send_contact_message(
            &backend,
            &ContactFields::new(" dev@example.com ", "Hello there"),
        )
        .await
        .unwrap();
        assert!(result.succeeded);

        let calls = backend.calls.lock().unwrap();
        assert_eq!(calls[0]["email"], "dev@example.com");
        assert_eq!(calls[0]["message"], "Hello there");
    }

    #[test]
    fn test_form_url_requires_id() {
        let client = FormClient::new(FormsConfig::default());
        assert!(matches!(client.form_url(), Err(SdkError::Config(_))));

        let client = FormClient::new(FormsConfig {
            endpoint: "https://formspree.io/f/".to_string(),
            form_id: "abc123".to_string(),
        });
        assert_eq!(client.form_url().unwrap(), "https://formspree.io/f/abc123");
    }

    #[test]
    fn test_backend_reply_parsing() {
        let reply: BackendReply = serde_json::from_str(
            r#"{"errors":[{"field":"email","message":"should be an email","code":"TYPE_EMAIL"}]}"#,
        )
        .unwrap();
        assert!(!reply.ok);
        assert_eq!(reply.errors[0].field.as_deref(), Some("email"));
    }
}
