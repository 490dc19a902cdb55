use std::fmt;
use std::sync::Arc;

use tracing::debug;

use crate::soap::envelope::Envelope;
use crate::soap::error::SoapError;
use crate::soap::operation::Operation;
use crate::soap::response::Response;
use crate::soap::transport::{HttpRequest, Transport};
use crate::soap::value::Value;

pub const DEFAULT_CONTENT_TYPE: &str = "text/xml; charset=utf-8";

#[derive(Clone)]
pub struct Credentials {
    pub username: String,
    pub password: String,
}

impl Credentials {
    pub fn new(username: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("username", &self.username)
            .field("password", &"<redacted>")
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct SoapConfig {
    /// URL the envelope is POSTed to.
    pub endpoint: String,
    /// Namespace of the operation elements.
    pub namespace: String,
    pub content_type: String,
    /// Header entry that must decode to `true` for the call to count as
    /// authenticated. `None` skips the check.
    pub auth_acknowledgement: Option<String>,
}

impl SoapConfig {
    /// Endpoint and namespace are the same URL, as is common for PHP SOAP
    /// servers.
    pub fn new(endpoint: impl Into<String>) -> Self {
        let endpoint = endpoint.into();
        Self {
            namespace: endpoint.clone(),
            endpoint,
            content_type: DEFAULT_CONTENT_TYPE.to_string(),
            auth_acknowledgement: None,
        }
    }
}

pub struct SoapClient {
    config: SoapConfig,
    transport: Arc<dyn Transport>,
}

impl SoapClient {
    pub fn new(config: SoapConfig, transport: Arc<dyn Transport>) -> Self {
        Self { config, transport }
    }

    pub fn config(&self) -> &SoapConfig {
        &self.config
    }

    /// Builds the request document for one call.
    pub fn compose(
        &self,
        operation: &Operation,
        args: Vec<Value>,
        credentials: &Credentials,
    ) -> Result<String, SoapError> {
        let params = operation.bind(args)?;
        let mut envelope = Envelope::new(&self.config.namespace);
        envelope.add_auth(credentials);
        envelope.add_call(operation.name, &params);
        envelope.to_xml()
    }

    /// Performs one round trip and returns the operation's result.
    pub async fn invoke(
        &self,
        operation: &Operation,
        args: Vec<Value>,
        credentials: &Credentials,
    ) -> Result<Value, SoapError> {
        debug!(operation = operation.name, args = ?args, "SOAP request");
        let payload = self.compose(operation, args, credentials)?;

        let request = HttpRequest {
            url: self.config.endpoint.clone(),
            headers: vec![
                ("Content-Type".to_string(), self.config.content_type.clone()),
                (
                    "SOAPAction".to_string(),
                    format!("\"{}#{}\"", self.config.namespace, operation.name),
                ),
            ],
            body: payload.into_bytes(),
        };
        let response = self.transport.post(request).await?;
        let body = String::from_utf8_lossy(&response.body).into_owned();
        debug!(operation = operation.name, status = response.status, response = %body, "SOAP response");

        if !response.is_success() {
            return Err(match Response::parse(&self.config.namespace, &body) {
                Err(e @ (SoapError::Fault(_) | SoapError::Authentication(_))) => e,
                _ => SoapError::Status {
                    status: response.status,
                    body,
                },
            });
        }

        let parsed = Response::parse(&self.config.namespace, &body)?;
        if let Some(ack) = &self.config.auth_acknowledgement {
            if parsed.header(ack) != Some(&Value::Bool(true)) {
                return Err(SoapError::Authentication(format!(
                    "{ack} missing or not true"
                )));
            }
        }

        let name = operation.response_name();
        let value = parsed
            .into_result(&name)
            .ok_or_else(|| SoapError::Parse(format!("response has no {name}")))?;
        if !operation.returns.accepts(&value) {
            return Err(SoapError::Parse(format!(
                "{name} has unexpected type {} (expecting {:?})",
                value.kind(),
                operation.returns
            )));
        }
        Ok(value)
    }
}
