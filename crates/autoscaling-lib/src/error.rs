//! Error types for the JSON client and the binding workflow

use std::error::Error as _;
use std::fmt;
use thiserror::Error;

/// Errors raised by a single [`JsonClient`](crate::client::JsonClient) exchange
#[derive(Error, Debug)]
pub enum ClientError {
    /// The request payload could not be encoded as JSON
    #[error("couldn't serialize request: {0}")]
    Serialization(serde_json::Error),

    /// The method, URL or credential cannot form a valid HTTP request
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// Network or transport failure, rendered with its whole cause chain
    #[error("{}", cause_chain(.0))]
    Transport(reqwest::Error),

    /// Any status other than 200 OK; carries the status line
    #[error("unexpected response code: {0}")]
    UnexpectedStatus(String),

    /// The response body is not the expected JSON shape
    #[error("couldn't parse response: {0}")]
    ResponseParse(serde_json::Error),
}

impl From<reqwest::Error> for ClientError {
    fn from(error: reqwest::Error) -> Self {
        ClientError::Transport(error)
    }
}

/// Join `error` and its sources with `: `, skipping causes already rendered
/// by their parent
fn cause_chain(error: &reqwest::Error) -> String {
    let mut message = error.to_string();
    let mut source = error.source();
    while let Some(cause) = source {
        let text = cause.to_string();
        if !message.contains(&text) {
            message.push_str(": ");
            message.push_str(&text);
        }
        source = cause.source();
    }
    message
}

/// Remote hop a [`WorkflowError::RemoteCall`] happened on
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Hop {
    /// Control-plane service binding lookup
    ServiceBinding,
    /// Autoscaling API read or write
    AutoscalingApi,
}

impl fmt::Display for Hop {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Hop::ServiceBinding => f.write_str("couldn't retrieve service binding"),
            Hop::AutoscalingApi => f.write_str("autoscaling API"),
        }
    }
}

/// Errors raised while configuring an Autoscaling binding
///
/// Every variant renders as a single line; remote failures embed the
/// underlying client error after the hop prefix.
#[derive(Error, Debug)]
pub enum WorkflowError {
    #[error("invalid API URL from cli: {0}")]
    InvalidApiEndpoint(String),

    #[error("invalid dashboard URL from service instance: {0}")]
    InvalidDashboardUrl(String),

    /// Zero or several bindings matched the app/service pair
    #[error("couldn't find service binding for {app_name} to {service_name}")]
    BindingResolution {
        app_name: String,
        service_name: String,
        matches: usize,
    },

    #[error("min instances must be <= max instances")]
    InstanceRange { min: u32, max: u32 },

    #[error("CPU min threshold must be <= CPU max threshold")]
    ThresholdRange { min: u32, max: u32 },

    #[error("{hop}: {error}")]
    RemoteCall { hop: Hop, error: ClientError },
}

impl WorkflowError {
    pub(crate) fn remote(hop: Hop) -> impl FnOnce(ClientError) -> Self {
        move |error| WorkflowError::RemoteCall { hop, error }
    }
}
