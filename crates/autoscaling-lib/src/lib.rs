//! Autoscaling binding configuration library
//!
//! This crate provides the core functionality for:
//! - Authenticated JSON exchanges with remote APIs
//! - Session lookups (login state, token, endpoint, app/service metadata)
//! - Resolving the service binding between an app and an Autoscaling instance
//! - Reconfiguring and re-enabling the Autoscaling binding

pub mod client;
pub mod error;
pub mod models;
pub mod observability;
pub mod session;
pub mod workflow;

pub use client::{HttpTransport, JsonClient};
pub use error::{ClientError, Hop, WorkflowError};
pub use models::*;
pub use observability::WorkflowLogger;
pub use session::{AppModel, CfConfigSession, ServiceModel, SessionLookups, WorkflowContext};
pub use workflow::configure_autoscaling;
