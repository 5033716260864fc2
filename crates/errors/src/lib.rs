//! `paydesk-errors` — structured application error codes.
//!
//! This crate owns the error-code scheme used across the backend: every
//! business error carries a three-part code `flowId.httpStatus.localCode`
//! that clients can handle programmatically, plus a human-readable message.
//! Flows and their error conditions are declared once at startup against an
//! explicit [`ExceptionFlowRegistry`], which then serves a read-only
//! directory for API documentation and support lookups.

pub mod code;
pub mod exception;
pub mod registry;

pub use code::{AppErrorCode, COMMON_FLOW_ID, COMMON_LOCAL_CODE, ParseCodeError};
pub use exception::{AppException, AppResult};
pub use registry::{
    ExceptionFlow, ExceptionFlowRegistry, ExceptionRegistryEntry, FlowDirectoryEntry, FlowHandle,
    RegistryError,
};
