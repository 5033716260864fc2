//! Flow registry and error-code directory.
//!
//! Flows and their exception kinds are declared once during process
//! initialization; the registry validates the declarations (duplicate ids
//! are fatal, never silently overwritten) and afterwards serves read-only
//! queries. Exclusivity of the write phase is carried by `&mut self`: once
//! initialization hands out shared references, no further registration can
//! happen and reads need no synchronization.

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::Serialize;
use thiserror::Error;

use crate::code::{AppErrorCode, COMMON_FLOW_ID};

/// Declaration-time registry failure.
///
/// All variants are unrecoverable configuration errors: the registry must be
/// unambiguous before any request is served, so initialization aborts rather
/// than continuing with a partial or colliding declaration set.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RegistryError {
    /// Two flows declared the same flow id, or a flow claimed the reserved
    /// common flow id 0.
    #[error("flow id {0} is already registered")]
    DuplicateFlowId(u32),

    /// Two exception kinds within one flow declared the same local code.
    #[error("local code {local_code} is already registered in flow {flow_id}")]
    DuplicateLocalCode { flow_id: u32, local_code: u32 },

    /// The handle was not minted by this registry.
    #[error("flow handle does not belong to this registry")]
    UnknownFlowHandle,
}

// ─────────────────────────────────────────────────────────────────────────────
// Flows and entries
// ─────────────────────────────────────────────────────────────────────────────

/// One declared error kind within a flow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ExceptionRegistryEntry {
    /// The fully composed structured code.
    pub code: AppErrorCode,
    /// Symbolic identifier, e.g. `CustomerNotFound`.
    pub name: String,
    /// Human-readable explanation shown to API consumers.
    pub description: String,
}

/// A named grouping of related error conditions within one subsystem.
///
/// Entries keep their declaration order; the flow is never mutated once its
/// declarations are complete.
#[derive(Debug)]
pub struct ExceptionFlow {
    name: String,
    flow_id: u32,
    exceptions: Vec<ExceptionRegistryEntry>,
}

impl ExceptionFlow {
    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn flow_id(&self) -> u32 {
        self.flow_id
    }

    pub fn exceptions(&self) -> &[ExceptionRegistryEntry] {
        &self.exceptions
    }
}

/// Opaque handle returned by [`ExceptionFlowRegistry::register_flow`].
///
/// Carries the minting registry's tag so a handle from another registry
/// instance is rejected instead of silently addressing a different flow.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct FlowHandle {
    registry_tag: u64,
    index: usize,
}

/// One flow in the documentation directory, borrowing the registry's data.
#[derive(Debug, Clone, Serialize)]
pub struct FlowDirectoryEntry<'a> {
    /// Human label of the flow.
    pub name: &'a str,
    /// The flow id, i.e. the first segment of every code in this flow.
    pub code: u32,
    /// Declared error kinds in declaration order.
    pub exceptions: &'a [ExceptionRegistryEntry],
}

// ─────────────────────────────────────────────────────────────────────────────
// Registry
// ─────────────────────────────────────────────────────────────────────────────

static REGISTRY_TAG: AtomicU64 = AtomicU64::new(0);

/// Owns all declared flows and serves the read-only directory.
///
/// Construct one per process during initialization, register every flow and
/// exception, then share it immutably with whatever needs lookups (error
/// middleware, documentation endpoint).
#[derive(Debug)]
pub struct ExceptionFlowRegistry {
    tag: u64,
    flows: Vec<ExceptionFlow>,
    index_by_flow_id: HashMap<u32, usize>,
}

impl ExceptionFlowRegistry {
    pub fn new() -> Self {
        Self {
            tag: REGISTRY_TAG.fetch_add(1, Ordering::Relaxed),
            flows: Vec::new(),
            index_by_flow_id: HashMap::new(),
        }
    }

    /// Declare a new flow.
    ///
    /// Flow id 0 is reserved for common codes and cannot be claimed. A
    /// duplicate flow id fails without touching the existing flow.
    pub fn register_flow(
        &mut self,
        name: impl Into<String>,
        flow_id: u32,
    ) -> Result<FlowHandle, RegistryError> {
        if flow_id == COMMON_FLOW_ID || self.index_by_flow_id.contains_key(&flow_id) {
            return Err(RegistryError::DuplicateFlowId(flow_id));
        }

        let index = self.flows.len();
        self.flows.push(ExceptionFlow {
            name: name.into(),
            flow_id,
            exceptions: Vec::new(),
        });
        self.index_by_flow_id.insert(flow_id, index);
        Ok(FlowHandle {
            registry_tag: self.tag,
            index,
        })
    }

    /// Declare one error kind under a flow and return its composed code.
    ///
    /// A duplicate local code fails without mutating the directory: the
    /// prior entry stays, no partial entry appears.
    pub fn register_exception(
        &mut self,
        handle: FlowHandle,
        local_code: u32,
        http_status: u16,
        name: impl Into<String>,
        description: impl Into<String>,
    ) -> Result<AppErrorCode, RegistryError> {
        let flow = self.flow_mut(handle)?;
        if flow.exceptions.iter().any(|e| e.code.local_code() == local_code) {
            return Err(RegistryError::DuplicateLocalCode {
                flow_id: flow.flow_id,
                local_code,
            });
        }

        let code = AppErrorCode::new(flow.flow_id, http_status, local_code);
        flow.exceptions.push(ExceptionRegistryEntry {
            code,
            name: name.into(),
            description: description.into(),
        });
        Ok(code)
    }

    /// Read-only directory of every flow and its exceptions.
    ///
    /// Lazy and restartable: each call walks the same declaration-ordered
    /// data. Serialize the collected entries to publish the documentation
    /// document.
    pub fn directory(&self) -> impl Iterator<Item = FlowDirectoryEntry<'_>> {
        self.flows.iter().map(|flow| FlowDirectoryEntry {
            name: &flow.name,
            code: flow.flow_id,
            exceptions: &flow.exceptions,
        })
    }

    /// All declared flows in declaration order.
    pub fn flows(&self) -> &[ExceptionFlow] {
        &self.flows
    }

    /// Look up the registry entry behind a code, e.g. from a client report.
    ///
    /// Common codes and undeclared codes return `None`.
    pub fn find(&self, code: &AppErrorCode) -> Option<&ExceptionRegistryEntry> {
        let index = *self.index_by_flow_id.get(&code.flow_id())?;
        self.flows
            .get(index)?
            .exceptions
            .iter()
            .find(|entry| entry.code == *code)
    }

    fn flow_mut(&mut self, handle: FlowHandle) -> Result<&mut ExceptionFlow, RegistryError> {
        if handle.registry_tag != self.tag {
            return Err(RegistryError::UnknownFlowHandle);
        }
        self.flows
            .get_mut(handle.index)
            .ok_or(RegistryError::UnknownFlowHandle)
    }
}

impl Default for ExceptionFlowRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn registry_with_customers() -> (ExceptionFlowRegistry, FlowHandle) {
        let mut registry = ExceptionFlowRegistry::new();
        let handle = registry.register_flow("Customers", 12).unwrap();
        (registry, handle)
    }

    #[test]
    fn register_exception_composes_full_code() {
        let (mut registry, customers) = registry_with_customers();
        let code = registry
            .register_exception(customers, 3, 404, "CustomerNotFound", "No customer with this id")
            .unwrap();
        assert_eq!(code.to_string(), "12.404.3");
    }

    #[test]
    fn directory_round_trip() {
        let (mut registry, customers) = registry_with_customers();
        registry
            .register_exception(customers, 3, 404, "CustomerNotFound", "No customer with this id")
            .unwrap();

        let directory: Vec<_> = registry.directory().collect();
        assert_eq!(directory.len(), 1);
        assert_eq!(directory[0].name, "Customers");
        assert_eq!(directory[0].code, 12);
        assert_eq!(directory[0].exceptions.len(), 1);
        assert_eq!(directory[0].exceptions[0].code.to_string(), "12.404.3");
        assert_eq!(directory[0].exceptions[0].name, "CustomerNotFound");
    }

    #[test]
    fn duplicate_flow_id_fails_and_preserves_existing_flow() {
        let (mut registry, customers) = registry_with_customers();
        registry
            .register_exception(customers, 3, 404, "CustomerNotFound", "No customer with this id")
            .unwrap();

        let err = registry.register_flow("Expenses", 12).unwrap_err();
        assert_eq!(err, RegistryError::DuplicateFlowId(12));

        let directory: Vec<_> = registry.directory().collect();
        assert_eq!(directory.len(), 1);
        assert_eq!(directory[0].name, "Customers");
        assert_eq!(directory[0].exceptions.len(), 1);
    }

    #[test]
    fn duplicate_local_code_fails_without_mutating_directory() {
        let (mut registry, customers) = registry_with_customers();
        registry
            .register_exception(customers, 3, 404, "CustomerNotFound", "No customer with this id")
            .unwrap();

        let err = registry
            .register_exception(customers, 3, 409, "CustomerConflict", "Would collide")
            .unwrap_err();
        assert_eq!(
            err,
            RegistryError::DuplicateLocalCode {
                flow_id: 12,
                local_code: 3
            }
        );

        let directory: Vec<_> = registry.directory().collect();
        assert_eq!(directory[0].exceptions.len(), 1);
        assert_eq!(directory[0].exceptions[0].name, "CustomerNotFound");
    }

    #[test]
    fn same_local_code_is_allowed_across_flows() {
        let (mut registry, customers) = registry_with_customers();
        let expenses = registry.register_flow("Expenses", 13).unwrap();
        registry
            .register_exception(customers, 1, 404, "CustomerNotFound", "No customer")
            .unwrap();
        let code = registry
            .register_exception(expenses, 1, 404, "ExpenseNotFound", "No expense")
            .unwrap();
        assert_eq!(code.to_string(), "13.404.1");
    }

    #[test]
    fn reserved_common_flow_id_is_rejected() {
        let mut registry = ExceptionFlowRegistry::new();
        let err = registry.register_flow("Sneaky", 0).unwrap_err();
        assert_eq!(err, RegistryError::DuplicateFlowId(0));
    }

    #[test]
    fn handle_from_another_registry_is_rejected() {
        let (_other, foreign_handle) = registry_with_customers();
        let mut registry = ExceptionFlowRegistry::new();
        registry.register_flow("Customers", 12).unwrap();

        let err = registry
            .register_exception(foreign_handle, 1, 404, "CustomerNotFound", "No customer")
            .unwrap_err();
        assert_eq!(err, RegistryError::UnknownFlowHandle);
    }

    #[test]
    fn directory_preserves_declaration_order() {
        let mut registry = ExceptionFlowRegistry::new();
        // Deliberately not sorted by id.
        let auth = registry.register_flow("Auth", 40).unwrap();
        let customers = registry.register_flow("Customers", 12).unwrap();
        registry
            .register_exception(auth, 2, 403, "RoleForbidden", "Role lacks access")
            .unwrap();
        registry
            .register_exception(auth, 1, 401, "InvalidCredentials", "Bad credentials")
            .unwrap();
        registry
            .register_exception(customers, 1, 404, "CustomerNotFound", "No customer")
            .unwrap();

        let names: Vec<&str> = registry.directory().map(|f| f.name).collect();
        assert_eq!(names, vec!["Auth", "Customers"]);

        let auth_locals: Vec<u32> = registry
            .directory()
            .next()
            .unwrap()
            .exceptions
            .iter()
            .map(|e| e.code.local_code())
            .collect();
        assert_eq!(auth_locals, vec![2, 1]);
    }

    #[test]
    fn directory_is_restartable() {
        let (mut registry, customers) = registry_with_customers();
        registry
            .register_exception(customers, 3, 404, "CustomerNotFound", "No customer")
            .unwrap();

        let first: Vec<String> = registry.directory().map(|f| f.name.to_string()).collect();
        let second: Vec<String> = registry.directory().map(|f| f.name.to_string()).collect();
        assert_eq!(first, second);
    }

    #[test]
    fn find_resolves_registered_codes_only() {
        let (mut registry, customers) = registry_with_customers();
        let code = registry
            .register_exception(customers, 3, 404, "CustomerNotFound", "No customer with this id")
            .unwrap();

        let entry = registry.find(&code).unwrap();
        assert_eq!(entry.name, "CustomerNotFound");
        assert_eq!(entry.description, "No customer with this id");

        assert!(registry.find(&AppErrorCode::new(12, 404, 9)).is_none());
        assert!(registry.find(&AppErrorCode::common(400)).is_none());
    }

    #[test]
    fn directory_serializes_to_json() {
        let (mut registry, customers) = registry_with_customers();
        registry
            .register_exception(customers, 3, 404, "CustomerNotFound", "No customer with this id")
            .unwrap();

        let directory: Vec<_> = registry.directory().collect();
        let json = serde_json::to_value(&directory).unwrap();
        assert_eq!(json[0]["name"], "Customers");
        assert_eq!(json[0]["code"], 12);
        assert_eq!(json[0]["exceptions"][0]["code"], "12.404.3");
    }
}
