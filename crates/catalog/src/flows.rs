//! Flow and exception declarations for every backend subsystem.
//!
//! Flow ids and local codes are stable API: clients match on the composed
//! code strings, so renumbering an entry is a breaking change. Add new
//! entries at the end of their flow.

use paydesk_errors::{ExceptionFlowRegistry, FlowHandle, RegistryError};

pub const CUSTOMERS_FLOW_ID: u32 = 1;
pub const EXPENSES_FLOW_ID: u32 = 2;
pub const REGULAR_PAYMENTS_FLOW_ID: u32 = 3;
pub const AUTH_FLOW_ID: u32 = 4;
pub const MAIL_FLOW_ID: u32 = 5;

/// Build the process-wide registry with every flow declared.
///
/// Called once during initialization; any declaration error is a fatal
/// configuration bug and must abort startup.
pub fn build_registry() -> Result<ExceptionFlowRegistry, RegistryError> {
    let mut registry = ExceptionFlowRegistry::new();
    register_customer_errors(&mut registry)?;
    register_expense_errors(&mut registry)?;
    register_regular_payment_errors(&mut registry)?;
    register_auth_errors(&mut registry)?;
    register_mail_errors(&mut registry)?;
    Ok(registry)
}

fn register_customer_errors(
    registry: &mut ExceptionFlowRegistry,
) -> Result<FlowHandle, RegistryError> {
    let flow = registry.register_flow("Customers", CUSTOMERS_FLOW_ID)?;
    registry.register_exception(
        flow,
        1,
        404,
        "CustomerNotFound",
        "No customer exists with the given identifier.",
    )?;
    registry.register_exception(
        flow,
        2,
        409,
        "CustomerAlreadyExists",
        "A customer with this email address is already registered.",
    )?;
    registry.register_exception(
        flow,
        3,
        422,
        "CustomerHasOpenExpenses",
        "The customer cannot be removed while unsettled expenses remain.",
    )?;
    Ok(flow)
}

fn register_expense_errors(
    registry: &mut ExceptionFlowRegistry,
) -> Result<FlowHandle, RegistryError> {
    let flow = registry.register_flow("Expenses", EXPENSES_FLOW_ID)?;
    registry.register_exception(
        flow,
        1,
        404,
        "ExpenseNotFound",
        "No expense exists with the given identifier.",
    )?;
    registry.register_exception(
        flow,
        2,
        422,
        "InvalidExpenseAmount",
        "The expense amount must be a positive value.",
    )?;
    registry.register_exception(
        flow,
        3,
        403,
        "ExpenseOwnedByAnotherCustomer",
        "The expense belongs to a different customer.",
    )?;
    Ok(flow)
}

fn register_regular_payment_errors(
    registry: &mut ExceptionFlowRegistry,
) -> Result<FlowHandle, RegistryError> {
    let flow = registry.register_flow("Regular payments", REGULAR_PAYMENTS_FLOW_ID)?;
    registry.register_exception(
        flow,
        1,
        404,
        "RegularPaymentNotFound",
        "No regular payment exists with the given identifier.",
    )?;
    registry.register_exception(
        flow,
        2,
        422,
        "InvalidPaymentSchedule",
        "The recurrence schedule is malformed or lies in the past.",
    )?;
    registry.register_exception(
        flow,
        3,
        409,
        "RegularPaymentAlreadyCancelled",
        "The regular payment has already been cancelled.",
    )?;
    Ok(flow)
}

fn register_auth_errors(
    registry: &mut ExceptionFlowRegistry,
) -> Result<FlowHandle, RegistryError> {
    let flow = registry.register_flow("Auth", AUTH_FLOW_ID)?;
    registry.register_exception(
        flow,
        1,
        401,
        "InvalidCredentials",
        "The supplied credentials are not valid.",
    )?;
    registry.register_exception(
        flow,
        2,
        401,
        "TokenExpired",
        "The access token has expired; re-authenticate to continue.",
    )?;
    registry.register_exception(
        flow,
        3,
        403,
        "RoleForbidden",
        "The authenticated role is not allowed to perform this operation.",
    )?;
    Ok(flow)
}

fn register_mail_errors(
    registry: &mut ExceptionFlowRegistry,
) -> Result<FlowHandle, RegistryError> {
    let flow = registry.register_flow("Mail", MAIL_FLOW_ID)?;
    registry.register_exception(
        flow,
        1,
        500,
        "TemplateNotFound",
        "The referenced mail template is not available.",
    )?;
    registry.register_exception(
        flow,
        2,
        502,
        "DeliveryRejected",
        "The mail provider rejected the notification.",
    )?;
    Ok(flow)
}
