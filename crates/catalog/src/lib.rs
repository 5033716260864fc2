//! `paydesk-catalog` — the backend's declared error flows.
//!
//! One place where every subsystem's error conditions are registered, so the
//! full code directory can be built at startup and published as API
//! documentation.

pub mod flows;

pub use flows::{
    AUTH_FLOW_ID, CUSTOMERS_FLOW_ID, EXPENSES_FLOW_ID, MAIL_FLOW_ID, REGULAR_PAYMENTS_FLOW_ID,
    build_registry,
};
