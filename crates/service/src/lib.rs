//! Service layer orchestrating contact synchronization on top of the
//! provider clients in `common` and the call-log entity in `models`.
//! - Each external system sits behind a port trait (`ports`).
//! - Concrete HTTP and SeaORM implementations live in `adapters`.
//! - Business flows (`contact_sync`, `task_service`) only see the ports.

pub mod errors;
pub mod domain;
pub mod ports;
pub mod adapters;
pub mod call_log;
pub mod task_service;
pub mod contact_sync;
pub mod pagination;
#[cfg(test)]
pub mod test_support;

pub use contact_sync::ContactSyncService;
pub use task_service::TaskService;
