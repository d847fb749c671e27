//! Admin panel core: authorization gate, audit recorder, and the privileged
//! operations built on them.
//!
//! Handlers never consult ambient "current admin" state. Every privileged
//! call names its actor and permission, and returns what it wants logged.

pub mod audit;
pub mod gate;
pub mod moderation;
pub mod permissions;

pub use self::audit::{
    AuditDescriptor, AuditEntry, AuditFilter, AuditGroup, AuditPage, Details, Pagination, Recorder,
};
pub use self::gate::{evaluate, Authorization, Denied, Gate};
pub use self::moderation::{Moderation, Paged, Performed, Privileged};
pub use crate::db::grants::AdminGrant;
