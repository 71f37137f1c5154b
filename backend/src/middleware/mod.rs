//! Request middleware for the Distribution Back Office Platform

mod tenant;

pub use tenant::{tenant_middleware, TenantContext, TenantCtx};
