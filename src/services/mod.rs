pub mod admin_service;
pub mod audit_service;
pub mod dispatch_service;
pub mod gateway;
pub mod health_service;
pub mod session_store;
pub mod validation;
