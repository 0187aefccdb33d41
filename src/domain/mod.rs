//! Domain layer - core business logic and entities

pub mod execution;
pub mod pricing;
pub mod session;
pub mod swap;
