//! API Routes
//!
//! Route handlers organized by functionality.

pub mod health;
pub mod logs;
pub mod query;
pub mod tables;
pub mod variables;
