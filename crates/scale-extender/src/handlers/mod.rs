//! HTTP request handlers.

pub mod extender;
pub mod health;
pub mod version;
