//! HTTP API: server, routing, and the role-gate middleware.

pub mod app;
pub mod context;
pub mod directory;
pub mod jwt;
pub mod middleware;
