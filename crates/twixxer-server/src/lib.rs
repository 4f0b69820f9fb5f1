//! HTTP server: routes, session cookies, DTOs, and OpenAPI documentation.

pub mod config;
pub mod dto;
pub mod error;
pub mod openapi;
pub mod routes;
pub mod session;
pub mod state;
