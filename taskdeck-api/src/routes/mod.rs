/// API route handlers
///
/// This module contains all route handlers organized by resource:
///
/// - `health`: Health check endpoint
/// - `auth`: Registration, login, logout, email lookup
/// - `profiles`: User profile passthrough
/// - `boards`: Board CRUD with computed aggregates
/// - `tasks`: Task lifecycle and per-user filters
/// - `comments`: Task comment sub-resource

pub mod auth;
pub mod boards;
pub mod comments;
pub mod health;
pub mod profiles;
pub mod tasks;
