/// Custom middleware for the API server
///
/// - `security`: Security-related HTTP response headers

pub mod security;
