//! Request DTO

use crate::domain::entities::QueryArgs;

/// The parts of an HTTP request the handlers look at
#[derive(Debug, Clone)]
pub struct RequestInfo {
    /// Request method, e.g. `GET`
    pub method: String,
    /// URI path without the query string
    pub path: String,
    /// Query arguments in request order
    pub args: QueryArgs,
}

impl RequestInfo {
    pub fn new(method: &str, path: &str, args: QueryArgs) -> Self {
        Self {
            method: method.to_string(),
            path: path.to_string(),
            args,
        }
    }

    /// Shorthand for a `GET` request
    pub fn get(path: &str, args: QueryArgs) -> Self {
        Self::new("GET", path, args)
    }
}
