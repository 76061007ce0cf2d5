//! Structural validation of declared configuration.
//!
//! Every problem is collected so a bad update can be fixed in one pass.

use thiserror::Error;

use crate::compiler::declared::{DeclaredConfig, RouteDecl};
use crate::source::gvr::GroupVersionResource;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum StructuralError {
    #[error("server `{0}` has no listen address")]
    NoListenAddress(String),

    #[error("{route}: no path declared")]
    MissingPath { route: String },

    #[error("{route}: path `{path}` must start with `/`")]
    RelativePath { route: String, path: String },

    #[error("{route}: invalid method `{method}`")]
    InvalidMethod { route: String, method: String },

    #[error("{route}: header name must not be empty")]
    EmptyHeaderName { route: String },

    #[error("{route}: declares neither a handler nor nested routes")]
    NoHandler { route: String },

    #[error("{route}: declares both a handler and nested routes")]
    AmbiguousHandler { route: String },

    #[error("{route}: handler name must not be empty")]
    EmptyHandlerName { route: String },

    #[error("source key `{0}` is not of the form group/version/resource")]
    InvalidSourceKey(String),

    #[error("sources.`{key}`[{index}] is not an object")]
    InvalidSourceEntry { key: String, index: usize },
}

pub fn validate(config: &DeclaredConfig) -> Result<(), Vec<StructuralError>> {
    let mut errors = Vec::new();

    if config.server.listen.is_empty() {
        errors.push(StructuralError::NoListenAddress(config.server.name.clone()));
    }

    for (i, route) in config.routes.iter().enumerate() {
        validate_route(route, format!("routes[{}]", i), &mut errors);
    }

    for (key, entries) in &config.sources {
        if GroupVersionResource::parse(key).is_none() {
            errors.push(StructuralError::InvalidSourceKey(key.clone()));
        }
        for (index, entry) in entries.iter().enumerate() {
            if !entry.is_object() {
                errors.push(StructuralError::InvalidSourceEntry {
                    key: key.clone(),
                    index,
                });
            }
        }
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn validate_route(route: &RouteDecl, position: String, errors: &mut Vec<StructuralError>) {
    let label = match &route.name {
        Some(name) => format!("{} ({})", position, name),
        None => position.clone(),
    };

    if route.path.is_empty() {
        errors.push(StructuralError::MissingPath { route: label.clone() });
    }
    for path in &route.path {
        if !path.starts_with('/') {
            errors.push(StructuralError::RelativePath {
                route: label.clone(),
                path: path.clone(),
            });
        }
    }

    for method in &route.methods {
        if !is_method_token(method) {
            errors.push(StructuralError::InvalidMethod {
                route: label.clone(),
                method: method.clone(),
            });
        }
    }

    if route.headers.keys().any(|name| name.trim().is_empty()) {
        errors.push(StructuralError::EmptyHeaderName { route: label.clone() });
    }

    match (&route.handler, route.routes.is_empty()) {
        (None, true) => errors.push(StructuralError::NoHandler { route: label.clone() }),
        (Some(_), false) => errors.push(StructuralError::AmbiguousHandler { route: label.clone() }),
        (Some(handler), true) if handler.name.trim().is_empty() => {
            errors.push(StructuralError::EmptyHandlerName { route: label.clone() })
        }
        _ => {}
    }

    for (i, child) in route.routes.iter().enumerate() {
        validate_route(child, format!("{}.routes[{}]", position, i), errors);
    }
}

/// HTTP method names are `token`s: one or more `tchar`s.
fn is_method_token(method: &str) -> bool {
    !method.is_empty()
        && method
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b"!#$%&'*+-.^_`|~".contains(&b))
}
