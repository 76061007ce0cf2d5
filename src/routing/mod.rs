//! Routing descriptor builders.
//!
//! # Data Flow
//! ```text
//! Declared route (paths, methods, headers, handler | nested routes)
//!     → matcher.rs (matcher set)
//!     → handler.rs (namespaced handler) or router.rs (subrouter)
//!     → Route descriptor, serialized for the serving engine
//! ```
//!
//! # Design Decisions
//! - Builders are pure and infallible; validation happens in the compiler
//! - Descriptors serialize deterministically (field order, BTreeMap keys)
//! - First match wins in the serving engine, so order is preserved end-to-end

pub mod handler;
pub mod matcher;
pub mod router;

pub use handler::{handler, Handler, HandlerDescriptor, HANDLER_PREFIX, SUBROUTE_HANDLER};
pub use matcher::{matcher_set, HeaderConstraints, MatcherSet};
pub use router::{subrouter, Route};
