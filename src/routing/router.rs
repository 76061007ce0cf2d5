//! Route descriptors and subrouters.
//!
//! # Responsibilities
//! - Pair matcher sets with an ordered handler chain
//! - Wrap an ordered list of routes into one composite subrouter route
//!
//! # Design Decisions
//! - Route order is evaluation order; nothing here reorders routes
//! - A route with no matcher sets matches everything, so `match` is omitted

use serde::{Deserialize, Serialize};

use crate::routing::handler::Handler;
use crate::routing::matcher::MatcherSet;

/// Wire form: `{"match": [..]?, "handle": [..], "terminal": true?}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Route {
    #[serde(rename = "match", default, skip_serializing_if = "Vec::is_empty")]
    pub matchers: Vec<MatcherSet>,

    #[serde(default)]
    pub handle: Vec<Handler>,

    #[serde(default, skip_serializing_if = "is_false")]
    pub terminal: bool,
}

fn is_false(value: &bool) -> bool {
    !*value
}

impl Route {
    /// A route constrained by one matcher set.
    pub fn new(matcher: MatcherSet, handle: Vec<Handler>) -> Self {
        Self {
            matchers: vec![matcher],
            handle,
            terminal: false,
        }
    }

    /// Stop evaluating later routes once this one matched.
    pub fn terminal(mut self) -> Self {
        self.terminal = true;
        self
    }

    /// Number of routes in this subtree, this one included.
    pub fn count(&self) -> usize {
        1 + self
            .handle
            .iter()
            .map(|h| match h {
                Handler::Subroute(routes) => routes.iter().map(Route::count).sum::<usize>(),
                Handler::Named(_) => 0,
            })
            .sum::<usize>()
    }
}

/// Wrap `routes` in a single subrouter handler, preserving their order.
pub fn subrouter(routes: Vec<Route>) -> Handler {
    Handler::Subroute(routes)
}
