//! Matcher-set descriptors.
//!
//! # Responsibilities
//! - Always constrain on path
//! - Constrain on method only when methods were supplied
//! - Constrain on headers only when header constraints were supplied
//!
//! # Design Decisions
//! - Omitted constraints impose no restriction, so their keys are left out
//!   entirely rather than emitted as empty sets
//! - Header constraints are kept in a `BTreeMap` for stable key order

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Header name → accepted values.
pub type HeaderConstraints = BTreeMap<String, Vec<String>>;

/// Wire form: `{"path": [..], "method": [..]?, "header": {..}?}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatcherSet {
    pub path: Vec<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub method: Vec<String>,

    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub header: HeaderConstraints,
}

impl MatcherSet {
    pub fn constrains_method(&self) -> bool {
        !self.method.is_empty()
    }

    pub fn constrains_headers(&self) -> bool {
        !self.header.is_empty()
    }
}

/// Build a matcher set from paths, methods and header constraints.
pub fn matcher_set<P, M>(paths: P, methods: M, headers: HeaderConstraints) -> MatcherSet
where
    P: IntoIterator,
    P::Item: Into<String>,
    M: IntoIterator,
    M::Item: Into<String>,
{
    MatcherSet {
        path: paths.into_iter().map(Into::into).collect(),
        method: methods.into_iter().map(Into::into).collect(),
        header: headers,
    }
}
