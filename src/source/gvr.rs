//! Resource identity of plugin-type keys.

use std::fmt;

/// `group/version/resource`, e.g. `core.gateway.io/v1alpha1/workspaces`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct GroupVersionResource {
    pub group: String,
    pub version: String,
    pub resource: String,
}

impl GroupVersionResource {
    /// Strict parse: exactly three non-empty segments.
    pub fn parse(key: &str) -> Option<Self> {
        let mut parts = key.split('/');
        let (group, version, resource) = (parts.next()?, parts.next()?, parts.next()?);
        if parts.next().is_some() || [group, version, resource].iter().any(|p| p.is_empty()) {
            return None;
        }
        Some(Self {
            group: group.to_string(),
            version: version.to_string(),
            resource: resource.to_string(),
        })
    }

    /// Lenient form for diagnostics: a malformed key becomes the resource name.
    pub fn for_key(key: &str) -> Self {
        Self::parse(key).unwrap_or_else(|| Self {
            group: String::new(),
            version: String::new(),
            resource: key.to_string(),
        })
    }
}

impl fmt::Display for GroupVersionResource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.group, self.version, self.resource)
    }
}
