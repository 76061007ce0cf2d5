//! Handler descriptors.
//!
//! Named handlers are emitted as `{"handler": "sc_<name>_handler", ..params}`;
//! subrouters as `{"handler": "subroute", "routes": [..]}`.

use std::collections::BTreeMap;

use serde::de::Error as _;
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

use crate::routing::router::Route;

/// Namespace prefix of every named handler.
pub const HANDLER_PREFIX: &str = "sc";

/// Discriminator of the composite subrouter handler.
pub const SUBROUTE_HANDLER: &str = "subroute";

const DISCRIMINATOR: &str = "handler";

/// A handler identified by its discriminator, with its parameters as sibling fields.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HandlerDescriptor {
    pub handler: String,

    #[serde(flatten)]
    pub params: BTreeMap<String, Value>,
}

/// One entry of a route's handler chain.
#[derive(Debug, Clone, PartialEq)]
pub enum Handler {
    Named(HandlerDescriptor),
    Subroute(Vec<Route>),
}

impl Handler {
    pub fn discriminator(&self) -> &str {
        match self {
            Handler::Named(descriptor) => &descriptor.handler,
            Handler::Subroute(_) => SUBROUTE_HANDLER,
        }
    }
}

impl Serialize for Handler {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Handler::Named(descriptor) => descriptor.serialize(serializer),
            Handler::Subroute(routes) => {
                let mut map = serializer.serialize_map(Some(2))?;
                map.serialize_entry(DISCRIMINATOR, SUBROUTE_HANDLER)?;
                map.serialize_entry("routes", routes)?;
                map.end()
            }
        }
    }
}

impl<'de> Deserialize<'de> for Handler {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let mut descriptor = HandlerDescriptor::deserialize(deserializer)?;
        if descriptor.handler != SUBROUTE_HANDLER {
            return Ok(Handler::Named(descriptor));
        }
        let routes = descriptor
            .params
            .remove("routes")
            .unwrap_or(Value::Array(Vec::new()));
        Vec::<Route>::deserialize(routes)
            .map(Handler::Subroute)
            .map_err(D::Error::custom)
    }
}

/// Namespaced discriminator for a handler name.
pub fn handler_id(name: &str) -> String {
    format!("{}_{}_handler", HANDLER_PREFIX, name)
}

/// Build a named handler. A `handler` key in `params` cannot override the discriminator.
pub fn handler(name: &str, mut params: BTreeMap<String, Value>) -> Handler {
    params.remove(DISCRIMINATOR);
    Handler::Named(HandlerDescriptor {
        handler: handler_id(name),
        params,
    })
}
