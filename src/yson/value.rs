//! In-memory YSON tree.

use std::collections::BTreeMap;

use serde::Serialize;

use crate::yson::YsonError;

/// Map node keyed by string.
pub type YsonMap = BTreeMap<String, Yson>;

/// A YSON value without attributes.
#[derive(Debug, Clone, PartialEq)]
pub enum Yson {
    /// `#`
    Entity,
    Bool(bool),
    Int64(i64),
    Uint64(u64),
    Double(f64),
    String(String),
    List(Vec<Yson>),
    Map(YsonMap),
}

impl Yson {
    /// An empty map node.
    pub fn map() -> Self {
        Yson::Map(YsonMap::new())
    }

    /// Convert any serde-serializable value.
    ///
    /// Goes through `serde_json::Value`, so `None` becomes an entity and
    /// integers keep their signedness.
    pub fn from_serialize<T: Serialize + ?Sized>(value: &T) -> Result<Self, YsonError> {
        Ok(Yson::from(serde_json::to_value(value)?))
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Yson::String(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Yson::Bool(b) => Some(*b),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Yson::Int64(v) => Some(*v),
            Yson::Uint64(v) => i64::try_from(*v).ok(),
            _ => None,
        }
    }

    pub fn as_list(&self) -> Option<&[Yson]> {
        match self {
            Yson::List(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_map(&self) -> Option<&YsonMap> {
        match self {
            Yson::Map(map) => Some(map),
            _ => None,
        }
    }

    /// Look up a key when this is a map node.
    pub fn get(&self, key: &str) -> Option<&Yson> {
        self.as_map().and_then(|map| map.get(key))
    }

    /// Unwrap the `{"<key>"=...}` envelope used by v4 responses.
    ///
    /// Values that are not such an envelope are returned as-is.
    pub fn into_field(self, key: &str) -> Yson {
        match self {
            Yson::Map(mut map) if map.len() == 1 && map.contains_key(key) => {
                map.remove(key).unwrap_or(Yson::Entity)
            }
            other => other,
        }
    }
}

impl From<serde_json::Value> for Yson {
    fn from(value: serde_json::Value) -> Self {
        use serde_json::Value;

        match value {
            Value::Null => Yson::Entity,
            Value::Bool(b) => Yson::Bool(b),
            Value::Number(n) => {
                if let Some(v) = n.as_i64() {
                    Yson::Int64(v)
                } else if let Some(v) = n.as_u64() {
                    Yson::Uint64(v)
                } else {
                    Yson::Double(n.as_f64().unwrap_or(f64::NAN))
                }
            }
            Value::String(s) => Yson::String(s),
            Value::Array(items) => Yson::List(items.into_iter().map(Yson::from).collect()),
            Value::Object(fields) => {
                Yson::Map(fields.into_iter().map(|(k, v)| (k, Yson::from(v))).collect())
            }
        }
    }
}

impl From<&str> for Yson {
    fn from(s: &str) -> Self {
        Yson::String(s.to_string())
    }
}

impl From<String> for Yson {
    fn from(s: String) -> Self {
        Yson::String(s)
    }
}

impl From<bool> for Yson {
    fn from(b: bool) -> Self {
        Yson::Bool(b)
    }
}

impl From<i64> for Yson {
    fn from(v: i64) -> Self {
        Yson::Int64(v)
    }
}

impl From<i32> for Yson {
    fn from(v: i32) -> Self {
        Yson::Int64(v.into())
    }
}

impl From<u64> for Yson {
    fn from(v: u64) -> Self {
        Yson::Uint64(v)
    }
}

impl From<f64> for Yson {
    fn from(v: f64) -> Self {
        Yson::Double(v)
    }
}

impl From<Vec<Yson>> for Yson {
    fn from(items: Vec<Yson>) -> Self {
        Yson::List(items)
    }
}

impl From<YsonMap> for Yson {
    fn from(map: YsonMap) -> Self {
        Yson::Map(map)
    }
}
