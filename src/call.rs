//! A single remote invocation.

use bytes::Bytes;
use serde::Serialize;

use crate::error::{Error, Result};
use crate::guid::Guid;
use crate::verb::Verb;
use crate::yson::{self, Yson, YsonMap};

/// One logical call: verb, parameters, correlation id and optional payload.
///
/// Executors take a `Call` by value, so it is consumed exactly once.
#[derive(Debug, Clone)]
pub struct Call {
    pub verb: Verb,
    pub params: YsonMap,
    pub call_id: Guid,
    pub payload: Option<Bytes>,
}

impl Call {
    /// New call with a fresh correlation id and no parameters.
    pub fn new(verb: Verb) -> Self {
        Self {
            verb,
            params: YsonMap::new(),
            call_id: Guid::new(),
            payload: None,
        }
    }

    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<Yson>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }

    /// Merge the fields of a serializable options struct into the parameters.
    ///
    /// Fields serialized as `null` are skipped.
    pub fn with_options<T: Serialize>(mut self, options: &T) -> Result<Self> {
        match Yson::from_serialize(options)? {
            Yson::Map(fields) => {
                self.params
                    .extend(fields.into_iter().filter(|(_, value)| *value != Yson::Entity));
                Ok(self)
            }
            Yson::Entity => Ok(self),
            other => Err(Error::InvalidParams(format!(
                "options must serialize to a map, got {}",
                yson::to_string(&other)
            ))),
        }
    }

    /// Raw YSON request body.
    pub fn with_payload(mut self, payload: impl Into<Bytes>) -> Self {
        self.payload = Some(payload.into());
        self
    }

    /// Parameters as the single map carried by `X-YT-Parameters`.
    pub fn encode_params(&self) -> String {
        yson::map_to_string(&self.params)
    }
}

/// Successful unary outcome: the raw YSON payload.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CallResult {
    pub value: Bytes,
}

impl CallResult {
    /// Parse the payload. An empty payload decodes as an entity.
    pub fn decode(&self) -> Result<Yson> {
        if self.value.iter().all(u8::is_ascii_whitespace) {
            return Ok(Yson::Entity);
        }
        Ok(yson::from_slice(&self.value)?)
    }

    pub fn into_bytes(self) -> Bytes {
        self.value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Serialize)]
    struct ListOptions {
        max_size: Option<u32>,
        attributes: Vec<&'static str>,
    }

    #[test]
    fn test_fresh_correlation_ids() {
        let a = Call::new(Verb::Get);
        let b = Call::new(Verb::Get);
        assert_ne!(a.call_id, b.call_id);
    }

    #[test]
    fn test_encode_params() {
        let call = Call::new(Verb::Get)
            .with_param("path", "//tmp")
            .with_param("max_size", 10i64);
        assert_eq!(call.encode_params(), r#"{"max_size"=10;"path"="//tmp"}"#);
        assert_eq!(Call::new(Verb::Exists).encode_params(), "{}");
    }

    #[test]
    fn test_with_options_skips_nulls() {
        let call = Call::new(Verb::List)
            .with_options(&ListOptions {
                max_size: None,
                attributes: vec!["type"],
            })
            .unwrap();
        assert!(!call.params.contains_key("max_size"));
        assert_eq!(call.params["attributes"], Yson::List(vec![Yson::from("type")]));
    }

    #[test]
    fn test_with_options_rejects_scalars() {
        let err = Call::new(Verb::Get).with_options(&42).unwrap_err();
        assert!(matches!(err, Error::InvalidParams(_)));
    }

    #[test]
    fn test_decode_result() {
        let empty = CallResult::default();
        assert_eq!(empty.decode().unwrap(), Yson::Entity);

        let result = CallResult {
            value: Bytes::from_static(b"{\"value\"=%true}"),
        };
        assert_eq!(result.decode().unwrap().into_field("value"), Yson::Bool(true));
    }
}
