//! Depth-bounded JSON parsing.
//!
//! `serde_json` refuses input nested deeper than 128 levels, which would
//! turn an overly deep UI tree into a hard parse error. [`parse_bounded`]
//! accepts any nesting instead: containers past [`MAX_JSON_NESTING`] are
//! skipped without recursion and replaced by `null`. The UI interpreter
//! truncates long before that level, so a deep tree still renders with a
//! truncation marker.

use serde::de::{self, DeserializeSeed, IgnoredAny, MapAccess, SeqAccess, Visitor};
use serde_json::{Map, Number, Value};
use std::fmt;

/// Deepest array/object level kept by [`parse_bounded`].
pub const MAX_JSON_NESTING: usize = 100;

/// Parse JSON text, replacing containers nested deeper than
/// [`MAX_JSON_NESTING`] with `null`.
pub fn parse_bounded(json: &str) -> Result<Value, serde_json::Error> {
    let mut de = serde_json::Deserializer::from_str(json);
    let value = Bounded {
        remaining: MAX_JSON_NESTING,
    }
    .deserialize(&mut de)?;
    de.end()?;
    Ok(value)
}

#[derive(Clone, Copy)]
struct Bounded {
    remaining: usize,
}

impl Bounded {
    fn nested(self) -> Self {
        Self {
            remaining: self.remaining - 1,
        }
    }
}

impl<'de> DeserializeSeed<'de> for Bounded {
    type Value = Value;

    fn deserialize<D>(self, deserializer: D) -> Result<Value, D::Error>
    where
        D: de::Deserializer<'de>,
    {
        deserializer.deserialize_any(self)
    }
}

impl<'de> Visitor<'de> for Bounded {
    type Value = Value;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("any JSON value")
    }

    fn visit_bool<E>(self, v: bool) -> Result<Value, E> {
        Ok(Value::Bool(v))
    }

    fn visit_i64<E>(self, v: i64) -> Result<Value, E> {
        Ok(Value::Number(v.into()))
    }

    fn visit_u64<E>(self, v: u64) -> Result<Value, E> {
        Ok(Value::Number(v.into()))
    }

    fn visit_f64<E>(self, v: f64) -> Result<Value, E> {
        Ok(Number::from_f64(v).map_or(Value::Null, Value::Number))
    }

    fn visit_str<E>(self, v: &str) -> Result<Value, E> {
        Ok(Value::String(v.to_string()))
    }

    fn visit_string<E>(self, v: String) -> Result<Value, E> {
        Ok(Value::String(v))
    }

    fn visit_unit<E>(self) -> Result<Value, E> {
        Ok(Value::Null)
    }

    fn visit_none<E>(self) -> Result<Value, E> {
        Ok(Value::Null)
    }

    fn visit_seq<A>(self, mut seq: A) -> Result<Value, A::Error>
    where
        A: SeqAccess<'de>,
    {
        if self.remaining == 0 {
            while seq.next_element::<IgnoredAny>()?.is_some() {}
            tracing::debug!(max = MAX_JSON_NESTING, "Dropping over-nested JSON array");
            return Ok(Value::Null);
        }

        let mut items = Vec::new();
        while let Some(item) = seq.next_element_seed(self.nested())? {
            items.push(item);
        }
        Ok(Value::Array(items))
    }

    fn visit_map<A>(self, mut map: A) -> Result<Value, A::Error>
    where
        A: MapAccess<'de>,
    {
        if self.remaining == 0 {
            while map.next_entry::<IgnoredAny, IgnoredAny>()?.is_some() {}
            tracing::debug!(max = MAX_JSON_NESTING, "Dropping over-nested JSON object");
            return Ok(Value::Null);
        }

        let mut out = Map::new();
        while let Some(key) = map.next_key::<String>()? {
            let value = map.next_value_seed(self.nested())?;
            out.insert(key, value);
        }
        Ok(Value::Object(out))
    }
}
