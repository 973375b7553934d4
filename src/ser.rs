//! Serde conversions for response values, input values, and errors

use std::fmt;

use serde::{
    de,
    ser::{self, SerializeMap, SerializeSeq},
    Deserialize, Serialize,
};

use crate::{
    ast::InputValue,
    executor::{ExecutionError, PathSegment},
    parser::{ParseError, SourcePosition, Spanning},
    validation::RuleError,
    value::{Object, Value},
    GraphQLError,
};

#[derive(Serialize)]
struct SerializeHelper {
    message: &'static str,
}

impl ser::Serialize for Value {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: ser::Serializer,
    {
        match self {
            Self::Null => serializer.serialize_unit(),
            Self::Int(i) => serializer.serialize_i32(*i),
            Self::Float(f) => serializer.serialize_f64(*f),
            Self::String(s) => serializer.serialize_str(s),
            Self::Boolean(b) => serializer.serialize_bool(*b),
            Self::List(l) => l.serialize(serializer),
            Self::Object(o) => o.serialize(serializer),
        }
    }
}

impl ser::Serialize for Object {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: ser::Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.field_count()))?;
        for (key, value) in self.iter() {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

impl ser::Serialize for SourcePosition {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: ser::Serializer,
    {
        let mut map = serializer.serialize_map(Some(2))?;

        // Positions are zero-based internally, but the response format is
        // one-based.
        map.serialize_entry("line", &(self.line() + 1))?;
        map.serialize_entry("column", &(self.column() + 1))?;

        map.end()
    }
}

impl ser::Serialize for PathSegment {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: ser::Serializer,
    {
        match self {
            Self::Field(name) => serializer.serialize_str(name),
            Self::Index(idx) => serializer.serialize_u64(*idx as u64),
        }
    }
}

impl ser::Serialize for ExecutionError {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: ser::Serializer,
    {
        let mut map = serializer.serialize_map(Some(3))?;

        map.serialize_entry("message", self.message())?;
        map.serialize_entry("locations", &[*self.location()])?;
        map.serialize_entry("path", self.path())?;

        map.end()
    }
}

impl ser::Serialize for RuleError {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: ser::Serializer,
    {
        let mut map = serializer.serialize_map(Some(2))?;

        map.serialize_entry("message", self.message())?;
        map.serialize_entry("locations", self.locations())?;

        map.end()
    }
}

impl ser::Serialize for Spanning<ParseError> {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: ser::Serializer,
    {
        let mut map = serializer.serialize_map(Some(2))?;

        let message = self.item.to_string();
        map.serialize_entry("message", &message)?;
        map.serialize_entry("locations", &[self.span.start])?;

        map.end()
    }
}

impl ser::Serialize for GraphQLError {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: ser::Serializer,
    {
        match self {
            Self::ParseError(err) => [err].serialize(serializer),
            Self::ValidationError(errs) => errs.serialize(serializer),
            Self::NoOperationProvided => [SerializeHelper {
                message: "Must provide an operation",
            }]
            .serialize(serializer),
            Self::MultipleOperationsProvided => [SerializeHelper {
                message: "Must provide operation name \
                          if query contains multiple operations",
            }]
            .serialize(serializer),
            Self::UnknownOperationName => [SerializeHelper {
                message: "Unknown operation",
            }]
            .serialize(serializer),
            Self::MutationNotConfigured => [SerializeHelper {
                message: "Schema is not configured for mutations",
            }]
            .serialize(serializer),
            Self::SubscriptionNotConfigured => [SerializeHelper {
                message: "Schema is not configured for subscriptions",
            }]
            .serialize(serializer),
        }
    }
}

impl ser::Serialize for InputValue {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: ser::Serializer,
    {
        match self {
            Self::Null => serializer.serialize_unit(),
            Self::Int(i) => serializer.serialize_i32(*i),
            Self::Float(f) => serializer.serialize_f64(*f),
            Self::String(s) | Self::Enum(s) | Self::Variable(s) => serializer.serialize_str(s),
            Self::Boolean(b) => serializer.serialize_bool(*b),
            Self::List(l) => {
                let mut seq = serializer.serialize_seq(Some(l.len()))?;
                for element in l {
                    seq.serialize_element(&element.item)?;
                }
                seq.end()
            }
            Self::Object(o) => {
                let mut map = serializer.serialize_map(Some(o.len()))?;
                for (key, value) in o {
                    map.serialize_entry(&key.item, &value.item)?;
                }
                map.end()
            }
        }
    }
}

impl<'de> Deserialize<'de> for InputValue {
    fn deserialize<D>(deserializer: D) -> Result<InputValue, D::Error>
    where
        D: de::Deserializer<'de>,
    {
        struct InputValueVisitor;

        impl<'de> de::Visitor<'de> for InputValueVisitor {
            type Value = InputValue;

            fn expecting(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
                formatter.write_str("a valid input value")
            }

            fn visit_bool<E>(self, value: bool) -> Result<InputValue, E> {
                Ok(InputValue::Boolean(value))
            }

            fn visit_i64<E>(self, value: i64) -> Result<InputValue, E>
            where
                E: de::Error,
            {
                if let Ok(i) = i32::try_from(value) {
                    Ok(InputValue::Int(i))
                } else {
                    // Out-of-range integers degrade to floats, as JSON makes
                    // no distinction anyway.
                    Ok(InputValue::Float(value as f64))
                }
            }

            fn visit_u64<E>(self, value: u64) -> Result<InputValue, E>
            where
                E: de::Error,
            {
                if let Ok(i) = i32::try_from(value) {
                    Ok(InputValue::Int(i))
                } else {
                    Ok(InputValue::Float(value as f64))
                }
            }

            fn visit_f64<E>(self, value: f64) -> Result<InputValue, E> {
                Ok(InputValue::Float(value))
            }

            fn visit_str<E>(self, value: &str) -> Result<InputValue, E>
            where
                E: de::Error,
            {
                self.visit_string(value.into())
            }

            fn visit_string<E>(self, value: String) -> Result<InputValue, E> {
                Ok(InputValue::String(value))
            }

            fn visit_none<E>(self) -> Result<InputValue, E> {
                Ok(InputValue::Null)
            }

            fn visit_unit<E>(self) -> Result<InputValue, E> {
                Ok(InputValue::Null)
            }

            fn visit_seq<V>(self, mut visitor: V) -> Result<InputValue, V::Error>
            where
                V: de::SeqAccess<'de>,
            {
                let mut values = Vec::new();
                while let Some(el) = visitor.next_element()? {
                    values.push(el);
                }
                Ok(InputValue::list(values))
            }

            fn visit_map<V>(self, mut visitor: V) -> Result<InputValue, V::Error>
            where
                V: de::MapAccess<'de>,
            {
                let mut object = indexmap::IndexMap::<String, InputValue>::new();
                while let Some((key, value)) = visitor.next_entry()? {
                    object.insert(key, value);
                }
                Ok(InputValue::object(object))
            }
        }

        deserializer.deserialize_any(InputValueVisitor)
    }
}
