//! Exporting resolved values through `serde`.
//!
//! Only serialization is provided: values are produced by attribute
//! getters, not parsed back into instances. Object reference handles have
//! no stable external form and serialize as null.

use serde_core::ser::{Serialize, SerializeMap, SerializeSeq, Serializer};

use crate::value::{Composite, ScalarValue, ValueBox};

impl Serialize for ScalarValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Bool(v) => serializer.serialize_bool(*v),
            Self::Int(v) => serializer.serialize_i64(*v),
            Self::Float(v) => serializer.serialize_f64(*v),
            Self::Str(v) => serializer.serialize_str(v),
        }
    }
}

impl Serialize for Composite {
    /// Serializes as a map, preserving field declaration order.
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.len()))?;
        for (name, value) in self.fields() {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

impl Serialize for ValueBox {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Null | Self::ObjectRef(_) => serializer.serialize_unit(),
            Self::Scalar(scalar) => scalar.serialize(serializer),
            Self::Composite(composite) => composite.serialize(serializer),
            Self::Sequence(items) => serialize_items(serializer, items),
            Self::MutableSequence(items) => serialize_items(serializer, items),
        }
    }
}

fn serialize_items<S: Serializer>(serializer: S, items: &[ValueBox]) -> Result<S::Ok, S::Error> {
    let mut seq = serializer.serialize_seq(Some(items.len()))?;
    for item in items {
        seq.serialize_element(item)?;
    }
    seq.end()
}
