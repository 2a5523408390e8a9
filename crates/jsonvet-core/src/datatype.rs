//! # Datatype Bitmasks
//!
//! Runtime datatypes of decoded JSON values as an additive flag set. A
//! document position has exactly one primitive bit; schema expectations are
//! arbitrary unions of bits, so "matches the expected type" is a bitwise
//! intersection test.
//!
//! The composite masks mirror how schema authors think about values:
//! `NUMBER` is integer-or-double, `SCALAR` is anything that renders as a
//! single token, `ANY` accepts every kind.

use bitflags::bitflags;
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

bitflags! {
    /// The runtime datatype of a decoded JSON value.
    ///
    /// Flags are additive. A concrete value always carries exactly one
    /// primitive bit; expectation masks may combine any number of them.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Datatype: u8 {
        /// A whole number (serde_json `i64`/`u64`).
        const INTEGER = 1;
        /// A floating-point number.
        const DOUBLE = 1 << 1;
        /// `true` or `false`.
        const BOOLEAN = 1 << 2;
        /// A string.
        const STRING = 1 << 3;
        /// An ordered sequence of values.
        const ARRAY = 1 << 4;
        /// A keyed mapping of values.
        const OBJECT = 1 << 5;
        /// The explicit `null` value.
        const NULL = 1 << 6;

        /// Integer or double.
        const NUMBER = Self::INTEGER.bits() | Self::DOUBLE.bits();
        /// Number, boolean, or string.
        const SCALAR = Self::NUMBER.bits() | Self::BOOLEAN.bits() | Self::STRING.bits();
        /// Every datatype.
        const ANY = Self::SCALAR.bits() | Self::ARRAY.bits() | Self::OBJECT.bits() | Self::NULL.bits();
    }
}

/// Fixed rendering order for datatype names.
const NAME_ORDER: [(Datatype, &str); 7] = [
    (Datatype::INTEGER, "integer"),
    (Datatype::DOUBLE, "double"),
    (Datatype::STRING, "string"),
    (Datatype::BOOLEAN, "boolean"),
    (Datatype::ARRAY, "array"),
    (Datatype::OBJECT, "object"),
    (Datatype::NULL, "null"),
];

impl Datatype {
    /// Derive the datatype of a decoded value.
    ///
    /// Returns exactly one primitive bit. Numbers representable as
    /// `i64`/`u64` are `INTEGER`; everything else numeric is `DOUBLE`.
    pub fn of(value: &Value) -> Self {
        match value {
            Value::Null => Self::NULL,
            Value::Bool(_) => Self::BOOLEAN,
            Value::Number(n) => {
                if n.is_i64() || n.is_u64() {
                    Self::INTEGER
                } else {
                    Self::DOUBLE
                }
            }
            Value::String(_) => Self::STRING,
            Value::Array(_) => Self::ARRAY,
            Value::Object(_) => Self::OBJECT,
        }
    }

    /// The names of every primitive bit set in this mask, in fixed order.
    pub fn names(self) -> Vec<&'static str> {
        NAME_ORDER
            .iter()
            .filter(|(bit, _)| self.intersects(*bit))
            .map(|(_, name)| *name)
            .collect()
    }

    /// Slash-joined name form used as a statistics key, e.g. `integer/double`.
    pub fn stat_name(self) -> String {
        self.names().join("/")
    }
}

impl std::fmt::Display for Datatype {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.names().join(", "))
    }
}

impl Serialize for Datatype {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(self.bits())
    }
}

impl<'de> Deserialize<'de> for Datatype {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let bits = u8::deserialize(deserializer)?;
        Self::from_bits(bits).ok_or_else(|| D::Error::custom("invalid datatype bitmask"))
    }
}


#[cfg(test)]
mod proptests {
    use super::*;
    use proptest::prelude::*;

    /// Strategy producing arbitrary JSON leaf values.
    fn leaf_value() -> impl Strategy<Value = Value> {
        prop_oneof![
            Just(Value::Null),
            any::<bool>().prop_map(Value::Bool),
            any::<i64>().prop_map(|n| serde_json::json!(n)),
            any::<f64>()
                .prop_filter("finite", |f| f.is_finite())
                .prop_map(|f| serde_json::json!(f)),
            "[a-zA-Z0-9]{0,16}".prop_map(Value::String),
        ]
    }

    proptest! {
        /// Deriving a datatype always yields exactly one primitive bit.
        #[test]
        fn of_is_single_primitive(value in leaf_value()) {
            let datatype = Datatype::of(&value);
            prop_assert_eq!(datatype.bits().count_ones(), 1);
            prop_assert!(Datatype::ANY.intersects(datatype));
        }

        /// Deriving twice from the same value is stable.
        #[test]
        fn of_is_deterministic(value in leaf_value()) {
            prop_assert_eq!(Datatype::of(&value), Datatype::of(&value));
        }
    }
}
