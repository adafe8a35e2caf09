//! Newtype IDs for type-safe entity references.
//!
//! The backend hands out numeric ids for some collections and document ids
//! (`"65f1c2a9e4b0a1b2c3d4e5f6"`) for others, so every id wraps a [`RawId`]
//! that holds either. Use the `define_id!` macro to create type-safe ID
//! wrappers that prevent accidentally mixing IDs from different entity types.

use core::fmt;
use core::str::FromStr;

use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

/// Error returned when an id string is blank.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("id must not be empty")]
pub struct EmptyIdError;

/// A backend id: an integer or an opaque string.
///
/// Strings that hold an integer are read as [`RawId::Number`], so `"7"`
/// from a form field equals `7` from a JSON body.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum RawId {
    Number(i64),
    Text(String),
}

impl fmt::Display for RawId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

impl FromStr for RawId {
    type Err = EmptyIdError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() {
            return Err(EmptyIdError);
        }
        Ok(s.parse::<i64>()
            .map_or_else(|_| Self::Text(s.to_string()), Self::Number))
    }
}

impl Serialize for RawId {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Number(n) => serializer.serialize_i64(*n),
            Self::Text(s) => serializer.serialize_str(s),
        }
    }
}

struct RawIdVisitor;

impl Visitor<'_> for RawIdVisitor {
    type Value = RawId;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("an integer or a non-empty string id")
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<RawId, E> {
        Ok(RawId::Number(v))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<RawId, E> {
        i64::try_from(v)
            .map(RawId::Number)
            .map_err(|_| E::invalid_value(de::Unexpected::Unsigned(v), &self))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<RawId, E> {
        v.parse()
            .map_err(|_| E::invalid_value(de::Unexpected::Str(v), &self))
    }
}

impl<'de> Deserialize<'de> for RawId {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(RawIdVisitor)
    }
}

/// Macro to define a type-safe ID wrapper.
///
/// Creates a newtype wrapper around [`RawId`] with:
/// - `Serialize`/`Deserialize` with `#[serde(transparent)]`
/// - `Debug`, `Clone`, `PartialEq`, `Eq`, `Hash`, `PartialOrd`, `Ord`
/// - Conversion methods: `new()`, `as_i64()`
/// - `From<i64>`, `Display` and `FromStr` implementations
///
/// # Example
///
/// ```rust
/// # use fsad_core::define_id;
/// define_id!(WidgetId);
/// define_id!(GadgetId);
///
/// let widget_id = WidgetId::new(1);
/// let gadget_id = GadgetId::new(1);
///
/// // These are different types, so this won't compile:
/// // let _: WidgetId = gadget_id;
/// ```
#[macro_export]
macro_rules! define_id {
    ($name:ident) => {
        #[derive(
            Debug,
            Clone,
            PartialEq,
            Eq,
            Hash,
            PartialOrd,
            Ord,
            ::serde::Serialize,
            ::serde::Deserialize
        )]
        #[serde(transparent)]
        pub struct $name($crate::types::RawId);

        impl $name {
            /// Create a new numeric ID.
            #[must_use]
            pub const fn new(id: i64) -> Self {
                Self($crate::types::RawId::Number(id))
            }

            /// The numeric value, if this is a numeric ID.
            #[must_use]
            pub const fn as_i64(&self) -> Option<i64> {
                match &self.0 {
                    $crate::types::RawId::Number(n) => Some(*n),
                    $crate::types::RawId::Text(_) => None,
                }
            }
        }

        impl ::core::fmt::Display for $name {
            fn fmt(&self, f: &mut ::core::fmt::Formatter<'_>) -> ::core::fmt::Result {
                ::core::fmt::Display::fmt(&self.0, f)
            }
        }

        impl ::core::str::FromStr for $name {
            type Err = $crate::types::EmptyIdError;

            fn from_str(s: &str) -> ::core::result::Result<Self, Self::Err> {
                s.parse().map(Self)
            }
        }

        impl From<i64> for $name {
            fn from(id: i64) -> Self {
                Self::new(id)
            }
        }
    };
}

define_id!(ProductId);
define_id!(OrderId);
define_id!(OrderItemId);
