//! Typed identifiers.
//!
//! Several opaque string ids flow through a single protocol operation
//! (space, client, client group, message). Each gets its own newtype so
//! they cannot be transposed at a call site.

use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! string_id {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(String);

        impl $name {
            /// Creates an id from any string-like value.
            pub fn new(id: impl Into<String>) -> Self {
                Self(id.into())
            }

            /// Returns the id as a string slice.
            #[must_use]
            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl fmt::Debug for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!(stringify!($name), "({})"), self.0)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }

        impl From<String> for $name {
            fn from(id: String) -> Self {
                Self(id)
            }
        }

        impl From<&str> for $name {
            fn from(id: &str) -> Self {
                Self(id.to_string())
            }
        }
    };
}

string_id! {
    /// Identifier of a space: an isolated, independently versioned
    /// dataset partition.
    SpaceId
}

string_id! {
    /// Identifier of a single client (one device-local mutation queue).
    ClientId
}

string_id! {
    /// Identifier of a client group: the set of clients belonging to one
    /// user session across devices.
    ClientGroupId
}

string_id! {
    /// Identifier of a message record within a space.
    MessageId
}
