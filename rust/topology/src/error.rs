// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for topology construction and decoding.

/// Result type alias for topology operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while building, decoding or filtering a topology.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A decoded topology or geometry has a malformed field.
    #[error("invalid `{field}`: {message}")]
    Decode { field: String, message: String },

    /// A geometry carries a `type` tag that is not one of the supported kinds.
    #[error("unsupported geometry type: {0}")]
    UnsupportedGeometry(String),

    /// An arc descriptor has no entry in the unique arc index.
    #[error("arc descriptor [{start}, {end}] does not reference a unique arc")]
    InvalidArcReference { start: usize, end: usize },

    /// A signed arc index points past the end of the arc array.
    #[error("arc index {0} is out of range")]
    ArcOutOfRange(i64),

    /// Serialization/deserialization error.
    #[error("serialization error: {0}")]
    Serialization(String),
}

impl Error {
    pub(crate) fn decode(field: impl Into<String>, message: impl Into<String>) -> Self {
        Error::Decode {
            field: field.into(),
            message: message.into(),
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization(e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decode_error_names_field() {
        let err = Error::decode("objects.a.arcs[1]", "expected an integer arc index");
        assert_eq!(
            err.to_string(),
            "invalid `objects.a.arcs[1]`: expected an integer arc index"
        );
    }

    #[test]
    fn serde_errors_convert() {
        let err: Error = serde_json::from_str::<serde_json::Value>("{")
            .unwrap_err()
            .into();
        assert!(matches!(err, Error::Serialization(_)));
    }
}
