use std::fmt;

use crate::scene::NodeId;

pub type Result<T> = std::result::Result<T, Error>;

/// Invariant violations and malformed input. Expected-empty outcomes (a hit
/// test that finds nothing, an unset style field) are `Option`s or empty
/// collections, never errors.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Error {
    ChildNotFound(NodeId),
    RootAsChild(NodeId),
    UnknownTag(String),
    UnknownOption { tag: String, key: String },
    InvalidOption { tag: String, message: String },
    UnknownOffsetMode(String),
    UnserializableStyle(&'static str),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ChildNotFound(id) => write!(f, "child not found: {id}"),
            Self::RootAsChild(id) => {
                write!(f, "node {id} is a stage root and cannot be attached as a child")
            }
            Self::UnknownTag(tag) => write!(f, "unknown node tag `{tag}`"),
            Self::UnknownOption { tag, key } => {
                write!(f, "unknown option `{key}` on <{tag}>")
            }
            Self::InvalidOption { tag, message } => {
                write!(f, "invalid option on <{tag}>: {message}")
            }
            Self::UnknownOffsetMode(mode) => write!(f, "unknown offset mode `{mode}`"),
            Self::UnserializableStyle(field) => {
                write!(f, "style field `{field}` holds a value that cannot be serialized")
            }
        }
    }
}

impl std::error::Error for Error {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_names_the_offending_input() {
        let err = Error::UnknownOption {
            tag: "rect".into(),
            key: "radius".into(),
        };
        assert_eq!(err.to_string(), "unknown option `radius` on <rect>");

        let err = Error::UnknownTag("blob".into());
        assert_eq!(err.to_string(), "unknown node tag `blob`");
    }
}
