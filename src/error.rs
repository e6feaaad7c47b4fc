use std::{error, fmt, io};

use clap::parser::MatchesError;

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug)]
pub enum Error {
    /// An argument declared under an empty name.
    EmptyName,
    /// A flag string that is neither `--long` nor `-c`, or an extra name on a positional.
    InvalidFlag { argument: String, flag: String },
    /// Two arguments (or an argument and the built-in help/version) claim the same flag.
    DuplicateFlag { flag: String, first: String, second: String },
    /// An argument named like an engine-owned argument that is enabled.
    ReservedName { argument: String },
    /// The flags resolve to a destination other than the declared name.
    DestMismatch { argument: String, dest: String },
    RequiredPositional { argument: String },
    RequiredWithDefault { argument: String },
    InvalidOption { argument: String, reason: String },
    PositionalOrder { argument: String, reason: String },
    UnknownConfig { key: String },
    InvalidConfig { key: String, expected: &'static str },
    Parse(clap::Error),
    /// A value given for a name the schema does not declare.
    UnknownArgument { argument: String },
    /// A positional or required argument left without a value.
    MissingValue { argument: String },
    Extract { argument: String, source: MatchesError },
    Json(serde_json::Error),
    Io(io::Error),
}

impl Error {
    pub(crate) fn invalid_option(argument: &str, reason: impl Into<String>) -> Error {
        Error::InvalidOption { argument: argument.to_owned(), reason: reason.into() }
    }

    /// Whether this error comes from the schema itself rather than from the parsed tokens.
    pub fn is_schema_error(&self) -> bool {
        !matches!(
            self,
            Error::Parse(_)
                | Error::UnknownArgument { .. }
                | Error::MissingValue { .. }
                | Error::Extract { .. }
                | Error::Json(_)
                | Error::Io(_)
        )
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::EmptyName => f.write_str("argument names cannot be empty"),
            Error::InvalidFlag { argument, flag } => {
                write!(f, "invalid flag `{}` for argument `{}`", flag, argument)
            }
            Error::DuplicateFlag { flag, first, second } => write!(
                f,
                "flag `{}` of argument `{}` conflicts with argument `{}`",
                flag, second, first
            ),
            Error::ReservedName { argument } => {
                write!(f, "argument name `{}` is reserved by the parser", argument)
            }
            Error::DestMismatch { argument, dest } => write!(
                f,
                "argument `{}` would be stored as `{}`; declare it as `{}` or set `dest`",
                argument, dest, dest
            ),
            Error::RequiredPositional { argument } => {
                write!(f, "`required` is invalid for positional argument `{}`", argument)
            }
            Error::RequiredWithDefault { argument } => {
                write!(f, "argument `{}` is required and cannot have a default", argument)
            }
            Error::InvalidOption { argument, reason } => {
                write!(f, "argument `{}`: {}", argument, reason)
            }
            Error::PositionalOrder { argument, reason } => {
                write!(f, "positional argument `{}`: {}", argument, reason)
            }
            Error::UnknownConfig { key } => write!(f, "unknown parser option `{}`", key),
            Error::InvalidConfig { key, expected } => {
                write!(f, "parser option `{}` expects {}", key, expected)
            }
            Error::Parse(err) => write!(f, "{}", err),
            Error::UnknownArgument { argument } => write!(f, "no argument named `{}`", argument),
            Error::MissingValue { argument } => {
                write!(f, "argument `{}` needs a value", argument)
            }
            Error::Extract { argument, source } => {
                write!(f, "failed to read argument `{}`: {}", argument, source)
            }
            Error::Json(err) => write!(f, "{}", err),
            Error::Io(err) => write!(f, "{}", err),
        }
    }
}

impl error::Error for Error {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        match self {
            Error::Parse(err) => Some(err),
            Error::Extract { source, .. } => Some(source),
            Error::Json(err) => Some(err),
            Error::Io(err) => Some(err),
            _ => None,
        }
    }
}

impl From<clap::Error> for Error {
    fn from(err: clap::Error) -> Self {
        Error::Parse(err)
    }
}

impl From<serde_json::Error> for Error {
    fn from(err: serde_json::Error) -> Self {
        Error::Json(err)
    }
}

impl From<io::Error> for Error {
    fn from(err: io::Error) -> Self {
        Error::Io(err)
    }
}
