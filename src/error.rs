use std::{
    error::Error,
    fmt::{self, Display},
    io,
    path::PathBuf,
};

/// The result type used in the entire crate.
pub type Result<T> = std::result::Result<T, LrErr>;

/// The crate's error type.
#[derive(Debug)]
pub enum LrErr {
    /// A decay or optimizer configuration with values out of range.
    InvalidConfig(String),
    SizeMismatch {
        what: &'static str,
        got: usize,
        expected: usize,
    },
    /// A parameter name was registered twice in the same store.
    DuplicateParameter(String),
    /// The generator ran out of values before filling a parameter.
    ParamGenExhausted {
        name: String,
        got: usize,
        expected: usize,
    },
    /// The product of a parameter's dimensions doesn't fit in a `usize`.
    ShapeOverflow {
        name: String,
        shape: Vec<usize>,
    },
    Io {
        path: PathBuf,
        source: io::Error,
    },
    Json(serde_json::Error),
    /// Invalid distribution parameters for a random generator.
    Rand(String),
}

impl Display for LrErr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidConfig(msg) => write!(f, "invalid config: {msg}"),
            Self::SizeMismatch {
                what,
                got,
                expected,
            } => write!(f, "size mismatch in {what}, got {got} and expected {expected}"),
            Self::DuplicateParameter(name) => {
                write!(f, "the parameter {name} was already registered")
            }
            Self::ParamGenExhausted {
                name,
                got,
                expected,
            } => write!(
                f,
                "the generator was exhausted while filling {name}, got {got} of {expected} values"
            ),
            Self::ShapeOverflow { name, shape } => {
                write!(f, "the shape {shape:?} of {name} overflows")
            }
            Self::Io { path, source } => write!(f, "cannot read '{}': {source}", path.display()),
            Self::Json(e) => write!(f, "invalid JSON: {e}"),
            Self::Rand(msg) => write!(f, "invalid distribution: {msg}"),
        }
    }
}

impl Error for LrErr {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Json(e) => Some(e),
            _ => None,
        }
    }
}

impl From<serde_json::Error> for LrErr {
    fn from(e: serde_json::Error) -> Self {
        Self::Json(e)
    }
}

impl From<rand_distr::NormalError> for LrErr {
    fn from(e: rand_distr::NormalError) -> Self {
        Self::Rand(e.to_string())
    }
}

impl From<rand_distr::uniform::Error> for LrErr {
    fn from(e: rand_distr::uniform::Error) -> Self {
        Self::Rand(e.to_string())
    }
}
