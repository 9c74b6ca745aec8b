use std::fmt;

#[derive(Debug)]
pub enum ReconError {
    /// TOML parse / deserialization error.
    ConfigParse(String),
    /// Lookup table validation error (duplicate category, unknown code, etc.).
    ConfigValidation(String),
    /// The driver table has no usable policy-number column, so no keys can be built.
    MissingDriverKey { source: String, column: String },
    /// A preparation stage cannot run without this column.
    MissingColumn { source: String, column: String },
    /// IO error (file read, etc.).
    Io(String),
}

impl fmt::Display for ReconError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ConfigParse(msg) => write!(f, "lookup config parse error: {msg}"),
            Self::ConfigValidation(msg) => write!(f, "lookup config validation error: {msg}"),
            Self::MissingDriverKey { source, column } => {
                write!(f, "{source}: missing key column '{column}', cannot build policy keys")
            }
            Self::MissingColumn { source, column } => {
                write!(f, "{source}: missing column '{column}'")
            }
            Self::Io(msg) => write!(f, "IO error: {msg}"),
        }
    }
}

impl std::error::Error for ReconError {}
