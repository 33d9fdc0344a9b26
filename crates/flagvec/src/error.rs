use thiserror::Error;

/// Problems with the generator's configuration. Nothing is generated when one is reported.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("{var}={value:?} is not a valid {expected}")]
    InvalidEnv {
        var: &'static str,
        value: String,
        expected: &'static str,
    },

    #[error("slot count for u{bits} tables must be at least 1")]
    ZeroSlots { bits: u32 },

    #[error("retry ceiling must be at least 1")]
    ZeroRetryCeiling,

    #[error("unknown instruction {name:?} in filter (known: {known})")]
    UnknownInstruction { name: String, known: String },

    #[error("unknown output format {0:?} (expected \"c\" or \"json\")")]
    UnknownFormat(String),
}
