#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("mp_maxrounds is missing")]
    MissingMaxRounds,

    #[error("mp_maxrounds is not a number: {value:?}")]
    InvalidMaxRounds {
        value: String,
        #[source]
        source: std::num::ParseIntError,
    },

    #[error("Decoding demo: {0}")]
    Decoder(String),
}

impl Error {
    /// Errors that abort the current match.
    pub fn is_configuration(&self) -> bool {
        matches!(self, Self::MissingMaxRounds | Self::InvalidMaxRounds { .. })
    }
}
