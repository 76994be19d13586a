use std::fmt::Display;

pub trait ResultExt<T, InitialError> {
    /// Map an error into a variant that carries the error's `Display` text
    ///
    /// # Example
    /// ```rust
    /// use tagbridge_util::ResultExt as _;
    ///
    /// #[derive(Debug, thiserror::Error)]
    /// enum ParseError {
    ///     #[error("invalid number: {0}")]
    ///     InvalidNumber(String),
    /// }
    ///
    /// fn parse(input: &str) -> Result<u32, ParseError> {
    ///     input.parse::<u32>().map_err_str(ParseError::InvalidNumber)
    /// }
    ///
    /// assert!(parse("12").is_ok());
    /// assert!(parse("twelve").is_err());
    /// ```
    fn map_err_str<FinalError, F>(self, f: F) -> Result<T, FinalError>
    where
        InitialError: Display,
        F: FnOnce(String) -> FinalError;

    /// Emit a `warn!` with `context` when the result is an error, then hand it back unchanged
    fn warn_err(self, context: &str) -> Self
    where
        InitialError: Display;
}

impl<Type, InitialError> ResultExt<Type, InitialError> for Result<Type, InitialError> {
    fn map_err_str<FinalError, F>(self, f: F) -> Result<Type, FinalError>
    where
        InitialError: Display,
        F: FnOnce(String) -> FinalError,
    {
        self.map_err(|e| f(e.to_string()))
    }

    fn warn_err(self, context: &str) -> Self
    where
        InitialError: Display,
    {
        if let Err(error) = &self {
            tracing::warn!("{context}: {error}");
        }

        self
    }
}
