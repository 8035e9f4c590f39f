use std::fmt::Display;

pub trait ResultExt<T, InitialError> {
    /// Map an error to a variant carrying its message
    ///
    /// Converts `Result<T, InitialError>` to `Result<T, FinalError>` where FinalError has a variant
    /// that takes a String, using the Display implementation of InitialError.
    ///
    /// # Example
    /// ```rust
    /// use nfcman_util::result_ext::ResultExt;
    ///
    /// #[derive(Debug, thiserror::Error)]
    /// enum WriteError {
    ///     #[error("io error: {0}")]
    ///     Io(String),
    /// }
    ///
    /// fn example() -> Result<Vec<u8>, WriteError> {
    ///     let bytes = std::fs::read("nonexistent.bin").map_err_str(WriteError::Io)?;
    ///     Ok(bytes)
    /// }
    /// ```
    fn map_err_str<FinalError, F>(self, f: F) -> Result<T, FinalError>
    where
        InitialError: Display,
        F: FnOnce(String) -> FinalError;
}

impl<Type, InitialError> ResultExt<Type, InitialError> for Result<Type, InitialError> {
    fn map_err_str<FinalError, F>(self, f: F) -> Result<Type, FinalError>
    where
        InitialError: Display,
        F: FnOnce(String) -> FinalError,
    {
        self.map_err(|e| f(e.to_string()))
    }
}
