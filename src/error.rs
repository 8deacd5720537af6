/// Exit code for unusable input: bad CLI/config values, unreadable or malformed CSV.
pub const EXIT_INPUT: u8 = 2;
/// Exit code for model bundle failures (missing file, bad JSON, shape mismatch).
pub const EXIT_MODEL: u8 = 3;
/// Exit code for failures writing the scored output.
pub const EXIT_OUTPUT: u8 = 4;
/// Exit code for evaluation failures (empty data, missing label).
pub const EXIT_EVALUATION: u8 = 5;

#[derive(Clone)]
pub struct AppError {
    exit_code: u8,
    message: String,
}

impl AppError {
    pub fn new(exit_code: u8, message: impl Into<String>) -> Self {
        Self {
            exit_code,
            message: message.into(),
        }
    }

    /// Row-level schema violation found while reading input.
    pub fn schema_mismatch(line: usize, message: impl std::fmt::Display) -> Self {
        Self::new(EXIT_INPUT, format!("Schema mismatch at line {line}: {message}"))
    }

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl std::fmt::Display for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

impl std::fmt::Debug for AppError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppError")
            .field("exit_code", &self.exit_code)
            .field("message", &self.message)
            .finish()
    }
}

impl std::error::Error for AppError {}
