//! Error types.
//!
//! - `FitError` is returned by every library operation (tree construction,
//!   matrix inversion, least-squares fits, snapshot I/O).
//! - `AppError` is the binary's error: a message plus the process exit code.

/// Errors produced while building trees, evaluating matrices or fitting parameters.
#[derive(Debug, thiserror::Error)]
pub enum FitError {
    #[error("tree has no nodes")]
    EmptyTree,

    #[error("tree already has a root")]
    DuplicateRoot,

    #[error("tree has no root; add the root before any child")]
    MissingRoot,

    #[error("parent index {parent} does not exist in a tree of {len} nodes")]
    InvalidParent { parent: usize, len: usize },

    #[error("{what}: expected {expected}, got {actual}")]
    DimensionMismatch {
        what: &'static str,
        expected: String,
        actual: String,
    },

    #[error("{what} contains a non-finite entry{}", at_frequency(.freq_index))]
    NonFiniteInput {
        what: &'static str,
        freq_index: Option<usize>,
    },

    #[error("no zero frequency (|f| < {tol:e}) in frequency array and no steady-state impedance given")]
    MissingZeroFrequency { tol: f64 },

    #[error("{matrix} is singular{}", at_frequency(.freq_index))]
    SingularMatrix {
        matrix: &'static str,
        freq_index: Option<usize>,
    },

    #[error("least-squares solve failed during {stage}: {reason}")]
    LeastSquares { stage: &'static str, reason: String },

    #[error("snapshot I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid snapshot JSON: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, FitError>;

fn at_frequency(freq_index: &Option<usize>) -> String {
    match freq_index {
        Some(k) => format!(" at frequency index {k}"),
        None => String::new(),
    }
}

impl FitError {
    pub(crate) fn dims(what: &'static str, expected: impl ToString, actual: impl ToString) -> Self {
        Self::DimensionMismatch {
            what,
            expected: expected.to_string(),
            actual: actual.to_string(),
        }
    }
}

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

    pub fn exit_code(&self) -> u8 {
        self.exit_code
    }
}

impl From<FitError> for AppError {
    fn from(err: FitError) -> Self {
        let exit_code = match &err {
            FitError::Io(_) | FitError::Json(_) => 2,
            FitError::EmptyTree
            | FitError::DuplicateRoot
            | FitError::MissingRoot
            | FitError::InvalidParent { .. }
            | FitError::DimensionMismatch { .. }
            | FitError::NonFiniteInput { .. }
            | FitError::MissingZeroFrequency { .. } => 3,
            FitError::SingularMatrix { .. } | FitError::LeastSquares { .. } => 4,
        };
        Self::new(exit_code, err.to_string())
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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn singular_message_names_frequency_index() {
        let err = FitError::SingularMatrix {
            matrix: "system matrix",
            freq_index: Some(3),
        };
        assert_eq!(err.to_string(), "system matrix is singular at frequency index 3");

        let err = FitError::SingularMatrix {
            matrix: "conductance matrix",
            freq_index: None,
        };
        assert_eq!(err.to_string(), "conductance matrix is singular");
    }

    #[test]
    fn fit_errors_map_to_exit_codes() {
        let app: AppError = FitError::MissingZeroFrequency { tol: 1e-12 }.into();
        assert_eq!(app.exit_code(), 3);
        let app: AppError = FitError::LeastSquares {
            stage: "conductance fit",
            reason: "non-finite".into(),
        }
        .into();
        assert_eq!(app.exit_code(), 4);

        let err = FitError::NonFiniteInput {
            what: "frequency impedance",
            freq_index: Some(2),
        };
        assert_eq!(err.to_string(), "frequency impedance contains a non-finite entry at frequency index 2");
        assert_eq!(AppError::from(err).exit_code(), 3);
    }
}
