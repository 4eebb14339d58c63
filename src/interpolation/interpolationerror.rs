use std::fmt::Display;

use serde::Serialize;
use thiserror::Error;

// ─────────────────────────────────────────────────────────────────────────────
// Operation：受能力旗標控管的操作
// ─────────────────────────────────────────────────────────────────────────────

#[derive(Debug, PartialEq, Eq, Clone, Copy, Hash, Serialize)]
pub enum Operation {
    Differentiate,
    DifferentiateWithValue,
    Integrate,
}

impl Display for Operation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Operation::Differentiate => write!(f, "differentiate"),
            Operation::DifferentiateWithValue => write!(f, "differentiate_with_value"),
            Operation::Integrate => write!(f, "integrate"),
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// InterpolationError
// ─────────────────────────────────────────────────────────────────────────────

/// 候選實作（candidate）回報的錯誤。
///
/// `Unsupported` 是能力旗標為 false 時，受控操作唯一合法的失敗方式；
/// 其餘變體皆屬於建構或計算上的錯誤。
#[derive(Debug, Error, PartialEq, Clone)]
pub enum InterpolationError {
    #[error("operation '{operation}' is not supported by this interpolation")]
    Unsupported { operation: Operation },

    #[error("at least {required} sample points required, {given} given")]
    InsufficientPoints { required: usize, given: usize },

    #[error("{points} points but {values} values given")]
    LengthMismatch { points: usize, values: usize },

    #[error("non-finite sample or argument: {0}")]
    NonFinite(f64),

    #[error("duplicate node at x = {0}")]
    DuplicateNode(f64),

    #[error("singular linear system while building {0}")]
    SingularSystem(&'static str),
}

impl InterpolationError {
    pub fn unsupported(operation: Operation) -> InterpolationError {
        InterpolationError::Unsupported { operation }
    }

    pub fn is_unsupported(&self) -> bool {
        matches!(self, InterpolationError::Unsupported { .. })
    }
}
