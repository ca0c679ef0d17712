use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum CalculationError {
    #[error("invalid input: {field} {reason}")]
    InvalidInput { field: &'static str, reason: String },

    #[error("target ratio not reached within {max_steps} search steps")]
    SearchLimitExceeded { max_steps: u64 },
}

impl CalculationError {
    pub(crate) fn invalid(field: &'static str, reason: impl Into<String>) -> Self {
        CalculationError::InvalidInput {
            field,
            reason: reason.into(),
        }
    }

    pub fn is_invalid_input(&self) -> bool {
        matches!(self, CalculationError::InvalidInput { .. })
    }
}

pub type Result<T> = std::result::Result<T, CalculationError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn invalid_input_message_names_the_field() {
        let err = CalculationError::invalid("target", "must be between 0 and 1");
        assert_eq!(
            format!("{err}"),
            "invalid input: target must be between 0 and 1"
        );
        assert!(err.is_invalid_input());
    }

    #[test]
    fn search_limit_message_reports_bound() {
        let err = CalculationError::SearchLimitExceeded { max_steps: 25 };
        assert_eq!(
            format!("{err}"),
            "target ratio not reached within 25 search steps"
        );
        assert!(!err.is_invalid_input());
    }
}
