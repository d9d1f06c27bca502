use thiserror::Error;

/// Client input that is rejected before touching any store.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("{0} is required")]
    Missing(&'static str),
    #[error("{field} must be between {min} and {max} characters")]
    Length {
        field: &'static str,
        min: usize,
        max: usize,
    },
    #[error("Invalid email address: {0}")]
    InvalidEmail(String),
    #[error("{0} must be greater than zero")]
    NotPositive(&'static str),
    #[error("Invalid currency code: {0}")]
    InvalidCurrency(String),
    #[error("end_date must not be before start_date")]
    InvalidPeriod,
    #[error("Invalid {field}: {value}")]
    InvalidValue { field: &'static str, value: String },
    #[error("created_at and id must be used together")]
    IncompleteCursor,
    #[error("Invalid month for {field}: expected MM-YYYY, got {value}")]
    InvalidMonth { field: &'static str, value: String },
    #[error("Invalid billing window: from must not be after to")]
    InvertedWindow,
    #[error("Total price for the requested window does not fit in 64 bits")]
    TotalOverflow,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_length_display() {
        let error = ValidationError::Length {
            field: "first_name",
            min: 2,
            max: 100,
        };
        assert_eq!(
            error.to_string(),
            "first_name must be between 2 and 100 characters"
        );
    }

    #[test]
    fn test_incomplete_cursor_display() {
        assert_eq!(
            ValidationError::IncompleteCursor.to_string(),
            "created_at and id must be used together"
        );
    }

    #[test]
    fn test_invalid_month_display() {
        let error = ValidationError::InvalidMonth {
            field: "from",
            value: "2024-01".to_string(),
        };
        assert_eq!(
            error.to_string(),
            "Invalid month for from: expected MM-YYYY, got 2024-01"
        );
    }
}
