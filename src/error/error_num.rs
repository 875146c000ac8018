//! Numeric error catalogue reported in the `errorNum` field of error bodies.

/// Error numbers understood by clients of the user API.
///
/// HTTP-level numbers reuse the status code they travel with; user-store
/// numbers live in the 17xx range.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorNum {
    Internal,
    BadParameter,
    HttpBadParameter,
    HttpMethodNotAllowed,
    HttpCorruptedJson,
    UserInvalidName,
    UserDuplicate,
    UserNotFound,
}

impl ErrorNum {
    pub fn code(self) -> u16 {
        match self {
            ErrorNum::Internal => 4,
            ErrorNum::BadParameter => 10,
            ErrorNum::HttpBadParameter => 400,
            ErrorNum::HttpMethodNotAllowed => 405,
            ErrorNum::HttpCorruptedJson => 600,
            ErrorNum::UserInvalidName => 1700,
            ErrorNum::UserDuplicate => 1702,
            ErrorNum::UserNotFound => 1703,
        }
    }

    /// Default human readable message for this error number.
    pub fn message(self) -> &'static str {
        match self {
            ErrorNum::Internal => "internal error",
            ErrorNum::BadParameter => "illegal parameter",
            ErrorNum::HttpBadParameter => "bad parameter",
            ErrorNum::HttpMethodNotAllowed => "method not supported",
            ErrorNum::HttpCorruptedJson => "invalid JSON object",
            ErrorNum::UserInvalidName => "invalid user name",
            ErrorNum::UserDuplicate => "duplicate user",
            ErrorNum::UserNotFound => "user not found",
        }
    }
}

impl std::fmt::Display for ErrorNum {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.message(), self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_http_numbers_match_status_codes() {
        assert_eq!(ErrorNum::HttpBadParameter.code(), 400);
        assert_eq!(ErrorNum::HttpMethodNotAllowed.code(), 405);
    }

    #[test]
    fn test_user_numbers() {
        assert_eq!(ErrorNum::UserInvalidName.code(), 1700);
        assert_eq!(ErrorNum::UserDuplicate.code(), 1702);
        assert_eq!(ErrorNum::UserNotFound.code(), 1703);
    }

    #[test]
    fn test_display_includes_code() {
        assert_eq!(ErrorNum::UserNotFound.to_string(), "user not found (1703)");
    }
}
