use std::fmt;

use serde::{Deserialize, Serialize};

#[derive(Copy, Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
#[repr(i32)]
pub enum ErrorCode {
    Ok = 0,
    InvalidArgument = 1,
    NotFound = 2,
    Unsupported = 3,
    PermissionDenied = 4,
    SystemError = 5,
    Unknown = 999,
}

impl ErrorCode {
    #[must_use]
    pub const fn as_i32(self) -> i32 {
        self as i32
    }
}

#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct NetUtilsError {
    pub code: ErrorCode,
    pub message: String,
}

impl NetUtilsError {
    #[must_use]
    pub fn new<M: Into<String>>(code: ErrorCode, message: M) -> Self {
        Self {
            code,
            message: message.into(),
        }
    }

    #[must_use]
    pub fn invalid_argument<M: Into<String>>(message: M) -> Self {
        Self::new(ErrorCode::InvalidArgument, message)
    }

    #[must_use]
    pub fn not_found<M: Into<String>>(message: M) -> Self {
        Self::new(ErrorCode::NotFound, message)
    }

    #[must_use]
    pub fn unsupported<M: Into<String>>(message: M) -> Self {
        Self::new(ErrorCode::Unsupported, message)
    }

    #[must_use]
    pub fn permission_denied<M: Into<String>>(message: M) -> Self {
        Self::new(ErrorCode::PermissionDenied, message)
    }

    #[must_use]
    pub fn system_error<M: Into<String>>(message: M) -> Self {
        Self::new(ErrorCode::SystemError, message)
    }

    #[must_use]
    pub fn with_context(mut self, context: impl std::fmt::Display) -> Self {
        self.message = format!("{context}: {}", self.message);
        self
    }
}

impl fmt::Display for NetUtilsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{:?}] {}", self.code, self.message)
    }
}

impl std::error::Error for NetUtilsError {}

impl From<std::io::Error> for NetUtilsError {
    fn from(e: std::io::Error) -> Self {
        let code = match e.kind() {
            std::io::ErrorKind::PermissionDenied => ErrorCode::PermissionDenied,
            std::io::ErrorKind::NotFound => ErrorCode::NotFound,
            _ => ErrorCode::SystemError,
        };
        Self::new(code, e.to_string())
    }
}
