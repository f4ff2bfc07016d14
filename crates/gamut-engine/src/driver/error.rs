use std::fmt;

/// Category of a queued driver error.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum ErrorCode {
    /// An argument was out of range (e.g. a zero-sized image).
    InvalidValue,
    /// The call is not allowed in the current state.
    InvalidOperation,
    OutOfMemory,
    /// The backend rejected an object or command.
    Validation,
    Internal,
    /// The surface/device cannot render anymore.
    ContextLost,
}

impl ErrorCode {
    /// Stable numeric code, in the spirit of GL enums.
    pub fn as_u32(self) -> u32 {
        match self {
            ErrorCode::InvalidValue => 0x0501,
            ErrorCode::InvalidOperation => 0x0502,
            ErrorCode::OutOfMemory => 0x0505,
            ErrorCode::Validation => 0x1000,
            ErrorCode::Internal => 0x1001,
            ErrorCode::ContextLost => 0x0507,
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ErrorCode::InvalidValue => "invalid value",
            ErrorCode::InvalidOperation => "invalid operation",
            ErrorCode::OutOfMemory => "out of memory",
            ErrorCode::Validation => "validation",
            ErrorCode::Internal => "internal",
            ErrorCode::ContextLost => "context lost",
        };
        write!(f, "{name} (0x{:04x})", self.as_u32())
    }
}

/// One entry of the driver error queue.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DriverError {
    pub code: ErrorCode,
    pub message: String,
}

impl DriverError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self { code, message: message.into() }
    }
}

impl fmt::Display for DriverError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.message.is_empty() {
            write!(f, "gpu error {}", self.code)
        } else {
            write!(f, "gpu error {}: {}", self.code, self.message)
        }
    }
}

impl std::error::Error for DriverError {}

impl From<wgpu::Error> for DriverError {
    fn from(err: wgpu::Error) -> Self {
        let code = match &err {
            wgpu::Error::OutOfMemory { .. } => ErrorCode::OutOfMemory,
            wgpu::Error::Validation { .. } => ErrorCode::Validation,
            _ => ErrorCode::Internal,
        };
        Self::new(code, err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_includes_code_and_message() {
        let e = DriverError::new(ErrorCode::InvalidOperation, "no program");
        assert_eq!(e.to_string(), "gpu error invalid operation (0x0502): no program");
        assert_eq!(
            DriverError::new(ErrorCode::OutOfMemory, "").to_string(),
            "gpu error out of memory (0x0505)"
        );
    }
}
