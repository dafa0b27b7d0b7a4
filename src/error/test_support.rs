use super::{ConfigError, StoreError};

impl From<&'static str> for StoreError {
    fn from(message: &'static str) -> Self {
        StoreError::TestExpectation { message }
    }
}

impl From<String> for StoreError {
    fn from(value: String) -> Self {
        StoreError::TestExpectationValue {
            message: "Test expectation failed",
            value,
        }
    }
}

impl From<&'static str> for ConfigError {
    fn from(message: &'static str) -> Self {
        ConfigError::TestExpectation { message }
    }
}

impl From<String> for ConfigError {
    fn from(value: String) -> Self {
        ConfigError::TestExpectationValue {
            message: "Test expectation failed",
            value,
        }
    }
}
