use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CoreError {
    #[error("phone number value is blank")]
    BlankNumber,
    #[error("phone number value contains no digits: {0}")]
    NoDigits(String),
}
