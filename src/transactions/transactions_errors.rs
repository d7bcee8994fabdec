use thiserror::Error;

pub type Result<T> = std::result::Result<T, TransactionError>;

#[derive(Error, Debug)]
pub enum TransactionError {
    #[error("Invalid transaction data: {0}")]
    InvalidData(String),

    #[error("Transaction not found: {0}")]
    NotFound(String),
}
