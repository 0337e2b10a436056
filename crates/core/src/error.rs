use thiserror::Error;
use uuid::Uuid;

pub type PromoResult<T> = Result<T, PromoError>;

#[derive(Error, Debug)]
pub enum PromoError {
    #[error("Unknown field: {0}")]
    UnknownField(String),

    #[error("Unknown operator: {0}")]
    UnknownOperator(String),

    #[error("Operator {op} is not allowed for field {field}")]
    OperatorNotAllowed { field: String, op: String },

    #[error("Rule not found: {0}")]
    RuleNotFound(Uuid),

    #[error("Action not found: {0}")]
    ActionNotFound(Uuid),

    #[error("Duplicate id: {0}")]
    DuplicateId(Uuid),

    #[error("Action {id} has no {attribute} attribute")]
    ActionAttribute { id: Uuid, attribute: String },

    #[error("Invalid value for {cell}: {value:?}")]
    InvalidCell { cell: String, value: String },

    #[error("Invalid timestamp: {0}")]
    Timestamp(String),

    #[error("Eligibility check failed: {0}")]
    Eligibility(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
