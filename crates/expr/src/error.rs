use thiserror::Error;

#[derive(Error, Debug, Clone)]
pub enum ExprError {
    #[error("Expression parse error in '{0}': {1}")]
    ExpressionParse(String, String),
}
