use thiserror::Error;

#[derive(Error, Debug)]
pub enum TemplateError {
    #[error("JSON parsing error: {0}")]
    JsonParse(#[from] serde_json::Error),
}
