use relval_api::ValueError;

#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("{0}")]
    Config(String),

    #[error("{0}")]
    Literal(String),

    #[error("{0}")]
    Value(#[from] ValueError),
}
