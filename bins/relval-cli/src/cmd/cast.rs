use relval_types::TypeId;

use super::{error::CliError, literal};

pub fn run(literal: &str, target: &str) -> Result<String, CliError> {
    let value = literal::parse(literal)?;
    let target: TypeId = target.parse()?;
    let cast = value.cast_as(target)?;
    tracing::debug!(from = %value.info(), to = %cast.info(), "cast");
    Ok(cast.to_string())
}
