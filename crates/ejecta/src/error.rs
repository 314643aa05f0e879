use thiserror::Error;

use crate::process::EmissionProcess;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum EmissionError {
    #[error("no {process} parameters configured")]
    MissingParameters { process: EmissionProcess },

    #[error("invalid emission parameter {name}: {value}")]
    InvalidParameter { name: &'static str, value: f64 },
}

impl EmissionError {
    pub fn invalid(name: &'static str, value: f64) -> Self {
        EmissionError::InvalidParameter { name, value }
    }
}
