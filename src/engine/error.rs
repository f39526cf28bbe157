use std::fmt;

use crate::game::coords::Coordinate;

#[derive(Debug, Clone, PartialEq)]
pub enum EngineError {
    /// Rejected configuration. Fatal at startup.
    Configuration(String),
    ConfigIo { path: String, message: String },
    /// Every palette color is excluded at this cell.
    PolicyExhausted { coordinate: Coordinate },
    /// A cascade was started while another was running.
    ReentrancyViolation,
}

impl fmt::Display for EngineError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            EngineError::Configuration(msg) => write!(f, "invalid configuration: {msg}"),
            EngineError::ConfigIo { path, message } => write!(f, "failed to load {path}: {message}"),
            EngineError::PolicyExhausted { coordinate } => {
                write!(f, "no palette color is allowed at {coordinate}")
            }
            EngineError::ReentrancyViolation => write!(f, "cascade started while one is active"),
        }
    }
}

impl std::error::Error for EngineError {}
