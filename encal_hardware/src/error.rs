use thiserror::Error;

#[derive(Debug, Error)]
pub enum HwError {
    #[error("table transaction misuse: {0}")]
    Transaction(&'static str),
    #[error("table overflow: {written} entries over a capacity of {capacity}")]
    Overflow { written: usize, capacity: usize },
    #[error("sensor fault: {0}")]
    Sensor(String),
    #[error("io: {0}")]
    Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, HwError>;
