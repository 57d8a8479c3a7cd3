#[derive(thiserror::Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum VecUnitError {
    #[error("invalid argument")]
    InvalidArgument,
    #[error("buffer layout for {elements} elements overflows the bus address space")]
    LayoutOverflow { elements: usize },
    #[error("scratch buffer too small: need {needed} bytes, have {available}")]
    BufferTooSmall { needed: usize, available: usize },
    #[error("coprocessor still busy after {polls} status polls")]
    Timeout { polls: u32 },
    #[error("a logger is already installed")]
    LoggerInit,
}
