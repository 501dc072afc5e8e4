use crypto_core::BitVectorError;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GeneratorError {
    #[error("Delta must have its select bit set")]
    InvalidDelta,

    #[error("Generator expected {expected} input bits, got {actual}")]
    InputCountMismatch { expected: usize, actual: usize },

    /// A gate is declared known to the generator but its bit depends on
    /// values the generator does not know.
    #[error("Gate {index}.{sub_index} is declared generator-known but its value cannot be derived")]
    UnderivableBit { index: usize, sub_index: usize },

    #[error("Uninitialized label for gate {0}")]
    UninitializedLabel(usize),

    #[error("Input index {index} out of range for {len} inputs")]
    InputIndexOutOfRange { index: usize, len: usize },

    #[error("Output index {index} out of range for {len} outputs")]
    OutputIndexOutOfRange { index: usize, len: usize },

    #[error("Label for output {index} decodes to neither bit")]
    InvalidOutputLabel { index: usize },

    #[error(transparent)]
    Payload(#[from] BitVectorError),
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EvaluatorError {
    #[error("Evaluator expected {expected} input labels, got {actual}")]
    InputCountMismatch { expected: usize, actual: usize },

    #[error("Expected {expected} garbled tables, got {actual}")]
    TableCountMismatch { expected: usize, actual: usize },

    #[error("No input label supplied for gate {0}")]
    MissingInputLabel(usize),

    #[error("Garbled table of gate {0} is truncated")]
    TruncatedPayload(usize),

    #[error("Uninitialized label for gate {0}")]
    UninitializedLabel(usize),

    #[error("Bit of gate {0} is not known to the evaluator")]
    UnknownBit(usize),

    #[error(transparent)]
    Payload(#[from] BitVectorError),
}
