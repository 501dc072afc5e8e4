use crate::gate::GateType;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProgramError {
    #[error("gate {index}: offset {offset} must be positive")]
    NonPositiveOffset { index: usize, offset: isize },
    #[error("gate {index}: offset {offset} points before the first gate")]
    OffsetOutOfRange { index: usize, offset: usize },
    #[error("gate {index}: {kind:?} takes {expected} inputs, got {actual}")]
    ArityMismatch {
        index: usize,
        kind: GateType,
        expected: usize,
        actual: usize,
    },
    #[error("output index {index} out of range for {len} gates")]
    OutputOutOfRange { index: usize, len: usize },
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CompileError {
    #[error("parity check {0} is a constant")]
    ConstantConstraint(usize),
    #[error("parity check {check} is not linear in variable {variable}")]
    NonLinearGradient { check: usize, variable: usize },
    #[error("parity check {check} does not depend on variable {variable}")]
    ZeroGradient { check: usize, variable: usize },
    #[error("parity check {check} constrains input variable {variable}")]
    ConstrainedInput { check: usize, variable: usize },
    #[error("parity check {check} defines variable {variable} beyond length {len}")]
    VariableOutOfRange {
        check: usize,
        variable: usize,
        len: usize,
    },
    #[error("variable {0} is not defined by any parity check")]
    Gap(usize),
    #[error(transparent)]
    Program(#[from] ProgramError),
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CircuitEvalError {
    #[error("expected {expected} source bits, got {actual}")]
    InputCountMismatch { expected: usize, actual: usize },
}
