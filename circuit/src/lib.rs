pub mod compiler;
pub mod errors;
pub mod expr;
pub mod function;
pub mod gate;
pub mod library;
pub mod program;
pub mod simplifier;

pub use crate::{
    compiler::{CompiledProgram, ProgramConverter},
    errors::{CircuitEvalError, CompileError, ProgramError},
    expr::Expr,
    function::BooleanFunction,
    gate::{GateData, GateType, OutputScope},
    program::{Gate, Program, ProgramBuilder},
    simplifier::{remove_unused_gates, simplify, simplify_gates},
};
