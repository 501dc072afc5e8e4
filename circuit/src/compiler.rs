//! Lowering of parity-check systems to gate programs.

use crate::errors::CompileError;
use crate::expr::Expr;
use crate::function::BooleanFunction;
use crate::gate::{GateType, OutputScope};
use crate::program::{Program, ProgramBuilder};
use tracing::debug;

/// A compiled program together with the gate holding each variable.
#[derive(Debug, Clone)]
pub struct CompiledProgram {
    pub program: Program,
    /// `variable_indices[v]` is the gate computing variable `v`.
    pub variable_indices: Vec<usize>,
}

/// Converts [`BooleanFunction`]s into [`Program`]s.
///
/// The converter only holds configuration and may be reused.
pub struct ProgramConverter<'a> {
    output_scope_fn: Box<dyn Fn(usize) -> OutputScope + 'a>,
    random_input_fn: Box<dyn Fn(usize) -> bool + 'a>,
}

impl<'a> Default for ProgramConverter<'a> {
    fn default() -> Self {
        ProgramConverter {
            output_scope_fn: Box::new(|_| OutputScope::Neither),
            random_input_fn: Box::new(|_| false),
        }
    }
}

impl<'a> ProgramConverter<'a> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Scope requested for the gates computing variable `i`.
    pub fn output_scope_fn(mut self, f: impl Fn(usize) -> OutputScope + 'a) -> Self {
        self.output_scope_fn = Box::new(f);
        self
    }

    /// Whether input `i` is a `RANDOM` source rather than an `INPUT`.
    pub fn random_input_fn(mut self, f: impl Fn(usize) -> bool + 'a) -> Self {
        self.random_input_fn = Box::new(f);
        self
    }

    pub fn build_program(&self, function: &BooleanFunction) -> Result<Program, CompileError> {
        Ok(self.compile(function)?.program)
    }

    pub fn compile(&self, function: &BooleanFunction) -> Result<CompiledProgram, CompileError> {
        let definitions = function.definitions()?;

        let mut emitter = Emitter {
            builder: Program::builder(),
            variable_indices: Vec::with_capacity(function.len()),
            scope: OutputScope::Neither,
        };
        for i in 0..function.input_length() {
            emitter.scope = (self.output_scope_fn)(i);
            let kind = if (self.random_input_fn)(i) {
                GateType::Random
            } else {
                GateType::Input
            };
            let index = emitter.add(kind, &[])?;
            emitter.variable_indices.push(index);
        }
        for definition in &definitions {
            emitter.scope = (self.output_scope_fn)(emitter.variable_indices.len());
            let index = emitter.emit(definition)?;
            emitter.variable_indices.push(index);
        }

        let output_start = function.input_length() + function.auxiliary_length();
        let outputs: Vec<usize> = emitter.variable_indices[output_start..].to_vec();
        let Emitter {
            mut builder,
            variable_indices,
            ..
        } = emitter;
        builder.output_indices(outputs);
        let program = builder.build()?;

        debug!(
            variables = function.len(),
            checks = function.parity_checks().len(),
            gates = program.len(),
            nonlinear = program.nonlinear_count(),
            "compiled boolean function"
        );
        Ok(CompiledProgram {
            program,
            variable_indices,
        })
    }
}

/// Per-compilation state.
struct Emitter {
    builder: ProgramBuilder,
    variable_indices: Vec<usize>,
    /// Scope of the variable currently being defined.
    scope: OutputScope,
}

impl Emitter {
    fn add(&mut self, kind: GateType, offsets: &[usize]) -> Result<usize, CompileError> {
        Ok(self.builder.add_gate(kind, self.scope, offsets)?)
    }

    fn add_constant(&mut self, value: bool) -> Result<usize, CompileError> {
        Ok(self
            .builder
            .add_gate(GateType::constant(value), OutputScope::Both, &[])?)
    }

    /// Emit gates computing `expr` and return the index of the last one.
    fn emit(&mut self, expr: &Expr) -> Result<usize, CompileError> {
        match expr {
            Expr::Constant(value) => self.add_constant(*value),
            Expr::Variable(v) => {
                let current = self.builder.len();
                let source = self.variable_indices[*v];
                self.add(GateType::Identity, &[current - source])
            }
            Expr::Sum(terms) => {
                let inputs = terms
                    .iter()
                    .map(|t| self.emit(t))
                    .collect::<Result<Vec<_>, _>>()?;
                self.emit_chain(false, GateType::Xor, &inputs)
            }
            Expr::Product(factors) => {
                let inputs = factors
                    .iter()
                    .map(|t| self.emit(t))
                    .collect::<Result<Vec<_>, _>>()?;
                self.emit_chain(true, GateType::And, &inputs)
            }
        }
    }

    /// Fold `inputs` left to right through `op`, or emit the identity element
    /// when there are none.
    fn emit_chain(
        &mut self,
        identity: bool,
        op: GateType,
        inputs: &[usize],
    ) -> Result<usize, CompileError> {
        let mut current = self.builder.len();
        match inputs {
            [] => self.add_constant(identity),
            [single] => self.add(GateType::Identity, &[current - single]),
            [first, second, rest @ ..] => {
                self.add(op, &[current - first, current - second])?;
                for input in rest {
                    current += 1;
                    self.add(op, &[current - input, 1])?;
                }
                Ok(current)
            }
        }
    }
}
