//! Flat gate programs addressed by backward offsets.

use crate::errors::{CircuitEvalError, ProgramError};
use crate::gate::{GateData, GateType, OutputScope};
use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

/// An immutable list of gates with declared outputs.
///
/// Identical gate data is interned, so gates that share type, scope and
/// offsets share one allocation and one memoised decomposition.
#[derive(Clone, PartialEq, Eq)]
pub struct Program {
    gates: Vec<Arc<GateData>>,
    input_indices: Vec<usize>,
    output_indices: Vec<usize>,
    ungarbled_output_indices: Vec<usize>,
}

impl Program {
    pub fn builder() -> ProgramBuilder {
        ProgramBuilder::default()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.gates.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.gates.is_empty()
    }

    #[inline]
    pub fn raw_gates(&self) -> &[Arc<GateData>] {
        &self.gates
    }

    /// The gate at `index`.
    ///
    /// # Panics
    ///
    /// Panics if `index` is out of range.
    #[inline]
    pub fn gate(&self, index: usize) -> Gate<'_> {
        Gate {
            program: self,
            index,
            sub_index: 0,
            data: &self.gates[index],
        }
    }

    pub fn gates(&self) -> impl ExactSizeIterator<Item = Gate<'_>> + '_ {
        (0..self.len()).map(move |i| self.gate(i))
    }

    /// Positions of `INPUT` gates whose value the generator does not know.
    #[inline]
    pub fn input_indices(&self) -> &[usize] {
        &self.input_indices
    }

    #[inline]
    pub fn output_indices(&self) -> &[usize] {
        &self.output_indices
    }

    /// Declared outputs whose value the evaluator learns.
    #[inline]
    pub fn ungarbled_output_indices(&self) -> &[usize] {
        &self.ungarbled_output_indices
    }

    /// Resolve operand `offset` of the gate at `index`.
    fn resolve(&self, index: usize, offset: isize) -> Gate<'_> {
        if offset > 0 {
            return self.gate(index - offset as usize);
        }
        let sub_index = offset.unsigned_abs();
        let split = self.gates[index]
            .decompose()
            .unwrap_or_else(|| panic!("gate {} has no decomposition", index));
        Gate {
            program: self,
            index,
            sub_index,
            data: &split[sub_index],
        }
    }

    pub fn count(&self, kind: GateType) -> usize {
        self.gates.iter().filter(|g| g.kind() == kind).count()
    }

    pub fn nonlinear_count(&self) -> usize {
        self.gates.iter().filter(|g| g.kind().is_nonlinear()).count()
    }

    /// Number of `INPUT` and `RANDOM` gates.
    pub fn source_count(&self) -> usize {
        self.gates.iter().filter(|g| g.kind().is_source()).count()
    }

    /// Evaluate every gate in plaintext.
    ///
    /// `sources` supplies one bit per `INPUT` or `RANDOM` gate, in gate order.
    pub fn eval_gates(&self, sources: &[bool]) -> Result<Vec<bool>, CircuitEvalError> {
        let expected = self.source_count();
        if sources.len() != expected {
            return Err(CircuitEvalError::InputCountMismatch {
                expected,
                actual: sources.len(),
            });
        }

        let mut sources = sources.iter().copied();
        let mut values: Vec<bool> = Vec::with_capacity(self.len());
        for (index, gate) in self.gates.iter().enumerate() {
            let kind = gate.kind();
            let operand = |i: usize| values[index - gate.offsets()[i] as usize];
            let value = match kind.arity() {
                0 if kind.is_source() => sources.next().unwrap_or_default(),
                0 => kind.is_output_negated(),
                1 => kind.apply_unary(operand(0)),
                _ => kind.apply(operand(0), operand(1)),
            };
            values.push(value);
        }
        Ok(values)
    }

    /// Evaluate in plaintext and return the declared outputs.
    pub fn eval(&self, sources: &[bool]) -> Result<Vec<bool>, CircuitEvalError> {
        let values = self.eval_gates(sources)?;
        Ok(self.output_indices.iter().map(|&i| values[i]).collect())
    }
}

impl fmt::Debug for Program {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Program")
            .field("gates", &self.gates)
            .field("output_indices", &self.output_indices)
            .finish()
    }
}

/// A view of a gate inside a program, or of a sub-gate of a decomposed gate.
#[derive(Clone, Copy)]
pub struct Gate<'a> {
    program: &'a Program,
    index: usize,
    sub_index: usize,
    data: &'a GateData,
}

impl<'a> Gate<'a> {
    #[inline]
    pub fn index(&self) -> usize {
        self.index
    }

    /// Position inside the decomposition of the gate at [`Gate::index`], zero for
    /// physical gates.
    #[inline]
    pub fn sub_index(&self) -> usize {
        self.sub_index
    }

    #[inline]
    pub fn data(&self) -> &'a GateData {
        self.data
    }

    #[inline]
    pub fn kind(&self) -> GateType {
        self.data.kind()
    }

    #[inline]
    pub fn scope(&self) -> OutputScope {
        self.data.scope()
    }

    #[inline]
    pub fn is_output_known_to_generator(&self) -> bool {
        self.scope().is_known_to_generator()
    }

    #[inline]
    pub fn is_output_known_to_evaluator(&self) -> bool {
        self.scope().is_known_to_evaluator()
    }

    /// The gate feeding input `i`.
    ///
    /// # Panics
    ///
    /// Panics if the gate has fewer than `i + 1` inputs.
    #[inline]
    pub fn input(&self, i: usize) -> Gate<'a> {
        self.program.resolve(self.index, self.data.offsets()[i])
    }

    #[inline]
    pub fn first_input(&self) -> Gate<'a> {
        self.input(0)
    }

    #[inline]
    pub fn second_input(&self) -> Gate<'a> {
        self.input(1)
    }

    /// Sub-gates of an AND-family gate in evaluation order (4 down to 0).
    pub fn sub_gates(&self) -> Option<impl Iterator<Item = Gate<'a>> + 'a> {
        self.data.decompose()?;
        let (program, index) = (self.program, self.index);
        Some((0..5).rev().map(move |k| program.resolve(index, -k)))
    }
}

impl<'a> fmt::Debug for Gate<'a> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut s = f.debug_struct("Gate");
        s.field("index", &self.index);
        if self.sub_index > 0 {
            s.field("sub_index", &self.sub_index);
        }
        s.field("data", self.data).finish()
    }
}

/// Append-only construction of a [`Program`].
#[derive(Default)]
pub struct ProgramBuilder {
    gates: Vec<Arc<GateData>>,
    cache: HashSet<Arc<GateData>>,
    output_indices: Vec<usize>,
}

impl ProgramBuilder {
    #[inline]
    pub fn len(&self) -> usize {
        self.gates.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.gates.is_empty()
    }

    #[inline]
    pub fn raw_gates(&self) -> &[Arc<GateData>] {
        &self.gates
    }

    /// Append a gate and return its index.
    ///
    /// The requested scope is widened to what the inputs already reveal: a
    /// gate whose inputs are all known to a party is known to that party too.
    pub fn add_gate(
        &mut self,
        kind: GateType,
        scope: OutputScope,
        offsets: &[usize],
    ) -> Result<usize, ProgramError> {
        let index = self.gates.len();
        if offsets.len() != kind.arity() {
            return Err(ProgramError::ArityMismatch {
                index,
                kind,
                expected: kind.arity(),
                actual: offsets.len(),
            });
        }

        let mut floor = if kind.is_source() {
            OutputScope::Neither
        } else {
            OutputScope::Both
        };
        for &offset in offsets {
            if offset == 0 {
                return Err(ProgramError::NonPositiveOffset { index, offset: 0 });
            }
            if offset > index {
                return Err(ProgramError::OffsetOutOfRange { index, offset });
            }
            floor = floor.intersect(self.gates[index - offset].scope());
        }

        let offsets: Vec<isize> = offsets.iter().map(|&o| o as isize).collect();
        let gate = GateData::new(kind, scope.union(floor), &offsets);
        let gate = match self.cache.get(&gate) {
            Some(interned) => interned.clone(),
            None => {
                let gate = Arc::new(gate);
                self.cache.insert(gate.clone());
                gate
            }
        };
        self.gates.push(gate);
        Ok(index)
    }

    /// Append a copy of `gate`. Its offsets must all be positive.
    pub fn add(&mut self, gate: &GateData) -> Result<usize, ProgramError> {
        let index = self.gates.len();
        let mut offsets = Vec::with_capacity(gate.offsets().len());
        for &offset in gate.offsets() {
            if offset <= 0 {
                return Err(ProgramError::NonPositiveOffset { index, offset });
            }
            offsets.push(offset as usize);
        }
        self.add_gate(gate.kind(), gate.scope(), &offsets)
    }

    pub fn output_indices<I: IntoIterator<Item = usize>>(&mut self, outputs: I) -> &mut Self {
        self.output_indices = outputs.into_iter().collect();
        self
    }

    pub fn build(self) -> Result<Program, ProgramError> {
        let len = self.gates.len();
        if let Some(&index) = self.output_indices.iter().find(|&&i| i >= len) {
            return Err(ProgramError::OutputOutOfRange { index, len });
        }
        Ok(Program::from_parts(self.gates, self.output_indices))
    }
}

impl Program {
    /// Assemble a program from gates already validated by a builder or a rewrite.
    pub(crate) fn from_parts(gates: Vec<Arc<GateData>>, output_indices: Vec<usize>) -> Self {
        let input_indices = gates
            .iter()
            .enumerate()
            .filter(|(_, g)| g.kind() == GateType::Input && !g.scope().is_known_to_generator())
            .map(|(i, _)| i)
            .collect();
        let ungarbled_output_indices = output_indices
            .iter()
            .copied()
            .filter(|&i| gates[i].scope().is_known_to_evaluator())
            .collect();
        Program {
            gates,
            input_indices,
            output_indices,
            ungarbled_output_indices,
        }
    }
}
