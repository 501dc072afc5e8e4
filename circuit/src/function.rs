//! Boolean functions given as systems of GF(2) parity checks.

use crate::errors::CompileError;
use crate::expr::Expr;

/// A function of `input_length` bits, specified by constraints over
/// `input_length + auxiliary_length + output_length` variables.
///
/// Each parity check is an expression that must evaluate to zero. A check
/// defines its highest-indexed variable, in which it must be linear with
/// gradient one. Outputs are the last `output_length` variables.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BooleanFunction {
    input_length: usize,
    auxiliary_length: usize,
    output_length: usize,
    parity_checks: Vec<Expr>,
}

impl BooleanFunction {
    pub fn new(
        input_length: usize,
        auxiliary_length: usize,
        output_length: usize,
        parity_checks: Vec<Expr>,
    ) -> Self {
        BooleanFunction {
            input_length,
            auxiliary_length,
            output_length,
            parity_checks,
        }
    }

    #[inline]
    pub fn input_length(&self) -> usize {
        self.input_length
    }

    #[inline]
    pub fn auxiliary_length(&self) -> usize {
        self.auxiliary_length
    }

    #[inline]
    pub fn output_length(&self) -> usize {
        self.output_length
    }

    /// Total number of variables.
    #[inline]
    pub fn len(&self) -> usize {
        self.input_length + self.auxiliary_length + self.output_length
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[inline]
    pub fn parity_checks(&self) -> &[Expr] {
        &self.parity_checks
    }

    /// The defining expression of every non-input variable, indexed from
    /// `input_length`.
    ///
    /// Variable `v` equals `definitions()[v - input_length]` evaluated on
    /// the variables before it.
    pub fn definitions(&self) -> Result<Vec<Expr>, CompileError> {
        let len = self.len();
        let mut definitions: Vec<Option<Expr>> = vec![None; len - self.input_length];
        for (check, expr) in self.parity_checks.iter().enumerate() {
            let variable = expr
                .max_variable()
                .ok_or(CompileError::ConstantConstraint(check))?;
            match expr.partial_derivative(variable).as_constant() {
                None => return Err(CompileError::NonLinearGradient { check, variable }),
                Some(false) => return Err(CompileError::ZeroGradient { check, variable }),
                Some(true) => {}
            }
            if variable < self.input_length {
                return Err(CompileError::ConstrainedInput { check, variable });
            }
            if variable >= len {
                return Err(CompileError::VariableOutOfRange {
                    check,
                    variable,
                    len,
                });
            }
            // Repeated checks for one variable are assumed compatible; the last wins.
            definitions[variable - self.input_length] = Some(expr.substitute(variable, false));
        }

        definitions
            .into_iter()
            .enumerate()
            .map(|(i, d)| d.ok_or(CompileError::Gap(self.input_length + i)))
            .collect()
    }

    /// Compute every variable from the inputs.
    ///
    /// # Panics
    ///
    /// Panics if `inputs` is shorter than the input length.
    pub fn solve(&self, inputs: &[bool]) -> Result<Vec<bool>, CompileError> {
        let definitions = self.definitions()?;
        let mut values = inputs[..self.input_length].to_vec();
        for definition in &definitions {
            let value = definition.evaluate(&values);
            values.push(value);
        }
        Ok(values)
    }

    /// Compute the outputs from the inputs.
    pub fn apply(&self, inputs: &[bool]) -> Result<Vec<bool>, CompileError> {
        let values = self.solve(inputs)?;
        Ok(values[self.len() - self.output_length..].to_vec())
    }

    /// True if `assignment` satisfies every parity check.
    pub fn is_satisfied(&self, assignment: &[bool]) -> bool {
        assignment.len() == self.len()
            && self.parity_checks.iter().all(|e| !e.evaluate(assignment))
    }

    fn binary(output: Expr) -> Self {
        BooleanFunction::new(2, 0, 1, vec![Expr::var(2) + output])
    }

    /// `x0 ∧ x1`
    pub fn and() -> Self {
        Self::binary(Expr::var(0) * Expr::var(1))
    }

    /// `x0 ∨ x1`
    pub fn or() -> Self {
        Self::binary(Expr::var(0) + Expr::var(1) + Expr::var(0) * Expr::var(1))
    }

    /// `x0 ⊕ x1`
    pub fn xor() -> Self {
        Self::binary(Expr::var(0) + Expr::var(1))
    }

    /// Ripple-carry addition of two `width`-bit numbers modulo `2^width`.
    ///
    /// Inputs are `a` then `b`, each most significant bit first; the carries
    /// into bits `1..width` are auxiliary; the output is the sum, most
    /// significant bit first.
    pub fn adder(width: usize) -> Self {
        let a = |k: usize| Expr::var(width - 1 - k);
        let b = |k: usize| Expr::var(2 * width - 1 - k);
        let carries = width.saturating_sub(1);
        // Carry into bit `k`, for `k` in `1..width`.
        let carry = |k: usize| Expr::var(2 * width + k - 1);
        let sum = |k: usize| Expr::var(2 * width + carries + (width - 1 - k));

        let mut checks = Vec::with_capacity(carries + width);
        for k in 0..carries {
            let majority = if k == 0 {
                a(0) * b(0)
            } else {
                a(k) * b(k) + carry(k) * (a(k) + b(k))
            };
            checks.push(carry(k + 1) + majority);
        }
        for k in (0..width).rev() {
            let mut check = sum(k) + a(k) + b(k);
            if k > 0 {
                check = check + carry(k);
            }
            checks.push(check);
        }
        BooleanFunction::new(2 * width, carries, width, checks)
    }
}
