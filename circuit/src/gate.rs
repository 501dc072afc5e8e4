//! Gate types, output scopes and the raw per-gate data stored in a program.

use once_cell::sync::OnceCell;
use serde::{Deserialize, Serialize};
use std::hash::{Hash, Hasher};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum GateType {
    Input,
    Random,
    False,
    True,
    Identity,
    Not,
    Xor,
    Xnor,
    /// `x ∧ y`
    And,
    /// `¬x ∧ y`
    NotAnd,
    /// `x ∧ ¬y`
    AndNot,
    /// `¬x ∧ ¬y`
    Nor,
    /// `¬(x ∧ y)`
    Nand,
    /// `¬(¬x ∧ y)`
    OrNot,
    /// `¬(x ∧ ¬y)`
    NotOr,
    /// `¬(¬x ∧ ¬y)`
    Or,
}

impl GateType {
    pub const ALL: [GateType; 16] = [
        GateType::Input,
        GateType::Random,
        GateType::False,
        GateType::True,
        GateType::Identity,
        GateType::Not,
        GateType::Xor,
        GateType::Xnor,
        GateType::And,
        GateType::NotAnd,
        GateType::AndNot,
        GateType::Nor,
        GateType::Nand,
        GateType::OrNot,
        GateType::NotOr,
        GateType::Or,
    ];

    /// Number of input offsets a gate of this type carries.
    #[inline]
    pub fn arity(self) -> usize {
        match self {
            GateType::Input | GateType::Random | GateType::False | GateType::True => 0,
            GateType::Identity | GateType::Not => 1,
            _ => 2,
        }
    }

    #[inline]
    pub fn is_source(self) -> bool {
        matches!(self, GateType::Input | GateType::Random)
    }

    #[inline]
    pub fn is_constant(self) -> bool {
        matches!(self, GateType::False | GateType::True)
    }

    #[inline]
    pub fn is_unary(self) -> bool {
        self.arity() == 1
    }

    #[inline]
    pub fn is_linear(self) -> bool {
        matches!(self, GateType::Xor | GateType::Xnor)
    }

    /// True for the eight AND-family types, the only ones that cost ciphertexts.
    #[inline]
    pub fn is_nonlinear(self) -> bool {
        self.arity() == 2 && !self.is_linear()
    }

    #[inline]
    pub fn is_output_negated(self) -> bool {
        matches!(
            self,
            GateType::True
                | GateType::Not
                | GateType::Xnor
                | GateType::Nand
                | GateType::OrNot
                | GateType::NotOr
                | GateType::Or
        )
    }

    #[inline]
    pub fn is_first_input_negated(self) -> bool {
        matches!(
            self,
            GateType::NotAnd | GateType::Nor | GateType::OrNot | GateType::Or
        )
    }

    #[inline]
    pub fn is_second_input_negated(self) -> bool {
        matches!(
            self,
            GateType::AndNot | GateType::Nor | GateType::NotOr | GateType::Or
        )
    }

    /// The constant gate with value `value`.
    #[inline]
    pub fn constant(value: bool) -> Self {
        if value {
            GateType::True
        } else {
            GateType::False
        }
    }

    /// `Identity` or `Not`, depending on `negated`.
    #[inline]
    pub fn unary(negated: bool) -> Self {
        if negated {
            GateType::Not
        } else {
            GateType::Identity
        }
    }

    /// `Xor` or `Xnor`, depending on `negated`.
    #[inline]
    pub fn linear(negated: bool) -> Self {
        if negated {
            GateType::Xnor
        } else {
            GateType::Xor
        }
    }

    /// The AND-family type with the given input and output negations.
    pub fn and_family(first_negated: bool, second_negated: bool, output_negated: bool) -> Self {
        match (first_negated, second_negated, output_negated) {
            (false, false, false) => GateType::And,
            (true, false, false) => GateType::NotAnd,
            (false, true, false) => GateType::AndNot,
            (true, true, false) => GateType::Nor,
            (false, false, true) => GateType::Nand,
            (true, false, true) => GateType::OrNot,
            (false, true, true) => GateType::NotOr,
            (true, true, true) => GateType::Or,
        }
    }

    /// The type computing the same function with its first input negated.
    pub fn negate_first_input(self) -> Self {
        if self.is_unary() {
            return GateType::unary(!self.is_output_negated());
        }
        if self.is_linear() {
            return GateType::linear(!self.is_output_negated());
        }
        debug_assert!(self.is_nonlinear());
        GateType::and_family(
            !self.is_first_input_negated(),
            self.is_second_input_negated(),
            self.is_output_negated(),
        )
    }

    /// The binary type computing the same function with its second input negated.
    pub fn negate_second_input(self) -> Self {
        if self.is_linear() {
            return GateType::linear(!self.is_output_negated());
        }
        debug_assert!(self.is_nonlinear());
        GateType::and_family(
            self.is_first_input_negated(),
            !self.is_second_input_negated(),
            self.is_output_negated(),
        )
    }

    /// Plaintext truth table of a unary gate.
    #[inline]
    pub fn apply_unary(self, x: bool) -> bool {
        x ^ self.is_output_negated()
    }

    /// Plaintext truth table of a binary gate.
    #[inline]
    pub fn apply(self, x: bool, y: bool) -> bool {
        if self.is_linear() {
            x ^ y ^ self.is_output_negated()
        } else {
            ((x ^ self.is_first_input_negated()) & (y ^ self.is_second_input_negated()))
                ^ self.is_output_negated()
        }
    }

    /// The pair of AND-family types used by the five-gate decomposition.
    fn split_types(self) -> Option<(GateType, GateType)> {
        use GateType::*;
        Some(match self {
            And => (And, And),
            NotAnd => (NotAnd, NotAnd),
            AndNot => (And, AndNot),
            Nor => (NotAnd, Nor),
            Nand => (Nand, And),
            OrNot => (OrNot, NotAnd),
            NotOr => (Nand, AndNot),
            Or => (OrNot, Nor),
            _ => return None,
        })
    }
}

/// Which parties learn the plaintext value of a gate's output.
///
/// Bit 0 is generator knowledge, bit 1 evaluator knowledge.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum OutputScope {
    Neither = 0,
    Generator = 1,
    Evaluator = 2,
    Both = 3,
}

impl OutputScope {
    pub const ALL: [OutputScope; 4] = [
        OutputScope::Neither,
        OutputScope::Generator,
        OutputScope::Evaluator,
        OutputScope::Both,
    ];

    #[inline]
    fn from_bits(bits: u8) -> Self {
        Self::ALL[(bits & 3) as usize]
    }

    #[inline]
    pub fn new(known_to_generator: bool, known_to_evaluator: bool) -> Self {
        Self::from_bits(known_to_generator as u8 | (known_to_evaluator as u8) << 1)
    }

    /// Knowledge common to both scopes.
    #[inline]
    pub fn intersect(self, other: Self) -> Self {
        Self::from_bits(self as u8 & other as u8)
    }

    /// Knowledge of either scope.
    #[inline]
    pub fn union(self, other: Self) -> Self {
        Self::from_bits(self as u8 | other as u8)
    }

    #[inline]
    pub fn contains(self, other: Self) -> bool {
        self.intersect(other) == other
    }

    #[inline]
    pub fn is_known_to_generator(self) -> bool {
        self as u8 & 1 != 0
    }

    #[inline]
    pub fn is_known_to_evaluator(self) -> bool {
        self as u8 & 2 != 0
    }
}

/// A gate as stored in a program: its type, output scope and backward input
/// offsets.
///
/// An offset `d > 0` addresses the gate `d` slots earlier; an offset `-k`
/// addresses sub-gate `k` of the decomposition of the gate in the same slot.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GateData {
    kind: GateType,
    scope: OutputScope,
    offsets: Vec<isize>,
    #[serde(skip)]
    split: OnceCell<Box<[GateData; 5]>>,
}

impl GateData {
    pub fn new(kind: GateType, scope: OutputScope, offsets: &[isize]) -> Self {
        GateData {
            kind,
            scope,
            offsets: offsets.to_vec(),
            split: OnceCell::new(),
        }
    }

    pub fn constant(value: bool) -> Self {
        GateData::new(GateType::constant(value), OutputScope::Both, &[])
    }

    #[inline]
    pub fn kind(&self) -> GateType {
        self.kind
    }

    #[inline]
    pub fn scope(&self) -> OutputScope {
        self.scope
    }

    #[inline]
    pub fn offsets(&self) -> &[isize] {
        &self.offsets
    }

    /// The five-gate decomposition of an AND-family gate, indexed by sub-index.
    ///
    /// Sub-gate 0 computes the same value as `self`; sub-gate 4 is a random
    /// source known to the generator. Computed once and memoised.
    pub fn decompose(&self) -> Option<&[GateData; 5]> {
        let (t1, t2) = self.kind.split_types()?;
        let (a, b) = (self.offsets[0], self.offsets[1]);
        let split = self.split.get_or_init(|| {
            Box::new([
                GateData::new(GateType::Xor, OutputScope::Neither, &[-1, -3]),
                GateData::new(t2, OutputScope::Neither, &[a, -2]),
                GateData::new(GateType::Xor, OutputScope::Evaluator, &[b, -4]),
                GateData::new(t1, OutputScope::Neither, &[a, -4]),
                GateData::new(GateType::Random, OutputScope::Generator, &[]),
            ])
        });
        Some(split)
    }

    /// A copy of this gate with a different type.
    pub(crate) fn with_kind(&self, kind: GateType) -> GateData {
        GateData::new(kind, self.scope, &self.offsets)
    }

    pub(crate) fn with_scope(&self, scope: OutputScope) -> GateData {
        GateData::new(self.kind, scope, &self.offsets)
    }

    /// A copy of this gate with input `i` reading `delta` slots further back.
    pub(crate) fn shift_input(&self, i: usize, delta: isize) -> GateData {
        let mut offsets = self.offsets.clone();
        offsets[i] += delta;
        GateData::new(self.kind, self.scope, &offsets)
    }
}

impl PartialEq for GateData {
    fn eq(&self, other: &Self) -> bool {
        self.kind == other.kind && self.scope == other.scope && self.offsets == other.offsets
    }
}

impl Eq for GateData {}

impl Hash for GateData {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.kind.hash(state);
        self.scope.hash(state);
        self.offsets.hash(state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    const NONLINEAR: [GateType; 8] = [
        GateType::And,
        GateType::NotAnd,
        GateType::AndNot,
        GateType::Nor,
        GateType::Nand,
        GateType::OrNot,
        GateType::NotOr,
        GateType::Or,
    ];

    #[rstest]
    #[case(GateType::And, [false, false, false, true])]
    #[case(GateType::NotAnd, [false, true, false, false])]
    #[case(GateType::AndNot, [false, false, true, false])]
    #[case(GateType::Nor, [true, false, false, false])]
    #[case(GateType::Nand, [true, true, true, false])]
    #[case(GateType::OrNot, [true, false, true, true])]
    #[case(GateType::NotOr, [true, true, false, true])]
    #[case(GateType::Or, [false, true, true, true])]
    #[case(GateType::Xor, [false, true, true, false])]
    #[case(GateType::Xnor, [true, false, false, true])]
    fn test_truth_table(#[case] kind: GateType, #[case] table: [bool; 4]) {
        for (i, expected) in table.iter().enumerate() {
            let (x, y) = (i & 2 != 0, i & 1 != 0);
            assert_eq!(kind.apply(x, y), *expected, "{:?}({}, {})", kind, x, y);
        }
    }

    #[test]
    fn test_and_family_flags() {
        for kind in NONLINEAR {
            assert_eq!(
                GateType::and_family(
                    kind.is_first_input_negated(),
                    kind.is_second_input_negated(),
                    kind.is_output_negated()
                ),
                kind
            );
        }
    }

    #[test]
    fn test_negated_inputs() {
        for kind in NONLINEAR.iter().chain(&[GateType::Xor, GateType::Xnor]) {
            for (x, y) in [(false, false), (false, true), (true, false), (true, true)] {
                assert_eq!(kind.negate_first_input().apply(x, y), kind.apply(!x, y));
                assert_eq!(kind.negate_second_input().apply(x, y), kind.apply(x, !y));
            }
        }
    }

    #[test]
    fn test_scope_lattice() {
        use OutputScope::*;
        assert_eq!(Generator.intersect(Evaluator), Neither);
        assert_eq!(Generator.union(Evaluator), Both);
        assert_eq!(Both.intersect(Evaluator), Evaluator);
        assert_eq!(Neither.union(Generator), Generator);
        assert!(Both.contains(Generator));
        assert!(!Evaluator.contains(Generator));
        assert_eq!(OutputScope::new(true, false), Generator);
        for scope in OutputScope::ALL {
            assert_eq!(
                OutputScope::new(scope.is_known_to_generator(), scope.is_known_to_evaluator()),
                scope
            );
        }
    }

    #[rstest]
    #[case(GateType::And)]
    #[case(GateType::NotAnd)]
    #[case(GateType::AndNot)]
    #[case(GateType::Nor)]
    #[case(GateType::Nand)]
    #[case(GateType::OrNot)]
    #[case(GateType::NotOr)]
    #[case(GateType::Or)]
    fn test_decomposition_computes_gate(#[case] kind: GateType) {
        let gate = GateData::new(kind, OutputScope::Neither, &[2, 1]);
        let split = gate.decompose().unwrap();
        assert_eq!(split[4].kind(), GateType::Random);
        assert_eq!(split[4].scope(), OutputScope::Generator);
        assert_eq!(split[2].scope(), OutputScope::Evaluator);

        for i in 0..8 {
            let (a, b, r) = (i & 4 != 0, i & 2 != 0, i & 1 != 0);
            let s3 = split[3].kind().apply(a, r);
            let s2 = split[2].kind().apply(b, r);
            let s1 = split[1].kind().apply(a, s2);
            let s0 = split[0].kind().apply(s1, s3);
            assert_eq!(s0, kind.apply(a, b), "{:?}({}, {}) with r = {}", kind, a, b, r);
        }

        assert!(std::ptr::eq(split, gate.decompose().unwrap()));
    }

    #[test]
    fn test_linear_gates_do_not_decompose() {
        assert!(GateData::new(GateType::Xor, OutputScope::Both, &[1, 2])
            .decompose()
            .is_none());
        assert!(GateData::constant(true).decompose().is_none());
    }

    #[test]
    fn test_equality_ignores_memo() {
        let a = GateData::new(GateType::And, OutputScope::Neither, &[1, 2]);
        let b = a.clone();
        a.decompose();
        assert_eq!(a, b);
        assert_ne!(a, GateData::new(GateType::And, OutputScope::Both, &[1, 2]));
    }
}
