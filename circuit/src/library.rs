//! Hand-built reference programs.

use crate::errors::ProgramError;
use crate::gate::{GateType, OutputScope};
use crate::program::Program;

/// Ripple-carry adder for two `width`-bit numbers modulo `2^width`.
///
/// Inputs are `a` then `b`, each most significant bit first. Outputs are the
/// sum bits, most significant bit first. Every bit costs one AND gate.
pub fn ripple_carry_adder(width: usize) -> Result<Program, ProgramError> {
    use GateType::*;
    use OutputScope::*;

    let mut builder = Program::builder();
    for _ in 0..width * 2 {
        builder.add_gate(Input, Neither, &[])?;
    }
    // Carry into bit 0.
    builder.add_gate(False, Both, &[])?;
    for i in 0..width {
        builder.add_gate(Identity, Neither, &[2 + width + i * 8])?; // a_i
        builder.add_gate(Identity, Neither, &[3 + i * 8])?; // b_i
        builder.add_gate(Xor, Neither, &[3, 2])?; // c_i ^ a_i
        builder.add_gate(Xor, Neither, &[4, 2])?; // c_i ^ b_i
        builder.add_gate(Xor, Neither, &[2, 3])?; // c_i ^ a_i ^ b_i
        builder.add_gate(And, Neither, &[3, 2])?;
        builder.add_gate(Xor, Neither, &[7, 1])?; // c_(i+1) = maj(a_i, b_i, c_i)
    }
    builder.output_indices((0..width).map(|i| width * 9 - i * 7 - 2));
    builder.build()
}
