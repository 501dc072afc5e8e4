//! Constant propagation, algebraic rewriting and dead gate elimination.

use crate::errors::ProgramError;
use crate::gate::{GateData, GateType, OutputScope};
use crate::program::Program;
use std::collections::BinaryHeap;
use std::sync::Arc;
use tracing::debug;

/// Rewrite gates, then drop everything the outputs do not depend on.
pub fn simplify(program: &Program) -> Result<Program, ProgramError> {
    remove_unused_gates(&simplify_gates(program))
}

/// Rewrite every gate in place, left to right, so each rewrite sees its
/// already simplified inputs. Gate positions do not change.
pub fn simplify_gates(program: &Program) -> Program {
    let mut gates: Vec<Arc<GateData>> = program.raw_gates().to_vec();
    let mut rewritten = 0;
    for index in 0..gates.len() {
        let gate = simplify_gate(&gates, index);
        if gate != *gates[index] {
            gates[index] = Arc::new(gate);
            rewritten += 1;
        }
    }
    debug!(gates = gates.len(), rewritten, "simplified gates");
    Program::from_parts(gates, program.output_indices().to_vec())
}

fn constant_value(gate: &GateData) -> Option<bool> {
    match gate.kind() {
        GateType::True => Some(true),
        GateType::False => Some(false),
        _ => None,
    }
}

fn simplify_gate(gates: &[Arc<GateData>], index: usize) -> GateData {
    let mut gate = GateData::clone(&gates[index]);

    // Read through IDENTITY and NOT inputs, unless that would reveal less
    // than the unary gate does.
    for i in 0..gate.offsets().len() {
        let input_index = index - gate.offsets()[i] as usize;
        let input = &gates[input_index];
        if !input.kind().is_unary() {
            continue;
        }
        let source = &gates[input_index - input.offsets()[0] as usize];
        if !source.scope().contains(input.scope()) {
            continue;
        }
        if input.kind() == GateType::Not {
            let kind = if i == 0 {
                gate.kind().negate_first_input()
            } else {
                gate.kind().negate_second_input()
            };
            gate = gate.with_kind(kind);
        }
        gate = gate.shift_input(i, input.offsets()[0]);
    }

    if gate.offsets().len() == 2 && gate.offsets()[0] == gate.offsets()[1] {
        gate = merge_inputs(&gate);
    }

    let operand = |gate: &GateData, i: usize| {
        gate.offsets()
            .get(i)
            .and_then(|&offset| constant_value(&gates[index - offset as usize]))
    };
    // Every fold drops at least one input, so this runs at most twice.
    loop {
        let arity = gate.offsets().len();
        if let Some(value) = operand(&gate, 0) {
            gate = fold_first_input(&gate, value);
        } else if let Some(value) = operand(&gate, 1) {
            gate = fold_second_input(&gate, value);
        }
        if gate.offsets().len() == arity {
            break;
        }
    }

    // Rewritten inputs may reveal more than the originals did.
    let floor = gate.offsets().iter().fold(
        if gate.kind().is_source() {
            OutputScope::Neither
        } else {
            OutputScope::Both
        },
        |floor, &offset| floor.intersect(gates[index - offset as usize].scope()),
    );
    gate.with_scope(gate.scope().union(floor))
}

/// Rewrite `f(x, x)` as a unary gate or a constant.
fn merge_inputs(gate: &GateData) -> GateData {
    let kind = gate.kind();
    let negated = kind.is_output_negated();
    if kind.is_linear() || kind.is_first_input_negated() != kind.is_second_input_negated() {
        return GateData::constant(negated);
    }
    let unary = GateType::unary(kind.is_first_input_negated() != negated);
    GateData::new(unary, gate.scope(), &gate.offsets()[..1])
}

/// Fold a known first input. Binary gates become unary gates of their second
/// input or constants.
fn fold_first_input(gate: &GateData, value: bool) -> GateData {
    let kind = gate.kind();
    let negated = kind.is_output_negated();
    if kind.is_constant() || kind.is_source() {
        return gate.clone();
    }
    if kind.is_unary() {
        return GateData::constant(kind.apply_unary(value));
    }
    let other = &gate.offsets()[1..2];
    if kind.is_linear() {
        return GateData::new(GateType::unary(value ^ negated), gate.scope(), other);
    }
    if kind.is_nonlinear() {
        if value == kind.is_first_input_negated() {
            return GateData::constant(negated);
        }
        let unary = GateType::unary(kind.is_second_input_negated() ^ negated);
        return GateData::new(unary, gate.scope(), other);
    }
    gate.clone()
}

/// Fold a known second input.
fn fold_second_input(gate: &GateData, value: bool) -> GateData {
    let kind = gate.kind();
    let negated = kind.is_output_negated();
    if gate.offsets().len() < 2 {
        return gate.clone();
    }
    let other = &gate.offsets()[..1];
    if kind.is_linear() {
        return GateData::new(GateType::unary(value ^ negated), gate.scope(), other);
    }
    if kind.is_nonlinear() {
        if value == kind.is_second_input_negated() {
            return GateData::constant(negated);
        }
        let unary = GateType::unary(kind.is_first_input_negated() ^ negated);
        return GateData::new(unary, gate.scope(), other);
    }
    gate.clone()
}

/// A pending use of the gate at `start` by input `input` of the gate now
/// stored at `end`.
#[derive(PartialEq, Eq, PartialOrd, Ord)]
struct Wire {
    start: usize,
    end: usize,
    input: usize,
}

/// Drop every gate no declared output depends on and close the gaps.
///
/// Walks the program backwards with a queue of pending wires, moving live
/// gates towards the end and fixing their offsets as gaps open up. Unused
/// `INPUT` gates are dropped too, which changes the expected input length.
pub fn remove_unused_gates(program: &Program) -> Result<Program, ProgramError> {
    let len = program.len();
    let mut gates: Vec<GateData> = program
        .raw_gates()
        .iter()
        .map(|g| GateData::clone(g))
        .collect();
    let mut new_position = vec![0; len];
    let mut queue: BinaryHeap<Wire> = program
        .output_indices()
        .iter()
        .map(|&start| Wire {
            start,
            end: len,
            input: 0,
        })
        .collect();

    let mut removed = 0;
    for i in (0..len).rev() {
        if queue.peek().map_or(false, |w| w.start == i) {
            let mut gate = gates[i].clone();
            for j in 0..gate.offsets().len() {
                queue.push(Wire {
                    start: i - gate.offsets()[j] as usize,
                    end: i + removed,
                    input: j,
                });
                gate = gate.shift_input(j, removed as isize);
            }
            gates[i + removed] = gate;
            new_position[i] = i + removed;
        } else {
            removed += 1;
        }
        while let Some(wire) = queue.peek() {
            if wire.start != i {
                break;
            }
            if wire.end < len {
                let (end, input) = (wire.end, wire.input);
                gates[end] = gates[end].shift_input(input, -(removed as isize));
            }
            queue.pop();
        }
    }

    let mut builder = Program::builder();
    for gate in &gates[removed..] {
        builder.add(gate)?;
    }
    builder.output_indices(
        program
            .output_indices()
            .iter()
            .map(|&i| new_position[i] - removed),
    );
    let simplified = builder.build()?;
    debug!(
        before = len,
        after = simplified.len(),
        removed,
        "removed unused gates"
    );
    Ok(simplified)
}
