use super::cipher::GarbleCipher;
use super::errors::EvaluatorError;
use super::gc::{EvaluationResult, GarbledCircuit};
use circuit::Gate;
use crypto_core::{BitVector, Block};
use tracing::debug;

const ROW_BITS: usize = 128;

impl<C: GarbleCipher> GarbledCircuit<C> {
    /// Evaluate on one label per evaluator input, in `Program::input_indices`
    /// order.
    pub fn run(&self, inputs: &[Block]) -> Result<EvaluationResult, EvaluatorError> {
        let program = self.program();
        let input_indices = program.input_indices();
        if inputs.len() != input_indices.len() {
            return Err(EvaluatorError::InputCountMismatch {
                expected: input_indices.len(),
                actual: inputs.len(),
            });
        }

        let mut ev = Evaluation {
            cipher: self.cipher(),
            inputs,
            input_indices,
            labels: vec![None; program.len()],
            bits: vec![None; program.len()],
            sub_labels: [None; 5],
            sub_bits: [None; 5],
            payload: BitVector::empty(),
        };

        for gate in program.gates() {
            let index = gate.index();
            ev.payload = self
                .tables()
                .payload(index)
                .cloned()
                .ok_or(EvaluatorError::TruncatedPayload(index))?;
            let label = ev.evaluate_gate(gate)?;
            if gate.is_output_known_to_evaluator() {
                let mask = ev.take_bit(index)?;
                ev.bits[index] = Some(label.select_bit() ^ mask);
            }
        }

        let ungarbled_outputs = program
            .ungarbled_output_indices()
            .iter()
            .map(|&i| ev.bits[i].ok_or(EvaluatorError::UnknownBit(i)))
            .collect::<Result<BitVector, _>>()?;
        let outputs = program
            .output_indices()
            .iter()
            .map(|&i| ev.labels[i].ok_or(EvaluatorError::UninitializedLabel(i)))
            .collect::<Result<Vec<_>, _>>()?;

        debug!(
            gates = program.len(),
            outputs = outputs.len(),
            ungarbled = ungarbled_outputs.len(),
            "evaluated garbled program"
        );
        Ok(EvaluationResult {
            ungarbled_outputs,
            outputs,
        })
    }
}

/// Working state of one `run` call.
struct Evaluation<'a, C> {
    cipher: &'a C,
    inputs: &'a [Block],
    input_indices: &'a [usize],
    labels: Vec<Option<Block>>,
    /// Plaintext values of evaluator-known gates.
    bits: Vec<Option<bool>>,
    sub_labels: [Option<Block>; 5],
    sub_bits: [Option<bool>; 5],
    /// Unread part of the current gate's payload.
    payload: BitVector,
}

impl<'a, C: GarbleCipher> Evaluation<'a, C> {
    fn label(&self, gate: Gate<'_>) -> Result<Block, EvaluatorError> {
        let label = if gate.sub_index() > 0 {
            self.sub_labels[gate.sub_index()]
        } else {
            self.labels[gate.index()]
        };
        label.ok_or(EvaluatorError::UninitializedLabel(gate.index()))
    }

    fn bit(&self, gate: Gate<'_>) -> Result<bool, EvaluatorError> {
        let bit = if gate.sub_index() > 0 {
            self.sub_bits[gate.sub_index()]
        } else {
            self.bits[gate.index()]
        };
        bit.ok_or(EvaluatorError::UnknownBit(gate.index()))
    }

    fn set_label(&mut self, gate: Gate<'_>, label: Block) {
        if gate.sub_index() > 0 {
            self.sub_labels[gate.sub_index()] = Some(label);
        } else {
            self.labels[gate.index()] = Some(label);
        }
    }

    fn take_row(&mut self, index: usize) -> Result<Block, EvaluatorError> {
        if self.payload.len() < ROW_BITS {
            return Err(EvaluatorError::TruncatedPayload(index));
        }
        let row = self.payload.slice(..ROW_BITS).to_block()?;
        self.payload = self.payload.slice(ROW_BITS..);
        Ok(row)
    }

    fn take_bit(&mut self, index: usize) -> Result<bool, EvaluatorError> {
        let bit = self
            .payload
            .get(0)
            .ok_or(EvaluatorError::TruncatedPayload(index))?;
        self.payload = self.payload.slice(1..);
        Ok(bit)
    }

    #[inline]
    fn hash(&self, gate: Gate<'_>, key: Block) -> Block {
        self.cipher
            .hash(key, gate.index() as u64, gate.sub_index() as u64)
    }

    fn input_label(&self, gate: Gate<'_>) -> Result<Block, EvaluatorError> {
        let position = self
            .input_indices
            .binary_search(&gate.index())
            .map_err(|_| EvaluatorError::MissingInputLabel(gate.index()))?;
        Ok(self.inputs[position])
    }

    fn evaluate_gate(&mut self, gate: Gate<'_>) -> Result<Block, EvaluatorError> {
        let kind = gate.kind();
        let label = if kind.is_source() || kind.is_constant() {
            if gate.is_output_known_to_generator() {
                Block::ZERO
            } else {
                self.input_label(gate)?
            }
        } else if kind.is_unary() {
            self.label(gate.first_input())?
        } else if kind.is_linear() {
            self.label(gate.first_input())? ^ self.label(gate.second_input())?
        } else {
            let (x, y) = (gate.first_input(), gate.second_input());
            if gate.is_output_known_to_generator() && gate.is_output_known_to_evaluator() {
                Block::ZERO
            } else if x.is_output_known_to_generator() || y.is_output_known_to_generator() {
                let other = if x.is_output_known_to_generator() { y } else { x };
                let key = self.label(other)?;
                let row = self.take_row(gate.index())?;
                if key.select_bit() {
                    self.hash(gate, key)
                } else {
                    row ^ self.hash(gate, key)
                }
            } else if x.is_output_known_to_evaluator() || y.is_output_known_to_evaluator() {
                let (cond, other, cond_negated) = if x.is_output_known_to_evaluator() {
                    (x, y, kind.is_first_input_negated())
                } else {
                    (y, x, kind.is_second_input_negated())
                };
                let key = self.label(cond)?;
                let row = self.take_row(gate.index())?;
                if self.bit(cond)? == cond_negated {
                    self.hash(gate, key)
                } else {
                    self.cipher.decrypt(
                        key,
                        row,
                        gate.index() as u64,
                        gate.sub_index() as u64,
                    ) ^ self.label(other)?
                }
            } else {
                self.evaluate_decomposed(gate)?
            }
        };
        self.set_label(gate, label);
        Ok(label)
    }

    fn evaluate_decomposed(&mut self, gate: Gate<'_>) -> Result<Block, EvaluatorError> {
        let sub_gates = gate
            .sub_gates()
            .ok_or(EvaluatorError::UninitializedLabel(gate.index()))?;
        // Sub-gate 2 is the second operand masked by the generator's random
        // bit, which is the select bit of its zero label.
        self.sub_bits[2] = Some(self.label(gate.second_input())?.select_bit());

        let mut label = Block::ZERO;
        for sub_gate in sub_gates {
            label = self.evaluate_gate(sub_gate)?;
        }
        Ok(label)
    }
}
