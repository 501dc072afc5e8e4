//! Half-gates garbling of programs with output scopes.

use super::cipher::{AesHashCipher, GarbleCipher};
use super::delta::Delta;
use super::encoder::LabelEncoder;
use super::errors::GeneratorError;
use super::gc::{GarbledCircuit, GarbledTables};
use circuit::{Gate, GateType, Program};
use crypto_core::{BitVector, Block, BLOCK_LEN};
use rand::Rng;
use rand_core::RngCore;
use std::sync::Arc;
use tracing::{debug, trace};

/// Garbles one program for one evaluation.
///
/// `generate` consumes the generator, so the randomness sources are never
/// reused across circuits.
pub struct Generator<R, L, C = AesHashCipher> {
    program: Arc<Program>,
    delta: Delta,
    cipher: C,
    inputs: Vec<bool>,
    random: PushbackBits<R>,
    label_rng: L,
}

impl<R: RngCore, L: RngCore, C: GarbleCipher> Generator<R, L, C> {
    /// `inputs` holds one bit per `INPUT` gate known to the generator, in
    /// gate order. `random_rng` feeds `RANDOM` gates known to the generator,
    /// `label_rng` the zero labels of all other sources.
    pub fn new(
        program: Arc<Program>,
        delta: Delta,
        cipher: C,
        inputs: &[bool],
        random_rng: R,
        label_rng: L,
    ) -> Result<Self, GeneratorError> {
        let expected = program
            .gates()
            .filter(|g| g.kind() == GateType::Input && g.is_output_known_to_generator())
            .count();
        if inputs.len() != expected {
            return Err(GeneratorError::InputCountMismatch {
                expected,
                actual: inputs.len(),
            });
        }
        Ok(Generator {
            program,
            delta,
            cipher,
            inputs: inputs.to_vec(),
            random: PushbackBits::new(random_rng),
            label_rng,
        })
    }

    /// Garble every gate, returning the circuit for the evaluator and the
    /// encoder the generator keeps.
    pub fn generate(self) -> Result<(GarbledCircuit<C>, LabelEncoder), GeneratorError> {
        let Generator {
            program,
            delta,
            cipher,
            inputs,
            random,
            label_rng,
        } = self;

        let (tables, encoder) = {
            let mut garbler = Garbler {
                delta,
                cipher: &cipher,
                inputs,
                next_input: 0,
                random,
                label_rng,
                labels: vec![None; program.len()],
                bits: vec![None; program.len()],
                sub_labels: [None; 5],
                sub_bits: [None; 5],
                rows: 0,
            };

            let mut payloads = Vec::with_capacity(program.len());
            for gate in program.gates() {
                let mut payload = garbler.garble_gate(gate)?;
                if gate.is_output_known_to_evaluator() {
                    let zero = garbler.label(gate)?;
                    payload = payload.concat(&BitVector::singleton(zero.select_bit()))?;
                }
                payloads.push(payload);
            }

            let input_zero_labels = program
                .input_indices()
                .iter()
                .map(|&i| garbler.label(program.gate(i)))
                .collect::<Result<Vec<_>, _>>()?;
            let output_zero_labels = program
                .output_indices()
                .iter()
                .map(|&i| garbler.label(program.gate(i)))
                .collect::<Result<Vec<_>, _>>()?;

            debug!(
                gates = program.len(),
                rows = garbler.rows,
                inputs = input_zero_labels.len(),
                outputs = output_zero_labels.len(),
                "garbled program"
            );
            (
                GarbledTables::new(payloads),
                LabelEncoder::new(delta, input_zero_labels, output_zero_labels),
            )
        };

        Ok((GarbledCircuit::from_parts(program, tables, cipher), encoder))
    }
}

/// Random bits with a stack of bits to be replayed first.
struct PushbackBits<R> {
    rng: R,
    pushed: Vec<bool>,
}

impl<R: RngCore> PushbackBits<R> {
    fn new(rng: R) -> Self {
        PushbackBits {
            rng,
            pushed: Vec::new(),
        }
    }

    #[inline]
    fn next_bit(&mut self) -> bool {
        match self.pushed.pop() {
            Some(bit) => bit,
            None => self.rng.gen(),
        }
    }

    #[inline]
    fn push_back(&mut self, bit: bool) {
        self.pushed.push(bit);
    }
}

/// Working state of one `generate` call.
struct Garbler<'c, C, R, L> {
    delta: Delta,
    cipher: &'c C,
    inputs: Vec<bool>,
    next_input: usize,
    random: PushbackBits<R>,
    label_rng: L,
    /// Zero labels of physical gates.
    labels: Vec<Option<Block>>,
    /// Plaintext values of generator-known physical gates.
    bits: Vec<Option<bool>>,
    /// Zero labels and values of the decomposition being garbled.
    sub_labels: [Option<Block>; 5],
    sub_bits: [Option<bool>; 5],
    rows: usize,
}

impl<'c, C: GarbleCipher, R: RngCore, L: RngCore> Garbler<'c, C, R, L> {
    fn label(&self, gate: Gate<'_>) -> Result<Block, GeneratorError> {
        let label = if gate.sub_index() > 0 {
            self.sub_labels[gate.sub_index()]
        } else {
            self.labels[gate.index()]
        };
        label.ok_or(GeneratorError::UninitializedLabel(gate.index()))
    }

    fn bit(&self, gate: Gate<'_>) -> Option<bool> {
        if gate.sub_index() > 0 {
            self.sub_bits[gate.sub_index()]
        } else {
            self.bits[gate.index()]
        }
    }

    fn set(&mut self, gate: Gate<'_>, label: Block, bit: Option<bool>) {
        if gate.sub_index() > 0 {
            self.sub_labels[gate.sub_index()] = Some(label);
            self.sub_bits[gate.sub_index()] = bit;
        } else {
            self.labels[gate.index()] = Some(label);
            self.bits[gate.index()] = bit;
        }
    }

    /// The value of `gate` if it is declared known to the generator.
    fn known_bit(
        &self,
        gate: Gate<'_>,
        value: impl FnOnce() -> Option<bool>,
    ) -> Result<Option<bool>, GeneratorError> {
        if !gate.is_output_known_to_generator() {
            return Ok(None);
        }
        value()
            .map(Some)
            .ok_or(GeneratorError::UnderivableBit {
                index: gate.index(),
                sub_index: gate.sub_index(),
            })
    }

    #[inline]
    fn hash(&self, gate: Gate<'_>, key: Block) -> Block {
        self.cipher
            .hash(key, gate.index() as u64, gate.sub_index() as u64)
    }

    /// Garble `gate`, store its zero label and return its ciphertext rows.
    fn garble_gate(&mut self, gate: Gate<'_>) -> Result<BitVector, GeneratorError> {
        let kind = gate.kind();
        let negated = kind.is_output_negated();

        if kind.is_source() {
            self.garble_source(gate)?;
            return Ok(BitVector::empty());
        }
        if kind.is_constant() {
            self.set(gate, self.delta.times(negated), Some(negated));
            return Ok(BitVector::empty());
        }
        if kind.is_unary() {
            let x = gate.first_input();
            let label = self.label(x)? ^ self.delta.times(negated);
            let bit = self.known_bit(gate, || self.bit(x).map(|b| kind.apply_unary(b)))?;
            self.set(gate, label, bit);
            return Ok(BitVector::empty());
        }

        let (x, y) = (gate.first_input(), gate.second_input());
        let bit = self.known_bit(gate, || Some(kind.apply(self.bit(x)?, self.bit(y)?)))?;

        if kind.is_linear() {
            let label = self.label(x)? ^ self.label(y)? ^ self.delta.times(negated);
            self.set(gate, label, bit);
            return Ok(BitVector::empty());
        }

        if let (Some(bit), true) = (bit, gate.is_output_known_to_evaluator()) {
            trace!(index = gate.index(), sub_index = gate.sub_index(), "public and gate");
            self.set(gate, self.delta.times(bit), Some(bit));
            return Ok(BitVector::empty());
        }

        let (label, payload) = if x.is_output_known_to_generator() || y.is_output_known_to_generator()
        {
            self.garble_generator_half(gate)?
        } else if x.is_output_known_to_evaluator() || y.is_output_known_to_evaluator() {
            self.garble_evaluator_half(gate)?
        } else {
            return self.garble_decomposed(gate);
        };
        self.rows += 1;
        self.set(gate, label, bit);
        Ok(payload)
    }

    fn garble_source(&mut self, gate: Gate<'_>) -> Result<(), GeneratorError> {
        if !gate.is_output_known_to_generator() {
            let label = self.label_rng.gen::<Block>();
            self.set(gate, label, None);
            return Ok(());
        }
        let bit = match gate.kind() {
            GateType::Input => {
                let bit = *self.inputs.get(self.next_input).ok_or(
                    GeneratorError::InputCountMismatch {
                        expected: self.next_input + 1,
                        actual: self.inputs.len(),
                    },
                )?;
                self.next_input += 1;
                bit
            }
            _ => self.random.next_bit(),
        };
        self.set(gate, self.delta.times(bit), Some(bit));
        Ok(())
    }

    /// One row, conditioned on an operand whose value the generator knows.
    fn garble_generator_half(
        &mut self,
        gate: Gate<'_>,
    ) -> Result<(Block, BitVector), GeneratorError> {
        let kind = gate.kind();
        let (x, y) = (gate.first_input(), gate.second_input());
        let on_first = x.is_output_known_to_generator();
        let (known, other) = if on_first { (x, y) } else { (y, x) };

        let value = self.bit(known).ok_or(GeneratorError::UnderivableBit {
            index: known.index(),
            sub_index: known.sub_index(),
        })?;
        let apply = |v: bool| {
            if on_first {
                kind.apply(value, v)
            } else {
                kind.apply(v, value)
            }
        };
        let (z0, z1) = (apply(false), apply(true));

        let key0 = self.label(other)?;
        let key1 = key0 ^ self.delta.block();
        let delta = self.delta;
        let (label, ciphertext) = if key0.select_bit() {
            let plaintext = self.hash(gate, key0) ^ delta.times(z0 ^ z1);
            (plaintext ^ delta.times(z1), plaintext ^ self.hash(gate, key1))
        } else {
            let plaintext = self.hash(gate, key1) ^ delta.times(z0 ^ z1);
            (plaintext ^ delta.times(z0), plaintext ^ self.hash(gate, key0))
        };
        Ok((label, BitVector::from(ciphertext)))
    }

    /// One row, conditioned on an operand whose value the evaluator knows.
    /// The output gets a fresh zero label.
    fn garble_evaluator_half(
        &mut self,
        gate: Gate<'_>,
    ) -> Result<(Block, BitVector), GeneratorError> {
        let kind = gate.kind();
        let (x, y) = (gate.first_input(), gate.second_input());
        let on_first = x.is_output_known_to_evaluator();
        let (cond, other, cond_negated, other_negated) = if on_first {
            (x, y, kind.is_first_input_negated(), kind.is_second_input_negated())
        } else {
            (y, x, kind.is_second_input_negated(), kind.is_first_input_negated())
        };

        // Label of `cond` when the conjunct it feeds is zero.
        let key_zero = self.label(cond)? ^ self.delta.times(cond_negated);
        let key_one = key_zero ^ self.delta.block();

        let pad = self.hash(gate, key_zero);
        let label = pad ^ self.delta.times(kind.is_output_negated());
        let plaintext = pad ^ self.label(other)? ^ self.delta.times(other_negated);
        let ciphertext = self.cipher.encrypt(
            key_one,
            plaintext,
            gate.index() as u64,
            gate.sub_index() as u64,
        );
        Ok((label, BitVector::from(ciphertext)))
    }

    /// Garble an AND-family gate on two unknown operands through its
    /// five-gate decomposition.
    fn garble_decomposed(&mut self, gate: Gate<'_>) -> Result<BitVector, GeneratorError> {
        let sub_gates = gate
            .sub_gates()
            .ok_or(GeneratorError::UninitializedLabel(gate.index()))?;

        // The random sub-source masks the second operand.
        let mask = self.label(gate.second_input())?.select_bit();
        self.random.push_back(mask);

        let mut payload = BitVector::empty();
        for sub_gate in sub_gates {
            payload = payload.concat(&self.garble_gate(sub_gate)?)?;
        }
        trace!(
            index = gate.index(),
            bits = payload.len(),
            "garbled decomposed gate"
        );
        debug_assert_eq!(payload.len(), 2 * BLOCK_LEN * 8);
        Ok(payload)
    }
}
