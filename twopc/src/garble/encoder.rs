//! Secrets the generator retains after garbling.

use super::delta::Delta;
use super::errors::GeneratorError;
use crypto_core::{BitVector, Block};

/// Encodes evaluator inputs into labels and decodes output labels.
///
/// Holds Δ and zero labels, so it must stay with the generator.
pub struct LabelEncoder {
    delta: Delta,
    /// Zero labels of the evaluator inputs, in `Program::input_indices` order.
    input_zero_labels: Vec<Block>,
    /// Zero labels of the declared outputs.
    output_zero_labels: Vec<Block>,
}

impl LabelEncoder {
    pub(crate) fn new(
        delta: Delta,
        input_zero_labels: Vec<Block>,
        output_zero_labels: Vec<Block>,
    ) -> Self {
        LabelEncoder {
            delta,
            input_zero_labels,
            output_zero_labels,
        }
    }

    #[inline]
    pub fn input_count(&self) -> usize {
        self.input_zero_labels.len()
    }

    #[inline]
    pub fn output_count(&self) -> usize {
        self.output_zero_labels.len()
    }

    /// Label of evaluator input `index` carrying `input`.
    pub fn garble_input(&self, input: bool, index: usize) -> Result<Block, GeneratorError> {
        let zero = self
            .input_zero_labels
            .get(index)
            .ok_or(GeneratorError::InputIndexOutOfRange {
                index,
                len: self.input_zero_labels.len(),
            })?;
        Ok(*zero ^ self.delta.times(input))
    }

    /// Labels of consecutive evaluator inputs starting at `start`.
    pub fn garble_inputs(&self, inputs: &[bool], start: usize) -> Result<Vec<Block>, GeneratorError> {
        inputs
            .iter()
            .enumerate()
            .map(|(i, &bit)| self.garble_input(bit, start + i))
            .collect()
    }

    /// Both labels of every evaluator input, as offered to an oblivious
    /// transfer.
    pub fn input_label_pairs(&self) -> Vec<[Block; 2]> {
        self.input_zero_labels
            .iter()
            .map(|&zero| [zero, zero ^ self.delta.block()])
            .collect()
    }

    /// Decode the label returned for output `index`.
    pub fn ungarble_output(&self, label: Block, index: usize) -> Result<bool, GeneratorError> {
        let zero = *self
            .output_zero_labels
            .get(index)
            .ok_or(GeneratorError::OutputIndexOutOfRange {
                index,
                len: self.output_zero_labels.len(),
            })?;
        if label == zero {
            Ok(false)
        } else if label == zero ^ self.delta.block() {
            Ok(true)
        } else {
            Err(GeneratorError::InvalidOutputLabel { index })
        }
    }

    pub fn ungarble_outputs(&self, labels: &[Block]) -> Result<BitVector, GeneratorError> {
        labels
            .iter()
            .enumerate()
            .map(|(i, &label)| self.ungarble_output(label, i))
            .collect()
    }
}

impl std::fmt::Debug for LabelEncoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LabelEncoder")
            .field("inputs", &self.input_zero_labels.len())
            .field("outputs", &self.output_zero_labels.len())
            .finish()
    }
}
