//! Garbled circuits and what crosses the wire between the parties.

use super::cipher::{AesHashCipher, GarbleCipher};
use super::errors::EvaluatorError;
use circuit::Program;
use crypto_core::{BitVector, Block};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Per-gate garbled payloads, indexed like the gates of the program.
///
/// A payload holds the 128-bit ciphertext rows of the gate in garbling order,
/// followed by the select bit of the gate's zero label when the gate's output
/// is known to the evaluator.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GarbledTables(Vec<BitVector>);

impl GarbledTables {
    pub fn new(payloads: Vec<BitVector>) -> Self {
        GarbledTables(payloads)
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    #[inline]
    pub fn payload(&self, index: usize) -> Option<&BitVector> {
        self.0.get(index)
    }

    pub fn payloads(&self) -> &[BitVector] {
        &self.0
    }

    /// Total size of all payloads in bits.
    pub fn bit_len(&self) -> usize {
        self.0.iter().map(BitVector::len).sum()
    }
}

/// A program together with its garbled tables and the cipher both parties
/// agreed on.
pub struct GarbledCircuit<C = AesHashCipher> {
    program: Arc<Program>,
    tables: GarbledTables,
    cipher: C,
}

impl<C: GarbleCipher> GarbledCircuit<C> {
    /// Assemble a garbled circuit, typically from tables received from the
    /// generator.
    pub fn new(
        program: Arc<Program>,
        tables: GarbledTables,
        cipher: C,
    ) -> Result<Self, EvaluatorError> {
        if tables.len() != program.len() {
            return Err(EvaluatorError::TableCountMismatch {
                expected: program.len(),
                actual: tables.len(),
            });
        }
        Ok(GarbledCircuit {
            program,
            tables,
            cipher,
        })
    }

    pub(crate) fn from_parts(program: Arc<Program>, tables: GarbledTables, cipher: C) -> Self {
        GarbledCircuit {
            program,
            tables,
            cipher,
        }
    }

    #[inline]
    pub fn program(&self) -> &Arc<Program> {
        &self.program
    }

    #[inline]
    pub fn tables(&self) -> &GarbledTables {
        &self.tables
    }

    #[inline]
    pub fn cipher(&self) -> &C {
        &self.cipher
    }

    pub fn into_tables(self) -> GarbledTables {
        self.tables
    }
}

impl<C> std::fmt::Debug for GarbledCircuit<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GarbledCircuit")
            .field("gates", &self.program.len())
            .field("bits", &self.tables.bit_len())
            .finish()
    }
}

/// What the evaluator learns from a run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EvaluationResult {
    /// Plaintext bits of the ungarbled outputs, in program order.
    pub ungarbled_outputs: BitVector,
    /// Labels of the declared outputs, in program order.
    pub outputs: Vec<Block>,
}
