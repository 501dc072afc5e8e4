pub mod cipher;
pub mod delta;
pub mod encoder;
pub mod errors;
pub mod evaluator;
pub mod gc;
pub mod generator;

pub use cipher::*;
pub use delta::*;
pub use encoder::*;
pub use errors::*;
pub use gc::*;
pub use generator::*;

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use circuit::{
        library::ripple_carry_adder, simplify, BooleanFunction, GateType, OutputScope, Program,
        ProgramConverter,
    };
    use crypto_core::{AesRng, BitVector, Block};
    use rand::{Rng, SeedableRng};
    use rstest::rstest;

    use crate::{
        AesHashCipher, Delta, EvaluationResult, EvaluatorError, GarbledCircuit, GarbledTables,
        Generator, GeneratorError, LabelEncoder,
    };

    fn to_bits(x: u64, width: usize) -> Vec<bool> {
        (0..width).rev().map(|i| (x >> i) & 1 != 0).collect()
    }

    fn seeded(seed: u128) -> AesRng {
        AesRng::from_seed(Block::from(seed))
    }

    fn garble(
        program: &Arc<Program>,
        generator_inputs: &[bool],
        seed: u128,
    ) -> (GarbledCircuit, LabelEncoder) {
        let delta = Delta::random(&mut seeded(seed));
        Generator::new(
            program.clone(),
            delta,
            AesHashCipher::default(),
            generator_inputs,
            seeded(seed + 1),
            seeded(seed + 2),
        )
        .unwrap()
        .generate()
        .unwrap()
    }

    /// Garble, evaluate and decode every declared output.
    fn run(
        program: &Arc<Program>,
        generator_inputs: &[bool],
        evaluator_inputs: &[bool],
        seed: u128,
    ) -> (EvaluationResult, Vec<bool>) {
        let (gc, encoder) = garble(program, generator_inputs, seed);
        let labels = encoder.garble_inputs(evaluator_inputs, 0).unwrap();
        let result = gc.run(&labels).unwrap();
        let outputs = encoder.ungarble_outputs(&result.outputs).unwrap().to_vec();
        (result, outputs)
    }

    fn binary_program(kind: GateType, x: OutputScope, y: OutputScope, out: OutputScope) -> Program {
        let mut builder = Program::builder();
        builder.add_gate(GateType::Input, x, &[]).unwrap();
        builder.add_gate(GateType::Input, y, &[]).unwrap();
        builder.add_gate(kind, out, &[2, 1]).unwrap();
        builder.output_indices([2]);
        builder.build().unwrap()
    }

    #[test]
    fn test_and_true_false() {
        let program = Arc::new(binary_program(
            GateType::And,
            OutputScope::Neither,
            OutputScope::Neither,
            OutputScope::Neither,
        ));
        let (result, outputs) = run(&program, &[], &[true, false], 0);
        assert_eq!(outputs, vec![false]);
        assert!(result.ungarbled_outputs.is_empty());
    }

    #[test]
    fn test_adder() {
        let program = Arc::new(ripple_carry_adder(8).unwrap());
        let inputs = [to_bits(12, 8), to_bits(9, 8)].concat();
        let (_, outputs) = run(&program, &[], &inputs, 7);
        assert_eq!(outputs, to_bits(21, 8));

        let inputs = [to_bits(255, 8), to_bits(3, 8)].concat();
        let (_, outputs) = run(&program, &[], &inputs, 8);
        assert_eq!(outputs, to_bits(2, 8));
    }

    #[rstest]
    fn test_binary_gates(
        #[values(
            GateType::Xor,
            GateType::Xnor,
            GateType::And,
            GateType::NotAnd,
            GateType::AndNot,
            GateType::Nor,
            GateType::Nand,
            GateType::OrNot,
            GateType::NotOr,
            GateType::Or
        )]
        kind: GateType,
        #[values(
            OutputScope::Neither,
            OutputScope::Generator,
            OutputScope::Evaluator,
            OutputScope::Both
        )]
        x_scope: OutputScope,
        #[values(
            OutputScope::Neither,
            OutputScope::Generator,
            OutputScope::Evaluator,
            OutputScope::Both
        )]
        y_scope: OutputScope,
        #[values(OutputScope::Neither, OutputScope::Evaluator)] requested: OutputScope,
    ) {
        let program = Arc::new(binary_program(kind, x_scope, y_scope, requested));
        let scope = program.gate(2).scope();

        for (seed, (x, y)) in [(false, false), (false, true), (true, false), (true, true)]
            .into_iter()
            .enumerate()
        {
            let mut generator_inputs = vec![];
            let mut evaluator_inputs = vec![];
            for (bit, s) in [(x, x_scope), (y, y_scope)] {
                if s.is_known_to_generator() {
                    generator_inputs.push(bit);
                } else {
                    evaluator_inputs.push(bit);
                }
            }

            let (result, outputs) =
                run(&program, &generator_inputs, &evaluator_inputs, seed as u128 * 3);
            let expected = kind.apply(x, y);
            assert_eq!(outputs, vec![expected], "{:?}({}, {}) in {:?}", kind, x, y, scope);
            if scope.is_known_to_evaluator() {
                assert_eq!(result.ungarbled_outputs.to_vec(), vec![expected]);
            } else {
                assert!(result.ungarbled_outputs.is_empty());
            }
        }
    }

    #[test]
    fn test_free_xor_offset() {
        let program = Arc::new(ripple_carry_adder(4).unwrap());
        let (_, encoder) = garble(&program, &[], 11);
        let pairs = encoder.input_label_pairs();
        assert_eq!(pairs.len(), 8);

        let delta = pairs[0][0] ^ pairs[0][1];
        assert!(delta.select_bit());
        for [zero, one] in &pairs {
            assert_eq!(*zero ^ *one, delta);
            assert_ne!(zero.select_bit(), one.select_bit());
        }
        assert_eq!(encoder.garble_input(true, 3).unwrap(), pairs[3][1]);
        assert_eq!(encoder.garble_input(false, 3).unwrap(), pairs[3][0]);
    }

    #[test]
    fn test_free_xor_offset_on_internal_wires() {
        use GateType::*;
        let mut builder = Program::builder();
        let neither = OutputScope::Neither;
        builder.add_gate(Input, neither, &[]).unwrap(); // 0: a
        builder.add_gate(Input, neither, &[]).unwrap(); // 1: b
        builder.add_gate(Identity, neither, &[2]).unwrap(); // 2: a
        builder.add_gate(Not, neither, &[2]).unwrap(); // 3: !b
        builder.add_gate(Xor, neither, &[4, 3]).unwrap(); // 4: a ^ b
        builder.add_gate(Xnor, neither, &[3, 2]).unwrap(); // 5: a == !b
        builder.add_gate(And, neither, &[6, 5]).unwrap(); // 6: a & b
        builder.add_gate(Or, neither, &[4, 3]).unwrap(); // 7: !b | (a ^ b)
        builder.add_gate(Nand, neither, &[3, 2]).unwrap(); // 8: !(xnor & and)
        builder.output_indices(0..9);
        let program = Arc::new(builder.build().unwrap());

        let (gc, encoder) = garble(&program, &[], 13);
        for index in 6..9 {
            assert_eq!(gc.tables().payload(index).unwrap().len(), 256);
        }
        let pairs = encoder.input_label_pairs();
        let delta = pairs[0][0] ^ pairs[0][1];

        for x in 0..4u64 {
            let inputs = to_bits(x, 2);
            let expected = program.eval_gates(&inputs).unwrap();
            let labels = encoder.garble_inputs(&inputs, 0).unwrap();
            let result = gc.run(&labels).unwrap();
            for (i, &label) in result.outputs.iter().enumerate() {
                assert_eq!(encoder.ungarble_output(label, i).unwrap(), expected[i]);
                assert_eq!(encoder.ungarble_output(label ^ delta, i).unwrap(), !expected[i]);
            }
        }
    }

    #[test]
    fn test_payload_sizes() {
        use OutputScope::{Evaluator, Neither};
        let mut builder = Program::builder();
        builder.add_gate(GateType::Input, OutputScope::Generator, &[]).unwrap(); // 0
        builder.add_gate(GateType::Input, Neither, &[]).unwrap(); // 1
        builder.add_gate(GateType::Input, Evaluator, &[]).unwrap(); // 2
        builder.add_gate(GateType::And, Neither, &[3, 2]).unwrap(); // 3: generator half
        builder.add_gate(GateType::And, Neither, &[3, 2]).unwrap(); // 4: evaluator half
        builder.add_gate(GateType::And, Neither, &[2, 1]).unwrap(); // 5: decomposed
        builder.add_gate(GateType::Xor, Evaluator, &[1, 2]).unwrap(); // 6: free, revealed
        builder.output_indices([5, 6]);
        let program = Arc::new(builder.build().unwrap());

        let (gc, _) = garble(&program, &[true], 5);
        let sizes: Vec<usize> = gc.tables().payloads().iter().map(BitVector::len).collect();
        assert_eq!(sizes, vec![0, 0, 1, 128, 128, 256, 1]);
        assert_eq!(program.ungarbled_output_indices(), &[6]);
    }

    #[test]
    fn test_scope_soundness() {
        use OutputScope::{Evaluator, Neither};
        let mut builder = Program::builder();
        builder.add_gate(GateType::Input, Neither, &[]).unwrap();
        builder.add_gate(GateType::Input, Neither, &[]).unwrap();
        builder.add_gate(GateType::And, Neither, &[2, 1]).unwrap();
        builder.add_gate(GateType::Or, Evaluator, &[3, 2]).unwrap();
        builder.output_indices([2, 3]);
        let program = Arc::new(builder.build().unwrap());

        for i in 0..4 {
            let inputs = [i & 2 != 0, i & 1 != 0];
            let (result, outputs) = run(&program, &[], &inputs, i as u128);
            let (and, or) = (inputs[0] & inputs[1], inputs[0] | inputs[1]);
            assert_eq!(outputs, vec![and, or]);
            // Only the gate declared evaluator-known is revealed.
            assert_eq!(result.ungarbled_outputs.to_vec(), vec![or]);
        }
    }

    #[test]
    fn test_random_sources() {
        use OutputScope::Neither;
        let mut builder = Program::builder();
        builder.add_gate(GateType::Random, OutputScope::Generator, &[]).unwrap();
        builder.add_gate(GateType::Input, Neither, &[]).unwrap();
        builder.add_gate(GateType::Xor, Neither, &[2, 1]).unwrap();
        builder.output_indices([2]);
        let program = Arc::new(builder.build().unwrap());

        let seed = 21;
        // The random source draws the first bit of the random stream.
        let random = seeded(seed + 1).gen::<bool>();
        let (_, outputs) = run(&program, &[], &[true], seed);
        assert_eq!(outputs, vec![random ^ true]);

        let mut builder = Program::builder();
        builder.add_gate(GateType::Random, Neither, &[]).unwrap();
        builder.output_indices([0]);
        let program = Arc::new(builder.build().unwrap());
        let (gc, _) = garble(&program, &[], seed);
        assert_eq!(gc.run(&[]), Err(EvaluatorError::MissingInputLabel(0)));
    }

    #[test]
    fn test_compiled_and_simplified() {
        let compiled = ProgramConverter::new()
            .build_program(&BooleanFunction::adder(4))
            .unwrap();
        let program = Arc::new(simplify(&compiled).unwrap());
        for (a, b) in [(5u64, 9u64), (15, 15), (0, 7)] {
            let inputs = [to_bits(a, 4), to_bits(b, 4)].concat();
            let (_, outputs) = run(&program, &[], &inputs, (a * 16 + b) as u128);
            assert_eq!(outputs, to_bits((a + b) % 16, 4));
        }
    }

    #[test]
    fn test_generator_inputs() {
        let compiled = ProgramConverter::new()
            .output_scope_fn(|i| {
                if i < 4 {
                    OutputScope::Generator
                } else {
                    OutputScope::Neither
                }
            })
            .build_program(&BooleanFunction::adder(4))
            .unwrap();
        let program = Arc::new(compiled);
        assert_eq!(program.input_indices().len(), 4);

        let (_, outputs) = run(&program, &to_bits(6, 4), &to_bits(7, 4), 3);
        assert_eq!(outputs, to_bits(13, 4));
    }

    #[test]
    fn test_tables_transfer() {
        let program = Arc::new(ripple_carry_adder(8).unwrap());
        let (gc, encoder) = garble(&program, &[], 13);
        let labels = encoder
            .garble_inputs(&[to_bits(100, 8), to_bits(55, 8)].concat(), 0)
            .unwrap();
        let expected = gc.run(&labels).unwrap();

        let bytes = bincode::serialize(gc.tables()).unwrap();
        let tables: GarbledTables = bincode::deserialize(&bytes).unwrap();
        assert_eq!(&tables, gc.tables());

        let received = GarbledCircuit::new(program.clone(), tables, AesHashCipher::default()).unwrap();
        let result = received.run(&labels).unwrap();
        assert_eq!(result, expected);
        assert_eq!(
            encoder.ungarble_outputs(&result.outputs).unwrap().to_vec(),
            to_bits(155, 8)
        );
    }

    #[test]
    fn test_decode_errors() {
        let program = Arc::new(ripple_carry_adder(2).unwrap());
        let (gc, encoder) = garble(&program, &[], 17);
        let labels = encoder.garble_inputs(&[true, false, true, true], 0).unwrap();
        let result = gc.run(&labels).unwrap();

        let mut forged = result.outputs.clone();
        forged[1] = forged[1] ^ Block::from(1u128);
        assert_eq!(
            encoder.ungarble_outputs(&forged),
            Err(GeneratorError::InvalidOutputLabel { index: 1 })
        );
        assert_eq!(
            encoder.ungarble_output(result.outputs[0], 2),
            Err(GeneratorError::OutputIndexOutOfRange { index: 2, len: 2 })
        );
        assert_eq!(
            encoder.garble_inputs(&[true, true], 3),
            Err(GeneratorError::InputIndexOutOfRange { index: 4, len: 4 })
        );
    }

    #[test]
    fn test_configuration_errors() {
        use OutputScope::Neither;
        let program = Arc::new(binary_program(
            GateType::And,
            Neither,
            Neither,
            OutputScope::Generator,
        ));
        let delta = Delta::random(&mut seeded(0));

        let generator = Generator::new(
            program.clone(),
            delta,
            AesHashCipher::default(),
            &[],
            seeded(1),
            seeded(2),
        )
        .unwrap();
        assert_eq!(
            generator.generate().err(),
            Some(GeneratorError::UnderivableBit {
                index: 2,
                sub_index: 0
            })
        );

        let result = Generator::new(
            program.clone(),
            delta,
            AesHashCipher::default(),
            &[true],
            seeded(1),
            seeded(2),
        );
        assert_eq!(
            result.err(),
            Some(GeneratorError::InputCountMismatch {
                expected: 0,
                actual: 1
            })
        );
    }

    #[test]
    fn test_evaluator_errors() {
        use OutputScope::Neither;
        let program = Arc::new(binary_program(GateType::And, Neither, Neither, Neither));
        let (gc, encoder) = garble(&program, &[], 19);

        assert_eq!(
            gc.run(&[Block::ZERO]),
            Err(EvaluatorError::InputCountMismatch {
                expected: 2,
                actual: 1
            })
        );
        assert_eq!(
            GarbledCircuit::new(program.clone(), GarbledTables::default(), AesHashCipher::default())
                .unwrap_err(),
            EvaluatorError::TableCountMismatch {
                expected: 3,
                actual: 0
            }
        );

        let truncated = GarbledTables::new(vec![BitVector::empty(); 3]);
        let gc = GarbledCircuit::new(program, truncated, AesHashCipher::default()).unwrap();
        let labels = encoder.garble_inputs(&[true, true], 0).unwrap();
        assert_eq!(gc.run(&labels), Err(EvaluatorError::TruncatedPayload(2)));
    }
}
