use std::sync::Arc;

use circuit::{simplify, BooleanFunction, OutputScope, ProgramConverter};
use crypto_core::{AesRng, Block};
use structopt::StructOpt;
use tracing_subscriber::EnvFilter;
use twopc::{AesHashCipher, Delta, GarbledCircuit, GarbledTables, Generator};

#[derive(StructOpt, Debug)]
struct Opt {
    /// The generator's summand.
    #[structopt(short, long, default_value = "12")]
    a: u64,
    /// The evaluator's summand.
    #[structopt(short, long, default_value = "9")]
    b: u64,
    #[structopt(short, long, default_value = "8")]
    width: usize,
    /// Reveal the sum to the evaluator as well.
    #[structopt(short, long)]
    reveal: bool,
}

fn to_bits(x: u64, width: usize) -> Vec<bool> {
    (0..width).rev().map(|i| (x >> i) & 1 != 0).collect()
}

fn from_bits(bits: impl IntoIterator<Item = bool>) -> u64 {
    bits.into_iter().fold(0, |acc, b| (acc << 1) | b as u64)
}

// cargo run --example adder -- -a 200 -b 55 --reveal
// RUST_LOG=debug shows gate and row counts.
fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();
    let opt = Opt::from_args();
    anyhow::ensure!(opt.width > 0 && opt.width <= 64, "width must be in 1..=64");

    // Inputs `a` are the generator's, outputs optionally revealed.
    let width = opt.width;
    let outputs_start = 3 * width - 1;
    let program = ProgramConverter::new()
        .output_scope_fn(|i| {
            if i < width {
                OutputScope::Generator
            } else if opt.reveal && i >= outputs_start {
                OutputScope::Evaluator
            } else {
                OutputScope::Neither
            }
        })
        .build_program(&BooleanFunction::adder(width))?;
    let program = Arc::new(simplify(&program)?);
    println!(
        "{} gates, {} non-linear",
        program.len(),
        program.nonlinear_count()
    );

    // Generator side.
    let mut rng = AesRng::new();
    let delta = Delta::random(&mut rng);
    let generator = Generator::new(
        program.clone(),
        delta,
        AesHashCipher::default(),
        &to_bits(opt.a, width),
        AesRng::new(),
        AesRng::new(),
    )?;
    let (gc, encoder) = generator.generate()?;
    let bytes = bincode::serialize(gc.tables())?;
    println!("garbled tables: {} bytes", bytes.len());

    // Stands in for the oblivious transfer of the evaluator's input labels.
    let labels = encoder.garble_inputs(&to_bits(opt.b, width), 0)?;

    // Evaluator side.
    let tables: GarbledTables = bincode::deserialize(&bytes)?;
    let received = GarbledCircuit::new(program, tables, AesHashCipher::new(Block::ZERO))?;
    let result = received.run(&labels)?;
    if !result.ungarbled_outputs.is_empty() {
        println!(
            "evaluator learns {}",
            from_bits(result.ungarbled_outputs.iter())
        );
    }

    let sum = from_bits(encoder.ungarble_outputs(&result.outputs)?.iter());
    println!("{} + {} = {} (mod 2^{})", opt.a, opt.b, sum, width);
    Ok(())
}
