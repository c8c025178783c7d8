//! `nockvm-cli`: hex in, decode, evaluate, hex (or surface notation) out.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use nockvm::entropy::{OsEntropy, SeededEntropy};
use nockvm::memo::MemoCaches;
use nockvm::{decode, encode, nock, surface, Arena};

#[derive(Parser)]
#[command(name = "nockvm-cli", about = "Evaluate and inspect nouns")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Decode a hex-encoded noun and print it.
    Show {
        /// Hex-encoded wire bytes of the noun.
        input: String,
        /// Print bracketed surface notation instead of re-encoded hex.
        #[arg(long)]
        surface: bool,
    },
    /// Decode a hex-encoded `[subject formula]` cell and evaluate it.
    Eval {
        /// Hex-encoded wire bytes of the `[subject formula]` cell.
        input: String,
        /// Print bracketed surface notation instead of re-encoded hex.
        #[arg(long)]
        surface: bool,
        /// Seed a deterministic entropy source instead of the OS one, for
        /// reproducible runs of formulas using opcode 15.
        #[arg(long)]
        seed: Option<u64>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    match cli.command {
        Command::Show { input, surface } => show(&input, surface),
        Command::Eval {
            input,
            surface,
            seed,
        } => eval_cmd(&input, surface, seed),
    }
}

fn show(input: &str, surface: bool) -> Result<()> {
    let bytes = hex::decode(input).context("input is not valid hex")?;
    let mut arena = Arena::new();
    let root = decode(&mut arena, &bytes).context("malformed noun")?;
    print_noun(&arena, root, surface);
    Ok(())
}

fn eval_cmd(input: &str, surface: bool, seed: Option<u64>) -> Result<()> {
    let bytes = hex::decode(input).context("input is not valid hex")?;
    let mut arena = Arena::new();
    let root = decode(&mut arena, &bytes).context("malformed noun")?;

    let (subject, formula) = {
        if !arena.is_cell(root) {
            anyhow::bail!("input must decode to a [subject formula] cell");
        }
        (arena.left(root), arena.right(root))
    };

    let mut memo = MemoCaches::new();
    let result = match seed {
        Some(seed) => {
            let mut entropy = SeededEntropy::new(seed);
            nock(&mut arena, &mut memo, &mut entropy, subject, formula)
        }
        None => {
            let mut entropy = OsEntropy::default();
            nock(&mut arena, &mut memo, &mut entropy, subject, formula)
        }
    }
    .context("evaluation failed")?;

    print_noun(&arena, result, surface);
    Ok(())
}

fn print_noun(arena: &Arena, root: nockvm::NodePtr, surface: bool) {
    if surface {
        println!("{}", surface::to_string(arena, root));
    } else {
        println!("{}", hex::encode(encode(arena, root)));
    }
}
