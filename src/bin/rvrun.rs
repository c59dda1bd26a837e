//! Run a bare RV32I program image on the bit-level core
//!
//! The input is a text file with one 32-bit instruction word per line
//! in hex (`0x` prefix and underscores allowed, `#` starts a comment).
//! The program is loaded at the base address, executed for a bounded
//! number of steps, and the final CPU state printed.

use std::fs;
use std::process::ExitCode;

use clap::Parser;
use clap_num::maybe_hex;
use itertools::Itertools;

use riscvbitsim::bits;
use riscvbitsim::cpu::Cpu;

#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Path to the program file (one hex word per line)
    input: String,

    /// Load address and initial program counter (use 0x prefix for
    /// hexadecimal)
    #[arg(short, long, value_parser = maybe_hex::<u32>, default_value_t = 0)]
    base: u32,

    /// Memory size in bytes
    #[arg(short, long, value_parser = maybe_hex::<u32>, default_value_t = 1024)]
    mem_size: u32,

    /// The number of instructions to be executed
    #[arg(short, long, default_value_t = 1000)]
    steps: usize,

    /// Print the full register file instead of only non-zero
    /// registers
    #[arg(short, long)]
    verbose: bool,
}

fn parse_program(text: &str) -> Result<Vec<u32>, bits::ParseError> {
    text.lines()
        .filter_map(|line| {
            let word = line.split('#').next().unwrap_or("").trim();
            if word.is_empty() {
                None
            } else {
                Some(word)
            }
        })
        .map(|word| {
            bits::from_hex_string(word).map(|b| bits::to_u32(&bits::zero_extend(&b, 32)))
        })
        .collect()
}

fn main() -> ExitCode {
    let args = Args::parse();

    let text = match fs::read_to_string(&args.input) {
        Ok(text) => text,
        Err(e) => {
            eprintln!("error reading {}: {e}", args.input);
            return ExitCode::FAILURE;
        }
    };
    let words = match parse_program(&text) {
        Ok(words) => words,
        Err(e) => {
            eprintln!("error parsing {}: {e}", args.input);
            return ExitCode::FAILURE;
        }
    };

    let mut cpu = Cpu::new(args.mem_size as usize);
    cpu.load_program(&words, args.base);
    cpu.run(args.steps);

    if args.verbose {
        print!("{cpu}");
    } else {
        println!("pc = 0x{:08x}", cpu.pc);
        let nonzero = (1u8..32)
            .filter(|n| cpu.registers.read(*n) != 0)
            .map(|n| format!("x{n}=0x{:x}", cpu.registers.read(n)))
            .join(", ");
        if nonzero.is_empty() {
            println!("all registers zero");
        } else {
            println!("{nonzero}");
        }
    }
    ExitCode::SUCCESS
}
