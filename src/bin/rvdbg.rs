//! Interactive single-step debugger for the bit-level core
//!
//! Shows the register file and program counter in an alternate-screen
//! table. Press `s` to execute one instruction, `q` to quit.

use std::fs;
use std::io::{self, stdout};
use std::time::Duration;

use clap::Parser;
use clap_num::maybe_hex;
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    ExecutableCommand,
};
use ratatui::{prelude::*, widgets::*};

use riscvbitsim::bits;
use riscvbitsim::cpu::{registers::abi_name, Cpu};

#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
    /// Path to the program file (one hex word per line)
    input: String,

    /// Load address and initial program counter
    #[arg(short, long, value_parser = maybe_hex::<u32>, default_value_t = 0)]
    base: u32,

    /// Memory size in bytes
    #[arg(short, long, value_parser = maybe_hex::<u32>, default_value_t = 1024)]
    mem_size: u32,
}

enum Keypress {
    Quit,
    Step,
    None,
}

fn handle_events() -> io::Result<Keypress> {
    if event::poll(Duration::from_millis(50))? {
        if let Event::Key(key) = event::read()? {
            if key.kind == KeyEventKind::Press {
                return Ok(match key.code {
                    KeyCode::Char('q') => Keypress::Quit,
                    KeyCode::Char('s') => Keypress::Step,
                    _ => Keypress::None,
                });
            }
        }
    }
    Ok(Keypress::None)
}

fn ui(frame: &mut Frame, cpu: &Cpu, steps: usize) {
    let rows: Vec<Row> = (0..32)
        .map(|n| {
            Row::new(vec![
                format!("x{n}"),
                abi_name(n),
                format!("0x{:08x}", cpu.registers.read(n as u8)),
            ])
        })
        .collect();
    let widths = [
        Constraint::Length(5),
        Constraint::Length(8),
        Constraint::Length(12),
    ];
    let table = Table::new(rows, widths)
        .header(Row::new(vec!["reg", "name", "value"]))
        .block(
            Block::default()
                .title(format!(
                    "pc = 0x{:08x}  steps = {steps}  (s: step, q: quit)",
                    cpu.pc
                ))
                .borders(Borders::ALL),
        );
    frame.render_widget(table, frame.size());
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

fn main() -> io::Result<()> {
    let args = Args::parse();

    let text = fs::read_to_string(&args.input)?;
    let words = match parse_program(&text) {
        Ok(words) => words,
        Err(e) => {
            eprintln!("error parsing {}: {e}", args.input);
            return Ok(());
        }
    };

    let mut cpu = Cpu::new(args.mem_size as usize);
    cpu.load_program(&words, args.base);

    enable_raw_mode()?;
    stdout().execute(EnterAlternateScreen)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout()))?;

    let mut steps = 0;
    let mut should_quit = false;
    while !should_quit {
        terminal.draw(|f| ui(f, &cpu, steps))?;
        match handle_events()? {
            Keypress::Quit => should_quit = true,
            Keypress::Step => {
                cpu.step();
                steps += 1;
            }
            Keypress::None => {}
        }
    }

    disable_raw_mode()?;
    stdout().execute(LeaveAlternateScreen)?;
    Ok(())
}
