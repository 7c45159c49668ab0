use std::path::PathBuf;

use anyhow::{Context, Result};
use chipvm::screen::{render_rgb, render_text};
use chipvm::{disasm, Color, Driver, DriverConfig, StopReason};
use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(name = "chipvm", version, about = "Headless CHIP-8 virtual machine")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run a ROM for a number of 60 Hz ticks and print the final screen.
    Run {
        rom: PathBuf,
        /// Timer ticks to run (60 per emulated second).
        #[arg(long)]
        ticks: Option<u32>,
        /// Instructions executed per timer tick.
        #[arg(long)]
        ipt: Option<u32>,
        /// Seed for the random number instruction.
        #[arg(long)]
        seed: Option<u64>,
        /// Keys (0-F) held down for the whole run.
        #[arg(long = "hold", value_parser = parse_key)]
        held: Vec<usize>,
        /// Also write the final screen as raw RGB24 to this path.
        #[arg(long)]
        rgb: Option<PathBuf>,
    },
    /// Print a disassembly listing of a ROM.
    Disasm { rom: PathBuf },
}

fn parse_key(s: &str) -> Result<usize, String> {
    usize::from_str_radix(s.trim_start_matches("0x"), 16)
        .map_err(|e| format!("invalid key '{s}': {e}"))
}

fn run(
    rom: PathBuf,
    ticks: Option<u32>,
    ipt: Option<u32>,
    seed: Option<u64>,
    held: Vec<usize>,
    rgb: Option<PathBuf>,
) -> Result<()> {
    let mut driver = Driver::new(DriverConfig::with_overrides(ipt, ticks, seed));
    driver.load_rom_file(&rom)?;
    for key in held {
        driver.set_key(key, true)?;
    }

    let summary = driver.run()?;
    print!("{}", render_text(driver.machine().display()));
    match summary.stop {
        StopReason::Completed => println!(
            "ran {} ticks, {} instructions",
            summary.ticks, summary.instructions
        ),
        StopReason::Halted { pc } => println!(
            "halted at {:#05X} after {} ticks, {} instructions",
            pc, summary.ticks, summary.instructions
        ),
    }

    if let Some(path) = rgb {
        let buffer = render_rgb(driver.machine().display(), Color::WHITE, Color::BLACK);
        std::fs::write(&path, &buffer)
            .with_context(|| format!("failed to write '{}'", path.display()))?;
        log::info!("wrote RGB24 frame to '{}'", path.display());
    }
    Ok(())
}

fn main() -> Result<()> {
    env_logger::init();

    match Cli::parse().command {
        Command::Run {
            rom,
            ticks,
            ipt,
            seed,
            held,
            rgb,
        } => run(rom, ticks, ipt, seed, held, rgb),
        Command::Disasm { rom } => {
            let data = std::fs::read(&rom)
                .with_context(|| format!("failed to read ROM file '{}'", rom.display()))?;
            print!("{}", disasm::listing(&data));
            Ok(())
        }
    }
}
