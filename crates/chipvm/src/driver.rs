use std::path::Path;

use anyhow::{Context, Result};
use chipvm_core::{Instruction, Machine};
use typed_builder::TypedBuilder;

/// Timer rate of the machine. Everything else is paced against it.
pub const TIMER_HZ: u32 = 60;

/// How the headless driver schedules the machine.
///
/// There is no wall-clock pacing: one "tick" is `instructions_per_tick`
/// steps followed by one timer decrement, as fast as the host can go.
#[derive(TypedBuilder, Clone, Debug, PartialEq, Eq)]
pub struct DriverConfig {
    /// Instructions per 60 Hz timer tick. 10 gives the usual ~600 Hz CPU.
    #[builder(default = 10)]
    pub instructions_per_tick: u32,
    /// Number of timer ticks `Driver::run` executes.
    #[builder(default = TIMER_HZ)]
    pub ticks: u32,
    /// Seed for the machine's random source. `None` seeds from the OS.
    #[builder(default)]
    pub seed: Option<u64>,
}

impl Default for DriverConfig {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl DriverConfig {
    /// Build a config from optional settings, falling back to the defaults
    /// for anything left unset.
    pub fn with_overrides(
        instructions_per_tick: Option<u32>,
        ticks: Option<u32>,
        seed: Option<u64>,
    ) -> Self {
        let defaults = Self::default();
        let instructions_per_tick =
            instructions_per_tick.unwrap_or(defaults.instructions_per_tick);
        Self::builder()
            .instructions_per_tick(instructions_per_tick)
            .ticks(ticks.unwrap_or(defaults.ticks))
            .seed(seed)
            .build()
    }
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum StopReason {
    /// All configured ticks ran.
    Completed,
    /// The program jumped to its own address, the platform's idiom for "halt".
    Halted { pc: u16 },
}

#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct RunSummary {
    pub ticks: u32,
    pub instructions: u64,
    pub stop: StopReason,
    /// Whether any executed instruction could have changed the display.
    pub display_touched: bool,
}

/// Headless driver loop around a [`Machine`].
pub struct Driver {
    machine: Machine,
    config: DriverConfig,
    ticks: u32,
    instructions: u64,
    display_touched: bool,
}

impl Driver {
    pub fn new(config: DriverConfig) -> Self {
        let machine = match config.seed {
            Some(seed) => Machine::with_seed(seed),
            None => Machine::new(),
        };
        Self {
            machine,
            config,
            ticks: 0,
            instructions: 0,
            display_touched: false,
        }
    }

    pub fn load_rom(&mut self, rom: &[u8]) -> Result<()> {
        self.machine
            .load_program(rom)
            .context("failed to load ROM")?;
        Ok(())
    }

    pub fn load_rom_file(&mut self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        let rom = std::fs::read(path)
            .with_context(|| format!("failed to read ROM file '{}'", path.display()))?;
        log::info!("read ROM '{}' ({} bytes)", path.display(), rom.len());
        self.load_rom(&rom)
    }

    /// Hold a key down (or release it) for the following ticks.
    pub fn set_key(&mut self, key: usize, pressed: bool) -> Result<()> {
        self.machine
            .set_key(key, pressed)
            .with_context(|| format!("cannot set key {key}"))?;
        Ok(())
    }

    /// Run one timer tick: up to `instructions_per_tick` steps, then one
    /// timer decrement. Returns `Some` if the program halted during the tick.
    pub fn run_tick(&mut self) -> Result<Option<StopReason>> {
        let mut stop = None;
        for _ in 0..self.config.instructions_per_tick {
            let pc = self.machine.pc();
            let instruction = self.machine.step().with_context(|| {
                format!(
                    "machine stopped at tick {} after {} instructions",
                    self.ticks, self.instructions
                )
            })?;
            self.instructions += 1;
            self.display_touched |= instruction.touches_display();

            if instruction == (Instruction::Jump { addr: pc }) {
                log::info!("program halted at {:#05X}", pc);
                stop = Some(StopReason::Halted { pc });
                break;
            }
        }
        self.machine.tick_timers();
        self.ticks += 1;
        Ok(stop)
    }

    /// Run the configured number of ticks, stopping early on a halt.
    pub fn run(&mut self) -> Result<RunSummary> {
        let mut stop = StopReason::Completed;
        for _ in 0..self.config.ticks {
            if let Some(reason) = self.run_tick()? {
                stop = reason;
                break;
            }
        }
        let summary = RunSummary {
            ticks: self.ticks,
            instructions: self.instructions,
            stop,
            display_touched: self.display_touched,
        };
        log::debug!("run finished: {:?}", summary);
        Ok(summary)
    }

    pub fn machine(&self) -> &Machine {
        &self.machine
    }
}
