use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::error::{MachineError, Result};
use crate::{
    FONTSET, FONTSET_SIZE, FONTSET_START_ADDRESS, MAX_PROGRAM_SIZE, NUM_KEYS, NUM_REGS, RAM_SIZE,
    SCREEN_HEIGHT, SCREEN_WIDTH, STACK_SIZE, START_ADDRESS,
};

/// Complete mutable state of the virtual CPU.
///
/// The machine is mutated by [`Machine::step`] and by the host
/// through [`Machine::set_key`] and [`Machine::tick_timers`]. It carries no
/// internal synchronisation; hosts running it on another thread must own it
/// exclusively per step and publish snapshots of the display and timers.
pub struct Machine {
    /// program counter
    pub(crate) pc: u16,
    pub(crate) ram: [u8; RAM_SIZE],
    /// display, row-major
    pub(crate) screen: [bool; SCREEN_WIDTH * SCREEN_HEIGHT],
    /// V registers
    pub(crate) v_reg: [u8; NUM_REGS],
    /// I register
    pub(crate) i_reg: u16,
    /// Call stack of return addresses
    pub(crate) stack_pointer: usize,
    pub(crate) stack: [u16; STACK_SIZE],
    pub(crate) keys: [bool; NUM_KEYS],
    /// delay timer
    pub(crate) delay_timer: u8,
    /// sound timer
    pub(crate) sound_timer: u8,
    rng: StdRng,
    seed: Option<u64>,
}

impl Default for Machine {
    fn default() -> Self {
        Self::new()
    }
}

impl Machine {
    /// Create a machine whose random source is seeded from the OS.
    pub fn new() -> Self {
        Self::build(StdRng::from_entropy(), None)
    }

    /// Create a machine with a deterministic random source.
    pub fn with_seed(seed: u64) -> Self {
        Self::build(StdRng::seed_from_u64(seed), Some(seed))
    }

    fn build(rng: StdRng, seed: Option<u64>) -> Self {
        let mut machine = Self {
            pc: START_ADDRESS,
            ram: [0; RAM_SIZE],
            screen: [false; SCREEN_WIDTH * SCREEN_HEIGHT],
            v_reg: [0; NUM_REGS],
            i_reg: 0,
            stack_pointer: 0,
            stack: [0; STACK_SIZE],
            keys: [false; NUM_KEYS],
            delay_timer: 0,
            sound_timer: 0,
            rng,
            seed,
        };
        machine.load_font();
        machine
    }

    fn load_font(&mut self) {
        let start = FONTSET_START_ADDRESS as usize;
        self.ram[start..start + FONTSET_SIZE].copy_from_slice(&FONTSET);
    }

    /// Return the machine to its power-on state.
    ///
    /// A machine created with [`Machine::with_seed`] also rewinds its random
    /// source, so a reset replays the same random stream.
    pub fn reset(&mut self) {
        self.pc = START_ADDRESS;
        self.ram = [0; RAM_SIZE];
        self.screen = [false; SCREEN_WIDTH * SCREEN_HEIGHT];
        self.v_reg = [0; NUM_REGS];
        self.i_reg = 0;
        self.stack_pointer = 0;
        self.stack = [0; STACK_SIZE];
        self.keys = [false; NUM_KEYS];
        self.delay_timer = 0;
        self.sound_timer = 0;
        if let Some(seed) = self.seed {
            self.rng = StdRng::seed_from_u64(seed);
        }
        self.load_font();
        log::info!("machine reset");
    }

    /// Copy a raw program image into memory at `START_ADDRESS`.
    ///
    /// The bytes are not validated; unknown opcodes only matter once executed.
    pub fn load_program(&mut self, program: &[u8]) -> Result<()> {
        if program.len() > MAX_PROGRAM_SIZE {
            return Err(MachineError::program_too_large(program.len()));
        }
        let start = START_ADDRESS as usize;
        let end = start + program.len();
        self.ram[start..end].copy_from_slice(program);
        log::info!("loaded {} byte program at {:#05X}", program.len(), start);
        Ok(())
    }

    pub fn set_key(&mut self, idx: usize, pressed: bool) -> Result<()> {
        let key = self
            .keys
            .get_mut(idx)
            .ok_or(MachineError::InvalidKeyIndex(idx))?;
        *key = pressed;
        Ok(())
    }

    /// Count both timers down by one. The host calls this at 60 Hz.
    pub fn tick_timers(&mut self) {
        self.delay_timer = self.delay_timer.saturating_sub(1);
        self.sound_timer = self.sound_timer.saturating_sub(1);
    }

    pub(crate) fn random_byte(&mut self) -> u8 {
        self.rng.gen()
    }

    pub(crate) fn push(&mut self, addr: u16) -> Result<()> {
        if self.stack_pointer >= STACK_SIZE {
            return Err(MachineError::StackOverflow { address: self.pc });
        }
        self.stack[self.stack_pointer] = addr;
        self.stack_pointer += 1;
        Ok(())
    }

    pub(crate) fn pop(&mut self) -> Result<u16> {
        if self.stack_pointer == 0 {
            return Err(MachineError::StackUnderflow { address: self.pc });
        }
        self.stack_pointer -= 1;
        Ok(self.stack[self.stack_pointer])
    }

    /// Read a byte relative to `I`. The address wraps within memory.
    pub(crate) fn read_indexed(&self, offset: usize) -> u8 {
        self.ram[(self.i_reg as usize + offset) % RAM_SIZE]
    }

    pub(crate) fn write_indexed(&mut self, offset: usize, value: u8) {
        self.ram[(self.i_reg as usize + offset) % RAM_SIZE] = value;
    }

    pub fn pc(&self) -> u16 {
        self.pc
    }

    pub fn index(&self) -> u16 {
        self.i_reg
    }

    pub fn registers(&self) -> &[u8; NUM_REGS] {
        &self.v_reg
    }

    /// Value of register `Vx`. Only the low nibble of `x` is used.
    pub fn register(&self, x: u8) -> u8 {
        self.v_reg[(x & 0xF) as usize]
    }

    pub fn stack_pointer(&self) -> usize {
        self.stack_pointer
    }

    /// Return addresses currently on the call stack, oldest first.
    pub fn stack(&self) -> &[u16] {
        &self.stack[..self.stack_pointer]
    }

    pub fn delay_timer(&self) -> u8 {
        self.delay_timer
    }

    pub fn sound_timer(&self) -> u8 {
        self.sound_timer
    }

    /// The audio sink plays a tone while this is true.
    pub fn is_sound_active(&self) -> bool {
        self.sound_timer > 0
    }

    pub fn keys(&self) -> &[bool; NUM_KEYS] {
        &self.keys
    }

    pub fn memory(&self) -> &[u8; RAM_SIZE] {
        &self.ram
    }

    pub fn display(&self) -> &[bool; SCREEN_WIDTH * SCREEN_HEIGHT] {
        &self.screen
    }

    /// Pixel at column `x`, row `y`. Out-of-range coordinates read as off.
    pub fn pixel(&self, x: usize, y: usize) -> bool {
        x < SCREEN_WIDTH && y < SCREEN_HEIGHT && self.screen[y * SCREEN_WIDTH + x]
    }
}
