pub mod cpu;
pub mod error;
pub mod instruction;
pub mod machine;

pub use error::{MachineError, Result};
pub use instruction::Instruction;
pub use machine::Machine;

/// Logical screen width in pixels.
pub const SCREEN_WIDTH: usize = 64;
/// Logical screen height in pixels.
pub const SCREEN_HEIGHT: usize = 32;

/// Total addressable memory (4 KiB).
pub const RAM_SIZE: usize = 4096;
/// Number of general-purpose `V` registers. `VF` doubles as the flags register.
pub const NUM_REGS: usize = 16;
/// Depth of the call stack.
pub const STACK_SIZE: usize = 16;
/// Number of keys on the hex keypad.
pub const NUM_KEYS: usize = 16;

/// Programs are loaded here, and the program counter starts here.
pub const START_ADDRESS: u16 = 0x200;
/// Largest program that fits between `START_ADDRESS` and the end of memory.
pub const MAX_PROGRAM_SIZE: usize = RAM_SIZE - START_ADDRESS as usize;

/// Address of the built-in hex digit font.
pub const FONTSET_START_ADDRESS: u16 = 0x50;
/// Bytes per font glyph.
pub const FONT_GLYPH_SIZE: usize = 5;
pub const FONTSET_SIZE: usize = 80;

pub const FONTSET: [u8; FONTSET_SIZE] = [
    0xF0, 0x90, 0x90, 0x90, 0xF0, // 0
    0x20, 0x60, 0x20, 0x20, 0x70, // 1
    0xF0, 0x10, 0xF0, 0x80, 0xF0, // 2
    0xF0, 0x10, 0xF0, 0x10, 0xF0, // 3
    0x90, 0x90, 0xF0, 0x10, 0x10, // 4
    0xF0, 0x80, 0xF0, 0x10, 0xF0, // 5
    0xF0, 0x80, 0xF0, 0x90, 0xF0, // 6
    0xF0, 0x10, 0x20, 0x40, 0x40, // 7
    0xF0, 0x90, 0xF0, 0x90, 0xF0, // 8
    0xF0, 0x90, 0xF0, 0x10, 0xF0, // 9
    0xF0, 0x90, 0xF0, 0x90, 0x90, // A
    0xE0, 0x90, 0xE0, 0x90, 0xE0, // B
    0xF0, 0x80, 0x80, 0x80, 0xF0, // C
    0xE0, 0x90, 0x90, 0x90, 0xE0, // D
    0xF0, 0x80, 0xF0, 0x80, 0xF0, // E
    0xF0, 0x80, 0xF0, 0x80, 0x80, // F
];
