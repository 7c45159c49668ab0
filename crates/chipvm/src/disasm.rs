use std::fmt::Write;

use chipvm_core::{Instruction, MAX_PROGRAM_SIZE, START_ADDRESS};

/// One decoded word of a program image.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub struct Line {
    pub addr: u16,
    pub word: u16,
    pub instruction: Instruction,
}

/// Decode a program image word by word, as laid out from `START_ADDRESS`.
///
/// Only the part of the image that fits in memory is decoded. A trailing odd
/// byte is not a whole instruction and is left out; `listing` prints it as data.
pub fn disassemble(rom: &[u8]) -> Vec<Line> {
    loadable(rom)
        .chunks_exact(2)
        .zip((START_ADDRESS..).step_by(2))
        .map(|(pair, addr)| {
            let word = u16::from_be_bytes([pair[0], pair[1]]);
            Line {
                addr,
                word,
                instruction: Instruction::decode(word),
            }
        })
        .collect()
}

fn loadable(rom: &[u8]) -> &[u8] {
    &rom[..rom.len().min(MAX_PROGRAM_SIZE)]
}

/// Human-readable listing: address, raw word, mnemonic.
pub fn listing(rom: &[u8]) -> String {
    let mut out = String::new();
    for line in disassemble(rom) {
        // Writing to a String cannot fail.
        let _ = writeln!(
            out,
            "{:03X}: {:04X}  {}",
            line.addr, line.word, line.instruction
        );
    }
    let image = loadable(rom);
    if let [.., byte] = image {
        if image.len() % 2 == 1 {
            let addr = START_ADDRESS as usize + image.len() - 1;
            let _ = writeln!(out, "{:03X}: {:02X}    DB {:#04X}", addr, byte, byte);
        }
    }
    if rom.len() > image.len() {
        let _ = writeln!(
            out,
            "; {} bytes past the end of memory not listed",
            rom.len() - image.len()
        );
    }
    out
}
