//! Instruction engine: fetch, decode and execute one instruction per step.

mod alu;
mod draw;

use crate::error::{MachineError, Result};
use crate::instruction::Instruction;
use crate::machine::Machine;
use crate::{
    FONTSET_START_ADDRESS, FONT_GLYPH_SIZE, NUM_KEYS, RAM_SIZE, SCREEN_HEIGHT, SCREEN_WIDTH,
};

/// Where the program counter goes once an instruction has executed.
///
/// Handlers return this instead of touching `pc` themselves, so an
/// instruction that fails leaves the program counter where it was.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
enum Flow {
    /// pc += 2
    Next,
    /// pc += 4
    Skip,
    Jump(u16),
    /// Leave pc in place so the same instruction runs again next step.
    Stay,
}

impl Flow {
    fn skip_if(condition: bool) -> Self {
        if condition {
            Flow::Skip
        } else {
            Flow::Next
        }
    }
}

impl Machine {
    /// Execute exactly one instruction and return it.
    ///
    /// On error the machine is left as it was before the call; the driver
    /// decides whether to halt, reset or report.
    pub fn step(&mut self) -> Result<Instruction> {
        let word = self.fetch_opcode()?;
        let instruction = Instruction::decode(word);
        log::trace!("{:#05X}: {:04X}  {}", self.pc, word, instruction);

        let flow = self.execute(instruction)?;
        self.pc = match flow {
            Flow::Next => self.pc + 2,
            Flow::Skip => self.pc + 4,
            Flow::Jump(addr) => addr,
            Flow::Stay => self.pc,
        };
        Ok(instruction)
    }

    /// Read the big-endian word at `pc` without advancing.
    fn fetch_opcode(&self) -> Result<u16> {
        let pc = self.pc as usize;
        if pc + 1 >= RAM_SIZE {
            return Err(MachineError::AddressOutOfRange { address: self.pc });
        }
        Ok(u16::from_be_bytes([self.ram[pc], self.ram[pc + 1]]))
    }

    fn execute(&mut self, instruction: Instruction) -> Result<Flow> {
        let flow = match instruction {
            Instruction::Sys { .. } => Flow::Next,
            Instruction::Unknown(word) => {
                log::debug!("ignoring unknown opcode {:04X} at {:#05X}", word, self.pc);
                Flow::Next
            }
            Instruction::ClearScreen => {
                self.screen = [false; SCREEN_WIDTH * SCREEN_HEIGHT];
                Flow::Next
            }
            Instruction::Return => Flow::Jump(self.pop()?),
            Instruction::Jump { addr } => Flow::Jump(addr),
            Instruction::Call { addr } => {
                self.push(self.pc + 2)?;
                Flow::Jump(addr)
            }
            Instruction::SkipEqImm { x, kk } => Flow::skip_if(self.v(x) == kk),
            Instruction::SkipNeImm { x, kk } => Flow::skip_if(self.v(x) != kk),
            Instruction::SkipEqReg { x, y } => Flow::skip_if(self.v(x) == self.v(y)),
            Instruction::SkipNeReg { x, y } => Flow::skip_if(self.v(x) != self.v(y)),
            Instruction::LoadImm { x, kk } => {
                self.set_v(x, kk);
                Flow::Next
            }
            Instruction::AddImm { x, kk } => {
                self.set_v(x, self.v(x).wrapping_add(kk));
                Flow::Next
            }
            Instruction::Alu { op, x, y } => {
                self.exec_alu(op, x, y);
                Flow::Next
            }
            Instruction::LoadIndex { addr } => {
                self.i_reg = addr;
                Flow::Next
            }
            Instruction::JumpOffset { addr } => Flow::Jump(addr + self.v(0) as u16),
            Instruction::Random { x, kk } => {
                let value = self.random_byte() & kk;
                self.set_v(x, value);
                Flow::Next
            }
            Instruction::Draw { x, y, n } => {
                self.exec_draw(x, y, n);
                Flow::Next
            }
            Instruction::SkipKeyPressed { x } => Flow::skip_if(self.is_key_pressed(self.v(x))),
            Instruction::SkipKeyNotPressed { x } => {
                Flow::skip_if(!self.is_key_pressed(self.v(x)))
            }
            Instruction::LoadDelay { x } => {
                self.set_v(x, self.delay_timer);
                Flow::Next
            }
            Instruction::WaitKey { x } => match self.keys.iter().position(|&pressed| pressed) {
                Some(key) => {
                    self.set_v(x, key as u8);
                    Flow::Next
                }
                // Polled: no key yet, so run this instruction again next step.
                None => Flow::Stay,
            },
            Instruction::SetDelay { x } => {
                self.delay_timer = self.v(x);
                Flow::Next
            }
            Instruction::SetSound { x } => {
                self.sound_timer = self.v(x);
                Flow::Next
            }
            Instruction::AddIndex { x } => {
                self.i_reg = self.i_reg.wrapping_add(self.v(x) as u16);
                Flow::Next
            }
            Instruction::LoadFont { x } => {
                self.i_reg = FONTSET_START_ADDRESS + FONT_GLYPH_SIZE as u16 * self.v(x) as u16;
                Flow::Next
            }
            Instruction::StoreBcd { x } => {
                let value = self.v(x);
                self.write_indexed(0, value / 100);
                self.write_indexed(1, (value / 10) % 10);
                self.write_indexed(2, value % 10);
                Flow::Next
            }
            Instruction::StoreRegs { x } => {
                for reg in 0..=x as usize {
                    self.write_indexed(reg, self.v_reg[reg]);
                }
                Flow::Next
            }
            Instruction::LoadRegs { x } => {
                for reg in 0..=x as usize {
                    self.v_reg[reg] = self.read_indexed(reg);
                }
                Flow::Next
            }
        };
        Ok(flow)
    }

    #[inline]
    fn v(&self, x: u8) -> u8 {
        self.v_reg[x as usize]
    }

    #[inline]
    fn set_v(&mut self, x: u8, value: u8) {
        self.v_reg[x as usize] = value;
    }

    /// Key values outside the keypad read as not pressed.
    fn is_key_pressed(&self, key: u8) -> bool {
        (key as usize) < NUM_KEYS && self.keys[key as usize]
    }
}

#[cfg(test)]
mod tests;
