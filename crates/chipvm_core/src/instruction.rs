use std::fmt;

/// Register-to-register operations of the `8xyN` family.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum AluOp {
    /// 8xy0
    Load,
    /// 8xy1
    Or,
    /// 8xy2
    And,
    /// 8xy3
    Xor,
    /// 8xy4, VF = carry
    Add,
    /// 8xy5, VF = not borrow
    Sub,
    /// 8xy6, VF = shifted-out bit
    Shr,
    /// 8xy7, VF = not borrow
    SubN,
    /// 8xyE, VF = shifted-out bit
    Shl,
}

impl AluOp {
    fn from_nibble(n: u8) -> Option<Self> {
        let op = match n {
            0x0 => AluOp::Load,
            0x1 => AluOp::Or,
            0x2 => AluOp::And,
            0x3 => AluOp::Xor,
            0x4 => AluOp::Add,
            0x5 => AluOp::Sub,
            0x6 => AluOp::Shr,
            0x7 => AluOp::SubN,
            0xE => AluOp::Shl,
            _ => return None,
        };
        Some(op)
    }

    fn mnemonic(self) -> &'static str {
        match self {
            AluOp::Load => "LD",
            AluOp::Or => "OR",
            AluOp::And => "AND",
            AluOp::Xor => "XOR",
            AluOp::Add => "ADD",
            AluOp::Sub => "SUB",
            AluOp::Shr => "SHR",
            AluOp::SubN => "SUBN",
            AluOp::Shl => "SHL",
        }
    }
}

/// A decoded instruction word.
///
/// Register operands (`x`, `y`) are nibbles in `0x0..=0xF`, `kk` is the low
/// byte, `n` the low nibble and `addr` the low 12 bits of the word.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Hash)]
pub enum Instruction {
    /// 0nnn - machine code routine on the original hardware; ignored.
    Sys { addr: u16 },
    /// 00E0
    ClearScreen,
    /// 00EE
    Return,
    /// 1nnn
    Jump { addr: u16 },
    /// 2nnn
    Call { addr: u16 },
    /// 3xkk
    SkipEqImm { x: u8, kk: u8 },
    /// 4xkk
    SkipNeImm { x: u8, kk: u8 },
    /// 5xy0
    SkipEqReg { x: u8, y: u8 },
    /// 6xkk
    LoadImm { x: u8, kk: u8 },
    /// 7xkk, no carry flag
    AddImm { x: u8, kk: u8 },
    /// 8xyN
    Alu { op: AluOp, x: u8, y: u8 },
    /// 9xy0
    SkipNeReg { x: u8, y: u8 },
    /// Annn
    LoadIndex { addr: u16 },
    /// Bnnn
    JumpOffset { addr: u16 },
    /// Cxkk
    Random { x: u8, kk: u8 },
    /// Dxyn
    Draw { x: u8, y: u8, n: u8 },
    /// Ex9E
    SkipKeyPressed { x: u8 },
    /// ExA1
    SkipKeyNotPressed { x: u8 },
    /// Fx07
    LoadDelay { x: u8 },
    /// Fx0A
    WaitKey { x: u8 },
    /// Fx15
    SetDelay { x: u8 },
    /// Fx18
    SetSound { x: u8 },
    /// Fx1E
    AddIndex { x: u8 },
    /// Fx29
    LoadFont { x: u8 },
    /// Fx33
    StoreBcd { x: u8 },
    /// Fx55
    StoreRegs { x: u8 },
    /// Fx65
    LoadRegs { x: u8 },
    /// Any word outside the instruction table. Executes as a no-op.
    Unknown(u16),
}

impl Instruction {
    /// Decode a big-endian instruction word.
    ///
    /// The top nibble selects the family. Family 0x8 is split further on the
    /// low nibble, families 0xE and 0xF on the low byte and family 0x0 on the
    /// whole 12-bit address, so `0x01E0` is a `SYS` and not a `CLS`.
    pub fn decode(word: u16) -> Self {
        let family = (word >> 12) as u8;
        let x = ((word >> 8) & 0xF) as u8;
        let y = ((word >> 4) & 0xF) as u8;
        let n = (word & 0xF) as u8;
        let kk = (word & 0xFF) as u8;
        let addr = word & 0x0FFF;

        match family {
            0x0 => match addr {
                0x0E0 => Instruction::ClearScreen,
                0x0EE => Instruction::Return,
                _ => Instruction::Sys { addr },
            },
            0x1 => Instruction::Jump { addr },
            0x2 => Instruction::Call { addr },
            0x3 => Instruction::SkipEqImm { x, kk },
            0x4 => Instruction::SkipNeImm { x, kk },
            0x5 if n == 0 => Instruction::SkipEqReg { x, y },
            0x6 => Instruction::LoadImm { x, kk },
            0x7 => Instruction::AddImm { x, kk },
            0x8 => match AluOp::from_nibble(n) {
                Some(op) => Instruction::Alu { op, x, y },
                None => Instruction::Unknown(word),
            },
            0x9 if n == 0 => Instruction::SkipNeReg { x, y },
            0xA => Instruction::LoadIndex { addr },
            0xB => Instruction::JumpOffset { addr },
            0xC => Instruction::Random { x, kk },
            0xD => Instruction::Draw { x, y, n },
            0xE => match kk {
                0x9E => Instruction::SkipKeyPressed { x },
                0xA1 => Instruction::SkipKeyNotPressed { x },
                _ => Instruction::Unknown(word),
            },
            0xF => match kk {
                0x07 => Instruction::LoadDelay { x },
                0x0A => Instruction::WaitKey { x },
                0x15 => Instruction::SetDelay { x },
                0x18 => Instruction::SetSound { x },
                0x1E => Instruction::AddIndex { x },
                0x29 => Instruction::LoadFont { x },
                0x33 => Instruction::StoreBcd { x },
                0x55 => Instruction::StoreRegs { x },
                0x65 => Instruction::LoadRegs { x },
                _ => Instruction::Unknown(word),
            },
            _ => Instruction::Unknown(word),
        }
    }

    /// Whether executing this instruction can change the framebuffer.
    pub fn touches_display(&self) -> bool {
        matches!(self, Instruction::ClearScreen | Instruction::Draw { .. })
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Instruction::Sys { addr } => write!(f, "SYS {addr:#05X}"),
            Instruction::ClearScreen => write!(f, "CLS"),
            Instruction::Return => write!(f, "RET"),
            Instruction::Jump { addr } => write!(f, "JP {addr:#05X}"),
            Instruction::Call { addr } => write!(f, "CALL {addr:#05X}"),
            Instruction::SkipEqImm { x, kk } => write!(f, "SE V{x:X}, {kk:#04X}"),
            Instruction::SkipNeImm { x, kk } => write!(f, "SNE V{x:X}, {kk:#04X}"),
            Instruction::SkipEqReg { x, y } => write!(f, "SE V{x:X}, V{y:X}"),
            Instruction::LoadImm { x, kk } => write!(f, "LD V{x:X}, {kk:#04X}"),
            Instruction::AddImm { x, kk } => write!(f, "ADD V{x:X}, {kk:#04X}"),
            Instruction::Alu { op, x, y } => match op {
                AluOp::Shr | AluOp::Shl => write!(f, "{} V{x:X}", op.mnemonic()),
                _ => write!(f, "{} V{x:X}, V{y:X}", op.mnemonic()),
            },
            Instruction::SkipNeReg { x, y } => write!(f, "SNE V{x:X}, V{y:X}"),
            Instruction::LoadIndex { addr } => write!(f, "LD I, {addr:#05X}"),
            Instruction::JumpOffset { addr } => write!(f, "JP V0, {addr:#05X}"),
            Instruction::Random { x, kk } => write!(f, "RND V{x:X}, {kk:#04X}"),
            Instruction::Draw { x, y, n } => write!(f, "DRW V{x:X}, V{y:X}, {n}"),
            Instruction::SkipKeyPressed { x } => write!(f, "SKP V{x:X}"),
            Instruction::SkipKeyNotPressed { x } => write!(f, "SKNP V{x:X}"),
            Instruction::LoadDelay { x } => write!(f, "LD V{x:X}, DT"),
            Instruction::WaitKey { x } => write!(f, "LD V{x:X}, K"),
            Instruction::SetDelay { x } => write!(f, "LD DT, V{x:X}"),
            Instruction::SetSound { x } => write!(f, "LD ST, V{x:X}"),
            Instruction::AddIndex { x } => write!(f, "ADD I, V{x:X}"),
            Instruction::LoadFont { x } => write!(f, "LD F, V{x:X}"),
            Instruction::StoreBcd { x } => write!(f, "LD B, V{x:X}"),
            Instruction::StoreRegs { x } => write!(f, "LD [I], V{x:X}"),
            Instruction::LoadRegs { x } => write!(f, "LD V{x:X}, [I]"),
            Instruction::Unknown(word) => write!(f, "DW {word:#06X}"),
        }
    }
}
