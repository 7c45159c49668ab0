use crate::instruction::AluOp;
use crate::machine::Machine;

const VF: usize = 0xF;

impl Machine {
    /// Execute an `8xyN` operation.
    ///
    /// Operations that produce a flag write `Vx` first and `VF` last, so with
    /// `x == 0xF` the flag is what remains in the register.
    pub(super) fn exec_alu(&mut self, op: AluOp, x: u8, y: u8) {
        let x = x as usize;
        let vx = self.v_reg[x];
        let vy = self.v_reg[y as usize];

        let (result, flag) = match op {
            AluOp::Load => (vy, None),
            AluOp::Or => (vx | vy, None),
            AluOp::And => (vx & vy, None),
            AluOp::Xor => (vx ^ vy, None),
            AluOp::Add => {
                let sum = vx as u16 + vy as u16;
                ((sum & 0xFF) as u8, Some((sum > 0xFF) as u8))
            }
            AluOp::Sub => {
                let (diff, borrow) = vx.overflowing_sub(vy);
                (diff, Some(!borrow as u8))
            }
            // Shifts work on Vx alone; VF takes the bit shifted out.
            AluOp::Shr => (vx >> 1, Some(vx & 0x1)),
            AluOp::SubN => {
                let (diff, borrow) = vy.overflowing_sub(vx);
                (diff, Some(!borrow as u8))
            }
            AluOp::Shl => (vx << 1, Some((vx & 0x80) >> 7)),
        };

        self.v_reg[x] = result;
        if let Some(flag) = flag {
            self.v_reg[VF] = flag;
        }
    }
}
