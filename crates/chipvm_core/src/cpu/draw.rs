use crate::machine::Machine;
use crate::{SCREEN_HEIGHT, SCREEN_WIDTH};

impl Machine {
    /// Dxyn: XOR an `n`-row sprite from `memory[I..I+n]` onto the display.
    ///
    /// The origin wraps onto the screen. Rows past the bottom edge wrap to the
    /// top; pixels past the right edge are clipped. `VF` is 1 if any lit pixel
    /// was turned off, 0 otherwise.
    pub(super) fn exec_draw(&mut self, x: u8, y: u8, n: u8) {
        let x_coord = self.v_reg[x as usize] as usize % SCREEN_WIDTH;
        let y_coord = self.v_reg[y as usize] as usize % SCREEN_HEIGHT;
        let mut collision = false;

        for row in 0..n as usize {
            let sprite_row = self.read_indexed(row);
            let y = (y_coord + row) % SCREEN_HEIGHT;
            for col in 0..8 {
                let x = x_coord + col;
                if x >= SCREEN_WIDTH {
                    break;
                }
                if (sprite_row >> (7 - col)) & 0x1 == 0 {
                    continue;
                }
                let pixel = &mut self.screen[y * SCREEN_WIDTH + x];
                collision |= *pixel;
                *pixel = !*pixel;
            }
        }

        self.v_reg[0xF] = collision as u8;
    }
}
