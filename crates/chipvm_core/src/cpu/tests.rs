use super::*;
use crate::instruction::AluOp;
use crate::{NUM_REGS, STACK_SIZE, START_ADDRESS};
use proptest::prelude::*;

/// Build a seeded machine with `program` (one word per instruction) loaded.
fn machine_with(program: &[u16]) -> Machine {
    let bytes: Vec<u8> = program.iter().flat_map(|word| word.to_be_bytes()).collect();
    let mut machine = Machine::with_seed(0x5EED);
    machine.load_program(&bytes).unwrap();
    machine
}

fn run(machine: &mut Machine, steps: usize) {
    for _ in 0..steps {
        machine.step().unwrap();
    }
}

fn lit_pixels(machine: &Machine) -> usize {
    machine.display().iter().filter(|&&pixel| pixel).count()
}

#[test]
fn step_returns_the_decoded_instruction() {
    let mut machine = machine_with(&[0x6A12]);
    assert_eq!(machine.step(), Ok(Instruction::LoadImm { x: 0xA, kk: 0x12 }));
    assert_eq!(machine.register(0xA), 0x12);
    assert_eq!(machine.pc(), START_ADDRESS + 2);
}

#[test]
fn unknown_opcodes_are_skipped() {
    let mut machine = machine_with(&[0xFFFF, 0x5121, 0x0123, 0x6001]);
    assert_eq!(machine.step(), Ok(Instruction::Unknown(0xFFFF)));
    assert_eq!(machine.step(), Ok(Instruction::Unknown(0x5121)));
    assert_eq!(machine.step(), Ok(Instruction::Sys { addr: 0x123 }));
    assert_eq!(machine.pc(), START_ADDRESS + 6);
    assert_eq!(machine.registers(), &[0; NUM_REGS]);
    run(&mut machine, 1);
    assert_eq!(machine.register(0), 1);
}

#[test]
fn fetch_past_end_of_memory_is_fatal() {
    let mut machine = machine_with(&[0x1FFF]);
    run(&mut machine, 1);
    assert_eq!(machine.pc(), 0xFFF);

    let err = machine.step().unwrap_err();
    assert_eq!(err, MachineError::AddressOutOfRange { address: 0xFFF });
    assert!(err.is_step_fatal());
    assert_eq!(machine.pc(), 0xFFF);
}

#[test]
fn fetch_of_last_full_word_succeeds() {
    let mut machine = machine_with(&[0x1FFE]);
    machine.ram[0xFFE] = 0x60;
    machine.ram[0xFFF] = 0x2A;
    run(&mut machine, 2);
    assert_eq!(machine.register(0), 0x2A);
    assert_eq!(machine.pc(), 0x1000);
    assert!(machine.step().is_err());
}

#[test]
fn clear_screen() {
    let mut machine = machine_with(&[0x00E0]);
    machine.screen = [true; SCREEN_WIDTH * SCREEN_HEIGHT];
    run(&mut machine, 1);
    assert_eq!(lit_pixels(&machine), 0);
}

#[test]
fn jump_and_jump_with_offset() {
    let mut machine = machine_with(&[0x1300]);
    run(&mut machine, 1);
    assert_eq!(machine.pc(), 0x300);

    let mut machine = machine_with(&[0x6010, 0xB300]);
    run(&mut machine, 2);
    assert_eq!(machine.pc(), 0x310);
}

#[test]
fn call_then_return_restores_pc_and_sp() {
    // 0x200: CALL 0x206, 0x202: LD V1, 1, 0x206: RET
    let mut machine = machine_with(&[0x2206, 0x6101, 0x0000, 0x00EE]);
    run(&mut machine, 1);
    assert_eq!(machine.pc(), 0x206);
    assert_eq!(machine.stack(), &[0x202]);
    assert_eq!(machine.stack_pointer(), 1);

    run(&mut machine, 1);
    assert_eq!(machine.pc(), 0x202);
    assert_eq!(machine.stack_pointer(), 0);

    run(&mut machine, 1);
    assert_eq!(machine.register(1), 1);
}

#[test]
fn seventeenth_nested_call_overflows_without_side_effects() {
    // CALL 0x200 forever.
    let mut machine = machine_with(&[0x2200]);
    run(&mut machine, STACK_SIZE);
    assert_eq!(machine.stack_pointer(), STACK_SIZE);
    assert_eq!(machine.pc(), 0x200);

    let err = machine.step().unwrap_err();
    assert_eq!(err, MachineError::StackOverflow { address: 0x200 });
    assert_eq!(machine.stack_pointer(), STACK_SIZE);
    assert_eq!(machine.pc(), 0x200);
    assert!(machine.stack().iter().all(|&addr| addr == 0x202));
}

#[test]
fn return_with_empty_stack_underflows() {
    let mut machine = machine_with(&[0x00EE]);
    assert_eq!(
        machine.step(),
        Err(MachineError::StackUnderflow { address: 0x200 })
    );
    assert_eq!(machine.pc(), 0x200);
    assert_eq!(machine.stack_pointer(), 0);
}

#[test]
fn skip_on_immediate() {
    let mut machine = machine_with(&[0x6042, 0x3042, 0x0000, 0x4042, 0x4142]);
    run(&mut machine, 2);
    assert_eq!(machine.pc(), 0x206);
    run(&mut machine, 1);
    assert_eq!(machine.pc(), 0x208);
    run(&mut machine, 1);
    assert_eq!(machine.pc(), 0x20C);
}

#[test]
fn skip_on_registers() {
    let mut machine = machine_with(&[0x5010, 0x0000, 0x9010, 0x6105, 0x9010]);
    run(&mut machine, 1);
    assert_eq!(machine.pc(), 0x204);
    run(&mut machine, 1);
    assert_eq!(machine.pc(), 0x206);
    run(&mut machine, 2);
    assert_eq!(machine.pc(), 0x20C);
}

#[test]
fn add_immediate_wraps_without_flag() {
    let mut machine = machine_with(&[0x60FF, 0x7001]);
    machine.v_reg[0xF] = 0x42;
    run(&mut machine, 2);
    assert_eq!(machine.register(0), 0x00);
    assert_eq!(machine.register(0xF), 0x42);
}

#[test]
fn add_registers_sets_carry() {
    let mut machine = machine_with(&[0x60FF, 0x6101, 0x8014]);
    run(&mut machine, 3);
    assert_eq!(machine.register(0), 0x00);
    assert_eq!(machine.register(0xF), 1);

    let mut machine = machine_with(&[0x6001, 0x6101, 0x8014]);
    machine.v_reg[0xF] = 1;
    run(&mut machine, 3);
    assert_eq!(machine.register(0), 0x02);
    assert_eq!(machine.register(0xF), 0);
}

#[test]
fn subtraction_sets_not_borrow() {
    let mut machine = machine_with(&[0x6005, 0x6103, 0x8015]);
    run(&mut machine, 3);
    assert_eq!(machine.register(0), 2);
    assert_eq!(machine.register(0xF), 1);

    let mut machine = machine_with(&[0x6003, 0x6105, 0x8015]);
    run(&mut machine, 3);
    assert_eq!(machine.register(0), 0xFE);
    assert_eq!(machine.register(0xF), 0);

    let mut machine = machine_with(&[0x6003, 0x6105, 0x8017]);
    run(&mut machine, 3);
    assert_eq!(machine.register(0), 2);
    assert_eq!(machine.register(0xF), 1);

    let mut machine = machine_with(&[0x6004, 0x6104, 0x8015]);
    run(&mut machine, 3);
    assert_eq!(machine.register(0), 0);
    assert_eq!(machine.register(0xF), 1);
}

#[test]
fn bitwise_ops_and_register_load() {
    let mut machine = machine_with(&[0x60F0, 0x613C, 0x8011, 0x8012, 0x8013, 0x8210]);
    machine.v_reg[0xF] = 0x77;
    run(&mut machine, 3);
    assert_eq!(machine.register(0), 0xFC);
    run(&mut machine, 1);
    assert_eq!(machine.register(0), 0x3C);
    run(&mut machine, 1);
    assert_eq!(machine.register(0), 0x00);
    run(&mut machine, 1);
    assert_eq!(machine.register(2), 0x3C);
    assert_eq!(machine.register(0xF), 0x77);
}

#[test]
fn shifts_report_the_bit_shifted_out() {
    let mut machine = machine_with(&[0x6081, 0x8006, 0x6081, 0x800E]);
    run(&mut machine, 2);
    assert_eq!(machine.register(0), 0x40);
    assert_eq!(machine.register(0xF), 1);
    run(&mut machine, 2);
    assert_eq!(machine.register(0), 0x02);
    assert_eq!(machine.register(0xF), 1);

    let mut machine = machine_with(&[0x6040, 0x8006]);
    run(&mut machine, 2);
    assert_eq!(machine.register(0), 0x20);
    assert_eq!(machine.register(0xF), 0);
}

#[test]
fn flag_wins_when_vf_is_the_destination() {
    let mut machine = Machine::with_seed(0);
    machine.v_reg[0xF] = 0xFF;
    machine.v_reg[1] = 0x01;
    machine.exec_alu(AluOp::Add, 0xF, 1);
    assert_eq!(machine.register(0xF), 1);
}

#[test]
fn load_index_and_add_to_index() {
    let mut machine = machine_with(&[0xA123, 0x6010, 0xF01E]);
    run(&mut machine, 3);
    assert_eq!(machine.index(), 0x133);
}

#[test]
fn random_is_masked_and_reproducible() {
    let program = [0xC0FF, 0xC10F, 0xC200];
    let mut a = machine_with(&program);
    let mut b = machine_with(&program);
    run(&mut a, 3);
    run(&mut b, 3);
    assert_eq!(a.registers(), b.registers());
    assert!(a.register(1) <= 0x0F);
    assert_eq!(a.register(2), 0);
}

#[test]
fn draw_font_glyph() {
    // LD F, V0 with V0 = 0; DRW V1, V2, 5
    let mut machine = machine_with(&[0xF029, 0xD125]);
    run(&mut machine, 2);
    assert_eq!(machine.index(), FONTSET_START_ADDRESS);
    // "0" glyph: 0xF0, 0x90, 0x90, 0x90, 0xF0
    assert_eq!(lit_pixels(&machine), 4 + 2 + 2 + 2 + 4);
    assert!(machine.pixel(0, 0) && machine.pixel(3, 0));
    assert!(machine.pixel(0, 1) && !machine.pixel(1, 1));
    assert_eq!(machine.register(0xF), 0);
}

#[test]
fn drawing_twice_restores_screen_and_reports_collision() {
    // Glyph "A" at (10, 12), drawn twice over a screen that already has pixels on.
    let mut machine = machine_with(&[0x600A, 0x610C, 0xF029, 0xD015, 0xD015]);
    for (x, y) in [(0, 0), (10, 12), (11, 13), (63, 31)] {
        machine.screen[y * SCREEN_WIDTH + x] = true;
    }
    let before = *machine.display();

    run(&mut machine, 4);
    assert_ne!(before, *machine.display());
    assert!(!machine.pixel(10, 12));
    assert!(machine.pixel(0, 0) && machine.pixel(63, 31));
    assert_eq!(machine.register(0xF), 1);

    run(&mut machine, 1);
    assert_eq!(before, *machine.display());
    assert_eq!(machine.register(0xF), 1);
}

#[test]
fn second_draw_collides_even_on_blank_screen() {
    let mut machine = machine_with(&[0xF029, 0xD015, 0xD015]);
    run(&mut machine, 2);
    assert!(lit_pixels(&machine) > 0);
    assert_eq!(machine.register(0xF), 0);

    run(&mut machine, 1);
    assert_eq!(lit_pixels(&machine), 0);
    assert_eq!(machine.register(0xF), 1);
}

#[test]
fn draw_clips_horizontally() {
    // One row of 0xFF at column 60.
    let mut machine = machine_with(&[0xA300, 0x603C, 0x6100, 0xD011]);
    machine.ram[0x300] = 0xFF;
    run(&mut machine, 4);
    assert_eq!(lit_pixels(&machine), 4);
    for x in 60..64 {
        assert!(machine.pixel(x, 0));
    }
    assert!(!machine.pixel(0, 0));
    assert!(!machine.pixel(0, 1));
}

#[test]
fn draw_wraps_vertically() {
    // Five rows of 0x80 starting at row 30.
    let mut machine = machine_with(&[0xA300, 0x6005, 0x611E, 0xD015]);
    machine.ram[0x300..0x305].copy_from_slice(&[0x80; 5]);
    run(&mut machine, 4);
    assert_eq!(lit_pixels(&machine), 5);
    for y in [30, 31, 0, 1, 2] {
        assert!(machine.pixel(5, y), "row {y} not drawn");
    }
}

#[test]
fn draw_origin_wraps_onto_screen() {
    // V0 = 200 -> column 8, V1 = 33 -> row 1
    let mut machine = machine_with(&[0xA300, 0x60C8, 0x6121, 0xD011]);
    machine.ram[0x300] = 0x80;
    run(&mut machine, 4);
    assert!(machine.pixel(8, 1));
    assert_eq!(lit_pixels(&machine), 1);
}

#[test]
fn collision_only_counts_pixels_turned_off() {
    let mut machine = machine_with(&[0xA300, 0xD011, 0xA301, 0xD011]);
    machine.ram[0x300] = 0xF0;
    machine.ram[0x301] = 0x0F;
    run(&mut machine, 4);
    assert_eq!(machine.register(0xF), 0);
    assert_eq!(lit_pixels(&machine), 8);
}

#[test]
fn skip_on_key_state() {
    let mut machine = machine_with(&[0x6005, 0xE09E, 0xE0A1, 0x0000, 0xE09E]);
    run(&mut machine, 2);
    assert_eq!(machine.pc(), 0x204);
    run(&mut machine, 1);
    assert_eq!(machine.pc(), 0x208);

    machine.set_key(5, true).unwrap();
    run(&mut machine, 1);
    assert_eq!(machine.pc(), 0x20C);
}

#[test]
fn key_values_outside_keypad_are_never_pressed() {
    let mut machine = machine_with(&[0x6020, 0xE09E, 0xE0A1]);
    machine.keys = [true; crate::NUM_KEYS];
    run(&mut machine, 2);
    assert_eq!(machine.pc(), 0x204);
    run(&mut machine, 1);
    assert_eq!(machine.pc(), 0x208);
}

#[test]
fn wait_key_polls_until_a_key_is_pressed() {
    let mut machine = machine_with(&[0xF30A]);
    for _ in 0..5 {
        assert_eq!(machine.step(), Ok(Instruction::WaitKey { x: 3 }));
        assert_eq!(machine.pc(), 0x200);
    }

    machine.set_key(0xC, true).unwrap();
    machine.set_key(0x9, true).unwrap();
    run(&mut machine, 1);
    assert_eq!(machine.pc(), 0x202);
    assert_eq!(machine.register(3), 0x9);
}

#[test]
fn timer_transfers() {
    let mut machine = machine_with(&[0x6030, 0xF015, 0xF018, 0xF107]);
    run(&mut machine, 3);
    assert_eq!(machine.delay_timer(), 0x30);
    assert_eq!(machine.sound_timer(), 0x30);

    machine.tick_timers();
    run(&mut machine, 1);
    assert_eq!(machine.register(1), 0x2F);
}

#[test]
fn bcd_of_156() {
    let mut machine = machine_with(&[0x609C, 0xA300, 0xF033]);
    run(&mut machine, 3);
    assert_eq!(&machine.memory()[0x300..0x303], &[1, 5, 6]);
    assert_eq!(machine.index(), 0x300);
}

#[test]
fn register_block_store_and_load() {
    let mut machine = machine_with(&[0xA300, 0xF355, 0xA400, 0xF265]);
    machine.v_reg[..5].copy_from_slice(&[1, 2, 3, 4, 5]);
    machine.ram[0x400..0x404].copy_from_slice(&[9, 8, 7, 6]);
    run(&mut machine, 2);
    assert_eq!(&machine.memory()[0x300..0x305], &[1, 2, 3, 4, 0]);

    run(&mut machine, 2);
    assert_eq!(&machine.registers()[..5], &[9, 8, 7, 4, 5]);
    assert_eq!(machine.index(), 0x400);
}

#[test]
fn indexed_access_wraps_around_memory() {
    let mut machine = machine_with(&[0xAFFF, 0x60FF, 0xF033]);
    run(&mut machine, 3);
    assert_eq!(machine.memory()[0xFFF], 2);
    assert_eq!(machine.memory()[0x000], 5);
    assert_eq!(machine.memory()[0x001], 5);
}

proptest! {
    #[test]
    fn bcd_digits_reassemble(value in any::<u8>()) {
        let mut machine = machine_with(&[0xA300, 0xF433]);
        machine.v_reg[4] = value;
        run(&mut machine, 2);
        let digits = &machine.memory()[0x300..0x303];
        prop_assert!(digits.iter().all(|&d| d < 10));
        prop_assert_eq!(
            digits[0] as u32 * 100 + digits[1] as u32 * 10 + digits[2] as u32,
            value as u32
        );
    }

    #[test]
    fn add_registers_matches_nine_bit_sum(a in any::<u8>(), b in any::<u8>()) {
        let mut machine = machine_with(&[0x8124]);
        machine.v_reg[1] = a;
        machine.v_reg[2] = b;
        run(&mut machine, 1);
        let sum = a as u16 + b as u16;
        prop_assert_eq!(machine.register(1), (sum & 0xFF) as u8);
        prop_assert_eq!(machine.register(0xF), (sum > 0xFF) as u8);
    }
}
