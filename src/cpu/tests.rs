// (c) 2023 John A. Breaux
// This code is licensed under MIT license (see LICENSE for details)

//! Unit tests for [super::CPU]
//!
//! These run instructions, and ensure their output is consistent with previous builds
//!
//! General test format:
//! 1. Prepare to do the thing
//! 2. Do the thing
//! 3. Compare the result to the expected result

use super::*;
use crate::screen::{HEIGHT, WIDTH};
use rand::random;


fn setup_environment() -> CPU {
    let mut cpu = CPU::default();
    cpu.load_program(&[
        0x12, 0x00, // jp 200
    ])
    .unwrap();
    cpu
}

/// Loads `program` into a fresh CPU, then runs `steps` instructions
fn run_program(program: &[u8], steps: usize) -> CPU {
    let mut cpu = CPU::default();
    cpu.load_program(program).unwrap();
    cpu.multistep(steps).unwrap();
    cpu
}

mod load {
    use super::*;

    #[test]
    fn resets_state() {
        let mut cpu = run_program(&[0x6a, 0x05, 0xa3, 0x00, 0x22, 0x08, 0xf3, 0x15], 3);
        cpu.press(4).unwrap();
        cpu.load_program(&[0x00, 0xe0]).unwrap();
        assert_eq!(PROGRAM_START, cpu.pc);
        assert_eq!(0, cpu.sp());
        assert_eq!(0, cpu.i);
        assert_eq!([0; 16], cpu.v);
        assert_eq!([false; 16], cpu.keys);
        assert_eq!((0, 0), (cpu.delay, cpu.sound));
        assert_eq!(0, cpu.cycle);
        assert!(!cpu.draw);
        assert_eq!(RunState::Running, cpu.state);
    }

    #[test]
    fn is_idempotent() {
        let program = [0x60, 0x2a, 0xa2, 0x08, 0xd0, 0x05, 0x12, 0x06, 0xf0];
        let mut cpu = CPU::default();
        cpu.load_program(&program).unwrap();
        let fresh = cpu.clone();
        cpu.multistep(16).unwrap();
        assert_ne!(fresh, cpu);
        cpu.load_program(&program).unwrap();
        assert_eq!(fresh, cpu);
    }

    #[test]
    fn no_residue_from_previous_program() {
        let mut cpu = CPU::default();
        cpu.load_program(&[0xaa; 0x40]).unwrap();
        cpu.load_program(&[0x00, 0xe0]).unwrap();
        assert_eq!(&[0x00, 0xe0], &cpu.mem.as_slice()[0x200..0x202]);
        assert!(cpu.mem.as_slice()[0x202..].iter().all(|&b| b == 0));
    }

    #[test]
    fn writes_font() {
        let cpu = CPU::new(0x50, Dis::default(), Flags::default()).unwrap();
        assert_eq!(&CHARSET, &cpu.mem.as_slice()[0x50..0xa0]);
        assert!(cpu.mem.as_slice()[..0x50].iter().all(|&b| b == 0));
    }

    #[test]
    fn largest_program() {
        let mut cpu = CPU::default();
        cpu.load_program(&[0xff; PROGRAM_SPACE]).unwrap();
        assert_eq!(0xff, cpu.mem.as_slice()[0xfff]);
    }

    #[test]
    fn too_large() {
        let mut cpu = CPU::default();
        match cpu.load_program(&[0; PROGRAM_SPACE + 1]) {
            Err(Error::InvalidProgram { len }) => assert_eq!(PROGRAM_SPACE + 1, len),
            other => panic!("{other:?}"),
        }
    }
}

mod sys {
    use super::*;
    /// 00e0: Clears the screen memory to 0
    #[test]
    fn clear_screen() {
        let mut cpu = setup_environment();
        for y in 0..HEIGHT {
            cpu.screen.toggle(random::<usize>() % WIDTH, y);
        }
        cpu.clear_screen();
        assert!(cpu.screen.is_blank());
        assert!(cpu.draw);
    }

    /// 00ee: Returns from subroutine
    #[test]
    fn ret() {
        let test_addr = random::<u16>() & 0x7ff;
        let mut cpu = setup_environment();
        // Place the address on the stack
        cpu.stack.push(test_addr);

        cpu.ret().unwrap();

        // Verify the current address is the address from the stack
        assert_eq!(test_addr, cpu.pc);
        assert_eq!(0, cpu.sp());
    }

    /// 00ee with nothing to return to
    #[test]
    fn ret_underflow() {
        let mut cpu = run_program(&[0x00, 0xee], 0);
        match cpu.tick() {
            Err(Error::StackUnderflow { word, pc }) => assert_eq!((0x00ee, 0x200), (word, pc)),
            other => panic!("{other:?}"),
        }
    }
}

/// Tests control-flow instructions
///
/// Basically anything that touches the program counter
mod cf {
    use super::*;
    /// 1aaa: Sets the program counter to an absolute address
    #[test]
    fn jump() {
        let mut cpu = setup_environment();
        // Test all valid addresses
        for addr in 0x000..0xffe {
            cpu.jump(addr);
            assert_eq!(addr, cpu.pc);
        }
    }

    /// 2aaa: Pushes pc onto the stack, then jumps to a
    #[test]
    fn call() {
        let test_addr = random::<u16>() & 0xfff;
        let mut cpu = setup_environment();
        let curr_addr = cpu.pc;

        cpu.call(test_addr).unwrap();

        assert_eq!(test_addr, cpu.pc);
        assert_eq!(&[curr_addr], cpu.stack());
    }

    /// 16 nested calls fit. The 17th overflows.
    #[test]
    fn call_overflow() {
        // Each call goes to the next word
        let program: Vec<u8> = (0..STACK_DEPTH as u16 + 1)
            .flat_map(|n| (0x2202 + 2 * n).to_be_bytes())
            .collect();
        let mut cpu = run_program(&program, STACK_DEPTH);
        assert_eq!(STACK_DEPTH, cpu.sp());
        assert_eq!(0x220, cpu.pc);
        match cpu.tick() {
            Err(Error::StackOverflow { word, pc }) => assert_eq!((0x2222, 0x220), (word, pc)),
            other => panic!("{other:?}"),
        }
        assert_eq!(STACK_DEPTH, cpu.sp());
    }

    /// Call, then return, lands after the call
    #[test]
    fn call_then_return() {
        let cpu = run_program(
            &[
                0x22, 0x04, // call 204
                0x60, 0x01, // ld v0, 1
                0x00, 0xee, // ret
            ],
            3,
        );
        assert_eq!(0x01, cpu.v[0]);
        assert_eq!(0x204, cpu.pc);
        assert_eq!(0, cpu.sp());
    }

    /// 3xbb: Skips the next instruction if register X == b
    #[test]
    fn skip_equals_immediate() {
        let mut cpu = setup_environment();
        for word in 0..=0xffff {
            let (a, b, addr) = (word as u8, (word >> 8) as u8, random::<u16>() & 0x7fe);
            let x = random::<usize>() & 0xf;
            cpu.pc = addr;
            cpu.v[x] = a;

            cpu.skip_equals_immediate(x, b);

            assert_eq!(cpu.pc, addr.wrapping_add(if a == b { 2 } else { 0 }));
        }
    }

    /// 4xbb: Skips the next instruction if register X != b
    #[test]
    fn skip_not_equals_immediate() {
        let mut cpu = setup_environment();
        for word in 0..=0xffff {
            let (a, b, addr) = (word as u8, (word >> 8) as u8, random::<u16>() & 0x7fe);
            let x = random::<usize>() & 0xf;
            cpu.pc = addr;
            cpu.v[x] = a;

            cpu.skip_not_equals_immediate(x, b);

            assert_eq!(cpu.pc, addr.wrapping_add(if a != b { 2 } else { 0 }));
        }
    }

    /// 5xy0: Skips the next instruction if register X == register Y
    #[test]
    fn skip_equals() {
        let mut cpu = setup_environment();
        for word in 0..=0xffff {
            let (a, b, addr) = (word as u8, (word >> 8) as u8, random::<u16>() & 0x7fe);
            let reg = random::<usize>() & 0xff;
            let (x, y) = (reg & 0xf, reg >> 4);
            if x == y {
                continue;
            }
            cpu.pc = addr;
            (cpu.v[x], cpu.v[y]) = (a, b);

            cpu.skip_equals(x, y);

            assert_eq!(cpu.pc, addr.wrapping_add(if a == b { 2 } else { 0 }));
        }
    }

    /// 9xy0: Skip next instruction if X != y
    #[test]
    fn skip_not_equals() {
        let mut cpu = setup_environment();
        for word in 0..=0xffff {
            let (a, b, addr) = (word as u8, (word >> 8) as u8, random::<u16>() & 0x7fe);
            let reg = random::<usize>() & 0xff;
            let (x, y) = (reg & 0xf, reg >> 4);
            if x == y {
                continue;
            }
            cpu.pc = addr;
            (cpu.v[x], cpu.v[y]) = (a, b);

            cpu.skip_not_equals(x, y);

            assert_eq!(cpu.pc, addr.wrapping_add(if a != b { 2 } else { 0 }));
        }
    }

    /// Badr: Jump to &adr + v0
    #[test]
    fn jump_indexed() {
        let mut cpu = setup_environment();
        for addr in 0..0x1000 {
            let v0 = random::<u8>();
            cpu.v[0] = v0;

            cpu.jump_indexed(addr);

            assert_eq!(cpu.pc, addr.wrapping_add(v0.into()));
        }
    }

    /// Tests `jump_vx` Quirk behavior
    #[test]
    fn jump_indexed_quirk() {
        let mut cpu = setup_environment();
        cpu.flags.quirks.jump_vx = true;
        for i in 0..0x10 {
            cpu.v[i] = i as u8;
        }
        for reg in 0..0x10 {
            // attempts to jump to 0x`reg`00 + v0
            cpu.jump_indexed(reg * 0x100);
            // jumps to 0x`reg`00 + v`reg` instead
            assert_eq!(cpu.pc, reg * 0x101);
        }
    }
}

mod math {
    use super::*;
    /// 6xbb: Loads immediate byte b into register vX
    #[test]
    fn load_immediate() {
        let mut cpu = setup_environment();
        for test_register in 0x0..=0xf {
            for test_byte in 0x0..=0xff {
                cpu.load_immediate(test_register, test_byte);
                assert_eq!(cpu.v[test_register], test_byte)
            }
        }
    }

    /// 7xbb: Adds immediate byte b to register vX, leaving vF alone
    #[test]
    fn add_immediate() {
        let mut cpu = setup_environment();
        for test_register in 0x0..0xf {
            let mut sum = 0u8;
            cpu.v[0xf] = 0xc5; // sentinel
            for test_byte in 0x0..=0xff {
                sum = sum.wrapping_add(test_byte);

                cpu.add_immediate(test_register, test_byte);

                assert_eq!(cpu.v[test_register], sum);
                assert_eq!(cpu.v[0xf], 0xc5);
            }
        }
    }

    /// `6A05 7A0A` leaves 0x0F in vA
    #[test]
    fn load_then_add() {
        let cpu = run_program(&[0x6a, 0x05, 0x7a, 0x0a], 2);
        assert_eq!(0x0f, cpu.v[0xa]);
        assert_eq!(0x204, cpu.pc);
    }

    /// 8xy0: Loads the value of y into x
    #[test]
    fn load() {
        let mut cpu = setup_environment();
        for test_value in 1..=0xff {
            for reg in 0..=0xff {
                let (x, y) = (reg & 0xf, reg >> 4);
                if x == y {
                    continue;
                }
                cpu.v[y] = test_value;
                cpu.v[x] = 0;

                cpu.load(x, y);

                assert_eq!(cpu.v[x], test_value);
                assert_eq!(cpu.v[y], test_value);
            }
        }
    }

    /// 8xy1, 8xy2, 8xy3
    mod logic {
        use super::*;

        fn test_logic(quirk: bool, op: fn(&mut CPU, Reg, Reg), expect: fn(u8, u8) -> u8) {
            let mut cpu = setup_environment();
            cpu.flags.quirks.vf_reset = quirk;
            for word in 0..=0xffff {
                let (a, b) = (word as u8, (word >> 8) as u8);
                let reg = random::<usize>() & 0xff;
                let (x, y) = (reg & 0xf, reg >> 4);

                cpu.v[0xf] = 0xc5; // sentinel
                (cpu.v[x], cpu.v[y]) = (a, b);
                let (a, b) = (cpu.v[x], cpu.v[y]);

                op(&mut cpu, x, y);

                if x != 0xf || !quirk {
                    assert_eq!(cpu.v[x], expect(a, b));
                }
                if quirk {
                    assert_eq!(cpu.v[0xf], 0);
                } else if x != 0xf && y != 0xf {
                    assert_eq!(cpu.v[0xf], 0xc5);
                }
            }
        }

        #[test]
        fn or() {
            test_logic(false, CPU::or, |a, b| a | b)
        }
        #[test]
        fn or_quirk() {
            test_logic(true, CPU::or, |a, b| a | b)
        }
        #[test]
        fn and() {
            test_logic(false, CPU::and, |a, b| a & b)
        }
        #[test]
        fn and_quirk() {
            test_logic(true, CPU::and, |a, b| a & b)
        }
        #[test]
        fn xor() {
            test_logic(false, CPU::xor, |a, b| a ^ b)
        }
        #[test]
        fn xor_quirk() {
            test_logic(true, CPU::xor, |a, b| a ^ b)
        }
    }

    /// 8xy4: Performs addition of vX and vY, and stores the result in vX, carry in vF
    ///       If X is F, *only* stores carry
    #[test]
    fn add() {
        let mut cpu = setup_environment();
        for word in 0..=0xffff {
            let (a, b) = (word as u8, (word >> 8) as u8);
            let reg = random::<usize>() & 0xff;
            let (x, y) = (reg & 0xf, reg >> 4);
            // If x == y, a is discarded
            let (expected, carry) = if x == y { b } else { a }.overflowing_add(b);

            (cpu.v[x], cpu.v[y]) = (a, b);

            cpu.add(x, y);

            if x != 0xf {
                assert_eq!(cpu.v[x], expected);
            }
            assert_eq!(cpu.v[0xf], carry.into());
        }
    }

    /// `8014` with v0 = 0xFF and v1 = 0x01
    #[test]
    fn add_carry() {
        let cpu = run_program(&[0x60, 0xff, 0x61, 0x01, 0x80, 0x14], 3);
        assert_eq!(0x00, cpu.v[0]);
        assert_eq!(0x01, cpu.v[0xf]);
    }

    /// 8xy5: Performs subtraction of vX and vY, and stores the result in vX, !borrow in vF
    #[test]
    fn sub() {
        let mut cpu = setup_environment();
        for word in 0..=0xffff {
            let (a, b) = (word as u8, (word >> 8) as u8);
            let reg = random::<usize>() & 0xff;
            let (x, y) = (reg & 0xf, reg >> 4);
            let (expected, borrow) = if x == y { b } else { a }.overflowing_sub(b);

            (cpu.v[x], cpu.v[y]) = (a, b);

            cpu.sub(x, y);

            // vF is written first, so it can't be checked as an operand
            if x != 0xf && y != 0xf {
                assert_eq!(cpu.v[x], expected);
            }
            if x != 0xf {
                assert_eq!(cpu.v[0xf], (!borrow).into());
            }
        }
    }

    /// `8015` with v0 = 0x00 and v1 = 0x01
    #[test]
    fn sub_borrow() {
        let cpu = run_program(&[0x60, 0x00, 0x61, 0x01, 0x80, 0x15], 3);
        assert_eq!(0xff, cpu.v[0]);
        assert_eq!(0x00, cpu.v[0xf]);
    }

    /// 8xy7: Performs subtraction of vY and vX, and stores the result in vX, !borrow in vF
    #[test]
    fn backwards_sub() {
        let mut cpu = setup_environment();
        for word in 0..=0xffff {
            let (a, b) = (word as u8, (word >> 8) as u8);
            let reg = random::<usize>() & 0xff;
            let (x, y) = (reg & 0xf, reg >> 4);
            let (expected, borrow) = if x == y { a } else { b }.overflowing_sub(a);

            (cpu.v[x], cpu.v[y]) = (a, b);

            cpu.backwards_sub(x, y);

            // vF is written first, so it can't be checked as an operand
            if x != 0xf && y != 0xf {
                assert_eq!(cpu.v[x], expected);
            }
            if x != 0xf {
                assert_eq!(cpu.v[0xf], (!borrow).into());
            }
        }
    }

    /// 8Fyn: with vF as the destination, the flag is written first
    mod vf_destination {
        use super::*;

        fn run_with_vf(word: u16, vf: u8, v1: u8, vf_last: bool) -> CPU {
            let mut cpu = setup_environment();
            cpu.flags.quirks.vf_last = vf_last;
            cpu.load_program(&word.to_be_bytes()).unwrap();
            (cpu.v[0xf], cpu.v[1]) = (vf, v1);
            cpu.tick().unwrap();
            cpu
        }

        #[test]
        fn add_keeps_carry() {
            assert_eq!(0x01, run_with_vf(0x8f14, 0xff, 0x02, false).v[0xf]);
            assert_eq!(0x01, run_with_vf(0x8f14, 0xff, 0x02, true).v[0xf]);
        }
        #[test]
        fn sub_overwrites_flag() {
            // vF = 1 (no borrow), then vF = 1 - 2
            assert_eq!(0xff, run_with_vf(0x8f15, 0x05, 0x02, false).v[0xf]);
            assert_eq!(0x01, run_with_vf(0x8f15, 0x05, 0x02, true).v[0xf]);
        }
        #[test]
        fn shift_right_overwrites_flag() {
            assert_eq!(0x00, run_with_vf(0x8f06, 0x81, 0x00, false).v[0xf]);
            assert_eq!(0x01, run_with_vf(0x8f06, 0x81, 0x00, true).v[0xf]);
        }
        #[test]
        fn backwards_sub_overwrites_flag() {
            // vF = 1 (no borrow), then vF = 9 - 1
            assert_eq!(0x08, run_with_vf(0x8f17, 0x05, 0x09, false).v[0xf]);
            assert_eq!(0x01, run_with_vf(0x8f17, 0x05, 0x09, true).v[0xf]);
        }
        #[test]
        fn shift_left_overwrites_flag() {
            assert_eq!(0x02, run_with_vf(0x8f0e, 0x81, 0x00, false).v[0xf]);
            assert_eq!(0x01, run_with_vf(0x8f0e, 0x81, 0x00, true).v[0xf]);
        }
        /// With vF as the source, the new flag is the operand
        #[test]
        fn sub_from_vf() {
            // vF = 1 (5 >= 3), then v1 = 5 - 1
            let cpu = run_with_vf(0x81f5, 0x03, 0x05, false);
            assert_eq!((0x04, 0x01), (cpu.v[1], cpu.v[0xf]));
            let cpu = run_with_vf(0x81f5, 0x03, 0x05, true);
            assert_eq!((0x02, 0x01), (cpu.v[1], cpu.v[0xf]));
        }
    }

    mod shift {
        use super::*;

        /// 8xy6: Performs bitwise right shift of vX, stores carry-out in vF
        #[test]
        fn shift_right() {
            let mut cpu = setup_environment();
            for word in 0..=0xff {
                for reg in 0..=0xff {
                    let (x, y) = (reg & 0xf, reg >> 4);
                    cpu.v[x] = word;
                    let word = cpu.v[x];
                    if x != y {
                        cpu.v[y] = !word;
                    }

                    cpu.shift_right(x, y);

                    if x != 0xf {
                        assert_eq!(cpu.v[x], word >> 1);
                        assert_eq!(cpu.v[0xf], word & 1);
                    }
                }
            }
        }
        /// The same test, sourcing from vY
        #[test]
        fn shift_right_quirk() {
            let mut cpu = setup_environment();
            cpu.flags.quirks.shift_vy = true;
            for word in 0..=0xff {
                for reg in 0..=0xff {
                    let (x, y) = (reg & 0xf, reg >> 4);
                    (cpu.v[x], cpu.v[y]) = (!word, word);

                    cpu.shift_right(x, y);

                    if x != 0xf {
                        if y != 0xf {
                            assert_eq!(cpu.v[x], word >> 1);
                        }
                        assert_eq!(cpu.v[0xf], word & 1);
                    }
                }
            }
        }
        /// 8xyE: Performs bitwise left shift of vX, stores carry-out in vF
        #[test]
        fn shift_left() {
            let mut cpu = setup_environment();
            for word in 0..=0xff {
                for reg in 0..=0xff {
                    let (x, y) = (reg & 0xf, reg >> 4);
                    cpu.v[x] = word;
                    let word = cpu.v[x];
                    if x != y {
                        cpu.v[y] = !word;
                    }

                    cpu.shift_left(x, y);

                    if x != 0xf {
                        assert_eq!(cpu.v[x], word << 1);
                        assert_eq!(cpu.v[0xf], word >> 7);
                    }
                }
            }
        }
        /// The same test, sourcing from vY
        #[test]
        fn shift_left_quirk() {
            let mut cpu = setup_environment();
            cpu.flags.quirks.shift_vy = true;
            for word in 0..=0xff {
                for reg in 0..=0xff {
                    let (x, y) = (reg & 0xf, reg >> 4);
                    (cpu.v[x], cpu.v[y]) = (!word, word);

                    cpu.shift_left(x, y);

                    if x != 0xf {
                        if y != 0xf {
                            assert_eq!(cpu.v[x], word << 1);
                        }
                        assert_eq!(cpu.v[0xf], word >> 7);
                    }
                }
            }
        }
    }
}

mod i {
    use super::*;
    /// Aadr: Load address #adr into register I
    #[test]
    fn load_i_immediate() {
        let mut cpu = setup_environment();
        for addr in 0..0x1000 {
            cpu.load_i_immediate(addr);
            assert_eq!(cpu.i, addr);
        }
    }

    /// Fx1e: Add vX to I, flagging overflow past 0xfff
    #[test]
    fn add_i() {
        let mut cpu = setup_environment();
        for _ in 0..0x1000 {
            let (i, b, x) = (random::<u16>() & 0xfff, random::<u8>(), random::<usize>() % 0xf);
            cpu.i = i;
            cpu.v[x] = b;

            cpu.add_i(x);

            assert_eq!(cpu.i, i + b as u16);
            assert_eq!(cpu.v[0xf], u8::from(i + b as u16 > 0xfff));
        }
    }

    /// Fx29: Load sprite for character x into I
    #[test]
    fn load_sprite() {
        let mut cpu = CPU::new(0x50, Dis::default(), Flags::default()).unwrap();
        for x in 0..=0xf {
            cpu.v[x] = x as u8;
            cpu.load_sprite(x);
            assert_eq!(cpu.i, 0x50 + 5 * x as u16);
            // the sprite at I is the glyph for x
            assert_eq!(
                &CHARSET[5 * x..5 * x + 5],
                &cpu.mem.as_slice()[cpu.i as usize..cpu.i as usize + 5]
            );
        }
    }
}

/// Cxbb: Stores a random number & the provided byte into vX
#[test]
fn rand() {
    let mut cpu = setup_environment();
    for xb in 0..0x1000usize {
        let (x, b) = (xb >> 8 & 0xf, xb as u8);
        cpu.v[x] = 0;
        cpu.rand(x, b);
        // We don't know what the number will be,
        // but we do know it'll be <= b
        assert!(cpu.v[x] <= b);
        assert_eq!(0, cpu.v[x] & !b);
    }
}

mod draw {
    use super::*;

    /// Dxyn: Draws the "0" glyph at (0, 0)
    #[test]
    fn draw_glyph() {
        let cpu = run_program(
            &[
                0x60, 0x00, // ld v0, 0
                0xf0, 0x29, // ld f, v0
                0xd0, 0x05, // drw v0, v0, 5
            ],
            3,
        );
        assert!(cpu.draw_flag());
        assert_eq!(0, cpu.v[0xf]);
        assert_eq!(0xf000_0000_0000_0000, cpu.screen.rows()[0]);
        assert_eq!(0x9000_0000_0000_0000, cpu.screen.rows()[1]);
        assert_eq!(0xf000_0000_0000_0000, cpu.screen.rows()[4]);
        assert_eq!(14, cpu.screen.lit());
    }

    /// Drawing the same sprite twice erases it, and reports collision
    #[test]
    fn draw_collision() {
        let cpu = run_program(
            &[
                0x61, 0x0a, // ld v1, #0a
                0x62, 0x05, // ld v2, #05
                0xa2, 0x0c, // ld I, 20c
                0xd1, 0x21, // drw v1, v2, 1
                0xd1, 0x21, // drw v1, v2, 1
                0x12, 0x0a, // jp 20a
                0xff, // sprite
            ],
            5,
        );
        assert!(cpu.screen.is_blank());
        assert_eq!(1, cpu.v[0xf]);
    }

    /// A sprite at x=60 is clipped to 4 columns
    #[test]
    fn draw_clipped() {
        let mut cpu = setup_environment();
        cpu.mem.as_mut_slice()[0x300] = 0xff;
        (cpu.i, cpu.v[0], cpu.v[1]) = (0x300, 60, 31);

        cpu.draw(0, 1, 2).unwrap();

        assert_eq!(0x0000_0000_0000_000f, cpu.screen.rows()[31]);
        assert_eq!(0, cpu.screen.rows()[0]);
        assert_eq!(4, cpu.screen.lit());
        assert_eq!(0, cpu.v[0xf]);
    }

    /// The same sprite, with `screen_wrap` set
    #[test]
    fn draw_wrapped() {
        let mut cpu = setup_environment();
        cpu.flags.quirks.screen_wrap = true;
        cpu.mem.as_mut_slice()[0x300..0x302].copy_from_slice(&[0xff, 0xff]);
        (cpu.i, cpu.v[0], cpu.v[1]) = (0x300, 60, 31);

        cpu.draw(0, 1, 2).unwrap();

        assert_eq!(0xf000_0000_0000_000f, cpu.screen.rows()[31]);
        assert_eq!(0xf000_0000_0000_000f, cpu.screen.rows()[0]);
        assert_eq!(16, cpu.screen.lit());
    }

    /// A sprite placed fully off-screen draws nothing
    #[test]
    fn draw_offscreen() {
        let mut cpu = setup_environment();
        cpu.mem.as_mut_slice()[0x300] = 0xff;
        (cpu.i, cpu.v[0], cpu.v[1]) = (0x300, 0x80, 0x80);

        cpu.draw(0, 1, 1).unwrap();

        assert!(cpu.screen.is_blank());
    }

    /// Dxy0 draws nothing, and clears vF
    #[test]
    fn draw_zero_rows() {
        let mut cpu = setup_environment();
        cpu.v[0xf] = 1;
        cpu.i = 0xffff;
        cpu.draw(0, 0, 0).unwrap();
        assert_eq!(0, cpu.v[0xf]);
        assert!(!cpu.draw);
    }

    /// A sprite which runs off the end of memory faults before drawing anything
    #[test]
    fn draw_out_of_bounds() {
        let mut cpu = setup_environment();
        cpu.i = 0xffe;
        match cpu.draw(0, 0, 3) {
            Err(Error::MemoryOutOfBounds { addr, pc }) => assert_eq!((0x1000, 0x200), (addr, pc)),
            other => panic!("{other:?}"),
        }
        assert!(cpu.screen.is_blank());
    }
}

mod io {
    use super::*;

    /// Ex9E: Skip next instruction if key vX is held
    #[test]
    fn skip_key_equals() {
        let mut cpu = setup_environment();
        for key in 0..=0xf {
            for pressed in [true, false] {
                cpu.pc = 0x200;
                cpu.v[1] = key as u8;
                cpu.key_changed(key, pressed).unwrap();

                cpu.skip_key_equals(1);

                assert_eq!(if pressed { 0x202 } else { 0x200 }, cpu.pc);
            }
        }
    }

    /// ExA1: Skip next instruction if key vX is not held
    #[test]
    fn skip_key_not_equals() {
        let mut cpu = setup_environment();
        for key in 0..=0xf {
            for pressed in [true, false] {
                cpu.pc = 0x200;
                cpu.v[1] = key as u8;
                cpu.key_changed(key, pressed).unwrap();

                cpu.skip_key_not_equals(1);

                assert_eq!(if pressed { 0x200 } else { 0x202 }, cpu.pc);
            }
        }
    }

    /// Keys past F are never held
    #[test]
    fn skip_key_nonexistent() {
        let mut cpu = setup_environment();
        cpu.keys = [true; 16];
        cpu.v[2] = 0x10;
        cpu.skip_key_equals(2);
        assert_eq!(0x200, cpu.pc);
        cpu.skip_key_not_equals(2);
        assert_eq!(0x202, cpu.pc);
    }

    /// Fx0A: suspends until a key is pressed
    #[test]
    fn wait_for_key() {
        let mut cpu = run_program(
            &[
                0xf3, 0x0a, // ld v3, k
                0x60, 0x01, // ld v0, 1
            ],
            1,
        );
        assert_eq!(RunState::AwaitingKey { reg: 3 }, cpu.state);
        let before = cpu.clone();
        cpu.tick().unwrap().tick().unwrap();
        assert_eq!(before, cpu);

        // Releases don't resolve the wait
        cpu.key_changed(7, false).unwrap();
        assert!(cpu.is_awaiting_key());

        cpu.key_changed(7, true).unwrap();
        assert_eq!(RunState::Running, cpu.state);
        assert_eq!(7, cpu.v[3]);

        cpu.tick().unwrap();
        assert_eq!(1, cpu.v[0]);
        assert_eq!(0x204, cpu.pc);
    }

    /// Key indices past F are rejected
    #[test]
    fn invalid_key() {
        let mut cpu = setup_environment();
        match cpu.key_changed(16, true) {
            Err(Error::InvalidKey { key }) => assert_eq!(16, key),
            other => panic!("{other:?}"),
        }
    }

    /// Fx07, Fx15: delay timer round trip
    #[test]
    fn delay_timer() {
        let mut cpu = setup_environment();
        for x in 0..=0xf {
            let value = random::<u8>();
            cpu.v[x] = value;
            cpu.store_delay_timer(x);
            assert_eq!(value, cpu.delay);
            cpu.v[x] = !value;
            cpu.load_delay_timer(x);
            assert_eq!(value, cpu.v[x]);
        }
    }

    /// Fx18: Load vX into ST
    #[test]
    fn store_sound_timer() {
        let mut cpu = setup_environment();
        for x in 0..=0xf {
            let value = random::<u8>();
            cpu.v[x] = value;
            cpu.store_sound_timer(x);
            assert_eq!(value, cpu.sound);
        }
    }

    /// Timers count down and stop at 0
    #[test]
    fn decrement_timers() {
        let mut cpu = setup_environment();
        (cpu.delay, cpu.sound) = (1, 3);
        assert!(!cpu.decrement_timers());
        assert_eq!((0, 2), (cpu.delay, cpu.sound));
        assert!(!cpu.decrement_timers());
        assert!(cpu.decrement_timers());
        for _ in 0..4 {
            assert!(!cpu.decrement_timers());
            assert_eq!((0, 0), (cpu.delay, cpu.sound));
        }
    }

    /// Fx33: BCD convert X into I`[0..3]`
    #[test]
    fn bcd_convert() {
        for test in 0x0..=0xff {
            let mut cpu = setup_environment();
            cpu.v[5] = test;
            cpu.i = 0xff0;

            cpu.bcd_convert(5).unwrap();

            assert_eq!(
                &[test / 100, test / 10 % 10, test % 10],
                &cpu.mem.as_slice()[0xff0..0xff3]
            );
        }
    }

    /// Fx33 past the end of memory
    #[test]
    fn bcd_convert_out_of_bounds() {
        let mut cpu = setup_environment();
        cpu.i = 0xffe;
        cpu.bcd_convert(0).unwrap_err();
    }

    /// Fx55: DMA Stor from I to registers 0..=X
    #[test]
    fn store_dma() {
        for len in 0..=0xf {
            let mut cpu = setup_environment();
            for (reg, value) in cpu.v.iter_mut().enumerate() {
                *value = 0x10 + reg as u8;
            }
            cpu.i = 0x400;

            cpu.store_dma(len).unwrap();

            let stored = &cpu.mem.as_slice()[0x400..0x410];
            assert_eq!(&cpu.v[..=len], &stored[..=len]);
            assert!(stored[len + 1..].iter().all(|&b| b == 0));
            assert_eq!(0x400 + len as u16 + 1, cpu.i);
        }
    }

    /// Fx65: DMA Load from I to registers 0..=X
    #[test]
    fn load_dma() {
        for len in 0..=0xf {
            let mut cpu = setup_environment();
            cpu.mem.as_mut_slice()[0x400..0x410].copy_from_slice(&[0xa5; 16]);
            cpu.i = 0x400;

            cpu.load_dma(len).unwrap();

            assert!(cpu.v[..=len].iter().all(|&b| b == 0xa5));
            assert!(cpu.v[len + 1..].iter().all(|&b| b == 0));
            assert_eq!(0x400 + len as u16 + 1, cpu.i);
        }
    }

    /// `dma_hold_i` leaves I alone
    #[test]
    fn dma_quirk() {
        let mut cpu = setup_environment();
        cpu.flags.quirks.dma_hold_i = true;
        cpu.i = 0x400;
        cpu.store_dma(0xf).unwrap();
        cpu.load_dma(0xf).unwrap();
        assert_eq!(0x400, cpu.i);
    }

    /// DMA past the end of memory faults
    #[test]
    fn dma_out_of_bounds() {
        let mut cpu = setup_environment();
        cpu.i = 0xff8;
        cpu.store_dma(0xf).unwrap_err();
        cpu.load_dma(0xf).unwrap_err();
        assert_eq!(0xff8, cpu.i);
    }
}

mod fault {
    use super::*;

    /// Unknown opcodes report the word and the address it came from
    #[test]
    fn unknown_opcode() {
        let mut cpu = run_program(&[0x00, 0xe0, 0x50, 0x0f], 1);
        match cpu.tick() {
            Err(Error::UnknownOpcode { word, pc }) => assert_eq!((0x500f, 0x202), (word, pc)),
            other => panic!("{other:?}"),
        }
        // only the cls was counted
        assert_eq!(1, cpu.cycle);
    }

    /// Running off the end of memory
    #[test]
    fn fetch_out_of_bounds() {
        let mut cpu = setup_environment();
        cpu.pc = 0xfff;
        match cpu.tick() {
            Err(Error::MemoryOutOfBounds { addr, pc }) => assert_eq!((0xfff, 0xfff), (addr, pc)),
            other => panic!("{other:?}"),
        }
        assert_eq!(0, cpu.cycle);
    }

    /// Paused CPUs don't tick
    #[test]
    fn paused() {
        let mut cpu = setup_environment();
        cpu.flags.pause = true;
        cpu.tick().unwrap();
        assert_eq!(0, cpu.cycle);
        assert_eq!(0x200, cpu.pc);
    }
}

/// The CPU prints a trace line per instruction in debug mode
#[test]
fn debug_trace() {
    let mut cpu = setup_environment();
    cpu.flags.debug();
    cpu.multistep(4).unwrap();
    assert_eq!(4, cpu.cycle);
    cpu.dump();
}

#[test]
fn invalid_font() {
    assert!(CPU::new(0x1b0, Dis::default(), Flags::default()).is_ok());
    match CPU::new(0x1b1, Dis::default(), Flags::default()) {
        Err(Error::InvalidFont { addr }) => assert_eq!(0x1b1, addr),
        other => panic!("{other:?}"),
    }
}

#[test]
fn set_invalid_register() {
    let mut cpu = setup_environment();
    match cpu.set_v(0x10, 0) {
        Err(Error::InvalidRegister { reg }) => assert_eq!(0x10, reg),
        other => panic!("{other:?}"),
    }
}
