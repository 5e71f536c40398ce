// (c) 2023 John A. Breaux
// This code is licensed under MIT license (see LICENSE for details)

//! The cycle driver: real-time pacing, timer decay, input, and the main loop

use crate::{
    cpu::CPU,
    error::Result,
    io::{DisplaySink, InputSource},
    keymap::{keycode, QUIT_KEY},
};
use std::time::{Duration, Instant};

/// Rate at which both timers decay, in ticks per second
pub const TIMER_HZ: u64 = 60;
/// Default instruction throughput, in instructions per second
pub const DEFAULT_SPEED: u64 = 720;

/// A fixed-rate logical clock.
///
/// Yields the number of whole periods that elapsed since it last yielded,
/// so a slow host catches up on ticks instead of losing them. Timer decay
/// runs off one of these, decoupled from instruction throughput.
#[derive(Clone, Copy, Debug)]
pub struct Clock {
    period: Duration,
    due: Instant,
}

impl Clock {
    /// A clock beating `hz` times per second, starting now
    pub fn new(hz: u64) -> Self {
        let period = Duration::from_nanos(1_000_000_000 / hz.max(1));
        Clock {
            period,
            due: Instant::now() + period,
        }
    }

    /// Whole periods elapsed up to now
    pub fn tick(&mut self) -> u32 {
        self.tick_at(Instant::now())
    }

    /// Whole periods elapsed up to `now`; the testable form of [Clock::tick]
    pub fn tick_at(&mut self, now: Instant) -> u32 {
        let mut periods = 0;
        while self.due <= now {
            self.due += self.period;
            periods += 1;
        }
        periods
    }
}

/// Runs the machine until it halts.
///
/// Each cycle refreshes the key latch from the input source, drains the
/// timer clock into timer ticks, executes one instruction, and sleeps off
/// the rest of the instruction period. The quit symbol halts the machine
/// before the next instruction executes; a fatal error propagates after the
/// machine has marked itself halted.
pub fn run(
    cpu: &mut CPU,
    display: &mut impl DisplaySink,
    input: &mut impl InputSource,
    speed: u64,
) -> Result<()> {
    let pace = Duration::from_nanos(1_000_000_000 / speed.max(1));
    let mut timers = Clock::new(TIMER_HZ);
    while cpu.is_running() {
        let start = Instant::now();
        match input.poll() {
            Some(QUIT_KEY) => {
                cpu.halt();
                break;
            }
            symbol => cpu.set_key(symbol.and_then(keycode))?,
        }
        for _ in 0..timers.tick() {
            cpu.tick_timers();
        }
        cpu.step(display)?;
        display.present();
        std::thread::sleep(pace.saturating_sub(start.elapsed()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        cpu::Status,
        error::Error,
        io::{DummyInput, NullDisplay},
    };

    /// fast enough that the pacing sleep rounds to nothing
    const TEST_SPEED: u64 = 1_000_000;

    #[test]
    fn clock_yields_whole_periods() {
        let now = Instant::now();
        let mut clock = Clock::new(60);
        // not yet due
        assert_eq!(0, clock.tick_at(now));
        // two whole periods and most of a third
        assert_eq!(2, clock.tick_at(now + Duration::from_millis(35)));
        // nothing new at the same instant
        assert_eq!(0, clock.tick_at(now + Duration::from_millis(35)));
        // the fractional period completes
        assert_eq!(1, clock.tick_at(now + Duration::from_millis(51)));
    }

    #[test]
    fn quit_halts_before_anything_executes() {
        let mut cpu = CPU::new(&[0x60, 0x05]).unwrap(); // ld v0, #05
        let mut input = DummyInput::new([Some(QUIT_KEY)]);
        run(&mut cpu, &mut NullDisplay, &mut input, TEST_SPEED).unwrap();
        assert_eq!(Status::Halted, cpu.status());
        assert_eq!(0, cpu.cycle());
        assert_eq!(0, cpu.v()[0]);
    }

    #[test]
    fn fatal_opcode_stops_the_loop() {
        let mut cpu = CPU::new(&[0xff, 0xff]).unwrap();
        let mut input = DummyInput::default();
        let err = run(&mut cpu, &mut NullDisplay, &mut input, TEST_SPEED)
            .expect_err("0xffff is not an instruction");
        assert!(matches!(
            err,
            Error::UnknownOpcode {
                word: 0xffff,
                addr: 0x200
            }
        ));
        assert_eq!(Status::Halted, cpu.status());
    }

    #[test]
    fn key_wait_resumes_when_a_key_arrives() {
        // waitk v0, then spin on a jump
        let mut cpu = CPU::new(&[0xf0, 0x0a, 0x12, 0x02]).unwrap();
        let mut input = DummyInput::new([None, Some('a'), Some(QUIT_KEY)]);
        run(&mut cpu, &mut NullDisplay, &mut input, TEST_SPEED).unwrap();
        // the first cycle suspended, the second latched key A and stored it
        assert_eq!(0xa, cpu.v()[0]);
        assert_eq!(0x202, cpu.pc());
        assert_eq!(Status::Halted, cpu.status());
    }

    #[test]
    fn unmapped_symbols_clear_the_latch() {
        // sknp v0 skips when no key is latched
        let mut cpu = CPU::new(&[0xe0, 0xa1, 0x00, 0x00, 0x12, 0x04]).unwrap();
        let mut input = DummyInput::new([Some('z'), Some(QUIT_KEY)]);
        run(&mut cpu, &mut NullDisplay, &mut input, TEST_SPEED).unwrap();
        // 'z' is not a keypad key, so the skip landed on the spin at 0x204
        assert_eq!(0x204, cpu.pc());
        assert_eq!(None, cpu.key());
    }
}
