// (c) 2023 John A. Breaux
// This code is licensed under MIT license (see LICENSE for details)

//! Decodes and runs instructions

#[cfg(test)]
mod tests;

pub mod behavior;
pub mod instruction;

use self::{
    behavior::Flow,
    instruction::{decode, Decoded, Insn},
};
use crate::{
    dump::{Fault, Snapshot},
    error::{Error, Result},
    io::DisplaySink,
    mem::{Mem, PROGRAM_BASE},
    screen::Screen,
};
use owo_colors::OwoColorize;
use std::fmt::Debug;

type Reg = usize;
type Adr = u16;
type Nib = u8;

/// Call stack capacity, in return addresses
pub const STACK_DEPTH: usize = 15;

/// Whether the machine is live or stopped for good.
///
/// The only transition is Running → Halted, on a fatal error or a deliberate
/// quit. There is no resume; [CPU::reset] starts over instead.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Status {
    /// The machine executes instructions
    #[default]
    Running,
    /// The machine ignores everything until reset
    Halted,
}

/// Represents the internal state of the interpreter
#[derive(Clone, PartialEq)]
pub struct CPU {
    /// Set to print a live disassembly of every executed instruction
    pub trace: bool,
    // memory
    mem: Mem,
    stack: Vec<Adr>,
    // registers
    pc: Adr,
    i: Adr,
    v: [u8; 16],
    delay: u8,
    sound: u8,
    // I/O
    screen: Screen,
    key: Option<u8>,
    // Execution data
    status: Status,
    cycle: usize,
    fault: Option<Fault>,
}

// public interface
impl CPU {
    /// Constructs a machine with `rom` loaded at the program base
    /// # Examples
    /// ```rust
    /// # use cricket::prelude::*;
    /// let cpu = CPU::new(&[0x60, 0x05]).unwrap();
    /// assert_eq!(0x200, cpu.pc());
    /// ```
    pub fn new(rom: &[u8]) -> Result<Self> {
        let mut cpu = CPU::default();
        cpu.load_program_bytes(rom)?;
        Ok(cpu)
    }

    /// Loads a program image from a file into the machine's program space
    pub fn load_program(&mut self, rom: impl AsRef<std::path::Path>) -> Result<&mut Self> {
        self.load_program_bytes(&std::fs::read(rom)?)
    }

    /// Loads a program image into the machine's program space
    pub fn load_program_bytes(&mut self, rom: &[u8]) -> Result<&mut Self> {
        self.mem.clear_program();
        self.mem.load(rom)?;
        Ok(self)
    }

    /// Latches the currently pressed key, or clears the latch.
    ///
    /// Keypad codes are `0x0..=0xF`; anything else is [Error::InvalidKey].
    /// The cycle driver refreshes the latch once per cycle.
    pub fn set_key(&mut self, key: Option<u8>) -> Result<()> {
        if let Some(key) = key {
            if key > 0xf {
                return Err(Error::InvalidKey { key });
            }
        }
        self.key = key;
        Ok(())
    }

    /// The latched key, if one is currently pressed
    pub fn key(&self) -> Option<u8> {
        self.key
    }

    /// Gets a slice of the general purpose registers
    pub fn v(&self) -> &[u8] {
        self.v.as_slice()
    }

    /// Gets the program counter
    /// # Examples
    /// ```rust
    /// # use cricket::prelude::*;
    /// let cpu = CPU::default();
    /// assert_eq!(0x200, cpu.pc());
    /// ```
    pub fn pc(&self) -> u16 {
        self.pc
    }

    /// Gets the I register
    pub fn i(&self) -> u16 {
        self.i
    }

    /// Gets the value in the delay timer
    pub fn delay(&self) -> u8 {
        self.delay
    }

    /// Gets the value in the sound timer (tracked, but never audible)
    pub fn sound(&self) -> u8 {
        self.sound
    }

    /// Count of return addresses currently on the stack
    pub fn sp(&self) -> usize {
        self.stack.len()
    }

    /// Gets the number of instructions the machine has executed
    pub fn cycle(&self) -> usize {
        self.cycle
    }

    /// The machine's lifecycle state
    pub fn status(&self) -> Status {
        self.status
    }

    /// True until the machine halts
    pub fn is_running(&self) -> bool {
        self.status == Status::Running
    }

    /// The logical framebuffer
    pub fn screen(&self) -> &Screen {
        &self.screen
    }

    /// The whole address space, for diagnostics and tests
    pub fn memory(&self) -> &[u8] {
        self.mem.as_slice()
    }

    /// Stops the machine deliberately. There is no way back but [CPU::reset].
    pub fn halt(&mut self) {
        self.status = Status::Halted;
    }

    /// Decrements both timers by one tick.
    ///
    /// Driven by the fixed-rate clock in [crate::run], never by instruction
    /// count, so timer decay is independent of host speed.
    pub fn tick_timers(&mut self) {
        self.delay = self.delay.saturating_sub(1);
        self.sound = self.sound.saturating_sub(1);
    }

    /// Resets the machine.
    ///
    /// Registers, timers, stack, framebuffer, key latch, status and cycle
    /// count return to their initial values. Memory is untouched, so the
    /// loaded program survives.
    pub fn reset(&mut self) {
        self.stack.truncate(0);
        self.pc = PROGRAM_BASE;
        self.i = 0;
        self.v = [0; 16];
        self.delay = 0;
        self.sound = 0;
        self.screen.clear();
        self.key = None;
        self.status = Status::Running;
        self.cycle = 0;
        self.fault = None;
    }

    /// Executes a single instruction, reporting flipped pixels to `display`.
    ///
    /// A halted machine does nothing. A fatal condition — unknown opcode,
    /// stack misuse, out-of-bounds access — halts the machine before the
    /// error returns, and records the faulting opcode and address for the
    /// diagnostic snapshot.
    /// # Examples
    /// ```rust
    /// # use cricket::prelude::*;
    /// let mut cpu = CPU::new(&[0x12, 0x00]).unwrap(); // jmp 0x200
    /// cpu.step(&mut NullDisplay).unwrap();
    /// assert_eq!(0x200, cpu.pc());
    /// assert_eq!(1, cpu.cycle());
    /// ```
    pub fn step(&mut self, display: &mut impl DisplaySink) -> Result<&mut Self> {
        if self.status == Status::Halted {
            return Ok(self);
        }
        let addr = self.pc;
        let word = match self.mem.read_word(addr) {
            Ok(word) => word,
            Err(e) => return Err(self.fail(None, addr, e)),
        };
        let insn: Insn = match decode(word) {
            Decoded::Insn(insn) => insn,
            Decoded::Unknown(word) => {
                return Err(self.fail(Some(word), addr, Error::UnknownOpcode { word, addr }))
            }
        };
        self.cycle += 1;

        // Print instruction disassembly:
        if self.trace {
            std::println!("{:3} {:03x}: {}", self.cycle.bright_black(), addr, insn);
        }

        match self.execute(insn, display) {
            Ok(Flow::Advance) => self.pc = addr.wrapping_add(2),
            Ok(Flow::Skip) => self.pc = addr.wrapping_add(4),
            Ok(Flow::Jump(a)) => self.pc = a,
            Ok(Flow::Suspend(_)) => {}
            Err(e) => return Err(self.fail(Some(word), addr, e)),
        }
        Ok(self)
    }

    /// Captures the diagnostic snapshot; `full` includes the memory image
    /// and the rendered framebuffer
    pub fn snapshot(&self, full: bool) -> Snapshot {
        Snapshot {
            v: self.v,
            i: self.i,
            pc: self.pc,
            sp: self.stack.len(),
            stack: self.stack.clone(),
            delay: self.delay,
            sound: self.sound,
            cycle: self.cycle,
            fault: self.fault,
            memory: full.then(|| self.mem.as_slice().to_vec()),
            screen: full.then(|| self.screen.to_string()),
        }
    }

    /// Marks the machine halted and records where it died
    fn fail(&mut self, word: Option<u16>, addr: Adr, e: Error) -> Error {
        self.status = Status::Halted;
        self.fault = Some(Fault { word, addr });
        e
    }
}

impl Debug for CPU {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CPU")
            .field("status", &self.status)
            .field("stack", &self.stack)
            .field("pc", &self.pc)
            .field("i", &self.i)
            .field("v", &self.v)
            .field("delay", &self.delay)
            .field("sound", &self.sound)
            .field("key", &self.key)
            .field("cycle", &self.cycle)
            .field("fault", &self.fault)
            .finish_non_exhaustive()
    }
}

impl Default for CPU {
    /// Constructs a new CPU with cleared state, an empty program space, and
    /// pc at the program base
    fn default() -> Self {
        CPU {
            trace: false,
            mem: Mem::default(),
            stack: Vec::with_capacity(STACK_DEPTH),
            pc: PROGRAM_BASE,
            i: 0,
            v: [0; 16],
            delay: 0,
            sound: 0,
            screen: Screen::default(),
            key: None,
            status: Status::Running,
            cycle: 0,
            fault: None,
        }
    }
}
