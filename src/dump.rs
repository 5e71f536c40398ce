// (c) 2023 John A. Breaux
// This code is licensed under MIT license (see LICENSE for details)

//! Diagnostic state capture, and the fatal-error report

use crate::error::Error;
use owo_colors::OwoColorize;
use std::fmt::{Display, Formatter};

/// The opcode and address the machine halted on
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Fault {
    /// The offending word, when one was fetched at all
    pub word: Option<u16>,
    /// The address it was fetched from
    pub addr: u16,
}

/// Everything the debug collaborator gets about a stopped machine: the
/// register file, stack, timers, the fault location, and (on request) full
/// memory and framebuffer dumps.
#[derive(Clone, Debug, PartialEq)]
pub struct Snapshot {
    /// The general purpose registers
    pub v: [u8; 16],
    /// The I register
    pub i: u16,
    /// The program counter
    pub pc: u16,
    /// Count of live stack frames
    pub sp: usize,
    /// The saved call-site addresses, oldest first
    pub stack: Vec<u16>,
    /// The delay timer
    pub delay: u8,
    /// The sound timer
    pub sound: u8,
    /// Instructions executed so far
    pub cycle: usize,
    /// Where the machine died, if it died on a fatal error
    pub fault: Option<Fault>,
    /// Full memory image, when a full snapshot was requested
    pub memory: Option<Vec<u8>>,
    /// Rendered framebuffer, when a full snapshot was requested
    pub screen: Option<String>,
}

impl Display for Snapshot {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "PC: {:04x}, SP: {:04x}, I: {:04x}", self.pc, self.sp, self.i)?;
        for (i, gpr) in self.v.iter().enumerate() {
            write!(
                f,
                "v{i:X}: {gpr:02x} {}",
                match i % 4 {
                    3 => "\n",
                    _ => "",
                }
            )?;
        }
        writeln!(f, "DLY: {}, SND: {}, CYC: {:6}", self.delay, self.sound, self.cycle)?;
        if let Some(fault) = &self.fault {
            match fault.word {
                Some(word) => writeln!(f, "fault: opcode {:04x} at {:03x}", word, fault.addr)?,
                None => writeln!(f, "fault: fetch from {:03x}", fault.addr)?,
            }
        }
        if !self.stack.is_empty() {
            writeln!(f, "stack: {:03x?}", self.stack)?;
        }
        if let Some(memory) = &self.memory {
            writeln!(f, "memory:")?;
            for (addr, byte) in memory.iter().enumerate() {
                if addr % 16 == 0 {
                    write!(f, "{addr:>03x}: ")?;
                }
                write!(f, "{byte:02x}")?;
                match addr % 16 {
                    15 => writeln!(f)?,
                    i if i % 2 == 1 => write!(f, " ")?,
                    _ => {}
                }
            }
        }
        if let Some(screen) = &self.screen {
            write!(f, "{screen}")?;
        }
        Ok(())
    }
}

/// Prints the fatal-error report to stderr: the error, then the snapshot
pub fn report(error: &Error, snapshot: &Snapshot) {
    eprintln!("{}", error.bold().red());
    eprintln!("{snapshot}");
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot() -> Snapshot {
        Snapshot {
            v: [0; 16],
            i: 0,
            pc: 0x200,
            sp: 0,
            stack: vec![],
            delay: 0,
            sound: 0,
            cycle: 0,
            fault: None,
            memory: None,
            screen: None,
        }
    }

    #[test]
    fn report_names_the_fault() {
        let mut snap = snapshot();
        snap.fault = Some(Fault {
            word: Some(0xffff),
            addr: 0x200,
        });
        let text = snap.to_string();
        assert!(text.contains("ffff"));
        assert!(text.contains("200"));
    }

    #[test]
    fn full_dump_carries_all_of_memory() {
        let mut snap = snapshot();
        snap.memory = Some(vec![0xc5; 4096]);
        let text = snap.to_string();
        // 4096 bytes, 16 to a line
        assert_eq!(256, text.matches("c5c5 c5c5 c5c5 c5c5 c5c5 c5c5 c5c5 c5c5").count());
    }
}
