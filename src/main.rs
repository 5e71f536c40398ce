// (c) 2023 John A. Breaux
// This code is licensed under MIT license (see LICENSE for details)

//! Cricket: a Chip-8 virtual machine in Rust

use cricket::{
    cpu::CPU,
    dump::report,
    error::Result,
    run::{run, DEFAULT_SPEED},
    tui::{TermDisplay, TermInput},
};
use gumdrop::Options;
use std::path::PathBuf;

#[derive(Clone, Debug, PartialEq, Eq, Options)]
struct Arguments {
    #[options(help = "Load a ROM to run on Cricket.", required, free)]
    pub file: PathBuf,
    #[options(help = "Print this help message.")]
    help: bool,
    #[options(help = "Print a live disassembly while running.")]
    pub trace: bool,
    #[options(help = "Set the instructions-per-second rate.", meta = "IPS")]
    pub speed: Option<u64>,
    #[options(help = "Include a full memory dump in a fatal report.")]
    pub dump_memory: bool,
}

fn main() {
    let options = Arguments::parse_args_default_or_exit();
    let mut cpu = CPU::default();
    cpu.trace = options.trace;
    if let Err(e) = emulate(&mut cpu, &options) {
        report(&e, &cpu.snapshot(options.dump_memory));
        std::process::exit(1);
    }
}

fn emulate(cpu: &mut CPU, options: &Arguments) -> Result<()> {
    cpu.load_program(&options.file)?;
    let mut display = TermDisplay::new()?;
    let mut input = TermInput;
    run(cpu, &mut display, &mut input, options.speed.unwrap_or(DEFAULT_SPEED))
    // display drops here, restoring the terminal before any report prints
}
