extern crate clap;

use crossbeam_channel::bounded;
use ctrlc;
use env_logger;
use log::{debug, error};

use std::fs;
use std::path::Path;

use rspk_core::{asm, cpu, mem};
use rspk_core::periph::{DebugHook, NopHook};
use rspk_periph::console::ConsoleScreen;
use rspk_periph::vfs::VfsContext;

fn fetch_config<'a>() -> clap::ArgMatches<'a> {
    let about = "RSPK is an assembler and emulator for the SPK-8 custom instruction set";
    let c = clap::App::new("RSPK")
        .version("0.1")
        .about(about)
        .subcommand(
            clap::SubCommand::with_name("asm")
                .about("Assemble a source file into a binary image")
                .arg(
                    clap::Arg::with_name("file")
                        .short("f")
                        .long("file")
                        .takes_value(true)
                        .required(true)
                        .help("The source file"),
                )
                .arg(
                    clap::Arg::with_name("output")
                        .short("o")
                        .long("output")
                        .takes_value(true)
                        .default_value("output.mem")
                        .help("The output file's name"),
                ),
        )
        .subcommand(
            clap::SubCommand::with_name("run")
                .about("Run a binary image")
                .arg(
                    clap::Arg::with_name("file")
                        .short("f")
                        .long("file")
                        .takes_value(true)
                        .required(true)
                        .help("The binary file to be loaded"),
                )
                .arg(
                    clap::Arg::with_name("memory")
                        .short("m")
                        .long("memory")
                        .takes_value(true)
                        .default_value("65536")
                        .help("How many bytes of memory the CPU is allocated"),
                )
                .arg(
                    clap::Arg::with_name("debug")
                        .short("d")
                        .long("debug")
                        .help("Block on single-step and breakpoint interrupts"),
                )
                .arg(
                    clap::Arg::with_name("dump")
                        .short("D")
                        .long("dump")
                        .help("Dump memory contents to a file after running"),
                ),
        );
    c.get_matches()
}

/// Interactive acknowledgment: announce the interrupt and wait for a
/// line on stdin before letting the engine resume.
struct StdinHook;

impl StdinHook {
    fn wait(&self, what: &str, pc: usize) {
        eprintln!("CPU: Interrupt: {}: {:#06x} (return to continue)", what, pc);
        let mut line = String::new();
        let _ = std::io::stdin().read_line(&mut line);
    }
}

impl DebugHook for StdinHook {
    fn on_single_step(&mut self, pc: usize) {
        self.wait("SingleStepInterrupt", pc);
    }

    fn on_breakpoint(&mut self, pc: usize) {
        self.wait("Breakpoint", pc);
    }
}

fn assemble_file(matches: &clap::ArgMatches) {
    let filename = matches.value_of("file").unwrap();
    let output = matches.value_of("output").unwrap();

    let source = match fs::read_to_string(filename) {
        Ok(source) => source,
        Err(e) => {
            error!("Unable to open file: {:?}. {}", filename, e);
            std::process::exit(1);
        }
    };

    let image = match asm::assemble(&source) {
        Ok(image) => image,
        Err(e) => {
            error!("error: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = fs::write(output, &image) {
        error!("Unable to write file: {:?}. {}", output, e);
        std::process::exit(1);
    }

    println!("Assembled successfully.");
}

fn run_file(matches: &clap::ArgMatches) {
    // Register for a ctrlc handler which will push a signal to the
    // application. If the handler triggers again before the first signal
    // was consumed, force close.
    let (ctrlc_tx, ctrlc_rx) = bounded(1);
    let res = ctrlc::set_handler(move || {
        if ctrlc_tx.is_full() == true {
            std::process::exit(-1);
        }
        let _res = ctrlc_tx.send(());
    });

    match res {
        Err(x) => {
            error!("Unable to register signal handler. {:?}.", x);
            return;
        }
        _ => {}
    }

    let filename = matches.value_of("file").unwrap();
    let mem_size = match matches.value_of("memory").unwrap().parse::<usize>() {
        Ok(size) => size,
        Err(_) => {
            error!("Invalid memory size. Exiting");
            std::process::exit(1);
        }
    };

    let image = match fs::read(filename) {
        Ok(image) => image,
        Err(e) => {
            error!("Unable to open file: {:?}. {}", filename, e);
            std::process::exit(1);
        }
    };

    let mut mm = mem::SpkMemoryMap::new(mem_size);
    if let Err(e) = mm.load_image(&image) {
        error!("{}. Exiting", e);
        std::process::exit(1);
    }

    let mut _vfs = VfsContext::new();
    if let Err(e) = _vfs.snapshot(Path::new("fs.json")) {
        error!("Unable to install the virtual filesystem. {}", e);
    }
    debug!("Loaded virtual filesystem");

    let debug_mode = matches.is_present("debug");
    let hook: Box<dyn DebugHook> = if debug_mode {
        Box::new(StdinHook)
    } else {
        Box::new(NopHook)
    };

    let mut _cpu = cpu::SpkCpu::new(mm, Box::new(ConsoleScreen::new()), hook);
    debug!("Loaded memory");
    debug!("Executing...");

    loop {
        // Check to see if we received a ctrlc signal. If we have, we
        // need to exit out of the loop and exit the application.
        if ctrlc_rx.len() > 0 {
            break;
        }

        match _cpu.step() {
            Ok(cpu::Step::Continue) => {}
            Ok(cpu::Step::Halted) => break,
            // The engine already reloaded the image; keep stepping from
            // the top of the program.
            Ok(cpu::Step::Restarted) => {}
            Err(fault) => {
                error!("CPU: Interrupt: {}", fault);
                break;
            }
        }
    }

    if debug_mode {
        _cpu.print_state();
    }

    if matches.is_present("dump") {
        match fs::write("dump.mem", _cpu.mem.contents()) {
            Ok(_) => debug!("Dumped memory"),
            Err(e) => error!("Unable to dump memory. {}", e),
        }
    }

    // Leave the terminal on a fresh line for the shell prompt
    println!();
}

fn main() {
    env_logger::init();

    let matches = fetch_config();
    match matches.subcommand_name() {
        Some("asm") => {
            let sub_matches = matches.subcommand_matches("asm").unwrap();
            assemble_file(sub_matches);
        }
        Some("run") => {
            let sub_matches = matches.subcommand_matches("run").unwrap();
            run_file(sub_matches);
        }
        _ => {
            error!("Invalid subcommand. Exiting");
            std::process::exit(1);
        }
    }
}
