//! ISS Simulator - CLI Entry Point
//!
//! Commands:
//! - `iss-sim run <program>` - Run a program until it halts
//! - `iss-sim check <program>` - Validate a program and list every error
//! - `iss-sim disasm <program>` - Print the canonical listing
//! - `iss-sim replay <program> <commands>` - Apply step/run/undo/redo/reset commands
//! - `iss-sim selftest` - Run the built-in scenario checks

use clap::{Parser, Subcommand};
use iss::{SimConfig, Simulator, StepResult};
use iss::asm::{load_source, SourceError, SourceFile};

#[derive(Parser)]
#[command(name = "iss-sim")]
#[command(version = "0.1.0")]
#[command(about = "An instructional simulator of a small 8-bit CPU")]
struct Cli {
    /// Increase log verbosity (-v debug, -vv trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// JSON config file (log_capacity, max_steps, history_limit)
    #[arg(short, long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run a program until it halts
    Run {
        /// Path to the assembly source file
        program: String,
        /// Maximum number of instructions to execute
        #[arg(short, long)]
        max_steps: Option<u64>,
        /// Print every executed step
        #[arg(short, long)]
        trace: bool,
        /// Print the final state as JSON
        #[arg(long)]
        json: bool,
    },
    /// Validate a program and report every error
    Check {
        /// Path to the assembly source file
        program: String,
    },
    /// Print the canonical program listing
    Disasm {
        /// Path to the assembly source file
        program: String,
    },
    /// Apply a comma-separated list of step|run|undo|redo|reset commands
    Replay {
        /// Path to the assembly source file
        program: String,
        /// Commands, e.g. "step,step,undo,redo"
        commands: String,
    },
    /// Run the built-in self-test
    Selftest,
}

fn main() {
    let cli = Cli::parse();

    let level = match cli.verbose {
        0 => log::LevelFilter::Warn,
        1 => log::LevelFilter::Debug,
        _ => log::LevelFilter::Trace,
    };
    env_logger::Builder::new()
        .filter_level(level)
        .parse_default_env()
        .init();

    let config = load_config(cli.config.as_deref());

    match cli.command {
        Some(Commands::Run { program, max_steps, trace, json }) => {
            let mut config = config;
            if let Some(max) = max_steps {
                config.max_steps = max;
            }
            run_program(&program, config, trace, json);
        }
        Some(Commands::Check { program }) => {
            check_program(&program);
        }
        Some(Commands::Disasm { program }) => {
            disassemble_file(&program);
        }
        Some(Commands::Replay { program, commands }) => {
            replay(&program, &commands, config);
        }
        Some(Commands::Selftest) => {
            run_self_test();
        }
        None => {
            println!("ISS Simulator v0.1.0");
            println!("An instructional 8-bit CPU simulator");
            println!();
            println!("Use --help for available commands");
        }
    }
}

fn load_config(path: Option<&str>) -> SimConfig {
    match path {
        Some(path) => match SimConfig::from_json_file(path) {
            Ok(config) => config,
            Err(e) => {
                eprintln!("❌ {}", e);
                std::process::exit(1);
            }
        },
        None => SimConfig::default(),
    }
}

/// Load a source file, printing every validation error and exiting on failure.
fn load_or_exit(path: &str) -> SourceFile {
    match load_source(path) {
        Ok(file) => file,
        Err(SourceError::Invalid(errors)) => {
            for e in &errors {
                eprintln!("❌ {}", e);
            }
            eprintln!("{} error(s) in {}", errors.len(), path);
            std::process::exit(1);
        }
        Err(e) => {
            eprintln!("❌ {}", e);
            std::process::exit(1);
        }
    }
}

fn run_program(path: &str, config: SimConfig, trace: bool, json: bool) {
    let file = load_or_exit(path);
    let mut sim = Simulator::with_config(config);
    sim.load_program(file.program);

    let results = match sim.run_all() {
        Ok(results) => results,
        Err(e) => {
            eprintln!("❌ Execution error at PC={}: {}", sim.state().pc(), e);
            std::process::exit(1);
        }
    };

    if trace {
        for result in &results {
            if let StepResult::Executed(record) = result {
                println!("{}  [{}]", record.event, record.bus);
            }
        }
    }

    let executed = results.iter().filter(|r| !r.is_halted()).count();

    if json {
        match serde_json::to_string_pretty(sim.state()) {
            Ok(text) => println!("{}", text),
            Err(e) => {
                eprintln!("❌ {}", e);
                std::process::exit(1);
            }
        }
    } else {
        print_state(&sim);
        println!("Steps: {}", executed);
    }

    if !sim.is_halted() {
        eprintln!("⚠️  Reached step limit ({}). Use --max-steps to increase.", sim.config().max_steps);
    }
}

fn check_program(path: &str) {
    let file = load_or_exit(path);
    println!("✓ {}: {} instruction(s), no errors", path, file.len());
}

fn disassemble_file(path: &str) {
    let file = load_or_exit(path);
    print!("{}", iss::asm::disassemble(&file.program));
}

fn replay(path: &str, commands: &str, config: SimConfig) {
    let file = load_or_exit(path);
    let mut sim = Simulator::with_config(config);
    sim.load_program(file.program);

    for command in commands.split(',').map(str::trim).filter(|c| !c.is_empty()) {
        let outcome = match command {
            "step" | "s" => match sim.step() {
                Ok(StepResult::Executed(record)) => record.event.to_string(),
                Ok(StepResult::Halted) => "halted".to_string(),
                Err(e) => format!("error: {}", e),
            },
            "run" => match sim.run_all() {
                Ok(results) => format!("ran {} step(s)", results.iter().filter(|r| !r.is_halted()).count()),
                Err(e) => format!("error: {}", e),
            },
            "undo" | "u" => match sim.undo() {
                Ok(state) => format!("undone, PC={}", state.pc()),
                Err(e) => e.to_string(),
            },
            "redo" | "r" => match sim.redo() {
                Ok(state) => format!("redone, PC={}", state.pc()),
                Err(e) => e.to_string(),
            },
            "reset" | "x" => {
                sim.reset();
                "reset".to_string()
            }
            other => {
                eprintln!("❌ Unknown command '{}'", other);
                std::process::exit(1);
            }
        };
        println!("> {:<6} {}", command, outcome);
        println!("  PC={} {:?} {}", sim.state().pc(), sim.registers(), sim.flags());
    }
}

fn print_state(sim: &Simulator) {
    let state = sim.state();
    println!("━━━ Registers ━━━");
    println!("{:?}", state.registers());
    println!("━━━ Special ━━━");
    let ir = state.ir().map(|i| i.to_string()).unwrap_or_default();
    println!("PC={} IR={} MAR={} MDR={}", state.pc(), ir, state.mar(), state.mdr());
    println!("FLAGS {}", state.flags());
    println!("━━━ Buses ━━━");
    println!("{}", state.bus());
    println!("━━━ Memory ━━━");
    for (i, cells) in state.memory().cells().chunks(8).enumerate() {
        let text: Vec<String> = cells.iter().map(|c| format!("{:3}", c)).collect();
        println!("{:02X}: {}", i * 8, text.join(" "));
    }
    println!("━━━ Control Signals ━━━");
    for event in sim.recent_events(8) {
        println!("{}", event);
    }
}

fn run_self_test() {
    println!("━━━ ISS Simulator Self-Test ━━━");
    println!();

    let mut passed = 0;
    let mut failed = 0;

    let mut check = |name: &str, ok: bool| {
        if ok {
            println!("{}... ✓", name);
            passed += 1;
        } else {
            println!("{}... ✗", name);
            failed += 1;
        }
    };

    // Test 1: add and store
    let ok = match Simulator::from_source("LOAD R0, 10\nLOAD R1, 20\nADD R2, R0, R1\nSTORE R2, 5") {
        Ok(mut sim) => {
            sim.run_all().is_ok()
                && sim.registers().values()[2] == 30
                && sim.memory().read(5) == Some(30)
                && !sim.flags().zero
                && !sim.flags().carry
        }
        Err(_) => false,
    };
    check("Add and store", ok);

    // Test 2: counting loop
    let ok = match Simulator::from_source("LOAD R6, 0\nLOAD R7, 5\nINC R6\nCMP R6, R7\nJNZ 2") {
        Ok(mut sim) => sim.run_all().is_ok() && sim.registers().values()[6] == 5 && sim.flags().zero,
        Err(_) => false,
    };
    check("Counting loop", ok);

    // Test 3: invalid register
    check("Invalid register rejected", iss::parse("ADD R9, R0, R1").is_err());

    // Test 4: undo/redo
    let ok = match Simulator::from_source("LOAD R0, 200\nADD R0, R0") {
        Ok(mut sim) => {
            let _ = sim.step();
            let before = sim.state().clone();
            let _ = sim.step();
            let after = sim.state().clone();
            let undone = sim.undo().map(|s| *s == before).unwrap_or(false);
            let redone = sim.redo().map(|s| *s == after).unwrap_or(false);
            undone && redone
        }
        Err(_) => false,
    };
    check("Undo/redo", ok);

    println!();
    println!("━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━");
    println!("Results: {} passed, {} failed", passed, failed);

    if failed == 0 {
        println!("✓ All tests passed!");
    } else {
        std::process::exit(1);
    }
}
