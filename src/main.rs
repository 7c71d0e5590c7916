use std::env;
use std::error::Error;
use std::fs;
use std::io::{self, stdin, Write};
use std::process;

use treelox::{ExitStatus, Outcome, Session};

fn main() {
    treelox::init_tracing();
    let args: Vec<String> = env::args().collect();

    if args.len() > 2 {
        println!("Usage: treelox [script]");
        process::exit(64);
    } else if args.len() == 2 {
        if let Err(error) = run_file(&args[1]) {
            eprintln!("Error reading file: {error}");
            process::exit(74);
        }
    } else if let Err(error) = run_prompt() {
        eprintln!("Error reading input: {error}");
        process::exit(74);
    }
}

fn run_file(path: &str) -> Result<(), Box<dyn Error>> {
    let text = fs::read_to_string(path)?;
    let outcome = Session::new().run_script(&text);
    report(&outcome);

    let status = outcome.status();
    if status != ExitStatus::Success {
        process::exit(status.code());
    }
    Ok(())
}

fn run_prompt() -> io::Result<()> {
    let mut session = Session::new();
    loop {
        print!("> ");
        io::stdout().flush()?;

        let mut input = String::new();
        if stdin().read_line(&mut input)? == 0 {
            break;
        }
        let outcome = session.run_interactive_line(&input);
        report(&outcome);
        if let Some(value) = outcome.value {
            println!("{value}");
        }
    }
    Ok(())
}

fn report(outcome: &Outcome) {
    for diagnostic in &outcome.diagnostics {
        eprintln!("{diagnostic}");
    }
    if let Some(error) = &outcome.runtime_error {
        eprintln!("{error}");
    }
}
