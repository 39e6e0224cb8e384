// Binary entry point for the command-line tool.
use clap::Parser;
use pcheck::cli::{self, Cli};
use simplelog::{ColorChoice, TermLogger, TerminalMode};

fn main() {
    let cli = Cli::parse();

    // Logs go to stderr so JSON output on stdout stays clean.
    if let Err(e) = TermLogger::init(
        cli.log_level(),
        simplelog::Config::default(),
        TerminalMode::Stderr,
        ColorChoice::Auto,
    ) {
        eprintln!("Failed to initialize logger: {}", e);
    }

    match cli::run(cli) {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            eprintln!("Error: {:#}", e);
            std::process::exit(1);
        }
    }
}
