use std::process;

use docker_autostart::cli::{self, Cli};
use docker_autostart::{app, logging, platform};

fn main() {
    let cli = Cli::parse_args(std::env::args_os());

    if cli.command.is_empty() {
        eprint!("{}", cli::usage());
        process::exit(1);
    }

    logging::init(cli.verbosity());

    let config = match cli.resolve_config() {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {e:#}");
            process::exit(1);
        }
    };

    let desktop = platform::select(std::env::consts::OS, &config.desktop);

    match app::run(&config, desktop.as_ref(), &cli.command) {
        Ok(code) => process::exit(code),
        Err(e) => {
            eprintln!("{e:#}");
            process::exit(1);
        }
    }
}
