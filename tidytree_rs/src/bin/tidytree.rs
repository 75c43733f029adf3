use std::any::Any;
use std::panic;
use std::process::ExitCode;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use tidytree::cli::{Cli, dispatch};

fn install_broken_pipe_handler() {
    let default_hook = panic::take_hook();
    panic::set_hook(Box::new(move |info| {
        let payload = info.payload();
        let is_broken = <dyn Any>::downcast_ref::<&str>(payload)
            .is_some_and(|s| s.contains("Broken pipe"))
            || <dyn Any>::downcast_ref::<String>(payload)
                .is_some_and(|s| s.contains("Broken pipe"));

        if is_broken {
            // Downstream closed the pipe (e.g. `tidytree propose | head`).
            std::process::exit(0);
        }

        default_hook(info);
    }));
}

fn main() -> ExitCode {
    install_broken_pipe_handler();

    let cli = Cli::parse();

    // Logs go to stderr so stdout stays clean for reports and JSON.
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| cli.global.log_directive().parse().unwrap_or_default()),
        )
        .init();

    if cli.global.no_color {
        console::set_colors_enabled(false);
        console::set_colors_enabled_stderr(false);
    }

    match dispatch(&cli) {
        Ok(code) => code,
        Err(e) => {
            if cli.global.verbose {
                eprintln!("error: {:?}", e);
            } else {
                eprintln!("error: {}", e);
            }
            ExitCode::FAILURE
        }
    }
}
