// SerView - Interactive serial device terminal
use clap::Parser;
use serview::cli::{execute_command, load_configuration, Args};
use serview::infrastructure::logging::{init_logging, LogTarget};
use serview::tui::app::App;
use serview::SerViewResult;

#[tokio::main]
async fn main() {
    let args = Args::parse();

    let result = if args.is_tui() {
        run_tui(&args).await
    } else {
        execute_command(args).await
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

async fn run_tui(args: &Args) -> SerViewResult<()> {
    let (_, config) = load_configuration(args.config.as_deref())?;

    // The terminal owns stdout/stderr, so logs go to a file or nowhere
    let target = match (&config.global.log_file, args.quiet) {
        (Some(path), false) => LogTarget::File(path),
        _ => LogTarget::Discard,
    };
    init_logging(&config.global.log_level, args.verbose, target)?;

    let mut app = App::new(config)?;
    app.run().await
}
