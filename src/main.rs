use cell_line_auth::cli;
use clap::Parser;
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    let cli = cli::Cli::parse();

    // Initialize logging based on verbosity flag
    let filter = if cli.verbose {
        EnvFilter::new("cell_line_auth=debug,info")
    } else {
        EnvFilter::new("cell_line_auth=warn")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        cli::Commands::Correlate(args) => {
            cli::correlate::run(args, cli.format, cli.verbose)?;
        }
        cli::Commands::Authenticate(args) => {
            cli::authenticate::run(args, cli.format, cli.verbose)?;
        }
        cli::Commands::Run(args) => {
            cli::run::run(args, cli.format, cli.verbose)?;
        }
    }

    Ok(())
}
