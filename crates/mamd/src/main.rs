//! MaMD CLI - Markdown to HTML static site generator.
//!
//! Converts every Markdown file under the input directory into an HTML page
//! at the mirrored location under the output directory.

mod build;
mod error;
mod output;

use clap::Parser;
use tracing_subscriber::EnvFilter;

use build::BuildArgs;
use output::Output;

/// MaMD - Markdown to HTML static site generator.
#[derive(Parser)]
#[command(name = "mamd", version, about)]
struct Cli {
    #[command(flatten)]
    build: BuildArgs,
}

fn main() {
    let cli = Cli::parse();
    let output = Output::new();

    // --verbose enables INFO level, otherwise use RUST_LOG
    let filter = if cli.build.verbose {
        EnvFilter::new("info")
    } else {
        EnvFilter::from_default_env()
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    if let Err(err) = cli.build.execute(&output) {
        output.error(&format!("Error: {err}"));
        std::process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_input_is_required() {
        assert!(Cli::try_parse_from(["mamd"]).is_err());
    }

    #[test]
    fn test_output_defaults_to_cwd() {
        let cli = Cli::try_parse_from(["mamd", "-i", "docs"]).unwrap();
        assert_eq!(cli.build.input, std::path::PathBuf::from("docs"));
        assert_eq!(cli.build.output, std::path::PathBuf::from("."));
        assert!(!cli.build.verbose);
    }
}
