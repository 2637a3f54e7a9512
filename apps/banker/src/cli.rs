//! Command line interface definition

use banker_types::ColorChoice;
use clap::Parser;
use std::path::PathBuf;

/// banker - deadlock-avoiding resource allocator simulation
#[derive(Parser, Debug)]
#[command(name = "banker")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Deadlock-avoiding resource allocator simulation using the Banker's algorithm")]
#[command(long_about = None)]
pub struct Cli {
    /// Total units of each resource type
    #[arg(
        value_name = "CAPACITY",
        required = true,
        num_args = 1..,
        value_parser = clap::value_parser!(u32).range(1..)
    )]
    pub capacity: Vec<u32>,

    /// Number of consumers competing for resources
    #[arg(
        short = 'n',
        long,
        value_name = "N",
        value_parser = clap::builder::RangedU64ValueParser::<usize>::new().range(1..)
    )]
    pub consumers: Option<usize>,

    /// Milliseconds a consumer holds a grant before releasing it
    #[arg(long, value_name = "MS")]
    pub hold_ms: Option<u64>,

    /// Milliseconds a consumer waits between attempts
    #[arg(long, value_name = "MS")]
    pub pause_ms: Option<u64>,

    /// Seed for maximum assignment and request generation
    #[arg(long)]
    pub seed: Option<u64>,

    /// Stop after this many seconds instead of waiting for Ctrl-C
    #[arg(short, long, value_name = "SECS")]
    pub duration: Option<u64>,

    #[command(flatten)]
    pub global: GlobalArgs,
}

/// Output and configuration arguments
#[derive(Parser, Debug)]
pub struct GlobalArgs {
    /// Output in JSON format
    #[arg(long)]
    pub json: bool,

    /// Enable debug logging
    #[arg(long)]
    pub debug: bool,

    /// Color output control
    #[arg(long, value_enum)]
    pub color: Option<ColorChoice>,

    /// Use alternate config file
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::error::ErrorKind;

    #[test]
    fn test_parse_capacities_and_options() {
        let cli = Cli::try_parse_from([
            "banker",
            "10",
            "5",
            "7",
            "--consumers",
            "3",
            "--seed",
            "9",
            "--json",
        ])
        .unwrap();
        assert_eq!(cli.capacity, vec![10, 5, 7]);
        assert_eq!(cli.consumers, Some(3));
        assert_eq!(cli.seed, Some(9));
        assert!(cli.global.json);
        assert!(cli.duration.is_none());
    }

    #[test]
    fn test_capacity_required() {
        let err = Cli::try_parse_from(["banker"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::MissingRequiredArgument);
    }

    #[test]
    fn test_zero_capacity_rejected() {
        let err = Cli::try_parse_from(["banker", "3", "0"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ValueValidation);
    }

    #[test]
    fn test_malformed_capacity_rejected() {
        let err = Cli::try_parse_from(["banker", "three"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ValueValidation);

        let err = Cli::try_parse_from(["banker", "-4"]).unwrap_err();
        assert!(matches!(
            err.kind(),
            ErrorKind::ValueValidation | ErrorKind::UnknownArgument
        ));
    }

    #[test]
    fn test_zero_consumers_rejected() {
        let err = Cli::try_parse_from(["banker", "3", "--consumers", "0"]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ValueValidation);
    }

    #[test]
    fn test_cli_definition() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }
}
