use std::path::PathBuf;

use clap::Parser;
use fileledger::{HashAlgorithm, RecursionThreshold};

#[derive(Debug, Parser)] // requires `derive` feature
#[command(name = "fileledger")]
#[command(
    about = "Catalog files, folders, and ZIP archives into a hashed manifest",
    long_about = None
)]
pub struct Cli {
    /// Files, directories, and ZIP archives to catalog
    #[arg(required = true)]
    pub inputs: Vec<PathBuf>,

    /// Hash algorithm used for every file in the run
    #[arg(short, long, value_enum)]
    pub algorithm: Option<HashAlgorithm>,

    /// Maximum member count for an archive's contents to be expanded
    #[arg(short = 't', long, conflicts_with_all = ["no_recursion", "unlimited"])]
    pub threshold: Option<usize>,

    /// Catalog archives themselves without expanding their contents
    #[arg(long)]
    pub no_recursion: bool,

    /// Expand every archive regardless of member count
    #[arg(long, conflicts_with = "no_recursion")]
    pub unlimited: bool,

    /// Directory the manifest is written to (defaults to the current directory)
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

impl Cli {
    /// Flags win over the configuration file; the 1000-member default applies
    /// when neither says anything.
    pub fn resolved_threshold(&self, config_limit: Option<usize>) -> RecursionThreshold {
        if self.no_recursion {
            RecursionThreshold::NoRecursion
        } else if self.unlimited {
            RecursionThreshold::Unlimited
        } else if let Some(limit) = self.threshold {
            RecursionThreshold::Max(limit)
        } else if let Some(limit) = config_limit {
            RecursionThreshold::Max(limit)
        } else {
            RecursionThreshold::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Cli {
        Cli::try_parse_from(args).unwrap()
    }

    #[test]
    fn test_threshold_flag_variants() {
        let cli = parse(&["fileledger", "in", "--no-recursion"]);
        assert_eq!(cli.resolved_threshold(None), RecursionThreshold::NoRecursion);

        let cli = parse(&["fileledger", "in", "--unlimited"]);
        assert_eq!(cli.resolved_threshold(None), RecursionThreshold::Unlimited);

        let cli = parse(&["fileledger", "in", "-t", "50"]);
        assert_eq!(cli.resolved_threshold(None), RecursionThreshold::Max(50));
    }

    #[test]
    fn test_threshold_defaults() {
        let cli = parse(&["fileledger", "in"]);
        assert_eq!(cli.resolved_threshold(Some(25)), RecursionThreshold::Max(25));
        assert_eq!(cli.resolved_threshold(None), RecursionThreshold::default());
    }

    #[test]
    fn test_conflicting_flags_rejected() {
        assert!(Cli::try_parse_from(["fileledger", "in", "--no-recursion", "--unlimited"]).is_err());
        assert!(Cli::try_parse_from(["fileledger", "in", "-t", "5", "--unlimited"]).is_err());
    }

    #[test]
    fn test_inputs_required() {
        assert!(Cli::try_parse_from(["fileledger"]).is_err());
    }

    #[test]
    fn test_algorithm_parses() {
        let cli = parse(&["fileledger", "in", "--algorithm", "sha3-256"]);
        assert_eq!(cli.algorithm, Some(HashAlgorithm::Sha3_256));
    }
}
