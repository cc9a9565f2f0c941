use clap::{ArgAction, Parser};
use std::path::PathBuf;
use tracing::Level;

use crate::schema::Feature;

/// CLI arguments for the layout compiler
#[derive(Parser, Debug)]
#[command(name = "slotpack", about = "Deterministic storage layout compiler")]
pub struct Cli {
    /// Schema document (JSON with `fields` and optional `name`/`features`)
    pub schema: PathBuf,

    /// Enable a feature on top of those in the schema document.
    /// Repeatable, or comma separated (e.g. `mintable,record-patch`).
    #[arg(long = "feature", value_delimiter = ',')]
    pub features: Vec<Feature>,

    /// Print the persisted layout as JSON instead of the slot table
    #[arg(long)]
    pub json: bool,

    /// Compare the computed layout against a persisted layout file.
    /// Exits non-zero on the first field that differs.
    #[arg(long)]
    pub verify: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count)]
    pub verbose: u8,
}

impl Cli {
    /// Max tracing level selected by the `-v` count.
    pub fn log_level(&self) -> Level {
        match self.verbose {
            0 => Level::WARN,
            1 => Level::INFO,
            2 => Level::DEBUG,
            _ => Level::TRACE,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_minimal() {
        let cli = Cli::try_parse_from(["slotpack", "schema.json"]).unwrap();
        assert_eq!(cli.schema, PathBuf::from("schema.json"));
        assert!(cli.features.is_empty());
        assert!(!cli.json);
        assert!(cli.verify.is_none());
        assert_eq!(cli.log_level(), Level::WARN);
    }

    #[test]
    fn test_parse_features_repeated_and_delimited() {
        let cli = Cli::try_parse_from([
            "slotpack",
            "schema.json",
            "--feature",
            "mintable,record-patch",
            "--feature",
            "weak-reference",
        ])
        .unwrap();
        assert_eq!(
            cli.features,
            vec![Feature::Mintable, Feature::RecordPatch, Feature::WeakReference]
        );
    }

    #[test]
    fn test_parse_rejects_unknown_feature() {
        let result = Cli::try_parse_from(["slotpack", "schema.json", "--feature", "teleport"]);
        assert!(result.is_err(), "unknown feature should be rejected");
    }

    #[test]
    fn test_verbosity_levels() {
        let cli = Cli::try_parse_from(["slotpack", "s.json", "-v"]).unwrap();
        assert_eq!(cli.log_level(), Level::INFO);
        let cli = Cli::try_parse_from(["slotpack", "s.json", "-vv"]).unwrap();
        assert_eq!(cli.log_level(), Level::DEBUG);
        let cli = Cli::try_parse_from(["slotpack", "s.json", "-vvv"]).unwrap();
        assert_eq!(cli.log_level(), Level::TRACE);
    }

    #[test]
    fn test_verify_and_json_flags() {
        let cli =
            Cli::try_parse_from(["slotpack", "s.json", "--json", "--verify", "layout.json"])
                .unwrap();
        assert!(cli.json);
        assert_eq!(cli.verify, Some(PathBuf::from("layout.json")));
    }
}
