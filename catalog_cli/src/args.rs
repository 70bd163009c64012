use std::path::PathBuf;

use clap::{Parser, ValueEnum};

/// Catalog the types reachable from a set of roots in a JSON type universe
#[derive(Parser, Debug)]
#[command(name = "type-catalog", version, about)]
pub struct Args {
    /// JSON document describing the type universe
    #[arg(long, short)]
    pub universe: PathBuf,

    /// Discovery configuration file; falls back to `TYPE_CATALOG_CONFIG`, then defaults
    #[arg(long, short)]
    pub config: Option<PathBuf>,

    /// Root type, e.g. `Acme.Order`; repeatable
    #[arg(long = "root", short = 'r')]
    pub roots: Vec<String>,

    /// Also select every public type carrying this attribute; repeatable
    #[arg(long = "marker-attribute")]
    pub marker_attributes: Vec<String>,

    /// Also select every public type implementing this interface; repeatable
    #[arg(long = "marker-interface")]
    pub marker_interfaces: Vec<String>,

    /// Override the configured maximum walk depth
    #[arg(long)]
    pub max_depth: Option<usize>,

    /// Do not merge the built-in framework prelude into the universe
    #[arg(long, default_value_t = false)]
    pub no_prelude: bool,

    /// Manifest file (stdout if omitted)
    #[arg(long, short)]
    pub output: Option<PathBuf>,

    /// Emit the manifest on a single line
    #[arg(long, default_value_t = false)]
    pub compact: bool,

    /// Log level; `RUST_LOG` applies when omitted
    #[arg(long, value_enum)]
    pub log_level: Option<TracingLevel>,

    /// Write logs to this file instead of stderr
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}

/// Tracing levels accepted on the command line
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum TracingLevel {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl TracingLevel {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Error => "error",
            Self::Warn => "warn",
            Self::Info => "info",
            Self::Debug => "debug",
            Self::Trace => "trace",
        }
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, reason = "tests fail loudly on bad fixtures")]
mod tests {
    use super::*;

    #[test]
    fn test_repeated_roots_and_markers() {
        let args = Args::try_parse_from([
            "type-catalog",
            "--universe",
            "universe.json",
            "--root",
            "Acme.Order",
            "-r",
            "Acme.Report",
            "--marker-attribute",
            "GenerateCodec",
            "--log-level",
            "debug",
        ])
        .unwrap();

        assert_eq!(args.universe, PathBuf::from("universe.json"));
        assert_eq!(args.roots, vec!["Acme.Order", "Acme.Report"]);
        assert_eq!(args.marker_attributes, vec!["GenerateCodec"]);
        assert!(args.marker_interfaces.is_empty());
        assert_eq!(args.log_level, Some(TracingLevel::Debug));
        assert!(!args.compact);
        assert!(!args.no_prelude);
    }

    #[test]
    fn test_universe_is_required() {
        assert!(Args::try_parse_from(["type-catalog", "--root", "Acme.Order"]).is_err());
    }

    #[test]
    fn test_rejects_unknown_level() {
        assert!(
            Args::try_parse_from(["type-catalog", "-u", "u.json", "--log-level", "loud"]).is_err()
        );
    }
}
