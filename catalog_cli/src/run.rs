use std::io::Write;
use std::path::Path;

use error_stack::{Report, ResultExt};
use tracing::{debug, info};
use type_catalog::{
    DescriptorEmitter, DiscoveryConfig, EntryPointSelector, Error, JsonUniverse, ManifestEmitter,
    MarkerSelector, Result, TypeRef, discover,
};

use crate::args::Args;

/// Load, discover, emit
pub fn run(args: &Args) -> Result<()> {
    let config = load_config(args)?;
    let universe = load_universe(&args.universe, !args.no_prelude)?;
    let roots = select_roots(args, &universe)?;

    let catalog = discover(&universe, &config, &roots)?;
    let emitter = if args.compact {
        ManifestEmitter::compact()
    } else {
        ManifestEmitter::pretty()
    };
    let manifest = emitter.emit(&catalog)?;
    write_manifest(args.output.as_deref(), &manifest)
}

fn load_config(args: &Args) -> Result<DiscoveryConfig> {
    let mut config = match &args.config {
        Some(path) => DiscoveryConfig::from_json_file(path)?,
        None => DiscoveryConfig::load()?,
    };
    if let Some(max_depth) = args.max_depth {
        config.max_depth = max_depth;
    }
    config.validate()?;
    Ok(config)
}

fn load_universe(path: &Path, with_prelude: bool) -> Result<JsonUniverse> {
    let universe = JsonUniverse::from_file(path)?;
    if with_prelude {
        universe.with_prelude()
    } else {
        Ok(universe)
    }
}

/// Explicit roots first, then marker selections, without repeats
fn select_roots(args: &Args, universe: &JsonUniverse) -> Result<Vec<TypeRef>> {
    let mut roots: Vec<TypeRef> = Vec::new();
    for root in &args.roots {
        let root = TypeRef::from(root);
        if !roots.contains(&root) {
            roots.push(root);
        }
    }

    if let Some(selector) = marker_selector(args) {
        let selected = selector
            .select_roots(universe)
            .attach("While selecting marked types")?;
        debug!(selected = selected.len(), "Marker selection complete");
        for root in selected {
            if !roots.contains(&root) {
                roots.push(root);
            }
        }
    }

    if roots.is_empty() {
        return Err(Report::new(Error::invalid(
            "roots",
            "pass --root, --marker-attribute, or --marker-interface",
        )));
    }
    info!(roots = roots.len(), "Resolved roots");
    Ok(roots)
}

fn marker_selector(args: &Args) -> Option<MarkerSelector> {
    let attributes = args
        .marker_attributes
        .iter()
        .map(|name| MarkerSelector::with_attribute(name.as_str()));
    let interfaces = args
        .marker_interfaces
        .iter()
        .map(|name| MarkerSelector::implementing(name.as_str()));
    attributes.chain(interfaces).reduce(MarkerSelector::or)
}

fn write_manifest(output: Option<&Path>, manifest: &str) -> Result<()> {
    match output {
        Some(path) => {
            std::fs::write(path, format!("{manifest}\n"))
                .map_err(|e| Error::io_failed("write manifest", path, e))?;
            info!(path = %path.display(), "Wrote manifest");
        },
        None => {
            let mut stdout = std::io::stdout().lock();
            writeln!(stdout, "{manifest}")
                .map_err(|e| Error::io_failed("write manifest", Path::new("<stdout>"), e))?;
        },
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used, reason = "tests fail loudly on bad fixtures")]
mod tests {
    use std::path::PathBuf;

    use clap::Parser;
    use serde_json::{Value, json};
    use tempfile::TempDir;

    use super::*;

    fn write_universe(dir: &TempDir) -> PathBuf {
        let path = dir.path().join("universe.json");
        let document = json!({
            "types": {
                "Acme.Order": {
                    "kind": "class",
                    "attributes": [{ "type": "Acme.GenerateCodecAttribute" }],
                    "members": [
                        { "name": "Lines", "kind": "property", "type": "System.Collections.Generic.List<Acme.LineItem>" }
                    ]
                },
                "Acme.LineItem": {
                    "kind": "class",
                    "members": [{ "name": "Sku", "kind": "property", "type": "string" }]
                },
                "Acme.Report": {
                    "kind": "class",
                    "members": [
                        { "name": "Totals", "kind": "property", "type": "System.Collections.Generic.Dictionary<string, decimal>" }
                    ]
                }
            }
        });
        std::fs::write(&path, document.to_string()).unwrap();
        path
    }

    fn parse_args(dir: &TempDir, extra: &[&str]) -> Args {
        let universe = write_universe(dir);
        let mut argv = vec![
            "type-catalog".to_string(),
            "--universe".to_string(),
            universe.display().to_string(),
        ];
        argv.extend(extra.iter().map(ToString::to_string));
        Args::try_parse_from(argv).unwrap()
    }

    #[test]
    fn test_writes_manifest_file() {
        let dir = TempDir::new().unwrap();
        let output = dir.path().join("manifest.json");
        let args = parse_args(
            &dir,
            &["--root", "Acme.Order", "--output", output.to_str().unwrap(), "--compact"],
        );

        run(&args).unwrap();

        let manifest: Value = serde_json::from_str(&std::fs::read_to_string(&output).unwrap()).unwrap();
        assert_eq!(manifest["roots"], json!(["Acme.Order"]));
        let composites: Vec<&str> = manifest["composites"]
            .as_array()
            .unwrap()
            .iter()
            .map(|composite| composite["type"].as_str().unwrap())
            .collect();
        assert_eq!(composites, vec!["Acme.LineItem", "Acme.Order"]);
    }

    #[test]
    fn test_explicit_roots_precede_marked_roots() {
        let dir = TempDir::new().unwrap();
        let args = parse_args(
            &dir,
            &[
                "--root",
                "Acme.Report",
                "--root",
                "Acme.Report",
                "--marker-attribute",
                "GenerateCodec",
            ],
        );
        let universe = load_universe(&args.universe, true).unwrap();

        let roots = select_roots(&args, &universe).unwrap();
        assert_eq!(roots, vec![TypeRef::from("Acme.Report"), TypeRef::from("Acme.Order")]);
    }

    #[test]
    fn test_no_roots_is_an_error() {
        let dir = TempDir::new().unwrap();
        let args = parse_args(&dir, &[]);
        let universe = load_universe(&args.universe, true).unwrap();

        let error = select_roots(&args, &universe).unwrap_err();
        assert!(matches!(error.current_context(), Error::InvalidArgument(_)));
    }

    #[test]
    fn test_max_depth_override_is_validated() {
        let dir = TempDir::new().unwrap();
        let config_path = dir.path().join("config.json");
        std::fs::write(&config_path, r#"{ "containerDescriptors": "never" }"#).unwrap();

        let args = parse_args(&dir, &["--config", config_path.to_str().unwrap(), "--max-depth", "0"]);
        let error = load_config(&args).unwrap_err();
        assert!(matches!(error.current_context(), Error::Configuration(_)));

        let args = parse_args(&dir, &["--config", config_path.to_str().unwrap(), "--max-depth", "8"]);
        let config = load_config(&args).unwrap();
        assert_eq!(config.max_depth, 8);
        assert_eq!(config.container_descriptors, type_catalog::ContainerDescriptorPolicy::Never);
    }

    #[test]
    fn test_missing_universe_is_a_file_error() {
        let dir = TempDir::new().unwrap();
        let error = load_universe(&dir.path().join("absent.json"), true).unwrap_err();
        assert!(matches!(error.current_context(), Error::FileOperation(_)));
    }
}
