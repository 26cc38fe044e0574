//! Load `memc_load.toml` (CLI only). Library callers build [`Opts`] themselves.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use crate::Opts;

#[derive(Debug, Default, Deserialize)]
pub(crate) struct LoaderToml {
    #[serde(default)]
    settings: SettingsSection,
    /// Category → `host:port`. Adds categories or replaces default addresses.
    #[serde(default)]
    shards: BTreeMap<String, String>,
}

#[derive(Debug, Default, Deserialize)]
struct SettingsSection {
    log: Option<String>,
    pattern: Option<String>,
    readers: Option<usize>,
    writers: Option<usize>,
    batch_size: Option<usize>,
    dry_run: Option<bool>,
    verbose: Option<bool>,
}

pub(crate) fn parse_loader_toml(s: &str) -> Result<LoaderToml> {
    toml::from_str(s).context("parse config")
}

/// Read the config file. An explicit path must exist; the default one is optional.
pub(crate) fn load_loader_toml(path: &Path, required: bool) -> Result<Option<LoaderToml>> {
    if !required && !path.is_file() {
        return Ok(None);
    }
    let s = std::fs::read_to_string(path)
        .with_context(|| format!("read config {}", path.display()))?;
    parse_loader_toml(&s)
        .with_context(|| format!("config {}", path.display()))
        .map(Some)
}

/// Overwrite opts field from file when present.
macro_rules! apply_file_opt {
    ($idx:expr, $opts:expr, $idx_field:ident => $opts_field:ident) => {
        if let Some(v) = $idx.$idx_field {
            $opts.$opts_field = v;
        }
    };
}

/// Apply file config to opts (only fields present in the file). Call before applying CLI.
pub(crate) fn apply_file_to_opts(file: &LoaderToml, opts: &mut Opts) {
    let s = &file.settings;
    if let Some(ref p) = s.log {
        opts.log_path = PathBuf::from(p);
    }
    if let Some(ref p) = s.pattern {
        opts.pattern = p.clone();
    }
    apply_file_opt!(s, opts, readers => readers);
    apply_file_opt!(s, opts, writers => writers);
    apply_file_opt!(s, opts, batch_size => batch_size);
    apply_file_opt!(s, opts, dry_run => dry_run);
    apply_file_opt!(s, opts, verbose => verbose);
    for (category, addr) in &file.shards {
        opts.shards.insert(category.clone(), addr.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn file_overrides_defaults() {
        let file = parse_loader_toml(
            r#"
            [settings]
            pattern = "/srv/in/*.tsv.gz"
            readers = 8
            batch_size = 500

            [shards]
            idfa = "10.0.0.1:11211"
            ios = "10.0.0.9:11211"
            "#,
        )
        .unwrap();
        let mut opts = Opts::default();
        apply_file_to_opts(&file, &mut opts);
        assert_eq!(opts.pattern, "/srv/in/*.tsv.gz");
        assert_eq!(opts.readers, 8);
        assert_eq!(opts.writers, 3);
        assert_eq!(opts.batch_size, 500);
        assert_eq!(opts.shards["idfa"], "10.0.0.1:11211");
        assert_eq!(opts.shards["gaid"], "127.0.0.1:33014");
        assert_eq!(opts.shards["ios"], "10.0.0.9:11211");
        assert_eq!(opts.shards.len(), 5);
    }

    #[test]
    fn empty_file_changes_nothing() {
        let file = parse_loader_toml("").unwrap();
        let mut opts = Opts::default();
        apply_file_to_opts(&file, &mut opts);
        assert_eq!(opts.pattern, "./data/*.tsv.gz");
        assert_eq!(opts.shards.len(), 4);
    }

    #[test]
    fn unknown_types_are_rejected() {
        assert!(parse_loader_toml("[settings]\nreaders = \"many\"").is_err());
    }

    #[test]
    fn missing_default_file_is_fine() {
        let r = load_loader_toml(Path::new("/nonexistent/memc_load.toml"), false).unwrap();
        assert!(r.is_none());
        assert!(load_loader_toml(Path::new("/nonexistent/memc_load.toml"), true).is_err());
    }
}
