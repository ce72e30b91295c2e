use std::fs;
use std::path::{Path, PathBuf};

use super::rules::RuleSet;
use crate::core::{Error, Result};

/// File name searched for in the working directory and its ancestors.
pub const CONFIG_FILE_NAME: &str = ".adoptmap.toml";

const MAX_TRAVERSAL_DEPTH: usize = 10;

/// Pure function to parse and validate rules from a TOML string
pub fn parse_and_validate_rules(contents: &str) -> Result<RuleSet> {
    let rules = toml::from_str::<RuleSet>(contents)?;
    rules.validate()?;
    Ok(rules)
}

/// Load rules from an explicit file. Missing or invalid files are errors.
pub fn load_rules_from_path(path: &Path) -> Result<RuleSet> {
    let contents = fs::read_to_string(path).map_err(|e| {
        Error::configuration(format!("cannot read {}: {}", path.display(), e))
    })?;
    parse_and_validate_rules(&contents).map_err(|e| {
        Error::configuration(format!("invalid rules in {}: {}", path.display(), e))
    })
}

/// Try a discovered config file; problems are logged and skipped.
pub(crate) fn try_load_rules_from_path(config_path: &Path) -> Option<RuleSet> {
    let contents = match fs::read_to_string(config_path) {
        Ok(contents) => contents,
        Err(e) => {
            if e.kind() != std::io::ErrorKind::NotFound {
                log::warn!(
                    "Failed to read config file {}: {}",
                    config_path.display(),
                    e
                );
            }
            return None;
        }
    };

    match parse_and_validate_rules(&contents) {
        Ok(rules) => {
            log::debug!(
                "Loaded rules version {} from {}",
                rules.version,
                config_path.display()
            );
            Some(rules)
        }
        Err(e) => {
            log::warn!(
                "Ignoring {}: {}. Using default rules.",
                config_path.display(),
                e
            );
            None
        }
    }
}

/// Pure function to generate directory ancestors up to a depth limit
pub fn directory_ancestors(start: PathBuf, max_depth: usize) -> impl Iterator<Item = PathBuf> {
    std::iter::successors(Some(start), |dir| {
        let mut parent = dir.clone();
        if parent.pop() {
            Some(parent)
        } else {
            None
        }
    })
    .take(max_depth)
}

/// Search `start` and its ancestors for a rules file.
pub fn discover_rules(start: PathBuf) -> Option<RuleSet> {
    directory_ancestors(start, MAX_TRAVERSAL_DEPTH)
        .map(|dir| dir.join(CONFIG_FILE_NAME))
        .find_map(|path| try_load_rules_from_path(&path))
}

/// Resolve the active rule set: explicit path, then discovery, then defaults.
pub fn load_rules(explicit: Option<&Path>) -> Result<RuleSet> {
    if let Some(path) = explicit {
        return load_rules_from_path(path);
    }

    let current = match std::env::current_dir() {
        Ok(dir) => dir,
        Err(e) => {
            log::warn!("Failed to get current directory: {}. Using default rules.", e);
            return Ok(RuleSet::default());
        }
    };

    Ok(discover_rules(current).unwrap_or_else(|| {
        log::debug!(
            "No {} found after checking {} directories. Using default rules.",
            CONFIG_FILE_NAME,
            MAX_TRAVERSAL_DEPTH
        );
        RuleSet::default()
    }))
}

/// Render rules as TOML for `adoptmap init`.
pub fn render_rules(rules: &RuleSet) -> Result<String> {
    toml::to_string_pretty(rules)
        .map_err(|e| Error::configuration(format!("cannot serialize rules: {}", e)))
}
