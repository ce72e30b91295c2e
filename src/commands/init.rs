use anyhow::Result;
use std::fs;
use std::path::Path;

use crate::config::{render_rules, RuleSet, CONFIG_FILE_NAME};

pub fn init_config(force: bool) -> Result<()> {
    write_default_config(Path::new(CONFIG_FILE_NAME), force)?;
    println!("Created {} configuration file", CONFIG_FILE_NAME);
    Ok(())
}

pub fn write_default_config(config_path: &Path, force: bool) -> Result<()> {
    if config_path.exists() && !force {
        anyhow::bail!("Configuration file already exists. Use --force to overwrite.");
    }

    let header = "# adoptmap rules\n#\n# Every scoring constant lives here. Changing a value is a policy change:\n# bump `version` so reports show which rules produced them.\n\n";
    let body = render_rules(&RuleSet::default())?;
    fs::write(config_path, format!("{}{}", header, body))?;
    Ok(())
}
