//! Non-interactive subcommands.

use crate::Commands;
use calcshell_core::ShellConfig;
use calcshell_plugins::{PluginCatalog, PluginLoader, discover};
use std::io::{self, Write};

pub fn handle_command(command: Commands, config: &ShellConfig) -> anyhow::Result<()> {
    let mut stdout = io::stdout();
    match command {
        Commands::Plugins => write_plugin_list(config, &mut stdout)?,
        Commands::Config => write_config(config, &mut stdout)?,
    }
    Ok(())
}

/// List discovered units and where their code would come from.
fn write_plugin_list(config: &ShellConfig, out: &mut dyn Write) -> io::Result<()> {
    let root = &config.plugins_dir;
    let units = discover(root);
    if units.is_empty() {
        writeln!(out, "No plugins found in {}", root.display())?;
        return Ok(());
    }

    let loader = PluginLoader::new(root, PluginCatalog::with_builtins());
    let width = units.iter().map(|u| u.name.len()).max().unwrap_or(0);
    writeln!(out, "Plugins in {} ({}):", root.display(), units.len())?;
    for unit in &units {
        writeln!(out, "  {:<width$}  {}", unit.name, loader.source_of(unit))?;
    }
    Ok(())
}

fn write_config(config: &ShellConfig, out: &mut dyn Write) -> anyhow::Result<()> {
    let rendered = toml::to_string_pretty(config)?;
    write!(out, "{rendered}")?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use tempfile::TempDir;

    fn config_in(dir: &std::path::Path) -> ShellConfig {
        ShellConfig {
            plugins_dir: dir.join("plugins"),
            ..Default::default()
        }
    }

    #[test]
    fn test_plugin_list_empty() {
        let dir = TempDir::new().unwrap();
        let config = config_in(dir.path());
        let mut out = Vec::new();
        write_plugin_list(&config, &mut out).unwrap();
        assert!(String::from_utf8(out).unwrap().starts_with("No plugins found in"));
    }

    #[test]
    fn test_plugin_list_sources() {
        let dir = TempDir::new().unwrap();
        let config = config_in(dir.path());
        std::fs::create_dir_all(config.plugins_dir.join("greet")).unwrap();
        std::fs::create_dir_all(config.plugins_dir.join("weather")).unwrap();

        let mut out = Vec::new();
        write_plugin_list(&config, &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = text.lines().skip(1).collect();
        assert_eq!(lines, vec!["  greet    bundled", "  weather  unknown"]);
    }

    #[test]
    fn test_config_renders_as_toml() {
        let mut out = Vec::new();
        write_config(&ShellConfig::default(), &mut out).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert!(text.contains("environment = \"production\""));
        assert!(text.contains("prompt = \">>> \""));
    }
}
