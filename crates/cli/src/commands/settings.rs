//! Persisted CLI defaults

use anyhow::{Context, Result};
use colored::Colorize;
use sim_lib::TimeRange;

use crate::config::Config;
use crate::output::{print_info, print_json, print_success, print_warning, OutputFormat};

/// Changes requested by `meshsim config set`
#[derive(Debug, Default)]
pub struct DefaultsUpdate {
    pub namespace: Option<String>,
    pub service: Option<String>,
    pub workload: Option<String>,
    pub range: Option<String>,
    pub format: Option<OutputFormat>,
    pub seed: Option<u64>,
    pub clear_seed: bool,
}

impl DefaultsUpdate {
    fn is_empty(&self) -> bool {
        self.namespace.is_none()
            && self.service.is_none()
            && self.workload.is_none()
            && self.range.is_none()
            && self.format.is_none()
            && self.seed.is_none()
            && !self.clear_seed
    }

    /// Apply the update to `config`, validating the range
    pub fn apply(self, config: &mut Config) -> Result<()> {
        if let Some(range) = self.range {
            let parsed: TimeRange = range.parse().context("Invalid default range")?;
            config.default_range = Some(parsed.to_string());
        }
        if let Some(namespace) = self.namespace {
            config.default_namespace = Some(namespace);
        }
        if let Some(service) = self.service {
            config.default_service = Some(service);
        }
        if let Some(workload) = self.workload {
            config.default_workload = Some(workload);
        }
        if let Some(format) = self.format {
            config.default_format = Some(
                match format {
                    OutputFormat::Table => "table",
                    OutputFormat::Json => "json",
                }
                .to_string(),
            );
        }
        if self.clear_seed {
            config.seed = None;
        } else if let Some(seed) = self.seed {
            config.seed = Some(seed);
        }
        Ok(())
    }
}

/// Show the stored defaults
pub fn show_config(format: OutputFormat) -> Result<()> {
    let path = Config::config_path()?;
    let config = Config::load_from(&path)?;

    match format {
        OutputFormat::Json => print_json(&config)?,
        OutputFormat::Table => {
            println!("{}", "CLI Defaults".bold());
            println!("{}", "=".repeat(50));
            println!("File:                   {}", path.display().to_string().dimmed());
            println!("Namespace:              {}", display(&config.default_namespace));
            println!("Service:                {}", display(&config.default_service));
            println!("Workload:               {}", display(&config.default_workload));
            println!("Range:                  {}", display(&config.default_range));
            println!("Format:                 {}", display(&config.default_format));
            println!(
                "Seed:                   {}",
                config
                    .seed
                    .map(|s| s.to_string())
                    .unwrap_or_else(|| "-".to_string())
            );
            if config.engine.is_some() {
                print_info("Engine overrides present");
            }
        }
    }

    Ok(())
}

/// Update and save the stored defaults
pub fn set_config(update: DefaultsUpdate) -> Result<()> {
    if update.is_empty() {
        print_warning("Nothing to update");
        return Ok(());
    }

    let mut config = Config::load()?;
    update.apply(&mut config)?;
    let path = config.save()?;

    print_success(&format!("Saved defaults to {}", path.display()));
    Ok(())
}

fn display(value: &Option<String>) -> String {
    value.clone().unwrap_or_else(|| "-".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_apply_normalises_range() {
        let mut config = Config::default();
        DefaultsUpdate {
            range: Some(" 7d ".to_string()),
            format: Some(OutputFormat::Json),
            seed: Some(3),
            ..DefaultsUpdate::default()
        }
        .apply(&mut config)
        .unwrap();

        assert_eq!(config.default_range.as_deref(), Some("7d"));
        assert_eq!(config.default_format.as_deref(), Some("json"));
        assert_eq!(config.seed, Some(3));
    }

    #[test]
    fn test_apply_rejects_unknown_range() {
        let mut config = Config::default();
        let update = DefaultsUpdate {
            range: Some("90d".to_string()),
            ..DefaultsUpdate::default()
        };
        assert!(update.apply(&mut config).is_err());
        assert!(config.default_range.is_none());
    }

    #[test]
    fn test_clear_seed_wins() {
        let mut config = Config {
            seed: Some(9),
            ..Config::default()
        };
        DefaultsUpdate {
            seed: Some(4),
            clear_seed: true,
            ..DefaultsUpdate::default()
        }
        .apply(&mut config)
        .unwrap();
        assert!(config.seed.is_none());
    }

    #[test]
    fn test_empty_update() {
        assert!(DefaultsUpdate::default().is_empty());
    }
}
