//! Configuration file loader with multi-source merging

use super::file_config::FileConfig;
use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use std::path::{Path, PathBuf};

const PROJECT_FILES: [&str; 2] = ["chat-relay.toml", ".chat-relay.toml"];
const ENV_PREFIX: &str = "CHAT_RELAY_";

/// Configuration loader that handles file discovery and merging
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration from all sources with proper priority
    ///
    /// Priority (highest to lowest):
    /// 1. `CHAT_RELAY_SECTION__KEY` environment variables
    /// 2. Explicit config path (if provided)
    /// 3. Project root: `./chat-relay.toml` or `./.chat-relay.toml`
    /// 4. Global config: `$XDG_CONFIG_HOME/chat-relay/config.toml`
    /// 5. Default values
    pub fn load(config_path: Option<&Path>) -> Result<FileConfig, Box<figment::Error>> {
        Self::figment(config_path).extract().map_err(Box::new)
    }

    fn figment(config_path: Option<&Path>) -> Figment {
        let mut figment = Figment::new().merge(Serialized::defaults(FileConfig::default()));

        if let Some(global_path) = Self::global_config_path()
            && global_path.exists()
        {
            figment = figment.merge(Toml::file(&global_path));
        }

        if let Some(path) = Self::project_config_path() {
            figment = figment.merge(Toml::file(&path));
        }

        if let Some(path) = config_path {
            figment = figment.merge(Toml::file(path));
        }

        figment.merge(Env::prefixed(ENV_PREFIX).split("__"))
    }

    /// Load only default configuration (for --no-config)
    pub fn load_defaults() -> FileConfig {
        FileConfig::default()
    }

    /// `$XDG_CONFIG_HOME/chat-relay/config.toml`, or the platform equivalent
    pub fn global_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|d| d.join("chat-relay").join("config.toml"))
    }

    /// Get the project-level config file path (if it exists)
    pub fn project_config_path() -> Option<PathBuf> {
        PROJECT_FILES
            .iter()
            .map(PathBuf::from)
            .find(|path| path.exists())
    }

    /// Print the config file locations being used (for debugging)
    pub fn print_config_sources() {
        println!("Configuration sources (in priority order):");
        println!("  [     ] Env:     {ENV_PREFIX}<SECTION>__<KEY>");

        if let Some(path) = Self::project_config_path() {
            println!("  [FOUND] Project: {}", path.display());
        } else {
            println!("  [     ] Project: ./chat-relay.toml or ./.chat-relay.toml");
        }

        if let Some(path) = Self::global_config_path() {
            if path.exists() {
                println!("  [FOUND] Global:  {}", path.display());
            } else {
                println!("  [     ] Global:  {}", path.display());
            }
        }

        println!("  [     ] Default: built-in defaults");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use figment::Jail;

    #[test]
    fn test_load_defaults() {
        let config = ConfigLoader::load_defaults();
        assert!(config.delivery.streaming);
        assert_eq!(config.delivery.chars_per_second, 200);
    }

    #[test]
    fn test_global_config_path_returns_some() {
        let path = ConfigLoader::global_config_path();
        assert!(path.is_some());
        assert!(path.unwrap().to_string_lossy().contains("chat-relay"));
    }

    #[test]
    fn test_project_file_then_explicit_file_then_env() {
        Jail::expect_with(|jail| {
            jail.create_file(
                "chat-relay.toml",
                r#"
[server]
base_url = "http://project:8000"

[delivery]
chars_per_second = 100
tick_interval_ms = 40
"#,
            )?;
            jail.create_file(
                "override.toml",
                r#"
[delivery]
chars_per_second = 300
"#,
            )?;
            jail.set_env("CHAT_RELAY_HISTORY__LIMIT", "9");

            let config = ConfigLoader::load(Some(Path::new("override.toml"))).map_err(|e| *e)?;
            assert_eq!(config.server.base_url, "http://project:8000");
            assert_eq!(config.delivery.chars_per_second, 300);
            assert_eq!(config.delivery.tick_interval_ms, 40);
            assert_eq!(config.history.limit, 9);
            Ok(())
        });
    }

    #[test]
    fn test_env_overrides_files() {
        Jail::expect_with(|jail| {
            jail.create_file(".chat-relay.toml", "[delivery]\nstreaming = true\n")?;
            jail.set_env("CHAT_RELAY_DELIVERY__STREAMING", "false");

            let config = ConfigLoader::load(None).map_err(|e| *e)?;
            assert!(!config.delivery.streaming);
            Ok(())
        });
    }

    #[test]
    fn test_malformed_file_is_an_error() {
        Jail::expect_with(|jail| {
            jail.create_file("chat-relay.toml", "[delivery]\nchars_per_second = \"fast\"\n")?;
            assert!(ConfigLoader::load(None).is_err());
            Ok(())
        });
    }
}
