//! Output configuration from TOML (`[output]` section)

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// How answers are rendered.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FileOutputFormat {
    /// Styled markdown on an ANSI terminal
    #[default]
    Terminal,
    /// Sanitized HTML fragment
    Html,
    /// Unformatted text
    Plain,
}

impl FromStr for FileOutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "terminal" | "term" => Ok(Self::Terminal),
            "html" => Ok(Self::Html),
            "plain" | "text" => Ok(Self::Plain),
            other => Err(format!("unknown output format: {other}")),
        }
    }
}

impl fmt::Display for FileOutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Terminal => "terminal",
            Self::Html => "html",
            Self::Plain => "plain",
        };
        f.write_str(name)
    }
}

/// Raw output configuration from TOML
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct FileOutputConfig {
    /// Output format
    pub format: FileOutputFormat,
    /// Enable colored terminal output
    pub color: bool,
}

impl Default for FileOutputConfig {
    fn default() -> Self {
        Self {
            format: FileOutputFormat::Terminal,
            color: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_output_format_deserialize() {
        let toml_str = r#"
[output]
format = "html"
"#;
        let config: crate::config::FileConfig = toml::from_str(toml_str).unwrap();
        assert_eq!(config.output.format, FileOutputFormat::Html);
        assert!(config.output.color);
    }

    #[test]
    fn test_output_format_from_str() {
        assert_eq!("PLAIN".parse::<FileOutputFormat>(), Ok(FileOutputFormat::Plain));
        assert_eq!("term".parse::<FileOutputFormat>(), Ok(FileOutputFormat::Terminal));
        assert!("pdf".parse::<FileOutputFormat>().is_err());
    }
}
