//! Configuration schema definitions.

use serde::{Deserialize, Serialize};

/// Root configuration structure
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Query editor settings
    pub editor: EditorConfig,
    /// Display settings
    pub display: DisplayConfig,
    /// Connection settings
    pub connection: ConnectionConfig,
}

/// Editor-related settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Display width of a tab character, in cells
    pub tab_width: usize,
    /// Initial gap size of the text buffer, in characters
    pub gap_capacity: usize,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            tab_width: 4,
            gap_capacity: 4000,
        }
    }
}

/// Display-related settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// How long status messages stay visible, in milliseconds
    pub status_timeout_ms: u64,
    /// Show the cursor line and column in the status line
    pub show_cursor_position: bool,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            status_timeout_ms: 3000,
            show_cursor_position: true,
        }
    }
}

/// Connection-related settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ConnectionConfig {
    /// Default database URL (overridden by DATABASE_URL and the command line)
    pub default_url: Option<String>,
    /// Connection timeout in seconds
    pub connect_timeout_secs: u64,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            default_url: None,
            connect_timeout_secs: 10,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_full_config_parse() {
        let toml = r#"
[editor]
tab_width = 2
gap_capacity = 128

[display]
status_timeout_ms = 1500
show_cursor_position = false

[connection]
default_url = "postgres://localhost/mydb"
connect_timeout_secs = 5
"#;

        let config: Config = toml::from_str(toml).unwrap();

        assert_eq!(config.editor.tab_width, 2);
        assert_eq!(config.editor.gap_capacity, 128);

        assert_eq!(config.display.status_timeout_ms, 1500);
        assert!(!config.display.show_cursor_position);

        assert_eq!(
            config.connection.default_url,
            Some("postgres://localhost/mydb".to_string())
        );
        assert_eq!(config.connection.connect_timeout_secs, 5);
    }

    #[test]
    fn test_serialize_config() {
        let config = Config::default();
        let toml_str = toml::to_string_pretty(&config).unwrap();
        assert!(toml_str.contains("[editor]"));
        assert!(toml_str.contains("[display]"));
        assert!(toml_str.contains("[connection]"));
    }

    #[test]
    fn test_unknown_sections_are_ignored() {
        let config: Config = toml::from_str("[keymap]\nvim_mode = true\n").unwrap();
        assert_eq!(config, Config::default());
    }
}
