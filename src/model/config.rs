use serde::{Deserialize, Serialize};

/// Configuration from config.toml in the data directory
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub defaults: DefaultsConfig,
    #[serde(default)]
    pub seed: SeedConfig,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Logical name the dataset is persisted under
    #[serde(default = "default_key")]
    pub key: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        StorageConfig { key: default_key() }
    }
}

/// Titles and placeholder text given to freshly created boards and tasks
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DefaultsConfig {
    #[serde(default = "default_board_title")]
    pub board_title: String,
    #[serde(default = "default_task_title")]
    pub task_title: String,
    #[serde(default = "default_task_description")]
    pub task_description: String,
}

impl Default for DefaultsConfig {
    fn default() -> Self {
        DefaultsConfig {
            board_title: default_board_title(),
            task_title: default_task_title(),
            task_description: default_task_description(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SeedConfig {
    /// Start with the three sample boards when no dataset exists yet.
    /// When false an empty forest is used instead.
    #[serde(default = "default_true")]
    pub enabled: bool,
}

impl Default for SeedConfig {
    fn default() -> Self {
        SeedConfig { enabled: true }
    }
}

pub const DEFAULT_STORAGE_KEY: &str = "kanban-data";

fn default_key() -> String {
    DEFAULT_STORAGE_KEY.to_string()
}

fn default_board_title() -> String {
    "New Board".to_string()
}

fn default_task_title() -> String {
    "New Task".to_string()
}

fn default_task_description() -> String {
    "Click to add a description".to_string()
}

fn default_true() -> bool {
    true
}
