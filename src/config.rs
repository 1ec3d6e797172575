//! 应用配置持久化（~/.taskdeck/config.toml）

use serde::{Deserialize, Serialize};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};

/// 应用配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub theme: ThemeConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            store: StoreConfig::default(),
            theme: ThemeConfig::default(),
        }
    }
}

/// 远端 store 配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// WebSocket endpoint，如 ws://localhost:9090
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    /// 任务集合路径
    #[serde(default = "default_collection")]
    pub collection: String,
}

fn default_endpoint() -> String {
    "ws://localhost:9090".to_string()
}

fn default_collection() -> String {
    "tasks".to_string()
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            endpoint: default_endpoint(),
            collection: default_collection(),
        }
    }
}

/// 主题配置
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ThemeConfig {
    pub name: String,
}

impl Default for ThemeConfig {
    fn default() -> Self {
        Self {
            name: "Auto".to_string(),
        }
    }
}

/// 获取 ~/.taskdeck/ 目录路径
pub fn taskdeck_dir() -> PathBuf {
    dirs::home_dir()
        .expect("Cannot find home directory")
        .join(".taskdeck")
}

fn config_path() -> PathBuf {
    taskdeck_dir().join("config.toml")
}

fn load_from(path: &Path) -> Config {
    if !path.exists() {
        return Config::default();
    }
    fs::read_to_string(path)
        .ok()
        .and_then(|s| toml::from_str(&s).ok())
        .unwrap_or_default()
}

fn save_to(path: &Path, config: &Config) -> io::Result<()> {
    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir)?;
    }
    let content = toml::to_string_pretty(config)
        .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
    fs::write(path, content)
}

/// 加载配置（不存在或损坏则返回默认值）
pub fn load_config() -> Config {
    load_from(&config_path())
}

/// 保存配置
pub fn save_config(config: &Config) -> io::Result<()> {
    save_to(&config_path(), config)
}
