//! 服务配置

use std::collections::HashMap;

use console_config::{AppConfig, ConfigError};
use serde::Deserialize;

/// 导航配置段 `[navigation]`
#[derive(Debug, Clone, Deserialize)]
pub struct NavigationConfig {
    /// 未知或缺失图标时使用的字形
    #[serde(default = "default_glyph")]
    pub default_glyph: String,
    /// 图标符号名 → 字形
    #[serde(default)]
    pub icons: HashMap<String, String>,
}

impl Default for NavigationConfig {
    fn default() -> Self {
        Self {
            default_glyph: default_glyph(),
            icons: HashMap::new(),
        }
    }
}

fn default_glyph() -> String {
    "circle".to_string()
}

/// nav-access 服务配置
#[derive(Debug, Clone, Deserialize)]
pub struct NavAccessConfig {
    #[serde(flatten)]
    pub app: AppConfig,
    #[serde(default)]
    pub navigation: NavigationConfig,
}

impl NavAccessConfig {
    pub fn load(config_dir: &str) -> Result<Self, ConfigError> {
        Ok(console_config::figment(config_dir).extract()?)
    }
}
