//! 图标符号名到字形的映射

use std::collections::HashMap;

use crate::config::NavigationConfig;

/// 图标注册表，未知或缺失的图标返回默认字形
#[derive(Debug, Clone)]
pub struct IconRegistry {
    icons: HashMap<String, String>,
    default_glyph: String,
}

impl IconRegistry {
    pub fn new(icons: HashMap<String, String>, default_glyph: impl Into<String>) -> Self {
        Self {
            icons,
            default_glyph: default_glyph.into(),
        }
    }

    pub fn from_config(config: &NavigationConfig) -> Self {
        Self::new(config.icons.clone(), config.default_glyph.clone())
    }

    pub fn glyph(&self, icon: Option<&str>) -> &str {
        icon.and_then(|name| self.icons.get(name.trim()))
            .map(String::as_str)
            .unwrap_or(&self.default_glyph)
    }
}

impl Default for IconRegistry {
    fn default() -> Self {
        Self::from_config(&NavigationConfig::default())
    }
}
