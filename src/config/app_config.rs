// ==========================================
// 材料目录智能助手 - 应用配置
// ==========================================
// 来源优先级: 环境变量 > JSON 配置文件 > 内置默认值
// 环境变量:
// - BOLT_AGENT_CONFIG: 配置文件路径
// - BOLT_AGENT_DATA_DIR: 默认数据目录
// - BOLT_AGENT_MATERIAL_FILE / BOLT_AGENT_SALES_FILE: 数据源（路径或 http(s) URL）
// - BOLT_AGENT_MATERIAL_SHEET / BOLT_AGENT_SALES_SHEET: Excel 工作表名
// - BOLT_AGENT_LOCALE: 界面语言
// - BOLT_AGENT_TOLERANCE: 替代品厚度容差（mm）
// ==========================================

use crate::config::columns::{CatalogColumns, SalesColumns};
use crate::i18n;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

pub mod env_keys {
    pub const CONFIG: &str = "BOLT_AGENT_CONFIG";
    pub const DATA_DIR: &str = "BOLT_AGENT_DATA_DIR";
    pub const MATERIAL_FILE: &str = "BOLT_AGENT_MATERIAL_FILE";
    pub const SALES_FILE: &str = "BOLT_AGENT_SALES_FILE";
    pub const MATERIAL_SHEET: &str = "BOLT_AGENT_MATERIAL_SHEET";
    pub const SALES_SHEET: &str = "BOLT_AGENT_SALES_SHEET";
    pub const LOCALE: &str = "BOLT_AGENT_LOCALE";
    pub const TOLERANCE: &str = "BOLT_AGENT_TOLERANCE";
}

/// 替代品厚度容差默认值（mm，对称区间）
pub const DEFAULT_TOLERANCE: f64 = 0.5;

/// 配置错误类型
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Falha ao ler configuração ({path}): {message}")]
    ReadError { path: String, message: String },

    #[error("Configuração inválida ({path}): {message}")]
    ParseError { path: String, message: String },

    #[error("Valor de configuração inválido (chave: {key}, valor: {value}): {message}")]
    InvalidValue {
        key: String,
        value: String,
        message: String,
    },
}

pub type ConfigResult<T> = Result<T, ConfigError>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// 材料目录数据源（文件路径或 URL）
    pub material_source: String,
    /// 销售历史数据源（文件路径或 URL）
    pub sales_source: String,
    /// Excel 工作表名；未设置时读取第一个工作表
    pub material_sheet: Option<String>,
    pub sales_sheet: Option<String>,
    pub locale: String,
    pub alternatives_tolerance: f64,
    /// 销售查询关键词（小写包含匹配）
    pub sales_keywords: Vec<String>,
    pub catalog_columns: CatalogColumns,
    pub sales_columns: SalesColumns,
}

impl Default for AppConfig {
    fn default() -> Self {
        let data_dir = default_data_dir();
        Self {
            material_source: data_dir.join("materiais.xlsx").display().to_string(),
            sales_source: data_dir.join("faturamento.xlsx").display().to_string(),
            material_sheet: None,
            sales_sheet: None,
            locale: i18n::DEFAULT_LOCALE.to_string(),
            alternatives_tolerance: DEFAULT_TOLERANCE,
            sales_keywords: vec!["oportunidade de venda".to_string(), "venda".to_string()],
            catalog_columns: CatalogColumns::default(),
            sales_columns: SalesColumns::default(),
        }
    }
}

/// 默认数据目录
///
/// # 返回
/// - BOLT_AGENT_DATA_DIR（若设置）
/// - 否则: 用户数据目录/bolt-agent
/// - 无法获取用户数据目录时: ./data
pub fn default_data_dir() -> PathBuf {
    if let Ok(dir) = std::env::var(env_keys::DATA_DIR) {
        let trimmed = dir.trim();
        if !trimmed.is_empty() {
            return PathBuf::from(trimmed);
        }
    }
    dirs::data_dir()
        .map(|d| d.join("bolt-agent"))
        .unwrap_or_else(|| PathBuf::from("./data"))
}

impl AppConfig {
    /// 加载配置
    ///
    /// # 参数
    /// - path: 显式配置文件路径；为 None 时读取 BOLT_AGENT_CONFIG，仍为空则用默认值
    pub fn load(path: Option<&Path>) -> ConfigResult<Self> {
        let env_path = std::env::var(env_keys::CONFIG)
            .ok()
            .filter(|p| !p.trim().is_empty())
            .map(PathBuf::from);

        let mut config = match path.map(Path::to_path_buf).or(env_path) {
            Some(file) => Self::from_file(&file)?,
            None => Self::default(),
        };
        config.apply_overrides(|key| std::env::var(key).ok())?;
        config.validate()?;

        tracing::info!(
            "配置已加载: materials={}, sales={}, locale={}, tolerance={}",
            config.material_source,
            config.sales_source,
            config.locale,
            config.alternatives_tolerance
        );
        Ok(config)
    }

    /// 从 JSON 文件读取（未出现的字段取默认值）
    pub fn from_file(path: &Path) -> ConfigResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadError {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        serde_json::from_str(&content).map_err(|e| ConfigError::ParseError {
            path: path.display().to_string(),
            message: e.to_string(),
        })
    }

    /// 应用覆写（lookup 一般为环境变量读取）
    pub fn apply_overrides<F>(&mut self, lookup: F) -> ConfigResult<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(v) = get(env_keys::MATERIAL_FILE) {
            self.material_source = v.trim().to_string();
        }
        if let Some(v) = get(env_keys::SALES_FILE) {
            self.sales_source = v.trim().to_string();
        }
        if let Some(v) = get(env_keys::MATERIAL_SHEET) {
            self.material_sheet = Some(v.trim().to_string());
        }
        if let Some(v) = get(env_keys::SALES_SHEET) {
            self.sales_sheet = Some(v.trim().to_string());
        }
        if let Some(v) = get(env_keys::LOCALE) {
            self.locale = v.trim().to_string();
        }
        if let Some(v) = get(env_keys::TOLERANCE) {
            self.alternatives_tolerance =
                v.trim()
                    .parse::<f64>()
                    .map_err(|e| ConfigError::InvalidValue {
                        key: env_keys::TOLERANCE.to_string(),
                        value: v.clone(),
                        message: e.to_string(),
                    })?;
        }
        Ok(())
    }

    /// 校验并标准化
    pub fn validate(&mut self) -> ConfigResult<()> {
        if !self.alternatives_tolerance.is_finite() || self.alternatives_tolerance < 0.0 {
            return Err(ConfigError::InvalidValue {
                key: "alternatives_tolerance".to_string(),
                value: self.alternatives_tolerance.to_string(),
                message: "deve ser um número finito >= 0".to_string(),
            });
        }

        if !i18n::is_available(&self.locale) {
            tracing::warn!(
                "未知语言 {}，回退为 {}",
                self.locale,
                i18n::DEFAULT_LOCALE
            );
            self.locale = i18n::DEFAULT_LOCALE.to_string();
        }

        self.sales_keywords = self
            .sales_keywords
            .iter()
            .map(|k| k.trim().to_lowercase())
            .filter(|k| !k.is_empty())
            .collect();

        self.catalog_columns.normalize();
        self.sales_columns.normalize();
        let empty = self
            .catalog_columns
            .logical_fields()
            .into_iter()
            .map(|(name, list)| (format!("catalog_columns.{}", name), list.is_empty()))
            .chain(
                self.sales_columns
                    .logical_fields()
                    .into_iter()
                    .map(|(name, list)| (format!("sales_columns.{}", name), list.is_empty())),
            )
            .find(|(_, is_empty)| *is_empty);
        if let Some((key, _)) = empty {
            return Err(ConfigError::InvalidValue {
                key,
                value: "[]".to_string(),
                message: "lista de colunas vazia".to_string(),
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.locale, "pt-BR");
        assert_eq!(config.alternatives_tolerance, 0.5);
        assert!(config.sales_keywords.contains(&"venda".to_string()));
        assert!(config.material_source.ends_with("materiais.xlsx"));
    }

    #[test]
    fn test_from_file_partial() {
        let mut temp_file = NamedTempFile::new().unwrap();
        writeln!(
            temp_file,
            r#"{{"material_source": "m.csv", "material_sheet": "Catalogo",
                "alternatives_tolerance": 0.25}}"#
        )
        .unwrap();

        let config = AppConfig::from_file(temp_file.path()).unwrap();
        assert_eq!(config.material_source, "m.csv");
        assert_eq!(config.material_sheet.as_deref(), Some("Catalogo"));
        assert_eq!(config.sales_sheet, None);
        assert_eq!(config.alternatives_tolerance, 0.25);
        assert_eq!(config.locale, "pt-BR");
    }

    #[test]
    fn test_from_file_invalid_json() {
        let mut temp_file = NamedTempFile::new().unwrap();
        writeln!(temp_file, "{{not json").unwrap();
        assert!(matches!(
            AppConfig::from_file(temp_file.path()),
            Err(ConfigError::ParseError { .. })
        ));
    }

    #[test]
    fn test_overrides() {
        let mut env = HashMap::new();
        env.insert(env_keys::MATERIAL_FILE, " /tmp/m.xlsx ".to_string());
        env.insert(env_keys::LOCALE, "en".to_string());
        env.insert(env_keys::TOLERANCE, "1.0".to_string());
        env.insert(env_keys::SALES_SHEET, " Faturamento ".to_string());

        let mut config = AppConfig::default();
        config
            .apply_overrides(|k| env.get(k).cloned())
            .unwrap();
        assert_eq!(config.material_source, "/tmp/m.xlsx");
        assert_eq!(config.locale, "en");
        assert_eq!(config.alternatives_tolerance, 1.0);
        assert_eq!(config.sales_sheet.as_deref(), Some("Faturamento"));
        assert_eq!(config.material_sheet, None);
    }

    #[test]
    fn test_invalid_tolerance_override() {
        let mut config = AppConfig::default();
        let result = config.apply_overrides(|k| {
            (k == env_keys::TOLERANCE).then(|| "abc".to_string())
        });
        assert!(matches!(result, Err(ConfigError::InvalidValue { .. })));
    }

    #[test]
    fn test_validate() {
        let mut config = AppConfig {
            locale: "xx-YY".to_string(),
            sales_keywords: vec![" VENDA ".to_string(), " ".to_string()],
            ..AppConfig::default()
        };
        config.validate().unwrap();
        assert_eq!(config.locale, "pt-BR");
        assert_eq!(config.sales_keywords, vec!["venda"]);

        config.alternatives_tolerance = -1.0;
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.sales_columns.material_code.clear();
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidValue { key, .. }) if key == "sales_columns.MATERIAL_CODE"
        ));
    }
}
