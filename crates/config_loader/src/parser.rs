//! 配置解析模块
//!
//! 支持 TOML (主要) 和 JSON (可选) 格式。

use contracts::{ContractError, SensorConfig};

/// 配置文件格式
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFormat {
    /// TOML 格式 (推荐)
    Toml,
    /// JSON 格式
    Json,
}

impl ConfigFormat {
    /// 从文件扩展名推断格式
    pub fn from_extension(ext: &str) -> Option<Self> {
        match ext.to_lowercase().as_str() {
            "toml" => Some(Self::Toml),
            "json" => Some(Self::Json),
            _ => None,
        }
    }
}

/// 解析 TOML 格式配置
pub fn parse_toml(content: &str) -> Result<SensorConfig, ContractError> {
    toml::from_str(content).map_err(|e| ContractError::ConfigParse {
        message: format!("TOML parse error: {e}"),
        source: Some(Box::new(e)),
    })
}

/// 解析 JSON 格式配置
pub fn parse_json(content: &str) -> Result<SensorConfig, ContractError> {
    serde_json::from_str(content).map_err(|e| ContractError::ConfigParse {
        message: format!("JSON parse error: {e}"),
        source: Some(Box::new(e)),
    })
}

/// 根据格式解析配置
pub fn parse(content: &str, format: ConfigFormat) -> Result<SensorConfig, ContractError> {
    match format {
        ConfigFormat::Toml => parse_toml(content),
        ConfigFormat::Json => parse_json(content),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::{OperatingMode, WireFormat};

    #[test]
    fn test_parse_toml_minimal() {
        let content = r#"
mode = "source"
wire_format = "json"

[detection]
max_range = 120.0
"#;
        let result = parse_toml(content);
        assert!(result.is_ok(), "Failed: {:?}", result.err());
        let config = result.unwrap();
        assert_eq!(config.mode, OperatingMode::Source);
        assert_eq!(config.wire_format, WireFormat::Json);
        assert_eq!(config.detection.max_range, 120.0);
        assert_eq!(config.detection.probability_center, 75.0);
        assert_eq!(config.source.traffic.len(), 10);
    }

    #[test]
    fn test_parse_toml_traffic_table() {
        let content = r#"
mode = "source"

[source]
ego_index = 1

[[source.traffic]]
longitudinal_offset = 0.0
lateral_offset = 0.0
speed = 10.0

[[source.traffic]]
longitudinal_offset = 20.0
lateral_offset = 3.5
speed = 12.0
"#;
        let config = parse_toml(content).unwrap();
        assert_eq!(config.source.ego_index, 1);
        assert_eq!(config.source.traffic.len(), 2);
        assert_eq!(config.source.traffic[1].lateral_offset, 3.5);
        assert_eq!(config.source.lateral_amplitude, 0.25);
    }

    #[test]
    fn test_parse_json_minimal() {
        let content = r#"{
            "mode": "filter",
            "detection": { "max_range": 80.0, "min_forward_cosine": 0.5 }
        }"#;
        let result = parse_json(content);
        assert!(result.is_ok(), "Failed: {:?}", result.err());
        assert_eq!(result.unwrap().detection.min_forward_cosine, 0.5);
    }

    #[test]
    fn test_parse_toml_syntax_error() {
        let content = "invalid toml [[[";
        let result = parse_toml(content);
        assert!(result.is_err());
        let err = result.unwrap_err();
        assert!(matches!(err, ContractError::ConfigParse { .. }));
    }

    #[test]
    fn test_parse_unknown_mode() {
        let result = parse_toml(r#"mode = "radar""#);
        assert!(matches!(result, Err(ContractError::ConfigParse { .. })));
    }

    #[test]
    fn test_format_from_extension() {
        assert_eq!(
            ConfigFormat::from_extension("toml"),
            Some(ConfigFormat::Toml)
        );
        assert_eq!(
            ConfigFormat::from_extension("TOML"),
            Some(ConfigFormat::Toml)
        );
        assert_eq!(
            ConfigFormat::from_extension("json"),
            Some(ConfigFormat::Json)
        );
        assert_eq!(ConfigFormat::from_extension("yaml"), None);
    }
}
