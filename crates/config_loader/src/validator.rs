//! 配置校验模块
//!
//! 校验规则：
//! - 派生规则 (validator): max_range > 0, -1 <= min_forward_cosine < 1,
//!   lateral_amplitude >= 0, traffic 非空
//! - probability_scale != 0
//! - 每辆车 speed 有限且 != 0 (横向正弦以 t / speed 为参数)
//! - ego_index 落在 traffic 范围内

use contracts::{ContractError, SensorConfig};
use validator::{Validate, ValidationErrors, ValidationErrorsKind};

/// 校验 SensorConfig 配置
///
/// 返回第一个遇到的错误，或 Ok(())。
pub fn validate(config: &SensorConfig) -> Result<(), ContractError> {
    validate_derived(config)?;
    validate_probability_model(config)?;
    validate_traffic_speeds(config)?;
    validate_ego_index(config)?;
    Ok(())
}

/// 派生规则
fn validate_derived(config: &SensorConfig) -> Result<(), ContractError> {
    config.validate().map_err(|errors| {
        let (field, message) = first_violation(&errors, String::new())
            .unwrap_or_else(|| ("<config>".to_string(), errors.to_string()));
        ContractError::config_validation(field, message)
    })
}

/// Depth-first walk to the first field error, in key order
fn first_violation(errors: &ValidationErrors, prefix: String) -> Option<(String, String)> {
    let mut keys: Vec<_> = errors.errors().keys().collect();
    keys.sort();

    for key in keys {
        let path = if prefix.is_empty() {
            key.to_string()
        } else {
            format!("{prefix}.{key}")
        };
        match &errors.errors()[key] {
            ValidationErrorsKind::Field(list) => {
                if let Some(err) = list.first() {
                    return Some((path, err.to_string()));
                }
            }
            ValidationErrorsKind::Struct(inner) => {
                if let Some(found) = first_violation(inner, path) {
                    return Some(found);
                }
            }
            ValidationErrorsKind::List(items) => {
                for (idx, inner) in items {
                    if let Some(found) = first_violation(inner, format!("{path}[{idx}]")) {
                        return Some(found);
                    }
                }
            }
        }
    }
    None
}

/// 存在概率模型
fn validate_probability_model(config: &SensorConfig) -> Result<(), ContractError> {
    let scale = config.detection.probability_scale;
    if scale == 0.0 || !scale.is_finite() {
        return Err(ContractError::config_validation(
            "detection.probability_scale",
            format!("probability_scale must be finite and non-zero, got {scale}"),
        ));
    }
    Ok(())
}

/// 校验车速
fn validate_traffic_speeds(config: &SensorConfig) -> Result<(), ContractError> {
    for (idx, lane) in config.source.traffic.iter().enumerate() {
        if lane.speed == 0.0 || !lane.speed.is_finite() {
            return Err(ContractError::config_validation(
                format!("source.traffic[{idx}].speed"),
                format!("speed must be finite and non-zero, got {}", lane.speed),
            ));
        }
    }
    Ok(())
}

/// 校验 ego_index
fn validate_ego_index(config: &SensorConfig) -> Result<(), ContractError> {
    let source = &config.source;
    if source.ego_index >= source.traffic.len() {
        return Err(ContractError::config_validation(
            "source.ego_index",
            format!(
                "ego_index {} out of range for {} traffic entries",
                source.ego_index,
                source.traffic.len()
            ),
        ));
    }
    Ok(())
}
