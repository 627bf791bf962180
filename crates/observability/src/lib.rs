//! # Observability
//!
//! 可观测性模块：Tracing + Prometheus 指标。
//!
//! ## 功能
//!
//! - Tracing 初始化 (JSON/Pretty/Compact 格式)
//! - Prometheus 指标导出 (可选)
//! - 每步 (step) 指标收集与统计
//!
//! ## 日志 target
//!
//! 实例按类别输出调试日志，可用 `RUST_LOG` 单独筛选：
//! `osmp::fmi` (宿主调用), `osmp::osmp` (缓冲区握手), `osmp::osi` (场景内容)。
//!
//! ## 使用示例
//!
//! ```ignore
//! use observability::{init, metrics};
//!
//! // 初始化
//! observability::init()?;
//!
//! // 记录步进指标
//! metrics::record_step_metrics(&sample);
//! ```

pub mod metrics;

use anyhow::{Context, Result};
use metrics_exporter_prometheus::PrometheusBuilder;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

// Re-exports
pub use crate::metrics::{
    record_detection_metrics, record_lifecycle_error, record_step_metrics, RunningStats,
    StatsSummary, StepSample, StepStatsAggregator, StepSummary,
};

/// 初始化可观测性（仅 Tracing，JSON 格式）
pub fn init() -> Result<()> {
    init_with_config(ObservabilityConfig::default())
}

/// 宿主调用日志 target
pub const TARGET_FMI: &str = "osmp::fmi";
/// 缓冲区握手日志 target
pub const TARGET_OSMP: &str = "osmp::osmp";
/// 场景内容日志 target (每个实体一行，量大)
pub const TARGET_OSI: &str = "osmp::osi";

/// 可观测性配置
#[derive(Debug, Clone)]
pub struct ObservabilityConfig {
    /// 日志格式
    pub log_format: LogFormat,
    /// Prometheus 端口 (None = 禁用)
    pub metrics_port: Option<u16>,
    /// 默认日志级别 (`RUST_LOG` 未设置时使用)
    pub default_log_level: String,
    /// 按类别 target 覆盖的级别，追加在默认级别之后
    pub category_levels: Vec<(String, String)>,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_format: LogFormat::Json,
            metrics_port: None,
            default_log_level: "info".to_string(),
            category_levels: default_category_levels("info"),
        }
    }
}

/// 各类别的默认级别
///
/// `osmp::fmi` 与 `osmp::osmp` 跟随 `level`；`osmp::osi` 最高到 `debug`，
/// 逐实体的 trace 输出需显式打开。
pub fn default_category_levels(level: &str) -> Vec<(String, String)> {
    let osi = if level == "trace" { "debug" } else { level };
    vec![
        (TARGET_FMI.to_string(), level.to_string()),
        (TARGET_OSMP.to_string(), level.to_string()),
        (TARGET_OSI.to_string(), osi.to_string()),
    ]
}

impl ObservabilityConfig {
    /// 以指定默认级别构造，类别级别随之设定
    pub fn with_level(level: &str) -> Self {
        Self {
            default_log_level: level.to_string(),
            category_levels: default_category_levels(level),
            ..Default::default()
        }
    }

    /// 覆盖单个类别 target 的级别
    pub fn category_level(mut self, target: &str, level: &str) -> Self {
        match self.category_levels.iter_mut().find(|(t, _)| t == target) {
            Some(entry) => entry.1 = level.to_string(),
            None => self
                .category_levels
                .push((target.to_string(), level.to_string())),
        }
        self
    }

    /// `RUST_LOG` 未设置时使用的 EnvFilter 指令串
    pub fn filter_directives(&self) -> String {
        let mut directives = self.default_log_level.clone();
        for (target, level) in &self.category_levels {
            directives.push(',');
            directives.push_str(target);
            directives.push('=');
            directives.push_str(level);
        }
        directives
    }
}

/// 日志格式
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum LogFormat {
    /// JSON 结构化日志
    #[default]
    Json,
    /// 人类可读格式
    Pretty,
    /// 紧凑单行格式
    Compact,
}

/// 使用自定义配置初始化
pub fn init_with_config(config: ObservabilityConfig) -> Result<()> {
    // 1. Initialize Tracing
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(config.filter_directives()));

    match config.log_format {
        LogFormat::Json => {
            let fmt_layer = fmt::layer()
                .json()
                .with_target(true)
                .with_thread_ids(true)
                .with_file(true)
                .with_line_number(true);

            tracing_subscriber::registry()
                .with(filter)
                .with(fmt_layer)
                .try_init()
                .context("Failed to initialize tracing subscriber")?;
        }
        LogFormat::Pretty => {
            let fmt_layer = fmt::layer().pretty().with_target(true);

            tracing_subscriber::registry()
                .with(filter)
                .with(fmt_layer)
                .try_init()
                .context("Failed to initialize tracing subscriber")?;
        }
        LogFormat::Compact => {
            let fmt_layer = fmt::layer().compact().with_target(true);

            tracing_subscriber::registry()
                .with(filter)
                .with(fmt_layer)
                .try_init()
                .context("Failed to initialize tracing subscriber")?;
        }
    }

    // 2. Initialize Prometheus Exporter (if enabled)
    if let Some(port) = config.metrics_port {
        install_prometheus(port)?;
    }

    tracing::info!(
        log_format = ?config.log_format,
        metrics_port = ?config.metrics_port,
        "Observability initialized"
    );

    Ok(())
}

/// 仅初始化 Prometheus 指标（不初始化 Tracing）
///
/// 用于 Tracing 已由调用方初始化的场景 (例如 CLI)。
pub fn init_metrics_only(port: u16) -> Result<()> {
    install_prometheus(port)
}

fn install_prometheus(port: u16) -> Result<()> {
    PrometheusBuilder::new()
        .with_http_listener(([0, 0, 0, 0], port))
        .install()
        .context("Failed to install Prometheus recorder")?;

    tracing::info!(port = port, "Prometheus metrics endpoint initialized");
    Ok(())
}
