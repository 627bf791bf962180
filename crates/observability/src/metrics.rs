//! 步进 (step) 指标收集模块
//!
//! 每次 `do_step` 结束时由实例调用，记录分支、输出对象数和缓冲区大小。

use std::collections::BTreeMap;

use metrics::{counter, gauge, histogram};

/// 单步采样
#[derive(Debug, Clone, Copy)]
pub struct StepSample<'a> {
    /// 实例名
    pub instance: &'a str,
    /// 执行分支: `source` / `filter` / `no_input`
    pub branch: &'static str,
    /// 输出是否有效
    pub valid: bool,
    /// 发布的对象数
    pub object_count: usize,
    /// 发布的序列化字节数
    pub payload_bytes: usize,
}

/// 记录单步指标
///
/// # Example
///
/// ```ignore
/// use observability::metrics::{record_step_metrics, StepSample};
///
/// record_step_metrics(&StepSample {
///     instance: "filter",
///     branch: "filter",
///     valid: true,
///     object_count: 3,
///     payload_bytes: 1024,
/// });
/// ```
pub fn record_step_metrics(sample: &StepSample<'_>) {
    // 分支计数器
    counter!(
        "osmp_sensor_steps_total",
        "instance" => sample.instance.to_string(),
        "branch" => sample.branch
    )
    .increment(1);

    // 输出对象数
    gauge!(
        "osmp_sensor_object_count",
        "instance" => sample.instance.to_string()
    )
    .set(sample.object_count as f64);

    if !sample.valid {
        counter!(
            "osmp_sensor_invalid_outputs_total",
            "instance" => sample.instance.to_string()
        )
        .increment(1);
        return;
    }

    // 序列化大小
    histogram!(
        "osmp_sensor_payload_bytes",
        "instance" => sample.instance.to_string()
    )
    .record(sample.payload_bytes as f64);
}

/// 记录检测管线统计
pub fn record_detection_metrics(instance: &str, considered: usize, dropped: usize) {
    counter!(
        "osmp_sensor_entities_considered_total",
        "instance" => instance.to_string()
    )
    .increment(considered as u64);

    if dropped > 0 {
        counter!(
            "osmp_sensor_entities_dropped_total",
            "instance" => instance.to_string()
        )
        .increment(dropped as u64);
    }
}

/// 记录被拒绝的宿主调用 (状态机/句柄越界/不支持的操作)
pub fn record_lifecycle_error(instance: &str, operation: &'static str) {
    counter!(
        "osmp_sensor_rejected_calls_total",
        "instance" => instance.to_string(),
        "operation" => operation
    )
    .increment(1);
}

/// 步进指标聚合器
///
/// 在内存中聚合指标，便于运行结束时输出摘要。
#[derive(Debug, Clone, Default)]
pub struct StepStatsAggregator {
    /// 总步数
    pub total_steps: u64,

    /// 输出无效的步数
    pub invalid_steps: u64,

    /// 各分支步数
    pub branch_counts: BTreeMap<&'static str, u64>,

    /// 对象数统计
    pub object_stats: RunningStats,

    /// 序列化大小统计 (仅有效输出)
    pub payload_stats: RunningStats,
}

impl StepStatsAggregator {
    /// 创建新的聚合器
    pub fn new() -> Self {
        Self::default()
    }

    /// 更新聚合统计
    pub fn update(&mut self, sample: &StepSample<'_>) {
        self.total_steps += 1;
        *self.branch_counts.entry(sample.branch).or_insert(0) += 1;
        self.object_stats.push(sample.object_count as f64);

        if sample.valid {
            self.payload_stats.push(sample.payload_bytes as f64);
        } else {
            self.invalid_steps += 1;
        }
    }

    /// 生成摘要报告
    pub fn summary(&self) -> StepSummary {
        StepSummary {
            total_steps: self.total_steps,
            invalid_steps: self.invalid_steps,
            invalid_rate: if self.total_steps > 0 {
                self.invalid_steps as f64 / self.total_steps as f64 * 100.0
            } else {
                0.0
            },
            branch_counts: self.branch_counts.clone(),
            object_count: StatsSummary::from(&self.object_stats),
            payload_bytes: StatsSummary::from(&self.payload_stats),
        }
    }

    /// 重置统计
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}

/// 指标摘要
#[derive(Debug, Clone, Default)]
pub struct StepSummary {
    pub total_steps: u64,
    pub invalid_steps: u64,
    pub invalid_rate: f64,
    pub branch_counts: BTreeMap<&'static str, u64>,
    pub object_count: StatsSummary,
    pub payload_bytes: StatsSummary,
}

impl std::fmt::Display for StepSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "=== Step Metrics Summary ===")?;
        writeln!(f, "Total steps: {}", self.total_steps)?;
        writeln!(
            f,
            "Invalid outputs: {} ({:.2}%)",
            self.invalid_steps, self.invalid_rate
        )?;
        for (branch, count) in &self.branch_counts {
            writeln!(f, "  {}: {}", branch, count)?;
        }
        writeln!(f, "Object count: {}", self.object_count)?;
        writeln!(f, "Payload bytes: {}", self.payload_bytes)?;
        Ok(())
    }
}

/// 统计摘要
#[derive(Debug, Clone, Default)]
pub struct StatsSummary {
    pub count: u64,
    pub min: f64,
    pub max: f64,
    pub mean: f64,
    pub std_dev: f64,
}

impl From<&RunningStats> for StatsSummary {
    fn from(stats: &RunningStats) -> Self {
        Self {
            count: stats.count,
            min: stats.min,
            max: stats.max,
            mean: stats.mean(),
            std_dev: stats.std_dev(),
        }
    }
}

impl std::fmt::Display for StatsSummary {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.count == 0 {
            write!(f, "N/A")
        } else {
            write!(
                f,
                "min={:.1}, max={:.1}, mean={:.2}, std={:.2} (n={})",
                self.min, self.max, self.mean, self.std_dev, self.count
            )
        }
    }
}

/// 在线统计计算器 (Welford's algorithm)
#[derive(Debug, Clone, Default)]
pub struct RunningStats {
    count: u64,
    mean: f64,
    m2: f64,
    min: f64,
    max: f64,
}

impl RunningStats {
    /// 添加新值
    pub fn push(&mut self, value: f64) {
        self.count += 1;

        if self.count == 1 {
            self.min = value;
            self.max = value;
            self.mean = value;
            self.m2 = 0.0;
        } else {
            self.min = self.min.min(value);
            self.max = self.max.max(value);

            let delta = value - self.mean;
            self.mean += delta / self.count as f64;
            let delta2 = value - self.mean;
            self.m2 += delta * delta2;
        }
    }

    pub fn count(&self) -> u64 {
        self.count
    }

    pub fn mean(&self) -> f64 {
        if self.count == 0 {
            0.0
        } else {
            self.mean
        }
    }

    /// 样本方差
    pub fn variance(&self) -> f64 {
        if self.count < 2 {
            0.0
        } else {
            self.m2 / (self.count - 1) as f64
        }
    }

    pub fn std_dev(&self) -> f64 {
        self.variance().sqrt()
    }

    pub fn min(&self) -> f64 {
        self.min
    }

    pub fn max(&self) -> f64 {
        self.max
    }
}
