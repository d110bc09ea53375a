//! 配置校验模块
//!
//! 校验规则：
//! - sink name 唯一且非空
//! - batch_size > 0
//! - synthetic 源需要非空且不重复的 streams，rate_hz > 0
//! - replay 源需要 path，speed >= 0
//! - queue.buffer_size > 0

use std::collections::HashSet;

use contracts::{DispatchError, DispatchPlan, SourceKind};

/// 校验 DispatchPlan 配置
///
/// 返回第一个遇到的错误，或 Ok(())。
pub fn validate(plan: &DispatchPlan) -> Result<(), DispatchError> {
    validate_sinks(plan)?;
    validate_source(plan)?;
    validate_queue(plan)?;
    Ok(())
}

/// 校验 sink 配置
fn validate_sinks(plan: &DispatchPlan) -> Result<(), DispatchError> {
    let mut seen = HashSet::new();
    for (idx, sink) in plan.sinks.iter().enumerate() {
        if sink.name.is_empty() {
            return Err(DispatchError::config_validation(
                format!("sinks[{}].name", idx),
                "sink name cannot be empty",
            ));
        }
        if !seen.insert(&sink.name) {
            return Err(DispatchError::config_validation(
                format!("sinks[name={}]", sink.name),
                "duplicate sink name",
            ));
        }
    }
    Ok(())
}

/// 校验源配置
fn validate_source(plan: &DispatchPlan) -> Result<(), DispatchError> {
    let source = &plan.source;

    if source.batch_size == 0 {
        return Err(DispatchError::config_validation(
            "source.batch_size",
            "batch_size must be > 0",
        ));
    }

    match source.kind {
        SourceKind::Synthetic => {
            if source.streams.is_empty() {
                return Err(DispatchError::config_validation(
                    "source.streams",
                    "synthetic source requires at least one stream",
                ));
            }

            let mut seen = HashSet::new();
            for stream in &source.streams {
                if stream.is_empty() {
                    return Err(DispatchError::config_validation(
                        "source.streams",
                        "stream name cannot be empty",
                    ));
                }
                if !seen.insert(stream) {
                    return Err(DispatchError::config_validation(
                        format!("source.streams[{}]", stream),
                        "duplicate stream name",
                    ));
                }
            }

            if source.rate_hz <= 0.0 {
                return Err(DispatchError::config_validation(
                    "source.rate_hz",
                    format!("rate_hz must be > 0, got {}", source.rate_hz),
                ));
            }
        }
        SourceKind::Replay => {
            if source.path.is_none() {
                return Err(DispatchError::config_validation(
                    "source.path",
                    "replay source requires a path",
                ));
            }

            if source.speed < 0.0 {
                return Err(DispatchError::config_validation(
                    "source.speed",
                    format!("speed must be >= 0, got {}", source.speed),
                ));
            }
        }
    }

    Ok(())
}

/// 校验队列配置
fn validate_queue(plan: &DispatchPlan) -> Result<(), DispatchError> {
    if plan.queue.buffer_size == 0 {
        return Err(DispatchError::config_validation(
            "queue.buffer_size",
            "buffer_size must be > 0",
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use contracts::{ConfigVersion, QueueConfig, SinkConfig, SinkType, SourceConfig};

    fn minimal_plan() -> DispatchPlan {
        DispatchPlan {
            version: ConfigVersion::V1,
            source: SourceConfig {
                kind: SourceKind::Synthetic,
                batch_size: 8,
                rate_hz: 10.0,
                streams: vec!["alpha".into(), "beta".into()],
                path: None,
                speed: 1.0,
            },
            queue: QueueConfig::default(),
            sinks: vec![SinkConfig {
                name: "log".into(),
                sink_type: SinkType::Log,
                params: Default::default(),
            }],
        }
    }

    #[test]
    fn test_valid_config() {
        let plan = minimal_plan();
        assert!(validate(&plan).is_ok());
    }

    #[test]
    fn test_duplicate_sink_name() {
        let mut plan = minimal_plan();
        plan.sinks.push(plan.sinks[0].clone());
        let result = validate(&plan);
        assert!(result.is_err());
        let err = result.unwrap_err().to_string();
        assert!(err.contains("duplicate sink name"), "got: {err}");
    }

    #[test]
    fn test_empty_sink_name() {
        let mut plan = minimal_plan();
        plan.sinks[0].name = String::new();
        let result = validate(&plan);
        assert!(result.is_err());
        let err = result.unwrap_err().to_string();
        assert!(err.contains("cannot be empty"), "got: {err}");
    }

    #[test]
    fn test_zero_batch_size() {
        let mut plan = minimal_plan();
        plan.source.batch_size = 0;
        let result = validate(&plan);
        assert!(result.is_err());
        let err = result.unwrap_err().to_string();
        assert!(err.contains("batch_size must be > 0"), "got: {err}");
    }

    #[test]
    fn test_synthetic_requires_streams() {
        let mut plan = minimal_plan();
        plan.source.streams.clear();
        let result = validate(&plan);
        assert!(result.is_err());
        let err = result.unwrap_err().to_string();
        assert!(err.contains("at least one stream"), "got: {err}");
    }

    #[test]
    fn test_duplicate_stream_name() {
        let mut plan = minimal_plan();
        plan.source.streams.push("alpha".into());
        let result = validate(&plan);
        assert!(result.is_err());
        let err = result.unwrap_err().to_string();
        assert!(err.contains("duplicate stream name"), "got: {err}");
    }

    #[test]
    fn test_invalid_rate() {
        let mut plan = minimal_plan();
        plan.source.rate_hz = -5.0;
        let result = validate(&plan);
        assert!(result.is_err());
        let err = result.unwrap_err().to_string();
        assert!(err.contains("rate_hz must be > 0"), "got: {err}");
    }

    #[test]
    fn test_replay_requires_path() {
        let mut plan = minimal_plan();
        plan.source.kind = SourceKind::Replay;
        plan.source.path = None;
        let result = validate(&plan);
        assert!(result.is_err());
        let err = result.unwrap_err().to_string();
        assert!(err.contains("requires a path"), "got: {err}");
    }

    #[test]
    fn test_zero_buffer_size() {
        let mut plan = minimal_plan();
        plan.queue.buffer_size = 0;
        let result = validate(&plan);
        assert!(result.is_err());
        let err = result.unwrap_err().to_string();
        assert!(err.contains("buffer_size must be > 0"), "got: {err}");
    }
}
