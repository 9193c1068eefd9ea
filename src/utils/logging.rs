//! 日志工具模块
//!
//! 提供日志初始化和输出的辅助函数

use tracing::info;
use tracing_subscriber::EnvFilter;

use crate::models::SectionKind;
use crate::orchestrator::DraftOutcome;

/// 初始化 tracing 订阅者
///
/// `RUST_LOG` 优先；否则默认 `info`，`verbose` 时为 `debug`。
/// 重复调用不会报错（测试中常见）。
pub fn init(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .try_init();
}

/// 记录程序启动信息
///
/// # 参数
/// - `preferred_model`: 首选模型
/// - `fast_model`: 备用模型
/// - `documents_folder`: 文档目录
pub fn log_startup(preferred_model: &str, fast_model: &str, documents_folder: &str) {
    info!("{}", "=".repeat(60));
    info!("🚀 程序启动 - 稿件撰写流水线");
    info!("🤖 模型: {} (备用 {})", preferred_model, fast_model);
    info!("📁 文档目录: {}", documents_folder);
    info!("{}", "=".repeat(60));
}

/// 记录文档加载信息
pub fn log_documents_loaded(total: usize, threshold: usize) {
    info!("✓ 找到 {} 个源文档", total);
    if total > threshold {
        info!("📋 超过 {} 个，将逐篇摘要后再分析\n", threshold);
    } else {
        info!("📋 将直接附带全部文档进行分析\n");
    }
}

/// 打印最终统计信息
///
/// # 参数
/// - `outcomes`: 每个章节的撰写结果
/// - `output_file`: 导出文件路径
pub fn print_final_stats(outcomes: &[(SectionKind, DraftOutcome)], output_file: &str) {
    let drafted = outcomes
        .iter()
        .filter(|(_, outcome)| *outcome == DraftOutcome::Drafted)
        .count();

    info!("\n{}", "=".repeat(60));
    info!("📊 全部处理完成统计");
    info!(
        "完成时间: {}",
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    info!("{}", "=".repeat(60));
    info!("✅ 成功: {}/{}", drafted, outcomes.len());
    for (kind, outcome) in outcomes {
        match outcome {
            DraftOutcome::Drafted => {}
            DraftOutcome::Failed(message) => {
                info!("❌ {}: {}", kind, truncate_text(message, 120))
            }
            DraftOutcome::Superseded => info!("⏭️ {}: 被取代", kind),
        }
    }
    info!("{}", "=".repeat(60));
    info!("\n稿件已保存至: {}", output_file);
}

/// 截断长文本
///
/// # 参数
/// - `text`: 原始文本
/// - `max_len`: 最大长度（字符）
///
/// # 返回
/// 返回截断后的文本
pub fn truncate_text(text: &str, max_len: usize) -> String {
    if text.chars().count() > max_len {
        text.chars().take(max_len).collect::<String>() + "..."
    } else {
        text.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncate_counts_characters() {
        assert_eq!(truncate_text("短文本", 10), "短文本");
        assert_eq!(truncate_text("研究空白分析", 2), "研究...");
    }
}
