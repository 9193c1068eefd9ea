//! 批量运行入口 - 编排层
//!
//! ## 职责
//!
//! 1. **加载文档**：读取配置的文档目录
//! 2. **分析**：生成研究空白 / 新颖性分析
//! 3. **撰写**：并发撰写全部章节
//! 4. **导出**：把稿件写入 Markdown 文件
//! 5. **统计**：输出每个章节的结果
//!
//! 不做具体业务判断，只负责调度和统计。

use anyhow::{Context, Result};
use tracing::{info, warn};

use crate::config::Config;
use crate::orchestrator::manuscript_app::{AnalysisOutcome, ManuscriptApp};
use crate::utils::logging::{log_documents_loaded, log_startup, print_final_stats};

/// 运行整条流水线
pub async fn run(config: Config) -> Result<()> {
    log_startup(
        &config.preferred_model,
        &config.fast_model,
        &config.documents_folder,
    );

    if config.llm_api_key.is_empty() {
        warn!("⚠️ 未设置 LLM_API_KEY，请求可能被拒绝");
    }

    let app = ManuscriptApp::with_openai(config);
    run_with(&app).await
}

/// 在给定会话上运行（测试中注入脚本化客户端）
pub async fn run_with(app: &ManuscriptApp) -> Result<()> {
    let config = app.config();

    info!("\n📁 正在扫描源文档...");
    let loaded = app
        .load_documents_from_folder(&config.documents_folder)
        .await?;

    if loaded == 0 {
        warn!("⚠️ 没有找到可用的源文档，程序结束");
        return Ok(());
    }
    log_documents_loaded(loaded, config.condensation_threshold);

    match app.run_analysis().await? {
        AnalysisOutcome::Completed(routed) => {
            for warning in &routed.warnings {
                warn!("⚠️ {}", warning);
            }
            info!("📰 目标期刊: {}", routed.value.target_venue);
        }
        AnalysisOutcome::Superseded => {
            warn!("⚠️ 分析结果已被更新的请求取代");
        }
    }

    let outcomes = app.draft_all_sections().await?;

    let markdown = app.export_markdown().await;
    tokio::fs::write(&config.output_file, markdown)
        .await
        .with_context(|| format!("写入稿件失败: {}", config.output_file))?;

    print_final_stats(&outcomes, &config.output_file);
    Ok(())
}
