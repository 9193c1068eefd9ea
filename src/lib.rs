//! # Manuscript Drafter
//!
//! 一个把研究资料整理成学术稿件初稿的 LLM 编排流水线
//!
//! ## 架构设计
//!
//! 本系统采用严格的分层架构：
//!
//! ### ① 客户端层（Clients）
//! - `clients/` - LLM 能力抽象，只暴露"给定内容片段生成文本"
//! - `CompletionProvider` - 能力 trait
//! - `OpenAiProvider` - OpenAI 兼容接口实现
//! - `ScriptedProvider` - 确定性的脚本化实现（测试用）
//!
//! ### ② 业务能力层（Services）
//! - `services/` - 描述"我能做什么"，与具体任务无关
//! - `attachment` - 文档 → 内容片段
//! - `retry` - 瞬时错误指数退避
//! - `tier_router` - 首选层级 → 快速层级降级
//! - `condensation` - 文档过多时逐篇摘要
//!
//! ### ③ 流程层（Workflow）
//! - `workflow/` - 定义每个任务的完整流程
//! - `AnalysisTask` - 研究空白 / 新颖性分析
//! - `DraftingTask` - 单个章节撰写
//! - `TransformTask` - 文本改写工具
//! - `AdvisorTask` - 顾问对话
//!
//! ### ④ 编排层（Orchestration）
//! - `orchestrator/session_store` - 会话状态的唯一写入者
//! - `orchestrator/manuscript_app` - 会话级操作
//! - `orchestrator/runner` - 批量运行入口
//!
//! ## 模块结构

pub mod clients;
pub mod config;
pub mod error;

pub mod models;
pub mod orchestrator;
pub mod services;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use clients::{CompletionProvider, ModelTier, OpenAiProvider, ScriptedProvider};
pub use config::Config;
pub use error::{AppError, AppResult};
pub use models::{AnalysisResult, SectionKind, SessionState, SourceDocument};
pub use orchestrator::{AnalysisOutcome, DraftOutcome, ManuscriptApp};
pub use workflow::{AdvisorReply, TransformKind, TransformOutcome};
