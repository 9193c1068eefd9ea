//! 编排层（Orchestration Layer）
//!
//! ## 职责
//!
//! 本层持有会话状态并调度流程任务，是整个系统的"指挥中心"。
//!
//! ## 模块划分
//!
//! ### `session_store` - 会话状态持有者
//! - 唯一持有 `SessionState`
//! - 所有修改通过纯函数转换串行提交
//!
//! ### `manuscript_app` - 稿件会话
//! - 上传文档、分析、撰写、编辑、改写、顾问对话、导出
//! - 为每次分析 / 撰写分配请求序号，丢弃过期响应
//!
//! ### `runner` - 批量运行入口
//! - 读取文档目录 → 分析 → 撰写全部章节 → 导出
//! - 输出全局统计信息
//!
//! ## 层次关系
//!
//! ```text
//! runner (整条流水线)
//!     ↓
//! manuscript_app (会话级操作)
//!     ↓
//! workflow (analysis / drafting / transform / advisor)
//!     ↓
//! services (能力层：attachment / retry / tier_router / condensation)
//!     ↓
//! clients (CompletionProvider)
//! ```
//!
//! ## 设计原则
//!
//! 1. **单一写入者**：只有 session_store 修改会话状态
//! 2. **向下依赖**：编排层 → workflow → services → clients
//! 3. **无业务逻辑**：只做调度和统计，不做具体业务判断

pub mod manuscript_app;
pub mod runner;
pub mod session_store;

// 重新导出主要类型
pub use manuscript_app::{render_markdown, AnalysisOutcome, DraftOutcome, ManuscriptApp};
pub use runner::{run, run_with};
pub use session_store::SessionStore;
