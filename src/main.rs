use anyhow::Result;
use manuscript_drafter::config::Config;
use manuscript_drafter::orchestrator::runner;
use manuscript_drafter::utils::logging;

#[tokio::main]
async fn main() -> Result<()> {
    // 加载配置
    let config = Config::load()?;

    // 初始化日志
    logging::init(config.verbose_logging);

    // 运行流水线
    runner::run(config).await?;

    Ok(())
}
