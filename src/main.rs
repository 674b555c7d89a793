use anyhow::Result;
use mcq_paper_gen::orchestrator::App;
use mcq_paper_gen::utils::logging;
use mcq_paper_gen::Config;

#[tokio::main]
async fn main() -> Result<()> {
    // 初始化日志
    logging::init();

    // 加载配置
    let config = Config::from_env();

    // 初始化并运行应用
    let mut app = App::initialize(config)?;
    app.run().await?;

    Ok(())
}
