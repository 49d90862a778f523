use anyhow::Result;
use cte_batch_download::utils::logging;
use cte_batch_download::{App, Config};

#[tokio::main]
async fn main() -> Result<()> {
    // 加载配置
    let config = Config::load()?;

    // 初始化日志
    logging::init(config.verbose_logging);

    // 初始化并运行应用
    let _state = App::initialize(config).await?.run().await?;

    Ok(())
}
