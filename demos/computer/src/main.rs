//! # 电脑模块演示
//!
//! Power 模块被 Cpu 与 Disk 导入，Computer 模块导入 Cpu 与 Disk：
//! - PowerService 只创建一次，由 CpuService 与 DiskService 共享
//! - Computer 看不到未经再导出的 PowerService

mod modules;

use infrastructure_common::ProviderToken;
use infrastructure_composition::{ApplicationBuilder, LoggingConfig};
use modules::computer::ComputerController;
use modules::power::PowerService;
use std::path::Path;
use std::sync::Arc;
use tracing::{info, warn};

fn main() -> anyhow::Result<()> {
    let mut builder = ApplicationBuilder::new()
        .with_logging(LoggingConfig::development())
        .add_modules(modules::all());

    let config_path = Path::new(env!("CARGO_MANIFEST_DIR")).join("computer.toml");
    if config_path.exists() {
        builder = builder.add_config_toml(&config_path)?;
    }
    let container = builder.add_config_env_vars("COMPUTER").build()?;

    info!("=== 运行电脑 ===");
    let computer = container.get_type::<ComputerController>()?;
    let (sum, data) = computer.run();
    info!("计算结果: {}, 磁盘数据: {}", sum, data);

    let again = container.get_type::<ComputerController>()?;
    info!("两次获取是同一实例: {}", Arc::ptr_eq(&computer, &again));

    info!("=== 可见性检查 ===");
    match container.get_type::<PowerService>() {
        Ok(_) => warn!("PowerService 不应对 Computer 可见"),
        Err(e) => info!("预期的错误: {}", e),
    }

    let power = container.get_in("Cpu", &ProviderToken::of::<PowerService>())?;
    if let Some(power) = power.downcast_ref::<PowerService>() {
        info!("共享电源累计供电 {} 瓦", power.total_supplied());
    }

    info!("容器统计: {:?}", container.stats());
    Ok(())
}
