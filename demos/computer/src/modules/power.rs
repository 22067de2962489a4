use di_abstractions::{ModuleDefinition, ProviderDefinition};
use std::sync::atomic::{AtomicU32, Ordering};
use tracing::info;

/// 电源服务，所有耗电设备共享同一实例
#[derive(Debug, Default)]
pub struct PowerService {
    supplied: AtomicU32,
}

impl PowerService {
    pub fn supply_power(&self, watts: u32) {
        info!("供电 {} 瓦", watts);
        self.supplied.fetch_add(watts, Ordering::SeqCst);
    }

    pub fn total_supplied(&self) -> u32 {
        self.supplied.load(Ordering::SeqCst)
    }
}

pub fn module() -> ModuleDefinition {
    ModuleDefinition::new("Power").provide_exported(ProviderDefinition::for_type::<
        PowerService,
        _,
    >(|_| {
        info!("创建 PowerService");
        Ok(PowerService::default())
    }))
}
