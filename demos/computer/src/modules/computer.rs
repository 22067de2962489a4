use super::cpu::CpuService;
use super::disk::DiskService;
use di_abstractions::{ModuleDefinition, ProviderDefinition};
use std::sync::Arc;

/// 电脑控制器，只依赖 Cpu 与 Disk 导出的服务
#[derive(Debug)]
pub struct ComputerController {
    cpu: Arc<CpuService>,
    disk: Arc<DiskService>,
}

impl ComputerController {
    pub fn run(&self) -> (i64, String) {
        (self.cpu.compute(1, 2), self.disk.get_data())
    }
}

pub fn module() -> ModuleDefinition {
    ModuleDefinition::new("Computer")
        .import("Cpu")
        .import("Disk")
        .provider(
            ProviderDefinition::for_type::<ComputerController, _>(|deps| {
                Ok(ComputerController {
                    cpu: deps.get(0)?,
                    disk: deps.get(1)?,
                })
            })
            .depends_on_type::<CpuService>()
            .depends_on_type::<DiskService>(),
        )
}
