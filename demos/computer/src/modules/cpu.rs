use super::power::PowerService;
use di_abstractions::{ModuleDefinition, ProviderDefinition};
use std::sync::Arc;

#[derive(Debug)]
pub struct CpuService {
    power: Arc<PowerService>,
}

impl CpuService {
    pub fn compute(&self, a: i64, b: i64) -> i64 {
        self.power.supply_power(10);
        a + b
    }
}

pub fn module() -> ModuleDefinition {
    ModuleDefinition::new("Cpu").import("Power").provide_exported(
        ProviderDefinition::for_type::<CpuService, _>(|deps| {
            Ok(CpuService {
                power: deps.get(0)?,
            })
        })
        .depends_on_type::<PowerService>(),
    )
}
