use super::power::PowerService;
use di_abstractions::{ModuleDefinition, ProviderDefinition};
use std::sync::Arc;

#[derive(Debug)]
pub struct DiskService {
    power: Arc<PowerService>,
}

impl DiskService {
    pub fn get_data(&self) -> String {
        self.power.supply_power(20);
        "data!".to_string()
    }
}

pub fn module() -> ModuleDefinition {
    ModuleDefinition::new("Disk").import("Power").provide_exported(
        ProviderDefinition::for_type::<DiskService, _>(|deps| {
            Ok(DiskService {
                power: deps.get(0)?,
            })
        })
        .depends_on_type::<PowerService>(),
    )
}
