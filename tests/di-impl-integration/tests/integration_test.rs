//! 模块图、解析器与容器的跨 crate 集成测试

use di_abstractions::{ModuleDefinition, ProviderDefinition, ProviderResolver};
use di_impl::{Container, ModuleGraph, Resolver};
use infrastructure_common::{DependencyError, ModuleError, ProviderToken};
use std::sync::atomic::{AtomicU32, AtomicUsize, Ordering};
use std::sync::Arc;

/// 电源服务
#[derive(Debug, Default)]
struct PowerService {
    supplied: AtomicU32,
}

impl PowerService {
    fn supply_power(&self, watts: u32) {
        self.supplied.fetch_add(watts, Ordering::SeqCst);
    }

    fn total_supplied(&self) -> u32 {
        self.supplied.load(Ordering::SeqCst)
    }
}

#[derive(Debug)]
struct CpuService {
    power: Arc<PowerService>,
}

impl CpuService {
    fn compute(&self, a: i64, b: i64) -> i64 {
        self.power.supply_power(10);
        a + b
    }
}

#[derive(Debug)]
struct DiskService {
    power: Arc<PowerService>,
}

impl DiskService {
    fn get_data(&self) -> &'static str {
        self.power.supply_power(20);
        "data!"
    }
}

#[derive(Debug)]
struct ComputerService {
    cpu: Arc<CpuService>,
    disk: Arc<DiskService>,
}

impl ComputerService {
    fn run(&self) -> (i64, &'static str) {
        (self.cpu.compute(1, 2), self.disk.get_data())
    }
}

/// Power <- Cpu, Disk <- Computer
fn computer_modules(power_constructions: Arc<AtomicUsize>) -> Vec<ModuleDefinition> {
    vec![
        ModuleDefinition::new("Power").provide_exported(ProviderDefinition::for_type::<
            PowerService,
            _,
        >(move |_| {
            power_constructions.fetch_add(1, Ordering::SeqCst);
            Ok(PowerService::default())
        })),
        ModuleDefinition::new("Cpu").import("Power").provide_exported(
            ProviderDefinition::for_type::<CpuService, _>(|deps| {
                Ok(CpuService {
                    power: deps.get(0)?,
                })
            })
            .depends_on_type::<PowerService>(),
        ),
        ModuleDefinition::new("Disk").import("Power").provide_exported(
            ProviderDefinition::for_type::<DiskService, _>(|deps| {
                Ok(DiskService {
                    power: deps.get(0)?,
                })
            })
            .depends_on_type::<PowerService>(),
        ),
        ModuleDefinition::new("Computer")
            .import("Cpu")
            .import("Disk")
            .provider(
                ProviderDefinition::for_type::<ComputerService, _>(|deps| {
                    Ok(ComputerService {
                        cpu: deps.get(0)?,
                        disk: deps.get(1)?,
                    })
                })
                .depends_on_type::<CpuService>()
                .depends_on_type::<DiskService>(),
            ),
    ]
}

#[test]
fn test_computer_shares_one_power_service() -> anyhow::Result<()> {
    let constructions = Arc::new(AtomicUsize::new(0));
    let container = Container::build(computer_modules(constructions.clone()))?;
    assert_eq!(container.root_module(), "Computer");

    let computer = container.get_type::<ComputerService>()?;
    assert_eq!(computer.run(), (3, "data!"));
    assert_eq!(constructions.load(Ordering::SeqCst), 1);

    assert!(Arc::ptr_eq(&computer.cpu.power, &computer.disk.power));
    assert_eq!(computer.cpu.power.total_supplied(), 30);

    // 第二次获取返回同一实例
    let again = container.get_type::<ComputerService>()?;
    assert!(Arc::ptr_eq(&computer, &again));
    Ok(())
}

#[test]
fn test_power_is_hidden_from_computer() -> anyhow::Result<()> {
    let container = Container::build(computer_modules(Arc::new(AtomicUsize::new(0))))?;

    // 先让 PowerService 进入缓存，缓存命中也必须检查可见性
    container.get_type::<CpuService>()?;
    assert!(container.is_resolved(&ProviderToken::of::<PowerService>()));

    match container.get_type::<PowerService>() {
        Err(DependencyError::NotVisible { module, owner, .. }) => {
            assert_eq!(module, "Computer");
            assert_eq!(owner, "Power");
        }
        other => panic!("期望不可见错误，实际: {:?}", other.map(|_| ())),
    }

    assert!(container
        .get_in("Cpu", &ProviderToken::of::<PowerService>())
        .is_ok());
    Ok(())
}

#[test]
fn test_topological_order_puts_imports_first() -> anyhow::Result<()> {
    let mut graph = ModuleGraph::from_definitions(computer_modules(Arc::new(AtomicUsize::new(0))))?;
    graph.validate()?;

    let order = graph.topological_order();
    let position = |name: &str| order.iter().position(|m| *m == name).unwrap();
    assert!(position("Power") < position("Cpu"));
    assert!(position("Power") < position("Disk"));
    assert!(position("Cpu") < position("Computer"));
    assert!(position("Disk") < position("Computer"));
    Ok(())
}

#[test]
fn test_import_cycle_is_reported_with_path() {
    let result = Container::build([
        ModuleDefinition::new("X").import("Y"),
        ModuleDefinition::new("Y").import("X"),
        ModuleDefinition::new("App").import("X"),
    ]);

    match result {
        Err(ModuleError::ImportCycle { cycle }) => {
            assert_eq!(cycle.len(), 3);
            assert_eq!(cycle.first(), cycle.last());
            assert!(cycle.contains(&"X".to_string()));
            assert!(cycle.contains(&"Y".to_string()));
        }
        other => panic!("期望导入循环错误，实际: {:?}", other.map(|_| ())),
    }
}

#[test]
fn test_provider_cycle_is_reported_at_resolution() -> anyhow::Result<()> {
    let container = Container::build([ModuleDefinition::new("App")
        .provider(ProviderDefinition::value("P", ()).depends_on("Q"))
        .provider(ProviderDefinition::value("Q", ()).depends_on("P"))])?;

    match container.get(&"P".into()) {
        Err(DependencyError::CircularDependency { chain }) => {
            let names: Vec<_> = chain.iter().map(ProviderToken::name).collect();
            assert_eq!(names, ["P", "Q", "P"]);
        }
        other => panic!("期望循环依赖错误，实际: {:?}", other.map(|_| ())),
    }

    assert!(!container.is_resolved(&"P".into()));
    assert!(!container.is_resolved(&"Q".into()));
    Ok(())
}

#[test]
fn test_duplicate_token_across_modules_is_rejected() {
    let result = Container::build([
        ModuleDefinition::new("A").provider(ProviderDefinition::value("Logger", 1_u8)),
        ModuleDefinition::new("B").provider(ProviderDefinition::value("Logger", 2_u8)),
        ModuleDefinition::new("App").import("A").import("B"),
    ]);

    assert_eq!(
        result.unwrap_err(),
        ModuleError::DuplicateProviderToken {
            token: "Logger".into(),
            first_module: "A".into(),
            second_module: "B".into(),
        }
    );
}

#[test]
fn test_unknown_import_and_dangling_export() {
    assert!(matches!(
        Container::build([ModuleDefinition::new("App").import("Missing")]),
        Err(ModuleError::UnknownModule { name, referenced_by })
            if name == "Missing" && referenced_by == "App"
    ));

    assert!(matches!(
        Container::build([ModuleDefinition::new("App").export("Ghost")]),
        Err(ModuleError::DanglingExport { module, .. }) if module == "App"
    ));
}

#[test]
fn test_re_export_requires_every_hop() -> anyhow::Result<()> {
    let container = Container::build([
        ModuleDefinition::new("Config")
            .provide_exported(ProviderDefinition::value("Settings", "prod")),
        ModuleDefinition::new("Core").import("Config").export("Settings"),
        ModuleDefinition::new("Feature").import("Core"),
        ModuleDefinition::new("App").import("Feature"),
    ])?;

    let settings = container.get_in("Feature", &"Settings".into())?;
    assert_eq!(settings.downcast_ref::<&str>(), Some(&"prod"));

    // Feature 没有继续导出，App 看不到
    assert!(matches!(
        container.get(&"Settings".into()),
        Err(DependencyError::NotVisible { .. })
    ));
    Ok(())
}

#[test]
fn test_failing_factory_caches_successful_dependencies_only() -> anyhow::Result<()> {
    let attempts = Arc::new(AtomicUsize::new(0));
    let attempts_in_factory = attempts.clone();

    let container = Container::build([ModuleDefinition::new("App")
        .provider(ProviderDefinition::value("Clock", 42_u64))
        .provider(
            ProviderDefinition::factory::<u64, _>("Scheduler", move |_| {
                attempts_in_factory.fetch_add(1, Ordering::SeqCst);
                Err("调度器启动失败".into())
            })
            .depends_on("Clock"),
        )])?;

    for _ in 0..2 {
        assert!(matches!(
            container.get(&"Scheduler".into()),
            Err(DependencyError::FactoryError { token, .. }) if token.name() == "Scheduler"
        ));
    }

    assert_eq!(attempts.load(Ordering::SeqCst), 2);
    assert!(container.is_resolved(&"Clock".into()));
    assert!(!container.is_resolved(&"Scheduler".into()));
    assert_eq!(container.stats().resolution_errors, 2);
    Ok(())
}

#[test]
fn test_resolver_can_be_used_without_container() -> anyhow::Result<()> {
    let mut graph = ModuleGraph::from_definitions(computer_modules(Arc::new(AtomicUsize::new(0))))?;
    graph.validate()?;
    let resolver = Resolver::new(Arc::new(graph));

    let cpu = resolver.resolve_typed::<CpuService>("Cpu", &ProviderToken::of::<CpuService>())?;
    assert_eq!(cpu.compute(20, 22), 42);
    assert!(resolver.can_resolve("Computer", &ProviderToken::of::<DiskService>()));
    assert!(!resolver.can_resolve("Computer", &ProviderToken::of::<PowerService>()));
    Ok(())
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_first_use_constructs_once() -> anyhow::Result<()> {
    let constructions = Arc::new(AtomicUsize::new(0));
    let container = Arc::new(Container::build(computer_modules(constructions.clone()))?);

    let handles: Vec<_> = (0..16)
        .map(|_| {
            let container = container.clone();
            tokio::task::spawn_blocking(move || container.get_type::<ComputerService>())
        })
        .collect();

    let mut computers = Vec::with_capacity(handles.len());
    for handle in handles {
        computers.push(handle.await??);
    }

    assert_eq!(constructions.load(Ordering::SeqCst), 1);
    assert!(computers
        .windows(2)
        .all(|pair| Arc::ptr_eq(&pair[0], &pair[1])));
    assert_eq!(container.stats().resolved_instances, 4);
    Ok(())
}
