//! # 依赖注入具体实现
//!
//! 提供模块图、依赖解析器和容器（组合根）实现。
//!
//! ```rust
//! use di_abstractions::{ModuleDefinition, ProviderDefinition};
//! use di_impl::Container;
//!
//! let power = ModuleDefinition::new("Power")
//!     .provide_exported(ProviderDefinition::value("PowerService", 300_u32));
//! let cpu = ModuleDefinition::new("Cpu").import("Power").provide_exported(
//!     ProviderDefinition::factory("CpuService", |deps| {
//!         let watts = deps.get::<u32>(0)?;
//!         Ok(format!("cpu@{watts}W"))
//!     })
//!     .depends_on("PowerService"),
//! );
//! let app = ModuleDefinition::new("App").import("Cpu");
//!
//! let container = Container::build([power, cpu, app])?;
//! let cpu_service = container.get_typed::<String>(&"CpuService".into())?;
//! assert_eq!(cpu_service.as_str(), "cpu@300W");
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

pub mod container;
pub mod graph;
pub mod resolver;

pub use container::Container;
pub use graph::ModuleGraph;
pub use resolver::Resolver;
