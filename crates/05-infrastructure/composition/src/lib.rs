//! # 基础设施组合层
//!
//! 依赖注入容器的组合根，负责把模块声明、容器配置和日志组装成一个
//! 可用的 [`Container`]。
//!
//! ## 主要功能
//!
//! - **应用构建器**: 使用构建者模式收集模块声明
//! - **配置源管理**: 从 TOML 文件和环境变量加载 [`ContainerConfig`]
//! - **日志初始化**: 按 [`LoggingConfig`] 安装 tracing 订阅者
//!
//! ## 基本使用
//!
//! ```rust,no_run
//! use di_abstractions::{ModuleDefinition, ProviderDefinition};
//! use infrastructure_composition::{ApplicationBuilder, LoggingConfig};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let container = ApplicationBuilder::new()
//!         .add_config_toml("config/app.toml")?
//!         .add_config_env_vars("ADSP")
//!         .with_logging(LoggingConfig::development())
//!         .add_module(
//!             ModuleDefinition::new("App")
//!                 .provider(ProviderDefinition::value("AppName", "lorn-adsp")),
//!         )
//!         .build()?;
//!
//!     let name = container.get_typed::<&str>(&"AppName".into())?;
//!     println!("应用名称: {}", name);
//!     Ok(())
//! }
//! ```

pub mod builder;
pub mod config_sources;

pub use builder::{ApplicationBuilder, LoggingConfig};
pub use config_sources::{load_container_config, ConfigSource};

// 重新导出常用类型
pub use di_abstractions::ContainerConfig;
pub use di_impl::Container;
pub use infrastructure_common::InfrastructureError;
