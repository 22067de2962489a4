//! # Dependency Injection Abstractions
//!
//! 依赖注入抽象层，定义模块声明和依赖解析的核心接口。
//!
//! ## 核心接口
//!
//! - [`ModuleDefinition`] - 模块声明（导入、提供者、导出）
//! - [`ProviderDefinition`] - 提供者声明（工厂与依赖列表）
//! - [`ProviderResolver`] - 依赖解析器接口
//! - [`ResolveContext`] - 单次解析的解析链
//! - [`ContainerConfig`] - 容器配置

pub mod container;
pub mod definition;
pub mod resolver;

pub use container::*;
pub use definition::*;
pub use resolver::*;
