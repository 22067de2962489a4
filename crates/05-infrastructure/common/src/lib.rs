//! # Infrastructure Common
//!
//! 这个 crate 提供了依赖注入容器各层共享的基础类型。
//!
//! ## 核心类型
//!
//! - [`ProviderToken`] - 提供者标识（名称或类型）
//! - [`TypeInfo`] - 类型描述信息
//! - [`ModuleError`] - 模块图构建期错误
//! - [`DependencyError`] - 依赖解析期错误
//! - [`InfrastructureError`] - 组合层统一错误
//!
//! ## 设计原则
//!
//! - 构建期错误一律致命，不产生部分可用的容器
//! - 解析期错误可恢复，不污染实例缓存

pub mod errors;
pub mod metadata;

pub use errors::*;
pub use metadata::*;
