//! 错误类型定义

use crate::metadata::ProviderToken;
use thiserror::Error;

/// 工厂与外部调用方使用的通用错误类型
pub type BoxError = Box<dyn std::error::Error + Send + Sync>;

fn format_chain(chain: &[ProviderToken]) -> String {
    chain
        .iter()
        .map(ProviderToken::name)
        .collect::<Vec<_>>()
        .join(" -> ")
}

/// 模块图构建错误类型
///
/// 全部为构建期致命错误，出现时不会创建容器。
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ModuleError {
    #[error("模块重复注册: {name}")]
    DuplicateModule { name: String },

    #[error("模块未注册: {name} (被 {referenced_by} 引用)")]
    UnknownModule { name: String, referenced_by: String },

    #[error("提供者重复声明: {token}, 首次声明于 {first_module}, 再次声明于 {second_module}")]
    DuplicateProviderToken {
        token: ProviderToken,
        first_module: String,
        second_module: String,
    },

    #[error("检测到模块导入循环: {}", .cycle.join(" -> "))]
    ImportCycle { cycle: Vec<String> },

    #[error("模块 {module} 导出了未声明且无法再导出的提供者: {token}")]
    DanglingExport { module: String, token: ProviderToken },

    #[error("无法确定根模块，候选: {candidates:?}")]
    RootModuleUndetermined { candidates: Vec<String> },

    #[error("容器配置无效: {message}")]
    InvalidConfig { message: String },

    #[error("模块 {module} 中的提供者 {token} 依赖不可见的 {dependency}")]
    UnresolvableDependency {
        module: String,
        token: ProviderToken,
        dependency: ProviderToken,
    },
}

/// 依赖解析错误类型
///
/// 解析期错误只中止当前解析链，实例缓存保持不变。
#[derive(Error, Debug)]
pub enum DependencyError {
    #[error("提供者 {token} 对模块 {module} 不可见 (声明于 {owner})")]
    NotVisible {
        module: String,
        token: ProviderToken,
        owner: String,
    },

    #[error("提供者未声明: {token}")]
    UnknownProvider { token: ProviderToken },

    #[error("模块未注册: {name}")]
    UnknownModule { name: String },

    #[error("循环依赖检测到: {}", format_chain(.chain))]
    CircularDependency { chain: Vec<ProviderToken> },

    #[error("解析深度超过上限 {max_depth}: {token}")]
    MaxDepthExceeded { token: ProviderToken, max_depth: usize },

    #[error("提供者创建失败: {token}, 原因: {source}")]
    FactoryError { token: ProviderToken, source: BoxError },

    #[error("依赖下标越界: 第 {index} 个依赖不存在 (共声明 {declared} 个)")]
    DependencyIndexOutOfRange { index: usize, declared: usize },

    #[error("类型转换失败: {token}, 期望类型 {expected}")]
    TypeMismatch {
        token: ProviderToken,
        expected: &'static str,
    },
}

impl DependencyError {
    /// 包装工厂错误
    pub fn factory(token: ProviderToken, source: impl Into<BoxError>) -> Self {
        Self::FactoryError {
            token,
            source: source.into(),
        }
    }

    /// 创建类型转换错误
    pub fn type_mismatch<T: 'static>(token: ProviderToken) -> Self {
        Self::TypeMismatch {
            token,
            expected: std::any::type_name::<T>(),
        }
    }
}

/// 配置错误类型
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("配置文件不存在: {path}")]
    FileNotFound { path: String },

    #[error("配置解析失败: {source}")]
    ParseError { source: BoxError },

    #[error("配置验证失败: {message}")]
    ValidationError { message: String },
}

/// 基础设施错误类型
#[derive(Error, Debug)]
pub enum InfrastructureError {
    #[error("配置错误: {source}")]
    ConfigError {
        #[from]
        source: ConfigError,
    },

    #[error("模块图错误: {source}")]
    ModuleError {
        #[from]
        source: ModuleError,
    },

    #[error("依赖注入错误: {source}")]
    DependencyError {
        #[from]
        source: DependencyError,
    },

    #[error("基础设施启动失败: {message}")]
    BootstrapFailed { message: String },
}

/// 结果类型别名
pub type ModuleResult<T> = Result<T, ModuleError>;
pub type DependencyResult<T> = Result<T, DependencyError>;
pub type ConfigResult<T> = Result<T, ConfigError>;
pub type InfrastructureResult<T> = Result<T, InfrastructureError>;
