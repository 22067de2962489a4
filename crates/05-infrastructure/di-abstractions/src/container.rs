//! 依赖注入容器配置与统计

use infrastructure_common::{ConfigError, ConfigResult};
use serde::{Deserialize, Serialize};

/// 默认最大解析深度
pub const DEFAULT_MAX_RESOLUTION_DEPTH: usize = 100;

/// 容器配置
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContainerConfig {
    /// 根模块名称，未设置时取唯一一个未被导入的模块
    pub root_module: Option<String>,
    /// 构建完成后立即实例化全部提供者
    pub eager: bool,
    /// 构建期检查每个依赖对其所属模块是否可见
    pub strict_dependency_check: bool,
    /// 最大解析深度
    pub max_resolution_depth: usize,
}

impl Default for ContainerConfig {
    fn default() -> Self {
        Self {
            root_module: None,
            eager: false,
            strict_dependency_check: false,
            max_resolution_depth: DEFAULT_MAX_RESOLUTION_DEPTH,
        }
    }
}

impl ContainerConfig {
    /// 设置根模块
    pub fn with_root_module(mut self, root: impl Into<String>) -> Self {
        self.root_module = Some(root.into());
        self
    }

    /// 设置是否立即实例化
    pub fn with_eager(mut self, eager: bool) -> Self {
        self.eager = eager;
        self
    }

    /// 设置是否严格检查依赖
    pub fn with_strict_dependency_check(mut self, strict: bool) -> Self {
        self.strict_dependency_check = strict;
        self
    }

    /// 设置最大解析深度
    pub fn with_max_resolution_depth(mut self, depth: usize) -> Self {
        self.max_resolution_depth = depth;
        self
    }

    /// 校验配置取值
    pub fn validate(&self) -> ConfigResult<()> {
        if self.max_resolution_depth == 0 {
            return Err(ConfigError::ValidationError {
                message: "container.max_resolution_depth 必须大于 0".to_string(),
            });
        }
        if self.root_module.as_deref().is_some_and(str::is_empty) {
            return Err(ConfigError::ValidationError {
                message: "container.root_module 不能为空字符串".to_string(),
            });
        }
        Ok(())
    }
}

/// 容器统计信息
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContainerStats {
    /// 已注册模块数量
    pub registered_modules: usize,
    /// 已注册提供者数量
    pub registered_providers: usize,
    /// 已创建的单例数量
    pub resolved_instances: usize,
    /// 解析错误数量
    pub resolution_errors: usize,
}
