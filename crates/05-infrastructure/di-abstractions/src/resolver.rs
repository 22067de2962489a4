//! 依赖解析器抽象接口
//!
//! 提供依赖解析和提供者实例化的能力

use crate::definition::Instance;
use infrastructure_common::{DependencyError, DependencyResult, ProviderToken};
use std::sync::Arc;

/// 依赖解析器 trait
///
/// 在指定模块的可见范围内解析提供者，并保证每个提供者最多构造一次
pub trait ProviderResolver: Send + Sync {
    /// 在模块 `module` 中解析提供者
    fn resolve(&self, module: &str, token: &ProviderToken) -> DependencyResult<Instance>;

    /// 检查提供者对模块是否可见
    fn can_resolve(&self, module: &str, token: &ProviderToken) -> bool;

    /// 检查提供者是否已有单例实例
    fn is_resolved(&self, token: &ProviderToken) -> bool;

    /// 解析并转换为具体类型
    fn resolve_typed<T>(&self, module: &str, token: &ProviderToken) -> DependencyResult<Arc<T>>
    where
        T: Send + Sync + 'static,
        Self: Sized,
    {
        self.resolve(module, token)?
            .downcast::<T>()
            .map_err(|_| DependencyError::type_mismatch::<T>(token.clone()))
    }
}

/// 解析上下文
///
/// 单次 `resolve` 调用内的解析链，用于检测提供者级别的循环依赖
#[derive(Debug, Clone)]
pub struct ResolveContext {
    /// 当前解析链
    resolution_chain: Vec<ProviderToken>,
    /// 最大解析深度
    max_depth: usize,
}

impl ResolveContext {
    /// 创建新的解析上下文
    pub fn new(max_depth: usize) -> Self {
        Self {
            resolution_chain: Vec::new(),
            max_depth,
        }
    }

    /// 将提供者压入解析链
    pub fn push_token(&mut self, token: &ProviderToken) -> DependencyResult<()> {
        if self.resolution_chain.contains(token) {
            let mut chain = self.resolution_chain.clone();
            chain.push(token.clone());
            return Err(DependencyError::CircularDependency { chain });
        }
        if self.resolution_chain.len() >= self.max_depth {
            return Err(DependencyError::MaxDepthExceeded {
                token: token.clone(),
                max_depth: self.max_depth,
            });
        }
        self.resolution_chain.push(token.clone());
        Ok(())
    }

    /// 从解析链中弹出提供者
    pub fn pop_token(&mut self) {
        self.resolution_chain.pop();
    }

    pub fn depth(&self) -> usize {
        self.resolution_chain.len()
    }

    pub fn chain(&self) -> &[ProviderToken] {
        &self.resolution_chain
    }
}

impl Default for ResolveContext {
    fn default() -> Self {
        Self::new(crate::container::DEFAULT_MAX_RESOLUTION_DEPTH)
    }
}
