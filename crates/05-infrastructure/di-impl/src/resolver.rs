//! 依赖解析器
//!
//! 按需构造提供者实例并缓存单例，同时检查可见性与提供者级循环依赖。

use crate::graph::ModuleGraph;
use di_abstractions::{
    Instance, ProviderDefinition, ProviderResolver, ResolveContext, ResolvedDependencies,
    DEFAULT_MAX_RESOLUTION_DEPTH,
};
use infrastructure_common::{DependencyError, DependencyResult, ProviderToken};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use tracing::{debug, warn};

type InstanceCache = HashMap<ProviderToken, Instance>;

/// 依赖解析器
///
/// 实例缓存由一把读写锁保护：命中时只持有读锁；未命中时持有写锁完成
/// 整条解析链的构造与写入，写锁内再次检查缓存，保证每个提供者最多构造一次。
/// 工厂在写锁内执行，但只能通过参数拿到依赖，无法回调容器。
pub struct Resolver {
    graph: Arc<ModuleGraph>,
    cache: RwLock<InstanceCache>,
    max_depth: usize,
    resolution_errors: AtomicUsize,
}

impl Resolver {
    /// 创建解析器，`graph` 必须已通过校验
    pub fn new(graph: Arc<ModuleGraph>) -> Self {
        debug_assert!(graph.is_validated());
        Self {
            graph,
            cache: RwLock::new(HashMap::new()),
            max_depth: DEFAULT_MAX_RESOLUTION_DEPTH,
            resolution_errors: AtomicUsize::new(0),
        }
    }

    /// 设置最大解析深度
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    pub fn graph(&self) -> &ModuleGraph {
        &self.graph
    }

    /// 已创建的单例数量
    pub fn resolved_count(&self) -> usize {
        self.cache.read().len()
    }

    /// 累计解析失败次数
    pub fn resolution_errors(&self) -> usize {
        self.resolution_errors.load(Ordering::Relaxed)
    }

    /// 按模块拓扑顺序实例化全部提供者
    ///
    /// 返回本次新创建的实例数量。
    pub fn resolve_all(&self) -> DependencyResult<usize> {
        let before = self.resolved_count();
        for &module_idx in self.graph.topological_indices() {
            let module = self.graph.module_name(module_idx).to_string();
            let tokens: Vec<ProviderToken> = self
                .graph
                .providers_in(module_idx)
                .map(|provider| provider.token().clone())
                .collect();
            for token in tokens {
                self.resolve(&module, &token)?;
            }
        }
        Ok(self.resolved_count() - before)
    }

    /// 检查可见性并定位提供者
    fn locate_visible(
        &self,
        module_idx: usize,
        token: &ProviderToken,
    ) -> DependencyResult<(usize, &ProviderDefinition)> {
        let (owner, provider) =
            self.graph
                .locate(token)
                .ok_or_else(|| DependencyError::UnknownProvider {
                    token: token.clone(),
                })?;

        if !self.graph.is_visible_from(module_idx, token) {
            return Err(DependencyError::NotVisible {
                module: self.graph.module_name(module_idx).to_string(),
                token: token.clone(),
                owner: self.graph.module_name(owner).to_string(),
            });
        }

        Ok((owner, provider))
    }

    fn resolve_root(&self, module_idx: usize, token: &ProviderToken) -> DependencyResult<Instance> {
        self.locate_visible(module_idx, token)?;

        if let Some(instance) = self.cache.read().get(token) {
            debug!("命中单例缓存: {}", token);
            return Ok(instance.clone());
        }

        let mut cache = self.cache.write();
        let mut context = ResolveContext::new(self.max_depth);
        self.resolve_in(module_idx, token, &mut cache, &mut context)
    }

    fn resolve_in(
        &self,
        module_idx: usize,
        token: &ProviderToken,
        cache: &mut InstanceCache,
        context: &mut ResolveContext,
    ) -> DependencyResult<Instance> {
        let (owner, provider) = self.locate_visible(module_idx, token)?;

        if let Some(instance) = cache.get(token) {
            return Ok(instance.clone());
        }

        context.push_token(token)?;
        let result = self.construct(owner, provider, cache, context);
        context.pop_token();

        let instance = result?;
        cache.insert(token.clone(), instance.clone());
        Ok(instance)
    }

    /// 依赖在提供者所属模块的范围内按声明顺序解析
    fn construct(
        &self,
        owner: usize,
        provider: &ProviderDefinition,
        cache: &mut InstanceCache,
        context: &mut ResolveContext,
    ) -> DependencyResult<Instance> {
        let mut instances = Vec::with_capacity(provider.dependencies().len());
        for dependency in provider.dependencies() {
            instances.push(self.resolve_in(owner, dependency, cache, context)?);
        }

        debug!(
            "创建提供者实例: {} (模块 {}, 深度 {})",
            provider.token(),
            self.graph.module_name(owner),
            context.depth()
        );
        let dependencies = ResolvedDependencies::new(provider.dependencies().to_vec(), instances);
        provider
            .create(&dependencies)
            .map_err(|source| DependencyError::FactoryError {
                token: provider.token().clone(),
                source,
            })
    }
}

impl ProviderResolver for Resolver {
    fn resolve(&self, module: &str, token: &ProviderToken) -> DependencyResult<Instance> {
        let module_idx =
            self.graph
                .module_index(module)
                .ok_or_else(|| DependencyError::UnknownModule {
                    name: module.to_string(),
                })?;

        let result = self.resolve_root(module_idx, token);
        if let Err(error) = &result {
            self.resolution_errors.fetch_add(1, Ordering::Relaxed);
            warn!("解析提供者 {} 失败 (模块 {}): {}", token, module, error);
        }
        result
    }

    fn can_resolve(&self, module: &str, token: &ProviderToken) -> bool {
        self.graph.is_visible(module, token)
    }

    fn is_resolved(&self, token: &ProviderToken) -> bool {
        self.cache.read().contains_key(token)
    }
}

impl std::fmt::Debug for Resolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Resolver")
            .field("modules", &self.graph.module_count())
            .field("resolved", &self.resolved_count())
            .field("max_depth", &self.max_depth)
            .finish()
    }
}
