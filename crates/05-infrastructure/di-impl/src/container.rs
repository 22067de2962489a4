//! 容器（组合根）
//!
//! 外部代码获取已构造提供者的唯一入口。

use crate::graph::ModuleGraph;
use crate::resolver::Resolver;
use di_abstractions::{
    ContainerConfig, ContainerStats, Instance, ModuleDefinition, ProviderResolver,
};
use infrastructure_common::{DependencyResult, ModuleError, ModuleResult, ProviderToken};
use std::sync::Arc;
use tracing::info;

/// 依赖注入容器
pub struct Container {
    resolver: Resolver,
    root: String,
    config: ContainerConfig,
}

impl Container {
    /// 构建容器，根模块取唯一一个未被导入的模块
    pub fn build<I>(definitions: I) -> ModuleResult<Self>
    where
        I: IntoIterator<Item = ModuleDefinition>,
    {
        Self::build_with_config(definitions, ContainerConfig::default())
    }

    /// 以指定根模块构建容器
    pub fn build_with_root<I>(definitions: I, root: impl Into<String>) -> ModuleResult<Self>
    where
        I: IntoIterator<Item = ModuleDefinition>,
    {
        Self::build_with_config(definitions, ContainerConfig::default().with_root_module(root))
    }

    /// 按配置构建容器
    ///
    /// `eager` 不在此处理：立即实例化的失败属于解析期错误，由调用方调用
    /// [`Container::init_all`]。
    pub fn build_with_config<I>(definitions: I, config: ContainerConfig) -> ModuleResult<Self>
    where
        I: IntoIterator<Item = ModuleDefinition>,
    {
        config
            .validate()
            .map_err(|e| ModuleError::InvalidConfig {
                message: e.to_string(),
            })?;

        let mut graph = ModuleGraph::from_definitions(definitions)?;
        graph.validate()?;
        if config.strict_dependency_check {
            graph.validate_dependencies()?;
        }

        let root = Self::determine_root(&graph, config.root_module.as_deref())?;
        info!(
            "构建容器完成: 根模块 {}, {} 个模块, {} 个提供者",
            root,
            graph.module_count(),
            graph.provider_count()
        );

        let resolver = Resolver::new(Arc::new(graph)).with_max_depth(config.max_resolution_depth);
        Ok(Self {
            resolver,
            root,
            config,
        })
    }

    fn determine_root(graph: &ModuleGraph, explicit: Option<&str>) -> ModuleResult<String> {
        if let Some(root) = explicit {
            if !graph.contains_module(root) {
                return Err(ModuleError::UnknownModule {
                    name: root.to_string(),
                    referenced_by: "<root>".to_string(),
                });
            }
            return Ok(root.to_string());
        }

        match graph.root_candidates().as_slice() {
            [root] => Ok((*root).to_string()),
            candidates => Err(ModuleError::RootModuleUndetermined {
                candidates: candidates.iter().map(|name| (*name).to_string()).collect(),
            }),
        }
    }

    /// 在根模块中解析提供者
    ///
    /// 整条解析链持有实例缓存写锁，工厂内不能再调用同一容器的 `get`，否则会死锁。
    pub fn get(&self, token: &ProviderToken) -> DependencyResult<Instance> {
        self.resolver.resolve(&self.root, token)
    }

    /// 在根模块中解析并转换为具体类型
    pub fn get_typed<T>(&self, token: &ProviderToken) -> DependencyResult<Arc<T>>
    where
        T: Send + Sync + 'static,
    {
        self.resolver.resolve_typed(&self.root, token)
    }

    /// 解析以类型 `T` 为标识的提供者
    pub fn get_type<T>(&self) -> DependencyResult<Arc<T>>
    where
        T: Send + Sync + 'static,
    {
        self.get_typed(&ProviderToken::of::<T>())
    }

    /// 在指定模块中解析提供者
    pub fn get_in(&self, module: &str, token: &ProviderToken) -> DependencyResult<Instance> {
        self.resolver.resolve(module, token)
    }

    /// 立即实例化全部提供者，返回新创建的实例数量
    pub fn init_all(&self) -> DependencyResult<usize> {
        let created = self.resolver.resolve_all()?;
        info!("立即实例化完成，新建 {} 个实例", created);
        Ok(created)
    }

    pub fn is_resolved(&self, token: &ProviderToken) -> bool {
        self.resolver.is_resolved(token)
    }

    pub fn can_resolve(&self, token: &ProviderToken) -> bool {
        self.resolver.can_resolve(&self.root, token)
    }

    pub fn root_module(&self) -> &str {
        &self.root
    }

    pub fn graph(&self) -> &ModuleGraph {
        self.resolver.graph()
    }

    pub fn config(&self) -> &ContainerConfig {
        &self.config
    }

    /// 获取统计信息
    pub fn stats(&self) -> ContainerStats {
        ContainerStats {
            registered_modules: self.graph().module_count(),
            registered_providers: self.graph().provider_count(),
            resolved_instances: self.resolver.resolved_count(),
            resolution_errors: self.resolver.resolution_errors(),
        }
    }
}

impl std::fmt::Debug for Container {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Container")
            .field("root", &self.root)
            .field("resolver", &self.resolver)
            .finish()
    }
}
