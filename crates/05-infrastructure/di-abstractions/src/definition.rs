//! 模块与提供者声明
//!
//! 外部代码以声明的方式描述模块图，容器只消费这些声明。

use infrastructure_common::{BoxError, DependencyError, DependencyResult, ProviderToken};
use std::any::Any;
use std::fmt;
use std::sync::Arc;

/// 已构造的提供者实例
pub type Instance = Arc<dyn Any + Send + Sync>;

/// 提供者工厂函数类型
pub type ProviderFactoryFn =
    Arc<dyn Fn(&ResolvedDependencies) -> Result<Instance, BoxError> + Send + Sync>;

/// 已解析的依赖
///
/// 按提供者声明的依赖顺序排列。
#[derive(Clone, Default)]
pub struct ResolvedDependencies {
    tokens: Vec<ProviderToken>,
    instances: Vec<Instance>,
}

impl ResolvedDependencies {
    /// 创建已解析依赖集合，`tokens` 与 `instances` 一一对应
    pub fn new(tokens: Vec<ProviderToken>, instances: Vec<Instance>) -> Self {
        debug_assert_eq!(tokens.len(), instances.len());
        Self { tokens, instances }
    }

    pub fn len(&self) -> usize {
        self.instances.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instances.is_empty()
    }

    /// 获取未转换类型的依赖实例
    pub fn instance(&self, index: usize) -> Option<&Instance> {
        self.instances.get(index)
    }

    /// 按声明位置获取依赖并转换为具体类型
    pub fn get<T>(&self, index: usize) -> DependencyResult<Arc<T>>
    where
        T: Send + Sync + 'static,
    {
        let (token, instance) = self
            .tokens
            .get(index)
            .zip(self.instances.get(index))
            .ok_or(DependencyError::DependencyIndexOutOfRange {
                index,
                declared: self.instances.len(),
            })?;
        instance
            .clone()
            .downcast::<T>()
            .map_err(|_| DependencyError::type_mismatch::<T>(token.clone()))
    }
}

impl fmt::Debug for ResolvedDependencies {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResolvedDependencies")
            .field("tokens", &self.tokens)
            .finish()
    }
}

/// 提供者声明
#[derive(Clone)]
pub struct ProviderDefinition {
    token: ProviderToken,
    dependencies: Vec<ProviderToken>,
    factory: ProviderFactoryFn,
}

impl ProviderDefinition {
    /// 使用类型擦除的工厂创建提供者
    ///
    /// 工厂在容器的实例缓存写锁内执行，只能使用传入的依赖；
    /// 在工厂中回调同一容器的 `get` 会死锁。
    pub fn new<F>(token: impl Into<ProviderToken>, factory: F) -> Self
    where
        F: Fn(&ResolvedDependencies) -> Result<Instance, BoxError> + Send + Sync + 'static,
    {
        Self {
            token: token.into(),
            dependencies: Vec::new(),
            factory: Arc::new(factory),
        }
    }

    /// 使用类型化工厂创建提供者
    pub fn factory<T, F>(token: impl Into<ProviderToken>, factory: F) -> Self
    where
        T: Send + Sync + 'static,
        F: Fn(&ResolvedDependencies) -> Result<T, BoxError> + Send + Sync + 'static,
    {
        Self::new(token, move |deps| {
            factory(deps).map(|value| Arc::new(value) as Instance)
        })
    }

    /// 以类型 `T` 作为标识创建提供者
    pub fn for_type<T, F>(factory: F) -> Self
    where
        T: Send + Sync + 'static,
        F: Fn(&ResolvedDependencies) -> Result<T, BoxError> + Send + Sync + 'static,
    {
        Self::factory(ProviderToken::of::<T>(), factory)
    }

    /// 值提供者，首次解析时发布预先构造好的值
    pub fn value<T>(token: impl Into<ProviderToken>, value: T) -> Self
    where
        T: Send + Sync + 'static,
    {
        let instance: Instance = Arc::new(value);
        Self::new(token, move |_| Ok(instance.clone()))
    }

    /// 追加依赖，保留声明顺序
    pub fn depends_on(mut self, token: impl Into<ProviderToken>) -> Self {
        self.dependencies.push(token.into());
        self
    }

    /// 追加以类型为标识的依赖
    pub fn depends_on_type<T: 'static>(self) -> Self {
        self.depends_on(ProviderToken::of::<T>())
    }

    pub fn token(&self) -> &ProviderToken {
        &self.token
    }

    pub fn dependencies(&self) -> &[ProviderToken] {
        &self.dependencies
    }

    /// 调用工厂
    pub fn create(&self, dependencies: &ResolvedDependencies) -> Result<Instance, BoxError> {
        (self.factory)(dependencies)
    }
}

impl fmt::Debug for ProviderDefinition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderDefinition")
            .field("token", &self.token)
            .field("dependencies", &self.dependencies)
            .field("factory", &"<function>")
            .finish()
    }
}

/// 模块声明
///
/// 导入按名称引用其他模块；提供者由模块独占；导出只是对本模块
/// （或直接导入模块所导出的）提供者的可见性标记。
#[derive(Debug, Clone)]
pub struct ModuleDefinition {
    name: String,
    imports: Vec<String>,
    providers: Vec<ProviderDefinition>,
    exports: Vec<ProviderToken>,
}

impl ModuleDefinition {
    /// 创建新的模块声明
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            imports: Vec::new(),
            providers: Vec::new(),
            exports: Vec::new(),
        }
    }

    /// 导入模块
    pub fn import(mut self, module: impl Into<String>) -> Self {
        self.imports.push(module.into());
        self
    }

    /// 声明提供者
    pub fn provider(mut self, provider: ProviderDefinition) -> Self {
        self.providers.push(provider);
        self
    }

    /// 导出提供者
    pub fn export(mut self, token: impl Into<ProviderToken>) -> Self {
        self.exports.push(token.into());
        self
    }

    /// 导出以类型为标识的提供者
    pub fn export_type<T: 'static>(self) -> Self {
        self.export(ProviderToken::of::<T>())
    }

    /// 声明并导出提供者
    pub fn provide_exported(self, provider: ProviderDefinition) -> Self {
        let token = provider.token().clone();
        self.provider(provider).export(token)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn imports(&self) -> &[String] {
        &self.imports
    }

    pub fn providers(&self) -> &[ProviderDefinition] {
        &self.providers
    }

    pub fn exports(&self) -> &[ProviderToken] {
        &self.exports
    }
}
