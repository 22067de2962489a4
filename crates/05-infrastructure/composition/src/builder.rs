//! 应用构建器

use crate::config_sources::{load_container_config, ConfigSource};
use di_abstractions::{ContainerConfig, ModuleDefinition};
use di_impl::Container;
use infrastructure_common::{ConfigError, InfrastructureError};
use std::path::Path;
use tracing::{debug, info};
use tracing_subscriber::EnvFilter;

/// 应用构建器
///
/// 使用建造者模式收集模块声明与配置，构建容器。
/// 配置优先级：构建器上的显式设置 > 环境变量 > TOML 文件 > 默认值。
pub struct ApplicationBuilder {
    /// 模块声明
    modules: Vec<ModuleDefinition>,
    /// 配置源列表
    config_sources: Vec<ConfigSource>,
    /// 显式指定的根模块
    root_module: Option<String>,
    /// 显式指定的立即实例化开关
    eager: Option<bool>,
    /// 显式指定的严格依赖检查开关
    strict_dependency_check: Option<bool>,
    /// 是否启用日志初始化
    logging_enabled: bool,
    /// 日志配置
    logging_config: LoggingConfig,
}

impl ApplicationBuilder {
    /// 创建新的应用构建器
    pub fn new() -> Self {
        Self {
            modules: Vec::new(),
            config_sources: Vec::new(),
            root_module: None,
            eager: None,
            strict_dependency_check: None,
            logging_enabled: false, // 默认不启用日志初始化
            logging_config: LoggingConfig::default(),
        }
    }

    /// 添加模块声明
    pub fn add_module(mut self, module: ModuleDefinition) -> Self {
        debug!("添加模块: {}", module.name());
        self.modules.push(module);
        self
    }

    /// 批量添加模块声明
    pub fn add_modules<I>(mut self, modules: I) -> Self
    where
        I: IntoIterator<Item = ModuleDefinition>,
    {
        self.modules.extend(modules);
        self
    }

    /// 添加 TOML 配置文件
    pub fn add_config_toml<P: AsRef<Path>>(mut self, path: P) -> Result<Self, InfrastructureError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ConfigError::FileNotFound {
                path: path.display().to_string(),
            }
            .into());
        }

        info!("添加 TOML 配置文件: {}", path.display());
        self.config_sources.push(ConfigSource::Toml(path.to_path_buf()));
        Ok(self)
    }

    /// 添加环境变量配置源
    pub fn add_config_env_vars<S: Into<String>>(mut self, prefix: S) -> Self {
        let prefix = prefix.into();
        info!("添加环境变量配置源，前缀: {}", prefix);
        self.config_sources.push(ConfigSource::Environment(prefix));
        self
    }

    /// 指定根模块
    pub fn with_root_module<S: Into<String>>(mut self, root: S) -> Self {
        self.root_module = Some(root.into());
        self
    }

    /// 构建后立即实例化全部提供者
    pub fn eager(mut self, eager: bool) -> Self {
        self.eager = Some(eager);
        self
    }

    /// 构建期检查依赖可见性
    pub fn strict_dependency_check(mut self, strict: bool) -> Self {
        self.strict_dependency_check = Some(strict);
        self
    }

    /// 配置日志
    pub fn with_logging(mut self, config: LoggingConfig) -> Self {
        self.logging_config = config;
        self.logging_enabled = true;
        self
    }

    /// 解析最终的容器配置
    pub fn resolve_config(&self) -> Result<ContainerConfig, InfrastructureError> {
        let mut config = load_container_config(&self.config_sources)?;

        if let Some(root) = &self.root_module {
            config.root_module = Some(root.clone());
        }
        if let Some(eager) = self.eager {
            config.eager = eager;
        }
        if let Some(strict) = self.strict_dependency_check {
            config.strict_dependency_check = strict;
        }

        Ok(config)
    }

    /// 构建容器
    pub fn build(self) -> Result<Container, InfrastructureError> {
        // 只有在明确配置了日志时才初始化，避免测试中重复安装订阅者
        if self.logging_enabled {
            self.logging_config.initialize()?;
        }

        info!("开始构建容器，共 {} 个模块", self.modules.len());
        let config = self.resolve_config()?;
        let eager = config.eager;

        let container = Container::build_with_config(self.modules, config)?;

        if eager {
            info!("开始立即实例化提供者");
            container.init_all()?;
        }

        info!("容器构建完成，根模块: {}", container.root_module());
        Ok(container)
    }
}

impl Default for ApplicationBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// 日志配置
#[derive(Debug, Clone)]
pub struct LoggingConfig {
    /// 日志级别，`RUST_LOG` 存在时以其为准
    pub level: tracing::Level,
    /// 是否显示目标
    pub show_target: bool,
    /// 是否显示线程ID
    pub show_thread_ids: bool,
    /// 是否显示文件名
    pub show_file: bool,
    /// 是否显示行号
    pub show_line_number: bool,
    /// 是否使用 JSON 格式
    pub json_format: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: tracing::Level::INFO,
            show_target: true,
            show_thread_ids: false,
            show_file: false,
            show_line_number: false,
            json_format: false,
        }
    }
}

impl LoggingConfig {
    /// 创建开发环境日志配置
    pub fn development() -> Self {
        Self {
            level: tracing::Level::DEBUG,
            show_target: true,
            show_thread_ids: true,
            show_file: true,
            show_line_number: true,
            json_format: false,
        }
    }

    /// 创建生产环境日志配置
    pub fn production() -> Self {
        Self {
            level: tracing::Level::INFO,
            show_target: false,
            show_thread_ids: false,
            show_file: false,
            show_line_number: false,
            json_format: true,
        }
    }

    /// 安装全局 tracing 订阅者
    pub fn initialize(&self) -> Result<(), InfrastructureError> {
        let filter = EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new(self.level.as_str().to_lowercase()));

        let subscriber = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(self.show_target)
            .with_thread_ids(self.show_thread_ids)
            .with_file(self.show_file)
            .with_line_number(self.show_line_number);

        let result = if self.json_format {
            subscriber.json().try_init()
        } else {
            subscriber.try_init()
        };
        result.map_err(|e| InfrastructureError::BootstrapFailed {
            message: format!("日志初始化失败: {}", e),
        })?;

        info!("日志系统初始化完成");
        Ok(())
    }
}
