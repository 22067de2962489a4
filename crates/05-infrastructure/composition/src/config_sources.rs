//! 配置源管理
//!
//! 容器配置位于 `[container]` 节，后添加的配置源覆盖先添加的。

use di_abstractions::ContainerConfig;
use infrastructure_common::{ConfigError, ConfigResult};
use std::path::PathBuf;
use tracing::debug;

/// 配置节名称
pub const CONTAINER_SECTION: &str = "container";

/// 配置源
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    /// TOML 配置文件
    Toml(PathBuf),
    /// 带前缀的环境变量，例如 `ADSP_CONTAINER__EAGER=true`
    Environment(String),
}

/// 按顺序加载全部配置源并绑定为容器配置
///
/// 未提供 `[container]` 节时返回默认配置。
pub fn load_container_config(sources: &[ConfigSource]) -> ConfigResult<ContainerConfig> {
    let mut builder = config::Config::builder();

    for source in sources {
        debug!("添加配置源: {:?}", source);
        builder = match source {
            ConfigSource::Toml(path) => {
                if !path.exists() {
                    return Err(ConfigError::FileNotFound {
                        path: path.display().to_string(),
                    });
                }
                builder.add_source(
                    config::File::from(path.as_path())
                        .format(config::FileFormat::Toml)
                        .required(true),
                )
            }
            ConfigSource::Environment(prefix) => builder.add_source(
                config::Environment::with_prefix(prefix)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            ),
        };
    }

    let settings = builder.build().map_err(|e| ConfigError::ParseError {
        source: Box::new(e),
    })?;

    let container_config = match settings.get::<ContainerConfig>(CONTAINER_SECTION) {
        Ok(config) => config,
        Err(config::ConfigError::NotFound(_)) => ContainerConfig::default(),
        Err(e) => {
            return Err(ConfigError::ParseError {
                source: Box::new(e),
            })
        }
    };

    container_config.validate()?;
    Ok(container_config)
}
