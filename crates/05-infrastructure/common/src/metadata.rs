//! 元数据定义
//!
//! 提供类型信息与提供者标识

use std::any::TypeId;
use std::fmt;
use std::hash::{Hash, Hasher};

/// 类型信息
#[derive(Debug, Clone)]
pub struct TypeInfo {
    /// 类型名称（各路径段均不含模块路径，保留泛型参数）
    pub name: String,
    /// 类型ID
    pub id: TypeId,
    /// 完整类型路径
    pub module_path: String,
}

impl TypeInfo {
    /// 从类型获取类型信息
    pub fn of<T: 'static>() -> Self {
        let full_name = std::any::type_name::<T>();
        Self {
            name: short_type_name(full_name),
            id: TypeId::of::<T>(),
            module_path: full_name.to_string(),
        }
    }

    /// 获取简短的类型名称
    pub fn short_name(&self) -> &str {
        &self.name
    }
}

/// 去掉每个路径段的模块前缀，例如
/// `alloc::sync::Arc<dyn app::Logger>` -> `Arc<dyn Logger>`
fn short_type_name(full_name: &str) -> String {
    fn push_last_segment(out: &mut String, path: &str) {
        out.push_str(path.rsplit("::").next().unwrap_or(path));
    }

    let mut out = String::with_capacity(full_name.len());
    let mut path = String::new();
    for ch in full_name.chars() {
        if ch.is_alphanumeric() || ch == '_' || ch == ':' {
            path.push(ch);
        } else {
            push_last_segment(&mut out, &path);
            path.clear();
            out.push(ch);
        }
    }
    push_last_segment(&mut out, &path);
    out
}

// 同一类型的名称永远一致，只比较 TypeId
impl PartialEq for TypeInfo {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for TypeInfo {}

impl Hash for TypeInfo {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

/// 提供者标识
///
/// 在整个模块图中唯一地命名一个可构造的服务。
/// 可以是字符串（符号）形式，也可以是类型描述符形式。
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ProviderToken {
    /// 字符串标识
    Named(String),
    /// 类型标识
    Type(TypeInfo),
}

impl ProviderToken {
    /// 创建字符串标识
    pub fn named(name: impl Into<String>) -> Self {
        Self::Named(name.into())
    }

    /// 以类型创建标识
    pub fn of<T: 'static>() -> Self {
        Self::Type(TypeInfo::of::<T>())
    }

    /// 用于日志与诊断的名称
    pub fn name(&self) -> &str {
        match self {
            Self::Named(name) => name,
            Self::Type(info) => info.short_name(),
        }
    }
}

impl fmt::Display for ProviderToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl From<&str> for ProviderToken {
    fn from(name: &str) -> Self {
        Self::named(name)
    }
}

impl From<String> for ProviderToken {
    fn from(name: String) -> Self {
        Self::Named(name)
    }
}
