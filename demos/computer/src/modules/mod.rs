//! 电脑演示的模块声明

pub mod computer;
pub mod cpu;
pub mod disk;
pub mod power;

use di_abstractions::ModuleDefinition;

/// 全部模块，顺序无关
pub fn all() -> Vec<ModuleDefinition> {
    vec![computer::module(), cpu::module(), disk::module(), power::module()]
}
