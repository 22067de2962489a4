//! 模块图
//!
//! 保存全部模块声明及其导入边，并在构建期完成结构校验。

use di_abstractions::{ModuleDefinition, ProviderDefinition};
use infrastructure_common::{ModuleError, ModuleResult, ProviderToken};
use std::collections::{HashMap, HashSet};
use tracing::{debug, info};

/// 模块节点
#[derive(Debug)]
struct ModuleNode {
    name: String,
    /// 导入的模块下标，按声明顺序
    imports: Vec<usize>,
    providers: Vec<ProviderDefinition>,
    exports: Vec<ProviderToken>,
}

/// 提供者在模块图中的位置
#[derive(Debug, Clone, Copy)]
struct ProviderLocation {
    module: usize,
    provider: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum VisitMark {
    Unvisited,
    InStack,
    Done,
}

/// 模块图
///
/// 边的含义为 "A 导入 B"。所有查询都在 [`ModuleGraph::validate`] 成功之后才有意义。
#[derive(Debug, Default)]
pub struct ModuleGraph {
    modules: Vec<ModuleNode>,
    index: HashMap<String, usize>,
    owners: HashMap<ProviderToken, ProviderLocation>,
    /// 每个模块的有效导出（自身导出与显式再导出）
    effective_exports: Vec<HashSet<ProviderToken>>,
    /// 拓扑顺序，被导入的模块在前
    topological_order: Vec<usize>,
    validated: bool,
}

impl ModuleGraph {
    /// 创建空模块图
    pub fn new() -> Self {
        Self::default()
    }

    /// 从模块声明创建模块图（未校验）
    ///
    /// 先注册全部模块，再登记导入边，模块声明的先后顺序不影响结果。
    pub fn from_definitions<I>(definitions: I) -> ModuleResult<Self>
    where
        I: IntoIterator<Item = ModuleDefinition>,
    {
        let mut graph = Self::new();
        let mut edges = Vec::new();

        for definition in definitions {
            for import in definition.imports() {
                edges.push((definition.name().to_string(), import.clone()));
            }
            graph.add_module(definition)?;
        }

        for (from, to) in &edges {
            graph.add_import(from, to)?;
        }

        Ok(graph)
    }

    /// 注册模块
    ///
    /// 模块声明中的导入不会在此登记，需通过 [`ModuleGraph::add_import`] 添加。
    pub fn add_module(&mut self, definition: ModuleDefinition) -> ModuleResult<()> {
        let name = definition.name().to_string();
        if self.index.contains_key(&name) {
            return Err(ModuleError::DuplicateModule { name });
        }

        debug!("注册模块: {}", name);
        self.index.insert(name.clone(), self.modules.len());
        self.modules.push(ModuleNode {
            name,
            imports: Vec::new(),
            providers: definition.providers().to_vec(),
            exports: definition.exports().to_vec(),
        });
        self.validated = false;
        Ok(())
    }

    /// 登记导入边 `from -> to`
    pub fn add_import(&mut self, from: &str, to: &str) -> ModuleResult<()> {
        let from_idx = self.index.get(from).copied().ok_or_else(|| {
            ModuleError::UnknownModule {
                name: from.to_string(),
                referenced_by: to.to_string(),
            }
        })?;
        let to_idx = self.index.get(to).copied().ok_or_else(|| ModuleError::UnknownModule {
            name: to.to_string(),
            referenced_by: from.to_string(),
        })?;

        let imports = &mut self.modules[from_idx].imports;
        if !imports.contains(&to_idx) {
            imports.push(to_idx);
        }
        self.validated = false;
        Ok(())
    }

    /// 校验模块图
    ///
    /// 依次检查提供者重复声明、导入循环和悬空导出，
    /// 同时计算拓扑顺序和每个模块的有效导出。
    pub fn validate(&mut self) -> ModuleResult<()> {
        self.validated = false;
        self.owners = self.collect_owners()?;
        self.topological_order = self.sort_imports()?;
        self.effective_exports = self.compute_exports()?;
        self.validated = true;

        info!(
            "模块图校验通过: {} 个模块, {} 个提供者",
            self.modules.len(),
            self.owners.len()
        );
        Ok(())
    }

    /// 检查每个提供者的依赖对其所属模块是否可见
    pub fn validate_dependencies(&self) -> ModuleResult<()> {
        for (module_idx, module) in self.modules.iter().enumerate() {
            for provider in &module.providers {
                for dependency in provider.dependencies() {
                    if !self.is_visible_from(module_idx, dependency) {
                        return Err(ModuleError::UnresolvableDependency {
                            module: module.name.clone(),
                            token: provider.token().clone(),
                            dependency: dependency.clone(),
                        });
                    }
                }
            }
        }
        Ok(())
    }

    fn collect_owners(&self) -> ModuleResult<HashMap<ProviderToken, ProviderLocation>> {
        let mut owners: HashMap<ProviderToken, ProviderLocation> = HashMap::new();

        for (module_idx, module) in self.modules.iter().enumerate() {
            for (provider_idx, provider) in module.providers.iter().enumerate() {
                if let Some(existing) = owners.get(provider.token()) {
                    return Err(ModuleError::DuplicateProviderToken {
                        token: provider.token().clone(),
                        first_module: self.modules[existing.module].name.clone(),
                        second_module: module.name.clone(),
                    });
                }
                owners.insert(
                    provider.token().clone(),
                    ProviderLocation {
                        module: module_idx,
                        provider: provider_idx,
                    },
                );
            }
        }

        Ok(owners)
    }

    fn sort_imports(&self) -> ModuleResult<Vec<usize>> {
        let mut marks = vec![VisitMark::Unvisited; self.modules.len()];
        let mut path = Vec::new();
        let mut order = Vec::with_capacity(self.modules.len());

        for idx in 0..self.modules.len() {
            self.visit(idx, &mut marks, &mut path, &mut order)?;
        }

        Ok(order)
    }

    /// 深度优先搜索，`path` 即递归栈
    fn visit(
        &self,
        idx: usize,
        marks: &mut [VisitMark],
        path: &mut Vec<usize>,
        order: &mut Vec<usize>,
    ) -> ModuleResult<()> {
        match marks[idx] {
            VisitMark::Done => return Ok(()),
            VisitMark::InStack => {
                let start = path.iter().position(|&n| n == idx).unwrap_or(0);
                let cycle = path[start..]
                    .iter()
                    .chain(std::iter::once(&idx))
                    .map(|&n| self.modules[n].name.clone())
                    .collect();
                return Err(ModuleError::ImportCycle { cycle });
            }
            VisitMark::Unvisited => {}
        }

        marks[idx] = VisitMark::InStack;
        path.push(idx);
        for &next in &self.modules[idx].imports {
            self.visit(next, marks, path, order)?;
        }
        path.pop();
        marks[idx] = VisitMark::Done;
        order.push(idx);

        Ok(())
    }

    fn compute_exports(&self) -> ModuleResult<Vec<HashSet<ProviderToken>>> {
        let mut exports = vec![HashSet::new(); self.modules.len()];

        // 被导入的模块先处理，再导出时其有效导出已经确定
        for &idx in &self.topological_order {
            let module = &self.modules[idx];
            for token in &module.exports {
                let declared_here = self
                    .owners
                    .get(token)
                    .is_some_and(|location| location.module == idx);
                let reexported = module
                    .imports
                    .iter()
                    .any(|&imported| exports[imported].contains(token));

                if !declared_here && !reexported {
                    return Err(ModuleError::DanglingExport {
                        module: module.name.clone(),
                        token: token.clone(),
                    });
                }
                exports[idx].insert(token.clone());
            }
        }

        Ok(exports)
    }

    pub(crate) fn module_index(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    pub(crate) fn module_name(&self, idx: usize) -> &str {
        &self.modules[idx].name
    }

    /// 提供者所属模块下标及声明
    pub(crate) fn locate(&self, token: &ProviderToken) -> Option<(usize, &ProviderDefinition)> {
        self.owners.get(token).map(|location| {
            (
                location.module,
                &self.modules[location.module].providers[location.provider],
            )
        })
    }

    pub(crate) fn is_visible_from(&self, module_idx: usize, token: &ProviderToken) -> bool {
        match self.owners.get(token) {
            Some(location) if location.module == module_idx => true,
            Some(_) => self.modules[module_idx]
                .imports
                .iter()
                .any(|&imported| {
                    self.effective_exports
                        .get(imported)
                        .is_some_and(|exports| exports.contains(token))
                }),
            None => false,
        }
    }

    pub(crate) fn topological_indices(&self) -> &[usize] {
        &self.topological_order
    }

    pub(crate) fn providers_in(&self, module_idx: usize) -> impl Iterator<Item = &ProviderDefinition> {
        self.modules[module_idx].providers.iter()
    }

    /// 是否已通过校验
    pub fn is_validated(&self) -> bool {
        self.validated
    }

    /// 提供者的所属模块
    pub fn owner_of(&self, token: &ProviderToken) -> Option<&str> {
        self.owners
            .get(token)
            .map(|location| self.modules[location.module].name.as_str())
    }

    /// 提供者声明
    pub fn provider(&self, token: &ProviderToken) -> Option<&ProviderDefinition> {
        self.locate(token).map(|(_, provider)| provider)
    }

    /// 模块直接导入的模块
    pub fn imports_of(&self, module: &str) -> Option<Vec<&str>> {
        self.module_index(module).map(|idx| {
            self.modules[idx]
                .imports
                .iter()
                .map(|&imported| self.modules[imported].name.as_str())
                .collect()
        })
    }

    /// 模块的有效导出
    pub fn exports_of(&self, module: &str) -> Option<&HashSet<ProviderToken>> {
        self.module_index(module)
            .and_then(|idx| self.effective_exports.get(idx))
    }

    /// 提供者对模块是否可见
    pub fn is_visible(&self, module: &str, token: &ProviderToken) -> bool {
        self.validated
            && self
                .module_index(module)
                .is_some_and(|idx| self.is_visible_from(idx, token))
    }

    /// 模块拓扑顺序，被导入的模块在前
    pub fn topological_order(&self) -> Vec<&str> {
        self.topological_order
            .iter()
            .map(|&idx| self.modules[idx].name.as_str())
            .collect()
    }

    /// 未被任何模块导入的模块，按注册顺序
    pub fn root_candidates(&self) -> Vec<&str> {
        let imported: HashSet<usize> = self
            .modules
            .iter()
            .flat_map(|module| module.imports.iter().copied())
            .collect();
        self.modules
            .iter()
            .enumerate()
            .filter(|(idx, _)| !imported.contains(idx))
            .map(|(_, module)| module.name.as_str())
            .collect()
    }

    /// 全部模块名称，按注册顺序
    pub fn module_names(&self) -> Vec<&str> {
        self.modules.iter().map(|module| module.name.as_str()).collect()
    }

    pub fn contains_module(&self, name: &str) -> bool {
        self.index.contains_key(name)
    }

    pub fn module_count(&self) -> usize {
        self.modules.len()
    }

    pub fn provider_count(&self) -> usize {
        self.modules.iter().map(|module| module.providers.len()).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn module(name: &str) -> ModuleDefinition {
        ModuleDefinition::new(name)
    }

    fn value(token: &str) -> ProviderDefinition {
        ProviderDefinition::value(token, ())
    }

    fn build(definitions: Vec<ModuleDefinition>) -> ModuleResult<ModuleGraph> {
        let mut graph = ModuleGraph::from_definitions(definitions)?;
        graph.validate()?;
        Ok(graph)
    }

    #[test]
    fn duplicate_module_is_rejected() {
        let mut graph = ModuleGraph::new();
        graph.add_module(module("Cpu")).unwrap();
        assert_eq!(
            graph.add_module(module("Cpu")),
            Err(ModuleError::DuplicateModule { name: "Cpu".into() })
        );
    }

    #[test]
    fn import_of_unknown_module_is_rejected() {
        let mut graph = ModuleGraph::new();
        graph.add_module(module("Cpu")).unwrap();
        assert_eq!(
            graph.add_import("Cpu", "Power"),
            Err(ModuleError::UnknownModule {
                name: "Power".into(),
                referenced_by: "Cpu".into(),
            })
        );
        assert!(matches!(
            graph.add_import("Disk", "Cpu"),
            Err(ModuleError::UnknownModule { name, .. }) if name == "Disk"
        ));
    }

    #[test]
    fn declaration_order_does_not_matter() {
        let graph = build(vec![
            module("Computer").import("Cpu"),
            module("Cpu").import("Power"),
            module("Power"),
        ])
        .unwrap();
        assert_eq!(graph.topological_order(), ["Power", "Cpu", "Computer"]);
        assert_eq!(graph.root_candidates(), ["Computer"]);
        assert_eq!(graph.imports_of("Cpu").unwrap(), ["Power"]);
    }

    #[test]
    fn two_module_cycle_reports_path() {
        let err = build(vec![module("X").import("Y"), module("Y").import("X")]).unwrap_err();
        assert_eq!(
            err,
            ModuleError::ImportCycle {
                cycle: vec!["X".into(), "Y".into(), "X".into()],
            }
        );
    }

    #[test]
    fn longer_cycle_path_starts_at_reentry() {
        let err = build(vec![
            module("Root").import("A"),
            module("A").import("B"),
            module("B").import("C"),
            module("C").import("A"),
        ])
        .unwrap_err();
        assert_eq!(
            err,
            ModuleError::ImportCycle {
                cycle: vec!["A".into(), "B".into(), "C".into(), "A".into()],
            }
        );
    }

    #[test]
    fn self_import_is_a_cycle() {
        let err = build(vec![module("Loop").import("Loop")]).unwrap_err();
        assert!(matches!(err, ModuleError::ImportCycle { cycle } if cycle == ["Loop", "Loop"]));
    }

    #[test]
    fn duplicate_provider_token_across_modules() {
        let err = build(vec![
            module("Cpu").provider(value("Clock")),
            module("Disk").provider(value("Clock")),
        ])
        .unwrap_err();
        assert_eq!(
            err,
            ModuleError::DuplicateProviderToken {
                token: "Clock".into(),
                first_module: "Cpu".into(),
                second_module: "Disk".into(),
            }
        );
    }

    #[test]
    fn duplicate_provider_token_in_same_module() {
        let err = build(vec![module("Cpu")
            .provider(value("Clock"))
            .provider(value("Clock"))])
        .unwrap_err();
        assert!(matches!(err, ModuleError::DuplicateProviderToken { .. }));
    }

    #[test]
    fn dangling_export_is_rejected() {
        let err = build(vec![module("Cpu").export("CpuService")]).unwrap_err();
        assert_eq!(
            err,
            ModuleError::DanglingExport {
                module: "Cpu".into(),
                token: "CpuService".into(),
            }
        );
    }

    #[test]
    fn reexport_requires_import_that_exports() {
        let graph = build(vec![
            module("Power").provide_exported(value("PowerService")),
            module("Hub").import("Power").export("PowerService"),
            module("Cpu").import("Hub"),
        ])
        .unwrap();
        let token = ProviderToken::named("PowerService");
        assert!(graph.is_visible("Hub", &token));
        assert!(graph.is_visible("Cpu", &token));
        assert!(graph.exports_of("Hub").unwrap().contains(&token));

        // 被导入模块未导出时不能再导出
        let err = build(vec![
            module("Power").provider(value("PowerService")),
            module("Hub").import("Power").export("PowerService"),
        ])
        .unwrap_err();
        assert!(matches!(err, ModuleError::DanglingExport { .. }));
    }

    #[test]
    fn visibility_stops_after_one_hop() {
        let graph = build(vec![
            module("Power").provide_exported(value("PowerService")),
            module("Hub").import("Power"),
            module("Cpu").import("Hub"),
        ])
        .unwrap();
        let token = ProviderToken::named("PowerService");
        assert!(graph.is_visible("Power", &token));
        assert!(graph.is_visible("Hub", &token));
        assert!(!graph.is_visible("Cpu", &token));
        assert_eq!(graph.owner_of(&token), Some("Power"));
    }

    #[test]
    fn strict_check_finds_invisible_dependency() {
        let graph = build(vec![
            module("Power").provider(value("PowerService")),
            module("Cpu")
                .import("Power")
                .provider(value("CpuService").depends_on("PowerService")),
        ])
        .unwrap();
        assert_eq!(
            graph.validate_dependencies(),
            Err(ModuleError::UnresolvableDependency {
                module: "Cpu".into(),
                token: "CpuService".into(),
                dependency: "PowerService".into(),
            })
        );
    }

    #[test]
    fn unvalidated_graph_answers_no_visibility() {
        let graph = ModuleGraph::from_definitions(vec![module("Power").provider(value("P"))])
            .unwrap();
        assert!(!graph.is_validated());
        assert!(!graph.is_visible("Power", &"P".into()));
        assert_eq!(graph.provider_count(), 1);
        assert_eq!(graph.module_count(), 1);
    }
}
