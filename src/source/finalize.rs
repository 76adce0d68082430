//! Finalization of package descriptions
//!
//! Fixes flag values, the compiler and the platform, then flattens every
//! enabled component into a single ordered dependency list.

use super::condition::Condition;
use super::description::{ComponentKind, ComponentName, CondTree, FlagDecl, GenericDescription};
use crate::domain::{CompilerId, Dependency, Platform, Version};
use crate::error::FinalizeError;
use std::collections::BTreeMap;
use std::fmt;
use tracing::{debug, trace};

type ComponentPredicate = Box<dyn Fn(&ComponentName) -> bool>;
type FlagAssignment = Box<dyn Fn(&FlagDecl) -> bool>;

/// Decides which components are built and how flags are assigned
pub struct FinalizePolicy {
    enable_component: ComponentPredicate,
    assign_flag: FlagAssignment,
}

impl FinalizePolicy {
    /// Creates a policy from two closures
    pub fn new(
        enable_component: impl Fn(&ComponentName) -> bool + 'static,
        assign_flag: impl Fn(&FlagDecl) -> bool + 'static,
    ) -> Self {
        Self {
            enable_component: Box::new(enable_component),
            assign_flag: Box::new(assign_flag),
        }
    }

    /// Every component enabled, every flag on
    pub fn maximal() -> Self {
        Self::new(|_| true, |_| true)
    }

    /// Declared flag defaults; test suites and benchmarks disabled
    pub fn defaults() -> Self {
        Self::new(
            |component| {
                !matches!(
                    component.kind,
                    ComponentKind::TestSuite | ComponentKind::Benchmark
                )
            },
            |flag| flag.default,
        )
    }

    pub fn enable_component(&self, component: &ComponentName) -> bool {
        (self.enable_component)(component)
    }

    pub fn assign_flag(&self, flag: &FlagDecl) -> bool {
        (self.assign_flag)(flag)
    }
}

impl Default for FinalizePolicy {
    fn default() -> Self {
        Self::maximal()
    }
}

impl fmt::Debug for FinalizePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FinalizePolicy").finish_non_exhaustive()
    }
}

/// A package description with every conditional decided
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedDescription {
    pub name: String,
    pub version: Option<Version>,
    /// Assigned flag values
    pub flags: BTreeMap<String, bool>,
    /// Enabled components, in declaration order
    pub components: Vec<ComponentName>,
    /// Dependencies of all enabled components, in declaration order
    pub dependencies: Vec<Dependency>,
}

/// Finalizes `description` for one compiler and platform
pub fn finalize(
    description: &GenericDescription,
    compiler: &CompilerId,
    platform: &Platform,
    policy: &FinalizePolicy,
) -> Result<ResolvedDescription, FinalizeError> {
    let flags: BTreeMap<String, bool> = description
        .flags
        .iter()
        .map(|flag| (flag.name.clone(), policy.assign_flag(flag)))
        .collect();
    debug!("Flag assignment for {}: {:?}", description.name, flags);

    let enabled: Vec<_> = description
        .components
        .iter()
        .filter(|component| policy.enable_component(&component.name))
        .collect();
    if enabled.is_empty() {
        return Err(FinalizeError::NoEnabledComponents {
            package: description.name.clone(),
        });
    }

    // The package itself and its internal libraries are not external dependencies
    let local_names: Vec<&str> = std::iter::once(description.name.as_str())
        .chain(description.components.iter().filter_map(|c| match c.name.kind {
            ComponentKind::Library => c.name.name.as_deref(),
            _ => None,
        }))
        .collect();

    let mut dependencies = Vec::new();
    for component in &enabled {
        let resolver = TreeResolver {
            description,
            compiler,
            platform,
            flags: &flags,
            component: component.name.to_string(),
        };
        let mut collected = Vec::new();
        resolver.resolve(&component.tree, &mut Vec::new(), &mut collected)?;
        trace!(
            "{} contributes {} dependency(ies)",
            resolver.component,
            collected.len()
        );
        dependencies.extend(
            collected
                .into_iter()
                .filter(|dep| !local_names.contains(&dep.name.as_str())),
        );
    }

    Ok(ResolvedDescription {
        name: description.name.clone(),
        version: description.version.clone(),
        flags,
        components: enabled.iter().map(|c| c.name.clone()).collect(),
        dependencies,
    })
}

struct TreeResolver<'a> {
    description: &'a GenericDescription,
    compiler: &'a CompilerId,
    platform: &'a Platform,
    flags: &'a BTreeMap<String, bool>,
    component: String,
}

impl TreeResolver<'_> {
    /// Appends imports, own dependencies and taken branches to `out`
    fn resolve(
        &self,
        tree: &CondTree,
        importing: &mut Vec<String>,
        out: &mut Vec<Dependency>,
    ) -> Result<(), FinalizeError> {
        for import in &tree.imports {
            if importing.contains(import) {
                return Err(FinalizeError::CyclicImport {
                    name: import.clone(),
                });
            }
            let stanza = self.description.common_stanza(import).ok_or_else(|| {
                FinalizeError::UnknownImport {
                    component: self.component.clone(),
                    name: import.clone(),
                }
            })?;
            importing.push(import.clone());
            self.resolve(&stanza.tree, importing, out)?;
            importing.pop();
        }

        out.extend(tree.build_depends.iter().cloned());

        for branch in &tree.branches {
            if self.evaluate(&branch.condition)? {
                self.resolve(&branch.then_tree, importing, out)?;
            } else if let Some(else_tree) = &branch.else_tree {
                self.resolve(else_tree, importing, out)?;
            }
        }

        Ok(())
    }

    fn evaluate(&self, condition: &Condition) -> Result<bool, FinalizeError> {
        match condition {
            Condition::Literal(value) => Ok(*value),
            Condition::Flag(name) => {
                self.flags
                    .get(name)
                    .copied()
                    .ok_or_else(|| FinalizeError::UndeclaredFlag {
                        component: self.component.clone(),
                        flag: name.clone(),
                    })
            }
            Condition::Os(name) => Ok(self.platform.is_os(name)),
            Condition::Arch(name) => Ok(self.platform.is_arch(name)),
            Condition::Impl { compiler, range } => {
                Ok(*compiler == self.compiler.flavor && range.contains(&self.compiler.version))
            }
            Condition::Not(inner) => Ok(!self.evaluate(inner)?),
            // Both sides are evaluated so undeclared flags are always reported
            Condition::And(a, b) => {
                let lhs = self.evaluate(a)?;
                let rhs = self.evaluate(b)?;
                Ok(lhs && rhs)
            }
            Condition::Or(a, b) => {
                let lhs = self.evaluate(a)?;
                let rhs = self.evaluate(b)?;
                Ok(lhs || rhs)
            }
        }
    }
}
