//! Depth-first resolution with per-module memoization and cycle detection.

use std::{collections::HashMap, sync::Arc};

use super::{ComponentRef, Dependency, FormConfig, FormEntry, FormLevel, NodeName, ResolveError};
use crate::{
    settings::FormSettings,
    view::{View, ViewRef, compose},
};

/// Bookkeeping for one named module during a resolution pass.
#[derive(Debug, Default)]
struct DependencyInfo {
    /// Set while the module's own materialization is on the call stack.
    visiting: bool,
    resolved: Option<ViewRef>,
}

/// One resolution pass over a [`FormConfig`].
///
/// State lives only as long as the pass; two calls to [`create_form`] never
/// share memoized views.
struct Resolver<'c> {
    config: &'c FormConfig,
    modules: HashMap<&'c NodeName, &'c FormLevel>,
    info: HashMap<NodeName, DependencyInfo>,
    stack: Vec<NodeName>,
    slots_prop_name: String,
    strict: bool,
}

impl<'c> Resolver<'c> {
    fn new(config: &'c FormConfig, settings: &FormSettings) -> Result<Self, ResolveError> {
        let mut modules = HashMap::with_capacity(config.modules.len());
        for level in &config.modules {
            let Some(name) = &level.name else {
                tracing::warn!("ignoring module registered without a name");
                continue;
            };
            if modules.insert(name, level).is_some() {
                return Err(ResolveError::DuplicateModule { name: name.clone() });
            }
        }

        Ok(Self {
            config,
            modules,
            info: HashMap::new(),
            stack: Vec::new(),
            slots_prop_name: config
                .slots_prop_name
                .clone()
                .unwrap_or_else(|| settings.slots_prop_name.clone()),
            strict: settings.strict_references,
        })
    }

    fn resolve_entry(&mut self) -> Result<ViewRef, ResolveError> {
        match &self.config.entry {
            FormEntry::Module(name) => self.module(name),
            FormEntry::Inline(level) => self.create(level, false),
        }
    }

    fn module(&mut self, name: &NodeName) -> Result<ViewRef, ResolveError> {
        match self.modules.get(name).copied() {
            Some(level) => self.create(level, true),
            None if self.strict => Err(ResolveError::UnresolvedReference { name: name.clone() }),
            None => {
                tracing::warn!(%name, "unresolved module reference, rendering placeholder");
                Ok(View::placeholder())
            }
        }
    }

    /// Materializes `level`; `tracked` levels take part in memoization and
    /// cycle detection under their name.
    fn create(&mut self, level: &'c FormLevel, tracked: bool) -> Result<ViewRef, ResolveError> {
        let name = level.name.as_ref().filter(|_| tracked);

        if let Some(name) = name {
            let info = self.info.entry(name.clone()).or_default();
            if let Some(view) = &info.resolved {
                return Ok(Arc::clone(view));
            }
            if info.visiting {
                let start = self.stack.iter().position(|n| n == name).unwrap_or(0);
                let mut chain = self.stack[start..].to_vec();
                chain.push(name.clone());
                return Err(ResolveError::CycleDetected {
                    name: name.clone(),
                    chain,
                });
            }
            info.visiting = true;
            self.stack.push(name.clone());
        }

        let view = self.materialize(level)?;

        if let Some(name) = name {
            self.stack.pop();
            let info = self.info.entry(name.clone()).or_default();
            info.visiting = false;
            info.resolved = Some(Arc::clone(&view));
            tracing::debug!(%name, "resolved module");
        }
        Ok(view)
    }

    fn materialize(&mut self, level: &'c FormLevel) -> Result<ViewRef, ResolveError> {
        let component = match &level.component {
            ComponentRef::View(view) => Arc::clone(view),
            ComponentRef::Module(name) => self.module(name)?,
        };

        let base = match &level.dependencies {
            None => component,
            Some(dependencies) => {
                let slots = dependencies
                    .iter()
                    .map(|dependency| self.dependency(dependency))
                    .collect::<Result<Vec<_>, _>>()?;
                Arc::new(View::Slotted {
                    inner: component,
                    prop: level
                        .slots_prop_name
                        .clone()
                        .unwrap_or_else(|| self.slots_prop_name.clone()),
                    slots,
                })
            }
        };

        Ok(compose(&level.decorators, base))
    }

    fn dependency(&mut self, dependency: &'c Dependency) -> Result<ViewRef, ResolveError> {
        match dependency {
            Dependency::View(view) => Ok(Arc::clone(view)),
            Dependency::Module(name) => self.module(name),
            Dependency::Inline(level) => self.create(level, false),
        }
    }
}

/// Resolves `config` with default [`FormSettings`].
pub fn create_form(config: &FormConfig) -> Result<ViewRef, ResolveError> {
    create_form_with(config, &FormSettings::default())
}

/// Resolves `config` into a single view tree.
///
/// Each named module is materialized at most once and the same [`ViewRef`]
/// is returned at every reference site. A module that (transitively) depends
/// on itself aborts the whole pass with [`ResolveError::CycleDetected`].
pub fn create_form_with(
    config: &FormConfig,
    settings: &FormSettings,
) -> Result<ViewRef, ResolveError> {
    Resolver::new(config, settings)?.resolve_entry()
}
