use anyhow::{Context, Result};
use tracing::debug;

use crate::error::KubectxError;
use crate::kubeconfig::ConfigStore;
use crate::namespace::NamespaceChecker;
use crate::state::StateStore;

/// Moves the active-context pointer and remembers where it came from.
pub struct ContextSwitcher<'a> {
    config: &'a mut dyn ConfigStore,
    state: &'a dyn StateStore,
}

impl<'a> ContextSwitcher<'a> {
    pub fn new(config: &'a mut dyn ConfigStore, state: &'a dyn StateStore) -> Self {
        Self { config, state }
    }

    /// Makes `name` the active context.
    ///
    /// The previous-context record is only rewritten when the pointer actually
    /// moves, so switching to the already-active context keeps the history.
    pub fn switch_to(&mut self, name: &str) -> Result<String> {
        let previous = self.config.current_context().to_string();
        if !self.config.context_exists(name) {
            return Err(KubectxError::ContextNotFound(name.to_string()).into());
        }

        self.config.set_current_context(name)?;
        self.config.save().context(KubectxError::Persistence("failed to save kubeconfig".into()))?;

        if previous != name {
            self.state
                .set_previous_context(&previous)
                .context(KubectxError::Persistence("failed to save previous context name".into()))?;
        }
        debug!(from = %previous, to = name, "context switched");
        Ok(name.to_string())
    }

    /// Switches to the context recorded by the last real switch.
    pub fn swap_back(&mut self) -> Result<String> {
        let previous = self
            .state
            .previous_context()
            .context(KubectxError::Persistence("failed to read previous context file".into()))?;
        if previous.is_empty() {
            return Err(KubectxError::NoHistory.into());
        }
        self.switch_to(&previous)
    }
}

/// Changes the namespace of one context and remembers the one it replaced.
pub struct NamespaceSwitcher<'a> {
    config: &'a mut dyn ConfigStore,
    state: &'a dyn StateStore,
    checker: &'a dyn NamespaceChecker,
}

impl<'a> NamespaceSwitcher<'a> {
    pub fn new(config: &'a mut dyn ConfigStore, state: &'a dyn StateStore, checker: &'a dyn NamespaceChecker) -> Self {
        Self { config, state, checker }
    }

    pub fn switch_namespace(&mut self, context: &str, namespace: &str, skip_check: bool) -> Result<String> {
        let current = self.config.namespace_of_context(context).context("failed to get current namespace")?;

        if !skip_check {
            let raw = self.config.to_bytes().context("failed to serialize kubeconfig")?;
            let exists = self
                .checker
                .namespace_exists(&raw, namespace)
                .with_context(|| KubectxError::QueryFailed(namespace.to_string()))?;
            if !exists {
                return Err(KubectxError::NamespaceNotFound(namespace.to_string()).into());
            }
        }

        self.config
            .set_namespace(context, namespace)
            .with_context(|| format!("failed to change to namespace \"{namespace}\""))?;
        self.config.save().context(KubectxError::Persistence("failed to save kubeconfig file".into()))?;

        if current != namespace {
            self.state
                .set_previous_namespace(context, &current)
                .context(KubectxError::Persistence("failed to save the previous namespace to file".into()))?;
        }
        debug!(context, from = %current, to = namespace, "namespace switched");
        Ok(namespace.to_string())
    }
}
