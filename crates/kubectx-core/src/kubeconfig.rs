use std::ffi::OsStr;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, bail, Context, Result};
use serde_yaml::{Mapping, Value};

use crate::error::KubectxError;

pub const DEFAULT_NAMESPACE: &str = "default";

/// The configuration file holding contexts and the active-context pointer.
pub trait ConfigStore {
    /// Active context name, empty when none is set.
    fn current_context(&self) -> &str;
    fn context_names(&self) -> Vec<String>;
    fn context_exists(&self, name: &str) -> bool;
    fn set_current_context(&mut self, name: &str) -> Result<()>;
    fn unset_current_context(&mut self) -> Result<()>;
    /// Namespace configured for `context`, `"default"` when it has none.
    fn namespace_of_context(&self, context: &str) -> Result<String>;
    fn set_namespace(&mut self, context: &str, namespace: &str) -> Result<()>;
    fn delete_context(&mut self, name: &str) -> Result<()>;
    fn rename_context(&mut self, old: &str, new: &str) -> Result<()>;
    fn save(&mut self) -> Result<()>;
    fn to_bytes(&self) -> Result<Vec<u8>>;
}

/// Resolves the kubeconfig location from `KUBECONFIG`, falling back to `~/.kube/config`.
pub fn kubeconfig_path() -> Result<PathBuf> {
    resolve_kubeconfig_path(std::env::var_os("KUBECONFIG").as_deref(), dirs::home_dir())
}

fn resolve_kubeconfig_path(env: Option<&OsStr>, home: Option<PathBuf>) -> Result<PathBuf> {
    if let Some(paths) = env {
        let mut paths: Vec<PathBuf> = std::env::split_paths(paths).filter(|p| !p.as_os_str().is_empty()).collect();
        match paths.len() {
            0 => {}
            1 => return Ok(paths.remove(0)),
            _ => bail!("multiple files in KUBECONFIG are currently not supported"),
        }
    }
    let home = home.context("could not determine home directory")?;
    Ok(home.join(".kube").join("config"))
}

/// A kubeconfig document kept as raw YAML so fields this tool does not know
/// about survive a load/save cycle untouched.
#[derive(Debug, Clone)]
pub struct Kubeconfig {
    doc: Value,
    path: Option<PathBuf>,
}

impl Kubeconfig {
    pub fn load(path: &Path) -> Result<Self> {
        let raw = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read kubeconfig file {}", path.display()))?;
        let mut kubeconfig = Self::from_yaml(&raw).with_context(|| format!("invalid kubeconfig {}", path.display()))?;
        kubeconfig.path = Some(path.to_path_buf());
        Ok(kubeconfig)
    }

    /// Parses an in-memory document; [`ConfigStore::save`] is a no-op for these.
    pub fn from_yaml(raw: &str) -> Result<Self> {
        let mut doc: Value = serde_yaml::from_str(raw)?;
        if doc.is_null() {
            doc = Value::Mapping(Mapping::new());
        }
        let Some(root) = doc.as_mapping() else {
            bail!("kubeconfig is not a map document");
        };
        if let Some(contexts) = root.get("contexts") {
            if !contexts.is_null() && !contexts.is_sequence() {
                bail!("\"contexts\" is not a list");
            }
        }
        Ok(Self { doc, path: None })
    }

    fn root_mut(&mut self) -> Result<&mut Mapping> {
        self.doc.as_mapping_mut().ok_or_else(|| anyhow!("kubeconfig is not a map document"))
    }

    fn contexts(&self) -> &[Value] {
        self.doc.get("contexts").and_then(Value::as_sequence).map(Vec::as_slice).unwrap_or(&[])
    }

    fn contexts_mut(&mut self) -> Result<&mut Vec<Value>> {
        let root = self.root_mut()?;
        if !root.get("contexts").is_some_and(Value::is_sequence) {
            root.insert("contexts".into(), Value::Sequence(Vec::new()));
        }
        root.get_mut("contexts").and_then(Value::as_sequence_mut).ok_or_else(|| anyhow!("\"contexts\" is not a list"))
    }

    fn find_context(&self, name: &str) -> Option<&Value> {
        self.contexts().iter().find(|entry| entry_name(entry) == Some(name))
    }

    fn find_context_mut(&mut self, name: &str) -> Result<&mut Value> {
        self.contexts_mut()?
            .iter_mut()
            .find(|entry| entry_name(entry) == Some(name))
            .ok_or_else(|| KubectxError::ContextNotFound(name.to_string()).into())
    }
}

fn entry_name(entry: &Value) -> Option<&str> {
    entry.get("name").and_then(Value::as_str)
}

impl ConfigStore for Kubeconfig {
    fn current_context(&self) -> &str {
        self.doc.get("current-context").and_then(Value::as_str).unwrap_or("")
    }

    fn context_names(&self) -> Vec<String> {
        self.contexts().iter().filter_map(entry_name).map(String::from).collect()
    }

    fn context_exists(&self, name: &str) -> bool {
        self.find_context(name).is_some()
    }

    fn set_current_context(&mut self, name: &str) -> Result<()> {
        self.root_mut()?.insert("current-context".into(), name.into());
        Ok(())
    }

    fn unset_current_context(&mut self) -> Result<()> {
        self.set_current_context("")
    }

    fn namespace_of_context(&self, context: &str) -> Result<String> {
        let entry = self.find_context(context).ok_or_else(|| KubectxError::ContextNotFound(context.to_string()))?;
        let namespace = entry.get("context").and_then(|c| c.get("namespace")).and_then(Value::as_str).unwrap_or("");
        if namespace.is_empty() {
            return Ok(DEFAULT_NAMESPACE.to_string());
        }
        Ok(namespace.to_string())
    }

    fn set_namespace(&mut self, context: &str, namespace: &str) -> Result<()> {
        let entry = self.find_context_mut(context)?;
        let entry = entry.as_mapping_mut().ok_or_else(|| anyhow!("context entry \"{context}\" is not a map"))?;
        if !entry.get("context").is_some_and(Value::is_mapping) {
            entry.insert("context".into(), Value::Mapping(Mapping::new()));
        }
        let body = entry
            .get_mut("context")
            .and_then(Value::as_mapping_mut)
            .ok_or_else(|| anyhow!("context entry \"{context}\" has no body"))?;
        body.insert("namespace".into(), namespace.into());
        Ok(())
    }

    fn delete_context(&mut self, name: &str) -> Result<()> {
        let contexts = self.contexts_mut()?;
        let idx = contexts
            .iter()
            .position(|entry| entry_name(entry) == Some(name))
            .ok_or_else(|| KubectxError::ContextNotFound(name.to_string()))?;
        contexts.remove(idx);
        Ok(())
    }

    fn rename_context(&mut self, old: &str, new: &str) -> Result<()> {
        let entry = self.find_context_mut(old)?;
        let entry = entry.as_mapping_mut().ok_or_else(|| anyhow!("context entry \"{old}\" is not a map"))?;
        entry.insert("name".into(), new.into());
        Ok(())
    }

    fn save(&mut self) -> Result<()> {
        let Some(path) = &self.path else {
            tracing::debug!("in-memory kubeconfig, nothing to save");
            return Ok(());
        };
        let contents = serde_yaml::to_string(&self.doc)?;
        std::fs::write(path, contents).with_context(|| format!("failed to write {}", path.display()))?;
        tracing::debug!(path = %path.display(), "kubeconfig saved");
        Ok(())
    }

    fn to_bytes(&self) -> Result<Vec<u8>> {
        Ok(serde_yaml::to_string(&self.doc)?.into_bytes())
    }
}
