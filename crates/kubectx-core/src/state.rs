use std::cell::RefCell;
use std::collections::HashMap;
use std::ffi::OsString;
use std::io;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

const PREVIOUS_CONTEXT_FILE: &str = "kubectx";
const NAMESPACE_DIR: &str = "kubens";
const EMPTY_NAME: &str = "%";

/// Remembers what was active before the last real switch.
///
/// An empty string means "no history". Implementations are last-writer-wins.
pub trait StateStore {
    fn previous_context(&self) -> Result<String>;
    fn set_previous_context(&self, name: &str) -> Result<()>;
    fn previous_namespace(&self, context: &str) -> Result<String>;
    fn set_previous_namespace(&self, context: &str, namespace: &str) -> Result<()>;
}

/// File naming rules of the platform the state files live on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FileNaming {
    Unix,
    Windows,
}

impl FileNaming {
    pub fn host() -> Self {
        if cfg!(windows) {
            Self::Windows
        } else {
            Self::Unix
        }
    }

    fn is_illegal(self, c: char) -> bool {
        if c == '%' || c.is_control() {
            return true;
        }
        match self {
            Self::Unix => c == '/',
            Self::Windows => matches!(c, '<' | '>' | ':' | '"' | '/' | '\\' | '|' | '?' | '*'),
        }
    }

    /// Percent-encodes every byte of characters the platform does not allow in a file name.
    ///
    /// Names that would resolve to a directory are encoded too: dot-only names
    /// become `%2E` runs and the empty name becomes a lone `%`.
    pub fn escape(self, name: &str) -> String {
        if name.is_empty() {
            return EMPTY_NAME.to_string();
        }
        if name.chars().all(|c| c == '.') {
            return "%2E".repeat(name.len());
        }
        let mut out = String::with_capacity(name.len());
        for c in name.chars() {
            if self.is_illegal(c) {
                let mut buf = [0u8; 4];
                for b in c.encode_utf8(&mut buf).bytes() {
                    out.push_str(&format!("%{b:02X}"));
                }
            } else {
                out.push(c);
            }
        }
        out
    }

    pub fn unescape(escaped: &str) -> Option<String> {
        if escaped == EMPTY_NAME {
            return Some(String::new());
        }
        let bytes = escaped.as_bytes();
        let mut out = Vec::with_capacity(bytes.len());
        let mut i = 0;
        while i < bytes.len() {
            if bytes[i] == b'%' {
                let hex = escaped.get(i + 1..i + 3)?;
                out.push(u8::from_str_radix(hex, 16).ok()?);
                i += 3;
            } else {
                out.push(bytes[i]);
                i += 1;
            }
        }
        String::from_utf8(out).ok()
    }
}

/// On-disk state: one global previous-context file and one file per context
/// holding that context's previous namespace.
#[derive(Debug, Clone)]
pub struct FileStateStore {
    context_file: PathBuf,
    namespace_dir: PathBuf,
    naming: FileNaming,
}

impl FileStateStore {
    pub fn new(context_file: PathBuf, namespace_dir: PathBuf, naming: FileNaming) -> Self {
        Self { context_file, namespace_dir, naming }
    }

    /// Uses `state_dir` when given, otherwise the well-known locations under `~/.kube`
    /// (the previous-context file honours `XDG_CACHE_HOME`).
    pub fn from_state_dir(state_dir: Option<&Path>) -> Result<Self> {
        Self::locate(state_dir, std::env::var_os("XDG_CACHE_HOME"), dirs::home_dir())
    }

    fn locate(state_dir: Option<&Path>, xdg_cache: Option<OsString>, home: Option<PathBuf>) -> Result<Self> {
        if let Some(dir) = state_dir {
            return Ok(Self::new(dir.join(PREVIOUS_CONTEXT_FILE), dir.join(NAMESPACE_DIR), FileNaming::host()));
        }

        let kube_dir = home.context("could not determine home directory")?.join(".kube");
        let context_file = match xdg_cache.filter(|v| !v.is_empty()) {
            Some(cache) => PathBuf::from(cache).join(PREVIOUS_CONTEXT_FILE),
            None => kube_dir.join(PREVIOUS_CONTEXT_FILE),
        };
        Ok(Self::new(context_file, kube_dir.join(NAMESPACE_DIR), FileNaming::host()))
    }

    pub fn context_file(&self) -> &Path {
        &self.context_file
    }

    pub fn namespace_file(&self, context: &str) -> PathBuf {
        self.namespace_dir.join(self.naming.escape(context))
    }
}

impl StateStore for FileStateStore {
    fn previous_context(&self) -> Result<String> {
        read_value(&self.context_file)
    }

    fn set_previous_context(&self, name: &str) -> Result<()> {
        write_value(&self.context_file, name)
    }

    fn previous_namespace(&self, context: &str) -> Result<String> {
        read_value(&self.namespace_file(context))
    }

    fn set_previous_namespace(&self, context: &str, namespace: &str) -> Result<()> {
        write_value(&self.namespace_file(context), namespace)
    }
}

fn read_value(path: &Path) -> Result<String> {
    match std::fs::read_to_string(path) {
        Ok(contents) => Ok(contents.trim().to_string()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(String::new()),
        Err(e) => Err(e).with_context(|| format!("failed to read {}", path.display())),
    }
}

fn write_value(path: &Path, value: &str) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).with_context(|| format!("failed to create {}", parent.display()))?;
    }
    std::fs::write(path, value.trim()).with_context(|| format!("failed to write {}", path.display()))?;
    tracing::debug!(path = %path.display(), value, "state saved");
    Ok(())
}

#[derive(Debug, Default)]
pub struct MemoryStateStore {
    previous_context: RefCell<String>,
    namespaces: RefCell<HashMap<String, String>>,
}

impl MemoryStateStore {
    pub fn new() -> Self {
        Self::default()
    }
}

impl StateStore for MemoryStateStore {
    fn previous_context(&self) -> Result<String> {
        Ok(self.previous_context.borrow().clone())
    }

    fn set_previous_context(&self, name: &str) -> Result<()> {
        *self.previous_context.borrow_mut() = name.to_string();
        Ok(())
    }

    fn previous_namespace(&self, context: &str) -> Result<String> {
        Ok(self.namespaces.borrow().get(context).cloned().unwrap_or_default())
    }

    fn set_previous_namespace(&self, context: &str, namespace: &str) -> Result<()> {
        self.namespaces.borrow_mut().insert(context.to_string(), namespace.to_string());
        Ok(())
    }
}
