use std::fmt;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KubectxError {
    Unsupported(String),
    ContextNotFound(String),
    NamespaceNotFound(String),
    NoHistory,
    NoCurrentContext,
    QueryFailed(String),
    Persistence(String),
    PartialDelete { failed: Vec<String> },
    PickerCancelled,
}

impl fmt::Display for KubectxError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unsupported(reason) => write!(f, "{reason}"),
            Self::ContextNotFound(name) => write!(f, "no context exists with the name: \"{name}\""),
            Self::NamespaceNotFound(ns) => write!(f, "no namespace exists with name \"{ns}\""),
            Self::NoHistory => write!(f, "no previous context found"),
            Self::NoCurrentContext => write!(f, "current-context is not set"),
            Self::QueryFailed(ns) => {
                write!(f, "failed to query if namespace \"{ns}\" exists (is cluster accessible?)")
            }
            Self::Persistence(msg) => write!(f, "{msg}"),
            Self::PartialDelete { failed } => {
                let names = failed.iter().map(|n| format!("\"{n}\"")).collect::<Vec<_>>().join(", ");
                write!(f, "failed to delete context(s): {names}")
            }
            Self::PickerCancelled => write!(f, "you did not choose any of the options"),
        }
    }
}

impl std::error::Error for KubectxError {}

/// Returns the [`KubectxError`] kind carried anywhere in an `anyhow` chain.
pub fn error_kind(err: &anyhow::Error) -> Option<&KubectxError> {
    err.downcast_ref::<KubectxError>().or_else(|| err.chain().find_map(|cause| cause.downcast_ref::<KubectxError>()))
}
