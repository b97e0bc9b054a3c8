pub mod error;
pub mod kubeconfig;
pub mod namespace;
pub mod operation;
pub mod picker;
pub mod state;
pub mod switch;

pub use error::{error_kind, KubectxError};
pub use kubeconfig::{kubeconfig_path, ConfigStore, Kubeconfig, DEFAULT_NAMESPACE};
pub use namespace::{KubeNamespaceChecker, NamespaceChecker};
pub use operation::{parse_args, ContextRef, Operation, CURRENT_CONTEXT_MARKER, SWAP_TOKEN};
pub use picker::Picker;
pub use state::{FileNaming, FileStateStore, MemoryStateStore, StateStore};
pub use switch::{ContextSwitcher, NamespaceSwitcher};
