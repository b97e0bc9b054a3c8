use std::path::Path;

use kubectx_core::{error_kind, parse_args, MemoryStateStore};
use tempfile::TempDir;

use super::*;

const CONFIG: &str = r#"
apiVersion: v1
kind: Config
current-context: dev
contexts:
- name: dev
  context:
    cluster: local
    user: me
- name: prod
  context:
    cluster: local
    user: me
    namespace: payments
- name: staging
  context:
    cluster: local
    user: me
"#;

struct KnownNamespaces(&'static [&'static str]);

impl NamespaceChecker for KnownNamespaces {
    fn namespace_exists(&self, _kubeconfig: &[u8], namespace: &str) -> Result<bool> {
        Ok(self.0.iter().any(|ns| *ns == namespace))
    }
}

struct ScriptedPicker {
    pick: Option<String>,
    delete: Option<Vec<String>>,
}

impl Picker for ScriptedPicker {
    fn pick_context(&mut self, _contexts: &[String], _current: &str) -> Result<Option<String>> {
        Ok(self.pick.take())
    }

    fn pick_contexts_to_delete(&mut self, _contexts: &[String], _current: &str) -> Result<Option<Vec<String>>> {
        Ok(self.delete.take())
    }
}

struct Harness {
    _dir: TempDir,
    path: PathBuf,
    executor: Executor,
}

impl Harness {
    fn new() -> Self {
        Self::with_picker(ScriptedPicker { pick: None, delete: None })
    }

    fn with_picker(picker: ScriptedPicker) -> Self {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config");
        std::fs::write(&path, CONFIG).unwrap();
        let executor = Executor::new(
            Box::new(MemoryStateStore::new()),
            Box::new(KnownNamespaces(&["default", "payments", "ops"])),
            Box::new(picker),
            Printer::new(false),
        )
        .with_kubeconfig(path.clone());
        Self { _dir: dir, path, executor }
    }

    fn run(&mut self, args: &[&str]) -> (Result<()>, String, String) {
        let op = parse_args(args, || false);
        self.run_op(op)
    }

    fn run_op(&mut self, op: Operation) -> (Result<()>, String, String) {
        let mut stdout = Vec::new();
        let mut stderr = Vec::new();
        let result = self.executor.run(op, &mut stdout, &mut stderr);
        (result, String::from_utf8(stdout).unwrap(), String::from_utf8(stderr).unwrap())
    }

    fn kubeconfig(&self) -> Kubeconfig {
        reload(&self.path)
    }
}

fn reload(path: &Path) -> Kubeconfig {
    Kubeconfig::load(path).unwrap()
}

fn kind(result: &Result<()>) -> Option<KubectxError> {
    result.as_ref().err().and_then(error_kind).cloned()
}

#[test]
fn list_prints_sorted_names() {
    let mut h = Harness::new();
    let (result, stdout, _) = h.run(&[]);
    result.unwrap();
    assert_eq!(stdout, "dev\nprod\nstaging\n");
}

#[test]
fn switch_updates_kubeconfig_and_reports() {
    let mut h = Harness::new();
    let (result, _, stderr) = h.run(&["prod"]);
    result.unwrap();
    assert_eq!(stderr, "✔ Switched to context \"prod\".\n");
    assert_eq!(h.kubeconfig().current_context(), "prod");
}

#[test]
fn switch_then_dash_toggles() {
    let mut h = Harness::new();
    h.run(&["prod"]).0.unwrap();
    h.run(&["-"]).0.unwrap();
    assert_eq!(h.kubeconfig().current_context(), "dev");
    h.run(&["-"]).0.unwrap();
    assert_eq!(h.kubeconfig().current_context(), "prod");
}

#[test]
fn swap_without_history_fails() {
    let mut h = Harness::new();
    h.run(&["dev"]).0.unwrap();
    let (result, _, _) = h.run(&["-"]);
    assert_eq!(kind(&result), Some(KubectxError::NoHistory));
    assert!(format!("{:#}", result.unwrap_err()).contains("no previous context found"));
}

#[test]
fn switch_to_missing_context_fails() {
    let mut h = Harness::new();
    let (result, _, _) = h.run(&["nope"]);
    assert_eq!(kind(&result), Some(KubectxError::ContextNotFound("nope".into())));
    assert_eq!(h.kubeconfig().current_context(), "dev");
}

#[test]
fn switch_with_namespace_in_either_order() {
    let mut h = Harness::new();
    let (result, _, stderr) = h.run(&["-n", "ops", "staging"]);
    result.unwrap();
    assert_eq!(stderr, "✔ Switched to context \"staging\" and namespace \"ops\".\n");
    let kc = h.kubeconfig();
    assert_eq!(kc.current_context(), "staging");
    assert_eq!(kc.namespace_of_context("staging").unwrap(), "ops");

    h.run(&["prod", "--namespace", "default"]).0.unwrap();
    assert_eq!(h.kubeconfig().namespace_of_context("prod").unwrap(), "default");
}

#[test]
fn switch_with_missing_namespace_keeps_namespace() {
    let mut h = Harness::new();
    let (result, _, _) = h.run(&["prod", "-n", "ghost"]);
    assert_eq!(kind(&result), Some(KubectxError::NamespaceNotFound("ghost".into())));
    let kc = h.kubeconfig();
    assert_eq!(kc.namespace_of_context("prod").unwrap(), "payments");
    // the context switch itself already happened
    assert_eq!(kc.current_context(), "prod");
}

#[test]
fn swap_with_namespace() {
    let mut h = Harness::new();
    h.run(&["prod"]).0.unwrap();
    h.run(&["-", "-n", "ops"]).0.unwrap();
    let kc = h.kubeconfig();
    assert_eq!(kc.current_context(), "dev");
    assert_eq!(kc.namespace_of_context("dev").unwrap(), "ops");
}

#[test]
fn current_prints_active_context() {
    let mut h = Harness::new();
    let (result, stdout, _) = h.run(&["-c"]);
    result.unwrap();
    assert_eq!(stdout, "dev\n");
}

#[test]
fn unset_then_current_fails() {
    let mut h = Harness::new();
    let (result, _, stderr) = h.run(&["-u"]);
    result.unwrap();
    assert!(stderr.contains("Active context unset for kubectl."));
    let (result, _, _) = h.run(&["--current"]);
    assert_eq!(kind(&result), Some(KubectxError::NoCurrentContext));
}

#[test]
fn rename_named_context() {
    let mut h = Harness::new();
    let (result, _, stderr) = h.run(&["production=prod"]);
    result.unwrap();
    assert!(stderr.contains("Context \"prod\" renamed to \"production\"."));
    let kc = h.kubeconfig();
    assert!(kc.context_exists("production"));
    assert!(!kc.context_exists("prod"));
    assert_eq!(kc.current_context(), "dev");
}

#[test]
fn rename_current_marker_resolves_at_execution() {
    let mut h = Harness::new();
    h.run(&["staging"]).0.unwrap();
    h.run(&["qa=."]).0.unwrap();
    let kc = h.kubeconfig();
    assert!(kc.context_exists("qa"));
    assert!(!kc.context_exists("staging"));
    assert!(kc.context_exists("dev"));
    assert_eq!(kc.current_context(), "qa");
}

#[test]
fn rename_overwrites_existing_target() {
    let mut h = Harness::new();
    let (result, _, stderr) = h.run(&["prod=staging"]);
    result.unwrap();
    assert!(stderr.contains("context \"prod\" exists, overwriting it."));
    let kc = h.kubeconfig();
    assert_eq!(kc.context_names(), vec!["dev", "prod"]);
    assert_eq!(kc.namespace_of_context("prod").unwrap(), "default");
}

#[test]
fn rename_missing_context_fails() {
    let mut h = Harness::new();
    let (result, _, _) = h.run(&["x=nope"]);
    assert_eq!(kind(&result), Some(KubectxError::ContextNotFound("nope".into())));
}

#[test]
fn delete_continues_past_missing_names() {
    let mut h = Harness::new();
    let (result, _, stderr) = h.run(&["-d", "prod", "ghost", "staging"]);
    assert_eq!(kind(&result), Some(KubectxError::PartialDelete { failed: vec!["ghost".into()] }));
    assert!(stderr.contains("Deleted context \"prod\"."));
    assert!(stderr.contains("Deleted context \"staging\"."));
    assert_eq!(h.kubeconfig().context_names(), vec!["dev"]);
}

#[test]
fn delete_current_marker_warns() {
    let mut h = Harness::new();
    let (result, _, stderr) = h.run(&["-d", "."]);
    result.unwrap();
    assert!(stderr.contains("Deleted context \"dev\"."));
    assert!(stderr.contains("You deleted the current context."));
    assert_eq!(h.kubeconfig().context_names(), vec!["prod", "staging"]);
}

#[test]
fn unsupported_operation_fails() {
    let mut h = Harness::new();
    let (result, _, _) = h.run(&["-x"]);
    assert_eq!(kind(&result), Some(KubectxError::Unsupported("unsupported option '-x'".into())));
    let (result, _, _) = h.run(&["a", "b"]);
    assert_eq!(kind(&result), Some(KubectxError::Unsupported("too many arguments".into())));
}

#[test]
fn help_and_version_need_no_kubeconfig() {
    let mut h = Harness::new();
    std::fs::remove_file(&h.path).unwrap();
    let (result, stdout, _) = h.run(&["--help"]);
    result.unwrap();
    assert!(stdout.contains("USAGE:"));
    let (result, stdout, _) = h.run(&["-V"]);
    result.unwrap();
    assert_eq!(stdout.trim(), env!("CARGO_PKG_VERSION"));
    assert!(h.run(&["prod"]).0.is_err());
}

#[test]
fn interactive_switch_uses_picker_choice() {
    let mut h = Harness::with_picker(ScriptedPicker { pick: Some("staging".into()), delete: None });
    h.run_op(Operation::InteractiveSwitch).0.unwrap();
    assert_eq!(h.kubeconfig().current_context(), "staging");
}

#[test]
fn cancelled_picker_is_an_error() {
    let mut h = Harness::new();
    let (result, _, _) = h.run_op(Operation::InteractiveSwitch);
    assert_eq!(kind(&result), Some(KubectxError::PickerCancelled));
    let (result, _, _) = h.run_op(Operation::InteractiveDelete);
    assert_eq!(kind(&result), Some(KubectxError::PickerCancelled));
}

#[test]
fn interactive_delete_removes_picked_contexts() {
    let mut h = Harness::with_picker(ScriptedPicker { pick: None, delete: Some(vec!["prod".into(), "staging".into()]) });
    h.run_op(Operation::InteractiveDelete).0.unwrap();
    assert_eq!(h.kubeconfig().context_names(), vec!["dev"]);
}
