use std::io::Write;
use std::path::PathBuf;

use anyhow::{Context, Result};
use kubectx_core::{
    kubeconfig_path, ConfigStore, ContextRef, ContextSwitcher, KubectxError, Kubeconfig, NamespaceChecker,
    NamespaceSwitcher, Operation, Picker, StateStore, SWAP_TOKEN,
};
use tracing::debug;

use crate::printer::Printer;

const HELP: &str = r#"USAGE:
  kubectx                       : list the contexts
  kubectx <NAME>                : switch to context <NAME>
  kubectx <NAME> -n <NS>        : switch to context <NAME> and namespace <NS>
  kubectx -                     : switch to the previous context
  kubectx -c, --current         : show the current context name
  kubectx <NEW_NAME>=<NAME>     : rename context <NAME> to <NEW_NAME>
  kubectx <NEW_NAME>=.          : rename current-context to <NEW_NAME>
  kubectx -u, --unset           : unset the current context
  kubectx -d <NAME> [<NAME...>] : delete context <NAME> ('.' for current-context)
                                  (this command won't delete the user/cluster entry
                                  referenced by the context entry)
  kubectx -h,--help             : show this message
  kubectx -V,--version          : show version

  -n, --namespace <NS> may appear before or after <NAME>."#;

/// Runs a resolved [`Operation`] against the kubeconfig and the state store.
pub struct Executor {
    kubeconfig: Option<PathBuf>,
    state: Box<dyn StateStore>,
    checker: Box<dyn NamespaceChecker>,
    picker: Box<dyn Picker>,
    printer: Printer,
}

impl Executor {
    pub fn new(
        state: Box<dyn StateStore>,
        checker: Box<dyn NamespaceChecker>,
        picker: Box<dyn Picker>,
        printer: Printer,
    ) -> Self {
        Self { kubeconfig: None, state, checker, picker, printer }
    }

    /// Pins the kubeconfig location instead of resolving it from the environment.
    pub fn with_kubeconfig(mut self, path: PathBuf) -> Self {
        self.kubeconfig = Some(path);
        self
    }

    fn load_kubeconfig(&self) -> Result<Kubeconfig> {
        let path = match &self.kubeconfig {
            Some(path) => path.clone(),
            None => kubeconfig_path()?,
        };
        debug!(path = %path.display(), "loading kubeconfig");
        Kubeconfig::load(&path).context("kubeconfig error")
    }

    pub fn run(&mut self, op: Operation, stdout: &mut dyn Write, stderr: &mut dyn Write) -> Result<()> {
        debug!(?op, "running operation");
        match op {
            Operation::Help => writeln!(stdout, "{HELP}").context("print error"),
            Operation::Version => writeln!(stdout, "{}", env!("CARGO_PKG_VERSION")).context("print error"),
            Operation::List => self.list(stdout),
            Operation::InteractiveSwitch => self.interactive_switch(stderr),
            Operation::InteractiveDelete => self.interactive_delete(stderr),
            Operation::Switch { target, namespace } => self.switch(&target, namespace.as_deref(), stderr),
            Operation::SwapBack => self.switch(SWAP_TOKEN, None, stderr),
            Operation::Delete { names } => self.delete(&names, stderr),
            Operation::Rename { new_name, old_name } => self.rename(&new_name, &old_name, stderr),
            Operation::Current => self.current(stdout),
            Operation::Unset => self.unset(stderr),
            Operation::Unsupported { reason } => Err(KubectxError::Unsupported(reason).into()),
        }
    }

    fn list(&self, stdout: &mut dyn Write) -> Result<()> {
        let kc = self.load_kubeconfig()?;
        let current = kc.current_context();
        let mut names = kc.context_names();
        names.sort();
        for name in &names {
            writeln!(stdout, "{}", self.printer.list_entry(name, name == current)).context("print error")?;
        }
        Ok(())
    }

    fn switch(&self, target: &str, namespace: Option<&str>, stderr: &mut dyn Write) -> Result<()> {
        let mut kc = self.load_kubeconfig()?;

        let new_ctx = {
            let mut switcher = ContextSwitcher::new(&mut kc, self.state.as_ref());
            if target == SWAP_TOKEN {
                switcher.swap_back()
            } else {
                switcher.switch_to(target)
            }
        }
        .context("failed to switch context")?;

        let Some(namespace) = namespace else {
            let msg = format!("Switched to context {}.", self.printer.name(&new_ctx));
            return self.printer.success(stderr, &msg).context("print error");
        };

        let to_ns = NamespaceSwitcher::new(&mut kc, self.state.as_ref(), self.checker.as_ref())
            .switch_namespace(&new_ctx, namespace, false)
            .context("failed to switch namespace")?;
        let msg =
            format!("Switched to context {} and namespace {}.", self.printer.name(&new_ctx), self.printer.name(&to_ns));
        self.printer.success(stderr, &msg).context("print error")
    }

    /// Deletes every name that exists, even when some do not; fails afterwards
    /// if any name could not be deleted.
    fn delete(&self, names: &[String], stderr: &mut dyn Write) -> Result<()> {
        let mut kc = self.load_kubeconfig()?;
        let mut failed = Vec::new();
        let mut deleted_any = false;

        for raw in names {
            let target = ContextRef::from(raw.as_str());
            let current = kc.current_context().to_string();
            let name = target.resolve(&current).to_string();

            if name.is_empty() || !kc.context_exists(&name) {
                let shown = if name.is_empty() { raw.clone() } else { name };
                self.printer
                    .warning(stderr, &format!("no context exists with the name: \"{shown}\""))
                    .context("print error")?;
                failed.push(shown);
                continue;
            }

            kc.delete_context(&name).with_context(|| format!("failed to delete context \"{name}\""))?;
            deleted_any = true;
            let msg = format!("Deleted context {}.", self.printer.name(&name));
            self.printer.success(stderr, &msg).context("print error")?;
            if name == current {
                self.printer
                    .warning(stderr, "You deleted the current context. Use \"kubectx\" to select a different one.")
                    .context("print error")?;
            }
        }

        if deleted_any {
            kc.save().context(KubectxError::Persistence("failed to save kubeconfig".into()))?;
        }
        if !failed.is_empty() {
            return Err(KubectxError::PartialDelete { failed }.into());
        }
        Ok(())
    }

    fn rename(&self, new_name: &str, old_name: &ContextRef, stderr: &mut dyn Write) -> Result<()> {
        let mut kc = self.load_kubeconfig()?;
        let current = kc.current_context().to_string();
        let old = old_name.resolve(&current).to_string();

        if old.is_empty() || !kc.context_exists(&old) {
            return Err(KubectxError::ContextNotFound(old)).context("can't rename context");
        }
        if old == new_name {
            debug!(name = new_name, "rename to same name, nothing to do");
            let msg = format!("Context {} unchanged.", self.printer.name(new_name));
            return self.printer.success(stderr, &msg).context("print error");
        }

        if kc.context_exists(new_name) {
            self.printer
                .warning(stderr, &format!("context \"{new_name}\" exists, overwriting it."))
                .context("print error")?;
            kc.delete_context(new_name).context("failed to delete new context to overwrite it")?;
        }

        kc.rename_context(&old, new_name).context("failed to change context name")?;
        if old == current {
            kc.set_current_context(new_name).context("failed to set current context to new name")?;
        }
        kc.save().context(KubectxError::Persistence("failed to save modified kubeconfig".into()))?;

        let msg = format!("Context {} renamed to {}.", self.printer.name(&old), self.printer.name(new_name));
        self.printer.success(stderr, &msg).context("print error")
    }

    fn current(&self, stdout: &mut dyn Write) -> Result<()> {
        let kc = self.load_kubeconfig()?;
        let current = kc.current_context();
        if current.is_empty() {
            return Err(KubectxError::NoCurrentContext.into());
        }
        writeln!(stdout, "{current}").context("print error")
    }

    fn unset(&self, stderr: &mut dyn Write) -> Result<()> {
        let mut kc = self.load_kubeconfig()?;
        kc.unset_current_context()?;
        kc.save().context(KubectxError::Persistence("failed to save kubeconfig".into()))?;
        self.printer.success(stderr, "Active context unset for kubectl.").context("print error")
    }

    fn interactive_switch(&mut self, stderr: &mut dyn Write) -> Result<()> {
        let kc = self.load_kubeconfig()?;
        let mut names = kc.context_names();
        names.sort();
        let current = kc.current_context().to_string();

        let choice = self.picker.pick_context(&names, &current).context("failed to run the picker")?;
        let Some(choice) = choice.filter(|c| !c.is_empty()) else {
            return Err(KubectxError::PickerCancelled.into());
        };
        self.switch(&choice, None, stderr)
    }

    fn interactive_delete(&mut self, stderr: &mut dyn Write) -> Result<()> {
        let kc = self.load_kubeconfig()?;
        let mut names = kc.context_names();
        names.sort();
        let current = kc.current_context().to_string();

        let choice = self.picker.pick_contexts_to_delete(&names, &current).context("failed to run the picker")?;
        let Some(choice) = choice.filter(|c| !c.is_empty()) else {
            return Err(KubectxError::PickerCancelled.into());
        };
        self.delete(&choice, stderr)
    }
}

#[cfg(test)]
mod tests;
