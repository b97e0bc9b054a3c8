mod executor;
mod printer;

use std::io;
use std::process::ExitCode;

use crossterm::execute;
use crossterm::terminal::{self, LeaveAlternateScreen};
use crossterm::tty::IsTty;
use kubectx_config::AppConfig;
use kubectx_core::{parse_args, FileStateStore, KubeNamespaceChecker};
use kubectx_tui::TuiPicker;
use tracing_subscriber::EnvFilter;

use crate::executor::Executor;
use crate::printer::Printer;

fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(io::stderr)
        .init();

    install_panic_hook();

    let settings = AppConfig::load();
    let printer = Printer::from_config(&settings);
    let mut stderr = io::stderr();

    match run(&settings, printer.clone()) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::debug!(error = ?e, "command failed");
            let _ = printer.error(&mut stderr, &format!("{e:#}"));
            ExitCode::FAILURE
        }
    }
}

fn run(settings: &AppConfig, printer: Printer) -> anyhow::Result<()> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let op = parse_args(&args, || settings.picker_enabled() && io::stdout().is_tty());

    let state = FileStateStore::from_state_dir(settings.general.state_dir().as_deref())?;
    let checker = KubeNamespaceChecker::new(settings.general.namespace_check_timeout());
    let mut executor = Executor::new(Box::new(state), Box::new(checker), Box::new(TuiPicker::new()), printer);

    let mut stdout = io::stdout();
    let mut stderr = io::stderr();
    executor.run(op, &mut stdout, &mut stderr)
}

fn install_panic_hook() {
    let original_hook = std::panic::take_hook();
    std::panic::set_hook(Box::new(move |panic_info| {
        let _ = terminal::disable_raw_mode();
        let _ = execute!(io::stdout(), LeaveAlternateScreen);
        original_hook(panic_info);
    }));
}
