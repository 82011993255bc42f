//! The interactive read-eval loop.
//!
//! The shell owns the command registry. It loads plugins once at
//! construction, then reads lines until `exit`, end of input, or an
//! interrupt. Every exit path passes through the same shutdown notification.

use calcshell_core::commands::MenuCommand;
use calcshell_core::{
    CommandRegistry, HistoryError, HistoryStore, Settings, ShellConfig, register_builtins,
};
use calcshell_plugins::{LoadReport, PluginCatalog, PluginLoader};
use scopeguard::defer;
use std::any::Any;
use std::io::{self, BufRead, Write};
use std::panic::{AssertUnwindSafe, catch_unwind};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

/// Why the read loop stopped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitReason {
    ExitCommand,
    EndOfInput,
    Interrupted,
}

/// What the shell should do after a line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineOutcome {
    Continue,
    Exit,
}

pub struct Shell {
    registry: CommandRegistry,
    config: ShellConfig,
    settings: Settings,
    history: Arc<HistoryStore>,
    history_error: Option<HistoryError>,
    plugins: LoadReport,
}

impl Shell {
    /// Build the shell: open history, register built-ins, load plugins once,
    /// then snapshot everything into `menu`.
    pub fn new(config: ShellConfig, settings: Settings, catalog: PluginCatalog) -> Self {
        let (history, history_error) = HistoryStore::open_or_empty(&config.history_file);
        let history = Arc::new(history);

        let mut registry = CommandRegistry::new();
        register_builtins(&mut registry, history.clone(), &config.log_file());

        let mut loader = PluginLoader::new(&config.plugins_dir, catalog);
        let plugins = loader.load_all(&mut registry);
        for (name, e) in &plugins.failed {
            warn!(plugin = %name, error = %e, "Plugin skipped");
        }

        let menu = MenuCommand::from_registry(&registry, &[("exit", "Exit the calculator")]);
        registry.register("menu", Arc::new(menu));

        debug!(commands = registry.len(), "Shell ready");
        Self {
            registry,
            config,
            settings,
            history,
            history_error,
            plugins,
        }
    }

    pub fn registry(&self) -> &CommandRegistry {
        &self.registry
    }

    pub fn history(&self) -> &Arc<HistoryStore> {
        &self.history
    }

    pub fn plugins(&self) -> &LoadReport {
        &self.plugins
    }

    /// Handle a single input line.
    ///
    /// `exit` is recognised before dispatch. Command failures, including
    /// panics, are reported to `out` and never end the loop.
    pub fn handle_line(&self, line: &str, out: &mut dyn Write) -> io::Result<LineOutcome> {
        let line = line.trim();
        if line.is_empty() {
            return Ok(LineOutcome::Continue);
        }

        if is_exit(line) {
            writeln!(out, "Exiting...")?;
            info!("Application exit.");
            return Ok(LineOutcome::Exit);
        }

        match catch_unwind(AssertUnwindSafe(|| self.registry.dispatch(line, &mut *out))) {
            Ok(Ok(true)) => {}
            Ok(Ok(false)) => {
                writeln!(out, "No such command: {line}")?;
                error!(input = %line, "Unknown command");
            }
            Ok(Err(e)) => {
                writeln!(out, "Error executing command: {e}")?;
                error!(input = %line, error = %e, "Error executing command");
            }
            Err(panic) => {
                let message = panic_message(panic.as_ref());
                writeln!(out, "Error executing command: {message}")?;
                error!(input = %line, panic = %message, "Command panicked");
            }
        }
        Ok(LineOutcome::Continue)
    }

    /// Run the loop over `input` until exit, end of input or `shutdown`
    /// resolves.
    pub async fn run<W, S>(
        &self,
        mut input: mpsc::Receiver<io::Result<String>>,
        out: &mut W,
        shutdown: S,
    ) -> anyhow::Result<ExitReason>
    where
        W: Write,
        S: Future<Output = ()>,
    {
        defer! {
            info!("Application shutdown.");
        }

        writeln!(out, "Calculator ready. Type 'menu' to list commands. Type 'exit' to exit.")?;
        if let Some(e) = &self.history_error {
            writeln!(out, "Warning: previous history could not be loaded, starting empty: {e}")?;
        }
        info!(
            environment = self.settings.environment(),
            plugins = self.plugins.loaded.len(),
            "Application started"
        );

        tokio::pin!(shutdown);
        loop {
            write!(out, "{}", self.config.prompt)?;
            out.flush()?;

            let next = tokio::select! {
                _ = &mut shutdown => {
                    writeln!(out)?;
                    writeln!(out, "Exiting...")?;
                    info!("Application interrupted and exiting gracefully.");
                    return Ok(ExitReason::Interrupted);
                }
                next = input.recv() => next,
            };

            let Some(line) = next.transpose()? else {
                writeln!(out)?;
                writeln!(out, "Exiting...")?;
                info!("End of input, exiting.");
                return Ok(ExitReason::EndOfInput);
            };

            if self.handle_line(&line, out)? == LineOutcome::Exit {
                return Ok(ExitReason::ExitCommand);
            }
        }
    }
}

fn is_exit(line: &str) -> bool {
    line.split_whitespace()
        .next()
        .is_some_and(|token| token.eq_ignore_ascii_case("exit"))
}

fn panic_message(panic: &(dyn Any + Send)) -> String {
    if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else {
        "command panicked".to_string()
    }
}

/// Read stdin on a dedicated thread so a pending read never blocks shutdown.
pub fn spawn_stdin_reader() -> mpsc::Receiver<io::Result<String>> {
    let (tx, rx) = mpsc::channel(16);
    std::thread::spawn(move || {
        let stdin = io::stdin();
        loop {
            let mut line = String::new();
            let item = match stdin.lock().read_line(&mut line) {
                Ok(0) => break,
                Ok(_) => Ok(line),
                Err(e) => Err(e),
            };
            let failed = item.is_err();
            if tx.blocking_send(item).is_err() || failed {
                break;
            }
        }
    });
    rx
}

/// Resolves on Ctrl-C. Never resolves if the handler cannot be installed.
pub async fn interrupt_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!(error = %e, "Could not listen for interrupts");
        std::future::pending::<()>().await;
    }
}

/// Route panics to the log instead of stderr. The shell reports caught
/// command panics itself.
fn set_panic_hook() {
    std::panic::set_hook(Box::new(|panic_info| {
        error!(panic = %panic_info, "Panic");
    }));
}

/// Start the interactive shell on stdin/stdout.
pub async fn run_interactive(config: ShellConfig, settings: Settings) -> anyhow::Result<()> {
    set_panic_hook();
    let shell = Shell::new(config, settings, PluginCatalog::with_builtins());
    let mut stdout = io::stdout();
    let reason = shell
        .run(spawn_stdin_reader(), &mut stdout, interrupt_signal())
        .await?;
    debug!(?reason, "Shell finished");
    Ok(())
}
