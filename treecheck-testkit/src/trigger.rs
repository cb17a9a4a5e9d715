//! Operations under test.
//!
//! - [`ExportTrigger`]: in-process export that copies a repository subtree
//!   and reports every exported path the way a client's export does
//! - [`CommandTrigger`]: runs an external program and captures its output
//! - [`Client`]: picks one of the two for a scenario

use fs_err as fs;
use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::process::Command;
use treecheck_core::helpers::relpath;
use treecheck_core::{Completion, Trigger};
use walkdir::WalkDir;

use crate::config::HarnessConfig;
use crate::sandbox::{Sandbox, SandboxError};

/// Revision reported by the reference export.
const EXPORTED_REVISION: u64 = 1;

/// Log message of the import that creates revision 1.
const IMPORT_MESSAGE: &str = "Log message for revision 1.";

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("export source '{}' does not exist", .0.display())]
    SourceMissing(PathBuf),

    #[error("export target '{}' already exists", .0.display())]
    TargetExists(PathBuf),

    #[error("walk error: {0}")]
    Walk(#[from] walkdir::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Export a directory tree into a fresh target.
///
/// Prints `A    <path>` for the target and for every path written below it,
/// in walk order, followed by `Exported revision N.`.
#[derive(Debug, Clone)]
pub struct ExportTrigger {
    source: PathBuf,
    target: PathBuf,
    revision: u64,
}

impl ExportTrigger {
    pub fn new(source: impl Into<PathBuf>, target: impl Into<PathBuf>) -> Self {
        Self {
            source: source.into(),
            target: target.into(),
            revision: EXPORTED_REVISION,
        }
    }

    /// Export `subpath` of the sandbox repository into its export target.
    /// An empty `subpath` exports the whole repository.
    pub fn from_sandbox(sandbox: &Sandbox, subpath: &str) -> Self {
        let source = if subpath.is_empty() {
            sandbox.repo_dir().to_path_buf()
        } else {
            sandbox.path(subpath)
        };
        Self::new(source, sandbox.wc_dir())
    }

    pub fn with_revision(mut self, revision: u64) -> Self {
        self.revision = revision;
        self
    }

    pub fn source(&self) -> &Path {
        &self.source
    }

    pub fn target(&self) -> &Path {
        &self.target
    }

    /// Copy the tree and return the lines that describe it.
    pub fn export(&self) -> Result<Vec<String>, ExportError> {
        if !self.source.exists() {
            return Err(ExportError::SourceMissing(self.source.clone()));
        }
        if self.target.exists() {
            return Err(ExportError::TargetExists(self.target.clone()));
        }

        let target_display = relpath::from_path(&self.target);
        let mut lines = Vec::new();

        for item in WalkDir::new(&self.source).sort_by_file_name() {
            let item = item?;
            let Some(rel) = relpath::relative_to(&self.source, item.path()) else {
                continue;
            };
            let dest = if rel.is_empty() {
                self.target.clone()
            } else {
                self.target.join(&rel)
            };

            if item.file_type().is_dir() {
                fs::create_dir_all(&dest)?;
            } else {
                fs::copy(item.path(), &dest)?;
            }
            lines.push(format!("A    {}", relpath::join(&target_display, &rel)));
        }

        lines.push(format!("Exported revision {}.", self.revision));
        log::debug!(
            "export: {} -> {} ({} paths)",
            self.source.display(),
            self.target.display(),
            lines.len() - 1
        );
        Ok(lines)
    }
}

impl Trigger for ExportTrigger {
    fn name(&self) -> &str {
        "export"
    }

    fn fire(&mut self) -> Completion {
        match self.export() {
            Ok(lines) => Completion::success(lines),
            Err(e) => Completion::failure(Some(1), format!("export: {e}")),
        }
    }
}

/// Run an external program as the operation under test.
#[derive(Debug, Clone)]
pub struct CommandTrigger {
    name: String,
    program: PathBuf,
    args: Vec<OsString>,
    current_dir: Option<PathBuf>,
}

impl CommandTrigger {
    pub fn new(program: impl Into<PathBuf>) -> Self {
        let program = program.into();
        let name = program
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| program.to_string_lossy().into_owned());
        Self {
            name,
            program,
            args: Vec::new(),
            current_dir: None,
        }
    }

    /// The configured client binary with `args`.
    pub fn client<I, S>(config: &HarnessConfig, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        Self::new(config.client()).args(args)
    }

    pub fn arg(mut self, arg: impl Into<OsString>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    pub fn current_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.current_dir = Some(dir.into());
        self
    }

    /// Override the name used in logs and failures.
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    fn command(&self) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args);
        if let Some(dir) = &self.current_dir {
            cmd.current_dir(dir);
        }
        cmd
    }
}

impl Trigger for CommandTrigger {
    fn name(&self) -> &str {
        &self.name
    }

    fn fire(&mut self) -> Completion {
        log::debug!("running {} {:?}", self.program.display(), self.args);
        match self.command().output() {
            Ok(output) => Completion::from_output(&output),
            Err(e) => Completion::failure(
                None,
                format!("Failed to execute {}: {}", self.program.display(), e),
            ),
        }
    }
}

/// Which implementation performs the export in a scenario.
#[derive(Debug, Clone, Default)]
pub enum Client {
    /// [`ExportTrigger`], no external tools needed.
    #[default]
    Reference,
    /// `<client> export <repo-url>/<path> <wc-dir>` with the configured binary,
    /// against a repository built by [`Client::prepare`].
    External(HarnessConfig),
}

impl Client {
    pub fn name(&self) -> &'static str {
        match self {
            Client::Reference => "reference",
            Client::External(_) => "external",
        }
    }

    /// Make the sandbox repository readable by this client.
    ///
    /// The reference export reads `repos/<name>` directly. An external client
    /// gets a fresh repository in the sandbox store, created with the
    /// configured admin binary and filled by importing `repos/<name>` as
    /// revision 1.
    pub fn prepare(&self, sandbox: &Sandbox) -> Result<(), SandboxError> {
        let Client::External(config) = self else {
            return Ok(());
        };

        let store = sandbox.store_dir();
        if store.exists() {
            fs::remove_dir_all(store)?;
        }
        if let Some(parent) = store.parent() {
            fs::create_dir_all(parent)?;
        }

        let create = CommandTrigger::new(config.admin())
            .arg("create")
            .arg(store.as_os_str().to_owned())
            .named("create");
        let import = CommandTrigger::client(config, ["import", "--non-interactive", "-m"])
            .arg(IMPORT_MESSAGE)
            .arg(sandbox.repo_dir().as_os_str().to_owned())
            .arg(sandbox.repo_url())
            .named("import");

        for mut step in [create, import] {
            let completion = step.fire();
            if !completion.success {
                return Err(SandboxError::Provision {
                    step: step.name().to_string(),
                    exit_code: completion.exit_code,
                    stderr: completion.stderr,
                });
            }
        }

        log::info!("Repository for '{}' at {}", sandbox.name(), sandbox.repo_url());
        Ok(())
    }

    /// A trigger exporting `subpath` of the sandbox repository.
    pub fn export_trigger(&self, sandbox: &Sandbox, subpath: &str) -> Box<dyn Trigger> {
        match self {
            Client::Reference => Box::new(ExportTrigger::from_sandbox(sandbox, subpath)),
            Client::External(config) => {
                let url = if subpath.is_empty() {
                    sandbox.repo_url()
                } else {
                    format!("{}/{}", sandbox.repo_url(), subpath)
                };
                let args: [OsString; 3] = [
                    "export".into(),
                    url.into(),
                    sandbox.wc_dir().as_os_str().to_owned(),
                ];
                Box::new(CommandTrigger::client(config, args).named("export"))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use treecheck_core::{from_output, StatusCode};

    #[test]
    fn test_export_copies_tree_and_reports_paths() {
        let sandbox = Sandbox::build("export_copy").unwrap();
        let mut trigger = ExportTrigger::from_sandbox(&sandbox, "A/D/G");

        let completion = trigger.fire();
        assert!(completion.success, "{}", completion.stderr);

        let target = relpath::from_path(sandbox.wc_dir());
        assert_eq!(
            completion.stdout,
            vec![
                format!("A    {target}"),
                format!("A    {target}/pi"),
                format!("A    {target}/rho"),
                format!("A    {target}/tau"),
                "Exported revision 1.".to_string(),
            ]
        );
        assert_eq!(
            fs::read(sandbox.wc_dir().join("rho")).unwrap(),
            b"This is the file 'rho'.\n"
        );
    }

    #[test]
    fn test_export_output_parses_relative_to_target() {
        let sandbox = Sandbox::build("export_parse").unwrap();
        let mut trigger = ExportTrigger::from_sandbox(&sandbox, "");
        let completion = trigger.fire();
        assert!(completion.success);

        let target = relpath::from_path(sandbox.wc_dir());
        let state = from_output(&completion.stdout, Some(target.as_str()));
        assert_eq!(state.len(), sandbox.baseline().len() + 1);
        assert_eq!(state.get("").unwrap().status(), Some(StatusCode::ADDED));
        assert_eq!(
            state.get("A/B/E/alpha").unwrap().status(),
            Some(StatusCode::ADDED)
        );
    }

    #[test]
    fn test_export_refuses_existing_target() {
        let sandbox = Sandbox::build("export_exists").unwrap();
        fs::create_dir_all(sandbox.wc_dir()).unwrap();

        let completion = ExportTrigger::from_sandbox(&sandbox, "").fire();
        assert!(!completion.success);
        assert_eq!(completion.exit_code, Some(1));
        assert!(completion.stderr.contains("already exists"));
    }

    #[test]
    fn test_export_missing_source() {
        let sandbox = Sandbox::build("export_missing").unwrap();
        let mut trigger = ExportTrigger::from_sandbox(&sandbox, "A/nope");

        let completion = trigger.fire();
        assert!(!completion.success);
        assert!(completion.stderr.contains("does not exist"));
        assert!(!sandbox.wc_dir().exists());
        assert_eq!(trigger.name(), "export");
    }

    #[test]
    fn test_export_revision() {
        let tmp = tempfile::tempdir().unwrap();
        let source = tmp.path().join("src");
        fs::create_dir_all(&source).unwrap();

        let mut trigger = ExportTrigger::new(&source, tmp.path().join("dst")).with_revision(7);
        let completion = trigger.fire();
        assert_eq!(completion.stdout.last().unwrap(), "Exported revision 7.");
        assert_eq!(completion.stdout.len(), 2);
    }

    #[test]
    fn test_command_trigger_spawn_failure() {
        let mut trigger = CommandTrigger::new("/definitely/not/a/real/binary");
        let completion = trigger.fire();
        assert!(!completion.success);
        assert_eq!(completion.exit_code, None);
        assert!(completion.stderr.contains("Failed to execute"));
        assert_eq!(trigger.name(), "binary");
    }

    #[test]
    fn test_client_trigger_uses_config() {
        let mut config = HarnessConfig::default();
        config.set_client("/opt/bin/my-client");
        let trigger = CommandTrigger::client(&config, ["export", "url", "dst"]);
        assert_eq!(trigger.name(), "my-client");
        assert_eq!(trigger.args.len(), 3);
    }

    #[cfg(unix)]
    #[test]
    fn test_command_trigger_captures_output() {
        let tmp = tempfile::tempdir().unwrap();
        let mut trigger = CommandTrigger::new("sh")
            .args(["-c", "echo 'A    out'; echo 'A    out/f'; echo oops >&2"])
            .current_dir(tmp.path());

        let completion = trigger.fire();
        assert!(completion.success);
        assert_eq!(completion.stdout, vec!["A    out", "A    out/f"]);
        assert_eq!(completion.stderr, "oops\n");
    }

    #[cfg(unix)]
    #[test]
    fn test_command_trigger_exit_code() {
        let mut trigger = CommandTrigger::new("sh").args(["-c", "exit 3"]);
        let completion = trigger.fire();
        assert!(!completion.success);
        assert_eq!(completion.exit_code, Some(3));
    }

    #[test]
    fn test_reference_prepare_is_noop() {
        let sandbox = Sandbox::build("prepare_reference").unwrap();
        Client::Reference.prepare(&sandbox).unwrap();
        assert!(!sandbox.store_dir().exists());
    }

    #[cfg(unix)]
    #[test]
    fn test_external_prepare_runs_admin_and_import() {
        let sandbox = Sandbox::build("prepare_external").unwrap();
        fs::create_dir_all(sandbox.store_dir().join("stale")).unwrap();

        let mut config = HarnessConfig::default();
        config.set_admin("true");
        config.set_client("true");
        Client::External(config).prepare(&sandbox).unwrap();

        assert!(!sandbox.store_dir().exists());
        assert!(sandbox.store_dir().parent().unwrap().is_dir());
    }

    #[cfg(unix)]
    #[test]
    fn test_external_prepare_reports_failed_step() {
        let sandbox = Sandbox::build("prepare_failed").unwrap();

        let mut config = HarnessConfig::default();
        config.set_admin("true");
        config.set_client("false");
        let err = Client::External(config).prepare(&sandbox).unwrap_err();

        match err {
            SandboxError::Provision { step, exit_code, .. } => {
                assert_eq!(step, "import");
                assert_eq!(exit_code, Some(1));
            }
            other => panic!("expected provision failure, got {other:?}"),
        }
    }

    #[test]
    fn test_client_names() {
        assert_eq!(Client::Reference.name(), "reference");
        assert_eq!(Client::External(HarnessConfig::default()).name(), "external");

        let sandbox = Sandbox::build("client_names").unwrap();
        assert_eq!(Client::Reference.export_trigger(&sandbox, "A").name(), "export");
        assert_eq!(
            Client::External(HarnessConfig::default())
                .export_trigger(&sandbox, "A")
                .name(),
            "export"
        );
    }
}
