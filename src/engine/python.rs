//! Subprocess engine backed by an external python3 interpreter

use super::traits::{EngineLauncher, EngineRuntime, TransformEngine, TransformInputs};
use crate::config::EngineConfig;
use crate::error::{Error, Result};
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::process::Output;
use tempfile::TempDir;
use tokio::process::Command;
use tracing::debug;

const SCRIPT_FILE: &str = "processor.py";
const OUTPUT_FILE: &str = "artifact.bin";
const INPUT_FILES: [&str; 3] = ["primary.html", "secondary.html", "universal.html"];

// Runs the script's main(primary, secondary, universal) and writes the
// returned bytes to the file named by the last argument.
const DRIVER: &str = r#"
import runpy, sys
ns = runpy.run_path(sys.argv[1])
texts = [open(p, encoding="utf-8").read() for p in sys.argv[2:5]]
data = ns["main"](*texts)
if isinstance(data, str):
    data = data.encode("utf-8")
with open(sys.argv[5], "wb") as out:
    out.write(bytes(data))
"#;

const IMPORT_CHECK: &str = r#"
import importlib, sys
for name in sys.argv[1:]:
    importlib.import_module(name)
"#;

/// Launches sandboxed python3 subprocess engines
///
/// Each boot creates a private temporary directory that holds installed
/// auxiliary packages, the processing script and the per-call input and
/// output files. The directory is removed when the engine is dropped.
///
/// ```no_run
/// use moneyball_pipeline::engine::PythonEngineLauncher;
///
/// let launcher = PythonEngineLauncher::from_path()
///     .expect("python3 not found in PATH");
/// ```
pub struct PythonEngineLauncher {
    interpreter: PathBuf,
}

impl PythonEngineLauncher {
    /// Create a launcher with an explicit interpreter path
    pub fn new(interpreter: PathBuf) -> Self {
        Self { interpreter }
    }

    /// Attempt to find `python3` (or `python`) in PATH
    pub fn from_path() -> Option<Self> {
        which::which("python3")
            .or_else(|_| which::which("python"))
            .ok()
            .map(Self::new)
    }

    /// Use the configured interpreter, falling back to a PATH lookup
    pub fn from_config(config: &EngineConfig) -> Option<Self> {
        match &config.interpreter {
            Some(path) => Some(Self::new(path.clone())),
            None => Self::from_path(),
        }
    }

    /// Interpreter this launcher runs
    pub fn interpreter(&self) -> &Path {
        &self.interpreter
    }
}

#[async_trait]
impl EngineLauncher for PythonEngineLauncher {
    async fn boot(&self) -> Result<Box<dyn EngineRuntime>> {
        let sandbox = tempfile::Builder::new()
            .prefix("moneyball-engine-")
            .tempdir()?;
        let site = sandbox.path().join("site-packages");
        tokio::fs::create_dir_all(&site).await?;

        let sandbox = Sandbox {
            interpreter: self.interpreter.clone(),
            dir: sandbox,
            site,
        };

        let output = sandbox.run(sandbox.command().arg("--version")).await?;
        check_status(&output, "interpreter check")?;
        debug!(
            interpreter = ?self.interpreter,
            version = %String::from_utf8_lossy(&output.stdout).trim(),
            sandbox = ?sandbox.dir.path(),
            "python runtime booted"
        );

        Ok(Box::new(PythonRuntime {
            sandbox,
            script: None,
        }))
    }

    fn name(&self) -> &'static str {
        "python"
    }
}

/// Interpreter plus its private working directory
struct Sandbox {
    interpreter: PathBuf,
    dir: TempDir,
    site: PathBuf,
}

impl Sandbox {
    fn command(&self) -> Command {
        let mut command = Command::new(&self.interpreter);
        command
            .arg("-s")
            .current_dir(self.dir.path())
            .env("PYTHONPATH", &self.site)
            .env("PYTHONDONTWRITEBYTECODE", "1")
            .kill_on_drop(true);
        command
    }

    async fn run(&self, command: &mut Command) -> Result<Output> {
        command.output().await.map_err(|e| {
            Error::ExternalTool(format!(
                "Failed to execute {}: {}",
                self.interpreter.display(),
                e
            ))
        })
    }
}

struct PythonRuntime {
    sandbox: Sandbox,
    script: Option<PathBuf>,
}

#[async_trait]
impl EngineRuntime for PythonRuntime {
    async fn load_packages(&mut self, packages: &[String]) -> Result<()> {
        if packages.is_empty() {
            return Ok(());
        }
        let output = self
            .sandbox
            .run(self.sandbox.command().arg("-c").arg(IMPORT_CHECK).args(packages))
            .await?;
        check_status(&output, "package import")?;
        debug!(?packages, "python packages importable");
        Ok(())
    }

    async fn install_packages(&mut self, packages: &[String]) -> Result<()> {
        if packages.is_empty() {
            return Ok(());
        }
        let output = self
            .sandbox
            .run(
                self.sandbox
                    .command()
                    .args(["-m", "pip", "install", "--quiet", "--disable-pip-version-check"])
                    .arg("--target")
                    .arg(&self.sandbox.site)
                    .args(packages),
            )
            .await?;
        check_status(&output, "pip install")?;
        debug!(?packages, "auxiliary packages installed");
        Ok(())
    }

    async fn load_script(&mut self, source: &str) -> Result<()> {
        let path = self.sandbox.dir.path().join(SCRIPT_FILE);
        tokio::fs::write(&path, source).await?;

        let output = self
            .sandbox
            .run(self.sandbox.command().args(["-m", "py_compile", SCRIPT_FILE]))
            .await?;
        check_status(&output, "script compilation")?;

        self.script = Some(path);
        Ok(())
    }

    fn into_engine(self: Box<Self>) -> Result<Box<dyn TransformEngine>> {
        let runtime = *self;
        let script = runtime
            .script
            .ok_or_else(|| Error::Other("processing script was not loaded".into()))?;

        Ok(Box::new(PythonEngine {
            sandbox: runtime.sandbox,
            script,
        }))
    }
}

struct PythonEngine {
    sandbox: Sandbox,
    script: PathBuf,
}

#[async_trait]
impl TransformEngine for PythonEngine {
    async fn transform(&self, inputs: TransformInputs) -> Result<Vec<u8>> {
        let dir = self.sandbox.dir.path();
        let texts = [&inputs.primary, &inputs.secondary, &inputs.universal];
        for (name, text) in INPUT_FILES.iter().zip(texts) {
            tokio::fs::write(dir.join(name), text).await?;
        }
        let output_path = dir.join(OUTPUT_FILE);
        if tokio::fs::try_exists(&output_path).await? {
            tokio::fs::remove_file(&output_path).await?;
        }

        let output = self
            .sandbox
            .run(
                self.sandbox
                    .command()
                    .arg("-c")
                    .arg(DRIVER)
                    .arg(&self.script)
                    .args(INPUT_FILES)
                    .arg(OUTPUT_FILE),
            )
            .await?;

        if !output.status.success() {
            return Err(Error::Transform {
                reason: failure_reason(&output),
            });
        }

        Ok(tokio::fs::read(&output_path).await?)
    }
}

fn check_status(output: &Output, action: &str) -> Result<()> {
    if output.status.success() {
        Ok(())
    } else {
        Err(Error::ExternalTool(format!(
            "python {} failed: {}",
            action,
            failure_reason(output)
        )))
    }
}

/// Last non-empty stderr line, which for a traceback is the exception itself
fn failure_reason(output: &Output) -> String {
    let stderr = String::from_utf8_lossy(&output.stderr);
    stderr
        .lines()
        .rev()
        .map(str::trim)
        .find(|line| !line.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| format!("exited with {}", output.status))
}
