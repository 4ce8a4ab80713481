//! Editor extension scaffolding.
//!
//! Generates the VS Code extension that performs the export from inside the
//! editor, then builds it into an installable `.vsix`. The pipeline runs four
//! stages in order and never retries:
//!
//! 1. **Clean**: remove any previous output directory.
//! 2. **Emit**: write the embedded template files.
//! 3. **Install**: `npm install`.
//! 4. **Package**: `npm run compile`, then `npx @vscode/vsce package`.
//!
//! Build steps that fail are logged and the pipeline moves on; a scaffold run
//! only fails outright when the output directory cannot be cleaned or the
//! template files themselves cannot be written.

use crate::error::AppError;
use anyhow::{Context, Result};
use log::{debug, info, warn};
use std::future::Future;
use std::path::{Path, PathBuf};
use std::process::Output;
use tokio::fs;
use tokio::process::Command;

/// Directory created when none is given on the command line.
pub const DEFAULT_TARGET_DIR: &str = "context-export-extension";

/// A file written verbatim into the scaffold.
#[derive(Debug, Clone, Copy)]
pub struct TemplateFile {
    pub path: &'static str,
    pub contents: &'static str,
}

pub const TEMPLATE_FILES: &[TemplateFile] = &[
    TemplateFile {
        path: ".gitignore",
        contents: include_str!("../templates/extension/gitignore"),
    },
    TemplateFile {
        path: "package.json",
        contents: include_str!("../templates/extension/package.json"),
    },
    TemplateFile {
        path: "tsconfig.json",
        contents: include_str!("../templates/extension/tsconfig.json"),
    },
    TemplateFile {
        path: "src/extension.ts",
        contents: include_str!("../templates/extension/src/extension.ts"),
    },
    TemplateFile {
        path: "src/test/extension.test.ts",
        contents: include_str!("../templates/extension/src/test/extension.test.ts"),
    },
    TemplateFile {
        path: ".vscode/launch.json",
        contents: include_str!("../templates/extension/.vscode/launch.json"),
    },
    TemplateFile {
        path: ".vscode/extensions.json",
        contents: include_str!("../templates/extension/.vscode/extensions.json"),
    },
    TemplateFile {
        path: "README.md",
        contents: include_str!("../templates/extension/README.md"),
    },
];

/// An external command run inside the scaffold directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BuildStep {
    pub program: &'static str,
    pub args: &'static [&'static str],
}

impl BuildStep {
    /// Program name as it must be spawned on this platform. npm and npx are
    /// batch shims on Windows.
    pub fn executable(&self) -> String {
        if cfg!(windows) {
            format!("{}.cmd", self.program)
        } else {
            self.program.to_string()
        }
    }

    pub fn display(&self) -> String {
        std::iter::once(self.program)
            .chain(self.args.iter().copied())
            .collect::<Vec<_>>()
            .join(" ")
    }
}

pub const INSTALL_STEP: BuildStep = BuildStep {
    program: "npm",
    args: &["install"],
};

pub const PACKAGE_STEPS: &[BuildStep] = &[
    BuildStep {
        program: "npm",
        args: &["run", "compile"],
    },
    BuildStep {
        program: "npx",
        args: &["@vscode/vsce", "package"],
    },
];

/// Runs build steps. The production runner spawns real processes; tests
/// substitute a recorder.
pub trait CommandRunner {
    fn run(
        &self,
        step: &BuildStep,
        dir: &Path,
    ) -> impl Future<Output = std::io::Result<Output>> + Send;
}

/// Spawns each step with `tokio::process`, capturing stdout and stderr.
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessRunner;

impl CommandRunner for ProcessRunner {
    fn run(
        &self,
        step: &BuildStep,
        dir: &Path,
    ) -> impl Future<Output = std::io::Result<Output>> + Send {
        let mut command = Command::new(step.executable());
        command.args(step.args).current_dir(dir);
        async move { command.output().await }
    }
}

pub struct ScaffoldConfig {
    pub target_dir: PathBuf,
    /// Stop after writing the templates.
    pub skip_build: bool,
}

/// Outcome of one build step.
#[derive(Debug)]
pub struct StepOutcome {
    pub command: String,
    pub error: Option<AppError>,
}

impl StepOutcome {
    pub fn succeeded(&self) -> bool {
        self.error.is_none()
    }
}

#[derive(Debug, Default)]
pub struct ScaffoldReport {
    pub files_written: Vec<PathBuf>,
    pub steps: Vec<StepOutcome>,
}

/// Runs Clean, Emit, Install and Package against `config.target_dir`.
pub async fn run_scaffold<R: CommandRunner>(
    config: &ScaffoldConfig,
    runner: &R,
) -> Result<ScaffoldReport> {
    let target = &config.target_dir;
    let mut report = ScaffoldReport::default();

    clean(target).await?;
    report.files_written = emit(target).await?;

    if config.skip_build {
        info!("Skipping install and package steps");
        return Ok(report);
    }

    for step in std::iter::once(&INSTALL_STEP).chain(PACKAGE_STEPS) {
        let outcome = run_step(runner, step, target).await;
        report.steps.push(outcome);
    }

    let failed = report.steps.iter().filter(|s| !s.succeeded()).count();
    info!(
        "Scaffold complete: {} files, {} of {} build steps failed",
        report.files_written.len(),
        failed,
        report.steps.len()
    );

    Ok(report)
}

async fn clean(target: &Path) -> Result<()> {
    let exists = fs::try_exists(target)
        .await
        .with_context(|| format!("Failed to check {}", target.display()))?;
    if exists {
        info!("Removing previous output: {}", target.display());
        fs::remove_dir_all(target)
            .await
            .with_context(|| format!("Failed to remove {}", target.display()))?;
    }
    Ok(())
}

async fn emit(target: &Path) -> Result<Vec<PathBuf>> {
    let mut written = Vec::with_capacity(TEMPLATE_FILES.len());

    for template in TEMPLATE_FILES {
        let path = target.join(template.path);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)
                .await
                .with_context(|| format!("Failed to create directory {}", parent.display()))?;
        }
        fs::write(&path, template.contents)
            .await
            .with_context(|| format!("Failed to write {}", path.display()))?;
        debug!("Wrote {}", path.display());
        written.push(path);
    }

    info!("Wrote {} template files to {}", written.len(), target.display());
    Ok(written)
}

async fn run_step<R: CommandRunner>(runner: &R, step: &BuildStep, dir: &Path) -> StepOutcome {
    let command = step.display();
    info!("Running `{command}` in {}", dir.display());

    let error = match runner.run(step, dir).await {
        Ok(output) => {
            print!("{}", String::from_utf8_lossy(&output.stdout));
            eprint!("{}", String::from_utf8_lossy(&output.stderr));
            if output.status.success() {
                None
            } else {
                let status = match output.status.code() {
                    Some(code) => format!("exit code {code}"),
                    None => "terminated by signal".to_string(),
                };
                Some(AppError::ExternalCommand {
                    command: command.clone(),
                    status,
                })
            }
        }
        Err(err) => Some(AppError::ExternalCommand {
            command: command.clone(),
            status: format!("could not start: {err}"),
        }),
    };

    if let Some(err) = &error {
        warn!("{err}; continuing");
    }

    StepOutcome { command, error }
}
