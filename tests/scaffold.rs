#![cfg(feature = "scaffold")]

use ctx2md::scaffold::{BuildStep, CommandRunner, ScaffoldConfig, TEMPLATE_FILES, run_scaffold};
use std::collections::BTreeMap;
use std::future::Future;
use std::io;
use std::path::{Path, PathBuf};
use std::process::{ExitStatus, Output};
use std::sync::Mutex;
use tempfile::tempdir;

#[cfg(unix)]
fn exit_status(code: i32) -> ExitStatus {
    use std::os::unix::process::ExitStatusExt;
    ExitStatus::from_raw(code << 8)
}

#[cfg(windows)]
fn exit_status(code: i32) -> ExitStatus {
    use std::os::windows::process::ExitStatusExt;
    ExitStatus::from_raw(code as u32)
}

/// Records each step and answers with a scripted exit code. Steps whose
/// program is listed in `missing` fail to spawn.
#[derive(Default)]
struct RecordingRunner {
    calls: Mutex<Vec<(String, PathBuf)>>,
    exit_codes: BTreeMap<String, i32>,
    missing: Vec<&'static str>,
}

impl CommandRunner for RecordingRunner {
    fn run(
        &self,
        step: &BuildStep,
        dir: &Path,
    ) -> impl Future<Output = io::Result<Output>> + Send {
        self.calls
            .lock()
            .unwrap()
            .push((step.display(), dir.to_path_buf()));

        let result = if self.missing.contains(&step.program) {
            Err(io::Error::new(io::ErrorKind::NotFound, "program not found"))
        } else {
            let code = self.exit_codes.get(&step.display()).copied().unwrap_or(0);
            Ok(Output {
                status: exit_status(code),
                stdout: format!("ran {}\n", step.display()).into_bytes(),
                stderr: Vec::new(),
            })
        };
        async move { result }
    }
}

fn read_tree(root: &Path) -> BTreeMap<String, String> {
    TEMPLATE_FILES
        .iter()
        .map(|t| {
            let content = std::fs::read_to_string(root.join(t.path)).unwrap();
            (t.path.to_string(), content)
        })
        .collect()
}

#[tokio::test]
async fn it_runs_steps_in_order_inside_target() -> anyhow::Result<()> {
    let temp_dir = tempdir()?;
    let target = temp_dir.path().join("ext");
    let runner = RecordingRunner::default();

    let config = ScaffoldConfig {
        target_dir: target.clone(),
        skip_build: false,
    };
    let report = run_scaffold(&config, &runner).await?;

    assert_eq!(report.files_written.len(), TEMPLATE_FILES.len());
    let calls = runner.calls.lock().unwrap();
    let commands: Vec<_> = calls.iter().map(|(c, _)| c.as_str()).collect();
    assert_eq!(
        commands,
        vec!["npm install", "npm run compile", "npx @vscode/vsce package"]
    );
    assert!(calls.iter().all(|(_, dir)| dir == &target));
    assert!(report.steps.iter().all(|s| s.succeeded()));

    Ok(())
}

#[tokio::test]
async fn it_continues_after_failed_steps() -> anyhow::Result<()> {
    let temp_dir = tempdir()?;
    let runner = RecordingRunner {
        exit_codes: BTreeMap::from([("npm install".to_string(), 1)]),
        missing: vec!["npx"],
        ..Default::default()
    };

    let config = ScaffoldConfig {
        target_dir: temp_dir.path().join("ext"),
        skip_build: false,
    };
    let report = run_scaffold(&config, &runner).await?;

    assert_eq!(runner.calls.lock().unwrap().len(), 3);
    let failed: Vec<_> = report
        .steps
        .iter()
        .filter(|s| !s.succeeded())
        .map(|s| s.error.as_ref().unwrap().to_string())
        .collect();
    assert_eq!(failed.len(), 2);
    assert!(failed[0].contains("exit code 1"));
    assert!(failed[1].contains("could not start"));

    Ok(())
}

#[tokio::test]
async fn it_is_idempotent_and_removes_residue() -> anyhow::Result<()> {
    let temp_dir = tempdir()?;
    let target = temp_dir.path().join("ext");
    let runner = RecordingRunner::default();
    let config = ScaffoldConfig {
        target_dir: target.clone(),
        skip_build: true,
    };

    run_scaffold(&config, &runner).await?;
    let first = read_tree(&target);

    std::fs::write(target.join("stale.txt"), "left over")?;
    std::fs::write(target.join("package.json"), "{}")?;

    run_scaffold(&config, &runner).await?;
    let second = read_tree(&target);

    assert_eq!(first, second);
    assert!(!target.join("stale.txt").exists());
    assert!(runner.calls.lock().unwrap().is_empty());

    Ok(())
}

#[tokio::test]
async fn it_writes_templates_verbatim() -> anyhow::Result<()> {
    let temp_dir = tempdir()?;
    let target = temp_dir.path().join("ext");
    let config = ScaffoldConfig {
        target_dir: target.clone(),
        skip_build: true,
    };

    run_scaffold(&config, &RecordingRunner::default()).await?;

    for template in TEMPLATE_FILES {
        let written = std::fs::read_to_string(target.join(template.path))?;
        assert_eq!(written, template.contents, "{}", template.path);
    }

    Ok(())
}

#[cfg(unix)]
#[tokio::test]
async fn it_fails_when_target_cannot_be_checked() -> anyhow::Result<()> {
    let temp_dir = tempdir()?;
    let blocker = temp_dir.path().join("not-a-dir");
    std::fs::write(&blocker, "file")?;
    let runner = RecordingRunner::default();

    let config = ScaffoldConfig {
        target_dir: blocker.join("ext"),
        skip_build: false,
    };
    let err = run_scaffold(&config, &runner).await.unwrap_err();

    assert!(err.to_string().contains("Failed to check"));
    assert!(runner.calls.lock().unwrap().is_empty());

    Ok(())
}
