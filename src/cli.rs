use anyhow::Result;
use chrono::Utc;
use clap::{Arg, ArgAction, ArgMatches, Command};
use std::ffi::OsString;
use std::path::{Path, PathBuf};

#[cfg(feature = "scaffold")]
use crate::scaffold::{DEFAULT_TARGET_DIR, ScaffoldConfig};

/// Where the finished document goes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutputTarget {
    File(PathBuf),
    Stdout,
}

#[derive(Debug, Clone)]
pub struct ExportConfig {
    pub project_root: PathBuf,
    pub output: OutputTarget,
    /// Files to treat as open editor tabs.
    pub open_paths: Vec<PathBuf>,
    /// JSON dump of the editor's tab groups.
    pub buffers_manifest: Option<PathBuf>,
}

pub enum Task {
    Export(ExportConfig),
    #[cfg(feature = "scaffold")]
    Scaffold(ScaffoldConfig),
}

pub struct Config {
    pub verbosity: u8,
    pub task: Task,
}

pub fn build_cli() -> Command {
    let verbose = Arg::new("verbose")
        .short('v')
        .long("verbose")
        .action(ArgAction::Count)
        .global(true)
        .help("Increase log output (-v info, -vv debug, -vvv trace)");

    let export = Command::new("export")
        .about("Collect tracked files, .sln/.csproj files and open buffers into one .md file")
        .arg(
            Arg::new("root")
                .value_name("ROOT")
                .help("Workspace root (defaults to the current directory)")
                .num_args(1),
        )
        .arg(
            Arg::new("output")
                .short('o')
                .long("output")
                .value_name("FILE")
                .help("Sets the output .md file path")
                .num_args(1)
                .conflicts_with("stdout"),
        )
        .arg(
            Arg::new("stdout")
                .long("stdout")
                .action(ArgAction::SetTrue)
                .help("Print the document instead of writing a file"),
        )
        .arg(
            Arg::new("open")
                .long("open")
                .value_name("PATH")
                .help("File to include as an open editor buffer (repeatable)")
                .action(ArgAction::Append),
        )
        .arg(
            Arg::new("buffers")
                .short('b')
                .long("buffers")
                .value_name("FILE")
                .help("JSON manifest of the editor's open tab groups")
                .num_args(1),
        );

    let cmd = Command::new("ctx2md")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Bundles a repository's context into a single Markdown document")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(verbose)
        .subcommand(export);

    #[cfg(feature = "scaffold")]
    let cmd = cmd.subcommand(
        Command::new("scaffold")
            .about("Generate and package the editor extension")
            .arg(
                Arg::new("dir")
                    .value_name("DIR")
                    .help("Target directory, replaced if it exists")
                    .num_args(1),
            )
            .arg(
                Arg::new("skip-build")
                    .long("skip-build")
                    .action(ArgAction::SetTrue)
                    .help("Only write the files; skip npm install and packaging"),
            ),
    );

    cmd
}

/// Parses the process arguments, exiting with clap's usage output on error.
pub fn parse_args() -> Result<Config> {
    config_from_matches(&build_cli().get_matches())
}

pub fn parse_from<I, T>(args: I) -> Result<Config>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    config_from_matches(&build_cli().try_get_matches_from(args)?)
}

fn config_from_matches(matches: &ArgMatches) -> Result<Config> {
    let cwd = std::env::current_dir()?;
    let verbosity = matches.get_count("verbose");

    let task = match matches.subcommand() {
        Some(("export", sub)) => Task::Export(export_config(sub, &cwd)),
        #[cfg(feature = "scaffold")]
        Some(("scaffold", sub)) => Task::Scaffold(ScaffoldConfig {
            target_dir: cwd.join(
                sub.get_one::<String>("dir")
                    .map(String::as_str)
                    .unwrap_or(DEFAULT_TARGET_DIR),
            ),
            skip_build: sub.get_flag("skip-build"),
        }),
        _ => anyhow::bail!("no subcommand given"),
    };

    Ok(Config { verbosity, task })
}

fn export_config(matches: &ArgMatches, cwd: &Path) -> ExportConfig {
    let project_root = matches
        .get_one::<String>("root")
        .map(|r| cwd.join(r))
        .unwrap_or_else(|| cwd.to_path_buf());

    let output = if matches.get_flag("stdout") {
        OutputTarget::Stdout
    } else {
        let path = matches
            .get_one::<String>("output")
            .map(|o| cwd.join(o))
            .unwrap_or_else(|| project_root.join(default_filename(&project_root)));
        OutputTarget::File(path)
    };

    let open_paths = matches
        .get_many::<String>("open")
        .map(|vals| vals.map(|p| cwd.join(p)).collect())
        .unwrap_or_default();

    let buffers_manifest = matches.get_one::<String>("buffers").map(|b| cwd.join(b));

    ExportConfig {
        project_root,
        output,
        open_paths,
        buffers_manifest,
    }
}

/// `{project}_context_{epoch}.md`
fn default_filename(project_root: &Path) -> String {
    let folder_name = project_root
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("project");

    let timestamp = Utc::now().timestamp();
    format!("{folder_name}_context_{timestamp}.md")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn export(args: &[&str]) -> ExportConfig {
        let config = parse_from(std::iter::once("ctx2md").chain(args.iter().copied())).unwrap();
        match config.task {
            Task::Export(export) => export,
            #[allow(unreachable_patterns)]
            _ => panic!("expected export task"),
        }
    }

    #[test]
    fn test_export_defaults() {
        let cwd = std::env::current_dir().unwrap();
        let cfg = export(&["export"]);
        assert_eq!(cfg.project_root, cwd);
        assert!(cfg.open_paths.is_empty());
        assert!(cfg.buffers_manifest.is_none());
        match cfg.output {
            OutputTarget::File(path) => {
                let name = path.file_name().unwrap().to_str().unwrap();
                assert!(name.contains("_context_"));
                assert!(name.ends_with(".md"));
                assert_eq!(path.parent().unwrap(), cwd);
            }
            OutputTarget::Stdout => panic!("expected file output"),
        }
    }

    #[test]
    fn test_export_flags() {
        let cfg = export(&[
            "export", "repo", "--stdout", "--open", "a.cs", "--open", "b.cs", "-b", "tabs.json",
        ]);
        let cwd = std::env::current_dir().unwrap();
        assert_eq!(cfg.project_root, cwd.join("repo"));
        assert_eq!(cfg.output, OutputTarget::Stdout);
        assert_eq!(cfg.open_paths, vec![cwd.join("a.cs"), cwd.join("b.cs")]);
        assert_eq!(cfg.buffers_manifest, Some(cwd.join("tabs.json")));
    }

    #[test]
    fn test_verbosity_counts() {
        let config = parse_from(["ctx2md", "-vv", "export"]).unwrap();
        assert_eq!(config.verbosity, 2);
        let config = parse_from(["ctx2md", "export", "-v"]).unwrap();
        assert_eq!(config.verbosity, 1);
    }

    #[test]
    fn test_output_conflicts_with_stdout() {
        assert!(parse_from(["ctx2md", "export", "-o", "x.md", "--stdout"]).is_err());
    }

    #[test]
    fn test_subcommand_required() {
        assert!(parse_from(["ctx2md"]).is_err());
    }

    #[cfg(feature = "scaffold")]
    #[test]
    fn test_scaffold_defaults() {
        let config = parse_from(["ctx2md", "scaffold"]).unwrap();
        match config.task {
            Task::Scaffold(cfg) => {
                assert!(cfg.target_dir.ends_with(DEFAULT_TARGET_DIR));
                assert!(!cfg.skip_build);
            }
            _ => panic!("expected scaffold task"),
        }
    }
}
