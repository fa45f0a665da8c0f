//! Autojudge CLI
//!
//! A command-line tool for grading assignment tasks against local test data.

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use autojudge::{
    Config, Discovery, EXAMPLE_CONFIG, Judge, ScratchDir, Task, discover_tasks,
    latest_assignment_dir, report,
};
use clap::{Parser, Subcommand};
use tracing::{Level, debug, info, warn};
use tracing_subscriber::EnvFilter;

/// Config file looked up in the assignment root when `--config` is not given
const ROOT_CONFIG_FILE: &str = "autojudge.toml";

#[derive(Parser)]
#[command(name = "autojudge")]
#[command(about = "A tool for grading assignment tasks against their test data")]
#[command(version)]
struct Cli {
    /// Path to configuration file
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    /// Assignment directory (default: latest assignment under the current directory)
    #[arg(short, long, global = true)]
    root: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize a new configuration file
    Init {
        /// Output path (default: autojudge.toml)
        #[arg(short, long, default_value = ROOT_CONFIG_FILE)]
        output: PathBuf,

        /// Overwrite existing file
        #[arg(short, long)]
        force: bool,
    },

    /// List the tasks found in the assignment
    Tasks,

    /// Grade one task or every task
    Check {
        /// Task index or folder name (e.g. 2 or 2_sum)
        #[arg(value_name = "TASK", required_unless_present = "all")]
        task: Option<String>,

        /// Grade every task
        #[arg(short, long, conflicts_with = "task")]
        all: bool,

        /// Show input and outputs of every failed test point
        #[arg(short, long)]
        details: bool,
    },

    /// Run one test point and show its input and outputs
    Inspect {
        /// Task index or folder name
        #[arg(value_name = "TASK")]
        task: String,

        /// Test point number (1-based)
        #[arg(value_name = "POINT")]
        point: u32,
    },

    /// Show effective configuration
    ShowConfig,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::from_default_env().add_directive(Level::DEBUG.into())
    } else {
        EnvFilter::from_default_env().add_directive(Level::INFO.into())
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();

    if let Commands::Init { output, force } = &cli.command {
        return init_config(output, *force).await;
    }

    let root = resolve_root(cli.root.as_deref())?;
    let config = load_config(cli.config.as_deref(), &root)?;

    if let Commands::ShowConfig = cli.command {
        show_config(&config, &root);
        return Ok(());
    }

    // Executables live only as long as this invocation
    let build = ScratchDir::create(config.scratch_dir.as_deref())
        .context("failed to create build directory")?;
    let discovery =
        discover_tasks(&root, &config, build.path()).context("failed to discover tasks")?;
    let judge = Judge::new(config);

    let outcome = match cli.command {
        Commands::Tasks => {
            list_tasks(&discovery);
            Ok(true)
        }
        Commands::Check { task, details, .. } => {
            run_check(&judge, &discovery, task.as_deref(), details).await
        }
        Commands::Inspect { task, point } => run_inspect(&judge, &discovery, &task, point).await,
        Commands::Init { .. } | Commands::ShowConfig => Ok(true),
    };

    if let Err(e) = build.cleanup() {
        warn!(error = %e, "failed to remove build directory");
    }

    if !outcome? {
        std::process::exit(1);
    }
    Ok(())
}

fn resolve_root(root: Option<&Path>) -> Result<PathBuf> {
    if let Some(root) = root {
        return Ok(root.to_path_buf());
    }

    let cwd = std::env::current_dir().context("failed to read current directory")?;
    match latest_assignment_dir(&cwd) {
        Ok(latest) => {
            info!(root = %latest.display(), "using latest assignment");
            Ok(latest)
        }
        Err(e) => {
            debug!(error = %e, "grading the current directory");
            Ok(cwd)
        }
    }
}

fn load_config(path: Option<&Path>, root: &Path) -> Result<Config> {
    if let Some(path) = path {
        info!(?path, "loading configuration");
        return Config::from_file(path).context("failed to load configuration");
    }

    let in_root = root.join(ROOT_CONFIG_FILE);
    if in_root.is_file() {
        info!(path = ?in_root, "loading configuration");
        return Config::from_file(&in_root).context("failed to load configuration");
    }

    debug!("using default configuration");
    Ok(Config::default())
}

fn find_task<'a>(discovery: &'a Discovery, key: &str) -> Result<&'a Task> {
    if let Some(task) = discovery.find(key) {
        return Ok(task);
    }
    if let Some(rejected) = discovery
        .rejected
        .iter()
        .find(|r| r.folder.eq_ignore_ascii_case(key) || r.folder.split('_').next() == Some(key))
    {
        anyhow::bail!("task '{}' cannot be graded: {}", rejected.folder, rejected.error);
    }
    anyhow::bail!("no task '{key}' in this assignment")
}

async fn run_check(
    judge: &Judge,
    discovery: &Discovery,
    task: Option<&str>,
    details: bool,
) -> Result<bool> {
    let tasks = match task {
        Some(key) => vec![find_task(discovery, key)?.clone()],
        None => discovery.tasks.clone(),
    };

    let session = judge.run_session(&tasks).await.context("grading failed")?;

    for (task, result) in &session.tasks {
        println!("\nChecking task {} ({})...", task.index, task.folder);
        for line in report::summary_lines(result) {
            println!("{line}");
        }

        if result.all_passed() {
            println!("Task {} passed", task.index);
        } else {
            println!(
                "Task {} needs more work ({}/{})",
                task.index,
                result.score(),
                result.max_score()
            );
            if let Some(failure) = &result.compile_failure {
                println!("\n{failure}");
            } else if details {
                for (number, _) in result.failures() {
                    let run = judge
                        .inspect(task, number)
                        .await
                        .context("failed to inspect test point")?;
                    println!("\nTest point {number}:\n{}", report::render_detail(&run));
                }
            }
        }
        println!("{}", "=".repeat(50));
    }

    let mut ready = session.ready_to_submit();
    if task.is_none() {
        for rejected in &discovery.rejected {
            println!("Task {} cannot be graded: {}", rejected.folder, rejected.error);
            ready = false;
        }
    }

    if ready {
        println!("\nAll tasks passed, ready to submit!");
    } else {
        println!("\nKeep going, almost there!");
    }
    Ok(ready)
}

async fn run_inspect(
    judge: &Judge,
    discovery: &Discovery,
    key: &str,
    point: u32,
) -> Result<bool> {
    let task = find_task(discovery, key)?;
    let run = judge
        .inspect(task, point)
        .await
        .context("failed to run test point")?;

    println!("{}", report::render_detail(&run));
    Ok(run.verdict.is_pass())
}

fn list_tasks(discovery: &Discovery) {
    println!("Tasks:\n");
    for task in &discovery.tasks {
        println!(
            "  {:<4} {:<20} {} test points",
            task.index, task.folder, task.test_cases
        );
    }
    for rejected in &discovery.rejected {
        println!("  {:<4} {:<20} rejected: {}", "-", rejected.folder, rejected.error);
    }
}

fn show_config(config: &Config, root: &Path) {
    println!("Assignment root: {}", root.display());
    println!("Data directory: {}", config.data_dir.display());
    println!();
    println!("Compiler: {}", config.compiler.command.join(" "));
    println!("  Timeout: {:?}", config.compile_timeout());
    println!("Time limit: {:?}", config.time_limit());
    println!("Jobs: {}", config.jobs);
    println!();
    println!("Tasks configured: {}", config.tasks.len());
}

async fn init_config(output: &Path, force: bool) -> Result<()> {
    if output.exists() && !force {
        anyhow::bail!(
            "Configuration file already exists at '{}'. Use --force to overwrite.",
            output.display()
        );
    }

    tokio::fs::write(output, EXAMPLE_CONFIG)
        .await
        .context("failed to write configuration file")?;

    println!("Created configuration file at '{}'", output.display());
    Ok(())
}
