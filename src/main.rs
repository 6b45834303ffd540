//! devcontainer-tools CLI
//!
//! Entry point for the `dev` command-line tool.

use clap::{Args, Parser, Subcommand};
use devcontainer_tools::config::{
    create_common_config_template, default_common_config_path, find_devcontainer_json,
    get_workspace_folder, parse_env_pairs, save_json_file, CliOverrides, ConfigOrigin,
    EffectiveConfig,
};
use devcontainer_tools::container::{
    get_container_id, get_container_info, short_id, stop_workspace_containers,
    STATUS_MOUNTS_SHOWN,
};
use devcontainer_tools::devcontainer::{run_exec, run_up, DevcontainerError, UpOptions};
use devcontainer_tools::logging::{self, LogConfig};
use devcontainer_tools::output::{ConsoleSink, OutputSink};
use devcontainer_tools::paths::{display_relative, normalize_lexically};
use devcontainer_tools::runtime::{Runtime, SystemRunner, ToolPaths};
use devcontainer_tools::signal::{report_interrupt, SignalHandler, SignalState};
use std::env;
use std::path::{Path, PathBuf};
use std::process;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "dev")]
#[command(about = "Simplified devcontainer management with config merging", version)]
struct Cli {
    #[command(flatten)]
    global: GlobalArgs,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct GlobalArgs {
    /// Container runtime executable
    #[arg(long, global = true, env = "DEVCONTAINER_TOOLS_DOCKER", default_value = "docker")]
    docker_path: String,

    /// devcontainer CLI executable
    #[arg(
        long,
        global = true,
        env = "DEVCONTAINER_TOOLS_DEVCONTAINER",
        default_value = "devcontainer"
    )]
    devcontainer_path: String,

    /// Common config file (default: ~/.config/devcontainer.common.json)
    #[arg(long, global = true, env = "DEVCONTAINER_COMMON_CONFIG")]
    common_config: Option<PathBuf>,

    /// Log every external command with its exit code and output
    #[arg(long, short = 'v', global = true)]
    verbose: bool,
}

/// Options shared by `up` and `rebuild`
#[derive(Args, Debug, Clone)]
struct ConfigArgs {
    /// Enable GPU support
    #[arg(long)]
    gpu: bool,

    /// Additional mount (source:target or a full mount string)
    #[arg(long)]
    mount: Vec<String>,

    /// Additional environment variable (NAME=VALUE)
    #[arg(long)]
    env: Vec<String>,

    /// Additional port (PORT or HOST:CONTAINER)
    #[arg(long, short = 'p')]
    port: Vec<String>,

    /// Workspace folder (default: current directory)
    #[arg(long)]
    workspace: Option<PathBuf>,

    /// Print the merged configuration before starting
    #[arg(long)]
    debug: bool,

    /// Merge and print the configuration without starting anything
    #[arg(long)]
    dry_run: bool,

    /// Copy forwardPorts into appPort
    #[arg(long)]
    auto_forward_ports: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Start or create the devcontainer with merged configuration
    Up {
        #[command(flatten)]
        config: ConfigArgs,

        /// Remove the existing container first
        #[arg(long)]
        clean: bool,

        /// Build without cache
        #[arg(long)]
        no_cache: bool,

        /// Rebuild from scratch (implies --clean and --no-cache)
        #[arg(long)]
        rebuild: bool,
    },

    /// Run a command in the running container
    Exec {
        /// Workspace folder (default: current directory)
        #[arg(long)]
        workspace: Option<PathBuf>,

        /// Additional port (PORT or HOST:CONTAINER)
        #[arg(long, short = 'p')]
        port: Vec<String>,

        /// Command to run
        #[arg(trailing_var_arg = true, allow_hyphen_values = true, required = true)]
        command: Vec<String>,
    },

    /// Show container status and configuration
    Status {
        /// Workspace folder (default: current directory)
        #[arg(long)]
        workspace: Option<PathBuf>,
    },

    /// Stop and remove the devcontainer
    Down {
        /// Workspace folder (default: current directory)
        #[arg(long)]
        workspace: Option<PathBuf>,

        /// Also remove associated volumes
        #[arg(long)]
        volumes: bool,
    },

    /// Create the common config template
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// Rebuild the container from scratch (deprecated: use `up --rebuild`)
    Rebuild {
        #[command(flatten)]
        config: ConfigArgs,
    },
}

fn main() {
    let cli = Cli::parse();
    logging::init(&LogConfig::for_verbosity(cli.global.verbose));

    let tools = ToolPaths {
        docker: cli.global.docker_path.clone(),
        devcontainer: cli.global.devcontainer_path.clone(),
    };
    let runner = SystemRunner::new().with_verbose(cli.global.verbose);
    let output = ConsoleSink;
    let rt = Runtime::new(&runner, &tools, &output);
    let common_config = cli.global.common_config.clone().or_else(default_common_config_path);

    let code = match cli.command {
        Commands::Up {
            config,
            clean,
            no_cache,
            rebuild,
        } => {
            let options = if rebuild {
                UpOptions::rebuild(config.gpu)
            } else {
                UpOptions {
                    remove_existing: clean,
                    build_no_cache: no_cache,
                    gpu: config.gpu,
                }
            };
            run_up_command(&rt, common_config.as_deref(), &config, &options)
        }
        Commands::Exec {
            workspace,
            port,
            command,
        } => run_exec_command(&rt, common_config.as_deref(), workspace, &port, &command),
        Commands::Status { workspace } => run_status(&rt, workspace),
        Commands::Down { workspace, volumes } => run_down(&rt, workspace, volumes),
        Commands::Init { force } => run_init(&output, common_config.as_deref(), force),
        Commands::Rebuild { config } => {
            output.warn("'dev rebuild' is deprecated, use 'dev up --rebuild' instead");
            output.info("Rebuilding container...");
            let options = UpOptions::rebuild(config.gpu);
            run_up_command(&rt, common_config.as_deref(), &config, &options)
        }
    };

    process::exit(code);
}

/// Absolute workspace path; symlinks are kept so the directory name matches
/// what the user typed
fn resolve_workspace(arg: Option<PathBuf>) -> Result<PathBuf, String> {
    let cwd = env::current_dir().map_err(|e| format!("Cannot read current directory: {}", e))?;
    let workspace = match arg {
        Some(path) => normalize_lexically(&cwd.join(path)),
        None => cwd,
    };

    if !workspace.exists() {
        return Err(format!("Workspace not found: {}", workspace.display()));
    }
    Ok(workspace)
}

fn workspace_or_exit(output: &dyn OutputSink, arg: Option<PathBuf>) -> Result<PathBuf, i32> {
    resolve_workspace(arg).map_err(|e| {
        output.error(&e);
        1
    })
}

/// The child owns the terminal; keep the wrapper alive on Ctrl-C
fn shield_interrupts() -> Arc<SignalState> {
    let handler = SignalHandler::new();
    if let Err(e) = handler.install() {
        tracing::debug!(error = %e, "could not install interrupt handler");
    }
    handler.state()
}

fn run_up_command(
    rt: &Runtime<'_>,
    common_config: Option<&Path>,
    args: &ConfigArgs,
    options: &UpOptions,
) -> i32 {
    let output = rt.output;
    output.info("Starting devcontainer...");

    let workspace = match workspace_or_exit(output, args.workspace.clone()) {
        Ok(path) => path,
        Err(code) => return code,
    };

    let Some(project_config) = find_devcontainer_json(&workspace) else {
        output.error("devcontainer.json not found");
        output.info(
            "The workspace needs one of:\n  • .devcontainer/devcontainer.json\n  • devcontainer.json",
        );
        return 1;
    };

    let overrides = CliOverrides {
        mounts: args.mount.clone(),
        env: parse_env_pairs(&args.env, output),
        ports: args.port.clone(),
        auto_forward_ports: args.auto_forward_ports,
    };
    let effective = EffectiveConfig::build(common_config, Some(&project_config), &overrides, output);

    let pretty = match effective.to_json_pretty() {
        Ok(json) => json,
        Err(e) => {
            output.error(&format!("Error serializing merged config: {}", e));
            return 1;
        }
    };

    if args.dry_run {
        print_dry_run(output, &workspace, &effective, args, &pretty);
        return 0;
    }

    if args.debug {
        output.info("Merged configuration:");
        output.info(&pretty);
    }

    let interrupts = shield_interrupts();
    let result = run_up(rt, &workspace, &effective.config, options);
    report_interrupt(&interrupts);
    match result {
        Ok(code) => code,
        Err(e) => {
            output.error(&e.to_string());
            1
        }
    }
}

fn print_dry_run(
    output: &dyn OutputSink,
    workspace: &Path,
    effective: &EffectiveConfig,
    args: &ConfigArgs,
    pretty: &str,
) {
    output.info("Dry run: merging configuration only, no container is started");
    output.info("Config sources:");

    let has_common = effective
        .sources
        .iter()
        .any(|s| s.origin == ConfigOrigin::Common);
    if !has_common {
        output.info("  common:  not found");
    }

    for source in &effective.sources {
        match (&source.path, &source.digest) {
            (Some(path), digest) => {
                let shown = match source.origin {
                    ConfigOrigin::Project => display_relative(Path::new(path), workspace),
                    _ => path.clone(),
                };
                let digest = digest.as_deref().unwrap_or("unreadable");
                output.info(&format!(
                    "  {:<8} {} (sha256: {})",
                    format!("{}:", source.origin.as_str()),
                    shown,
                    digest
                ));
            }
            (None, _) => {
                output.info(&format!("  {}:", source.origin.as_str()));
                if !args.mount.is_empty() {
                    output.info(&format!("    mounts: {:?}", args.mount));
                }
                if !args.env.is_empty() {
                    output.info(&format!("    env:    {:?}", args.env));
                }
                if !args.port.is_empty() {
                    output.info(&format!("    ports:  {:?}", args.port));
                }
                if args.auto_forward_ports {
                    output.info("    forwardPorts copied into appPort");
                }
            }
        }
    }

    output.info("Merged devcontainer.json:");
    output.info(pretty);
    output.success("Configuration check complete. Nothing was started.");
}

fn run_exec_command(
    rt: &Runtime<'_>,
    common_config: Option<&Path>,
    workspace: Option<PathBuf>,
    ports: &[String],
    command: &[String],
) -> i32 {
    let output = rt.output;
    let workspace = match workspace_or_exit(output, workspace) {
        Ok(path) => path,
        Err(code) => return code,
    };

    let interrupts = shield_interrupts();
    let result = run_exec(rt, &workspace, common_config, ports, command);
    report_interrupt(&interrupts);
    match result {
        Ok(code) => code,
        Err(DevcontainerError::NotRunning) => {
            output.error("Container is not running.");
            output.info("Run 'dev up' first.");
            1
        }
        Err(e) => {
            output.error(&e.to_string());
            1
        }
    }
}

fn run_status(rt: &Runtime<'_>, workspace: Option<PathBuf>) -> i32 {
    let output = rt.output;
    let workspace = match workspace_or_exit(output, workspace) {
        Ok(path) => path,
        Err(code) => return code,
    };

    let row = |label: &str, value: &str| output.info(&format!("{:<18}{}", label, value));

    output.info("DevContainer Status");
    output.info("");
    row("Workspace", &workspace.display().to_string());

    match get_container_id(rt, &workspace) {
        Some(container_id) => {
            row("Status", "✓ Running");
            row("Container ID", short_id(&container_id));

            if let Some(info) = get_container_info(rt, &container_id) {
                row("Image", info.image().unwrap_or("Unknown"));
                if let Some(created) = info.created_local() {
                    row("Created", &created);
                }

                let mounts = info.mounts();
                for (i, mount) in mounts.iter().take(STATUS_MOUNTS_SHOWN).enumerate() {
                    let label = if i == 0 { "Mounts" } else { "" };
                    row(label, &format!("• {}", mount.describe()));
                }
                if mounts.len() > STATUS_MOUNTS_SHOWN {
                    row(
                        "",
                        &format!("• ... and {} more", mounts.len() - STATUS_MOUNTS_SHOWN),
                    );
                }
            }
        }
        None => row("Status", "✗ Not running"),
    }

    match find_devcontainer_json(&workspace) {
        Some(config_path) => {
            row("Config", &display_relative(&config_path, &workspace));
            match get_workspace_folder(&workspace, output) {
                Ok(folder) => row("Workspace folder", &folder),
                Err(e) => output.warn(&e.to_string()),
            }
        }
        None => row("Config", "devcontainer not configured"),
    }

    0
}

fn run_down(rt: &Runtime<'_>, workspace: Option<PathBuf>, volumes: bool) -> i32 {
    let output = rt.output;
    let workspace = match workspace_or_exit(output, workspace) {
        Ok(path) => path,
        Err(code) => return code,
    };

    output.info("Stopping devcontainer...");
    if stop_workspace_containers(rt, &workspace, volumes) {
        0
    } else {
        1
    }
}

fn run_init(output: &dyn OutputSink, common_config: Option<&Path>, force: bool) -> i32 {
    let Some(path) = common_config else {
        output.error("Cannot determine the home directory; pass --common-config");
        return 1;
    };

    if path.exists() && !force {
        output.warn(&format!(
            "File {} already exists (use --force to overwrite)",
            path.display()
        ));
        return 1;
    }

    let template = create_common_config_template();
    if save_json_file(&template, path, output) {
        output.success(&format!("Created {}", path.display()));
        0
    } else {
        output.error(&format!("Failed to create {}", path.display()));
        1
    }
}
