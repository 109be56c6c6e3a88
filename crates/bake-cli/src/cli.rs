//! CLI definition and command dispatch for bake.
//!
//! ## Configuration Precedence
//!
//! 1. CLI flags (`--config`, `--color`, `--verbose`)
//! 2. Environment variables (`BAKE_CONFIG`, `BAKE_COLOR`, `BAKE_VERBOSE`,
//!    and `VISUAL`/`EDITOR` for `bake edit`)
//! 3. Config file (`~/.local/lib/bake/config.yaml` or `--config`)
//! 4. Built-in defaults

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use clap::{Parser, Subcommand};

use bake_core::{
    BakeConfig, BakeError, BakePaths, CommandEditor, CommandEntry, Console, Outcome, Registry,
    Removal,
};

use crate::ui::color::terminal_width;
use crate::ui::format::{format_relative_time, tilde_path};
use crate::ui::table::{render_commands_table, CommandRow};
use crate::ui::{ColorMode, MessageType, Style, TerminalConsole};

// ============================================================================
// CLI Definition
// ============================================================================

/// Version string including git commit hash
const VERSION: &str = concat!(env!("CARGO_PKG_VERSION"), " (", env!("GIT_HASH"), ")");

/// bake – turn scripts into shell commands
#[derive(Parser, Debug)]
#[command(name = "bake")]
#[command(author, version = VERSION, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Enable verbose output (debug logging)
    #[arg(short, long, visible_alias = "debug", global = true, env = "BAKE_VERBOSE")]
    pub verbose: bool,

    /// Suppress informational messages
    #[arg(short, long, global = true, env = "BAKE_QUIET")]
    pub quiet: bool,

    /// Path to configuration file (default: ~/.local/lib/bake/config.yaml)
    #[arg(long, global = true, env = "BAKE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Color output mode: always, never, or auto (default: auto)
    #[arg(long, global = true, env = "BAKE_COLOR", value_name = "WHEN")]
    pub color: Option<String>,

    /// Overwrite or delete without asking for confirmation
    #[arg(short, long, global = true)]
    pub force: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Register a script as a shell command
    #[command(after_help = r#"EXAMPLES:
    # Make ./greet.py runnable as `greet`
    bake add greet ./greet.py

    # Point an existing command at a new script without asking
    bake add greet ~/scripts/greet2.py --force
"#)]
    Add {
        /// Name of the new command
        name: String,

        /// Script the command runs
        script_path: PathBuf,
    },

    /// Open a command's wrapper script in your editor
    #[command(after_help = r#"EXAMPLES:
    # Uses $VISUAL, $EDITOR, the config `editor`, then nano
    bake edit greet

    # One-off editor choice
    EDITOR="code --wait" bake edit greet
"#)]
    Edit {
        /// Command to edit
        name: String,
    },

    /// Remove a command (the target script is left alone)
    #[command(visible_alias = "rm", after_help = r#"EXAMPLES:
    bake delete greet
    bake rm greet
"#)]
    Delete {
        /// Command to remove
        name: String,
    },

    /// Rename a command, keeping its target script
    #[command(visible_alias = "mv", after_help = r#"EXAMPLES:
    bake rename greet hello

    # Replace an existing `hello` without asking
    bake mv greet hello --force
"#)]
    Rename {
        /// Current name
        old_name: String,

        /// New name
        new_name: String,
    },

    /// List registered commands
    #[command(visible_alias = "ls", after_help = r#"EXAMPLES:
    bake list

    # Machine-readable output
    bake list --json | jq '.[].name'
"#)]
    List {
        /// Output in JSON format
        #[arg(long)]
        json: bool,
    },

    /// Show details for one command
    #[command(after_help = r#"EXAMPLES:
    bake show greet
    bake show greet --json
"#)]
    Show {
        /// Command to inspect
        name: String,

        /// Output in JSON format
        #[arg(long)]
        json: bool,
    },

    /// Remove every registered command
    #[command(after_help = r#"EXAMPLES:
    # Asks for confirmation first
    bake purge

    # No prompt
    bake purge --force
"#)]
    Purge,

    /// Print the directories and files bake uses
    #[command(after_help = r#"EXAMPLES:
    bake paths
    bake paths --json
"#)]
    Paths {
        /// Output in JSON format
        #[arg(long)]
        json: bool,
    },
}

// ============================================================================
// Entry point
// ============================================================================

/// Parse arguments, run the selected command, and map the result to an exit code.
///
/// Cancelled prompts exit 0; any error exits 1.
pub fn run() -> ExitCode {
    let cli = Cli::parse();

    // Warnings (config problems, rollbacks) always; debug only with --verbose.
    let log_level = if cli.verbose { "debug" } else { "warn" };
    let filter = format!("bake_core={},bake_cli={}", log_level, log_level);

    tracing_subscriber::fmt()
        .with_env_filter(&filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let early_style = Style::new(ColorMode::resolve(cli.color.as_deref(), None));

    let paths = match BakePaths::from_env() {
        Ok(paths) => paths,
        Err(e) => {
            eprintln!(
                "{}",
                early_style.error_with_context(
                    "Failed to resolve bake directories",
                    Some(&e.to_string()),
                    Some("Make sure $HOME is set"),
                )
            );
            return ExitCode::FAILURE;
        }
    };

    // Priority: --config flag > BAKE_CONFIG env > ~/.local/lib/bake/config.yaml
    let config_path = cli
        .config
        .clone()
        .unwrap_or_else(|| paths.config_file().to_path_buf());
    let config = match BakeConfig::from_path(&config_path) {
        Ok(config) => config,
        Err(e) => {
            eprintln!(
                "{}",
                early_style.error_with_context(
                    "Failed to load configuration",
                    Some(&e.to_string()),
                    Some(&format!("Check your config at {}", config_path.display())),
                )
            );
            return ExitCode::FAILURE;
        }
    };

    let color_mode = ColorMode::resolve(cli.color.as_deref(), config.color.as_deref());
    let style = Style::new(color_mode);
    let console = TerminalConsole::new(style, cli.quiet);
    let registry = Registry::open(paths);
    let ctx = Context {
        style: &style,
        console: &console,
        registry: &registry,
        quiet: cli.quiet,
    };

    let result = match cli.command {
        Command::Add { name, script_path } => handle_add(&ctx, &name, &script_path, cli.force),
        Command::Edit { name } => handle_edit(&ctx, &name, &config),
        Command::Delete { name } => handle_delete(&ctx, &name),
        Command::Rename { old_name, new_name } => {
            handle_rename(&ctx, &old_name, &new_name, cli.force)
        }
        Command::List { json } => handle_list(&ctx, json),
        Command::Show { name, json } => handle_show(&ctx, &name, json),
        Command::Purge => handle_purge(&ctx, cli.force),
        Command::Paths { json } => handle_paths(&ctx, json),
    };

    match result {
        Ok(code) => code,
        Err(e) => {
            eprintln!("{}", render_error(&style, &e));
            ExitCode::FAILURE
        }
    }
}

/// Everything a handler needs.
struct Context<'a> {
    style: &'a Style,
    console: &'a TerminalConsole,
    registry: &'a Registry,
    quiet: bool,
}

impl Context<'_> {
    fn home(&self) -> &Path {
        self.registry.paths().home()
    }

    fn show_path(&self, path: &Path) -> String {
        tilde_path(path, self.home())
    }

    fn cancelled(&self, what: &str) {
        if !self.quiet {
            println!(
                "{}",
                self.style
                    .message(MessageType::Skip, &format!("Cancelled; {} left unchanged", what))
            );
        }
    }
}

/// Format an error with a hint where the fix is obvious.
fn render_error(style: &Style, err: &BakeError) -> String {
    let hint = match err {
        BakeError::NotFound(_) => Some("Run `bake list` to see registered commands".to_string()),
        BakeError::InvalidName { .. } => Some(
            "Names start with a letter and use letters, digits, '_' or '-'".to_string(),
        ),
        BakeError::ForeignBinEntry(path) => Some(format!(
            "Remove or rename {} yourself, or pick another name",
            path.display()
        )),
        BakeError::CorruptWrapper { name, .. } => Some(format!(
            "Fix it with `bake edit {name}` or re-create it with `bake add {name} <script> --force`"
        )),
        BakeError::EditorFailed { .. } => {
            Some("Set $VISUAL or $EDITOR, or `editor` in the config file".to_string())
        }
        _ => None,
    };

    let mut output = style.error_with_context(&err.to_string(), None, hint.as_deref());
    if let BakeError::PartialFailure {
        remaining, reason, ..
    } = err
    {
        output.push_str(&format!("\n      Cause: {}", reason));
        output.push_str("\n      Remove manually:");
        for path in remaining {
            output.push('\n');
            output.push_str(&style.list_item("-", &path.display().to_string()));
        }
    }
    output
}

// ============================================================================
// Command handlers
// ============================================================================

fn handle_add(ctx: &Context, name: &str, script: &Path, force: bool) -> Result<ExitCode, BakeError> {
    let report = match ctx.registry.add(name, script, force, ctx.console)? {
        Outcome::Done(report) => report,
        Outcome::Cancelled => {
            ctx.cancelled(&format!("`{}`", name));
            return Ok(ExitCode::SUCCESS);
        }
    };

    let verb = if report.replaced { "Updated" } else { "Added" };
    ctx.console.success(&format!(
        "{} `{}` -> {}",
        verb,
        ctx.style.command(&report.name),
        ctx.style.file_path(&ctx.show_path(&report.target))
    ));
    if let Some(previous) = report.previous_target.as_deref().filter(|p| *p != report.target) {
        if !ctx.quiet {
            println!("{}", ctx.style.message_detail("Was", &ctx.show_path(previous)));
        }
    }

    let path_var = std::env::var_os("PATH").unwrap_or_default();
    if !ctx.registry.paths().bin_dir_on_path(&path_var) {
        let bin = ctx.registry.paths().user_bin_dir();
        ctx.console
            .warn(&format!("{} is not on your PATH", ctx.show_path(bin)));
        eprintln!(
            "{}",
            ctx.style.message(
                MessageType::Hint,
                &format!(
                    "Add this to your shell profile: export PATH=\"{}:$PATH\"",
                    bin.display()
                )
            )
        );
    }
    Ok(ExitCode::SUCCESS)
}

fn handle_edit(ctx: &Context, name: &str, config: &BakeConfig) -> Result<ExitCode, BakeError> {
    let configured = config.editor.as_deref().filter(|e| !e.trim().is_empty());
    let editor = CommandEditor::resolve(configured);
    let wrapper = ctx.registry.edit(name, &editor)?;
    ctx.console.success(&format!(
        "Finished editing `{}` ({})",
        name,
        ctx.show_path(&wrapper)
    ));
    Ok(ExitCode::SUCCESS)
}

fn handle_delete(ctx: &Context, name: &str) -> Result<ExitCode, BakeError> {
    let report = ctx.registry.delete(name)?;
    ctx.console.success(&format!("Deleted `{}`", ctx.style.command(&report.name)));

    match report.symlink {
        Removal::NotOwned => ctx.console.warn(&format!(
            "Left {} in place: it was not created by bake",
            ctx.show_path(&ctx.registry.paths().user_bin_dir().join(&report.name))
        )),
        Removal::AlreadyMissing => tracing::debug!("Symlink for `{}` was already missing", name),
        Removal::Removed => {}
    }
    if report.wrapper == Removal::AlreadyMissing {
        tracing::debug!("Wrapper for `{}` was already missing", name);
    }
    Ok(ExitCode::SUCCESS)
}

fn handle_rename(ctx: &Context, old: &str, new: &str, force: bool) -> Result<ExitCode, BakeError> {
    match ctx.registry.rename(old, new, force, ctx.console)? {
        Outcome::Done(report) => {
            ctx.console.success(&format!(
                "Renamed `{}` -> `{}`",
                report.from,
                ctx.style.command(&report.to)
            ));
            if report.replaced && !ctx.quiet {
                println!("{}", ctx.style.message_detail("Replaced", &format!("previous `{}`", report.to)));
            }
        }
        Outcome::Cancelled => ctx.cancelled(&format!("`{}` and `{}`", old, new)),
    }
    Ok(ExitCode::SUCCESS)
}

fn handle_list(ctx: &Context, json: bool) -> Result<ExitCode, BakeError> {
    let entries = ctx.registry.list()?;

    if json {
        println!("{}", serde_json::to_string_pretty(&entries).unwrap_or_default());
        return Ok(ExitCode::SUCCESS);
    }

    if entries.is_empty() {
        let text = if ctx.registry.has_wrapper_dir() {
            "No commands registered."
        } else {
            "No commands yet. Add one with `bake add <name> <script>`."
        };
        println!("{}", ctx.style.message(MessageType::Info, text));
        return Ok(ExitCode::SUCCESS);
    }

    let rows: Vec<CommandRow> = entries
        .iter()
        .map(|entry| CommandRow::from_entry(entry, |p| ctx.show_path(p)))
        .collect();

    println!("{}", ctx.style.section("COMMANDS"));
    println!();
    println!("{}", render_commands_table(&rows, terminal_width()));

    let unhealthy = entries.iter().filter(|e| e.health != bake_core::CommandHealth::Ok).count();
    if unhealthy > 0 && !ctx.quiet {
        println!();
        println!(
            "{}",
            ctx.style.message(
                MessageType::Hint,
                &format!("{} command(s) need attention; run `bake show <name>` for details", unhealthy)
            )
        );
    }
    Ok(ExitCode::SUCCESS)
}

fn handle_show(ctx: &Context, name: &str, json: bool) -> Result<ExitCode, BakeError> {
    let entry = ctx.registry.show(name)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&entry).unwrap_or_default());
        return Ok(ExitCode::SUCCESS);
    }

    print_entry(ctx, &entry);
    Ok(ExitCode::SUCCESS)
}

fn print_entry(ctx: &Context, entry: &CommandEntry) {
    let style = ctx.style;
    let target = entry
        .target
        .as_deref()
        .map(|t| style.file_path(&ctx.show_path(t)))
        .unwrap_or_else(|| "(unreadable)".to_string());
    let updated = entry
        .updated
        .map(|t| format!("{} ({})", format_relative_time(t), t.format("%Y-%m-%d %H:%M:%S UTC")))
        .unwrap_or_else(|| "-".to_string());

    println!("{}", style.section(&entry.name));
    println!("  {}", style.key_value("Target", &target));
    println!("  {}", style.key_value("Status", &style.health(entry.health)));
    println!("  {}", style.key_value("Wrapper", &ctx.show_path(&entry.wrapper)));
    println!("  {}", style.key_value("Symlink", &ctx.show_path(&entry.symlink)));
    println!("  {}", style.key_value("Updated", &updated));
}

fn handle_purge(ctx: &Context, force: bool) -> Result<ExitCode, BakeError> {
    let report = match ctx.registry.purge(force, ctx.console)? {
        Outcome::Done(report) => report,
        Outcome::Cancelled => {
            ctx.cancelled("all commands");
            return Ok(ExitCode::SUCCESS);
        }
    };

    if report.removed.is_empty() && report.orphan_links.is_empty() && report.failed.is_empty() {
        ctx.console.info("No commands to remove.");
        return Ok(ExitCode::SUCCESS);
    }

    if !report.removed.is_empty() {
        ctx.console
            .success(&format!("Removed {} command(s)", report.removed.len()));
        if !ctx.quiet {
            for name in &report.removed {
                println!("{}", ctx.style.list_item("-", name));
            }
        }
    }
    for link in &report.orphan_links {
        ctx.console
            .info(&format!("Removed dangling link {}", ctx.show_path(link)));
    }

    if report.failed.is_empty() {
        return Ok(ExitCode::SUCCESS);
    }
    for (name, reason) in &report.failed {
        ctx.console.error(&format!("`{}`: {}", name, reason));
    }
    Ok(ExitCode::FAILURE)
}

fn handle_paths(ctx: &Context, json: bool) -> Result<ExitCode, BakeError> {
    let paths = ctx.registry.paths();

    if json {
        println!("{}", serde_json::to_string_pretty(paths).unwrap_or_default());
        return Ok(ExitCode::SUCCESS);
    }

    let path_var = std::env::var_os("PATH").unwrap_or_default();
    let on_path = if paths.bin_dir_on_path(&path_var) { "yes" } else { "no" };
    let style = ctx.style;

    println!("{}", style.section("PATHS"));
    println!("  {}", style.key_value("Home", &paths.home().display().to_string()));
    println!("  {}", style.key_value("Install dir", &paths.install_dir().display().to_string()));
    println!("  {}", style.key_value("Wrapper scripts", &paths.wrapper_dir().display().to_string()));
    println!("  {}", style.key_value("User bin", &paths.user_bin_dir().display().to_string()));
    println!("  {}", style.key_value("Install link", &paths.install_link().display().to_string()));
    println!("  {}", style.key_value("Config file", &paths.config_file().display().to_string()));
    println!("  {}", style.key_value("Bin dir on PATH", on_path));
    Ok(ExitCode::SUCCESS)
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_aliases_and_global_flags() {
        let cli = Cli::try_parse_from(["bake", "rm", "greet", "--force"]).unwrap();
        assert!(cli.force);
        assert!(matches!(cli.command, Command::Delete { name } if name == "greet"));

        let cli = Cli::try_parse_from(["bake", "--debug", "mv", "a", "b"]).unwrap();
        assert!(cli.verbose);
        assert!(matches!(cli.command, Command::Rename { .. }));

        let cli = Cli::try_parse_from(["bake", "ls", "--json"]).unwrap();
        assert!(matches!(cli.command, Command::List { json: true }));
    }

    #[test]
    fn test_render_partial_failure_lists_leftovers() {
        let style = Style::new(ColorMode::Never);
        let err = BakeError::PartialFailure {
            name: "greet".to_string(),
            remaining: vec![PathBuf::from("/home/u/.local/bin/greet")],
            reason: "permission denied".to_string(),
        };
        let output = render_error(&style, &err);
        assert!(output.starts_with("[err] `greet` was only partially removed"));
        assert!(output.contains("Cause: permission denied"));
        assert!(output.contains("  - /home/u/.local/bin/greet"));
    }

    #[test]
    fn test_render_not_found_has_hint() {
        let style = Style::new(ColorMode::Never);
        let output = render_error(&style, &BakeError::NotFound("greet".to_string()));
        assert!(output.contains("Command not found: greet"));
        assert!(output.contains("Hint: Run `bake list`"));
    }
}
