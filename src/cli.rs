// File: ./src/cli.rs
//! Command-line definitions and the glue that renders command outcomes.
use crate::config::Config;
use crate::context::{AppContext, StandardContext};
use crate::controller::{
    ChecklistController, MergeOptions, MergeReport, Template, UpdateOptions, UpdateOutcome,
};
use crate::model::id::ChecklistItem;
use crate::report::{self, ReportOptions, TreeNode, TreeOptions};
use anyhow::{Result, anyhow};
use clap::{ArgAction, Args, Parser, Subcommand};
use log::LevelFilter;
use std::path::{Path, PathBuf};
use std::sync::Arc;

pub const LOG_ENV: &str = "PCHECK_LOG";

#[derive(Parser, Debug)]
#[command(name = "pcheck", version)]
#[command(about = "Validate, sort and maintain Markdown TODO checklists", long_about = None)]
pub struct Cli {
    /// Use a different directory for config and private data
    #[arg(short, long, global = true, value_name = "PATH")]
    pub root: Option<PathBuf>,

    /// Read configuration from this file
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// More log output on stderr (-v info, -vv debug)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Spaces per nesting level
    #[arg(long, global = true, value_name = "N")]
    pub indent_size: Option<usize>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Add a task to a section
    Add(AddArgs),
    /// Toggle a checklist item by its ID
    Check(CheckArgs),
    /// Sort tasks by priority, keeping nested tasks with their parent
    Sort {
        file: Option<PathBuf>,
    },
    /// Sort, archive or vacuum completed tasks
    Update(UpdateArgs),
    /// Create a TODO.md from a template
    Init(InitArgs),
    /// Merge TODO files from subdirectories into one
    Merge(MergeArgs),
    /// Validate checklist structure
    Validate(ValidateArgs),
    /// Show checklist files as a tree
    List(ListArgs),
    /// Find checklist items in source code comments
    Scan(ScanArgs),
    /// Show the effective configuration and where it is read from
    Config {
        /// Write the current settings to the config file if there is none yet
        #[arg(long)]
        init: bool,
    },
}

#[derive(Args, Debug)]
pub struct AddArgs {
    pub file: Option<PathBuf>,
    pub section: Option<String>,
    /// Task text
    #[arg(short, long)]
    pub message: String,
    /// HIGH, MID, LOW, P0-P3 or a number 0-999
    #[arg(short, long)]
    pub priority: Option<String>,
    /// Add to the TODO file in the private directory
    #[arg(long, conflicts_with = "file")]
    pub private: bool,
}

#[derive(Args, Debug)]
pub struct CheckArgs {
    pub id: String,
    #[arg(default_value = ".")]
    pub path: PathBuf,
    /// Always uncheck instead of toggling
    #[arg(long)]
    pub off: bool,
}

#[derive(Args, Debug)]
pub struct UpdateArgs {
    pub file: Option<PathBuf>,
    #[arg(long, visible_alias = "priority")]
    pub sort: bool,
    /// Move completed tasks to the COMPLETED section
    #[arg(long, visible_alias = "completed")]
    pub done: bool,
    /// Remove completed tasks and print them as a report
    #[arg(long)]
    pub vacuum: bool,
    /// Delete the COMPLETED section
    #[arg(long)]
    pub force_clear: bool,
    /// Pull checklist items from source code comments
    #[arg(long)]
    pub code: bool,
    #[arg(long)]
    pub skip_validation: bool,
}

#[derive(Args, Debug)]
pub struct InitArgs {
    #[arg(default_value = ".")]
    pub dir: PathBuf,
    /// default or gtd
    #[arg(long, default_value = "default")]
    pub template: Template,
    #[arg(long)]
    pub force: bool,
}

#[derive(Args, Debug)]
pub struct MergeArgs {
    #[arg(default_value = ".")]
    pub dir: PathBuf,
    #[arg(long)]
    pub target: Option<PathBuf>,
    #[arg(long)]
    pub dry_run: bool,
    /// Ignore files without tasks
    #[arg(long)]
    pub skip_empty: bool,
    /// Delete the source files after a successful merge
    #[arg(long)]
    pub remove_sources: bool,
}

#[derive(Args, Debug)]
pub struct ValidateArgs {
    pub files: Vec<PathBuf>,
    #[arg(long)]
    pub json: bool,
    #[arg(long)]
    pub pretty: bool,
    /// One line per file
    #[arg(long)]
    pub summary: bool,
    /// Include finding details
    #[arg(long)]
    pub details: bool,
    /// Fail on warnings too
    #[arg(long)]
    pub strict: bool,
}

#[derive(Args, Debug)]
pub struct ListArgs {
    #[arg(default_value = ".")]
    pub path: PathBuf,
    #[arg(long)]
    pub unchecked: bool,
    #[arg(long)]
    pub show_ids: bool,
    #[arg(long)]
    pub json: bool,
    #[arg(long)]
    pub pretty: bool,
    #[arg(long, value_name = "N")]
    pub max_depth: Option<usize>,
    #[arg(long, value_name = "N")]
    pub max_items: Option<usize>,
    /// List the private directory instead
    #[arg(long)]
    pub private: bool,
}

#[derive(Args, Debug)]
pub struct ScanArgs {
    #[arg(default_value = ".")]
    pub path: PathBuf,
    #[arg(long)]
    pub unchecked: bool,
    #[arg(long)]
    pub json: bool,
    #[arg(long)]
    pub pretty: bool,
}

impl Cli {
    /// `PCHECK_LOG` wins over `-v`; the default is warnings only.
    pub fn log_level(&self) -> LevelFilter {
        let from_env = std::env::var(LOG_ENV)
            .ok()
            .and_then(|v| v.trim().parse::<LevelFilter>().ok());
        from_env.unwrap_or(match self.verbose {
            0 => LevelFilter::Warn,
            1 => LevelFilter::Info,
            _ => LevelFilter::Debug,
        })
    }

    fn load_config(&self, ctx: &dyn AppContext) -> Result<Config> {
        let mut config = match &self.config {
            Some(path) => Config::load_from(path)?,
            None => Config::load(ctx)?,
        };
        if let Some(size) = self.indent_size {
            config.indent_size = size;
        }
        if self.no_color {
            config.color = false;
        }
        Ok(config)
    }
}

/// Runs the parsed command and returns the process exit status.
pub fn run(cli: Cli) -> Result<i32> {
    let ctx: Arc<dyn AppContext> = Arc::new(StandardContext::new(cli.root.clone()));
    let config = cli.load_config(ctx.as_ref())?;
    let controller = ChecklistController::new(ctx, config);

    let command = cli.command.unwrap_or(Command::List(ListArgs {
        path: PathBuf::from("."),
        unchecked: false,
        show_ids: false,
        json: false,
        pretty: false,
        max_depth: None,
        max_items: None,
        private: false,
    }));

    match command {
        Command::Add(args) => run_add(&controller, args),
        Command::Check(args) => {
            let outcome = controller.check(&args.path, &args.id, args.off)?;
            let state = |c: bool| if c { "checked" } else { "unchecked" };
            println!("✨ Updated checklist item:");
            println!("  [{}] {}", if outcome.checked { "x" } else { " " }, outcome.content);
            println!("  ID: {}", outcome.id);
            println!("  File: {}:{}", outcome.path.display(), outcome.line);
            println!("  State: {} → {}", state(outcome.was_checked), state(outcome.checked));
            Ok(0)
        }
        Command::Sort { file } => {
            let path = controller.resolve_file(file.as_deref());
            if controller.sort(&path)? {
                println!("✨ Sorted tasks by priority in {}", path.display());
            } else {
                println!("{} is already sorted", path.display());
            }
            Ok(0)
        }
        Command::Update(args) => run_update(&controller, args),
        Command::Init(args) => {
            let path = controller.init(&args.dir, args.template, args.force)?;
            println!("✓ Created {}", path.display());
            Ok(0)
        }
        Command::Merge(args) => {
            let options = MergeOptions {
                target: args.target,
                dry_run: args.dry_run,
                skip_empty: args.skip_empty,
                remove_sources: args.remove_sources,
            };
            print_merge(&controller.merge(&args.dir, &options)?, options.dry_run);
            Ok(0)
        }
        Command::Validate(args) => run_validate(&controller, args),
        Command::List(args) => run_list(&controller, args),
        Command::Scan(args) => {
            let items = controller.scan(&args.path, args.unchecked)?;
            if args.json {
                println!("{}", report::to_json(&items, args.pretty)?);
            } else if items.is_empty() {
                println!("No checklist items found in code.");
            } else {
                for item in &items {
                    let mark = if item.checked { "x" } else { " " };
                    println!("{}:{}: [{}] {}", item.path, item.line, mark, item.content);
                }
            }
            Ok(0)
        }
        Command::Config { init } => {
            let path = controller.ctx.get_config_file_path()?;
            if init {
                if path.exists() {
                    return Err(anyhow!("{} already exists", path.display()));
                }
                controller.config.save(controller.ctx.as_ref())?;
                println!("✓ Wrote {}", path.display());
            } else {
                println!("# {}", path.display());
                print!("{}", toml::to_string_pretty(&controller.config)?);
            }
            Ok(0)
        }
    }
}

fn run_add(controller: &ChecklistController, args: AddArgs) -> Result<i32> {
    let path = if args.private {
        controller.private_file()?
    } else {
        controller.resolve_file(args.file.as_deref())
    };
    let outcome = controller.add(
        &path,
        args.section.as_deref(),
        &args.message,
        args.priority.as_deref(),
    )?;

    if outcome.created_file {
        println!("✨ Created new {}", outcome.path.display());
    } else {
        println!("✨ Added new task");
    }
    println!("  Section: {}", outcome.section);
    println!("  Task: {}", outcome.task);
    println!("  File: {}", outcome.path.display());
    Ok(0)
}

fn run_update(controller: &ChecklistController, args: UpdateArgs) -> Result<i32> {
    let path = controller.resolve_file(args.file.as_deref());
    let options = UpdateOptions {
        sort: args.sort,
        completed: args.done,
        vacuum: args.vacuum,
        force_clear: args.force_clear,
        code: args.code,
        skip_validation: args.skip_validation,
    };
    let outcome = controller.update(&path, &options)?;
    print_update(&path, &outcome, controller.config.color);
    Ok(if outcome.rejected.is_some() { 1 } else { 0 })
}

fn print_update(path: &Path, outcome: &UpdateOutcome, color: bool) {
    if let Some(result) = &outcome.rejected {
        eprintln!("Validation failed. Fix the errors or use --skip-validation.");
        let options = ReportOptions {
            show_details: false,
            color,
        };
        println!("{}", report::render_result(&path.display().to_string(), result, &options));
        return;
    }

    if !outcome.vacuumed.is_empty() {
        println!("# Vacuumed Tasks");
        println!("Date: {}", chrono::Utc::now().to_rfc3339());
        println!("File: {}", path.display());
        println!();
        for section in &outcome.vacuumed {
            println!("## {}", section.name);
            println!();
            for line in &section.lines {
                println!("{}", line);
            }
            println!();
        }
    }

    if !outcome.suggestions.is_empty() {
        println!("Nothing changed. Available operations:");
        for s in &outcome.suggestions {
            println!("  {}", s);
        }
    } else if outcome.operations.is_empty() {
        println!("No operations performed");
    } else {
        println!("✨ Updated {}", path.display());
        println!("  Operations: {}", outcome.operations.join(", "));
    }
}

fn print_merge(report: &MergeReport, dry_run: bool) {
    if report.sources.is_empty() {
        println!("No TODO files with tasks found.");
        return;
    }
    for file in &report.sources {
        println!("  {}", file.relative);
    }
    for section in &report.outcome.sections {
        let note = if section.created { " (new section)" } else { "" };
        println!("  {}: {} task(s){}", section.name, section.task_count, note);
    }

    if dry_run {
        println!("\n=== DRY RUN - Merged content preview ===");
        println!("{}", report.outcome.content);
        println!("=== End of preview ===\n");
        println!(
            "Would merge {} files into {}",
            report.sources.len(),
            report.target.display()
        );
    } else {
        println!(
            "✓ Merged {} files into {}",
            report.sources.len(),
            report.target.display()
        );
    }
}

fn run_validate(controller: &ChecklistController, args: ValidateArgs) -> Result<i32> {
    let mut controller = controller.clone();
    controller.config.strict |= args.strict;
    let color = controller.config.color;

    let files = if args.files.is_empty() {
        vec![controller.resolve_file(None)]
    } else {
        args.files
    };
    let results = controller.validate(&files);

    if args.json {
        println!("{}", report::render_json(&results, args.pretty)?);
    } else if args.summary {
        for (file, result) in &results {
            println!("{}", report::render_summary_line(file, result, color));
        }
    } else {
        let options = ReportOptions {
            show_details: args.details,
            color,
        };
        for (file, result) in &results {
            println!("{}", report::render_result(file, result, &options));
        }
    }

    if results.len() > 1 && !args.json {
        let all: Vec<_> = results.iter().map(|(_, r)| r).collect();
        println!("{}", report::render_statistics(&all, color));
    }

    let failed = results.iter().any(|(_, r)| !r.passed);
    Ok(if failed { 1 } else { 0 })
}

fn run_list(controller: &ChecklistController, args: ListArgs) -> Result<i32> {
    let root = if args.private {
        controller.ctx.get_private_dir()?
    } else {
        args.path
    };
    if args.private && !root.exists() {
        println!("No private checklist yet ({}).", root.display());
        return Ok(0);
    }

    let mut listed = controller.list(&root)?;
    if args.unchecked {
        for file in &mut listed {
            file.items = prune_checked(std::mem::take(&mut file.items));
        }
    }

    let nodes: Vec<TreeNode> = listed
        .iter()
        .map(|f| TreeNode::container(&f.file.relative, f.items.iter().map(TreeNode::from).collect()))
        .collect();

    if args.json {
        println!("{}", report::to_json(&nodes, args.pretty)?);
        return Ok(0);
    }
    if nodes.is_empty() {
        println!("No checklist files found.");
        return Ok(0);
    }

    let options = TreeOptions {
        show_ids: args.show_ids || controller.config.show_ids,
        max_items: args.max_items,
        max_depth: args.max_depth,
        unchecked_only: args.unchecked,
    };
    for node in &nodes {
        for line in report::render_tree(std::slice::from_ref(node), &options) {
            println!("{}", line);
        }
        println!();
    }
    Ok(0)
}

/// Keeps unchecked items and checked items that still have open descendants.
fn prune_checked(items: Vec<ChecklistItem>) -> Vec<ChecklistItem> {
    items
        .into_iter()
        .filter(|i| !i.checked || i.has_unchecked_descendant())
        .map(|mut i| {
            i.children = prune_checked(i.children);
            i
        })
        .collect()
}
