use anyhow::{Context, Result};
use clap::Parser;
use colored::Colorize;
use filetags::config::{self, Defaults};
use filetags::{execute, Flags, Invocation, Line, OsBackend, Renderer, Style};
use std::env;
use std::io::{self, IsTerminal, Write};
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

/// Exit status for invalid flags, unreadable config or working directory.
const FATAL_STATUS: i32 = 2;

#[derive(Parser)]
#[command(name = "filetags")]
#[command(
    about = "View, set, search, or remove xdg tags and comments from one or more files",
    long_about = "View, set, search, or remove xdg tags and comments from one or more files.\n\n\
                  The default action when no operation flag is given is to list all tags.\n\
                  With --names and --search the output can drive shell loops:\n\n    \
                  for f in $(filetags -s python -n -R); do echo \"$f\"; done"
)]
#[command(version)]
struct Cli {
    /// One or more file names
    #[arg(value_name = "FILE")]
    paths: Vec<PathBuf>,

    /// Add tags to existing tags (comma-separated)
    #[arg(short = 'a', long, value_name = "TAGS")]
    add: Option<String>,

    /// List all extended attributes
    #[arg(short = 'A', long)]
    attrs: bool,

    /// Set the file comment
    #[arg(short = 'c', long, value_name = "MSG")]
    comment: Option<String>,

    /// List all comments, or search comments when --search is used
    #[arg(short = 'C', long)]
    comments: bool,

    /// Remove existing tags (comma-separated)
    #[arg(short = 'd', long, value_name = "TAGS")]
    remove: Option<String>,

    /// Use directories only
    #[arg(short = 'D', long)]
    dirs: bool,

    /// Treat the search pattern as literal text instead of a regex
    #[arg(short = 'e', long)]
    literal: bool,

    /// Use files only
    #[arg(short = 'F', long = "files")]
    files_only: bool,

    /// Print debugging info to stderr
    #[arg(short = 'I', long)]
    debug: bool,

    /// Follow symlinks
    #[arg(short = 'l', long)]
    symlinks: bool,

    /// Print names only when searching
    #[arg(short = 'n', long)]
    names: bool,

    /// Don't colorize output (automatic when piping)
    #[arg(short = 'N', long)]
    nocolor: bool,

    /// Don't print anything to stdout; errors still go to stderr
    #[arg(short = 'q', long)]
    quiet: bool,

    /// Remove the file comment
    #[arg(short = 'r', long)]
    removecomment: bool,

    /// Recurse into sub-directories
    #[arg(short = 'R', long)]
    recurse: bool,

    /// Search for a text/regex pattern in tags, or comments with --comments
    #[arg(short = 's', long, value_name = "PAT")]
    search: Option<String>,

    /// List all tags
    #[arg(short = 't', long)]
    tags: bool,

    /// Show files that don't match the search
    #[arg(short = 'v', long)]
    reverse: bool,

    /// Delete/clear all tags
    #[arg(short = 'x', long)]
    delete: bool,
}

impl Cli {
    /// Merge command-line flags over file defaults.
    ///
    /// Search-only defaults are applied only to searches, so a config file
    /// never makes a plain listing invalid.
    fn flags(&self, defaults: &Defaults) -> Flags {
        let searching = self.search.is_some();
        Flags {
            paths: self.paths.clone(),
            list_tags: self.tags,
            list_attrs: self.attrs,
            comments: self.comments,
            add: self.add.clone(),
            remove: self.remove.clone(),
            clear_tags: self.delete,
            set_comment: self.comment.clone(),
            clear_comment: self.removecomment,
            search: self.search.clone(),
            literal: self.literal || (searching && defaults.literal),
            reverse: self.reverse,
            names_only: self.names || (searching && defaults.names_only),
            recurse: self.recurse,
            follow_symlinks: self.symlinks || defaults.follow_symlinks,
            files_only: self.files_only,
            dirs_only: self.dirs,
        }
    }

    fn style(&self, defaults: &Defaults) -> Style {
        let color = if self.nocolor {
            false
        } else if let Some(forced) = defaults.color {
            forced
        } else {
            io::stdout().is_terminal() && colored::control::SHOULD_COLORIZE.should_colorize()
        };
        Style { color }
    }
}

fn main() {
    let cli = Cli::parse();
    init_tracing(cli.debug);

    let status = match run(&cli) {
        Ok(status) => status,
        Err(err) => {
            let message = format!("{err:#}");
            if cli.nocolor {
                eprintln!("{message}");
            } else {
                eprintln!("{}", message.red());
            }
            FATAL_STATUS
        }
    };
    std::process::exit(status);
}

fn run(cli: &Cli) -> Result<i32> {
    let defaults = config::load()?;
    let flags = cli.flags(&defaults);
    let invocation = Invocation::from_flags(&flags)?;

    let style = cli.style(&defaults);
    colored::control::set_override(style.color);

    let cwd = env::current_dir().context("unable to determine current directory")?;
    let backend = OsBackend::new(invocation.resolve.follow_symlinks);
    let report = execute(&invocation, &cwd, backend)?;

    let renderer = Renderer::new(&invocation.operation, style, flags.names_only);
    let mut stdout = io::stdout().lock();
    let mut stderr = io::stderr().lock();
    for line in renderer.lines(&report) {
        match line {
            Line::Out(text) if !cli.quiet => writeln!(stdout, "{text}")?,
            Line::Out(_) => {}
            Line::Err(text) => writeln!(stderr, "{text}")?,
        }
    }
    stdout.flush()?;

    tracing::debug!(
        records = report.records().len(),
        matches = report.match_count(),
        errors = report.error_count(),
        "done"
    );
    Ok(report.exit_status())
}

fn init_tracing(debug: bool) {
    let fallback = if debug { "filetags=debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(fallback));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}
