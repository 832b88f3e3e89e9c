//! cmc: The C-Minus compiler front end.
//!
//! Usage:
//!   cmc [options] [file...]
//!
//! Listings go to stdout, diagnostics to stderr. Exits with 0 when every
//! unit compiled cleanly, 2 when any unit reported an error and 1 on a
//! fatal error.

use clap::Parser as ClapParser;
use cminus_compiler::{load_options, CompilerOptions, Program};
use cminus_diagnostics::Diagnostic;
use miette::{IntoDiagnostic, WrapErr};
use std::path::{Path, PathBuf};
use std::process;

const PROJECT_FILE: &str = "cminus.json";

#[derive(ClapParser, Debug)]
#[command(name = "cmc", about = "cmc - a C-Minus compiler front end", version)]
struct Cli {
    /// C-Minus files to compile.
    #[arg(value_name = "FILE")]
    files: Vec<PathBuf>,

    /// Path to cminus.json.
    #[arg(short = 'p', long = "project")]
    project: Option<PathBuf>,

    /// Echo each source line into the listing.
    #[arg(long)]
    echo_source: bool,

    /// List every token as it is scanned.
    #[arg(long)]
    trace_scan: bool,

    /// Print the syntax tree.
    #[arg(long)]
    trace_parse: bool,

    /// Print the symbol table.
    #[arg(long)]
    trace_analyze: bool,
}

impl Cli {
    /// Options given on the command line. A flag can only switch a listing on.
    fn overrides(&self) -> CompilerOptions {
        CompilerOptions {
            echo_source: self.echo_source.then_some(true),
            trace_scan: self.trace_scan.then_some(true),
            trace_parse: self.trace_parse.then_some(true),
            trace_analyze: self.trace_analyze.then_some(true),
        }
    }
}

// ANSI color codes
const RED: &str = "\x1b[31m";
const CYAN: &str = "\x1b[36m";
const BOLD: &str = "\x1b[1m";
const RESET: &str = "\x1b[0m";

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    let exit_code = match run_compile(&cli) {
        Ok(code) => code,
        Err(report) => {
            eprintln!("{:?}", report);
            1
        }
    };
    process::exit(exit_code);
}

fn run_compile(cli: &Cli) -> miette::Result<i32> {
    let (files, project_options) = resolve_input_files(cli)?;
    if files.is_empty() {
        print_error("No input files found.");
        return Ok(1);
    }

    // CLI options override the project file
    let options = project_options.merge(&cli.overrides());
    log::debug!("compiling {} files with {:?}", files.len(), options);

    let mut program = Program::new(options);
    for file in files {
        program.add_file(file);
    }

    let use_color = atty_is_terminal();
    let show_names = program.len() > 1;
    let mut error_count = 0;
    for result in program.compile() {
        let unit = result.into_diagnostic().wrap_err("compilation aborted")?;
        print!("{}", unit.listing);
        for diag in &unit.diagnostics {
            print_diagnostic(diag, show_names.then_some(unit.name.as_str()), use_color);
        }
        error_count += unit.diagnostics.len();
    }

    if error_count > 0 {
        let plural = if error_count == 1 { "" } else { "s" };
        if use_color {
            eprintln!("\n{}Found {} error{}.{}", RED, error_count, plural, RESET);
        } else {
            eprintln!("\nFound {} error{}.", error_count, plural);
        }
        return Ok(2);
    }
    Ok(0)
}

/// The files to compile and the options of the project file, if one applies.
/// Explicit files take precedence over the project's file list.
fn resolve_input_files(cli: &Cli) -> miette::Result<(Vec<PathBuf>, CompilerOptions)> {
    let project = match &cli.project {
        Some(path) => Some(path.clone()),
        None if cli.files.is_empty() && Path::new(PROJECT_FILE).exists() => Some(PathBuf::from(PROJECT_FILE)),
        None => None,
    };
    let Some(project) = project else {
        return Ok((cli.files.clone(), CompilerOptions::default()));
    };

    let config = load_options(&project)
        .into_diagnostic()
        .wrap_err_with(|| format!("failed to read project '{}'", project.display()))?;
    let files = if cli.files.is_empty() {
        config.resolved_files(&project)
    } else {
        cli.files.clone()
    };
    Ok((files, config.compiler_options.unwrap_or_default()))
}

fn print_diagnostic(diag: &Diagnostic, file: Option<&str>, use_color: bool) {
    if use_color {
        if let Some(file) = file {
            eprint!("{}{}{}: ", CYAN, file, RESET);
        }
        eprintln!("{}{}Error{}: {}", BOLD, RED, RESET, diag.message_text);
    } else if let Some(file) = file {
        eprintln!("{}: {}", file, diag);
    } else {
        eprintln!("{}", diag);
    }
}

fn print_error(msg: &str) {
    if atty_is_terminal() {
        eprintln!("{}{}error{}: {}", BOLD, RED, RESET, msg);
    } else {
        eprintln!("error: {}", msg);
    }
}

fn atty_is_terminal() -> bool {
    #[cfg(unix)]
    {
        unsafe { libc::isatty(2) != 0 }
    }
    #[cfg(not(unix))]
    {
        false
    }
}
