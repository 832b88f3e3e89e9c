//! cminus_compiler: Compiler orchestration.
//!
//! Runs one compilation unit through scan -> parse -> bind -> check and
//! collects its listing and diagnostics. A [`Program`] compiles several
//! independent units in parallel.

mod options;

pub use options::{load_options, parse_project, CompilerOptions, OptionsError, ProjectConfig};

use cminus_ast::node::SyntaxTree;
use cminus_binder::ScopeError;
use cminus_checker::{analyze, Analysis};
use cminus_core::intern::StringInterner;
use cminus_diagnostics::DiagnosticCollection;
use cminus_parser::Parser;
use cminus_printer::{print_symbol_table, print_tree};
use cminus_scanner::Scanner;
use rayon::prelude::*;
use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CompileError {
    #[error("cannot read {name}")]
    Io {
        name: String,
        #[source]
        source: io::Error,
    },
    #[error("analysis of {name} failed")]
    Scope {
        name: String,
        #[source]
        source: ScopeError,
    },
}

/// The result of compiling one unit.
#[derive(Debug)]
pub struct Compilation {
    pub name: String,
    /// The syntax tree, annotated with types when analysis ran.
    pub tree: SyntaxTree,
    /// `None` when the unit had lexical or syntax errors.
    pub analysis: Option<Analysis>,
    /// Every diagnostic of the unit, in phase order.
    pub diagnostics: DiagnosticCollection,
    /// Echoed source and the enabled trace listings.
    pub listing: String,
}

impl Compilation {
    pub fn succeeded(&self) -> bool {
        !self.diagnostics.has_errors()
    }
}

/// Compile source text held in memory.
pub fn compile_source(name: &str, source: &str, options: &CompilerOptions) -> Result<Compilation, CompileError> {
    compile_reader(name, source.as_bytes(), options)
}

/// Compile a source file, reading it line by line.
pub fn compile_file(path: &Path, options: &CompilerOptions) -> Result<Compilation, CompileError> {
    let name = path.display().to_string();
    let file = File::open(path).map_err(|source| CompileError::Io {
        name: name.clone(),
        source,
    })?;
    compile_reader(&name, BufReader::new(file), options)
}

/// Compile the unit read from `reader`.
pub fn compile_reader<R: BufRead>(
    name: &str,
    reader: R,
    options: &CompilerOptions,
) -> Result<Compilation, CompileError> {
    log::info!("compiling {}", name);

    let scanner = Scanner::new(reader)
        .with_echo(options.echo_source())
        .with_trace(options.trace_scan());
    let output = Parser::new(scanner, StringInterner::new()).parse_program();
    if let Some(source) = output.io_error {
        return Err(CompileError::Io {
            name: name.to_string(),
            source,
        });
    }

    let mut tree = output.tree;
    let mut diagnostics = output.diagnostics;
    let mut listing = output.listing;

    if options.trace_parse() {
        listing.push_str("\nSyntax tree:\n");
        listing.push_str(&print_tree(&tree));
    }

    // Analysis needs a complete tree.
    let analysis = if diagnostics.has_errors() {
        log::info!("{}: skipping analysis after {} parse errors", name, diagnostics.len());
        None
    } else {
        let analysis = analyze(&mut tree).map_err(|source| CompileError::Scope {
            name: name.to_string(),
            source,
        })?;
        if options.trace_analyze() {
            listing.push_str("\nSymbol table:\n\n");
            listing.push_str(&print_symbol_table(&tree, &analysis.scopes));
        }
        diagnostics.extend(analysis.diagnostics.clone());
        Some(analysis)
    };

    log::info!("{}: {} diagnostics", name, diagnostics.len());
    Ok(Compilation {
        name: name.to_string(),
        tree,
        analysis,
        diagnostics,
        listing,
    })
}

/// A unit waiting to be compiled.
#[derive(Debug, Clone)]
enum Unit {
    Source { name: String, text: String },
    File(PathBuf),
}

/// A set of independent compilation units.
pub struct Program {
    pub options: CompilerOptions,
    units: Vec<Unit>,
}

impl Program {
    pub fn new(options: CompilerOptions) -> Self {
        Self {
            options,
            units: Vec::new(),
        }
    }

    /// Add a unit from source text.
    pub fn add_source(&mut self, name: impl Into<String>, text: impl Into<String>) {
        self.units.push(Unit::Source {
            name: name.into(),
            text: text.into(),
        });
    }

    /// Add a unit read from disk when the program is compiled.
    pub fn add_file(&mut self, path: impl Into<PathBuf>) {
        self.units.push(Unit::File(path.into()));
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    /// Compile every unit. Results keep the order the units were added in.
    pub fn compile(&self) -> Vec<Result<Compilation, CompileError>> {
        self.units
            .par_iter()
            .map(|unit| match unit {
                Unit::Source { name, text } => compile_source(name, text, &self.options),
                Unit::File(path) => compile_file(path, &self.options),
            })
            .collect()
    }
}
