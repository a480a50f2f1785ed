//! Type Graph Schema CLI
//!
//! Command-line interface for generating JSON Schema documents from a
//! type graph manifest.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{ArgAction, Parser, Subcommand};
use tracing_subscriber::EnvFilter;
use typegraph_schema::{
    load_graph_auto, render_document, write_documents, Assembly, Diagnostic, Generator,
    GeneratorOptions, TypeGraph, DEFAULT_TAINT_SENTINEL,
};

#[derive(Parser)]
#[command(name = "typegraph-schema")]
#[command(about = "Generate JSON Schema documents from marker-annotated type graphs")]
#[command(version)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(long, short, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(clap::Args)]
struct GraphArgs {
    /// Type graph manifest: file path or URL (http:// or https://)
    graph: String,

    /// Allow float32/float64 fields
    #[arg(long)]
    allow_dangerous_types: bool,

    /// Substring of a field type that marks it as a taxonomy type
    #[arg(long, default_value = DEFAULT_TAINT_SENTINEL)]
    taint_sentinel: String,
}

impl GraphArgs {
    fn options(&self) -> GeneratorOptions {
        GeneratorOptions::new()
            .allow_dangerous_types(self.allow_dangerous_types)
            .taint_sentinel(self.taint_sentinel.clone())
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Generate schema documents into a directory
    Generate {
        #[command(flatten)]
        graph: GraphArgs,

        /// Output directory (created if missing)
        #[arg(long, short)]
        output_dir: PathBuf,

        /// Fail when any diagnostic is reported
        #[arg(long)]
        strict: bool,

        /// Output the run report as JSON (for automation)
        #[arg(long)]
        json: bool,
    },

    /// Print the assembled documents without writing them
    Inspect {
        #[command(flatten)]
        graph: GraphArgs,

        /// Only print this document (e.g. api.json)
        #[arg(long)]
        document: Option<String>,

        /// Pretty-print each document instead of one compact line per document
        #[arg(long)]
        pretty: bool,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Logs go to stderr so JSON on stdout stays clean for piping.
    let level = match cli.verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("warn,typegraph_schema={level}")));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let result = match cli.command {
        Commands::Generate {
            graph,
            output_dir,
            strict,
            json,
        } => run_generate(&graph, output_dir, strict, json),
        Commands::Inspect {
            graph,
            document,
            pretty,
        } => run_inspect(&graph, document.as_deref(), pretty),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(code) => ExitCode::from(code),
    }
}

fn load(args: &GraphArgs) -> Result<TypeGraph, u8> {
    load_graph_auto(&args.graph).map_err(|e| {
        eprintln!("Error: {}", e);
        e.exit_code() as u8
    })
}

fn run_generate(args: &GraphArgs, output_dir: PathBuf, strict: bool, json: bool) -> Result<(), u8> {
    let graph = load(args)?;
    let Assembly {
        documents,
        diagnostics,
    } = Generator::new(args.options()).assemble(&graph);

    let written = write_documents(&output_dir, &documents).map_err(|e| {
        eprintln!("Error: {}", e);
        e.exit_code() as u8
    })?;

    if json {
        let report = serde_json::json!({
            "documents": written,
            "diagnostics": diagnostics,
        });
        println!("{}", report);
    } else {
        report_diagnostics(&diagnostics);
        println!(
            "Wrote {} document(s) to {}",
            written.len(),
            output_dir.display()
        );
    }

    match diagnostics.first() {
        Some(diagnostic) if strict => Err(diagnostic.error.exit_code() as u8),
        _ => Ok(()),
    }
}

fn run_inspect(args: &GraphArgs, only: Option<&str>, pretty: bool) -> Result<(), u8> {
    let graph = load(args)?;
    let assembly = Generator::new(args.options()).assemble(&graph);
    report_diagnostics(&assembly.diagnostics);

    if let Some(name) = only {
        if !assembly.documents.contains_key(name) {
            eprintln!("Error: no document named {}", name);
            return Err(2);
        }
    }

    for (name, document) in &assembly.documents {
        if only.is_some_and(|wanted| wanted != name) {
            continue;
        }
        if pretty {
            let rendered = render_document(name, document).map_err(|e| {
                eprintln!("Error: {}", e);
                e.exit_code() as u8
            })?;
            println!("{}", rendered);
        } else {
            println!("{}", document.to_value());
        }
    }
    Ok(())
}

fn report_diagnostics(diagnostics: &[Diagnostic]) {
    for diagnostic in diagnostics {
        eprintln!("warning: {}", diagnostic);
    }
}
