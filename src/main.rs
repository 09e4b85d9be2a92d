use anyhow::{Context, Result};
use clap::Parser;
use std::collections::HashMap;
use std::io::{self, BufWriter, Write};

#[derive(Parser)]
#[command(
    name = "predq",
    about = "Convert human-readable boolean predicates into MongoDB-style query filters",
    version
)]
struct Cli {
    /// Predicate expression, e.g. '!(draft&&(!mine)&&(open||closed))'
    expression: String,

    /// JSON file mapping keys to replacement filter documents
    #[arg(long = "map", value_name = "FILE")]
    map: Option<String>,

    /// Compact output (no pretty-printing)
    #[arg(short = 'c', long = "compact-output")]
    compact: bool,

    /// Negate the resulting filter
    #[arg(long)]
    invert: bool,

    /// Normalize the resulting filter
    #[arg(long)]
    simplify: bool,

    /// Print the expression's keys one per line instead of a filter
    #[arg(long)]
    keys: bool,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let tree = predq::ExprTree::parse(&cli.expression)
        .with_context(|| format!("failed to parse expression: {}", cli.expression))?;

    let stdout = io::stdout().lock();
    let mut out = BufWriter::new(stdout);

    if cli.keys {
        for key in tree.keys() {
            writeln!(out, "{key}")?;
        }
        out.flush()?;
        return Ok(());
    }

    let mut filter = match &cli.map {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read map file: {path}"))?;
            let replace: HashMap<String, serde_json::Value> = serde_json::from_str(&text)
                .with_context(|| format!("map file is not a JSON object: {path}"))?;
            tree.to_query_with_map(&replace)
                .context("projection failed")?
        }
        None => tree.to_query(),
    };

    if cli.invert {
        filter = predq::query::inverse_filter(&filter);
    }
    if cli.simplify {
        filter = predq::query::simplify_filter(filter);
    }

    let rendered = if cli.compact {
        serde_json::to_string(&filter)
    } else {
        serde_json::to_string_pretty(&filter)
    }
    .context("failed to serialize filter")?;
    writeln!(out, "{rendered}")?;
    out.flush()?;

    Ok(())
}
