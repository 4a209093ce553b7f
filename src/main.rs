use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use tracing::info;

use excel_joiner::join_selector::join_tables;
use excel_joiner::table_io::{read_table, write_table};

#[derive(Parser)]
#[command(name = "excel-joiner")]
#[command(about = "Joins two tabular files on their best-matching column pair")]
struct Args {
    /// First input file (CSV with a header row)
    file1: PathBuf,

    /// Second input file (CSV with a header row)
    file2: PathBuf,

    /// Where to write the joined table
    #[arg(short, long, default_value = "joined_output.csv")]
    output: PathBuf,

    /// Print the full column-pair ranking before joining
    #[arg(long)]
    suggestions: bool,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt::init();

    let args = Args::parse();

    let df1 = read_table(&args.file1)?;
    let df2 = read_table(&args.file2)?;
    info!(
        "Loaded {} ({} rows) and {} ({} rows)",
        args.file1.display(),
        df1.height(),
        args.file2.display(),
        df2.height()
    );

    let mut outcome = join_tables(&df1, &df2)?;

    if args.suggestions {
        println!("Column pair ranking:");
        for pair in &outcome.suggestions {
            println!(
                "  {} <-> {}: {:.2}",
                pair.left_column, pair.right_column, pair.score
            );
        }
    }

    write_table(&mut outcome.joined, &args.output)?;

    println!(
        "Joined on ({}, {}) with score {:.2}: {} rows written to {}",
        outcome.best.left_column,
        outcome.best.right_column,
        outcome.best.score,
        outcome.joined.height(),
        args.output.display()
    );

    Ok(())
}
