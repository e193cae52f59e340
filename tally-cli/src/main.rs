use anyhow::{Context, Result, anyhow, bail};
use clap::{Args, Parser, Subcommand, ValueEnum};
use std::fs::File;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use tally_core::{
    AccountType, ParseResponse, StatementSummary, TransactionFilter, compute_balance_mismatches, raw_line_sample,
    write_csv,
};
use tally_ingest::{DateOrder, ParseOptions, extract_raw_lines, parse_bank_statement_with, source_for_path};

mod config;
mod output;
mod state;

/// How many unparsed lines `audit` prints
const AUDIT_UNPARSED_LIMIT: usize = 300;

#[derive(Parser, Debug)]
#[command(name = "tally", version, about = "Turn bank statement text into a transaction table")]
struct Cli {
    /// Config file (default: ~/.tally/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// More logging: -v info, -vv debug
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Parse a statement (.pdf, .json word boxes, or extracted text) into transactions
    Parse {
        file: PathBuf,

        #[command(flatten)]
        parse: ParseArgs,

        #[arg(long, value_enum, default_value_t = OutputFormat::Table)]
        format: OutputFormat,

        /// Write output here instead of stdout
        #[arg(long)]
        out: Option<PathBuf>,

        /// Keep only these account types (repeatable)
        #[arg(long = "type")]
        types: Vec<AccountType>,

        /// Keep only rows whose description contains this text (case-insensitive)
        #[arg(long)]
        search: Option<String>,

        /// Include debit/credit columns
        #[arg(long, default_value_t = false)]
        full: bool,
    },

    /// Check running balances and list lines that looked like transactions but did not parse
    Audit {
        file: PathBuf,

        #[command(flatten)]
        parse: ParseArgs,

        /// Allowed balance drift (default from config, 0.01)
        #[arg(long)]
        tolerance: Option<f64>,
    },

    /// Show the normalized lines the parser sees
    Lines {
        file: PathBuf,

        #[command(flatten)]
        parse: ParseArgs,

        #[arg(long, default_value_t = 400)]
        limit: usize,
    },

    /// Config file helpers
    Config {
        #[command(subcommand)]
        command: ConfigCommand,
    },
}

#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Write a default config to --config, or ~/.tally/config.toml
    Init,
    /// Print the effective config
    Show,
}

#[derive(Args, Debug, Clone, Default)]
struct ParseArgs {
    /// Ambiguous two-part dates: MD (month first) or DM (day first)
    #[arg(long)]
    date_order: Option<DateOrder>,

    /// Do not rejoin wrapped description lines
    #[arg(long, default_value_t = false)]
    no_merge: bool,

    /// Keep page footers and statement banners
    #[arg(long, default_value_t = false)]
    keep_header_footer: bool,
}

impl ParseArgs {
    fn apply(&self, mut opts: ParseOptions) -> ParseOptions {
        if let Some(order) = self.date_order {
            opts.date_order = order;
        }
        if self.no_merge {
            opts.extract.merge_wrapped = false;
        }
        if self.keep_header_footer {
            opts.extract.drop_header_footer = false;
        }
        opts
    }
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
enum OutputFormat {
    Table,
    Csv,
    Json,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let cfg = config::load_config(cli.config.as_deref())?;

    simple_logger::SimpleLogger::new()
        .with_level(cfg.log_level(cli.verbose))
        .env()
        .init()
        .map_err(|e| anyhow!("init logging: {e}"))?;

    match cli.command {
        Command::Parse {
            file,
            parse,
            format,
            out,
            types,
            search,
            full,
        } => {
            let opts = parse.apply(cfg.parse_options());
            let filter = TransactionFilter {
                account_types: types,
                description_contains: search,
            };
            run_parse(&file, &opts, &filter, format, out.as_deref(), full)?;
        }

        Command::Audit { file, parse, tolerance } => {
            let opts = parse.apply(cfg.parse_options());
            run_audit(&file, &opts, tolerance.unwrap_or(cfg.reconcile.tolerance))?;
        }

        Command::Lines { file, parse, limit } => {
            ensure_exists(&file)?;
            let opts = parse.apply(cfg.parse_options());
            let source = source_for_path(&file);
            let lines = extract_raw_lines(source.as_ref(), &opts.extract);
            if lines.is_empty() {
                println!("No raw lines captured.");
            }
            for l in raw_line_sample(&lines, limit) {
                println!("{l}");
            }
        }

        Command::Config { command } => match command {
            ConfigCommand::Init => {
                let (path, created) = config::init_config(cli.config.as_deref())?;
                if created {
                    println!("Wrote {}", path.display());
                } else {
                    println!("Config already exists: {}", path.display());
                }
            }
            ConfigCommand::Show => {
                let s = toml::to_string_pretty(&cfg).context("serialize config")?;
                println!("{s}");
            }
        },
    }

    Ok(())
}

fn ensure_exists(file: &Path) -> Result<()> {
    if !file.exists() {
        bail!("statement not found: {}", file.display());
    }
    Ok(())
}

fn open_output(out: Option<&Path>) -> Result<Box<dyn Write>> {
    Ok(match out {
        Some(p) => Box::new(File::create(p).with_context(|| format!("create {}", p.display()))?),
        None => Box::new(io::stdout().lock()),
    })
}

fn run_parse(
    file: &Path,
    opts: &ParseOptions,
    filter: &TransactionFilter,
    format: OutputFormat,
    out: Option<&Path>,
    full: bool,
) -> Result<()> {
    ensure_exists(file)?;
    let source = source_for_path(file);
    let result = parse_bank_statement_with(source.as_ref(), opts);
    let mut w = open_output(out)?;

    match format {
        OutputFormat::Json => {
            serde_json::to_writer_pretty(&mut w, &ParseResponse::filtered(&result, filter)).context("write json")?;
            writeln!(w)?;
        }
        OutputFormat::Csv => {
            write_csv(&mut w, filter.apply(&result.transactions), full)?;
        }
        OutputFormat::Table => {
            if result.is_empty() {
                writeln!(w, "No transactions parsed from {}.", file.display())?;
                if !result.unparsed.is_empty() {
                    writeln!(w, "{} date-like lines did not parse; run `tally audit` to see them.", result.unparsed.len())?;
                }
                return Ok(());
            }
            let summary = StatementSummary::from_transactions(&result.transactions);
            writeln!(w, "{}\n", output::summary_line(&summary))?;
            let rows = filter.apply(&result.transactions);
            write!(w, "{}", output::transaction_table(&rows, full))?;
            if rows.len() != result.transactions.len() {
                writeln!(w, "\nShowing {} of {} transactions", rows.len(), result.transactions.len())?;
            }
        }
    }

    w.flush().context("flush output")?;
    Ok(())
}

fn run_audit(file: &Path, opts: &ParseOptions, tolerance: f64) -> Result<()> {
    ensure_exists(file)?;
    let source = source_for_path(file);
    let result = parse_bank_statement_with(source.as_ref(), opts);

    println!("## Balance mismatches (tolerance {tolerance:.2})\n");
    let mismatches = compute_balance_mismatches(&result.transactions, tolerance);
    if mismatches.is_empty() {
        println!("None detected.");
    } else {
        print!("{}", output::mismatch_table(&mismatches));
    }

    println!("\n## Unparsed candidate lines\n");
    if result.unparsed.is_empty() {
        println!("None.");
    } else {
        for line in result.unparsed.iter().take(AUDIT_UNPARSED_LIMIT) {
            println!("{line}");
        }
        if result.unparsed.len() > AUDIT_UNPARSED_LIMIT {
            println!("\nShowing first {AUDIT_UNPARSED_LIMIT} of {}", result.unparsed.len());
        }
    }

    Ok(())
}
