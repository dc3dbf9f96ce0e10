use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand, ValueEnum};
use rust_decimal::Decimal;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

mod classifier;
mod csv_writer;
mod document;
mod errors;
mod export;
mod format;
mod ledger;
mod models;
mod processor;
mod reports;
mod session;
mod settings;
mod traits;

use errors::BooksError;
use models::{JournalEntry, TrialBalanceRow, coerce_amount};
use processor::{Engine, OutputFormat, View, table_reader};
use settings::AppConfig;

#[derive(Copy, Clone, Debug, ValueEnum)]
enum Fmt {
    Csv,
    Document,
}

impl From<Fmt> for OutputFormat {
    fn from(f: Fmt) -> Self {
        match f {
            Fmt::Csv => OutputFormat::Csv,
            Fmt::Document => OutputFormat::Document,
        }
    }
}

/// A table that can be edited in place.
#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum TableKind {
    Journal,
    TrialBalance,
}

#[derive(Parser, Debug)]
#[command(name = "bumdes", version, about = "Pembukuan BUMDes: jurnal, neraca saldo dan laporan keuangan")]
struct Cli {
    /// Configuration file (default: ./bumdes.toml if present)
    #[arg(long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Args, Debug)]
struct OutputArgs {
    /// Output file (default: stdout)
    #[arg(short = 'o', long = "output")]
    output: Option<String>,

    #[arg(long, value_enum, default_value = "document")]
    format: Fmt,
}

#[derive(Args, Debug)]
struct RowArgs {
    /// Account number (No Akun) or journal reference (Ref)
    #[arg(long, default_value = "")]
    reference: String,

    /// Account name (Nama Akun) or journal description (Keterangan)
    #[arg(long, visible_alias = "description", default_value = "")]
    name: String,

    /// Journal date (Tanggal), unused by the trial balance
    #[arg(long, default_value = "")]
    date: String,

    #[arg(long, default_value = "0")]
    debit: String,

    #[arg(long, default_value = "0")]
    credit: String,
}

impl RowArgs {
    fn to_row(&self) -> TrialBalanceRow {
        TrialBalanceRow::new(
            &self.reference,
            &self.name,
            coerce_amount(&self.debit),
            coerce_amount(&self.credit),
        )
    }

    fn to_entry(&self) -> JournalEntry {
        JournalEntry::new(
            &self.date,
            &self.name,
            &self.reference,
            coerce_amount(&self.debit),
            coerce_amount(&self.credit),
        )
    }
}

#[derive(Subcommand, Debug)]
enum Command {
    /// General journal (Jurnal Umum) with its TOTAL line
    Journal {
        /// Journal CSV (default: stdin)
        #[arg(short = 'i', long = "input")]
        input: Option<String>,
        #[command(flatten)]
        out: OutputArgs,
    },
    /// Trial balance (Neraca Saldo) with its debit/credit check
    TrialBalance {
        /// Trial balance CSV (default: stdin)
        #[arg(short = 'i', long = "input")]
        input: Option<String>,
        #[command(flatten)]
        out: OutputArgs,
    },
    /// Income statement, equity, balance sheet and cash flow
    Reports {
        /// Trial balance CSV (default: stdin)
        #[arg(short = 'i', long = "input")]
        input: Option<String>,
        /// Owner withdrawals (prive) for the period
        #[arg(long)]
        prive: Option<String>,
        /// Extra cash-flow lines: Bagian,Aktivitas,Jumlah (Rp)
        #[arg(long = "cash-flow")]
        cash_flow: Option<String>,
        #[command(flatten)]
        out: OutputArgs,
    },
    /// Append a row to a journal or trial balance file
    AddRow {
        #[arg(short = 'i', long = "input")]
        input: String,
        #[arg(long, value_enum, default_value = "trial-balance")]
        table: TableKind,
        #[command(flatten)]
        row: RowArgs,
    },
    /// Replace data row N of a journal or trial balance file (first row is 1)
    SetRow {
        #[arg(short = 'i', long = "input")]
        input: String,
        #[arg(long, value_enum, default_value = "trial-balance")]
        table: TableKind,
        #[arg(long)]
        row: usize,
        #[command(flatten)]
        values: RowArgs,
    },
    /// Delete data row N of a journal or trial balance file (first row is 1)
    DeleteRow {
        #[arg(short = 'i', long = "input")]
        input: String,
        #[arg(long, value_enum, default_value = "trial-balance")]
        table: TableKind,
        #[arg(long)]
        row: usize,
    },
}

fn open_input(path: Option<&str>) -> Result<Box<dyn io::Read>> {
    Ok(match path {
        Some(p) => Box::new(File::open(p).with_context(|| format!("cannot open {p}"))?),
        None => Box::new(io::stdin()),
    })
}

fn open_output(path: Option<&str>) -> Result<Box<dyn Write>> {
    Ok(match path {
        Some(p) => Box::new(BufWriter::new(
            File::create(p).with_context(|| format!("cannot create {p}"))?,
        )),
        None => Box::new(io::stdout()),
    })
}

fn parse_amount(raw: &str) -> Result<Decimal> {
    raw.trim()
        .parse::<Decimal>()
        .map_err(|_| BooksError::InvalidAmount(raw.to_string()).into())
}

/// Rows are numbered from 1 on the command line.
fn row_index(row: usize, len: usize) -> Result<usize> {
    row.checked_sub(1)
        .ok_or_else(|| BooksError::RowOutOfRange { index: row, len }.into())
}

/// Names the file in CSV read failures.
fn table_read_error(e: anyhow::Error, path: Option<&str>) -> anyhow::Error {
    match e.downcast::<csv::Error>() {
        Ok(source) => BooksError::TableRead {
            path: path.unwrap_or("<stdin>").to_string(),
            source,
        }
        .into(),
        Err(e) => e,
    }
}

fn load_table(engine: &mut Engine, table: TableKind, path: Option<&str>) -> Result<()> {
    let has_headers = engine.config().has_headers;
    let reader = table_reader(open_input(path)?, has_headers);
    match table {
        TableKind::Journal => engine.load_journal(reader),
        TableKind::TrialBalance => engine.load_trial_balance(reader),
    }
    .map_err(|e| table_read_error(e, path))
}

fn save_table(engine: &Engine, table: TableKind, path: &str) -> Result<()> {
    let file = File::create(path).with_context(|| format!("cannot write {path}"))?;
    match table {
        TableKind::Journal => engine.save_journal(BufWriter::new(file)),
        TableKind::TrialBalance => engine.save_trial_balance(BufWriter::new(file)),
    }
}

fn row_count(engine: &Engine, table: TableKind) -> usize {
    match table {
        TableKind::Journal => engine.session().journal().len(),
        TableKind::TrialBalance => engine.session().trial_balance().len(),
    }
}

fn show(engine: &Engine, view: View, out: &OutputArgs) -> Result<()> {
    let rendered = engine.render(view)?;
    let sink = open_output(out.output.as_deref())?;
    engine.write(&rendered, out.format.into(), sink)?;

    if let Some(status) = &rendered.status {
        if rendered.balanced {
            tracing::info!("{status}");
        } else {
            tracing::warn!("{status}");
        }
    }
    Ok(())
}

fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| "bumdes_books=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(io::stderr))
        .init();

    let cli = Cli::parse();
    let config = AppConfig::load(cli.config.as_deref())?;
    tracing::debug!(?config, "configuration loaded");

    let mut engine = Engine::new(config);

    match cli.command {
        Command::Journal { input, out } => {
            load_table(&mut engine, TableKind::Journal, input.as_deref())?;
            show(&engine, View::Journal, &out)?;
        }
        Command::TrialBalance { input, out } => {
            load_table(&mut engine, TableKind::TrialBalance, input.as_deref())?;
            show(&engine, View::TrialBalance, &out)?;
        }
        Command::Reports {
            input,
            prive,
            cash_flow,
            out,
        } => {
            load_table(&mut engine, TableKind::TrialBalance, input.as_deref())?;
            if let Some(raw) = prive {
                engine.session_mut().set_prive(parse_amount(&raw)?);
            }
            if let Some(path) = cash_flow {
                let has_headers = engine.config().has_headers;
                engine.load_cash_flow(table_reader(open_input(Some(&path))?, has_headers))?;
            }
            show(&engine, View::Reports, &out)?;
        }
        Command::AddRow { input, table, row } => {
            load_table(&mut engine, table, Some(&input))?;
            let session = engine.session_mut();
            let index = match table {
                TableKind::Journal => {
                    let index = session.add_journal_row();
                    session.update_journal_row(index, row.to_entry())?;
                    index
                }
                TableKind::TrialBalance => {
                    let index = session.add_trial_balance_row();
                    session.update_trial_balance_row(index, row.to_row())?;
                    index
                }
            };
            save_table(&engine, table, &input)?;
            tracing::info!(row = index + 1, file = %input, "row added");
        }
        Command::SetRow {
            input,
            table,
            row,
            values,
        } => {
            load_table(&mut engine, table, Some(&input))?;
            let index = row_index(row, row_count(&engine, table))?;
            let session = engine.session_mut();
            match table {
                TableKind::Journal => session.update_journal_row(index, values.to_entry())?,
                TableKind::TrialBalance => session.update_trial_balance_row(index, values.to_row())?,
            }
            save_table(&engine, table, &input)?;
            tracing::info!(row, file = %input, "row updated");
        }
        Command::DeleteRow { input, table, row } => {
            load_table(&mut engine, table, Some(&input))?;
            let index = row_index(row, row_count(&engine, table))?;
            let session = engine.session_mut();
            let removed = match table {
                TableKind::Journal => session.delete_journal_row(index)?.description().clone(),
                TableKind::TrialBalance => session.delete_trial_balance_row(index)?.account_name().clone(),
            };
            save_table(&engine, table, &input)?;
            tracing::info!(row, removed = %removed, file = %input, "row deleted");
        }
    }

    Ok(())
}
