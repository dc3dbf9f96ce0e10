use std::io::{Read, Write};

use anyhow::Result;
use csv::{Reader, ReaderBuilder, Trim, WriterBuilder};
use serde::{Serialize, de::DeserializeOwned};

use crate::{
    csv_writer::CSVWriter,
    document::DocumentWriter,
    export::Table,
    models::{CashFlowEntry, JournalEntry, TrialBalanceRow},
    reports::BalanceCheck,
    session::Session,
    settings::AppConfig,
    traits::{CSVExport, Tabulate},
};

/// How tables leave the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputFormat {
    Csv,
    Document,
}

/// Which page of the books to render.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    Journal,
    TrialBalance,
    Reports,
}

/// Tables plus the advisory balance verdict of a rendered view.
pub struct Rendered {
    pub tables: Vec<Table>,
    pub status: Option<String>,
    pub balanced: bool,
}

pub struct Engine {
    config: AppConfig,
    session: Session,
}

pub fn table_reader(input: Box<dyn Read>, has_headers: bool) -> Reader<Box<dyn Read>> {
    ReaderBuilder::new()
        .has_headers(has_headers)
        .trim(Trim::Headers)
        .flexible(true)
        .from_reader(input)
}

fn read_table<T: DeserializeOwned>(reader: &mut Reader<Box<dyn Read>>) -> Result<Vec<T>> {
    let mut rows = Vec::new();
    for rec in reader.deserialize::<T>() {
        let row: T = rec?;
        rows.push(row);
    }
    Ok(rows)
}

fn write_rows<T: Serialize, W: Write>(rows: &[T], sink: W) -> Result<()> {
    let mut writer = WriterBuilder::new().from_writer(sink);
    for row in rows {
        writer.serialize(row)?;
    }
    writer.flush()?;
    Ok(())
}

impl Engine {
    pub fn new(config: AppConfig) -> Self {
        Self {
            config,
            session: Session::new(),
        }
    }

    pub fn config(&self) -> &AppConfig {
        &self.config
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn session_mut(&mut self) -> &mut Session {
        &mut self.session
    }

    pub fn load_trial_balance(&mut self, mut reader: Reader<Box<dyn Read>>) -> Result<()> {
        let rows: Vec<TrialBalanceRow> = read_table(&mut reader)?;
        tracing::debug!(rows = rows.len(), "trial balance read");
        self.session.replace_trial_balance(rows);
        Ok(())
    }

    pub fn load_journal(&mut self, mut reader: Reader<Box<dyn Read>>) -> Result<()> {
        let entries: Vec<JournalEntry> = read_table(&mut reader)?;
        tracing::debug!(rows = entries.len(), "journal read");
        self.session.replace_journal(entries);
        Ok(())
    }

    pub fn load_cash_flow(&mut self, mut reader: Reader<Box<dyn Read>>) -> Result<()> {
        let entries: Vec<CashFlowEntry> = read_table(&mut reader)?;
        tracing::debug!(rows = entries.len(), "manual cash flow entries read");
        for entry in entries {
            self.session.add_cash_flow_entry(entry);
        }
        Ok(())
    }

    /// Writes the trial balance back out, placeholders included.
    pub fn save_trial_balance<W: Write>(&self, sink: W) -> Result<()> {
        write_rows(self.session.trial_balance(), sink)
    }

    pub fn save_journal<W: Write>(&self, sink: W) -> Result<()> {
        write_rows(self.session.journal(), sink)
    }

    pub fn render(&self, view: View) -> Result<Rendered> {
        let tolerance = self.config.balance_tolerance;
        let rendered = match view {
            View::Journal => {
                let summary = self.session.journal_summary()?;
                if summary.is_empty() {
                    return Ok(Rendered {
                        tables: Vec::new(),
                        status: Some("Belum ada data valid di tabel.".to_string()),
                        balanced: true,
                    });
                }
                let check = summary.check(tolerance);
                Rendered {
                    tables: vec![summary.tabulate()],
                    status: Some(check.describe("Jurnal", "Debit", "Kredit")),
                    balanced: check.is_balanced(),
                }
            }
            View::TrialBalance => {
                let summary = self.session.trial_balance_summary()?;
                let check = summary.check(tolerance);
                Rendered {
                    tables: vec![summary.tabulate()],
                    status: Some(check.describe("Neraca Saldo", "Debit", "Kredit")),
                    balanced: check.is_balanced(),
                }
            }
            View::Reports => {
                tracing::debug!(
                    prive = %self.session.prive(),
                    manual_cash_flow = self.session.cash_flow_entries().len(),
                    "deriving reports"
                );
                let state = self.session.recompute(tolerance)?;
                if !state.unclassified.is_empty() {
                    tracing::warn!(
                        accounts = ?state.unclassified,
                        "accounts left out of every report"
                    );
                }
                let check: &BalanceCheck = &state.balance_sheet.check;
                Rendered {
                    status: Some(check.describe("Neraca", "Aktiva", "Passiva")),
                    balanced: state.is_balanced(),
                    tables: state.tables(),
                }
            }
        };
        Ok(rendered)
    }

    pub fn write<W: Write>(&self, rendered: &Rendered, format: OutputFormat, sink: W) -> Result<()> {
        match format {
            OutputFormat::Csv => {
                let mut writer = CSVWriter::new(sink);
                rendered.tables.export(&mut writer)?;
                writer.into_inner()?;
            }
            OutputFormat::Document => {
                let mut doc = DocumentWriter::new(
                    sink,
                    self.config.heading(),
                    self.config.document.page_width,
                    self.config.document.lines_per_page,
                );
                doc.write_tables(&rendered.tables)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::BooksError;
    use rust_decimal::prelude::*;

    const TRIAL_BALANCE: &str = "\
No Akun,Nama Akun,Debit (Rp),Kredit (Rp)
101,Kas,13200000,0
102,Peralatan,8000000,0
103,Perlengkapan,1500000,0
501,Beban sewa,1000000,0
502,Beban BBM,600000,0
503,Beban gaji,2500000,0
504,Beban listrik,400000,0
505,Beban perawatan,300000,0
301,Modal,0,20000000
401,Pendapatan,0,7500000
,,,
";

    fn config() -> AppConfig {
        AppConfig {
            organization: "BUMDes Maju".to_string(),
            period: "Periode Januari 2025".to_string(),
            balance_tolerance: dec!(0.01),
            has_headers: true,
            document: Default::default(),
        }
    }

    fn reader(data: &'static str) -> Reader<Box<dyn Read>> {
        table_reader(Box::new(data.as_bytes()), true)
    }

    fn engine() -> Result<Engine> {
        let mut engine = Engine::new(config());
        engine.load_trial_balance(reader(TRIAL_BALANCE))?;
        Ok(engine)
    }

    #[test]
    fn test_reports_view_from_csv() -> Result<()> {
        let engine = engine()?;
        let rendered = engine.render(View::Reports)?;

        assert!(rendered.balanced);
        assert_eq!(rendered.tables.len(), 4);
        assert_eq!(
            rendered.status.as_deref(),
            Some("Neraca BALANCE! Total: 22.700.000")
        );
        Ok(())
    }

    #[test]
    fn test_trial_balance_view_flags_imbalance() -> Result<()> {
        let engine = engine()?;
        let rendered = engine.render(View::TrialBalance)?;
        assert!(rendered.balanced);

        let mut engine = engine;
        engine.session_mut().add_trial_balance_row();
        engine.session_mut().update_trial_balance_row(
            11,
            TrialBalanceRow::new("302", "Prive", dec!(1000000), dec!(0)),
        )?;
        let rendered = engine.render(View::TrialBalance)?;
        assert!(!rendered.balanced);
        assert_eq!(
            rendered.status.as_deref(),
            Some("Neraca Saldo TIDAK BALANCE! Debit: 28.500.000 vs Kredit: 27.500.000 (selisih 1.000.000)")
        );
        Ok(())
    }

    #[test]
    fn test_empty_journal_view() -> Result<()> {
        let engine = Engine::new(config());
        let rendered = engine.render(View::Journal)?;
        assert!(rendered.tables.is_empty());
        assert_eq!(rendered.status.as_deref(), Some("Belum ada data valid di tabel."));
        Ok(())
    }

    #[test]
    fn test_journal_view() -> Result<()> {
        let mut engine = Engine::new(config());
        engine.load_journal(reader(
            "Tanggal,Keterangan,Ref,Debit (Rp),Kredit (Rp)\n\
             2025-01-02,Setoran modal,101,20000000,\n\
             2025-01-02,Setoran modal,301,,20000000\n",
        ))?;
        let rendered = engine.render(View::Journal)?;
        assert!(rendered.balanced);
        assert_eq!(rendered.tables[0].rows.len(), 3);
        assert_eq!(rendered.tables[0].rows[2][2], "TOTAL");
        Ok(())
    }

    #[test]
    fn test_manual_cash_flow_file() -> Result<()> {
        let mut engine = engine()?;
        engine.load_cash_flow(reader(
            "Bagian,Aktivitas,Jumlah (Rp)\npendanaan,Pinjaman bank,5000000\n",
        ))?;
        let state = engine.session().recompute(dec!(0.01))?;
        assert_eq!(state.cash_flow.blocks[2].net, dec!(25000000));
        Ok(())
    }

    #[test]
    fn test_save_round_trips_rows() -> Result<()> {
        let engine = engine()?;
        let mut out = Vec::new();
        engine.save_trial_balance(&mut out)?;
        let text = String::from_utf8(out)?;
        assert!(text.starts_with("No Akun,Nama Akun,Debit (Rp),Kredit (Rp)\n101,Kas,13200000,0\n"));
        assert!(text.ends_with(",,0,0\n"));
        Ok(())
    }

    #[test]
    fn test_write_csv_and_document() -> Result<()> {
        let engine = engine()?;
        let rendered = engine.render(View::Reports)?;

        let mut csv_out = Vec::new();
        engine.write(&rendered, OutputFormat::Csv, &mut csv_out)?;
        let csv_text = String::from_utf8(csv_out)?;
        assert!(csv_text.starts_with("Laporan Laba/Rugi\n"));
        assert!(csv_text.contains("Jml Kewajiban & Ekuitas,22.700.000"));

        let mut doc_out = Vec::new();
        engine.write(&rendered, OutputFormat::Document, &mut doc_out)?;
        let doc_text = String::from_utf8(doc_out)?;
        assert!(doc_text.contains("BUMDes Maju"));
        assert!(doc_text.contains("Laporan Arus Kas"));
        Ok(())
    }

    #[test]
    fn test_save_journal_keeps_edits() -> Result<()> {
        let mut engine = Engine::new(config());
        engine.load_journal(reader(
            "Tanggal,Keterangan,Ref,Debit (Rp),Kredit (Rp)\n\
             2025-01-02,Setoran modal,101,20000000,0\n",
        ))?;
        let session = engine.session_mut();
        let index = session.add_journal_row();
        session.update_journal_row(
            index,
            JournalEntry::new("2025-01-02", "Setoran modal", "301", dec!(0), dec!(20000000)),
        )?;

        let mut out = Vec::new();
        engine.save_journal(&mut out)?;
        let text = String::from_utf8(out)?;
        assert_eq!(
            text,
            "Tanggal,Keterangan,Ref,Debit (Rp),Kredit (Rp)\n\
             2025-01-02,Setoran modal,101,20000000,0\n\
             2025-01-02,Setoran modal,301,0,20000000\n"
        );
        Ok(())
    }

    #[test]
    fn test_overflowing_amounts_fail_the_render() -> Result<()> {
        let mut engine = Engine::new(config());
        engine.load_trial_balance(reader(
            "No Akun,Nama Akun,Debit (Rp),Kredit (Rp)\n\
             101,Kas,79228162514264337593543950335,0\n\
             102,Kas kecil,79228162514264337593543950335,0\n",
        ))?;
        let err = engine.render(View::Reports).err();
        assert!(matches!(
            err.as_ref().and_then(|e| e.downcast_ref::<BooksError>()),
            Some(BooksError::ValueOverflow)
        ));
        Ok(())
    }
}
