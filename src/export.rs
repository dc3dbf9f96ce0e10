use anyhow::Result;
use rust_decimal::prelude::*;

use crate::format::{format_optional, format_rupiah};
use crate::ledger::{JournalSummary, TrialBalanceSummary};
use crate::reports::{BalanceSheet, CashFlowStatement, EquityStatement, IncomeStatement, ReportState};
use crate::traits::{CSVExport, CSVWrite, Tabulate};

/// Formatted rows handed to the CSV and document writers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Table {
    pub title: String,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

impl Table {
    fn new(title: &str, headers: &[&str]) -> Self {
        Table {
            title: title.to_string(),
            headers: headers.iter().map(|h| h.to_string()).collect(),
            rows: Vec::new(),
        }
    }

    fn push(&mut self, row: Vec<String>) {
        self.rows.push(row);
    }
}

impl CSVExport for Table {
    fn export(&self, writer: &mut impl CSVWrite) -> Result<()> {
        writer.write_record(&[&self.title])?;
        writer.write_record(&self.headers)?;
        for row in &self.rows {
            writer.write_record(row)?;
        }
        Ok(())
    }
}

impl CSVExport for [Table] {
    fn export(&self, writer: &mut impl CSVWrite) -> Result<()> {
        for (i, table) in self.iter().enumerate() {
            if i > 0 {
                writer.write_record(&[""])?;
            }
            table.export(&mut *writer)?;
        }
        writer.flush()
    }
}

fn inflow_outflow(amount: Decimal) -> (String, String) {
    if amount.is_sign_negative() {
        (String::new(), format_rupiah(amount.abs()))
    } else {
        (format_rupiah(amount), String::new())
    }
}

impl Tabulate for JournalSummary {
    fn tabulate(&self) -> Table {
        let mut table = Table::new(
            "Jurnal Umum",
            &["No", "Tanggal", "Keterangan", "Ref", "Debit (Rp)", "Kredit (Rp)"],
        );
        for (i, e) in self.with_total().iter().enumerate() {
            table.push(vec![
                (i + 1).to_string(),
                e.date().clone(),
                e.description().clone(),
                e.reference().clone(),
                format_rupiah(*e.debit()),
                format_rupiah(*e.credit()),
            ]);
        }
        table
    }
}

impl Tabulate for TrialBalanceSummary {
    fn tabulate(&self) -> Table {
        let mut table = Table::new(
            "Neraca Saldo",
            &["No", "No Akun", "Nama Akun", "Debit (Rp)", "Kredit (Rp)"],
        );
        for (i, r) in self.with_total().iter().enumerate() {
            table.push(vec![
                (i + 1).to_string(),
                r.reference().clone(),
                r.account_name().clone(),
                format_rupiah(*r.debit()),
                format_rupiah(*r.credit()),
            ]);
        }
        table
    }
}

impl Tabulate for IncomeStatement {
    fn tabulate(&self) -> Table {
        let mut table = Table::new("Laporan Laba/Rugi", &["Keterangan", "Debit (Rp)", "Kredit (Rp)"]);
        for line in &self.lines {
            table.push(vec![
                line.label.clone(),
                format_optional(line.debit),
                format_optional(line.credit),
            ]);
        }
        table
    }
}

impl Tabulate for EquityStatement {
    fn tabulate(&self) -> Table {
        let mut table = Table::new("Laporan Perubahan Modal", &["Keterangan", "Jumlah (Rp)"]);
        for line in &self.lines {
            table.push(vec![line.label.clone(), format_optional(line.amount)]);
        }
        table
    }
}

impl Tabulate for BalanceSheet {
    fn tabulate(&self) -> Table {
        let mut table = Table::new(
            "Laporan Neraca",
            &["Aktiva", "Jumlah (Rp)", "Passiva", "Jumlah (Rp)"],
        );
        for row in &self.rows {
            table.push(vec![
                row.asset_label.clone(),
                format_optional(row.asset_amount),
                row.claim_label.clone(),
                format_optional(row.claim_amount),
            ]);
        }
        table
    }
}

impl Tabulate for CashFlowStatement {
    fn tabulate(&self) -> Table {
        let mut table = Table::new(
            "Laporan Arus Kas",
            &["Aktivitas", "Kas Masuk (Rp)", "Kas Keluar (Rp)"],
        );
        for (i, block) in self.blocks.iter().enumerate() {
            if i > 0 {
                table.push(vec![String::new(), String::new(), String::new()]);
            }
            table.push(vec![block.section.heading().to_string(), String::new(), String::new()]);
            for entry in &block.entries {
                let (inflow, outflow) = inflow_outflow(*entry.amount());
                table.push(vec![format!("  {}", entry.description()), inflow, outflow]);
            }
            let (inflow, outflow) = inflow_outflow(block.net);
            table.push(vec!["Kas bersih".to_string(), inflow, outflow]);
        }
        let (inflow, outflow) = inflow_outflow(self.net_cash_flow);
        table.push(vec![String::new(), String::new(), String::new()]);
        table.push(vec!["Kenaikan (penurunan) kas bersih".to_string(), inflow, outflow]);
        table
    }
}

impl ReportState {
    /// All financial statements in page order.
    pub fn tables(&self) -> Vec<Table> {
        vec![
            self.income_statement.tabulate(),
            self.equity_statement.tabulate(),
            self.balance_sheet.tabulate(),
            self.cash_flow.tabulate(),
        ]
    }
}
