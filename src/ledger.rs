use crate::errors::BooksError;
use crate::models::{JournalEntry, TrialBalanceRow};
use crate::reports::{BalanceCheck, checked_total};
use rust_decimal::prelude::*;

/// The journal with placeholder rows dropped and a closing TOTAL line.
#[derive(Debug, Clone, PartialEq)]
pub struct JournalSummary {
    pub entries: Vec<JournalEntry>,
    pub total_debit: Decimal,
    pub total_credit: Decimal,
}

impl JournalSummary {
    pub fn from_entries(entries: &[JournalEntry]) -> Result<Self, BooksError> {
        let entries: Vec<JournalEntry> = entries.iter().filter(|e| e.is_filled()).cloned().collect();
        let total_debit = checked_total(entries.iter().map(|e| *e.debit()))?;
        let total_credit = checked_total(entries.iter().map(|e| *e.credit()))?;

        Ok(JournalSummary {
            entries,
            total_debit,
            total_credit,
        })
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn total_row(&self) -> JournalEntry {
        JournalEntry::new("", "TOTAL", "", self.total_debit, self.total_credit)
    }

    /// Filled entries followed by the TOTAL line.
    pub fn with_total(&self) -> Vec<JournalEntry> {
        let mut rows = self.entries.clone();
        rows.push(self.total_row());
        rows
    }

    pub fn check(&self, tolerance: Decimal) -> BalanceCheck {
        BalanceCheck::compare(self.total_debit, self.total_credit, tolerance)
    }
}

/// The trial balance with its "Jumlah" line and debit/credit check.
#[derive(Debug, Clone, PartialEq)]
pub struct TrialBalanceSummary {
    pub rows: Vec<TrialBalanceRow>,
    pub total_debit: Decimal,
    pub total_credit: Decimal,
}

impl TrialBalanceSummary {
    pub fn from_rows(rows: &[TrialBalanceRow]) -> Result<Self, BooksError> {
        let rows: Vec<TrialBalanceRow> = rows.iter().filter(|r| r.is_filled()).cloned().collect();
        let total_debit = checked_total(rows.iter().map(|r| *r.debit()))?;
        let total_credit = checked_total(rows.iter().map(|r| *r.credit()))?;

        Ok(TrialBalanceSummary {
            rows,
            total_debit,
            total_credit,
        })
    }

    pub fn with_total(&self) -> Vec<TrialBalanceRow> {
        let mut rows = self.rows.clone();
        rows.push(TrialBalanceRow::new(
            "",
            "Jumlah",
            self.total_debit,
            self.total_credit,
        ));
        rows
    }

    pub fn check(&self, tolerance: Decimal) -> BalanceCheck {
        BalanceCheck::compare(self.total_debit, self.total_credit, tolerance)
    }
}
