use crate::classifier::classify;
use crate::errors::BooksError;
use crate::ledger::{JournalSummary, TrialBalanceSummary};
use crate::models::{CashFlowEntry, JournalEntry, TrialBalanceRow};
use crate::reports::ReportState;
use rust_decimal::prelude::*;

/// Working state of one bookkeeping session.
///
/// Owned by the command handler and passed around explicitly. Reports are
/// never stored here; [`Session::recompute`] derives them from a snapshot of
/// the tables on every call.
#[derive(Debug, Clone, PartialEq)]
pub struct Session {
    journal: Vec<JournalEntry>,
    trial_balance: Vec<TrialBalanceRow>,
    cash_flow: Vec<CashFlowEntry>,
    prive: Decimal,
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl Session {
    /// A fresh session starts with one blank row per table.
    pub fn new() -> Self {
        Session {
            journal: vec![JournalEntry::placeholder()],
            trial_balance: vec![TrialBalanceRow::placeholder()],
            cash_flow: Vec::new(),
            prive: Decimal::ZERO,
        }
    }

    pub fn journal(&self) -> &[JournalEntry] {
        &self.journal
    }

    pub fn trial_balance(&self) -> &[TrialBalanceRow] {
        &self.trial_balance
    }

    pub fn cash_flow_entries(&self) -> &[CashFlowEntry] {
        &self.cash_flow
    }

    pub fn prive(&self) -> Decimal {
        self.prive
    }

    pub fn set_prive(&mut self, prive: Decimal) {
        self.prive = prive;
    }

    /// Takes the table back from the grid after an edit.
    pub fn replace_trial_balance(&mut self, rows: Vec<TrialBalanceRow>) {
        if rows != self.trial_balance {
            tracing::info!(rows = rows.len(), "trial balance updated");
            self.trial_balance = rows;
        }
    }

    pub fn replace_journal(&mut self, entries: Vec<JournalEntry>) {
        if entries != self.journal {
            tracing::info!(rows = entries.len(), "journal updated");
            self.journal = entries;
        }
    }

    /// Appends a blank row and returns its index.
    pub fn add_trial_balance_row(&mut self) -> usize {
        self.trial_balance.push(TrialBalanceRow::placeholder());
        self.trial_balance.len() - 1
    }

    pub fn add_journal_row(&mut self) -> usize {
        self.journal.push(JournalEntry::placeholder());
        self.journal.len() - 1
    }

    pub fn update_trial_balance_row(
        &mut self,
        index: usize,
        row: TrialBalanceRow,
    ) -> Result<(), BooksError> {
        let len = self.trial_balance.len();
        let slot = self
            .trial_balance
            .get_mut(index)
            .ok_or(BooksError::RowOutOfRange { index, len })?;
        *slot = row;
        Ok(())
    }

    pub fn update_journal_row(&mut self, index: usize, entry: JournalEntry) -> Result<(), BooksError> {
        let len = self.journal.len();
        let slot = self
            .journal
            .get_mut(index)
            .ok_or(BooksError::RowOutOfRange { index, len })?;
        *slot = entry;
        Ok(())
    }

    pub fn delete_trial_balance_row(&mut self, index: usize) -> Result<TrialBalanceRow, BooksError> {
        if index >= self.trial_balance.len() {
            return Err(BooksError::RowOutOfRange {
                index,
                len: self.trial_balance.len(),
            });
        }
        Ok(self.trial_balance.remove(index))
    }

    pub fn delete_journal_row(&mut self, index: usize) -> Result<JournalEntry, BooksError> {
        if index >= self.journal.len() {
            return Err(BooksError::RowOutOfRange {
                index,
                len: self.journal.len(),
            });
        }
        Ok(self.journal.remove(index))
    }

    pub fn add_cash_flow_entry(&mut self, entry: CashFlowEntry) {
        self.cash_flow.push(entry);
    }

    pub fn journal_summary(&self) -> Result<JournalSummary, BooksError> {
        JournalSummary::from_entries(&self.journal)
    }

    pub fn trial_balance_summary(&self) -> Result<TrialBalanceSummary, BooksError> {
        TrialBalanceSummary::from_rows(&self.trial_balance)
    }

    /// Classifies the current trial balance and derives every report.
    pub fn recompute(&self, tolerance: Decimal) -> Result<ReportState, BooksError> {
        let classification = classify(&self.trial_balance);
        ReportState::derive(&classification, self.prive, &self.cash_flow, tolerance)
    }
}
