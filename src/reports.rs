use crate::classifier::Classification;
use crate::errors::BooksError;
use crate::format::format_rupiah;
use crate::models::{CashFlowEntry, CashFlowSection, ClassifiedAccount};
use rust_decimal::prelude::*;

pub const DEFAULT_TOLERANCE: Decimal = dec!(0.01);

/// Adds up amounts, failing instead of panicking past `Decimal::MAX`.
pub fn checked_total<I>(amounts: I) -> Result<Decimal, BooksError>
where
    I: IntoIterator<Item = Decimal>,
{
    amounts.into_iter().try_fold(Decimal::ZERO, |acc, amount| {
        acc.checked_add(amount).ok_or(BooksError::ValueOverflow)
    })
}

fn sum(accounts: &[ClassifiedAccount]) -> Result<Decimal, BooksError> {
    checked_total(accounts.iter().map(|a| a.amount))
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ReportTotals {
    pub total_revenue: Decimal,
    pub total_expense: Decimal,
    pub net_income: Decimal,
    pub total_current_assets: Decimal,
    pub total_fixed_assets: Decimal,
    pub total_assets: Decimal,
    pub modal_awal: Decimal,
    pub prive: Decimal,
    pub modal_akhir: Decimal,
    pub total_liabilities: Decimal,
    pub total_liabilities_and_equity: Decimal,
}

impl ReportTotals {
    pub fn compute(c: &Classification, prive: Decimal) -> Result<Self, BooksError> {
        let total_revenue = sum(&c.revenue)?;
        let total_expense = sum(&c.expenses)?;
        let net_income = total_revenue
            .checked_sub(total_expense)
            .ok_or(BooksError::ValueOverflow)?;
        let total_current_assets = sum(&c.current_assets)?;
        let total_fixed_assets = sum(&c.fixed_assets)?;
        let total_assets = total_current_assets
            .checked_add(total_fixed_assets)
            .ok_or(BooksError::ValueOverflow)?;
        let modal_akhir = c
            .modal_awal
            .checked_add(net_income)
            .and_then(|m| m.checked_sub(prive))
            .ok_or(BooksError::ValueOverflow)?;
        let total_liabilities = sum(&c.liabilities)?;
        let total_liabilities_and_equity = total_liabilities
            .checked_add(modal_akhir)
            .ok_or(BooksError::ValueOverflow)?;

        Ok(ReportTotals {
            total_revenue,
            total_expense,
            net_income,
            total_current_assets,
            total_fixed_assets,
            total_assets,
            modal_awal: c.modal_awal,
            prive,
            modal_akhir,
            total_liabilities,
            total_liabilities_and_equity,
        })
    }
}

/// Outcome of comparing two totals that should agree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BalanceCheck {
    Balanced {
        total: Decimal,
    },
    Unbalanced {
        left: Decimal,
        right: Decimal,
        /// `left - right`
        difference: Decimal,
    },
}

impl BalanceCheck {
    pub fn compare(left: Decimal, right: Decimal, tolerance: Decimal) -> Self {
        // an overflowing difference is far outside any tolerance
        let difference = left.saturating_sub(right);
        if difference.abs() <= tolerance {
            BalanceCheck::Balanced { total: left }
        } else {
            BalanceCheck::Unbalanced {
                left,
                right,
                difference,
            }
        }
    }

    pub fn is_balanced(&self) -> bool {
        matches!(self, BalanceCheck::Balanced { .. })
    }

    /// Renders the check, naming the two sides.
    pub fn describe(&self, subject: &str, left_name: &str, right_name: &str) -> String {
        match self {
            BalanceCheck::Balanced { total } => {
                format!("{subject} BALANCE! Total: {}", format_rupiah(*total))
            }
            BalanceCheck::Unbalanced {
                left,
                right,
                difference,
            } => format!(
                "{subject} TIDAK BALANCE! {left_name}: {} vs {right_name}: {} (selisih {})",
                format_rupiah(*left),
                format_rupiah(*right),
                format_rupiah(*difference)
            ),
        }
    }
}

/// A line with a debit and a credit column; `None` renders as a blank cell.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatementLine {
    pub label: String,
    pub debit: Option<Decimal>,
    pub credit: Option<Decimal>,
}

impl StatementLine {
    fn blank() -> Self {
        Self::text("")
    }

    fn text(label: &str) -> Self {
        StatementLine {
            label: label.to_string(),
            debit: None,
            credit: None,
        }
    }

    fn debit(label: &str, amount: Decimal) -> Self {
        StatementLine {
            label: label.to_string(),
            debit: Some(amount),
            credit: None,
        }
    }

    fn credit(label: &str, amount: Decimal) -> Self {
        StatementLine {
            label: label.to_string(),
            debit: None,
            credit: Some(amount),
        }
    }
}

/// Laporan Laba/Rugi.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IncomeStatement {
    pub lines: Vec<StatementLine>,
}

impl IncomeStatement {
    pub fn derive(c: &Classification, totals: &ReportTotals) -> Self {
        let mut lines = Vec::new();

        lines.extend(c.revenue.iter().map(|a| StatementLine::credit(&a.name, a.amount)));
        lines.push(StatementLine::blank());
        lines.push(StatementLine::credit("Total Pendapatan", totals.total_revenue));
        lines.push(StatementLine::blank());
        lines.extend(c.expenses.iter().map(|a| StatementLine::debit(&a.name, a.amount)));
        lines.push(StatementLine::blank());
        lines.push(StatementLine::debit("Total Beban", totals.total_expense));
        lines.push(StatementLine::blank());
        lines.push(net_income_line(totals.net_income));

        IncomeStatement { lines }
    }
}

/// A loss is shown as a positive figure in the debit column.
fn net_income_line(net_income: Decimal) -> StatementLine {
    if net_income.is_sign_negative() && !net_income.is_zero() {
        StatementLine::debit("Rugi Bersih", net_income.abs())
    } else {
        StatementLine::credit("Laba Bersih", net_income)
    }
}

/// A labeled single-column line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AmountLine {
    pub label: String,
    pub amount: Option<Decimal>,
}

impl AmountLine {
    fn new(label: &str, amount: Decimal) -> Self {
        AmountLine {
            label: label.to_string(),
            amount: Some(amount),
        }
    }

    fn blank() -> Self {
        AmountLine {
            label: String::new(),
            amount: None,
        }
    }
}

/// Laporan Perubahan Modal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EquityStatement {
    pub lines: Vec<AmountLine>,
}

impl EquityStatement {
    pub fn derive(totals: &ReportTotals) -> Self {
        let result_label = if totals.net_income.is_sign_negative() && !totals.net_income.is_zero() {
            "Rugi Bersih"
        } else {
            "Laba Bersih"
        };

        EquityStatement {
            lines: vec![
                AmountLine::new("Modal Awal", totals.modal_awal),
                AmountLine::new(result_label, totals.net_income),
                AmountLine::new("Prive", totals.prive),
                AmountLine::blank(),
                AmountLine::new("Modal Akhir", totals.modal_akhir),
            ],
        }
    }
}

/// One row of the two-column balance sheet.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BalanceSheetRow {
    pub asset_label: String,
    pub asset_amount: Option<Decimal>,
    pub claim_label: String,
    pub claim_amount: Option<Decimal>,
}

type Cell = (String, Option<Decimal>);

fn heading(label: &str) -> Cell {
    (label.to_string(), None)
}

fn amount(label: &str, value: Decimal) -> Cell {
    (label.to_string(), Some(value))
}

fn item(account: &ClassifiedAccount) -> Cell {
    (format!("  {}", account.name), Some(account.amount))
}

/// Zips two columns, padding the shorter one with empty cells.
fn side_by_side(assets: Vec<Cell>, claims: Vec<Cell>) -> Vec<BalanceSheetRow> {
    let height = assets.len().max(claims.len());
    let mut assets = assets.into_iter();
    let mut claims = claims.into_iter();

    (0..height)
        .map(|_| {
            let (asset_label, asset_amount) = assets.next().unwrap_or_default();
            let (claim_label, claim_amount) = claims.next().unwrap_or_default();
            BalanceSheetRow {
                asset_label,
                asset_amount,
                claim_label,
                claim_amount,
            }
        })
        .collect()
}

/// Laporan Neraca (Posisi Keuangan).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BalanceSheet {
    pub rows: Vec<BalanceSheetRow>,
    pub check: BalanceCheck,
}

impl BalanceSheet {
    pub fn derive(c: &Classification, totals: &ReportTotals, tolerance: Decimal) -> Self {
        let mut rows = side_by_side(
            vec![heading("Aktiva Lancar:")],
            vec![heading("Kewajiban:")],
        );

        // current assets and liabilities share rows
        rows.extend(side_by_side(
            c.current_assets.iter().map(item).collect(),
            c.liabilities.iter().map(item).collect(),
        ));
        rows.extend(side_by_side(
            vec![
                heading(""),
                amount("Jml aktiva lancar", totals.total_current_assets),
            ],
            vec![
                heading(""),
                amount("Jml kewajiban", totals.total_liabilities),
            ],
        ));

        let mut fixed = vec![heading(""), heading("Aktiva Tetap:")];
        fixed.extend(c.fixed_assets.iter().map(item));
        fixed.push(amount("Jml aktiva tetap", totals.total_fixed_assets));

        let mut equity = vec![
            heading(""),
            heading("Ekuitas:"),
            amount("  Modal", totals.modal_awal),
            amount("  Laba", totals.net_income),
        ];
        if !totals.prive.is_zero() {
            equity.push(amount("  Prive", -totals.prive));
        }
        equity.push(amount("Jml ekuitas", totals.modal_akhir));

        rows.extend(side_by_side(fixed, equity));
        rows.extend(side_by_side(
            vec![heading(""), amount("Jml Aktiva", totals.total_assets)],
            vec![
                heading(""),
                amount("Jml Kewajiban & Ekuitas", totals.total_liabilities_and_equity),
            ],
        ));

        BalanceSheet {
            rows,
            check: BalanceCheck::compare(
                totals.total_assets,
                totals.total_liabilities_and_equity,
                tolerance,
            ),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CashFlowBlock {
    pub section: CashFlowSection,
    pub entries: Vec<CashFlowEntry>,
    pub net: Decimal,
}

/// Laporan Arus Kas: seeded from the buckets, extended by hand.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CashFlowStatement {
    pub blocks: Vec<CashFlowBlock>,
    pub net_cash_flow: Decimal,
}

fn is_cash(account: &ClassifiedAccount) -> bool {
    account.name.to_lowercase().contains("kas")
}

/// Entries implied by the classified trial balance.
pub fn seed_cash_flow(c: &Classification, prive: Decimal) -> Vec<CashFlowEntry> {
    let mut seeded = Vec::new();

    for a in &c.revenue {
        seeded.push(CashFlowEntry::new(
            CashFlowSection::Operating,
            &format!("Penerimaan {}", a.name),
            a.amount,
        ));
    }
    for a in &c.expenses {
        seeded.push(CashFlowEntry::new(
            CashFlowSection::Operating,
            &format!("Pembayaran {}", a.name),
            -a.amount,
        ));
    }
    for a in c.fixed_assets.iter().chain(c.current_assets.iter().filter(|a| !is_cash(a))) {
        seeded.push(CashFlowEntry::new(
            CashFlowSection::Investing,
            &format!("Pembelian {}", a.name),
            -a.amount,
        ));
    }
    if !c.modal_awal.is_zero() {
        seeded.push(CashFlowEntry::new(
            CashFlowSection::Financing,
            "Setoran modal",
            c.modal_awal,
        ));
    }
    if !prive.is_zero() {
        seeded.push(CashFlowEntry::new(CashFlowSection::Financing, "Prive", -prive));
    }

    seeded
}

impl CashFlowStatement {
    pub fn derive(
        seeded: Vec<CashFlowEntry>,
        manual: &[CashFlowEntry],
    ) -> Result<Self, BooksError> {
        let all: Vec<CashFlowEntry> = seeded.into_iter().chain(manual.iter().cloned()).collect();

        let blocks = [
            CashFlowSection::Operating,
            CashFlowSection::Investing,
            CashFlowSection::Financing,
        ]
        .into_iter()
        .map(|section| {
            let entries: Vec<CashFlowEntry> = all
                .iter()
                .filter(|e| *e.section() == section)
                .cloned()
                .collect();
            let net = checked_total(entries.iter().map(|e| *e.amount()))?;
            Ok(CashFlowBlock {
                section,
                entries,
                net,
            })
        })
        .collect::<Result<Vec<CashFlowBlock>, BooksError>>()?;

        let net_cash_flow = checked_total(blocks.iter().map(|b| b.net))?;

        Ok(CashFlowStatement {
            blocks,
            net_cash_flow,
        })
    }
}

/// Everything shown on the reports page, derived in one pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportState {
    pub totals: ReportTotals,
    pub income_statement: IncomeStatement,
    pub equity_statement: EquityStatement,
    pub balance_sheet: BalanceSheet,
    pub cash_flow: CashFlowStatement,
    pub unclassified: Vec<String>,
}

impl ReportState {
    pub fn derive(
        c: &Classification,
        prive: Decimal,
        manual_cash_flow: &[CashFlowEntry],
        tolerance: Decimal,
    ) -> Result<Self, BooksError> {
        let totals = ReportTotals::compute(c, prive)?;

        Ok(ReportState {
            income_statement: IncomeStatement::derive(c, &totals),
            equity_statement: EquityStatement::derive(&totals),
            balance_sheet: BalanceSheet::derive(c, &totals, tolerance),
            cash_flow: CashFlowStatement::derive(seed_cash_flow(c, prive), manual_cash_flow)?,
            unclassified: c.unclassified.clone(),
            totals,
        })
    }

    pub fn is_balanced(&self) -> bool {
        self.balance_sheet.check.is_balanced()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::classifier::classify;
    use crate::models::TrialBalanceRow;
    use anyhow::Result;

    fn row(name: &str, debit: Decimal, credit: Decimal) -> TrialBalanceRow {
        TrialBalanceRow::new("", name, debit, credit)
    }

    fn balanced_rows() -> Vec<TrialBalanceRow> {
        vec![
            row("Kas", dec!(13200000), dec!(0)),
            row("Peralatan", dec!(8000000), dec!(0)),
            row("Perlengkapan", dec!(1500000), dec!(0)),
            row("Beban sewa", dec!(1000000), dec!(0)),
            row("Beban BBM", dec!(600000), dec!(0)),
            row("Beban gaji", dec!(2500000), dec!(0)),
            row("Beban listrik", dec!(400000), dec!(0)),
            row("Beban perawatan", dec!(300000), dec!(0)),
            row("Modal", dec!(0), dec!(20000000)),
            row("Pendapatan", dec!(0), dec!(7500000)),
        ]
    }

    fn derive(rows: &[TrialBalanceRow]) -> Result<ReportState> {
        Ok(ReportState::derive(&classify(rows), Decimal::ZERO, &[], DEFAULT_TOLERANCE)?)
    }

    #[test]
    fn test_net_income_is_exact() -> Result<()> {
        let state = derive(&balanced_rows())?;
        assert_eq!(state.totals.total_revenue, dec!(7500000));
        assert_eq!(state.totals.total_expense, dec!(4800000));
        assert_eq!(state.totals.net_income, dec!(2700000));
        Ok(())
    }

    #[test]
    fn test_ending_equity() -> Result<()> {
        let state = derive(&balanced_rows())?;
        assert_eq!(state.totals.modal_awal, dec!(20000000));
        assert_eq!(state.totals.total_liabilities, Decimal::ZERO);
        assert_eq!(state.totals.modal_akhir, dec!(22700000));
        assert_eq!(state.totals.total_liabilities_and_equity, dec!(22700000));
        Ok(())
    }

    #[test]
    fn test_balanced_sheet() -> Result<()> {
        let state = derive(&balanced_rows())?;
        assert_eq!(state.totals.total_assets, dec!(22700000));
        assert!(state.is_balanced());
        assert_eq!(
            state.balance_sheet.check.describe("Neraca", "Aktiva", "Passiva"),
            "Neraca BALANCE! Total: 22.700.000"
        );
        Ok(())
    }

    #[test]
    fn test_balance_check_tolerance() {
        assert!(BalanceCheck::compare(dec!(100.00), dec!(100.01), dec!(0.01)).is_balanced());
        assert!(BalanceCheck::compare(dec!(100.01), dec!(100.00), dec!(0.01)).is_balanced());
        assert!(!BalanceCheck::compare(dec!(100.00), dec!(100.02), dec!(0.01)).is_balanced());
    }

    #[test]
    fn test_unbalanced_reports_both_directions() {
        let over = BalanceCheck::compare(dec!(1500), dec!(1000), DEFAULT_TOLERANCE);
        assert_eq!(
            over,
            BalanceCheck::Unbalanced {
                left: dec!(1500),
                right: dec!(1000),
                difference: dec!(500),
            }
        );
        let under = BalanceCheck::compare(dec!(1000), dec!(1500), DEFAULT_TOLERANCE);
        assert_eq!(
            under.describe("Neraca", "Aktiva", "Passiva"),
            "Neraca TIDAK BALANCE! Aktiva: 1.000 vs Passiva: 1.500 (selisih (500))"
        );
    }

    #[test]
    fn test_income_statement_layout() -> Result<()> {
        let state = derive(&balanced_rows())?;
        let lines = &state.income_statement.lines;
        assert_eq!(lines.len(), 1 + 1 + 1 + 1 + 5 + 1 + 1 + 1 + 1);
        assert_eq!(lines[0], StatementLine::credit("Pendapatan", dec!(7500000)));
        assert_eq!(lines[2], StatementLine::credit("Total Pendapatan", dec!(7500000)));
        assert_eq!(lines[4], StatementLine::debit("Beban sewa", dec!(1000000)));
        assert_eq!(lines[10], StatementLine::debit("Total Beban", dec!(4800000)));
        assert_eq!(
            lines.last(),
            Some(&StatementLine::credit("Laba Bersih", dec!(2700000)))
        );
        Ok(())
    }

    #[test]
    fn test_net_loss_flips_column() -> Result<()> {
        let rows = vec![
            row("Pendapatan", dec!(0), dec!(1000000)),
            row("Beban gaji", dec!(2500000), dec!(0)),
        ];
        let state = derive(&rows)?;
        assert_eq!(state.totals.net_income, dec!(-1500000));
        assert_eq!(
            state.income_statement.lines.last(),
            Some(&StatementLine::debit("Rugi Bersih", dec!(1500000)))
        );
        assert_eq!(state.equity_statement.lines[1].label, "Rugi Bersih");
        Ok(())
    }

    #[test]
    fn test_prive_reduces_ending_equity() -> Result<()> {
        let c = classify(&balanced_rows());
        let state = ReportState::derive(&c, dec!(1000000), &[], DEFAULT_TOLERANCE)?;
        assert_eq!(state.totals.modal_akhir, dec!(21700000));
        assert_eq!(
            state.equity_statement.lines.last(),
            Some(&AmountLine::new("Modal Akhir", dec!(21700000)))
        );
        assert!(!state.is_balanced());
        assert!(
            state
                .balance_sheet
                .rows
                .iter()
                .any(|r| r.claim_label == "  Prive" && r.claim_amount == Some(dec!(-1000000)))
        );
        Ok(())
    }

    #[test]
    fn test_balance_sheet_interleaves_current_assets_and_liabilities() -> Result<()> {
        let rows = vec![
            row("Kas", dec!(5000000), dec!(0)),
            row("Hutang usaha", dec!(0), dec!(1000000)),
            row("Hutang bank", dec!(0), dec!(2000000)),
            row("Hutang listrik", dec!(0), dec!(500000)),
            row("Modal", dec!(0), dec!(1500000)),
        ];
        let sheet = derive(&rows)?.balance_sheet;

        assert_eq!(sheet.rows[0].asset_label, "Aktiva Lancar:");
        assert_eq!(sheet.rows[0].claim_label, "Kewajiban:");
        assert_eq!(sheet.rows[1].asset_label, "  Kas");
        assert_eq!(sheet.rows[1].claim_label, "  Hutang usaha");
        assert_eq!(sheet.rows[2].asset_label, "");
        assert_eq!(sheet.rows[2].asset_amount, None);
        assert_eq!(sheet.rows[3].claim_label, "  Hutang listrik");
        assert_eq!(sheet.rows[5].asset_label, "Jml aktiva lancar");
        assert_eq!(sheet.rows[5].claim_amount, Some(dec!(3500000)));

        let last = sheet.rows.last().cloned().unwrap_or_default();
        assert_eq!(last.asset_label, "Jml Aktiva");
        assert_eq!(last.asset_amount, Some(dec!(5000000)));
        assert_eq!(last.claim_label, "Jml Kewajiban & Ekuitas");
        assert_eq!(last.claim_amount, Some(dec!(5000000)));
        assert!(sheet.check.is_balanced());
        Ok(())
    }

    #[test]
    fn test_cash_flow_seeding() {
        let c = classify(&balanced_rows());
        let seeded = seed_cash_flow(&c, dec!(1000000));

        let operating: Vec<_> = seeded
            .iter()
            .filter(|e| *e.section() == CashFlowSection::Operating)
            .collect();
        assert_eq!(operating.len(), 6);
        assert_eq!(*operating[0].amount(), dec!(7500000));
        assert_eq!(operating[1].description(), "Pembayaran Beban sewa");
        assert_eq!(*operating[1].amount(), dec!(-1000000));

        let investing: Vec<_> = seeded
            .iter()
            .filter(|e| *e.section() == CashFlowSection::Investing)
            .map(|e| e.description().as_str())
            .collect();
        assert_eq!(investing, vec!["Pembelian Peralatan", "Pembelian Perlengkapan"]);

        let financing: Vec<_> = seeded
            .iter()
            .filter(|e| *e.section() == CashFlowSection::Financing)
            .map(|e| *e.amount())
            .collect();
        assert_eq!(financing, vec![dec!(20000000), dec!(-1000000)]);
    }

    #[test]
    fn test_cash_flow_totals_include_manual_entries() -> Result<()> {
        let c = classify(&balanced_rows());
        let manual = vec![CashFlowEntry::new(
            CashFlowSection::Financing,
            "Pinjaman bank",
            dec!(5000000),
        )];
        let flow = CashFlowStatement::derive(seed_cash_flow(&c, Decimal::ZERO), &manual)?;

        assert_eq!(flow.blocks[0].net, dec!(2700000));
        assert_eq!(flow.blocks[1].net, dec!(-9500000));
        assert_eq!(flow.blocks[2].net, dec!(25000000));
        assert_eq!(flow.blocks[2].entries.last(), manual.last());
        assert_eq!(flow.net_cash_flow, dec!(18200000));
        Ok(())
    }

    #[test]
    fn test_empty_input_gives_zero_reports() -> Result<()> {
        let state = derive(&[])?;
        assert_eq!(state.totals, ReportTotals::default());
        assert!(state.is_balanced());
        assert_eq!(
            state.income_statement.lines.last(),
            Some(&StatementLine::credit("Laba Bersih", Decimal::ZERO))
        );
        assert!(state.cash_flow.blocks.iter().all(|b| b.entries.is_empty()));
        Ok(())
    }

    #[test]
    fn test_rederiving_is_idempotent() -> Result<()> {
        let rows = balanced_rows();
        assert_eq!(derive(&rows)?, derive(&rows)?);
        Ok(())
    }

    #[test]
    fn test_sums_past_decimal_max_are_rejected() {
        let rows = vec![
            row("Kas", Decimal::MAX, dec!(0)),
            row("Kas kecil", Decimal::MAX, dec!(0)),
        ];
        let result = ReportState::derive(&classify(&rows), Decimal::ZERO, &[], DEFAULT_TOLERANCE);
        assert!(matches!(result, Err(BooksError::ValueOverflow)));
    }

    #[test]
    fn test_opposite_extremes_still_compare() {
        let check = BalanceCheck::compare(Decimal::MAX, Decimal::MIN, DEFAULT_TOLERANCE);
        assert!(!check.is_balanced());
    }
}
