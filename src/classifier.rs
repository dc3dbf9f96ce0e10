use crate::models::{ClassifiedAccount, TrialBalanceRow};
use rust_decimal::prelude::*;

/// Where a matched account lands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Bucket {
    Revenue,
    Expense,
    CurrentAsset,
    FixedAsset,
    /// Opening capital, a single scalar rather than a list.
    Equity,
    Liability,
}

/// Which side of the row feeds the bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Debit,
    Credit,
}

#[derive(Debug)]
pub struct Rule {
    pub keywords: &'static [&'static str],
    pub exclusions: &'static [&'static str],
    pub bucket: Bucket,
    pub side: Side,
}

impl Rule {
    /// `name` must already be lowercase.
    fn matches(&self, name: &str) -> bool {
        self.keywords.iter().any(|k| name.contains(k))
            && !self.exclusions.iter().any(|k| name.contains(k))
    }
}

/// Evaluated top to bottom, first match wins.
pub const RULES: &[Rule] = &[
    Rule {
        keywords: &["pendapatan", "penjualan", "penerimaan"],
        exclusions: &[],
        bucket: Bucket::Revenue,
        side: Side::Credit,
    },
    Rule {
        keywords: &["beban", "biaya", "gaji", "sewa", "pembayaran"],
        exclusions: &[],
        bucket: Bucket::Expense,
        side: Side::Debit,
    },
    Rule {
        keywords: &["kas", "perlengkapan", "piutang"],
        exclusions: &[],
        bucket: Bucket::CurrentAsset,
        side: Side::Debit,
    },
    Rule {
        keywords: &["peralatan", "gedung", "kendaraan"],
        exclusions: &[],
        bucket: Bucket::FixedAsset,
        side: Side::Debit,
    },
    Rule {
        keywords: &["modal"],
        exclusions: &["prive"],
        bucket: Bucket::Equity,
        side: Side::Credit,
    },
    Rule {
        keywords: &["hutang", "utang"],
        exclusions: &[],
        bucket: Bucket::Liability,
        side: Side::Credit,
    },
];

/// Finds the first rule matching an account name, case-insensitively.
pub fn rule_for(account_name: &str) -> Option<&'static Rule> {
    let name = account_name.to_lowercase();
    RULES.iter().find(|rule| rule.matches(&name))
}

/// The trial balance sorted into report buckets.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Classification {
    pub revenue: Vec<ClassifiedAccount>,
    pub expenses: Vec<ClassifiedAccount>,
    pub current_assets: Vec<ClassifiedAccount>,
    pub fixed_assets: Vec<ClassifiedAccount>,
    pub liabilities: Vec<ClassifiedAccount>,
    pub modal_awal: Decimal,
    /// Filled rows that matched no rule. They appear in no report.
    pub unclassified: Vec<String>,
}

/// Sorts filled rows into buckets, keeping input order within each bucket.
pub fn classify(rows: &[TrialBalanceRow]) -> Classification {
    let mut out = Classification::default();

    for row in rows.iter().filter(|r| r.is_filled()) {
        let name = row.account_name().trim();
        let Some(rule) = rule_for(name) else {
            tracing::warn!(account = name, "account matches no classification rule");
            out.unclassified.push(name.to_string());
            continue;
        };

        let amount = match rule.side {
            Side::Debit => *row.debit(),
            Side::Credit => *row.credit(),
        };
        let account = ClassifiedAccount::new(name, amount);

        match rule.bucket {
            Bucket::Revenue => out.revenue.push(account),
            Bucket::Expense => out.expenses.push(account),
            Bucket::CurrentAsset => out.current_assets.push(account),
            Bucket::FixedAsset => out.fixed_assets.push(account),
            Bucket::Equity => out.modal_awal = amount,
            Bucket::Liability => out.liabilities.push(account),
        }
    }

    tracing::debug!(
        revenue = out.revenue.len(),
        expenses = out.expenses.len(),
        current_assets = out.current_assets.len(),
        fixed_assets = out.fixed_assets.len(),
        liabilities = out.liabilities.len(),
        unclassified = out.unclassified.len(),
        "trial balance classified"
    );

    out
}
