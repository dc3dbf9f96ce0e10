use getset::Getters;
use rust_decimal::prelude::*;
use serde::{Deserialize, Deserializer, Serialize, de};
use std::fmt;

/// Parses an amount the way the grid does: blanks and junk count as zero.
pub fn coerce_amount(raw: &str) -> Decimal {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Decimal::ZERO;
    }
    Decimal::from_str(trimmed)
        .or_else(|_| Decimal::from_scientific(trimmed))
        .unwrap_or_else(|_| {
            tracing::debug!(value = trimmed, "non-numeric amount treated as zero");
            Decimal::ZERO
        })
}

struct LenientAmount;

impl<'de> de::Visitor<'de> for LenientAmount {
    type Value = Decimal;

    fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.write_str("an amount, a blank cell or anything else (read as zero)")
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Decimal, E> {
        Ok(coerce_amount(v))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Decimal, E> {
        Ok(Decimal::from(v))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Decimal, E> {
        Ok(Decimal::from(v))
    }
}

fn lenient_amount<'de, D>(d: D) -> Result<Decimal, D::Error>
where
    D: Deserializer<'de>,
{
    d.deserialize_str(LenientAmount)
}

fn plain_amount<S>(x: &Decimal, s: S) -> Result<S::Ok, S::Error>
where
    S: serde::Serializer,
{
    s.serialize_str(&x.normalize().to_string())
}

/// One line of the trial balance (Neraca Saldo).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Getters)]
pub struct TrialBalanceRow {
    #[getset(get = "pub")]
    #[serde(rename = "No Akun", alias = "reference", default)]
    reference: String,
    #[getset(get = "pub")]
    #[serde(rename = "Nama Akun", alias = "account_name", default)]
    account_name: String,
    #[getset(get = "pub")]
    #[serde(
        rename = "Debit (Rp)",
        alias = "debit",
        default,
        deserialize_with = "lenient_amount",
        serialize_with = "plain_amount"
    )]
    debit: Decimal,
    #[getset(get = "pub")]
    #[serde(
        rename = "Kredit (Rp)",
        alias = "credit",
        default,
        deserialize_with = "lenient_amount",
        serialize_with = "plain_amount"
    )]
    credit: Decimal,
}

impl TrialBalanceRow {
    pub fn new(reference: &str, account_name: &str, debit: Decimal, credit: Decimal) -> Self {
        TrialBalanceRow {
            reference: reference.to_string(),
            account_name: account_name.to_string(),
            debit,
            credit,
        }
    }

    /// Blank placeholder as appended by "add row".
    pub fn placeholder() -> Self {
        Self::default()
    }

    pub fn is_filled(&self) -> bool {
        !self.account_name.trim().is_empty()
    }
}

/// One line of the general journal (Jurnal Umum).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Getters)]
pub struct JournalEntry {
    #[getset(get = "pub")]
    #[serde(rename = "Tanggal", alias = "date", default)]
    date: String,
    #[getset(get = "pub")]
    #[serde(rename = "Keterangan", alias = "description", default)]
    description: String,
    #[getset(get = "pub")]
    #[serde(rename = "Ref", alias = "reference", default)]
    reference: String,
    #[getset(get = "pub")]
    #[serde(
        rename = "Debit (Rp)",
        alias = "debit",
        default,
        deserialize_with = "lenient_amount",
        serialize_with = "plain_amount"
    )]
    debit: Decimal,
    #[getset(get = "pub")]
    #[serde(
        rename = "Kredit (Rp)",
        alias = "credit",
        default,
        deserialize_with = "lenient_amount",
        serialize_with = "plain_amount"
    )]
    credit: Decimal,
}

impl JournalEntry {
    pub fn new(
        date: &str,
        description: &str,
        reference: &str,
        debit: Decimal,
        credit: Decimal,
    ) -> Self {
        JournalEntry {
            date: date.to_string(),
            description: description.to_string(),
            reference: reference.to_string(),
            debit,
            credit,
        }
    }

    pub fn placeholder() -> Self {
        Self::default()
    }

    pub fn is_filled(&self) -> bool {
        !self.description.trim().is_empty()
    }
}

/// An account placed in a report bucket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClassifiedAccount {
    pub name: String,
    pub amount: Decimal,
}

impl ClassifiedAccount {
    pub fn new(name: &str, amount: Decimal) -> Self {
        ClassifiedAccount {
            name: name.to_string(),
            amount,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CashFlowSection {
    #[serde(rename = "operasi", alias = "operating")]
    Operating,
    #[serde(rename = "investasi", alias = "investing")]
    Investing,
    #[serde(rename = "pendanaan", alias = "financing")]
    Financing,
}

impl CashFlowSection {
    pub fn heading(&self) -> &'static str {
        match self {
            CashFlowSection::Operating => "Arus Kas Operasi:",
            CashFlowSection::Investing => "Arus Kas Investasi:",
            CashFlowSection::Financing => "Arus Kas Pendanaan:",
        }
    }
}

/// A cash-flow line; positive amounts are inflows, negative are outflows.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Getters)]
pub struct CashFlowEntry {
    #[getset(get = "pub")]
    #[serde(rename = "Bagian", alias = "section")]
    section: CashFlowSection,
    #[getset(get = "pub")]
    #[serde(rename = "Aktivitas", alias = "description", default)]
    description: String,
    #[getset(get = "pub")]
    #[serde(
        rename = "Jumlah (Rp)",
        alias = "amount",
        default,
        deserialize_with = "lenient_amount",
        serialize_with = "plain_amount"
    )]
    amount: Decimal,
}

impl CashFlowEntry {
    pub fn new(section: CashFlowSection, description: &str, amount: Decimal) -> Self {
        CashFlowEntry {
            section,
            description: description.to_string(),
            amount,
        }
    }
}
