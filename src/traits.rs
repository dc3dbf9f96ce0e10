use anyhow::Result;
use serde::Serialize;

use crate::export::Table;

/// CSVWrite trait provides a method to write a record to a CSV sink.
pub trait CSVWrite {
    /// Writes a record to a CSV sink.
    ///
    /// # Arguments
    /// * `record` - The record to write that is Serializable.
    ///
    /// # Returns
    /// A Result indicating success or failure.
    fn write_record<T: Serialize>(&mut self, record: &T) -> Result<()>;

    /// Flushes buffered records.
    fn flush(&mut self) -> Result<()>;
}

/// CSVExport trait provides a method to export records as CSV.
pub trait CSVExport {
    /// Exports records.
    ///
    /// # Arguments
    /// * `writer` - The writer to write the CSV records to.
    ///
    /// # Returns
    /// A Result indicating success or failure.
    fn export(&self, writer: &mut impl CSVWrite) -> Result<()>;
}

/// Tabulate trait turns a table or report into display-ready rows.
pub trait Tabulate {
    /// Builds a titled table whose cells are already formatted.
    fn tabulate(&self) -> Table;
}
