use crate::traits::CSVWrite;
use anyhow::Result;
use csv::{Writer, WriterBuilder};
use serde::Serialize;
use std::io::Write;

/// Writes CSV records to any byte sink.
pub struct CSVWriter<W: Write> {
    inner: Writer<W>,
}

/// Tables of different widths share one stream, so records are flexible.
fn builder() -> WriterBuilder {
    let mut builder = WriterBuilder::new();
    builder.has_headers(false).flexible(true);
    builder
}

impl<W: Write> CSVWriter<W> {
    pub fn new(sink: W) -> Self {
        CSVWriter {
            inner: builder().from_writer(sink),
        }
    }

    pub fn into_inner(self) -> Result<W> {
        self.inner
            .into_inner()
            .map_err(|e| anyhow::anyhow!("cannot flush csv output: {}", e.error()))
    }
}

impl<W: Write> CSVWrite for CSVWriter<W> {
    fn write_record<T: Serialize>(&mut self, record: &T) -> Result<()> {
        Ok(self.inner.serialize(record)?)
    }

    fn flush(&mut self) -> Result<()> {
        Ok(self.inner.flush()?)
    }
}
