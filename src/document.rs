use anyhow::Result;
use std::io::Write;

use crate::export::Table;

/// Renders tables as a paged, fixed-column-width text document.
///
/// Every table gets the page width split evenly between its columns. The
/// first column is left-aligned, the rest right-aligned, overlong cells are
/// cut. A form feed separates pages, each page opens with the document
/// heading.
pub struct DocumentWriter<W: Write> {
    out: W,
    heading: Vec<String>,
    page_width: usize,
    lines_per_page: usize,
    page: usize,
    line: usize,
}

impl<W: Write> DocumentWriter<W> {
    pub fn new(out: W, heading: Vec<String>, page_width: usize, lines_per_page: usize) -> Self {
        // heading, page marker, title block and one row must fit a page
        let lines_per_page = lines_per_page.max(heading.len() + 6);
        DocumentWriter {
            out,
            heading,
            page_width: page_width.max(20),
            lines_per_page,
            page: 0,
            line: 0,
        }
    }

    #[cfg(test)]
    pub fn into_inner(self) -> W {
        self.out
    }

    pub fn write_tables(&mut self, tables: &[Table]) -> Result<()> {
        for table in tables {
            self.write_table(table)?;
        }
        self.out.flush()?;
        Ok(())
    }

    fn write_table(&mut self, table: &Table) -> Result<()> {
        let columns = table.headers.len().max(1);
        let width = self.page_width / columns;

        // keep title and header together with at least one row
        if self.page == 0 || self.remaining() < 5 {
            self.new_page()?;
        } else {
            self.emit("")?;
        }
        self.emit(&center(&table.title, self.page_width))?;
        self.emit(&"=".repeat(self.page_width))?;
        let header = render_row(&table.headers, width);
        self.emit(&header)?;
        self.emit(&"-".repeat(self.page_width))?;

        for row in &table.rows {
            if self.remaining() == 0 {
                self.new_page()?;
                self.emit(&header)?;
                self.emit(&"-".repeat(self.page_width))?;
            }
            self.emit(&render_row(row, width))?;
        }
        Ok(())
    }

    fn remaining(&self) -> usize {
        self.lines_per_page.saturating_sub(self.line)
    }

    fn new_page(&mut self) -> Result<()> {
        if self.page > 0 {
            write!(self.out, "\x0c")?;
        }
        self.page += 1;
        self.line = 0;

        let heading: Vec<String> = self
            .heading
            .iter()
            .map(|h| center(h, self.page_width))
            .collect();
        for h in heading {
            self.emit(&h)?;
        }
        let marker = format!("Halaman {}", self.page);
        self.emit(&format!("{marker:>width$}", width = self.page_width))?;
        Ok(())
    }

    fn emit(&mut self, text: &str) -> Result<()> {
        writeln!(self.out, "{}", text.trim_end())?;
        self.line += 1;
        Ok(())
    }
}

fn fit(text: &str, width: usize) -> String {
    text.chars().take(width).collect()
}

fn center(text: &str, width: usize) -> String {
    let text = fit(text, width);
    format!("{text:^width$}")
}

fn render_row(cells: &[String], width: usize) -> String {
    let cell_width = width.saturating_sub(1).max(1);
    cells
        .iter()
        .enumerate()
        .map(|(i, cell)| {
            let cell = fit(cell, cell_width);
            if i == 0 {
                format!("{cell:<width$}")
            } else {
                format!("{cell:>cell_width$} ")
            }
        })
        .collect()
}
