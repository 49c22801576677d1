//! Typed block tree shared by the invoice and GST report layouts.
//!
//! A [`Document`] carries no I/O and no styling decisions beyond emphasis
//! hints; sinks turn it into bytes.

use serde::Serialize;

use crate::types::ImageBlob;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DocumentKind {
    Invoice,
    GstReport,
}

/// A single-page document ready for a sink
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Document {
    pub kind: DocumentKind,
    pub title: String,
    /// Suggested file name, e.g. `Invoice__INV-2024-03-15-001.pdf`
    pub file_name: String,
    pub blocks: Vec<Block>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Block {
    Header(HeaderBlock),
    Parties(PartiesBlock),
    Table(TableBlock),
    Totals(TotalsBlock),
    AmountInWords(WordsBlock),
    BankDetails(BankBlock),
    Signature(SignatureBlock),
    Summary(SummaryBlock),
    Footer(FooterBlock),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Logo {
    Image(ImageBlob),
    /// Text mark drawn when no logo is stored
    Placeholder(String),
}

/// Label/value pair
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Field {
    pub label: String,
    pub value: String,
}

impl Field {
    pub fn new(label: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            value: value.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct HeaderBlock {
    pub title: String,
    pub subtitle: Option<String>,
    /// Corner marker such as `ORIGINAL COPY`
    pub badge: String,
    pub logo: Option<Logo>,
    pub business_name: String,
    pub business_lines: Vec<String>,
    pub meta: Vec<Field>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PartyColumn {
    pub heading: String,
    pub name: String,
    pub lines: Vec<String>,
}

/// Two-column Bill To / Ship To block
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PartiesBlock {
    pub left: PartyColumn,
    pub right: PartyColumn,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Align {
    Left,
    Center,
    Right,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Column {
    pub title: String,
    pub align: Align,
}

impl Column {
    pub fn new(title: impl Into<String>, align: Align) -> Self {
        Self {
            title: title.into(),
            align,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TableRow {
    Cells(Vec<String>),
    /// Blank row for printed consistency, carries no data
    Padding,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableBlock {
    pub heading: Option<String>,
    pub columns: Vec<Column>,
    pub rows: Vec<TableRow>,
}

impl TableBlock {
    /// Rows that carry data
    pub fn data_rows(&self) -> impl Iterator<Item = &Vec<String>> {
        self.rows.iter().filter_map(|row| match row {
            TableRow::Cells(cells) => Some(cells),
            TableRow::Padding => None,
        })
    }

    pub fn padding_count(&self) -> usize {
        self.rows
            .iter()
            .filter(|row| matches!(row, TableRow::Padding))
            .count()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum LineStyle {
    Normal,
    /// Subtracted amount, printed in red
    Negative,
    /// Grand total
    Emphasis,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TotalLine {
    pub label: String,
    pub amount: String,
    pub style: LineStyle,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TotalsBlock {
    pub lines: Vec<TotalLine>,
}

impl TotalsBlock {
    pub fn line(&self, label: &str) -> Option<&TotalLine> {
        self.lines.iter().find(|line| line.label == label)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WordsBlock {
    pub heading: String,
    pub text: String,
}

/// Always present; holds a "no bank details" line when the factory has none
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BankBlock {
    pub heading: String,
    pub lines: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SignatureBlock {
    pub image: Option<ImageBlob>,
    pub caption: String,
}

/// Row of headline figures
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SummaryBlock {
    pub heading: String,
    pub cards: Vec<Field>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FooterBlock {
    pub notes: Vec<String>,
}

impl Document {
    pub fn new(kind: DocumentKind, title: impl Into<String>, file_name: impl Into<String>) -> Self {
        Self {
            kind,
            title: title.into(),
            file_name: file_name.into(),
            blocks: Vec::new(),
        }
    }

    pub fn push(&mut self, block: Block) {
        self.blocks.push(block);
    }

    pub fn header(&self) -> Option<&HeaderBlock> {
        self.blocks.iter().find_map(|block| match block {
            Block::Header(header) => Some(header),
            _ => None,
        })
    }

    pub fn parties(&self) -> Option<&PartiesBlock> {
        self.blocks.iter().find_map(|block| match block {
            Block::Parties(parties) => Some(parties),
            _ => None,
        })
    }

    /// First table in the document
    pub fn table(&self) -> Option<&TableBlock> {
        self.blocks.iter().find_map(|block| match block {
            Block::Table(table) => Some(table),
            _ => None,
        })
    }

    pub fn totals(&self) -> Option<&TotalsBlock> {
        self.blocks.iter().find_map(|block| match block {
            Block::Totals(totals) => Some(totals),
            _ => None,
        })
    }

    pub fn summary(&self) -> Option<&SummaryBlock> {
        self.blocks.iter().find_map(|block| match block {
            Block::Summary(summary) => Some(summary),
            _ => None,
        })
    }

    /// Every printable text fragment, in reading order. Image payloads excluded.
    pub fn texts(&self) -> Vec<&str> {
        let mut out: Vec<&str> = vec![self.title.as_str()];
        for block in &self.blocks {
            match block {
                Block::Header(header) => {
                    out.push(&header.title);
                    if let Some(subtitle) = &header.subtitle {
                        out.push(subtitle);
                    }
                    out.push(&header.badge);
                    if let Some(Logo::Placeholder(mark)) = &header.logo {
                        out.push(mark);
                    }
                    out.push(&header.business_name);
                    out.extend(header.business_lines.iter().map(String::as_str));
                    for field in &header.meta {
                        out.push(&field.label);
                        out.push(&field.value);
                    }
                }
                Block::Parties(parties) => {
                    for column in [&parties.left, &parties.right] {
                        out.push(&column.heading);
                        out.push(&column.name);
                        out.extend(column.lines.iter().map(String::as_str));
                    }
                }
                Block::Table(table) => {
                    if let Some(heading) = &table.heading {
                        out.push(heading);
                    }
                    out.extend(table.columns.iter().map(|c| c.title.as_str()));
                    for cells in table.data_rows() {
                        out.extend(cells.iter().map(String::as_str));
                    }
                }
                Block::Totals(totals) => {
                    for line in &totals.lines {
                        out.push(&line.label);
                        out.push(&line.amount);
                    }
                }
                Block::AmountInWords(words) => {
                    out.push(&words.heading);
                    out.push(&words.text);
                }
                Block::BankDetails(bank) => {
                    out.push(&bank.heading);
                    out.extend(bank.lines.iter().map(String::as_str));
                }
                Block::Signature(signature) => out.push(&signature.caption),
                Block::Summary(summary) => {
                    out.push(&summary.heading);
                    for card in &summary.cards {
                        out.push(&card.label);
                        out.push(&card.value);
                    }
                }
                Block::Footer(footer) => out.extend(footer.notes.iter().map(String::as_str)),
            }
        }
        out
    }

    pub fn contains_text(&self, needle: &str) -> bool {
        self.texts().iter().any(|text| text.contains(needle))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_block_lookup_and_texts() {
        let mut doc = Document::new(DocumentKind::Invoice, "TAX INVOICE", "Invoice_x.pdf");
        doc.push(Block::Table(TableBlock {
            heading: None,
            columns: vec![Column::new("Qty", Align::Right)],
            rows: vec![TableRow::Cells(vec!["2".to_string()]), TableRow::Padding],
        }));
        doc.push(Block::Footer(FooterBlock {
            notes: vec!["Goods once sold will not be taken back.".to_string()],
        }));

        let table = doc.table().unwrap();
        assert_eq!(table.data_rows().count(), 1);
        assert_eq!(table.padding_count(), 1);
        assert!(doc.header().is_none());
        assert!(doc.contains_text("taken back"));
        assert!(!doc.contains_text("AUTHORIZED"));
    }
}
