//! Self-contained HTML serialisation of a [`Document`], the form handed to a
//! printer or PDF rasteriser.

use std::fmt::Write;

use crate::render::document::{
    Align, Block, Document, HeaderBlock, LineStyle, Logo, TableBlock, TableRow,
};
use crate::types::ImageBlob;

const STYLESHEET: &str = "\
body { font-family: 'Helvetica', sans-serif; width: 800px; margin: 0 auto; padding: 40px; color: #333; font-size: 12px; }
.header { display: flex; justify-content: space-between; align-items: flex-start; border-bottom: 2px solid #000; padding-bottom: 16px; }
.title { font-size: 24px; font-weight: 900; text-transform: uppercase; }
.subtitle, .label { font-size: 10px; font-weight: bold; color: #777; text-transform: uppercase; letter-spacing: 1px; }
.badge { background: #000; color: #fff; padding: 6px 10px; font-size: 10px; font-weight: 900; letter-spacing: 2px; }
.logo { width: 64px; height: 64px; object-fit: contain; }
.logo-mark { width: 64px; height: 64px; border: 1px dashed #999; display: flex; align-items: center; justify-content: center; }
.columns { display: flex; gap: 24px; margin: 20px 0; }
.columns > div { flex: 1; }
table { width: 100%; border-collapse: collapse; }
th { background: #1a1c24; color: #fff; padding: 8px; text-transform: uppercase; font-size: 10px; }
td { padding: 8px; border-bottom: 1px solid #eee; height: 14px; }
.left { text-align: left; } .center { text-align: center; } .right { text-align: right; }
.totals div { display: flex; justify-content: space-between; padding: 2px 0; }
.negative { color: #c00; }
.emphasis { font-size: 16px; font-weight: 900; border-top: 2px solid #000; }
.summary { display: flex; border: 1px solid #eee; }
.summary > div { flex: 1; padding: 12px; }
.signature img { height: 48px; }
.signature .line { border-top: 1px solid #000; margin-top: 8px; }
.footer { text-align: center; font-size: 9px; color: #999; margin-top: 24px; }
";

/// Escape text for element content and quoted attribute values
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}

/// Stored blobs are either data URIs or bare base64 PNG
fn image_src(blob: &ImageBlob) -> String {
    let data = blob.as_str().trim();
    if data.starts_with("data:") {
        escape(data)
    } else {
        format!("data:image/png;base64,{}", escape(data))
    }
}

fn align_class(align: Align) -> &'static str {
    match align {
        Align::Left => "left",
        Align::Center => "center",
        Align::Right => "right",
    }
}

pub fn to_html(doc: &Document) -> String {
    let mut html = String::new();
    let _ = write!(
        html,
        "<!DOCTYPE html>\n<html>\n<head>\n<meta charset=\"utf-8\">\n<title>{}</title>\n<style>\n{}</style>\n</head>\n<body>\n",
        escape(&doc.title),
        STYLESHEET
    );

    for block in &doc.blocks {
        write_block(&mut html, block);
    }

    html.push_str("</body>\n</html>\n");
    html
}

fn write_block(html: &mut String, block: &Block) {
    match block {
        Block::Header(header) => write_header(html, header),
        Block::Parties(parties) => {
            html.push_str("<div class=\"columns\">\n");
            for column in [&parties.left, &parties.right] {
                let _ = write!(
                    html,
                    "<div><p class=\"label\">{}</p><p><strong>{}</strong></p>",
                    escape(&column.heading),
                    escape(&column.name)
                );
                for line in &column.lines {
                    let _ = write!(html, "<p>{}</p>", escape(line));
                }
                html.push_str("</div>\n");
            }
            html.push_str("</div>\n");
        }
        Block::Table(table) => write_table(html, table),
        Block::Totals(totals) => {
            html.push_str("<div class=\"totals\">\n");
            for line in &totals.lines {
                let class = match line.style {
                    LineStyle::Normal => "",
                    LineStyle::Negative => " class=\"negative\"",
                    LineStyle::Emphasis => " class=\"emphasis\"",
                };
                let _ = writeln!(
                    html,
                    "<div{}><span>{}:</span><span>{}</span></div>",
                    class,
                    escape(&line.label),
                    escape(&line.amount)
                );
            }
            html.push_str("</div>\n");
        }
        Block::AmountInWords(words) => {
            let _ = writeln!(
                html,
                "<div class=\"words\"><p class=\"label\">{}</p><p><em>{}</em></p></div>",
                escape(&words.heading),
                escape(&words.text)
            );
        }
        Block::BankDetails(bank) => {
            let _ = write!(html, "<div class=\"bank\"><p class=\"label\">{}</p>", escape(&bank.heading));
            for line in &bank.lines {
                let _ = write!(html, "<p>{}</p>", escape(line));
            }
            html.push_str("</div>\n");
        }
        Block::Signature(signature) => {
            html.push_str("<div class=\"signature\">");
            if let Some(image) = &signature.image {
                let _ = write!(html, "<img src=\"{}\" alt=\"Signature\">", image_src(image));
            }
            let _ = writeln!(
                html,
                "<div class=\"line\"></div><p class=\"label\">{}</p></div>",
                escape(&signature.caption)
            );
        }
        Block::Summary(summary) => {
            let _ = write!(
                html,
                "<p class=\"label\">{}</p>\n<div class=\"summary\">\n",
                escape(&summary.heading)
            );
            for card in &summary.cards {
                let _ = writeln!(
                    html,
                    "<div><p class=\"label\">{}</p><p class=\"title\">{}</p></div>",
                    escape(&card.label),
                    escape(&card.value)
                );
            }
            html.push_str("</div>\n");
        }
        Block::Footer(footer) => {
            html.push_str("<div class=\"footer\">\n");
            for note in &footer.notes {
                let _ = writeln!(html, "<div>{}</div>", escape(note));
            }
            html.push_str("</div>\n");
        }
    }
}

fn write_header(html: &mut String, header: &HeaderBlock) {
    html.push_str("<div class=\"header\">\n<div>\n");
    match &header.logo {
        Some(Logo::Image(blob)) => {
            let _ = writeln!(html, "<img class=\"logo\" src=\"{}\" alt=\"Logo\">", image_src(blob));
        }
        Some(Logo::Placeholder(mark)) => {
            let _ = writeln!(html, "<div class=\"logo-mark\">{}</div>", escape(mark));
        }
        None => {}
    }
    let _ = writeln!(html, "<div class=\"title\">{}</div>", escape(&header.title));
    if let Some(subtitle) = &header.subtitle {
        let _ = writeln!(html, "<div class=\"subtitle\">{}</div>", escape(subtitle));
    }
    let _ = writeln!(html, "<h2>{}</h2>", escape(&header.business_name));
    for line in &header.business_lines {
        let _ = writeln!(html, "<p>{}</p>", escape(line));
    }
    html.push_str("</div>\n<div class=\"right\">\n");
    let _ = writeln!(html, "<div class=\"badge\">{}</div>", escape(&header.badge));
    for field in &header.meta {
        let _ = writeln!(
            html,
            "<p><span class=\"label\">{}:</span> <strong>{}</strong></p>",
            escape(&field.label),
            escape(&field.value)
        );
    }
    html.push_str("</div>\n</div>\n");
}

fn write_table(html: &mut String, table: &TableBlock) {
    if let Some(heading) = &table.heading {
        let _ = writeln!(html, "<p class=\"label\">{}</p>", escape(heading));
    }
    html.push_str("<table>\n<thead><tr>");
    for column in &table.columns {
        let _ = write!(
            html,
            "<th class=\"{}\">{}</th>",
            align_class(column.align),
            escape(&column.title)
        );
    }
    html.push_str("</tr></thead>\n<tbody>\n");
    for row in &table.rows {
        html.push_str("<tr>");
        match row {
            TableRow::Cells(cells) => {
                for (cell, column) in cells.iter().zip(&table.columns) {
                    let _ = write!(
                        html,
                        "<td class=\"{}\">{}</td>",
                        align_class(column.align),
                        escape(cell)
                    );
                }
            }
            TableRow::Padding => {
                for _ in &table.columns {
                    html.push_str("<td></td>");
                }
            }
        }
        html.push_str("</tr>\n");
    }
    html.push_str("</tbody>\n</table>\n");
}
