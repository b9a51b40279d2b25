//! Minimal PDF 1.4 serialiser.
//!
//! Produces one catalog, one page tree, the two standard fonts, an info
//! dictionary and one uncompressed content stream per page. Object offsets
//! in the cross-reference table are the exact byte positions written.

use chrono::{DateTime, Utc};

use super::metrics::Font;
use super::{PAGE_HEIGHT, PAGE_WIDTH};

const CATALOG: usize = 1;
const PAGES: usize = 2;
const FONT_REGULAR: usize = 3;
const FONT_BOLD: usize = 4;
const INFO: usize = 5;
const FIRST_PAGE: usize = 6;

#[derive(Debug, Clone)]
pub struct DocumentInfo {
    pub title: String,
    pub producer: String,
    pub created_at: DateTime<Utc>,
}

impl DocumentInfo {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            producer: concat!("tradedocs-api ", env!("CARGO_PKG_VERSION")).to_string(),
            created_at: Utc::now(),
        }
    }
}

/// Maps a char onto its WinAnsiEncoding byte, `?` when it has none.
pub fn win_ansi(ch: char) -> u8 {
    match ch {
        ' '..='~' => ch as u8,
        '\u{a0}'..='\u{ff}' => ch as u32 as u8,
        '\u{20ac}' => 0x80,
        '\u{2018}' => 0x91,
        '\u{2019}' => 0x92,
        '\u{201c}' => 0x93,
        '\u{201d}' => 0x94,
        '\u{2022}' => 0x95,
        '\u{2013}' => 0x96,
        '\u{2014}' => 0x97,
        '\u{2122}' => 0x99,
        _ => b'?',
    }
}

/// Encodes `text` as a PDF literal string, parentheses included.
pub fn literal_string(text: &str) -> Vec<u8> {
    let mut out = Vec::with_capacity(text.len() + 2);
    out.push(b'(');
    for ch in text.chars() {
        match win_ansi(ch) {
            b'(' => out.extend_from_slice(b"\\("),
            b')' => out.extend_from_slice(b"\\)"),
            b'\\' => out.extend_from_slice(b"\\\\"),
            byte if byte < 0x20 => out.extend_from_slice(format!("\\{:03o}", byte).as_bytes()),
            byte => out.push(byte),
        }
    }
    out.push(b')');
    out
}

fn pdf_date(at: &DateTime<Utc>) -> String {
    format!("D:{}Z", at.format("%Y%m%d%H%M%S"))
}

/// Collects page content streams and serialises the document.
#[derive(Debug, Clone)]
pub struct PdfWriter {
    info: DocumentInfo,
    pages: Vec<Vec<u8>>,
}

impl PdfWriter {
    pub fn new(info: DocumentInfo) -> Self {
        Self {
            info,
            pages: Vec::new(),
        }
    }

    pub fn add_page(&mut self, content: Vec<u8>) {
        self.pages.push(content);
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    pub fn finish(self) -> Vec<u8> {
        let mut out: Vec<u8> = Vec::new();
        out.extend_from_slice(b"%PDF-1.4\n%\xe2\xe3\xcf\xd3\n");

        let object_count = FIRST_PAGE + self.pages.len() * 2 - 1;
        let mut offsets = vec![0usize; object_count + 1];

        let mut object = |out: &mut Vec<u8>, id: usize, body: &[u8]| {
            offsets[id] = out.len();
            out.extend_from_slice(format!("{} 0 obj\n", id).as_bytes());
            out.extend_from_slice(body);
            out.extend_from_slice(b"\nendobj\n");
        };

        object(
            &mut out,
            CATALOG,
            format!("<< /Type /Catalog /Pages {} 0 R >>", PAGES).as_bytes(),
        );

        let kids: Vec<String> = (0..self.pages.len())
            .map(|i| format!("{} 0 R", FIRST_PAGE + i * 2))
            .collect();
        object(
            &mut out,
            PAGES,
            format!(
                "<< /Type /Pages /Kids [{}] /Count {} /MediaBox [0 0 {:.2} {:.2}] >>",
                kids.join(" "),
                self.pages.len(),
                PAGE_WIDTH,
                PAGE_HEIGHT
            )
            .as_bytes(),
        );

        for (id, font) in [(FONT_REGULAR, Font::Regular), (FONT_BOLD, Font::Bold)] {
            object(
                &mut out,
                id,
                format!(
                    "<< /Type /Font /Subtype /Type1 /BaseFont /{} /Encoding /WinAnsiEncoding >>",
                    font.base_font()
                )
                .as_bytes(),
            );
        }

        let mut info = Vec::new();
        info.extend_from_slice(b"<< /Title ");
        info.extend_from_slice(&literal_string(&self.info.title));
        info.extend_from_slice(b" /Producer ");
        info.extend_from_slice(&literal_string(&self.info.producer));
        info.extend_from_slice(b" /CreationDate ");
        info.extend_from_slice(&literal_string(&pdf_date(&self.info.created_at)));
        info.extend_from_slice(b" >>");
        object(&mut out, INFO, &info);

        for (i, content) in self.pages.iter().enumerate() {
            let page_id = FIRST_PAGE + i * 2;
            let content_id = page_id + 1;
            object(
                &mut out,
                page_id,
                format!(
                    "<< /Type /Page /Parent {} 0 R /Resources << /Font << /{} {} 0 R /{} {} 0 R >> >> /Contents {} 0 R >>",
                    PAGES,
                    Font::Regular.resource(),
                    FONT_REGULAR,
                    Font::Bold.resource(),
                    FONT_BOLD,
                    content_id
                )
                .as_bytes(),
            );

            let mut stream = format!("<< /Length {} >>\nstream\n", content.len()).into_bytes();
            stream.extend_from_slice(content);
            stream.extend_from_slice(b"\nendstream");
            object(&mut out, content_id, &stream);
        }

        let xref_at = out.len();
        out.extend_from_slice(format!("xref\n0 {}\n", object_count + 1).as_bytes());
        out.extend_from_slice(b"0000000000 65535 f \n");
        for offset in offsets.iter().skip(1) {
            out.extend_from_slice(format!("{:010} 00000 n \n", offset).as_bytes());
        }
        out.extend_from_slice(
            format!(
                "trailer\n<< /Size {} /Root {} 0 R /Info {} 0 R >>\nstartxref\n{}\n%%EOF\n",
                object_count + 1,
                CATALOG,
                INFO,
                xref_at
            )
            .as_bytes(),
        );
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample(pages: usize) -> Vec<u8> {
        let mut writer = PdfWriter::new(DocumentInfo::new("QT-2026-0001"));
        for i in 0..pages {
            writer.add_page(format!("BT /F1 12 Tf 72 720 Td (Page {}) Tj ET", i + 1).into_bytes());
        }
        writer.finish()
    }

    fn find(haystack: &[u8], needle: &[u8]) -> Option<usize> {
        haystack.windows(needle.len()).position(|w| w == needle)
    }

    #[test]
    fn header_and_trailer_frame_the_file() {
        let pdf = sample(1);
        assert!(pdf.starts_with(b"%PDF-1.4\n"));
        assert!(pdf.ends_with(b"%%EOF\n"));
        assert!(find(&pdf, b"/Count 1").is_some());
        assert!(find(&pdf, b"/BaseFont /Helvetica-Bold").is_some());
    }

    #[test]
    fn xref_offsets_point_at_objects() {
        let pdf = sample(3);
        let marker = b"startxref\n";
        let at = pdf.windows(marker.len()).rposition(|w| w == marker).unwrap() + marker.len();
        let tail = std::str::from_utf8(&pdf[at..]).unwrap();
        let xref_at: usize = tail.lines().next().unwrap().parse().unwrap();
        assert!(pdf[xref_at..].starts_with(b"xref\n"));

        let xref = std::str::from_utf8(&pdf[xref_at..]).unwrap();
        let entries: Vec<&str> = xref.lines().skip(3).take(11).collect();
        assert_eq!(entries.len(), 11);
        for (i, entry) in entries.iter().enumerate() {
            let offset: usize = entry[..10].parse().unwrap();
            let expected = format!("{} 0 obj", i + 1);
            assert!(
                pdf[offset..].starts_with(expected.as_bytes()),
                "object {} not at {}",
                i + 1,
                offset
            );
        }
    }

    #[test]
    fn page_count_matches_kids() {
        let pdf = sample(4);
        assert!(find(&pdf, b"/Count 4").is_some());
        assert!(find(&pdf, b"/Kids [6 0 R 8 0 R 10 0 R 12 0 R]").is_some());
    }

    #[test]
    fn literal_strings_are_escaped() {
        assert_eq!(literal_string("a(b)\\c"), b"(a\\(b\\)\\\\c)".to_vec());
        assert_eq!(literal_string("\u{20ac}5"), vec![b'(', 0x80, b'5', b')']);
        assert_eq!(literal_string("\u{20b9}"), b"(?)".to_vec());
    }
}
