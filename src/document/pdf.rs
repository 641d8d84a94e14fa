use chrono::{DateTime, Datelike, Timelike, Utc};
use pdf_writer::{Content, Date, Finish, Pdf, Rect, Ref, Str, TextStr};

use super::fonts::Font;
use super::layout::{PAGE_HEIGHT, PAGE_WIDTH, PageModel};
use super::text::encode_latin1;

pub struct DocumentInfo<'a> {
    pub title: &'a str,
    pub producer: &'a str,
    pub created_at: DateTime<Utc>,
}

/// Serializes laid-out pages into a PDF using the built-in Helvetica faces
/// with WinAnsi encoding, so no font program is embedded.
pub fn write_pdf(pages: &[PageModel], info: &DocumentInfo<'_>) -> Vec<u8> {
    let catalog_id = Ref::new(1);
    let page_tree_id = Ref::new(2);
    let regular_id = Ref::new(3);
    let bold_id = Ref::new(4);
    let info_id = Ref::new(5);
    let page_ids: Vec<Ref> = (0..pages.len())
        .map(|i| Ref::new(10 + 2 * i as i32))
        .collect();

    let mut pdf = Pdf::new();
    pdf.catalog(catalog_id).pages(page_tree_id);
    pdf.pages(page_tree_id)
        .kids(page_ids.iter().copied())
        .count(page_ids.len() as i32);

    for (font, id) in [(Font::Regular, regular_id), (Font::Bold, bold_id)] {
        pdf.type1_font(id)
            .base_font(font.base_font())
            .encoding_predefined(pdf_writer::Name(b"WinAnsiEncoding"));
    }

    for (i, page) in pages.iter().enumerate() {
        let page_id = page_ids[i];
        let content_id = Ref::new(11 + 2 * i as i32);

        let mut writer = pdf.page(page_id);
        writer.media_box(Rect::new(0.0, 0.0, PAGE_WIDTH, PAGE_HEIGHT));
        writer.parent(page_tree_id);
        writer.contents(content_id);
        let mut resources = writer.resources();
        resources
            .fonts()
            .pair(Font::Regular.resource_name(), regular_id)
            .pair(Font::Bold.resource_name(), bold_id);
        resources.finish();
        writer.finish();

        pdf.stream(content_id, &page_content(page));
    }

    let created = &info.created_at;
    let mut doc_info = pdf.document_info(info_id);
    doc_info
        .title(TextStr(info.title))
        .producer(TextStr(info.producer))
        .creator(TextStr(info.producer))
        .creation_date(
            Date::new(created.year() as u16)
                .month(created.month() as u8)
                .day(created.day() as u8)
                .hour(created.hour() as u8)
                .minute(created.minute() as u8)
                .second(created.second() as u8),
        );
    doc_info.finish();

    pdf.finish()
}

fn page_content(page: &PageModel) -> Vec<u8> {
    let mut content = Content::new();

    if !page.rules.is_empty() {
        content.set_line_width(0.5);
        for rule in &page.rules {
            content.move_to(rule.x1, rule.y);
            content.line_to(rule.x2, rule.y);
        }
        content.stroke();
    }

    for run in page.runs.iter().filter(|run| !run.text.is_empty()) {
        content.begin_text();
        content.set_font(run.font.resource_name(), run.size);
        content.next_line(run.x, run.y);
        content.show(Str(&encode_latin1(&run.text)));
        content.end_text();
    }

    content.finish()
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;
    use crate::document::layout::layout_document;
    use crate::document::{LayoutStyle, RenderOptions, ReportMeta};
    use crate::models::ReportDepth;

    fn contains(haystack: &[u8], needle: &[u8]) -> bool {
        haystack.windows(needle.len()).any(|w| w == needle)
    }

    fn render(text: &str, layout: LayoutStyle) -> Vec<u8> {
        let meta = ReportMeta {
            depth: ReportDepth::Flash,
            generated_at: Utc.with_ymd_and_hms(2026, 10, 16, 9, 30, 0).unwrap(),
            reference: "IR-00000001".to_string(),
        };
        let options = RenderOptions {
            layout,
            ..RenderOptions::default()
        };
        let pages = layout_document(text, &meta, &options);
        write_pdf(
            &pages,
            &DocumentInfo {
                title: "HSE FLASH REPORT",
                producer: "test",
                created_at: meta.generated_at,
            },
        )
    }

    #[test]
    fn test_output_is_pdf() {
        let bytes = render("WHAT HAPPENED: leak", LayoutStyle::Simple);
        assert!(bytes.starts_with(b"%PDF-"));
        assert!(contains(&bytes, b"%%EOF"));
        assert!(contains(&bytes, b"/Helvetica"));
        assert!(contains(&bytes, b"/WinAnsiEncoding"));
    }

    #[test]
    fn test_text_is_drawn() {
        let bytes = render("WHAT HAPPENED: leak", LayoutStyle::Simple);
        assert!(contains(&bytes, b"(WHAT HAPPENED: leak)"));
        assert!(contains(&bytes, b"(HSE: FLASH REPORT)"));
    }

    #[test]
    fn test_page_count_matches_layout() {
        let bytes = render("x", LayoutStyle::TitlePage);
        assert!(contains(&bytes, b"/Count 2"));
    }
}
