pub mod fonts;
pub mod layout;
pub mod pdf;
pub mod text;

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use opentelemetry::KeyValue;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::models::ReportDepth;
use crate::telemetry::metrics::{REPORT_DOCUMENT_SIZE, REPORT_PAGES};

pub use layout::{PageModel, Region};

/// Page structure of the rendered report.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LayoutStyle {
    /// Title cell at the top of page 1, body follows on the same page.
    Simple,
    /// Dedicated cover page, body starts on page 2.
    #[default]
    TitlePage,
}

#[derive(Error, Debug)]
#[error("unknown layout style `{0}`")]
pub struct UnknownLayoutStyle(String);

impl FromStr for LayoutStyle {
    type Err = UnknownLayoutStyle;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "simple" => Ok(LayoutStyle::Simple),
            "title_page" | "tier1" | "tier_1" => Ok(LayoutStyle::TitlePage),
            _ => Err(UnknownLayoutStyle(s.to_string())),
        }
    }
}

impl fmt::Display for LayoutStyle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            LayoutStyle::Simple => "simple",
            LayoutStyle::TitlePage => "title_page",
        })
    }
}

#[derive(Debug, Clone)]
pub struct RenderOptions {
    pub layout: LayoutStyle,
    pub strip_markdown: bool,
    pub product_label: String,
    pub confidentiality_label: String,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self {
            layout: LayoutStyle::TitlePage,
            strip_markdown: true,
            product_label: "HSE Incident Commander v4.0".to_string(),
            confidentiality_label: "CONFIDENTIAL - HSE INTERNAL USE ONLY".to_string(),
        }
    }
}

/// Per-report values printed in the title and header regions.
#[derive(Debug, Clone)]
pub struct ReportMeta {
    pub depth: ReportDepth,
    pub generated_at: DateTime<Utc>,
    pub reference: String,
}

#[derive(Debug, Clone)]
pub struct RenderedDocument {
    pub bytes: Vec<u8>,
    pub pages: Vec<PageModel>,
}

impl RenderedDocument {
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// All body lines in page order.
    pub fn body_lines(&self) -> Vec<&str> {
        self.pages
            .iter()
            .flat_map(|page| page.text_in(Region::Body))
            .collect()
    }

    pub fn title_text(&self) -> Vec<&str> {
        self.pages
            .iter()
            .flat_map(|page| page.text_in(Region::Title))
            .collect()
    }
}

#[derive(Debug, Clone, Default)]
pub struct DocumentRenderer {
    options: RenderOptions,
}

impl DocumentRenderer {
    pub fn new(options: RenderOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &RenderOptions {
        &self.options
    }

    /// Renders report text into a paginated PDF. Never fails: characters the
    /// document fonts cannot show are replaced and empty text gives a
    /// document with an empty body.
    #[tracing::instrument(
        name = "pipeline_stage render",
        skip(self, text, meta),
        fields(
            pipeline.stage = "render",
            render.layout = %self.options.layout,
            render.strip_markdown = self.options.strip_markdown,
            document.pages,
            document.bytes,
        )
    )]
    pub fn render(&self, text: &str, meta: &ReportMeta) -> RenderedDocument {
        let body = if self.options.strip_markdown {
            text::strip_emphasis(text)
        } else {
            text.to_string()
        };
        let body = text::sanitize_latin1(&body);

        let pages = layout::layout_document(&body, meta, &self.options);
        let bytes = pdf::write_pdf(
            &pages,
            &pdf::DocumentInfo {
                title: meta.depth.title(),
                producer: &self.options.product_label,
                created_at: meta.generated_at,
            },
        );

        let span = tracing::Span::current();
        span.record("document.pages", pages.len());
        span.record("document.bytes", bytes.len());

        let depth_kv = [KeyValue::new("report.depth", meta.depth.as_str())];
        REPORT_PAGES.record(pages.len() as f64, &depth_kv);
        REPORT_DOCUMENT_SIZE.record(bytes.len() as f64, &depth_kv);

        RenderedDocument { bytes, pages }
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn meta(depth: ReportDepth) -> ReportMeta {
        ReportMeta {
            depth,
            generated_at: Utc.with_ymd_and_hms(2026, 10, 16, 14, 0, 0).unwrap(),
            reference: "IR-12345678".to_string(),
        }
    }

    #[test]
    fn test_layout_style_from_str() {
        assert_eq!("simple".parse::<LayoutStyle>().unwrap(), LayoutStyle::Simple);
        assert_eq!("title_page".parse::<LayoutStyle>().unwrap(), LayoutStyle::TitlePage);
        assert_eq!("Title-Page".parse::<LayoutStyle>().unwrap(), LayoutStyle::TitlePage);
        assert_eq!("tier1".parse::<LayoutStyle>().unwrap(), LayoutStyle::TitlePage);
        assert!("landscape".parse::<LayoutStyle>().is_err());
    }

    #[test]
    fn test_render_strips_emphasis() {
        let renderer = DocumentRenderer::default();
        let doc = renderer.render("**Summary**: all clear __done__", &meta(ReportDepth::Flash));

        let body = doc.body_lines().join("\n");
        assert_eq!(body, "Summary: all clear done");
        assert!(!body.contains("**"));
        assert!(!body.contains("__"));
    }

    #[test]
    fn test_render_strips_markers_joined_by_stripping() {
        let renderer = DocumentRenderer::default();
        let doc = renderer.render("Risk: *__* high", &meta(ReportDepth::Flash));

        let body = doc.body_lines().join("\n");
        assert!(!body.contains("**"));
        assert!(!body.contains("__"));
    }

    #[test]
    fn test_render_keeps_emphasis_when_disabled() {
        let renderer = DocumentRenderer::new(RenderOptions {
            strip_markdown: false,
            layout: LayoutStyle::Simple,
            ..RenderOptions::default()
        });
        let doc = renderer.render("**Summary**: all clear", &meta(ReportDepth::Flash));
        assert_eq!(doc.body_lines(), vec!["**Summary**: all clear"]);
    }

    #[test]
    fn test_render_replaces_unrepresentable_characters() {
        let renderer = DocumentRenderer::default();
        let doc = renderer.render(
            "Gas alarm – H₂S 15 ppm at wellhead 🚨 “evacuate”",
            &meta(ReportDepth::DeepDive),
        );

        assert!(!doc.bytes.is_empty());
        assert!(doc.bytes.starts_with(b"%PDF-"));
        assert_eq!(
            doc.body_lines(),
            vec!["Gas alarm ? H?S 15 ppm at wellhead ? ?evacuate?"]
        );
    }

    #[test]
    fn test_render_empty_text() {
        for layout in [LayoutStyle::Simple, LayoutStyle::TitlePage] {
            let renderer = DocumentRenderer::new(RenderOptions {
                layout,
                ..RenderOptions::default()
            });
            let doc = renderer.render("", &meta(ReportDepth::Flash));
            assert!(doc.bytes.starts_with(b"%PDF-"));
            assert!(doc.body_lines().is_empty());
            assert!(!doc.title_text().is_empty());
        }
    }

    #[test]
    fn test_title_depends_on_depth() {
        let renderer = DocumentRenderer::default();
        let flash = renderer.render("text", &meta(ReportDepth::Flash));
        let deep = renderer.render("text", &meta(ReportDepth::DeepDive));

        assert!(flash.title_text().contains(&"HSE FLASH REPORT"));
        assert!(deep.title_text().contains(&"HSE INVESTIGATION REPORT"));
        assert!(!deep.title_text().iter().any(|t| t.contains("FLASH")));
    }

    #[test]
    fn test_title_page_lineage_has_cover() {
        let renderer = DocumentRenderer::default();
        let doc = renderer.render("Body", &meta(ReportDepth::Flash));
        assert_eq!(doc.page_count(), 2);
        assert!(!doc.pages[0].has_region(Region::Header));
        assert!(doc.pages[1].has_region(Region::Header));
    }
}
