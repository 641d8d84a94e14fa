use chrono::{DateTime, Utc};
use serde::Serialize;

use super::fonts::Font;
use super::text::{sanitize_latin1, wrap_text};
use super::{LayoutStyle, RenderOptions, ReportMeta};

// A4 in points, 10 mm margins.
pub const PAGE_WIDTH: f32 = 595.28;
pub const PAGE_HEIGHT: f32 = 841.89;
pub const MARGIN: f32 = 28.35;

const BAND_SIZE: f32 = 8.0;
const BODY_SIZE: f32 = 10.0;
const LINE_HEIGHT: f32 = 14.17;
const TITLE_CELL_SIZE: f32 = 14.0;
const TITLE_CELL_HEIGHT: f32 = 28.35;

const HEADER_BASELINE: f32 = PAGE_HEIGHT - MARGIN - BAND_SIZE;
const HEADER_RULE: f32 = HEADER_BASELINE - 6.0;
const FOOTER_BASELINE: f32 = MARGIN;
const FOOTER_RULE: f32 = FOOTER_BASELINE + BAND_SIZE + 4.0;
const BODY_TOP: f32 = HEADER_RULE - 16.0;
const BODY_BOTTOM: f32 = FOOTER_RULE + 12.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Region {
    Header,
    Footer,
    Title,
    Body,
}

#[derive(Debug, Clone, Serialize)]
pub struct TextRun {
    pub region: Region,
    #[serde(skip)]
    pub font: Font,
    pub size: f32,
    pub x: f32,
    pub y: f32,
    pub text: String,
}

/// Horizontal rule separating a band from the body.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct Rule {
    pub x1: f32,
    pub x2: f32,
    pub y: f32,
}

#[derive(Debug, Clone, Serialize)]
pub struct PageModel {
    pub number: usize,
    pub runs: Vec<TextRun>,
    pub rules: Vec<Rule>,
}

impl PageModel {
    fn new(number: usize) -> Self {
        Self {
            number,
            runs: Vec::new(),
            rules: Vec::new(),
        }
    }

    pub fn text_in(&self, region: Region) -> Vec<&str> {
        self.runs
            .iter()
            .filter(|run| run.region == region)
            .map(|run| run.text.as_str())
            .collect()
    }

    pub fn has_region(&self, region: Region) -> bool {
        self.runs.iter().any(|run| run.region == region)
    }

    fn push(&mut self, region: Region, font: Font, size: f32, x: f32, y: f32, text: &str) {
        self.runs.push(TextRun {
            region,
            font,
            size,
            x,
            y,
            text: sanitize_latin1(text),
        });
    }

    fn push_centered(&mut self, region: Region, font: Font, size: f32, y: f32, text: &str) {
        let text = sanitize_latin1(text);
        let x = ((PAGE_WIDTH - font.text_width(&text, size)) / 2.0).max(MARGIN);
        self.push(region, font, size, x, y, &text);
    }

    fn push_right(&mut self, region: Region, font: Font, size: f32, y: f32, text: &str) {
        let text = sanitize_latin1(text);
        let x = (PAGE_WIDTH - MARGIN - font.text_width(&text, size)).max(MARGIN);
        self.push(region, font, size, x, y, &text);
    }
}

fn format_date(at: &DateTime<Utc>) -> String {
    at.format("%Y-%m-%d %H:%M UTC").to_string()
}

/// Lays the sanitized body text out over as many pages as it needs and adds
/// the title, header and footer decorations for the chosen style.
pub fn layout_document(body: &str, meta: &ReportMeta, options: &RenderOptions) -> Vec<PageModel> {
    let body_width = PAGE_WIDTH - 2.0 * MARGIN;
    let mut lines = if body.is_empty() {
        Vec::new()
    } else {
        wrap_text(body, Font::Regular, BODY_SIZE, body_width)
    };
    // A trailing newline never claims a line slot of its own.
    while lines.last().is_some_and(|line| line.is_empty()) {
        lines.pop();
    }

    let mut pages = Vec::new();
    let mut cursor;

    let mut current = match options.layout {
        LayoutStyle::Simple => {
            let mut page = PageModel::new(1);
            page.push_centered(
                Region::Title,
                Font::Bold,
                TITLE_CELL_SIZE,
                BODY_TOP - TITLE_CELL_SIZE,
                &format!("HSE: {}", meta.depth.title().trim_start_matches("HSE ")),
            );
            cursor = BODY_TOP - 2.0 * TITLE_CELL_HEIGHT;
            page
        }
        LayoutStyle::TitlePage => {
            pages.push(title_page(meta, options));
            cursor = BODY_TOP;
            PageModel::new(2)
        }
    };

    for line in &lines {
        if cursor - LINE_HEIGHT < BODY_BOTTOM {
            let next = current.number + 1;
            pages.push(std::mem::replace(&mut current, PageModel::new(next)));
            cursor = BODY_TOP;
        }
        let baseline = cursor - LINE_HEIGHT + (LINE_HEIGHT - BODY_SIZE) / 2.0;
        if !line.is_empty() {
            current.push(Region::Body, Font::Regular, BODY_SIZE, MARGIN, baseline, line);
        }
        cursor -= LINE_HEIGHT;
    }
    pages.push(current);

    let total = pages.len();
    for page in &mut pages {
        let show_header = !(options.layout == LayoutStyle::TitlePage && page.number == 1);
        if show_header {
            add_header(page, meta, options);
        }
        add_footer(page, total, options);
    }

    pages
}

fn title_page(meta: &ReportMeta, options: &RenderOptions) -> PageModel {
    let mut page = PageModel::new(1);
    let title_y = PAGE_HEIGHT * 0.62;

    page.push_centered(Region::Title, Font::Bold, 24.0, title_y, meta.depth.title());
    page.rules.push(Rule {
        x1: MARGIN * 3.0,
        x2: PAGE_WIDTH - MARGIN * 3.0,
        y: title_y - 14.0,
    });
    page.push_centered(
        Region::Title,
        Font::Regular,
        14.0,
        title_y - 40.0,
        meta.depth.label(),
    );
    page.push_centered(
        Region::Title,
        Font::Regular,
        11.0,
        title_y - 70.0,
        &format!("Generated: {}", format_date(&meta.generated_at)),
    );
    page.push_centered(
        Region::Title,
        Font::Regular,
        11.0,
        title_y - 86.0,
        &format!("Reference: {}", meta.reference),
    );
    page.push_centered(
        Region::Title,
        Font::Bold,
        10.0,
        title_y - 160.0,
        &options.confidentiality_label,
    );
    page.push_centered(
        Region::Title,
        Font::Regular,
        9.0,
        title_y - 176.0,
        "This document contains AI-generated content and must be verified before distribution.",
    );

    page
}

fn add_header(page: &mut PageModel, meta: &ReportMeta, options: &RenderOptions) {
    page.push(
        Region::Header,
        Font::Bold,
        BAND_SIZE,
        MARGIN,
        HEADER_BASELINE,
        &options.confidentiality_label,
    );
    page.push_right(
        Region::Header,
        Font::Regular,
        BAND_SIZE,
        HEADER_BASELINE,
        &format!(
            "Generated: {} | Ref: {}",
            format_date(&meta.generated_at),
            meta.reference
        ),
    );
    page.rules.push(Rule {
        x1: MARGIN,
        x2: PAGE_WIDTH - MARGIN,
        y: HEADER_RULE,
    });
}

fn add_footer(page: &mut PageModel, total: usize, options: &RenderOptions) {
    page.rules.push(Rule {
        x1: MARGIN,
        x2: PAGE_WIDTH - MARGIN,
        y: FOOTER_RULE,
    });
    page.push(
        Region::Footer,
        Font::Regular,
        BAND_SIZE,
        MARGIN,
        FOOTER_BASELINE,
        &options.product_label,
    );
    page.push_right(
        Region::Footer,
        Font::Regular,
        BAND_SIZE,
        FOOTER_BASELINE,
        &format!("Page {} of {}", page.number, total),
    );
}
