//! Standard-14 Helvetica metrics used for line wrapping and alignment.
//!
//! Widths are AFM units (1/1000 em) for 0x20..=0x7E. Latin-1 supplement
//! characters use the average lowercase width of the face.

use pdf_writer::Name;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Font {
    Regular,
    Bold,
}

impl Font {
    pub fn resource_name(&self) -> Name<'static> {
        match self {
            Font::Regular => Name(b"F1"),
            Font::Bold => Name(b"F2"),
        }
    }

    pub fn base_font(&self) -> Name<'static> {
        match self {
            Font::Regular => Name(b"Helvetica"),
            Font::Bold => Name(b"Helvetica-Bold"),
        }
    }

    fn table(&self) -> &'static [u16; 95] {
        match self {
            Font::Regular => &HELVETICA,
            Font::Bold => &HELVETICA_BOLD,
        }
    }

    fn supplement_width(&self) -> u16 {
        match self {
            Font::Regular => 556,
            Font::Bold => 611,
        }
    }

    /// Advance width of `c` in points at `size`.
    pub fn char_width(&self, c: char, size: f32) -> f32 {
        let code = c as u32;
        let units = match code {
            0x20..=0x7E => self.table()[(code - 0x20) as usize],
            _ => self.supplement_width(),
        };
        f32::from(units) * size / 1000.0
    }

    pub fn text_width(&self, text: &str, size: f32) -> f32 {
        text.chars().map(|c| self.char_width(c, size)).sum()
    }
}

#[rustfmt::skip]
const HELVETICA: [u16; 95] = [
    278, 278, 355, 556, 556, 889, 667, 191, 333, 333, 389, 584, 278, 333, 278, 278, // ' '..'/'
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 278, 278, 584, 584, 584, 556, // '0'..'?'
    1015, 667, 667, 722, 722, 667, 611, 778, 722, 278, 500, 667, 556, 833, 722, 778, // '@'..'O'
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 278, 278, 278, 469, 556, // 'P'..'_'
    333, 556, 556, 500, 556, 556, 278, 556, 556, 222, 222, 500, 222, 833, 556, 556, // '`'..'o'
    556, 556, 333, 500, 278, 556, 500, 722, 500, 500, 500, 334, 260, 334, 584,      // 'p'..'~'
];

#[rustfmt::skip]
const HELVETICA_BOLD: [u16; 95] = [
    278, 333, 474, 556, 556, 889, 722, 238, 333, 333, 389, 584, 278, 333, 278, 278,
    556, 556, 556, 556, 556, 556, 556, 556, 556, 556, 333, 333, 584, 584, 584, 611,
    975, 722, 722, 722, 722, 667, 611, 778, 722, 278, 556, 722, 611, 833, 722, 778,
    667, 778, 722, 667, 611, 722, 667, 944, 667, 667, 611, 333, 278, 333, 584, 556,
    333, 556, 611, 556, 611, 556, 333, 611, 611, 278, 278, 556, 278, 889, 611, 611,
    611, 611, 389, 556, 333, 611, 556, 778, 556, 556, 500, 389, 280, 389, 584,
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_widths() {
        assert_eq!(Font::Regular.char_width(' ', 1000.0), 278.0);
        assert_eq!(Font::Regular.char_width('W', 1000.0), 944.0);
        assert_eq!(Font::Regular.char_width('i', 1000.0), 222.0);
        assert_eq!(Font::Bold.char_width('i', 1000.0), 278.0);
        assert_eq!(Font::Regular.char_width('~', 1000.0), 584.0);
    }

    #[test]
    fn test_supplement_characters_have_width() {
        assert_eq!(Font::Regular.char_width('é', 10.0), 5.56);
        assert!(Font::Bold.char_width('Ü', 10.0) > 0.0);
    }

    #[test]
    fn test_text_width_scales_with_size() {
        let small = Font::Regular.text_width("Incident", 10.0);
        let large = Font::Regular.text_width("Incident", 20.0);
        assert!((large - 2.0 * small).abs() < 0.001);
    }

    #[test]
    fn test_bold_is_wider() {
        assert!(Font::Bold.text_width("report", 10.0) > Font::Regular.text_width("report", 10.0));
    }
}
