use super::fonts::Font;

pub const REPLACEMENT: char = '?';

/// Restricts `text` to what the standard PDF fonts can show (Latin-1).
///
/// Anything above U+00FF becomes `?`, as do control characters other than
/// newline. Tabs expand to four spaces and carriage returns are dropped.
pub fn sanitize_latin1(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '\r' => {}
            '\n' => out.push('\n'),
            '\t' => out.push_str("    "),
            c if c.is_control() => out.push(REPLACEMENT),
            c if (c as u32) <= 0xFF => out.push(c),
            _ => out.push(REPLACEMENT),
        }
    }
    out
}

/// Removes markdown emphasis markers (`**` and `__`). Repeats until no marker
/// is left, since removing one pair can join its neighbours into a new one.
pub fn strip_emphasis(text: &str) -> String {
    let mut out = text.to_string();
    while out.contains("**") || out.contains("__") {
        out = out.replace("**", "").replace("__", "");
    }
    out
}

/// Latin-1 bytes for text that went through [`sanitize_latin1`].
pub fn encode_latin1(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| u8::try_from(u32::from(c)).unwrap_or(REPLACEMENT as u8))
        .collect()
}

/// Greedy line breaking in the manner of a flowed text cell: break at the
/// last space that fits, or mid-word when a single word is wider than the
/// line. Every `\n` starts a new line and blank lines are kept.
pub fn wrap_text(text: &str, font: Font, size: f32, max_width: f32) -> Vec<String> {
    let mut lines = Vec::new();

    for paragraph in text.split('\n') {
        let chars: Vec<char> = paragraph.trim_end().chars().collect();
        if chars.is_empty() {
            lines.push(String::new());
            continue;
        }

        let mut start = 0;
        let mut last_space = None;
        let mut width = 0.0;
        let mut i = 0;
        let mut emitted = false;

        while i < chars.len() {
            let c = chars[i];
            if c == ' ' {
                last_space = Some(i);
            }
            width += font.char_width(c, size);

            if width > max_width {
                match last_space {
                    Some(space) if space > start => {
                        lines.push(chars[start..space].iter().collect());
                        start = space + 1;
                    }
                    _ => {
                        let end = if i == start { i + 1 } else { i };
                        lines.push(chars[start..end].iter().collect());
                        start = end;
                    }
                }
                emitted = true;
                last_space = None;
                width = 0.0;
                i = start;
                continue;
            }
            i += 1;
        }

        if start < chars.len() || !emitted {
            lines.push(chars[start..].iter().collect());
        }
    }

    lines
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_replaces_outside_latin1() {
        assert_eq!(sanitize_latin1("H₂S – 15 ppm 🚨"), "H?S ? 15 ppm ?");
    }

    #[test]
    fn test_sanitize_keeps_latin1() {
        let text = "Café déjà vu: 5 °C, ±2 µg, naïve façade";
        assert_eq!(sanitize_latin1(text), text);
    }

    #[test]
    fn test_sanitize_controls() {
        assert_eq!(sanitize_latin1("a\r\nb\tc\u{7}d\u{85}"), "a\nb    c?d?");
    }

    #[test]
    fn test_sanitize_never_truncates() {
        let text = "日本語のテキスト and more text after it";
        let clean = sanitize_latin1(text);
        assert!(clean.ends_with("and more text after it"));
        assert_eq!(clean.chars().count(), text.chars().count());
    }

    #[test]
    fn test_strip_emphasis() {
        assert_eq!(
            strip_emphasis("**Summary**: all clear __done__"),
            "Summary: all clear done"
        );
        assert_eq!(strip_emphasis("a * b _ c"), "a * b _ c");
    }

    #[test]
    fn test_strip_emphasis_leaves_no_joined_markers() {
        for input in ["*__*", "x ***__*** y", "Risk: *__* high", "_**_"] {
            let out = strip_emphasis(input);
            assert!(!out.contains("**"), "{input} -> {out}");
            assert!(!out.contains("__"), "{input} -> {out}");
        }
        assert_eq!(strip_emphasis("Risk: *__* high"), "Risk:  high");
    }

    #[test]
    fn test_encode_latin1() {
        assert_eq!(encode_latin1("é?A"), vec![0xE9, b'?', b'A']);
    }

    #[test]
    fn test_wrap_short_line_untouched() {
        let lines = wrap_text("Minor leak", Font::Regular, 10.0, 500.0);
        assert_eq!(lines, vec!["Minor leak"]);
    }

    #[test]
    fn test_wrap_breaks_at_spaces() {
        let text = "one two three four five six seven eight nine ten";
        let max = Font::Regular.text_width("one two three", 10.0) + 0.1;
        let lines = wrap_text(text, Font::Regular, 10.0, max);

        assert!(lines.len() > 1);
        for line in &lines {
            assert!(Font::Regular.text_width(line, 10.0) <= max, "{line:?}");
            assert!(!line.starts_with(' '));
        }
        assert_eq!(lines.join(" "), text);
    }

    #[test]
    fn test_wrap_splits_long_words() {
        let word = "x".repeat(200);
        let lines = wrap_text(&word, Font::Regular, 10.0, 100.0);
        assert!(lines.len() > 1);
        assert_eq!(lines.concat(), word);
    }

    #[test]
    fn test_wrap_keeps_blank_lines() {
        let lines = wrap_text("WHAT HAPPENED\n\nA seal failed.", Font::Regular, 10.0, 500.0);
        assert_eq!(lines, vec!["WHAT HAPPENED", "", "A seal failed."]);
    }

    #[test]
    fn test_wrap_empty_text() {
        assert_eq!(wrap_text("", Font::Regular, 10.0, 500.0), vec![String::new()]);
    }
}
