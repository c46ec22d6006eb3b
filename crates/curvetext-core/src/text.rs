//! Text bound to a path: content, font size, offset and free-form style.

use serde::{Deserialize, Serialize};

/// Style property reserved for the dedicated font-size control.
pub const FONT_SIZE_PROPERTY: &str = "fontSize";
/// Font size every free-form style edit pins the text to.
pub const PINNED_FONT_SIZE: f64 = 24.0;
/// Font size change per scroll notch.
pub const FONT_SIZE_STEP: f64 = 2.0;
/// Smallest font size reachable by scrolling.
pub const MIN_FONT_SIZE: f64 = 1.0;
/// Offset change per scroll notch.
pub const OFFSET_STEP: f64 = 5.0;

/// The two editors that show the same text content.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TextEditor {
    /// Single-line input in the path panel.
    Inline,
    /// Multi-line area that pops up over the canvas.
    Multiline,
}

impl TextEditor {
    /// The editor that mirrors this one.
    pub fn other(self) -> Self {
        match self {
            TextEditor::Inline => TextEditor::Multiline,
            TextEditor::Multiline => TextEditor::Inline,
        }
    }
}

/// One parsed `key: value` style entry. The key is camelCase.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StyleDeclaration {
    pub property: String,
    pub value: String,
}

/// Convert a hyphenated CSS key to camelCase: every hyphen is dropped and the
/// character after it upper-cased.
pub fn camel_case(key: &str) -> String {
    let mut out = String::with_capacity(key.len());
    let mut upper_next = false;
    for c in key.chars() {
        if c == '-' {
            upper_next = true;
        } else if upper_next {
            out.extend(c.to_uppercase());
            upper_next = false;
        } else {
            out.push(c);
        }
    }
    out
}

/// Parse a `;`-separated list of `key: value` pairs.
///
/// Entries without a colon, or with an empty key or value, are skipped. Only
/// the text between the first and second colon is kept as the value.
pub fn parse_style(input: &str) -> Vec<StyleDeclaration> {
    input
        .split(';')
        .filter(|entry| entry.contains(':'))
        .filter_map(|entry| {
            let mut parts = entry.split(':');
            let key = parts.next()?.replace('\n', "");
            let value = parts.next()?.replace('\n', "");
            let (key, value) = (key.trim(), value.trim());
            if key.is_empty() || value.is_empty() {
                return None;
            }
            Some(StyleDeclaration {
                property: camel_case(key),
                value: value.to_string(),
            })
        })
        .collect()
}

/// Parse a numeric field value. Empty or malformed input yields `NaN`.
pub fn parse_number(raw: &str) -> f64 {
    raw.trim().parse().unwrap_or(f64::NAN)
}

/// Styled text that follows a path.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextRun {
    /// Logical content shared by both editors.
    pub content: String,
    /// Font size in pixels.
    pub font_size: f64,
    /// Horizontal offset along the path.
    pub offset: f64,
    /// Free-form style entries, in application order, without font size.
    declarations: Vec<StyleDeclaration>,
}

impl TextRun {
    pub fn new(content: impl Into<String>, font_size: f64) -> Self {
        Self {
            content: content.into(),
            font_size,
            offset: 0.0,
            declarations: Vec::new(),
        }
    }

    /// Custom style entries currently applied.
    pub fn declarations(&self) -> &[StyleDeclaration] {
        &self.declarations
    }

    /// Replace all custom style entries with those parsed from `input`.
    ///
    /// The font-size slot is not writable from here: it is reset to
    /// [`PINNED_FONT_SIZE`] and any font-size entry in `input` is ignored.
    /// Later entries for the same property win.
    pub fn apply_style(&mut self, input: &str) {
        self.declarations.clear();
        for decl in parse_style(input) {
            if decl.property == FONT_SIZE_PROPERTY {
                log::debug!("Ignoring free-form font size {:?}", decl.value);
                continue;
            }
            match self.declarations.iter_mut().find(|d| d.property == decl.property) {
                Some(existing) => existing.value = decl.value,
                None => self.declarations.push(decl),
            }
        }
        self.font_size = PINNED_FONT_SIZE;
    }

    /// Step the font size by one scroll notch. Never drops below
    /// [`MIN_FONT_SIZE`].
    pub fn scroll_font_size(&mut self, up: bool) -> f64 {
        let step = if up { FONT_SIZE_STEP } else { -FONT_SIZE_STEP };
        self.font_size = (self.font_size.trunc() + step).max(MIN_FONT_SIZE);
        self.font_size
    }

    /// Step the offset along the path by one scroll notch.
    pub fn scroll_offset(&mut self, up: bool) -> f64 {
        self.offset += if up { OFFSET_STEP } else { -OFFSET_STEP };
        self.offset
    }

    /// Every style property to put on the text element: font size first,
    /// then the custom entries.
    pub fn style_properties(&self) -> Vec<(String, String)> {
        let mut props = Vec::with_capacity(self.declarations.len() + 1);
        props.push((FONT_SIZE_PROPERTY.to_string(), format!("{}px", self.font_size)));
        props.extend(
            self.declarations
                .iter()
                .map(|d| (d.property.clone(), d.value.clone())),
        );
        props
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_camel_case() {
        assert_eq!(camel_case("letter-spacing"), "letterSpacing");
        assert_eq!(camel_case("-webkit-text-stroke"), "WebkitTextStroke");
        assert_eq!(camel_case("color"), "color");
    }

    #[test]
    fn test_parse_drops_malformed_entries() {
        let decls = parse_style("color: red; : blue; fill:; bogus; font-weight : bold ;");
        assert_eq!(
            decls,
            vec![
                StyleDeclaration {
                    property: "color".to_string(),
                    value: "red".to_string(),
                },
                StyleDeclaration {
                    property: "fontWeight".to_string(),
                    value: "bold".to_string(),
                },
            ]
        );
    }

    #[test]
    fn test_parse_strips_newlines() {
        let decls = parse_style("\nletter-spacing:\n 4px\n");
        assert_eq!(decls.len(), 1);
        assert_eq!(decls[0].property, "letterSpacing");
        assert_eq!(decls[0].value, "4px");
    }

    #[test]
    fn test_font_size_is_pinned() {
        let mut run = TextRun::new("hello", 40.0);
        run.apply_style("color: red; font-size: 40px");
        assert_eq!(run.declarations().len(), 1);
        assert_eq!(run.declarations()[0].property, "color");
        assert_eq!(run.declarations()[0].value, "red");
        assert!((run.font_size - 24.0).abs() < f64::EPSILON);
        assert_eq!(
            run.style_properties()[0],
            ("fontSize".to_string(), "24px".to_string())
        );
    }

    #[test]
    fn test_apply_style_clears_previous() {
        let mut run = TextRun::new("hello", 24.0);
        run.apply_style("color: red; opacity: 0.5");
        run.apply_style("fill: blue");
        assert_eq!(run.declarations().len(), 1);
        assert_eq!(run.declarations()[0].property, "fill");
    }

    #[test]
    fn test_later_duplicate_wins() {
        let mut run = TextRun::new("hello", 24.0);
        run.apply_style("fill: red; fill: green");
        assert_eq!(run.declarations().len(), 1);
        assert_eq!(run.declarations()[0].value, "green");
    }

    #[test]
    fn test_scroll_font_size_floor() {
        let mut run = TextRun::new("x", 3.0);
        assert!((run.scroll_font_size(false) - 1.0).abs() < f64::EPSILON);
        assert!((run.scroll_font_size(false) - 1.0).abs() < f64::EPSILON);
        assert!((run.scroll_font_size(true) - 3.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_scroll_offset() {
        let mut run = TextRun::new("x", 24.0);
        run.scroll_offset(true);
        run.scroll_offset(true);
        run.scroll_offset(false);
        assert!((run.offset - 5.0).abs() < f64::EPSILON);
    }

    #[test]
    fn test_parse_number() {
        assert!((parse_number(" 12.5 ") - 12.5).abs() < f64::EPSILON);
        assert!(parse_number("").is_nan());
        assert!(parse_number("abc").is_nan());
    }
}
