use pulldown_cmark::{Event, Options, Parser, Tag};

/// A run of prose or an inline `$…$` math span.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MathSegment {
    Text(String),
    Math(String),
}

impl MathSegment {
    #[must_use]
    pub fn is_math(&self) -> bool {
        matches!(self, MathSegment::Math(_))
    }

    /// Readable rendering without a typesetter: common TeX commands become
    /// their Unicode symbols, braces are dropped.
    #[must_use]
    pub fn plain_text(&self) -> String {
        match self {
            MathSegment::Text(text) => text.clone(),
            MathSegment::Math(tex) => tex_to_plain(tex),
        }
    }
}

/// Split `input` into text and math segments.
///
/// The input is read as CommonMark with inline math enabled: `$x$` is a math
/// span, while prices such as `$5 and $10` stay literal because neither `$`
/// can open and close a span around whitespace. `\$` is a literal dollar
/// sign. Markup around text is flattened; paragraphs are joined by newlines.
#[must_use]
pub fn parse_inline_math(input: &str) -> Vec<MathSegment> {
    let mut builder = SegmentBuilder::default();
    for event in Parser::new_ext(input, Options::ENABLE_MATH) {
        match event {
            Event::Text(text) | Event::Code(text) | Event::Html(text) | Event::InlineHtml(text) => {
                builder.text(&text);
            }
            Event::InlineMath(tex) | Event::DisplayMath(tex) => builder.math(&tex),
            Event::SoftBreak => builder.text(" "),
            Event::HardBreak => builder.text("\n"),
            Event::Start(Tag::Paragraph) => builder.break_block(),
            _ => {}
        }
    }
    builder.finish()
}

#[derive(Default)]
struct SegmentBuilder {
    segments: Vec<MathSegment>,
    text: String,
}

impl SegmentBuilder {
    fn text(&mut self, text: &str) {
        self.text.push_str(text);
    }

    fn math(&mut self, tex: &str) {
        self.flush();
        self.segments.push(MathSegment::Math(tex.to_owned()));
    }

    fn break_block(&mut self) {
        if !self.text.is_empty() || !self.segments.is_empty() {
            self.text.push('\n');
        }
    }

    fn flush(&mut self) {
        if !self.text.is_empty() {
            let text = std::mem::take(&mut self.text);
            self.segments.push(MathSegment::Text(text));
        }
    }

    fn finish(mut self) -> Vec<MathSegment> {
        self.flush();
        self.segments
    }
}

/// Concatenate segments as plain text.
#[must_use]
pub fn render_plain(segments: &[MathSegment]) -> String {
    segments.iter().map(MathSegment::plain_text).collect()
}

const TEX_SYMBOLS: &[(&str, &str)] = &[
    ("\\left", ""),
    ("\\right", ""),
    ("\\text", ""),
    ("\\times", "×"),
    ("\\div", "÷"),
    ("\\cdot", "·"),
    ("\\pm", "±"),
    ("\\leq", "≤"),
    ("\\geq", "≥"),
    ("\\le", "≤"),
    ("\\ge", "≥"),
    ("\\neq", "≠"),
    ("\\approx", "≈"),
    ("\\pi", "π"),
    ("\\sqrt", "√"),
    ("\\infty", "∞"),
    ("\\%", "%"),
    ("\\$", "$"),
    ("\\,", " "),
];

fn tex_to_plain(tex: &str) -> String {
    let mut out = rewrite_fractions(tex);
    for (command, symbol) in TEX_SYMBOLS {
        out = out.replace(command, symbol);
    }
    out.replace(['{', '}'], "")
}

/// `\frac{a}{b}` → `(a)/(b)`, with bare groups for single tokens.
fn rewrite_fractions(tex: &str) -> String {
    let mut out = String::with_capacity(tex.len());
    let mut rest = tex;
    while let Some(pos) = rest.find("\\frac") {
        out.push_str(&rest[..pos]);
        let after = &rest[pos + "\\frac".len()..];
        let groups = take_group(after)
            .and_then(|(num, tail)| take_group(tail).map(|(den, tail)| (num, den, tail)));
        match groups {
            Some((num, den, tail)) => {
                out.push_str(&wrap(num));
                out.push('/');
                out.push_str(&wrap(den));
                rest = tail;
            }
            None => {
                out.push_str("\\frac");
                rest = after;
            }
        }
    }
    out.push_str(rest);
    out
}

fn take_group(input: &str) -> Option<(&str, &str)> {
    let input = input.trim_start();
    let body = input.strip_prefix('{')?;
    let mut depth = 1usize;
    for (i, ch) in body.char_indices() {
        match ch {
            '{' => depth += 1,
            '}' => {
                depth -= 1;
                if depth == 0 {
                    return Some((&body[..i], &body[i + 1..]));
                }
            }
            _ => {}
        }
    }
    None
}

fn wrap(group: &str) -> String {
    let plain = tex_to_plain(group);
    if plain.chars().all(|c| c.is_alphanumeric() || c == '.') {
        plain
    } else {
        format!("({plain})")
    }
}
