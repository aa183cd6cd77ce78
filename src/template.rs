//! Command template compiler.
//!
//! A command pattern is compiled once into a list of segments and then
//! rendered for every batch of input.
//!
//! # Syntax
//!
//! - `{}` - Substitutes the first line of the batch
//! - `{N}` - Substitutes token `N` of the batch (zero-based)
//! - Anything else, including braces around non-digit text, is copied verbatim
//!
//! Token indexes are not checked when compiling: a `{5}` against a batch with
//! three tokens only fails when that batch is rendered.

use thiserror::Error;

/// Error type for template compile and render failures.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TemplateError {
    /// A `{N}` placeholder whose index does not fit in memory addressing.
    #[error("placeholder index '{digits}' at position {position} is too large")]
    IndexTooLarge {
        /// The digits between the braces.
        digits: String,
        /// Byte offset of the opening brace.
        position: usize,
    },

    /// A placeholder addressed a token the batch does not have.
    #[error("placeholder {{{index}}} is out of range: batch has {available} token(s)")]
    IndexOutOfRange {
        /// The index the placeholder asked for.
        index: usize,
        /// How many tokens the batch actually held.
        available: usize,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    /// `{}`: the first line of the batch.
    Line,
    /// `{N}`: token `N` of the batch.
    Token(usize),
}

/// Values a single batch exposes to the template.
///
/// `lines` are the raw input lines of the batch. Tokens back the `{N}`
/// placeholders: in count mode they are the lines themselves, in separator
/// mode they are the pieces of the single line.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateContext {
    lines: Vec<String>,
    tokens: Option<Vec<String>>,
}

impl TemplateContext {
    /// Context for a count-mode batch, where tokens are the lines.
    pub fn batch(lines: Vec<String>) -> Self {
        Self {
            lines,
            tokens: None,
        }
    }

    /// Context for a separator-mode line and its split tokens.
    pub fn split(line: String, tokens: Vec<String>) -> Self {
        Self {
            lines: vec![line],
            tokens: Some(tokens),
        }
    }

    pub fn lines(&self) -> &[String] {
        &self.lines
    }

    pub fn tokens(&self) -> &[String] {
        self.tokens.as_deref().unwrap_or(&self.lines)
    }
}

/// A compiled command pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommandTemplate {
    pattern: String,
    segments: Vec<Segment>,
}

impl CommandTemplate {
    /// Compile a command pattern.
    ///
    /// # Errors
    ///
    /// * `TemplateError::IndexTooLarge` - A `{N}` index overflows `usize`
    pub fn compile(pattern: &str) -> Result<Self, TemplateError> {
        let mut segments = Vec::new();
        let mut literal = String::new();
        let mut rest = pattern;
        let mut offset = 0;

        while let Some(open) = rest.find('{') {
            literal.push_str(&rest[..open]);

            let advance = match parse_placeholder(&rest[open + 1..], offset + open)? {
                Some((segment, consumed)) => {
                    if !literal.is_empty() {
                        segments.push(Segment::Literal(std::mem::take(&mut literal)));
                    }
                    segments.push(segment);
                    open + 1 + consumed
                }
                None => {
                    literal.push('{');
                    open + 1
                }
            };

            offset += advance;
            rest = &rest[advance..];
        }

        literal.push_str(rest);
        if !literal.is_empty() {
            segments.push(Segment::Literal(literal));
        }

        Ok(Self {
            pattern: pattern.to_string(),
            segments,
        })
    }

    /// The pattern this template was compiled from.
    pub fn pattern(&self) -> &str {
        &self.pattern
    }

    /// Render the template for one batch.
    ///
    /// Rendering has no side effects; the same context always yields the
    /// same command or the same error.
    pub fn render(&self, ctx: &TemplateContext) -> Result<String, TemplateError> {
        let mut out = String::with_capacity(self.pattern.len());

        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => out.push_str(text),
                Segment::Line => out.push_str(lookup(ctx.lines(), 0)?),
                Segment::Token(index) => out.push_str(lookup(ctx.tokens(), *index)?),
            }
        }

        Ok(out)
    }
}

/// Parse the text following a `{`.
///
/// Returns the placeholder and the number of bytes it consumed (including
/// the closing brace), or `None` when the brace is literal text.
fn parse_placeholder(
    after_open: &str,
    position: usize,
) -> Result<Option<(Segment, usize)>, TemplateError> {
    let Some(close) = after_open.find('}') else {
        return Ok(None);
    };
    let inner = &after_open[..close];

    if inner.is_empty() {
        return Ok(Some((Segment::Line, 1)));
    }
    if !inner.bytes().all(|b| b.is_ascii_digit()) {
        return Ok(None);
    }

    let index = inner
        .parse::<usize>()
        .map_err(|_| TemplateError::IndexTooLarge {
            digits: inner.to_string(),
            position,
        })?;
    Ok(Some((Segment::Token(index), close + 1)))
}

fn lookup(values: &[String], index: usize) -> Result<&str, TemplateError> {
    values
        .get(index)
        .map(String::as_str)
        .ok_or(TemplateError::IndexOutOfRange {
            index,
            available: values.len(),
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|v| v.to_string()).collect()
    }

    fn render(pattern: &str, ctx: &TemplateContext) -> Result<String, TemplateError> {
        CommandTemplate::compile(pattern)?.render(ctx)
    }

    #[test]
    fn test_whole_line_substitution() {
        let ctx = TemplateContext::batch(strings(&["a"]));
        assert_eq!(render("echo {}", &ctx).unwrap(), "echo a");
    }

    #[test]
    fn test_whole_line_is_first_line_of_batch() {
        let ctx = TemplateContext::batch(strings(&["first", "second"]));
        assert_eq!(render("echo {} {}", &ctx).unwrap(), "echo first first");
    }

    #[test]
    fn test_indexed_tokens_in_count_mode_are_lines() {
        let ctx = TemplateContext::batch(strings(&["a", "b", "c"]));
        assert_eq!(render("cat {2} {0} {1}", &ctx).unwrap(), "cat c a b");
    }

    #[test]
    fn test_split_tokens() {
        let ctx = TemplateContext::split("x,y".to_string(), strings(&["x", "y"]));
        assert_eq!(render("echo {0}-{1}", &ctx).unwrap(), "echo x-y");
        assert_eq!(render("echo {}", &ctx).unwrap(), "echo x,y");
    }

    #[test]
    fn test_no_placeholders() {
        let ctx = TemplateContext::batch(strings(&["ignored"]));
        assert_eq!(render("false", &ctx).unwrap(), "false");
    }

    #[test]
    fn test_non_digit_braces_are_verbatim() {
        let ctx = TemplateContext::batch(strings(&["f.txt"]));
        assert_eq!(
            render("awk '{print $1}' {}", &ctx).unwrap(),
            "awk '{print $1}' f.txt"
        );
    }

    #[test]
    fn test_lone_braces_are_verbatim() {
        let ctx = TemplateContext::batch(strings(&["v"]));
        assert_eq!(render("a { b } c", &ctx).unwrap(), "a { b } c");
        assert_eq!(render("open {", &ctx).unwrap(), "open {");
        assert_eq!(render("close }", &ctx).unwrap(), "close }");
    }

    #[test]
    fn test_placeholder_after_literal_brace() {
        let ctx = TemplateContext::batch(strings(&["v"]));
        assert_eq!(render("{x{0}", &ctx).unwrap(), "{xv");
        assert_eq!(render("{{}}", &ctx).unwrap(), "{v}");
    }

    #[test]
    fn test_adjacent_placeholders() {
        let ctx = TemplateContext::batch(strings(&["a", "b"]));
        assert_eq!(render("{0}{1}{}", &ctx).unwrap(), "aba");
    }

    #[test]
    fn test_values_containing_braces_are_not_reexpanded() {
        let ctx = TemplateContext::batch(strings(&["{0}"]));
        assert_eq!(render("echo {}", &ctx).unwrap(), "echo {0}");
    }

    #[test]
    fn test_unicode_pattern_and_values() {
        let ctx = TemplateContext::split("日本,語".to_string(), strings(&["日本", "語"]));
        assert_eq!(render("→ {1}/{0} ←", &ctx).unwrap(), "→ 語/日本 ←");
    }

    #[test]
    fn test_empty_pattern_renders_empty_command() {
        let template = CommandTemplate::compile("").unwrap();
        let ctx = TemplateContext::batch(strings(&["a"]));
        assert_eq!(template.render(&ctx).unwrap(), "");
    }

    #[test]
    fn test_oversized_index_is_rejected_at_compile_time() {
        let err = CommandTemplate::compile("echo {99999999999999999999999}").unwrap_err();
        match err {
            TemplateError::IndexTooLarge { digits, position } => {
                assert_eq!(digits, "99999999999999999999999");
                assert_eq!(position, 5);
            }
            _ => panic!("unexpected error type: {:?}", err),
        }
    }

    #[test]
    fn test_out_of_range_index_compiles_but_fails_to_render() {
        let template = CommandTemplate::compile("echo {3}").unwrap();
        let ctx = TemplateContext::split("a,b".to_string(), strings(&["a", "b"]));
        assert_eq!(
            template.render(&ctx),
            Err(TemplateError::IndexOutOfRange {
                index: 3,
                available: 2
            })
        );
    }

    #[test]
    fn test_render_is_repeatable() {
        let first = CommandTemplate::compile("cp {0} {1}.bak").unwrap();
        let second = CommandTemplate::compile("cp {0} {1}.bak").unwrap();
        let ctx = TemplateContext::batch(strings(&["src", "dst"]));

        assert_eq!(first, second);
        assert_eq!(first.render(&ctx), second.render(&ctx));
        assert_eq!(first.render(&ctx), first.render(&ctx));
    }

    #[test]
    fn test_pattern_is_preserved() {
        let template = CommandTemplate::compile("echo {}").unwrap();
        assert_eq!(template.pattern(), "echo {}");
    }

    #[test]
    fn test_error_display() {
        let err = TemplateError::IndexOutOfRange {
            index: 2,
            available: 1,
        };
        assert_eq!(
            err.to_string(),
            "placeholder {2} is out of range: batch has 1 token(s)"
        );
    }
}
