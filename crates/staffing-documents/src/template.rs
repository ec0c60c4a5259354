//! Contract templates
//!
//! Templates are HTML with `{{token}}` placeholders. Caller-supplied text is
//! HTML-escaped on substitution and rejected when it carries control
//! characters; only markup built by the renderer itself is inserted verbatim.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::debug;

pub const ENGLISH_TEMPLATE: &str = "contract_en.html";
pub const KHMER_TEMPLATE: &str = "contract_km.html";

#[derive(Debug, Error)]
pub enum TemplateError {
    #[error("template file {path} could not be read: {source}")]
    MissingFile {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("unclosed token in {template} at byte {offset}")]
    UnclosedToken { template: String, offset: usize },
    #[error("empty token in {template} at byte {offset}")]
    EmptyToken { template: String, offset: usize },
    #[error("no value for token '{token}' in {template}")]
    MissingValue { template: String, token: String },
    #[error("value for '{token}' contains control character U+{code:04X}")]
    ControlCharacter { token: String, code: u32 },
}

/// A value substituted into a template
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TemplateValue {
    /// Plain text, escaped on output
    Text(String),
    /// Markup generated by the renderer, inserted as-is
    Markup(String),
}

impl TemplateValue {
    pub fn text(value: impl Into<String>) -> Self {
        TemplateValue::Text(value.into())
    }

    pub fn markup(value: impl Into<String>) -> Self {
        TemplateValue::Markup(value.into())
    }
}

/// Token values for one template
#[derive(Debug, Clone, Default)]
pub struct TemplateValues {
    values: HashMap<String, TemplateValue>,
}

impl TemplateValues {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn text(&mut self, token: &str, value: impl Into<String>) -> &mut Self {
        self.values.insert(token.to_string(), TemplateValue::text(value));
        self
    }

    pub fn markup(&mut self, token: &str, value: impl Into<String>) -> &mut Self {
        self.values.insert(token.to_string(), TemplateValue::markup(value));
        self
    }

    pub fn get(&self, token: &str) -> Option<&TemplateValue> {
        self.values.get(token)
    }

    /// Apply `f` to every text value; markup is left alone
    pub fn map_text(&self, f: impl Fn(&str) -> String) -> Self {
        let values = self
            .values
            .iter()
            .map(|(token, value)| {
                let value = match value {
                    TemplateValue::Text(text) => TemplateValue::Text(f(text)),
                    TemplateValue::Markup(markup) => TemplateValue::Markup(markup.clone()),
                };
                (token.clone(), value)
            })
            .collect();
        Self { values }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Segment {
    Literal(String),
    Token(String),
}

/// A parsed template
#[derive(Debug, Clone)]
pub struct Template {
    name: String,
    segments: Vec<Segment>,
}

impl Template {
    pub fn parse(name: impl Into<String>, source: &str) -> Result<Self, TemplateError> {
        let name = name.into();
        let mut segments = Vec::new();
        let mut rest = source;
        let mut offset = 0;

        while let Some(open) = rest.find("{{") {
            if open > 0 {
                segments.push(Segment::Literal(rest[..open].to_string()));
            }
            let after_open = &rest[open + 2..];
            let close = after_open.find("}}").ok_or_else(|| TemplateError::UnclosedToken {
                template: name.clone(),
                offset: offset + open,
            })?;
            let token = after_open[..close].trim();
            if token.is_empty() {
                return Err(TemplateError::EmptyToken {
                    template: name,
                    offset: offset + open,
                });
            }
            segments.push(Segment::Token(token.to_string()));

            let consumed = open + 2 + close + 2;
            offset += consumed;
            rest = &rest[consumed..];
        }
        if !rest.is_empty() {
            segments.push(Segment::Literal(rest.to_string()));
        }

        Ok(Self { name, segments })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Token names in order of appearance
    pub fn tokens(&self) -> impl Iterator<Item = &str> {
        self.segments.iter().filter_map(|segment| match segment {
            Segment::Token(token) => Some(token.as_str()),
            Segment::Literal(_) => None,
        })
    }

    pub fn render(&self, values: &TemplateValues) -> Result<String, TemplateError> {
        let mut out = String::new();
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => out.push_str(text),
                Segment::Token(token) => match values.get(token) {
                    Some(TemplateValue::Text(text)) => out.push_str(&escape_html(token, text)?),
                    Some(TemplateValue::Markup(markup)) => out.push_str(markup),
                    None => {
                        return Err(TemplateError::MissingValue {
                            template: self.name.clone(),
                            token: token.clone(),
                        })
                    }
                },
            }
        }
        Ok(out)
    }
}

/// Escape text for HTML, rejecting control characters other than newline and tab
pub fn escape_html(token: &str, text: &str) -> Result<String, TemplateError> {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            '\n' | '\t' => out.push(c),
            c if c.is_control() => {
                return Err(TemplateError::ControlCharacter {
                    token: token.to_string(),
                    code: c as u32,
                })
            }
            c => out.push(c),
        }
    }
    Ok(out)
}

/// The English and Khmer contract pages
#[derive(Debug, Clone)]
pub struct TemplateSet {
    pub english: Template,
    pub khmer: Template,
}

impl TemplateSet {
    /// Read both page templates from `dir`
    pub async fn load(dir: impl AsRef<Path>) -> Result<Self, TemplateError> {
        let dir = dir.as_ref();
        let english = read_template(dir, ENGLISH_TEMPLATE).await?;
        let khmer = read_template(dir, KHMER_TEMPLATE).await?;
        debug!(dir = ?dir, "Contract templates loaded");
        Ok(Self { english, khmer })
    }

    pub fn from_sources(english: &str, khmer: &str) -> Result<Self, TemplateError> {
        Ok(Self {
            english: Template::parse(ENGLISH_TEMPLATE, english)?,
            khmer: Template::parse(KHMER_TEMPLATE, khmer)?,
        })
    }
}

async fn read_template(dir: &Path, file: &str) -> Result<Template, TemplateError> {
    let path = dir.join(file);
    let source = tokio::fs::read_to_string(&path)
        .await
        .map_err(|source| TemplateError::MissingFile {
            path: path.clone(),
            source,
        })?;
    Template::parse(file, &source)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_substitutes_tokens() {
        let template = Template::parse("t", "<p>{{ name }} teaches {{subject}}</p>").unwrap();
        let mut values = TemplateValues::new();
        values.text("name", "Sok Dara").text("subject", "Databases");

        assert_eq!(
            template.render(&values).unwrap(),
            "<p>Sok Dara teaches Databases</p>"
        );
        assert_eq!(template.tokens().collect::<Vec<_>>(), vec!["name", "subject"]);
    }

    #[test]
    fn test_text_is_escaped() {
        let template = Template::parse("t", "<td>{{name}}</td>").unwrap();
        let mut values = TemplateValues::new();
        values.text("name", "<script>alert('x')</script> & co");

        assert_eq!(
            template.render(&values).unwrap(),
            "<td>&lt;script&gt;alert(&#39;x&#39;)&lt;/script&gt; &amp; co</td>"
        );
    }

    #[test]
    fn test_markup_is_verbatim() {
        let template = Template::parse("t", "<div>{{sig}}</div>").unwrap();
        let mut values = TemplateValues::new();
        values.markup("sig", "<img src=\"data:image/png;base64,AAAA\">");

        assert_eq!(
            template.render(&values).unwrap(),
            "<div><img src=\"data:image/png;base64,AAAA\"></div>"
        );
    }

    #[test]
    fn test_control_characters_rejected() {
        let template = Template::parse("t", "{{name}}").unwrap();
        let mut values = TemplateValues::new();
        values.text("name", "Dara\u{0}Sok");

        let err = template.render(&values).unwrap_err();
        assert!(matches!(err, TemplateError::ControlCharacter { code: 0, .. }));

        values.text("name", "line one\nline two\tend");
        assert!(template.render(&values).is_ok());
    }

    #[test]
    fn test_missing_value_is_an_error() {
        let template = Template::parse("t", "{{name}}").unwrap();
        let err = template.render(&TemplateValues::new()).unwrap_err();
        assert!(matches!(err, TemplateError::MissingValue { ref token, .. } if token == "name"));
    }

    #[test]
    fn test_malformed_templates() {
        assert!(matches!(
            Template::parse("t", "<p>{{name</p>"),
            Err(TemplateError::UnclosedToken { offset: 3, .. })
        ));
        assert!(matches!(
            Template::parse("t", "<p>{{  }}</p>"),
            Err(TemplateError::EmptyToken { .. })
        ));
    }

    #[test]
    fn test_substituted_braces_are_not_reexpanded() {
        let template = Template::parse("t", "{{a}}").unwrap();
        let mut values = TemplateValues::new();
        values.text("a", "{{b}}");
        assert_eq!(template.render(&values).unwrap(), "{{b}}");
    }

    #[test]
    fn test_map_text_skips_markup() {
        let mut values = TemplateValues::new();
        values.text("hours", "40").markup("img", "<img alt=\"1\">");
        let mapped = values.map_text(|s| s.replace('4', "four"));

        assert_eq!(mapped.get("hours"), Some(&TemplateValue::text("four0")));
        assert_eq!(mapped.get("img"), Some(&TemplateValue::markup("<img alt=\"1\">")));
    }

    #[tokio::test]
    async fn test_missing_template_file() {
        let dir = std::env::temp_dir().join(format!("staffing-templates-{}", uuid::Uuid::new_v4()));
        let err = TemplateSet::load(&dir).await.unwrap_err();
        assert!(matches!(err, TemplateError::MissingFile { .. }));
    }

    #[tokio::test]
    async fn test_bundled_templates_load() {
        let dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("templates");
        let set = TemplateSet::load(&dir).await.unwrap();
        assert!(set.english.tokens().any(|t| t == "lecturer_name"));
        assert!(set.khmer.tokens().any(|t| t == "total_khr"));
    }
}
