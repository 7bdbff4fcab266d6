//! XML template renderer
//!
//! Templates carry literal `{{ NAME }}` tokens inside text nodes. The
//! renderer streams the template through quick-xml, rewriting each text
//! node: scalar bindings match their token case-insensitively, `ID`
//! matches only its exact spelling, and column-set bindings expand into
//! one replacement per sub-key (exact case). Unmatched tokens pass
//! through untouched, which makes re-rendering an already-substituted
//! document byte-stable. `Null` values render as empty strings.

use crate::domain::{Bindings, FieldValue, PartId, PartXmlError, Result};
use quick_xml::events::{BytesText, Event};
use quick_xml::{Reader, Writer};
use std::fs;
use std::path::{Path, PathBuf};

/// Renders one template for many parts
///
/// The template is re-parsed per call; the output directory is created
/// on first use and creation is idempotent.
pub struct TemplateRenderer {
    template_path: PathBuf,
    output_dir: PathBuf,
}

impl TemplateRenderer {
    pub fn new(template_path: impl Into<PathBuf>, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            template_path: template_path.into(),
            output_dir: output_dir.into(),
        }
    }

    /// Output path for a part: `<outputDir>/<partId>_<templateBasename>`
    pub fn output_path(&self, part: &PartId) -> PathBuf {
        let basename = self
            .template_path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        self.output_dir.join(format!("{}_{}", part.as_str(), basename))
    }

    /// Renders the template with `bindings` and writes the document
    ///
    /// # Errors
    ///
    /// Returns a `Render` error if the template cannot be read or parsed
    /// or the output cannot be written; such failures abort this part
    /// only, never the batch.
    pub fn render(&self, part: &PartId, bindings: &Bindings) -> Result<PathBuf> {
        let template = fs::read_to_string(&self.template_path).map_err(|e| {
            PartXmlError::Render(format!(
                "Failed to read template {}: {e}",
                self.template_path.display()
            ))
        })?;

        let document = render_document(&template, bindings)?;

        fs::create_dir_all(&self.output_dir).map_err(|e| {
            PartXmlError::Render(format!(
                "Failed to create output directory {}: {e}",
                self.output_dir.display()
            ))
        })?;

        let output_path = self.output_path(part);
        fs::write(&output_path, document).map_err(|e| {
            PartXmlError::Render(format!(
                "Failed to write {}: {e}",
                output_path.display()
            ))
        })?;

        tracing::debug!(part = %part, path = %output_path.display(), "Wrote document");
        Ok(output_path)
    }
}

/// Substitutes bindings into every text node of an XML document
pub fn render_document(template: &str, bindings: &Bindings) -> Result<String> {
    let mut reader = Reader::from_str(template);
    let mut writer = Writer::new(Vec::new());

    loop {
        match reader.read_event() {
            Ok(Event::Eof) => break,
            Ok(Event::Text(t)) => {
                let text = t
                    .unescape()
                    .map_err(|e| PartXmlError::Render(format!("Invalid template text: {e}")))?;
                let replaced = substitute_tokens(&text, bindings);
                writer
                    .write_event(Event::Text(BytesText::new(&replaced)))
                    .map_err(render_write_err)?;
            }
            Ok(event) => writer.write_event(event).map_err(render_write_err)?,
            Err(e) => {
                return Err(PartXmlError::Render(format!(
                    "Template parse error at position {}: {e}",
                    reader.buffer_position()
                )))
            }
        }
    }

    String::from_utf8(writer.into_inner())
        .map_err(|e| PartXmlError::Render(format!("Rendered document is not UTF-8: {e}")))
}

fn render_write_err<E: std::fmt::Display>(e: E) -> PartXmlError {
    PartXmlError::Render(format!("Failed to serialize document: {e}"))
}

/// Replaces every `{{ NAME }}` token in `text` that matches a binding
///
/// Matching policy: `ID` only in its exact spelling; other scalar
/// bindings case-insensitively; sub-keys of column-set bindings in exact
/// case. Tokens with no matching binding are left in place.
pub fn substitute_tokens(text: &str, bindings: &Bindings) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;

    while let Some(start) = rest.find("{{") {
        let after_open = &rest[start + 2..];
        let Some(close) = after_open.find("}}") else {
            break;
        };
        let token_name = after_open[..close].trim();

        match lookup_token(token_name, bindings) {
            Some(value) => {
                out.push_str(&rest[..start]);
                out.push_str(&value);
                rest = &rest[start + 2 + close + 2..];
            }
            None => {
                // Emit only the opener and rescan just past it, so a
                // stray literal `{{` cannot swallow the next token.
                out.push_str(&rest[..start + 2]);
                rest = &rest[start + 2..];
            }
        }
    }

    out.push_str(rest);
    out
}

/// Finds the binding value for one token name, if any
fn lookup_token(token: &str, bindings: &Bindings) -> Option<String> {
    for (name, value) in bindings {
        match value {
            FieldValue::Columns(columns) => {
                // Sub-keys match their own token, exact case
                if let Some((_, v)) = columns.iter().find(|(col, _)| col == token) {
                    return Some(v.clone().unwrap_or_default());
                }
            }
            scalar => {
                let matched = if name == "ID" {
                    token == "ID"
                } else {
                    name.eq_ignore_ascii_case(token)
                };
                if matched {
                    return Some(scalar.as_text().unwrap_or_default().to_string());
                }
            }
        }
    }
    None
}
