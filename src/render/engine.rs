//! Substitution of validated field values into a template asset.

use tera::{Context, Tera};

use crate::catalog::TemplateDescriptor;
use crate::collect::FieldValueSet;

use super::docx::pack_docx;
use super::{sanitize_filename, RenderError};

/// The native-format artifact produced by substitution. Immutable once
/// produced; the shared template asset itself is never touched.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedDocument {
    pub template_id: String,
    /// Suggested download filename, `.docx` included.
    pub filename: String,
    pub docx: Vec<u8>,
}

/// Substitute `values` into the descriptor's asset and pack the result as a
/// DOCX artifact.
///
/// The caller is expected to have verified completeness already; it is
/// re-verified here and an incomplete set is refused.
pub fn render(
    descriptor: &TemplateDescriptor,
    values: &FieldValueSet,
) -> Result<RenderedDocument, RenderError> {
    let mut context = Context::new();
    for spec in &descriptor.fields {
        let value = values
            .resolved(spec)
            .ok_or_else(|| RenderError::IncompleteInput(spec.key.clone()))?;
        // Display formatting happens here, per declared type, not at input.
        context.insert(&spec.key, &value.display());
    }

    let mut tera = Tera::default();
    tera.add_raw_template(&descriptor.id, &descriptor.asset)
        .map_err(|e| RenderError::Substitution(e.to_string()))?;
    let rendered = tera
        .render(&descriptor.id, &context)
        .map_err(|e| RenderError::Substitution(e.to_string()))?;

    let name_base = descriptor
        .fields
        .first()
        .and_then(|spec| values.resolved(spec))
        .map(|v| v.display())
        .unwrap_or_default();

    let filename = format!(
        "{}-{}.docx",
        sanitize_filename(&descriptor.id, "document"),
        sanitize_filename(&name_base, "output"),
    );

    let docx = pack_docx(&rendered)?;

    Ok(RenderedDocument {
        template_id: descriptor.id.clone(),
        filename,
        docx,
    })
}
