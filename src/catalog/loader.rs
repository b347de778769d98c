//! Startup loading of the template directory.
//!
//! Each template is a `<id>.json` schema next to a `<id>.tpl` text asset.
//! Loading fails fast on the first template whose schema and asset disagree,
//! so the server never accepts requests against a catalog it cannot trust.

use std::collections::{BTreeSet, HashMap};
use std::fs;
use std::path::Path;

use lazy_static::lazy_static;
use regex::Regex;

use super::model::{TemplateDescriptor, TemplateSchema};
use super::CatalogError;
use crate::collect::validate_raw;

lazy_static! {
    static ref PLACEHOLDER_RE: Regex =
        Regex::new(r"\{\{\s*([A-Za-z_][A-Za-z0-9_]*)\s*\}\}").unwrap();
}

/// Immutable set of templates available to the server.
#[derive(Debug)]
pub struct TemplateCatalog {
    templates: HashMap<String, TemplateDescriptor>,
    /// Ids in deterministic (sorted) order for listing and prompts.
    order: Vec<String>,
}

impl TemplateCatalog {
    /// Scan `dir` and load every `*.json` schema with its `*.tpl` asset.
    pub fn load(dir: &Path) -> Result<Self, CatalogError> {
        let mut templates = HashMap::new();
        let mut order = Vec::new();

        let entries = fs::read_dir(dir).map_err(CatalogError::DirIo)?;
        let mut schema_paths: Vec<_> = entries
            .filter_map(|e| e.ok())
            .map(|e| e.path())
            .filter(|p| p.extension().map(|e| e == "json").unwrap_or(false))
            .collect();
        schema_paths.sort();

        for schema_path in schema_paths {
            let id = schema_path
                .file_stem()
                .and_then(|s| s.to_str())
                .unwrap_or_default()
                .to_string();

            let descriptor = load_template(&id, &schema_path)?;
            order.push(id.clone());
            templates.insert(id, descriptor);
        }

        log::info!(
            "Loaded {} template(s) from {}: [{}]",
            templates.len(),
            dir.display(),
            order.join(", ")
        );

        Ok(Self { templates, order })
    }

    /// All templates in deterministic order.
    pub fn list(&self) -> Vec<&TemplateDescriptor> {
        self.order
            .iter()
            .filter_map(|id| self.templates.get(id))
            .collect()
    }

    pub fn get(&self, id: &str) -> Result<&TemplateDescriptor, CatalogError> {
        self.templates
            .get(id)
            .ok_or_else(|| CatalogError::NotFound(id.to_string()))
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }
}

fn load_template(id: &str, schema_path: &Path) -> Result<TemplateDescriptor, CatalogError> {
    let raw_schema =
        fs::read_to_string(schema_path).map_err(|e| CatalogError::load(id, e.to_string()))?;
    let schema: TemplateSchema = serde_json::from_str(&raw_schema)
        .map_err(|e| CatalogError::load(id, format!("invalid schema: {e}")))?;

    let asset_path = schema_path.with_extension("tpl");
    let asset = fs::read_to_string(&asset_path).map_err(|_| {
        CatalogError::load(id, format!("missing asset '{}'", asset_path.display()))
    })?;

    // Pure substitution only: control blocks would make the placeholder
    // bijection check meaningless.
    if asset.contains("{%") {
        return Err(CatalogError::load(
            id,
            "asset contains control blocks; only {{ key }} placeholders are allowed",
        ));
    }

    let mut declared = BTreeSet::new();
    for spec in &schema.fields {
        if !declared.insert(spec.key.clone()) {
            return Err(CatalogError::load(
                id,
                format!("duplicate field key '{}'", spec.key),
            ));
        }
        if let Some(default) = &spec.default {
            // A blank default is only meaningful for text fields; anything
            // else must survive its own field's validation.
            if !default.is_empty() || !matches!(spec.field_type, super::FieldType::Text { .. }) {
                validate_raw(spec, default).map_err(|e| {
                    CatalogError::load(id, format!("default for '{}' is invalid: {}", spec.key, e))
                })?;
            }
        }
        if let super::FieldType::Text {
            pattern: Some(pattern),
        } = &spec.field_type
        {
            Regex::new(pattern).map_err(|_| {
                CatalogError::load(id, format!("invalid pattern for '{}'", spec.key))
            })?;
        }
    }

    let placeholders: BTreeSet<String> = PLACEHOLDER_RE
        .captures_iter(&asset)
        .map(|c| c[1].to_string())
        .collect();

    // The asset's substitution points and the declared specs must be in
    // exact bijection: no orphan placeholders, no unused specs.
    for orphan in placeholders.difference(&declared) {
        return Err(CatalogError::load(
            id,
            format!("asset placeholder '{{{{ {orphan} }}}}' has no field spec"),
        ));
    }
    for unused in declared.difference(&placeholders) {
        return Err(CatalogError::load(
            id,
            format!("field '{unused}' never appears in the asset"),
        ));
    }

    Ok(TemplateDescriptor {
        id: id.to_string(),
        name: schema.name,
        fields: schema.fields,
        asset,
    })
}
