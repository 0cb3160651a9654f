//! Instruction template for the assistant.
//!
//! The template carries the role definition, formatting protocol and
//! operating rules, with two slots: the project name and the manifest
//! context. Templates are split into segments once, at construction, so
//! rendering never rescans interpolated content for placeholders.

use std::path::{Path, PathBuf};

/// Placeholder for the project identifier.
pub const PROJECT_PLACEHOLDER: &str = "{project_name}";
/// Placeholder for the (possibly reduced) manifest content.
pub const MANIFEST_PLACEHOLDER: &str = "{manifest}";

/// The built-in instruction template.
pub const BUILTIN_TEMPLATE: &str = r#"### ROLE
You are the "dbt Analytics Architect", a Senior Analytics Engineer and Security Researcher. Your mission is to analyze dbt projects and explain complex SQL logic to business users in a clean, readable interface.

### OPERATIONAL RULES
1. **Language:** Default response language is HEBREW. Use English for technical terms, SQL code, and model names.
2. **Source of Truth:** Always prioritize `compiled_sql` over metadata descriptions. If the SQL logic contradicts the documentation, follow the SQL.
3. **Security First (Critical):**
   - Never use `eval()` or dynamic execution
   - Sanitize all outputs to prevent XSS (CWE-79)
   - Never reveal full server paths in error messages

### FORMATTING PROTOCOL
You MUST format every response using the following Markdown structure:

1. **### שורה תחתונה (Bottom Line)**
   A concise, 2-3 sentence business summary of the answer in Hebrew.

2. **---** (Horizontal Rule)

3. **### ניתוח לוגי (Logic Analysis)**
   - Use **bold** for metrics and table names
   - Use bullet points for business rules extracted from the SQL
   - If comparing columns or models, use a **Markdown Table**

4. **### לוגיקת SQL מקומפלת (Compiled SQL)**
   Provide the relevant snippet of the `compiled_sql` inside:
   ```sql
   [Insert SQL here]
   ```

5. **---** (Horizontal Rule)

6. **### צעדים הבאים (Next Steps)**
   Suggest 2 relevant follow-up questions based on the current context.

### DBT PROJECT CONTEXT
Project: {project_name}

Manifest Content:
{manifest}

IMPORTANT: You can only READ and DISPLAY information. You CANNOT create, write, or save any files. Only provide analysis and display output.

Please answer questions about the dbt models, their dependencies, columns, SQL logic, and relationships based on this manifest data."#;

/// Errors from loading a custom template.
#[derive(Debug, thiserror::Error)]
pub enum TemplateError {
    #[error("Failed to read prompt template at {path}: {reason}")]
    Read { path: PathBuf, reason: String },

    #[error("Prompt template is missing the {0} placeholder")]
    MissingPlaceholder(&'static str),
}

#[derive(Debug, Clone, PartialEq)]
enum Segment {
    Literal(String),
    ProjectName,
    Manifest,
}

/// A parsed instruction template.
#[derive(Debug, Clone)]
pub struct PromptTemplate {
    segments: Vec<Segment>,
}

impl PromptTemplate {
    /// Parse template text. Both placeholders must appear at least once.
    pub fn parse(text: &str) -> Result<Self, TemplateError> {
        if !text.contains(PROJECT_PLACEHOLDER) {
            return Err(TemplateError::MissingPlaceholder(PROJECT_PLACEHOLDER));
        }
        if !text.contains(MANIFEST_PLACEHOLDER) {
            return Err(TemplateError::MissingPlaceholder(MANIFEST_PLACEHOLDER));
        }

        let mut segments = Vec::new();
        let mut rest = text;
        loop {
            let next = [
                (rest.find(PROJECT_PLACEHOLDER), PROJECT_PLACEHOLDER, Segment::ProjectName),
                (rest.find(MANIFEST_PLACEHOLDER), MANIFEST_PLACEHOLDER, Segment::Manifest),
            ]
            .into_iter()
            .filter_map(|(pos, token, seg)| pos.map(|p| (p, token, seg)))
            .min_by_key(|(pos, _, _)| *pos);

            match next {
                Some((pos, token, seg)) => {
                    if pos > 0 {
                        segments.push(Segment::Literal(rest[..pos].to_string()));
                    }
                    segments.push(seg);
                    rest = &rest[pos + token.len()..];
                }
                None => {
                    if !rest.is_empty() {
                        segments.push(Segment::Literal(rest.to_string()));
                    }
                    break;
                }
            }
        }

        Ok(Self { segments })
    }

    /// The built-in template.
    pub fn builtin() -> Self {
        match Self::parse(BUILTIN_TEMPLATE) {
            Ok(template) => template,
            Err(e) => unreachable!("built-in template is valid: {e}"),
        }
    }

    /// Load a custom template from disk.
    pub fn from_file(path: &Path) -> Result<Self, TemplateError> {
        let text = std::fs::read_to_string(path).map_err(|e| TemplateError::Read {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })?;
        Self::parse(&text)
    }

    /// Interpolate the project name and manifest context.
    pub fn render(&self, project_name: &str, manifest: &str) -> String {
        let mut out = String::with_capacity(BUILTIN_TEMPLATE.len() + manifest.len());
        for segment in &self.segments {
            match segment {
                Segment::Literal(text) => out.push_str(text),
                Segment::ProjectName => out.push_str(project_name),
                Segment::Manifest => out.push_str(manifest),
            }
        }
        out
    }
}

impl Default for PromptTemplate {
    fn default() -> Self {
        Self::builtin()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builtin_renders_slots() {
        let text = PromptTemplate::builtin().render("sales_mart", "{\"nodes\":{}}");
        assert!(text.starts_with("### ROLE"));
        assert!(text.contains("Project: sales_mart\n"));
        assert!(text.contains("Manifest Content:\n{\"nodes\":{}}\n"));
        assert!(!text.contains(PROJECT_PLACEHOLDER));
    }

    #[test]
    fn interpolated_content_is_not_rescanned() {
        let template = PromptTemplate::parse("[{project_name}] {manifest}").unwrap();
        let text = template.render("p", "literal {project_name} in manifest");
        assert_eq!(text, "[p] literal {project_name} in manifest");
    }

    #[test]
    fn repeated_placeholders() {
        let template = PromptTemplate::parse("{project_name}/{manifest}/{project_name}").unwrap();
        assert_eq!(template.render("a", "b"), "a/b/a");
    }

    #[test]
    fn missing_placeholder_rejected() {
        match PromptTemplate::parse("Project {project_name} only") {
            Err(TemplateError::MissingPlaceholder(p)) => assert_eq!(p, MANIFEST_PLACEHOLDER),
            other => panic!("Expected MissingPlaceholder, got: {other:?}"),
        }
    }

    #[test]
    fn custom_template_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prompt.md");
        std::fs::write(&path, "Answer about {project_name}:\n{manifest}").unwrap();

        let template = PromptTemplate::from_file(&path).unwrap();
        assert_eq!(template.render("ops", "{}"), "Answer about ops:\n{}");
    }

    #[test]
    fn missing_file_reports_path() {
        let err = PromptTemplate::from_file(Path::new("/nonexistent/prompt.md")).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/prompt.md"));
    }
}
