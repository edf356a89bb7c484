use non_empty_string::NonEmptyString;
use serde::Serialize;

use crate::{
    domain::{Criticality, RequirementId},
    markdown::{
        extract::{self, Extracted, Specification},
        front_matter::{FrontMatter, Value},
    },
};

/// Front-matter key holding the requirement's criticality.
pub const CRITICALITY_KEY: &str = "criticality";

/// Front-matter key holding the requirement's failure mode.
pub const FAILURE_MODE_KEY: &str = "failure_mode";

/// A single requirement document, reduced to the fields that are carried
/// across conversion.
///
/// A document always has a title and at least one of specification text or
/// validation items.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DocumentModel {
    front_matter: FrontMatter,
    title: NonEmptyString,
    criticality: Option<Criticality>,
    failure_mode: Option<String>,
    requirement_id: Option<RequirementId>,
    specification: Option<String>,
    validation: Vec<String>,
    trailing: Option<String>,
}

impl DocumentModel {
    /// Parses a document in either the freeform or the structured dialect.
    ///
    /// Headline fields found in the body (`**Criticality**`,
    /// `**Failure Mode**`) are written into the front matter, replacing any
    /// value already stored there.
    ///
    /// # Errors
    ///
    /// Returns [`ConvertError::MissingTitle`] if there is no `# Title`
    /// heading, and [`ConvertError::EmptyContent`] if neither specification
    /// text nor validation items could be found.
    pub fn parse(text: &str) -> Result<Self, ConvertError> {
        let (mut front_matter, body) = FrontMatter::split(text);

        let Extracted { value: title, rest } = extract::title(body);
        let title = title
            .and_then(|title| NonEmptyString::new(title).ok())
            .ok_or(ConvertError::MissingTitle)?;

        let Extracted {
            value: headline_criticality,
            rest,
        } = extract::criticality(&rest);
        let Extracted {
            value: failure_mode,
            rest,
        } = extract::failure_mode(&rest);
        let Extracted {
            value: mut specification,
            rest,
        } = extract::specification(&rest);
        let Extracted {
            value: mut validation,
            rest,
        } = extract::validation(&rest);

        // Already-structured input carries its content in a requirements list
        let mut marked_critical = false;
        let rest = if specification.is_empty() && validation.is_empty() {
            let Extracted { value: list, rest } = extract::requirements(&rest);
            if let Some(list) = list {
                marked_critical = list.critical;
                specification = list.specification;
                validation = list.validation;
            }
            rest
        } else {
            rest
        };

        let Extracted {
            value: trailing, ..
        } = extract::trailing(&rest);

        let Specification {
            requirement_id,
            text: specification,
        } = specification;

        if specification.is_none() && validation.is_empty() {
            return Err(ConvertError::EmptyContent);
        }

        if let Some(criticality) = headline_criticality {
            front_matter.insert(CRITICALITY_KEY, criticality.as_str());
        }
        if let Some(failure_mode) = &failure_mode {
            front_matter.insert(FAILURE_MODE_KEY, failure_mode.as_str());
        }

        let criticality = headline_criticality
            .or_else(|| marked_critical.then_some(Criticality::Critical))
            .or_else(|| scalar(&front_matter, CRITICALITY_KEY).and_then(|s| s.parse().ok()));
        let failure_mode =
            failure_mode.or_else(|| scalar(&front_matter, FAILURE_MODE_KEY).map(str::to_string));

        Ok(Self {
            front_matter,
            title,
            criticality,
            failure_mode,
            requirement_id,
            specification,
            validation,
            trailing,
        })
    }

    /// The merged front matter.
    #[must_use]
    pub const fn front_matter(&self) -> &FrontMatter {
        &self.front_matter
    }

    /// The document title, without the leading `#`.
    #[must_use]
    pub fn title(&self) -> &str {
        self.title.as_str()
    }

    /// The effective criticality.
    ///
    /// Taken from the `**Criticality**` headline, else from a `[!]` marker on
    /// the requirement, else from the front matter.
    #[must_use]
    pub const fn criticality(&self) -> Option<Criticality> {
        self.criticality
    }

    /// The failure mode, as a single line.
    #[must_use]
    pub fn failure_mode(&self) -> Option<&str> {
        self.failure_mode.as_deref()
    }

    /// The identifier the requirement text started with.
    #[must_use]
    pub const fn requirement_id(&self) -> Option<&RequirementId> {
        self.requirement_id.as_ref()
    }

    /// The requirement text, without its identifier.
    #[must_use]
    pub fn specification(&self) -> Option<&str> {
        self.specification.as_deref()
    }

    /// The validation items, in document order.
    #[must_use]
    pub fn validation(&self) -> &[String] {
        &self.validation
    }

    /// Unrecognised content, kept verbatim.
    #[must_use]
    pub fn trailing(&self) -> Option<&str> {
        self.trailing.as_deref()
    }
}

fn scalar<'a>(front_matter: &'a FrontMatter, key: &str) -> Option<&'a str> {
    front_matter.get(key).and_then(Value::as_scalar)
}

/// Reasons a document cannot be converted.
#[derive(Debug, Clone, Copy, thiserror::Error, PartialEq, Eq)]
pub enum ConvertError {
    /// The document has no `# Title` heading.
    #[error("no '# Title' heading found")]
    MissingTitle,

    /// The document has neither specification text nor validation items.
    #[error("no Specification or Validation found")]
    EmptyContent,
}

#[cfg(test)]
mod tests {
    use super::*;

    const FREEFORM: &str = "# Input Validation

**Criticality**: CRITICAL
**Failure Mode**: System crashes on null input.

## Specification
System must validate all inputs.

## Validation
- Input is checked
- Error raised on failure
";

    #[test]
    fn parses_freeform_document() {
        let document = DocumentModel::parse(FREEFORM).unwrap();

        assert_eq!(document.title(), "Input Validation");
        assert_eq!(document.criticality(), Some(Criticality::Critical));
        assert_eq!(
            document.failure_mode(),
            Some("System crashes on null input.")
        );
        assert_eq!(document.requirement_id(), None);
        assert_eq!(
            document.specification(),
            Some("System must validate all inputs.")
        );
        assert_eq!(
            document.validation(),
            ["Input is checked", "Error raised on failure"]
        );
        assert_eq!(document.trailing(), None);
        assert_eq!(
            document.front_matter().keys().collect::<Vec<_>>(),
            [CRITICALITY_KEY, FAILURE_MODE_KEY]
        );
    }

    #[test]
    fn missing_title() {
        let error = DocumentModel::parse("## Specification\nText\n").unwrap_err();
        assert_eq!(error, ConvertError::MissingTitle);
    }

    #[test]
    fn missing_content() {
        let error = DocumentModel::parse("# Title\n\n## Notes\nJust notes\n").unwrap_err();
        assert_eq!(error, ConvertError::EmptyContent);
    }

    #[test]
    fn identifier_alone_is_not_content() {
        let error = DocumentModel::parse("# Title\n## Specification\nREQ-001:\n").unwrap_err();
        assert_eq!(error, ConvertError::EmptyContent);
    }

    #[test]
    fn validation_alone_is_content() {
        let document = DocumentModel::parse("# Title\n## Validation\n- Check\n").unwrap();
        assert_eq!(document.specification(), None);
        assert_eq!(document.validation(), ["Check"]);
    }

    #[test]
    fn headline_fields_replace_front_matter_in_place() {
        let text = "---
criticality: IMPORTANT
spec: a.md
failure_mode: old
---
# Title
**Criticality**: CRITICAL
**Failure Mode**: new
## Specification
Text
";
        let document = DocumentModel::parse(text).unwrap();
        let front_matter = document.front_matter();

        assert_eq!(
            front_matter.keys().collect::<Vec<_>>(),
            ["criticality", "spec", "failure_mode"]
        );
        assert_eq!(scalar(front_matter, CRITICALITY_KEY), Some("CRITICAL"));
        assert_eq!(scalar(front_matter, FAILURE_MODE_KEY), Some("new"));
    }

    #[test]
    fn criticality_falls_back_to_front_matter() {
        let text = "---\ncriticality: CRITICAL\n---\n# Title\n## Specification\nText\n";
        let document = DocumentModel::parse(text).unwrap();
        assert_eq!(document.criticality(), Some(Criticality::Critical));
    }

    #[test]
    fn unknown_front_matter_criticality_is_ignored() {
        let text = "---\ncriticality: HIGH\n---\n# Title\n## Specification\nText\n";
        let document = DocumentModel::parse(text).unwrap();
        assert_eq!(document.criticality(), None);
        assert_eq!(scalar(document.front_matter(), CRITICALITY_KEY), Some("HIGH"));
    }

    #[test]
    fn unknown_headline_criticality_is_kept_as_trailing() {
        let text = "# Title\n**Criticality**: HIGH\n## Specification\nText\n";
        let document = DocumentModel::parse(text).unwrap();
        assert_eq!(document.criticality(), None);
        assert!(document.front_matter().is_empty());
        assert_eq!(document.trailing(), Some("**Criticality**: HIGH"));
    }

    #[test]
    fn structured_document_is_understood() {
        let text = "---
criticality: CRITICAL
---

# Title

## Requirements
- [!] REQ-003: Text
  - Check
";
        let document = DocumentModel::parse(text).unwrap();

        assert_eq!(document.criticality(), Some(Criticality::Critical));
        assert_eq!(
            document.requirement_id().map(RequirementId::as_str),
            Some("REQ-003")
        );
        assert_eq!(document.specification(), Some("Text"));
        assert_eq!(document.validation(), ["Check"]);
    }

    #[test]
    fn marker_implies_critical() {
        let document =
            DocumentModel::parse("# Title\n## Requirements\n- [!] Text\n").unwrap();
        assert_eq!(document.criticality(), Some(Criticality::Critical));
        assert!(document.front_matter().is_empty());
    }

    #[test]
    fn requirements_list_ignored_when_specification_present() {
        let text = "# Title\n## Specification\nText\n## Requirements\n- Other\n";
        let document = DocumentModel::parse(text).unwrap();
        assert_eq!(document.specification(), Some("Text"));
        assert_eq!(document.trailing(), Some("## Requirements\n- Other"));
    }

    #[test]
    fn trailing_sections_are_kept_in_order() {
        let text = "# Title
## Notes
Note text
## Specification
Text
## Validation
- Check
## References
- Link
";
        let document = DocumentModel::parse(text).unwrap();
        assert_eq!(
            document.trailing(),
            Some("## Notes\nNote text\n## References\n- Link")
        );
    }

    #[test]
    fn serializes_to_json() {
        let document = DocumentModel::parse(FREEFORM).unwrap();
        let json = serde_json::to_value(&document).unwrap();

        assert_eq!(json["title"], "Input Validation");
        assert_eq!(json["criticality"], "CRITICAL");
        assert_eq!(json["front_matter"]["criticality"], "CRITICAL");
        assert_eq!(json["validation"][1], "Error raised on failure");
        assert!(json["requirement_id"].is_null());
    }
}
