//! Rendering of a [`DocumentModel`] as a structured requirement list.

use std::{fmt, io};

use crate::{
    DocumentModel,
    markdown::extract::{CRITICAL_MARKER, REQUIREMENTS_HEADING},
};

impl DocumentModel {
    /// Renders the document in the structured requirement list dialect.
    #[must_use]
    pub fn to_msl(&self) -> String {
        self.to_string()
    }

    /// Writes the rendered document to `writer`.
    ///
    /// # Errors
    ///
    /// Returns an error if writing fails.
    pub fn write<W: io::Write>(&self, writer: &mut W) -> io::Result<()> {
        writer.write_all(self.to_msl().as_bytes())
    }

    /// The text of the primary bullet, without the leading `- `.
    fn primary_bullet(&self) -> Option<String> {
        let marker = match self.criticality() {
            Some(criticality) if criticality.is_critical() => format!("{CRITICAL_MARKER} "),
            _ => String::new(),
        };
        let text = match (self.requirement_id(), self.specification()) {
            (Some(id), Some(text)) => format!("{id}: {text}"),
            (Some(id), None) => format!("{id}:"),
            (None, Some(text)) => text.to_string(),
            (None, None) => return None,
        };
        Some(format!("{marker}{text}"))
    }
}

impl fmt::Display for DocumentModel {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if !self.front_matter().is_empty() {
            writeln!(f, "{}", self.front_matter())?;
        }

        writeln!(f, "# {}", self.title())?;
        writeln!(f)?;
        writeln!(f, "## {REQUIREMENTS_HEADING}")?;

        if let Some(primary) = self.primary_bullet() {
            write_bullet(f, &primary, "- ", "  ")?;
        }
        for item in self.validation() {
            write_bullet(f, item, "  - ", ITEM_INDENT)?;
        }

        if let Some(trailing) = self.trailing() {
            writeln!(f)?;
            writeln!(f, "{trailing}")?;
        }
        Ok(())
    }
}

/// Indentation of validation item continuation lines.
const ITEM_INDENT: &str = "    ";

/// Writes a possibly multi-line bullet. Continuation lines are indented so
/// they stay part of the bullet; blank lines stay blank.
///
/// A continuation line that is itself a bullet is always indented past the
/// validation items, so it never reads as one.
fn write_bullet(f: &mut fmt::Formatter, text: &str, prefix: &str, indent: &str) -> fmt::Result {
    let mut lines = text.lines();
    writeln!(f, "{prefix}{}", lines.next().unwrap_or_default())?;
    for line in lines {
        if line.is_empty() {
            writeln!(f)?;
        } else if is_bullet(line) {
            writeln!(f, "{ITEM_INDENT}{line}")?;
        } else {
            writeln!(f, "{indent}{line}")?;
        }
    }
    Ok(())
}

fn is_bullet(line: &str) -> bool {
    line.strip_prefix('-')
        .is_some_and(|rest| rest.is_empty() || rest.starts_with(char::is_whitespace))
}

#[cfg(test)]
mod tests {
    use test_case::test_case;

    use super::*;

    fn convert(text: &str) -> String {
        DocumentModel::parse(text).unwrap().to_msl()
    }

    #[test]
    fn renders_freeform_example() {
        let input = "# Input Validation

**Criticality**: CRITICAL
**Failure Mode**: System crashes on null input.

## Specification
System must validate all inputs.

## Validation
- Input is checked
- Error raised on failure
";
        let expected = "---
criticality: CRITICAL
failure_mode: System crashes on null input.
---

# Input Validation

## Requirements
- [!] System must validate all inputs.
  - Input is checked
  - Error raised on failure
";
        assert_eq!(convert(input), expected);
    }

    #[test_case("CRITICAL", "- [!] Text"; "critical is marked")]
    #[test_case("IMPORTANT", "- Text"; "important is not marked")]
    fn criticality_marker(token: &str, bullet: &str) {
        let output = convert(&format!(
            "# T\n**Criticality**: {token}\n## Specification\nText\n"
        ));
        assert!(output.lines().any(|line| line == bullet), "{output}");
    }

    #[test]
    fn no_criticality_no_marker_no_front_matter() {
        let output = convert("# T\n## Specification\nText\n");
        assert_eq!(output, "# T\n\n## Requirements\n- Text\n");
    }

    #[test]
    fn requirement_id_is_not_duplicated() {
        let output = convert(
            "# T\n**Criticality**: CRITICAL\n## Specification\nREQ-042: Do the thing\n",
        );
        assert!(output.contains("\n- [!] REQ-042: Do the thing\n"));
        assert_eq!(output.matches("REQ-042").count(), 1);
    }

    #[test]
    fn validation_only_has_no_primary_bullet() {
        let output = convert("# T\n## Validation\n- One\n- [x] Two\n");
        assert_eq!(output, "# T\n\n## Requirements\n  - One\n  - [x] Two\n");
    }

    #[test]
    fn marked_items_are_not_rewrapped() {
        let output = convert("# T\n## Specification\nS\n## Validation\n- [x] Done\n- [ ] Todo\n");
        assert!(output.contains("\n  - [x] Done\n  - [ ] Todo\n"));
    }

    #[test]
    fn multi_line_text_is_indented() {
        let output = convert(
            "# T\n## Specification\nFirst line\nsecond line\n\nNew paragraph\n## Validation\n- Check\n  more\n",
        );
        assert_eq!(
            output,
            "# T\n\n## Requirements\n- First line\n  second line\n\n  New paragraph\n  - Check\n    more\n"
        );
    }

    #[test]
    fn lists_inside_the_specification_stay_in_it() {
        let output = convert(
            "# T\n## Specification\nThe system must:\n- log errors\n- retry\n## Validation\n- Check\n",
        );
        assert_eq!(
            output,
            "# T\n\n## Requirements\n- The system must:\n    - log errors\n    - retry\n  - Check\n"
        );

        let document = DocumentModel::parse(&output).unwrap();
        assert_eq!(
            document.specification(),
            Some("The system must:\n- log errors\n- retry")
        );
        assert_eq!(document.validation(), ["Check"]);
    }

    #[test]
    fn trailing_sections_follow_a_blank_line() {
        let output = convert("# T\n## Specification\nS\n\n## Notes\n\nKeep   me\n");
        assert_eq!(
            output,
            "# T\n\n## Requirements\n- S\n\n## Notes\n\nKeep   me\n"
        );
    }

    #[test]
    fn front_matter_keys_keep_their_order() {
        let output = convert(
            "---\nspec: a.md\ntags:\n  - x\ngenerated: 2025-01-01\n---\n# T\n**Failure Mode**: Boom\n## Specification\nS\n",
        );
        assert!(output.starts_with(
            "---\nspec: a.md\ntags:\n  - x\ngenerated: 2025-01-01\nfailure_mode: Boom\n---\n\n# T\n"
        ));
    }

    #[test]
    fn write_matches_display() {
        let document = DocumentModel::parse("# T\n## Specification\nS\n").unwrap();
        let mut bytes = Vec::new();
        document.write(&mut bytes).unwrap();
        assert_eq!(String::from_utf8(bytes).unwrap(), document.to_string());
    }

    #[test_case("# T\n**Criticality**: CRITICAL\n**Failure Mode**: Boom\n## Specification\nREQ-001: S\n## Validation\n- [x] A\n- B\n## Notes\nN\n"; "full document")]
    #[test_case("# T\n## Validation\n- A\n  more\n"; "validation only")]
    #[test_case("# T\n## Specification\nOne\n\nTwo\n"; "paragraphs")]
    #[test_case("# T\n**Criticality**: HIGH\n## Specification\nS\n"; "unknown criticality")]
    #[test_case("---\nx: [1, 2]\nlist:\n  - a\n---\n# T\n## Specification\nS\n"; "front matter")]
    #[test_case("# T\n- stray note\n## Specification\nS\n"; "stray bullet")]
    #[test_case("# T\n- stray note\n## Validation\n- A\n"; "stray bullet after items")]
    #[test_case("# T\n## Specification\nMust:\n- a\n  - b\n## Validation\n- C\n"; "list in specification")]
    fn converting_twice_changes_nothing(input: &str) {
        let once = convert(input);
        let twice = convert(&once);
        assert_eq!(once, twice);
        assert!(!twice.contains("[!] [!]"));
    }
}
