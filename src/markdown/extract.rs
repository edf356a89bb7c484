//! Extraction of individual fields from a document body.
//!
//! Every extractor takes the body, finds its field, and hands back the field
//! together with the body that remains once the field's source text has been
//! cut out. They are meant to be chained in this order:
//!
//! 1. [`title`]
//! 2. [`criticality`]
//! 3. [`failure_mode`]
//! 4. [`specification`]
//! 5. [`validation`]
//! 6. [`requirements`]
//! 7. [`trailing`]
//!
//! Later extractors only ever see what earlier ones left behind, so
//! [`trailing`] never recaptures a section that was already consumed.

use std::{ops::Range, sync::LazyLock};

use regex::Regex;

use crate::domain::{Criticality, RequirementId};

static TITLE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^#[ \t]+(.*\S)[ \t\r]*$").expect("valid regex"));

static CRITICALITY: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?m)^\*\*Criticality\*\*:[ \t]*(CRITICAL|IMPORTANT)[ \t\r]*$")
        .expect("valid regex")
});

static FAILURE_MODE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?m)^\*\*Failure Mode\*\*:[ \t]*").expect("valid regex"));

static REQUIREMENT_ID: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^(REQ-[0-9]+):\s*").expect("valid regex"));

/// Heading of the prose section holding the requirement text.
pub const SPECIFICATION_HEADING: &str = "Specification";

/// Heading of the section listing acceptance checks.
pub const VALIDATION_HEADING: &str = "Validation";

/// Heading of the normalized requirements list.
pub const REQUIREMENTS_HEADING: &str = "Requirements";

/// The marker placed in front of a critical requirement.
pub const CRITICAL_MARKER: &str = "[!]";

/// A field pulled out of a document body, and the body that remains.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Extracted<T> {
    /// The extracted field.
    pub value: T,
    /// The body with the field's source text removed.
    pub rest: String,
}

impl<T> Extracted<T> {
    const fn new(value: T, rest: String) -> Self {
        Self { value, rest }
    }
}

impl<T: Default> Extracted<T> {
    fn absent(body: &str) -> Self {
        Self::new(T::default(), body.to_string())
    }
}

/// The text of a requirement, with its identifier split off.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Specification {
    /// The `REQ-<digits>` token the text started with, if any.
    pub requirement_id: Option<RequirementId>,
    /// The requirement text, trimmed. `None` if nothing is left.
    pub text: Option<String>,
}

impl Specification {
    fn parse(text: &str) -> Self {
        let text = text.trim();
        if let Some(captures) = REQUIREMENT_ID.captures(text) {
            if let Ok(requirement_id) = captures[1].parse::<RequirementId>() {
                let rest = text[captures[0].len()..].trim();
                return Self {
                    requirement_id: Some(requirement_id),
                    text: non_empty(rest),
                };
            }
        }
        Self {
            requirement_id: None,
            text: non_empty(text),
        }
    }

    /// Whether neither an identifier nor any text was found.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.requirement_id.is_none() && self.text.is_none()
    }
}

/// A `## Requirements` list holding a single requirement.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RequirementsList {
    /// Whether the primary bullet carried the `[!]` marker.
    pub critical: bool,
    /// The primary bullet.
    pub specification: Specification,
    /// The nested bullets.
    pub validation: Vec<String>,
}

/// Extracts the first `# Title` heading.
///
/// The body is left-trimmed first.
#[must_use]
pub fn title(body: &str) -> Extracted<Option<String>> {
    let body = body.trim_start();
    let Some(captures) = TITLE.captures(body) else {
        return Extracted::absent(body);
    };
    let title = captures[1].trim().to_string();
    let Some(line) = captures.get(0) else {
        return Extracted::absent(body);
    };
    Extracted::new(Some(title), remove(body, &line_span(body, line.range())))
}

/// Extracts a `**Criticality**: CRITICAL|IMPORTANT` line.
///
/// A line with any other value is left in the body.
#[must_use]
pub fn criticality(body: &str) -> Extracted<Option<Criticality>> {
    let Some(captures) = CRITICALITY.captures(body) else {
        return Extracted::absent(body);
    };
    let Ok(criticality) = captures[1].parse::<Criticality>() else {
        return Extracted::absent(body);
    };
    let Some(line) = captures.get(0) else {
        return Extracted::absent(body);
    };
    Extracted::new(
        Some(criticality),
        remove(body, &line_span(body, line.range())),
    )
}

/// Extracts a `**Failure Mode**: ...` headline.
///
/// The text runs until the next blank line, the next heading of any level, or
/// the end of the body. Its lines are joined with single spaces.
#[must_use]
pub fn failure_mode(body: &str) -> Extracted<Option<String>> {
    let Some(head) = FAILURE_MODE.find(body) else {
        return Extracted::absent(body);
    };

    let mut end = head.end();
    let mut parts = Vec::new();
    for (i, line) in body[head.end()..].split_inclusive('\n').enumerate() {
        let text = line.trim();
        if i > 0 && (text.is_empty() || is_heading(line)) {
            break;
        }
        if !text.is_empty() {
            parts.push(text);
        }
        end += line.len();
    }

    if parts.is_empty() {
        return Extracted::absent(body);
    }
    Extracted::new(Some(parts.join(" ")), remove(body, &(head.start()..end)))
}

/// Extracts the `## Specification` section.
///
/// A leading `REQ-<digits>:` token is split off as the requirement identifier.
#[must_use]
pub fn specification(body: &str) -> Extracted<Specification> {
    let Some(section) = find_section(body, SPECIFICATION_HEADING) else {
        return Extracted::absent(body);
    };
    let specification = Specification::parse(&body[section.content.clone()]);
    Extracted::new(specification, remove(body, &section.span()))
}

/// Extracts the bullets of the `## Validation` section.
///
/// Each line starting with `- ` opens an item. Following non-blank lines
/// continue it, one trimmed line each. An empty bullet closes the open item.
/// Prose outside of bullets is dropped.
#[must_use]
pub fn validation(body: &str) -> Extracted<Vec<String>> {
    let Some(section) = find_section(body, VALIDATION_HEADING) else {
        return Extracted::absent(body);
    };

    let mut items: Vec<Vec<&str>> = Vec::new();
    let mut open = false;
    for line in body[section.content.clone()].lines() {
        let text = line.trim();
        if let Some(item) = top_level_bullet(line) {
            items.push(vec![item]);
            open = true;
        } else if text.is_empty() || text == "-" {
            open = false;
        } else if let (true, Some(item)) = (open, items.last_mut()) {
            item.push(text);
        } else {
            tracing::debug!("Dropping text outside of a validation bullet: {text}");
        }
    }

    let items = items.into_iter().map(|lines| lines.join("\n")).collect();
    Extracted::new(items, remove(body, &section.span()))
}

/// Extracts an already-normalized `## Requirements` list.
///
/// The list must hold exactly one primary bullet, or only nested bullets.
/// It ends at the first unindented line that is not a bullet, or at an
/// unindented bullet following a blank line. Lists that do not fit this shape
/// are left in the body.
#[must_use]
pub fn requirements(body: &str) -> Extracted<Option<RequirementsList>> {
    let Some(section) = find_section(body, REQUIREMENTS_HEADING) else {
        return Extracted::absent(body);
    };
    let Some((list, consumed)) = parse_requirements(&body[section.content.clone()]) else {
        return Extracted::absent(body);
    };
    let span = section.start..section.content.start + consumed;
    Extracted::new(Some(list), remove(body, &span))
}

/// Captures whatever is left of the body, trimmed.
#[must_use]
pub fn trailing(body: &str) -> Extracted<Option<String>> {
    Extracted::new(non_empty(body.trim()), String::new())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Current {
    None,
    Primary,
    Item,
}

/// Parses the lines of a requirements list. Returns the list and the number
/// of bytes it spans.
fn parse_requirements(content: &str) -> Option<(RequirementsList, usize)> {
    let mut primary: Option<Vec<&str>> = None;
    let mut items: Vec<Vec<&str>> = Vec::new();
    let mut current = Current::None;
    let mut pending_blanks = 0;
    let mut offset = 0;
    let mut consumed = 0;

    for line in content.split_inclusive('\n') {
        let trimmed = line.trim_end();
        if let Some(text) = top_level_bullet(trimmed) {
            if pending_blanks > 0 && current != Current::None {
                break;
            }
            if primary.is_some() {
                tracing::debug!("Requirements list holds more than one requirement");
                return None;
            }
            primary = Some(vec![text]);
            current = Current::Primary;
        } else if let Some(text) = nested_bullet(trimmed) {
            items.push(vec![text]);
            current = Current::Item;
        } else if trimmed.is_empty() {
            pending_blanks += 1;
            offset += line.len();
            continue;
        } else if trimmed.starts_with(char::is_whitespace) && current != Current::None {
            let lines = match current {
                Current::Primary => primary.as_mut(),
                _ => items.last_mut(),
            }?;
            lines.extend(std::iter::repeat_n("", pending_blanks));
            lines.push(trimmed.trim_start());
        } else {
            break;
        }
        pending_blanks = 0;
        offset += line.len();
        consumed = offset;
    }

    if primary.is_none() && items.is_empty() {
        return None;
    }

    let (critical, specification) = primary.map_or((false, Specification::default()), |lines| {
        let text = lines.join("\n");
        match text.strip_prefix(CRITICAL_MARKER) {
            Some(rest) => (true, Specification::parse(rest)),
            None => (false, Specification::parse(&text)),
        }
    });
    let validation = items.into_iter().map(|lines| lines.join("\n")).collect();

    Some((
        RequirementsList {
            critical,
            specification,
            validation,
        },
        consumed,
    ))
}

/// A `- item` line starting in the first column.
fn top_level_bullet(line: &str) -> Option<&str> {
    line.strip_prefix('-')
        .filter(|rest| rest.starts_with(char::is_whitespace))
        .map(str::trim)
        .filter(|text| !text.is_empty())
}

/// A `  - item` line indented by exactly two spaces.
fn nested_bullet(line: &str) -> Option<&str> {
    line.strip_prefix("  ")
        .filter(|rest| !rest.starts_with(char::is_whitespace))
        .and_then(top_level_bullet)
}

/// The level of the heading on this line, if it is one.
fn heading_level(line: &str) -> Option<usize> {
    let hashes = line.bytes().take_while(|&b| b == b'#').count();
    (hashes > 0 && line[hashes..].chars().next().is_none_or(char::is_whitespace))
        .then_some(hashes)
}

fn is_heading(line: &str) -> bool {
    heading_level(line).is_some()
}

/// Whether the line is a level 1 or level 2 heading.
fn is_section_boundary(line: &str) -> bool {
    heading_level(line).is_some_and(|level| level <= 2)
}

fn is_named_heading(line: &str, name: &str) -> bool {
    line.strip_prefix("##")
        .filter(|rest| rest.starts_with([' ', '\t']))
        .is_some_and(|rest| rest.trim() == name)
}

/// A `## Name` section: the heading starts at `start`, the content runs up to
/// the next heading or the end of the body.
struct Section {
    start: usize,
    content: Range<usize>,
}

impl Section {
    const fn span(&self) -> Range<usize> {
        self.start..self.content.end
    }
}

fn find_section(body: &str, name: &str) -> Option<Section> {
    let mut offset = 0;
    let mut heading: Option<(usize, usize)> = None;
    for line in body.split_inclusive('\n') {
        match heading {
            None if is_named_heading(line, name) => heading = Some((offset, offset + line.len())),
            Some((start, content_start)) if is_section_boundary(line) => {
                return Some(Section {
                    start,
                    content: content_start..offset,
                });
            }
            _ => {}
        }
        offset += line.len();
    }
    heading.map(|(start, content_start)| Section {
        start,
        content: content_start..body.len(),
    })
}

/// Widens a range to cover whole lines, including the final line break.
fn line_span(body: &str, range: Range<usize>) -> Range<usize> {
    let start = body[..range.start].rfind('\n').map_or(0, |i| i + 1);
    let end = body[range.end..]
        .find('\n')
        .map_or(body.len(), |i| range.end + i + 1);
    start..end
}

fn remove(body: &str, span: &Range<usize>) -> String {
    let mut rest = String::with_capacity(body.len() - span.len());
    rest.push_str(&body[..span.start]);
    rest.push_str(&body[span.end..]);
    rest
}

fn non_empty(text: &str) -> Option<String> {
    (!text.is_empty()).then(|| text.to_string())
}
