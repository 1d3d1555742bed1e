//! Regex filtering and sorting of metric find values into options.

use regex::{Captures, Regex, RegexBuilder};

use super::metric_find::MetricFindValue;
use super::option::VariableValueOption;
use super::sort::{VariableSort, sort_variable_values};

/// A compiled variable filter regex.
///
/// Accepts either a plain pattern, which must match the whole subject, or
/// the slash form `/pattern/flags` with flags `i`, `m`, `s` and `g`
/// (`u` and `y` are accepted and ignored).
#[derive(Debug, Clone)]
pub struct VariableRegex {
    regex: Regex,
    global: bool,
}

impl VariableRegex {
    /// Compiles a variable regex.
    ///
    /// # Errors
    ///
    /// Returns the regex compilation error for malformed patterns.
    pub fn parse(source: &str) -> Result<Self, regex::Error> {
        if let Some((pattern, flags)) = split_slash_form(source) {
            let regex = RegexBuilder::new(pattern)
                .case_insensitive(flags.contains('i'))
                .multi_line(flags.contains('m'))
                .dot_matches_new_line(flags.contains('s'))
                .build()?;
            return Ok(Self {
                regex,
                global: flags.contains('g'),
            });
        }

        Ok(Self {
            regex: Regex::new(&format!("^(?:{source})$"))?,
            global: false,
        })
    }

    /// Returns true if the regex defines at least one capture group.
    #[must_use]
    pub fn has_groups(&self) -> bool {
        self.regex.captures_len() > 1
    }

    /// Returns the matches of the regex in `subject`: every match for
    /// global regexes, the first one otherwise.
    fn matches<'s>(&self, subject: &'s str) -> Vec<Captures<'s>> {
        if self.global {
            self.regex.captures_iter(subject).collect()
        } else {
            self.regex.captures(subject).into_iter().collect()
        }
    }

    fn apply(&self, subject: &str) -> RegexOutcome {
        let matches = self.matches(subject);
        if matches.is_empty() {
            return RegexOutcome::NoMatch;
        }

        let value_group = named_group(&matches, "value");
        let text_group = named_group(&matches, "text");

        if value_group.is_some() || text_group.is_some() {
            return RegexOutcome::Replace {
                value: value_group.clone().or_else(|| text_group.clone()).unwrap_or_default(),
                label: text_group.or(value_group).unwrap_or_default(),
            };
        }
        if !self.has_groups() {
            return RegexOutcome::Keep;
        }
        if matches.len() > 1 {
            return RegexOutcome::Many(matches.iter().map(first_group).collect());
        }
        let group = first_group(&matches[0]);
        RegexOutcome::Replace {
            label: group.clone(),
            value: group,
        }
    }
}

/// What a matching regex does to one value.
enum RegexOutcome {
    NoMatch,
    Keep,
    Replace { label: String, value: String },
    Many(Vec<String>),
}

fn split_slash_form(source: &str) -> Option<(&str, &str)> {
    let rest = source.strip_prefix('/')?;
    let end = rest.rfind('/')?;
    let flags = &rest[end + 1..];
    if flags.chars().all(|c| "gimsuy".contains(c)) {
        Some((&rest[..end], flags))
    } else {
        None
    }
}

fn named_group(matches: &[Captures<'_>], name: &str) -> Option<String> {
    matches
        .iter()
        .find_map(|m| m.name(name).map(|g| g.as_str()).filter(|s| !s.is_empty()))
        .map(str::to_string)
}

fn first_group(captures: &Captures<'_>) -> String {
    captures
        .get(1)
        .map(|g| g.as_str().to_string())
        .unwrap_or_default()
}

/// Turns metric find values into sorted options, filtered by `regex`.
///
/// `regex` must already be interpolated. An empty regex keeps every value;
/// a malformed regex matches nothing. Options are not de-duplicated.
#[must_use]
pub fn metric_names_to_variable_values(
    regex: &str,
    sort: VariableSort,
    values: &[MetricFindValue],
) -> Vec<VariableValueOption> {
    let regex = if regex.is_empty() {
        None
    } else {
        match VariableRegex::parse(regex) {
            Ok(compiled) => Some(compiled),
            Err(error) => {
                tracing::warn!(regex = %regex, error = %error, "invalid variable regex, no values match");
                return Vec::new();
            }
        }
    };

    let mut options = Vec::with_capacity(values.len());

    for item in values {
        let mut label = if item.text.is_empty() {
            item.value.clone().unwrap_or_default()
        } else {
            item.text.clone()
        };
        let mut value = item.value.clone().unwrap_or_else(|| item.text.clone());

        if let Some(regex) = &regex {
            let subject = if label.is_empty() { &value } else { &label };
            match regex.apply(subject) {
                RegexOutcome::NoMatch => continue,
                RegexOutcome::Keep => {}
                RegexOutcome::Replace {
                    label: new_label,
                    value: new_value,
                } => {
                    label = new_label;
                    value = new_value;
                }
                RegexOutcome::Many(groups) => {
                    options.extend(groups.into_iter().map(VariableValueOption::from_value));
                    continue;
                }
            }
        }

        options.push(VariableValueOption::new(label, value));
    }

    sort_variable_values(options, sort)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn texts(items: &[&str]) -> Vec<MetricFindValue> {
        items.iter().map(|t| MetricFindValue::text(*t)).collect()
    }

    fn values_of(options: &[VariableValueOption]) -> Vec<&str> {
        options.iter().map(|o| o.value.as_str()).collect()
    }

    #[test]
    fn test_no_regex_sorts_without_dedup() {
        let options = metric_names_to_variable_values(
            "",
            VariableSort::AlphabeticalAsc,
            &texts(&["a", "b", "a"]),
        );
        assert_eq!(values_of(&options), vec!["a", "a", "b"]);
    }

    #[test]
    fn test_capture_group_replaces_value_and_label() {
        let options = metric_names_to_variable_values(
            "prod-(.*)",
            VariableSort::AlphabeticalAsc,
            &texts(&["prod-1", "staging-1"]),
        );
        assert_eq!(options, vec![VariableValueOption::from_value("1")]);
    }

    #[test]
    fn test_plain_pattern_must_match_whole_label() {
        let options =
            metric_names_to_variable_values("web", VariableSort::Disabled, &texts(&["web", "web-1"]));
        assert_eq!(values_of(&options), vec!["web"]);
    }

    #[test]
    fn test_slash_form_with_flags() {
        let options = metric_names_to_variable_values(
            "/WEB/i",
            VariableSort::Disabled,
            &texts(&["web-1", "db-1"]),
        );
        assert_eq!(values_of(&options), vec!["web-1"]);
    }

    #[test]
    fn test_named_groups() {
        let options = metric_names_to_variable_values(
            "/(?P<text>[a-z]+)-(?P<value>\\d+)/",
            VariableSort::Disabled,
            &texts(&["web-1", "db-2"]),
        );
        assert_eq!(
            options,
            vec![
                VariableValueOption::new("web", "1"),
                VariableValueOption::new("db", "2"),
            ]
        );
    }

    #[test]
    fn test_named_value_group_only() {
        let options = metric_names_to_variable_values(
            "/host=(?P<value>\\w+)/",
            VariableSort::Disabled,
            &texts(&["host=alpha"]),
        );
        assert_eq!(options, vec![VariableValueOption::from_value("alpha")]);
    }

    #[test]
    fn test_global_flag_emits_every_match() {
        let options = metric_names_to_variable_values(
            "/id=(\\d+)/g",
            VariableSort::Disabled,
            &texts(&["id=1,id=2"]),
        );
        assert_eq!(values_of(&options), vec!["1", "2"]);
    }

    #[test]
    fn test_regex_without_groups_keeps_item() {
        let options = metric_names_to_variable_values(
            "/^web/",
            VariableSort::Disabled,
            &[MetricFindValue::with_value("Web One", "web-1")],
        );
        // label is matched first, and "Web One" does not start with "web"
        assert!(options.is_empty());

        let options = metric_names_to_variable_values(
            "/^Web/",
            VariableSort::Disabled,
            &[MetricFindValue::with_value("Web One", "web-1")],
        );
        assert_eq!(options, vec![VariableValueOption::new("Web One", "web-1")]);
    }

    #[test]
    fn test_malformed_regex_matches_nothing() {
        let options = metric_names_to_variable_values(
            "prod-(",
            VariableSort::AlphabeticalAsc,
            &texts(&["prod-1"]),
        );
        assert!(options.is_empty());
    }

    #[test]
    fn test_value_falls_back_to_text_and_back() {
        let options = metric_names_to_variable_values(
            "",
            VariableSort::Disabled,
            &[
                MetricFindValue::text("only-text"),
                MetricFindValue {
                    text: String::new(),
                    value: Some("only-value".to_string()),
                    expandable: None,
                },
            ],
        );
        assert_eq!(
            options,
            vec![
                VariableValueOption::from_value("only-text"),
                VariableValueOption::from_value("only-value"),
            ]
        );
    }

    #[test]
    fn test_split_slash_form() {
        assert_eq!(split_slash_form("/a/gi"), Some(("a", "gi")));
        assert_eq!(split_slash_form("/a/b/"), Some(("a/b", "")));
        assert_eq!(split_slash_form("/a/xyz"), None);
        assert_eq!(split_slash_form("a"), None);
        assert_eq!(split_slash_form("/"), None);
    }
}
