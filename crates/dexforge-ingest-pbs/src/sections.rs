//! Section reader shared by every file kind.
//!
//! Rules:
//! - a line starting with `#---` closes the current section
//! - a `[...]` line is the section header; text after `]` and a `#` is kept
//!   as the header comment (`[001] # Route 1`)
//! - a header line arriving after the section already has content starts a
//!   new section, so separator-less files still split correctly
//! - other `#` lines are comments
//! - `Key = Value` lines become ordered fields (split at the first `=`)
//! - anything else non-blank is kept as a body line (encounter tables)

/// One entity block.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Section {
    pub header: Option<String>,
    pub header_comment: Option<String>,
    pub fields: Vec<(String, String)>,
    pub body: Vec<String>,
    /// 1-based line of the section's first content line.
    pub line: usize,
}

impl Section {
    /// Value of the last occurrence of `key`.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.fields
            .iter()
            .rev()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn has(&self, key: &str) -> bool {
        self.fields.iter().any(|(k, _)| k == key)
    }

    fn is_empty(&self) -> bool {
        self.header.is_none() && self.fields.is_empty() && self.body.is_empty()
    }
}

pub fn parse_sections(text: &str) -> Vec<Section> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    let mut sections = Vec::new();
    let mut current = Section::default();

    for (i, raw) in text.lines().enumerate() {
        let line = raw.trim();
        if line.is_empty() {
            continue;
        }

        if line.starts_with("#---") {
            flush(&mut sections, &mut current);
            continue;
        }

        if let Some(rest) = line.strip_prefix('[') {
            if let Some(close) = rest.find(']') {
                if !current.is_empty() {
                    flush(&mut sections, &mut current);
                }
                current.header = Some(rest[..close].trim().to_string());
                current.header_comment = rest[close + 1..]
                    .trim()
                    .strip_prefix('#')
                    .map(|c| c.trim().to_string())
                    .filter(|c| !c.is_empty());
                current.line = i + 1;
                continue;
            }
        }

        if line.starts_with('#') {
            continue;
        }

        if current.is_empty() {
            current.line = i + 1;
        }
        match line.split_once('=') {
            Some((key, value)) => current
                .fields
                .push((key.trim().to_string(), value.trim().to_string())),
            None => current.body.push(line.to_string()),
        }
    }
    flush(&mut sections, &mut current);
    sections
}

fn flush(sections: &mut Vec<Section>, current: &mut Section) {
    let done = std::mem::take(current);
    if !done.is_empty() {
        sections.push(done);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE: &str = "\u{feff}# See the documentation on the wiki
#-------------------------------
[BULBASAUR]
Name = Bulbasaur
Types = GRASS,POISON
#-------------------------------
[IVYSAUR]
Name = Ivysaur
Evolutions = VENUSAUR,,Level
";

    #[test]
    fn splits_on_separators() {
        let sections = parse_sections(SAMPLE);
        assert_eq!(sections.len(), 2);
        assert_eq!(sections[0].header.as_deref(), Some("BULBASAUR"));
        assert_eq!(sections[0].get("Types"), Some("GRASS,POISON"));
        assert_eq!(sections[1].get("Evolutions"), Some("VENUSAUR,,Level"));
        assert_eq!(sections[1].line, 7);
    }

    #[test]
    fn header_starts_a_new_section_without_separator() {
        let sections = parse_sections("[A]\nName = a\n[B]\nName = b\n");
        assert_eq!(sections.len(), 2);
        assert_eq!(sections[1].get("Name"), Some("b"));
    }

    #[test]
    fn keeps_header_comment_and_body_lines() {
        let sections = parse_sections("[001] # Route 1\nLand,21\n20,PIDGEY,2\n");
        let s = &sections[0];
        assert_eq!(s.header.as_deref(), Some("001"));
        assert_eq!(s.header_comment.as_deref(), Some("Route 1"));
        assert_eq!(s.body, vec!["Land,21", "20,PIDGEY,2"]);
    }

    #[test]
    fn value_may_contain_equals() {
        let sections = parse_sections("[X]\nDescription = a = b\n");
        assert_eq!(sections[0].get("Description"), Some("a = b"));
    }
}
