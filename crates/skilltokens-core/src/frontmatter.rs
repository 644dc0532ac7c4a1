//! SKILL.md structural split
//!
//! A primary document may open with a metadata block delimited by `---` lines.
//! The split is purely structural: the block is not interpreted as YAML here.

use regex::Regex;
use std::sync::LazyLock;

/// Opening delimiter, lazily matched content, closing delimiter with trailing newline.
static FRONTMATTER_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\A---\n(?s:.*?)\n---\n").expect("valid frontmatter pattern"));

/// A primary document split into frontmatter and body
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkillDocument<'a> {
    /// Delimited block including both `---` lines, or empty
    pub frontmatter: &'a str,

    /// Everything after the frontmatter block
    pub body: &'a str,
}

impl SkillDocument<'_> {
    pub fn has_frontmatter(&self) -> bool {
        !self.frontmatter.is_empty()
    }
}

/// Split a SKILL.md into frontmatter and body.
///
/// `frontmatter + body` always reconstructs `content` exactly.
pub fn parse_skill_md(content: &str) -> SkillDocument<'_> {
    match FRONTMATTER_RE.find(content) {
        Some(m) => SkillDocument {
            frontmatter: &content[..m.end()],
            body: &content[m.end()..],
        },
        None => SkillDocument {
            frontmatter: "",
            body: content,
        },
    }
}
