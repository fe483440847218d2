//! Parsers for SVN CLI output.

use tracing::debug;

use crate::errors::SvnError;

/// Recorded state of an SVN working copy, from `svn info --xml`.
#[derive(Debug, Clone)]
pub struct WorkingCopyInfo {
    pub url: String,
    /// Checked-out revision of the working-copy root.
    pub revision: i64,
}

/// Parse `svn info --xml` output for a working copy.
///
/// The revision is taken from the `entry` element's `revision` attribute:
/// that is the working-copy revision, whereas `commit@revision` is the
/// last-commit number and misreports partially-updated trees. A missing or
/// unparseable revision maps to 0 ("unknown").
pub fn parse_working_copy_info(xml: &str) -> Result<WorkingCopyInfo, SvnError> {
    debug!("parsing svn info XML ({} bytes)", xml.len());
    let url = extract_tag_content(xml, "url")
        .ok_or_else(|| SvnError::XmlParseError("missing <url> in svn info".into()))?;
    let revision = extract_attribute(xml, "entry", "revision")
        .and_then(|s| s.parse::<i64>().ok())
        .unwrap_or(0);
    Ok(WorkingCopyInfo { url, revision })
}

/// Extract conflicted paths from `svn update` / `svn switch` output.
///
/// Each touched item is printed as a five-character status cell followed by
/// its path; a `C` anywhere in the cell marks a content, property, or tree
/// conflict.
pub fn parse_conflicted_paths(output: &str) -> Vec<String> {
    let mut paths = Vec::new();
    for line in output.lines() {
        if line.len() < 6 || !line.is_char_boundary(5) {
            continue;
        }
        let (cell, rest) = line.split_at(5);
        if !cell.chars().all(|c| c == ' ' || "ADUCGERB".contains(c)) {
            continue;
        }
        if !cell.contains('C') {
            continue;
        }
        let path = rest.trim();
        if !path.is_empty() {
            paths.push(path.to_string());
        }
    }
    paths
}

fn extract_tag_content(xml: &str, tag: &str) -> Option<String> {
    let open = format!("<{}", tag);
    let close = format!("</{}>", tag);
    let mut search_from = 0;
    while let Some(rel_pos) = xml[search_from..].find(&open) {
        let start_pos = search_from + rel_pos;
        let after_open = &xml[start_pos + open.len()..];
        // Ensure we matched the tag exactly (next char must be '>' or whitespace)
        if let Some(ch) = after_open.chars().next() {
            if ch != '>' && !ch.is_ascii_whitespace() {
                search_from = start_pos + open.len();
                continue;
            }
        }
        let content_start = match after_open.find('>') {
            Some(pos) => pos + 1,
            None => return None,
        };
        let content = &after_open[content_start..];
        let end_pos = content.find(&close)?;
        return Some(xml_unescape(content[..end_pos].trim()));
    }
    None
}

fn extract_attribute(xml: &str, tag: &str, attr: &str) -> Option<String> {
    let open = format!("<{}", tag);
    let start_pos = xml.find(&open)?;
    let after_tag = &xml[start_pos + open.len()..];
    let tag_end = after_tag.find('>')?;
    let fragment = &after_tag[..tag_end];
    let pattern = format!("{}=\"", attr);
    let pos = fragment.find(&pattern)?;
    let after = &fragment[pos + pattern.len()..];
    let end = after.find('"')?;
    Some(after[..end].to_string())
}

/// Unescape standard XML entities.
fn xml_unescape(s: &str) -> String {
    s.replace("&amp;", "&")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&apos;", "'")
}
