//! Link harvesting from fetched page content
//!
//! This is a textual scan, not an HTML parser. Only anchors written exactly as
//! `<a href="URL">` are recognised; anything else is ignored without error.

use crate::crawler::frontier::WorkItem;
use crate::CrawlError;

const ANCHOR_OPEN: &str = "<a href=\"";
const ANCHOR_CLOSE: &str = "\">";

/// Schemes a candidate must start with to be followed
const ACCEPTED_SCHEMES: [&str; 2] = ["http://", "https://"];

/// Links harvested from one page
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Harvest {
    /// Accepted addresses, one hop deeper than the page they came from
    pub items: Vec<WorkItem>,

    /// Candidates dropped for lacking an accepted scheme
    pub rejected: Vec<CrawlError>,
}

/// Extracts absolute links from `content` fetched at `source_depth`
///
/// Candidates are emitted in document order. Duplicates are kept.
///
/// # Example
///
/// ```
/// use sumi_spider::crawler::harvest;
///
/// let harvest = harvest(r#"<a href="https://a.example/x">x</a>"#, 2);
/// assert_eq!(harvest.items.len(), 1);
/// assert_eq!(harvest.items[0].depth, 3);
/// ```
pub fn harvest(content: &str, source_depth: u32) -> Harvest {
    let depth = source_depth.saturating_add(1);
    let mut harvest = Harvest::default();
    let mut rest = content;

    while let Some(start) = rest.find(ANCHOR_OPEN) {
        let after_open = &rest[start + ANCHOR_OPEN.len()..];
        let Some(end) = after_open.find(ANCHOR_CLOSE) else {
            break;
        };

        let candidate = &after_open[..end];
        if has_accepted_scheme(candidate) {
            harvest.items.push(WorkItem::new(candidate, depth));
        } else {
            harvest.rejected.push(CrawlError::MalformedCandidate {
                candidate: candidate.to_string(),
            });
        }

        rest = &after_open[end + ANCHOR_CLOSE.len()..];
    }

    harvest
}

fn has_accepted_scheme(candidate: &str) -> bool {
    ACCEPTED_SCHEMES
        .iter()
        .any(|scheme| candidate.starts_with(scheme))
}
