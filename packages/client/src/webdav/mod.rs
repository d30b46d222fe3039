//! WebDAV multistatus decoding
//!
//! `PROPFIND` answers arrive as a `multistatus` document:
//!
//! ```text
//! multistatus
//! └── response        (one per resource)
//!     ├── href
//!     └── propstat
//!         └── prop
//!             ├── getcontentlength   decimal byte count
//!             ├── getlastmodified    RFC 2822 date
//!             └── resourcetype
//!                 └── collection     present for directories
//! ```
//!
//! Servers disagree on namespace prefixes (`D:getcontentlength`,
//! `lp1:getcontentlength`, ...), so elements are matched by local name only.

mod element;

use std::borrow::Cow;

use chrono::{DateTime, Utc};

use crate::error::{self, Result};
use element::{Element, parse_document};

/// How much of an undecodable body is worth logging.
pub const BODY_PREVIEW_LIMIT: usize = 1024;

/// Properties of one resource in a multistatus document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DavEntry {
    pub href: String,
    /// `None` when the server sent no `getcontentlength`, as is usual for collections.
    pub size: Option<u64>,
    pub is_dir: bool,
    pub modified: Option<DateTime<Utc>>,
}

/// Decodes the first resource of a `Depth: 1` stat answer.
///
/// # Errors
///
/// Fails with a decode error when the body is not a well-formed multistatus
/// document, when the first `response` lacks a `propstat`/`prop`, or when the
/// content length is not a number.
pub fn parse_stat(body: &[u8]) -> Result<DavEntry> {
    let root = parse_multistatus(body)?;
    let response = root
        .child("response")
        .ok_or_else(|| error::decode("multistatus document has no response", Shape("response")))?;
    parse_response(response)
}

/// Decodes every resource of a multistatus listing, in document order.
///
/// # Errors
///
/// Fails with a decode error under the same conditions as [`parse_stat`],
/// applied to each `response`. An empty `multistatus` is a valid, empty
/// listing.
pub fn parse_listing(body: &[u8]) -> Result<Vec<DavEntry>> {
    let root = parse_multistatus(body)?;
    root.children_named("response").map(parse_response).collect()
}

/// Printable prefix of `body` for diagnostics.
#[must_use]
pub fn body_preview(body: &[u8]) -> Cow<'_, str> {
    String::from_utf8_lossy(&body[..body.len().min(BODY_PREVIEW_LIMIT)])
}

fn parse_multistatus(body: &[u8]) -> Result<Element> {
    let root = parse_document(body)
        .map_err(|e| error::decode(format!("malformed PROPFIND response: {e}"), e))?;
    if root.name != "multistatus" {
        return Err(error::decode(
            format!("unexpected root element <{}>", root.name),
            Shape("multistatus"),
        ));
    }
    Ok(root)
}

fn parse_response(response: &Element) -> Result<DavEntry> {
    let href = response
        .child("href")
        .map(|href| href.trimmed_text().to_string())
        .unwrap_or_default();

    let prop = response
        .children_named("propstat")
        .find_map(|propstat| propstat.child("prop"))
        .ok_or_else(|| error::decode(format!("response for {href:?} has no propstat/prop"), Shape("prop")))?;

    let size = match prop.child("getcontentlength").map(Element::trimmed_text) {
        None | Some("") => None,
        Some(text) => Some(text.parse::<u64>().map_err(|e| {
            error::decode(format!("invalid getcontentlength {text:?} for {href:?}"), e)
        })?),
    };

    let is_dir = prop
        .child("resourcetype")
        .is_some_and(|kind| kind.child("collection").is_some());

    // Missing or odd dates are not worth failing a stat over.
    let modified = prop
        .child("getlastmodified")
        .and_then(|date| DateTime::parse_from_rfc2822(date.trimmed_text()).ok())
        .map(|date| date.with_timezone(&Utc));

    Ok(DavEntry {
        href,
        size,
        is_dir,
        modified,
    })
}

/// A required element the document does not contain.
#[derive(Debug, thiserror::Error)]
#[error("missing <{0}> element")]
struct Shape(&'static str);
