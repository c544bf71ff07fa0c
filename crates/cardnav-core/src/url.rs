//! Deep-link codec.
//!
//! Grammar: `/{card}[/{parentId}/{childCard}]*?[ord={spec}][&red={filter}][&id={recordId}]`.
//!
//! `parse` is strict about shape (it is the boundary where user input
//! enters the system) but knows nothing about metadata; it produces a
//! [`NavigationRequest`] for the state resolver to validate. `render` is
//! the canonical inverse: spaces come back as `%20`, query parts in
//! `ord`, `red`, `id` order, and the transient submenu marker is never
//! written out.

use crate::{
    model::{
        card::CardName,
        id::{FieldId, RecordId},
    },
    state::{NavigationRequest, NavigationState, SortDirection, SortSpec},
};
use percent_encoding::{AsciiSet, CONTROLS, utf8_percent_encode};
use thiserror::Error as ThisError;

/// Bytes escaped when rendering path segments and query values: anything
/// the grammar itself gives meaning to, plus space and the escape
/// character.
const ESCAPED: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'&')
    .add(b'+')
    .add(b'/')
    .add(b'<')
    .add(b'>')
    .add(b'=')
    .add(b'?');

/// Trailing marker on an `ord` token selecting descending order.
const DESCENDING_SUFFIX: char = 'd';

///
/// UrlError
///
/// Shape errors in a deep link. These are user-facing and recoverable by
/// fixing the URL; nothing here involves metadata.
///

#[derive(Clone, Debug, Eq, PartialEq, ThisError)]
pub enum UrlError {
    #[error("url names no card")]
    EmptyPath,

    #[error("path ends at parent record {record} without naming a child card")]
    DanglingParentId { record: RecordId },

    #[error("path segment '{segment}' is not a parent record id")]
    InvalidParentId { segment: String },

    #[error("record id '{value}' is not a non-negative integer")]
    InvalidRecordId { value: String },

    #[error("sort token '{token}' is not a field id with an optional 'd' suffix")]
    InvalidSortToken { token: String },

    #[error("'{value}' contains an invalid percent escape")]
    InvalidEscape { value: String },

    #[error("query parameter '{key}' appears more than once")]
    DuplicateParameter { key: String },

    #[error("unknown query parameter '{key}'")]
    UnknownParameter { key: String },
}

/// Parse a deep link into a [`NavigationRequest`].
///
/// Accepts either a bare path (`/orders/123/lines?id=4`) or an absolute
/// URL whose origin is ignored. Fragments are ignored. Repeated empty
/// path segments collapse. Query parameters with blank values are
/// treated as absent.
pub fn parse(url: &str) -> Result<NavigationRequest, UrlError> {
    let url = url.split_once('#').map_or(url, |(head, _)| head);
    let url = strip_origin(url);
    let (path, query) = match url.split_once('?') {
        Some((path, query)) => (path, Some(query)),
        None => (url, None),
    };

    let mut segments = path.split('/').filter(|segment| !segment.is_empty());

    let root = match segments.next() {
        Some(segment) => CardName::from(decode_component(segment, false)?),
        None => return Err(UrlError::EmptyPath),
    };

    let mut descents = Vec::new();
    while let Some(segment) = segments.next() {
        let record = decode_component(segment, false)?
            .parse::<u64>()
            .map(RecordId::new)
            .map_err(|_| UrlError::InvalidParentId {
                segment: segment.to_string(),
            })?;
        let child = match segments.next() {
            Some(child) => CardName::from(decode_component(child, false)?),
            None => return Err(UrlError::DanglingParentId { record }),
        };
        descents.push((record, child));
    }

    let mut request = NavigationRequest {
        root,
        descents,
        sort: SortSpec::new(),
        filter: None,
        selected: None,
    };

    if let Some(query) = query {
        parse_query(query, &mut request)?;
    }

    Ok(request)
}

/// Render a [`NavigationState`] as its canonical deep link.
///
/// The left inverse of [`parse`] up to percent-encoding normalization:
/// the output always escapes spaces as `%20`, never `+`.
#[must_use]
pub fn render(state: &NavigationState) -> String {
    let mut url = String::new();

    for frame in &state.stack {
        url.push('/');
        url.push_str(&encode_component(frame.card.as_str()));
        url.push('/');
        url.push_str(&frame.parent_record.to_string());
    }
    url.push('/');
    url.push_str(&encode_component(state.card.as_str()));

    let mut query = Vec::new();
    if !state.sort.is_empty() {
        query.push(format!("ord={}", render_sort(&state.sort)));
    }
    if let Some(filter) = &state.filter {
        query.push(format!("red={}", encode_component(filter)));
    }
    if let Some(selected) = state.selected {
        query.push(format!("id={selected}"));
    }
    if !query.is_empty() {
        url.push('?');
        url.push_str(&query.join("&"));
    }

    url
}

/// Render a sort spec as its `ord=` token list.
#[must_use]
pub fn render_sort(sort: &SortSpec) -> String {
    sort.keys
        .iter()
        .map(|(field, direction)| match direction {
            SortDirection::Asc => field.to_string(),
            SortDirection::Desc => format!("{field}{DESCENDING_SUFFIX}"),
        })
        .collect::<Vec<_>>()
        .join(",")
}

/// Parse an `ord=` token list into a sort spec. Tokens keep their
/// left-to-right precedence; surrounding whitespace per token is
/// tolerated.
pub fn parse_sort(spec: &str) -> Result<SortSpec, UrlError> {
    let mut keys = Vec::new();

    for raw in spec.split(',') {
        let token = raw.trim();
        let (digits, direction) = match token.strip_suffix(DESCENDING_SUFFIX) {
            Some(digits) => (digits, SortDirection::Desc),
            None => (token, SortDirection::Asc),
        };
        let field = digits
            .parse::<u64>()
            .map(FieldId::new)
            .map_err(|_| UrlError::InvalidSortToken {
                token: token.to_string(),
            })?;
        keys.push((field, direction));
    }

    Ok(SortSpec { keys })
}

fn parse_query(query: &str, request: &mut NavigationRequest) -> Result<(), UrlError> {
    for pair in query.split('&').filter(|pair| !pair.is_empty()) {
        let (key, value) = pair.split_once('=').map_or((pair, ""), |(k, v)| (k, v));

        // Blank values read as absent, before duplicate accounting.
        if value.is_empty() {
            continue;
        }

        match key {
            "ord" => {
                if !request.sort.is_empty() {
                    return Err(UrlError::DuplicateParameter {
                        key: key.to_string(),
                    });
                }
                request.sort = parse_sort(&decode_component(value, true)?)?;
            }
            "red" => {
                if request.filter.is_some() {
                    return Err(UrlError::DuplicateParameter {
                        key: key.to_string(),
                    });
                }
                request.filter = Some(decode_component(value, true)?);
            }
            "id" => {
                if request.selected.is_some() {
                    return Err(UrlError::DuplicateParameter {
                        key: key.to_string(),
                    });
                }
                let record = decode_component(value, true)?
                    .parse::<u64>()
                    .map(RecordId::new)
                    .map_err(|_| UrlError::InvalidRecordId {
                        value: value.to_string(),
                    })?;
                request.selected = Some(record);
            }
            other => {
                return Err(UrlError::UnknownParameter {
                    key: other.to_string(),
                });
            }
        }
    }

    Ok(())
}

/// Drop a leading `scheme://host` so absolute URLs and bare paths parse
/// alike.
fn strip_origin(url: &str) -> &str {
    if url.starts_with('/') {
        return url;
    }
    match url.split_once("://") {
        Some((scheme, rest))
            if !scheme.is_empty()
                && scheme
                    .chars()
                    .all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.')) =>
        {
            rest.find(['/', '?']).map_or("", |at| &rest[at..])
        }
        _ => url,
    }
}

fn encode_component(raw: &str) -> String {
    utf8_percent_encode(raw, ESCAPED).to_string()
}

/// Strict percent decoding. `+` becomes a space only in query values,
/// matching browser form encoding; path segments keep it literal.
fn decode_component(raw: &str, plus_is_space: bool) -> Result<String, UrlError> {
    let bytes = raw.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut at = 0;

    while at < bytes.len() {
        match bytes[at] {
            b'%' => {
                let hi = bytes.get(at + 1).copied().and_then(hex_val);
                let lo = bytes.get(at + 2).copied().and_then(hex_val);
                match (hi, lo) {
                    (Some(hi), Some(lo)) => {
                        out.push((hi << 4) | lo);
                        at += 3;
                    }
                    _ => {
                        return Err(UrlError::InvalidEscape {
                            value: raw.to_string(),
                        });
                    }
                }
            }
            b'+' if plus_is_space => {
                out.push(b' ');
                at += 1;
            }
            byte => {
                out.push(byte);
                at += 1;
            }
        }
    }

    String::from_utf8(out).map_err(|_| UrlError::InvalidEscape {
        value: raw.to_string(),
    })
}

const fn hex_val(byte: u8) -> Option<u8> {
    match byte {
        b'0'..=b'9' => Some(byte - b'0'),
        b'a'..=b'f' => Some(byte - b'a' + 10),
        b'A'..=b'F' => Some(byte - b'A' + 10),
        _ => None,
    }
}
