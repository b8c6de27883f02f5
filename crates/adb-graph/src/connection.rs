//! Cursor pagination over an ordered list.
//!
//! Cursors are the base64 of `arrayconnection:<offset>`, so they increase
//! with list position. A cursor that does not decode is treated as absent.

use base64::{engine::general_purpose::STANDARD, Engine};
use serde::{Deserialize, Serialize};

use crate::error::{GraphError, GraphResult};

const CURSOR_PREFIX: &str = "arrayconnection:";

/// Pagination arguments. All optional; no arguments means the whole list.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionArgs {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub first: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub after: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub before: Option<String>,
}

impl ConnectionArgs {
    pub fn first(n: i64) -> Self {
        Self {
            first: Some(n),
            ..Self::default()
        }
    }

    pub fn last(n: i64) -> Self {
        Self {
            last: Some(n),
            ..Self::default()
        }
    }

    pub fn after(mut self, cursor: impl Into<String>) -> Self {
        self.after = Some(cursor.into());
        self
    }

    pub fn before(mut self, cursor: impl Into<String>) -> Self {
        self.before = Some(cursor.into());
        self
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Edge<T> {
    pub node: T,
    pub cursor: String,
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageInfo {
    pub has_next_page: bool,
    pub has_previous_page: bool,
    pub start_cursor: Option<String>,
    pub end_cursor: Option<String>,
}

/// One page of a list.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Connection<T> {
    pub edges: Vec<Edge<T>>,
    pub page_info: PageInfo,
}

impl<T> Connection<T> {
    pub fn nodes(&self) -> impl Iterator<Item = &T> {
        self.edges.iter().map(|edge| &edge.node)
    }

    /// Convert every node, keeping cursors and page info.
    pub fn try_map<U, E>(self, mut f: impl FnMut(T) -> Result<U, E>) -> Result<Connection<U>, E> {
        let edges = self
            .edges
            .into_iter()
            .map(|edge| {
                Ok(Edge {
                    node: f(edge.node)?,
                    cursor: edge.cursor,
                })
            })
            .collect::<Result<_, E>>()?;
        Ok(Connection {
            edges,
            page_info: self.page_info,
        })
    }
}

pub fn offset_to_cursor(offset: usize) -> String {
    STANDARD.encode(format!("{CURSOR_PREFIX}{offset}"))
}

/// The offset a cursor points at, or `None` if it is not a list cursor.
pub fn cursor_to_offset(cursor: &str) -> Option<i64> {
    let bytes = STANDARD.decode(cursor).ok()?;
    let text = String::from_utf8(bytes).ok()?;
    text.strip_prefix(CURSOR_PREFIX)?.parse().ok()
}

/// Cursor offsets are clamped to `-1..=length` so bound arithmetic cannot overflow.
fn offset_with_default(cursor: Option<&str>, default: i64, length: i64) -> i64 {
    cursor
        .and_then(cursor_to_offset)
        .map_or(default, |offset| offset.clamp(-1, length))
}

/// Slice `items` according to `args`.
///
/// Fails with a validation error when `first` or `last` is negative.
pub fn connection_from_vec<T>(items: Vec<T>, args: &ConnectionArgs) -> GraphResult<Connection<T>> {
    let length = items.len() as i64;

    let before_offset = offset_with_default(args.before.as_deref(), length, length);
    let after_offset = offset_with_default(args.after.as_deref(), -1, length);

    let mut start = (after_offset + 1).max(0);
    let mut end = before_offset.min(length).max(0);

    if let Some(first) = args.first {
        if first < 0 {
            return Err(GraphError::Validation(
                "argument \"first\" must be a non-negative integer".into(),
            ));
        }
        end = end.min(start.saturating_add(first));
    }
    if let Some(last) = args.last {
        if last < 0 {
            return Err(GraphError::Validation(
                "argument \"last\" must be a non-negative integer".into(),
            ));
        }
        start = start.max(end.saturating_sub(last));
    }

    let edges: Vec<Edge<T>> = if start < end {
        items
            .into_iter()
            .enumerate()
            .skip(start as usize)
            .take((end - start) as usize)
            .map(|(offset, node)| Edge {
                node,
                cursor: offset_to_cursor(offset),
            })
            .collect()
    } else {
        Vec::new()
    };

    let lower_bound = if args.after.is_some() { after_offset + 1 } else { 0 };
    let upper_bound = if args.before.is_some() { before_offset } else { length };

    let page_info = PageInfo {
        has_previous_page: args.last.is_some() && start > lower_bound,
        has_next_page: args.first.is_some() && end < upper_bound,
        start_cursor: edges.first().map(|edge| edge.cursor.clone()),
        end_cursor: edges.last().map(|edge| edge.cursor.clone()),
    };

    Ok(Connection { edges, page_info })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn letters() -> Vec<&'static str> {
        vec!["A", "B", "C", "D", "E"]
    }

    fn nodes(connection: &Connection<&'static str>) -> Vec<&'static str> {
        connection.nodes().copied().collect()
    }

    #[test]
    fn no_arguments_returns_everything() {
        let page = connection_from_vec(letters(), &ConnectionArgs::default()).unwrap();
        assert_eq!(nodes(&page), letters());
        assert!(!page.page_info.has_next_page);
        assert!(!page.page_info.has_previous_page);
        assert_eq!(page.page_info.start_cursor.as_deref(), Some("YXJyYXljb25uZWN0aW9uOjA="));
    }

    #[test]
    fn first_two_of_five() {
        let page = connection_from_vec(letters(), &ConnectionArgs::first(2)).unwrap();
        assert_eq!(nodes(&page), ["A", "B"]);
        assert!(page.page_info.has_next_page);
        assert!(!page.page_info.has_previous_page);

        let offsets: Vec<i64> = page
            .edges
            .iter()
            .map(|e| cursor_to_offset(&e.cursor).unwrap())
            .collect();
        assert!(offsets.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn first_after_cursor() {
        let args = ConnectionArgs::first(2).after(offset_to_cursor(1));
        let page = connection_from_vec(letters(), &args).unwrap();
        assert_eq!(nodes(&page), ["C", "D"]);
        assert!(page.page_info.has_next_page);
    }

    #[test]
    fn last_before_cursor() {
        let args = ConnectionArgs::last(2).before(offset_to_cursor(4));
        let page = connection_from_vec(letters(), &args).unwrap();
        assert_eq!(nodes(&page), ["C", "D"]);
        assert!(page.page_info.has_previous_page);
        assert!(!page.page_info.has_next_page);
    }

    #[test]
    fn last_three() {
        let page = connection_from_vec(letters(), &ConnectionArgs::last(3)).unwrap();
        assert_eq!(nodes(&page), ["C", "D", "E"]);
        assert!(page.page_info.has_previous_page);
    }

    #[test]
    fn first_past_the_end() {
        let page = connection_from_vec(letters(), &ConnectionArgs::first(10)).unwrap();
        assert_eq!(page.edges.len(), 5);
        assert!(!page.page_info.has_next_page);
    }

    #[test]
    fn first_zero_is_empty() {
        let page = connection_from_vec(letters(), &ConnectionArgs::first(0)).unwrap();
        assert!(page.edges.is_empty());
        assert!(page.page_info.has_next_page);
        assert!(page.page_info.start_cursor.is_none());
    }

    #[test]
    fn negative_counts_are_rejected() {
        assert!(matches!(
            connection_from_vec(letters(), &ConnectionArgs::first(-1)),
            Err(GraphError::Validation(_))
        ));
        assert!(matches!(
            connection_from_vec(letters(), &ConnectionArgs::last(-1)),
            Err(GraphError::Validation(_))
        ));
    }

    #[test]
    fn malformed_cursor_falls_back_to_default_bound() {
        let args = ConnectionArgs::first(2).after("garbage");
        let page = connection_from_vec(letters(), &args).unwrap();
        assert_eq!(nodes(&page), ["A", "B"]);
    }

    #[test]
    fn extreme_cursor_offsets_are_clamped() {
        let max = STANDARD.encode(format!("{CURSOR_PREFIX}{}", i64::MAX));
        let min = STANDARD.encode(format!("{CURSOR_PREFIX}{}", i64::MIN));

        let page = connection_from_vec(letters(), &ConnectionArgs::first(2).after(&max)).unwrap();
        assert!(page.edges.is_empty());
        assert!(!page.page_info.has_next_page);

        let page = connection_from_vec(letters(), &ConnectionArgs::last(2).before(&max)).unwrap();
        assert_eq!(nodes(&page), ["D", "E"]);

        let page = connection_from_vec(letters(), &ConnectionArgs::last(2).before(&min)).unwrap();
        assert!(page.edges.is_empty());

        let page = connection_from_vec(letters(), &ConnectionArgs::first(2).after(&min)).unwrap();
        assert_eq!(nodes(&page), ["A", "B"]);
    }

    #[test]
    fn empty_list() {
        let page = connection_from_vec(Vec::<&str>::new(), &ConnectionArgs::first(3)).unwrap();
        assert!(page.edges.is_empty());
        assert!(!page.page_info.has_next_page);
    }

    #[test]
    fn page_info_serializes_camel_case() {
        let page = connection_from_vec(letters(), &ConnectionArgs::first(1)).unwrap();
        let json = serde_json::to_value(&page).unwrap();
        assert_eq!(json["pageInfo"]["hasNextPage"], true);
        assert_eq!(json["edges"][0]["node"], "A");
    }
}
