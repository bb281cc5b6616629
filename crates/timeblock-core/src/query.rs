//! Query/projection engine for event listings.
//!
//! Turns the raw event collection into a client-facing page:
//!
//! 1. parse the signed order spec and the filter (projection) spec,
//!    rewriting the derived `datetime` column to its physical parts,
//! 2. sort the full set with a stable multi-key comparator,
//! 3. slice the requested page out of the globally sorted set,
//! 4. project each retained row into a record with only the requested
//!    columns plus a `_links.self` reference (the event id is always
//!    retained internally for link construction),
//! 5. build page metadata with `self`/`prev`/`next` links.
//!
//! Column names arrive in the wire vocabulary (`from`, `to`, `post-code`,
//! `last-update`); [`Column`] is the explicit bidirectional mapping table
//! between that vocabulary and the stored fields.

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value, json};

use crate::error::{DomainError, DomainResult};
use crate::event::Event;

/// A projectable or sortable column of the event schema.
///
/// `Datetime` is derived: it is never stored, and is rewritten to the
/// combination of [`Column::Date`] and [`Column::StartTime`] for both
/// ordering and projection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Column {
    Id,
    Name,
    Date,
    StartTime,
    EndTime,
    Street,
    Suburb,
    State,
    PostCode,
    Description,
    LastUpdate,
    Datetime,
}

/// Wire-name ↔ column mapping table.
const COLUMN_TABLE: &[(&str, Column)] = &[
    ("id", Column::Id),
    ("name", Column::Name),
    ("date", Column::Date),
    ("from", Column::StartTime),
    ("to", Column::EndTime),
    ("street", Column::Street),
    ("suburb", Column::Suburb),
    ("state", Column::State),
    ("post-code", Column::PostCode),
    ("description", Column::Description),
    ("last-update", Column::LastUpdate),
    ("datetime", Column::Datetime),
];

impl Column {
    /// Resolves a wire-vocabulary column name.
    pub fn from_wire(name: &str) -> Option<Self> {
        COLUMN_TABLE
            .iter()
            .find(|(wire, _)| *wire == name)
            .map(|(_, column)| *column)
    }

    /// The wire-vocabulary name of this column.
    pub fn wire_name(&self) -> &'static str {
        match self {
            Self::Id => "id",
            Self::Name => "name",
            Self::Date => "date",
            Self::StartTime => "from",
            Self::EndTime => "to",
            Self::Street => "street",
            Self::Suburb => "suburb",
            Self::State => "state",
            Self::PostCode => "post-code",
            Self::Description => "description",
            Self::LastUpdate => "last-update",
            Self::Datetime => "datetime",
        }
    }

    /// Whether this column is synthesized rather than stored.
    pub fn is_derived(&self) -> bool {
        matches!(self, Self::Datetime)
    }
}

/// Sort direction, selected by the leading sign of an order clause.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Ascending,
    Descending,
}

/// One `(column, direction)` pair of an order spec.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortKey {
    pub column: Column,
    pub direction: Direction,
}

/// Parses a compact order spec such as `+name,-datetime`.
///
/// Parsing is permissive: a clause without a leading `+`/`-`,
/// or naming an unknown column, is silently skipped rather than rejected.
pub fn parse_order(spec: &str) -> Vec<SortKey> {
    spec.split(',')
        .filter_map(|clause| {
            let clause = clause.trim();
            let (direction, name) = if let Some(rest) = clause.strip_prefix('+') {
                (Direction::Ascending, rest)
            } else if let Some(rest) = clause.strip_prefix('-') {
                (Direction::Descending, rest)
            } else {
                return None;
            };
            Column::from_wire(name).map(|column| SortKey { column, direction })
        })
        .collect()
}

/// Parses a comma-separated projection spec such as `id,name,datetime`.
///
/// Caller order is preserved; unknown names are skipped like malformed
/// order clauses.
pub fn parse_filter(spec: &str) -> Vec<Column> {
    spec.split(',')
        .filter_map(|name| Column::from_wire(name.trim()))
        .collect()
}

fn default_page() -> usize {
    1
}

fn default_page_size() -> usize {
    10
}

fn default_order() -> String {
    "+id".to_string()
}

fn default_filter() -> String {
    "id,name".to_string()
}

/// A listing request: pagination plus the raw order/filter specs.
///
/// The raw spec strings are kept so page links can reconstruct the query
/// exactly as the caller phrased it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListRequest {
    /// 1-based page number.
    #[serde(default = "default_page")]
    pub page: usize,
    /// Rows per page.
    #[serde(default = "default_page_size")]
    pub page_size: usize,
    /// Signed order spec (`+col,-col`).
    #[serde(default = "default_order")]
    pub order: String,
    /// Projection spec (comma-separated column names).
    #[serde(default = "default_filter")]
    pub filter: String,
}

impl Default for ListRequest {
    fn default() -> Self {
        Self {
            page: default_page(),
            page_size: default_page_size(),
            order: default_order(),
            filter: default_filter(),
        }
    }
}

impl ListRequest {
    /// Builder: set the page number.
    pub fn page(mut self, page: usize) -> Self {
        self.page = page;
        self
    }

    /// Builder: set the page size.
    pub fn page_size(mut self, page_size: usize) -> Self {
        self.page_size = page_size;
        self
    }

    /// Builder: set the order spec.
    pub fn order(mut self, order: impl Into<String>) -> Self {
        self.order = order.into();
        self
    }

    /// Builder: set the filter spec.
    pub fn filter(mut self, filter: impl Into<String>) -> Self {
        self.filter = filter.into();
        self
    }
}

/// A single hypermedia reference.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LinkRef {
    pub href: String,
}

impl LinkRef {
    /// Creates a link from an href.
    pub fn new(href: impl Into<String>) -> Self {
        Self { href: href.into() }
    }
}

/// Navigation links for a page. `prev` is null on page 1; `next` is null
/// once `page * page_size` reaches the total.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageLinks {
    #[serde(rename = "self")]
    pub self_link: LinkRef,
    pub prev: Option<LinkRef>,
    pub next: Option<LinkRef>,
}

/// Metadata returned alongside a page of events.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PageMetadata {
    /// Count of all events, unaffected by pagination.
    pub total_events: usize,
    #[serde(rename = "_links")]
    pub links: PageLinks,
    pub page: usize,
    pub page_size: usize,
}

/// A projected event record: only the requested columns, in caller order,
/// plus the `_links` entry.
pub type ProjectedEvent = Map<String, Value>;

/// One page of projected events plus metadata.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventPage {
    pub events: Vec<ProjectedEvent>,
    pub metadata: PageMetadata,
}

/// The canonical detail href for an event.
pub fn event_href(id: i64) -> String {
    format!("/api/events/{id}")
}

fn page_href(request: &ListRequest, page: usize) -> String {
    format!(
        "/api/events?order={}&page={}&page_size={}&filter={}",
        urlencoding::encode(&request.order),
        page,
        request.page_size,
        urlencoding::encode(&request.filter),
    )
}

fn compare_column(a: &Event, b: &Event, column: Column) -> Ordering {
    match column {
        Column::Id => a.id.cmp(&b.id),
        Column::Name => a.name.cmp(&b.name),
        Column::Date => a.date.cmp(&b.date),
        Column::StartTime => a.start_time.cmp(&b.start_time),
        Column::EndTime => a.end_time.cmp(&b.end_time),
        Column::Street => a.location.street.cmp(&b.location.street),
        Column::Suburb => a.location.suburb.cmp(&b.location.suburb),
        Column::State => a.location.state.cmp(&b.location.state),
        Column::PostCode => a.location.post_code.cmp(&b.location.post_code),
        Column::Description => a.description.cmp(&b.description),
        Column::LastUpdate => a.last_update.cmp(&b.last_update),
        // Chronological, not lexicographic over the DD-MM-YYYY form.
        Column::Datetime => (a.date, a.start_time).cmp(&(b.date, b.start_time)),
    }
}

fn compare(a: &Event, b: &Event, keys: &[SortKey]) -> Ordering {
    for key in keys {
        let ordering = match key.direction {
            Direction::Ascending => compare_column(a, b, key.column),
            Direction::Descending => compare_column(a, b, key.column).reverse(),
        };
        if ordering != Ordering::Equal {
            return ordering;
        }
    }
    Ordering::Equal
}

fn project(event: &Event, columns: &[Column]) -> ProjectedEvent {
    let mut fields = Map::new();
    for column in columns {
        let value = match column {
            Column::Id => json!(event.id),
            Column::Name => json!(event.name),
            Column::Date => json!(event.date.to_string()),
            Column::StartTime => json!(event.start_time.to_string()),
            Column::EndTime => json!(event.end_time.to_string()),
            Column::Street => json!(event.location.street),
            Column::Suburb => json!(event.location.suburb),
            Column::State => json!(event.location.state),
            Column::PostCode => json!(event.location.post_code),
            Column::Description => json!(event.description),
            Column::LastUpdate => json!(event.last_update.to_rfc3339()),
            Column::Datetime => json!(format!("{} {}", event.date, event.start_time)),
        };
        fields.insert(column.wire_name().to_string(), value);
    }
    // The id is retained internally even when not projected, so every
    // item can point at its detail resource.
    fields.insert(
        "_links".to_string(),
        json!({ "self": { "href": event_href(event.id) } }),
    );
    fields
}

/// Runs the full list pipeline over the event collection.
///
/// Pagination is a slice of the complete ordered set, so any page is
/// consistent with every other page of the same query. Fails with a
/// validation error when `page` or `page_size` is zero.
pub fn list_events(events: &[Event], request: &ListRequest) -> DomainResult<EventPage> {
    if request.page == 0 {
        return Err(DomainError::validation("page must be >= 1"));
    }
    if request.page_size == 0 {
        return Err(DomainError::validation("page_size must be >= 1"));
    }

    let order = parse_order(&request.order);
    let columns = parse_filter(&request.filter);
    let total_events = events.len();

    let mut sorted: Vec<&Event> = events.iter().collect();
    // Stable sort: ties keep insertion order.
    sorted.sort_by(|a, b| compare(a, b, &order));

    // Pagination arithmetic is on client-supplied numbers; an offset
    // past usize::MAX cannot address anything and is rejected outright.
    let start = (request.page - 1)
        .checked_mul(request.page_size)
        .ok_or_else(|| DomainError::validation("page is out of range"))?;
    let items: Vec<ProjectedEvent> = sorted
        .into_iter()
        .skip(start)
        .take(request.page_size)
        .map(|event| project(event, &columns))
        .collect();

    let prev = (request.page > 1).then(|| LinkRef::new(page_href(request, request.page - 1)));
    let next = request
        .page
        .checked_mul(request.page_size)
        .is_some_and(|end| end < total_events)
        .then(|| LinkRef::new(page_href(request, request.page + 1)));

    Ok(EventPage {
        events: items,
        metadata: PageMetadata {
            total_events,
            links: PageLinks {
                self_link: LinkRef::new(page_href(request, request.page)),
                prev,
                next,
            },
            page: request.page,
            page_size: request.page_size,
        },
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event::{EventDraft, Location};
    use crate::time::{EventDate, TimeOfDay};
    use chrono::Utc;

    fn event(id: i64, name: &str, date: &str, from: &str, to: &str) -> Event {
        EventDraft::new(
            name,
            EventDate::parse(date).unwrap(),
            TimeOfDay::parse(from).unwrap(),
            TimeOfDay::parse(to).unwrap(),
            Location::new("1 George St", "Sydney", "NSW", "2000"),
        )
        .into_event(id, Utc::now())
    }

    fn fixture() -> Vec<Event> {
        vec![
            event(1, "Standup", "10-06-2024", "09:00", "09:30"),
            event(2, "Planning", "09-06-2024", "10:00", "11:00"),
            event(3, "Retro", "02-01-2024", "14:00", "15:00"),
            event(4, "All hands", "01-02-2024", "08:00", "09:00"),
        ]
    }

    fn ids(page: &EventPage) -> Vec<i64> {
        page.events
            .iter()
            .map(|item| item.get("id").and_then(Value::as_i64).unwrap())
            .collect()
    }

    mod column_table {
        use super::*;

        #[test]
        fn wire_names_roundtrip() {
            for (wire, column) in COLUMN_TABLE {
                assert_eq!(Column::from_wire(wire), Some(*column));
                assert_eq!(column.wire_name(), *wire);
            }
        }

        #[test]
        fn hyphenated_wire_vocabulary() {
            assert_eq!(Column::from_wire("from"), Some(Column::StartTime));
            assert_eq!(Column::from_wire("to"), Some(Column::EndTime));
            assert_eq!(Column::from_wire("post-code"), Some(Column::PostCode));
            assert_eq!(Column::from_wire("last-update"), Some(Column::LastUpdate));
            assert_eq!(Column::from_wire("start_time"), None);
        }

        #[test]
        fn datetime_is_derived() {
            assert!(Column::Datetime.is_derived());
            assert!(!Column::Date.is_derived());
        }
    }

    mod order_parsing {
        use super::*;

        #[test]
        fn signed_clauses() {
            let keys = parse_order("+name,-datetime");
            assert_eq!(
                keys,
                vec![
                    SortKey {
                        column: Column::Name,
                        direction: Direction::Ascending
                    },
                    SortKey {
                        column: Column::Datetime,
                        direction: Direction::Descending
                    },
                ]
            );
        }

        #[test]
        fn unsigned_clause_is_skipped() {
            assert_eq!(parse_order("name"), vec![]);
            let keys = parse_order("name,+id");
            assert_eq!(keys.len(), 1);
            assert_eq!(keys[0].column, Column::Id);
        }

        #[test]
        fn unknown_column_is_skipped() {
            assert_eq!(parse_order("+bogus"), vec![]);
            assert_eq!(parse_order("*name,+name").len(), 1);
        }

        #[test]
        fn empty_spec() {
            assert_eq!(parse_order(""), vec![]);
        }
    }

    mod filter_parsing {
        use super::*;

        #[test]
        fn preserves_caller_order() {
            assert_eq!(
                parse_filter("name,id,datetime"),
                vec![Column::Name, Column::Id, Column::Datetime]
            );
        }

        #[test]
        fn skips_unknown_names() {
            assert_eq!(parse_filter("id,bogus,name"), vec![Column::Id, Column::Name]);
        }
    }

    mod sorting {
        use super::*;

        #[test]
        fn ascending_and_descending_are_reversed() {
            let events = fixture();
            let asc = list_events(&events, &ListRequest::default().order("+name")).unwrap();
            let desc = list_events(&events, &ListRequest::default().order("-name")).unwrap();

            let mut reversed = ids(&asc);
            reversed.reverse();
            assert_eq!(ids(&desc), reversed);
        }

        #[test]
        fn datetime_orders_chronologically() {
            // Lexicographic DD-MM-YYYY would sort 01-02-2024 before
            // 02-01-2024; chronological order is the other way round.
            let events = fixture();
            let page = list_events(
                &events,
                &ListRequest::default().order("+datetime").filter("id,datetime"),
            )
            .unwrap();
            assert_eq!(ids(&page), vec![3, 4, 2, 1]);
        }

        #[test]
        fn multi_key_sort() {
            let events = vec![
                event(1, "Standup", "10-06-2024", "09:00", "09:30"),
                event(2, "Standup", "09-06-2024", "09:00", "09:30"),
                event(3, "Planning", "11-06-2024", "09:00", "09:30"),
            ];
            let page =
                list_events(&events, &ListRequest::default().order("+name,-date")).unwrap();
            assert_eq!(ids(&page), vec![3, 1, 2]);
        }

        #[test]
        fn no_order_keeps_insertion_order() {
            let events = fixture();
            let page = list_events(&events, &ListRequest::default().order("")).unwrap();
            assert_eq!(ids(&page), vec![1, 2, 3, 4]);
        }
    }

    mod projection {
        use super::*;

        #[test]
        fn only_requested_columns_plus_links() {
            let events = fixture();
            let page =
                list_events(&events, &ListRequest::default().filter("name,date")).unwrap();
            let item = &page.events[0];

            let keys: Vec<&String> = item.keys().collect();
            assert_eq!(keys, vec!["name", "date", "_links"]);
        }

        #[test]
        fn caller_field_order_is_preserved() {
            let events = fixture();
            let page =
                list_events(&events, &ListRequest::default().filter("date,id,name")).unwrap();
            let keys: Vec<&String> = page.events[0].keys().collect();
            assert_eq!(keys, vec!["date", "id", "name", "_links"]);
        }

        #[test]
        fn datetime_combines_date_and_start_time() {
            let events = fixture();
            let page = list_events(
                &events,
                &ListRequest::default().order("+id").filter("id,datetime"),
            )
            .unwrap();
            assert_eq!(
                page.events[0].get("datetime").and_then(Value::as_str),
                Some("10-06-2024 09:00")
            );
        }

        #[test]
        fn links_built_without_requesting_id() {
            let events = fixture();
            let page = list_events(&events, &ListRequest::default().filter("name")).unwrap();
            let item = &page.events[0];

            assert!(item.get("id").is_none());
            assert_eq!(
                item.get("_links")
                    .and_then(|links| links.pointer("/self/href"))
                    .and_then(Value::as_str),
                Some("/api/events/1")
            );
        }

        #[test]
        fn wire_names_in_output() {
            let events = fixture();
            let page = list_events(
                &events,
                &ListRequest::default().filter("from,to,post-code"),
            )
            .unwrap();
            let item = &page.events[0];
            assert_eq!(item.get("from").and_then(Value::as_str), Some("09:00"));
            assert_eq!(item.get("to").and_then(Value::as_str), Some("09:30"));
            assert_eq!(item.get("post-code").and_then(Value::as_str), Some("2000"));
        }
    }

    mod pagination {
        use super::*;

        #[test]
        fn item_counts_per_page() {
            let events = fixture();
            for (page, expected) in [(1, 3), (2, 1), (3, 0)] {
                let result = list_events(
                    &events,
                    &ListRequest::default().page(page).page_size(3),
                )
                .unwrap();
                assert_eq!(result.events.len(), expected, "page {page}");
                assert_eq!(result.metadata.total_events, 4);
            }
        }

        #[test]
        fn concatenated_pages_reproduce_the_full_set() {
            let events = fixture();
            let mut seen = Vec::new();
            for page in 1..=2 {
                let result = list_events(
                    &events,
                    &ListRequest::default().page(page).page_size(2).order("+name"),
                )
                .unwrap();
                seen.extend(ids(&result));
            }

            let full =
                list_events(&events, &ListRequest::default().order("+name")).unwrap();
            assert_eq!(seen, ids(&full));
        }

        #[test]
        fn oversized_page_number_is_rejected() {
            // The page offset must never wrap; a number this large is a
            // validation error, not a panic or a bogus empty page.
            let result = list_events(
                &[],
                &ListRequest::default().page(usize::MAX).page_size(2),
            );
            assert!(matches!(result, Err(DomainError::Validation(_))));
        }

        #[test]
        fn page_end_past_usize_max_has_no_next() {
            // (page - 1) * page_size still fits here but page * page_size
            // does not; an end marker past usize::MAX means there is
            // nothing further, never a phantom next link.
            let page = list_events(
                &[],
                &ListRequest::default().page(usize::MAX / 2 + 1).page_size(2),
            )
            .unwrap();
            assert!(page.events.is_empty());
            assert!(page.metadata.links.next.is_none());
        }

        #[test]
        fn prev_absent_exactly_on_page_one() {
            let events = fixture();
            let first =
                list_events(&events, &ListRequest::default().page(1).page_size(2)).unwrap();
            assert!(first.metadata.links.prev.is_none());

            let second =
                list_events(&events, &ListRequest::default().page(2).page_size(2)).unwrap();
            assert!(second.metadata.links.prev.is_some());
        }

        #[test]
        fn next_absent_once_page_reaches_total() {
            let events = fixture();
            // 4 events, page_size 2: page 1 has next, page 2 does not.
            let first =
                list_events(&events, &ListRequest::default().page(1).page_size(2)).unwrap();
            assert!(first.metadata.links.next.is_some());

            let last =
                list_events(&events, &ListRequest::default().page(2).page_size(2)).unwrap();
            assert!(last.metadata.links.next.is_none());
        }

        #[test]
        fn links_reconstruct_the_query() {
            let events = fixture();
            let request = ListRequest::default()
                .page(2)
                .page_size(1)
                .order("+name,-datetime")
                .filter("id,name");
            let page = list_events(&events, &request).unwrap();

            assert_eq!(
                page.metadata.links.self_link.href,
                "/api/events?order=%2Bname%2C-datetime&page=2&page_size=1&filter=id%2Cname"
            );
            assert!(page.metadata.links.prev.as_ref().unwrap().href.contains("page=1"));
            assert!(page.metadata.links.next.as_ref().unwrap().href.contains("page=3"));
        }

        #[test]
        fn zero_page_is_rejected() {
            let events = fixture();
            assert!(matches!(
                list_events(&events, &ListRequest::default().page(0)),
                Err(DomainError::Validation(_))
            ));
            assert!(matches!(
                list_events(&events, &ListRequest::default().page_size(0)),
                Err(DomainError::Validation(_))
            ));
        }
    }
}
