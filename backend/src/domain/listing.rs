//! Generic list contract: filtering, sorting, projection and pagination.
//!
//! Query parameters arrive as raw key/value pairs. Reserved keys (`select`,
//! `sort`, `page`, `limit`) shape the response; every other key is a field
//! filter written as `field=value` or `field[op]=value` with
//! `op ∈ {gt, gte, lt, lte, in}`. Field names are checked against the
//! entity's [`Listable::FIELDS`] when the query is applied.

use std::cmp::Ordering;

use chrono::{DateTime, Utc};
use serde::Serialize;

use super::Error;

/// Default page size.
pub const DEFAULT_LIMIT: usize = 25;
/// Largest page size a client may request.
pub const MAX_LIMIT: usize = 100;
const DEFAULT_SORT: &str = "-createdAt";

/// Comparable view of one entity field.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Text(String),
    Number(f64),
    Bool(bool),
    List(Vec<String>),
    Timestamp(DateTime<Utc>),
}

/// Entities that take part in the list contract.
pub trait Listable {
    /// Field names accepted in filters, `sort` and `select`.
    const FIELDS: &'static [&'static str];

    /// Current value of `name`, or `None` when unset.
    fn field(&self, name: &str) -> Option<FieldValue>;
}

/// Filter comparison operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FilterOp {
    Eq,
    Gt,
    Gte,
    Lt,
    Lte,
    In,
}

impl FilterOp {
    fn parse(raw: &str) -> Option<Self> {
        match raw {
            "gt" => Some(Self::Gt),
            "gte" => Some(Self::Gte),
            "lt" => Some(Self::Lt),
            "lte" => Some(Self::Lte),
            "in" => Some(Self::In),
            _ => None,
        }
    }

    fn accepts(self, ordering: Ordering) -> bool {
        match self {
            Self::Eq | Self::In => ordering == Ordering::Equal,
            Self::Gt => ordering == Ordering::Greater,
            Self::Gte => ordering != Ordering::Less,
            Self::Lt => ordering == Ordering::Less,
            Self::Lte => ordering != Ordering::Greater,
        }
    }

    fn is_ordering(self) -> bool {
        matches!(self, Self::Gt | Self::Gte | Self::Lt | Self::Lte)
    }
}

/// One `field[op]=value` constraint.
#[derive(Debug, Clone, PartialEq)]
pub struct Filter {
    pub field: String,
    pub op: FilterOp,
    pub values: Vec<String>,
}

/// One sort key; `descending` when written with a leading `-`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortKey {
    pub field: String,
    pub descending: bool,
}

/// Parsed list query.
#[derive(Debug, Clone, PartialEq)]
pub struct ListQuery {
    filters: Vec<Filter>,
    select: Option<Vec<String>>,
    sort: Vec<SortKey>,
    page: usize,
    limit: usize,
}

impl Default for ListQuery {
    fn default() -> Self {
        Self {
            filters: Vec::new(),
            select: None,
            sort: parse_sort(DEFAULT_SORT),
            page: 1,
            limit: DEFAULT_LIMIT,
        }
    }
}

/// Reference to a neighbouring page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PageRef {
    pub page: usize,
    pub limit: usize,
}

/// Links to the neighbouring pages, when they exist.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Pagination {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next: Option<PageRef>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub prev: Option<PageRef>,
}

/// One page of results.
#[derive(Debug, Clone, PartialEq)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub pagination: Pagination,
}

impl<T> Page<T> {
    /// Transform every item, keeping pagination.
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            pagination: self.pagination,
        }
    }
}

impl ListQuery {
    /// Parse raw query pairs.
    ///
    /// # Examples
    /// ```
    /// use devcamper::domain::ListQuery;
    ///
    /// let query = ListQuery::parse([
    ///     ("averageCost[lte]".to_owned(), "10000".to_owned()),
    ///     ("select".to_owned(), "name,description".to_owned()),
    ///     ("page".to_owned(), "2".to_owned()),
    /// ])
    /// .unwrap();
    /// assert_eq!(query.page(), 2);
    /// assert_eq!(query.select(), Some(&["name".to_owned(), "description".to_owned()][..]));
    /// ```
    pub fn parse<I>(pairs: I) -> Result<Self, Error>
    where
        I: IntoIterator<Item = (String, String)>,
    {
        let mut query = Self::default();
        for (key, value) in pairs {
            match key.as_str() {
                "select" => query.select = Some(split_list(&value)),
                "sort" => {
                    let keys = parse_sort(&value);
                    if !keys.is_empty() {
                        query.sort = keys;
                    }
                }
                "page" => query.page = parse_positive(&value, "page")?,
                "limit" => query.limit = parse_positive(&value, "limit")?.min(MAX_LIMIT),
                _ => query.filters.push(parse_filter(&key, value)?),
            }
        }
        Ok(query)
    }

    /// Requested page number, starting at 1.
    pub fn page(&self) -> usize {
        self.page
    }

    /// Requested page size.
    pub fn limit(&self) -> usize {
        self.limit
    }

    /// Requested projection, if any.
    pub fn select(&self) -> Option<&[String]> {
        self.select.as_deref()
    }

    /// Field filters in request order.
    pub fn filters(&self) -> &[Filter] {
        &self.filters
    }

    /// Filter, sort and paginate `items`.
    pub fn apply<T: Listable>(&self, items: Vec<T>) -> Result<Page<T>, Error> {
        self.check_fields::<T>()?;

        let mut matched = Vec::with_capacity(items.len());
        for item in items {
            if self.matches(&item)? {
                matched.push(item);
            }
        }
        matched.sort_by(|a, b| self.compare(a, b));

        let total = matched.len();
        let start = (self.page - 1).saturating_mul(self.limit);
        let end = start.saturating_add(self.limit);
        let pagination = Pagination {
            next: (end < total).then(|| PageRef {
                page: self.page.saturating_add(1),
                limit: self.limit,
            }),
            prev: (start > 0).then(|| PageRef {
                page: self.page.saturating_sub(1),
                limit: self.limit,
            }),
        };
        let items = matched.into_iter().skip(start).take(self.limit).collect();
        Ok(Page { items, pagination })
    }

    fn check_fields<T: Listable>(&self) -> Result<(), Error> {
        let known = |name: &str| T::FIELDS.contains(&name);
        let named = self
            .filters
            .iter()
            .map(|filter| filter.field.as_str())
            .chain(self.sort.iter().map(|key| key.field.as_str()))
            .chain(self.select.iter().flatten().map(String::as_str));
        for name in named {
            if !known(name) {
                return Err(Error::invalid_request(format!("Unknown field `{name}`")));
            }
        }
        Ok(())
    }

    fn matches<T: Listable>(&self, item: &T) -> Result<bool, Error> {
        for filter in &self.filters {
            let Some(value) = item.field(&filter.field) else {
                return Ok(false);
            };
            if !value.satisfies(filter)? {
                return Ok(false);
            }
        }
        Ok(true)
    }

    fn compare<T: Listable>(&self, a: &T, b: &T) -> Ordering {
        for key in &self.sort {
            let ordering = match (a.field(&key.field), b.field(&key.field)) {
                (Some(left), Some(right)) => {
                    let ordering = left.compare(&right).unwrap_or(Ordering::Equal);
                    if key.descending {
                        ordering.reverse()
                    } else {
                        ordering
                    }
                }
                // Unset values sort last in either direction.
                (Some(_), None) => Ordering::Less,
                (None, Some(_)) => Ordering::Greater,
                (None, None) => Ordering::Equal,
            };
            if ordering != Ordering::Equal {
                return ordering;
            }
        }
        Ordering::Equal
    }
}

impl FieldValue {
    fn compare(&self, other: &Self) -> Option<Ordering> {
        match (self, other) {
            (Self::Text(a), Self::Text(b)) => Some(a.cmp(b)),
            (Self::Number(a), Self::Number(b)) => a.partial_cmp(b),
            (Self::Bool(a), Self::Bool(b)) => Some(a.cmp(b)),
            (Self::Timestamp(a), Self::Timestamp(b)) => Some(a.cmp(b)),
            (Self::List(a), Self::List(b)) => Some(a.cmp(b)),
            _ => None,
        }
    }

    fn satisfies(&self, filter: &Filter) -> Result<bool, Error> {
        if let Self::List(items) = self {
            if filter.op.is_ordering() {
                return Err(unsupported_operator(filter));
            }
            return Ok(filter.values.iter().any(|value| items.contains(value)));
        }
        if matches!(self, Self::Bool(_)) && filter.op.is_ordering() {
            return Err(unsupported_operator(filter));
        }

        for raw in &filter.values {
            let expected = self.parse_like(raw).ok_or_else(|| {
                Error::invalid_request(format!("Invalid value `{raw}` for field `{}`", filter.field))
            })?;
            let accepted = self
                .compare(&expected)
                .is_some_and(|ordering| filter.op.accepts(ordering));
            if accepted {
                return Ok(true);
            }
        }
        Ok(false)
    }

    fn parse_like(&self, raw: &str) -> Option<Self> {
        match self {
            Self::Text(_) => Some(Self::Text(raw.to_owned())),
            Self::Number(_) => raw.trim().parse::<f64>().ok().filter(|n| n.is_finite()).map(Self::Number),
            Self::Bool(_) => raw.trim().parse::<bool>().ok().map(Self::Bool),
            Self::Timestamp(_) => DateTime::parse_from_rfc3339(raw.trim())
                .ok()
                .map(|ts| Self::Timestamp(ts.with_timezone(&Utc))),
            Self::List(_) => Some(Self::List(vec![raw.to_owned()])),
        }
    }
}

fn unsupported_operator(filter: &Filter) -> Error {
    Error::invalid_request(format!(
        "Operator {:?} is not supported for field `{}`",
        filter.op, filter.field
    ))
}

fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(str::to_owned)
        .collect()
}

fn parse_sort(raw: &str) -> Vec<SortKey> {
    split_list(raw)
        .into_iter()
        .map(|key| match key.strip_prefix('-') {
            Some(field) => SortKey {
                field: field.to_owned(),
                descending: true,
            },
            None => SortKey {
                field: key,
                descending: false,
            },
        })
        .collect()
}

fn parse_positive(raw: &str, name: &str) -> Result<usize, Error> {
    raw.trim()
        .parse::<usize>()
        .ok()
        .filter(|value| *value > 0)
        .ok_or_else(|| Error::invalid_request(format!("{name} must be a positive integer")))
}

fn parse_filter(key: &str, value: String) -> Result<Filter, Error> {
    let (field, op) = match key.split_once('[') {
        Some((field, rest)) => {
            let op_name = rest.strip_suffix(']').unwrap_or(rest);
            let op = FilterOp::parse(op_name).ok_or_else(|| {
                Error::invalid_request(format!("Unknown filter operator `{op_name}`"))
            })?;
            (field, op)
        }
        None => (key, FilterOp::Eq),
    };
    let values = match op {
        FilterOp::In => split_list(&value),
        _ => vec![value],
    };
    Ok(Filter {
        field: field.to_owned(),
        op,
        values,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::ErrorCode;
    use chrono::TimeZone;
    use rstest::{fixture, rstest};

    #[derive(Debug, Clone, PartialEq)]
    struct Item {
        name: &'static str,
        cost: Option<f64>,
        tags: Vec<String>,
        housing: bool,
        created: i64,
    }

    impl Listable for Item {
        const FIELDS: &'static [&'static str] = &["name", "cost", "tags", "housing", "createdAt"];

        fn field(&self, name: &str) -> Option<FieldValue> {
            match name {
                "name" => Some(FieldValue::Text(self.name.to_owned())),
                "cost" => self.cost.map(FieldValue::Number),
                "tags" => Some(FieldValue::List(self.tags.clone())),
                "housing" => Some(FieldValue::Bool(self.housing)),
                "createdAt" => Utc
                    .timestamp_opt(self.created, 0)
                    .single()
                    .map(FieldValue::Timestamp),
                _ => None,
            }
        }
    }

    fn item(name: &'static str, cost: Option<f64>, tags: &[&str], created: i64) -> Item {
        Item {
            name,
            cost,
            tags: tags.iter().map(|tag| (*tag).to_owned()).collect(),
            housing: cost.is_some(),
            created,
        }
    }

    #[fixture]
    fn items() -> Vec<Item> {
        vec![
            item("alpha", Some(8000.0), &["Web Development", "UI/UX"], 1),
            item("bravo", Some(12000.0), &["Data Science"], 2),
            item("charlie", None, &["Business"], 3),
            item("delta", Some(10000.0), &["Web Development"], 4),
        ]
    }

    fn query(pairs: &[(&str, &str)]) -> ListQuery {
        ListQuery::parse(
            pairs
                .iter()
                .map(|(k, v)| ((*k).to_owned(), (*v).to_owned())),
        )
        .expect("query parses")
    }

    fn names(page: &Page<Item>) -> Vec<&'static str> {
        page.items.iter().map(|item| item.name).collect()
    }

    #[rstest]
    fn defaults_sort_newest_first(items: Vec<Item>) {
        let page = ListQuery::default().apply(items).expect("applies");
        assert_eq!(names(&page), vec!["delta", "charlie", "bravo", "alpha"]);
        assert_eq!(page.pagination, Pagination::default());
    }

    #[rstest]
    fn lte_filter_excludes_unset_values(items: Vec<Item>) {
        let page = query(&[("cost[lte]", "10000"), ("sort", "name")])
            .apply(items)
            .expect("applies");
        assert_eq!(names(&page), vec!["alpha", "delta"]);
    }

    #[rstest]
    fn list_fields_match_membership(items: Vec<Item>) {
        let page = query(&[("tags[in]", "Business,UI/UX"), ("sort", "name")])
            .apply(items)
            .expect("applies");
        assert_eq!(names(&page), vec!["alpha", "charlie"]);
    }

    #[rstest]
    fn equality_on_bool_field(items: Vec<Item>) {
        let page = query(&[("housing", "false")]).apply(items).expect("applies");
        assert_eq!(names(&page), vec!["charlie"]);
    }

    #[rstest]
    fn paginates_with_links(items: Vec<Item>) {
        let page = query(&[("page", "2"), ("limit", "1"), ("sort", "name")])
            .apply(items)
            .expect("applies");
        assert_eq!(names(&page), vec!["bravo"]);
        assert_eq!(page.pagination.next, Some(PageRef { page: 3, limit: 1 }));
        assert_eq!(page.pagination.prev, Some(PageRef { page: 1, limit: 1 }));
    }

    #[rstest]
    fn huge_page_numbers_yield_an_empty_page(items: Vec<Item>) {
        let max = usize::MAX.to_string();
        let page = query(&[("page", max.as_str()), ("limit", "25")])
            .apply(items)
            .expect("applies");
        assert!(page.items.is_empty());
        assert_eq!(page.pagination.next, None);
        assert_eq!(
            page.pagination.prev,
            Some(PageRef {
                page: usize::MAX - 1,
                limit: 25
            })
        );
    }

    #[rstest]
    fn limit_is_capped() {
        assert_eq!(query(&[("limit", "1000")]).limit(), MAX_LIMIT);
    }

    #[rstest]
    #[case("page", "0")]
    #[case("page", "two")]
    #[case("limit", "-1")]
    #[case("cost[between]", "1")]
    fn rejects_malformed_parameters(#[case] key: &str, #[case] value: &str) {
        let err = ListQuery::parse([(key.to_owned(), value.to_owned())])
            .expect_err("malformed parameter");
        assert_eq!(err.code(), ErrorCode::InvalidRequest);
    }

    #[rstest]
    #[case(&[("password", "x")])]
    #[case(&[("sort", "-secret")])]
    #[case(&[("select", "name,secret")])]
    #[case(&[("cost[gt]", "cheap")])]
    #[case(&[("tags[gt]", "a")])]
    fn rejects_unknown_fields_and_bad_values(items: Vec<Item>, #[case] pairs: &[(&str, &str)]) {
        let err = query(pairs).apply(items).expect_err("rejected");
        assert_eq!(err.code(), ErrorCode::InvalidRequest);
    }
}
