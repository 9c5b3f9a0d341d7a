use crate::commands::{CmdResult, PageInfo};
use crate::error::Result;
use crate::model::{value_as_text, Record, RecordId, Section};
use crate::store::{Bucket, DataStore};
use serde_json::Value;
use std::cmp::Ordering;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    #[default]
    Newest,
    Oldest,
}

/// Filter, search and pagination for a section listing.
#[derive(Debug, Clone)]
pub struct RecordQuery {
    /// Field equality matches. Values compare as text, so `"5"` matches `5`.
    pub filters: Vec<(String, String)>,
    pub category: Option<String>,
    /// Case-insensitive substring over every string content field.
    pub search: Option<String>,
    pub sort: SortOrder,
    /// 1-based; 0 is treated as 1.
    pub page: usize,
    /// `None` falls back to the caller's default; `Some(0)` lists everything.
    pub per_page: Option<usize>,
}

impl Default for RecordQuery {
    fn default() -> Self {
        Self {
            filters: Vec::new(),
            category: None,
            search: None,
            sort: SortOrder::Newest,
            page: 1,
            per_page: None,
        }
    }
}

impl RecordQuery {
    pub fn matches(&self, record: &Record) -> bool {
        if let Some(category) = &self.category {
            if record.field_str("category") != Some(category.as_str()) {
                return false;
            }
        }

        let filters_ok = self.filters.iter().all(|(key, wanted)| {
            record
                .fields
                .get(key)
                .and_then(value_as_text)
                .is_some_and(|actual| &actual == wanted)
        });
        if !filters_ok {
            return false;
        }

        match self.search.as_deref().map(str::trim) {
            Some(term) if !term.is_empty() => {
                let needle = term.to_lowercase();
                record
                    .fields
                    .values()
                    .filter_map(Value::as_str)
                    .any(|text| text.to_lowercase().contains(&needle))
            }
            _ => true,
        }
    }
}

/// Sort key: the summary date, then `updatedAt`.
fn compare_records(a: &Record, b: &Record) -> Ordering {
    let (sa, sb) = (a.summary(), b.summary());
    sa.date
        .cmp(&sb.date)
        .then_with(|| a.updated_at.cmp(&b.updated_at))
}

/// Slices `items` to the requested page.
pub fn paginate<T>(items: Vec<T>, page: usize, per_page: usize) -> (Vec<T>, PageInfo) {
    let total = items.len();
    let page = page.max(1);

    if per_page == 0 {
        let info = PageInfo {
            total,
            page: 1,
            per_page: 0,
            total_pages: 1,
        };
        return (items, info);
    }

    let total_pages = total.div_ceil(per_page).max(1);
    let start = (page - 1).saturating_mul(per_page);
    let slice = items.into_iter().skip(start).take(per_page).collect();
    let info = PageInfo {
        total,
        page,
        per_page,
        total_pages,
    };
    (slice, info)
}

/// A single active record.
pub fn run<S: DataStore>(store: &S, section: Section, id: &RecordId) -> Result<CmdResult> {
    let record = store.get_record(section, Bucket::Active, id)?;
    Ok(CmdResult::default().with_listed_records(vec![record]))
}

/// Active records matching `query`, sorted and paged.
pub fn run_query<S: DataStore>(
    store: &S,
    section: Section,
    query: &RecordQuery,
    default_per_page: usize,
) -> Result<CmdResult> {
    let mut records: Vec<Record> = store
        .list_records(section, Bucket::Active)?
        .into_iter()
        .filter(|record| query.matches(record))
        .collect();

    records.sort_by(compare_records);
    if query.sort == SortOrder::Newest {
        records.reverse();
    }

    let per_page = query.per_page.unwrap_or(default_per_page);
    let (items, info) = paginate(records, query.page, per_page);
    tracing::debug!(%section, total = info.total, page = info.page, "query");
    Ok(CmdResult::default()
        .with_listed_records(items)
        .with_page(info))
}

/// Every active record in master order.
pub fn run_all<S: DataStore>(store: &S, section: Section) -> Result<CmdResult> {
    Ok(CmdResult::default().with_listed_records(store.list_records(section, Bucket::Active)?))
}

/// The section's master index as stored.
pub fn run_master<S: DataStore>(store: &S, section: Section) -> Result<CmdResult> {
    Ok(CmdResult::default().with_summaries(store.master(section)?))
}

/// Soft-deleted records, most recently deleted first.
pub fn run_list_deleted<S: DataStore>(store: &S, section: Section) -> Result<CmdResult> {
    let mut records = store.list_records(section, Bucket::Deleted)?;
    records.sort_by(|a, b| b.deleted_at.cmp(&a.deleted_at));
    Ok(CmdResult::default().with_listed_records(records))
}
