// src/notion/post_mapper.rs
// Normalizes one backend record into the canonical post shapes. Property
// naming is not consistent across collections, so every field resolves
// through a fallback chain: the first populated property wins.

use chrono::{DateTime, NaiveDate, Utc};
use serde_json::{Map, Value};

use crate::notion::types::Page;
use crate::types::{Post, PostDetail, Source};

/// Map a datasource record to a feed entry.
pub fn map_page_to_post(page: &Page) -> Post {
    let props = &page.properties;

    let title = first_populated(props, &["title", "Title", "Name"])
        .and_then(title_text)
        .unwrap_or_else(|| "Untitled".to_string());

    let excerpt = first_populated(props, &["excerpt", "Excerpt", "Description"])
        .and_then(rich_text_value)
        .unwrap_or_default();

    let date = resolve_date(props, page.created_time.as_deref());

    let tags = first_populated(props, &["tags", "Tags", "Category"])
        .map(multi_select_names)
        .unwrap_or_default();

    let slug = first_populated(props, &["slug", "Slug"])
        .and_then(rich_text_value)
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| page.id.clone());

    let source = Source::Notion;
    Post {
        title,
        excerpt,
        date,
        tags,
        href: format!("/posts/{slug}"),
        source,
        is_external: source.is_external(),
    }
}

/// Map a datasource record plus its converted HTML to a detail record.
pub fn map_page_to_detail(page: &Page, content: String) -> PostDetail {
    let props = &page.properties;

    let title = first_populated(props, &["title", "Title", "Name"])
        .and_then(title_text)
        .unwrap_or_else(|| "Untitled".to_string());

    let created_time = page
        .created_time
        .as_deref()
        .and_then(parse_day)
        .unwrap_or_else(today);
    let last_edited_time = page
        .last_edited_time
        .as_deref()
        .and_then(parse_day)
        .unwrap_or(created_time);

    let tags = first_populated(props, &["tags", "Tags", "Category"])
        .map(multi_select_names)
        .unwrap_or_default();

    PostDetail {
        id: page.id.clone(),
        title,
        content,
        tags,
        created_time,
        last_edited_time,
    }
}

/// First key that is present and non-null.
fn first_populated<'a>(props: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a Value> {
    keys.iter()
        .filter_map(|key| props.get(*key))
        .find(|value| !value.is_null())
}

/// `{ "title": [ { "plain_text": ... } ] }`, empty text treated as unset.
fn title_text(value: &Value) -> Option<String> {
    value
        .get("title")
        .and_then(|runs| runs.get(0))
        .and_then(|run| run.get("plain_text"))
        .and_then(Value::as_str)
        .filter(|text| !text.is_empty())
        .map(str::to_string)
}

/// `{ "rich_text": [ { "plain_text": ... } ] }`.
fn rich_text_value(value: &Value) -> Option<String> {
    value
        .get("rich_text")
        .and_then(|runs| runs.get(0))
        .and_then(|run| run.get("plain_text"))
        .and_then(Value::as_str)
        .map(str::to_string)
}

fn multi_select_names(value: &Value) -> Vec<String> {
    value
        .get("multi_select")
        .and_then(Value::as_array)
        .map(|tags| {
            tags.iter()
                .filter_map(|tag| tag.get("name").and_then(Value::as_str))
                .map(str::to_string)
                .collect()
        })
        .unwrap_or_default()
}

/// Date fallback chain: a date-ish property, then the record's own creation
/// timestamp, then "now". A date property carries `{ "date": { "start" } }`;
/// the creation timestamp is a raw ISO string.
fn resolve_date(props: &Map<String, Value>, created_time: Option<&str>) -> NaiveDate {
    if let Some(prop) = first_populated(props, &["date", "Date", "created_time"]) {
        return prop
            .get("date")
            .and_then(|d| d.get("start"))
            .and_then(Value::as_str)
            .and_then(parse_day)
            .unwrap_or_else(today);
    }
    created_time.and_then(parse_day).unwrap_or_else(today)
}

/// Truncate any ISO-ish timestamp to calendar-day precision.
pub(crate) fn parse_day(raw: &str) -> Option<NaiveDate> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.date_naive());
    }
    let day_part = raw.get(..10)?;
    NaiveDate::parse_from_str(day_part, "%Y-%m-%d").ok()
}

fn today() -> NaiveDate {
    Utc::now().date_naive()
}
