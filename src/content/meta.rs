use chrono::{DateTime, Local, NaiveDate, NaiveDateTime, TimeZone};
use lazy_static::lazy_static;
use regex::Regex;
use std::fs;
use std::path::Path;

lazy_static! {
    static ref META_BLOCK_RE: Regex =
        Regex::new(r#"(?s)<div class="article-meta hidden">(.*?)</div>"#).unwrap();
    static ref META_FIELD_RE: Regex =
        Regex::new(r#"name="(?P<key>[a-zA-Z]+)"\s+content="(?P<value>[^"]+)""#).unwrap();
}

/// Metadata embedded in an article's hidden meta container.
///
/// Every field is optional; unknown keys are ignored and a missing
/// container yields an empty record.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ArticleMeta {
    pub author: Option<String>,
    pub date: Option<String>,
    pub banner: Option<String>,
    pub subtitle: Option<String>,
    pub last_modified: Option<String>,
}

impl ArticleMeta {
    /// Pulls the meta container out of a raw article and returns the
    /// parsed record together with the body, container removed.
    pub fn extract(raw: &str) -> (ArticleMeta, String) {
        let mut meta = ArticleMeta::default();
        let body = match META_BLOCK_RE.captures(raw) {
            Some(caps) => {
                meta.parse_fields(caps.get(1).map_or("", |m| m.as_str()));
                META_BLOCK_RE.replace(raw, "").into_owned()
            }
            None => raw.to_string(),
        };
        (meta, body)
    }

    fn parse_fields(&mut self, block: &str) {
        for caps in META_FIELD_RE.captures_iter(block) {
            let value = caps["value"].to_string();
            // first occurrence of a key wins
            let slot = match &caps["key"] {
                "author" => &mut self.author,
                "date" => &mut self.date,
                "banner" => &mut self.banner,
                "subtitle" => &mut self.subtitle,
                "lastModified" => &mut self.last_modified,
                _ => continue,
            };
            if slot.is_none() {
                *slot = Some(value);
            }
        }
    }

    pub fn parse_date(&self) -> Option<DateTime<Local>> {
        self.date.as_deref().and_then(parse_date_string)
    }

    pub fn parse_last_modified(&self) -> Option<DateTime<Local>> {
        self.last_modified.as_deref().and_then(parse_date_string)
    }
}

/// An article is published once its date is no longer in the future.
/// The loader and the sitemap share this predicate so a listed article
/// is always a reachable one.
pub fn is_published(date: &DateTime<Local>, now: &DateTime<Local>) -> bool {
    date <= now
}

/// Publication date used everywhere an article needs one: the declared
/// date, else the file's mtime, else the current time.
pub fn effective_date(meta: &ArticleMeta, path: &Path) -> DateTime<Local> {
    meta.parse_date()
        .or_else(|| file_mtime(path))
        .unwrap_or_else(Local::now)
}

pub fn file_mtime(path: &Path) -> Option<DateTime<Local>> {
    let modified = fs::metadata(path).ok()?.modified().ok()?;
    Some(DateTime::<Local>::from(modified))
}

pub fn parse_date_string(value: &str) -> Option<DateTime<Local>> {
    let value = value.trim();
    for format in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(value, format) {
            return local_from_naive(dt);
        }
    }
    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        return local_from_naive(date.and_hms_opt(0, 0, 0)?);
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Local));
    }
    None
}

fn local_from_naive(dt: NaiveDateTime) -> Option<DateTime<Local>> {
    match Local.from_local_datetime(&dt) {
        chrono::LocalResult::Single(dt) => Some(dt),
        chrono::LocalResult::Ambiguous(dt, _) => Some(dt),
        chrono::LocalResult::None => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Datelike, Duration, Timelike};

    const ARTICLE: &str = r#"<div class="article-meta hidden">
  <meta name="author" content="A. Zig">
  <meta name="date" content="2024-01-01">
  <meta name="banner" content="/images/ignition.webp">
  <meta name="subtitle" content="Premier allumage">
</div>
<h1>Ignition</h1>
<p>Le moteur s'allume.</p>"#;

    #[test]
    fn test_extract_all_fields() {
        let (meta, body) = ArticleMeta::extract(ARTICLE);
        assert_eq!(meta.author.as_deref(), Some("A. Zig"));
        assert_eq!(meta.date.as_deref(), Some("2024-01-01"));
        assert_eq!(meta.banner.as_deref(), Some("/images/ignition.webp"));
        assert_eq!(meta.subtitle.as_deref(), Some("Premier allumage"));
        assert_eq!(meta.last_modified, None);
        assert!(!body.contains("article-meta"));
        assert!(body.contains("<h1>Ignition</h1>"));
    }

    #[test]
    fn test_extract_partial_fields() {
        let raw = r#"<div class="article-meta hidden">
  <meta name="date" content="2023-06-15">
</div>
<p>Corps.</p>"#;
        let (meta, _) = ArticleMeta::extract(raw);
        assert_eq!(meta.date.as_deref(), Some("2023-06-15"));
        assert_eq!(meta.author, None);
        assert_eq!(meta.banner, None);
        assert_eq!(meta.subtitle, None);
    }

    #[test]
    fn test_extract_without_container() {
        let (meta, body) = ArticleMeta::extract("<h1>Brut</h1><p>Pas de méta.</p>");
        assert_eq!(meta, ArticleMeta::default());
        assert_eq!(body, "<h1>Brut</h1><p>Pas de méta.</p>");
    }

    #[test]
    fn test_extract_ignores_unknown_keys() {
        let raw = r#"<div class="article-meta hidden">
  <meta name="category" content="moteurs">
  <meta name="author" content="B. Plex">
</div>"#;
        let (meta, _) = ArticleMeta::extract(raw);
        assert_eq!(meta.author.as_deref(), Some("B. Plex"));
    }

    #[test]
    fn test_extract_last_modified() {
        let raw = r#"<div class="article-meta hidden">
  <meta name="date" content="2024-01-01">
  <meta name="lastModified" content="2024-03-10">
</div>"#;
        let (meta, _) = ArticleMeta::extract(raw);
        assert_eq!(meta.last_modified.as_deref(), Some("2024-03-10"));
        let lastmod = meta.parse_last_modified().unwrap();
        assert_eq!((lastmod.year(), lastmod.month(), lastmod.day()), (2024, 3, 10));
    }

    #[test]
    fn test_parse_date_formats() {
        let d = parse_date_string("2024-01-01").unwrap();
        assert_eq!((d.year(), d.month(), d.day()), (2024, 1, 1));
        assert_eq!((d.hour(), d.minute()), (0, 0));

        let d = parse_date_string("2024-01-01 08:30").unwrap();
        assert_eq!((d.hour(), d.minute()), (8, 30));

        let d = parse_date_string("2024-01-01 08:30:45").unwrap();
        assert_eq!(d.second(), 45);

        assert!(parse_date_string("2024-12-25T10:00:00+01:00").is_some());
        assert!(parse_date_string("pas une date").is_none());
        assert!(parse_date_string("2024-13-40").is_none());
    }

    #[test]
    fn test_is_published_boundary() {
        let now = Local::now();
        assert!(is_published(&now, &now));
        assert!(is_published(&(now - Duration::days(1)), &now));
        assert!(!is_published(&(now + Duration::seconds(5)), &now));
    }

    #[test]
    fn test_effective_date_prefers_declared_date() {
        let meta = ArticleMeta {
            date: Some("2022-02-02".into()),
            ..Default::default()
        };
        let date = effective_date(&meta, Path::new("/nonexistent"));
        assert_eq!((date.year(), date.month(), date.day()), (2022, 2, 2));
    }

    #[test]
    fn test_effective_date_falls_back_to_now() {
        let meta = ArticleMeta::default();
        let before = Local::now();
        let date = effective_date(&meta, Path::new("/nonexistent"));
        assert!(date >= before);
    }
}
