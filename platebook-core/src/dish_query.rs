//! Typed filter for the dish list.
//!
//! [`DishFilter::from_pairs`] turns raw query-string pairs into a filter once;
//! the server then translates the filter into a database query. Bad input
//! never errors here: unparsable numbers, dates, ids and page numbers are
//! dropped or replaced by their defaults.

use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde::Serialize;

use crate::nutrient::{Nutrient, PerNutrient};

/// Dishes per page.
pub const PAGE_SIZE: i64 = 10;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortField {
    Name,
    Calories,
    Proteins,
    Fats,
    Carbohydrates,
    #[default]
    CreatedAt,
}

impl SortField {
    fn parse(raw: &str) -> Option<Self> {
        Some(match raw {
            "name" => SortField::Name,
            "calories" => SortField::Calories,
            "proteins" => SortField::Proteins,
            "fats" => SortField::Fats,
            "carbohydrates" => SortField::Carbohydrates,
            "created_at" => SortField::CreatedAt,
            _ => return None,
        })
    }

    fn as_str(self) -> &'static str {
        match self {
            SortField::Name => "name",
            SortField::Calories => "calories",
            SortField::Proteins => "proteins",
            SortField::Fats => "fats",
            SortField::Carbohydrates => "carbohydrates",
            SortField::CreatedAt => "created_at",
        }
    }
}

/// A whitelisted ordering. `descending` corresponds to the `-` prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SortKey {
    pub field: SortField,
    pub descending: bool,
}

impl Default for SortKey {
    /// Newest first.
    fn default() -> Self {
        SortKey {
            field: SortField::CreatedAt,
            descending: true,
        }
    }
}

impl SortKey {
    /// `None` for anything outside the whitelist.
    pub fn parse(raw: &str) -> Option<Self> {
        let (descending, name) = match raw.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, raw),
        };
        SortField::parse(name).map(|field| SortKey { field, descending })
    }

    pub fn parse_or_default(raw: Option<&str>) -> Self {
        raw.and_then(|r| Self::parse(r.trim())).unwrap_or_default()
    }

    /// The canonical `sort_by` value for this key.
    pub fn as_param(&self) -> String {
        if self.descending {
            format!("-{}", self.field.as_str())
        } else {
            self.field.as_str().to_string()
        }
    }
}

/// Inclusive numeric bounds on one nutrient.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Range {
    pub min: Option<f64>,
    pub max: Option<f64>,
}

impl Range {
    pub fn is_unbounded(&self) -> bool {
        self.min.is_none() && self.max.is_none()
    }
}

/// Which page the client asked for.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageRequest {
    Number(i64),
    Last,
}

impl Default for PageRequest {
    fn default() -> Self {
        PageRequest::Number(1)
    }
}

impl PageRequest {
    fn parse(raw: &str) -> Self {
        let raw = raw.trim();
        if raw == "last" {
            return PageRequest::Last;
        }
        match raw.parse::<i64>() {
            Ok(n) if n >= 1 => PageRequest::Number(n),
            _ => PageRequest::default(),
        }
    }
}

/// Everything the dish list can be narrowed, ordered and paged by.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DishFilter {
    /// Case-insensitive substring of the dish name.
    pub name: Option<String>,
    ranges: PerNutrient<Range>,
    pub created_after: Option<NaiveDate>,
    pub created_before: Option<NaiveDate>,
    /// Dishes tagged with any of these allergens are dropped.
    pub exclude_allergens: Vec<i64>,
    pub sort: SortKey,
    pub page: PageRequest,
}

impl DishFilter {
    /// Build a filter from decoded query-string pairs. Repeated keys are
    /// allowed; for single-valued keys the last occurrence wins, while
    /// `exclude_allergens` accumulates (each value may also be a
    /// comma-separated list).
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: AsRef<str>,
    {
        let mut filter = DishFilter::default();
        let mut sort_by: Option<String> = None;

        for (key, value) in pairs {
            let key = key.as_ref();
            let value = value.as_ref();

            match key {
                "name" => {
                    let trimmed = value.trim();
                    filter.name = (!trimmed.is_empty()).then(|| trimmed.to_string());
                }
                "created_after" => filter.created_after = parse_date(value),
                "created_before" => filter.created_before = parse_date(value),
                "exclude_allergens" => {
                    for id in value.split(',').filter_map(|s| s.trim().parse::<i64>().ok()) {
                        if !filter.exclude_allergens.contains(&id) {
                            filter.exclude_allergens.push(id);
                        }
                    }
                }
                "sort_by" => sort_by = Some(value.to_string()),
                "page" => filter.page = PageRequest::parse(value),
                _ => {
                    if let Some((nutrient, is_min)) = nutrient_bound_key(key) {
                        let range = filter.ranges.get_mut(nutrient);
                        let bound = parse_number(value);
                        if is_min {
                            range.min = bound;
                        } else {
                            range.max = bound;
                        }
                    }
                }
            }
        }

        filter.sort = SortKey::parse_or_default(sort_by.as_deref());
        filter
    }

    pub fn range(&self, nutrient: Nutrient) -> Range {
        *self.ranges.get(nutrient)
    }

    pub fn set_range(&mut self, nutrient: Nutrient, range: Range) {
        *self.ranges.get_mut(nutrient) = range;
    }

    /// Creation-time bounds in UTC: `(inclusive start, exclusive end)`.
    ///
    /// `created_before` covers its whole day, so the upper bound is midnight
    /// of the following day.
    pub fn created_bounds_utc(&self) -> (Option<DateTime<Utc>>, Option<DateTime<Utc>>) {
        let start = self
            .created_after
            .map(|d| d.and_time(NaiveTime::MIN).and_utc());
        let end = self
            .created_before
            .and_then(|d| d.succ_opt())
            .map(|d| d.and_time(NaiveTime::MIN).and_utc());
        (start, end)
    }

    /// `ILIKE` pattern for [`DishFilter::name`], with wildcards escaped.
    pub fn name_pattern(&self) -> Option<String> {
        self.name.as_deref().map(like_pattern)
    }
}

fn nutrient_bound_key(key: &str) -> Option<(Nutrient, bool)> {
    let (stem, is_min) = if let Some(stem) = key.strip_suffix("_min") {
        (stem, true)
    } else if let Some(stem) = key.strip_suffix("_max") {
        (stem, false)
    } else {
        return None;
    };
    Nutrient::ALL
        .into_iter()
        .find(|n| n.as_str() == stem)
        .map(|n| (n, is_min))
}

fn parse_number(raw: &str) -> Option<f64> {
    raw.trim().parse::<f64>().ok().filter(|v| v.is_finite())
}

fn parse_date(raw: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").ok()
}

/// `%needle%` with `\`, `%` and `_` escaped for `LIKE`/`ILIKE`.
pub fn like_pattern(needle: &str) -> String {
    let escaped = needle
        .replace('\\', "\\\\")
        .replace('%', "\\%")
        .replace('_', "\\_");
    format!("%{escaped}%")
}

/// The resolved page of a listing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Page {
    /// 1-based page number, always within `1..=num_pages`.
    pub number: i64,
    pub num_pages: i64,
    pub per_page: i64,
    pub total: i64,
}

impl Page {
    /// Clamp the request onto the pages that exist. An empty listing still
    /// has one (empty) page.
    pub fn resolve(request: PageRequest, total: i64) -> Self {
        let total = total.max(0);
        let num_pages = ((total + PAGE_SIZE - 1) / PAGE_SIZE).max(1);
        let number = match request {
            PageRequest::Number(n) => n.clamp(1, num_pages),
            PageRequest::Last => num_pages,
        };
        Page {
            number,
            num_pages,
            per_page: PAGE_SIZE,
            total,
        }
    }

    pub fn offset(&self) -> i64 {
        (self.number - 1) * self.per_page
    }
}

/// Mean of each nutrient over a filtered set, ignoring missing values.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize)]
pub struct NutrientAverages {
    pub calories: f64,
    pub proteins: f64,
    pub fats: f64,
    pub carbohydrates: f64,
}

impl NutrientAverages {
    /// From SQL `AVG` results, which are `NULL` when no row had a value.
    pub fn from_aggregates(
        calories: Option<f64>,
        proteins: Option<f64>,
        fats: Option<f64>,
        carbohydrates: Option<f64>,
    ) -> Self {
        NutrientAverages {
            calories: calories.unwrap_or(0.0),
            proteins: proteins.unwrap_or(0.0),
            fats: fats.unwrap_or(0.0),
            carbohydrates: carbohydrates.unwrap_or(0.0),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn filter(query: &[(&str, &str)]) -> DishFilter {
        DishFilter::from_pairs(query.iter().copied())
    }

    #[test]
    fn test_empty_query_defaults() {
        let f = filter(&[]);
        assert_eq!(f.name, None);
        assert_eq!(f.sort, SortKey::default());
        assert_eq!(f.page, PageRequest::Number(1));
        for n in Nutrient::ALL {
            assert!(f.range(n).is_unbounded());
        }
    }

    #[test]
    fn test_sort_whitelist() {
        for raw in [
            "name",
            "-name",
            "calories",
            "-calories",
            "proteins",
            "-proteins",
            "fats",
            "-fats",
            "carbohydrates",
            "-carbohydrates",
            "created_at",
            "-created_at",
        ] {
            assert_eq!(SortKey::parse(raw).unwrap().as_param(), raw);
        }
    }

    #[test]
    fn test_bogus_sort_falls_back_to_newest_first() {
        let bogus = filter(&[("sort_by", "bogus")]).sort;
        let explicit = filter(&[("sort_by", "-created_at")]).sort;
        assert_eq!(bogus, explicit);
        assert_eq!(filter(&[("sort_by", "--name")]).sort, SortKey::default());
        assert_eq!(filter(&[("sort_by", "Name")]).sort, SortKey::default());
    }

    #[test]
    fn test_numeric_bounds_ignore_garbage() {
        let f = filter(&[
            ("calories_min", "100"),
            ("calories_max", "500"),
            ("proteins_min", "abc"),
            ("fats_max", " 7.5 "),
            ("carbohydrates_min", "inf"),
            ("sugar_min", "1"),
        ]);
        assert_eq!(
            f.range(Nutrient::Calories),
            Range {
                min: Some(100.0),
                max: Some(500.0)
            }
        );
        assert!(f.range(Nutrient::Proteins).is_unbounded());
        assert_eq!(f.range(Nutrient::Fats).max, Some(7.5));
        assert!(f.range(Nutrient::Carbohydrates).is_unbounded());
    }

    #[test]
    fn test_exclude_allergens_skips_non_integers() {
        let f = filter(&[
            ("exclude_allergens", "3"),
            ("exclude_allergens", "peanut"),
            ("exclude_allergens", "4, 5,x,3"),
        ]);
        assert_eq!(f.exclude_allergens, vec![3, 4, 5]);
    }

    #[test]
    fn test_name_trimmed_and_blank_dropped() {
        assert_eq!(filter(&[("name", "  soup ")]).name.as_deref(), Some("soup"));
        assert_eq!(filter(&[("name", "   ")]).name, None);
    }

    #[test]
    fn test_like_pattern_escapes_wildcards() {
        assert_eq!(like_pattern("50%_off\\"), "%50\\%\\_off\\\\%");
        let f = filter(&[("name", "Pie")]);
        assert_eq!(f.name_pattern().as_deref(), Some("%Pie%"));
    }

    #[test]
    fn test_date_bounds_cover_whole_days() {
        let f = filter(&[
            ("created_after", "2024-03-01"),
            ("created_before", "2024-03-31"),
        ]);
        let (start, end) = f.created_bounds_utc();
        assert_eq!(start.unwrap().to_rfc3339(), "2024-03-01T00:00:00+00:00");
        assert_eq!(end.unwrap().to_rfc3339(), "2024-04-01T00:00:00+00:00");
    }

    #[test]
    fn test_bad_dates_ignored() {
        let f = filter(&[("created_after", "yesterday"), ("created_before", "2024-02-30")]);
        assert_eq!(f.created_bounds_utc(), (None, None));
    }

    #[test]
    fn test_page_parsing() {
        assert_eq!(filter(&[("page", "3")]).page, PageRequest::Number(3));
        assert_eq!(filter(&[("page", "0")]).page, PageRequest::Number(1));
        assert_eq!(filter(&[("page", "two")]).page, PageRequest::Number(1));
        assert_eq!(filter(&[("page", "last")]).page, PageRequest::Last);
    }

    #[test]
    fn test_page_resolution() {
        let empty = Page::resolve(PageRequest::Number(4), 0);
        assert_eq!((empty.number, empty.num_pages, empty.offset()), (1, 1, 0));

        let page = Page::resolve(PageRequest::Number(2), 25);
        assert_eq!((page.number, page.num_pages, page.offset()), (2, 3, 10));

        let past_end = Page::resolve(PageRequest::Number(99), 25);
        assert_eq!(past_end.number, 3);
        assert_eq!(Page::resolve(PageRequest::Last, 30).number, 3);
        assert_eq!(Page::resolve(PageRequest::Number(1), 10).num_pages, 1);
    }

    #[test]
    fn test_averages_default_to_zero() {
        let avg = NutrientAverages::from_aggregates(None, Some(4.5), None, None);
        assert_eq!(avg.calories, 0.0);
        assert_eq!(avg.proteins, 4.5);
    }
}
