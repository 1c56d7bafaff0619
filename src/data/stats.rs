use std::collections::{HashMap, HashSet};

use super::filter::FilteredView;
use super::model::{
    AuthorTable, COUNTRY_COLUMN, FIELD_COLUMN, INSTITUTION_COLUMN, RANK_COLUMN,
    SUBFIELD_COLUMN, SUBFIELD_RANK_COLUMN,
};
use crate::country::CountryResolver;

// ---------------------------------------------------------------------------
// Building blocks
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DistinctCounts {
    pub authors: usize,
    pub institutions: usize,
    pub countries: usize,
}

/// Unique authors, institutions and countries in the view.  The sentinel is
/// an ordinary value here.
pub fn distinct_counts(table: &AuthorTable, view: &FilteredView) -> DistinctCounts {
    let mut authors = HashSet::new();
    let mut institutions = HashSet::new();
    let mut countries = HashSet::new();
    for rec in view.records(table) {
        authors.insert(rec.author.as_str());
        institutions.insert(rec.institution.as_str());
        countries.insert(rec.country.as_str());
    }
    DistinctCounts {
        authors: authors.len(),
        institutions: institutions.len(),
        countries: countries.len(),
    }
}

/// Occurrence counts of `column` in first-encounter order.  Null cells are
/// skipped.
fn value_counts(table: &AuthorTable, view: &FilteredView, column: &str) -> Vec<(String, usize)> {
    let mut slots: HashMap<String, usize> = HashMap::new();
    let mut counts: Vec<(String, usize)> = Vec::new();
    for rec in view.records(table) {
        let Some(value) = rec.category(column) else {
            continue;
        };
        match slots.get(&value) {
            Some(&slot) => counts[slot].1 += 1,
            None => {
                slots.insert(value.clone(), counts.len());
                counts.push((value, 1));
            }
        }
    }
    counts
}

/// The `n` most frequent values of `column`, by descending count.  Ties keep
/// first-encounter order.
pub fn top_counts(
    table: &AuthorTable,
    view: &FilteredView,
    column: &str,
    n: usize,
) -> Vec<(String, usize)> {
    let mut counts = value_counts(table, view, column);
    // sort_by is stable
    counts.sort_by(|a, b| b.1.cmp(&a.1));
    counts.truncate(n);
    counts
}

/// Mean of `numeric_column` per value of `category_column`, first-encounter
/// order.  Non-numeric cells are excluded; categories left with no numbers
/// are omitted.
pub fn category_means(
    table: &AuthorTable,
    view: &FilteredView,
    category_column: &str,
    numeric_column: &str,
) -> Vec<(String, f64)> {
    let mut slots: HashMap<String, usize> = HashMap::new();
    let mut sums: Vec<(String, f64, usize)> = Vec::new();
    for rec in view.records(table) {
        let (Some(category), Some(value)) =
            (rec.category(category_column), rec.numeric(numeric_column))
        else {
            continue;
        };
        match slots.get(&category) {
            Some(&slot) => {
                sums[slot].1 += value;
                sums[slot].2 += 1;
            }
            None => {
                slots.insert(category.clone(), sums.len());
                sums.push((category, value, 1));
            }
        }
    }
    sums.into_iter()
        .map(|(category, sum, n)| (category, sum / n as f64))
        .collect()
}

/// One choropleth entry.
#[derive(Debug, Clone, PartialEq)]
pub struct MapCount {
    /// Uppercase ISO alpha-3 code.
    pub code: String,
    pub name: String,
    pub count: usize,
}

/// Records per valid ISO alpha-3 code, most frequent first.  Codes that fail
/// the validity check are dropped.
pub fn map_counts(
    table: &AuthorTable,
    view: &FilteredView,
    resolver: &CountryResolver,
) -> Vec<MapCount> {
    let mut merged: Vec<(String, usize)> = Vec::new();
    for (code, count) in top_counts(table, view, COUNTRY_COLUMN, usize::MAX) {
        if !resolver.is_valid_code(&code) {
            continue;
        }
        let upper = code.to_ascii_uppercase();
        // "usa" and "USA" land on the same map location
        match merged.iter_mut().find(|(c, _)| *c == upper) {
            Some(entry) => entry.1 += count,
            None => merged.push((upper, count)),
        }
    }
    merged.sort_by(|a, b| b.1.cmp(&a.1));
    merged
        .into_iter()
        .map(|(code, count)| MapCount {
            name: resolver.display_name(&code),
            code,
            count,
        })
        .collect()
}

#[derive(Debug, Clone, PartialEq)]
pub struct HistogramBin {
    pub start: f64,
    pub end: f64,
    pub count: usize,
}

/// Equal-width histogram of the numeric values of `column`.  The last bin is
/// closed on the right.  Empty when the view holds no numbers.
pub fn histogram(
    table: &AuthorTable,
    view: &FilteredView,
    column: &str,
    bins: usize,
) -> Vec<HistogramBin> {
    let values: Vec<f64> = view
        .records(table)
        .filter_map(|rec| rec.numeric(column))
        .filter(|v| v.is_finite())
        .collect();
    if values.is_empty() || bins == 0 {
        return Vec::new();
    }

    let min = values.iter().copied().fold(f64::INFINITY, f64::min);
    let max = values.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    if (max - min).abs() < f64::EPSILON {
        return vec![HistogramBin {
            start: min - 0.5,
            end: max + 0.5,
            count: values.len(),
        }];
    }

    let width = (max - min) / bins as f64;
    if !width.is_finite() {
        // range wider than f64 can represent
        return vec![HistogramBin {
            start: min,
            end: max,
            count: values.len(),
        }];
    }
    let mut out: Vec<HistogramBin> = (0..bins)
        .map(|i| HistogramBin {
            start: min + i as f64 * width,
            end: min + (i + 1) as f64 * width,
            count: 0,
        })
        .collect();
    for v in values {
        let slot = (((v - min) / width) as usize).min(bins - 1);
        out[slot].count += 1;
    }
    out
}

// ---------------------------------------------------------------------------
// Aggregate summary
// ---------------------------------------------------------------------------

/// Knobs for [`AggregateSummary::compute`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SummaryOptions {
    /// Length of the country / institution rankings.
    pub top_n: usize,
    /// Length of the institution bar chart.
    pub chart_top_n: usize,
    pub histogram_bins: usize,
}

impl Default for SummaryOptions {
    fn default() -> Self {
        Self {
            top_n: 5,
            chart_top_n: 10,
            histogram_bins: 20,
        }
    }
}

/// Everything the presentation layer shows about a view.  Optional-column
/// aggregates are `None` when the dataset lacks the columns.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AggregateSummary {
    pub rows: usize,
    pub distinct: DistinctCounts,
    pub top_countries: Vec<(String, usize)>,
    pub top_institutions: Vec<(String, usize)>,
    /// Institution bar chart data.
    pub institution_chart: Vec<(String, usize)>,
    pub map: Vec<MapCount>,
    /// Authors per `sm-field`.
    pub field_counts: Option<Vec<(String, usize)>>,
    /// Mean `rank sm-subfield-1` per `sm-subfield-1`.
    pub subfield_mean_rank: Option<Vec<(String, f64)>>,
    /// Distribution of `rank (ns)`.
    pub rank_histogram: Option<Vec<HistogramBin>>,
}

impl AggregateSummary {
    pub fn compute(
        table: &AuthorTable,
        view: &FilteredView,
        resolver: &CountryResolver,
        options: SummaryOptions,
    ) -> Self {
        let field_counts = table
            .has_column(FIELD_COLUMN)
            .then(|| top_counts(table, view, FIELD_COLUMN, usize::MAX));
        let subfield_mean_rank = (table.has_column(SUBFIELD_COLUMN)
            && table.has_column(SUBFIELD_RANK_COLUMN))
        .then(|| category_means(table, view, SUBFIELD_COLUMN, SUBFIELD_RANK_COLUMN));
        let rank_histogram = table
            .has_column(RANK_COLUMN)
            .then(|| histogram(table, view, RANK_COLUMN, options.histogram_bins));

        AggregateSummary {
            rows: view.len(),
            distinct: distinct_counts(table, view),
            top_countries: top_counts(table, view, COUNTRY_COLUMN, options.top_n),
            top_institutions: top_counts(table, view, INSTITUTION_COLUMN, options.top_n),
            institution_chart: top_counts(table, view, INSTITUTION_COLUMN, options.chart_top_n),
            map: map_counts(table, view, resolver),
            field_counts,
            subfield_mean_rank,
            rank_histogram,
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;

    use pretty_assertions::assert_eq;
    use proptest::prelude::*;

    use super::*;
    use crate::data::filter::{apply_filters, FilterSelection};
    use crate::data::model::{AuthorRecord, CellValue, AUTHOR_COLUMN, SENTINEL};

    fn record(author: &str, inst: &str, country: &str, extra: &[(&str, CellValue)]) -> AuthorRecord {
        AuthorRecord {
            author: author.into(),
            institution: inst.into(),
            country: country.into(),
            extra: extra
                .iter()
                .map(|(k, v)| (k.to_string(), v.clone()))
                .collect::<BTreeMap<_, _>>(),
        }
    }

    fn all(table: &AuthorTable) -> FilteredView {
        apply_filters(table, &FilterSelection::default())
    }

    fn base_columns() -> Vec<String> {
        vec![AUTHOR_COLUMN.into(), INSTITUTION_COLUMN.into(), COUNTRY_COLUMN.into()]
    }

    fn sample() -> AuthorTable {
        let rows = vec![
            record("A", "MIT", "usa", &[]),
            record("B", "Oxford", "gbr", &[]),
            record("C", "MIT", "usa", &[]),
            record("D", "ETH", "che", &[]),
            record("E", "Oxford", "gbr", &[]),
            record("F", SENTINEL, SENTINEL, &[]),
            record("A", "CNRS", "fra", &[]),
            record("G", "Kyoto", "jpn", &[]),
            record("H", "Rogue", "xkx", &[]),
        ];
        AuthorTable::new(base_columns(), rows)
    }

    #[test]
    fn distinct_counts_include_sentinel() {
        let t = sample();
        assert_eq!(
            distinct_counts(&t, &all(&t)),
            DistinctCounts { authors: 8, institutions: 7, countries: 7 }
        );
    }

    #[test]
    fn top_counts_break_ties_by_first_encounter() {
        let t = sample();
        let top = top_counts(&t, &all(&t), COUNTRY_COLUMN, 5);
        assert_eq!(
            top,
            vec![
                ("usa".to_string(), 2),
                ("gbr".to_string(), 2),
                ("che".to_string(), 1),
                (SENTINEL.to_string(), 1),
                ("fra".to_string(), 1),
            ]
        );
    }

    #[test]
    fn category_means_skip_non_numeric() {
        let rows = vec![
            record("A", "I", "usa", &[(SUBFIELD_COLUMN, CellValue::String("Optics".into())), (SUBFIELD_RANK_COLUMN, CellValue::Integer(10))]),
            record("B", "I", "usa", &[(SUBFIELD_COLUMN, CellValue::String("Optics".into())), (SUBFIELD_RANK_COLUMN, CellValue::String("n/a".into()))]),
            record("C", "I", "usa", &[(SUBFIELD_COLUMN, CellValue::String("Optics".into())), (SUBFIELD_RANK_COLUMN, CellValue::Float(20.0))]),
            record("D", "I", "usa", &[(SUBFIELD_COLUMN, CellValue::String("Algebra".into())), (SUBFIELD_RANK_COLUMN, CellValue::Null)]),
            record("E", "I", "usa", &[(SUBFIELD_COLUMN, CellValue::String("Virology".into())), (SUBFIELD_RANK_COLUMN, CellValue::String("4".into()))]),
        ];
        let t = AuthorTable::new(base_columns(), rows);
        assert_eq!(
            category_means(&t, &all(&t), SUBFIELD_COLUMN, SUBFIELD_RANK_COLUMN),
            vec![("Optics".to_string(), 15.0), ("Virology".to_string(), 4.0)]
        );
    }

    #[test]
    fn map_counts_drop_invalid_codes_and_merge_case() {
        let mut t = sample();
        t.records.push(record("I", "MIT", "USA", &[]));
        let map = map_counts(&t, &all(&t), &CountryResolver::new());
        assert_eq!(map[0], MapCount { code: "USA".into(), name: "United States".into(), count: 3 });
        assert!(map.iter().all(|m| m.code != "XKX" && m.code != SENTINEL));
        assert_eq!(map.iter().map(|m| m.count).sum::<usize>(), 8);
    }

    #[test]
    fn histogram_covers_every_value() {
        let rows = (1..=10)
            .map(|i| record("A", "I", "usa", &[(RANK_COLUMN, CellValue::Integer(i))]))
            .collect();
        let t = AuthorTable::new(base_columns(), rows);
        let bins = histogram(&t, &all(&t), RANK_COLUMN, 3);
        assert_eq!(bins.len(), 3);
        assert_eq!(bins.iter().map(|b| b.count).sum::<usize>(), 10);
        assert_eq!(bins[2].count, 4);
        assert!(histogram(&AuthorTable::empty(), &FilteredView::default(), RANK_COLUMN, 3).is_empty());
    }

    #[test]
    fn histogram_of_extreme_range_is_one_bin() {
        let rows = [-f64::MAX, f64::MAX]
            .into_iter()
            .map(|v| record("A", "I", "usa", &[(RANK_COLUMN, CellValue::Float(v))]))
            .collect();
        let t = AuthorTable::new(base_columns(), rows);
        let bins = histogram(&t, &all(&t), RANK_COLUMN, 20);
        assert_eq!(bins.len(), 1);
        assert_eq!(bins[0].count, 2);
        assert!(bins[0].start.is_finite() && bins[0].end.is_finite());
    }

    #[test]
    fn absent_optional_columns_skip_aggregates() {
        let t = sample();
        let s = AggregateSummary::compute(&t, &all(&t), &CountryResolver::new(), SummaryOptions::default());
        assert_eq!(s.field_counts, None);
        assert_eq!(s.subfield_mean_rank, None);
        assert_eq!(s.rank_histogram, None);
        assert_eq!(s.top_institutions[0], ("MIT".to_string(), 2));
    }

    #[test]
    fn empty_table_summarises_to_zero() {
        let t = AuthorTable::empty();
        let s = AggregateSummary::compute(&t, &all(&t), &CountryResolver::new(), SummaryOptions::default());
        assert_eq!(s.distinct, DistinctCounts::default());
        assert_eq!(s.rows, 0);
        assert!(s.map.is_empty());
        assert!(s.institution_chart.is_empty());
    }

    proptest! {
        #[test]
        fn rankings_and_map_are_bounded(
            codes in prop::collection::vec(
                prop::sample::select(vec!["usa", "gbr", "fra", "deu", "jpn", "chn", "zzz", SENTINEL]),
                0..50,
            ),
            n in 0usize..8,
        ) {
            let rows = codes.iter().enumerate()
                .map(|(i, c)| record(&format!("a{i}"), "I", c, &[]))
                .collect();
            let t = AuthorTable::new(base_columns(), rows);
            let view = all(&t);
            let top = top_counts(&t, &view, COUNTRY_COLUMN, n);
            let distinct = distinct_counts(&t, &view).countries;
            prop_assert!(top.len() <= n && top.len() <= distinct);
            prop_assert!(top.windows(2).all(|w| w[0].1 >= w[1].1));

            let map = map_counts(&t, &view, &CountryResolver::new());
            let total: usize = map.iter().map(|m| m.count).sum();
            prop_assert!(total <= view.len());
            let resolver = CountryResolver::new();
            if codes.iter().all(|c| resolver.is_valid_code(c)) {
                prop_assert_eq!(total, view.len());
            }
        }
    }
}
