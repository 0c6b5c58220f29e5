//! Fragment builders. Each takes validated values only and binds every
//! value as a parameter.

use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

use super::{ColumnRef, PredicateFragment};
use crate::sql::{and_all, func, lit_int, lit_str, or_all, param, Expr, ExprExt, SqlValue};
use crate::validation::{
    DateBounds, GeometryFilter, HashtagFilter, MatchMode, ProjectIds, TimeRange, UserNames,
};

/// `column BETWEEN $a AND $b`
pub fn time_range(column: ColumnRef, range: &TimeRange) -> PredicateFragment {
    PredicateFragment::new(
        column.expr().between(param(range.from()), param(range.to())),
        vec![column],
    )
}

/// `from_column >= $a AND to_column <= $b`, each side only when bounded.
pub fn date_bounds(
    from_column: ColumnRef,
    to_column: ColumnRef,
    bounds: &DateBounds,
) -> PredicateFragment {
    bounded(from_column, to_column, bounds.from(), bounds.to())
}

/// Like [`date_bounds`] but compares against timestamps at `hour` on each
/// bound date. Stored period boundaries sit at a fixed hour of the day.
pub fn period_bounds(
    start_column: ColumnRef,
    end_column: ColumnRef,
    bounds: &DateBounds,
    hour: u32,
) -> PredicateFragment {
    let at_hour = |d: NaiveDate| -> NaiveDateTime {
        d.and_hms_opt(hour, 0, 0)
            .unwrap_or_else(|| d.and_time(NaiveTime::MIN))
    };
    bounded(
        start_column,
        end_column,
        bounds.from().map(at_hour),
        bounds.to().map(at_hour),
    )
}

fn bounded<T: Into<SqlValue>>(
    from_column: ColumnRef,
    to_column: ColumnRef,
    from: Option<T>,
    to: Option<T>,
) -> PredicateFragment {
    let mut exprs = Vec::new();
    let mut columns = Vec::new();
    if let Some(from) = from {
        exprs.push(from_column.expr().gte(param(from)));
        columns.push(from_column);
    }
    if let Some(to) = to {
        exprs.push(to_column.expr().lte(param(to)));
        if !columns.contains(&to_column) {
            columns.push(to_column);
        }
    }
    match and_all(exprs) {
        Some(expr) => PredicateFragment::new(expr, columns),
        None => PredicateFragment::none(),
    }
}

fn hashtag_expr(column: ColumnRef, filter: &HashtagFilter) -> Expr {
    let terms: Vec<Expr> = filter
        .tags()
        .iter()
        .map(|tag| param(tag.as_str()).eq_any(column.expr()))
        .collect();
    let joined = match filter.mode() {
        MatchMode::All => and_all(terms),
        MatchMode::Any | MatchMode::Single => or_all(terms),
    };
    // HashtagFilter is never empty.
    let joined = joined.unwrap_or_else(|| crate::sql::lit_bool(false));
    match filter.mode() {
        MatchMode::Single => joined,
        MatchMode::Any | MatchMode::All => joined.paren(),
    }
}

fn project_hashtag_expr(column: ColumnRef, ids: &ProjectIds) -> Option<Expr> {
    let terms: Vec<Expr> = ids
        .ids()
        .iter()
        .map(|id| param(format!("hotosm-project-{}", id)).eq_any(column.expr()))
        .collect();
    or_all(terms).map(ExprExt::paren)
}

/// Hashtag membership on an array column.
///
/// `Any` and `All` wrap their terms in parentheses; `Single` is one bare term.
pub fn hashtags(column: ColumnRef, filter: &HashtagFilter) -> PredicateFragment {
    PredicateFragment::new(hashtag_expr(column, filter), vec![column])
}

/// Any of the `hotosm-project-<id>` hashtags.
pub fn project_hashtags(column: ColumnRef, ids: &ProjectIds) -> PredicateFragment {
    match project_hashtag_expr(column, ids) {
        Some(expr) => PredicateFragment::new(expr, vec![column]),
        None => PredicateFragment::none(),
    }
}

/// Campaign membership: hashtags OR project hashtags, whichever are given.
pub fn campaign(
    column: ColumnRef,
    hashtags: Option<&HashtagFilter>,
    projects: Option<&ProjectIds>,
) -> PredicateFragment {
    let tags = hashtags.map(|h| hashtag_expr(column, h));
    let projects = projects.and_then(|p| project_hashtag_expr(column, p));
    let expr = match (tags, projects) {
        (Some(t), Some(p)) => t.or(p).paren(),
        (Some(t), None) => t,
        (None, Some(p)) => p,
        (None, None) => return PredicateFragment::none(),
    };
    PredicateFragment::new(expr, vec![column])
}

/// `column = ANY($1)` over an integer array.
pub fn project_ids(column: ColumnRef, ids: &ProjectIds) -> PredicateFragment {
    any_of(column, ids.ids().to_vec())
}

/// `column = ANY($1)` over a text array.
pub fn user_names(column: ColumnRef, names: &UserNames) -> PredicateFragment {
    any_of(column, names.names().to_vec())
}

/// `column = $1`
pub fn equals(column: ColumnRef, value: impl Into<SqlValue>) -> PredicateFragment {
    PredicateFragment::new(column.expr().eq(param(value)), vec![column])
}

/// `DATE_PART('year', column) = $1`
pub fn year_of(column: ColumnRef, year: i32) -> PredicateFragment {
    PredicateFragment::new(
        func("DATE_PART", vec![lit_str("year"), column.expr()]).eq(param(i64::from(year))),
        vec![column],
    )
}

/// `column = ANY($1)`, the parameter being an array.
pub fn any_of(column: ColumnRef, values: impl Into<SqlValue>) -> PredicateFragment {
    PredicateFragment::new(column.expr().eq_any(param(values)), vec![column])
}

/// `$1 = ANY(column)`, the column being an array.
pub fn array_contains(column: ColumnRef, value: impl Into<SqlValue>) -> PredicateFragment {
    PredicateFragment::new(param(value).eq_any(column.expr()), vec![column])
}

/// How the requested area relates to the stored geometry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpatialRelation {
    /// Stored geometry touches the area.
    Intersects,
    /// Stored geometry lies inside the area.
    Contains,
}

impl SpatialRelation {
    fn function(&self) -> &'static str {
        match self {
            SpatialRelation::Intersects => "ST_Intersects",
            SpatialRelation::Contains => "ST_Contains",
        }
    }
}

/// Area filter: the polygon against `geometry_column` and/or the country
/// code against `iso3_column`.
pub fn spatial(
    geometry_column: ColumnRef,
    iso3_column: ColumnRef,
    filter: &GeometryFilter,
    relation: SpatialRelation,
) -> PredicateFragment {
    let mut exprs = Vec::new();
    let mut columns = Vec::new();

    if let Some(polygon) = filter.polygon() {
        let area = func(
            "ST_SetSRID",
            vec![
                func("ST_GeomFromGeoJSON", vec![param(polygon.to_geojson())]),
                lit_int(4326),
            ],
        );
        exprs.push(func(relation.function(), vec![area, geometry_column.expr()]));
        columns.push(geometry_column);
    }
    if let Some(country) = filter.country() {
        exprs.push(iso3_column.expr().eq(param(country.as_str())));
        columns.push(iso3_column);
    }

    match and_all(exprs) {
        Some(expr) => PredicateFragment::new(expr, columns),
        None => PredicateFragment::none(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sql::Dialect;
    use crate::validation::{CountryCode, Polygon};
    use serde_json::json;

    const CREATED_AT: ColumnRef = ColumnRef::new("c", "created_at");
    const HASHTAGS: ColumnRef = ColumnRef::new("c", "hashtags");
    const BBOX: ColumnRef = ColumnRef::new("c", "bbox");
    const ISO3: ColumnRef = ColumnRef::new("b", "iso3");

    fn sql(fragment: &PredicateFragment) -> String {
        fragment.sql_text(Dialect::Postgres).unwrap()
    }

    fn tags(raw: &[&str], mode: Option<MatchMode>) -> HashtagFilter {
        let raw: Vec<String> = raw.iter().map(|s| s.to_string()).collect();
        HashtagFilter::new(&raw, mode).unwrap()
    }

    fn ts(s: &str) -> NaiveDateTime {
        NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S").unwrap()
    }

    #[test]
    fn test_time_range() {
        let range = TimeRange::new(ts("2023-01-01T00:00:00"), ts("2023-01-02T00:00:00"), None).unwrap();
        let fragment = time_range(CREATED_AT, &range);
        insta::assert_snapshot!(sql(&fragment), @r#""c"."created_at" BETWEEN $1 AND $2"#);
        assert_eq!(
            fragment.bound_parameters(),
            vec![
                SqlValue::Timestamp(ts("2023-01-01T00:00:00")),
                SqlValue::Timestamp(ts("2023-01-02T00:00:00"))
            ]
        );
        assert_eq!(fragment.required_columns(), &[CREATED_AT]);
    }

    #[test]
    fn test_hashtag_modes() {
        let single = hashtags(HASHTAGS, &tags(&["#MissingMaps"], None));
        insta::assert_snapshot!(sql(&single), @r#"$1 = ANY("c"."hashtags")"#);
        assert_eq!(single.bound_parameters(), vec![SqlValue::Text("missingmaps".into())]);

        let any = hashtags(HASHTAGS, &tags(&["a1", "b2"], None));
        insta::assert_snapshot!(sql(&any), @r#"($1 = ANY("c"."hashtags") OR $2 = ANY("c"."hashtags"))"#);

        let all = hashtags(HASHTAGS, &tags(&["a1", "b2"], Some(MatchMode::All)));
        insta::assert_snapshot!(sql(&all), @r#"($1 = ANY("c"."hashtags") AND $2 = ANY("c"."hashtags"))"#);
    }

    #[test]
    fn test_campaign() {
        let projects = ProjectIds::new(vec![1, 2]).unwrap();
        let filter = tags(&["missingmaps"], None);

        let both = campaign(HASHTAGS, Some(&filter), Some(&projects));
        insta::assert_snapshot!(sql(&both), @r#"($1 = ANY("c"."hashtags") OR ($2 = ANY("c"."hashtags") OR $3 = ANY("c"."hashtags")))"#);
        assert_eq!(
            both.bound_parameters(),
            vec![
                SqlValue::Text("missingmaps".into()),
                SqlValue::Text("hotosm-project-1".into()),
                SqlValue::Text("hotosm-project-2".into()),
            ]
        );

        let only_projects = campaign(HASHTAGS, None, Some(&projects));
        assert_eq!(sql(&only_projects), sql(&project_hashtags(HASHTAGS, &projects)));

        assert!(campaign(HASHTAGS, None, None).is_none());
    }

    #[test]
    fn test_any_of_binds_one_array() {
        let fragment = project_ids(ColumnRef::new("th", "project_id"), &ProjectIds::new(vec![7, 9]).unwrap());
        insta::assert_snapshot!(sql(&fragment), @r#""th"."project_id" = ANY($1)"#);
        assert_eq!(fragment.bound_parameters(), vec![SqlValue::IntArray(vec![7, 9])]);

        let names = UserNames::new(vec!["Mapper".into()]).unwrap();
        let fragment = user_names(ColumnRef::new("u", "username"), &names);
        assert_eq!(fragment.bound_parameters(), vec![SqlValue::TextArray(vec!["Mapper".into()])]);
    }

    #[test]
    fn test_date_bounds() {
        let date = |s: &str| NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap();
        let column = ColumnRef::new("t", "date");

        let open = DateBounds::new(None, None, None, None).unwrap();
        assert!(date_bounds(column, column, &open).is_none());

        let from_only = DateBounds::new(Some(date("2020-01-01")), None, None, None).unwrap();
        insta::assert_snapshot!(sql(&date_bounds(column, column, &from_only)), @r#""t"."date" >= $1"#);

        let closed = DateBounds::new(Some(date("2020-01-01")), Some(date("2020-12-31")), None, None).unwrap();
        let fragment = date_bounds(column, column, &closed);
        insta::assert_snapshot!(sql(&fragment), @r#""t"."date" >= $1 AND "t"."date" <= $2"#);
        assert_eq!(fragment.required_columns(), &[column]);
    }

    #[test]
    fn test_period_bounds_at_hour() {
        let date = |s: &str| NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap();
        let bounds = DateBounds::new(Some(date("2022-01-03")), Some(date("2022-03-28")), None, None).unwrap();
        let fragment = period_bounds(
            ColumnRef::new("hs", "start_date"),
            ColumnRef::new("hs", "end_date"),
            &bounds,
            12,
        );
        assert_eq!(
            fragment.bound_parameters(),
            vec![
                SqlValue::Timestamp(ts("2022-01-03T12:00:00")),
                SqlValue::Timestamp(ts("2022-03-28T12:00:00"))
            ]
        );
    }

    #[test]
    fn test_spatial() {
        let polygon = Polygon::from_json(&json!([85.30, 27.70, 85.35, 27.75])).unwrap();
        let country = CountryCode::new("npl").unwrap();
        let filter = GeometryFilter::new(Some(polygon), Some(country), 5000.0).unwrap();

        let fragment = spatial(BBOX, ISO3, &filter, SpatialRelation::Intersects);
        insta::assert_snapshot!(sql(&fragment), @r#"ST_INTERSECTS(ST_SETSRID(ST_GEOMFROMGEOJSON($1), 4326), "c"."bbox") AND "b"."iso3" = $2"#);
        assert_eq!(fragment.required_columns(), &[BBOX, ISO3]);
        let params = fragment.bound_parameters();
        assert!(matches!(&params[0], SqlValue::Text(geojson) if geojson.contains("\"Polygon\"")));
        assert_eq!(params[1], SqlValue::Text("NPL".into()));
    }

    #[test]
    fn test_year_of() {
        let fragment = year_of(ColumnRef::new("p", "created"), 2021);
        insta::assert_snapshot!(sql(&fragment), @r#"DATE_PART('year', "p"."created") = $1"#);
        assert_eq!(fragment.bound_parameters(), vec![SqlValue::Int(2021)]);
    }

    #[test]
    fn test_values_never_reach_text() {
        let fragment = equals(ColumnRef::new("u", "username"), "x'); DROP TABLE users; --");
        let text = sql(&fragment);
        assert!(!text.contains("DROP"));
        assert_eq!(fragment.bound_parameters().len(), 1);
    }
}
