//! Translates a [`DishFilter`] into Diesel queries.
//!
//! The same filter is applied twice: once under the aggregate select (count
//! and nutrient means over the whole filtered set) and once under the row
//! select that is sorted and paged.

use crate::models::Dish;
use crate::schema::{dish_allergens, dishes};
use diesel::dsl::{avg, count_star};
use diesel::pg::Pg;
use diesel::prelude::*;
use platebook_core::{DishFilter, Nutrient, NutrientAverages, Page, SortField, SortKey};

/// One page of a filtered dish listing.
#[derive(Debug)]
pub struct DishListing {
    pub dishes: Vec<Dish>,
    pub page: Page,
    pub averages: NutrientAverages,
}

type AggregateRow = (i64, Option<f64>, Option<f64>, Option<f64>, Option<f64>);

pub fn list(conn: &mut PgConnection, user_id: i64, filter: &DishFilter) -> QueryResult<DishListing> {
    let aggregates = dishes::table
        .select((
            count_star(),
            avg(dishes::calories),
            avg(dishes::proteins),
            avg(dishes::fats),
            avg(dishes::carbohydrates),
        ))
        .into_boxed();
    let (total, calories, proteins, fats, carbohydrates): AggregateRow =
        apply_filters(aggregates, user_id, filter).get_result(conn)?;

    let page = Page::resolve(filter.page, total);

    let rows = apply_sort(
        apply_filters(dishes::table.into_boxed(), user_id, filter),
        filter.sort,
    )
    .limit(page.per_page)
    .offset(page.offset())
    .load::<Dish>(conn)?;

    Ok(DishListing {
        dishes: rows,
        page,
        averages: NutrientAverages::from_aggregates(calories, proteins, fats, carbohydrates),
    })
}

macro_rules! bounded {
    ($query:ident, $column:expr, $range:expr) => {{
        if let Some(min) = $range.min {
            $query = $query.filter($column.ge(min));
        }
        if let Some(max) = $range.max {
            $query = $query.filter($column.le(max));
        }
    }};
}

/// Owner, name, nutrient bounds, creation dates, then allergen exclusion.
/// A NULL nutrient never satisfies a bound.
fn apply_filters<'a, ST>(
    mut query: dishes::BoxedQuery<'a, Pg, ST>,
    user_id: i64,
    filter: &DishFilter,
) -> dishes::BoxedQuery<'a, Pg, ST> {
    query = query.filter(dishes::user_id.eq(user_id));

    if let Some(pattern) = filter.name_pattern() {
        query = query.filter(dishes::name.ilike(pattern));
    }

    for nutrient in Nutrient::ALL {
        let range = filter.range(nutrient);
        if range.is_unbounded() {
            continue;
        }
        match nutrient {
            Nutrient::Calories => bounded!(query, dishes::calories, range),
            Nutrient::Proteins => bounded!(query, dishes::proteins, range),
            Nutrient::Fats => bounded!(query, dishes::fats, range),
            Nutrient::Carbohydrates => bounded!(query, dishes::carbohydrates, range),
        }
    }

    let (created_from, created_until) = filter.created_bounds_utc();
    if let Some(from) = created_from {
        query = query.filter(dishes::created_at.ge(from));
    }
    if let Some(until) = created_until {
        query = query.filter(dishes::created_at.lt(until));
    }

    if !filter.exclude_allergens.is_empty() {
        let tagged = dish_allergens::table
            .filter(dish_allergens::allergen_id.eq_any(filter.exclude_allergens.clone()))
            .select(dish_allergens::dish_id);
        query = query.filter(dishes::id.ne_all(tagged));
    }

    query
}

macro_rules! by {
    ($query:expr, $column:expr, $descending:expr) => {
        if $descending {
            $query.order(($column.desc(), dishes::id.desc()))
        } else {
            $query.order(($column.asc(), dishes::id.asc()))
        }
    };
}

/// Ties break on id in the same direction so pages never overlap.
fn apply_sort<'a>(query: dishes::BoxedQuery<'a, Pg>, sort: SortKey) -> dishes::BoxedQuery<'a, Pg> {
    match sort.field {
        SortField::Name => by!(query, dishes::name, sort.descending),
        SortField::Calories => by!(query, dishes::calories, sort.descending),
        SortField::Proteins => by!(query, dishes::proteins, sort.descending),
        SortField::Fats => by!(query, dishes::fats, sort.descending),
        SortField::Carbohydrates => by!(query, dishes::carbohydrates, sort.descending),
        SortField::CreatedAt => by!(query, dishes::created_at, sort.descending),
    }
}
