//! SQLite access for the `parts` table
//!
//! Handlers validate first and call in here with typed values. Dynamic
//! statements go through `QueryBuilder` so every user value is bound.

use chrono::{DateTime, Utc};
use shared::{
    CategoryStats, NewPart, PartCategory, PartChanges, PartRow, PartSortBy, PartStatus,
    SortOrder,
};
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};
use sqlx::types::Json;
use sqlx::{QueryBuilder, Sqlite};

use crate::config::AppConfig;

/// Columns searched by the free-text `search` filter
const SEARCH_COLUMNS: [&str; 5] = ["name", "part_id", "subsystem", "notes", "assigned"];

pub async fn connect(config: &AppConfig) -> Result<SqlitePool, sqlx::Error> {
    let mut options = SqlitePoolOptions::new().max_connections(config.max_connections);
    if config.database_url.contains(":memory:") {
        // Every connection to `:memory:` is its own database; keep the one we have
        options = options
            .max_connections(1)
            .min_connections(1)
            .idle_timeout(None)
            .max_lifetime(None);
    }
    options.connect(&config.database_url).await
}

pub async fn run_migrations(pool: &SqlitePool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("../../database/migrations").run(pool).await
}

pub async fn ping(pool: &SqlitePool) -> bool {
    sqlx::query_scalar::<_, i32>("SELECT 1")
        .fetch_one(pool)
        .await
        .is_ok()
}

/// Filters and paging for [`list_parts`]
#[derive(Debug, Clone)]
pub struct PartFilter {
    pub category: Option<PartCategory>,
    /// Already sanitized and non-empty
    pub search: Option<String>,
    pub sort_by: PartSortBy,
    pub sort_order: SortOrder,
    pub limit: i64,
    pub offset: i64,
}

fn push_filters(qb: &mut QueryBuilder<'_, Sqlite>, filter: &PartFilter) {
    qb.push(" WHERE 1=1");
    if let Some(category) = filter.category {
        qb.push(" AND category = ").push_bind(category.as_str());
    }
    if let Some(search) = &filter.search {
        let pattern = format!("%{}%", search);
        qb.push(" AND (");
        for (i, column) in SEARCH_COLUMNS.iter().enumerate() {
            if i > 0 {
                qb.push(" OR ");
            }
            qb.push(*column).push(" LIKE ").push_bind(pattern.clone());
        }
        qb.push(")");
    }
}

/// One page of parts plus the total matching the filter
pub async fn list_parts(
    pool: &SqlitePool,
    filter: &PartFilter,
) -> Result<(Vec<PartRow>, i64), sqlx::Error> {
    let mut count = QueryBuilder::<Sqlite>::new("SELECT COUNT(*) FROM parts");
    push_filters(&mut count, filter);
    let total: i64 = count.build_query_scalar().fetch_one(pool).await?;

    let direction = match filter.sort_order {
        SortOrder::Asc => "ASC",
        SortOrder::Desc => "DESC",
    };
    let mut query = QueryBuilder::<Sqlite>::new("SELECT * FROM parts");
    push_filters(&mut query, filter);
    query
        .push(format!(
            " ORDER BY {} {}, id {}",
            filter.sort_by.column(),
            direction,
            direction
        ))
        .push(" LIMIT ")
        .push_bind(filter.limit)
        .push(" OFFSET ")
        .push_bind(filter.offset);

    let parts = query.build_query_as::<PartRow>().fetch_all(pool).await?;
    Ok((parts, total))
}

pub async fn get_part(pool: &SqlitePool, id: i64) -> Result<Option<PartRow>, sqlx::Error> {
    sqlx::query_as("SELECT * FROM parts WHERE id = ?")
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub async fn insert_part(pool: &SqlitePool, part: &NewPart) -> Result<PartRow, sqlx::Error> {
    let now = Utc::now();
    sqlx::query_as(
        "INSERT INTO parts (type, name, part_id, subsystem, assigned, status, notes, file,
                            onshape_url, amount, category, misc_info, claimed_date,
                            created_at, updated_at)
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
         RETURNING *",
    )
    .bind(part.part_type.map(|t| t.as_str()))
    .bind(&part.name)
    .bind(&part.part_id)
    .bind(&part.subsystem)
    .bind(&part.assigned)
    .bind(part.status.as_str())
    .bind(&part.notes)
    .bind(&part.file)
    .bind(&part.onshape_url)
    .bind(part.amount)
    .bind(part.category.as_str())
    .bind(part.misc_info.as_ref().map(|info| Json(info.to_value())))
    .bind(part.claimed_date)
    .bind(now)
    .bind(now)
    .fetch_one(pool)
    .await
}

/// Apply validated changes; `None` when the part does not exist
///
/// A cleared status falls back to `Pending` because the column is required.
/// A cleared category is ignored for the same reason.
pub async fn update_part(
    pool: &SqlitePool,
    id: i64,
    changes: &PartChanges,
) -> Result<Option<PartRow>, sqlx::Error> {
    let mut qb = QueryBuilder::<Sqlite>::new("UPDATE parts SET ");
    let mut set = qb.separated(", ");
    set.push("updated_at = ").push_bind_unseparated(Utc::now());

    if let Some(part_type) = changes.part_type {
        set.push("type = ").push_bind_unseparated(part_type.map(|t| t.as_str()));
    }
    let text_columns = [
        ("name", &changes.name),
        ("part_id", &changes.part_id),
        ("subsystem", &changes.subsystem),
        ("assigned", &changes.assigned),
        ("notes", &changes.notes),
        ("file", &changes.file),
        ("onshape_url", &changes.onshape_url),
    ];
    for (column, value) in text_columns {
        if let Some(value) = value {
            set.push(format!("{} = ", column)).push_bind_unseparated(value.clone());
        }
    }
    if let Some(status) = changes.status {
        set.push("status = ")
            .push_bind_unseparated(status.unwrap_or_default().as_str());
    }
    if let Some(amount) = changes.amount {
        set.push("amount = ").push_bind_unseparated(amount);
    }
    if let Some(Some(category)) = changes.category {
        set.push("category = ").push_bind_unseparated(category.as_str());
    }
    if let Some(misc_info) = &changes.misc_info {
        set.push("misc_info = ")
            .push_bind_unseparated(misc_info.as_ref().map(|info| Json(info.to_value())));
    }

    qb.push(" WHERE id = ").push_bind(id);
    let result = qb.build().execute(pool).await?;
    if result.rows_affected() == 0 {
        return Ok(None);
    }
    get_part(pool, id).await
}

pub async fn delete_part(pool: &SqlitePool, id: i64) -> Result<bool, sqlx::Error> {
    let result = sqlx::query("DELETE FROM parts WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(result.rows_affected() > 0)
}

pub async fn set_category(
    pool: &SqlitePool,
    id: i64,
    category: PartCategory,
    status: PartStatus,
) -> Result<Option<PartRow>, sqlx::Error> {
    sqlx::query_as(
        "UPDATE parts SET category = ?, status = ?, updated_at = ? WHERE id = ? RETURNING *",
    )
    .bind(category.as_str())
    .bind(status.as_str())
    .bind(Utc::now())
    .bind(id)
    .fetch_optional(pool)
    .await
}

/// Set or clear the assignee together with its claim date and status
pub async fn set_assignment(
    pool: &SqlitePool,
    id: i64,
    assigned: Option<&str>,
    claimed_date: Option<DateTime<Utc>>,
    status: PartStatus,
) -> Result<Option<PartRow>, sqlx::Error> {
    sqlx::query_as(
        "UPDATE parts SET assigned = ?, claimed_date = ?, status = ?, updated_at = ?
         WHERE id = ? RETURNING *",
    )
    .bind(assigned)
    .bind(claimed_date)
    .bind(status.as_str())
    .bind(Utc::now())
    .bind(id)
    .fetch_optional(pool)
    .await
}

pub async fn category_stats(pool: &SqlitePool) -> Result<CategoryStats, sqlx::Error> {
    let rows: Vec<(String, i64)> =
        sqlx::query_as("SELECT category, COUNT(*) FROM parts GROUP BY category")
            .fetch_all(pool)
            .await?;

    let mut stats = CategoryStats::default();
    for (category, count) in rows {
        stats.record(&category, count);
    }
    Ok(stats)
}

pub async fn count_parts(pool: &SqlitePool) -> Result<i64, sqlx::Error> {
    sqlx::query_scalar("SELECT COUNT(*) FROM parts")
        .fetch_one(pool)
        .await
}
