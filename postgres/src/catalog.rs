//! `categories`, `genres`, `titles` and `genre_title`.

use crate::error::StoreResult;
use crate::{PostgresStore, bind_i64, row_count, run};
use sqlx::postgres::PgRow;
use sqlx::{PgConnection, Row};
use std::collections::HashMap;
use yamdb_core::YamdbError;
use yamdb_core::catalog::{
    NewTaxon, NewTitle, Taxon, Taxonomy, TitleFilter, TitleId, TitlePatch, TitleView,
};
use yamdb_core::error::FieldErrors;
use yamdb_core::pagination::{Page, PageRequest};
use yamdb_core::repository::{
    CatalogRepository, RepoFuture, SLUG_TAKEN, TITLE_NAME_TAKEN, unknown_slug,
};

const fn table(taxonomy: Taxonomy) -> &'static str {
    match taxonomy {
        Taxonomy::Category => "categories",
        Taxonomy::Genre => "genres",
    }
}

/// Titles with their category and rating. The rating is one grouped
/// aggregate joined to the selected rows.
const TITLE_SELECT: &str = r"
    SELECT
        t.id, t.name, t.year, t.description,
        c.id AS category_id, c.name AS category_name, c.slug AS category_slug,
        r.rating
    FROM titles t
    LEFT JOIN categories c ON c.id = t.category_id
    LEFT JOIN (
        SELECT title_id, ROUND(AVG(score))::INTEGER AS rating
        FROM reviews
        GROUP BY title_id
    ) r ON r.title_id = t.id
";

const TITLE_FILTER: &str = r"
    WHERE ($1::TEXT IS NULL OR c.slug = $1)
      AND ($2::TEXT IS NULL OR EXISTS (
            SELECT 1 FROM genre_title gt JOIN genres g ON g.id = gt.genre_id
            WHERE gt.title_id = t.id AND g.slug = $2))
      AND ($3::TEXT IS NULL OR strpos(lower(t.name), lower($3)) > 0)
      AND ($4::INTEGER IS NULL OR t.year = $4)
";

fn taxon_from_row(row: &PgRow) -> StoreResult<Taxon> {
    Ok(Taxon {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        slug: row.try_get("slug")?,
    })
}

fn title_from_row(row: &PgRow) -> StoreResult<TitleView> {
    let category = match row.try_get::<Option<i64>, _>("category_id")? {
        Some(id) => Some(Taxon {
            id,
            name: row.try_get("category_name")?,
            slug: row.try_get("category_slug")?,
        }),
        None => None,
    };
    Ok(TitleView {
        id: TitleId(row.try_get("id")?),
        name: row.try_get("name")?,
        year: row.try_get("year")?,
        rating: row.try_get("rating")?,
        genres: Vec::new(),
        category,
        description: row.try_get("description")?,
    })
}

/// Resolve genre slugs to ids, recording unknown slugs under `genre`.
async fn resolve_genres(
    conn: &mut PgConnection,
    slugs: &[String],
    errors: &mut FieldErrors,
) -> StoreResult<Vec<i64>> {
    let rows = sqlx::query("SELECT id, slug FROM genres WHERE slug = ANY($1)")
        .bind(slugs)
        .fetch_all(&mut *conn)
        .await?;
    let mut found = HashMap::with_capacity(rows.len());
    for row in &rows {
        found.insert(row.try_get::<String, _>("slug")?, row.try_get::<i64, _>("id")?);
    }

    let mut ids = Vec::with_capacity(slugs.len());
    for slug in slugs {
        match found.get(slug) {
            Some(id) => ids.push(*id),
            None => errors.push("genre", unknown_slug(slug)),
        }
    }
    Ok(ids)
}

/// Resolve a category slug to its id, recording an unknown slug under `category`.
async fn resolve_category(
    conn: &mut PgConnection,
    slug: Option<&str>,
    errors: &mut FieldErrors,
) -> StoreResult<Option<i64>> {
    let Some(slug) = slug else {
        return Ok(None);
    };
    let id: Option<i64> = sqlx::query_scalar("SELECT id FROM categories WHERE slug = $1")
        .bind(slug)
        .fetch_optional(&mut *conn)
        .await?;
    if id.is_none() {
        errors.push("category", unknown_slug(slug));
    }
    Ok(id)
}

async fn check_title_name(
    conn: &mut PgConnection,
    name: &str,
    except: Option<TitleId>,
    errors: &mut FieldErrors,
) -> StoreResult<()> {
    let taken: bool =
        sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM titles WHERE name = $1 AND id <> $2)")
            .bind(name)
            .bind(except.map_or(0, |id| id.0))
            .fetch_one(&mut *conn)
            .await?;
    if taken {
        errors.push("name", TITLE_NAME_TAKEN);
    }
    Ok(())
}

async fn link_genres(conn: &mut PgConnection, title: i64, genres: &[i64]) -> StoreResult<()> {
    sqlx::query(
        r"
        INSERT INTO genre_title (genre_id, title_id)
        SELECT DISTINCT genre_id, $2 FROM UNNEST($1::BIGINT[]) AS genre_id
        ",
    )
    .bind(genres)
    .bind(title)
    .execute(&mut *conn)
    .await?;
    Ok(())
}

impl PostgresStore {
    async fn insert_taxon(&self, taxonomy: Taxonomy, taxon: NewTaxon) -> StoreResult<Taxon> {
        let table = table(taxonomy);
        let exists: bool =
            sqlx::query_scalar(&format!("SELECT EXISTS (SELECT 1 FROM {table} WHERE slug = $1)"))
                .bind(&taxon.slug)
                .fetch_one(&self.pool)
                .await?;
        if exists {
            return Err(YamdbError::field("slug", SLUG_TAKEN).into());
        }

        let row = sqlx::query(&format!(
            "INSERT INTO {table} (name, slug) VALUES ($1, $2) RETURNING id, name, slug"
        ))
        .bind(&taxon.name)
        .bind(&taxon.slug)
        .fetch_one(&self.pool)
        .await?;
        taxon_from_row(&row)
    }

    async fn select_taxa(
        &self,
        taxonomy: Taxonomy,
        search: Option<String>,
        page: PageRequest,
    ) -> StoreResult<Page<Taxon>> {
        let table = table(taxonomy);
        let filter = "$1::TEXT IS NULL OR strpos(lower(name), lower($1)) > 0";

        let count: i64 = sqlx::query_scalar(&format!("SELECT COUNT(*) FROM {table} WHERE {filter}"))
            .bind(search.as_deref())
            .fetch_one(&self.pool)
            .await?;
        let count = row_count(count);
        page.check(count)?;

        let rows = sqlx::query(&format!(
            "SELECT id, name, slug FROM {table} WHERE {filter} ORDER BY name, id LIMIT $2 OFFSET $3"
        ))
        .bind(search.as_deref())
        .bind(bind_i64(page.limit()))
        .bind(bind_i64(page.offset()))
        .fetch_all(&self.pool)
        .await?;

        let taxa = rows.iter().map(taxon_from_row).collect::<StoreResult<Vec<_>>>()?;
        Ok(Page::new(page, count, taxa))
    }

    async fn remove_taxon(&self, taxonomy: Taxonomy, slug: String) -> StoreResult<()> {
        let result = sqlx::query(&format!("DELETE FROM {} WHERE slug = $1", table(taxonomy)))
            .bind(&slug)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(YamdbError::not_found(taxonomy.resource(), slug).into());
        }
        tracing::info!(resource = taxonomy.resource(), slug = %slug, "Taxon deleted");
        Ok(())
    }

    /// Attach genres to already-loaded titles with one query.
    async fn load_genres(&self, titles: &mut [TitleView]) -> StoreResult<()> {
        if titles.is_empty() {
            return Ok(());
        }
        let ids: Vec<i64> = titles.iter().map(|t| t.id.0).collect();
        let rows = sqlx::query(
            r"
            SELECT gt.title_id, g.id, g.name, g.slug
            FROM genre_title gt
            JOIN genres g ON g.id = gt.genre_id
            WHERE gt.title_id = ANY($1)
            ORDER BY g.slug
            ",
        )
        .bind(&ids)
        .fetch_all(&self.pool)
        .await?;

        let mut by_title: HashMap<i64, Vec<Taxon>> = HashMap::new();
        for row in &rows {
            let title_id: i64 = row.try_get("title_id")?;
            by_title.entry(title_id).or_default().push(taxon_from_row(row)?);
        }
        for title in titles {
            title.genres = by_title.remove(&title.id.0).unwrap_or_default();
        }
        Ok(())
    }

    async fn fetch_title(&self, id: TitleId) -> StoreResult<Option<TitleView>> {
        let row = sqlx::query(&format!("{TITLE_SELECT} WHERE t.id = $1"))
            .bind(id.0)
            .fetch_optional(&self.pool)
            .await?;
        let Some(row) = row else {
            return Ok(None);
        };
        let mut titles = [title_from_row(&row)?];
        self.load_genres(&mut titles).await?;
        let [title] = titles;
        Ok(Some(title))
    }

    async fn loaded_title(&self, id: TitleId) -> StoreResult<TitleView> {
        self.fetch_title(id)
            .await?
            .ok_or_else(|| YamdbError::not_found("title", id).into())
    }

    async fn select_titles(
        &self,
        filter: TitleFilter,
        page: PageRequest,
    ) -> StoreResult<Page<TitleView>> {
        let count: i64 = sqlx::query_scalar(&format!(
            r"
            SELECT COUNT(*) FROM titles t
            LEFT JOIN categories c ON c.id = t.category_id
            {TITLE_FILTER}
            "
        ))
        .bind(filter.category.as_deref())
        .bind(filter.genre.as_deref())
        .bind(filter.name.as_deref())
        .bind(filter.year)
        .fetch_one(&self.pool)
        .await?;
        let count = row_count(count);
        page.check(count)?;

        let rows = sqlx::query(&format!(
            "{TITLE_SELECT} {TITLE_FILTER} ORDER BY t.id LIMIT $5 OFFSET $6"
        ))
        .bind(filter.category.as_deref())
        .bind(filter.genre.as_deref())
        .bind(filter.name.as_deref())
        .bind(filter.year)
        .bind(bind_i64(page.limit()))
        .bind(bind_i64(page.offset()))
        .fetch_all(&self.pool)
        .await?;

        let mut titles = rows.iter().map(title_from_row).collect::<StoreResult<Vec<_>>>()?;
        self.load_genres(&mut titles).await?;
        Ok(Page::new(page, count, titles))
    }

    async fn insert_title(&self, title: NewTitle) -> StoreResult<TitleView> {
        let mut tx = self.pool.begin().await?;

        let mut errors = FieldErrors::new();
        check_title_name(&mut tx, &title.name, None, &mut errors).await?;
        let genres = resolve_genres(&mut tx, &title.genres, &mut errors).await?;
        let category = resolve_category(&mut tx, title.category.as_deref(), &mut errors).await?;
        errors.into_result()?;

        let id: i64 = sqlx::query_scalar(
            r"
            INSERT INTO titles (name, year, description, category_id)
            VALUES ($1, $2, $3, $4)
            RETURNING id
            ",
        )
        .bind(&title.name)
        .bind(title.year)
        .bind(&title.description)
        .bind(category)
        .fetch_one(&mut *tx)
        .await?;
        link_genres(&mut tx, id, &genres).await?;
        tx.commit().await?;

        tracing::info!(title_id = id, name = %title.name, "Title created");
        self.loaded_title(TitleId(id)).await
    }

    async fn patch_title(&self, id: TitleId, patch: TitlePatch) -> StoreResult<TitleView> {
        let mut tx = self.pool.begin().await?;

        let exists: Option<i64> = sqlx::query_scalar("SELECT id FROM titles WHERE id = $1 FOR UPDATE")
            .bind(id.0)
            .fetch_optional(&mut *tx)
            .await?;
        if exists.is_none() {
            return Err(YamdbError::not_found("title", id).into());
        }

        let mut errors = FieldErrors::new();
        if let Some(name) = &patch.name {
            check_title_name(&mut tx, name, Some(id), &mut errors).await?;
        }
        let genres = match &patch.genres {
            Some(slugs) => Some(resolve_genres(&mut tx, slugs, &mut errors).await?),
            None => None,
        };
        let category = match &patch.category {
            Some(slug) => Some(resolve_category(&mut tx, slug.as_deref(), &mut errors).await?),
            None => None,
        };
        errors.into_result()?;

        sqlx::query(
            r"
            UPDATE titles SET
                name = COALESCE($2, name),
                year = COALESCE($3, year),
                description = CASE WHEN $4 THEN $5 ELSE description END,
                category_id = CASE WHEN $6 THEN $7 ELSE category_id END
            WHERE id = $1
            ",
        )
        .bind(id.0)
        .bind(&patch.name)
        .bind(patch.year)
        .bind(patch.description.is_some())
        .bind(patch.description.clone().flatten())
        .bind(category.is_some())
        .bind(category.flatten())
        .execute(&mut *tx)
        .await?;

        if let Some(genres) = genres {
            sqlx::query("DELETE FROM genre_title WHERE title_id = $1")
                .bind(id.0)
                .execute(&mut *tx)
                .await?;
            link_genres(&mut tx, id.0, &genres).await?;
        }
        tx.commit().await?;

        self.loaded_title(id).await
    }

    async fn remove_title(&self, id: TitleId) -> StoreResult<()> {
        let result = sqlx::query("DELETE FROM titles WHERE id = $1")
            .bind(id.0)
            .execute(&self.pool)
            .await?;
        if result.rows_affected() == 0 {
            return Err(YamdbError::not_found("title", id).into());
        }
        tracing::info!(title_id = id.0, "Title deleted");
        Ok(())
    }

    async fn has_title(&self, id: TitleId) -> StoreResult<bool> {
        let exists: bool = sqlx::query_scalar("SELECT EXISTS (SELECT 1 FROM titles WHERE id = $1)")
            .bind(id.0)
            .fetch_one(&self.pool)
            .await?;
        Ok(exists)
    }
}

impl CatalogRepository for PostgresStore {
    fn create_taxon(&self, taxonomy: Taxonomy, taxon: NewTaxon) -> RepoFuture<'_, Taxon> {
        run(self.insert_taxon(taxonomy, taxon))
    }

    fn list_taxa(
        &self,
        taxonomy: Taxonomy,
        search: Option<String>,
        page: PageRequest,
    ) -> RepoFuture<'_, Page<Taxon>> {
        run(self.select_taxa(taxonomy, search, page))
    }

    fn delete_taxon(&self, taxonomy: Taxonomy, slug: String) -> RepoFuture<'_, ()> {
        run(self.remove_taxon(taxonomy, slug))
    }

    fn create_title(&self, title: NewTitle) -> RepoFuture<'_, TitleView> {
        run(self.insert_title(title))
    }

    fn get_title(&self, id: TitleId) -> RepoFuture<'_, Option<TitleView>> {
        run(self.fetch_title(id))
    }

    fn title_exists(&self, id: TitleId) -> RepoFuture<'_, bool> {
        run(self.has_title(id))
    }

    fn list_titles(
        &self,
        filter: TitleFilter,
        page: PageRequest,
    ) -> RepoFuture<'_, Page<TitleView>> {
        run(self.select_titles(filter, page))
    }

    fn update_title(&self, id: TitleId, patch: TitlePatch) -> RepoFuture<'_, TitleView> {
        run(self.patch_title(id, patch))
    }

    fn delete_title(&self, id: TitleId) -> RepoFuture<'_, ()> {
        run(self.remove_title(id))
    }
}
