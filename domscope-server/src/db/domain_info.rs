//! `domain_info` table operations
//!
//! Every multi-row write runs in a single transaction. Rows are written from
//! `PendingRecord`s; ids and timestamps are assigned here.

use crate::enrichment::PendingRecord;
use chrono::Utc;
use domscope_common::db::{DomainRecord, DOMAIN_INFO_COLUMNS};
use domscope_common::{DomainType, Error, Result};
use sqlx::{Row, SqliteConnection, SqlitePool};
use std::collections::HashMap;
use uuid::Uuid;

/// Refreshed record paired with the identity of the row it overwrites
#[derive(Debug, Clone)]
pub struct RefreshedRecord {
    pub id: Option<Uuid>,
    pub record: PendingRecord,
}

/// Row counts written by [`bulk_upsert`]
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UpsertCounts {
    pub updated: usize,
    pub inserted: usize,
}

/// Load the record named `domain_name`
pub async fn find_by_name(pool: &SqlitePool, domain_name: &str) -> Result<Option<DomainRecord>> {
    let row = sqlx::query(&format!(
        "SELECT {} FROM domain_info WHERE domain_name = ?",
        DOMAIN_INFO_COLUMNS
    ))
    .bind(domain_name)
    .fetch_optional(pool)
    .await?;

    row.as_ref().map(DomainRecord::from_row).transpose()
}

/// Insert the records discovered for one root in a single transaction
///
/// `apex` is inserted unconditionally: if its name already exists the
/// transaction rolls back and the UNIQUE violation is returned (see
/// [`Error::is_unique_violation`]). Other records whose name already exists
/// are skipped. Returns the inserted rows, apex first.
pub async fn bulk_insert(
    pool: &SqlitePool,
    apex: &PendingRecord,
    others: &[PendingRecord],
) -> Result<Vec<DomainRecord>> {
    let mut tx = pool.begin().await?;
    let mut inserted = Vec::with_capacity(others.len() + 1);

    let apex_row = insert_row(&mut *tx, apex, false).await?;
    inserted.extend(apex_row);

    for record in others {
        match insert_row(&mut *tx, record, true).await? {
            Some(row) => inserted.push(row),
            None => {
                tracing::debug!(
                    domain = %record.domain_name,
                    "Skipping already known domain"
                );
            }
        }
    }

    tx.commit().await?;

    Ok(inserted)
}

/// Write refreshed records in a single transaction
///
/// Records with an identity overwrite that row's attributes; the others are
/// inserted, or overwrite the row that took their name since the identity
/// snapshot was read.
pub async fn bulk_upsert(pool: &SqlitePool, records: &[RefreshedRecord]) -> Result<UpsertCounts> {
    let mut tx = pool.begin().await?;
    let mut counts = UpsertCounts::default();
    let now = Utc::now().to_rfc3339();

    for refreshed in records {
        let record = &refreshed.record;
        let dns_settings = encode_dns_settings(record)?;

        match refreshed.id {
            Some(id) => {
                let result = sqlx::query(
                    r#"
                    UPDATE domain_info SET
                        domain_type = ?,
                        ip_address = ?,
                        geo_city = ?,
                        geo_country = ?,
                        network_owner_name = ?,
                        is_active = ?,
                        is_anycast_node = ?,
                        dns_settings = ?,
                        updated_at = ?
                    WHERE id = ?
                    "#,
                )
                .bind(record.domain_type.as_str())
                .bind(&record.ip_address)
                .bind(&record.geo_city)
                .bind(&record.geo_country)
                .bind(&record.network_owner_name)
                .bind(record.is_active)
                .bind(record.is_anycast_node)
                .bind(&dns_settings)
                .bind(&now)
                .bind(id.to_string())
                .execute(&mut *tx)
                .await?;

                counts.updated += result.rows_affected() as usize;
            }
            None => {
                let new_id = Uuid::new_v4().to_string();
                let stored_id: String = sqlx::query_scalar(
                    r#"
                    INSERT INTO domain_info (
                        id, domain_name, domain_type, ip_address, geo_city, geo_country,
                        network_owner_name, is_active, is_anycast_node, dns_settings,
                        created_at, updated_at
                    ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
                    ON CONFLICT(domain_name) DO UPDATE SET
                        domain_type = excluded.domain_type,
                        ip_address = excluded.ip_address,
                        geo_city = excluded.geo_city,
                        geo_country = excluded.geo_country,
                        network_owner_name = excluded.network_owner_name,
                        is_active = excluded.is_active,
                        is_anycast_node = excluded.is_anycast_node,
                        dns_settings = excluded.dns_settings,
                        updated_at = excluded.updated_at
                    RETURNING id
                    "#,
                )
                .bind(&new_id)
                .bind(&record.domain_name)
                .bind(record.domain_type.as_str())
                .bind(&record.ip_address)
                .bind(&record.geo_city)
                .bind(&record.geo_country)
                .bind(&record.network_owner_name)
                .bind(record.is_active)
                .bind(record.is_anycast_node)
                .bind(&dns_settings)
                .bind(&now)
                .bind(&now)
                .fetch_one(&mut *tx)
                .await?;

                if stored_id == new_id {
                    counts.inserted += 1;
                } else {
                    // Stored after the snapshot was taken
                    counts.updated += 1;
                }
            }
        }
    }

    tx.commit().await?;

    Ok(counts)
}

/// One page of records ordered by name, with the total row count
pub async fn list_paged(
    pool: &SqlitePool,
    limit: i64,
    offset: i64,
) -> Result<(i64, Vec<DomainRecord>)> {
    let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM domain_info")
        .fetch_one(pool)
        .await?;

    let rows = sqlx::query(&format!(
        "SELECT {} FROM domain_info ORDER BY domain_name LIMIT ? OFFSET ?",
        DOMAIN_INFO_COLUMNS
    ))
    .bind(limit)
    .bind(offset)
    .fetch_all(pool)
    .await?;

    let records = rows
        .iter()
        .map(DomainRecord::from_row)
        .collect::<Result<Vec<_>>>()?;

    Ok((total, records))
}

/// Name to identity index of every stored record
pub async fn list_name_identity_pairs(pool: &SqlitePool) -> Result<HashMap<String, Uuid>> {
    let rows = sqlx::query("SELECT id, domain_name FROM domain_info")
        .fetch_all(pool)
        .await?;

    rows.iter()
        .map(|row| {
            let id: String = row.get("id");
            let name: String = row.get("domain_name");
            let id = Uuid::parse_str(&id)
                .map_err(|e| Error::Internal(format!("Invalid id '{}': {}", id, e)))?;
            Ok((name, id))
        })
        .collect()
}

/// Names of all ROOT records, sorted
pub async fn list_root_names(pool: &SqlitePool) -> Result<Vec<String>> {
    let names = sqlx::query_scalar(
        "SELECT domain_name FROM domain_info WHERE domain_type = ? ORDER BY domain_name",
    )
    .bind(DomainType::Root.as_str())
    .fetch_all(pool)
    .await?;

    Ok(names)
}

/// Insert one record; with `skip_existing` a name conflict yields `None`
async fn insert_row(
    conn: &mut SqliteConnection,
    record: &PendingRecord,
    skip_existing: bool,
) -> Result<Option<DomainRecord>> {
    let now = Utc::now().to_rfc3339();
    let conflict_clause = if skip_existing {
        "ON CONFLICT(domain_name) DO NOTHING"
    } else {
        ""
    };

    let row = sqlx::query(&format!(
        r#"
        INSERT INTO domain_info (
            id, domain_name, domain_type, ip_address, geo_city, geo_country,
            network_owner_name, is_active, is_anycast_node, dns_settings,
            created_at, updated_at
        ) VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?)
        {}
        RETURNING {}
        "#,
        conflict_clause, DOMAIN_INFO_COLUMNS
    ))
    .bind(Uuid::new_v4().to_string())
    .bind(&record.domain_name)
    .bind(record.domain_type.as_str())
    .bind(&record.ip_address)
    .bind(&record.geo_city)
    .bind(&record.geo_country)
    .bind(&record.network_owner_name)
    .bind(record.is_active)
    .bind(record.is_anycast_node)
    .bind(encode_dns_settings(record)?)
    .bind(&now)
    .bind(&now)
    .fetch_optional(&mut *conn)
    .await?;

    row.as_ref().map(DomainRecord::from_row).transpose()
}

fn encode_dns_settings(record: &PendingRecord) -> Result<String> {
    serde_json::to_string(&record.dns_settings)
        .map_err(|e| Error::Internal(format!("Failed to serialize dns_settings: {}", e)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use domscope_common::db::{init_memory_database, DnsSettings};

    fn pending(name: &str, domain_type: DomainType) -> PendingRecord {
        let mut dns_settings = DnsSettings::new();
        dns_settings.insert("A".to_string(), vec!["192.0.2.1".to_string()]);

        PendingRecord {
            domain_name: name.to_string(),
            domain_type,
            ip_address: Some("192.0.2.1".to_string()),
            geo_city: "Paris".to_string(),
            geo_country: "FR".to_string(),
            network_owner_name: "ACME".to_string(),
            is_active: true,
            is_anycast_node: false,
            dns_settings,
        }
    }

    #[tokio::test]
    async fn test_bulk_insert_and_find() {
        let pool = init_memory_database().await.unwrap();

        let inserted = bulk_insert(
            &pool,
            &pending("example.com", DomainType::Root),
            &[pending("a.example.com", DomainType::Subdomain)],
        )
        .await
        .unwrap();

        assert_eq!(inserted.len(), 2);
        assert_eq!(inserted[0].domain_name, "example.com");
        assert_eq!(inserted[0].created_at, inserted[0].updated_at);

        let found = find_by_name(&pool, "a.example.com").await.unwrap().unwrap();
        assert_eq!(found, inserted[1]);
        assert_eq!(found.dns_settings["A"], vec!["192.0.2.1".to_string()]);
        assert!(found.is_active);

        assert!(find_by_name(&pool, "missing.example.com").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_bulk_insert_duplicate_apex_rolls_back() {
        let pool = init_memory_database().await.unwrap();
        bulk_insert(&pool, &pending("example.com", DomainType::Root), &[])
            .await
            .unwrap();

        let err = bulk_insert(
            &pool,
            &pending("example.com", DomainType::Root),
            &[pending("new.example.com", DomainType::Subdomain)],
        )
        .await
        .unwrap_err();

        assert!(err.is_unique_violation());
        assert!(find_by_name(&pool, "new.example.com").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_bulk_insert_skips_known_subdomain() {
        let pool = init_memory_database().await.unwrap();
        bulk_insert(
            &pool,
            &pending("example.com", DomainType::Root),
            &[pending("shared.example.com", DomainType::Subdomain)],
        )
        .await
        .unwrap();

        let inserted = bulk_insert(
            &pool,
            &pending("other.example.com", DomainType::Subdomain),
            &[pending("shared.example.com", DomainType::Subdomain)],
        )
        .await
        .unwrap();

        assert_eq!(inserted.len(), 1);
        assert_eq!(inserted[0].domain_name, "other.example.com");
    }

    #[tokio::test]
    async fn test_bulk_upsert_keeps_identity() {
        let pool = init_memory_database().await.unwrap();
        let original = bulk_insert(&pool, &pending("example.com", DomainType::Root), &[])
            .await
            .unwrap()
            .remove(0);

        let mut changed = pending("example.com", DomainType::Root);
        changed.geo_city = "Berlin".to_string();
        changed.dns_settings = DnsSettings::new();

        let counts = bulk_upsert(
            &pool,
            &[
                RefreshedRecord {
                    id: Some(original.id),
                    record: changed,
                },
                RefreshedRecord {
                    id: None,
                    record: pending("www.example.com", DomainType::Subdomain),
                },
            ],
        )
        .await
        .unwrap();

        assert_eq!(counts, UpsertCounts { updated: 1, inserted: 1 });

        let refreshed = find_by_name(&pool, "example.com").await.unwrap().unwrap();
        assert_eq!(refreshed.id, original.id);
        assert_eq!(refreshed.geo_city, "Berlin");
        assert!(refreshed.dns_settings.is_empty());
        assert_eq!(refreshed.created_at, original.created_at);
        assert!(refreshed.updated_at >= original.updated_at);
    }

    #[tokio::test]
    async fn test_bulk_upsert_insert_conflict_updates_existing_row() {
        let pool = init_memory_database().await.unwrap();
        let original = bulk_insert(&pool, &pending("example.com", DomainType::Root), &[])
            .await
            .unwrap()
            .remove(0);

        let mut changed = pending("example.com", DomainType::Root);
        changed.geo_country = "DE".to_string();

        let counts = bulk_upsert(&pool, &[RefreshedRecord { id: None, record: changed }])
            .await
            .unwrap();

        assert_eq!(counts, UpsertCounts { updated: 1, inserted: 0 });
        let (total, records) = list_paged(&pool, 10, 0).await.unwrap();
        assert_eq!(total, 1);
        assert_eq!(records[0].id, original.id);
        assert_eq!(records[0].geo_country, "DE");
    }

    #[tokio::test]
    async fn test_list_paged_ordered_with_total() {
        let pool = init_memory_database().await.unwrap();
        bulk_insert(
            &pool,
            &pending("example.com", DomainType::Root),
            &[
                pending("c.example.com", DomainType::Subdomain),
                pending("a.example.com", DomainType::Subdomain),
                pending("b.example.com", DomainType::Subdomain),
            ],
        )
        .await
        .unwrap();

        let (total, page) = list_paged(&pool, 2, 1).await.unwrap();

        assert_eq!(total, 4);
        let names: Vec<&str> = page.iter().map(|r| r.domain_name.as_str()).collect();
        assert_eq!(names, vec!["b.example.com", "c.example.com"]);
    }

    #[tokio::test]
    async fn test_root_names_and_identity_index() {
        let pool = init_memory_database().await.unwrap();
        let inserted = bulk_insert(
            &pool,
            &pending("example.com", DomainType::Root),
            &[pending("www.example.com", DomainType::Subdomain)],
        )
        .await
        .unwrap();
        bulk_insert(&pool, &pending("example.org", DomainType::Root), &[])
            .await
            .unwrap();

        let roots = list_root_names(&pool).await.unwrap();
        assert_eq!(roots, vec!["example.com".to_string(), "example.org".to_string()]);

        let index = list_name_identity_pairs(&pool).await.unwrap();
        assert_eq!(index.len(), 3);
        assert_eq!(index["www.example.com"], inserted[1].id);
    }
}
