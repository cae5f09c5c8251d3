use sqlx::PgPool;

/// All `id` columns must be bigint.
#[sqlx::test(migrations = "../../db/migrations")]
async fn test_all_pks_are_bigint(pool: PgPool) {
    let rows: Vec<(String, String)> = sqlx::query_as(
        "SELECT table_name, data_type
         FROM information_schema.columns
         WHERE column_name = 'id'
           AND table_schema = 'public'
           AND table_name != '_sqlx_migrations'
         ORDER BY table_name",
    )
    .fetch_all(&pool)
    .await
    .unwrap();

    assert!(!rows.is_empty());
    for (table, data_type) in &rows {
        assert_eq!(data_type, "bigint", "Table {table}.id should be bigint");
    }
}

/// Every table (except _sqlx_migrations) must have created_at and updated_at as timestamptz.
#[sqlx::test(migrations = "../../db/migrations")]
async fn test_all_tables_have_timestamps(pool: PgPool) {
    let tables: Vec<(String,)> = sqlx::query_as(
        "SELECT table_name
         FROM information_schema.tables
         WHERE table_schema = 'public'
           AND table_type = 'BASE TABLE'
           AND table_name != '_sqlx_migrations'
         ORDER BY table_name",
    )
    .fetch_all(&pool)
    .await
    .unwrap();

    for (table,) in &tables {
        for col in ["created_at", "updated_at"] {
            let result: Option<(String,)> = sqlx::query_as(&format!(
                "SELECT data_type
                 FROM information_schema.columns
                 WHERE table_schema = 'public'
                   AND table_name = '{table}'
                   AND column_name = '{col}'"
            ))
            .fetch_optional(&pool)
            .await
            .unwrap();

            let (data_type,) =
                result.unwrap_or_else(|| panic!("Table {table} is missing column {col}"));
            assert_eq!(
                data_type, "timestamp with time zone",
                "Table {table}.{col} should be timestamptz, got {data_type}"
            );
        }
    }
}

/// The uniqueness rules the ledger depends on exist under their expected names.
#[sqlx::test(migrations = "../../db/migrations")]
async fn test_ledger_unique_constraints_exist(pool: PgPool) {
    for name in [
        classroll_db::repositories::registration_repo::UQ_STUDENT_SESSION,
        classroll_db::repositories::registration_repo::UQ_STUDENT_DATE,
        classroll_db::repositories::attendance_repo::UQ_STUDENT_SESSION,
    ] {
        let (count,): (i64,) = sqlx::query_as(
            "SELECT COUNT(*) FROM information_schema.table_constraints
             WHERE constraint_type = 'UNIQUE' AND constraint_name = $1",
        )
        .bind(name)
        .fetch_one(&pool)
        .await
        .unwrap();
        assert_eq!(count, 1, "constraint {name} should exist");
    }
}

/// `updated_at` is maintained by trigger.
#[sqlx::test(migrations = "../../db/migrations")]
async fn test_updated_at_trigger_fires(pool: PgPool) {
    let (id, before): (i64, chrono::DateTime<chrono::Utc>) = sqlx::query_as(
        "INSERT INTO training_classes (code, name) VALUES ('TRG', 'Trigger') RETURNING id, updated_at",
    )
    .fetch_one(&pool)
    .await
    .unwrap();

    let (after,): (chrono::DateTime<chrono::Utc>,) = sqlx::query_as(
        "UPDATE training_classes SET name = 'Trigger 2' WHERE id = $1 RETURNING updated_at",
    )
    .bind(id)
    .fetch_one(&pool)
    .await
    .unwrap();

    assert!(after >= before);
}
