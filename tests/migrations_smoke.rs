use sqlx::Row;

fn database_url() -> String {
    dotenvy::dotenv().ok();

    for key in ["TEST_DATABASE_URL", "DATABASE_URL"] {
        if let Ok(url) = std::env::var(key) {
            if !url.trim().is_empty() {
                return url;
            }
        }
    }

    let server = std::env::var("POSTGRES_SERVER").unwrap_or_else(|_| "localhost".into());
    let port = std::env::var("POSTGRES_PORT").unwrap_or_else(|_| "5432".into());
    let user = std::env::var("POSTGRES_USER").unwrap_or_else(|_| "studyhall".into());
    let password = std::env::var("POSTGRES_PASSWORD").unwrap_or_default();
    let db = std::env::var("POSTGRES_DB").unwrap_or_else(|_| "studyhall_db".into());

    format!("postgresql://{user}:{password}@{server}:{port}/{db}")
}

#[tokio::test]
async fn migrations_apply_and_tables_exist() -> anyhow::Result<()> {
    let pool = sqlx::postgres::PgPoolOptions::new()
        .max_connections(1)
        .acquire_timeout(std::time::Duration::from_secs(3))
        .connect(&database_url())
        .await?;

    let migrations_dir =
        std::env::var("STUDYHALL_MIGRATIONS_DIR").unwrap_or_else(|_| "migrations".to_string());
    let migrator = sqlx::migrate::Migrator::new(std::path::Path::new(&migrations_dir)).await?;
    migrator.run(&pool).await?;

    let tables = ["users", "student_teachers", "subjects", "quizzes", "quiz_answers", "feedback"];

    for table in tables {
        let row = sqlx::query("SELECT to_regclass($1)::text").bind(table).fetch_one(&pool).await?;
        let regclass: Option<String> = row.try_get(0)?;
        assert!(regclass.is_some(), "expected table {table} to exist after migrations");
    }

    let unique: Option<String> = sqlx::query_scalar(
        "SELECT conname::text FROM pg_constraint
         WHERE conrelid = 'quiz_answers'::regclass AND contype = 'u'
         LIMIT 1",
    )
    .fetch_optional(&pool)
    .await?;
    assert!(unique.is_some(), "quiz_answers needs a unique (quiz_id, student_id) constraint");

    Ok(())
}
