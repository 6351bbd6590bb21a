use anyhow::{Context, Result};
use rusqlite::Connection;

use super::connection::{get_connection, DbPool};

/// Create every table that does not exist yet
pub fn init_database(conn: &Connection) -> Result<()> {
    run_script(conn, include_str!("schema.sql"))?;
    log::info!("Database schema initialized");
    Ok(())
}

/// Drop all tables and recreate them empty
pub fn reset_database(conn: &Connection) -> Result<()> {
    run_script(conn, include_str!("reset.sql"))?;
    run_script(conn, include_str!("schema.sql"))?;
    log::info!("Database schema reset successfully");
    Ok(())
}

/// `init_database` on a connection checked out of `pool`
pub fn init_pool(pool: &DbPool) -> Result<()> {
    let conn = get_connection(pool)?;
    init_database(&conn)
}

/// `reset_database` on a connection checked out of `pool`
pub fn reset_pool(pool: &DbPool) -> Result<()> {
    let conn = get_connection(pool)?;
    reset_database(&conn)
}

fn run_script(conn: &Connection, sql: &str) -> Result<()> {
    let statements = split_sql_statements(sql);

    for (idx, statement) in statements.iter().enumerate() {
        execute_sql(conn, statement)
            .with_context(|| format!("Failed to execute statement {}", idx + 1))?;
    }
    Ok(())
}

fn split_sql_statements(sql: &str) -> Vec<String> {
    sql.split(';')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

fn execute_sql(conn: &Connection, sql: &str) -> Result<()> {
    conn.execute(sql, [])
        .context("Failed to execute SQL statement")
        .map(|_| ())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::database::create_memory_pool;

    fn count_tables(conn: &Connection) -> i64 {
        conn.query_row(
            "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table'",
            [],
            |r| r.get(0),
        )
        .unwrap()
    }

    #[test]
    fn test_split_sql_statements() {
        let statements = split_sql_statements("CREATE TABLE a (x);\n\n CREATE TABLE b (y);  ");
        assert_eq!(statements, vec!["CREATE TABLE a (x)", "CREATE TABLE b (y)"]);
    }

    #[test]
    fn test_init_is_idempotent_and_reset_empties() {
        let pool = create_memory_pool().unwrap();
        let conn = get_connection(&pool).unwrap();

        init_database(&conn).unwrap();
        init_database(&conn).unwrap();
        assert_eq!(count_tables(&conn), 13);

        conn.execute("INSERT INTO players (id, name, platform) VALUES (1, 'A', 1)", [])
            .unwrap();
        reset_database(&conn).unwrap();

        let players: i64 = conn
            .query_row("SELECT COUNT(*) FROM players", [], |r| r.get(0))
            .unwrap();
        assert_eq!(players, 0);
        assert_eq!(count_tables(&conn), 13);
    }

    #[test]
    fn test_pool_helpers() {
        let pool = create_memory_pool().unwrap();
        init_pool(&pool).unwrap();
        {
            let conn = get_connection(&pool).unwrap();
            conn.execute("INSERT INTO players (id, name, platform) VALUES (1, 'A', 1)", [])
                .unwrap();
        }

        reset_pool(&pool).unwrap();
        let conn = get_connection(&pool).unwrap();
        let players: i64 = conn
            .query_row("SELECT COUNT(*) FROM players", [], |r| r.get(0))
            .unwrap();
        assert_eq!(players, 0);
    }
}
