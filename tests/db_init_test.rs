mod helpers;

use helpers::test_db;

fn names(conn: &rusqlite::Connection, kind: &str) -> Vec<String> {
    conn.prepare("SELECT name FROM sqlite_master WHERE type = ?1 ORDER BY name")
        .unwrap()
        .query_map([kind], |row| row.get(0))
        .unwrap()
        .collect::<Result<Vec<_>, _>>()
        .unwrap()
}

#[test]
fn schema_creates_all_tables_and_indexes() {
    let conn = test_db();

    let tables = names(&conn, "table");
    for table in ["categories", "topics", "topic_history", "relations", "schema_meta"] {
        assert!(tables.contains(&table.to_string()), "{table} table missing");
    }

    let indexes = names(&conn, "index");
    for index in [
        "idx_topics_slug_category",
        "idx_topics_category",
        "idx_history_topic",
        "idx_relations_source",
        "idx_relations_target",
        "idx_topics_name_nocase",
    ] {
        assert!(indexes.contains(&index.to_string()), "{index} index missing");
    }
}

#[test]
fn uncategorized_slugs_are_unique() {
    let conn = test_db();
    conn.execute(
        "INSERT INTO topics (name, slug, created_at, updated_at) VALUES ('Rust', 'rust', 'now', 'now')",
        [],
    )
    .unwrap();
    let dup = conn.execute(
        "INSERT INTO topics (name, slug, created_at, updated_at) VALUES ('rust', 'rust', 'now', 'now')",
        [],
    );
    assert!(dup.is_err());
}

#[test]
fn check_constraints_reject_bad_rows() {
    let conn = test_db();
    let bad_type = conn.execute(
        "INSERT INTO topics (name, slug, content_type, created_at, updated_at) \
         VALUES ('X', 'x', 'yaml', 'now', 'now')",
        [],
    );
    assert!(bad_type.is_err());

    conn.execute(
        "INSERT INTO topics (name, slug, created_at, updated_at) VALUES ('A', 'a', 'now', 'now')",
        [],
    )
    .unwrap();
    conn.execute(
        "INSERT INTO topics (name, slug, created_at, updated_at) VALUES ('B', 'b', 'now', 'now')",
        [],
    )
    .unwrap();
    let bad_strength = conn.execute(
        "INSERT INTO relations (source_id, target_id, relation_type, strength, created_at, updated_at) \
         VALUES (1, 2, 'x', 1.5, 'now', 'now')",
        [],
    );
    assert!(bad_strength.is_err());
}

#[test]
fn init_schema_is_idempotent() {
    let conn = test_db();
    scriptorium::db::schema::init_schema(&conn).unwrap();
    assert_eq!(
        scriptorium::db::migrations::get_schema_version(&conn).unwrap(),
        scriptorium::db::migrations::CURRENT_SCHEMA_VERSION
    );
}
