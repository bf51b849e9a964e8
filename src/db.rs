use std::path::Path;

use anyhow::Result;
use rusqlite::{Connection, OptionalExtension};

use crate::triples::Triple;

pub fn connect(path: &Path) -> Result<Connection> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let conn = Connection::open(path)?;
    conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA foreign_keys=ON;")?;
    Ok(conn)
}

pub fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        "
        CREATE TABLE IF NOT EXISTS nodes (
            id          INTEGER PRIMARY KEY,
            name        TEXT UNIQUE NOT NULL,
            created_at  TEXT NOT NULL DEFAULT (datetime('now'))
        );

        -- One row per loaded triple; identical facts are not merged.
        CREATE TABLE IF NOT EXISTS relationships (
            id          INTEGER PRIMARY KEY,
            subject_id  INTEGER NOT NULL REFERENCES nodes(id),
            label       TEXT NOT NULL,
            object_id   INTEGER NOT NULL REFERENCES nodes(id),
            created_at  TEXT NOT NULL DEFAULT (datetime('now'))
        );
        CREATE INDEX IF NOT EXISTS idx_rel_subject ON relationships(subject_id);
        CREATE INDEX IF NOT EXISTS idx_rel_object ON relationships(object_id);
        CREATE INDEX IF NOT EXISTS idx_rel_label ON relationships(label);
        ",
    )?;
    Ok(())
}

pub fn clear(conn: &Connection) -> Result<()> {
    conn.execute_batch("DELETE FROM relationships; DELETE FROM nodes;")?;
    Ok(())
}

pub struct LoadStats {
    pub triples: usize,
    pub new_nodes: usize,
}

/// Upsert subject/object nodes by name and add one relationship per triple.
pub fn load_triples(conn: &Connection, triples: &[Triple]) -> Result<LoadStats> {
    let tx = conn.unchecked_transaction()?;
    let mut new_nodes = 0;
    {
        let mut insert_node = tx.prepare("INSERT OR IGNORE INTO nodes (name) VALUES (?1)")?;
        let mut node_id = tx.prepare("SELECT id FROM nodes WHERE name = ?1")?;
        let mut insert_rel = tx.prepare(
            "INSERT INTO relationships (subject_id, label, object_id) VALUES (?1, ?2, ?3)",
        )?;

        let mut upsert = |name: &str| -> Result<i64> {
            new_nodes += insert_node.execute([name])?;
            Ok(node_id.query_row([name], |row| row.get(0))?)
        };

        for t in triples {
            let subject = upsert(&t.subject)?;
            let object = upsert(&t.object)?;
            insert_rel.execute(rusqlite::params![subject, t.relationship, object])?;
        }
    }
    tx.commit()?;
    Ok(LoadStats {
        triples: triples.len(),
        new_nodes,
    })
}

pub struct GraphStats {
    pub nodes: i64,
    pub relationships: i64,
    pub top_labels: Vec<(String, i64)>,
}

pub fn graph_stats(conn: &Connection, top: usize) -> Result<GraphStats> {
    let nodes = conn.query_row("SELECT COUNT(*) FROM nodes", [], |r| r.get(0))?;
    let relationships = conn.query_row("SELECT COUNT(*) FROM relationships", [], |r| r.get(0))?;
    let mut stmt = conn.prepare(
        "SELECT label, COUNT(*) AS n FROM relationships
         GROUP BY label ORDER BY n DESC, label LIMIT ?1",
    )?;
    let top_labels = stmt
        .query_map([top as i64], |row| Ok((row.get(0)?, row.get(1)?)))?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(GraphStats {
        nodes,
        relationships,
        top_labels,
    })
}

/// Outgoing `(label, object)` pairs of a node, in load order.
pub fn neighbors(conn: &Connection, name: &str) -> Result<Vec<(String, String)>> {
    let Some(id): Option<i64> = conn
        .query_row("SELECT id FROM nodes WHERE name = ?1", [name], |r| r.get(0))
        .optional()?
    else {
        return Ok(Vec::new());
    };
    let mut stmt = conn.prepare(
        "SELECT r.label, o.name FROM relationships r
         JOIN nodes o ON o.id = r.object_id
         WHERE r.subject_id = ?1 ORDER BY r.id",
    )?;
    let rows = stmt
        .query_map([id], |row| Ok((row.get(0)?, row.get(1)?)))?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn triple(s: &str, r: &str, o: &str) -> Triple {
        Triple {
            subject: s.into(),
            relationship: r.into(),
            object: o.into(),
        }
    }

    fn memory() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        init_schema(&conn).unwrap();
        conn
    }

    #[test]
    fn nodes_are_shared_by_name() {
        let conn = memory();
        let stats = load_triples(
            &conn,
            &[
                triple("Shelter (Org)", "speaks", "English"),
                triple("Pantry (Bank)", "speaks", "English"),
            ],
        )
        .unwrap();
        assert_eq!(stats.triples, 2);
        assert_eq!(stats.new_nodes, 3);
        let g = graph_stats(&conn, 5).unwrap();
        assert_eq!(g.nodes, 3);
        assert_eq!(g.relationships, 2);
        assert_eq!(g.top_labels, vec![("speaks".to_string(), 2)]);
    }

    #[test]
    fn repeated_triples_add_edges_not_nodes() {
        let conn = memory();
        let t = [triple("Shelter (Org)", "offers", "Shelter")];
        load_triples(&conn, &t).unwrap();
        let again = load_triples(&conn, &t).unwrap();
        assert_eq!(again.new_nodes, 0);
        let g = graph_stats(&conn, 5).unwrap();
        assert_eq!(g.nodes, 2);
        assert_eq!(g.relationships, 2);
    }

    #[test]
    fn neighbors_in_load_order() {
        let conn = memory();
        load_triples(
            &conn,
            &[
                triple("A", "serves", "adults"),
                triple("A", "costs", "Free"),
                triple("B", "serves", "adults"),
            ],
        )
        .unwrap();
        assert_eq!(
            neighbors(&conn, "A").unwrap(),
            vec![
                ("serves".to_string(), "adults".to_string()),
                ("costs".to_string(), "Free".to_string()),
            ]
        );
        assert!(neighbors(&conn, "missing").unwrap().is_empty());
    }

    #[test]
    fn clear_empties_graph() {
        let conn = memory();
        load_triples(&conn, &[triple("A", "serves", "adults")]).unwrap();
        clear(&conn).unwrap();
        assert_eq!(graph_stats(&conn, 5).unwrap().nodes, 0);
    }
}
