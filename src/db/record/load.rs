use log::info;
use rusqlite::{params, Connection, OptionalExtension};

use crate::db::record::state::JobStatus;
use crate::db::record::JobRecord;

pub(crate) const RECORD_COLUMNS: &str = "aug_inchi, status, count, job_id";

/// Load the most popular records still waiting to be launched
///
/// Records are ordered by count, highest first. Ties keep registration order.
pub fn get_launch_candidates(conn: &Connection, limit: u32) -> rusqlite::Result<Vec<JobRecord>> {
    let sql = format!(
        "SELECT {RECORD_COLUMNS} FROM registration WHERE status = ?1 \
         ORDER BY count DESC, rowid ASC LIMIT ?2"
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(params![JobStatus::Created, limit], JobRecord::from_row)?;

    let records = rows.collect::<rusqlite::Result<Vec<JobRecord>>>()?;
    info!("Loaded {} created records from db (limit {limit})", records.len());
    Ok(records)
}

pub fn get_record(conn: &Connection, aug_inchi: &str) -> rusqlite::Result<Option<JobRecord>> {
    let sql = format!("SELECT {RECORD_COLUMNS} FROM registration WHERE aug_inchi = ?1");
    conn.query_row(&sql, [aug_inchi], JobRecord::from_row).optional()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::open::open_in_memory;

    fn register(conn: &Connection, aug_inchi: &str, status: &str, count: f64) {
        conn.execute(
            "INSERT INTO registration (aug_inchi, status, count) VALUES (?1, ?2, ?3)",
            params![aug_inchi, status, count],
        ).unwrap();
    }

    fn ids(records: &[JobRecord]) -> Vec<&str> {
        records.iter().map(|r| r.aug_inchi.as_str()).collect()
    }

    #[test]
    fn orders_by_count_and_applies_limit() {
        let conn = open_in_memory().unwrap();
        register(&conn, "five", "job_created", 5.0);
        register(&conn, "ten", "job_created", 10.0);
        register(&conn, "one", "job_created", 1.0);

        let records = get_launch_candidates(&conn, 2).unwrap();
        assert_eq!(ids(&records), ["ten", "five"]);
        assert!(records.iter().all(|r| r.status == JobStatus::Created && r.job_id.is_none()));
    }

    #[test]
    fn fractional_counts_are_ordered() {
        let conn = open_in_memory().unwrap();
        register(&conn, "a", "job_created", 2.5);
        register(&conn, "b", "job_created", 3.0);
        conn.execute(
            "INSERT INTO registration (aug_inchi, status, count) VALUES ('c', 'job_created', 2)",
            [],
        ).unwrap();

        let records = get_launch_candidates(&conn, 10).unwrap();
        assert_eq!(ids(&records), ["b", "a", "c"]);
        assert_eq!(records[1].count, 2.5);
        assert_eq!(records[2].count, 2.0);
    }

    #[test]
    fn ties_keep_registration_order() {
        let conn = open_in_memory().unwrap();
        register(&conn, "b", "job_created", 4.0);
        register(&conn, "a", "job_created", 4.0);
        register(&conn, "c", "job_created", 4.0);

        assert_eq!(ids(&get_launch_candidates(&conn, 10).unwrap()), ["b", "a", "c"]);
    }

    #[test]
    fn skips_records_in_other_states() {
        let conn = open_in_memory().unwrap();
        register(&conn, "launched", "job_launched", 100.0);
        register(&conn, "converged", "job_success", 50.0);
        register(&conn, "created", "job_created", 1.0);

        assert_eq!(ids(&get_launch_candidates(&conn, 10).unwrap()), ["created"]);
    }

    #[test]
    fn empty_store_is_not_an_error() {
        let conn = open_in_memory().unwrap();
        assert!(get_launch_candidates(&conn, 10).unwrap().is_empty());
        assert_eq!(get_record(&conn, "missing").unwrap(), None);
    }
}
