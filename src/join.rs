use std::collections::{HashMap, HashSet};

use itertools::Itertools;
use tracing::{info, warn};

use crate::dataset::{DemandFactor, GeographicFactor, Keyed, RoleRecord, SalaryBand};

/// Inner join on role name: salary ⋈ demand, then ⋈ geographic.
///
/// Output order follows the salary rows. A role missing from any of the three
/// datasets is dropped with a warning naming the dataset it is missing from.
/// Role names are compared byte for byte.
pub fn join(
    salary: &[SalaryBand],
    demand: &[DemandFactor],
    geographic: &[GeographicFactor],
) -> Vec<RoleRecord> {
    warn_duplicates("salary", salary);
    let demand_by_role = index_by_role("demand", demand);
    let geo_by_role = index_by_role("geographic", geographic);

    let mut seen = HashSet::new();
    let mut joined = Vec::with_capacity(salary.len());
    for band in salary {
        if !seen.insert(band.role.as_str()) {
            continue;
        }
        let Some(demand) = demand_by_role.get(band.role.as_str()) else {
            warn!(role = %band.role, "dropping role: missing from demand dataset");
            continue;
        };
        let Some(geo) = geo_by_role.get(band.role.as_str()) else {
            warn!(role = %band.role, "dropping role: missing from geographic dataset");
            continue;
        };
        joined.push(RoleRecord {
            role: band.role.clone(),
            entry: band.entry,
            mid: band.mid,
            senior: band.senior,
            demand_factor: demand.factor,
            geographic_factor: geo.factor,
        });
    }
    warn_unmatched("demand", demand, &seen);
    warn_unmatched("geographic", geographic, &seen);
    info!(
        salary_rows = salary.len(),
        joined_rows = joined.len(),
        "joined role tables"
    );
    joined
}

/// First occurrence of a role wins.
fn index_by_role<'a, T: Keyed>(name: &str, rows: &'a [T]) -> HashMap<&'a str, &'a T> {
    warn_duplicates(name, rows);
    let mut map = HashMap::with_capacity(rows.len());
    for row in rows {
        map.entry(row.role()).or_insert(row);
    }
    map
}

/// Factor rows whose role has no salary band.
fn warn_unmatched<T: Keyed>(name: &str, rows: &[T], salary_roles: &HashSet<&str>) {
    for role in rows.iter().map(Keyed::role).unique() {
        if !salary_roles.contains(role) {
            warn!(dataset = name, role, "dropping role: missing from salary dataset");
        }
    }
}

fn warn_duplicates<T: Keyed>(name: &str, rows: &[T]) {
    for role in rows.iter().map(Keyed::role).duplicates() {
        warn!(dataset = name, role, "duplicate role key; keeping first occurrence");
    }
}

#[cfg(test)]
mod tests {
    use std::io;
    use std::sync::{Arc, Mutex};

    use super::*;

    #[derive(Clone, Default)]
    struct LogBuffer(Arc<Mutex<Vec<u8>>>);

    impl io::Write for LogBuffer {
        fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
            self.0.lock().unwrap().extend_from_slice(buf);
            Ok(buf.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn with_logs<R>(f: impl FnOnce() -> R) -> (R, String) {
        let buffer = LogBuffer::default();
        let writer = buffer.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_writer(move || writer.clone())
            .with_ansi(false)
            .finish();
        let out = tracing::subscriber::with_default(subscriber, f);
        let logs = String::from_utf8(buffer.0.lock().unwrap().clone()).unwrap();
        (out, logs)
    }

    fn band(role: &str) -> SalaryBand {
        SalaryBand {
            role: role.into(),
            entry: 1.0,
            mid: 2.0,
            senior: 3.0,
        }
    }

    fn demand(role: &str, factor: f64) -> DemandFactor {
        DemandFactor {
            role: role.into(),
            factor,
        }
    }

    fn geo(role: &str, factor: f64) -> GeographicFactor {
        GeographicFactor {
            role: role.into(),
            factor,
        }
    }

    #[test]
    fn only_roles_in_all_three_survive() {
        let out = join(
            &[band("A"), band("B")],
            &[demand("A", 0.1), demand("C", 0.2)],
            &[geo("A", 0.05), geo("B", 0.06)],
        );
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].role, "A");
        assert_eq!(out[0].demand_factor, 0.1);
        assert_eq!(out[0].geographic_factor, 0.05);
        assert_eq!(out[0].senior, 3.0);
    }

    #[test]
    fn missing_demand_drops_role_even_with_geo() {
        let out = join(
            &[band("A"), band("B")],
            &[demand("A", 0.1)],
            &[geo("A", 0.0), geo("B", 0.0)],
        );
        assert!(out.iter().all(|r| r.role != "B"));
    }

    #[test]
    fn keys_are_case_sensitive() {
        let out = join(
            &[band("Data Analyst")],
            &[demand("data analyst", 0.1)],
            &[geo("Data Analyst", 0.0)],
        );
        assert!(out.is_empty());
    }

    #[test]
    fn order_follows_salary_rows() {
        let out = join(
            &[band("Z"), band("A"), band("M")],
            &[demand("A", 0.0), demand("M", 0.0), demand("Z", 0.0)],
            &[geo("M", 0.0), geo("Z", 0.0), geo("A", 0.0)],
        );
        let roles: Vec<&str> = out.iter().map(|r| r.role.as_str()).collect();
        assert_eq!(roles, vec!["Z", "A", "M"]);
    }

    #[test]
    fn duplicate_factor_keeps_first() {
        let out = join(&[band("A")], &[demand("A", 0.1), demand("A", 0.9)], &[geo("A", 0.0)]);
        assert_eq!(out.len(), 1);
        assert_eq!(out[0].demand_factor, 0.1);
    }

    #[test]
    fn duplicate_salary_row_yields_one_record() {
        let out = join(&[band("A"), band("A")], &[demand("A", 0.1)], &[geo("A", 0.0)]);
        assert_eq!(out.len(), 1);
    }

    #[test]
    fn every_dropped_role_is_logged() {
        let (out, logs) = with_logs(|| {
            join(
                &[band("A"), band("B")],
                &[demand("A", 0.1), demand("C", 0.2), demand("C", 0.3)],
                &[geo("A", 0.0), geo("G", 0.0)],
            )
        });
        assert_eq!(out.len(), 1);
        let warned = |needles: &[&str]| {
            logs.lines()
                .any(|line| line.contains("WARN") && needles.iter().all(|n| line.contains(n)))
        };
        assert!(warned(&["missing from demand dataset", "role=B"]), "{logs}");
        assert!(
            warned(&["missing from salary dataset", "dataset=\"demand\"", "role=\"C\""]),
            "{logs}"
        );
        assert!(
            warned(&["missing from salary dataset", "dataset=\"geographic\"", "role=\"G\""]),
            "{logs}"
        );
        let c_drops = logs
            .lines()
            .filter(|l| l.contains("missing from salary dataset") && l.contains("role=\"C\""))
            .count();
        assert_eq!(c_drops, 1);
    }
}
