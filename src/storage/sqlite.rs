use crate::model::{StorageError, Vehicle, VehicleFilter, VehicleInput};
use crate::search::VehicleCatalog;
use chrono::{DateTime, Utc};
use rusqlite::functions::FunctionFlags;
use rusqlite::{Connection, OptionalExtension, Row, params};
use tokio::sync::Mutex;
use tracing::debug;

const VEHICLE_COLUMNS: &str =
    "id, make, model, year, price, mileage, status, condition, details_json, created_at, updated_at";

pub struct SqliteStorage {
    conn: Connection,
}

impl SqliteStorage {
    /// Opens (or creates) the database file and makes sure the schema exists.
    pub fn new(db_path: &str) -> Result<Self, StorageError> {
        Self::init(Connection::open(db_path)?)
    }

    /// Fresh private database, used by tests.
    #[cfg(test)]
    pub fn in_memory() -> Result<Self, StorageError> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self, StorageError> {
        // SQLite's own lower() only folds ASCII
        conn.create_scalar_function(
            "lower_unicode",
            1,
            FunctionFlags::SQLITE_UTF8 | FunctionFlags::SQLITE_DETERMINISTIC,
            |ctx| Ok(ctx.get::<String>(0)?.to_lowercase()),
        )?;

        conn.execute_batch(
            "
            CREATE TABLE IF NOT EXISTS vehicles (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                make TEXT NOT NULL,
                model TEXT NOT NULL,
                year INTEGER NOT NULL,
                price REAL NOT NULL,
                mileage INTEGER NOT NULL,
                status TEXT NOT NULL,
                condition TEXT NOT NULL,
                details_json TEXT,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            );
            ",
        )?;

        Ok(Self { conn })
    }

    /// Inserts a new listing; id and timestamps are assigned here.
    pub fn insert(&self, input: &VehicleInput) -> Result<Vehicle, StorageError> {
        let now = Utc::now().to_rfc3339();
        let sql = format!(
            "INSERT INTO vehicles (
                make, model, year, price, mileage, status, condition, details_json, created_at, updated_at
            )
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?9)
            RETURNING {VEHICLE_COLUMNS}"
        );

        let vehicle = self.conn.query_row(
            &sql,
            params![
                &input.make,
                &input.model,
                &input.year,
                &input.price,
                &input.mileage,
                &input.status,
                &input.condition,
                &input.details_json,
                &now,
            ],
            Self::map_vehicle,
        )?;
        debug!("Inserted vehicle id={}", vehicle.id);
        Ok(vehicle)
    }

    pub fn get(&self, id: i64) -> Result<Option<Vehicle>, StorageError> {
        let sql = format!("SELECT {VEHICLE_COLUMNS} FROM vehicles WHERE id = ?1");
        Ok(self.conn.query_row(&sql, params![id], Self::map_vehicle).optional()?)
    }

    /// All listings passing `filter`, oldest first.
    pub fn list(&self, filter: &VehicleFilter) -> Result<Vec<Vehicle>, StorageError> {
        let sql = format!(
            "SELECT {VEHICLE_COLUMNS} FROM vehicles
             WHERE (?1 IS NULL OR status = ?1)
               AND (?2 IS NULL OR lower_unicode(make) = lower_unicode(?2))
               AND (?3 IS NULL OR price >= ?3)
               AND (?4 IS NULL OR price <= ?4)
             ORDER BY id ASC"
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(
            params![&filter.status, &filter.make, &filter.min_price, &filter.max_price],
            Self::map_vehicle,
        )?;

        let mut vehicles = Vec::new();
        for vehicle in rows {
            vehicles.push(vehicle?);
        }

        Ok(vehicles)
    }

    /// Overwrites every client-editable field. Returns `None` for an unknown id.
    pub fn update(&self, id: i64, input: &VehicleInput) -> Result<Option<Vehicle>, StorageError> {
        let sql = format!(
            "UPDATE vehicles SET
                make = ?1, model = ?2, year = ?3, price = ?4, mileage = ?5,
                status = ?6, condition = ?7, details_json = ?8, updated_at = ?9
             WHERE id = ?10
             RETURNING {VEHICLE_COLUMNS}"
        );

        let vehicle = self
            .conn
            .query_row(
                &sql,
                params![
                    &input.make,
                    &input.model,
                    &input.year,
                    &input.price,
                    &input.mileage,
                    &input.status,
                    &input.condition,
                    &input.details_json,
                    &Utc::now().to_rfc3339(),
                    id,
                ],
                Self::map_vehicle,
            )
            .optional()?;
        Ok(vehicle)
    }

    /// Removes a listing and hands back what was stored, if anything.
    pub fn delete(&self, id: i64) -> Result<Option<Vehicle>, StorageError> {
        let sql = format!("DELETE FROM vehicles WHERE id = ?1 RETURNING {VEHICLE_COLUMNS}");
        Ok(self.conn.query_row(&sql, params![id], Self::map_vehicle).optional()?)
    }

    /// Listings whose year, make or model contains `query`, case-insensitively.
    /// `%` and `_` in the query are matched literally.
    pub fn find_matching(&self, query: &str, limit: usize) -> Result<Vec<Vehicle>, StorageError> {
        let sql = format!(
            "SELECT {VEHICLE_COLUMNS} FROM vehicles
             WHERE instr(CAST(year AS TEXT), ?1) > 0
                OR instr(lower_unicode(make), ?1) > 0
                OR instr(lower_unicode(model), ?1) > 0
             ORDER BY id ASC
             LIMIT ?2"
        );
        let limit = i64::try_from(limit).unwrap_or(i64::MAX);
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(params![query.to_lowercase(), limit], Self::map_vehicle)?;

        let mut vehicles = Vec::new();
        for vehicle in rows {
            vehicles.push(vehicle?);
        }

        Ok(vehicles)
    }

    /// Every stored make once, in order of first appearance.
    pub fn find_distinct_makes(&self) -> Result<Vec<String>, StorageError> {
        let mut stmt = self
            .conn
            .prepare("SELECT make FROM vehicles GROUP BY make ORDER BY MIN(id) ASC")?;
        let makes = stmt
            .query_map([], |row| row.get::<_, String>(0))?
            .collect::<Result<_, _>>()?;
        Ok(makes)
    }

    fn map_vehicle(row: &Row) -> Result<Vehicle, rusqlite::Error> {
        let created_at = Self::parse_timestamp(row, 9)?;
        let updated_at = Self::parse_timestamp(row, 10)?;

        Ok(Vehicle {
            id: row.get(0)?,
            make: row.get(1)?,
            model: row.get(2)?,
            year: row.get(3)?,
            price: row.get(4)?,
            mileage: row.get(5)?,
            status: row.get(6)?,
            condition: row.get(7)?,
            details_json: row.get(8)?,
            created_at,
            updated_at,
        })
    }

    fn parse_timestamp(row: &Row, idx: usize) -> Result<DateTime<Utc>, rusqlite::Error> {
        let raw: String = row.get(idx)?;
        raw.parse().map_err(|e: chrono::ParseError| {
            rusqlite::Error::FromSqlConversionFailure(idx, rusqlite::types::Type::Text, Box::new(e))
        })
    }
}

#[async_trait::async_trait]
impl VehicleCatalog for Mutex<SqliteStorage> {
    async fn find_matching(&self, query: &str, limit: usize) -> Result<Vec<Vehicle>, StorageError> {
        self.lock().await.find_matching(query, limit)
    }

    async fn find_distinct_makes(&self) -> Result<Vec<String>, StorageError> {
        self.lock().await.find_distinct_makes()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::SearchResult;
    use crate::normalizer::normalize;
    use crate::search::search;

    fn input(make: &str, model: &str, year: i32, price: f64) -> VehicleInput {
        VehicleInput {
            make: make.to_string(),
            model: model.to_string(),
            year,
            price,
            mileage: 42_000,
            status: "available".to_string(),
            condition: "Used".to_string(),
            details_json: None,
        }
    }

    fn seeded() -> SqliteStorage {
        let storage = SqliteStorage::in_memory().unwrap();
        storage.insert(&input("BMW", "X5", 2020, 45_000.0)).unwrap();
        storage.insert(&input("Audi", "A4", 2021, 30_000.0)).unwrap();
        storage.insert(&input("BMW", "M3 100%", 2019, 60_000.0)).unwrap();
        storage
    }

    #[test]
    fn insert_assigns_id_and_timestamps() {
        let storage = SqliteStorage::in_memory().unwrap();

        let mut data = input("Kia", "Ceed", 2018, 9_500.0);
        data.details_json = Some(r#"{"images":["a.jpg"]}"#.to_string());
        let saved = storage.insert(&data).unwrap();

        assert_eq!(saved.id, 1);
        assert_eq!(saved.created_at, saved.updated_at);
        assert_eq!(storage.get(saved.id).unwrap(), Some(saved));
        assert_eq!(storage.get(99).unwrap(), None);
    }

    #[test]
    fn update_overwrites_fields_and_keeps_created_at() {
        let storage = seeded();
        let before = storage.get(2).unwrap().unwrap();

        let updated = storage
            .update(2, &input("audi", "a6", 2022, 35_000.0))
            .unwrap()
            .unwrap();

        assert_eq!(updated.make, "audi");
        assert_eq!(updated.model, "a6");
        assert_eq!(updated.created_at, before.created_at);
        assert!(updated.updated_at >= before.updated_at);
        assert_eq!(storage.update(99, &input("x", "y", 2000, 1.0)).unwrap(), None);
    }

    #[test]
    fn delete_returns_removed_row() {
        let storage = seeded();

        let removed = storage.delete(1).unwrap().unwrap();

        assert_eq!(removed.model, "X5");
        assert_eq!(storage.get(1).unwrap(), None);
        assert_eq!(storage.delete(1).unwrap(), None);
    }

    #[test]
    fn list_applies_filters() {
        let storage = seeded();
        storage
            .update(2, &VehicleInput { status: "sold".to_string(), ..input("Audi", "A4", 2021, 30_000.0) })
            .unwrap();

        assert_eq!(storage.list(&VehicleFilter::default()).unwrap().len(), 3);

        let bmw = VehicleFilter { make: Some("bmw".to_string()), ..Default::default() };
        assert_eq!(storage.list(&bmw).unwrap().len(), 2);

        let sold = VehicleFilter { status: Some("sold".to_string()), ..Default::default() };
        let sold = storage.list(&sold).unwrap();
        assert_eq!(sold.len(), 1);
        assert_eq!(sold[0].make, "Audi");

        let band = VehicleFilter { min_price: Some(40_000.0), max_price: Some(50_000.0), ..Default::default() };
        let band = storage.list(&band).unwrap();
        assert_eq!(band.len(), 1);
        assert_eq!(band[0].model, "X5");
    }

    #[test]
    fn find_matching_checks_year_make_and_model() {
        let storage = seeded();

        let by_year = storage.find_matching("2021", 10).unwrap();
        assert_eq!(by_year.len(), 1);
        assert_eq!(by_year[0].make, "Audi");

        let by_make = storage.find_matching("bM", 10).unwrap();
        assert_eq!(by_make.iter().map(|v| v.id).collect::<Vec<_>>(), vec![1, 3]);

        let by_model = storage.find_matching("a4", 10).unwrap();
        assert_eq!(by_model.len(), 1);
    }

    #[test]
    fn find_matching_respects_limit_and_literal_wildcards() {
        let storage = seeded();

        assert_eq!(storage.find_matching("", 2).unwrap().len(), 2);
        assert!(storage.find_matching("", 0).unwrap().is_empty());

        let percent = storage.find_matching("%", 10).unwrap();
        assert_eq!(percent.len(), 1);
        assert_eq!(percent[0].model, "M3 100%");
        assert!(storage.find_matching("_", 10).unwrap().is_empty());
    }

    #[test]
    fn non_ascii_capitals_match_case_insensitively() {
        let storage = SqliteStorage::in_memory().unwrap();
        storage.insert(&input("Łada", "Niva", 2015, 7_000.0)).unwrap();
        storage.insert(&input("Škoda", "Ōctavia", 2017, 9_000.0)).unwrap();

        let by_make = storage.find_matching("łada", 10).unwrap();
        assert_eq!(by_make.len(), 1);
        assert_eq!(by_make[0].make, "Łada");

        let by_model = storage.find_matching("ŌCT", 10).unwrap();
        assert_eq!(by_model.len(), 1);
        assert_eq!(by_model[0].model, "Ōctavia");

        let filter = VehicleFilter { make: Some("ŁADA".to_string()), ..Default::default() };
        assert_eq!(storage.list(&filter).unwrap().len(), 1);
    }

    #[test]
    fn distinct_makes_in_first_seen_order() {
        let storage = seeded();

        assert_eq!(storage.find_distinct_makes().unwrap(), vec!["BMW", "Audi"]);
    }

    #[tokio::test]
    async fn search_runs_against_sqlite_catalog() {
        let storage = SqliteStorage::in_memory().unwrap();
        storage.insert(&input("BMW", "X5", 2020, 45_000.0)).unwrap();
        storage.insert(&input("Audi", "A4", 2021, 30_000.0)).unwrap();
        let catalog = Mutex::new(storage);

        let results = search(&catalog, "bm", 10).await.unwrap();

        assert_eq!(results.len(), 2);
        assert!(matches!(&results[0], SearchResult::Vehicle(v) if v.model == "X5"));
        assert!(matches!(&results[1], SearchResult::Brand(b) if b.make == "BMW"));
    }

    #[tokio::test]
    async fn vehicle_and_brand_results_agree_on_non_ascii_makes() {
        let storage = SqliteStorage::in_memory().unwrap();
        storage.insert(&input(&normalize("łada"), "Niva", 2015, 7_000.0)).unwrap();
        let catalog = Mutex::new(storage);

        let results = search(&catalog, "łada", 10).await.unwrap();

        assert_eq!(results.len(), 2);
        assert!(matches!(&results[0], SearchResult::Vehicle(v) if v.make == "Łada"));
        assert!(matches!(&results[1], SearchResult::Brand(b) if b.make == "Łada"));
    }
}
