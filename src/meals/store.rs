//! Meal Storage
//! Mission: CRUD over the meals table

use crate::db::Database;
use crate::error::StoreError;
use crate::meals::models::{Meal, MealFilter, NewMeal};
use rusqlite::{params, OptionalExtension, Row};
use tracing::{debug, info};

#[derive(Clone)]
pub struct MealStore {
    db: Database,
}

impl MealStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// List meals matching the filter, ordered by date then id
    pub fn list(&self, filter: &MealFilter) -> Result<Vec<Meal>, StoreError> {
        let conn = self.db.lock();

        let mut sql = String::from(
            "SELECT meal_id, meal_name, meal_type, meal_date FROM meals WHERE 1=1",
        );
        let mut params_vec: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();

        if let Some(meal_type) = filter.meal_type {
            sql.push_str(" AND meal_type = ?");
            params_vec.push(Box::new(meal_type));
        }

        if let Some(date) = filter.date {
            sql.push_str(" AND meal_date = ?");
            params_vec.push(Box::new(date));
        }

        sql.push_str(" ORDER BY meal_date ASC, meal_id ASC");
        debug!(sql = %sql, "Listing meals");

        let params_refs: Vec<&dyn rusqlite::ToSql> =
            params_vec.iter().map(|b| b.as_ref()).collect();
        let mut stmt = conn.prepare(&sql)?;
        let meals = stmt
            .query_map(params_refs.as_slice(), meal_from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(meals)
    }

    pub fn get(&self, meal_id: i64) -> Result<Option<Meal>, StoreError> {
        let conn = self.db.lock();

        let meal = conn
            .query_row(
                "SELECT meal_id, meal_name, meal_type, meal_date FROM meals WHERE meal_id = ?1",
                params![meal_id],
                meal_from_row,
            )
            .optional()?;

        Ok(meal)
    }

    pub fn create(&self, meal: &NewMeal) -> Result<Meal, StoreError> {
        let conn = self.db.lock();

        conn.execute(
            "INSERT INTO meals (meal_name, meal_type, meal_date) VALUES (?1, ?2, ?3)",
            params![meal.meal_name, meal.meal_type, meal.meal_date],
        )?;
        let meal_id = conn.last_insert_rowid();

        info!(
            meal_id,
            meal_type = meal.meal_type.as_str(),
            date = %meal.meal_date,
            "Meal created"
        );

        Ok(Meal {
            meal_id,
            meal_name: meal.meal_name.clone(),
            meal_type: meal.meal_type,
            meal_date: meal.meal_date,
        })
    }

    /// Replace all fields of an existing meal
    pub fn update(&self, meal_id: i64, meal: &NewMeal) -> Result<Meal, StoreError> {
        let conn = self.db.lock();

        let changed = conn.execute(
            "UPDATE meals SET meal_name = ?1, meal_type = ?2, meal_date = ?3 WHERE meal_id = ?4",
            params![meal.meal_name, meal.meal_type, meal.meal_date, meal_id],
        )?;
        if changed == 0 {
            return Err(StoreError::NotFound("Meal"));
        }

        info!(meal_id, "Meal updated");

        Ok(Meal {
            meal_id,
            meal_name: meal.meal_name.clone(),
            meal_type: meal.meal_type,
            meal_date: meal.meal_date,
        })
    }

    /// Delete a meal; its feedback goes with it
    pub fn delete(&self, meal_id: i64) -> Result<(), StoreError> {
        let conn = self.db.lock();

        let deleted = conn.execute("DELETE FROM meals WHERE meal_id = ?1", params![meal_id])?;
        if deleted == 0 {
            return Err(StoreError::NotFound("Meal"));
        }

        info!(meal_id, "Meal deleted");
        Ok(())
    }
}

pub(crate) fn meal_from_row(row: &Row<'_>) -> rusqlite::Result<Meal> {
    Ok(Meal {
        meal_id: row.get("meal_id")?,
        meal_name: row.get("meal_name")?,
        meal_type: row.get("meal_type")?,
        meal_date: row.get("meal_date")?,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::meals::models::MealType;
    use chrono::NaiveDate;

    fn date(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, d).unwrap()
    }

    fn new_meal(name: &str, meal_type: MealType, day: u32) -> NewMeal {
        NewMeal {
            meal_name: name.to_string(),
            meal_type,
            meal_date: date(day),
        }
    }

    fn create_test_store() -> MealStore {
        MealStore::new(Database::in_memory().unwrap())
    }

    #[test]
    fn test_create_and_get() {
        let store = create_test_store();

        let created = store.create(&new_meal("Poha", MealType::Breakfast, 1)).unwrap();
        let fetched = store.get(created.meal_id).unwrap().unwrap();

        assert_eq!(created, fetched);
        assert!(store.get(999).unwrap().is_none());
    }

    #[test]
    fn test_list_filters_and_order() {
        let store = create_test_store();

        store.create(&new_meal("Thali", MealType::Lunch, 2)).unwrap();
        store.create(&new_meal("Poha", MealType::Breakfast, 1)).unwrap();
        store.create(&new_meal("Rajma", MealType::Lunch, 1)).unwrap();

        let all = store.list(&MealFilter::default()).unwrap();
        let names: Vec<_> = all.iter().map(|m| m.meal_name.as_str()).collect();
        assert_eq!(names, vec!["Poha", "Rajma", "Thali"]);

        let lunches = store
            .list(&MealFilter {
                meal_type: Some(MealType::Lunch),
                date: None,
            })
            .unwrap();
        assert_eq!(lunches.len(), 2);
        assert!(lunches.iter().all(|m| m.meal_type == MealType::Lunch));

        let lunch_on_first = store
            .list(&MealFilter {
                meal_type: Some(MealType::Lunch),
                date: Some(date(1)),
            })
            .unwrap();
        assert_eq!(lunch_on_first.len(), 1);
        assert_eq!(lunch_on_first[0].meal_name, "Rajma");
    }

    #[test]
    fn test_update_existing_and_missing() {
        let store = create_test_store();
        let created = store.create(&new_meal("Poha", MealType::Breakfast, 1)).unwrap();

        let updated = store
            .update(created.meal_id, &new_meal("Upma", MealType::Breakfast, 3))
            .unwrap();
        assert_eq!(updated.meal_name, "Upma");
        assert_eq!(store.get(created.meal_id).unwrap().unwrap().meal_date, date(3));

        let missing = store.update(999, &new_meal("Upma", MealType::Breakfast, 3));
        assert!(matches!(missing, Err(StoreError::NotFound("Meal"))));
    }

    #[test]
    fn test_delete() {
        let store = create_test_store();
        let created = store.create(&new_meal("Poha", MealType::Breakfast, 1)).unwrap();

        store.delete(created.meal_id).unwrap();
        assert!(store.get(created.meal_id).unwrap().is_none());
        assert!(matches!(
            store.delete(created.meal_id),
            Err(StoreError::NotFound("Meal"))
        ));
    }
}
