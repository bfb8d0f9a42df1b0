//! Feedback Storage
//! Mission: Record ratings and answer the dining queries built on them

use crate::db::Database;
use crate::error::StoreError;
use crate::feedback::models::{FeedbackEntry, FeedbackFilter, FeedbackWithMeal, MealStats, NewFeedback};
use crate::meals::models::{Meal, MealFilter};
use crate::meals::store::meal_from_row;
use chrono::{NaiveDate, Utc};
use rusqlite::params;
use tracing::{debug, info};

#[derive(Clone)]
pub struct FeedbackStore {
    db: Database,
}

impl FeedbackStore {
    pub fn new(db: Database) -> Self {
        Self { db }
    }

    /// Record feedback owned by `student_id` for an existing meal
    pub fn submit(&self, student_id: i64, feedback: &NewFeedback) -> Result<FeedbackEntry, StoreError> {
        let conn = self.db.lock();

        let meal_exists: bool = conn.query_row(
            "SELECT EXISTS(SELECT 1 FROM meals WHERE meal_id = ?1)",
            params![feedback.meal_id],
            |row| row.get(0),
        )?;
        if !meal_exists {
            return Err(StoreError::NotFound("Meal"));
        }

        let created_at = Utc::now().to_rfc3339();
        conn.execute(
            "INSERT INTO feedback (meal_id, student_id, rating, comments, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                feedback.meal_id,
                student_id,
                feedback.rating,
                feedback.comments,
                created_at
            ],
        )?;
        let feedback_id = conn.last_insert_rowid();

        info!(
            feedback_id,
            meal_id = feedback.meal_id,
            student_id,
            rating = feedback.rating,
            "Feedback recorded"
        );

        Ok(FeedbackEntry {
            feedback_id,
            meal_id: feedback.meal_id,
            student_id,
            rating: feedback.rating,
            comments: feedback.comments.clone(),
            created_at,
        })
    }

    /// Feedback joined with its meal, newest first
    pub fn list(&self, filter: &FeedbackFilter) -> Result<Vec<FeedbackWithMeal>, StoreError> {
        let conn = self.db.lock();

        let mut sql = String::from(
            "SELECT f.feedback_id, f.student_id, f.rating, f.comments,
                    m.meal_id, m.meal_name, m.meal_type, m.meal_date
             FROM feedback f
             JOIN meals m ON f.meal_id = m.meal_id
             WHERE 1=1",
        );
        let mut params_vec: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();

        if let Some(meal_type) = filter.meal_type {
            sql.push_str(" AND m.meal_type = ?");
            params_vec.push(Box::new(meal_type));
        }

        if let Some(date) = filter.date {
            sql.push_str(" AND m.meal_date = ?");
            params_vec.push(Box::new(date));
        }

        if let Some(rating) = filter.rating {
            sql.push_str(" AND f.rating = ?");
            params_vec.push(Box::new(rating));
        }

        if let Some(student_id) = filter.student_id {
            sql.push_str(" AND f.student_id = ?");
            params_vec.push(Box::new(student_id));
        }

        sql.push_str(" ORDER BY f.feedback_id DESC");
        debug!(sql = %sql, "Listing feedback");

        let params_refs: Vec<&dyn rusqlite::ToSql> =
            params_vec.iter().map(|b| b.as_ref()).collect();
        let mut stmt = conn.prepare(&sql)?;
        let entries = stmt
            .query_map(params_refs.as_slice(), |row| {
                Ok(FeedbackWithMeal {
                    feedback_id: row.get("feedback_id")?,
                    student_id: row.get("student_id")?,
                    rating: row.get("rating")?,
                    comments: row.get("comments")?,
                    meal_id: row.get("meal_id")?,
                    meal_name: row.get("meal_name")?,
                    meal_type: row.get("meal_type")?,
                    meal_date: row.get("meal_date")?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(entries)
    }

    /// Meals served on `today`, breakfast first
    pub fn present_meals(&self, today: NaiveDate) -> Result<Vec<Meal>, StoreError> {
        let conn = self.db.lock();

        let mut stmt = conn.prepare(
            "SELECT meal_id, meal_name, meal_type, meal_date
             FROM meals
             WHERE meal_date = ?1
             ORDER BY
                CASE meal_type
                    WHEN 'breakfast' THEN 1
                    WHEN 'lunch' THEN 2
                    WHEN 'dinner' THEN 3
                    ELSE 4
                END,
                meal_id",
        )?;
        let meals = stmt
            .query_map(params![today], meal_from_row)?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(meals)
    }

    /// Feedback count and average rating per meal, unrated meals included
    pub fn stats(&self, filter: &MealFilter) -> Result<Vec<MealStats>, StoreError> {
        let conn = self.db.lock();

        let mut sql = String::from(
            "SELECT m.meal_id, m.meal_name, m.meal_type, m.meal_date,
                    COUNT(f.feedback_id) AS feedback_count,
                    ROUND(AVG(f.rating), 2) AS average_rating
             FROM meals m
             LEFT JOIN feedback f ON m.meal_id = f.meal_id
             WHERE 1=1",
        );
        let mut params_vec: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();

        if let Some(meal_type) = filter.meal_type {
            sql.push_str(" AND m.meal_type = ?");
            params_vec.push(Box::new(meal_type));
        }

        if let Some(date) = filter.date {
            sql.push_str(" AND m.meal_date = ?");
            params_vec.push(Box::new(date));
        }

        sql.push_str(
            " GROUP BY m.meal_id, m.meal_name, m.meal_type, m.meal_date
              ORDER BY m.meal_date DESC, m.meal_id ASC",
        );

        let params_refs: Vec<&dyn rusqlite::ToSql> =
            params_vec.iter().map(|b| b.as_ref()).collect();
        let mut stmt = conn.prepare(&sql)?;
        let stats = stmt
            .query_map(params_refs.as_slice(), |row| {
                Ok(MealStats {
                    meal_id: row.get("meal_id")?,
                    meal_name: row.get("meal_name")?,
                    meal_type: row.get("meal_type")?,
                    meal_date: row.get("meal_date")?,
                    feedback_count: row.get("feedback_count")?,
                    average_rating: row.get("average_rating")?,
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;

        Ok(stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{models::NewProfile, AccountStore};
    use crate::meals::{MealStore, MealType, NewMeal};

    struct Fixture {
        feedback: FeedbackStore,
        meals: MealStore,
        student_id: i64,
        db: Database,
    }

    fn setup() -> Fixture {
        let db = Database::in_memory().unwrap();
        let (account, _) = AccountStore::new(db.clone())
            .create_account(
                "a@x.com",
                "hash",
                &NewProfile::Student {
                    name: "Asha".into(),
                    student_roll: Some("R1".into()),
                    department: None,
                    room_no: None,
                    phone_number: None,
                },
            )
            .unwrap();

        Fixture {
            feedback: FeedbackStore::new(db.clone()),
            meals: MealStore::new(db.clone()),
            student_id: account.id,
            db,
        }
    }

    fn meal(fx: &Fixture, name: &str, meal_type: MealType, date: NaiveDate) -> Meal {
        fx.meals
            .create(&NewMeal {
                meal_name: name.into(),
                meal_type,
                meal_date: date,
            })
            .unwrap()
    }

    fn rate(fx: &Fixture, meal_id: i64, rating: i64) -> FeedbackEntry {
        fx.feedback
            .submit(
                fx.student_id,
                &NewFeedback {
                    meal_id,
                    rating,
                    comments: String::new(),
                },
            )
            .unwrap()
    }

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 3, d).unwrap()
    }

    #[test]
    fn test_submit_for_unknown_meal() {
        let fx = setup();

        let result = fx.feedback.submit(
            fx.student_id,
            &NewFeedback {
                meal_id: 42,
                rating: 3,
                comments: String::new(),
            },
        );
        assert!(matches!(result, Err(StoreError::NotFound("Meal"))));
    }

    #[test]
    fn test_list_newest_first_with_filters() {
        let fx = setup();
        let lunch = meal(&fx, "Thali", MealType::Lunch, day(1));
        let dinner = meal(&fx, "Biryani", MealType::Dinner, day(1));

        let first = rate(&fx, lunch.meal_id, 4);
        let second = rate(&fx, dinner.meal_id, 5);

        let all = fx.feedback.list(&FeedbackFilter::default()).unwrap();
        assert_eq!(all.len(), 2);
        assert_eq!(all[0].feedback_id, second.feedback_id);
        assert_eq!(all[1].feedback_id, first.feedback_id);

        let dinners = fx
            .feedback
            .list(&FeedbackFilter {
                meal_type: Some(MealType::Dinner),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(dinners.len(), 1);
        assert!(dinners.iter().all(|f| f.meal_type == MealType::Dinner));

        let mine = fx
            .feedback
            .list(&FeedbackFilter {
                student_id: Some(fx.student_id),
                rating: Some(5),
                ..Default::default()
            })
            .unwrap();
        assert_eq!(mine.len(), 1);
        assert_eq!(mine[0].meal_name, "Biryani");
    }

    #[test]
    fn test_present_meals_ordered_by_service() {
        let fx = setup();
        meal(&fx, "Biryani", MealType::Dinner, day(5));
        meal(&fx, "Poha", MealType::Breakfast, day(5));
        meal(&fx, "Thali", MealType::Lunch, day(5));
        meal(&fx, "Idli", MealType::Breakfast, day(6));

        let today = fx.feedback.present_meals(day(5)).unwrap();
        let types: Vec<_> = today.iter().map(|m| m.meal_type).collect();
        assert_eq!(
            types,
            vec![MealType::Breakfast, MealType::Lunch, MealType::Dinner]
        );
    }

    #[test]
    fn test_stats_includes_unrated_meals() {
        let fx = setup();
        let older = meal(&fx, "Thali", MealType::Lunch, day(1));
        let newer = meal(&fx, "Biryani", MealType::Dinner, day(2));

        rate(&fx, older.meal_id, 4);
        rate(&fx, older.meal_id, 5);
        rate(&fx, older.meal_id, 5);

        let stats = fx.feedback.stats(&MealFilter::default()).unwrap();
        assert_eq!(stats.len(), 2);

        assert_eq!(stats[0].meal_id, newer.meal_id);
        assert_eq!(stats[0].feedback_count, 0);
        assert_eq!(stats[0].average_rating, None);

        assert_eq!(stats[1].feedback_count, 3);
        assert_eq!(stats[1].average_rating, Some(4.67));

        let lunch_only = fx
            .feedback
            .stats(&MealFilter {
                meal_type: Some(MealType::Lunch),
                date: None,
            })
            .unwrap();
        assert_eq!(lunch_only.len(), 1);
    }

    #[test]
    fn test_deleting_meal_removes_feedback() {
        let fx = setup();
        let lunch = meal(&fx, "Thali", MealType::Lunch, day(1));
        rate(&fx, lunch.meal_id, 3);

        fx.meals.delete(lunch.meal_id).unwrap();

        let remaining: i64 = fx
            .db
            .lock()
            .query_row("SELECT COUNT(*) FROM feedback", [], |row| row.get(0))
            .unwrap();
        assert_eq!(remaining, 0);
    }
}
