//! Meal Models
//! Mission: Meal records, request bodies and list filters

use crate::error::ApiError;
use chrono::NaiveDate;
use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum MealType {
    Breakfast,
    Lunch,
    Dinner,
}

impl MealType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MealType::Breakfast => "breakfast",
            MealType::Lunch => "lunch",
            MealType::Dinner => "dinner",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "breakfast" => Some(MealType::Breakfast),
            "lunch" => Some(MealType::Lunch),
            "dinner" => Some(MealType::Dinner),
            _ => None,
        }
    }
}

impl ToSql for MealType {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for MealType {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        let s = value.as_str()?;
        MealType::parse(s).ok_or_else(|| FromSqlError::Other(format!("unknown meal type: {s}").into()))
    }
}

/// A scheduled meal
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Meal {
    pub meal_id: i64,
    pub meal_name: String,
    pub meal_type: MealType,
    pub meal_date: NaiveDate,
}

/// Validated meal fields for create and update
#[derive(Debug, Clone, PartialEq)]
pub struct NewMeal {
    pub meal_name: String,
    pub meal_type: MealType,
    pub meal_date: NaiveDate,
}

/// Meal create/update body; clients send the type as `type`
#[derive(Debug, Default, Deserialize)]
pub struct MealRequest {
    pub meal_name: Option<String>,
    #[serde(rename = "type", alias = "meal_type")]
    pub meal_type: Option<String>,
    pub meal_date: Option<String>,
}

impl MealRequest {
    pub fn validate(self) -> Result<NewMeal, ApiError> {
        let (Some(meal_name), Some(meal_type), Some(meal_date)) = (
            present(self.meal_name),
            present(self.meal_type),
            present(self.meal_date),
        ) else {
            return Err(ApiError::validation("Missing required fields"));
        };

        Ok(NewMeal {
            meal_name,
            meal_type: parse_meal_type(&meal_type)?,
            meal_date: parse_date(&meal_date)?,
        })
    }
}

/// `GET /api/meals` query string
#[derive(Debug, Default, Deserialize)]
pub struct MealQuery {
    #[serde(rename = "type")]
    pub meal_type: Option<String>,
    pub date: Option<String>,
}

impl MealQuery {
    pub fn filter(self) -> Result<MealFilter, ApiError> {
        Ok(MealFilter {
            meal_type: present(self.meal_type)
                .map(|t| parse_meal_type(&t))
                .transpose()?,
            date: present(self.date).map(|d| parse_date(&d)).transpose()?,
        })
    }
}

/// Equality filters on meal type and date; `None` matches everything
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MealFilter {
    pub meal_type: Option<MealType>,
    pub date: Option<NaiveDate>,
}

pub(crate) fn parse_meal_type(value: &str) -> Result<MealType, ApiError> {
    MealType::parse(value).ok_or_else(|| {
        ApiError::validation("Invalid meal type. Use breakfast, lunch or dinner.")
    })
}

pub(crate) fn parse_date(value: &str) -> Result<NaiveDate, ApiError> {
    NaiveDate::parse_from_str(value.trim(), "%Y-%m-%d")
        .map_err(|_| ApiError::validation("Invalid date format. Use YYYY-MM-DD."))
}

/// Empty or whitespace-only values count as absent
pub(crate) fn present(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_meal_type_parsing() {
        assert_eq!(MealType::parse("Lunch"), Some(MealType::Lunch));
        assert_eq!(MealType::parse("supper"), None);
        assert_eq!(
            serde_json::to_string(&MealType::Breakfast).unwrap(),
            r#""breakfast""#
        );
    }

    #[test]
    fn test_meal_request_accepts_type_field() {
        let req: MealRequest = serde_json::from_str(
            r#"{"meal_name":"Poha","type":"breakfast","meal_date":"2025-03-01"}"#,
        )
        .unwrap();
        let meal = req.validate().unwrap();
        assert_eq!(meal.meal_type, MealType::Breakfast);
        assert_eq!(meal.meal_date, NaiveDate::from_ymd_opt(2025, 3, 1).unwrap());
    }

    #[test]
    fn test_meal_request_validation_errors() {
        let missing = MealRequest {
            meal_name: Some("Poha".into()),
            ..Default::default()
        };
        assert_eq!(
            missing.validate().unwrap_err().to_string(),
            "Missing required fields"
        );

        let bad_date = MealRequest {
            meal_name: Some("Poha".into()),
            meal_type: Some("breakfast".into()),
            meal_date: Some("01/03/2025".into()),
        };
        assert!(matches!(bad_date.validate(), Err(ApiError::Validation(_))));

        let bad_type = MealRequest {
            meal_name: Some("Poha".into()),
            meal_type: Some("brunch".into()),
            meal_date: Some("2025-03-01".into()),
        };
        assert!(matches!(bad_type.validate(), Err(ApiError::Validation(_))));
    }

    #[test]
    fn test_query_filter_treats_empty_as_absent() {
        let query = MealQuery {
            meal_type: Some(String::new()),
            date: Some("2025-03-01".into()),
        };
        let filter = query.filter().unwrap();
        assert_eq!(filter.meal_type, None);
        assert!(filter.date.is_some());
    }

    #[test]
    fn test_meal_serializes_iso_date() {
        let meal = Meal {
            meal_id: 1,
            meal_name: "Thali".into(),
            meal_type: MealType::Lunch,
            meal_date: NaiveDate::from_ymd_opt(2025, 3, 1).unwrap(),
        };
        let json = serde_json::to_value(&meal).unwrap();
        assert_eq!(json["meal_type"], "lunch");
        assert_eq!(json["meal_date"], "2025-03-01");
    }
}
