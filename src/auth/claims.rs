use serde::{Deserialize, Serialize};
use serde_json::Value;

/// JWT payload. Carries only the subject's user id and no expiry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claims {
    #[serde(default)]
    pub id: Value, // user ID
}

impl Claims {
    pub fn for_user(user_id: i64) -> Self {
        Self {
            id: Value::from(user_id),
        }
    }

    /// Subject id coerced to an integer. Integral numbers and numeric strings
    /// are accepted; anything else yields `0`, which identity resolution
    /// rejects.
    pub fn subject_id(&self) -> i64 {
        match &self.id {
            Value::Number(n) => n
                .as_i64()
                .or_else(|| {
                    n.as_f64()
                        .filter(|f| f.fract() == 0.0 && f.abs() < i64::MAX as f64)
                        .map(|f| f as i64)
                })
                .unwrap_or(0),
            Value::String(s) => s.parse::<i64>().unwrap_or(0),
            _ => 0,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn claims(id: Value) -> Claims {
        Claims { id }
    }

    #[test]
    fn subject_id_accepts_integers_floats_and_numeric_strings() {
        assert_eq!(claims(json!(7)).subject_id(), 7);
        assert_eq!(claims(json!(7.0)).subject_id(), 7);
        assert_eq!(claims(json!("7")).subject_id(), 7);
    }

    #[test]
    fn subject_id_falls_back_to_zero() {
        assert_eq!(claims(json!(7.5)).subject_id(), 0);
        assert_eq!(claims(json!("seven")).subject_id(), 0);
        assert_eq!(claims(json!(null)).subject_id(), 0);
        assert_eq!(claims(json!({"nested": 1})).subject_id(), 0);
    }

    #[test]
    fn missing_id_deserializes_as_null() {
        let c: Claims = serde_json::from_str("{}").unwrap();
        assert_eq!(c.subject_id(), 0);
    }
}
