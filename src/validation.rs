use crate::error::{AppError, AppResult};

pub fn is_blank(value: &str) -> bool {
    value.trim().is_empty()
}

/// Collects every failed check of a request so they can be reported together.
#[derive(Debug, Default)]
pub struct Checks(Vec<String>);

impl Checks {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn require(&mut self, field: &str, value: &str) -> &mut Self {
        if is_blank(value) {
            self.0.push(format!("{field} is required"));
        }
        self
    }

    pub fn ensure(&mut self, ok: bool, msg: impl Into<String>) -> &mut Self {
        if !ok {
            self.0.push(msg.into());
        }
        self
    }

    pub fn finish(&mut self) -> AppResult<()> {
        if self.0.is_empty() {
            Ok(())
        } else {
            Err(AppError::Validation(std::mem::take(&mut self.0)))
        }
    }
}

/// Parses a path identifier.
pub fn parse_id(raw: &str, what: &str) -> AppResult<i64> {
    raw.trim()
        .parse::<i64>()
        .map_err(|_| AppError::validation(format!("{what} id must be an integer")))
}
