use std::fmt;

/// Why a step refused to advance. Rendered inline in the wizard view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub step: usize,
    pub missing: Vec<&'static str>,
    pub problems: Vec<String>,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "step {}: ", self.step)?;
        let mut parts = Vec::new();
        if !self.missing.is_empty() {
            parts.push(format!("required: {}", self.missing.join(", ")));
        }
        parts.extend(self.problems.iter().cloned());
        if parts.is_empty() {
            return write!(f, "invalid input");
        }
        write!(f, "{}", parts.join("; "))
    }
}

impl std::error::Error for ValidationError {}

/// Collects every failure of one step before reporting.
#[derive(Debug, Clone)]
pub struct StepCheck {
    step: usize,
    missing: Vec<&'static str>,
    problems: Vec<String>,
}

impl StepCheck {
    pub fn new(step: usize) -> Self {
        Self {
            step,
            missing: Vec::new(),
            problems: Vec::new(),
        }
    }

    pub fn require(mut self, label: &'static str, value: &str) -> Self {
        if value.trim().is_empty() {
            self.missing.push(label);
        }
        self
    }

    pub fn require_choice<T>(mut self, label: &'static str, value: Option<T>) -> Self {
        if value.is_none() {
            self.missing.push(label);
        }
        self
    }

    pub fn ensure(mut self, ok: bool, problem: impl Into<String>) -> Self {
        if !ok {
            self.problems.push(problem.into());
        }
        self
    }

    /// Records the error of a fallible check, if any.
    pub fn check(mut self, result: Result<(), String>) -> Self {
        if let Err(problem) = result {
            self.problems.push(problem);
        }
        self
    }

    pub fn finish(self) -> Result<(), ValidationError> {
        if self.missing.is_empty() && self.problems.is_empty() {
            return Ok(());
        }
        Err(ValidationError {
            step: self.step,
            missing: self.missing,
            problems: self.problems,
        })
    }
}

pub fn missing_choice(step: usize, label: &'static str) -> ValidationError {
    ValidationError {
        step,
        missing: vec![label],
        problems: Vec::new(),
    }
}

/// Parses an optional numeric field. Empty input yields `None`.
pub fn parse_optional_number<T: std::str::FromStr>(
    label: &str,
    raw: &str,
) -> Result<Option<T>, String> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }
    trimmed
        .parse::<T>()
        .map(Some)
        .map_err(|_| format!("{label} must be a number"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn check_collects_missing_fields_and_problems() {
        let err = StepCheck::new(2)
            .require("name", "  ")
            .require_choice::<u8>("agent", None)
            .require("database", "orders")
            .ensure(false, "port must be between 1 and 65535")
            .finish()
            .expect_err("invalid");
        assert_eq!(err.step, 2);
        assert_eq!(err.missing, vec!["name", "agent"]);
        assert_eq!(
            err.to_string(),
            "step 2: required: name, agent; port must be between 1 and 65535"
        );
    }

    #[test]
    fn satisfied_check_passes() {
        assert!(StepCheck::new(1)
            .require("name", "Orders")
            .require_choice("agent", Some(1))
            .finish()
            .is_ok());
    }

    #[test]
    fn optional_number_parsing() {
        assert_eq!(parse_optional_number::<u16>("port", ""), Ok(None));
        assert_eq!(parse_optional_number::<u16>("port", " 5432 "), Ok(Some(5432)));
        assert_eq!(
            parse_optional_number::<u16>("port", "70000"),
            Err("port must be a number".to_string())
        );
    }
}
