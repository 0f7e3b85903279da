//! Project validation logic.

use crate::schema::{LATEST_VERSION, Project};

#[derive(thiserror::Error, Debug)]
pub enum ValidationError {
    #[error("Unsupported version: {version}")]
    UnsupportedVersion { version: u32 },

    #[error("Invalid value: {field} = {value} ({reason})")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },
}

pub fn validate_project(project: &Project) -> Result<(), ValidationError> {
    if project.version > LATEST_VERSION {
        return Err(ValidationError::UnsupportedVersion {
            version: project.version,
        });
    }

    if project.name.trim().is_empty() {
        return Err(ValidationError::InvalidValue {
            field: "name".into(),
            value: project.name.clone(),
            reason: "must not be empty".into(),
        });
    }

    if project.record.year_num == 0 {
        return Err(ValidationError::InvalidValue {
            field: "record.year_num".into(),
            value: "0".into(),
            reason: "need at least one synthetic year".into(),
        });
    }

    if project.return_periods.is_empty() {
        return Err(ValidationError::InvalidValue {
            field: "return_periods".into(),
            value: "[]".into(),
            reason: "need at least one return period".into(),
        });
    }
    for &t in &project.return_periods {
        if t <= 1 {
            return Err(ValidationError::InvalidValue {
                field: "return_periods".into(),
                value: t.to_string(),
                reason: "return periods must be > 1".into(),
            });
        }
    }

    if let Some(fit) = &project.fit {
        if fit.min_sample == Some(0) {
            return Err(ValidationError::InvalidValue {
                field: "fit.min_sample".into(),
                value: "0".into(),
                reason: "must be positive".into(),
            });
        }
        if fit.max_iterations == Some(0) {
            return Err(ValidationError::InvalidValue {
                field: "fit.max_iterations".into(),
                value: "0".into(),
                reason: "must be positive".into(),
            });
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::{FitDef, InputsDef, OutputsDef, RecordDef};

    fn project() -> Project {
        Project {
            version: 1,
            name: "test".into(),
            record: RecordDef { year_num: 100 },
            return_periods: vec![10, 100],
            inputs: InputsDef {
                mesh: "fort.14".into(),
                astro_tide: "astro/fort.63".into(),
                run_index: "runs.csv".into(),
                runs_dir: "runs".into(),
            },
            outputs: OutputsDef { dir: "out".into() },
            fit: None,
        }
    }

    #[test]
    fn accepts_valid_project() {
        assert!(validate_project(&project()).is_ok());
    }

    #[test]
    fn rejects_future_version() {
        let mut p = project();
        p.version = 99;
        assert!(matches!(
            validate_project(&p).unwrap_err(),
            ValidationError::UnsupportedVersion { version: 99 }
        ));
    }

    #[test]
    fn rejects_return_period_of_one() {
        let mut p = project();
        p.return_periods = vec![10, 1];
        assert!(matches!(
            validate_project(&p).unwrap_err(),
            ValidationError::InvalidValue { .. }
        ));
    }

    #[test]
    fn rejects_zero_years_and_empty_periods() {
        let mut p = project();
        p.record.year_num = 0;
        assert!(validate_project(&p).is_err());

        let mut p = project();
        p.return_periods.clear();
        assert!(validate_project(&p).is_err());
    }

    #[test]
    fn rejects_zero_fit_overrides() {
        let mut p = project();
        p.fit = Some(FitDef {
            min_sample: Some(0),
            max_iterations: None,
        });
        assert!(validate_project(&p).is_err());
    }
}
