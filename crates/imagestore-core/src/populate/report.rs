//! Per-version result of a populate run.

use std::collections::BTreeMap;

use crate::error::StoreError;

/// What a successful populate task did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    /// Destination already existed; no request was made.
    AlreadyPresent,
    /// Image was downloaded.
    Downloaded { bytes: u64 },
}

/// Outcome of every version in one populate run, plus which failure
/// completed first (the error `populate` surfaces).
#[derive(Debug, Default)]
pub struct PopulateReport {
    outcomes: BTreeMap<String, Result<Outcome, StoreError>>,
    first_failure: Option<String>,
}

impl PopulateReport {
    /// Record a finished task. Call in completion order.
    pub(crate) fn record(&mut self, version: String, result: Result<Outcome, StoreError>) {
        if result.is_err() && self.first_failure.is_none() {
            self.first_failure = Some(version.clone());
        }
        self.outcomes.insert(version, result);
    }

    pub fn outcome(&self, version: &str) -> Option<&Result<Outcome, StoreError>> {
        self.outcomes.get(version)
    }

    /// All versions in sorted order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Result<Outcome, StoreError>)> {
        self.outcomes.iter().map(|(v, r)| (v.as_str(), r))
    }

    pub fn failures(&self) -> impl Iterator<Item = (&str, &StoreError)> {
        self.iter().filter_map(|(v, r)| r.as_ref().err().map(|e| (v, e)))
    }

    pub fn first_failure(&self) -> Option<(&str, &StoreError)> {
        let version = self.first_failure.as_deref()?;
        match self.outcomes.get(version) {
            Some(Err(e)) => Some((version, e)),
            _ => None,
        }
    }

    pub fn is_success(&self) -> bool {
        self.first_failure.is_none()
    }

    /// Number of versions fetched over the network in this run.
    pub fn downloaded(&self) -> usize {
        self.outcomes
            .values()
            .filter(|r| matches!(r, Ok(Outcome::Downloaded { .. })))
            .count()
    }

    pub fn len(&self) -> usize {
        self.outcomes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.outcomes.is_empty()
    }

    /// Collapse to the single-error form: the first failure, or `Ok`.
    pub fn into_result(mut self) -> Result<(), StoreError> {
        let Some(version) = self.first_failure.take() else {
            return Ok(());
        };
        match self.outcomes.remove(&version) {
            Some(Err(e)) => Err(e),
            _ => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn first_failure_is_completion_order() {
        let mut r = PopulateReport::default();
        r.record("b".into(), Ok(Outcome::Downloaded { bytes: 20 }));
        r.record(
            "c".into(),
            Err(StoreError::HttpStatus {
                url: "http://h/c.iso".into(),
                status: 404,
            }),
        );
        r.record(
            "a".into(),
            Err(StoreError::MissingAsset {
                version: "a".into(),
                key: "iso_url".into(),
            }),
        );
        assert!(!r.is_success());
        assert_eq!(r.len(), 3);
        assert_eq!(r.failures().count(), 2);
        assert_eq!(r.downloaded(), 1);
        assert_eq!(r.first_failure().map(|(v, _)| v), Some("c"));
        assert!(matches!(
            r.into_result(),
            Err(StoreError::HttpStatus { status: 404, .. })
        ));
    }

    #[test]
    fn all_ok() {
        let mut r = PopulateReport::default();
        r.record("a".into(), Ok(Outcome::AlreadyPresent));
        r.record("b".into(), Ok(Outcome::Downloaded { bytes: 1 }));
        assert!(r.is_success());
        assert_eq!(r.outcome("a").unwrap().as_ref().unwrap(), &Outcome::AlreadyPresent);
        assert!(r.first_failure().is_none());
        assert!(r.into_result().is_ok());
    }
}
