//! Tagged result of a single field extractor

/// Outcome of one field extractor
///
/// Absence is an ordinary outcome, not an error: markup differs across
/// post eras and a missing widget says nothing about the rest of the page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldResult<T> {
    /// The field was located and converted
    Found(T),
    /// No strategy located the field
    Absent,
}

impl<T> FieldResult<T> {
    pub fn is_found(&self) -> bool {
        matches!(self, Self::Found(_))
    }

    pub fn is_absent(&self) -> bool {
        matches!(self, Self::Absent)
    }

    pub fn map<U, F: FnOnce(T) -> U>(self, f: F) -> FieldResult<U> {
        match self {
            Self::Found(value) => FieldResult::Found(f(value)),
            Self::Absent => FieldResult::Absent,
        }
    }

    pub fn unwrap_or(self, default: T) -> T {
        match self {
            Self::Found(value) => value,
            Self::Absent => default,
        }
    }

    pub fn into_option(self) -> Option<T> {
        match self {
            Self::Found(value) => Some(value),
            Self::Absent => None,
        }
    }
}

impl<T: Default> FieldResult<T> {
    pub fn unwrap_or_default(self) -> T {
        self.unwrap_or(T::default())
    }
}

impl<T> From<Option<T>> for FieldResult<T> {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(value) => Self::Found(value),
            None => Self::Absent,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        assert_eq!(FieldResult::<u64>::Absent.unwrap_or_default(), 0);
        assert_eq!(FieldResult::<String>::Absent.unwrap_or_default(), "");
        assert_eq!(FieldResult::Found(7u64).unwrap_or_default(), 7);
    }

    #[test]
    fn test_from_option() {
        assert!(FieldResult::from(Some(1)).is_found());
        assert!(FieldResult::<i32>::from(None).is_absent());
    }

    #[test]
    fn test_map() {
        assert_eq!(FieldResult::Found(2).map(|v| v * 2), FieldResult::Found(4));
        assert_eq!(FieldResult::<i32>::Absent.map(|v| v * 2), FieldResult::Absent);
    }
}
