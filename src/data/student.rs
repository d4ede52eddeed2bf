use sqlx::FromRow;

/// One row of `public.students`.
#[derive(Debug, Clone, PartialEq, Eq, FromRow)]
pub struct Student {
    pub last_name: String,
    pub first_name: String,
    pub patronymic: String,
    pub study_year: i32,
    pub group_name: String,
    pub faculty_name: String,
}

impl Student {
    pub fn key(&self) -> IdentityKey {
        IdentityKey {
            last_name: self.last_name.clone(),
            first_name: self.first_name.clone(),
            patronymic: self.patronymic.clone(),
        }
    }
}

/// The composite primary key. Field order gives the listing order.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct IdentityKey {
    pub last_name: String,
    pub first_name: String,
    pub patronymic: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Predicate<'a> {
    LastName(&'a str),
    FirstName(&'a str),
    Patronymic(&'a str),
    StudyYear(i64),
    GroupName(&'a str),
    FacultyName(&'a str),
}

impl Predicate<'_> {
    pub const fn column(&self) -> &'static str {
        match self {
            Self::LastName(_) => "last_name",
            Self::FirstName(_) => "first_name",
            Self::Patronymic(_) => "patronymic",
            Self::StudyYear(_) => "study_year",
            Self::GroupName(_) => "group_name",
            Self::FacultyName(_) => "faculty_name",
        }
    }

    #[cfg(test)]
    pub fn matches(&self, student: &Student) -> bool {
        match *self {
            Self::LastName(v) => student.last_name == v,
            Self::FirstName(v) => student.first_name == v,
            Self::Patronymic(v) => student.patronymic == v,
            Self::StudyYear(v) => i64::from(student.study_year) == v,
            Self::GroupName(v) => student.group_name == v,
            Self::FacultyName(v) => student.faculty_name == v,
        }
    }
}

/// A lookup by identity key, optionally narrowed by the other columns.
///
/// The `narrowed_by_*` builders take raw (already trimmed) form input and
/// drop the filter when the input is empty, or for the study year, when it
/// isn't an integer (see [`parse_study_year`]).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StudentFilter {
    key: IdentityKey,
    study_year: Option<i64>,
    group_name: Option<String>,
    faculty_name: Option<String>,
}

impl StudentFilter {
    pub const fn by_key(key: IdentityKey) -> Self {
        Self {
            key,
            study_year: None,
            group_name: None,
            faculty_name: None,
        }
    }

    #[must_use]
    pub fn narrowed_by_study_year(mut self, raw: &str) -> Self {
        self.study_year = parse_study_year(raw);
        self
    }

    #[must_use]
    pub fn narrowed_by_group(mut self, raw: &str) -> Self {
        self.group_name = non_empty(raw);
        self
    }

    #[must_use]
    pub fn narrowed_by_faculty(mut self, raw: &str) -> Self {
        self.faculty_name = non_empty(raw);
        self
    }

    pub fn predicates(&self) -> Vec<Predicate<'_>> {
        let mut predicates = vec![
            Predicate::LastName(&self.key.last_name),
            Predicate::FirstName(&self.key.first_name),
            Predicate::Patronymic(&self.key.patronymic),
        ];
        if let Some(study_year) = self.study_year {
            predicates.push(Predicate::StudyYear(study_year));
        }
        if let Some(group_name) = &self.group_name {
            predicates.push(Predicate::GroupName(group_name));
        }
        if let Some(faculty_name) = &self.faculty_name {
            predicates.push(Predicate::FacultyName(faculty_name));
        }
        predicates
    }

    #[cfg(test)]
    pub fn matches(&self, student: &Student) -> bool {
        self.predicates().iter().all(|p| p.matches(student))
    }
}

/// Reads a study year typed into a form: an optional sign, then digits,
/// optionally grouped with single `_`s.
///
/// Integers beyond `i64` saturate instead of being rejected. They can never
/// equal an `INTEGER` column, so as a filter they match nothing.
pub fn parse_study_year(raw: &str) -> Option<i64> {
    let (negative, digits) = match raw.as_bytes().first() {
        Some(b'-') => (true, &raw[1..]),
        Some(b'+') => (false, &raw[1..]),
        _ => (false, raw),
    };

    let well_formed = !digits.is_empty()
        && !digits.starts_with('_')
        && !digits.ends_with('_')
        && !digits.contains("__")
        && digits.chars().all(|c| c.is_ascii_digit() || c == '_');
    if !well_formed {
        return None;
    }

    let digits: String = digits.chars().filter(|&c| c != '_').collect();
    Some(match digits.parse::<i64>() {
        Ok(v) if negative => -v,
        Ok(v) => v,
        Err(_) if negative => i64::MIN,
        Err(_) => i64::MAX,
    })
}

fn non_empty(raw: &str) -> Option<String> {
    if raw.is_empty() {
        None
    } else {
        Some(raw.to_string())
    }
}

#[cfg(test)]
pub fn student(last_name: &str, first_name: &str, patronymic: &str, study_year: i32) -> Student {
    Student {
        last_name: last_name.into(),
        first_name: first_name.into(),
        patronymic: patronymic.into(),
        study_year,
        group_name: "IU7-11B".into(),
        faculty_name: "IU".into(),
    }
}
