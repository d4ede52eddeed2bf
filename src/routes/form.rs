use crate::{
    data::{
        StudentSession, StudentStore,
        student::{IdentityKey, Student, StudentFilter, parse_study_year},
    },
    state::RosterState,
};
use axum::{
    Form,
    extract::State,
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormError {
    MissingFields(Vec<&'static str>),
    BadStudyYear,
    Exists,
    NeedFio,
    NotFound,
    DbError,
}

impl FormError {
    pub const fn code(&self) -> &'static str {
        match self {
            Self::MissingFields(_) => "missing_fields",
            Self::BadStudyYear => "bad_study_year",
            Self::Exists => "exists",
            Self::NeedFio => "need_fio",
            Self::NotFound => "notfound",
            Self::DbError => "db_error",
        }
    }
}

/// Where the browser is sent back to after a form submission.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FormOutcome {
    Created,
    Deleted,
    Failed(FormError),
    /// unknown `action`
    Ignored,
}

impl FormOutcome {
    pub fn location(&self) -> String {
        match self {
            Self::Created => "/?created=1".to_string(),
            Self::Deleted => "/?deleted=1".to_string(),
            Self::Failed(e @ FormError::MissingFields(missing)) => {
                format!("/?error={}&missing={}", e.code(), missing.join(","))
            }
            Self::Failed(e) => format!("/?error={}", e.code()),
            Self::Ignored => "/".to_string(),
        }
    }
}

impl IntoResponse for FormOutcome {
    fn into_response(self) -> Response {
        Redirect::to(&self.location()).into_response()
    }
}

#[derive(Deserialize, Debug, Clone, Default)]
pub struct StudentForm {
    pub action: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub patronymic: String,
    #[serde(default)]
    pub study_year: String,
    #[serde(default)]
    pub group_name: String,
    #[serde(default)]
    pub faculty_name: String,
}

impl StudentForm {
    /// Trims every field except `action`.
    #[must_use]
    pub fn trimmed(self) -> Self {
        let trim = |s: String| s.trim().to_string();
        Self {
            action: self.action,
            last_name: trim(self.last_name),
            first_name: trim(self.first_name),
            patronymic: trim(self.patronymic),
            study_year: trim(self.study_year),
            group_name: trim(self.group_name),
            faculty_name: trim(self.faculty_name),
        }
    }

    fn missing_fields(&self) -> Vec<&'static str> {
        [
            ("last_name", &self.last_name),
            ("first_name", &self.first_name),
            ("patronymic", &self.patronymic),
            ("study_year", &self.study_year),
            ("group_name", &self.group_name),
            ("faculty_name", &self.faculty_name),
        ]
        .into_iter()
        .filter(|(_, value)| value.is_empty())
        .map(|(name, _)| name)
        .collect()
    }

    fn key(&self) -> IdentityKey {
        IdentityKey {
            last_name: self.last_name.clone(),
            first_name: self.first_name.clone(),
            patronymic: self.patronymic.clone(),
        }
    }
}

async fn abandon(session: Box<dyn StudentSession>) {
    if let Err(e) = session.rollback().await {
        error!(?e, "Error rolling back");
    }
}

pub async fn create_student(store: &dyn StudentStore, form: &StudentForm) -> FormOutcome {
    let missing = form.missing_fields();
    if !missing.is_empty() {
        return FormOutcome::Failed(FormError::MissingFields(missing));
    }

    let Some(study_year) = parse_study_year(&form.study_year) else {
        return FormOutcome::Failed(FormError::BadStudyYear);
    };
    // a number, just not one the column can store
    let Ok(study_year) = i32::try_from(study_year) else {
        error!(study_year, "Study year out of range for the column");
        return FormOutcome::Failed(FormError::DbError);
    };

    let mut session = match store.begin().await {
        Ok(session) => session,
        Err(e) => {
            error!(?e, "Unable to start session for create");
            return FormOutcome::Failed(FormError::DbError);
        }
    };

    match session.find_first(&StudentFilter::by_key(form.key())).await {
        Ok(Some(_)) => return FormOutcome::Failed(FormError::Exists),
        Ok(None) => {}
        // lenient: carry on and let the insert decide
        Err(e) => warn!(?e, "Existence check failed, assuming the student is new"),
    }

    let student = Student {
        last_name: form.last_name.clone(),
        first_name: form.first_name.clone(),
        patronymic: form.patronymic.clone(),
        study_year,
        group_name: form.group_name.clone(),
        faculty_name: form.faculty_name.clone(),
    };

    if let Err(e) = session.insert(&student).await {
        error!(?e, "Error inserting student");
        abandon(session).await;
        return FormOutcome::Failed(FormError::DbError);
    }
    if let Err(e) = session.commit().await {
        error!(?e, "Error committing new student");
        return FormOutcome::Failed(FormError::DbError);
    }

    FormOutcome::Created
}

pub async fn delete_student(store: &dyn StudentStore, form: &StudentForm) -> FormOutcome {
    if form.last_name.is_empty() || form.first_name.is_empty() || form.patronymic.is_empty() {
        return FormOutcome::Failed(FormError::NeedFio);
    }

    let filter = StudentFilter::by_key(form.key())
        .narrowed_by_study_year(&form.study_year)
        .narrowed_by_group(&form.group_name)
        .narrowed_by_faculty(&form.faculty_name);

    let mut session = match store.begin().await {
        Ok(session) => session,
        Err(e) => {
            error!(?e, "Unable to start session for delete");
            return FormOutcome::Failed(FormError::DbError);
        }
    };

    let target = match session.find_first(&filter).await {
        Ok(Some(target)) => target,
        Ok(None) => return FormOutcome::Failed(FormError::NotFound),
        Err(e) => {
            error!(?e, "Error looking up student to delete");
            return FormOutcome::Failed(FormError::DbError);
        }
    };

    if let Err(e) = session.remove(&target.key()).await {
        error!(?e, "Error deleting student");
        abandon(session).await;
        return FormOutcome::Failed(FormError::DbError);
    }
    if let Err(e) = session.commit().await {
        error!(?e, "Error committing student deletion");
        return FormOutcome::Failed(FormError::DbError);
    }

    FormOutcome::Deleted
}

pub async fn post_form(
    State(state): State<RosterState>,
    Form(form): Form<StudentForm>,
) -> FormOutcome {
    let form = form.trimmed();

    let outcome = match form.action.as_str() {
        "create" => create_student(&*state, &form).await,
        "delete" => delete_student(&*state, &form).await,
        other => {
            warn!(action = other, "Unknown form action");
            FormOutcome::Ignored
        }
    };

    match &outcome {
        FormOutcome::Failed(e) => warn!(code = e.code(), action = %form.action, "Form rejected"),
        _ => info!(?outcome, "Form handled"),
    }
    outcome
}
