use crate::{
    data::{pagination::Pagination, student::Student},
    error::RosterResult,
    maud_conveniences::{alert, form_submit_button, render_table, simple_form_element, subtitle},
    state::RosterState,
};
use axum::extract::{Query, State};
use maud::{Markup, html};
use serde::Deserialize;

#[derive(Deserialize, Debug, Default)]
pub struct IndexQuery {
    pub page: Option<i64>,
    pub size: Option<i64>,
    pub created: Option<String>,
    pub deleted: Option<String>,
    pub error: Option<String>,
    pub missing: Option<String>,
}

impl IndexQuery {
    /// The banner for whatever `POST /form/` redirected here with.
    fn notice(&self) -> Option<Markup> {
        if let Some(code) = &self.error {
            let message = match code.as_str() {
                "missing_fields" => format!(
                    "Every field is required to add a student. Missing: {}",
                    self.missing.as_deref().unwrap_or_default().replace(',', ", ")
                ),
                "bad_study_year" => "Study year must be a whole number.".to_string(),
                "exists" => "A student with that full name already exists.".to_string(),
                "need_fio" => {
                    "Last name, first name and patronymic are needed to delete a student."
                        .to_string()
                }
                "notfound" => "No matching student was found.".to_string(),
                "db_error" => "Database error, nothing was changed.".to_string(),
                other => format!("Error: {other}"),
            };
            return Some(alert(false, message));
        }
        if self.created.is_some() {
            return Some(alert(true, "Student added."));
        }
        if self.deleted.is_some() {
            return Some(alert(true, "Student deleted."));
        }
        None
    }
}

fn student_row(student: &Student) -> [Markup; 7] {
    [
        html! {(student.last_name)},
        html! {(student.first_name)},
        html! {(student.patronymic)},
        html! {(student.study_year)},
        html! {(student.group_name)},
        html! {(student.faculty_name)},
        html! {
            form method="post" action="/form/" {
                input type="hidden" name="action" value="delete" {}
                input type="hidden" name="last_name" value=(student.last_name) {}
                input type="hidden" name="first_name" value=(student.first_name) {}
                input type="hidden" name="patronymic" value=(student.patronymic) {}
                button type="submit" class="bg-red-600 hover:bg-red-800 font-bold py-1 px-2 rounded" {"Delete"}
            }
        },
    ]
}

fn page_link(page: i64, size: i64) -> String {
    format!("/?page={page}&size={size}")
}

fn render_pagination(pagination: &Pagination) -> Markup {
    html! {
        div class="flex flex-row items-center justify-between my-4" {
            @if let Some(previous) = pagination.previous() {
                a href=(page_link(previous, pagination.size)) class="bg-slate-600 hover:bg-slate-800 font-bold py-2 px-4 rounded" {"Previous"}
            } @else {
                span {}
            }
            span class="text-gray-300" {
                "Page " (pagination.page) " of " (pagination.total_pages)
                " (" (pagination.total_count) " students)"
            }
            @if let Some(next) = pagination.next() {
                a href=(page_link(next, pagination.size)) class="bg-slate-600 hover:bg-slate-800 font-bold py-2 px-4 rounded" {"Next"}
            } @else {
                span {}
            }
        }
    }
}

fn render_forms() -> Markup {
    html! {
        div class="grid grid-cols-1 md:grid-cols-2 gap-8 mt-8" {
            form method="post" action="/form/" class="p-4 bg-gray-800 rounded" {
                (subtitle("Add Student"))
                input type="hidden" name="action" value="create" {}
                (simple_form_element("last_name", "Last Name", true, None))
                (simple_form_element("first_name", "First Name", true, None))
                (simple_form_element("patronymic", "Patronymic", true, None))
                (simple_form_element("study_year", "Study Year", true, Some("number")))
                (simple_form_element("group_name", "Group", true, None))
                (simple_form_element("faculty_name", "Faculty", true, None))
                (form_submit_button("Add Student", false))
            }
            form method="post" action="/form/" class="p-4 bg-gray-800 rounded" {
                (subtitle("Delete Student"))
                input type="hidden" name="action" value="delete" {}
                (simple_form_element("last_name", "Last Name", true, None))
                (simple_form_element("first_name", "First Name", true, None))
                (simple_form_element("patronymic", "Patronymic", true, None))
                (simple_form_element("study_year", "Study Year (optional)", false, None))
                (simple_form_element("group_name", "Group (optional)", false, None))
                (simple_form_element("faculty_name", "Faculty (optional)", false, None))
                (form_submit_button("Delete Student", true))
            }
        }
    }
}

pub async fn get_index_route(
    State(state): State<RosterState>,
    Query(query): Query<IndexQuery>,
) -> RosterResult<Markup> {
    let mut session = state.begin().await?;

    let total_count = match session.count().await {
        Ok(count) => count,
        Err(e) => {
            warn!(?e, "Unable to count students, showing none");
            0
        }
    };
    let pagination = Pagination::new(query.page, query.size, total_count);
    let students = session
        .page(pagination.offset(), pagination.size)
        .await?;

    let rows = students.iter().map(student_row).collect();

    Ok(state.render(html! {
        div class="mx-auto bg-gray-800 p-8 rounded shadow-md max-w-5xl w-full flex flex-col" {
            @if let Some(notice) = query.notice() {
                (notice)
            }
            (render_table(
                "Students",
                ["Last Name", "First Name", "Patronymic", "Study Year", "Group", "Faculty", ""],
                rows,
            ))
            (render_pagination(&pagination))
            (render_forms())
        }
    }))
}
