use crate::{
    routes::{form::post_form, healthcheck::get_healthcheck, index::get_index_route},
    state::RosterState,
};
use axum::{
    Router,
    routing::{get, post},
};
use tower_http::{
    compression::CompressionLayer, limit::RequestBodyLimitLayer, trace::TraceLayer,
};

pub mod form;
pub mod healthcheck;
pub mod index;

/// Six short text fields fit comfortably.
const FORM_BODY_LIMIT: usize = 16 * 1024;

pub fn router(state: RosterState) -> Router {
    Router::new()
        .route("/", get(get_index_route))
        .route("/form/", post(post_form))
        .route("/healthcheck", get(get_healthcheck))
        .layer(RequestBodyLimitLayer::new(FORM_BODY_LIMIT))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::{
        memory::{Faults, MemoryStudentStore},
        student::student,
    };
    use axum::{
        body::{Body, to_bytes},
        http::{Request, StatusCode, header},
        response::Response,
    };
    use tower::ServiceExt;

    async fn send(store: &MemoryStudentStore, request: Request<Body>) -> Response {
        router(RosterState::from_store(store.clone()))
            .oneshot(request)
            .await
            .unwrap()
    }

    async fn get_page(store: &MemoryStudentStore, uri: &str) -> (StatusCode, String) {
        let response = send(store, Request::get(uri).body(Body::empty()).unwrap()).await;
        let status = response.status();
        let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, String::from_utf8(body.to_vec()).unwrap())
    }

    async fn submit(store: &MemoryStudentStore, body: &str) -> Response {
        send(
            store,
            Request::post("/form/")
                .header(header::CONTENT_TYPE, "application/x-www-form-urlencoded")
                .body(Body::from(body.to_string()))
                .unwrap(),
        )
        .await
    }

    fn location(response: &Response) -> &str {
        response.headers()[header::LOCATION].to_str().unwrap()
    }

    fn roster(n: usize) -> MemoryStudentStore {
        MemoryStudentStore::with_students(
            (0..n).map(|i| student(&format!("Student{i:02}"), "Ivan", "Ivanovich", 1)),
        )
    }

    #[tokio::test]
    async fn listing_is_ordered_and_paged() {
        let store = MemoryStudentStore::with_students([
            student("Sidorov", "Anton", "A", 1),
            student("Abramov", "Boris", "B", 2),
            student("Abramov", "Anna", "C", 3),
        ]);
        let (status, body) = get_page(&store, "/?size=2").await;
        assert_eq!(status, StatusCode::OK);

        let anna = body.find("Anna").unwrap();
        let boris = body.find("Boris").unwrap();
        assert!(anna < boris);
        assert!(!body.contains("Sidorov"));
        assert!(body.contains("Page 1 of 2"));
    }

    #[tokio::test]
    async fn page_past_the_end_shows_last_page() {
        let store = roster(25);
        let (status, body) = get_page(&store, "/?page=40&size=10").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("Page 3 of 3"));
        assert!(body.contains("Student24"));
        assert!(!body.contains("Student19"));
    }

    #[tokio::test]
    async fn nonsense_page_and_size_fall_back() {
        let store = roster(15);
        let (_, body) = get_page(&store, "/?page=-3&size=0").await;
        assert!(body.contains("Page 1 of 2"));
        assert!(body.contains("Student09"));
        assert!(!body.contains("Student10"));
    }

    #[tokio::test]
    async fn failed_count_renders_empty_listing() {
        let store = roster(3);
        store.set_faults(Faults {
            count: true,
            ..Faults::default()
        });
        let (status, body) = get_page(&store, "/").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("Page 1 of 1"));
        assert!(body.contains("(0 students)"));
    }

    #[tokio::test]
    async fn failed_page_query_is_an_error_page() {
        let store = roster(3);
        store.set_faults(Faults {
            page: true,
            ..Faults::default()
        });
        let (status, _) = get_page(&store, "/").await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn created_student_shows_up_in_listing() {
        let store = MemoryStudentStore::default();
        let response = submit(
            &store,
            "action=create&last_name=+Petrov+&first_name=Petr&patronymic=Petrovich&study_year=2&group_name=IU7&faculty_name=IU",
        )
        .await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&response), "/?created=1");

        let (_, body) = get_page(&store, "/?created=1").await;
        assert!(body.contains("Student added."));
        assert!(body.contains("Petrov"));
        assert_eq!(store.snapshot()[0].last_name, "Petrov");
    }

    #[tokio::test]
    async fn form_errors_redirect_with_codes() {
        let store = MemoryStudentStore::with_students([student("Ivanov", "Ivan", "Ivanovich", 1)]);

        let response = submit(&store, "action=create&last_name=Ivanov").await;
        assert_eq!(
            location(&response),
            "/?error=missing_fields&missing=first_name,patronymic,study_year,group_name,faculty_name"
        );

        let response = submit(
            &store,
            "action=create&last_name=A&first_name=B&patronymic=C&study_year=abc&group_name=G&faculty_name=F",
        )
        .await;
        assert_eq!(location(&response), "/?error=bad_study_year");

        let response = submit(
            &store,
            "action=create&last_name=Ivanov&first_name=Ivan&patronymic=Ivanovich&study_year=3&group_name=G&faculty_name=F",
        )
        .await;
        assert_eq!(location(&response), "/?error=exists");

        let response = submit(&store, "action=delete&last_name=Ivanov&first_name=Ivan").await;
        assert_eq!(location(&response), "/?error=need_fio");

        let response =
            submit(&store, "action=delete&last_name=Nobody&first_name=X&patronymic=Y").await;
        assert_eq!(location(&response), "/?error=notfound");

        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn delete_then_listing_is_empty() {
        let store = MemoryStudentStore::with_students([student("Ivanov", "Ivan", "Ivanovich", 1)]);
        let response = submit(
            &store,
            "action=delete&last_name=Ivanov&first_name=Ivan&patronymic=Ivanovich&study_year=abc",
        )
        .await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&response), "/?deleted=1");
        assert_eq!(store.len(), 0);
    }

    #[tokio::test]
    async fn unknown_action_is_a_plain_redirect() {
        let store = roster(1);
        let response = submit(&store, "action=update&last_name=Student00").await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        assert_eq!(location(&response), "/");
        assert_eq!(store.len(), 1);
    }

    #[tokio::test]
    async fn missing_action_is_rejected() {
        let store = roster(1);
        let response = submit(&store, "last_name=Student00").await;
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[tokio::test]
    async fn healthcheck_reports_database_state() {
        let store = MemoryStudentStore::default();
        let (status, body) = get_page(&store, "/healthcheck").await;
        assert_eq!(status, StatusCode::OK);
        let json: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(json["status"], "healthy");
        assert_eq!(json["database"], "ok");

        store.set_faults(Faults {
            ping: true,
            ..Faults::default()
        });
        let (status, body) = get_page(&store, "/healthcheck").await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        let json: serde_json::Value = serde_json::from_str(&body).unwrap();
        assert_eq!(json["status"], "unhealthy");
        assert_eq!(json["database"], "error");
    }
}
