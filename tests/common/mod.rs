#![allow(dead_code)]

use std::{
    collections::{HashMap, VecDeque},
    sync::{
        Arc, Mutex,
        atomic::{AtomicBool, AtomicUsize, Ordering},
    },
};

use attendance_proxy::{AppState, config::Config, create_router};
use axum::{
    Json, Router,
    body::Body,
    extract::{Form, Query, State},
    http::{HeaderMap, Request, StatusCode, header},
    response::{AppendHeaders, Html, IntoResponse, Redirect, Response},
    routing::{get, post},
};
use serde_json::{Value, json};
use tower::ServiceExt;

pub const PORTAL_USER: &str = "L00123456";
pub const PORTAL_PIN: &str = "1234";

/// Scripted answer for the next `getRegisteredSections` call.
pub enum Reply {
    Json(StatusCode, Value),
    Html(&'static str),
    Redirect(&'static str),
    BrokenJson(&'static str),
}

#[derive(Default)]
pub struct PortalState {
    pub entry_hits: AtomicUsize,
    pub query_hits: AtomicUsize,
    pub login_hits: AtomicUsize,
    pub withhold_cookies: AtomicBool,
    replies: Mutex<VecDeque<Reply>>,
    pub seen_cookies: Mutex<Vec<String>>,
    pub seen_queries: Mutex<Vec<HashMap<String, String>>>,
}

/// A fake self-service portal bound to an ephemeral local port.
pub struct MockPortal {
    pub base_url: String,
    pub state: Arc<PortalState>,
}

impl MockPortal {
    pub async fn start() -> Self {
        let state = Arc::new(PortalState::default());
        let app = Router::new()
            .route("/ssb/studentAttendanceTracking/attendanceTracking", get(entry))
            .route(
                "/ssb/studentAttendanceTracking/getRegisteredSections",
                get(registered_sections),
            )
            .route("/login/auth", post(login))
            .with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        Self {
            base_url: format!("http://{}", addr),
            state,
        }
    }

    pub fn push(&self, reply: Reply) {
        self.state.replies.lock().unwrap().push_back(reply);
    }

    pub fn entry_hits(&self) -> usize {
        self.state.entry_hits.load(Ordering::SeqCst)
    }

    pub fn query_hits(&self) -> usize {
        self.state.query_hits.load(Ordering::SeqCst)
    }

    pub fn login_hits(&self) -> usize {
        self.state.login_hits.load(Ordering::SeqCst)
    }

    pub fn seen_cookies(&self) -> Vec<String> {
        self.state.seen_cookies.lock().unwrap().clone()
    }

    pub fn seen_queries(&self) -> Vec<HashMap<String, String>> {
        self.state.seen_queries.lock().unwrap().clone()
    }
}

pub fn section(nrc: &str, days: Value) -> Value {
    json!({
        "courseReferenceNumber": nrc,
        "courseTitle": "FUNDAMENTOS DE PROGRAMACION",
        "subject": "INFO",
        "subjectDescription": "Informática",
        "courseNumber": "1001",
        "term": "202450",
        "termDescription": "Mayo - Septiembre 2024",
        "meetingDays": days,
        "beginTime": "1430",
        "endTime": "1600",
        "totalMissed": 2,
        "attendancePercentage": 95.5
    })
}

pub fn listing(records: Vec<Value>) -> Value {
    json!({ "success": true, "totalCount": records.len(), "data": records })
}

async fn entry(State(state): State<Arc<PortalState>>) -> Response {
    let n = state.entry_hits.fetch_add(1, Ordering::SeqCst) + 1;
    if state.withhold_cookies.load(Ordering::SeqCst) {
        return Html("<html>mantenimiento</html>").into_response();
    }
    (
        AppendHeaders([
            (header::SET_COOKIE, format!("JSESSIONID=mock-{}; Path=/; HttpOnly", n)),
            (header::SET_COOKIE, "BIGipServerpool_sss=777.20480.0000; path=/".to_string()),
        ]),
        Html("<html>asistencia</html>"),
    )
        .into_response()
}

async fn registered_sections(
    State(state): State<Arc<PortalState>>,
    Query(params): Query<HashMap<String, String>>,
    headers: HeaderMap,
) -> Response {
    state.query_hits.fetch_add(1, Ordering::SeqCst);
    let cookie = headers
        .get(header::COOKIE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    state.seen_cookies.lock().unwrap().push(cookie);
    let filter = params.get("filterText").cloned().unwrap_or_default();
    state.seen_queries.lock().unwrap().push(params);

    let reply = state.replies.lock().unwrap().pop_front();
    match reply {
        None => Json(listing(vec![section(
            &filter,
            json!([false, true, false, false, false, true, false]),
        )]))
        .into_response(),
        Some(Reply::Json(status, body)) => (status, Json(body)).into_response(),
        Some(Reply::Html(body)) => Html(body).into_response(),
        Some(Reply::Redirect(to)) => Redirect::to(to).into_response(),
        Some(Reply::BrokenJson(body)) => {
            ([(header::CONTENT_TYPE, "application/json")], body).into_response()
        }
    }
}

async fn login(
    State(state): State<Arc<PortalState>>,
    Form(form): Form<HashMap<String, String>>,
) -> Response {
    let n = state.login_hits.fetch_add(1, Ordering::SeqCst) + 1;
    let accepted = form.get("username").map(String::as_str) == Some(PORTAL_USER)
        && form.get("password").map(String::as_str) == Some(PORTAL_PIN);

    if accepted {
        (
            AppendHeaders([(header::SET_COOKIE, format!("JSESSIONID=login-{}; Path=/", n))]),
            Redirect::to("/ssb/studentAttendanceTracking/attendanceTracking"),
        )
            .into_response()
    } else {
        Redirect::to("/login/auth?error=true").into_response()
    }
}

pub fn proxy(portal: &MockPortal, tweak: impl FnOnce(&mut Config)) -> (Router, AppState) {
    let mut config = Config {
        portal_base_url: portal.base_url.clone(),
        ..Config::default()
    };
    tweak(&mut config);
    let state = AppState::new(config).unwrap();
    (create_router(state.clone()), state)
}

pub async fn send(router: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
}

pub fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

pub fn post_empty(uri: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

pub fn get_req(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}
