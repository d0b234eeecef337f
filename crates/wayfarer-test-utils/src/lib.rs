//! Shared test utilities for wayfarer integration tests.
//!
//! Provides [`MockBackend`], an in-memory stand-in for the travel-plans
//! REST API served by axum on an ephemeral localhost port. Each test
//! starts its own backend, so tests never share state.
//!
//! Besides serving the API, the backend:
//! - records every request (method, path, query, auth and content-type
//!   headers) so tests can assert on what the client sent;
//! - can be told to fail the next matching request with an arbitrary
//!   status and raw body.

use std::collections::{HashMap, VecDeque};
use std::net::SocketAddr;
use std::sync::{Arc, Mutex, MutexGuard};

use axum::extract::{Path, Query, Request, State};
use axum::http::{HeaderMap, Method, StatusCode, header};
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use chrono::Utc;
use serde_json::{Value, json};
use tokio::task::JoinHandle;
use uuid::Uuid;

use wayfarer_api::models::{
    Activity, Coordinates, Credentials, DirectionsRequest, Expense, Itinerary, ItineraryRequest,
    NewExpense, NewTravelPlan, NewUser, Place, TravelPlan, TravelPlanUpdate, User,
};

// ---------------------------------------------------------------------------
// Recorded traffic and injected failures
// ---------------------------------------------------------------------------

/// One request as seen by the backend. `path` excludes the `/api` prefix.
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: Method,
    pub path: String,
    pub query: Option<String>,
    pub authorization: Option<String>,
    pub content_type: Option<String>,
}

#[derive(Debug)]
struct InjectedFailure {
    method: Method,
    path: String,
    status: StatusCode,
    body: String,
}

#[derive(Default)]
struct Inner {
    users: Vec<(User, String)>,
    tokens: HashMap<String, Uuid>,
    plans: Vec<TravelPlan>,
    activities: Vec<Activity>,
    expenses: Vec<Expense>,
    requests: Vec<RecordedRequest>,
    failures: VecDeque<InjectedFailure>,
}

type Shared = Arc<Mutex<Inner>>;

fn lock(state: &Shared) -> MutexGuard<'_, Inner> {
    state.lock().unwrap_or_else(|e| e.into_inner())
}

// ---------------------------------------------------------------------------
// Backend handle
// ---------------------------------------------------------------------------

/// A running mock backend. The server stops when this is dropped.
pub struct MockBackend {
    addr: SocketAddr,
    state: Shared,
    server: JoinHandle<()>,
}

impl MockBackend {
    /// Bind to an ephemeral port and start serving.
    pub async fn start() -> Self {
        let state: Shared = Arc::default();
        let app = build_router(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("failed to bind mock backend");
        let addr = listener.local_addr().expect("failed to read local addr");

        let server = tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, app).await {
                tracing::error!(error = %e, "mock backend stopped");
            }
        });

        Self {
            addr,
            state,
            server,
        }
    }

    /// Base URL including the `/api` prefix, suitable for `ApiConfig::new`.
    pub fn base_url(&self) -> String {
        format!("http://{}/api", self.addr)
    }

    /// Create a user directly, bypassing the HTTP surface.
    pub fn seed_user(&self, email: &str, name: &str, password: &str) -> User {
        let user = User {
            id: Uuid::new_v4(),
            email: email.to_owned(),
            name: name.to_owned(),
        };
        lock(&self.state)
            .users
            .push((user.clone(), password.to_owned()));
        user
    }

    /// Mint a valid token for `user` without a login round trip.
    pub fn issue_token(&self, user: &User) -> String {
        let token = format!("tok-{}", Uuid::new_v4().simple());
        lock(&self.state).tokens.insert(token.clone(), user.id);
        token
    }

    /// Every stored plan regardless of owner, oldest first.
    pub fn plans(&self) -> Vec<TravelPlan> {
        lock(&self.state).plans.clone()
    }

    /// Every request received so far, in arrival order.
    pub fn requests(&self) -> Vec<RecordedRequest> {
        lock(&self.state).requests.clone()
    }

    pub fn clear_requests(&self) {
        lock(&self.state).requests.clear();
    }

    /// Answer the next `method path` request with `status` and the raw
    /// `body` instead of routing it. `path` excludes the `/api` prefix.
    pub fn fail_next(&self, method: Method, path: &str, status: StatusCode, body: &str) {
        lock(&self.state).failures.push_back(InjectedFailure {
            method,
            path: path.to_owned(),
            status,
            body: body.to_owned(),
        });
    }
}

impl Drop for MockBackend {
    fn drop(&mut self) {
        self.server.abort();
    }
}

// ---------------------------------------------------------------------------
// Error type
// ---------------------------------------------------------------------------

struct AppError {
    status: StatusCode,
    message: String,
}

impl AppError {
    fn new(status: StatusCode, msg: impl Into<String>) -> Self {
        Self {
            status,
            message: msg.into(),
        }
    }

    fn bad_request(msg: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, msg)
    }

    fn unauthorized(msg: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, msg)
    }

    fn not_found(msg: impl Into<String>) -> Self {
        Self::new(StatusCode::NOT_FOUND, msg)
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let body = json!({ "error": self.message });
        (self.status, Json(body)).into_response()
    }
}

type HandlerResult = Result<Response, AppError>;

// ---------------------------------------------------------------------------
// Router
// ---------------------------------------------------------------------------

fn build_router(state: Shared) -> Router {
    let api = Router::new()
        .route("/users", post(create_user))
        .route("/auth/login", post(login))
        .route("/auth/me", get(current_user))
        .route("/travel-plans", get(list_plans).post(create_plan))
        .route(
            "/travel-plans/{id}",
            get(get_plan).put(update_plan).delete(delete_plan),
        )
        .route("/generate-itinerary", post(generate_itinerary))
        .route("/places/search", get(search_places))
        .route("/directions", post(directions))
        .route("/activities", post(create_activity))
        .route("/expenses", get(list_expenses).post(create_expense));

    Router::new()
        .nest("/api", api)
        .layer(middleware::from_fn_with_state(
            state.clone(),
            record_and_inject,
        ))
        .with_state(state)
}

async fn record_and_inject(State(state): State<Shared>, request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let full_path = request.uri().path().to_owned();
    let path = full_path
        .strip_prefix("/api")
        .unwrap_or(&full_path)
        .to_owned();
    let recorded = {
        let headers = request.headers();
        let header_str = |name: header::HeaderName| {
            headers
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(str::to_owned)
        };
        RecordedRequest {
            method: method.clone(),
            path: path.clone(),
            query: request.uri().query().map(str::to_owned),
            authorization: header_str(header::AUTHORIZATION),
            content_type: header_str(header::CONTENT_TYPE),
        }
    };

    let injected = {
        let mut inner = lock(&state);
        inner.requests.push(recorded);
        inner
            .failures
            .iter()
            .position(|f| f.method == method && f.path == path)
            .and_then(|i| inner.failures.remove(i))
    };

    match injected {
        Some(f) => (
            f.status,
            [(header::CONTENT_TYPE, "application/json")],
            f.body,
        )
            .into_response(),
        None => next.run(request).await,
    }
}

fn authenticate(inner: &Inner, headers: &HeaderMap) -> Result<Uuid, AppError> {
    let value = headers
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| AppError::unauthorized("Token is missing"))?;
    let token = value
        .strip_prefix("Bearer ")
        .ok_or_else(|| AppError::unauthorized("Invalid token format"))?;
    inner
        .tokens
        .get(token)
        .copied()
        .ok_or_else(|| AppError::unauthorized("Token is invalid"))
}

fn parse_body<T: serde::de::DeserializeOwned>(body: Value, msg: &str) -> Result<T, AppError> {
    serde_json::from_value(body).map_err(|_| AppError::bad_request(msg))
}

fn owned_plan_index(inner: &Inner, user_id: Uuid, plan_id: Uuid) -> Result<usize, AppError> {
    inner
        .plans
        .iter()
        .position(|p| p.id == plan_id && p.user_id == user_id)
        .ok_or_else(|| AppError::not_found("Travel plan not found"))
}

// ---------------------------------------------------------------------------
// Users and auth
// ---------------------------------------------------------------------------

async fn create_user(State(state): State<Shared>, Json(body): Json<Value>) -> HandlerResult {
    let new_user: NewUser = parse_body(body, "Missing required fields")?;
    let mut inner = lock(&state);
    if inner.users.iter().any(|(u, _)| u.email == new_user.email) {
        return Err(AppError::bad_request("User already exists"));
    }
    let user = User {
        id: Uuid::new_v4(),
        email: new_user.email,
        name: new_user.name,
    };
    inner.users.push((user.clone(), new_user.password));
    Ok((StatusCode::CREATED, Json(user)).into_response())
}

async fn login(State(state): State<Shared>, Json(body): Json<Value>) -> HandlerResult {
    let creds: Credentials = parse_body(body, "Email and password required")?;
    let mut inner = lock(&state);
    let user = inner
        .users
        .iter()
        .find(|(u, pw)| u.email == creds.email && *pw == creds.password)
        .map(|(u, _)| u.clone())
        .ok_or_else(|| AppError::unauthorized("Invalid credentials"))?;

    let token = format!("tok-{}", Uuid::new_v4().simple());
    inner.tokens.insert(token.clone(), user.id);
    Ok(Json(json!({ "token": token, "user": user })).into_response())
}

async fn current_user(State(state): State<Shared>, headers: HeaderMap) -> HandlerResult {
    let inner = lock(&state);
    let user_id = authenticate(&inner, &headers)?;
    let user = inner
        .users
        .iter()
        .find(|(u, _)| u.id == user_id)
        .map(|(u, _)| u.clone())
        .ok_or_else(|| AppError::not_found("User not found"))?;
    Ok(Json(user).into_response())
}

// ---------------------------------------------------------------------------
// Travel plans
// ---------------------------------------------------------------------------

async fn list_plans(State(state): State<Shared>, headers: HeaderMap) -> HandlerResult {
    let inner = lock(&state);
    let user_id = authenticate(&inner, &headers)?;
    // Newest first; insertion order stands in for created_at.
    let plans: Vec<&TravelPlan> = inner
        .plans
        .iter()
        .rev()
        .filter(|p| p.user_id == user_id)
        .collect();
    Ok(Json(plans).into_response())
}

async fn create_plan(
    State(state): State<Shared>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> HandlerResult {
    let mut inner = lock(&state);
    let user_id = authenticate(&inner, &headers)?;
    let new_plan: NewTravelPlan = parse_body(body, "Missing required fields")?;

    let now = Utc::now().naive_utc();
    let plan = TravelPlan {
        id: Uuid::new_v4(),
        user_id,
        destination: new_plan.destination,
        budget: new_plan.budget,
        duration: new_plan.duration,
        interests: new_plan.interests,
        start_date: new_plan.start_date,
        end_date: new_plan.end_date,
        itinerary: Some(Itinerary(json!({}))),
        total_cost: Some(0.0),
        created_at: now,
        updated_at: now,
    };
    inner.plans.push(plan.clone());
    Ok((StatusCode::CREATED, Json(plan)).into_response())
}

async fn get_plan(
    State(state): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
) -> HandlerResult {
    let inner = lock(&state);
    let user_id = authenticate(&inner, &headers)?;
    let idx = owned_plan_index(&inner, user_id, id)?;
    Ok(Json(&inner.plans[idx]).into_response())
}

async fn update_plan(
    State(state): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
    Json(body): Json<Value>,
) -> HandlerResult {
    let mut inner = lock(&state);
    let user_id = authenticate(&inner, &headers)?;
    let idx = owned_plan_index(&inner, user_id, id)?;
    let update: TravelPlanUpdate = parse_body(body, "Invalid update")?;

    let plan = &mut inner.plans[idx];
    if let Some(v) = update.destination {
        plan.destination = v;
    }
    if let Some(v) = update.budget {
        plan.budget = v;
    }
    if let Some(v) = update.duration {
        plan.duration = v;
    }
    if let Some(v) = update.interests {
        plan.interests = v;
    }
    if let Some(v) = update.start_date {
        plan.start_date = v;
    }
    if let Some(v) = update.end_date {
        plan.end_date = v;
    }
    if let Some(v) = update.itinerary {
        plan.itinerary = Some(v);
    }
    if let Some(v) = update.total_cost {
        plan.total_cost = Some(v);
    }
    plan.updated_at = Utc::now().naive_utc();

    Ok(Json(plan.clone()).into_response())
}

async fn delete_plan(
    State(state): State<Shared>,
    headers: HeaderMap,
    Path(id): Path<Uuid>,
) -> HandlerResult {
    let mut inner = lock(&state);
    let user_id = authenticate(&inner, &headers)?;
    let idx = owned_plan_index(&inner, user_id, id)?;
    inner.plans.remove(idx);
    inner.activities.retain(|a| a.plan_id != id);
    inner.expenses.retain(|e| e.plan_id != id);
    Ok(Json(json!({ "message": "Travel plan deleted successfully" })).into_response())
}

// ---------------------------------------------------------------------------
// Itinerary, places, directions
// ---------------------------------------------------------------------------

async fn generate_itinerary(
    State(state): State<Shared>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> HandlerResult {
    {
        let inner = lock(&state);
        authenticate(&inner, &headers)?;
    }
    let input: ItineraryRequest = parse_body(body, "Missing required fields")?;
    Ok(Json(canned_itinerary(&input)).into_response())
}

/// Deterministic itinerary: three activities per day, 90% of the budget.
pub fn canned_itinerary(input: &ItineraryRequest) -> Value {
    let duration = input.duration.max(1);
    let daily = input.budget / f64::from(duration);
    let activity_cost = daily * 0.6 / 3.0;
    let days: Vec<Value> = (1..=duration)
        .map(|day| {
            json!({
                "day": day,
                "activities": [
                    {
                        "name": format!("Morning Exploration - Day {day}"),
                        "description": format!("Explore popular attractions in {}", input.destination),
                        "time": "09:00",
                        "duration": 3,
                        "cost": activity_cost,
                        "category": "sightseeing"
                    },
                    {
                        "name": format!("Lunch & Local Experience - Day {day}"),
                        "time": "13:00",
                        "duration": 2,
                        "cost": activity_cost * 0.8,
                        "category": "dining"
                    },
                    {
                        "name": format!("Evening Activity - Day {day}"),
                        "time": "18:00",
                        "duration": 3,
                        "cost": activity_cost * 1.2,
                        "category": "entertainment"
                    }
                ]
            })
        })
        .collect();

    json!({
        "days": days,
        "total_estimated_cost": input.budget * 0.9,
        "budget_breakdown": {
            "accommodation": input.budget * 0.4,
            "food": input.budget * 0.3,
            "activities": input.budget * 0.2,
            "transportation": input.budget * 0.1
        }
    })
}

async fn search_places(Query(params): Query<HashMap<String, String>>) -> HandlerResult {
    let query = params
        .get("query")
        .filter(|q| !q.is_empty())
        .ok_or_else(|| AppError::bad_request("Query parameter required"))?;
    let address = match params.get("location") {
        Some(loc) => format!("{query}, {loc}"),
        None => query.clone(),
    };
    let places = vec![Place {
        name: query.clone(),
        address,
        coordinates: Coordinates {
            lat: 48.8584,
            lng: 2.2945,
        },
        category: Some("attraction".to_owned()),
    }];
    Ok(Json(places).into_response())
}

async fn directions(Json(body): Json<Value>) -> HandlerResult {
    let request: DirectionsRequest = parse_body(body, "Start and end coordinates required")?;
    let dx = request.end[0] - request.start[0];
    let dy = request.end[1] - request.start[1];
    Ok(Json(json!({
        "profile": request.profile,
        "distance": (dx * dx + dy * dy).sqrt(),
        "coordinates": [request.start, request.end]
    }))
    .into_response())
}

// ---------------------------------------------------------------------------
// Activities and expenses
// ---------------------------------------------------------------------------

async fn create_activity(
    State(state): State<Shared>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> HandlerResult {
    let mut inner = lock(&state);
    let user_id = authenticate(&inner, &headers)?;
    let plan_id = body
        .get("plan_id")
        .and_then(Value::as_str)
        .and_then(|s| Uuid::parse_str(s).ok())
        .ok_or_else(|| AppError::bad_request("plan_id required"))?;
    owned_plan_index(&inner, user_id, plan_id)?;

    let name = body
        .get("name")
        .and_then(Value::as_str)
        .ok_or_else(|| AppError::bad_request("name required"))?;
    let str_or = |key: &str, default: &str| {
        body.get(key)
            .and_then(Value::as_str)
            .unwrap_or(default)
            .to_owned()
    };
    let int_or = |key: &str, default: i64| {
        body.get(key).and_then(Value::as_i64).unwrap_or(default) as i32
    };

    let activity = Activity {
        id: Uuid::new_v4(),
        plan_id,
        name: name.to_owned(),
        description: str_or("description", ""),
        location: body.get("location").cloned().unwrap_or_else(|| json!({})),
        cost: body.get("cost").and_then(Value::as_f64).unwrap_or(0.0),
        duration: int_or("duration", 1),
        category: str_or("category", "other"),
        day: int_or("day", 1),
        time_slot: str_or("time_slot", "09:00"),
    };
    inner.activities.push(activity.clone());
    Ok((StatusCode::CREATED, Json(activity)).into_response())
}

async fn list_expenses(
    State(state): State<Shared>,
    headers: HeaderMap,
    Query(params): Query<HashMap<String, String>>,
) -> HandlerResult {
    let inner = lock(&state);
    let user_id = authenticate(&inner, &headers)?;
    let plan_id = params
        .get("plan_id")
        .and_then(|s| Uuid::parse_str(s).ok())
        .ok_or_else(|| AppError::bad_request("plan_id parameter required"))?;
    owned_plan_index(&inner, user_id, plan_id)?;

    let mut expenses: Vec<&Expense> = inner
        .expenses
        .iter()
        .filter(|e| e.plan_id == plan_id)
        .collect();
    expenses.sort_by(|a, b| b.date.cmp(&a.date));
    Ok(Json(expenses).into_response())
}

async fn create_expense(
    State(state): State<Shared>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> HandlerResult {
    let mut inner = lock(&state);
    let user_id = authenticate(&inner, &headers)?;
    let new_expense: NewExpense = parse_body(body, "Missing required fields")?;
    owned_plan_index(&inner, user_id, new_expense.plan_id)?;

    let expense = Expense {
        id: Uuid::new_v4(),
        plan_id: new_expense.plan_id,
        category: new_expense.category,
        amount: new_expense.amount,
        description: new_expense.description,
        date: new_expense.date,
        created_at: Utc::now().naive_utc(),
    };
    inner.expenses.push(expense.clone());
    Ok((StatusCode::CREATED, Json(expense)).into_response())
}
