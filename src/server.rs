//! HTTP front end for the student registry.

use crate::config::RegistryConfig;
use crate::error::{RegistryError, Result};
use crate::storage::{create_store, StudentStore};
use crate::student::{AgeFilter, Student, StudentKey, StudentPatch};
use axum::{
    extract::{rejection::JsonRejection, Path, State},
    response::Json,
    routing::get,
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::{debug, info, warn};

const RESOURCE: &str = "/estudiante";

type SharedStore = Arc<dyn StudentStore>;

#[derive(Clone)]
struct AppState {
    store: SharedStore,
}

/// The registry server.
///
/// Serves the `/estudiante` resource on a background task for as long as the
/// handle is alive.
pub struct RegistryServer {
    addr: SocketAddr,
    store: SharedStore,
    _handle: tokio::task::JoinHandle<()>,
}

impl RegistryServer {
    /// Creates and starts a new registry server with the given configuration.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// use student_registry::{RegistryServer, RegistryConfig};
    ///
    /// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
    /// let config = RegistryConfig::seeded();
    /// let server = RegistryServer::new(config).await?;
    /// # Ok(())
    /// # }
    /// ```
    pub async fn new(config: RegistryConfig) -> Result<Self> {
        let store = create_store(config.seed);
        let app = router(store.clone());

        let listener = TcpListener::bind(config.bind_addr()).await?;
        let addr = listener.local_addr()?;

        info!(
            "Student registry listening on http://{}{} ({} students)",
            addr,
            RESOURCE,
            store.len().await
        );

        let handle = tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, app).await {
                warn!("Server stopped: {}", e);
            }
        });

        Ok(Self {
            addr,
            store,
            _handle: handle,
        })
    }

    /// Returns the socket address the server is bound to.
    pub fn addr(&self) -> SocketAddr {
        self.addr
    }

    /// Returns the base URL of the server.
    ///
    /// # Examples
    ///
    /// ```no_run
    /// # use student_registry::{RegistryServer, RegistryConfig};
    /// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
    /// # let server = RegistryServer::new(RegistryConfig::seeded()).await?;
    /// println!("Students at: {}/estudiante", server.url());
    /// # Ok(())
    /// # }
    /// ```
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Returns the port number the server is listening on.
    pub fn port(&self) -> u16 {
        self.addr.port()
    }

    /// The registry behind this server.
    pub fn store(&self) -> SharedStore {
        self.store.clone()
    }
}

/// Builds the router without binding a socket.
///
/// `edad/{rango}` is registered ahead of `{dni}` so that `edad` is never
/// read as a national id.
pub fn router(store: SharedStore) -> Router {
    let state = AppState { store };

    Router::new()
        .route(
            RESOURCE,
            get(list_students)
                .post(create_student)
                .put(update_student)
                .delete(delete_student),
        )
        .route(&format!("{}/edad/{{rango}}", RESOURCE), get(filter_by_age))
        .route(&format!("{}/{{dni}}", RESOURCE), get(get_student))
        .layer(tower::ServiceBuilder::new().layer(TraceLayer::new_for_http()))
        .with_state(state)
}

fn json_body<T>(payload: std::result::Result<Json<T>, JsonRejection>) -> Result<T> {
    payload
        .map(|Json(value)| value)
        .map_err(|e| RegistryError::BadRequest(e.body_text()))
}

async fn create_student(
    State(state): State<AppState>,
    payload: std::result::Result<Json<Student>, JsonRejection>,
) -> Result<Json<Student>> {
    let student = json_body(payload)?;
    let national_id = student.national_id;

    match state.store.create(student).await {
        Ok(created) => {
            info!("Created student {}", national_id);
            Ok(Json(created))
        }
        Err(e) => {
            warn!("Rejected student {}: {}", national_id, e);
            Err(e)
        }
    }
}

async fn list_students(State(state): State<AppState>) -> Result<Json<Vec<Student>>> {
    let students = state.store.list_all().await?;
    debug!("Listing {} students", students.len());
    Ok(Json(students))
}

async fn filter_by_age(
    State(state): State<AppState>,
    Path(rango): Path<String>,
) -> Result<Json<Vec<Student>>> {
    let filter: AgeFilter = rango.parse()?;
    debug!("Filtering students by age: {:?}", filter);

    let students = state.store.filter_by_age(filter).await?;
    Ok(Json(students))
}

async fn get_student(
    State(state): State<AppState>,
    Path(dni): Path<String>,
) -> Result<Json<Student>> {
    let national_id: i64 = dni
        .parse()
        .map_err(|_| RegistryError::BadRequest(format!("invalid DNI '{}'", dni)))?;
    debug!("Getting student {}", national_id);

    let student = state.store.get(national_id).await?;
    Ok(Json(student))
}

async fn update_student(
    State(state): State<AppState>,
    payload: std::result::Result<Json<StudentPatch>, JsonRejection>,
) -> Result<Json<Student>> {
    let patch = json_body(payload)?;
    let national_id = patch.national_id;

    let updated = state.store.update(patch).await.inspect_err(|e| {
        warn!("Update failed for {}: {}", national_id, e);
    })?;
    info!("Updated student {}", national_id);
    Ok(Json(updated))
}

async fn delete_student(
    State(state): State<AppState>,
    payload: std::result::Result<Json<StudentKey>, JsonRejection>,
) -> Result<Json<Vec<Student>>> {
    let StudentKey { national_id } = json_body(payload)?;

    let remaining = state.store.delete(national_id).await.inspect_err(|e| {
        warn!("Delete failed for {}: {}", national_id, e);
    })?;
    info!(
        "Deleted student {} ({} remaining)",
        national_id,
        remaining.len()
    );
    Ok(Json(remaining))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::MemoryStore;
    use crate::student::sample_students;
    use axum::{
        body::Body,
        http::{Request, StatusCode},
    };
    use tower::ServiceExt;

    fn test_router() -> Router {
        router(Arc::new(MemoryStore::with_students(sample_students())))
    }

    async fn send(
        app: Router,
        method: &str,
        uri: &str,
        body: Option<serde_json::Value>,
    ) -> (StatusCode, Vec<u8>) {
        let mut request = Request::builder().method(method).uri(uri);
        let body = match body {
            Some(json) => {
                request = request.header("content-type", "application/json");
                Body::from(serde_json::to_vec(&json).unwrap())
            }
            None => Body::empty(),
        };

        let response = app.oneshot(request.body(body).unwrap()).await.unwrap();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, bytes.to_vec())
    }

    #[tokio::test]
    async fn test_edad_route_wins_over_dni() {
        let (status, body) = send(test_router(), "GET", "/estudiante/edad/30", None).await;
        assert_eq!(status, StatusCode::OK);
        let students: Vec<Student> = serde_json::from_slice(&body).unwrap();
        assert_eq!(students.len(), 2);
    }

    #[tokio::test]
    async fn test_non_numeric_dni_is_bad_request() {
        let (status, _) = send(test_router(), "GET", "/estudiante/abc", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_malformed_range_is_bad_request() {
        let (status, _) = send(test_router(), "GET", "/estudiante/edad/1,2,3", None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_incomplete_create_is_bad_request() {
        let (status, _) = send(
            test_router(),
            "POST",
            "/estudiante",
            Some(serde_json::json!({ "nombre": "Ana" })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_missing_dni_message() {
        let (status, body) = send(test_router(), "GET", "/estudiante/42", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(
            String::from_utf8(body).unwrap(),
            "Student with DNI 42 not found"
        );
    }
}
