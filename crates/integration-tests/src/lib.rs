//! Integration test support for the Shopify catalog tools.
//!
//! [`MockAdmin`] serves an in-memory store over the Admin GraphQL wire
//! format on `127.0.0.1:0`, so tests drive the real `AdminClient` over HTTP.
//! [`MockOpenAI`] does the same for chat completions.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p shopify-catalog-integration-tests
//! ```
//!
//! No credentials or network access are needed.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use axum::{
    Json, Router,
    extract::State,
    http::{HeaderMap, HeaderValue, StatusCode, header::RETRY_AFTER},
    response::{IntoResponse, Response},
    routing::post,
};
use secrecy::SecretString;
use serde_json::{Value, json};
use shopify_catalog::{AdminClient, ShopifyAdminConfig};
use tokio::net::TcpListener;

/// Access token the mock store accepts.
pub const MOCK_TOKEN: &str = "shpat_mock_4c1d9e";

const GRAPHQL_PATH: &str = "/admin/api/2025-07/graphql.json";

/// A collection and the ids of its products, in collection order.
#[derive(Debug, Clone)]
pub struct MockCollection {
    pub id: String,
    pub title: String,
    pub handle: String,
    pub product_ids: Vec<String>,
}

/// A translation accepted by `translationsRegister`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RegisteredTranslation {
    pub resource_id: String,
    pub key: String,
    pub value: String,
    pub locale: String,
}

/// Store contents and behaviour switches.
#[derive(Debug)]
pub struct MockState {
    /// Product nodes in API order.
    pub products: Vec<Value>,
    pub collections: Vec<MockCollection>,
    /// Largest page the server returns, whatever `first` asks for.
    pub page_size: usize,
    /// Answer every request with HTTP 401.
    pub reject_all: bool,
    /// Answer every request with this HTTP status instead.
    pub force_status: Option<u16>,
    /// `Retry-After` header sent with `force_status`.
    pub retry_after: Option<String>,
    /// Report `hasNextPage` without an `endCursor`.
    pub drop_end_cursor: bool,
    /// `userErrors` message per resource id for `translationsRegister`.
    pub register_errors: HashMap<String, String>,
    /// Accepted translations.
    pub registered: Vec<RegisteredTranslation>,
    /// `operationName` of every request, in order.
    pub operations: Vec<String>,
}

impl Default for MockState {
    fn default() -> Self {
        Self {
            products: Vec::new(),
            collections: Vec::new(),
            page_size: 2,
            reject_all: false,
            force_status: None,
            retry_after: None,
            drop_end_cursor: false,
            register_errors: HashMap::new(),
            registered: Vec::new(),
            operations: Vec::new(),
        }
    }
}

type SharedState = Arc<Mutex<MockState>>;

/// A running mock Admin GraphQL endpoint.
pub struct MockAdmin {
    addr: SocketAddr,
    state: SharedState,
}

impl MockAdmin {
    /// Start a server over `state`.
    ///
    /// # Panics
    ///
    /// Panics if no local port can be bound.
    pub async fn start(state: MockState) -> Self {
        let state: SharedState = Arc::new(Mutex::new(state));
        let app = Router::new()
            .route(GRAPHQL_PATH, post(graphql))
            .with_state(state.clone());

        let addr = serve(app).await;
        Self { addr, state }
    }

    /// Full GraphQL endpoint URL.
    #[must_use]
    pub fn endpoint(&self) -> String {
        format!("http://{}{GRAPHQL_PATH}", self.addr)
    }

    /// A client holding the accepted token, with no pause between pages.
    ///
    /// # Panics
    ///
    /// Panics if the HTTP client cannot be built.
    #[must_use]
    pub fn client(&self) -> AdminClient {
        self.client_with_token(MOCK_TOKEN)
    }

    /// A client sending `token`.
    ///
    /// # Panics
    ///
    /// Panics if the HTTP client cannot be built.
    #[must_use]
    pub fn client_with_token(&self, token: &str) -> AdminClient {
        let config = ShopifyAdminConfig {
            store_domain: self.addr.to_string(),
            api_version: "2025-07".to_string(),
            access_token: SecretString::from(token.to_string()),
            request_timeout: Duration::from_secs(5),
        };
        AdminClient::with_endpoint(&config, self.endpoint())
            .expect("Failed to build client")
            .with_page_delay(Duration::ZERO)
    }

    /// Lock the store to inspect or change it.
    ///
    /// # Panics
    ///
    /// Panics if a handler panicked while holding the lock.
    pub fn state(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().expect("Mock state poisoned")
    }

    /// Operation names received so far.
    #[must_use]
    pub fn operations(&self) -> Vec<String> {
        self.state().operations.clone()
    }
}

/// A product node shaped like the export selection.
#[must_use]
pub fn product(id: u64, handle: &str, title: &str, description_html: &str, tags: &[&str]) -> Value {
    json!({
        "id": format!("gid://shopify/Product/{id}"),
        "title": title,
        "handle": handle,
        "descriptionHtml": description_html,
        "tags": tags,
        "productType": "",
        "vendor": "Mock",
        "createdAt": "2025-01-01T00:00:00Z",
        "updatedAt": "2025-01-02T00:00:00Z",
        "status": "ACTIVE",
        "publishedAt": null,
        "seo": { "title": null, "description": null },
    })
}

async fn serve(app: Router) -> SocketAddr {
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind mock server");
    let addr = listener.local_addr().expect("Mock server has no address");
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    addr
}

// =============================================================================
// GraphQL dispatch
// =============================================================================

async fn graphql(
    State(state): State<SharedState>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    let mut state = state.lock().expect("Mock state poisoned");
    let operation = body["operationName"].as_str().unwrap_or_default().to_string();
    state.operations.push(operation.clone());

    let token = headers
        .get("X-Shopify-Access-Token")
        .and_then(|v| v.to_str().ok());
    if state.reject_all || token != Some(MOCK_TOKEN) {
        return (
            StatusCode::UNAUTHORIZED,
            Json(json!({ "errors": "[API] Invalid API key or access token" })),
        )
            .into_response();
    }

    if let Some(code) = state.force_status {
        let status = StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let mut response = (status, "Mock store unavailable").into_response();
        if let Some(retry_after) = state
            .retry_after
            .as_deref()
            .and_then(|v| HeaderValue::from_str(v).ok())
        {
            response.headers_mut().insert(RETRY_AFTER, retry_after);
        }
        return response;
    }

    let vars = &body["variables"];
    let data = match operation.as_str() {
        "GetProducts" => get_products(&state, vars),
        "GetProductByHandle" => {
            let handle = vars["handle"].as_str().unwrap_or_default();
            json!({ "productByIdentifier": find_product(&state, |p| p["handle"] == handle) })
        }
        "GetProduct" => {
            let id = vars["id"].as_str().unwrap_or_default();
            json!({ "product": find_product(&state, |p| p["id"] == id) })
        }
        "GetCollections" => {
            let nodes: Vec<Value> = state
                .collections
                .iter()
                .map(|c| json!({ "id": c.id, "title": c.title, "handle": c.handle }))
                .collect();
            json!({ "collections": page(&nodes, vars, &state) })
        }
        "GetCollection" => {
            let id = vars["id"].as_str().unwrap_or_default();
            let node = state
                .collections
                .iter()
                .find(|c| c.id == id)
                .map(|c| json!({ "id": c.id, "title": c.title, "handle": c.handle }));
            json!({ "collection": node })
        }
        "GetCollectionProducts" => get_collection_products(&state, vars),
        "GetTranslatableContent" => {
            let id = vars["id"].as_str().unwrap_or_default();
            let resource = find_product(&state, |p| p["id"] == id)
                .map(|p| json!({ "translatableContent": translatable_content(&p) }));
            json!({ "translatableResource": resource })
        }
        "GetTranslations" => get_translations(&state, vars),
        "RegisterTranslations" => register_translations(&mut state, vars),
        "UpdatePrimary" => update_primary(&mut state, vars),
        other => {
            return Json(json!({
                "errors": [{ "message": format!("Unknown operation '{other}'") }]
            }))
            .into_response();
        }
    };

    Json(json!({ "data": data })).into_response()
}

fn find_product(state: &MockState, predicate: impl Fn(&Value) -> bool) -> Option<Value> {
    state.products.iter().find(|p| predicate(p)).cloned()
}

/// One page of `items`; cursors are stringified offsets.
fn page(items: &[Value], vars: &Value, state: &MockState) -> Value {
    let page_size = state.page_size;
    let first = vars["first"]
        .as_u64()
        .and_then(|n| usize::try_from(n).ok())
        .unwrap_or(page_size)
        .min(page_size);
    let start = vars["after"]
        .as_str()
        .and_then(|c| c.parse::<usize>().ok())
        .unwrap_or(0)
        .min(items.len());
    let end = (start + first).min(items.len());

    let edges: Vec<Value> = items
        .iter()
        .skip(start)
        .take(end - start)
        .map(|node| json!({ "node": node }))
        .collect();
    let end_cursor = (end > start && !state.drop_end_cursor).then(|| end.to_string());
    json!({
        "pageInfo": {
            "hasNextPage": end < items.len(),
            "endCursor": end_cursor,
        },
        "edges": edges,
    })
}

/// `tag:'x'` matches any tag containing `x`, like the loose server search.
fn get_products(state: &MockState, vars: &Value) -> Value {
    let tag = vars["query"]
        .as_str()
        .and_then(|q| q.strip_prefix("tag:'"))
        .and_then(|q| q.strip_suffix('\''));

    let matching: Vec<Value> = state
        .products
        .iter()
        .filter(|p| {
            tag.is_none_or(|tag| {
                p["tags"].as_array().is_some_and(|tags| {
                    tags.iter()
                        .any(|t| t.as_str().is_some_and(|t| t.contains(tag)))
                })
            })
        })
        .cloned()
        .collect();

    json!({ "products": page(&matching, vars, state) })
}

fn get_collection_products(state: &MockState, vars: &Value) -> Value {
    let id = vars["id"].as_str().unwrap_or_default();
    let Some(collection) = state.collections.iter().find(|c| c.id == id) else {
        return json!({ "collection": null });
    };

    let products: Vec<Value> = collection
        .product_ids
        .iter()
        .filter_map(|pid| find_product(state, |p| p["id"] == pid.as_str()))
        .collect();

    json!({
        "collection": {
            "id": collection.id,
            "products": page(&products, vars, state),
        }
    })
}

// =============================================================================
// Translations
// =============================================================================

fn digest_of(value: &str) -> Option<String> {
    (!value.is_empty()).then(|| format!("digest-{}", value.len()))
}

fn translatable_content(product: &Value) -> Vec<Value> {
    [
        ("title", &product["title"]),
        ("body_html", &product["descriptionHtml"]),
        ("meta_title", &product["seo"]["title"]),
        ("meta_description", &product["seo"]["description"]),
    ]
    .into_iter()
    .map(|(key, value)| {
        let text = value.as_str().unwrap_or_default();
        json!({
            "key": key,
            "value": value,
            "digest": digest_of(text),
            "locale": "ar",
        })
    })
    .collect()
}

fn get_translations(state: &MockState, vars: &Value) -> Value {
    let id = vars["id"].as_str().unwrap_or_default();
    let locale = vars["locale"].as_str().unwrap_or_default();
    if find_product(state, |p| p["id"] == id).is_none() {
        return json!({ "translatableResource": null });
    }

    let translations: Vec<Value> = state
        .registered
        .iter()
        .filter(|t| t.resource_id == id && t.locale == locale)
        .map(|t| json!({ "key": t.key, "value": t.value, "locale": t.locale, "outdated": false }))
        .collect();
    json!({ "translatableResource": { "translations": translations } })
}

fn register_translations(state: &mut MockState, vars: &Value) -> Value {
    let resource_id = vars["resourceId"].as_str().unwrap_or_default().to_string();

    if let Some(message) = state.register_errors.get(&resource_id) {
        return json!({
            "translationsRegister": {
                "userErrors": [{ "field": ["translations"], "message": message }],
                "translations": null,
            }
        });
    }

    let Some(product) = find_product(state, |p| p["id"] == resource_id.as_str()) else {
        return json!({
            "translationsRegister": {
                "userErrors": [{ "field": ["resourceId"], "message": "Resource does not exist" }],
                "translations": null,
            }
        });
    };
    let content = translatable_content(&product);

    let inputs = vars["translations"].as_array().cloned().unwrap_or_default();
    for input in &inputs {
        let key = input["key"].as_str().unwrap_or_default();
        let expected = content
            .iter()
            .find(|c| c["key"] == key)
            .and_then(|c| c["digest"].as_str());
        if expected.is_none() || expected != input["translatableContentDigest"].as_str() {
            return json!({
                "translationsRegister": {
                    "userErrors": [{
                        "field": ["translations", "translatableContentDigest"],
                        "message": "Translatable content hash is invalid",
                    }],
                    "translations": null,
                }
            });
        }
    }

    let mut stored = Vec::with_capacity(inputs.len());
    for input in inputs {
        let translation = RegisteredTranslation {
            resource_id: resource_id.clone(),
            key: input["key"].as_str().unwrap_or_default().to_string(),
            value: input["value"].as_str().unwrap_or_default().to_string(),
            locale: input["locale"].as_str().unwrap_or_default().to_string(),
        };
        stored.push(json!({
            "key": translation.key,
            "locale": translation.locale,
            "value": translation.value,
        }));
        state.registered.retain(|t| {
            !(t.resource_id == resource_id
                && t.key == translation.key
                && t.locale == translation.locale)
        });
        state.registered.push(translation);
    }

    json!({
        "translationsRegister": {
            "userErrors": [],
            "translations": stored,
        }
    })
}

fn update_primary(state: &mut MockState, vars: &Value) -> Value {
    let input = &vars["product"];
    let id = input["id"].as_str().unwrap_or_default();

    let Some(product) = state.products.iter_mut().find(|p| p["id"] == id) else {
        return json!({
            "productUpdate": {
                "product": null,
                "userErrors": [{ "field": ["id"], "message": "Product does not exist" }],
            }
        });
    };

    if let Some(title) = input["title"].as_str() {
        product["title"] = json!(title);
    }
    if let Some(description) = input["descriptionHtml"].as_str() {
        product["descriptionHtml"] = json!(description);
    }

    json!({
        "productUpdate": {
            "product": { "id": id },
            "userErrors": [],
        }
    })
}

// =============================================================================
// Chat completions
// =============================================================================

/// A running mock chat-completions endpoint.
///
/// Each user prompt is answered by the first reply whose key it contains;
/// prompts matching nothing get an HTTP 500.
pub struct MockOpenAI {
    addr: SocketAddr,
    prompts: Arc<Mutex<Vec<String>>>,
}

#[derive(Clone)]
struct OpenAIState {
    replies: Arc<Vec<(String, String)>>,
    prompts: Arc<Mutex<Vec<String>>>,
}

impl MockOpenAI {
    /// Start a server answering from `replies`.
    ///
    /// # Panics
    ///
    /// Panics if no local port can be bound.
    pub async fn start(replies: &[(&str, &str)]) -> Self {
        let prompts = Arc::new(Mutex::new(Vec::new()));
        let state = OpenAIState {
            replies: Arc::new(
                replies
                    .iter()
                    .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
                    .collect(),
            ),
            prompts: prompts.clone(),
        };
        let app = Router::new()
            .route("/v1/chat/completions", post(chat_completions))
            .with_state(state);

        let addr = serve(app).await;
        Self { addr, prompts }
    }

    /// Chat-completions URL.
    #[must_use]
    pub fn url(&self) -> String {
        format!("http://{}/v1/chat/completions", self.addr)
    }

    /// User prompts received so far.
    ///
    /// # Panics
    ///
    /// Panics if a handler panicked while holding the lock.
    #[must_use]
    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().expect("Mock state poisoned").clone()
    }
}

async fn chat_completions(State(state): State<OpenAIState>, Json(body): Json<Value>) -> Response {
    let user = body["messages"]
        .as_array()
        .and_then(|messages| messages.iter().find(|m| m["role"] == "user"))
        .and_then(|m| m["content"].as_str())
        .unwrap_or_default()
        .to_string();
    state
        .prompts
        .lock()
        .expect("Mock state poisoned")
        .push(user.clone());

    match state.replies.iter().find(|(key, _)| user.contains(key.as_str())) {
        Some((_, reply)) => Json(json!({
            "choices": [{ "message": { "role": "assistant", "content": reply } }]
        }))
        .into_response(),
        None => (
            StatusCode::INTERNAL_SERVER_ERROR,
            Json(json!({ "error": { "message": "The server had an error" } })),
        )
            .into_response(),
    }
}
