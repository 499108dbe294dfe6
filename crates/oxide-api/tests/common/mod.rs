#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use oxide_api::{split_parts, BoxFuture, Next, Router, RouterError, Scope};

pub type Api = Router<String, String>;

pub fn configure(f: impl FnOnce(&mut Scope<'_, String, String>)) -> Api {
    Router::configure(f).unwrap_or_else(|e| panic!("Failed to configure router: {e}"))
}

pub fn configure_err(f: impl FnOnce(&mut Scope<'_, String, String>)) -> RouterError {
    match Router::configure(f) {
        Ok(router) => panic!("Expected configuration error, got {router:?}"),
        Err(e) => e,
    }
}

pub fn parts(path: &str) -> Vec<&str> {
    split_parts(path).unwrap_or_else(|e| panic!("Failed to split {path}: {e}"))
}

pub async fn echo(name: String) -> String {
    name
}

/// Collects labels in the order filters saw the request.
#[derive(Clone, Default)]
pub struct Recorder {
    seen: Arc<Mutex<Vec<String>>>,
}

impl Recorder {
    pub fn new() -> Self {
        Self::default()
    }

    /// A pass-through filter that records `label` before continuing.
    pub fn filter(
        &self,
        label: &str,
    ) -> impl Fn(String, Next<String, String>) -> BoxFuture<'static, String> + Send + Sync + 'static
    {
        let seen = Arc::clone(&self.seen);
        let label = label.to_string();
        move |req: String, next: Next<String, String>| {
            seen.lock().unwrap().push(label.clone());
            next.run(req)
        }
    }

    pub fn seen(&self) -> Vec<String> {
        self.seen.lock().unwrap().clone()
    }
}
