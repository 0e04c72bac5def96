//! Basic example of the wiring runtime.
//!
//! Run with `RUST_LOG=wiring_container=debug` to watch resolution.

use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use tracing::info;
use wiring::logging;
use wiring::prelude::*;

// === Define your traits and types ===

trait ApiClient: Send + Sync {
    fn fetch(&self, path: &str) -> String;
}

struct Constants {
    base_url: String,
    user_agent: String,
}

struct HttpClient {
    constants: Arc<Constants>,
}

impl ApiClient for HttpClient {
    fn fetch(&self, path: &str) -> String {
        format!(
            "GET {}{path} ({})",
            self.constants.base_url, self.constants.user_agent
        )
    }
}

struct LocalCache {
    api: Arc<dyn ApiClient>,
}

impl LocalCache {
    fn load(&self, key: &str) -> String {
        self.api.fetch(&format!("/cache/{key}"))
    }
}

/// Numbered per resolution, so every consumer sees a fresh one.
struct RequestId(u64);

fn main() -> Result<()> {
    logging::builder().debug().container_only().compact().init();

    let constants = identity::<Constants>("constants")?;
    let api = identity::<dyn ApiClient>("api")?;
    let cache = identity::<LocalCache>("local_cache")?;
    let request_id = identity::<RequestId>("request_id")?;

    let counter = Arc::new(AtomicU64::new(1));

    let resolver = Registry::new()
        // Constants: pre-built, always a singleton
        .register_instance(
            &constants,
            Constants {
                base_url: "https://api.example.org".to_string(),
                user_agent: "wiring-demo/0.1".to_string(),
            },
        )?
        // ApiClient: trait object built by a factory
        .register_factory(Lifetime::Singleton, &api, {
            let constants = constants.clone();
            move |p: &Provider<'_>| {
                let client: Arc<dyn ApiClient> = Arc::new(HttpClient {
                    constants: p.get(&constants)?,
                });
                Ok(client)
            }
        })?
        // LocalCache: dependencies declared by name
        .register_injected(
            Lifetime::Singleton,
            &cache,
            inject(&["api"], |api: Arc<dyn ApiClient>| LocalCache { api }),
        )?
        // RequestId: new value on every resolution
        .register_factory(Lifetime::Transient, &request_id, move |_| {
            Ok(RequestId(counter.fetch_add(1, Ordering::SeqCst)))
        })?
        .build()?;

    info!(?resolver, "Resolver built");

    let local_cache = resolver.retrieve(&cache)?;
    println!("{}", local_cache.load("profile"));

    let again = resolver.retrieve(&cache)?;
    println!("Same cache instance: {}", Arc::ptr_eq(&local_cache, &again));

    let first = resolver.retrieve(&request_id)?;
    let second = resolver.retrieve(&request_id)?;
    println!("Request ids: {} then {}", first.0, second.0);

    if let Err(err) = resolver.retrieve_named::<LocalCache>("local_cahce") {
        println!("Expected failure: {err}");
    }

    println!("{resolver:?}");
    Ok(())
}
