//! SketchDock command line entry point.
//!
//! Signs in against the hosted backend and drives the document list:
//!
//! ```text
//! sketchdock list [QUERY] [CATEGORY]
//! sketchdock create [CATEGORY]
//! sketchdock show <ID>
//! sketchdock delete <ID>
//! sketchdock signup <USERNAME> <PASSWORD>
//! ```
//!
//! Configuration comes from `SKETCHDOCK_*` environment variables.

use sketchdock_app::{AppConfig, ConfigError, Dashboard, Toast, ToastLevel, ToastQueue};
use sketchdock_core::{
    AuthClient, AuthError, AuthState, DocumentStore, RemoteStore, SceneUpdate, StoreError,
};
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Error)]
enum AppError {
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Auth(#[from] AuthError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("{0}")]
    Usage(String),
}

#[tokio::main]
async fn main() {
    env_logger::init();

    if let Err(e) = run().await {
        eprintln!("sketchdock: {}", e);
        std::process::exit(1);
    }
}

async fn run() -> Result<(), AppError> {
    let args: Vec<String> = std::env::args().skip(1).collect();
    let Some(command) = args.first() else {
        return Err(AppError::Usage(
            "usage: sketchdock <list|create|show|delete> [ARGS]".to_string(),
        ));
    };

    let config = AppConfig::from_env()?;
    let auth_state = Arc::new(AuthState::new());

    // Session change subscription lives for the whole run; dropping it at
    // the end tears the listener down.
    let _session_watch = auth_state.subscribe(|event, session| {
        log::info!(
            "Auth state changed: {:?} (user: {})",
            event,
            session.map(|s| s.user.id.as_str()).unwrap_or("-")
        );
    });

    let auth = AuthClient::new(&config.backend_url, &config.api_key, auth_state.clone())?;

    if command == "signup" {
        let (Some(user), Some(password)) = (args.get(1), args.get(2)) else {
            return Err(AppError::Usage(
                "usage: sketchdock signup <USERNAME> <PASSWORD>".to_string(),
            ));
        };
        auth.sign_up(user, password).await?;
        println!("Sign up successful! You can now sign in.");
        return Ok(());
    }

    if let (Some(user), Some(password)) = (&config.username, &config.password) {
        auth.sign_in(user, password).await?;
    } else {
        log::warn!("No credentials configured, running unauthenticated");
    }

    let store = RemoteStore::new(&config.backend_url, &config.api_key, auth_state)?;
    let mut toasts = ToastQueue::new();

    match command.as_str() {
        "list" => {
            let mut dashboard = Dashboard::new();
            dashboard.load(&store, &mut toasts).await;
            if let Some(query) = args.get(1) {
                dashboard.set_query(query.clone());
            }
            if let Some(category) = args.get(2) {
                dashboard.set_category(Some(category.clone()));
            }
            for doc in dashboard.visible() {
                println!(
                    "{}  {}  [{}]  {}",
                    doc.id,
                    doc.title,
                    doc.category.as_deref().unwrap_or("-"),
                    doc.updated_at
                        .map(|t| t.to_rfc3339())
                        .unwrap_or_else(|| "-".to_string()),
                );
            }
        }
        "create" => {
            let mut dashboard = Dashboard::new();
            dashboard.load(&store, &mut toasts).await;
            if let Some(id) = dashboard
                .create_document(&store, args.get(1).cloned(), &mut toasts)
                .await
            {
                println!("{}", id);
            }
        }
        "show" => {
            let id = args
                .get(1)
                .ok_or_else(|| AppError::Usage("usage: sketchdock show <ID>".to_string()))?;
            match store.get(id).await? {
                Some(doc) => {
                    let scene = SceneUpdate::from_content(&doc.content);
                    println!("{}  {}", doc.id, doc.title);
                    println!(
                        "category: {}",
                        doc.category.as_deref().unwrap_or("-")
                    );
                    println!(
                        "elements: {}",
                        scene.elements.as_array().map(|a| a.len()).unwrap_or(0)
                    );
                    println!("preview: {}", doc.preview_image.is_some());
                }
                None => println!("not found"),
            }
        }
        "delete" => {
            let id = args
                .get(1)
                .ok_or_else(|| AppError::Usage("usage: sketchdock delete <ID>".to_string()))?;
            let mut dashboard = Dashboard::new();
            dashboard.load(&store, &mut toasts).await;
            dashboard.delete_document(&store, id, &mut toasts).await;
        }
        other => {
            return Err(AppError::Usage(format!("unknown command: {}", other)));
        }
    }

    for Toast { level, message } in toasts.drain() {
        match level {
            ToastLevel::Error => eprintln!("error: {}", message),
            _ => println!("{}", message),
        }
    }

    Ok(())
}
