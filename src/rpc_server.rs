//! Wishclip RPC Server: JSON-RPC over stdin/stdout for the extension host.
//!
//! Protocol: one JSON object per line (newline-delimited JSON).
//! Request:  {"id":1, "method":"popup.open", "params":{"url":"...","html":"...","cookies":[...]}}
//! Response: {"id":1, "result":{...}} or {"id":1, "error":"..."}
//! Each request runs on its own task, so responses may arrive out of order
//! and are matched by `id`. Logs go to stderr; stdout carries only protocol lines.

use std::sync::Arc;

use serde_json::{json, Value};
use tokio::io::{self, AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::sync::{mpsc, Mutex};
use tracing::{error, info};

use wishclip::app::App;
use wishclip::logging;
use wishclip::platform;
use wishclip::rpc_handler::handle_method;

async fn write_line(stdout: &mut io::Stdout, value: &Value) -> io::Result<()> {
    stdout.write_all(format!("{}\n", value).as_bytes()).await?;
    stdout.flush().await
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    logging::init();

    let db_path = platform::get_store_path();
    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let app = match App::new(&db_path.to_string_lossy()) {
        Ok(app) => Arc::new(Mutex::new(app)),
        Err(e) => {
            error!(error = %e, path = %db_path.display(), "failed to initialise");
            return Err(e);
        }
    };

    // Single writer keeps each protocol line intact.
    let (tx, mut rx) = mpsc::unbounded_channel::<Value>();
    let writer = tokio::spawn(async move {
        let mut stdout = io::stdout();
        while let Some(value) = rx.recv().await {
            if let Err(e) = write_line(&mut stdout, &value).await {
                error!(error = %e, "stdout closed");
                break;
            }
        }
    });

    let _ = tx.send(json!({"event": "ready", "version": env!("CARGO_PKG_VERSION")}));
    info!("rpc server ready");

    let mut lines = BufReader::new(io::stdin()).lines();
    while let Some(line) = lines.next_line().await? {
        if line.trim().is_empty() {
            continue;
        }

        let req: Value = match serde_json::from_str(&line) {
            Ok(v) => v,
            Err(e) => {
                let _ = tx.send(json!({"id": null, "error": format!("parse error: {}", e)}));
                continue;
            }
        };

        let app = Arc::clone(&app);
        let tx = tx.clone();
        tokio::spawn(async move {
            let id = req.get("id").cloned().unwrap_or(Value::Null);
            let method = req.get("method").and_then(|v| v.as_str()).unwrap_or("");
            let params = req.get("params").cloned().unwrap_or(json!({}));

            let response = match handle_method(&app, method, &params).await {
                Ok(val) => json!({"id": id, "result": val}),
                Err(err) => json!({"id": id, "error": err}),
            };
            let _ = tx.send(response);
        });
    }

    info!("stdin closed; shutting down");
    drop(tx);
    writer.await?;
    Ok(())
}
