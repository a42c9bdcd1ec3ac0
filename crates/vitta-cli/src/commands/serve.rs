//! Web server command

use std::path::Path;

use anyhow::Result;

use super::open_db;

pub async fn cmd_serve(
    db_path: &Path,
    host: &str,
    port: u16,
    no_encrypt: bool,
    static_dir: Option<&Path>,
) -> Result<()> {
    let db = open_db(db_path, no_encrypt)?;

    println!("🚀 Starting Vitta server on http://{}:{}", host, port);
    if let Some(dir) = static_dir {
        println!("   Serving static files from {}", dir.display());
    }

    let static_dir_str = static_dir.and_then(|p| p.to_str());
    vitta_server::serve(db, host, port, static_dir_str).await
}
