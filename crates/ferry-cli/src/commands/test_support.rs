//! In-memory runtime contexts for command tests.

use crate::cli::GlobalArgs;
use crate::context::RuntimeContext;
use std::fs;
use tempfile::TempDir;

/// A temp migration directory holding `files` and a context over an
/// in-memory DuckDB target
pub(crate) async fn context_with(files: &[(&str, &str)]) -> (TempDir, RuntimeContext) {
    let dir = TempDir::new().unwrap();
    let migrations = dir.path().join("migrations");
    fs::create_dir_all(&migrations).unwrap();
    for (name, sql) in files {
        fs::write(migrations.join(name), sql).unwrap();
    }
    let config = dir.path().join("ferry.yml");
    fs::write(&config, "{}\n").unwrap();

    let global = GlobalArgs {
        config: Some(config.display().to_string()),
        migrations_dir: Some(migrations.display().to_string()),
        target: Some(":memory:".to_string()),
        ..Default::default()
    };
    let ctx = RuntimeContext::new(&global).await.unwrap();
    (dir, ctx)
}
