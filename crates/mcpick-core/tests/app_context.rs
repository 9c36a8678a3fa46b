use mcpick_core::config::McpickPaths;
use mcpick_core::context::AppContext;
use tempfile::TempDir;

#[test]
fn app_context_builds_stores_from_paths() {
    let temp = TempDir::new().unwrap();
    let home = temp.path().join("home");
    let project = temp.path().join("project");
    std::fs::create_dir_all(&home).unwrap();
    std::fs::create_dir_all(&project).unwrap();

    let paths = McpickPaths::resolve(&home, |_| None);
    let ctx = AppContext::new(paths.clone(), project.clone());

    assert_eq!(ctx.cwd(), project.as_path());
    assert_eq!(ctx.reconciler().config_path(), home.join(".claude.json"));
    assert_eq!(ctx.registry().path(), paths.registry_path());
    assert_eq!(ctx.backups().dir(), paths.backups_dir());
    assert_eq!(ctx.profiles().dir(), paths.profiles_dir());
    assert_eq!(ctx.scope_resolver().cwd(), project.as_path());
}
