//! In-memory integration tests for sandboxed command execution.

use std::sync::Arc;

use conclave::sandbox::{
    adapters::InMemorySandboxRuntime,
    domain::{AllowedCommands, AllowedPaths, SandboxDomainError, SandboxPhase, SandboxPolicy},
    services::{CommandExecutionError, CommandExecutor},
};
use rstest::{fixture, rstest};

#[fixture]
fn runtime() -> Arc<InMemorySandboxRuntime> {
    Arc::new(InMemorySandboxRuntime::new())
}

fn policy(commands: &[&str], paths: &[&str]) -> SandboxPolicy {
    SandboxPolicy::new(
        AllowedCommands::new(commands.iter().copied()),
        AllowedPaths::new(paths.iter().copied()),
    )
}

#[rstest]
#[case("ls -la", true)]
#[case("cat /srv/docs/a.txt", true)]
#[case("rm -rf /", false)]
#[case("lsof", false)]
#[tokio::test(flavor = "multi_thread")]
async fn only_allow_listed_programs_run(
    runtime: Arc<InMemorySandboxRuntime>,
    #[case] command: &str,
    #[case] permitted: bool,
) {
    let executor = CommandExecutor::new(runtime.clone(), "alpine:3.20");

    let result = executor
        .execute(command, &policy(&["ls", "cat"], &["/srv/docs"]))
        .await;

    assert_eq!(result.is_ok(), permitted);
    if !permitted {
        assert!(matches!(
            result,
            Err(CommandExecutionError::Policy(
                SandboxDomainError::CommandNotAllowed { .. }
            ))
        ));
    }
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn allowed_paths_are_mounted_read_only_at_the_same_path(
    runtime: Arc<InMemorySandboxRuntime>,
) {
    let executor = CommandExecutor::new(runtime.clone(), "alpine:3.20");

    executor
        .execute("ls /srv/a", &policy(&["ls"], &["/srv/a", "/srv/b"]))
        .await
        .expect("ls should run");

    let specs = runtime.created_specs().expect("specs readable");
    let spec = specs.first().expect("one container");
    let binds: Vec<String> = spec.mounts().iter().map(|mount| mount.bind_spec()).collect();
    assert_eq!(binds, vec!["/srv/a:/srv/a:ro", "/srv/b:/srv/b:ro"]);
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn scripted_failure_exit_is_rendered(runtime: Arc<InMemorySandboxRuntime>) {
    runtime
        .script("cat", "cat: missing: No such file or directory\n", 1)
        .expect("script writable");
    let executor = CommandExecutor::new(runtime.clone(), "alpine:3.20");

    let output = executor
        .execute("cat missing", &policy(&["cat"], &[]))
        .await
        .expect("command runs");

    assert!(!output.exit_status().success());
    assert_eq!(
        output.render(),
        "cat: missing: No such file or directory\n[exit status 1]"
    );
}

#[rstest]
#[tokio::test(flavor = "multi_thread")]
async fn start_failure_still_removes_container(runtime: Arc<InMemorySandboxRuntime>) {
    runtime
        .fail_phase(SandboxPhase::Start)
        .expect("failure registered");
    let executor = CommandExecutor::new(runtime.clone(), "alpine:3.20");

    let err = executor
        .execute("ls", &policy(&["ls"], &[]))
        .await
        .expect_err("start should fail");

    assert_eq!(err.phase(), Some(SandboxPhase::Start));
    assert_eq!(runtime.removed().expect("state readable").len(), 1);
    assert_eq!(runtime.live_containers().expect("state readable"), 0);
}
