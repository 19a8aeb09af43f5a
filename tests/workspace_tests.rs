// Integration tests for per-run workspaces

use anyhow::Result;
use mix_identify::{PipelineError, Workspace};
use tempfile::TempDir;

#[tokio::test]
async fn test_workspaces_are_unique_and_removed_on_close() -> Result<()> {
    let root = TempDir::new()?;

    let a = Workspace::create(Some(root.path()))?;
    let b = Workspace::create(Some(root.path()))?;

    assert_ne!(a.path(), b.path());
    assert!(a.path().starts_with(root.path()));
    assert!(a.path().is_dir());

    std::fs::create_dir_all(a.join("chunks"))?;
    std::fs::write(a.join("chunks").join("chunk_000.wav"), b"data")?;

    let a_path = a.path().to_path_buf();
    a.close().await;
    assert!(!a_path.exists(), "closed workspace should be removed with its contents");
    assert!(b.path().exists(), "other workspaces are untouched");

    Ok(())
}

#[test]
fn test_workspace_removed_on_drop() -> Result<()> {
    let root = TempDir::new()?;

    let path = {
        let workspace = Workspace::create(Some(root.path()))?;
        std::fs::write(workspace.join("cut_audio.wav"), b"data")?;
        workspace.path().to_path_buf()
    };

    assert!(!path.exists());
    Ok(())
}

#[test]
fn test_workspace_root_is_created() -> Result<()> {
    let root = TempDir::new()?;
    let nested = root.path().join("var").join("mix-identify");

    let workspace = Workspace::create(Some(&nested))?;

    assert!(workspace.path().starts_with(&nested));
    Ok(())
}

#[tokio::test]
async fn test_close_tolerates_already_removed_directory() -> Result<()> {
    let root = TempDir::new()?;
    let workspace = Workspace::create(Some(root.path()))?;

    std::fs::remove_dir_all(workspace.path())?;

    // Logged, not escalated
    workspace.close().await;
    Ok(())
}

#[tokio::test(flavor = "current_thread")]
async fn test_close_removes_large_workspace() -> Result<()> {
    let root = TempDir::new()?;
    let workspace = Workspace::create(Some(root.path()))?;
    let chunks = workspace.join("chunks");
    std::fs::create_dir_all(&chunks)?;
    for i in 0..2000 {
        std::fs::write(chunks.join(format!("chunk_{:04}.wav", i)), b"")?;
    }
    let path = workspace.path().to_path_buf();

    workspace.close().await;

    assert!(!path.exists());
    assert_eq!(std::fs::read_dir(root.path())?.count(), 0);
    Ok(())
}

#[test]
fn test_unusable_root_is_workspace_error() -> Result<()> {
    let root = TempDir::new()?;
    let file = root.path().join("not-a-dir");
    std::fs::write(&file, b"")?;

    let result = Workspace::create(Some(&file));

    assert!(matches!(result, Err(PipelineError::Workspace { .. })));
    Ok(())
}
