use std::fs;

use blog::app::{AppState, Command, NotificationKind, render_post, render_post_list};
use blog::config::{AdminConfig, SiteConfig, StoreConfig};
use blog::{Config, Error, Language, PostDraft};
use pretty_assertions::assert_eq;

fn config_in(dir: &tempfile::TempDir) -> Config {
    Config {
        site: SiteConfig {
            default_language: Language::Zh,
        },
        store: StoreConfig {
            posts_path: dir.path().join("posts.json"),
            saved_posts_path: dir.path().join("local/blog-posts.json"),
        },
        admin: AdminConfig {
            code: "letmein".into(),
        },
    }
}

#[test]
fn publish_then_reload_keeps_the_new_post() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_in(&dir);

    let mut state = AppState::from_config(&config);
    assert_eq!(state.language, Language::Zh);
    assert_eq!(state.posts.posts().len(), 2);

    state.dispatch(Command::OpenAdmin).unwrap();
    let notes = state.dispatch(Command::SubmitCode("letmein".into())).unwrap();
    assert_eq!(notes[0].kind, NotificationKind::Success);
    assert_eq!(notes[0].message, "验证成功！");

    let draft = PostDraft {
        title: "Notes on Rust".into(),
        content: "## Why\n\n- ownership\n- speed".into(),
        excerpt: "Short notes.".into(),
        tags: "rust".into(),
        ..Default::default()
    };
    let notes = state.dispatch(Command::Publish(draft)).unwrap();
    assert_eq!(notes[0].message, "文章发布成功！");

    let reloaded = AppState::from_config(&config);
    assert_eq!(reloaded.posts.posts().len(), 3);
    let id = reloaded.posts.posts()[2].id;

    // Newest post leads the list.
    let list = render_post_list(&reloaded);
    assert!(list.starts_with(&format!("<article class=\"blog-post\" data-post-id=\"{id}\">")));

    let html = render_post(&reloaded, id).unwrap();
    assert!(html.starts_with("<h1>Notes on Rust</h1>"));
    assert!(html.ends_with("<h2>Why</h2><ul><li>ownership</li><li>speed</li></ul>"));
}

#[test]
fn close_admin_drops_authentication() {
    let dir = tempfile::tempdir().unwrap();
    let mut state = AppState::from_config(&config_in(&dir));

    state.dispatch(Command::SubmitCode("letmein".into())).unwrap();
    state.dispatch(Command::CloseAdmin).unwrap();

    let result = state.dispatch(Command::Publish(PostDraft::default()));
    assert!(matches!(result, Err(Error::NotAuthenticated)));
    assert!(!dir.path().join("local/blog-posts.json").exists());
}

#[test]
fn fetched_posts_replace_the_samples() {
    let dir = tempfile::tempdir().unwrap();
    let config = config_in(&dir);
    fs::write(
        &config.store.posts_path,
        r#"{"posts":[{"id":5,"title":"Only","content":"x","date":"2023-03-03"}]}"#,
    )
    .unwrap();

    let state = AppState::from_config(&config);
    assert_eq!(state.posts.posts().len(), 1);
    assert_eq!(
        render_post(&state, 5).unwrap(),
        "<h1>Only</h1><div class=\"post-meta\">2023-03-03 • </div><p>x</p>"
    );
}

#[test]
fn unwritable_saved_path_rejects_publish_without_a_duplicate() {
    let dir = tempfile::tempdir().unwrap();
    let mut config = config_in(&dir);
    let blocker = dir.path().join("file");
    fs::write(&blocker, "not a directory").unwrap();
    config.store.saved_posts_path = blocker.join("saved.json");

    let mut state = AppState::from_config(&config);
    state.dispatch(Command::SubmitCode("letmein".into())).unwrap();

    let draft = PostDraft {
        title: "Draft".into(),
        content: "body".into(),
        ..Default::default()
    };
    for _ in 0..2 {
        let result = state.dispatch(Command::Publish(draft.clone()));
        assert!(matches!(result, Err(Error::Io { .. })));
        assert_eq!(state.posts.posts().len(), 2);
    }
}
