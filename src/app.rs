//! Application state and the command handlers that drive it.
//!
//! Every user action is a [`Command`] dispatched against an explicit
//! [`AppState`]; rendering functions read the state and return HTML strings.

use chrono::{DateTime, Utc};

use crate::config::Config;
use crate::error::{Error, Result};
use crate::inline::escape_html;
use crate::post::{Language, Post, PostDraft, USER_POST_ID_FLOOR};
use crate::store::PostStore;
use crate::translate;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Page {
    #[default]
    Home,
    About,
    Post(u64),
}

#[derive(Debug, Clone)]
pub enum Command {
    ShowPage(Page),
    ShowPost(u64),
    ToggleLanguage,
    OpenAdmin,
    CloseAdmin,
    SubmitCode(String),
    Publish(PostDraft),
}

impl Command {
    /// Variant name, for logs. Payloads (admin codes included) are left out.
    pub fn name(&self) -> &'static str {
        match self {
            Self::ShowPage(_) => "show_page",
            Self::ShowPost(_) => "show_post",
            Self::ToggleLanguage => "toggle_language",
            Self::OpenAdmin => "open_admin",
            Self::CloseAdmin => "close_admin",
            Self::SubmitCode(_) => "submit_code",
            Self::Publish(_) => "publish",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NotificationKind {
    Success,
    Error,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notification {
    pub kind: NotificationKind,
    pub message: String,
}

impl Notification {
    fn new(kind: NotificationKind, lang: Language, en: &str, zh: &str) -> Self {
        Self {
            kind,
            message: lang.pick(en, zh).to_string(),
        }
    }
}

/// The publish form's gate. Compares a shared code in plain text, which
/// keeps casual visitors out and nothing more.
#[derive(Debug, Default)]
pub struct AdminSession {
    pub open: bool,
    pub authenticated: bool,
    code: String,
}

impl AdminSession {
    pub fn new(code: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            ..Default::default()
        }
    }

    fn reset(&mut self) {
        self.open = false;
        self.authenticated = false;
    }
}

#[derive(Debug)]
pub struct AppState {
    pub language: Language,
    pub page: Page,
    pub posts: PostStore,
    pub admin: AdminSession,
}

impl AppState {
    pub fn new(posts: PostStore, language: Language, admin: AdminSession) -> Self {
        Self {
            language,
            page: Page::Home,
            posts,
            admin,
        }
    }

    /// Build the state from config, loading the post store.
    pub fn from_config(config: &Config) -> Self {
        if config.admin.is_default_code() {
            tracing::warn!("admin code is still the default; change [admin].code before publishing");
        }
        Self::new(
            PostStore::load(&config.store),
            config.site.default_language,
            AdminSession::new(config.admin.code.clone()),
        )
    }

    /// Apply one command, returning the notifications it raised.
    pub fn dispatch(&mut self, command: Command) -> Result<Vec<Notification>> {
        tracing::debug!(command = command.name(), "dispatch");
        match command {
            Command::ShowPage(page) => {
                self.page = page;
                Ok(Vec::new())
            }
            Command::ShowPost(id) => {
                if self.posts.find(id).is_none() {
                    return Err(Error::UnknownPost(id));
                }
                self.page = Page::Post(id);
                Ok(Vec::new())
            }
            Command::ToggleLanguage => {
                self.language = self.language.toggle();
                Ok(Vec::new())
            }
            Command::OpenAdmin => {
                self.admin.open = true;
                Ok(Vec::new())
            }
            Command::CloseAdmin => {
                self.admin.reset();
                Ok(Vec::new())
            }
            Command::SubmitCode(code) => Ok(vec![self.submit_code(&code)]),
            Command::Publish(draft) => self.publish_at(draft, Utc::now()).map(|n| vec![n]),
        }
    }

    fn submit_code(&mut self, code: &str) -> Notification {
        let lang = self.language;
        if code == self.admin.code {
            self.admin.authenticated = true;
            Notification::new(
                NotificationKind::Success,
                lang,
                "Authentication successful!",
                "验证成功！",
            )
        } else {
            tracing::warn!("rejected admin code");
            Notification::new(
                NotificationKind::Error,
                lang,
                "Invalid security code!",
                "安全码错误！",
            )
        }
    }

    /// Publish a draft as of `now`: assign a timestamp id, prepend it, and
    /// save the user-created posts. Nothing changes if the save fails.
    pub fn publish_at(&mut self, draft: PostDraft, now: DateTime<Utc>) -> Result<Notification> {
        if !self.admin.authenticated {
            return Err(Error::NotAuthenticated);
        }

        let mut id = u64::try_from(now.timestamp_millis())
            .unwrap_or(USER_POST_ID_FLOOR)
            .max(USER_POST_ID_FLOOR);
        while self.posts.find(id).is_some() {
            id += 1;
        }

        let post = draft.into_post(id, now.date_naive());
        tracing::info!(id, title = %post.title, "publishing post");
        // On a failed save the session stays open so the draft can be retried.
        self.posts.publish(post)?;
        self.admin.reset();

        Ok(Notification::new(
            NotificationKind::Success,
            self.language,
            "Post published successfully!",
            "文章发布成功！",
        ))
    }
}

/// Render the post cards, newest first.
pub fn render_post_list(state: &AppState) -> String {
    let lang = state.language;
    if state.posts.is_empty() {
        return format!(
            "<div class=\"loading\">{}</div>",
            lang.pick("No posts available.", "暂无文章。")
        );
    }

    state
        .posts
        .sorted_by_date()
        .into_iter()
        .map(|post| render_card(post, lang))
        .collect()
}

fn render_card(post: &Post, lang: Language) -> String {
    let tags: String = post
        .tags
        .iter()
        .map(|tag| format!("<span class=\"tag\">{}</span>", escape_html(tag)))
        .collect();

    format!(
        "<article class=\"blog-post\" data-post-id=\"{id}\">\
         <h3 class=\"post-title\">{title}</h3>\
         <div class=\"post-meta\">{date}</div>\
         <p class=\"post-excerpt\">{excerpt}</p>\
         <div class=\"post-tags\">{tags}</div>\
         </article>",
        id = post.id,
        title = escape_html(post.title_in(lang)),
        date = post.date,
        excerpt = escape_html(post.excerpt_in(lang)),
    )
}

/// Render a full post: escaped title, meta line, then the translated body.
pub fn render_post(state: &AppState, id: u64) -> Option<String> {
    let post = state.posts.find(id)?;
    let lang = state.language;

    Some(format!(
        "<h1>{title}</h1><div class=\"post-meta\">{date} • {tags}</div>{body}",
        title = escape_html(post.title_in(lang)),
        date = post.date,
        tags = escape_html(&post.tags.join(", ")),
        body = translate(post.content_in(lang)),
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use pretty_assertions::assert_eq;

    fn post(id: u64, date: &str, title: &str) -> Post {
        Post {
            id,
            title: title.into(),
            title_zh: Some(format!("{title} 中")),
            content: "# Heading\n\n**bold** text".into(),
            content_zh: None,
            excerpt: "a < b".into(),
            excerpt_zh: None,
            tags: vec!["rust".into(), "c&c".into()],
            date: date.parse().unwrap(),
        }
    }

    fn state_with(posts: Vec<Post>, saved: &std::path::Path) -> AppState {
        AppState::new(
            PostStore::new(posts, saved),
            Language::En,
            AdminSession::new("open-sesame"),
        )
    }

    #[test]
    fn empty_store_renders_localized_placeholder() {
        let dir = tempfile::tempdir().unwrap();
        let mut state = state_with(vec![], &dir.path().join("saved.json"));
        assert_eq!(
            render_post_list(&state),
            "<div class=\"loading\">No posts available.</div>"
        );
        state.dispatch(Command::ToggleLanguage).unwrap();
        assert_eq!(
            render_post_list(&state),
            "<div class=\"loading\">暂无文章。</div>"
        );
    }

    #[test]
    fn post_list_is_newest_first_and_escaped() {
        let dir = tempfile::tempdir().unwrap();
        let state = state_with(
            vec![post(1, "2024-01-01", "Old"), post(2, "2024-05-01", "<New>")],
            &dir.path().join("saved.json"),
        );
        let html = render_post_list(&state);

        let new_at = html.find("data-post-id=\"2\"").unwrap();
        let old_at = html.find("data-post-id=\"1\"").unwrap();
        assert!(new_at < old_at);
        assert!(html.contains("<h3 class=\"post-title\">&lt;New&gt;</h3>"));
        assert!(html.contains("<p class=\"post-excerpt\">a &lt; b</p>"));
        assert!(html.contains("<span class=\"tag\">c&amp;c</span>"));
    }

    #[test]
    fn post_view_translates_content_in_current_language() {
        let dir = tempfile::tempdir().unwrap();
        let mut state = state_with(vec![post(1, "2024-01-01", "T")], &dir.path().join("saved.json"));

        assert_eq!(
            render_post(&state, 1).unwrap(),
            "<h1>T</h1><div class=\"post-meta\">2024-01-01 • rust, c&amp;c</div>\
             <h1>Heading</h1><p><strong>bold</strong> text</p>"
        );

        state.dispatch(Command::ToggleLanguage).unwrap();
        let zh = render_post(&state, 1).unwrap();
        assert!(zh.starts_with("<h1>T 中</h1>"));
        assert!(zh.ends_with("<p><strong>bold</strong> text</p>"));

        assert_eq!(render_post(&state, 99), None);
    }

    #[test]
    fn show_post_checks_the_id() {
        let dir = tempfile::tempdir().unwrap();
        let mut state = state_with(vec![post(1, "2024-01-01", "T")], &dir.path().join("saved.json"));

        state.dispatch(Command::ShowPost(1)).unwrap();
        assert_eq!(state.page, Page::Post(1));
        assert!(matches!(
            state.dispatch(Command::ShowPost(2)),
            Err(Error::UnknownPost(2))
        ));
        state.dispatch(Command::ShowPage(Page::About)).unwrap();
        assert_eq!(state.page, Page::About);
    }

    #[test]
    fn wrong_code_does_not_authenticate() {
        let dir = tempfile::tempdir().unwrap();
        let mut state = state_with(vec![], &dir.path().join("saved.json"));

        state.dispatch(Command::OpenAdmin).unwrap();
        let notes = state.dispatch(Command::SubmitCode("guess".into())).unwrap();
        assert_eq!(notes[0].kind, NotificationKind::Error);
        assert!(!state.admin.authenticated);

        let result = state.dispatch(Command::Publish(PostDraft::default()));
        assert!(matches!(result, Err(Error::NotAuthenticated)));
    }

    #[test]
    fn publish_prepends_persists_and_closes_admin() {
        let dir = tempfile::tempdir().unwrap();
        let saved = dir.path().join("data/saved.json");
        let mut state = state_with(vec![post(1, "2024-01-01", "Sample")], &saved);

        state.dispatch(Command::OpenAdmin).unwrap();
        let notes = state.dispatch(Command::SubmitCode("open-sesame".into())).unwrap();
        assert_eq!(notes[0].kind, NotificationKind::Success);

        let now = Utc.with_ymd_and_hms(2026, 10, 18, 12, 0, 0).unwrap();
        let draft = PostDraft {
            title: "Fresh".into(),
            content: "Hello".into(),
            tags: "a, b".into(),
            ..Default::default()
        };
        let note = state.publish_at(draft, now).unwrap();
        assert_eq!(note.message, "Post published successfully!");

        let first = &state.posts.posts()[0];
        assert_eq!(first.id, 1_792_324_800_000);
        assert_eq!(first.date.to_string(), "2026-10-18");
        assert!(!state.admin.open && !state.admin.authenticated);

        let written: Vec<Post> =
            serde_json::from_str(&std::fs::read_to_string(&saved).unwrap()).unwrap();
        assert_eq!(written.len(), 1);
        assert_eq!(written[0].title, "Fresh");
    }

    #[test]
    fn publish_ids_stay_unique_within_a_millisecond() {
        let dir = tempfile::tempdir().unwrap();
        let mut state = state_with(vec![], &dir.path().join("saved.json"));
        let now = Utc.with_ymd_and_hms(2026, 10, 18, 12, 0, 0).unwrap();

        for _ in 0..2 {
            state.admin.authenticated = true;
            state.publish_at(PostDraft::default(), now).unwrap();
        }
        let ids: Vec<u64> = state.posts.posts().iter().map(|p| p.id).collect();
        assert_eq!(ids, vec![1_792_324_800_001, 1_792_324_800_000]);
    }

    #[test]
    fn failed_save_does_not_keep_the_post() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("file");
        std::fs::write(&blocker, "not a directory").unwrap();
        let mut state = state_with(vec![], &blocker.join("saved.json"));
        let now = Utc.with_ymd_and_hms(2026, 10, 18, 12, 0, 0).unwrap();

        state.admin.authenticated = true;
        assert!(state.publish_at(PostDraft::default(), now).is_err());
        assert!(state.posts.is_empty());
        assert!(state.admin.authenticated);

        assert!(state.publish_at(PostDraft::default(), now).is_err());
        assert!(state.posts.is_empty());
    }
}
