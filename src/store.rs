//! Post store: the published posts document plus locally saved posts.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::config::StoreConfig;
use crate::error::{Error, Result};
use crate::post::Post;

// Checked by the build script, so parsing it cannot fail at runtime.
static SAMPLE_POSTS: &str = include_str!("sample_posts.json");

/// On-disk shape of the published posts file.
#[derive(Debug, Serialize, Deserialize)]
pub struct PostsDocument {
    pub posts: Vec<Post>,
}

/// The built-in posts used when the posts document is unavailable.
pub fn builtin_posts() -> Vec<Post> {
    match serde_json::from_str::<PostsDocument>(SAMPLE_POSTS) {
        Ok(doc) => doc.posts,
        Err(e) => {
            tracing::error!(error = %e, "bundled sample posts are invalid");
            Vec::new()
        }
    }
}

#[derive(Debug)]
pub struct PostStore {
    posts: Vec<Post>,
    saved_posts_path: PathBuf,
}

impl PostStore {
    pub fn new(posts: Vec<Post>, saved_posts_path: impl Into<PathBuf>) -> Self {
        Self {
            posts,
            saved_posts_path: saved_posts_path.into(),
        }
    }

    /// Load the posts document, falling back to the built-in posts, then
    /// append any locally saved posts.
    ///
    /// Never fails: an unreadable posts document is replaced by the samples,
    /// and a corrupt saved-posts file is logged and skipped.
    pub fn load(config: &StoreConfig) -> Self {
        let mut posts = match read_posts_document(&config.posts_path) {
            Ok(posts) => {
                tracing::debug!(count = posts.len(), path = %config.posts_path.display(), "loaded posts");
                posts
            }
            Err(e) => {
                tracing::warn!(error = %e, "falling back to built-in posts");
                builtin_posts()
            }
        };

        match read_saved_posts(&config.saved_posts_path) {
            Ok(saved) => posts.extend(saved),
            Err(e) => tracing::error!(error = %e, "skipping saved posts"),
        }

        Self::new(posts, &config.saved_posts_path)
    }

    pub fn posts(&self) -> &[Post] {
        &self.posts
    }

    pub fn is_empty(&self) -> bool {
        self.posts.is_empty()
    }

    pub fn find(&self, id: u64) -> Option<&Post> {
        self.posts.iter().find(|post| post.id == id)
    }

    /// Newest first. Posts sharing a date keep their store order.
    pub fn sorted_by_date(&self) -> Vec<&Post> {
        let mut posts: Vec<&Post> = self.posts.iter().collect();
        posts.sort_by(|a, b| b.date.cmp(&a.date));
        posts
    }

    pub fn prepend(&mut self, post: Post) {
        self.posts.insert(0, post);
    }

    /// Prepend a post and save the user-created posts. When the save fails
    /// the post is taken back out, leaving the store as it was.
    pub fn publish(&mut self, post: Post) -> Result<()> {
        self.prepend(post);
        if let Err(e) = self.persist_user_posts() {
            self.posts.remove(0);
            return Err(e);
        }
        Ok(())
    }

    /// Write the user-created posts to the saved-posts file.
    pub fn persist_user_posts(&self) -> Result<()> {
        let user_posts: Vec<&Post> = self
            .posts
            .iter()
            .filter(|post| post.is_user_created())
            .collect();
        let json = serde_json::to_string_pretty(&user_posts)?;

        let path = &self.saved_posts_path;
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).map_err(|e| Error::io(parent, e))?;
        }
        fs::write(path, json).map_err(|e| Error::io(path, e))?;

        tracing::info!(count = user_posts.len(), path = %path.display(), "saved user posts");
        Ok(())
    }
}

fn read_posts_document(path: &Path) -> Result<Vec<Post>> {
    let content = fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
    let doc: PostsDocument = serde_json::from_str(&content)?;
    Ok(doc.posts)
}

/// A missing file means nothing has been published locally yet.
fn read_saved_posts(path: &Path) -> Result<Vec<Post>> {
    match fs::read_to_string(path) {
        Ok(content) => Ok(serde_json::from_str(&content)?),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(Vec::new()),
        Err(e) => Err(Error::io(path, e)),
    }
}
