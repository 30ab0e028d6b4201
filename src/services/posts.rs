use std::sync::Arc;

use chrono::{DateTime, SecondsFormat, Utc};

use crate::{
    models::posts::{generate_id, Comment, CommentInput, Post, PostInput},
    repositories::posts_repo::PostsRepository,
    Error, Result,
};

/// The merge-update pipeline. Every mutation is a full
/// read-current → compute-next → write-back of the whole post document:
/// only the fields an operation is allowed to change are replaced, the rest
/// come from the stored record. `createdAt` is stamped once, `updatedAt` on
/// every write, `likes` only moves through `like_post`.
///
/// The read and the write are separate store round trips, so concurrent
/// mutations of the same post can lose an update (two likes reading the same
/// prior count both write `+1`). The store offers no conditional writes to
/// close this; callers get last-writer-wins.
#[derive(Clone)]
pub struct PostsService {
    repo: Arc<dyn PostsRepository>,
}

fn now_timestamp() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn updated_at_sort_key(post: &Post) -> i64 {
    DateTime::parse_from_rfc3339(&post.updated_at)
        .map(|t| t.timestamp_millis())
        .unwrap_or(i64::MIN)
}

impl PostsService {
    pub fn new(repo: Arc<dyn PostsRepository>) -> Self {
        Self { repo }
    }

    /// Newest activity first; unparseable timestamps sort last and keep the
    /// store's enumeration order among themselves.
    pub async fn list_posts(&self) -> Result<Vec<Post>> {
        let mut posts = self.repo.fetch_posts().await?;
        posts.sort_by_key(|post| std::cmp::Reverse(updated_at_sort_key(post)));
        Ok(posts)
    }

    pub async fn get_post(&self, post_id: &str) -> Result<Post> {
        self.repo
            .fetch_post(post_id)
            .await?
            .ok_or_else(|| Error::NotFound("That post could not be found.".to_string()))
    }

    pub async fn create_post(&self, input: PostInput) -> Result<Post> {
        let now = now_timestamp();
        let post = Post {
            id: generate_id(),
            title: input.title,
            content: input.content,
            image_data_url: input.image_data_url,
            created_at: now.clone(),
            updated_at: now,
            likes: 0,
            comments: Vec::new(),
        };

        self.repo.save_post(&post.id, &post).await?;
        Ok(post)
    }

    pub async fn update_post(&self, post_id: &str, input: PostInput) -> Result<Post> {
        let existing = self
            .repo
            .fetch_post(post_id)
            .await?
            .ok_or_else(|| Error::NotFound("The post to edit could not be found.".to_string()))?;

        let now = now_timestamp();
        let post = Post {
            id: existing.id,
            title: input.title,
            content: input.content,
            image_data_url: if input.has_image_field {
                input.image_data_url
            } else {
                existing.image_data_url
            },
            // a record written before timestamps existed gets one now
            created_at: if existing.created_at.is_empty() {
                now.clone()
            } else {
                existing.created_at
            },
            updated_at: now,
            likes: existing.likes,
            comments: existing.comments,
        };

        self.repo.save_post(post_id, &post).await?;
        Ok(post)
    }

    pub async fn delete_post(&self, post_id: &str) -> Result<()> {
        if self.repo.fetch_post(post_id).await?.is_none() {
            return Err(Error::NotFound(
                "The post to delete could not be found.".to_string(),
            ));
        }
        self.repo.delete_post(post_id).await
    }

    pub async fn like_post(&self, post_id: &str) -> Result<u64> {
        let mut post = self
            .repo
            .fetch_post(post_id)
            .await?
            .ok_or_else(|| Error::NotFound("The post to like could not be found.".to_string()))?;

        post.likes += 1;
        post.updated_at = now_timestamp();
        if post.created_at.is_empty() {
            post.created_at = post.updated_at.clone();
        }

        self.repo.save_post(post_id, &post).await?;
        Ok(post.likes)
    }

    pub async fn add_comment(&self, post_id: &str, input: CommentInput) -> Result<Comment> {
        let mut post = self.repo.fetch_post(post_id).await?.ok_or_else(|| {
            Error::NotFound("The post to comment on could not be found.".to_string())
        })?;

        let now = now_timestamp();
        let comment = Comment {
            id: generate_id(),
            text: input.text,
            created_at: now.clone(),
        };

        post.comments.push(comment.clone());
        post.updated_at = now;
        if post.created_at.is_empty() {
            post.created_at = post.updated_at.clone();
        }

        self.repo.save_post(post_id, &post).await?;
        Ok(comment)
    }

    pub async fn delete_comment(&self, post_id: &str, comment_id: &str) -> Result<()> {
        let mut post = self.repo.fetch_post(post_id).await?.ok_or_else(|| {
            Error::NotFound("The post for that comment could not be found.".to_string())
        })?;

        if !post.comments.iter().any(|c| c.id == comment_id) {
            return Err(Error::NotFound(
                "The comment to delete could not be found.".to_string(),
            ));
        }

        post.comments.retain(|c| c.id != comment_id);
        post.updated_at = now_timestamp();

        self.repo.save_post(post_id, &post).await?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::collections::HashMap;
    use std::sync::Mutex;

    use async_trait::async_trait;

    #[derive(Default)]
    struct MemoryRepo {
        posts: Mutex<HashMap<String, Post>>,
    }

    #[async_trait]
    impl PostsRepository for MemoryRepo {
        async fn fetch_posts(&self) -> Result<Vec<Post>> {
            Ok(self.posts.lock().unwrap().values().cloned().collect())
        }

        async fn fetch_post(&self, post_id: &str) -> Result<Option<Post>> {
            Ok(self.posts.lock().unwrap().get(post_id).cloned())
        }

        async fn save_post(&self, post_id: &str, post: &Post) -> Result<()> {
            self.posts
                .lock()
                .unwrap()
                .insert(post_id.to_string(), post.clone());
            Ok(())
        }

        async fn delete_post(&self, post_id: &str) -> Result<()> {
            self.posts.lock().unwrap().remove(post_id);
            Ok(())
        }
    }

    fn service() -> (PostsService, Arc<MemoryRepo>) {
        let repo = Arc::new(MemoryRepo::default());
        (PostsService::new(repo.clone()), repo)
    }

    fn input(title: &str, content: &str) -> PostInput {
        PostInput {
            title: title.to_string(),
            content: content.to_string(),
            image_data_url: String::new(),
            has_image_field: false,
        }
    }

    fn input_with_image(title: &str, content: &str, image: &str) -> PostInput {
        PostInput {
            title: title.to_string(),
            content: content.to_string(),
            image_data_url: image.to_string(),
            has_image_field: true,
        }
    }

    #[tokio::test]
    async fn create_then_fetch_round_trip() {
        let (service, _) = service();

        let created = service.create_post(input("Hello", "World")).await.unwrap();
        let fetched = service.get_post(&created.id).await.unwrap();

        assert_eq!(fetched.title, "Hello");
        assert_eq!(fetched.content, "World");
        assert_eq!(fetched.likes, 0);
        assert!(fetched.comments.is_empty());
        assert_eq!(fetched.created_at, fetched.updated_at);
        assert!(!fetched.created_at.is_empty());
    }

    #[tokio::test]
    async fn edit_preserves_image_when_field_omitted() {
        let (service, _) = service();

        let created = service
            .create_post(input_with_image("t", "c", "data:image/png;base64,AAAA"))
            .await
            .unwrap();

        service
            .update_post(&created.id, input("t2", "c2"))
            .await
            .unwrap();
        let fetched = service.get_post(&created.id).await.unwrap();
        assert_eq!(fetched.image_data_url, "data:image/png;base64,AAAA");
        assert_eq!(fetched.title, "t2");

        service
            .update_post(&created.id, input_with_image("t3", "c3", ""))
            .await
            .unwrap();
        let fetched = service.get_post(&created.id).await.unwrap();
        assert_eq!(fetched.image_data_url, "");
    }

    #[tokio::test]
    async fn edit_preserves_created_at_likes_and_comments() {
        let (service, _) = service();

        let created = service.create_post(input("t", "c")).await.unwrap();
        service.like_post(&created.id).await.unwrap();
        service
            .add_comment(
                &created.id,
                CommentInput {
                    text: "first".to_string(),
                },
            )
            .await
            .unwrap();

        let edited = service
            .update_post(&created.id, input("new title", "new content"))
            .await
            .unwrap();

        assert_eq!(edited.created_at, created.created_at);
        assert_eq!(edited.likes, 1);
        assert_eq!(edited.comments.len(), 1);
        assert_eq!(edited.comments[0].text, "first");
    }

    #[tokio::test]
    async fn sequential_likes_accumulate() {
        let (service, _) = service();

        let created = service.create_post(input("t", "c")).await.unwrap();
        for expected in 1..=5u64 {
            let likes = service.like_post(&created.id).await.unwrap();
            assert_eq!(likes, expected);
        }

        let fetched = service.get_post(&created.id).await.unwrap();
        assert_eq!(fetched.likes, 5);
    }

    #[tokio::test]
    async fn comments_append_in_insertion_order() {
        let (service, _) = service();

        let created = service.create_post(input("t", "c")).await.unwrap();
        for text in ["one", "two", "three"] {
            service
                .add_comment(
                    &created.id,
                    CommentInput {
                        text: text.to_string(),
                    },
                )
                .await
                .unwrap();
        }

        let fetched = service.get_post(&created.id).await.unwrap();
        let texts: Vec<&str> = fetched.comments.iter().map(|c| c.text.as_str()).collect();
        assert_eq!(texts, ["one", "two", "three"]);
    }

    #[tokio::test]
    async fn delete_comment_removes_by_id_and_keeps_order() {
        let (service, _) = service();

        let created = service.create_post(input("t", "c")).await.unwrap();
        let mut ids = Vec::new();
        for text in ["one", "two", "three"] {
            let comment = service
                .add_comment(
                    &created.id,
                    CommentInput {
                        text: text.to_string(),
                    },
                )
                .await
                .unwrap();
            ids.push(comment.id);
        }

        service.delete_comment(&created.id, &ids[1]).await.unwrap();

        let fetched = service.get_post(&created.id).await.unwrap();
        let texts: Vec<&str> = fetched.comments.iter().map(|c| c.text.as_str()).collect();
        assert_eq!(texts, ["one", "three"]);
    }

    #[tokio::test]
    async fn deleting_unknown_comment_is_not_found_and_leaves_post_alone() {
        let (service, _) = service();

        let created = service.create_post(input("t", "c")).await.unwrap();
        service
            .add_comment(
                &created.id,
                CommentInput {
                    text: "keep".to_string(),
                },
            )
            .await
            .unwrap();
        let before = service.get_post(&created.id).await.unwrap();

        let result = service.delete_comment(&created.id, "no-such-comment").await;
        assert!(matches!(result, Err(Error::NotFound(_))));

        let after = service.get_post(&created.id).await.unwrap();
        assert_eq!(after.comments, before.comments);
        assert_eq!(after.updated_at, before.updated_at);
    }

    #[tokio::test]
    async fn operations_on_missing_posts_are_not_found() {
        let (service, _) = service();

        assert!(matches!(
            service.get_post("missing").await,
            Err(Error::NotFound(_))
        ));
        assert!(matches!(
            service.update_post("missing", input("t", "c")).await,
            Err(Error::NotFound(_))
        ));
        assert!(matches!(
            service.delete_post("missing").await,
            Err(Error::NotFound(_))
        ));
        assert!(matches!(
            service.like_post("missing").await,
            Err(Error::NotFound(_))
        ));
        assert!(matches!(
            service
                .add_comment(
                    "missing",
                    CommentInput {
                        text: "hi".to_string()
                    }
                )
                .await,
            Err(Error::NotFound(_))
        ));
        assert!(matches!(
            service.delete_comment("missing", "c1").await,
            Err(Error::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn delete_post_removes_it() {
        let (service, _) = service();

        let created = service.create_post(input("t", "c")).await.unwrap();
        service.delete_post(&created.id).await.unwrap();

        assert!(matches!(
            service.get_post(&created.id).await,
            Err(Error::NotFound(_))
        ));
    }

    #[tokio::test]
    async fn listing_sorts_by_updated_at_descending() {
        let (service, repo) = service();

        let stamps = [
            ("a", "2024-01-01T00:00:00.000Z"),
            ("b", "2024-03-01T00:00:00.000Z"),
            ("c", "2024-02-01T00:00:00.000Z"),
        ];
        for (id, stamp) in stamps {
            let post = Post {
                id: id.to_string(),
                title: id.to_string(),
                content: "c".to_string(),
                image_data_url: String::new(),
                created_at: stamp.to_string(),
                updated_at: stamp.to_string(),
                likes: 0,
                comments: Vec::new(),
            };
            repo.save_post(id, &post).await.unwrap();
        }

        let posts = service.list_posts().await.unwrap();
        let ids: Vec<&str> = posts.iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, ["b", "c", "a"]);
    }

    #[tokio::test]
    async fn unparseable_timestamps_sort_last() {
        let (service, repo) = service();

        for (id, stamp) in [("odd", "not-a-date"), ("new", "2024-06-01T00:00:00.000Z")] {
            let post = Post {
                id: id.to_string(),
                title: id.to_string(),
                content: "c".to_string(),
                image_data_url: String::new(),
                created_at: stamp.to_string(),
                updated_at: stamp.to_string(),
                likes: 0,
                comments: Vec::new(),
            };
            repo.save_post(id, &post).await.unwrap();
        }

        let posts = service.list_posts().await.unwrap();
        assert_eq!(posts.last().unwrap().id, "odd");
    }
}
