use async_trait::async_trait;
use urlencoding::encode;

use super::FirebaseStore;
use crate::{models::posts::Post, Result};

#[async_trait]
pub trait PostsRepository: Sync + Send {
    async fn fetch_posts(&self) -> Result<Vec<Post>>;
    async fn fetch_post(&self, post_id: &str) -> Result<Option<Post>>;
    async fn save_post(&self, post_id: &str, post: &Post) -> Result<()>;
    async fn delete_post(&self, post_id: &str) -> Result<()>;
}

#[async_trait]
impl PostsRepository for FirebaseStore {
    async fn fetch_posts(&self) -> Result<Vec<Post>> {
        let raw = self.get_document("posts").await?;
        let Some(map) = raw.as_object() else {
            return Ok(Vec::new());
        };

        Ok(map
            .iter()
            .filter_map(|(id, doc)| Post::normalize(doc, id))
            .collect())
    }

    async fn fetch_post(&self, post_id: &str) -> Result<Option<Post>> {
        let raw = self
            .get_document(&format!("posts/{}", encode(post_id)))
            .await?;
        Ok(Post::normalize(&raw, post_id))
    }

    async fn save_post(&self, post_id: &str, post: &Post) -> Result<()> {
        // the id lives in the document key, not the document body
        let mut document = serde_json::to_value(post)?;
        if let Some(map) = document.as_object_mut() {
            map.remove("id");
        }

        self.put_document(&format!("posts/{}", encode(post_id)), &document)
            .await?;
        Ok(())
    }

    async fn delete_post(&self, post_id: &str) -> Result<()> {
        self.delete_document(&format!("posts/{}", encode(post_id)))
            .await
    }
}
