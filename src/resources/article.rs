//! Blog articles.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::client::{Client, ClientError, Pagination};

use super::{CountOptions, ListOptions};

/// A blog article.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Article {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub blog_id: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub author: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_id: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub body_html: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary_html: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub handle: Option<String>,
    /// Comma-separated tag list, as the API represents it.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tags: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub template_suffix: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub published_at: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub admin_graphql_api_id: Option<String>,
}

#[derive(Serialize, Deserialize)]
struct ArticleEnvelope {
    article: Article,
}

#[derive(Deserialize)]
struct ArticlesEnvelope {
    articles: Vec<Article>,
}

#[derive(Deserialize)]
struct TagsEnvelope {
    tags: Vec<String>,
}

/// Service for a blog's article endpoints.
pub struct ArticleService<'a> {
    pub(crate) client: &'a Client,
}

impl ArticleService<'_> {
    /// List a blog's articles.
    pub async fn list(
        &self,
        blog_id: u64,
        options: Option<&ListOptions>,
    ) -> Result<Vec<Article>, ClientError> {
        let envelope: ArticlesEnvelope = self
            .client
            .get(&format!("blogs/{blog_id}/articles.json"), options)
            .await?;
        Ok(envelope.articles)
    }

    /// List a blog's articles along with pagination cursors.
    pub async fn list_with_pagination(
        &self,
        blog_id: u64,
        options: Option<&ListOptions>,
    ) -> Result<(Vec<Article>, Pagination), ClientError> {
        let (envelope, pagination): (ArticlesEnvelope, _) = self
            .client
            .list_with_pagination(&format!("blogs/{blog_id}/articles.json"), options)
            .await?;
        Ok((envelope.articles, pagination))
    }

    /// Count a blog's articles.
    pub async fn count(
        &self,
        blog_id: u64,
        options: Option<&CountOptions>,
    ) -> Result<u64, ClientError> {
        self.client
            .count(&format!("blogs/{blog_id}/articles/count.json"), options)
            .await
    }

    /// Fetch a single article.
    pub async fn get(&self, blog_id: u64, article_id: u64) -> Result<Article, ClientError> {
        let envelope: ArticleEnvelope = self
            .client
            .get(
                &format!("blogs/{blog_id}/articles/{article_id}.json"),
                None::<&()>,
            )
            .await?;
        Ok(envelope.article)
    }

    /// Create an article on a blog.
    pub async fn create(&self, blog_id: u64, article: Article) -> Result<Article, ClientError> {
        let envelope: ArticleEnvelope = self
            .client
            .post(
                &format!("blogs/{blog_id}/articles.json"),
                &ArticleEnvelope { article },
            )
            .await?;
        Ok(envelope.article)
    }

    /// Update an existing article. The article's `id` selects the record.
    pub async fn update(&self, blog_id: u64, article: Article) -> Result<Article, ClientError> {
        let article_id = article.id.unwrap_or_default();
        let envelope: ArticleEnvelope = self
            .client
            .put(
                &format!("blogs/{blog_id}/articles/{article_id}.json"),
                &ArticleEnvelope { article },
            )
            .await?;
        Ok(envelope.article)
    }

    /// Delete an article.
    pub async fn delete(&self, blog_id: u64, article_id: u64) -> Result<(), ClientError> {
        self.client
            .delete(&format!("blogs/{blog_id}/articles/{article_id}.json"))
            .await
    }

    /// All tags in use across a blog's articles.
    pub async fn tags(&self, blog_id: u64) -> Result<Vec<String>, ClientError> {
        let envelope: TagsEnvelope = self
            .client
            .get(&format!("blogs/{blog_id}/articles/tags.json"), None::<&()>)
            .await?;
        Ok(envelope.tags)
    }
}
