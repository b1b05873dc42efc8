//! Form fields sent with every comment call

use hc_core::{Comment, RequestContext};

/// `comment_type` sent for every submission
pub const COMMENT_TYPE: &str = "comment";

/// Fields describing one comment to the service
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommentParams {
    pub blog: String,
    pub user_ip: String,
    pub user_agent: String,
    pub referrer: Option<String>,
    pub comment_type: &'static str,
    pub comment_author: Option<String>,
    pub comment_author_email: Option<String>,
    pub comment_author_url: Option<String>,
    pub comment_content: String,
}

impl CommentParams {
    /// Encode as form pairs, signed with `api_key`
    ///
    /// Absent optional fields are left out rather than sent empty.
    pub fn to_form(&self, api_key: &str) -> Vec<(&'static str, String)> {
        let mut form = vec![
            ("api_key", api_key.to_string()),
            ("blog", self.blog.clone()),
            ("user_ip", self.user_ip.clone()),
            ("user_agent", self.user_agent.clone()),
            ("comment_type", self.comment_type.to_string()),
            ("comment_content", self.comment_content.clone()),
        ];
        let optional = [
            ("referrer", &self.referrer),
            ("comment_author", &self.comment_author),
            ("comment_author_email", &self.comment_author_email),
            ("comment_author_url", &self.comment_author_url),
        ];
        for (key, value) in optional {
            if let Some(value) = value {
                form.push((key, value.clone()));
            }
        }
        form
    }
}

/// Describe `comment` and the request that submitted it
pub fn comment_params(blog: &str, comment: &Comment, request: &RequestContext) -> CommentParams {
    CommentParams {
        blog: blog.to_string(),
        user_ip: request.user_ip.clone().unwrap_or_default(),
        user_agent: request.user_agent.clone().unwrap_or_default(),
        referrer: request.referrer.clone(),
        comment_type: COMMENT_TYPE,
        comment_author: non_empty(&comment.name),
        comment_author_email: non_empty(&comment.email),
        comment_author_url: non_empty(&comment.url),
        comment_content: comment.body.clone(),
    }
}

fn non_empty(value: &Option<String>) -> Option<String> {
    value
        .as_deref()
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use hc_core::{CommentBuilder, OwnerRef};
    use pretty_assertions::assert_eq;

    fn public_comment() -> Comment {
        CommentBuilder::new(OwnerRef::new("Post", 1))
            .body("Great write-up")
            .public_author("arjan", "arjan@arjan.com", Some("http://arjan.com".to_string()))
            .build()
    }

    #[test]
    fn test_params_from_public_comment() {
        let request = RequestContext::new("10.0.0.1")
            .user_agent("Mozilla/5.0")
            .referrer("http://example.com/posts/1");
        let params = comment_params("http://example.com", &public_comment(), &request);

        assert_eq!(params.blog, "http://example.com");
        assert_eq!(params.user_ip, "10.0.0.1");
        assert_eq!(params.user_agent, "Mozilla/5.0");
        assert_eq!(params.referrer.as_deref(), Some("http://example.com/posts/1"));
        assert_eq!(params.comment_type, "comment");
        assert_eq!(params.comment_author.as_deref(), Some("arjan"));
        assert_eq!(params.comment_author_email.as_deref(), Some("arjan@arjan.com"));
        assert_eq!(params.comment_author_url.as_deref(), Some("http://arjan.com"));
        assert_eq!(params.comment_content, "Great write-up");
    }

    #[test]
    fn test_form_skips_missing_author_fields() {
        let comment = CommentBuilder::new(OwnerRef::new("Post", 1))
            .body("Registered user comment")
            .user_id(3u64)
            .build();
        let params = comment_params("http://example.com", &comment, &RequestContext::default());
        let form = params.to_form("secret");
        let keys: Vec<&str> = form.iter().map(|(k, _)| *k).collect();

        assert_eq!(
            keys,
            vec![
                "api_key",
                "blog",
                "user_ip",
                "user_agent",
                "comment_type",
                "comment_content"
            ]
        );
        assert_eq!(form[0].1, "secret");
    }

    #[test]
    fn test_blank_author_fields_are_omitted() {
        let mut comment = public_comment();
        comment.url = Some("   ".to_string());
        let params = comment_params("http://example.com", &comment, &RequestContext::default());
        assert!(params.comment_author_url.is_none());
        assert!(params
            .to_form("k")
            .iter()
            .all(|(key, _)| *key != "comment_author_url"));
    }
}
