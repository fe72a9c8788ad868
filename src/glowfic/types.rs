//! Response shapes of the Glowfic JSON API, and their conversion into
//! archived [`Post`]s.

use serde::Deserialize;

use super::Site;
use crate::story::Post;

#[derive(Debug, Clone, Deserialize)]
pub struct UserInfo {
    pub id: i64,
    pub username: String,
}

/// Either field may be missing; a character is only recorded with both.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CharacterInfo {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct IconInfo {
    pub id: i64,
    pub url: String,
    #[serde(default)]
    pub keyword: Option<String>,
}

/// The thread (Glowfic "post") with its opening content.
#[derive(Debug, Clone, Deserialize)]
pub struct ThreadInfo {
    pub id: i64,
    pub authors: Vec<UserInfo>,
    pub content: String,
    pub created_at: String,
    #[serde(default)]
    pub num_replies: u64,
    pub subject: String,
    #[serde(default)]
    pub character: Option<CharacterInfo>,
    #[serde(default)]
    pub icon: Option<IconInfo>,
}

/// One entry of a replies page.
#[derive(Debug, Clone, Deserialize)]
pub struct RawReply {
    pub id: i64,
    pub content: String,
    pub created_at: String,
    pub user: UserInfo,
    #[serde(default)]
    pub character: Option<CharacterInfo>,
    #[serde(default)]
    pub icon: Option<IconInfo>,
}

/// Fields shared by the thread head and replies.
struct RawFields<'a> {
    id: i64,
    content: &'a str,
    created_at: &'a str,
    character: Option<&'a CharacterInfo>,
    icon: Option<&'a IconInfo>,
}

fn build_post(site: &Site, raw: &RawFields<'_>, author: &UserInfo, permalink: String) -> Post {
    let (character, character_url) = match raw.character {
        Some(CharacterInfo {
            id: Some(id),
            name: Some(name),
        }) => (Some(name.clone()), Some(site.character_url(*id))),
        _ => (None, None),
    };

    Post {
        id: raw.id,
        author: author.username.clone(),
        author_url: site.user_url(author.id),
        content: raw.content.to_string(),
        permalink,
        posted_at: raw.created_at.to_string(),
        character,
        character_url,
        icon_url: raw.icon.map(|i| i.url.clone()),
    }
}

impl ThreadInfo {
    /// The head post, attributed to `author` (the thread's first author).
    #[must_use]
    pub fn to_post(&self, site: &Site, author: &UserInfo) -> Post {
        let raw = RawFields {
            id: self.id,
            content: &self.content,
            created_at: &self.created_at,
            character: self.character.as_ref(),
            icon: self.icon.as_ref(),
        };
        build_post(site, &raw, author, site.post_url(self.id))
    }

    /// Author usernames joined for display.
    #[must_use]
    pub fn author_names(&self) -> String {
        self.authors
            .iter()
            .map(|a| a.username.as_str())
            .collect::<Vec<_>>()
            .join(" & ")
    }
}

impl RawReply {
    #[must_use]
    pub fn to_post(&self, site: &Site) -> Post {
        let raw = RawFields {
            id: self.id,
            content: &self.content,
            created_at: &self.created_at,
            character: self.character.as_ref(),
            icon: self.icon.as_ref(),
        };
        build_post(site, &raw, &self.user, site.reply_permalink(self.id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn site() -> Site {
        Site::new("https://www.glowfic.com")
    }

    #[test]
    fn test_decode_thread() {
        let json = r#"{
            "id": 42, "subject": "A Test!", "content": "<p>Once</p>",
            "created_at": "2020-01-01T00:00:00.000Z", "num_replies": 3,
            "authors": [{"id": 1, "username": "alice"}, {"id": 2, "username": "bob"}],
            "character": {"id": 9, "name": "Carissa", "screenname": "c"},
            "icon": {"id": 5, "url": "https://x/avatar.jpg", "keyword": "smile"},
            "board": {"id": 3, "name": "Sandbox"}
        }"#;
        let thread: ThreadInfo = serde_json::from_str(json).unwrap();
        assert_eq!(thread.author_names(), "alice & bob");

        let head = thread.to_post(&site(), &thread.authors[0]);
        assert_eq!(head.id, 42);
        assert_eq!(head.author, "alice");
        assert_eq!(head.author_url, "https://www.glowfic.com/users/1");
        assert_eq!(head.permalink, "https://www.glowfic.com/posts/42");
        assert_eq!(head.character.as_deref(), Some("Carissa"));
        assert_eq!(
            head.character_url.as_deref(),
            Some("https://www.glowfic.com/characters/9")
        );
        assert_eq!(head.icon_url.as_deref(), Some("https://x/avatar.jpg"));
    }

    #[test]
    fn test_decode_reply_with_nulls() {
        let json = r#"{
            "id": 1001, "content": "hi", "created_at": "2020-01-02T00:00:00.000Z",
            "user": {"id": 2, "username": "bob"}, "character": null, "icon": null
        }"#;
        let reply: RawReply = serde_json::from_str(json).unwrap();
        let post = reply.to_post(&site());
        assert_eq!(post.permalink, "https://www.glowfic.com/replies/1001#reply-1001");
        assert_eq!(post.author_url, "https://www.glowfic.com/users/2");
        assert!(post.character.is_none());
        assert!(post.character_url.is_none());
        assert!(post.icon_url.is_none());
    }

    #[test]
    fn test_partial_character_is_dropped() {
        let json = r#"{
            "id": 1002, "content": "hi", "created_at": "2020-01-02T00:00:00.000Z",
            "user": {"id": 2, "username": "bob"}, "character": {"name": "Nameless"}
        }"#;
        let reply: RawReply = serde_json::from_str(json).unwrap();
        let post = reply.to_post(&site());
        assert!(post.character.is_none());
        assert!(post.character_url.is_none());
    }
}
