use regex::Regex;
use sea_orm::*;
use serde::{Deserialize, Serialize};

use crate::entity::user;
use crate::error::AppError;
use crate::models::shared::escape_like;

/// A mention resolved to a real user. Persisted on the activity's `mentions`
/// column and in the mention audit entry's detail payload.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct ResolvedMention {
    pub user_id: i32,
    pub display_name: String,
}

/// A raw mention token found in comment text, before resolution.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MentionToken {
    /// `@[Name](id)` - inserted by the composer, carries the user id.
    Explicit { display_name: String, user_id: i32 },
    /// Bare `@name` typed by hand; resolved by fuzzy name lookup.
    Fuzzy { name: String },
}

/// Scans comment text for mention tokens and resolves them to users.
pub struct MentionParser {
    re: Regex,
}

impl Default for MentionParser {
    fn default() -> Self {
        // Single alternation, explicit form first: the engine consumes an
        // explicit token whole, so its name and id can never re-match as a
        // bare @name.
        Self {
            re: Regex::new(r"@\[([^\]]+)\]\((\d+)\)|@(\w+)").expect("mention regex is valid"),
        }
    }
}

impl MentionParser {
    /// Extract mention tokens in document order.
    pub fn parse(&self, content: &str) -> Vec<MentionToken> {
        self.re
            .captures_iter(content)
            .filter_map(|cap| {
                if let (Some(name), Some(id)) = (cap.get(1), cap.get(2)) {
                    let user_id = id.as_str().parse().ok()?;
                    Some(MentionToken::Explicit {
                        display_name: name.as_str().to_string(),
                        user_id,
                    })
                } else {
                    cap.get(3).map(|name| MentionToken::Fuzzy {
                        name: name.as_str().to_string(),
                    })
                }
            })
            .collect()
    }

    /// Resolve tokens to users, deduplicated by user id in document order.
    ///
    /// Explicit tokens whose id matches no user are dropped rather than
    /// failing the comment; fuzzy tokens resolve to the first display-name
    /// substring match or are dropped.
    pub async fn resolve<C: ConnectionTrait>(
        &self,
        db: &C,
        content: &str,
    ) -> Result<Vec<ResolvedMention>, AppError> {
        let mut resolved: Vec<ResolvedMention> = Vec::new();

        for token in self.parse(content) {
            let found = match token {
                MentionToken::Explicit { user_id, .. } => {
                    user::Entity::find_by_id(user_id).one(db).await?
                }
                MentionToken::Fuzzy { name } => {
                    user::Entity::find()
                        .filter(user::Column::DisplayName.like(format!("%{}%", escape_like(&name))))
                        .order_by_asc(user::Column::Id)
                        .one(db)
                        .await?
                }
            };

            if let Some(u) = found
                && !resolved.iter().any(|p| p.user_id == u.id)
            {
                resolved.push(ResolvedMention {
                    user_id: u.id,
                    // Store the account's current name, not the token text.
                    display_name: u.display_name,
                });
            }
        }

        Ok(resolved)
    }
}
