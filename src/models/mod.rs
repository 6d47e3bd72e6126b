use serde::{Deserialize, Serialize};
use thiserror::Error;
use ts_rs::TS;
use utoipa::ToSchema;

/// Declares a lower-case string enum stored as VARCHAR and sent as a JSON string.
///
/// Rows are decoded with `#[sqlx(try_from = "String")]`, so each enum gets
/// `FromStr` and `TryFrom<String>` next to `as_str` for binding. Exactly one
/// variant must be marked `#[default]`.
macro_rules! string_enum {
    (
        $(#[$meta:meta])*
        $name:ident ($kind:literal) {
            $( $(#[$vmeta:meta])* $variant:ident => $text:literal ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(
            Debug, Default, Clone, Copy, PartialEq, Eq, Hash,
            serde::Serialize, serde::Deserialize, ts_rs::TS, utoipa::ToSchema,
        )]
        #[serde(rename_all = "lowercase")]
        #[ts(export)]
        pub enum $name {
            $( $(#[$vmeta])* $variant ),+
        }

        impl $name {
            pub const ALL: &'static [$name] = &[$($name::$variant),+];

            pub const fn as_str(self) -> &'static str {
                match self {
                    $($name::$variant => $text),+
                }
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl std::str::FromStr for $name {
            type Err = $crate::models::ParseEnumError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($text => Ok($name::$variant),)+
                    other => Err($crate::models::ParseEnumError {
                        kind: $kind,
                        value: other.to_string(),
                    }),
                }
            }
        }

        impl TryFrom<String> for $name {
            type Error = $crate::models::ParseEnumError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                value.parse()
            }
        }
    };
}

pub mod article;
pub mod category;
pub mod comment;
pub mod page;
pub mod user;

pub use article::*;
pub use category::*;
pub use comment::*;
pub use page::*;
pub use user::*;

/// Raised when a stored or submitted enum value is not one of the known variants.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown {kind} `{value}`")]
pub struct ParseEnumError {
    pub kind: &'static str,
    pub value: String,
}

/// MessageResponse
///
/// Plain acknowledgement returned by delete and moderation endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS, ToSchema)]
#[ts(export)]
pub struct MessageResponse {
    pub message: String,
}

impl MessageResponse {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

/// ResourceKey
///
/// Path segment that addresses a row either by numeric id or by slug
/// (`/articles/42` vs `/articles/hello-world`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ResourceKey {
    Id(i32),
    Slug(String),
}

impl ResourceKey {
    pub fn parse(raw: &str) -> Self {
        if !raw.is_empty() && raw.bytes().all(|b| b.is_ascii_digit()) {
            if let Ok(id) = raw.parse::<i32>() {
                return ResourceKey::Id(id);
            }
        }
        ResourceKey::Slug(raw.to_string())
    }
}

/// Treats an absent, blank or whitespace-only query value as "no filter".
pub fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}
