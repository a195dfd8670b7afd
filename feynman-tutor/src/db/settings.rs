//! Settings accessors owned by the tutor
//!
//! Thin typed wrappers over the shared `settings` key/value table.

use feynman_common::db::{get_setting, set_setting};
use feynman_common::Result;
use sqlx::SqlitePool;

/// Settings key holding the language model API key
pub const LLM_API_KEY: &str = "llm_api_key";

/// Stored language model API key, if any
pub async fn get_llm_api_key(pool: &SqlitePool) -> Result<Option<String>> {
    get_setting(pool, LLM_API_KEY).await
}

pub async fn set_llm_api_key(pool: &SqlitePool, key: &str) -> Result<()> {
    set_setting(pool, LLM_API_KEY, key).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_llm_api_key_round_trip() {
        let pool = feynman_common::db::init_memory_database().await.unwrap();

        assert_eq!(get_llm_api_key(&pool).await.unwrap(), None);

        set_llm_api_key(&pool, "sk-first").await.unwrap();
        set_llm_api_key(&pool, "sk-second").await.unwrap();
        assert_eq!(get_llm_api_key(&pool).await.unwrap().as_deref(), Some("sk-second"));
    }
}
