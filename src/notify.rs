//! Optional outbound notifications. Nothing in the store or the CRUD layer
//! depends on this; only the HTTP handlers call it, and only when configured.

use async_trait::async_trait;
use serde::Serialize;

use crate::config::SupabaseConfig;
use crate::users::dto::PublicUser;

#[async_trait]
pub trait Notifier: Send + Sync {
    async fn user_registered(&self, user: &PublicUser) -> anyhow::Result<()>;
}

#[derive(Debug, Serialize)]
struct RegistrationRow<'a> {
    user_id: i64,
    username: &'a str,
    email: Option<&'a str>,
}

/// Inserts one row per registration through Supabase's PostgREST endpoint.
pub struct SupabaseNotifier {
    config: SupabaseConfig,
    http: reqwest::Client,
}

impl SupabaseNotifier {
    pub fn new(config: SupabaseConfig) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(10))
            .build()?;
        Ok(Self { config, http })
    }

    fn table_url(&self) -> String {
        format!("{}/rest/v1/{}", self.config.url, self.config.table)
    }
}

#[async_trait]
impl Notifier for SupabaseNotifier {
    async fn user_registered(&self, user: &PublicUser) -> anyhow::Result<()> {
        let row = RegistrationRow {
            user_id: user.id,
            username: &user.username,
            email: user.email.as_deref(),
        };
        let resp = self
            .http
            .post(self.table_url())
            .header("apikey", &self.config.key)
            .bearer_auth(&self.config.key)
            .header("Prefer", "return=minimal")
            .json(&row)
            .send()
            .await?;

        if !resp.status().is_success() {
            let status = resp.status();
            let body = resp.text().await.unwrap_or_default();
            anyhow::bail!("supabase insert failed ({status}): {body}");
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_url_joins_rest_path() {
        let notifier = SupabaseNotifier::new(SupabaseConfig {
            url: "https://abc.supabase.co".into(),
            key: "k".into(),
            table: "user_registrations".into(),
        })
        .unwrap();
        assert_eq!(
            notifier.table_url(),
            "https://abc.supabase.co/rest/v1/user_registrations"
        );
    }

    #[test]
    fn registration_row_never_carries_a_password() {
        let row = RegistrationRow {
            user_id: 7,
            username: "alice",
            email: None,
        };
        let json = serde_json::to_value(&row).unwrap();
        assert_eq!(json["user_id"], 7);
        assert_eq!(json.as_object().unwrap().len(), 3);
    }
}
