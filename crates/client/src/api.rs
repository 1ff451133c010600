//! HTTP client for the REST API

use std::time::Duration;

use async_trait::async_trait;
use clubhours_core::{
    Addon, DisplaySnapshot, NewAddon, NewPenalty, NewPlayer, NewPromotion, NewSession, Penalty,
    Player, PlayerStats, Promotion, PromotionLeaderboard, RecalculationReport, Session,
};
use reqwest::RequestBuilder;
use serde::de::DeserializeOwned;

use crate::config::ClientConfig;
use crate::error::ClientError;
use crate::offline_queue::{OperationExecutor, PendingOperation};

#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
}

#[derive(serde::Deserialize)]
struct ErrorBody {
    error: String,
}

impl ApiClient {
    pub fn new(config: &ClientConfig) -> Result<Self, ClientError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .build()?;

        Ok(Self {
            http,
            base_url: config.server_url.trim_end_matches('/').to_string(),
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    async fn send(request: RequestBuilder) -> Result<reqwest::Response, ClientError> {
        let response = request.send().await?;

        if !response.status().is_success() {
            let status = response.status().as_u16();
            let text = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ErrorBody>(&text)
                .map(|b| b.error)
                .unwrap_or(text);
            return Err(ClientError::Api { status, message });
        }

        Ok(response)
    }

    async fn send_json<T: DeserializeOwned>(request: RequestBuilder) -> Result<T, ClientError> {
        let response = Self::send(request).await?;
        response
            .json::<T>()
            .await
            .map_err(|e| ClientError::Decode(e.to_string()))
    }

    // Players

    pub async fn list_players(&self) -> Result<Vec<Player>, ClientError> {
        Self::send_json(self.http.get(self.url("/api/players"))).await
    }

    pub async fn create_player(&self, player: &NewPlayer) -> Result<Player, ClientError> {
        Self::send_json(self.http.post(self.url("/api/players")).json(player)).await
    }

    pub async fn update_player(&self, id: i64, player: &NewPlayer) -> Result<Player, ClientError> {
        Self::send_json(self.http.put(self.url(&format!("/api/players/{}", id))).json(player)).await
    }

    pub async fn delete_player(&self, id: i64) -> Result<(), ClientError> {
        Self::send(self.http.delete(self.url(&format!("/api/players/{}", id)))).await?;
        Ok(())
    }

    pub async fn player_stats(&self, id: i64) -> Result<PlayerStats, ClientError> {
        Self::send_json(self.http.get(self.url(&format!("/api/players/{}/stats", id)))).await
    }

    // Sessions

    pub async fn list_sessions(&self, player_id: Option<i64>) -> Result<Vec<Session>, ClientError> {
        let mut request = self.http.get(self.url("/api/sessions"));
        if let Some(id) = player_id {
            request = request.query(&[("player_id", id)]);
        }
        Self::send_json(request).await
    }

    pub async fn record_session(&self, session: &NewSession) -> Result<Session, ClientError> {
        Self::send_json(self.http.post(self.url("/api/sessions")).json(session)).await
    }

    pub async fn delete_session(&self, id: i64) -> Result<(), ClientError> {
        Self::send(self.http.delete(self.url(&format!("/api/sessions/{}", id)))).await?;
        Ok(())
    }

    // Adjustments

    pub async fn apply_penalty(&self, penalty: &NewPenalty) -> Result<Penalty, ClientError> {
        Self::send_json(self.http.post(self.url("/api/penalties")).json(penalty)).await
    }

    pub async fn apply_addon(&self, addon: &NewAddon) -> Result<Addon, ClientError> {
        Self::send_json(self.http.post(self.url("/api/addons")).json(addon)).await
    }

    // Promotions

    pub async fn list_promotions(&self) -> Result<Vec<Promotion>, ClientError> {
        Self::send_json(self.http.get(self.url("/api/promotions"))).await
    }

    pub async fn create_promotion(&self, promotion: &NewPromotion) -> Result<Promotion, ClientError> {
        Self::send_json(self.http.post(self.url("/api/promotions")).json(promotion)).await
    }

    pub async fn update_promotion(&self, id: i64, promotion: &NewPromotion) -> Result<Promotion, ClientError> {
        let path = format!("/api/promotions/{}", id);
        Self::send_json(self.http.put(self.url(&path)).json(promotion)).await
    }

    pub async fn set_promotion_active(&self, id: i64, active: bool) -> Result<Promotion, ClientError> {
        let path = format!("/api/promotions/{}/active", id);
        let body = serde_json::json!({ "active": active });
        Self::send_json(self.http.post(self.url(&path)).json(&body)).await
    }

    pub async fn delete_promotion(&self, id: i64) -> Result<(), ClientError> {
        Self::send(self.http.delete(self.url(&format!("/api/promotions/{}", id)))).await?;
        Ok(())
    }

    pub async fn leaderboard(&self, promotion_id: i64) -> Result<PromotionLeaderboard, ClientError> {
        let path = format!("/api/promotions/{}/leaderboard", promotion_id);
        Self::send_json(self.http.get(self.url(&path))).await
    }

    // Stats and display

    pub async fn recalculate_all(&self) -> Result<RecalculationReport, ClientError> {
        Self::send_json(self.http.post(self.url("/api/stats/recalculate"))).await
    }

    pub async fn display(&self) -> Result<DisplaySnapshot, ClientError> {
        Self::send_json(self.http.get(self.url("/api/display"))).await
    }
}

#[async_trait]
impl OperationExecutor for ApiClient {
    async fn execute(&self, operation: &PendingOperation) -> Result<(), ClientError> {
        match operation {
            PendingOperation::CreatePlayer(p) => self.create_player(p).await.map(|_| ()),
            PendingOperation::CreateSession(s) => self.record_session(s).await.map(|_| ()),
            PendingOperation::CreatePenalty(p) => self.apply_penalty(p).await.map(|_| ()),
            PendingOperation::CreateAddon(a) => self.apply_addon(a).await.map(|_| ()),
            PendingOperation::DeleteSession { id } => self.delete_session(*id).await,
        }
    }
}
