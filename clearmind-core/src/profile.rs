//! Profile edits and onboarding answers.
//!
//! `PUT /users/me` overwrites goals, personality and life areas on every
//! call, so each update starts from the user's current values.

use std::collections::BTreeMap;

use crate::client::ClearMindClient;
use crate::error::Result;
use crate::models::{ProfileUpdate, User};

/// Key under which free-text onboarding answers are stored.
pub const MAIN_KEY: &str = "main";

impl ProfileUpdate {
    pub fn from_user(user: &User) -> Self {
        Self {
            name: user.name.clone(),
            occupation: user.occupation.clone(),
            goals: user.goals.clone(),
            personality: user.personality.clone(),
            life_areas: user.life_areas.clone(),
        }
    }
}

/// The three onboarding steps, as typed.
#[derive(Debug, Clone, Default)]
pub struct OnboardingAnswers {
    pub occupation: String,
    pub goals: String,
    pub personality: String,
}

impl OnboardingAnswers {
    pub fn into_update(self, current: &User) -> ProfileUpdate {
        let mut update = ProfileUpdate::from_user(current);
        update.occupation = Some(self.occupation);
        update.goals = BTreeMap::from([(MAIN_KEY.to_string(), self.goals)]);
        update.personality = BTreeMap::from([(MAIN_KEY.to_string(), self.personality)]);
        update
    }
}

/// Edits a user can make from the profile page. `None` leaves a field as is.
#[derive(Debug, Clone, Default)]
pub struct ProfileEdit {
    pub name: Option<String>,
    pub occupation: Option<String>,
    pub life_areas: Option<Vec<String>>,
}

impl ProfileEdit {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.occupation.is_none() && self.life_areas.is_none()
    }

    pub fn apply(self, current: &User) -> ProfileUpdate {
        let mut update = ProfileUpdate::from_user(current);
        if let Some(name) = self.name {
            update.name = Some(name.trim().to_string());
        }
        if let Some(occupation) = self.occupation {
            update.occupation = Some(occupation);
        }
        if let Some(areas) = self.life_areas {
            update.life_areas = areas
                .into_iter()
                .map(|a| a.trim().to_string())
                .filter(|a| !a.is_empty())
                .collect();
        }
        update
    }
}

/// Fetch the current profile, apply `edit` and save it.
pub async fn update_profile(client: &ClearMindClient, edit: ProfileEdit) -> Result<User> {
    let current = client.me().await?;
    let saved = client.update_profile(&edit.apply(&current)).await.map_err(|e| {
        tracing::error!(error = %e, "Failed to update profile");
        e
    })?;
    Ok(saved)
}

pub async fn complete_onboarding(
    client: &ClearMindClient,
    answers: OnboardingAnswers,
) -> Result<User> {
    let current = client.me().await?;
    client
        .update_profile(&answers.into_update(&current))
        .await
        .map_err(|e| {
            tracing::error!(error = %e, "Failed to save onboarding answers");
            e
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::Session;
    use serde_json::json;
    use wiremock::matchers::{body_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn current_user_json() -> serde_json::Value {
        json!({
            "id": 1,
            "email": "ada@example.com",
            "name": "Ada",
            "occupation": "Engineer",
            "goals": {"main": "ship v1"},
            "personality": {},
            "life_areas": ["Career", "Health"],
            "created_at": "2025-01-01T00:00:00"
        })
    }

    fn current_user() -> User {
        serde_json::from_value(current_user_json()).unwrap()
    }

    #[test]
    fn test_edit_preserves_untouched_collections() {
        let update = ProfileEdit {
            name: Some("  Ada L. ".to_string()),
            ..Default::default()
        }
        .apply(&current_user());
        assert_eq!(update.name.as_deref(), Some("Ada L."));
        assert_eq!(update.goals["main"], "ship v1");
        assert_eq!(update.life_areas, vec!["Career", "Health"]);
    }

    #[test]
    fn test_life_areas_are_cleaned() {
        let update = ProfileEdit {
            life_areas: Some(vec![" Family ".into(), "".into(), "Money".into()]),
            ..Default::default()
        }
        .apply(&current_user());
        assert_eq!(update.life_areas, vec!["Family", "Money"]);
    }

    #[test]
    fn test_onboarding_maps_answers_to_main_key() {
        let update = OnboardingAnswers {
            occupation: "Designer".into(),
            goals: "Run a marathon".into(),
            personality: "Introvert".into(),
        }
        .into_update(&current_user());
        assert_eq!(update.occupation.as_deref(), Some("Designer"));
        assert_eq!(update.goals, BTreeMap::from([("main".to_string(), "Run a marathon".to_string())]));
        assert_eq!(update.personality["main"], "Introvert");
        assert_eq!(update.life_areas.len(), 2);
    }

    #[tokio::test]
    async fn test_update_profile_reads_then_writes_whole_profile() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/users/me"))
            .respond_with(ResponseTemplate::new(200).set_body_json(current_user_json()))
            .mount(&server)
            .await;
        let mut saved = current_user_json();
        saved["occupation"] = json!("Writer");
        Mock::given(method("PUT"))
            .and(path("/users/me"))
            .and(body_json(json!({
                "name": "Ada",
                "occupation": "Writer",
                "goals": {"main": "ship v1"},
                "personality": {},
                "life_areas": ["Career", "Health"]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(saved))
            .expect(1)
            .mount(&server)
            .await;

        let session = Session::in_memory();
        session.set_token("t").unwrap();
        let client = ClearMindClient::with_base_url(server.uri(), session).unwrap();
        let user = update_profile(
            &client,
            ProfileEdit {
                occupation: Some("Writer".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(user.occupation.as_deref(), Some("Writer"));
    }
}
