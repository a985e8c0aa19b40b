use sea_orm::ActiveValue::{NotSet, Set};

use crate::storage::{Link, NewLink};
use migration::entities::link;

pub fn model_to_link(model: link::Model) -> Link {
    Link {
        id: model.id,
        code: model.code,
        target: model.target_url,
        created_at: model.created_at,
        expires_at: model.expires_at,
        active: model.active,
        click_count: model.click_count.max(0) as u64,
        owner_id: model.owner_id,
    }
}

/// Fresh rows always start active with zero clicks
pub fn new_link_to_active_model(link: &NewLink) -> link::ActiveModel {
    link::ActiveModel {
        id: NotSet,
        code: Set(link.code.clone()),
        target_url: Set(link.target.clone()),
        created_at: Set(link.created_at),
        expires_at: Set(link.expires_at),
        active: Set(true),
        click_count: Set(0),
        owner_id: Set(link.owner_id),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, Utc};
    use sea_orm::ActiveValue;

    #[test]
    fn test_model_to_link() {
        let now = Utc::now();
        let model = link::Model {
            id: 9,
            code: "4C92".to_string(),
            target_url: "https://example.com/a".to_string(),
            created_at: now,
            expires_at: now + Duration::days(7),
            active: false,
            click_count: 3,
            owner_id: 42,
        };

        let link = model_to_link(model);
        assert_eq!(link.id, 9);
        assert_eq!(link.code, "4C92");
        assert_eq!(link.target, "https://example.com/a");
        assert!(!link.active);
        assert_eq!(link.click_count, 3);
        assert_eq!(link.owner_id, 42);
    }

    #[test]
    fn test_negative_click_count_clamped() {
        let now = Utc::now();
        let model = link::Model {
            id: 1,
            code: "x".to_string(),
            target_url: "https://example.com".to_string(),
            created_at: now,
            expires_at: now,
            active: true,
            click_count: -5,
            owner_id: 1,
        };
        assert_eq!(model_to_link(model).click_count, 0);
    }

    #[test]
    fn test_new_link_to_active_model() {
        let now = Utc::now();
        let new_link = NewLink {
            code: "abc".to_string(),
            target: "https://example.com".to_string(),
            created_at: now,
            expires_at: now + Duration::days(1),
            owner_id: 5,
        };

        let model = new_link_to_active_model(&new_link);
        assert!(matches!(model.id, ActiveValue::NotSet));
        assert_eq!(model.code, ActiveValue::Set("abc".to_string()));
        assert_eq!(model.active, ActiveValue::Set(true));
        assert_eq!(model.click_count, ActiveValue::Set(0));
    }
}
