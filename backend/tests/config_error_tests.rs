//! Tests for configuration defaults, permission overrides and error mapping

use std::collections::HashMap;

use axum::http::StatusCode;
use shared::{DomainError, Permission, Role};
use stockyard::{config::DEVELOPMENT_JWT_SECRET, error::AppError, Config};

mod configuration {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert!(config.is_development());
        assert_eq!(config.inventory.low_stock_threshold, 3);
        assert!(config.alerts.settle_on_request_submission);
    }

    #[test]
    fn negative_threshold_is_rejected() {
        let mut config = Config::default();
        config.inventory.low_stock_threshold = -1;
        assert!(config.validate().is_err());
    }

    #[test]
    fn enabled_auth_needs_a_secret() {
        let mut config = Config::default();
        config.auth.enabled = true;
        config.auth.jwt_secret.clear();
        assert!(config.validate().is_err());
    }

    fn production() -> Config {
        let mut config = Config::default();
        config.environment = "production".to_string();
        config.auth.enabled = true;
        config
    }

    #[test]
    fn production_rejects_development_secret() {
        let config = production();
        assert_eq!(config.auth.jwt_secret, DEVELOPMENT_JWT_SECRET);
        assert!(config.validate().is_err());
    }

    #[test]
    fn production_rejects_missing_secret() {
        let mut config = production();
        config.auth.jwt_secret.clear();
        assert!(config.validate().is_err());
    }

    #[test]
    fn production_accepts_configured_secret() {
        let mut config = production();
        config.auth.jwt_secret = "a-real-deployment-secret".to_string();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn permission_override_replaces_role_grants() {
        let mut config = Config::default();
        config.permissions = HashMap::from([(
            "staff".to_string(),
            vec![Permission::ViewInventory],
        )]);

        let table = config.permission_table().unwrap();
        assert!(table.allows(Role::Staff, Permission::ViewInventory));
        assert!(!table.allows(Role::Staff, Permission::ManageInventory));
        assert!(table.allows(Role::Manager, Permission::DispatchStock));
    }

    #[test]
    fn unknown_role_override_is_rejected() {
        let mut config = Config::default();
        config.permissions = HashMap::from([("janitor".to_string(), vec![])]);
        assert!(config.permission_table().is_err());
    }
}

mod errors {
    use super::*;

    #[test]
    fn domain_errors_map_to_http_status() {
        let cases = [
            (DomainError::missing("item_code"), StatusCode::BAD_REQUEST),
            (DomainError::InvalidRole("other".into()), StatusCode::BAD_REQUEST),
            (
                DomainError::InsufficientStock {
                    item_code: "X1".into(),
                    requested: 5,
                    available: 2,
                },
                StatusCode::BAD_REQUEST,
            ),
            (
                DomainError::InvalidTransition {
                    from: "Approved".into(),
                    to: "Rejected".into(),
                },
                StatusCode::CONFLICT,
            ),
        ];

        for (domain, status) in cases {
            assert_eq!(AppError::from(domain).status(), status);
        }
    }

    #[test]
    fn insufficient_stock_reports_quantities() {
        let err = AppError::from(DomainError::InsufficientStock {
            item_code: "X1".into(),
            requested: 5,
            available: 2,
        });
        let body = err.to_body();
        assert_eq!(body.code, "INSUFFICIENT_STOCK");
        let details = body.details.unwrap();
        assert_eq!(details["requested"], 5);
        assert_eq!(details["available"], 2);
    }

    #[test]
    fn store_errors_are_not_echoed() {
        let err = AppError::DatabaseError(sqlx::Error::RowNotFound);
        assert_eq!(err.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.to_body().error, "A database error occurred");
    }

    #[test]
    fn not_found_names_the_resource() {
        let body = AppError::NotFound("Dispatch".into()).to_body();
        assert_eq!(body.error, "Dispatch not found");
        assert_eq!(body.code, "NOT_FOUND");
    }
}
