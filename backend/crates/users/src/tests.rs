//! Unit tests for users crate

#[cfg(test)]
mod config_tests {
    use crate::application::config::{RouteGuards, SameSite, UsersConfig};

    #[test]
    fn test_default_config() {
        let config = UsersConfig::default();
        assert_eq!(config.session_cookie_name, "sid");
        assert!(config.cookie_secure);
        assert_eq!(config.cookie_same_site, SameSite::Lax);
        assert!(config.pepper().is_none());
        assert_eq!(config.guards, RouteGuards::default());
    }

    #[test]
    fn test_default_guards_leave_account_writes_open() {
        let guards = RouteGuards::default();
        assert!(!guards.send_message);
        assert!(!guards.delete_account);
        assert!(!guards.update_account);
        assert_ne!(RouteGuards::all(), guards);
    }

    #[test]
    fn test_random_secret_config() {
        let a = UsersConfig::with_random_secret();
        let b = UsersConfig::with_random_secret();
        assert_ne!(a.session_secret, [0u8; 32]);
        assert_ne!(a.session_secret, b.session_secret);
    }

    #[test]
    fn test_development_config() {
        let config = UsersConfig::development();
        assert!(!config.cookie_secure);
        assert_ne!(config.session_secret, [0u8; 32]);
    }

    #[test]
    fn test_cookie_config_follows_settings() {
        let config = UsersConfig::development();
        let cookie = config.cookie_config().build_set_cookie("token");

        assert!(cookie.starts_with("sid=token"));
        assert!(cookie.contains("HttpOnly"));
        assert!(!cookie.contains("Secure"));
        assert!(cookie.contains(&format!("Max-Age={}", config.session_ttl.as_secs())));
        assert_eq!(config.session_ttl_ms(), config.session_ttl.as_millis() as i64);
    }
}

#[cfg(test)]
mod dto_tests {
    use crate::domain::entity::{user::User, web_session::WebSession};
    use crate::domain::value_object::{UserId, email::Email, user_name::UserName};
    use crate::presentation::dto::*;
    use std::time::Duration;

    #[test]
    fn test_register_form_rejects_unknown_fields() {
        let form: RegisterForm = serde_json::from_value(serde_json::json!({
            "name": "alice",
            "email": "a@x.com",
            "password": "password123",
        }))
        .unwrap();
        assert_eq!(form.name, "alice");
        assert!(form.phone.is_none());
        assert!(form.linkedin.is_none());

        let err = serde_json::from_value::<RegisterForm>(serde_json::json!({
            "name": "alice",
            "email": "a@x.com",
            "password": "password123",
            "role": "admin",
        }));
        assert!(err.is_err());
    }

    #[test]
    fn test_send_message_form_field_names() {
        let form: SendMessageForm = serde_json::from_value(serde_json::json!({
            "toEmail": "b@x.com",
            "subject": "Hi",
            "text": "Hello",
        }))
        .unwrap();
        assert_eq!(form.to_email, "b@x.com");

        let snake = serde_json::from_value::<SendMessageForm>(serde_json::json!({
            "to_email": "b@x.com",
            "subject": "Hi",
            "text": "Hello",
        }));
        assert!(snake.is_err());
    }

    #[test]
    fn test_password_not_in_debug_output() {
        let form = LoginForm {
            name: "alice".to_string(),
            password: "hunter2hunter2".to_string(),
        };
        let debug = format!("{form:?}");
        assert!(debug.contains("alice"));
        assert!(!debug.contains("hunter2"));
    }

    #[test]
    fn test_user_view_serialization() {
        let user = User::new_from_provider(
            UserName::new("Bob").unwrap(),
            Email::new("bob@example.com").unwrap(),
            "sub",
        );
        let json = serde_json::to_value(UserView::from(&user)).unwrap();

        assert_eq!(json["id"], user.user_id.to_string());
        assert_eq!(json["name"], "Bob");
        assert!(json["phone"].is_null());
        assert!(json.get("createdAt").is_some());
        assert!(json.get("password").is_none());
    }

    #[test]
    fn test_session_view() {
        let mut session = WebSession::new(Duration::from_secs(60));
        let json = serde_json::to_value(SessionView::from(&session)).unwrap();
        assert_eq!(json["loggedIn"], false);
        assert!(json["userId"].is_null());

        let user_id = UserId::new();
        session.log_in(user_id, "alice");
        let json = serde_json::to_value(SessionView::from(&session)).unwrap();
        assert_eq!(json["loggedIn"], true);
        assert_eq!(json["userId"], user_id.to_string());
        assert_eq!(json["name"], "alice");
    }
}

#[cfg(test)]
mod error_tests {
    use crate::error::{UniqueField, UsersError};
    use axum::http::StatusCode;
    use axum::response::IntoResponse;
    use kernel::error::kind::ErrorKind;
    use platform::password::PasswordPolicyError;

    #[test]
    fn test_flash_messages() {
        assert_eq!(
            UsersError::Taken(UniqueField::Name).to_string(),
            "Username already taken."
        );
        assert_eq!(
            UsersError::Taken(UniqueField::Email).to_string(),
            "Email already taken."
        );
        assert_eq!(
            UsersError::Taken(UniqueField::Phone).to_string(),
            "Phone Number already taken."
        );
        assert_eq!(
            UsersError::Taken(UniqueField::Linkedin).to_string(),
            "linkedIn already taken."
        );
        assert_eq!(
            UsersError::InvalidCredentials.flash_message().as_deref(),
            Some("Username or Password is incorrect")
        );
    }

    #[test]
    fn test_infrastructure_errors_are_not_flashed() {
        assert!(UsersError::UserNotFound.flash_message().is_none());
        assert!(UsersError::Mail("down".into()).flash_message().is_none());
        assert!(UsersError::Internal("boom".into()).flash_message().is_none());
    }

    #[test]
    fn test_constraint_names_round_trip() {
        for field in [
            UniqueField::Name,
            UniqueField::Email,
            UniqueField::Phone,
            UniqueField::Linkedin,
            UniqueField::ProviderSubject,
        ] {
            assert_eq!(UniqueField::from_constraint(field.constraint()), Some(field));
        }
        assert_eq!(UniqueField::from_constraint("posts_pkey"), None);
    }

    #[test]
    fn test_status_codes() {
        assert_eq!(UsersError::UserNotFound.status_code(), StatusCode::NOT_FOUND);
        assert_eq!(
            UsersError::Taken(UniqueField::Email).status_code(),
            StatusCode::CONFLICT
        );
        assert_eq!(UsersError::LoginRequired.status_code(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            UsersError::PasswordPolicy(PasswordPolicyError::EmptyOrWhitespace).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(UsersError::Mail("x".into()).status_code(), StatusCode::BAD_GATEWAY);
        assert_eq!(
            UsersError::ProviderDisabled.status_code(),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            UsersError::Internal("x".into()).kind(),
            ErrorKind::InternalServerError
        );
    }

    #[test]
    fn test_internal_details_hidden() {
        let app_err = UsersError::Internal("connection string leaked".into()).into_app_error();
        assert!(!app_err.message().contains("leaked"));

        let response = UsersError::Internal("x".into()).into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[test]
    fn test_database_cause_kept_for_logs() {
        use std::error::Error;

        let app_err = UsersError::Database(sqlx::Error::PoolTimedOut).into_app_error();
        assert_eq!(app_err.kind(), ErrorKind::InternalServerError);
        assert_eq!(app_err.message(), "Database error");
        assert!(app_err.source().is_some());
    }

    #[test]
    fn test_problem_kinds_match_status() {
        let cases = [
            UsersError::UserNotFound,
            UsersError::Taken(UniqueField::Phone),
            UsersError::LoginRequired,
            UsersError::InvalidInput("bad".into()),
            UsersError::ProviderDisabled,
            UsersError::Provider("timeout".into()),
            UsersError::Mail("down".into()),
        ];
        for err in cases {
            let kind = err.kind();
            assert_eq!(err.into_app_error().kind(), kind);
        }

        let app_err = UsersError::Taken(UniqueField::Email).into_app_error();
        assert_eq!(app_err.message(), "Email already taken.");
        let app_err = UsersError::Mail("smtp 421".into()).into_app_error();
        assert_eq!(app_err.action(), Some("Please try again later"));
        assert!(!app_err.message().contains("421"));
    }

    #[test]
    fn test_from_app_error() {
        let err: UsersError = kernel::error::app_error::AppError::bad_request("Invalid email format.").into();
        assert!(matches!(err, UsersError::InvalidInput(ref m) if m == "Invalid email format."));

        let err: UsersError = kernel::error::app_error::AppError::internal("boom").into();
        assert!(matches!(err, UsersError::Internal(_)));
    }
}

#[cfg(test)]
mod use_case_tests {
    use std::sync::{Arc, Mutex};

    use async_trait::async_trait;

    use crate::application::config::UsersConfig;
    use crate::application::*;
    use crate::domain::entity::post::Post;
    use crate::domain::gateway::{MailTransport, OutgoingMail, ProviderProfile};
    use crate::domain::repository::UserRepository;
    use crate::error::{UniqueField, UsersError, UsersResult};
    use crate::infra::memory::MemoryUserStore;

    #[derive(Default)]
    struct CapturingMailer(Mutex<Vec<OutgoingMail>>);

    #[async_trait]
    impl MailTransport for CapturingMailer {
        async fn send(&self, mail: &OutgoingMail) -> UsersResult<()> {
            self.0.lock().unwrap().push(mail.clone());
            Ok(())
        }
    }

    fn input(name: &str, email: &str) -> RegisterInput {
        RegisterInput {
            name: name.to_string(),
            email: email.to_string(),
            phone: Some(String::new()),
            linkedin: None,
            password: "password123".to_string(),
        }
    }

    fn setup() -> (Arc<MemoryUserStore>, Arc<UsersConfig>) {
        let config = UsersConfig {
            password_pepper: Some(b"pepper".to_vec()),
            ..UsersConfig::development()
        };
        (Arc::new(MemoryUserStore::new()), Arc::new(config))
    }

    #[tokio::test]
    async fn test_register_then_login_with_pepper() {
        let (store, config) = setup();
        let registered = RegisterUseCase::new(store.clone(), config.clone())
            .execute(input("alice", "A@X.com"))
            .await
            .unwrap();
        assert_eq!(registered.email.as_str(), "a@x.com");

        let login = LoginUseCase::new(store.clone(), config.clone());
        let user = login
            .execute(LoginInput {
                name: " alice ".to_string(),
                password: "password123".to_string(),
            })
            .await
            .unwrap();
        assert_eq!(user.user_id, registered.user_id);

        // Same store, different pepper: the hash no longer verifies
        let unpeppered = LoginUseCase::new(store, Arc::new(UsersConfig::development()));
        let err = unpeppered
            .execute(LoginInput {
                name: "alice".to_string(),
                password: "password123".to_string(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, UsersError::InvalidCredentials));
    }

    #[tokio::test]
    async fn test_register_invalid_email_is_input_error() {
        let (store, config) = setup();
        let err = RegisterUseCase::new(store, config)
            .execute(input("alice", "not-an-email"))
            .await
            .unwrap_err();
        assert!(matches!(err, UsersError::InvalidInput(_)));
        assert!(err.flash_message().is_some());
    }

    #[tokio::test]
    async fn test_provider_only_account_cannot_password_login() {
        let (store, config) = setup();
        ProviderSignInUseCase::new(store.clone())
            .execute(ProviderProfile {
                subject: "sub-1".to_string(),
                email: "bob@example.com".to_string(),
                name: None,
            })
            .await
            .unwrap();

        // Name derived from the email's local part
        let bob = store.find_by_name("bob").await.unwrap().unwrap();
        assert!(bob.needs_profile_completion());

        let err = LoginUseCase::new(store, config)
            .execute(LoginInput {
                name: "bob".to_string(),
                password: "anything123".to_string(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, UsersError::InvalidCredentials));
    }

    #[tokio::test]
    async fn test_send_message_requires_sender() {
        let (store, config) = setup();
        let mailer = Arc::new(CapturingMailer::default());
        let use_case = SendMessageUseCase::new(store, mailer.clone(), config);

        let err = use_case
            .execute(SendMessageInput {
                sender_id: None,
                to_email: "b@x.com".to_string(),
                subject: "Hi".to_string(),
                text: "Hello".to_string(),
            })
            .await
            .unwrap_err();
        assert!(matches!(err, UsersError::LoginRequired));
        assert!(mailer.0.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_delete_account_cascades_to_posts() {
        let (store, config) = setup();
        let user = RegisterUseCase::new(store.clone(), config)
            .execute(input("alice", "a@x.com"))
            .await
            .unwrap();
        store.insert_post(Post::new(user.user_id, "Bike")).unwrap();

        let deleted = DeleteAccountUseCase::new(store.clone(), store.clone())
            .execute(&user.user_id)
            .await
            .unwrap();
        assert_eq!(deleted.post_ids.len(), 1);
        assert_eq!(store.post_count(), 0);

        let err = DeleteAccountUseCase::new(store.clone(), store)
            .execute(&user.user_id)
            .await
            .unwrap_err();
        assert!(matches!(err, UsersError::UserNotFound));
    }

    #[tokio::test]
    async fn test_update_account_conflict() {
        let (store, config) = setup();
        let register = RegisterUseCase::new(store.clone(), config);
        let alice = register.execute(input("alice", "a@x.com")).await.unwrap();
        register.execute(input("bob", "b@x.com")).await.unwrap();

        let err = UpdateAccountUseCase::new(store)
            .execute(
                &alice.user_id,
                UpdateAccountInput {
                    name: "bob".to_string(),
                    email: "a@x.com".to_string(),
                    phone: None,
                    linkedin: None,
                },
            )
            .await
            .unwrap_err();
        assert!(matches!(err, UsersError::Taken(UniqueField::Name)));
    }
}
