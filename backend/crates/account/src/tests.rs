//! Use case tests for the account crate
//! Storage is an in-memory repository with call counters; no database needed.

#[cfg(test)]
mod support {
    use std::sync::Mutex;
    use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

    use chrono::Utc;
    use partner::ProvisioningJob;
    use platform::password::HashedPassword;
    use platform::queue::JobHandler;
    use rust_decimal::Decimal;
    use tokio::sync::mpsc;

    use crate::domain::entity::account::{Account, NewAccount};
    use crate::domain::repository::AccountRepository;
    use crate::domain::value_object::{
        identity_code::IdentityCode,
        phone::{DialCode, PhoneNumber},
        referral_code::ReferralCode,
        tier_level::TierLevel,
    };
    use crate::error::{AccountError, AccountResult};

    pub struct StoredAccount {
        pub account: Account,
        pub password_hash: String,
        pub session_digest: String,
    }

    #[derive(Default)]
    pub struct Tables {
        pub accounts: Vec<StoredAccount>,
        pub point_list: Vec<i64>,
        pub turn_over: Vec<(i64, String, String)>,
    }

    #[derive(Default)]
    pub struct InMemoryAccounts {
        pub tables: Mutex<Tables>,
        /// Every repository call
        pub calls: AtomicUsize,
        pub identity_checks: AtomicUsize,
        /// Report every identity code as taken
        pub identity_always_taken: AtomicBool,
        /// Upcoming inserts that fail with an identity collision
        pub insert_collisions: AtomicUsize,
    }

    impl InMemoryAccounts {
        pub fn account_count(&self) -> usize {
            self.tables.lock().unwrap().accounts.len()
        }

        pub fn get(&self, identity: IdentityCode) -> Option<Account> {
            self.tables
                .lock()
                .unwrap()
                .accounts
                .iter()
                .find(|s| s.account.identity_code == identity)
                .map(|s| s.account.clone())
        }

        pub fn set_tier(&self, code: &ReferralCode, tier: i16) {
            let mut tables = self.tables.lock().unwrap();
            if let Some(stored) = tables
                .accounts
                .iter_mut()
                .find(|s| &s.account.referral_code == code)
            {
                stored.account.tier_level = TierLevel::from_db(tier);
            }
        }

        pub fn update(&self, identity: IdentityCode, f: impl FnOnce(&mut Account)) {
            let mut tables = self.tables.lock().unwrap();
            if let Some(stored) = tables
                .accounts
                .iter_mut()
                .find(|s| s.account.identity_code == identity)
            {
                f(&mut stored.account);
            }
        }

        /// Insert an account directly, bypassing the pipeline
        pub fn seed(&self, phone: &str, invited_by: &str, origin: &str) -> Account {
            let mut tables = self.tables.lock().unwrap();
            let identity_code = loop {
                let candidate = IdentityCode::generate();
                if !tables
                    .accounts
                    .iter()
                    .any(|s| s.account.identity_code == candidate)
                {
                    break candidate;
                }
            };
            let account = Account::new(
                NewAccount {
                    identity_code,
                    phone: PhoneNumber::new(phone).unwrap(),
                    dial_code: DialCode::new("+91").unwrap(),
                    invited_by: ReferralCode::new(invited_by).unwrap(),
                    attribution: None,
                    signup_bonus: Decimal::ZERO,
                    privileged: false,
                    allowed_tabs: None,
                    origin: origin.to_string(),
                },
                Utc::now(),
            );
            tables.accounts.push(StoredAccount {
                account: account.clone(),
                password_hash: String::new(),
                session_digest: String::new(),
            });
            account
        }

        fn touch(&self) {
            self.calls.fetch_add(1, Ordering::SeqCst);
        }
    }

    impl AccountRepository for InMemoryAccounts {
        async fn exists_by_phone(
            &self,
            phone: &PhoneNumber,
            dial_code: &DialCode,
        ) -> AccountResult<bool> {
            self.touch();
            Ok(self
                .tables
                .lock()
                .unwrap()
                .accounts
                .iter()
                .any(|s| &s.account.phone == phone && &s.account.dial_code == dial_code))
        }

        async fn find_by_referral_code(
            &self,
            code: &ReferralCode,
        ) -> AccountResult<Option<Account>> {
            self.touch();
            Ok(self
                .tables
                .lock()
                .unwrap()
                .accounts
                .iter()
                .find(|s| &s.account.referral_code == code)
                .map(|s| s.account.clone()))
        }

        async fn count_by_origin(&self, origin: &str) -> AccountResult<u64> {
            self.touch();
            Ok(self
                .tables
                .lock()
                .unwrap()
                .accounts
                .iter()
                .filter(|s| s.account.origin == origin)
                .count() as u64)
        }

        async fn exists_by_identity_code(&self, code: IdentityCode) -> AccountResult<bool> {
            self.touch();
            self.identity_checks.fetch_add(1, Ordering::SeqCst);
            if self.identity_always_taken.load(Ordering::SeqCst) {
                return Ok(true);
            }
            Ok(self
                .tables
                .lock()
                .unwrap()
                .accounts
                .iter()
                .any(|s| s.account.identity_code == code))
        }

        async fn create(
            &self,
            account: &Account,
            password: &HashedPassword,
            session_digest: &str,
        ) -> AccountResult<()> {
            self.touch();
            let collide = self
                .insert_collisions
                .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1))
                .is_ok();
            if collide {
                return Err(AccountError::IdentityTaken);
            }

            let mut tables = self.tables.lock().unwrap();
            if tables.accounts.iter().any(|s| {
                s.account.phone == account.phone && s.account.dial_code == account.dial_code
            }) {
                return Err(AccountError::DuplicatePhone);
            }
            tables.accounts.push(StoredAccount {
                account: account.clone(),
                password_hash: password.as_phc_string().to_string(),
                session_digest: session_digest.to_string(),
            });
            tables.point_list.push(account.identity_code.value());
            tables.turn_over.push((
                account.identity_code.value(),
                account.referral_code.as_str().to_string(),
                account.invited_by.as_str().to_string(),
            ));
            Ok(())
        }

        async fn refresh_tier(&self, code: &ReferralCode) -> AccountResult<TierLevel> {
            self.touch();
            let mut tables = self.tables.lock().unwrap();
            let referees = tables
                .accounts
                .iter()
                .filter(|s| &s.account.invited_by == code)
                .count() as u64;
            let computed = TierLevel::for_referee_count(referees);
            let referrer = tables
                .accounts
                .iter_mut()
                .find(|s| &s.account.referral_code == code)
                .ok_or(AccountError::InvalidReferrer)?;
            referrer.account.tier_level = referrer.account.tier_level.raise_to(computed);
            Ok(referrer.account.tier_level)
        }

        async fn find_by_session_digest(&self, digest: &str) -> AccountResult<Option<Account>> {
            self.touch();
            Ok(self
                .tables
                .lock()
                .unwrap()
                .accounts
                .iter()
                .find(|s| !s.session_digest.is_empty() && s.session_digest == digest)
                .map(|s| s.account.clone()))
        }
    }

    /// Forwards provisioning jobs to a channel
    #[derive(Clone)]
    pub struct RecordingProvisioner {
        pub tx: mpsc::UnboundedSender<ProvisioningJob>,
    }

    impl JobHandler<ProvisioningJob> for RecordingProvisioner {
        async fn handle(&self, job: ProvisioningJob) {
            let _ = self.tx.send(job);
        }
    }
}

#[cfg(test)]
mod register_tests {
    use std::sync::Arc;
    use std::sync::atomic::Ordering;
    use std::time::Duration;

    use platform::password::{ClearTextPassword, HashedPassword, PasswordParams};
    use platform::queue::{JobQueue, QueueConfig};
    use rust_decimal::Decimal;
    use tokio::sync::mpsc;

    use super::support::{InMemoryAccounts, RecordingProvisioner};
    use crate::application::config::AccountConfig;
    use crate::application::register::{ProvisioningStatus, RegisterInput, RegisterUseCase};
    use crate::domain::entity::account::Account;
    use crate::error::AccountError;

    const ORIGIN: &str = "203.0.113.10";

    fn config() -> Arc<AccountConfig> {
        Arc::new(AccountConfig {
            password_params: PasswordParams::minimal(),
            signup_bonus: Decimal::new(20, 0),
            ..AccountConfig::with_random_secret()
        })
    }

    fn input(phone: &str, referral: &str) -> RegisterInput {
        RegisterInput {
            phone: phone.to_string(),
            dial_code: "+91".to_string(),
            password: "secret123".to_string(),
            referral_code: referral.to_string(),
            privileged: false,
            allowed_tabs: None,
            origin: ORIGIN.to_string(),
        }
    }

    fn setup() -> (Arc<InMemoryAccounts>, Account, RegisterUseCase<InMemoryAccounts>) {
        let repo = Arc::new(InMemoryAccounts::default());
        let referrer = repo.seed("9000000000", "1", "198.51.100.1");
        let use_case = RegisterUseCase::new(repo.clone(), config(), None);
        (repo, referrer, use_case)
    }

    #[tokio::test]
    async fn test_register_persists_account_and_side_rows() {
        let (repo, referrer, use_case) = setup();

        let output = use_case
            .execute(input("9876543210", referrer.referral_code.as_str()))
            .await
            .unwrap();

        let account = &output.account;
        assert_eq!(account.phone.as_str(), "9876543210");
        assert_eq!(account.invited_by, referrer.referral_code);
        assert_eq!(account.bonus_balance, Decimal::new(20, 0));
        assert_eq!(account.balance, Decimal::ZERO);
        assert_eq!(output.provisioning, ProvisioningStatus::Disabled);

        let tables = repo.tables.lock().unwrap();
        assert_eq!(tables.accounts.len(), 2);
        assert_eq!(tables.point_list, vec![account.identity_code.value()]);
        assert_eq!(
            tables.turn_over,
            vec![(
                account.identity_code.value(),
                account.referral_code.as_str().to_string(),
                referrer.referral_code.as_str().to_string(),
            )]
        );

        let stored = tables
            .accounts
            .iter()
            .find(|s| s.account.identity_code == account.identity_code)
            .unwrap();
        assert_eq!(stored.session_digest, output.session.digest);
        assert!(!stored.password_hash.contains("secret123"));
        let hash = HashedPassword::from_phc_string(stored.password_hash.clone()).unwrap();
        assert!(hash.verify(&ClearTextPassword::new("secret123".to_string()).unwrap()));
    }

    #[tokio::test]
    async fn test_duplicate_phone_creates_nothing() {
        let (repo, referrer, use_case) = setup();

        let result = use_case
            .execute(input("9000000000", referrer.referral_code.as_str()))
            .await;

        assert!(matches!(result, Err(AccountError::DuplicatePhone)));
        assert_eq!(repo.account_count(), 1);
        assert!(repo.tables.lock().unwrap().point_list.is_empty());
    }

    #[tokio::test]
    async fn test_same_phone_other_dial_code_is_allowed() {
        let (repo, referrer, use_case) = setup();

        let mut request = input("9000000000", referrer.referral_code.as_str());
        request.dial_code = "+1".to_string();

        assert!(use_case.execute(request).await.is_ok());
        assert_eq!(repo.account_count(), 2);
    }

    #[tokio::test]
    async fn test_unknown_referrer_creates_nothing() {
        let (repo, _, use_case) = setup();

        let result = use_case.execute(input("9876543210", "55555")).await;

        assert!(matches!(result, Err(AccountError::InvalidReferrer)));
        assert_eq!(repo.account_count(), 1);
        assert!(repo.tables.lock().unwrap().turn_over.is_empty());
    }

    #[tokio::test]
    async fn test_validation_happens_before_storage() {
        let (repo, referrer, use_case) = setup();
        let code = referrer.referral_code.as_str().to_string();

        let cases = [
            input("12345", &code),
            RegisterInput {
                dial_code: "91".into(),
                ..input("9876543210", &code)
            },
            RegisterInput {
                password: "abc".into(),
                ..input("9876543210", &code)
            },
            input("9876543210", "not-a-code"),
        ];

        for case in cases {
            let result = use_case.execute(case).await;
            assert!(matches!(result, Err(AccountError::Validation(_))));
        }
        assert_eq!(repo.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_origin_limit() {
        let (repo, referrer, use_case) = setup();
        let code = referrer.referral_code.as_str().to_string();

        // Three existing accounts from the origin: the fourth is still allowed
        for i in 0..3 {
            repo.seed(&format!("911111111{i}"), "1", ORIGIN);
        }
        assert!(use_case.execute(input("9222222220", &code)).await.is_ok());

        // Now the origin owns four
        let result = use_case.execute(input("9222222221", &code)).await;
        assert!(matches!(result, Err(AccountError::TooManyAccountsFromOrigin)));
        assert_eq!(repo.account_count(), 5);
    }

    #[tokio::test]
    async fn test_privileged_bypasses_origin_limit() {
        let (repo, referrer, use_case) = setup();
        for i in 0..4 {
            repo.seed(&format!("911111111{i}"), "1", ORIGIN);
        }

        let request = RegisterInput {
            privileged: true,
            allowed_tabs: Some("deposits,withdrawals".into()),
            ..input("9333333333", referrer.referral_code.as_str())
        };
        let output = use_case.execute(request).await.unwrap();

        assert_eq!(output.account.display_name, "Admin");
        assert!(output.account.privileged);
        assert_eq!(output.account.allowed_tabs.as_deref(), Some("deposits,withdrawals"));
    }

    #[tokio::test]
    async fn test_allowed_tabs_ignored_without_privilege() {
        let (_, referrer, use_case) = setup();

        let request = RegisterInput {
            allowed_tabs: Some("everything".into()),
            ..input("9333333333", referrer.referral_code.as_str())
        };
        let output = use_case.execute(request).await.unwrap();

        assert!(!output.account.privileged);
        assert!(output.account.allowed_tabs.is_none());
        assert!(output.account.display_name.starts_with("Member"));
    }

    #[tokio::test]
    async fn test_identity_exhausted_after_attempt_budget() {
        let (repo, referrer, use_case) = setup();
        repo.identity_always_taken.store(true, Ordering::SeqCst);

        let result = use_case
            .execute(input("9876543210", referrer.referral_code.as_str()))
            .await;

        assert!(matches!(result, Err(AccountError::IdentityExhausted)));
        assert_eq!(
            repo.identity_checks.load(Ordering::SeqCst),
            AccountConfig::default().identity_attempts as usize
        );
        assert_eq!(repo.account_count(), 1);
    }

    #[tokio::test]
    async fn test_insert_collision_retries_identity() {
        let (repo, referrer, use_case) = setup();
        repo.insert_collisions.store(2, Ordering::SeqCst);

        let output = use_case
            .execute(input("9876543210", referrer.referral_code.as_str()))
            .await
            .unwrap();

        assert_eq!(repo.identity_checks.load(Ordering::SeqCst), 3);
        assert!(repo.get(output.account.identity_code).is_some());
    }

    #[tokio::test]
    async fn test_tier_boundaries() {
        let (repo, referrer, use_case) = setup();
        let code = referrer.referral_code.as_str().to_string();

        for i in 0..4 {
            use_case
                .execute(RegisterInput {
                    origin: format!("10.0.0.{i}"),
                    ..input(&format!("944444444{i}"), &code)
                })
                .await
                .unwrap();
        }
        assert_eq!(repo.get(referrer.identity_code).unwrap().tier_level.value(), 1);

        use_case
            .execute(RegisterInput {
                origin: "10.0.0.9".into(),
                ..input("9444444449", &code)
            })
            .await
            .unwrap();
        assert_eq!(repo.get(referrer.identity_code).unwrap().tier_level.value(), 2);
    }

    #[tokio::test]
    async fn test_tier_never_decreases() {
        let (repo, referrer, use_case) = setup();
        repo.set_tier(&referrer.referral_code, 6);

        use_case
            .execute(input("9876543210", referrer.referral_code.as_str()))
            .await
            .unwrap();

        assert_eq!(repo.get(referrer.identity_code).unwrap().tier_level.value(), 6);
    }

    #[tokio::test]
    async fn test_attribution_flattening() {
        let (repo, referrer, use_case) = setup();

        // Tier 1 referrer: the new account inherits the referrer's attribution
        repo.set_tier(&referrer.referral_code, 1);
        repo.update(referrer.identity_code, |a| {
            a.attribution = Some("9555555555".into())
        });
        let inherited = use_case
            .execute(input("9876543210", referrer.referral_code.as_str()))
            .await
            .unwrap();
        assert_eq!(inherited.account.attribution.as_deref(), Some("9555555555"));

        // Tier 2 referrer owns the attribution
        repo.set_tier(&referrer.referral_code, 2);
        let owned = use_case
            .execute(RegisterInput {
                origin: "10.1.1.1".into(),
                ..input("9876543211", referrer.referral_code.as_str())
            })
            .await
            .unwrap();
        assert_eq!(owned.account.attribution.as_deref(), Some("9000000000"));
    }

    #[tokio::test]
    async fn test_provisioning_job_is_queued() {
        let repo = Arc::new(InMemoryAccounts::default());
        let referrer = repo.seed("9000000000", "1", "198.51.100.1");

        let (tx, mut rx) = mpsc::unbounded_channel();
        let queue = JobQueue::start(
            "provisioning-test",
            QueueConfig::default(),
            RecordingProvisioner { tx },
        );
        let use_case = RegisterUseCase::new(repo.clone(), config(), Some(queue));

        let output = use_case
            .execute(input("9876543210", referrer.referral_code.as_str()))
            .await
            .unwrap();
        assert_eq!(output.provisioning, ProvisioningStatus::Queued);

        let job = tokio::time::timeout(Duration::from_secs(2), rx.recv())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(job.account, "9876543210");
        assert_eq!(job.username, output.account.display_name);
        assert_eq!(job.origin, ORIGIN);
    }
}

#[cfg(test)]
mod session_tests {
    use std::sync::Arc;

    use chrono::Utc;
    use platform::password::PasswordParams;

    use super::support::InMemoryAccounts;
    use crate::application::check_session::CheckSessionUseCase;
    use crate::application::config::AccountConfig;
    use crate::application::register::{RegisterInput, RegisterUseCase};
    use crate::domain::value_object::account_status::AccountStatus;
    use crate::error::AccountError;

    async fn registered() -> (Arc<InMemoryAccounts>, Arc<AccountConfig>, String, i64) {
        let repo = Arc::new(InMemoryAccounts::default());
        let referrer = repo.seed("9000000000", "1", "198.51.100.1");
        let config = Arc::new(AccountConfig {
            password_params: PasswordParams::minimal(),
            ..AccountConfig::with_random_secret()
        });

        let output = RegisterUseCase::new(repo.clone(), config.clone(), None)
            .execute(RegisterInput {
                phone: "9876543210".into(),
                dial_code: "+91".into(),
                password: "secret123".into(),
                referral_code: referrer.referral_code.as_str().to_string(),
                privileged: false,
                allowed_tabs: None,
                origin: "203.0.113.10".into(),
            })
            .await
            .unwrap();

        (
            repo,
            config,
            output.session.token,
            output.account.identity_code.value(),
        )
    }

    #[tokio::test]
    async fn test_session_resolves_account() {
        let (repo, config, token, identity) = registered().await;

        let account = CheckSessionUseCase::new(repo, config)
            .execute(&token)
            .await
            .unwrap();

        assert_eq!(account.identity_code.value(), identity);
        assert_eq!(account.phone.as_str(), "9876543210");
    }

    #[tokio::test]
    async fn test_session_rejects_tampered_token() {
        let (repo, config, token, _) = registered().await;
        let mut forged = token.clone();
        forged.push('A');

        let result = CheckSessionUseCase::new(repo, config).execute(&forged).await;
        assert!(matches!(result, Err(AccountError::SessionInvalid)));
    }

    #[tokio::test]
    async fn test_session_rejects_expired_token() {
        let (repo, config, token, _) = registered().await;
        let later = Utc::now() + chrono::Duration::days(2);

        let result = CheckSessionUseCase::new(repo, config)
            .execute_at(&token, later)
            .await;
        assert!(matches!(result, Err(AccountError::SessionInvalid)));
    }

    #[tokio::test]
    async fn test_session_rejects_locked_account() {
        let (repo, config, token, identity) = registered().await;
        let identity = crate::domain::value_object::identity_code::IdentityCode::from_i64(identity)
            .unwrap();
        repo.update(identity, |a| a.status = AccountStatus::Locked);

        let result = CheckSessionUseCase::new(repo, config).execute(&token).await;
        assert!(matches!(result, Err(AccountError::SessionInvalid)));
    }

    #[tokio::test]
    async fn test_session_rejects_token_from_other_secret() {
        let (repo, _, token, _) = registered().await;
        let other = Arc::new(AccountConfig::with_random_secret());

        let result = CheckSessionUseCase::new(repo, other).execute(&token).await;
        assert!(matches!(result, Err(AccountError::SessionInvalid)));
    }
}

#[cfg(test)]
mod router_tests {
    use std::net::{IpAddr, SocketAddr};
    use std::sync::Arc;
    use std::sync::atomic::Ordering;
    use std::time::Duration;

    use axum::Router;
    use axum::body::{Body, to_bytes};
    use axum::extract::connect_info::MockConnectInfo;
    use axum::http::{Request, StatusCode, header};
    use platform::password::{HashedPassword, PasswordParams};
    use platform::queue::{JobQueue, QueueConfig};
    use serde_json::{Value, json};
    use tokio::sync::mpsc;
    use tower::ServiceExt;

    use super::support::{InMemoryAccounts, RecordingProvisioner};
    use crate::application::config::AccountConfig;
    use crate::domain::entity::account::Account;
    use crate::domain::repository::AccountRepository;
    use crate::domain::value_object::{
        identity_code::IdentityCode,
        phone::{DialCode, PhoneNumber},
        referral_code::ReferralCode,
        tier_level::TierLevel,
    };
    use crate::error::AccountResult;
    use crate::presentation::handlers::ADMIN_TOKEN_HEADER;
    use crate::presentation::router::account_router_generic;

    const CLIENT: [u8; 4] = [203, 0, 113, 9];
    const PROXY: [u8; 4] = [10, 0, 0, 1];

    #[derive(Clone)]
    struct SharedAccounts(Arc<InMemoryAccounts>);

    impl AccountRepository for SharedAccounts {
        async fn exists_by_phone(
            &self,
            phone: &PhoneNumber,
            dial_code: &DialCode,
        ) -> AccountResult<bool> {
            self.0.exists_by_phone(phone, dial_code).await
        }

        async fn find_by_referral_code(
            &self,
            code: &ReferralCode,
        ) -> AccountResult<Option<Account>> {
            self.0.find_by_referral_code(code).await
        }

        async fn count_by_origin(&self, origin: &str) -> AccountResult<u64> {
            self.0.count_by_origin(origin).await
        }

        async fn exists_by_identity_code(&self, code: IdentityCode) -> AccountResult<bool> {
            self.0.exists_by_identity_code(code).await
        }

        async fn create(
            &self,
            account: &Account,
            password: &HashedPassword,
            session_digest: &str,
        ) -> AccountResult<()> {
            self.0.create(account, password, session_digest).await
        }

        async fn refresh_tier(&self, code: &ReferralCode) -> AccountResult<TierLevel> {
            self.0.refresh_tier(code).await
        }

        async fn find_by_session_digest(&self, digest: &str) -> AccountResult<Option<Account>> {
            self.0.find_by_session_digest(digest).await
        }
    }

    fn config() -> AccountConfig {
        AccountConfig {
            password_params: PasswordParams::minimal(),
            ..AccountConfig::with_random_secret()
        }
    }

    /// Repository with one referrer, and the referrer's code
    fn seeded() -> (Arc<InMemoryAccounts>, String) {
        let repo = Arc::new(InMemoryAccounts::default());
        let referrer = repo.seed("9000000000", "1", "198.51.100.1");
        (repo, referrer.referral_code.as_str().to_string())
    }

    fn app(
        repo: &Arc<InMemoryAccounts>,
        config: AccountConfig,
        peer: [u8; 4],
        provisioning: Option<JobQueue<partner::ProvisioningJob>>,
    ) -> Router {
        account_router_generic(SharedAccounts(repo.clone()), config, provisioning)
            .layer(MockConnectInfo(SocketAddr::from((peer, 40_000))))
    }

    fn body(phone: &str, invite: &str) -> Value {
        json!({
            "phoneNumber": phone,
            "pwd": "secret123",
            "invitecode": invite,
            "dialCode": "+91",
        })
    }

    async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    async fn post(app: &Router, payload: Value, headers: &[(&str, &str)]) -> (StatusCode, Value) {
        let mut request =
            Request::post("/register").header(header::CONTENT_TYPE, "application/json");
        for (name, value) in headers {
            request = request.header(*name, *value);
        }
        send(app, request.body(Body::from(payload.to_string())).unwrap()).await
    }

    #[tokio::test]
    async fn test_register_response_and_session_lookup() {
        let (repo, invite) = seeded();
        let app = app(&repo, config(), CLIENT, None);

        let (status, json) = post(&app, body("9876543210", &invite), &[]).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["status"], true);
        assert_eq!(json["message"], "Registered successfully");
        assert_eq!(json["provisioning"], "disabled");
        let identity = json["identityCode"].as_i64().unwrap();
        assert!((1_000_000..=9_999_999).contains(&identity));
        let token = json["token"].as_str().unwrap().to_string();

        let stored = repo.get(IdentityCode::from_i64(identity).unwrap()).unwrap();
        assert_eq!(stored.origin, "203.0.113.9");

        let (status, json) = send(
            &app,
            Request::get("/session")
                .header(header::AUTHORIZATION, format!("Bearer {token}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["identityCode"], identity);
        assert_eq!(json["phone"], "9876543210");
    }

    #[tokio::test]
    async fn test_session_without_bearer_is_401() {
        let (repo, _) = seeded();
        let app = app(&repo, config(), CLIENT, None);

        let (status, json) =
            send(&app, Request::get("/session").body(Body::empty()).unwrap()).await;

        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(json["code"], "SESSION_INVALID");
    }

    #[tokio::test]
    async fn test_forwarded_for_from_untrusted_peer_cannot_reset_origin_quota() {
        let (repo, invite) = seeded();
        let app = app(&repo, config(), CLIENT, None);

        let mut statuses = Vec::new();
        for i in 1..=5 {
            let forwarded = format!("10.9.9.{i}");
            let (status, json) = post(
                &app,
                body(&format!("98765432{i:02}"), &invite),
                &[("x-forwarded-for", forwarded.as_str())],
            )
            .await;
            statuses.push((status, json));
        }

        for (status, _) in &statuses[..4] {
            assert_eq!(*status, StatusCode::OK);
        }
        let (status, json) = &statuses[4];
        assert_eq!(*status, StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(json["code"], "TOO_MANY_ACCOUNTS_FROM_ORIGIN");
        assert_eq!(repo.account_count(), 5);
    }

    #[tokio::test]
    async fn test_trusted_proxy_reports_each_client() {
        let (repo, invite) = seeded();
        let config = AccountConfig {
            trusted_proxies: vec![IpAddr::from(PROXY)],
            ..config()
        };
        let app = app(&repo, config, PROXY, None);

        for i in 1..=5 {
            let forwarded = format!("198.51.100.{}", 10 + i);
            let (status, json) = post(
                &app,
                body(&format!("98765432{i:02}"), &invite),
                &[("x-forwarded-for", forwarded.as_str())],
            )
            .await;
            assert_eq!(status, StatusCode::OK);

            let identity = IdentityCode::from_i64(json["identityCode"].as_i64().unwrap()).unwrap();
            assert_eq!(repo.get(identity).unwrap().origin, forwarded);
        }
    }

    #[tokio::test]
    async fn test_privileged_registration_needs_admin_token() {
        let (repo, invite) = seeded();
        let config = AccountConfig {
            admin_registration_token: Some("root-token".into()),
            ..config()
        };
        let app = app(&repo, config, CLIENT, None);
        let mut privileged = body("9876543210", &invite);
        privileged["allowedTabs"] = json!("reports,payouts");

        let (status, json) = post(&app, privileged.clone(), &[]).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(json["code"], "PRIVILEGE_DENIED");

        let (status, _) = post(&app, privileged.clone(), &[(ADMIN_TOKEN_HEADER, "guess")]).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(repo.account_count(), 1);

        let (status, json) =
            post(&app, privileged, &[(ADMIN_TOKEN_HEADER, "root-token")]).await;
        assert_eq!(status, StatusCode::OK);

        let identity = IdentityCode::from_i64(json["identityCode"].as_i64().unwrap()).unwrap();
        let stored = repo.get(identity).unwrap();
        assert!(stored.privileged);
        assert_eq!(stored.allowed_tabs.as_deref(), Some("reports,payouts"));
    }

    #[tokio::test]
    async fn test_privileged_registration_disabled_without_configured_token() {
        let (repo, invite) = seeded();
        let app = app(&repo, config(), CLIENT, None);
        let mut privileged = body("9876543210", &invite);
        privileged["allowedTabs"] = json!("reports");

        let (status, json) = post(&app, privileged, &[(ADMIN_TOKEN_HEADER, "anything")]).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(json["code"], "PRIVILEGE_DENIED");
    }

    #[tokio::test]
    async fn test_rejections_map_to_status_and_code() {
        let (repo, invite) = seeded();
        let app = app(&repo, config(), CLIENT, None);

        let (status, json) = post(&app, body("9000000000", &invite), &[]).await;
        assert_eq!(status, StatusCode::CONFLICT);
        assert_eq!(json["code"], "DUPLICATE_PHONE");
        assert_eq!(json["status"], false);

        let (status, json) = post(&app, body("9876543210", "99999"), &[]).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(json["code"], "INVALID_REFERRER");

        let (status, json) = post(&app, body("12345", &invite), &[]).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["code"], "VALIDATION_ERROR");

        repo.identity_always_taken.store(true, Ordering::SeqCst);
        let (status, json) = post(&app, body("9876543210", &invite), &[]).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(json["code"], "IDENTITY_EXHAUSTED");

        assert_eq!(repo.account_count(), 1);
    }

    #[tokio::test]
    async fn test_queued_provisioning_is_reported() {
        let (repo, invite) = seeded();
        let (tx, mut rx) = mpsc::unbounded_channel();
        let queue = JobQueue::start(
            "provisioning-router-test",
            QueueConfig::default(),
            RecordingProvisioner { tx },
        );
        let app = app(&repo, config(), CLIENT, Some(queue));

        let (status, json) = post(&app, body("9876543210", &invite), &[]).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["provisioning"], "queued");

        let job = tokio::time::timeout(Duration::from_secs(2), rx.recv())
            .await
            .unwrap()
            .unwrap();
        assert_eq!(job.account, "9876543210");
        assert_eq!(job.origin, "203.0.113.9");
    }
}
