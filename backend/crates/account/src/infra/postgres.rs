//! PostgreSQL Repository Implementation

use chrono::{DateTime, Utc};
use platform::password::HashedPassword;
use rust_decimal::Decimal;
use sqlx::PgPool;

use crate::domain::entity::account::Account;
use crate::domain::repository::AccountRepository;
use crate::domain::value_object::{
    account_status::AccountStatus,
    identity_code::IdentityCode,
    phone::{DialCode, PhoneNumber},
    referral_code::ReferralCode,
    tier_level::TierLevel,
};
use crate::error::{AccountError, AccountResult};

const PHONE_CONSTRAINT: &str = "accounts_phone_dial_code_key";
const IDENTITY_CONSTRAINTS: [&str; 2] = ["accounts_pkey", "accounts_referral_code_key"];

const ACCOUNT_COLUMNS: &str = r#"
    identity_code,
    phone,
    dial_code,
    display_name,
    referral_code,
    invited_by,
    attribution,
    tier_level,
    balance,
    bonus_balance,
    total_deposit,
    status,
    privileged,
    allowed_tabs,
    origin,
    created_at
"#;

/// PostgreSQL-backed account repository
#[derive(Clone)]
pub struct PgAccountRepository {
    pool: PgPool,
}

impl PgAccountRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn find_one(&self, predicate: &str, value: &str) -> AccountResult<Option<Account>> {
        let sql = format!("SELECT {ACCOUNT_COLUMNS} FROM accounts WHERE {predicate} = $1");
        let row = sqlx::query_as::<_, AccountRow>(&sql)
            .bind(value)
            .fetch_optional(&self.pool)
            .await?;

        row.map(|r| r.into_account()).transpose()
    }
}

/// Classify a unique violation on insert
fn map_insert_error(err: sqlx::Error) -> AccountError {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.is_unique_violation() {
            match db_err.constraint() {
                Some(PHONE_CONSTRAINT) => return AccountError::DuplicatePhone,
                Some(name) if IDENTITY_CONSTRAINTS.contains(&name) => {
                    return AccountError::IdentityTaken;
                }
                _ => {}
            }
        }
    }
    AccountError::Database(err)
}

impl AccountRepository for PgAccountRepository {
    async fn exists_by_phone(
        &self,
        phone: &PhoneNumber,
        dial_code: &DialCode,
    ) -> AccountResult<bool> {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM accounts WHERE phone = $1 AND dial_code = $2)",
        )
        .bind(phone.as_str())
        .bind(dial_code.as_str())
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }

    async fn find_by_referral_code(&self, code: &ReferralCode) -> AccountResult<Option<Account>> {
        self.find_one("referral_code", code.as_str()).await
    }

    async fn count_by_origin(&self, origin: &str) -> AccountResult<u64> {
        let count = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM accounts WHERE origin = $1")
            .bind(origin)
            .fetch_one(&self.pool)
            .await?;

        Ok(count.max(0) as u64)
    }

    async fn exists_by_identity_code(&self, code: IdentityCode) -> AccountResult<bool> {
        let exists = sqlx::query_scalar::<_, bool>(
            "SELECT EXISTS(SELECT 1 FROM accounts WHERE identity_code = $1)",
        )
        .bind(code.value())
        .fetch_one(&self.pool)
        .await?;

        Ok(exists)
    }

    async fn create(
        &self,
        account: &Account,
        password: &HashedPassword,
        session_digest: &str,
    ) -> AccountResult<()> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO accounts (
                identity_code,
                phone,
                dial_code,
                display_name,
                password_hash,
                referral_code,
                invited_by,
                attribution,
                tier_level,
                balance,
                bonus_balance,
                total_deposit,
                status,
                privileged,
                allowed_tabs,
                origin,
                session_digest,
                created_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15, $16, $17, $18)
            "#,
        )
        .bind(account.identity_code.value())
        .bind(account.phone.as_str())
        .bind(account.dial_code.as_str())
        .bind(&account.display_name)
        .bind(password.as_phc_string())
        .bind(account.referral_code.as_str())
        .bind(account.invited_by.as_str())
        .bind(account.attribution.as_deref())
        .bind(account.tier_level.value())
        .bind(account.balance)
        .bind(account.bonus_balance)
        .bind(account.total_deposit)
        .bind(account.status.id())
        .bind(account.privileged)
        .bind(account.allowed_tabs.as_deref())
        .bind(&account.origin)
        .bind(session_digest)
        .bind(account.created_at)
        .execute(&mut *tx)
        .await
        .map_err(map_insert_error)?;

        sqlx::query("INSERT INTO point_list (identity_code, phone) VALUES ($1, $2)")
            .bind(account.identity_code.value())
            .bind(account.phone.as_str())
            .execute(&mut *tx)
            .await?;

        sqlx::query(
            "INSERT INTO turn_over (identity_code, phone, code, invite) VALUES ($1, $2, $3, $4)",
        )
        .bind(account.identity_code.value())
        .bind(account.phone.as_str())
        .bind(account.referral_code.as_str())
        .bind(account.invited_by.as_str())
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(())
    }

    async fn refresh_tier(&self, code: &ReferralCode) -> AccountResult<TierLevel> {
        let mut tx = self.pool.begin().await?;

        // Serializes recomputes for the same referrer
        let locked = sqlx::query_scalar::<_, i64>(
            "SELECT identity_code FROM accounts WHERE referral_code = $1 FOR UPDATE",
        )
        .bind(code.as_str())
        .fetch_optional(&mut *tx)
        .await?;

        let Some(identity_code) = locked else {
            return Err(AccountError::InvalidReferrer);
        };

        let referees =
            sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM accounts WHERE invited_by = $1")
                .bind(code.as_str())
                .fetch_one(&mut *tx)
                .await?;
        let computed = TierLevel::for_referee_count(referees.max(0) as u64);

        let stored = sqlx::query_scalar::<_, i16>(
            r#"
            UPDATE accounts
            SET tier_level = GREATEST(tier_level, $2)
            WHERE identity_code = $1
            RETURNING tier_level
            "#,
        )
        .bind(identity_code)
        .bind(computed.value())
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;

        Ok(TierLevel::from_db(stored))
    }

    async fn find_by_session_digest(&self, digest: &str) -> AccountResult<Option<Account>> {
        self.find_one("session_digest", digest).await
    }
}

// ============================================================================
// Row Types
// ============================================================================

#[derive(sqlx::FromRow)]
struct AccountRow {
    identity_code: i64,
    phone: String,
    dial_code: String,
    display_name: String,
    referral_code: String,
    invited_by: String,
    attribution: Option<String>,
    tier_level: i16,
    balance: Decimal,
    bonus_balance: Decimal,
    total_deposit: Decimal,
    status: i16,
    privileged: bool,
    allowed_tabs: Option<String>,
    origin: String,
    created_at: DateTime<Utc>,
}

impl AccountRow {
    fn into_account(self) -> AccountResult<Account> {
        let identity_code = IdentityCode::from_i64(self.identity_code).ok_or_else(|| {
            AccountError::Internal(format!("Invalid identity code in DB: {}", self.identity_code))
        })?;

        Ok(Account {
            identity_code,
            phone: PhoneNumber::from_db(self.phone),
            dial_code: DialCode::from_db(self.dial_code),
            display_name: self.display_name,
            referral_code: ReferralCode::from_db(self.referral_code),
            invited_by: ReferralCode::from_db(self.invited_by),
            attribution: self.attribution,
            tier_level: TierLevel::from_db(self.tier_level),
            balance: self.balance,
            bonus_balance: self.bonus_balance,
            total_deposit: self.total_deposit,
            status: AccountStatus::from_id(self.status),
            privileged: self.privileged,
            allowed_tabs: self.allowed_tabs,
            origin: self.origin,
            created_at: self.created_at,
        })
    }
}
