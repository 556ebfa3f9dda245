use std::sync::Arc;

use chrono::{SubsecRound, Utc};
use tracing::{debug, info, instrument, warn};

use crate::application::validation::{is_blank, is_valid_email};
use crate::domain::{Account, AccountError, AccountGraph, Credentials, NewAccount, Token};
use crate::infrastructure::auth::TokenIssuer;
use crate::infrastructure::repository::{AccountStore, DepartmentStore, ProfessionStore};

const INVALID_CREDENTIALS: &str = "invalid email or password";

/// Account creation and login over the injected stores and token issuer.
#[derive(Clone)]
pub struct AccountService {
    accounts: Arc<dyn AccountStore>,
    departments: Arc<dyn DepartmentStore>,
    professions: Arc<dyn ProfessionStore>,
    tokens: Arc<dyn TokenIssuer>,
}

impl AccountService {
    /// Creates a new `AccountService`.
    ///
    /// # Arguments
    ///
    /// * `accounts`: Account persistence. `create` must commit the whole graph atomically.
    /// * `departments`: Lookup of departments referenced by new members.
    /// * `professions`: Lookup of professions referenced by new members.
    /// * `tokens`: Issues the authentication token returned on login.
    pub fn new(
        accounts: Arc<dyn AccountStore>,
        departments: Arc<dyn DepartmentStore>,
        professions: Arc<dyn ProfessionStore>,
        tokens: Arc<dyn TokenIssuer>,
    ) -> Self {
        Self {
            accounts,
            departments,
            professions,
            tokens,
        }
    }

    /// Creates an account together with its member, and registers the member
    /// in every department and profession it references.
    ///
    /// Validation fails fast on the first violation. Nothing is written unless
    /// every check and every lookup succeeds; the single `AccountStore::create`
    /// call is responsible for committing the graph atomically.
    ///
    /// Callers decoding a request body pass `None` when the body is missing.
    #[instrument(skip_all)]
    pub async fn create_account(&self, account: Option<NewAccount>) -> Result<Account, AccountError> {
        let account = account
            .ok_or_else(|| AccountError::AccountInvalid("account must not be null".to_string()))?;

        if is_blank(account.password.as_deref()) {
            return Err(AccountError::AccountInvalid(
                "password must not be null or blank".to_string(),
            ));
        }
        let email = Self::validate_email(account.email.as_deref())?;

        let exists = self.accounts.exists(email).await.map_err(|e| {
            warn!("Existence check failed for {}: {}", email, e);
            e
        })?;
        if exists {
            return Err(AccountError::AccountAlreadyExists(email.to_string()));
        }

        let new_member = account
            .member
            .ok_or_else(|| AccountError::MemberInvalid("member must not be null".to_string()))?;
        let member = new_member.into_member();

        let mut graph = AccountGraph::new(Account {
            email: email.to_string(),
            password: account.password.unwrap_or_default(),
            // Stores keep microsecond precision.
            created_at: Utc::now().trunc_subsecs(6),
            member,
        });
        let member_id = graph.account.member.id;

        for &number in &graph.account.member.department_numbers {
            self.departments
                .find_by_number(number)
                .await
                .map_err(|e| {
                    warn!("Department lookup {} failed: {}", number, e);
                    e
                })?
                .ok_or(AccountError::DepartmentNotFound(number))?;
            graph.department_memberships.insert((number, member_id));
        }

        for &id in &graph.account.member.profession_ids {
            self.professions
                .find_by_id(id)
                .await
                .map_err(|e| {
                    warn!("Profession lookup {} failed: {}", id, e);
                    e
                })?
                .ok_or(AccountError::ProfessionNotFound(id))?;
            graph.profession_memberships.insert((id, member_id));
        }

        self.accounts.create(&graph).await.map_err(|e| {
            warn!("Failed to persist account {}: {}", graph.account.email, e);
            e
        })?;

        info!(
            "Created account {} for member {} ({} departments, {} professions)",
            graph.account.email,
            member_id,
            graph.department_memberships.len(),
            graph.profession_memberships.len()
        );

        Ok(graph.account)
    }

    /// Checks the credentials against the stored account and issues a token
    /// for its member. Wrong email and wrong password are reported identically.
    #[instrument(skip_all, fields(email = %credentials.email))]
    pub async fn login(&self, credentials: &Credentials) -> Result<Token, AccountError> {
        let reference = self
            .accounts
            .find_by_email(&credentials.email)
            .await
            .map_err(|e| {
                warn!("Account lookup for {} failed: {}", credentials.email, e);
                e
            })?
            .ok_or_else(|| AccountError::AccountNotFound(credentials.email.clone()))?;

        if reference.password != credentials.password || reference.email != credentials.email {
            info!("Rejected login for {}", credentials.email);
            return Err(AccountError::AccountInvalid(INVALID_CREDENTIALS.to_string()));
        }

        let member = reference.member;
        let token = self.tokens.issue_token(&member).await.map_err(|e| {
            warn!("Token issuance for member {} failed: {}", member.id, e);
            e
        })?;
        debug!("Issued token for member {}", member.id);

        Ok(Token {
            member_id: member.id,
            first_name: member.first_name,
            token,
        })
    }

    fn validate_email(email: Option<&str>) -> Result<&str, AccountError> {
        let email = match email {
            Some(e) if !is_blank(Some(e)) => e,
            _ => return Err(AccountError::EmailInvalid("email must not be empty".to_string())),
        };

        if !is_valid_email(email) {
            return Err(AccountError::EmailInvalid(
                "a valid email address is required".to_string(),
            ));
        }
        Ok(email)
    }
}
