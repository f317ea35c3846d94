//! Account opening: request validation and construction

use bigdecimal::BigDecimal;
use chrono::Months;
use uuid::Uuid;

use crate::ledger::account::{Account, AccountKind, AccountType};
use crate::traits::{AuditAction, AuditEvent, AuditSink, AuditStatus, AuditTarget, LedgerStore};
use crate::types::{Customer, LedgerError, LedgerResult};
use crate::utils::validation::validate_amount;

/// Generate an account identifier as `<type-prefix>_<token>`
///
/// The v4 token carries 122 bits of randomness, making collisions
/// negligible.
pub fn generate_account_id(account_type: AccountType) -> String {
    format!("{}_{}", account_type.prefix(), Uuid::new_v4().simple())
}

/// Parameters for opening an account
///
/// Consuming builder; only the fields the requested type needs are read.
#[derive(Debug, Clone)]
pub struct OpeningRequest {
    account_type: AccountType,
    initial_deposit: Option<BigDecimal>,
    employer: Option<String>,
    employer_address: Option<String>,
    term_months: Option<u32>,
    branch: Option<String>,
}

impl OpeningRequest {
    pub fn new(account_type: AccountType) -> Self {
        Self {
            account_type,
            initial_deposit: None,
            employer: None,
            employer_address: None,
            term_months: None,
            branch: None,
        }
    }

    /// Build a request from a raw type tag (case-insensitive, aliases accepted)
    pub fn for_tag(tag: &str) -> LedgerResult<Self> {
        Ok(Self::new(tag.parse()?))
    }

    pub fn initial_deposit(mut self, amount: BigDecimal) -> Self {
        self.initial_deposit = Some(amount);
        self
    }

    /// Employer details, required for Cheque accounts
    pub fn employer(mut self, name: impl Into<String>, address: impl Into<String>) -> Self {
        self.employer = Some(name.into());
        self.employer_address = Some(address.into());
        self
    }

    /// Term length, required for Certificates of Deposit
    pub fn term_months(mut self, months: u32) -> Self {
        self.term_months = Some(months);
        self
    }

    pub fn branch(mut self, branch: impl Into<String>) -> Self {
        self.branch = Some(branch.into());
        self
    }

    pub fn account_type(&self) -> AccountType {
        self.account_type
    }

    /// Resolve the variant state, checking type-specific required fields
    fn build_kind(&self) -> LedgerResult<AccountKind> {
        match self.account_type {
            AccountType::Savings => Ok(AccountKind::Savings),
            AccountType::Investment => Ok(AccountKind::Investment),
            AccountType::Cheque => {
                let employer = self
                    .employer
                    .as_deref()
                    .map(str::trim)
                    .filter(|name| !name.is_empty())
                    .ok_or(LedgerError::MissingRequiredField("employer name"))?;
                let address = self
                    .employer_address
                    .as_deref()
                    .map(str::trim)
                    .filter(|address| !address.is_empty())
                    .ok_or(LedgerError::MissingRequiredField("employer address"))?;
                Ok(AccountKind::Cheque {
                    employer: employer.to_string(),
                    employer_address: address.to_string(),
                })
            }
            AccountType::MoneyMarket => Ok(AccountKind::MoneyMarket {
                withdrawals_this_month: 0,
            }),
            AccountType::CertificateOfDeposit => {
                let term_months = self
                    .term_months
                    .ok_or(LedgerError::MissingRequiredField("term_months"))?;
                if term_months == 0 {
                    return Err(LedgerError::Validation(
                        "Certificate term must be at least one month".to_string(),
                    ));
                }
                let today = chrono::Utc::now().date_naive();
                let maturity_date = today
                    .checked_add_months(Months::new(term_months))
                    .ok_or_else(|| {
                        LedgerError::Validation(
                            "Certificate term overflows the calendar".to_string(),
                        )
                    })?;
                Ok(AccountKind::CertificateOfDeposit {
                    term_months,
                    maturity_date,
                    mature: false,
                })
            }
        }
    }
}

/// Creates validated accounts and persists them through the ledger store
pub struct AccountFactory<S: LedgerStore, A: AuditSink> {
    pub(crate) store: S,
    audit: A,
}

impl<S: LedgerStore, A: AuditSink> AccountFactory<S, A> {
    pub fn new(store: S, audit: A) -> Self {
        Self { store, audit }
    }

    /// Open an account for the customer
    ///
    /// Validates the request against the variant policy before anything is
    /// constructed or persisted. On success the new account (with its
    /// opening deposit applied) is saved, the deposit record is appended,
    /// the id is linked into the customer's display cache, and an
    /// OPEN_ACCOUNT audit event is emitted.
    pub async fn open(
        &mut self,
        customer: &mut Customer,
        request: OpeningRequest,
    ) -> LedgerResult<Account> {
        let policy = request.account_type.policy();

        if let Some(deposit) = &request.initial_deposit {
            validate_amount(deposit)?;
        }
        let offered = request
            .initial_deposit
            .clone()
            .unwrap_or_else(|| BigDecimal::from(0));
        if offered < policy.opening_minimum() {
            return Err(LedgerError::MinimumNotMet {
                required: policy.opening_minimum(),
                offered,
            });
        }

        let kind = request.build_kind()?;
        let id = generate_account_id(request.account_type);
        let mut account = Account::open(id, customer.id.clone(), kind, request.branch.clone());

        let opening_record = match &request.initial_deposit {
            Some(deposit) => Some(account.deposit(deposit)?),
            None => None,
        };

        self.store.save_account(&account).await?;
        if let Some(record) = &opening_record {
            self.store.append_transaction(record).await?;
        }
        customer.link_account(account.id.clone());

        let event = AuditEvent::new(
            customer.id.clone(),
            customer.email.clone(),
            AuditAction::OpenAccount,
            AuditTarget::Account,
            account.id.clone(),
            format!("Opened {} account", account.account_type()),
            AuditStatus::Ok,
        );
        if let Err(err) = self.audit.record(event).await {
            tracing::warn!(account_id = %account.id, error = %err, "audit sink rejected open-account event");
        }

        Ok(account)
    }
}
