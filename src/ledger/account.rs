//! Account variants and their balance policies

use bigdecimal::{BigDecimal, RoundingMode};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::types::{
    LedgerError, LedgerResult, PolicyViolation, TransactionKind, TransactionRecord,
    TransactionStatus,
};
use crate::utils::validation::validate_amount;

/// Branch label assigned when the caller does not supply one
pub const DEFAULT_BRANCH: &str = "Main Branch";

/// Account-type tag used for policy lookup, opening requests, and id prefixes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum AccountType {
    Savings,
    Investment,
    Cheque,
    MoneyMarket,
    CertificateOfDeposit,
}

impl AccountType {
    /// The immutable policy attached to this variant
    pub fn policy(&self) -> &'static AccountPolicy {
        match self {
            AccountType::Savings => &SAVINGS_POLICY,
            AccountType::Investment => &INVESTMENT_POLICY,
            AccountType::Cheque => &CHEQUE_POLICY,
            AccountType::MoneyMarket => &MONEY_MARKET_POLICY,
            AccountType::CertificateOfDeposit => &CERTIFICATE_POLICY,
        }
    }

    /// Identifier prefix for accounts of this type
    pub fn prefix(&self) -> &'static str {
        match self {
            AccountType::Savings => "SAV",
            AccountType::Investment => "INV",
            AccountType::Cheque => "CHQ",
            AccountType::MoneyMarket => "MMA",
            AccountType::CertificateOfDeposit => "CD",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AccountType::Savings => "savings",
            AccountType::Investment => "investment",
            AccountType::Cheque => "cheque",
            AccountType::MoneyMarket => "money market",
            AccountType::CertificateOfDeposit => "certificate of deposit",
        }
    }
}

impl fmt::Display for AccountType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AccountType {
    type Err = LedgerError;

    /// Parse a case-insensitive type tag, including the accepted aliases
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "savings" => Ok(AccountType::Savings),
            "investment" => Ok(AccountType::Investment),
            "cheque" | "checking" => Ok(AccountType::Cheque),
            "money market" | "moneymarket" => Ok(AccountType::MoneyMarket),
            "cd" | "certificate of deposit" | "certificateofdeposit" => {
                Ok(AccountType::CertificateOfDeposit)
            }
            _ => Err(LedgerError::UnknownAccountType(s.to_string())),
        }
    }
}

/// Shape of the withdrawal precondition a variant enforces
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WithdrawalRule {
    /// Withdrawals always rejected
    Never,
    /// Requested amount must not exceed the balance
    SufficientFunds,
    /// Resulting balance must stay at or above the variant minimum
    KeepMinimum,
    /// Locked until the maturity date, then sufficient-funds only
    AfterMaturity,
}

/// Immutable per-variant policy: data consumed by one shared state machine
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AccountPolicy {
    /// Minimum opening deposit in whole currency units (0 = none)
    pub minimum_opening: i64,
    /// Balance floor a withdrawal must preserve, whole currency units
    pub minimum_balance: i64,
    /// Monthly interest rate in basis points (0 = pays no interest)
    pub interest_rate_bp: i64,
    /// Monthly withdrawal cap, where the variant has one
    pub withdrawal_limit: Option<u32>,
    pub withdrawal_rule: WithdrawalRule,
}

impl AccountPolicy {
    pub fn opening_minimum(&self) -> BigDecimal {
        BigDecimal::from(self.minimum_opening)
    }

    pub fn balance_minimum(&self) -> BigDecimal {
        BigDecimal::from(self.minimum_balance)
    }

    /// Monthly rate as a decimal fraction (500 bp -> 0.05)
    pub fn monthly_rate(&self) -> BigDecimal {
        BigDecimal::new(self.interest_rate_bp.into(), 4)
    }

    pub fn pays_interest(&self) -> bool {
        self.interest_rate_bp > 0
    }
}

const SAVINGS_POLICY: AccountPolicy = AccountPolicy {
    minimum_opening: 0,
    minimum_balance: 0,
    interest_rate_bp: 5,
    withdrawal_limit: None,
    withdrawal_rule: WithdrawalRule::Never,
};

const INVESTMENT_POLICY: AccountPolicy = AccountPolicy {
    minimum_opening: 500,
    minimum_balance: 500,
    interest_rate_bp: 500,
    withdrawal_limit: None,
    withdrawal_rule: WithdrawalRule::KeepMinimum,
};

const CHEQUE_POLICY: AccountPolicy = AccountPolicy {
    minimum_opening: 0,
    minimum_balance: 0,
    interest_rate_bp: 0,
    withdrawal_limit: None,
    withdrawal_rule: WithdrawalRule::SufficientFunds,
};

const MONEY_MARKET_POLICY: AccountPolicy = AccountPolicy {
    minimum_opening: 1000,
    minimum_balance: 1000,
    interest_rate_bp: 800,
    withdrawal_limit: Some(6),
    withdrawal_rule: WithdrawalRule::KeepMinimum,
};

const CERTIFICATE_POLICY: AccountPolicy = AccountPolicy {
    minimum_opening: 500,
    minimum_balance: 0,
    interest_rate_bp: 1000,
    withdrawal_limit: None,
    withdrawal_rule: WithdrawalRule::AfterMaturity,
};

/// Variant tag plus the state specific to that variant
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AccountKind {
    Savings,
    Investment,
    Cheque {
        employer: String,
        employer_address: String,
    },
    MoneyMarket {
        withdrawals_this_month: u32,
    },
    CertificateOfDeposit {
        term_months: u32,
        maturity_date: NaiveDate,
        mature: bool,
    },
}

impl AccountKind {
    pub fn account_type(&self) -> AccountType {
        match self {
            AccountKind::Savings => AccountType::Savings,
            AccountKind::Investment => AccountType::Investment,
            AccountKind::Cheque { .. } => AccountType::Cheque,
            AccountKind::MoneyMarket { .. } => AccountType::MoneyMarket,
            AccountKind::CertificateOfDeposit { .. } => AccountType::CertificateOfDeposit,
        }
    }
}

/// One customer-owned account
///
/// The in-memory value is not durable: every balance-changing operation is
/// followed by a `save_account` call on the ledger store, and the record the
/// operation returns is appended to the store's transaction log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Account {
    /// Unique identifier (`<type-prefix>_<token>`), immutable once assigned
    pub id: String,
    /// Identifier of the owning customer
    pub customer_id: String,
    /// Variant tag and variant-specific state
    pub kind: AccountKind,
    /// Current balance; always the sum of the applied record deltas
    pub balance: BigDecimal,
    pub branch: String,
    pub opened_on: NaiveDate,
    /// Date interest was last credited
    pub last_accrual_on: NaiveDate,
    /// Append-only history of applied records
    pub transactions: Vec<TransactionRecord>,
}

impl Account {
    /// Open an account with a zero balance, dated today
    pub fn open(id: String, customer_id: String, kind: AccountKind, branch: Option<String>) -> Self {
        let today = chrono::Utc::now().date_naive();
        Self {
            id,
            customer_id,
            kind,
            balance: BigDecimal::from(0),
            branch: branch.unwrap_or_else(|| DEFAULT_BRANCH.to_string()),
            opened_on: today,
            last_accrual_on: today,
            transactions: Vec::new(),
        }
    }

    pub fn account_type(&self) -> AccountType {
        self.kind.account_type()
    }

    pub fn policy(&self) -> &'static AccountPolicy {
        self.account_type().policy()
    }

    /// Credit the account, appending a DEPOSIT record
    ///
    /// Fails with `InvalidAmount` for non-positive or sub-cent amounts,
    /// leaving the account untouched.
    pub fn deposit(&mut self, amount: &BigDecimal) -> LedgerResult<TransactionRecord> {
        validate_amount(amount)?;
        Ok(self.apply_credit(
            amount.clone(),
            TransactionKind::Deposit,
            TransactionStatus::Completed,
        ))
    }

    /// Debit the account, appending a WITHDRAWAL record
    ///
    /// The variant's withdrawal rule is evaluated first; a `PolicyViolation`
    /// leaves balance and history untouched. Money Market withdrawals bump
    /// the monthly counter.
    pub fn withdraw(&mut self, amount: &BigDecimal) -> LedgerResult<TransactionRecord> {
        validate_amount(amount)?;
        self.check_withdrawal_policy(amount)?;
        self.balance -= amount;
        if let AccountKind::MoneyMarket {
            withdrawals_this_month,
        } = &mut self.kind
        {
            *withdrawals_this_month += 1;
        }
        let record = TransactionRecord::new(
            &self.id,
            TransactionKind::Withdrawal,
            amount.clone(),
            TransactionStatus::Completed,
        );
        self.transactions.push(record.clone());
        Ok(record)
    }

    /// Apply one period of interest, appending an INTEREST record
    ///
    /// No-op when the balance is non-positive, the variant pays no interest,
    /// or the interest rounds to zero. Money Market accrual resets the
    /// monthly withdrawal counter; a Certificate of Deposit past its maturity
    /// date is marked mature.
    pub fn accrue_interest(&mut self) -> Option<TransactionRecord> {
        if self.balance <= BigDecimal::from(0) {
            return None;
        }
        let policy = self.policy();
        if !policy.pays_interest() {
            return None;
        }
        let interest =
            (&self.balance * policy.monthly_rate()).with_scale_round(2, RoundingMode::HalfUp);
        if interest <= BigDecimal::from(0) {
            return None;
        }
        let today = chrono::Utc::now().date_naive();
        self.last_accrual_on = today;
        match &mut self.kind {
            AccountKind::MoneyMarket {
                withdrawals_this_month,
            } => *withdrawals_this_month = 0,
            AccountKind::CertificateOfDeposit {
                maturity_date,
                mature,
                ..
            } => {
                if today >= *maturity_date {
                    *mature = true;
                }
            }
            _ => {}
        }
        Some(self.apply_credit(
            interest,
            TransactionKind::Interest,
            TransactionStatus::Completed,
        ))
    }

    /// System-initiated credit restoring a debit that could not complete
    ///
    /// Skips amount validation (the amount comes from the withdrawal being
    /// reversed) and records a REVERSAL status so reconciliation can tell it
    /// from a customer deposit.
    pub(crate) fn compensating_deposit(&mut self, amount: &BigDecimal) -> TransactionRecord {
        self.apply_credit(
            amount.clone(),
            TransactionKind::Deposit,
            TransactionStatus::Reversal,
        )
    }

    /// Whether withdrawals are free of the maturity lock
    ///
    /// Always true for variants without a term; for a Certificate of Deposit
    /// this reports the flag set by accrual once the term has elapsed.
    pub fn is_mature(&self) -> bool {
        match &self.kind {
            AccountKind::CertificateOfDeposit { mature, .. } => *mature,
            _ => true,
        }
    }

    /// Withdrawals taken this period (always 0 outside Money Market)
    pub fn withdrawals_this_month(&self) -> u32 {
        match &self.kind {
            AccountKind::MoneyMarket {
                withdrawals_this_month,
            } => *withdrawals_this_month,
            _ => 0,
        }
    }

    /// Sum of the signed record deltas; equals the balance by construction
    pub fn history_total(&self) -> BigDecimal {
        self.transactions.iter().map(|r| r.signed_amount()).sum()
    }

    fn check_withdrawal_policy(&self, amount: &BigDecimal) -> Result<(), PolicyViolation> {
        let policy = self.policy();
        match policy.withdrawal_rule {
            WithdrawalRule::Never => Err(PolicyViolation::WithdrawalsNotAllowed),
            WithdrawalRule::SufficientFunds => self.check_sufficient_funds(amount),
            WithdrawalRule::KeepMinimum => {
                if let Some(limit) = policy.withdrawal_limit {
                    if self.withdrawals_this_month() >= limit {
                        return Err(PolicyViolation::WithdrawalLimitReached { limit });
                    }
                }
                if &self.balance - amount >= policy.balance_minimum() {
                    Ok(())
                } else {
                    Err(PolicyViolation::BelowMinimumBalance {
                        minimum: policy.balance_minimum(),
                    })
                }
            }
            WithdrawalRule::AfterMaturity => {
                if let AccountKind::CertificateOfDeposit {
                    maturity_date,
                    mature,
                    ..
                } = &self.kind
                {
                    let today = chrono::Utc::now().date_naive();
                    if !mature && today < *maturity_date {
                        return Err(PolicyViolation::NotMatured {
                            maturity_date: *maturity_date,
                        });
                    }
                }
                self.check_sufficient_funds(amount)
            }
        }
    }

    fn check_sufficient_funds(&self, amount: &BigDecimal) -> Result<(), PolicyViolation> {
        if amount <= &self.balance {
            Ok(())
        } else {
            Err(PolicyViolation::InsufficientFunds)
        }
    }

    fn apply_credit(
        &mut self,
        amount: BigDecimal,
        kind: TransactionKind,
        status: TransactionStatus,
    ) -> TransactionRecord {
        self.balance += &amount;
        let record = TransactionRecord::new(&self.id, kind, amount, status);
        self.transactions.push(record.clone());
        record
    }
}
