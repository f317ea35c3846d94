//! Account lifecycle example: opening, deposits, withdrawals, and interest

use banking_core::utils::{MemoryAuditSink, MemoryStore};
use banking_core::{AccountType, Customer, Ledger, OpeningRequest};
use bigdecimal::BigDecimal;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    println!("🏦 Banking Core - Account Lifecycle Example\n");

    let audit = MemoryAuditSink::new();
    let mut ledger = Ledger::new(MemoryStore::new(), audit.clone());

    let mut thandi = Customer::new(
        "cust_thandi".to_string(),
        "Thandi".to_string(),
        "Nkosi".to_string(),
        "3 Kloof St".to_string(),
        "021-555-0199".to_string(),
        "thandi@example.com".to_string(),
    );

    // 1. Open one account of each flavour
    println!("📂 Opening accounts for {}...", thandi.full_name());

    let savings = ledger
        .open_account(
            &mut thandi,
            OpeningRequest::new(AccountType::Savings).initial_deposit("250.00".parse()?),
        )
        .await?;
    println!("  ✓ Savings account {} (balance {})", savings.id, savings.balance);

    let investment = ledger
        .open_account(
            &mut thandi,
            OpeningRequest::new(AccountType::Investment).initial_deposit("1000.00".parse()?),
        )
        .await?;
    println!(
        "  ✓ Investment account {} (balance {})",
        investment.id, investment.balance
    );

    let cheque = ledger
        .open_account(
            &mut thandi,
            OpeningRequest::new(AccountType::Cheque)
                .employer("Acme Pty Ltd", "12 Long St")
                .initial_deposit("600.00".parse()?),
        )
        .await?;
    println!("  ✓ Cheque account {} (balance {})", cheque.id, cheque.balance);

    let certificate = ledger
        .open_account(
            &mut thandi,
            OpeningRequest::new(AccountType::CertificateOfDeposit)
                .initial_deposit("500.00".parse()?)
                .term_months(12),
        )
        .await?;
    println!(
        "  ✓ Certificate of deposit {} (12-month term)\n",
        certificate.id
    );

    // 2. Everyday operations
    println!("💰 Everyday operations...");
    ledger.deposit(&cheque.id, &"150.00".parse()?).await?;
    println!("  ✓ Deposited 150.00 into the cheque account");
    ledger.withdraw(&cheque.id, &"80.00".parse()?).await?;
    println!("  ✓ Withdrew 80.00 from the cheque account");

    // Policy rejections come back as tagged errors, not booleans.
    match ledger.withdraw(&savings.id, &"10.00".parse()?).await {
        Err(err) => println!("  ✗ Savings withdrawal rejected: {err}"),
        Ok(_) => unreachable!("savings accounts never pay out"),
    }
    match ledger.withdraw(&certificate.id, &"10.00".parse()?).await {
        Err(err) => println!("  ✗ Certificate withdrawal rejected: {err}\n"),
        Ok(_) => unreachable!("the certificate has not matured"),
    }

    // 3. Monthly interest run
    println!("📈 Running the monthly interest batch...");
    let report = ledger.process_monthly_interest().await?;
    println!(
        "  ✓ Examined {} accounts, accrued on {}, skipped {}, total interest {}\n",
        report.examined, report.accrued, report.skipped, report.total_interest
    );

    // 4. Balances always come from the store
    println!("🔍 Balances after the run:");
    for account in ledger.accounts_for_customer(&thandi.id).await? {
        println!(
            "  {} ({}): {}",
            account.id,
            account.account_type(),
            account.balance
        );
        assert_eq!(account.balance, account.history_total());
    }
    let total: BigDecimal = ledger.total_balance(&thandi.id).await?;
    println!("  Total holdings: {total}\n");

    // 5. History for one account, most recent first
    println!("📜 Cheque account history:");
    for record in ledger.transaction_history(&cheque.id).await? {
        println!(
            "  {} {} {} ({})",
            record.date,
            record.kind.as_str(),
            record.amount,
            record.status.as_str()
        );
    }

    println!("\n🗒️  {} audit events recorded", audit.events().len());
    Ok(())
}
