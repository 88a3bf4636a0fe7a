use std::collections::HashMap;
use std::sync::Arc;

use tracing::{debug, warn};

use crate::error::{FinboardError, Result};
use crate::models::{AccountRecord, EnrichedTransaction, Sheet, TransactionSet};
use crate::settings::ColumnNames;

/// Chart of accounts indexed by normalized account code.
#[derive(Debug, Clone, Default)]
pub struct AccountIndex {
    by_code: HashMap<String, Arc<AccountRecord>>,
}

impl AccountIndex {
    /// Build the index from the reference sheet, trimming its headers first.
    /// The first row wins when a code repeats.
    pub fn build(sheet: &Sheet, columns: &ColumnNames) -> Result<Self> {
        let mut sheet = sheet.clone();
        sheet.trim_headers();
        let key_col = sheet
            .column(&columns.reference_account_code)
            .ok_or_else(|| FinboardError::MergeKey {
                column: columns.reference_account_code.clone(),
                side: "chart of accounts",
            })?;
        let category_col = sheet.column(&columns.account_category);

        let mut by_code = HashMap::new();
        for idx in 0..sheet.rows.len() {
            let Some(code) = sheet.cell(idx, key_col).as_key() else {
                continue;
            };
            if by_code.contains_key(&code) {
                warn!(code = %code, "duplicate account code in chart of accounts, keeping first");
                continue;
            }
            let category = category_col.and_then(|c| sheet.cell(idx, c).as_label());
            by_code.insert(code, Arc::new(AccountRecord { category }));
        }
        Ok(Self { by_code })
    }

    pub fn get(&self, code: &str) -> Option<&Arc<AccountRecord>> {
        self.by_code.get(code)
    }

    pub fn len(&self) -> usize {
        self.by_code.len()
    }
}

/// Left outer join of transactions onto the chart of accounts. Every
/// transaction survives; unmatched ones carry no account.
pub fn merge(
    transactions: TransactionSet,
    accounts: &Sheet,
    columns: &ColumnNames,
) -> Result<Vec<EnrichedTransaction>> {
    let key = &columns.transaction_account_code;
    if !transactions.columns.iter().any(|c| c == key) {
        return Err(FinboardError::MergeKey {
            column: key.clone(),
            side: "transaction",
        });
    }
    let index = AccountIndex::build(accounts, columns)?;

    let mut unmatched = 0usize;
    let enriched: Vec<EnrichedTransaction> = transactions
        .records
        .into_iter()
        .map(|record| {
            let account = record
                .field(key)
                .as_key()
                .and_then(|code| index.get(&code).cloned());
            if account.is_none() {
                unmatched += 1;
            }
            EnrichedTransaction { record, account }
        })
        .collect();

    if unmatched > 0 {
        warn!(unmatched, "transactions without a matching account code");
    }
    debug!(rows = enriched.len(), accounts = index.len(), "merged chart of accounts");
    Ok(enriched)
}
