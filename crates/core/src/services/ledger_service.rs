use std::collections::HashMap;
use tracing::warn;

use crate::models::budget::PocketsSnapshot;
use crate::models::money::Amount;
use crate::models::pocket::{EntryKind, LedgerEntry, Pocket, PocketBalance};

/// Computes pocket balances from their monthly entry streams.
///
/// Pure business logic: no I/O, no clamping, integer arithmetic only.
/// Entries are folded in the order the backend reported them; the client
/// never re-sorts.
pub struct LedgerService;

impl LedgerService {
    pub fn new() -> Self {
        Self
    }

    /// Fold one pocket's entries into its balance.
    ///
    /// Entries addressed to other pockets are skipped, so passing a mixed
    /// stream never counts anything twice. A negative result is valid: it is
    /// what becomes next month's liability.
    pub fn compute_balance(&self, pocket: &Pocket, entries: &[LedgerEntry]) -> PocketBalance {
        entries
            .iter()
            .filter(|e| e.pocket_id == pocket.id)
            .fold(PocketBalance::empty(&pocket.id), |mut balance, entry| {
                match entry.kind {
                    EntryKind::Initial => balance.original_amount += entry.amount,
                    EntryKind::Income => balance.income += entry.amount,
                    EntryKind::TransferIn => balance.transfer_in += entry.amount,
                    EntryKind::TransferOut => balance.transfer_out += entry.amount,
                    EntryKind::Expense if entry.from_income => balance.from_income += entry.amount,
                    EntryKind::Expense => balance.expenses += entry.amount,
                }
                balance.available_balance += entry.signed_amount();
                balance
            })
    }

    /// Balances for every pocket, keyed by pocket id.
    pub fn compute_balances(
        &self,
        pockets: &[Pocket],
        entries: &[LedgerEntry],
    ) -> HashMap<String, PocketBalance> {
        let orphans = entries
            .iter()
            .filter(|e| !pockets.iter().any(|p| p.id == e.pocket_id))
            .count();
        if orphans > 0 {
            warn!(orphans, "ledger entries reference unknown pockets and were ignored");
        }

        pockets
            .iter()
            .map(|p| (p.id.clone(), self.compute_balance(p, entries)))
            .collect()
    }

    /// Balances for a fetched pockets snapshot.
    ///
    /// Recomputed from the raw entries when the backend shipped them;
    /// otherwise the server-side balances are used as-is. Pockets without a
    /// reported balance get an empty one.
    pub fn resolve_balances(&self, snapshot: &PocketsSnapshot) -> HashMap<String, PocketBalance> {
        if !snapshot.entries.is_empty() {
            return self.compute_balances(&snapshot.pockets, &snapshot.entries);
        }

        let mut balances: HashMap<String, PocketBalance> = snapshot
            .balances
            .iter()
            .map(|b| (b.pocket_id.clone(), b.clone()))
            .collect();
        for pocket in &snapshot.pockets {
            balances
                .entry(pocket.id.clone())
                .or_insert_with(|| PocketBalance::empty(&pocket.id));
        }
        balances
    }

    /// Current available balance of one pocket (zero when unknown).
    pub fn available_balance(
        &self,
        balances: &HashMap<String, PocketBalance>,
        pocket_id: &str,
    ) -> Amount {
        balances
            .get(pocket_id)
            .map(|b| b.available_balance)
            .unwrap_or(0)
    }
}

impl Default for LedgerService {
    fn default() -> Self {
        Self::new()
    }
}
