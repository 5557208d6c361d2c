use serde::{Deserialize, Serialize};

use super::money::Amount;

/// Whether a pocket is the account's auto-created main pocket or one the
/// user added.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PocketType {
    /// Created automatically for every account; holds the opening amount.
    Primary,
    /// User-created envelope.
    Custom,
}

impl std::fmt::Display for PocketType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PocketType::Primary => write!(f, "primary"),
            PocketType::Custom => write!(f, "custom"),
        }
    }
}

/// A named sub-budget (envelope). Display metadata is carried through
/// untouched; only `id` and `pocket_type` matter to the ledger math.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pocket {
    pub id: String,

    #[serde(rename = "type")]
    pub pocket_type: PocketType,

    pub name: String,

    #[serde(default)]
    pub icon: Option<String>,

    #[serde(default)]
    pub color: Option<String>,

    #[serde(default)]
    pub order: u32,

    #[serde(default)]
    pub enable_wishlist: bool,

    /// Archived pockets are soft-deleted and never come back.
    #[serde(default)]
    pub archived: bool,
}

impl Pocket {
    pub fn new(id: impl Into<String>, name: impl Into<String>, pocket_type: PocketType) -> Self {
        Self {
            id: id.into(),
            pocket_type,
            name: name.into(),
            icon: None,
            color: None,
            order: 0,
            enable_wishlist: false,
            archived: false,
        }
    }

    pub fn primary(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self::new(id, name, PocketType::Primary)
    }

    pub fn custom(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self::new(id, name, PocketType::Custom)
    }

    #[must_use]
    pub fn is_primary(&self) -> bool {
        self.pocket_type == PocketType::Primary
    }
}

/// Kind of movement recorded against a pocket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryKind {
    Initial,
    Income,
    Expense,
    TransferIn,
    TransferOut,
}

/// One dated movement in a pocket's stream for a month.
///
/// `amount` is always the positive magnitude; the direction comes from
/// `kind` (and `from_income` for expenses).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerEntry {
    #[serde(rename = "type")]
    pub kind: EntryKind,

    pub pocket_id: String,

    pub amount: Amount,

    #[serde(default)]
    pub date: Option<String>,

    /// Only meaningful on expenses: the entry reverses a previous expense
    /// back into income, so it adds to the balance.
    #[serde(default)]
    pub from_income: bool,
}

impl LedgerEntry {
    pub fn new(kind: EntryKind, pocket_id: impl Into<String>, amount: Amount) -> Self {
        Self {
            kind,
            pocket_id: pocket_id.into(),
            amount,
            date: None,
            from_income: false,
        }
    }

    pub fn initial(pocket_id: impl Into<String>, amount: Amount) -> Self {
        Self::new(EntryKind::Initial, pocket_id, amount)
    }

    pub fn income(pocket_id: impl Into<String>, amount: Amount) -> Self {
        Self::new(EntryKind::Income, pocket_id, amount)
    }

    pub fn expense(pocket_id: impl Into<String>, amount: Amount) -> Self {
        Self::new(EntryKind::Expense, pocket_id, amount)
    }

    /// An expense flagged as moved back to income.
    pub fn expense_reversal(pocket_id: impl Into<String>, amount: Amount) -> Self {
        Self {
            from_income: true,
            ..Self::new(EntryKind::Expense, pocket_id, amount)
        }
    }

    pub fn transfer_in(pocket_id: impl Into<String>, amount: Amount) -> Self {
        Self::new(EntryKind::TransferIn, pocket_id, amount)
    }

    pub fn transfer_out(pocket_id: impl Into<String>, amount: Amount) -> Self {
        Self::new(EntryKind::TransferOut, pocket_id, amount)
    }

    /// Contribution of this entry to the pocket's available balance.
    #[must_use]
    pub fn signed_amount(&self) -> Amount {
        match self.kind {
            EntryKind::Initial | EntryKind::Income | EntryKind::TransferIn => self.amount,
            EntryKind::Expense if self.from_income => self.amount,
            EntryKind::Expense | EntryKind::TransferOut => -self.amount,
        }
    }
}

/// Derived per-(pocket, month) balance. Always rebuilt from entries and
/// replaced wholesale, never patched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PocketBalance {
    pub pocket_id: String,

    /// Opening amount (only the primary pocket receives one).
    #[serde(default)]
    pub original_amount: Amount,

    #[serde(default)]
    pub income: Amount,

    #[serde(default)]
    pub transfer_in: Amount,

    #[serde(default)]
    pub transfer_out: Amount,

    /// Sum of regular (non-reversal) expenses.
    #[serde(default)]
    pub expenses: Amount,

    /// Sum of expenses moved back to income.
    #[serde(default)]
    pub from_income: Amount,

    /// May be negative: overspending is recorded, not clamped.
    pub available_balance: Amount,
}

impl PocketBalance {
    /// Empty balance for a pocket with no movements.
    pub fn empty(pocket_id: impl Into<String>) -> Self {
        Self {
            pocket_id: pocket_id.into(),
            ..Self::default()
        }
    }

    /// Everything that flowed into the pocket this month.
    #[must_use]
    pub fn total_incoming(&self) -> Amount {
        self.original_amount + self.income + self.transfer_in + self.from_income
    }

    /// Everything that flowed out of the pocket this month.
    #[must_use]
    pub fn total_outgoing(&self) -> Amount {
        self.transfer_out + self.expenses
    }
}
