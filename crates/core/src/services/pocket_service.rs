use std::collections::HashMap;

use crate::errors::CoreError;
use crate::models::budget::PocketsSnapshot;
use crate::models::pocket::{Pocket, PocketBalance};
use crate::models::transfer::NewTransfer;

/// Local checks on pocket operations. Everything here runs before a request
/// is sent; a rejection means nothing went over the wire.
pub struct PocketService;

impl PocketService {
    pub fn new() -> Self {
        Self
    }

    /// Pockets that are not archived, in display order.
    pub fn active_pockets<'a>(&self, snapshot: &'a PocketsSnapshot) -> Vec<&'a Pocket> {
        let mut pockets: Vec<&Pocket> = snapshot.pockets.iter().filter(|p| !p.archived).collect();
        pockets.sort_by_key(|p| p.order);
        pockets
    }

    /// A pocket can only be archived when it is a custom pocket holding
    /// exactly zero.
    pub fn validate_archive(
        &self,
        snapshot: &PocketsSnapshot,
        balances: &HashMap<String, PocketBalance>,
        pocket_id: &str,
    ) -> Result<(), CoreError> {
        let pocket = snapshot
            .pocket(pocket_id)
            .ok_or_else(|| CoreError::NotFound(format!("pocket {pocket_id}")))?;

        if pocket.archived {
            return Err(CoreError::Validation(format!(
                "Pocket '{}' is already archived",
                pocket.name
            )));
        }
        if pocket.is_primary() {
            return Err(CoreError::Validation(
                "The primary pocket cannot be archived".into(),
            ));
        }

        let balance = balances
            .get(pocket_id)
            .map(|b| b.available_balance)
            .unwrap_or(0);
        if balance != 0 {
            return Err(CoreError::Validation(format!(
                "Pocket '{}' still holds {balance}; move or spend it before archiving",
                pocket.name
            )));
        }
        Ok(())
    }

    /// Shape checks plus both pockets must exist and be active.
    pub fn validate_transfer(
        &self,
        snapshot: &PocketsSnapshot,
        transfer: &NewTransfer,
    ) -> Result<(), CoreError> {
        transfer.validate()?;
        for pocket_id in [&transfer.from_pocket_id, &transfer.to_pocket_id] {
            match snapshot.pocket(pocket_id) {
                Some(p) if p.archived => {
                    return Err(CoreError::Validation(format!(
                        "Pocket '{}' is archived",
                        p.name
                    )));
                }
                Some(_) => {}
                None => return Err(CoreError::NotFound(format!("pocket {pocket_id}"))),
            }
        }
        Ok(())
    }
}

impl Default for PocketService {
    fn default() -> Self {
        Self::new()
    }
}
