pub mod budget_service;
pub mod carry_over_service;
pub mod ledger_service;
pub mod mutation_router;
pub mod pocket_service;
pub mod realtime_service;
