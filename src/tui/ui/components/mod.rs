pub mod entry_field;
pub mod ledger_table;
