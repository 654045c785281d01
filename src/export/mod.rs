pub mod xlsx;

pub use xlsx::{sheet_name, SheetNames, SpreadsheetWriter, MAX_SHEET_NAME_LEN};
