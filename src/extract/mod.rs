pub mod layout;
pub mod table;
pub mod tables;
pub mod utils;

pub use layout::{CompiledLayout, PageLayout, ALLECIJFERS_V1};
pub use table::{CategoryTable, MunicipalityDataset};
pub use tables::{extract_tables, ExtractError};
