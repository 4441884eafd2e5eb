mod from_row;
mod result_set;
mod row;

pub use from_row::{FromDbValue, FromRow};
pub use result_set::ResultSet;
pub use row::DbRow;
