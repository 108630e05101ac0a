pub mod fields;
pub mod issue;
pub mod row;
