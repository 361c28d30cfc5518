pub mod field_path;
pub mod helpers;
pub mod record;
pub mod scalar;
