pub mod entities;
pub mod migrator;
pub mod services;
