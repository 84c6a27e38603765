pub mod dict;
pub mod eucjp;
pub mod settings;
