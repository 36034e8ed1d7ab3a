pub mod directory;

pub use directory::{AccountRequest, DirectoryError, DirectoryPort, LoginOracle, PasswordProfile};
