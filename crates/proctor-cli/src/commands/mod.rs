pub mod assign;
pub mod drafts;
pub mod fetch;
pub mod init;
pub mod score;
pub mod status;
pub mod validate;
