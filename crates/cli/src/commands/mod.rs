pub mod ask;
pub mod doctor;
pub mod init;
pub mod projects;
pub mod reduce;
pub mod serve;
pub mod status;
