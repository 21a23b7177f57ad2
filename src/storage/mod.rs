pub mod credential;
pub mod download;

pub use credential::{CredentialStore, FileCredentialStore, MemoryCredentialStore, CREDENTIAL_KEY};
pub use download::{DirectoryDownloader, DownloadSink};
