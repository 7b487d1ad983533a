mod session;
mod settings;

pub use session::DedupReport;
pub use session::FetchInput;
pub use session::InputError;
pub use session::Session;
pub use settings::SettingsError;
pub use settings::SettingsManager;
