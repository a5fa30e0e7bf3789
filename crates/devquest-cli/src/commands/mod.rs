pub mod blog;
pub mod cv;
pub mod oracle;
pub mod profile;
pub mod quests;

pub use blog::BlogCommand;
pub use cv::CvCommand;
pub use oracle::OracleCommand;
pub use profile::ProfileCommand;
pub use quests::QuestsCommand;
