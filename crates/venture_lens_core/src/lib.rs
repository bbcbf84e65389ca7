pub mod domain;
pub mod guest;
pub mod ports;
pub mod repair;
pub mod schema;

pub use domain::{AnalysisRecord, Page, User, UserCredentials};
pub use ports::{DatabaseService, IdeaAnalysisService, PortError, PortResult};
pub use schema::BusinessAnalysis;
