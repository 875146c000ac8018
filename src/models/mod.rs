mod user;

pub use user::{UserChanges, UserDocument, UserRecord};
