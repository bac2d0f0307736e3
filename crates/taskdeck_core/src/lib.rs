pub mod dashboard;
pub mod domain;
pub mod listing;
pub mod ports;
pub mod sequence;
pub mod validation;

pub use dashboard::TaskStats;
pub use domain::{
    AuthSession, Credentials, NewTask, Registration, Task, TaskChanges, TaskPriority, TaskQuery,
    TaskStatus, UnknownVariant, User, UserRole,
};
pub use listing::{arrange, ListControls, SortKey, StatusFilter};
pub use ports::{AuthService, PortError, PortResult, SessionStorage, TaskService};
pub use sequence::RequestSequencer;
pub use validation::{FieldError, ValidationResult};
