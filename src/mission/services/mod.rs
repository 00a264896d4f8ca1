//! Application services for the mission lifecycle.

mod error;
mod lifecycle;

pub use error::{ErrorKind, MissionServiceError, MissionServiceResult};
pub use lifecycle::{
    AddMaterialLineRequest, CreateMissionRequest, MissionLifecycleService, PublishMissionRequest,
};
